use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::path::Path;

// Page attributes a /Pages node passes down to pages that lack them.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

pub struct PdfDocument {
    pub doc: Document,
    pub path: String,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let doc =
            Document::load(&path).with_context(|| format!("Failed to open PDF: {}", path_str))?;
        Ok(PdfDocument {
            doc,
            path: path_str,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    /// Copy an inclusive range of 1-indexed pages into a new document.
    ///
    /// The kept pages are hung directly off the root page tree node, taking
    /// along any attributes they inherited from intermediate nodes. The source
    /// is left untouched. The copy carries no outline, since its entries
    /// would point at pages that no longer exist.
    pub fn extract_page_range(&self, pages: RangeInclusive<u32>) -> Result<Document> {
        let total = self.page_count();
        let (first, last) = (*pages.start(), *pages.end());
        if first == 0 || last > total || first > last {
            anyhow::bail!("Page range {}-{} is out of range (1-{})", first, last, total);
        }

        let kept: Vec<ObjectId> = self
            .page_ids()
            .into_iter()
            .filter(|(num, _)| pages.contains(num))
            .map(|(_, id)| id)
            .collect();
        let root_pages = self
            .doc
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .context("Document has no page tree")?;

        let mut new_doc = self.doc.clone();
        for &page_id in &kept {
            let inherited = self.inherited_attributes(page_id);
            let page = new_doc.get_dictionary_mut(page_id)?;
            for (key, value) in inherited {
                if !page.has(key) {
                    page.set(key, value);
                }
            }
            page.set("Parent", Object::Reference(root_pages));
        }

        let tree = new_doc.get_dictionary_mut(root_pages)?;
        tree.set(
            "Kids",
            Object::Array(kept.iter().map(|id| Object::Reference(*id)).collect()),
        );
        tree.set("Count", Object::Integer(kept.len() as i64));

        strip_outline(&mut new_doc);
        new_doc.prune_objects();

        Ok(new_doc)
    }

    /// Inheritable attributes a page picks up from its ancestors, nearest first.
    fn inherited_attributes(&self, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
        let mut found: Vec<(&'static [u8], Object)> = Vec::new();
        let mut seen = HashSet::new();
        let mut node = self
            .doc
            .get_dictionary(page_id)
            .and_then(|page| page.get(b"Parent"))
            .and_then(Object::as_reference)
            .ok();

        while let Some(id) = node {
            if !seen.insert(id) {
                break;
            }
            let Ok(dict) = self.doc.get_dictionary(id) else {
                break;
            };
            for key in INHERITABLE {
                if found.iter().all(|(k, _)| *k != key) {
                    if let Ok(value) = dict.get(key) {
                        found.push((key, value.clone()));
                    }
                }
            }
            node = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }
        found
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        doc.save(&path)
            .with_context(|| format!("Failed to save PDF: {}", path.as_ref().display()))?;
        Ok(())
    }
}

fn strip_outline(doc: &mut Document) {
    let root_id = match doc.trailer.get(b"Root") {
        Ok(Object::Reference(r)) => *r,
        _ => return,
    };
    if let Ok(catalog) = doc.get_dictionary_mut(root_id) {
        catalog.remove(b"Outlines");
        catalog.remove(b"PageMode");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{build_pdf, page_text, Outline};
    use lopdf::Dictionary;

    #[test]
    fn test_page_count() {
        let doc = PdfDocument {
            doc: build_pdf(7, &[]),
            path: "mem".to_string(),
        };
        assert_eq!(doc.page_count(), 7);
        assert_eq!(doc.page_ids().first().map(|(n, _)| *n), Some(1));
    }

    #[test]
    fn test_extract_page_range_keeps_requested_pages() {
        let doc = PdfDocument {
            doc: build_pdf(10, &[]),
            path: "mem".to_string(),
        };
        let new_doc = doc.extract_page_range(4..=7).unwrap();
        let pages: Vec<_> = new_doc.get_pages().into_values().collect();
        assert_eq!(pages.len(), 4);
        assert!(page_text(&new_doc, pages[0]).contains("(Page 4)"));
        assert!(page_text(&new_doc, pages[3]).contains("(Page 7)"));

        // source untouched
        assert_eq!(doc.page_count(), 10);
    }

    #[test]
    fn test_extract_page_range_drops_outline() {
        let doc = PdfDocument {
            doc: build_pdf(4, &[Outline::new("A", 1), Outline::new("B", 3)]),
            path: "mem".to_string(),
        };
        let new_doc = doc.extract_page_range(1..=2).unwrap();
        assert!(new_doc.catalog().unwrap().get(b"Outlines").is_err());
    }

    /// Move pages 4..=6 under an intermediate /Pages node that owns their MediaBox.
    fn nest_last_pages(doc: &mut Document) -> ObjectId {
        let ids: Vec<_> = doc.get_pages().into_values().collect();
        let root = doc
            .catalog()
            .unwrap()
            .get(b"Pages")
            .unwrap()
            .as_reference()
            .unwrap();
        let middle = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Parent", Object::Reference(root)),
            ("Count", Object::Integer(3)),
            (
                "Kids",
                Object::Array(ids[3..].iter().map(|id| Object::Reference(*id)).collect()),
            ),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(300),
                    Object::Integer(400),
                ]),
            ),
        ]));
        for id in &ids[3..] {
            let page = doc.get_dictionary_mut(*id).unwrap();
            page.remove(b"MediaBox");
            page.set("Parent", Object::Reference(middle));
        }
        let mut kids: Vec<Object> = ids[..3].iter().map(|id| Object::Reference(*id)).collect();
        kids.push(Object::Reference(middle));
        doc.get_dictionary_mut(root)
            .unwrap()
            .set("Kids", Object::Array(kids));
        middle
    }

    #[test]
    fn test_extract_page_range_flattens_nested_tree() {
        let mut source = build_pdf(6, &[]);
        let middle = nest_last_pages(&mut source);
        let doc = PdfDocument {
            doc: source,
            path: "mem".to_string(),
        };
        assert_eq!(doc.page_count(), 6);

        let new_doc = doc.extract_page_range(3..=5).unwrap();
        let root = new_doc
            .catalog()
            .unwrap()
            .get(b"Pages")
            .unwrap()
            .as_reference()
            .unwrap();
        let tree = new_doc.get_dictionary(root).unwrap();
        assert_eq!(tree.get(b"Count").unwrap().as_i64().unwrap(), 3);

        let pages: Vec<_> = new_doc.get_pages().into_values().collect();
        assert_eq!(pages.len(), 3);
        assert!(page_text(&new_doc, pages[0]).contains("(Page 3)"));
        assert!(page_text(&new_doc, pages[2]).contains("(Page 5)"));
        for id in &pages {
            let page = new_doc.get_dictionary(*id).unwrap();
            assert_eq!(page.get(b"Parent").unwrap().as_reference().unwrap(), root);
        }

        let media_box = |id: ObjectId| {
            let page = new_doc.get_dictionary(id).unwrap();
            page.get(b"MediaBox").unwrap().as_array().unwrap().clone()
        };
        assert_eq!(media_box(pages[0])[2].as_i64().unwrap(), 612);
        assert_eq!(media_box(pages[1])[2].as_i64().unwrap(), 300);
        assert_eq!(media_box(pages[2])[3].as_i64().unwrap(), 400);

        // The emptied intermediate node and the dropped pages are gone
        assert!(!new_doc.objects.contains_key(&middle));
        assert!(new_doc.objects.len() < doc.doc.objects.len());
    }

    #[test]
    fn test_extract_page_range_rejects_out_of_bounds() {
        let doc = PdfDocument {
            doc: build_pdf(3, &[]),
            path: "mem".to_string(),
        };
        assert!(doc.extract_page_range(0..=2).is_err());
        assert!(doc.extract_page_range(2..=4).is_err());
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 3..=2;
        assert!(doc.extract_page_range(reversed).is_err());
    }
}
