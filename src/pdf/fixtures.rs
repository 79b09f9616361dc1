//! In-memory PDFs for tests: numbered text pages plus an optional outline.

use anyhow::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};

/// One outline item pointing at a 1-indexed page.
pub struct Outline {
    pub title: String,
    pub page: u32,
    pub children: Vec<Outline>,
}

impl Outline {
    pub fn new(title: &str, page: u32) -> Self {
        Outline {
            title: title.to_string(),
            page,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Outline>) -> Self {
        self.children = children;
        self
    }
}

/// Build a document with `num_pages` pages, each drawing "Page N".
pub fn build_pdf(num_pages: u32, outline: &[Outline]) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let content = format!("BT /F1 12 Tf 100 700 Td (Page {}) Tj ET", i + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);

    if !outline.is_empty() {
        let outlines_id = doc.new_object_id();
        let (first, last) = add_outline_items(&mut doc, outline, outlines_id, &page_ids);
        let outlines = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Outlines".to_vec())),
            ("First", Object::Reference(first)),
            ("Last", Object::Reference(last)),
            ("Count", Object::Integer(outline.len() as i64)),
        ]);
        doc.objects.insert(outlines_id, Object::Dictionary(outlines));
        catalog.set("Outlines", Object::Reference(outlines_id));
    }

    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

fn add_outline_items(
    doc: &mut Document,
    items: &[Outline],
    parent: ObjectId,
    page_ids: &[ObjectId],
) -> (ObjectId, ObjectId) {
    let ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

    for (i, item) in items.iter().enumerate() {
        let mut dict = Dictionary::from_iter(vec![
            ("Title", Object::string_literal(item.title.as_str())),
            ("Parent", Object::Reference(parent)),
        ]);
        if let Some(page_id) = page_ids.get((item.page as usize).wrapping_sub(1)) {
            dict.set(
                "Dest",
                Object::Array(vec![
                    Object::Reference(*page_id),
                    Object::Name(b"Fit".to_vec()),
                ]),
            );
        }
        if i > 0 {
            dict.set("Prev", Object::Reference(ids[i - 1]));
        }
        if let Some(next) = ids.get(i + 1) {
            dict.set("Next", Object::Reference(*next));
        }
        if !item.children.is_empty() {
            let (first, last) = add_outline_items(doc, &item.children, ids[i], page_ids);
            dict.set("First", Object::Reference(first));
            dict.set("Last", Object::Reference(last));
            dict.set("Count", Object::Integer(item.children.len() as i64));
        }
        doc.objects.insert(ids[i], Object::Dictionary(dict));
    }

    (ids[0], ids[ids.len() - 1])
}

/// Write a fixture to `dir/name` and return the path.
pub fn write_pdf(dir: &Path, name: &str, num_pages: u32, outline: &[Outline]) -> Result<PathBuf> {
    let path = dir.join(name);
    build_pdf(num_pages, outline).save(&path)?;
    Ok(path)
}

/// Raw content stream of a page, lossily decoded; empty if it has none.
pub fn page_text(doc: &Document, page_id: ObjectId) -> String {
    doc.get_page_content(page_id)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
