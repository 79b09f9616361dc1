use anyhow::{Context, Result};
use lopdf::{decode_text_string, Dictionary, Document, Object, ObjectId};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// Outline levels are 1-based: top-level bookmarks have level 1.
pub const TOP_LEVEL: u32 = 1;

#[derive(Debug, Clone)]
pub struct TocEntry {
    pub title: String,
    pub page: Option<u32>,
    pub level: u32,
    pub children: Vec<TocEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTocEntry {
    pub title: String,
    pub page: Option<u32>,
    pub level: u32,
}

type PageMap = HashMap<ObjectId, u32>;

/// Extract table of contents / bookmarks from a PDF
pub fn extract_toc<P: AsRef<Path>>(path: P) -> Result<Vec<TocEntry>> {
    let path = path.as_ref();
    let doc =
        Document::load(path).with_context(|| format!("Failed to open PDF: {}", path.display()))?;

    extract_toc_from_doc(&doc)
}

pub fn extract_toc_from_doc(doc: &Document) -> Result<Vec<TocEntry>> {
    let catalog = doc
        .catalog()
        .with_context(|| "Failed to get document catalog")?;

    let outlines = match catalog.get(b"Outlines") {
        Ok(Object::Reference(r)) => match doc.get_dictionary(*r) {
            Ok(d) => d,
            Err(_) => return Ok(Vec::new()),
        },
        Ok(Object::Dictionary(d)) => d,
        _ => return Ok(Vec::new()),
    };

    let first_ref = match outlines.get(b"First") {
        Ok(Object::Reference(r)) => *r,
        _ => return Ok(Vec::new()),
    };

    let page_map = build_page_map(doc);
    let mut visited = HashSet::new();
    let entries = parse_outline_items(doc, first_ref, &page_map, TOP_LEVEL, &mut visited);
    debug!(items = visited.len(), "parsed outline");

    Ok(entries)
}

fn parse_outline_items(
    doc: &Document,
    first_id: ObjectId,
    page_map: &PageMap,
    level: u32,
    visited: &mut HashSet<ObjectId>,
) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    let mut current_id = Some(first_id);

    while let Some(id) = current_id {
        if !visited.insert(id) {
            warn!(?id, "outline item visited twice, stopping");
            break;
        }
        let dict = match doc.get_dictionary(id) {
            Ok(d) => d,
            Err(_) => break,
        };

        // UTF-8 titles keep their byte order mark after decoding
        let title = dict
            .get(b"Title")
            .and_then(decode_text_string)
            .map(|t| t.trim_start_matches('\u{FEFF}').to_string())
            .unwrap_or_else(|_| "Untitled".to_string());

        let page = get_destination_page(doc, dict, page_map);

        let children = match dict.get(b"First") {
            Ok(Object::Reference(child_ref)) => {
                parse_outline_items(doc, *child_ref, page_map, level + 1, visited)
            }
            _ => Vec::new(),
        };

        entries.push(TocEntry {
            title,
            page,
            level,
            children,
        });

        current_id = match dict.get(b"Next") {
            Ok(Object::Reference(r)) => Some(*r),
            _ => None,
        };
    }

    entries
}

fn get_destination_page(doc: &Document, dict: &Dictionary, page_map: &PageMap) -> Option<u32> {
    if let Ok(dest) = dict.get(b"Dest") {
        return resolve_destination(doc, dest, page_map, 0);
    }

    let action = match dict.get(b"A") {
        Ok(Object::Reference(r)) => doc.get_dictionary(*r).ok()?,
        Ok(Object::Dictionary(d)) => d,
        _ => return None,
    };
    match action.get(b"S") {
        Ok(Object::Name(kind)) if kind == b"GoTo" => {
            resolve_destination(doc, action.get(b"D").ok()?, page_map, 0)
        }
        _ => None,
    }
}

// Named destinations may point at further references; cap the chase.
const MAX_DEST_DEPTH: u8 = 8;

fn resolve_destination(
    doc: &Document,
    dest: &Object,
    page_map: &PageMap,
    depth: u8,
) -> Option<u32> {
    if depth > MAX_DEST_DEPTH {
        return None;
    }
    match dest {
        Object::String(name, _) | Object::Name(name) => {
            let target = find_named_destination(doc, name)?;
            resolve_destination(doc, target, page_map, depth + 1)
        }
        Object::Array(arr) => match arr.first() {
            Some(Object::Reference(page_ref)) => page_map.get(page_ref).copied(),
            _ => None,
        },
        // Named-destination values are sometimes wrapped as << /D [...] >>
        Object::Dictionary(d) => resolve_destination(doc, d.get(b"D").ok()?, page_map, depth + 1),
        Object::Reference(r) => {
            resolve_destination(doc, doc.get_object(*r).ok()?, page_map, depth + 1)
        }
        _ => None,
    }
}

fn find_named_destination<'a>(doc: &'a Document, name: &[u8]) -> Option<&'a Object> {
    let catalog = doc.catalog().ok()?;

    if let Ok(Object::Reference(names_ref)) = catalog.get(b"Names") {
        if let Ok(names_dict) = doc.get_dictionary(*names_ref) {
            if let Ok(Object::Reference(dests_ref)) = names_dict.get(b"Dests") {
                let mut seen = HashSet::new();
                if let Some(found) = search_name_tree(doc, *dests_ref, name, &mut seen) {
                    return Some(found);
                }
            }
        }
    }

    // Older PDFs keep a flat /Dests dictionary on the catalog
    if let Ok(Object::Reference(dests_ref)) = catalog.get(b"Dests") {
        if let Ok(dests_dict) = doc.get_dictionary(*dests_ref) {
            return dests_dict.get(name).ok();
        }
    }

    None
}

fn search_name_tree<'a>(
    doc: &'a Document,
    node_id: ObjectId,
    name: &[u8],
    seen: &mut HashSet<ObjectId>,
) -> Option<&'a Object> {
    if !seen.insert(node_id) {
        return None;
    }
    let dict = doc.get_dictionary(node_id).ok()?;

    if let Ok(Object::Array(names)) = dict.get(b"Names") {
        for pair in names.chunks_exact(2) {
            if let Object::String(key, _) = &pair[0] {
                if key == name {
                    return Some(&pair[1]);
                }
            }
        }
    }

    if let Ok(Object::Array(kids)) = dict.get(b"Kids") {
        for kid in kids {
            if let Object::Reference(kid_ref) = kid {
                if let Some(found) = search_name_tree(doc, *kid_ref, name, seen) {
                    return Some(found);
                }
            }
        }
    }

    None
}

fn build_page_map(doc: &Document) -> PageMap {
    doc.get_pages()
        .into_iter()
        .map(|(num, id)| (id, num))
        .collect()
}

/// Flatten TOC entries into a depth-first list, keeping each entry's level
pub fn flatten_toc(entries: &[TocEntry]) -> Vec<FlatTocEntry> {
    let mut result = Vec::new();
    flatten_toc_recursive(entries, &mut result);
    result
}

fn flatten_toc_recursive(entries: &[TocEntry], result: &mut Vec<FlatTocEntry>) {
    for entry in entries {
        result.push(FlatTocEntry {
            title: entry.title.clone(),
            page: entry.page,
            level: entry.level,
        });
        flatten_toc_recursive(&entry.children, result);
    }
}
