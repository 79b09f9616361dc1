//! Chapter boundaries derived from the top-level outline entries.

use crate::error::{Result, SplitError};
use anyhow::Context;
use crate::pdf::toc::{extract_toc_from_doc, flatten_toc, FlatTocEntry, TOP_LEVEL};
use crate::pdf::PdfDocument;
use regex::Regex;
use serde::Serialize;
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

static FORBIDDEN_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("valid regex"));

/// A top-level outline entry and the 1-based, inclusive pages it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub title: String,
    pub start_page: u32,
    pub end_page: u32,
}

impl Chapter {
    pub fn new(title: impl Into<String>, start_page: u32, end_page: u32) -> Self {
        Chapter {
            title: title.into(),
            start_page,
            end_page,
        }
    }

    /// Pages to copy once clamped to the document, or `None` if nothing is left.
    pub fn page_span(&self, total_pages: u32) -> Option<RangeInclusive<u32>> {
        let start = self.start_page.max(1);
        let end = self.end_page.min(total_pages);
        (start <= end).then_some(start..=end)
    }

    /// `{base_name} - {sanitized title}.pdf`
    pub fn file_name(&self, base_name: &str) -> String {
        format!("{} - {}.pdf", base_name, sanitize_title(&self.title))
    }
}

/// Strip characters that are not allowed in file names and trim whitespace.
pub fn sanitize_title(title: &str) -> String {
    FORBIDDEN_CHARS.replace_all(title, "").trim().to_string()
}

/// Turn a flattened outline into chapters, one per top-level entry.
///
/// Each chapter ends one page before the next top-level entry starts; the
/// last one runs to `total_pages`. Order follows the outline, not page
/// numbers.
pub fn resolve_chapters(entries: &[FlatTocEntry], total_pages: u32) -> Vec<Chapter> {
    let top_level: Vec<(&str, u32)> = entries
        .iter()
        .filter(|e| e.level == TOP_LEVEL)
        .filter_map(|e| match e.page {
            Some(page) => Some((e.title.as_str(), page)),
            None => {
                warn!(title = %e.title, "top-level outline entry has no target page");
                None
            }
        })
        .collect();

    let mut chapters = Vec::with_capacity(top_level.len());
    let mut iter = top_level.iter().peekable();
    while let Some(&(title, start_page)) = iter.next() {
        let end_page = match iter.peek() {
            Some(&&(_, next_start)) => next_start.saturating_sub(1),
            None => total_pages,
        };
        chapters.push(Chapter::new(title, start_page, end_page));
    }
    chapters
}

/// An opened PDF with its chapters.
pub struct LoadedChapters {
    pub doc: PdfDocument,
    pub chapters: Vec<Chapter>,
    /// Titles of top-level bookmarks whose target page could not be found.
    pub unresolved: Vec<String>,
}

/// Open `path` and resolve its chapters, failing on anything that should
/// stop a split before it starts.
pub fn load_chapters(path: &Path) -> Result<LoadedChapters> {
    if !path.exists() {
        return Err(SplitError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let doc = PdfDocument::open(path).map_err(|source| SplitError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let toc = extract_toc_from_doc(&doc.doc)
        .with_context(|| format!("Failed to read outline: {}", path.display()))
        .map_err(|source| SplitError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let entries = flatten_toc(&toc);
    let chapters = resolve_chapters(&entries, doc.page_count());
    if chapters.is_empty() {
        return Err(SplitError::NoChapters {
            path: path.to_path_buf(),
        });
    }

    let unresolved = entries
        .into_iter()
        .filter(|e| e.level == TOP_LEVEL && e.page.is_none())
        .map(|e| e.title)
        .collect();

    debug!(path = %doc.path, chapters = chapters.len(), "resolved chapters");
    Ok(LoadedChapters {
        doc,
        chapters,
        unresolved,
    })
}

/// Chapters of the PDF at `path`, or an empty list if it cannot be read or
/// has no top-level outline entries.
pub fn list_chapters<P: AsRef<Path>>(path: P) -> Vec<Chapter> {
    match load_chapters(path.as_ref()) {
        Ok(loaded) => loaded.chapters,
        Err(e) => {
            debug!(path = %path.as_ref().display(), error = %e, "no chapters listed");
            Vec::new()
        }
    }
}
