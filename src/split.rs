//! Write each selected chapter of a PDF to its own file.

use crate::chapters::{load_chapters, Chapter, LoadedChapters};
use crate::error::{Result, SplitError};
use crate::pdf::PdfDocument;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened to one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChapterOutcome {
    Saved {
        title: String,
        path: PathBuf,
        start_page: u32,
        end_page: u32,
    },
    /// Nothing left of the page range after clamping to the document.
    Skipped {
        title: String,
        start_page: u32,
        end_page: u32,
    },
    Failed {
        title: String,
        path: PathBuf,
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub output_dir: PathBuf,
    pub outcomes: Vec<ChapterOutcome>,
}

impl SplitReport {
    pub fn files_created(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ChapterOutcome::Saved { .. }))
            .count()
    }
}

/// Reporter used when the caller has nowhere else to send progress lines.
pub fn stdout_reporter(line: &str) {
    println!("{}", line);
}

/// Split the PDF at `source` into one file per top-level chapter.
///
/// `selection` holds 0-based indices into the chapter list (as returned by
/// [`crate::list_chapters`]); indices past the end are ignored and `None`
/// selects every chapter. Files go to `{dir}/{stem}/{stem} - {title}.pdf`.
///
/// Every progress line, including the message for a fatal error, is passed
/// to `report`. A fatal error is also returned; per-chapter problems are
/// only reported and recorded in the [`SplitReport`].
pub fn split_chapters<P, F>(
    source: P,
    selection: Option<&BTreeSet<usize>>,
    mut report: F,
) -> Result<SplitReport>
where
    P: AsRef<Path>,
    F: FnMut(&str),
{
    let source = source.as_ref();
    let result = prepare(source, selection, &mut report);
    let (doc, chapters, output_dir, base_name) = match result {
        Ok(prepared) => prepared,
        Err(e) => {
            report(&format!("Error: {}", e));
            return Err(e);
        }
    };

    let total_pages = doc.page_count();
    let mut outcomes = Vec::with_capacity(chapters.len());
    for chapter in &chapters {
        let outcome = split_one(&doc, chapter, total_pages, &output_dir, &base_name);
        match &outcome {
            ChapterOutcome::Saved {
                path,
                start_page,
                end_page,
                ..
            } => {
                let relative = Path::new(&base_name).join(path.file_name().unwrap_or_default());
                report(&format!(
                    "Saved: {} (Pages {} to {})",
                    relative.display(),
                    start_page,
                    end_page
                ));
            }
            ChapterOutcome::Skipped {
                title,
                start_page,
                end_page,
            } => {
                warn!(%title, start_page, end_page, total_pages, "chapter has no pages");
                report(&format!(
                    "Skipping chapter '{}': invalid page range ({} to {})",
                    title, start_page, end_page
                ));
            }
            ChapterOutcome::Failed { path, error, .. } => {
                warn!(path = %path.display(), %error, "failed to write chapter");
                report(&format!("Error saving {}: {}", path.display(), error));
            }
        }
        outcomes.push(outcome);
    }

    let split = SplitReport {
        output_dir,
        outcomes,
    };
    let created = split.files_created();
    info!(source = %doc.path, created, "split finished");
    report(&format!("\nDone: {} file(s) created.", created));

    Ok(split)
}

type Prepared = (PdfDocument, Vec<Chapter>, PathBuf, String);

fn prepare<F: FnMut(&str)>(
    source: &Path,
    selection: Option<&BTreeSet<usize>>,
    report: &mut F,
) -> Result<Prepared> {
    let LoadedChapters {
        doc,
        mut chapters,
        unresolved,
    } = load_chapters(source)?;
    for title in &unresolved {
        report(&format!("Ignoring bookmark '{}': no target page", title));
    }

    if let Some(selected) = selection {
        chapters = chapters
            .into_iter()
            .enumerate()
            .filter(|(i, _)| selected.contains(i))
            .map(|(_, chapter)| chapter)
            .collect();
    }

    let base_name = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let parent = source
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let output_dir = parent.join(&base_name);

    if !output_dir.is_dir() {
        std::fs::create_dir_all(&output_dir).map_err(|source| SplitError::OutputDir {
            path: output_dir.clone(),
            source,
        })?;
        report(&format!("Created directory: {}", output_dir.display()));
    }

    Ok((doc, chapters, output_dir, base_name))
}

fn split_one(
    doc: &PdfDocument,
    chapter: &Chapter,
    total_pages: u32,
    output_dir: &Path,
    base_name: &str,
) -> ChapterOutcome {
    let Some(span) = chapter.page_span(total_pages) else {
        return ChapterOutcome::Skipped {
            title: chapter.title.clone(),
            start_page: chapter.start_page,
            end_page: chapter.end_page,
        };
    };

    let path = output_dir.join(chapter.file_name(base_name));
    debug!(title = %chapter.title, ?span, path = %path.display(), "extracting chapter");

    let written = doc
        .extract_page_range(span)
        .and_then(|mut new_doc| PdfDocument::save(&mut new_doc, &path));

    match written {
        Ok(()) => ChapterOutcome::Saved {
            title: chapter.title.clone(),
            path,
            start_page: chapter.start_page,
            end_page: chapter.end_page,
        },
        Err(e) => ChapterOutcome::Failed {
            title: chapter.title.clone(),
            path,
            error: format!("{:#}", e),
        },
    }
}
