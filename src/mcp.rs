use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use chaptersplit::pdf::toc::{extract_toc, flatten_toc};
use chaptersplit::{list_chapters, split_chapters, ChapterOutcome};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitChaptersRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(
        description = "0-based indices into the list returned by pdf_chapters (default: all chapters)"
    )]
    #[serde(default)]
    pub chapters: Option<Vec<usize>>,
}

#[derive(Debug, Clone)]
pub struct ChapterServer {
    tool_router: ToolRouter<Self>,
}

impl ChapterServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for ChapterServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl ChapterServer {
    #[tool(description = "Get the table of contents (bookmarks/outlines) from a PDF as structured data. Level 1 entries are chapters.")]
    fn pdf_toc(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match extract_toc(&path) {
            Ok(entries) => {
                let result: Vec<TocEntryResult> = flatten_toc(&entries)
                    .into_iter()
                    .map(|e| TocEntryResult {
                        title: e.title,
                        page: e.page,
                        level: e.level,
                    })
                    .collect();
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "List the top-level chapters of a PDF with their 1-based inclusive page ranges. Returns an empty list if the file cannot be read or has no top-level bookmarks.")]
    fn pdf_chapters(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        let result: Vec<ChapterResult> = list_chapters(&path)
            .into_iter()
            .enumerate()
            .map(|(index, c)| ChapterResult {
                index,
                title: c.title,
                start_page: c.start_page,
                end_page: c.end_page,
            })
            .collect();
        serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
    }

    #[tool(description = "Split a PDF into one file per top-level chapter, written to a folder named after the PDF next to it. Optionally restrict to chapter indices from pdf_chapters.")]
    fn pdf_split_chapters(&self, Parameters(req): Parameters<PdfSplitChaptersRequest>) -> String {
        let selection: Option<BTreeSet<usize>> = req.chapters.map(|c| c.into_iter().collect());

        let mut log = Vec::new();
        let report = match split_chapters(&req.path, selection.as_ref(), |line| {
            log.push(line.trim_start().to_string())
        }) {
            Ok(report) => report,
            Err(e) => return format!("Error: {}", e),
        };

        let result = SplitChaptersResult {
            output_dir: report.output_dir.clone(),
            files_created: report.files_created(),
            files: report
                .outcomes
                .iter()
                .filter_map(|o| match o {
                    ChapterOutcome::Saved { path, .. } => Some(path.clone()),
                    _ => None,
                })
                .collect(),
            log,
        };
        serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TocEntryResult {
    pub title: String,
    pub page: Option<u32>,
    pub level: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ChapterResult {
    pub index: usize,
    pub title: String,
    pub start_page: u32,
    pub end_page: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SplitChaptersResult {
    pub output_dir: PathBuf,
    pub files_created: usize,
    pub files: Vec<PathBuf>,
    pub log: Vec<String>,
}

#[tool_handler]
impl ServerHandler for ChapterServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Split PDFs by chapter. Use pdf_toc to inspect bookmarks, pdf_chapters to see \
                 the chapters and page ranges a split would produce, and pdf_split_chapters to \
                 write one PDF per chapter."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = ChapterServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaptersplit::pdf::fixtures::{write_pdf, Outline};

    #[test]
    fn test_chapters_of_missing_file_is_empty_list() {
        let server = ChapterServer::new();
        let out = server.pdf_chapters(Parameters(PathRequest {
            path: "/nonexistent/book.pdf".to_string(),
        }));
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_split_missing_file_reports_error() {
        let server = ChapterServer::new();
        let out = server.pdf_split_chapters(Parameters(PdfSplitChaptersRequest {
            path: "/nonexistent/book.pdf".to_string(),
            chapters: None,
        }));
        assert_eq!(out, "Error: File not found - /nonexistent/book.pdf");
    }

    #[test]
    fn test_chapters_and_split_on_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(
            dir.path(),
            "book.pdf",
            10,
            &[
                Outline::new("Intro", 1),
                Outline::new("Body", 4),
                Outline::new("Appendix", 8),
            ],
        )
        .unwrap();
        let path = path.display().to_string();
        let server = ChapterServer::new();

        let chapters: Vec<ChapterResult> = serde_json::from_str(&server.pdf_chapters(
            Parameters(PathRequest { path: path.clone() }),
        ))
        .unwrap();
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[1].title, "Body");
        assert_eq!((chapters[1].start_page, chapters[1].end_page), (4, 7));

        let out = server.pdf_split_chapters(Parameters(PdfSplitChaptersRequest {
            path,
            chapters: Some(vec![1]),
        }));
        let result: SplitChaptersResult = serde_json::from_str(&out).unwrap();
        let body = dir.path().join("book").join("book - Body.pdf");
        assert_eq!(result.files_created, 1);
        assert_eq!(result.files, vec![body.clone()]);
        assert!(body.exists());
        assert_eq!(result.log.last().unwrap(), "Done: 1 file(s) created.");
    }
}
