//! Split a PDF into one file per top-level outline chapter.
//!
//! The outline is read with [`pdf::toc`], resolved into [`Chapter`] page
//! spans by [`chapters::resolve_chapters`], and each span is written out by
//! [`split::split_chapters`] as `{stem}/{stem} - {title}.pdf` next to the
//! source file.

pub mod chapters;
pub mod error;
pub mod pdf;
pub mod selection;
pub mod split;

pub use chapters::{list_chapters, Chapter};
pub use error::SplitError;
pub use selection::parse_selection;
pub use split::{split_chapters, stdout_reporter, ChapterOutcome, SplitReport};
