pub mod document;
pub mod toc;

#[doc(hidden)]
pub mod fixtures;

pub use document::PdfDocument;
