use anyhow::Result;
use chaptersplit::{list_chapters, parse_selection, split_chapters, stdout_reporter};
use std::path::Path;

/// Split `path` non-interactively. Returns `false` if the split could not
/// start; the reason has already been printed.
pub fn run<P: AsRef<Path>>(path: P, chapters: Option<&str>) -> Result<bool> {
    let path = path.as_ref();

    let selection = match chapters {
        Some(spec) => Some(parse_selection(spec, list_chapters(path).len())?),
        None => None,
    };

    Ok(split_chapters(path, selection.as_ref(), stdout_reporter).is_ok())
}
