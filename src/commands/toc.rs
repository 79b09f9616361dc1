use anyhow::Result;
use chaptersplit::pdf::toc::{extract_toc, flatten_toc, TOP_LEVEL};
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let entries = extract_toc(&path)?;

    if entries.is_empty() {
        println!("No table of contents found.");
        return Ok(());
    }

    for entry in flatten_toc(&entries) {
        let indent = "  ".repeat((entry.level - TOP_LEVEL) as usize);
        let page_str = entry
            .page
            .map(|p| format!(" (p. {})", p))
            .unwrap_or_default();
        println!("{}{}{}", indent, entry.title, page_str);
    }

    Ok(())
}
