use anyhow::{Context, Result};
use chaptersplit::list_chapters;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P, json: bool) -> Result<()> {
    let chapters = list_chapters(&path);

    if json {
        let out = serde_json::to_string_pretty(&chapters).context("Failed to serialize chapters")?;
        println!("{}", out);
        return Ok(());
    }

    if chapters.is_empty() {
        println!("No table of contents found, or it has no top-level chapters.");
        return Ok(());
    }

    println!("Found {} chapters:", chapters.len());
    for (i, chapter) in chapters.iter().enumerate() {
        println!(
            "{:>3}. {} (P.{} ~ P.{})",
            i + 1,
            chapter.title,
            chapter.start_page,
            chapter.end_page
        );
    }

    Ok(())
}
