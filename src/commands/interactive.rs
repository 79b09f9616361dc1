//! Prompt for a file, show its chapters, and split the ones picked.

use anyhow::Result;
use chaptersplit::{list_chapters, parse_selection, split_chapters};
use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::warn;

pub fn run<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<bool> {
    let Some(line) = prompt(&mut input, &mut output, "PDF file: ")? else {
        return Ok(false);
    };
    // Paths dragged into a terminal often arrive quoted
    let path = PathBuf::from(line.trim_matches(|c| c == '"' || c == '\''));
    if path.as_os_str().is_empty() {
        writeln!(output, "No file selected.")?;
        return Ok(false);
    }

    let chapters = list_chapters(&path);
    if chapters.is_empty() {
        writeln!(
            output,
            "No table of contents found, or it has no top-level chapters."
        )?;
        return Ok(false);
    }

    writeln!(output, "Found {} chapters:", chapters.len())?;
    for (i, chapter) in chapters.iter().enumerate() {
        writeln!(
            output,
            "{:>3}. {} (P.{} ~ P.{})",
            i + 1,
            chapter.title,
            chapter.start_page,
            chapter.end_page
        )?;
    }

    let Some(selection) = read_selection(&mut input, &mut output, chapters.len())? else {
        return Ok(false);
    };

    writeln!(output, "\nStarting split...")?;
    let result = split_chapters(&path, Some(&selection), |line| {
        if let Err(e) = writeln!(output, "{}", line) {
            warn!(error = %e, "failed to write progress line");
        }
    });
    if result.is_ok() {
        writeln!(output, "Split complete.")?;
    }

    Ok(result.is_ok())
}

fn read_selection<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    count: usize,
) -> Result<Option<BTreeSet<usize>>> {
    loop {
        let Some(line) = prompt(input, output, "Chapters to split [all]: ")? else {
            return Ok(None);
        };
        match parse_selection(&line, count) {
            Ok(selection) if selection.is_empty() => {
                writeln!(output, "Select at least one chapter.")?;
            }
            Ok(selection) => return Ok(Some(selection)),
            Err(e) => writeln!(output, "Invalid selection: {}", e)?,
        }
    }
}

/// `None` on end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    text: &str,
) -> Result<Option<String>> {
    write!(output, "{}", text)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
