use anyhow::{anyhow, Result};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChapterRef {
    Number(usize),
    End,
}

/// One comma-separated piece of a selection: `3`, `2-5`, `4-end` or `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChapterRange {
    start: ChapterRef,
    end: Option<ChapterRef>,
}

impl ChapterRange {
    fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow!("Empty chapter range"));
        }

        match s.split_once('-') {
            Some(("", _)) => Err(anyhow!("Invalid chapter range: {}", s)),
            Some((start, end)) => Ok(ChapterRange {
                start: parse_chapter_ref(start)?,
                end: Some(parse_chapter_ref(end)?),
            }),
            None => Ok(ChapterRange {
                start: parse_chapter_ref(s)?,
                end: None,
            }),
        }
    }

    /// 0-based indices below `count` covered by this range.
    fn indices(&self, count: usize) -> Result<impl Iterator<Item = usize>> {
        let resolve = |r: ChapterRef| match r {
            ChapterRef::Number(n) => n,
            ChapterRef::End => count,
        };
        let start = resolve(self.start);
        let end = self.end.map(resolve).unwrap_or(start);

        if self.start == ChapterRef::Number(0) || self.end == Some(ChapterRef::Number(0)) {
            return Err(anyhow!("Chapter numbers must be >= 1"));
        }
        if start <= count && start > end {
            return Err(anyhow!("Descending chapter range: {}-{}", start, end));
        }

        // Numbers past the last chapter select nothing
        Ok((start.max(1)..=end.min(count)).map(|n| n - 1))
    }
}

fn parse_chapter_ref(s: &str) -> Result<ChapterRef> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("end") {
        Ok(ChapterRef::End)
    } else {
        s.parse::<usize>()
            .map(ChapterRef::Number)
            .map_err(|_| anyhow!("Invalid chapter number: {}", s))
    }
}

/// Parse a selection like "1-3,5,7-end" (1-based, as chapters are listed)
/// into 0-based chapter indices. `all` or an empty string selects every
/// chapter.
pub fn parse_selection(s: &str, count: usize) -> Result<BTreeSet<usize>> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("all") {
        return Ok((0..count).collect());
    }

    let mut selected = BTreeSet::new();
    for part in s.split(',') {
        selected.extend(ChapterRange::parse(part)?.indices(count)?);
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(indices: &[usize]) -> BTreeSet<usize> {
        indices.iter().copied().collect()
    }

    #[test]
    fn test_single_chapter() {
        assert_eq!(parse_selection("2", 3).unwrap(), set(&[1]));
    }

    #[test]
    fn test_chapter_range() {
        assert_eq!(parse_selection("1-3", 5).unwrap(), set(&[0, 1, 2]));
    }

    #[test]
    fn test_end_keyword() {
        assert_eq!(parse_selection("3-end", 5).unwrap(), set(&[2, 3, 4]));
        assert_eq!(parse_selection("end", 5).unwrap(), set(&[4]));
    }

    #[test]
    fn test_all() {
        assert_eq!(parse_selection("all", 3).unwrap(), set(&[0, 1, 2]));
        assert_eq!(parse_selection("  ", 2).unwrap(), set(&[0, 1]));
    }

    #[test]
    fn test_comma_separated_merges() {
        assert_eq!(parse_selection("4, 1-2 ,2", 5).unwrap(), set(&[0, 1, 3]));
    }

    #[test]
    fn test_out_of_range_ignored() {
        assert_eq!(parse_selection("2,9", 3).unwrap(), set(&[1]));
        assert_eq!(parse_selection("2-9", 3).unwrap(), set(&[1, 2]));
        assert!(parse_selection("7", 3).unwrap().is_empty());
    }

    #[test]
    fn test_invalid() {
        assert!(parse_selection("0", 3).is_err());
        assert!(parse_selection("-2", 3).is_err());
        assert!(parse_selection("3-1", 3).is_err());
        assert!(parse_selection("one", 3).is_err());
        assert!(parse_selection("1,,2", 3).is_err());
    }
}
