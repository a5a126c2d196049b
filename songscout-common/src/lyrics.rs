//! Lyric text analysis
//!
//! Works on LRC-style text: `[mm:ss.xx]` timestamps are removed before
//! lines are inspected.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Upper bound on matches reported for a single lyric
pub const MAX_LYRIC_MATCHES: usize = 5;

static TIMESTAMP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d+:\d+\.\d+\]").expect("timestamp pattern is valid"));

/// Summary statistics computed from a lyric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricAnalysis {
    /// Number of non-blank lines
    pub lyric_lines: i64,
    /// Characters left after removing newlines and spaces
    pub word_count: i64,
    pub has_lyrics: bool,
}

/// One line of a lyric containing the searched text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricMatch {
    /// 1-based line number after timestamps are stripped
    pub line_number: usize,
    pub line_text: String,
    /// Character offset of the first occurrence within `line_text`
    pub start_pos: usize,
    /// Text at the match position, in the lyric's own casing
    pub match_text: String,
}

/// Remove `[mm:ss.xx]` timestamp tags
pub fn strip_timestamps(lyric: &str) -> String {
    TIMESTAMP_TAG.replace_all(lyric, "").into_owned()
}

/// Compute line and character statistics for a lyric
pub fn analyze_lyrics(lyric: &str) -> LyricAnalysis {
    let lyric_lines = lyric.split('\n').filter(|line| !line.trim().is_empty()).count();
    let word_count = lyric.chars().filter(|c| *c != '\n' && *c != ' ').count();

    LyricAnalysis {
        lyric_lines: lyric_lines as i64,
        word_count: word_count as i64,
        has_lyrics: !lyric.trim().is_empty(),
    }
}

/// Find lines of `lyric` containing `query`, ignoring case
///
/// Returns at most [`MAX_LYRIC_MATCHES`] matches, in line order.
pub fn find_lyric_matches(lyric: &str, query: &str) -> Vec<LyricMatch> {
    if lyric.is_empty() || query.is_empty() {
        return Vec::new();
    }

    let cleaned = strip_timestamps(lyric);
    let query_lower = query.to_lowercase();
    let query_len = query.chars().count();

    cleaned
        .trim()
        .split('\n')
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let start_pos = find_case_insensitive(line, &query_lower, query_len)?;
            Some(LyricMatch {
                line_number: index + 1,
                line_text: line.to_string(),
                start_pos,
                match_text: line.chars().skip(start_pos).take(query_len).collect(),
            })
        })
        .take(MAX_LYRIC_MATCHES)
        .collect()
}

/// Char offset of the first window of `line` whose lowercase form equals `needle_lower`
fn find_case_insensitive(line: &str, needle_lower: &str, needle_len: usize) -> Option<usize> {
    let chars: Vec<char> = line.chars().collect();
    if needle_len == 0 || chars.len() < needle_len {
        return None;
    }

    (0..=chars.len() - needle_len).find(|&start| {
        let window: String = chars[start..start + needle_len].iter().collect();
        window.to_lowercase() == needle_lower
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "[00:01.00]Hello darkness my old friend\n\
                          [00:05.20]\n\
                          [00:07.45]I've come to talk with you again\n\
                          [00:12.00]HELLO again";

    #[test]
    fn test_strip_timestamps_removes_tags_only() {
        assert_eq!(strip_timestamps("[01:02.33]line [x]"), "line [x]");
        assert_eq!(strip_timestamps("[1:2]kept"), "[1:2]kept");
    }

    #[test]
    fn test_find_matches_case_insensitive() {
        let matches = find_lyric_matches(SAMPLE, "hello");

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].line_number, 1);
        assert_eq!(matches[0].start_pos, 0);
        assert_eq!(matches[0].match_text, "Hello");
        assert_eq!(matches[1].line_number, 4);
        assert_eq!(matches[1].line_text, "HELLO again");
        assert_eq!(matches[1].match_text, "HELLO");
    }

    #[test]
    fn test_find_matches_reports_char_offsets() {
        let matches = find_lyric_matches("[00:00.00]故事的小黄花", "小黄花");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start_pos, 3);
        assert_eq!(matches[0].match_text, "小黄花");
    }

    #[test]
    fn test_find_matches_capped() {
        let lyric = (0..10).map(|i| format!("la la {}", i)).collect::<Vec<_>>().join("\n");
        assert_eq!(find_lyric_matches(&lyric, "la").len(), MAX_LYRIC_MATCHES);
    }

    #[test]
    fn test_find_matches_empty_inputs() {
        assert!(find_lyric_matches("", "x").is_empty());
        assert!(find_lyric_matches("x", "").is_empty());
        assert!(find_lyric_matches("short", "much longer query").is_empty());
    }

    #[test]
    fn test_analyze_lyrics_counts() {
        let analysis = analyze_lyrics("ab c\n\n  \nd e f\n");
        assert_eq!(analysis.lyric_lines, 2);
        assert_eq!(analysis.word_count, 6);
        assert!(analysis.has_lyrics);
    }

    #[test]
    fn test_analyze_blank_lyric() {
        let analysis = analyze_lyrics(" \n ");
        assert_eq!(analysis, LyricAnalysis { lyric_lines: 0, word_count: 0, has_lyrics: false });
    }
}
