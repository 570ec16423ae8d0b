//! Source line extraction with surrounding context.

use base64::Engine;
use serde::Serialize;

use crate::error::{EnrichmentError, Result};

/// Lines of context kept on each side of the target line.
pub const CONTEXT_LINES: usize = 5;

/// The target line and its context, each side newline-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpandedLine {
    pub content: String,
    pub before: String,
    pub after: String,
}

/// Extract line `line_number` (1-based) from `lines`, plus up to
/// [`CONTEXT_LINES`] lines before and after, clipped at the file edges.
pub fn expand_lines<S: AsRef<str>>(lines: &[S], line_number: i64) -> Result<ExpandedLine> {
    let out_of_range = || EnrichmentError::LineOutOfRange {
        line: line_number,
        len: lines.len(),
    };

    let idx = usize::try_from(line_number)
        .ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|&idx| idx < lines.len())
        .ok_or_else(out_of_range)?;

    let start = idx.saturating_sub(CONTEXT_LINES);
    let end = lines.len().min(idx + CONTEXT_LINES + 1);

    Ok(ExpandedLine {
        content: lines[idx].as_ref().to_string(),
        before: join(&lines[start..idx]),
        after: join(&lines[idx + 1..end]),
    })
}

fn join<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| line.as_ref())
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Decode base64 file content from the hosting API into text.
///
/// GitHub wraps base64 bodies at 60 columns, so whitespace is dropped first.
pub fn decode_content(path: &str, encoded: &str) -> Result<String> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| EnrichmentError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

    String::from_utf8(bytes).map_err(|e| EnrichmentError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINES: [&str; 21] = [
        "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "s", "v", "w",
        "x", "y", "z",
    ];

    #[test]
    fn test_expand_middle_line() {
        let expanded = expand_lines(&LINES, 7).unwrap();
        assert_eq!(expanded.content, "h");
        assert_eq!(expanded.before, "c\nd\ne\nf\ng");
        assert_eq!(expanded.after, "i\nj\nk\nl\nm");
    }

    #[test]
    fn test_expand_clips_at_file_start() {
        let expanded = expand_lines(&LINES, 2).unwrap();
        assert_eq!(expanded.content, "c");
        assert_eq!(expanded.before, "b");
        assert_eq!(expanded.after, "d\ne\nf\ng\nh");
    }

    #[test]
    fn test_expand_first_line_has_empty_before() {
        let expanded = expand_lines(&LINES, 1).unwrap();
        assert_eq!(expanded.content, "b");
        assert_eq!(expanded.before, "");
    }

    #[test]
    fn test_expand_last_line_has_empty_after() {
        let expanded = expand_lines(&LINES, 21).unwrap();
        assert_eq!(expanded.content, "z");
        assert_eq!(expanded.before, "s\nv\nw\nx\ny");
        assert_eq!(expanded.after, "");
    }

    #[test]
    fn test_expand_out_of_range() {
        for line in [0, -3, 22, 634] {
            let err = expand_lines(&LINES, line).unwrap_err();
            assert!(
                matches!(err, EnrichmentError::LineOutOfRange { len: 21, .. }),
                "line {line} should be out of range"
            );
        }
    }

    #[test]
    fn test_expand_single_line_file() {
        let expanded = expand_lines(&["console.log('hello world')"], 1).unwrap();
        assert_eq!(expanded.content, "console.log('hello world')");
        assert_eq!(expanded.before, "");
        assert_eq!(expanded.after, "");
    }

    #[test]
    fn test_decode_content() {
        let text = decode_content("/file.js", "Y29uc29sZS5sb2coJ2hlbGxvIHdvcmxkJyk=").unwrap();
        assert_eq!(text, "console.log('hello world')");
    }

    #[test]
    fn test_decode_content_with_line_wrapping() {
        let text = decode_content("/file.js", "Y29uc29sZS5sb2co\nJ2hlbGxvIHdvcmxkJyk=\n").unwrap();
        assert_eq!(text, "console.log('hello world')");
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = decode_content("/file.js", "not base64!").unwrap_err();
        assert!(matches!(err, EnrichmentError::Decode { .. }));
    }

    #[test]
    fn test_decode_non_utf8() {
        // base64 of bytes 0xff 0xfe
        let err = decode_content("/image.png", "//4=").unwrap_err();
        assert!(matches!(err, EnrichmentError::Decode { .. }));
    }
}
