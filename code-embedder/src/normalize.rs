//! Text normalization applied to file content before it reaches the encoder.
//!
//! Keeps code layout intact while dropping noise that only costs tokens.

use tracing::debug;

/// Normalize code text with minimal layout disruption.
///
/// - Strips a leading UTF-8 byte order mark.
/// - Trims trailing whitespace on each line (CRLF endings become LF).
/// - Collapses runs of blank lines into a single one and drops leading blanks.
/// - Stops once `max_chars` characters are reached; a line that does not fit
///   is cut at a character boundary.
pub fn normalize_code_light(s: &str, max_chars: usize) -> String {
    debug!("normalize_code_light: input_len={}", s.len());

    let s = s.strip_prefix('\u{feff}').unwrap_or(s);
    let mut out = String::with_capacity(s.len().min(max_chars));
    let mut used = 0usize;
    let mut blank_run = 1usize;

    for line in s.lines() {
        let line = line.trim_end();

        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }

        let line_chars = line.chars().count();
        if used + line_chars + 1 > max_chars {
            let room = max_chars.saturating_sub(used);
            out.extend(line.chars().take(room));
            break;
        }

        out.push_str(line);
        out.push('\n');
        used += line_chars + 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_collapses_blank_lines() {
        let src = "\u{feff}\n\nclass A {   \r\n\r\n\r\n    int x;\t\n}\n";
        assert_eq!(normalize_code_light(src, 1000), "class A {\n\n    int x;\n}\n");
    }

    #[test]
    fn caps_output_in_characters() {
        let src = "ąęść\nżółw\n";
        let out = normalize_code_light(src, 7);
        assert_eq!(out, "ąęść\nżó");
        assert_eq!(out.chars().count(), 7);
    }

    #[test]
    fn oversize_first_line_is_truncated_not_dropped() {
        let src = "x".repeat(50);
        assert_eq!(normalize_code_light(&src, 10), "x".repeat(10));
    }

    #[test]
    fn blank_input_stays_blank() {
        assert!(normalize_code_light(" \n\t\n", 100).trim().is_empty());
    }
}
