use unicode_segmentation::UnicodeSegmentation;

/// Greedily wraps a single line so that no emitted line measures wider than
/// `max_width`.
///
/// Breaks happen at unicode word boundaries. A single unbreakable word wider
/// than `max_width` occupies its own line unmodified. Whitespace at a break
/// point is dropped from the end of the finished line and from the start of
/// the continuation. Empty input yields no lines.
pub fn wrap_line<'a>(
    text: &'a str,
    max_width: f32,
    measure: impl Fn(&str) -> f32,
) -> Vec<&'a str> {
    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_end = 0;
    let mut cursor = 0;

    for word in text.split_word_bounds() {
        let seg_end = cursor + word.len();
        let candidate = text[line_start..seg_end].trim_end();

        if measure(candidate) <= max_width {
            line_end = seg_end;
        } else if line_start == cursor {
            // unbreakable word wider than the limit: emit as its own line
            lines.push(&text[cursor..seg_end]);
            line_start = seg_end;
            line_end = seg_end;
        } else {
            let finished = text[line_start..line_end].trim_end();
            if !finished.is_empty() {
                lines.push(finished);
            }
            if word.chars().all(char::is_whitespace) {
                // whitespace at the break point is dropped
                line_start = seg_end;
                line_end = seg_end;
            } else {
                line_start = cursor;
                line_end = seg_end;
            }
        }

        cursor = seg_end;
    }

    let tail = text[line_start..line_end].trim_end();
    if !tail.is_empty() {
        lines.push(tail);
    }
    lines
}

/// Wraps multi-line text: hard newlines are preserved, each hard line is
/// word-wrapped independently. An empty hard line yields one empty output
/// line so blank rows survive.
pub fn wrap_text<'a>(
    text: &'a str,
    max_width: f32,
    measure: impl Fn(&str) -> f32,
) -> Vec<&'a str> {
    let mut lines = Vec::new();
    for hard_line in text.lines() {
        let wrapped = wrap_line(hard_line, max_width, &measure);
        if wrapped.is_empty() {
            lines.push("");
        } else {
            lines.extend(wrapped);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    // fixed-advance measure: 10 units per char
    fn measure(s: &str) -> f32 {
        s.chars().count() as f32 * 10.0
    }

    #[test]
    fn no_line_exceeds_the_limit() {
        let text = "the quick brown fox jumps over the lazy dog";
        for max in [30.0, 50.0, 100.0, 200.0] {
            for line in wrap_line(text, max, measure) {
                assert!(
                    measure(line) <= max,
                    "line {line:?} measures {} > {max}",
                    measure(line)
                );
            }
        }
    }

    #[test]
    fn wrapped_lines_roundtrip_content() {
        let text = "alpha beta gamma delta";
        let lines = wrap_line(text, 110.0, measure);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn unbreakable_word_gets_its_own_line() {
        let lines = wrap_line("hi incomprehensibilities yo", 100.0, measure);
        assert_eq!(lines, vec!["hi", "incomprehensibilities", "yo"]);
        // the oversized word is emitted unmodified
        assert!(measure(lines[1]) > 100.0);
    }

    #[test]
    fn fits_on_one_line() {
        assert_eq!(wrap_line("short", 1000.0, measure), vec!["short"]);
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(wrap_line("", 100.0, measure).is_empty());
    }

    #[test]
    fn hard_newlines_are_preserved() {
        let lines = wrap_text("one two\n\nthree", 1000.0, measure);
        assert_eq!(lines, vec!["one two", "", "three"]);
    }

    #[test]
    fn whitespace_at_breaks_is_dropped() {
        let lines = wrap_line("aaaa  bbbb", 40.0, measure);
        assert_eq!(lines, vec!["aaaa", "bbbb"]);
    }
}
