//! CJK-aware cell text wrapping.
//!
//! Widths are measured in terminal-style columns: East Asian wide and
//! fullwidth characters occupy two units, everything else one.

use unicode_width::UnicodeWidthChar;

/// Per-cell character budget for a table with `max_columns` columns.
///
/// Integer division of `budget` by the column count, floored at `min_length`.
pub fn wrap_length(max_columns: usize, budget: usize, min_length: usize) -> usize {
    (budget / max_columns.max(1)).max(min_length)
}

/// Display width of a single character.
pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Display width of a string.
pub fn text_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Wrap `text` so that no line is wider than `width` units.
///
/// The text is stripped and whitespace runs collapse to single spaces. Words
/// are kept whole when they fit; longer words are split at character
/// boundaries. Lines are joined with `\n`.
pub fn wrap_text(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_width = 0usize;

    for word in text.split_whitespace() {
        let word_width = text_width(word);
        let sep = usize::from(!line.is_empty());

        if line_width + sep + word_width <= width {
            if sep == 1 {
                line.push(' ');
            }
            line.push_str(word);
            line_width += sep + word_width;
            continue;
        }

        if word_width <= width {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line_width = word_width;
            continue;
        }

        // Long word: fill the current line first, then hard-break.
        if !line.is_empty() {
            line.push(' ');
            line_width += 1;
        }
        for c in word.chars() {
            let cw = char_width(c);
            if line_width + cw > width && line_width > 0 {
                lines.push(std::mem::take(&mut line).trim_end().to_string());
                line_width = 0;
            }
            line.push(c);
            line_width += cw;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}
