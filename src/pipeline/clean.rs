//! Normalization of raw OCR text.
//!
//! Tesseract output for CJK game UI is littered with zero-width characters,
//! stray control bytes and phantom single spaces between glyphs. The cleanup
//! is order-sensitive and idempotent: cleaning already-clean text is a no-op.

use regex::Regex;
use std::sync::OnceLock;

fn newline_spaces_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" *\n *").unwrap())
}

/// Cleans raw OCR text. Steps, in order:
/// 1. remove zero-width characters and BOM;
/// 2. remove control characters except newlines;
/// 3. collapse isolated single spaces (runs of two or more are kept);
/// 4. normalize CR/CRLF to LF;
/// 5. strip spaces adjacent to newlines;
/// 6. trim outer whitespace.
pub fn clean_text(raw: &str) -> String {
    let text: String = raw
        .chars()
        .filter(|&c| !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .filter(|&c| !c.is_control() || c == '\n' || c == '\r')
        .collect();

    let text = drop_isolated_spaces(&text);
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = newline_spaces_re().replace_all(&text, "\n");

    text.trim().to_string()
}

/// Removes every space whose neighbours are both non-spaces. CJK text has no
/// word spacing, so an isolated space is always an OCR artifact; space runs
/// are kept because they can be deliberate column separation.
fn drop_isolated_spaces(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev_is_space = i > 0 && chars[i - 1] == ' ';
            let next_is_space = chars.get(i + 1) == Some(&' ');
            if !prev_is_space && !next_is_space {
                continue;
            }
        }
        out.push(c);
    }
    out
}
