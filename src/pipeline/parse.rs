//! Converts cleaned OCR text into a typed `Item` record.
//!
//! Layout of a full item text block: name line, cost line, two main-stat
//! lines, then the sub-stat lines. Every stat line is split into a value
//! (percentage preferred over bare integer) and a label fragment, and the
//! fragment is resolved against the closed vocabulary with a cascade of
//! exact/substring/positional-similarity matching. This stage never fails:
//! anything unrecoverable becomes an empty field for the validator to flag.

use regex::Regex;
use std::sync::OnceLock;

use crate::item::{CostTier, Item, StatEntry, UNIDENTIFIED_PLACEHOLDER, UNIDENTIFIED_SENTINEL};
use crate::vocab::LabelVocabulary;

fn percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{1,3}\.\d+%|\d{1,3}%").unwrap())
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // 4 digits because the HP main-status-2 value goes that high
    RE.get_or_init(|| Regex::new(r"\d{2,4}").unwrap())
}

fn cost_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)cost(\d)").unwrap())
}

fn value_charset_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Keep CJK ranges, Latin letters/digits, '.' and '%'
    RE.get_or_init(|| {
        Regex::new(r"[^\u{4E00}-\u{9FAF}\u{3040}-\u{309F}\u{30A0}-\u{30FF}a-zA-Z0-9.%]").unwrap()
    })
}

fn name_trailer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // OCR tacks 1-3 stray punctuation/symbol characters onto name lines
    RE.get_or_init(|| Regex::new(r"[\s\p{P}\p{S}@]{1,3}$").unwrap())
}

fn enhancement_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+\d+").unwrap())
}

fn bare_percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)%$").unwrap())
}

/// Parser over one slot's cleaned OCR text.
pub struct OcrParser<'a> {
    vocab: &'a LabelVocabulary,
}

impl<'a> OcrParser<'a> {
    pub fn new(vocab: &'a LabelVocabulary) -> Self {
        Self { vocab }
    }

    /// Parses cleaned text into an `Item`. Absent or garbled lines yield
    /// empty fields, never an error.
    pub fn parse(&self, text: &str) -> Item {
        let mut item = Item::new();
        let mut lines: Vec<String> = text
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if lines.is_empty() {
            return item;
        }

        let is_unidentified = lines[0].starts_with(UNIDENTIFIED_SENTINEL);
        item.name = if is_unidentified {
            UNIDENTIFIED_PLACEHOLDER.to_string()
        } else {
            name_trailer_re().replace(&lines[0], "").to_string()
        };

        if let Some(cost_line) = lines.get(1) {
            if let Some(caps) = cost_re().captures(cost_line) {
                let digit = caps[1].chars().next().unwrap_or('0');
                item.cost = CostTier::from_digit(digit);
            }
        }

        // Enhancement-level markers ("+21") sit between the cost line and the
        // stat block; drop them before locating the main-status lines.
        lines.retain(|line| !enhancement_marker_re().is_match(line));

        // OCR wraps the first stat value onto its own line for unidentified
        // items; merge it back before reading main-status-1.
        if is_unidentified && lines.len() > 3 {
            let merged = format!("{}{}", lines[2], lines[3]);
            lines[2] = merged;
            lines.remove(3);
        }

        item.main_status_1 = lines.get(2).map(|l| self.parse_stat_line(l)).unwrap_or_default();
        item.main_status_2 = lines.get(3).map(|l| self.parse_stat_line(l)).unwrap_or_default();

        if item.cost == CostTier::Unknown {
            item.cost = CostTier::infer_from_main2(&item.main_status_2.value);
        }
        item.apply_cost_defaults();

        // The game shows whole-percent main stats without the decimal.
        if item.main_status_1.value.ends_with(".0%") {
            item.main_status_1.value = item
                .main_status_1
                .value
                .trim_end_matches(".0%")
                .to_string()
                + "%";
        }

        let sub_start = lines.len().saturating_sub(5);
        for (i, line) in lines[sub_start..].iter().take(5).enumerate() {
            let mut entry = self.parse_stat_line(line);
            // Sub-stat percentages always carry one decimal in-game.
            if let Some(caps) = bare_percent_re().captures(&entry.value) {
                entry.value = format!("{}.0%", &caps[1]);
            }
            item.sub_status[i] = entry;
        }

        item
    }

    /// Splits a stat line into value and label fragment, resolving the
    /// fragment to a canonical label.
    fn parse_stat_line(&self, line: &str) -> StatEntry {
        let value = extract_value(line);
        let fragment = if value.is_empty() {
            line.to_string()
        } else {
            line.replacen(&value, "", 1)
        };
        StatEntry::new(self.resolve_label(&fragment), value)
    }

    /// Resolves an OCR label fragment to a vocabulary label. Total: every
    /// input maps to some label.
    ///
    /// Cascade: attack/defense special cases, then substring containment
    /// (vocabulary scanned from the end so compound labels win), then the
    /// same with the fragment's first character dropped (a common OCR
    /// leftover), then positional-similarity fallback.
    pub fn resolve_label(&self, fragment: &str) -> String {
        if fragment.contains("攻撃") && !fragment.contains("ダメージアップ") {
            return "攻撃力".to_string();
        }
        if fragment.contains("防御") {
            return "防御力".to_string();
        }

        let stripped: String = fragment.chars().filter(|&c| c != '・' && c != '%').collect();

        for label in self.vocab.resolution.iter().rev() {
            if stripped.contains(label.as_str()) {
                return label.clone();
            }
        }

        let dropped: String = stripped.chars().skip(1).collect();
        if !dropped.is_empty() {
            for label in self.vocab.resolution.iter().rev() {
                if label.contains(&dropped) {
                    return label.clone();
                }
            }
        }

        self.closest_label(&stripped)
    }

    /// Position-wise character match ratio against every label; highest
    /// score wins, ties broken by first-encountered. Crude on purpose: the
    /// vocabulary is small and the misreads are positional.
    fn closest_label(&self, fragment: &str) -> String {
        let mut best = self.vocab.resolution.first().cloned().unwrap_or_default();
        let mut best_score = 0.0f32;
        for label in &self.vocab.resolution {
            let score = similarity(fragment, label);
            if score > best_score {
                best_score = score;
                best = label.clone();
            }
        }
        best
    }
}

/// Ratio of characters matching at identical indices over the longer length.
fn similarity(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len()).max(1);
    let matches = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    matches as f32 / longest as f32
}

/// Extracts the value substring of a stat line: strips everything outside
/// CJK/Latin/digits/`.`/`%`, then prefers a percentage over a 2-4 digit
/// bare integer.
pub fn extract_value(line: &str) -> String {
    let filtered = value_charset_re().replace_all(line, "");
    if let Some(m) = percent_re().find(&filtered) {
        return m.as_str().to_string();
    }
    if let Some(m) = number_re().find(&filtered) {
        return m.as_str().to_string();
    }
    String::new()
}
