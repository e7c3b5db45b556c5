//! Closed label vocabularies for stat lines.
//!
//! A label is only valid relative to the slot it occupies: the two main-stat
//! lines and the sub-stat lines each have their own permitted set. The
//! resolution list is the union the parser matches OCR fragments against; it
//! is ordered ascending by specificity because resolution scans it from the
//! end (compound labels must win over their prefixes, e.g. クリティカルダメージ
//! over クリティカル).

/// Permitted labels for main-status-1.
pub const MAIN_STATUS_1_LABELS: &[&str] = &[
    "クリティカル",
    "クリティカルダメージ",
    "HP",
    "攻撃力",
    "防御力",
    "共鳴効率",
    "HP回復効果アップ",
    "凝縮ダメージアップ",
    "焦熱ダメージアップ",
    "電導ダメージアップ",
    "気動ダメージアップ",
    "回折ダメージアップ",
    "消滅ダメージアップ",
];

/// Permitted labels for main-status-2.
pub const MAIN_STATUS_2_LABELS: &[&str] = &["HP", "攻撃力"];

/// Permitted labels for the five sub-status lines.
pub const SUB_STATUS_LABELS: &[&str] = &[
    "クリティカル",
    "クリティカルダメージ",
    "HP",
    "攻撃力",
    "防御力",
    "共鳴効率",
    "通常攻撃ダメージアップ",
    "重撃ダメージアップ",
    "共鳴スキルダメージアップ",
    "共鳴解放ダメージアップ",
];

/// Full resolution list, least specific first (scanned back to front).
pub const RESOLUTION_LABELS: &[&str] = &[
    "HP",
    "攻撃力",
    "防御力",
    "共鳴効率",
    "クリティカル",
    "クリティカルダメージ",
    "HP回復効果アップ",
    "通常攻撃ダメージアップ",
    "重撃ダメージアップ",
    "共鳴スキルダメージアップ",
    "共鳴解放ダメージアップ",
    "凝縮ダメージアップ",
    "焦熱ダメージアップ",
    "電導ダメージアップ",
    "気動ダメージアップ",
    "回折ダメージアップ",
    "消滅ダメージアップ",
];

/// The three slot vocabularies plus the parser's resolution list, injected
/// into the parser and validator at construction.
#[derive(Clone, Debug)]
pub struct LabelVocabulary {
    pub main1: Vec<String>,
    pub main2: Vec<String>,
    pub sub: Vec<String>,
    pub resolution: Vec<String>,
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        fn owned(labels: &[&str]) -> Vec<String> {
            labels.iter().map(|s| s.to_string()).collect()
        }
        Self {
            main1: owned(MAIN_STATUS_1_LABELS),
            main2: owned(MAIN_STATUS_2_LABELS),
            sub: owned(SUB_STATUS_LABELS),
            resolution: owned(RESOLUTION_LABELS),
        }
    }
}

impl LabelVocabulary {
    /// Returns true if `label` is permitted for main-status-1.
    pub fn is_valid_main1(&self, label: &str) -> bool {
        self.main1.iter().any(|l| l == label)
    }

    pub fn is_valid_main2(&self, label: &str) -> bool {
        self.main2.iter().any(|l| l == label)
    }

    pub fn is_valid_sub(&self, label: &str) -> bool {
        self.sub.iter().any(|l| l == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_vocabularies_overlap_but_differ() {
        let vocab = LabelVocabulary::default();
        // Shared label
        assert!(vocab.is_valid_main1("クリティカル"));
        assert!(vocab.is_valid_sub("クリティカル"));
        // Sub-only label is invalid in main-slot-1
        assert!(vocab.is_valid_sub("通常攻撃ダメージアップ"));
        assert!(!vocab.is_valid_main1("通常攻撃ダメージアップ"));
        // Main-1-only label is invalid in sub slots
        assert!(vocab.is_valid_main1("凝縮ダメージアップ"));
        assert!(!vocab.is_valid_sub("凝縮ダメージアップ"));
    }

    #[test]
    fn test_resolution_list_orders_compounds_after_prefixes() {
        let vocab = LabelVocabulary::default();
        let crit = vocab.resolution.iter().position(|l| l == "クリティカル");
        let crit_dmg = vocab
            .resolution
            .iter()
            .position(|l| l == "クリティカルダメージ");
        assert!(crit.unwrap() < crit_dmg.unwrap());
        let hp = vocab.resolution.iter().position(|l| l == "HP");
        let hp_heal = vocab.resolution.iter().position(|l| l == "HP回復効果アップ");
        assert!(hp.unwrap() < hp_heal.unwrap());
    }
}
