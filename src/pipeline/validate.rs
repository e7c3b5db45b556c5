//! Self-check of a parsed record against the slot vocabularies.
//!
//! A resolved label is only acceptable in the slot it occupies; a sub-only
//! label in main-status-1 means OCR mangled the block badly enough that a
//! retry with different contrast is worth it.

use crate::item::Item;
use crate::vocab::LabelVocabulary;

/// One vocabulary violation: which field, and the value it held.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub value: String,
}

/// Outcome of the self-check. Does not mutate the record.
#[derive(Clone, Debug)]
pub struct SelfCheck {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

/// Verifies that every resolved label belongs to the vocabulary permitted
/// for its slot.
pub fn check(item: &Item, vocab: &LabelVocabulary) -> SelfCheck {
    let mut errors = Vec::new();

    if !vocab.is_valid_main1(&item.main_status_1.property_name) {
        errors.push(FieldError {
            field: "main_status_1".to_string(),
            value: item.main_status_1.property_name.clone(),
        });
    }
    if !vocab.is_valid_main2(&item.main_status_2.property_name) {
        errors.push(FieldError {
            field: "main_status_2".to_string(),
            value: item.main_status_2.property_name.clone(),
        });
    }
    for (i, sub) in item.sub_status.iter().enumerate() {
        if !vocab.is_valid_sub(&sub.property_name) {
            errors.push(FieldError {
                field: format!("sub_status[{i}]"),
                value: sub.property_name.clone(),
            });
        }
    }

    SelfCheck {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{CostTier, StatEntry};

    fn valid_item() -> Item {
        let mut item = Item::new();
        item.cost = CostTier::Four;
        item.main_status_1 = StatEntry::new("クリティカル", "22%");
        item.main_status_2 = StatEntry::new("攻撃力", "150");
        let subs = ["HP", "攻撃力", "防御力", "共鳴効率", "クリティカル"];
        for (i, label) in subs.iter().enumerate() {
            item.sub_status[i] = StatEntry::new(*label, "10.0%");
        }
        item
    }

    #[test]
    fn test_valid_record_passes() {
        let report = check(&valid_item(), &LabelVocabulary::default());
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_main1_out_of_vocabulary_is_named() {
        let mut item = valid_item();
        // Sub-only label in main-slot-1 is invalid there
        item.main_status_1 = StatEntry::new("通常攻撃ダメージアップ", "10%");
        let report = check(&item, &LabelVocabulary::default());
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![FieldError {
                field: "main_status_1".to_string(),
                value: "通常攻撃ダメージアップ".to_string(),
            }]
        );
    }

    #[test]
    fn test_empty_fields_are_reported() {
        let mut item = valid_item();
        item.sub_status[3] = StatEntry::default();
        let report = check(&item, &LabelVocabulary::default());
        assert!(!report.valid);
        assert_eq!(report.errors[0].field, "sub_status[3]");
    }

    #[test]
    fn test_main1_only_label_invalid_in_sub_slot() {
        let mut item = valid_item();
        item.sub_status[0] = StatEntry::new("凝縮ダメージアップ", "10.0%");
        let report = check(&item, &LabelVocabulary::default());
        assert!(!report.valid);
        assert_eq!(report.errors[0].field, "sub_status[0]");
    }

    #[test]
    fn test_check_does_not_mutate() {
        let item = valid_item();
        let before = item.clone();
        let _ = check(&item, &LabelVocabulary::default());
        assert_eq!(item, before);
    }
}
