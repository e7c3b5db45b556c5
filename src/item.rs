//! The structured equipment record produced by the pipeline.
//!
//! An `Item` is created empty per slot, filled in by the OCR parser
//! (text-derived fields) and then by the icon matcher (identity fields), and
//! handed off by value to the consumer. Parsing failures leave empty
//! strings behind rather than raising; the self-check reports them.

use serde::{Deserialize, Serialize};

/// Sentinel prefix the OCR text carries when the item name is not visible
/// (slot crops on a multi-item screenshot have no name line).
pub const UNIDENTIFIED_SENTINEL: &str = "NoName";

/// Placeholder name for items whose identity has not been resolved yet.
pub const UNIDENTIFIED_PLACEHOLDER: &str = "No Name";

/// Rarity/slot-cost category of an item. The tier filters candidate icons
/// and pins the canonical main-status-2 line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostTier {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "unknown")]
    Unknown,
}

impl CostTier {
    /// Parses the digit captured from a "cost<N>" line.
    pub fn from_digit(d: char) -> Self {
        match d {
            '1' => CostTier::One,
            '3' => CostTier::Three,
            '4' => CostTier::Four,
            _ => CostTier::Unknown,
        }
    }

    /// Infers the tier from the main-status-2 value when the cost line was
    /// not recognized. The three tiers have well-known fixed values.
    pub fn infer_from_main2(value: &str) -> Self {
        match value.parse::<f32>() {
            Ok(v) if v == 100.0 => CostTier::Three,
            Ok(v) if v == 150.0 => CostTier::Four,
            Ok(v) if v > 150.0 => CostTier::One,
            _ => CostTier::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CostTier::One => "1",
            CostTier::Three => "3",
            CostTier::Four => "4",
            CostTier::Unknown => "unknown",
        }
    }
}

impl Default for CostTier {
    fn default() -> Self {
        CostTier::Unknown
    }
}

/// One stat line: a canonical property label and its numeric or percentage
/// value. Empty strings mark a line that could not be recovered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    pub property_name: String,
    pub value: String,
}

impl StatEntry {
    pub fn new(property_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            value: value.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.property_name.is_empty() && self.value.is_empty()
    }
}

/// The structured record for one equipment slot.
///
/// `sub_status` always holds exactly 5 entries; entries that failed to parse
/// stay empty. `id`/`element_type` stay empty until icon matching resolves
/// the item identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub element_type: Option<String>,
    pub cost: CostTier,
    pub main_status_1: StatEntry,
    pub main_status_2: StatEntry,
    pub sub_status: [StatEntry; 5],
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins main-status-2 to the tier's canonical label and value, overriding
    /// whatever OCR produced for that field. No-op for an unknown tier.
    pub fn apply_cost_defaults(&mut self) {
        let (label, value) = match self.cost {
            CostTier::One => ("HP", "2280"),
            CostTier::Three => ("攻撃力", "100"),
            CostTier::Four => ("攻撃力", "150"),
            CostTier::Unknown => return,
        };
        self.main_status_2 = StatEntry::new(label, value);
    }
}
