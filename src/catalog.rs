//! Game-entity catalog, consumed by the pipeline.
//!
//! Supplies canonical items (with icon assets and cost tiers), characters and
//! weapons. The pipeline only reads from it; it is shared across slot tasks
//! behind an `Arc`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};
use crate::item::CostTier;

/// One canonical item the icon matcher can resolve against.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub element: Option<String>,
    pub cost: CostTier,
    /// Path to the reference icon image
    pub icon_path: PathBuf,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub weapon_type: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    #[serde(default)]
    pub weapon_type: Option<String>,
}

/// The full catalog as loaded from disk.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub items: Vec<CatalogItem>,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub weapons: Vec<Weapon>,
}

impl Catalog {
    /// Loads the catalog from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| ScanError::Catalog(format!("{}: {e}", path.display())))
    }

    /// Items of the given cost tier; every item when the tier is unknown.
    pub fn items_by_cost(&self, tier: CostTier) -> Vec<&CatalogItem> {
        self.items
            .iter()
            .filter(|item| tier == CostTier::Unknown || item.cost == tier)
            .collect()
    }

    pub fn item_by_id(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// First item whose canonical name contains the fragment.
    pub fn find_item_containing(&self, fragment: &str) -> Option<&CatalogItem> {
        if fragment.is_empty() {
            return None;
        }
        self.items.iter().find(|item| item.name.contains(fragment))
    }

    pub fn character_names(&self) -> Vec<String> {
        self.characters.iter().map(|c| c.name.clone()).collect()
    }

    pub fn weapon_names(&self) -> Vec<String> {
        self.weapons.iter().map(|w| w.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        serde_json::from_str(
            r#"{
                "items": [
                    {"id": "390070051", "name": "鳴鐘の亀", "cost": "4", "icon_path": "icons/cost4/390070051.webp"},
                    {"id": "390070052", "name": "無常の凶鷺", "cost": "4", "icon_path": "icons/cost4/390070052.webp"},
                    {"id": "390080003", "name": "遊侠の鬼", "cost": "3", "icon_path": "icons/cost3/390080003.webp"},
                    {"id": "391070105", "name": "先駆の戦歯", "cost": "1", "icon_path": "icons/cost1/391070105.webp"}
                ],
                "characters": [
                    {"name": "漂泊者", "weapon_type": "大剣"}
                ],
                "weapons": [
                    {"name": "浩境の粛清", "weapon_type": "大剣"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_items_by_cost_filters_tier() {
        let catalog = sample_catalog();
        let cost4 = catalog.items_by_cost(CostTier::Four);
        assert_eq!(cost4.len(), 2);
        assert!(cost4.iter().all(|i| i.cost == CostTier::Four));
    }

    #[test]
    fn test_items_by_cost_unknown_returns_all() {
        let catalog = sample_catalog();
        assert_eq!(catalog.items_by_cost(CostTier::Unknown).len(), 4);
    }

    #[test]
    fn test_find_item_containing_fragment() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.find_item_containing("凶鷺").unwrap().id,
            "390070052"
        );
        assert!(catalog.find_item_containing("存在しない").is_none());
        assert!(catalog.find_item_containing("").is_none());
    }

    #[test]
    fn test_item_by_id() {
        let catalog = sample_catalog();
        assert_eq!(catalog.item_by_id("390080003").unwrap().name, "遊侠の鬼");
        assert!(catalog.item_by_id("0").is_none());
    }
}
