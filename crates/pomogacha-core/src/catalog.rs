//! Static reward catalog.
//!
//! The catalog is read once at startup (built in, or from a JSON file named
//! in the config) and never mutated afterwards.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, RewardError};

/// Rarity tiers, declared from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    UltraRare,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::UltraRare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "COMMON",
            Rarity::Uncommon => "UNCOMMON",
            Rarity::Rare => "RARE",
            Rarity::Epic => "EPIC",
            Rarity::Legendary => "LEGENDARY",
            Rarity::UltraRare => "ULTRA_RARE",
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Sushi,
    Dessert,
    Appetizer,
}

/// One collectible reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardItem {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Asset reference resolved by the front end.
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<RewardItem>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(items: Vec<RewardItem>) -> Result<Self, RewardError> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(RewardError::DuplicateItem(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// The catalog shipped with the app.
    pub fn builtin() -> Self {
        let items = vec![
            item("egg", "Tamago", Rarity::Common, Category::Sushi, None),
            item("cucumber-roll", "Kappa Maki", Rarity::Common, Category::Sushi, None),
            item("inari", "Inari", Rarity::Common, Category::Sushi, None),
            item("edamame", "Edamame", Rarity::Common, Category::Appetizer, None),
            item("salmon", "Salmon Nigiri", Rarity::Uncommon, Category::Sushi, None),
            item("shrimp", "Ebi Nigiri", Rarity::Uncommon, Category::Sushi, None),
            item("miso-soup", "Miso Soup", Rarity::Uncommon, Category::Appetizer, None),
            item("tuna", "Maguro Nigiri", Rarity::Rare, Category::Sushi, None),
            item("mochi", "Mochi", Rarity::Rare, Category::Dessert, None),
            item(
                "eel",
                "Unagi Nigiri",
                Rarity::Epic,
                Category::Sushi,
                Some("Grilled freshwater eel with sweet glaze."),
            ),
            item("matcha-parfait", "Matcha Parfait", Rarity::Epic, Category::Dessert, None),
            item(
                "otoro",
                "Otoro Nigiri",
                Rarity::Legendary,
                Category::Sushi,
                Some("The fattiest cut of bluefin belly."),
            ),
            item(
                "golden-uni",
                "Golden Uni",
                Rarity::UltraRare,
                Category::Sushi,
                Some("A sea urchin said to appear once in a hundred courses."),
            ),
        ];
        Self { items }
    }

    /// Load a catalog from a JSON array of items.
    pub fn from_json_file(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        let items: Vec<RewardItem> = serde_json::from_str(&content)?;
        Ok(Self::new(items)?)
    }

    pub fn items(&self) -> &[RewardItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&RewardItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn by_rarity(&self, rarity: Rarity) -> impl Iterator<Item = &RewardItem> {
        self.items.iter().filter(move |i| i.rarity == rarity)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn item(
    id: &str,
    name: &str,
    rarity: Rarity,
    category: Category,
    description: Option<&str>,
) -> RewardItem {
    RewardItem {
        id: id.into(),
        name: name.into(),
        rarity,
        category,
        description: description.map(Into::into),
        image: format!("assets/{id}.png"),
    }
}
