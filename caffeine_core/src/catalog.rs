//! Default catalog of drink presets.
//!
//! Quick presets use medical reference values; brand products use the
//! manufacturers' published figures.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where a preset's caffeine figure comes from
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DrinkSourceType {
    MedicalReference,
    BrandOfficial,
}

impl DrinkSourceType {
    pub fn display_name(self) -> &'static str {
        match self {
            DrinkSourceType::MedicalReference => "Medical Reference",
            DrinkSourceType::BrandOfficial => "Brand Official",
        }
    }
}

/// Grouping of presets for selection
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DrinkCategory {
    QuickPresets,
    BrandProducts,
}

impl DrinkCategory {
    pub fn display_name(self) -> &'static str {
        match self {
            DrinkCategory::QuickPresets => "Quick Presets",
            DrinkCategory::BrandProducts => "Brand Products",
        }
    }
}

/// A drink with a known caffeine amount per serving
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DrinkCatalogItem {
    pub id: String,
    pub name: String,
    pub serving_description: String,
    pub caffeine_mg: f64,
    pub category: DrinkCategory,
    pub source_name: String,
    pub source_type: DrinkSourceType,
}

impl DrinkCatalogItem {
    pub fn display_title(&self) -> String {
        format!("{} ({})", self.name, self.serving_description)
    }

    /// Amount used to pre-fill an intake, rounded to whole milligrams
    pub fn fill_amount_mg(&self) -> f64 {
        self.caffeine_mg.round()
    }
}

/// The complete set of drink presets
#[derive(Clone, Debug)]
pub struct Catalog {
    pub items: Vec<DrinkCatalogItem>,
}

impl Catalog {
    pub fn find(&self, id: &str) -> Option<&DrinkCatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Same as [`Catalog::find`] but reports unknown ids as an error
    pub fn require(&self, id: &str) -> Result<&DrinkCatalogItem> {
        self.find(id)
            .ok_or_else(|| Error::InvalidInput(format!("unknown preset '{}'", id)))
    }

    pub fn by_category(&self, category: DrinkCategory) -> Vec<&DrinkCatalogItem> {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .collect()
    }

    /// Distinct brands of the brand products, in catalog order
    pub fn brands(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.by_category(DrinkCategory::BrandProducts)
            .into_iter()
            .map(|item| item.source_name.as_str())
            .filter(|brand| seen.insert(*brand))
            .collect()
    }

    /// Brand products sold under `brand`
    pub fn products_for(&self, brand: &str) -> Vec<&DrinkCatalogItem> {
        self.by_category(DrinkCategory::BrandProducts)
            .into_iter()
            .filter(|item| item.source_name == brand)
            .collect()
    }

    /// Check catalog integrity, returning one message per problem
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut ids = HashSet::new();

        for item in &self.items {
            if !ids.insert(item.id.as_str()) {
                errors.push(format!("Duplicate preset id '{}'", item.id));
            }
            if item.name.trim().is_empty() {
                errors.push(format!("Preset '{}' has an empty name", item.id));
            }
            if !item.caffeine_mg.is_finite() || item.caffeine_mg <= 0.0 {
                errors.push(format!(
                    "Preset '{}' has invalid caffeine amount {}",
                    item.id, item.caffeine_mg
                ));
            }
        }

        errors
    }
}

/// Cached default catalog, built once
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Build the default catalog
///
/// Prefer [`get_default_catalog`]; this is kept for tests and custom catalogs.
pub fn build_default_catalog() -> Catalog {
    use DrinkCategory::{BrandProducts, QuickPresets};
    use DrinkSourceType::{BrandOfficial, MedicalReference};

    let items = vec![
        item("quick-brewed-coffee-8oz", "Brewed Coffee", "8 oz", 96.0, QuickPresets, "Mayo Clinic", MedicalReference),
        item("quick-espresso-1oz", "Espresso", "1 oz", 63.0, QuickPresets, "Mayo Clinic", MedicalReference),
        item("quick-black-tea-8oz", "Black Tea", "8 oz", 48.0, QuickPresets, "Mayo Clinic", MedicalReference),
        item("quick-green-tea-8oz", "Green Tea", "8 oz", 29.0, QuickPresets, "Mayo Clinic", MedicalReference),
        item("quick-cola-8oz", "Cola", "8 oz", 33.0, QuickPresets, "Mayo Clinic", MedicalReference),
        item("quick-energy-drink-8oz", "Energy Drink", "8 oz", 79.0, QuickPresets, "Mayo Clinic", MedicalReference),
        item("brand-red-bull-8-4oz", "Red Bull", "8.4 oz", 80.0, BrandProducts, "Red Bull", BrandOfficial),
        item("brand-red-bull-12oz", "Red Bull", "12 oz", 114.0, BrandProducts, "Red Bull", BrandOfficial),
        item("brand-red-bull-16oz", "Red Bull", "16 oz", 151.0, BrandProducts, "Red Bull", BrandOfficial),
        item("brand-coca-cola-12oz", "Coca-Cola", "12 oz", 34.0, BrandProducts, "The Coca-Cola Company", BrandOfficial),
        item("brand-diet-coke-12oz", "Diet Coke", "12 oz", 46.0, BrandProducts, "The Coca-Cola Company", BrandOfficial),
    ];

    Catalog { items }
}

fn item(
    id: &str,
    name: &str,
    serving: &str,
    caffeine_mg: f64,
    category: DrinkCategory,
    source_name: &str,
    source_type: DrinkSourceType,
) -> DrinkCatalogItem {
    DrinkCatalogItem {
        id: id.into(),
        name: name.into(),
        serving_description: serving.into(),
        caffeine_mg,
        category,
        source_name: source_name.into(),
        source_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.items.len(), 11);
        assert_eq!(catalog.by_category(DrinkCategory::QuickPresets).len(), 6);
        assert_eq!(catalog.by_category(DrinkCategory::BrandProducts).len(), 5);
    }

    #[test]
    fn test_default_catalog_validates() {
        let errors = get_default_catalog().validate();
        assert!(errors.is_empty(), "Catalog errors: {:?}", errors);
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut catalog = build_default_catalog();
        let mut dup = catalog.items[0].clone();
        dup.caffeine_mg = 0.0;
        catalog.items.push(dup);

        let errors = catalog.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("Duplicate")));
        assert!(errors.iter().any(|e| e.contains("invalid caffeine amount")));
    }

    #[test]
    fn test_find_and_display_title() {
        let catalog = get_default_catalog();
        let espresso = catalog.find("quick-espresso-1oz").unwrap();
        assert_eq!(espresso.caffeine_mg, 63.0);
        assert_eq!(espresso.display_title(), "Espresso (1 oz)");
        assert!(catalog.find("quick-mate").is_none());
        assert!(catalog.require("quick-mate").is_err());
    }

    #[test]
    fn test_brands_in_catalog_order() {
        let catalog = get_default_catalog();
        assert_eq!(catalog.brands(), vec!["Red Bull", "The Coca-Cola Company"]);

        let red_bull = catalog.products_for("Red Bull");
        assert_eq!(red_bull.len(), 3);
        assert_eq!(red_bull[0].serving_description, "8.4 oz");
    }
}
