//! Catalog
//!
//! Read-only source of the menu, the combos (the site's promotions when discounted) and
//! the photo gallery.

use std::{io, path::Path};

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::{CartError, ComboBounds, ItemId, Purchasable},
    supabase::SupabaseError,
};

mod fixture;
mod supabase;

pub use fixture::FixtureCatalog;
pub use supabase::SupabaseCatalog;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The hosted backend failed.
    #[error(transparent)]
    Supabase(#[from] SupabaseError),

    /// Reading a catalog fixture failed.
    #[error("failed to read catalog fixture: {0}")]
    Io(#[from] io::Error),

    /// Parsing a catalog fixture failed.
    #[error("failed to parse catalog fixture: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A combo whose bounds cannot be put in a cart.
    #[error("combo {id} cannot be added to the cart")]
    InvalidCombo {
        /// Combo id
        id: ItemId,
        /// Underlying bounds error
        #[source]
        source: CartError,
    },
}

fn default_available() -> bool {
    true
}

/// A regular dish.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MenuItem {
    /// Dish id
    pub id: ItemId,

    /// Dish name
    pub name: String,

    /// Description shown on the card
    #[serde(default)]
    pub description: Option<String>,

    /// Unit price
    pub price: Decimal,

    /// Card image
    #[serde(default)]
    pub image_url: Option<String>,

    /// Menu section, e.g. `arroces`
    pub category: String,

    /// Only available dishes are listed
    #[serde(default = "default_available")]
    pub available: bool,

    /// Explicit ordering within the menu
    #[serde(default)]
    pub sort_order: i32,
}

impl MenuItem {
    /// The cart input for this dish.
    pub fn to_purchasable(&self) -> Purchasable {
        let item = Purchasable::regular(self.id, self.name.clone(), self.price);

        match &self.image_url {
            Some(url) => item.with_image(url.clone()),
            None => item,
        }
    }
}

/// A bundled offering with its own quantity bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Combo {
    /// Combo id
    pub id: ItemId,

    /// Combo name
    pub name: String,

    /// Description shown on the card
    #[serde(default)]
    pub description: Option<String>,

    /// Unit price
    pub price: Decimal,

    /// Card image
    #[serde(default)]
    pub image_url: Option<String>,

    /// Comma separated contents
    #[serde(default)]
    pub items: Option<String>,

    /// Serving hours, free text
    #[serde(default)]
    pub schedule: Option<String>,

    /// Advertised discount in percent; zero for none
    #[serde(default)]
    pub discount_percent: u8,

    /// Minimum units per order; one when unset
    #[serde(default)]
    pub min_quantity: Option<u32>,

    /// Maximum units per order; unbounded when unset
    #[serde(default)]
    pub max_quantity: Option<u32>,

    /// Only available combos are listed
    #[serde(default = "default_available")]
    pub available: bool,

    /// Explicit ordering
    #[serde(default)]
    pub sort_order: i32,
}

impl Combo {
    /// The combo contents, split on commas.
    pub fn contents(&self) -> Vec<&str> {
        self.items
            .as_deref()
            .map(|items| {
                items
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True when the combo is advertised with a discount.
    pub fn is_promotion(&self) -> bool {
        self.discount_percent > 0
    }

    /// Badge text for discounted combos, e.g. `💥 15% OFF`.
    pub fn promotion_badge(&self) -> Option<String> {
        self.is_promotion()
            .then(|| format!("💥 {}% OFF", self.discount_percent))
    }

    /// Quantity bounds of the combo.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidCombo`] if the bounds are inconsistent.
    pub fn bounds(&self) -> Result<ComboBounds, CatalogError> {
        ComboBounds::new(self.min_quantity.unwrap_or(1), self.max_quantity)
            .map_err(|source| CatalogError::InvalidCombo {
                id: self.id,
                source,
            })
    }

    /// The cart input for this combo.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidCombo`] if the bounds are inconsistent.
    pub fn to_purchasable(&self) -> Result<Purchasable, CatalogError> {
        let item = Purchasable::combo(self.id, self.name.clone(), self.price, self.bounds()?);

        Ok(match &self.image_url {
            Some(url) => item.with_image(url.clone()),
            None => item,
        })
    }
}

/// A gallery photo.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GalleryImage {
    /// Object name
    pub name: String,

    /// Public URL
    pub url: String,
}

/// True for file names the gallery shows.
pub fn is_gallery_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|ext| {
            ["jpg", "jpeg", "png", "gif", "webp"]
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Keeps available dishes, ordered by `sort_order`. Ties keep the order they came in.
pub fn arrange_menu(items: impl IntoIterator<Item = MenuItem>) -> Vec<MenuItem> {
    let mut items: Vec<MenuItem> = items.into_iter().filter(|item| item.available).collect();

    items.sort_by_key(|item| item.sort_order);

    items
}

/// Keeps available combos, ordered by `sort_order`.
pub fn arrange_combos(combos: impl IntoIterator<Item = Combo>) -> Vec<Combo> {
    let mut combos: Vec<Combo> = combos.into_iter().filter(|combo| combo.available).collect();

    combos.sort_by_key(|combo| combo.sort_order);

    combos
}

/// Groups dishes by category, in order of first appearance.
pub fn group_by_category(items: &[MenuItem]) -> Vec<(&str, Vec<&MenuItem>)> {
    let mut groups: Vec<(&str, Vec<&MenuItem>)> = Vec::new();

    for item in items {
        match groups
            .iter_mut()
            .find(|(category, _)| *category == item.category)
        {
            Some((_, members)) => members.push(item),
            None => groups.push((item.category.as_str(), vec![item])),
        }
    }

    groups
}

/// Read-only catalog backend.
#[automock]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Available dishes, ordered for display.
    async fn menu(&self) -> Result<Vec<MenuItem>, CatalogError>;

    /// Available combos, ordered for display.
    async fn combos(&self) -> Result<Vec<Combo>, CatalogError>;

    /// Up to `limit` gallery photos, newest first.
    async fn gallery(&self, limit: usize) -> Result<Vec<GalleryImage>, CatalogError>;
}

/// Available combos advertised with a discount.
///
/// # Errors
///
/// Returns a [`CatalogError`] if the combos cannot be fetched.
pub async fn promotions(catalog: &dyn Catalog) -> Result<Vec<Combo>, CatalogError> {
    let combos = catalog.combos().await?;

    Ok(combos.into_iter().filter(Combo::is_promotion).collect())
}

/// Finds the cart input for `id`, looking at dishes first and combos second.
///
/// # Errors
///
/// Returns a [`CatalogError`] if the catalog cannot be fetched or the combo is invalid.
pub async fn find_purchasable(
    catalog: &dyn Catalog,
    id: ItemId,
) -> Result<Option<Purchasable>, CatalogError> {
    if let Some(item) = catalog.menu().await?.iter().find(|item| item.id == id) {
        return Ok(Some(item.to_purchasable()));
    }

    catalog
        .combos()
        .await?
        .iter()
        .find(|combo| combo.id == id)
        .map(Combo::to_purchasable)
        .transpose()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::cart::LineKind;

    use super::*;

    fn dish(id: ItemId, name: &str, category: &str, sort_order: i32) -> MenuItem {
        MenuItem {
            id,
            name: name.to_string(),
            description: None,
            price: Decimal::from(15_000),
            image_url: None,
            category: category.to_string(),
            available: true,
            sort_order,
        }
    }

    fn combo(id: ItemId, discount_percent: u8) -> Combo {
        Combo {
            id,
            name: format!("Combo {id}"),
            description: None,
            price: Decimal::from(42_000),
            image_url: Some("https://img.example/combo.jpg".to_string()),
            items: Some("Arroz, Ensalada ,, Limonada".to_string()),
            schedule: None,
            discount_percent,
            min_quantity: Some(3),
            max_quantity: Some(5),
            available: true,
            sort_order: 0,
        }
    }

    #[test]
    fn gallery_accepts_image_extensions_only() {
        assert!(is_gallery_image("mesa.JPG"));
        assert!(is_gallery_image("plato.webp"));
        assert!(!is_gallery_image("menu.pdf"));
        assert!(!is_gallery_image(".emptyFolderPlaceholder"));
    }

    #[test]
    fn menu_is_filtered_and_ordered() {
        let mut hidden = dish(4, "Oculto", "arroces", 0);
        hidden.available = false;

        let menu = arrange_menu([
            dish(1, "Sopa", "entradas", 2),
            dish(2, "Arroz mixto", "arroces", 1),
            dish(3, "Arepa", "entradas", 1),
            hidden,
        ]);

        let ids: Vec<ItemId> = menu.iter().map(|item| item.id).collect();

        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let menu = [
            dish(1, "Arepa", "entradas", 0),
            dish(2, "Arroz", "arroces", 0),
            dish(3, "Sopa", "entradas", 0),
        ];

        let groups = group_by_category(&menu);
        let summary: Vec<(&str, usize)> = groups
            .iter()
            .map(|(category, items)| (*category, items.len()))
            .collect();

        assert_eq!(summary, vec![("entradas", 2), ("arroces", 1)]);
    }

    #[test]
    fn combo_contents_are_trimmed() {
        assert_eq!(combo(1, 0).contents(), vec!["Arroz", "Ensalada", "Limonada"]);
    }

    #[test]
    fn discounted_combos_are_promotions() {
        assert_eq!(combo(1, 15).promotion_badge().as_deref(), Some("💥 15% OFF"));
        assert_eq!(combo(1, 0).promotion_badge(), None);
    }

    #[test]
    fn combo_converts_with_bounds() -> TestResult {
        let item = combo(20, 0).to_purchasable()?;

        assert_eq!(item.kind, LineKind::Combo(ComboBounds::new(3, Some(5))?));
        assert_eq!(
            item.image_url.as_deref(),
            Some("https://img.example/combo.jpg")
        );

        Ok(())
    }

    #[test]
    fn combo_without_bounds_is_unbounded() -> TestResult {
        let mut combo = combo(20, 0);
        combo.min_quantity = None;
        combo.max_quantity = None;

        assert_eq!(
            combo.to_purchasable()?.kind,
            LineKind::Combo(ComboBounds::unbounded())
        );

        Ok(())
    }

    #[test]
    fn combo_with_inverted_bounds_is_rejected() {
        let mut combo = combo(20, 0);
        combo.max_quantity = Some(2);

        assert!(matches!(
            combo.to_purchasable(),
            Err(CatalogError::InvalidCombo { id: 20, .. })
        ));
    }

    #[tokio::test]
    async fn find_prefers_dishes_then_combos() -> TestResult {
        let mut catalog = MockCatalog::new();

        catalog
            .expect_menu()
            .returning(|| Ok(vec![dish(7, "Arroz", "arroces", 0)]));
        catalog
            .expect_combos()
            .returning(|| Ok(vec![combo(20, 10)]));

        let dish = find_purchasable(&catalog, 7).await?;
        let combo = find_purchasable(&catalog, 20).await?;
        let missing = find_purchasable(&catalog, 99).await?;

        assert_eq!(dish.map(|item| item.kind), Some(LineKind::Regular));
        assert!(combo.is_some_and(|item| item.kind.is_combo()));
        assert!(missing.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn promotions_are_discounted_combos() -> TestResult {
        let mut catalog = MockCatalog::new();

        catalog
            .expect_combos()
            .once()
            .returning(|| Ok(vec![combo(1, 0), combo(2, 20)]));

        let promotions = promotions(&catalog).await?;

        assert_eq!(
            promotions.iter().map(|combo| combo.id).collect::<Vec<_>>(),
            vec![2]
        );

        Ok(())
    }
}
