//! YAML catalog fixtures

use std::{fs, path::Path};

use async_trait::async_trait;
use serde::Deserialize;

use super::{
    Catalog, CatalogError, Combo, GalleryImage, MenuItem, arrange_combos, arrange_menu,
    is_gallery_image,
};

/// Wrapper for a catalog in YAML
#[derive(Debug, Default, Deserialize)]
struct CatalogFixture {
    #[serde(default)]
    menu: Vec<MenuItem>,

    #[serde(default)]
    combos: Vec<Combo>,

    #[serde(default)]
    gallery: Vec<GalleryImage>,
}

/// Catalog read once from a YAML file, for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct FixtureCatalog {
    menu: Vec<MenuItem>,
    combos: Vec<Combo>,
    gallery: Vec<GalleryImage>,
}

impl FixtureCatalog {
    /// Loads a catalog fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parses a catalog fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed or a combo has invalid bounds.
    pub fn from_yaml(contents: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(contents)?;

        for combo in &fixture.combos {
            combo.bounds()?;
        }

        Ok(Self {
            menu: arrange_menu(fixture.menu),
            combos: arrange_combos(fixture.combos),
            gallery: fixture
                .gallery
                .into_iter()
                .filter(|image| is_gallery_image(&image.name))
                .collect(),
        })
    }
}

#[async_trait]
impl Catalog for FixtureCatalog {
    async fn menu(&self) -> Result<Vec<MenuItem>, CatalogError> {
        Ok(self.menu.clone())
    }

    async fn combos(&self) -> Result<Vec<Combo>, CatalogError> {
        Ok(self.combos.clone())
    }

    async fn gallery(&self, limit: usize) -> Result<Vec<GalleryImage>, CatalogError> {
        Ok(self.gallery.iter().take(limit).cloned().collect())
    }
}
