//! Supabase-backed catalog

use async_trait::async_trait;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{
    cart::ItemId,
    supabase::{SupabaseClient, SupabaseError},
};

use super::{
    Catalog, CatalogError, Combo, GalleryImage, MenuItem, arrange_combos, arrange_menu,
    is_gallery_image,
};

const MENU_TABLE: &str = "platos";
const COMBOS_TABLE: &str = "combos";
const GALLERY_BUCKET: &str = "galeria";

#[derive(Debug, Deserialize)]
struct MenuItemRow {
    id: ItemId,
    nombre: String,
    #[serde(default)]
    descripcion: Option<String>,
    precio: Decimal,
    #[serde(default)]
    imagen_url: Option<String>,
    #[serde(default)]
    categoria: Option<String>,
    #[serde(default)]
    disponible: Option<bool>,
    #[serde(default)]
    orden: Option<i32>,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        Self {
            id: row.id,
            name: row.nombre,
            description: row.descripcion,
            price: row.precio,
            image_url: row.imagen_url,
            category: row.categoria.unwrap_or_default(),
            available: row.disponible.unwrap_or(true),
            sort_order: row.orden.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ComboRow {
    id: ItemId,
    nombre: String,
    #[serde(default)]
    descripcion: Option<String>,
    precio: Decimal,
    #[serde(default)]
    imagen_url: Option<String>,
    #[serde(default)]
    items: Option<String>,
    #[serde(default)]
    horario: Option<String>,
    #[serde(default)]
    descuento: Option<u8>,
    #[serde(default)]
    cantidad_minima: Option<u32>,
    #[serde(default)]
    cantidad_maxima: Option<u32>,
    #[serde(default)]
    disponible: Option<bool>,
    #[serde(default)]
    orden: Option<i32>,
}

impl From<ComboRow> for Combo {
    fn from(row: ComboRow) -> Self {
        Self {
            id: row.id,
            name: row.nombre,
            description: row.descripcion,
            price: row.precio,
            image_url: row.imagen_url,
            items: row.items,
            schedule: row.horario,
            discount_percent: row.descuento.unwrap_or_default(),
            min_quantity: row.cantidad_minima,
            max_quantity: row.cantidad_maxima,
            available: row.disponible.unwrap_or(true),
            sort_order: row.orden.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StorageObject {
    name: String,
}

/// Catalog served by the project's `platos` and `combos` tables and `galeria` bucket.
#[derive(Debug, Clone)]
pub struct SupabaseCatalog {
    client: SupabaseClient,
}

impl SupabaseCatalog {
    /// Creates a catalog over `client`.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn gallery_images(
        &self,
        objects: Vec<StorageObject>,
    ) -> Result<Vec<GalleryImage>, SupabaseError> {
        objects
            .into_iter()
            .filter(|object| is_gallery_image(&object.name))
            .map(|object| {
                let url = self.client.public_url(GALLERY_BUCKET, &object.name)?;

                Ok(GalleryImage {
                    name: object.name,
                    url: url.to_string(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl Catalog for SupabaseCatalog {
    async fn menu(&self) -> Result<Vec<MenuItem>, CatalogError> {
        let request = self.client.table(Method::GET, MENU_TABLE)?.query(&[
            ("select", "*"),
            ("disponible", "eq.true"),
            ("order", "orden.asc,nombre.asc"),
        ]);

        let rows: Vec<MenuItemRow> = SupabaseClient::send_json(request).await?;

        debug!(rows = rows.len(), "menu fetched");

        Ok(arrange_menu(rows.into_iter().map(MenuItem::from)))
    }

    async fn combos(&self) -> Result<Vec<Combo>, CatalogError> {
        let request = self.client.table(Method::GET, COMBOS_TABLE)?.query(&[
            ("select", "*"),
            ("disponible", "eq.true"),
            ("order", "orden.asc"),
        ]);

        let rows: Vec<ComboRow> = SupabaseClient::send_json(request).await?;

        debug!(rows = rows.len(), "combos fetched");

        Ok(arrange_combos(rows.into_iter().map(Combo::from)))
    }

    async fn gallery(&self, limit: usize) -> Result<Vec<GalleryImage>, CatalogError> {
        let request = self.client.storage_list(GALLERY_BUCKET)?.json(&json!({
            "prefix": "",
            "limit": limit,
            "offset": 0,
            "sortBy": { "column": "created_at", "order": "desc" },
        }));

        let objects: Vec<StorageObject> = SupabaseClient::send_json(request).await?;

        debug!(objects = objects.len(), "gallery listed");

        Ok(self.gallery_images(objects)?)
    }
}
