//! Product catalog: per-dimension metadata for placed units
//!
//! The catalog maps a product id to the dimension metadata the resolvers and
//! the formula engine need: default values, optional [min, max] ranges, and
//! the semantic role each dimension id plays (width, height, shelf count,
//! door overhang, and so on). Catalogs load from TOML files; a built-in
//! default covers the standard carcase sizes.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::engine::config::EngineConfig;
use crate::model::Unit;

/// Errors that can occur when loading or parsing catalog files
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse catalog TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Semantic role a catalog dimension plays on the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DimensionRole {
    Width,
    Height,
    Depth,
    ShelfCount,
    DrawerCount,
    DoorOverhang,
    #[default]
    Other,
}

/// Metadata for one dimension of a product
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DimensionMeta {
    pub default: f64,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub role: DimensionRole,
}

/// Dimension metadata for one product
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductMeta {
    #[serde(default)]
    pub dimensions: BTreeMap<String, DimensionMeta>,
}

impl ProductMeta {
    /// The first dimension carrying the given role, if any
    pub fn dimension_with_role(&self, role: DimensionRole) -> Option<(&str, &DimensionMeta)> {
        self.dimensions
            .iter()
            .find(|(_, meta)| meta.role == role)
            .map(|(id, meta)| (id.as_str(), meta))
    }

    /// The role of a dimension id, `Other` when the id is unknown
    pub fn role_of(&self, dimension: &str) -> DimensionRole {
        self.dimensions
            .get(dimension)
            .map(|m| m.role)
            .unwrap_or(DimensionRole::Other)
    }
}

/// Read-only source of product dimension metadata
pub trait ProductCatalog {
    fn product_meta(&self, product_id: &str) -> Option<&ProductMeta>;
}

/// TOML structure for deserializing catalogs
#[derive(Deserialize)]
struct TomlCatalog {
    #[serde(default)]
    products: BTreeMap<String, ProductMeta>,
}

/// Built-in catalog covering the standard carcase products
const DEFAULT_CATALOG: &str = r#"
[products.base-600.dimensions]
width = { default = 600.0, min = 150.0, max = 1200.0, role = "width" }
height = { default = 720.0, min = 550.0, max = 900.0, role = "height" }
depth = { default = 560.0, min = 300.0, max = 650.0, role = "depth" }
shelf_count = { default = 1.0, min = 0.0, max = 4.0, role = "shelf-count" }

[products.tall-600.dimensions]
width = { default = 600.0, min = 300.0, max = 1200.0, role = "width" }
height = { default = 2100.0, min = 1800.0, max = 2400.0, role = "height" }
depth = { default = 560.0, min = 300.0, max = 650.0, role = "depth" }

[products.overhead-600.dimensions]
width = { default = 600.0, min = 150.0, max = 1200.0, role = "width" }
height = { default = 720.0, min = 350.0, max = 1000.0, role = "height" }
depth = { default = 320.0, min = 250.0, max = 400.0, role = "depth" }
door_overhang = { default = 0.0, min = 0.0, max = 1.0, role = "door-overhang" }

[products.appliance-600.dimensions]
width = { default = 600.0, min = 450.0, max = 920.0, role = "width" }
height = { default = 820.0, min = 700.0, max = 900.0, role = "height" }
depth = { default = 560.0, min = 450.0, max = 650.0, role = "depth" }
left_gap = { default = 20.0, min = 0.0, max = 50.0 }
right_gap = { default = 20.0, min = 0.0, max = 50.0 }

[products.drawer-base-600.dimensions]
width = { default = 600.0, min = 300.0, max = 1200.0, role = "width" }
height = { default = 720.0, min = 550.0, max = 900.0, role = "height" }
depth = { default = 560.0, min = 300.0, max = 650.0, role = "depth" }
drawer_count = { default = 3.0, min = 1.0, max = 5.0, role = "drawer-count" }
"#;

/// A catalog backed by an in-memory product map
#[derive(Debug, Clone)]
pub struct Catalog {
    products: BTreeMap<String, ProductMeta>,
}

impl Catalog {
    /// An empty catalog with no products
    pub fn empty() -> Self {
        Self {
            products: BTreeMap::new(),
        }
    }

    /// Load a catalog from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load a catalog from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let parsed: TomlCatalog = toml::from_str(content)?;
        Ok(Self {
            products: parsed.products,
        })
    }

    pub fn insert(&mut self, product_id: impl Into<String>, meta: ProductMeta) {
        self.products.insert(product_id.into(), meta);
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_toml_str(DEFAULT_CATALOG).expect("default catalog should be valid TOML")
    }
}

impl ProductCatalog for Catalog {
    fn product_meta(&self, product_id: &str) -> Option<&ProductMeta> {
        self.products.get(product_id)
    }
}

/// Width limits for a unit: catalog metadata when the unit carries a product
/// id with a width-role dimension, per-kind defaults otherwise.
pub fn width_limits(catalog: &dyn ProductCatalog, unit: &Unit, config: &EngineConfig) -> (f64, f64) {
    if let Some(meta) = unit
        .product_id
        .as_deref()
        .and_then(|id| catalog.product_meta(id))
    {
        if let Some((_, dim)) = meta.dimension_with_role(DimensionRole::Width) {
            let (fallback_min, fallback_max) = config.width_range(unit.kind);
            return (dim.min.unwrap_or(fallback_min), dim.max.unwrap_or(fallback_max));
        }
    }
    config.width_range(unit.kind)
}
