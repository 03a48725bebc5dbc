//! The Azure step catalog
//!
//! Each module contributes one family of steps; [`families`] lists them in
//! the order they are merged into the catalog.

pub mod account;
pub mod active_directory;
pub mod handlers;
pub mod resource_manager;

use crate::core::{CatalogError, StepCatalog, StepFamily};

pub fn families() -> Vec<StepFamily> {
    let mut families = vec![account::family(), active_directory::family()];
    families.extend(resource_manager::families());
    families
}

impl StepCatalog {
    /// Catalog of every Azure ingestion step
    pub fn standard() -> Result<Self, CatalogError> {
        Self::from_families(families())
    }
}
