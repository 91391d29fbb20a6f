//! Tax slab resolution over the category hierarchy.

use common::CategoryId;
use domain::{Product, TaxRate};
use store::CatalogRepository;

use crate::error::Result;

/// Resolves the tax slab that applies to a category.
///
/// The slab of a category chain is the one carried by its root ancestor.
/// Slabs set on intermediate or leaf categories are ignored.
#[derive(Debug, Clone, Copy)]
pub struct CategoryTaxResolver {
    max_depth: usize,
}

impl CategoryTaxResolver {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Walks from `category_id` to its root and returns the root's slab.
    ///
    /// Returns `None` when the root has no slab, when any category on the
    /// chain is missing, or when the chain is longer than the configured
    /// depth (a cycle in the parent links ends up here too).
    pub async fn resolve<C>(&self, catalog: &mut C, category_id: CategoryId) -> Result<Option<TaxRate>>
    where
        C: CatalogRepository + ?Sized,
    {
        let mut current = category_id;
        for _ in 0..=self.max_depth {
            let Some(category) = catalog.get_category(current).await? else {
                tracing::debug!(%category_id, missing = %current, "category chain is broken");
                return Ok(None);
            };
            match category.parent_id {
                None => return Ok(category.tax_slab),
                Some(parent_id) => current = parent_id,
            }
        }

        tracing::warn!(
            %category_id,
            max_depth = self.max_depth,
            "category chain exceeds maximum depth, ignoring its tax slab"
        );
        Ok(None)
    }

    /// Tries the product's categories in order and returns the first slab
    /// that resolves.
    pub async fn resolve_for_product<C>(
        &self,
        catalog: &mut C,
        product: &Product,
    ) -> Result<Option<TaxRate>>
    where
        C: CatalogRepository + ?Sized,
    {
        for &category_id in &product.category_ids {
            if let Some(rate) = self.resolve(catalog, category_id).await? {
                return Ok(Some(rate));
            }
        }
        Ok(None)
    }
}
