use crate::db::{DbConnection, DbPool};
use crate::domain::product::{NewProduct, Product, ProductId, UpdateProduct};
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod product;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over product records.
pub trait ProductReader {
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
    /// All products, most recently created first.
    fn list_products(&self) -> RepositoryResult<Vec<Product>>;
}

/// Write operations over product records.
pub trait ProductWriter {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
    /// Apply `updates` and return the post-update record, or `None` if `id` is absent.
    fn update_product(
        &self,
        id: ProductId,
        updates: &UpdateProduct,
    ) -> RepositoryResult<Option<Product>>;
    /// Remove the record and return it, or `None` if `id` is absent.
    fn delete_product(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
}
