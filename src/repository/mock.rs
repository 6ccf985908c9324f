use mockall::mock;

use super::{ProductReader, ProductWriter};
use crate::domain::product::{NewProduct, Product, ProductId, UpdateProduct};
use crate::repository::errors::RepositoryResult;

mock! {
    pub ProductReader {}

    impl ProductReader for ProductReader {
        fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
        fn list_products(&self) -> RepositoryResult<Vec<Product>>;
    }
}

mock! {
    pub ProductWriter {}

    impl ProductWriter for ProductWriter {
        fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
        fn update_product(&self, id: ProductId, updates: &UpdateProduct) -> RepositoryResult<Option<Product>>;
        fn delete_product(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
    }
}
