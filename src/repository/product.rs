use diesel::prelude::*;

use crate::{
    domain::product::{
        NewProduct as DomainNewProduct, Product as DomainProduct, ProductId,
        UpdateProduct as DomainUpdateProduct,
    },
    models::product::{
        NewProduct as DbNewProduct, Product as DbProduct, UpdateProduct as DbUpdateProduct,
    },
    repository::errors::RepositoryResult,
    repository::{DieselRepository, ProductReader, ProductWriter},
};

impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let product = products::table
            .find(id.get())
            .first::<DbProduct>(&mut conn)
            .optional()?;

        product.map(DomainProduct::try_from).transpose()
    }

    fn list_products(&self) -> RepositoryResult<Vec<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let db_products = products::table
            .order((products::created_at.desc(), products::id.desc()))
            .load::<DbProduct>(&mut conn)?;

        db_products
            .into_iter()
            .map(DomainProduct::try_from)
            .collect()
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let db_new = DbNewProduct::from(new_product);

        let created = diesel::insert_into(products::table)
            .values(&db_new)
            .get_result::<DbProduct>(&mut conn)?;

        DomainProduct::try_from(created)
    }

    fn update_product(
        &self,
        id: ProductId,
        updates: &DomainUpdateProduct,
    ) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateProduct::from(updates);

        let updated = diesel::update(products::table.find(id.get()))
            .set(&db_updates)
            .get_result::<DbProduct>(&mut conn)
            .optional()?;

        updated.map(DomainProduct::try_from).transpose()
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(products::table.find(id.get()))
            .get_result::<DbProduct>(&mut conn)
            .optional()?;

        deleted.map(DomainProduct::try_from).transpose()
    }
}
