use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, ProductId, ProductImage,
    UpdateProduct as DomainUpdateProduct,
};
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub in_stock: bool,
    pub image_secure_url: String,
    pub image_public_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub in_stock: bool,
    pub image_secure_url: &'a str,
    pub image_public_id: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// `None` fields are skipped by diesel and keep their stored value.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct UpdateProduct<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price: Option<f64>,
    pub in_stock: Option<bool>,
    pub image_secure_url: Option<&'a str>,
    pub image_public_id: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Product> for DomainProduct {
    type Error = RepositoryError;

    fn try_from(value: Product) -> Result<Self, Self::Error> {
        let id = ProductId::new(value.id).ok_or(RepositoryError::InvalidRow {
            id: value.id,
            reason: "non-positive id",
        })?;

        Ok(Self {
            id,
            name: value.name,
            description: value.description,
            price: value.price,
            in_stock: value.in_stock,
            image: ProductImage {
                secure_url: value.image_secure_url,
                public_id: value.image_public_id,
            },
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewProduct> for NewProduct<'a> {
    fn from(value: &'a DomainNewProduct) -> Self {
        Self {
            name: value.name.as_str(),
            description: value.description.as_str(),
            price: value.price,
            in_stock: value.in_stock,
            image_secure_url: value.image.secure_url.as_str(),
            image_public_id: value.image.public_id.as_str(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateProduct> for UpdateProduct<'a> {
    fn from(value: &'a DomainUpdateProduct) -> Self {
        Self {
            name: value.name.as_deref(),
            description: value.description.as_deref(),
            price: value.price,
            in_stock: value.in_stock,
            image_secure_url: value.image.as_ref().map(|image| image.secure_url.as_str()),
            image_public_id: value.image.as_ref().map(|image| image.public_id.as_str()),
            updated_at: value.updated_at,
        }
    }
}
