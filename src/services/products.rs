use std::sync::Arc;

use crate::domain::product::{
    CreateProductDto, NewProduct, Product, ProductId, ProductImage, UpdateProduct,
    UpdateProductDto,
};
use crate::repository::{ProductReader, ProductWriter};
use crate::services::{ServiceError, ServiceResult};
use crate::storage::scratch::ScratchFile;
use crate::storage::{ImageStore, UploadOptions};

const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Coordinates product persistence with the remote image store.
pub struct ProductService<R> {
    repo: R,
    store: Arc<dyn ImageStore>,
}

impl<R> ProductService<R>
where
    R: ProductReader + ProductWriter,
{
    pub fn new(repo: R, store: Arc<dyn ImageStore>) -> Self {
        Self { repo, store }
    }

    /// All products, newest first. An empty catalog is reported as `NotFound`.
    pub fn get_all(&self) -> ServiceResult<Vec<Product>> {
        let products = self.repo.list_products()?;
        if products.is_empty() {
            return Err(ServiceError::not_found("No products found"));
        }
        Ok(products)
    }

    /// Look up one product. Ids that cannot exist resolve to `NotFound`.
    pub fn get_by_id(&self, id: &str) -> ServiceResult<Product> {
        let product_id = parse_id(id)?;
        self.repo
            .get_product_by_id(product_id)?
            .ok_or_else(|| ServiceError::not_found(PRODUCT_NOT_FOUND))
    }

    /// Upload the staged image, then persist the product.
    ///
    /// The scratch file is removed on every exit path. If the insert fails
    /// after a successful upload the remote image is left in place.
    pub async fn create(&self, dto: CreateProductDto) -> ServiceResult<Product> {
        let CreateProductDto {
            name,
            description,
            price,
            in_stock,
            image_local_file_path,
        } = dto;

        let Some(local_path) = image_local_file_path else {
            return Err(ServiceError::bad_request("Product image is required"));
        };
        let scratch = ScratchFile::new(local_path);

        let image = self.upload_image(&scratch).await?;

        let new_product = NewProduct::new(name, description, price, image).in_stock(in_stock);
        let created = self.repo.create_product(&new_product).map_err(|err| {
            log::error!("Failed to create product: {err}");
            ServiceError::internal("Failed to create product")
        })?;

        drop(scratch);
        Ok(created)
    }

    /// Apply a partial update, replacing the image only when a new one is staged.
    ///
    /// The old remote image is deleted before the replacement is uploaded.
    pub async fn update(&self, id: &str, dto: UpdateProductDto) -> ServiceResult<Product> {
        let UpdateProductDto {
            name,
            description,
            price,
            in_stock,
            image_local_file_path,
        } = dto;
        let scratch = image_local_file_path.map(ScratchFile::new);

        let product_id = parse_id(id)?;
        let existing = self
            .repo
            .get_product_by_id(product_id)?
            .ok_or_else(|| ServiceError::not_found(PRODUCT_NOT_FOUND))?;

        let image = match &scratch {
            Some(scratch) => {
                self.store.delete(&existing.image.public_id).await?;
                self.upload_image(scratch).await?
            }
            None => existing.image,
        };

        let mut updates = UpdateProduct::new().image(image);
        if let Some(name) = name {
            updates = updates.name(name);
        }
        if let Some(description) = description {
            updates = updates.description(description);
        }
        if let Some(price) = price {
            updates = updates.price(price);
        }
        if let Some(in_stock) = in_stock {
            updates = updates.in_stock(in_stock);
        }

        match self.repo.update_product(product_id, &updates) {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => {
                log::error!("Product {product_id} disappeared during update");
                Err(ServiceError::internal("Failed to update product"))
            }
            Err(err) => {
                log::error!("Failed to update product {product_id}: {err}");
                Err(ServiceError::internal("Failed to update product"))
            }
        }
    }

    /// Remove the record, then its remote image.
    ///
    /// A failing image delete is reported, but the record is already gone.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let product_id = parse_id(id)?;
        let removed = self
            .repo
            .delete_product(product_id)?
            .ok_or_else(|| ServiceError::not_found(PRODUCT_NOT_FOUND))?;

        self.store.delete(&removed.image.public_id).await?;
        Ok(())
    }

    async fn upload_image(&self, scratch: &ScratchFile) -> ServiceResult<ProductImage> {
        let uploaded = self
            .store
            .upload(scratch.path(), UploadOptions::auto())
            .await?;

        uploaded
            .into_product_image()
            .ok_or_else(|| ServiceError::internal("Failed to upload product image"))
    }
}

fn parse_id(id: &str) -> ServiceResult<ProductId> {
    id.parse::<ProductId>()
        .map_err(|_| ServiceError::not_found(PRODUCT_NOT_FOUND))
}
