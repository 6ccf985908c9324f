use std::path::PathBuf;

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product::{CreateProductDto, UpdateProductDto};

/// Minimum length of a product name.
const NAME_MIN_LEN: u64 = 3;

/// Minimum length of a product description.
const DESCRIPTION_MIN_LEN: u64 = 10;

/// Result type returned by the product form helpers.
pub type ProductFormResult<T> = Result<T, ProductFormError>;

/// Errors that can occur while processing product forms.
#[derive(Debug, Error)]
pub enum ProductFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// A required text field was absent or blank.
    #[error("{field} is required")]
    MissingField { field: &'static str },
    /// The price could not be read as a finite number.
    #[error("Price must be a non-negative number")]
    InvalidPrice { value: String },
    /// A boolean field carried something other than a recognised flag.
    #[error("`{value}` is not a valid value for {field}")]
    InvalidFlag { field: &'static str, value: String },
    /// The uploaded part is not an image.
    #[error("Invalid file type, only image uploads are allowed")]
    InvalidImageType,
    /// The uploaded image could not be kept on disk for processing.
    #[error("failed to stage uploaded image: {0}")]
    Staging(String),
}

impl ProductFormError {
    /// Human-readable messages describing what was wrong with the request.
    pub fn details(&self) -> Vec<String> {
        match self {
            Self::Validation(errors) => validation_messages(errors),
            other => vec![other.to_string()],
        }
    }
}

/// Multipart payload accepted by the create and update endpoints.
#[derive(Debug, MultipartForm)]
pub struct ProductMultipartForm {
    pub name: Option<Text<String>>,
    pub description: Option<Text<String>>,
    pub price: Option<Text<String>>,
    #[multipart(rename = "inStock")]
    pub in_stock: Option<Text<String>>,
    pub image: Option<TempFile>,
}

/// Validated field set for a new product.
#[derive(Debug, Validate)]
pub struct AddProductForm {
    #[validate(length(
        min = NAME_MIN_LEN,
        message = "Name must be at least 3 characters long"
    ))]
    pub name: String,
    #[validate(length(
        min = DESCRIPTION_MIN_LEN,
        message = "Description must be at least 10 characters long"
    ))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price must be a non-negative number"))]
    pub price: f64,
    pub in_stock: bool,
}

/// Partial field set for an existing product, also accepted as JSON.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditProductForm {
    #[validate(length(
        min = NAME_MIN_LEN,
        message = "Name must be at least 3 characters long"
    ))]
    pub name: Option<String>,
    #[validate(length(
        min = DESCRIPTION_MIN_LEN,
        message = "Description must be at least 10 characters long"
    ))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must be a non-negative number"))]
    pub price: Option<f64>,
    pub in_stock: Option<bool>,
}

impl ProductMultipartForm {
    /// Validate the fields and stage the image for the create flow.
    ///
    /// A missing image is not an error here; the service decides.
    pub fn into_create_dto(self) -> ProductFormResult<CreateProductDto> {
        let ProductMultipartForm {
            name,
            description,
            price,
            in_stock,
            image,
        } = self;

        let form = AddProductForm {
            name: required_text(name, "name")?,
            description: required_text(description, "description")?,
            price: parse_price(&required_text(price, "price")?)?,
            in_stock: parse_optional_flag(in_stock, "inStock")?.unwrap_or(true),
        };
        form.validate()?;

        Ok(CreateProductDto {
            name: form.name,
            description: form.description,
            price: form.price,
            in_stock: form.in_stock,
            image_local_file_path: stage_image(image)?,
        })
    }

    /// Validate the supplied fields and stage a replacement image, if any.
    pub fn into_update_dto(self) -> ProductFormResult<UpdateProductDto> {
        let ProductMultipartForm {
            name,
            description,
            price,
            in_stock,
            image,
        } = self;

        let form = EditProductForm {
            name: optional_text(name),
            description: optional_text(description),
            price: optional_text(price)
                .map(|value| parse_price(&value))
                .transpose()?,
            in_stock: parse_optional_flag(in_stock, "inStock")?,
        };

        let mut dto = form.into_update_dto()?;
        dto.image_local_file_path = stage_image(image)?;
        Ok(dto)
    }
}

impl EditProductForm {
    /// Validates and sanitizes the payload into an image-less update.
    pub fn into_update_dto(self) -> ProductFormResult<UpdateProductDto> {
        let form = Self {
            name: self.name.map(|value| value.trim().to_string()),
            description: self.description.map(|value| value.trim().to_string()),
            ..self
        };
        form.validate()?;

        Ok(UpdateProductDto {
            name: form.name,
            description: form.description,
            price: form.price,
            in_stock: form.in_stock,
            image_local_file_path: None,
        })
    }
}

fn optional_text(field: Option<Text<String>>) -> Option<String> {
    field
        .map(|Text(value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required_text(field: Option<Text<String>>, name: &'static str) -> ProductFormResult<String> {
    optional_text(field).ok_or(ProductFormError::MissingField { field: name })
}

fn parse_price(value: &str) -> ProductFormResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .ok_or_else(|| ProductFormError::InvalidPrice {
            value: value.to_string(),
        })
}

fn parse_optional_flag(
    field: Option<Text<String>>,
    name: &'static str,
) -> ProductFormResult<Option<bool>> {
    let Some(value) = optional_text(field) else {
        return Ok(None);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(Some(true)),
        "false" | "0" | "off" | "no" => Ok(Some(false)),
        _ => Err(ProductFormError::InvalidFlag { field: name, value }),
    }
}

/// Keep an accepted image part on disk and return its path.
///
/// Parts that are dropped here are deleted together with their temp file.
fn stage_image(image: Option<TempFile>) -> ProductFormResult<Option<PathBuf>> {
    let Some(image) = image else {
        return Ok(None);
    };
    if image.size == 0 {
        return Ok(None);
    }

    let is_image = image
        .content_type
        .as_ref()
        .is_some_and(|mime| mime.type_().as_str() == "image");
    if !is_image {
        return Err(ProductFormError::InvalidImageType);
    }

    let (_, path) = image
        .file
        .keep()
        .map_err(|err| ProductFormError::Staging(err.to_string()))?;
    Ok(Some(path))
}

fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    messages.sort();
    messages
}
