use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Opaque identifier assigned to a product by the repository.
///
/// On the wire the identifier is always a string; internally it is the
/// positive row id of the `products` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductId(i32);

/// Returned when a string cannot be interpreted as a [`ProductId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a valid product id")]
pub struct InvalidProductId(pub String);

impl ProductId {
    /// Wrap a raw row id. Only positive values are valid identifiers.
    pub fn new(value: i32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl FromStr for ProductId {
    type Err = InvalidProductId;

    /// Only plain ASCII digits without leading zeros are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidProductId(s.to_string()));
        }
        s.parse::<i32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| InvalidProductId(s.to_string()))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Hosted image attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    /// Public HTTPS URL served by the image store.
    pub secure_url: String,
    /// Identifier used to delete the image from the store.
    pub public_id: String,
}

impl ProductImage {
    pub fn new(secure_url: impl Into<String>, public_id: impl Into<String>) -> Self {
        Self {
            secure_url: secure_url.into(),
            public_id: public_id.into(),
        }
    }
}

/// Domain representation of a catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Non-negative unit price.
    pub price: f64,
    pub in_stock: bool,
    /// Every persisted product carries exactly one image.
    pub image: ProductImage,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub in_stock: bool,
    pub image: ProductImage,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewProduct {
    /// Build a new in-stock product payload stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        image: ProductImage,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            name: name.into(),
            description: description.into(),
            price,
            in_stock: true,
            image,
            created_at: now,
            updated_at: now,
        }
    }

    /// Override the stock flag.
    pub fn in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = in_stock;
        self
    }
}

/// Patch data applied when updating an existing product.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub in_stock: Option<bool>,
    pub image: Option<ProductImage>,
    pub updated_at: NaiveDateTime,
}

impl Default for UpdateProduct {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateProduct {
    /// Create a patch with no changes besides a fresh `updated_at`.
    pub fn new() -> Self {
        Self {
            name: None,
            description: None,
            price: None,
            in_stock: None,
            image: None,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }

    pub fn image(mut self, image: ProductImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// Validated input for the create flow.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateProductDto {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub in_stock: bool,
    /// Scratch file holding the uploaded image, if the request carried one.
    pub image_local_file_path: Option<PathBuf>,
}

/// Validated input for the update flow. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProductDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub in_stock: Option<bool>,
    /// Present only when the caller supplied a replacement image.
    pub image_local_file_path: Option<PathBuf>,
}
