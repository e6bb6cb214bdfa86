//! Product listing data model.

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// A product record from the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    /// Card image. The build-time endpoint calls this field `image`.
    #[serde(default, alias = "image")]
    pub thumbnail: String,
}

/// The products returned by one fetch. Replaced wholesale, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProductListing(Vec<Product>);

/// `{"products": [...]}` body. A missing or null field is an empty listing.
#[derive(Deserialize)]
struct WrappedListing {
    #[serde(default)]
    products: Option<Vec<Product>>,
}

impl ProductListing {
    /// Wrap already-decoded products.
    pub fn new(products: Vec<Product>) -> Self {
        Self(products)
    }

    /// Decode a listing body.
    ///
    /// Accepts `{"products": [...]}` (a missing or null field yields an
    /// empty listing) or a bare array.
    pub fn from_json(body: &[u8]) -> Result<Self, FetchError> {
        let is_array = body
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .map_or(false, |b| *b == b'[');

        let products = if is_array {
            serde_json::from_slice::<Vec<Product>>(body)?
        } else {
            serde_json::from_slice::<WrappedListing>(body)?
                .products
                .unwrap_or_default()
        };
        Ok(Self(products))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Product] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ProductListing {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
