//! Cart and wishlist line items.
//!
//! Both records are denormalized snapshots of a catalog product taken when
//! the shopper adds it. Display fields are never re-fetched or revalidated
//! by the stores. JSON field names are camelCase and unknown fields are
//! ignored on read, so older snapshots keep loading as display fields evolve.
//! Prices go through [`amount_serde`] so a non-finite amount survives a
//! snapshot round-trip.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, VariantId};
use super::price::amount_serde;

/// One line in the cart.
///
/// The merge key is `variant_id`. `size` and `color` are expected to already
/// be encoded by the caller into distinct variant IDs; the store never checks
/// that they agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Composite identity, `"{product_id}-{variant_id}"`.
    #[serde(default)]
    pub id: String,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub slug: String,
    /// List unit price at add-time.
    #[serde(with = "amount_serde")]
    pub price: f64,
    /// Sale unit price at add-time, when the product was on sale.
    #[serde(
        default,
        with = "amount_serde::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sale_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// At least 1 while the line is in the cart. `add_item` does not
    /// validate it, so a caller-supplied value is stored as-is.
    pub quantity: i64,
}

impl CartLineItem {
    /// Create a line item with the required fields.
    ///
    /// The composite `id` is derived from the product and variant IDs.
    #[must_use]
    pub fn new(
        product_id: impl Into<ProductId>,
        variant_id: impl Into<VariantId>,
        name: impl Into<String>,
        price: f64,
        quantity: i64,
    ) -> Self {
        let product_id = product_id.into();
        let variant_id = variant_id.into();
        Self {
            id: Self::composite_id(&product_id, &variant_id),
            product_id,
            variant_id,
            name: name.into(),
            image: String::new(),
            slug: String::new(),
            price,
            sale_price: None,
            size: None,
            color: None,
            quantity,
        }
    }

    /// Build the composite identity for a product/variant pair.
    #[must_use]
    pub fn composite_id(product_id: &ProductId, variant_id: &VariantId) -> String {
        format!("{product_id}-{variant_id}")
    }

    #[must_use]
    pub fn with_sale_price(mut self, sale_price: f64) -> Self {
        self.sale_price = Some(sale_price);
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Price charged per unit: the sale price when present, else list price.
    #[must_use]
    pub fn unit_price(&self) -> f64 {
        self.sale_price.unwrap_or(self.price)
    }

    /// Unit price times quantity.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Cart quantities never approach 2^53
    pub fn line_total(&self) -> f64 {
        self.unit_price() * self.quantity as f64
    }
}

/// One product saved to the wishlist.
///
/// The merge key is `product_id`. Membership is boolean, so there is no
/// quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "amount_serde")]
    pub price: f64,
    #[serde(
        default,
        with = "amount_serde::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sale_price: Option<f64>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub slug: String,
}

impl WishlistItem {
    /// Create a wishlist item with the required fields.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, name: impl Into<String>, price: f64) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            price,
            sale_price: None,
            image: String::new(),
            slug: String::new(),
        }
    }

    #[must_use]
    pub fn with_sale_price(mut self, sale_price: f64) -> Self {
        self.sale_price = Some(sale_price);
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    /// Price shown to the shopper: the sale price when present.
    #[must_use]
    pub fn unit_price(&self) -> f64 {
        self.sale_price.unwrap_or(self.price)
    }
}
