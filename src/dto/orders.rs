use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Address, Order};

/// A fully composed, renderable order: header, resolved joins, per-item
/// imagery/variants/design files, and independently re-derived totals.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub order: Order,
    pub payment_label: String,
    pub address: Option<Address>,
    pub shipping_method: Option<String>,
    pub items: Vec<OrderItemView>,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub total_weight: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_name: String,
    pub category: String,
    pub image_url: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub variants: Vec<OrderItemVariantView>,
    pub design_files: Vec<LinkedFileView>,
}

#[derive(Debug, Serialize)]
pub struct OrderItemVariantView {
    pub group: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct LinkedFileView {
    pub name: String,
    pub url: String,
    pub mime_type: String,
}
