use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    color::name_color,
    db::OrmConn,
    dto::orders::{LinkedFileView, OrderItemVariantView, OrderItemView, OrderView},
    entity::{
        addresses::{Entity as Addresses, Model as AddressModel},
        order_item_variants::{
            Column as ItemVariantCol, Entity as OrderItemVariants, Model as ItemVariantModel,
        },
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders, Model as OrderModel},
        payment_methods::{Entity as PaymentMethods, Model as PaymentModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        shipping_methods::{Entity as ShippingMethods, Model as ShippingModel},
    },
    error::{AppError, AppResult},
    models::{Address, Order, PaymentMethod, Product, ShippingMethod},
    services::upload_service,
    state::AppState,
    storage::PLACEHOLDER_IMAGE_URL,
};

pub enum OrderLookup {
    ById(Uuid),
    LatestForUser(Uuid),
}

const CASH_ON_DELIVERY_CODE: &str = "cod";

/// Rebuild a renderable order from its normalized records.
///
/// Only the order fetch itself is terminal; every secondary lookup
/// (address, shipping method, payment method, products, variants, design
/// files) degrades to an empty or placeholder field so one missing join
/// never blanks the whole confirmation view.
pub async fn reconstruct_order(state: &AppState, lookup: OrderLookup) -> AppResult<OrderView> {
    let order = match lookup {
        OrderLookup::ById(id) => Orders::find_by_id(id).one(&state.orm).await?,
        OrderLookup::LatestForUser(user_id) => {
            Orders::find()
                .filter(OrderCol::UserId.eq(user_id))
                .order_by_desc(OrderCol::CreatedAt)
                .one(&state.orm)
                .await?
        }
    };
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    // Independent read-only lookups, awaited jointly.
    let (address, shipping, payment) = tokio::join!(
        fetch_address(&state.orm, order.address_id),
        fetch_shipping_method(&state.orm, order.shipping_method_id),
        fetch_payment_method(&state.orm, order.payment_method_id),
    );
    let payment_label = payment_label(payment.as_ref().map(|p| p.code.as_str())).to_string();

    let items = match OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .order_by_asc(OrderItemCol::Id)
        .all(&state.orm)
        .await
    {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(error = %err, order_id = %order.id, "order items lookup failed");
            Vec::new()
        }
    };

    // One batched query each for products and variants, regardless of the
    // item count.
    let mut product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    let products = fetch_products(&state.orm, product_ids).await;

    let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    let mut variants_by_item = fetch_item_variants(&state.orm, item_ids).await;

    let candidate_cart_ids = parse_cart_ids(order.selected_cart_ids.as_ref());
    let order_created_at = order.created_at.with_timezone(&Utc);

    let mut item_views = Vec::with_capacity(items.len());
    let mut total_weight = Decimal::ZERO;
    for item in items {
        let product = products.get(&item.product_id);

        let image_url = match product {
            Some(p) => state
                .storage
                .resolve_image(p.image_key.as_deref().unwrap_or(""), &p.category),
            None => PLACEHOLDER_IMAGE_URL.to_string(),
        };
        if let Some(p) = product {
            total_weight += p.weight_kg * Decimal::from(item.quantity);
        }

        let files = upload_service::link_files(
            &state.orm,
            order.user_id,
            order_created_at,
            item.product_id,
            &candidate_cart_ids,
        )
        .await;
        let design_files = files
            .into_iter()
            .map(|f| LinkedFileView {
                url: state.storage.resolve_uploaded_file_url(&f.storage_path),
                name: f.file_name,
                mime_type: f.mime_type,
            })
            .collect();

        let variants = variants_by_item
            .remove(&item.id)
            .unwrap_or_default()
            .into_iter()
            .map(variant_view)
            .collect();

        item_views.push(OrderItemView {
            id: item.id,
            product_name: product
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Unavailable product".to_string()),
            category: product.map(|p| p.category.clone()).unwrap_or_default(),
            image_url,
            quantity: item.quantity,
            unit_price: item.unit_price,
            total: item.total,
            variants,
            design_files,
        });
    }

    let subtotal = recompute_subtotal(&item_views);
    let shipping_cost =
        derive_shipping_cost(shipping.as_ref(), total_weight, order.total_price, subtotal);

    Ok(OrderView {
        payment_label,
        address,
        shipping_method: shipping.map(|s| s.name),
        items: item_views,
        subtotal,
        shipping_cost,
        total_weight,
        order: order_from_entity(order),
    })
}

async fn fetch_address(orm: &OrmConn, id: Uuid) -> Option<Address> {
    match Addresses::find_by_id(id).one(orm).await {
        Ok(found) => found.map(address_from_entity),
        Err(err) => {
            tracing::warn!(error = %err, "address lookup failed");
            None
        }
    }
}

async fn fetch_shipping_method(orm: &OrmConn, id: Uuid) -> Option<ShippingMethod> {
    match ShippingMethods::find_by_id(id).one(orm).await {
        Ok(found) => found.map(shipping_from_entity),
        Err(err) => {
            tracing::warn!(error = %err, "shipping method lookup failed");
            None
        }
    }
}

async fn fetch_payment_method(orm: &OrmConn, id: Uuid) -> Option<PaymentMethod> {
    match PaymentMethods::find_by_id(id).one(orm).await {
        Ok(found) => found.map(payment_from_entity),
        Err(err) => {
            tracing::warn!(error = %err, "payment method lookup failed");
            None
        }
    }
}

async fn fetch_products(orm: &OrmConn, product_ids: Vec<Uuid>) -> HashMap<Uuid, Product> {
    if product_ids.is_empty() {
        return HashMap::new();
    }
    match Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(orm)
        .await
    {
        Ok(rows) => rows
            .into_iter()
            .map(|p| (p.id, product_from_entity(p)))
            .collect(),
        Err(err) => {
            tracing::warn!(error = %err, "product batch lookup failed");
            HashMap::new()
        }
    }
}

async fn fetch_item_variants(
    orm: &OrmConn,
    item_ids: Vec<Uuid>,
) -> HashMap<Uuid, Vec<ItemVariantModel>> {
    if item_ids.is_empty() {
        return HashMap::new();
    }
    match OrderItemVariants::find()
        .filter(ItemVariantCol::OrderItemId.is_in(item_ids))
        .order_by_asc(ItemVariantCol::Id)
        .all(orm)
        .await
    {
        Ok(rows) => {
            let mut grouped: HashMap<Uuid, Vec<ItemVariantModel>> = HashMap::new();
            for row in rows {
                grouped.entry(row.order_item_id).or_default().push(row);
            }
            grouped
        }
        Err(err) => {
            tracing::warn!(error = %err, "item variant batch lookup failed");
            HashMap::new()
        }
    }
}

fn payment_label(code: Option<&str>) -> &'static str {
    match code {
        Some(CASH_ON_DELIVERY_CODE) => "Cash on delivery",
        _ => "Paid electronically",
    }
}

/// Cart-line ids the checkout step recorded for design-file linkage.
/// Absent or malformed values mean no candidates.
fn parse_cart_ids(value: Option<&serde_json::Value>) -> Vec<Uuid> {
    value
        .and_then(|v| v.as_array())
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_str())
                .filter_map(|id| Uuid::parse_str(id).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// The displayed subtotal is re-derived from the items themselves, not read
/// from the stored order total, so the breakdown stays internally
/// consistent even if the stored total used a different rounding path.
fn recompute_subtotal(items: &[OrderItemView]) -> Decimal {
    items.iter().map(|item| item.total).sum::<Decimal>().round_dp(2)
}

// Without both rates on the shipping method, fall back to the stored-total
// minus subtotal delta, clamped at zero.
fn derive_shipping_cost(
    shipping: Option<&ShippingMethod>,
    total_weight: Decimal,
    order_total: Decimal,
    subtotal: Decimal,
) -> Decimal {
    if let Some(method) = shipping {
        if let (Some(base), Some(per_kg)) = (method.base_rate, method.per_kg_rate) {
            return (base + per_kg * total_weight).round_dp(2);
        }
    }
    (order_total - subtotal).max(Decimal::ZERO).round_dp(2)
}

fn variant_view(model: ItemVariantModel) -> OrderItemVariantView {
    OrderItemVariantView {
        value: name_color(&model.group_label, &model.value_label),
        group: model.group_label,
    }
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        total_price: model.total_price,
        address_id: model.address_id,
        shipping_method_id: model.shipping_method_id,
        payment_method_id: model.payment_method_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        category: model.category,
        base_price: model.base_price,
        weight_kg: model.weight_kg,
        image_key: model.image_key,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn address_from_entity(model: AddressModel) -> Address {
    Address {
        id: model.id,
        user_id: model.user_id,
        recipient: model.recipient,
        street: model.street,
        city: model.city,
        region: model.region,
        postal_code: model.postal_code,
        phone: model.phone,
    }
}

fn shipping_from_entity(model: ShippingModel) -> ShippingMethod {
    ShippingMethod {
        id: model.id,
        name: model.name,
        base_rate: model.base_rate,
        per_kg_rate: model.per_kg_rate,
    }
}

fn payment_from_entity(model: PaymentModel) -> PaymentMethod {
    PaymentMethod {
        id: model.id,
        code: model.code,
        label: model.label,
    }
}
