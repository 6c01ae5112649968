use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

use storefront_core::{
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{
        addresses::ActiveModel as AddressActive,
        order_item_variants::ActiveModel as ItemVariantActive,
        order_items::ActiveModel as OrderItemActive,
        orders::ActiveModel as OrderActive,
        payment_methods::ActiveModel as PaymentActive,
        products::ActiveModel as ProductActive,
        shipping_methods::ActiveModel as ShippingActive,
        uploaded_files::ActiveModel as UploadActive,
    },
    error::AppError,
    services::order_service::{self, OrderLookup},
    state::AppState,
    storage::{StorageConfig, PLACEHOLDER_IMAGE_URL},
};

// Integration flow: seed a full order graph, reconstruct the view, and
// check the derived totals, file linkage tiers, and degraded fields.
#[tokio::test]
async fn reconstruct_order_view_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let user_id = Uuid::new_v4();
    let stranger_id = Uuid::new_v4();

    let tee_id = create_product(
        &state,
        "View Tee",
        "Apparel",
        Decimal::new(100, 0),
        Decimal::new(200, 3),
        Some("tee-front.png"),
    )
    .await?;
    let poster_id = create_product(
        &state,
        "View Poster",
        "Signage & Posters",
        Decimal::new(50, 0),
        Decimal::new(80, 3),
        None,
    )
    .await?;

    let address_id = create_address(&state, user_id).await?;
    let rated_shipping_id = create_shipping(
        &state,
        "Standard courier",
        Some(Decimal::new(500, 2)),
        Some(Decimal::new(250, 2)),
    )
    .await?;
    let pickup_shipping_id = create_shipping(&state, "Store pickup", None, None).await?;
    let cod_id = create_payment(&state, "cod", "Cash on delivery").await?;
    let card_id = create_payment(&state, "card", "Card payment").await?;

    // The cart line itself is gone after checkout; only its recorded id
    // matters for design-file linkage.
    let cart_id = Uuid::new_v4();
    let order_created = Utc::now() - Duration::hours(2);

    // Order 1: rate-less shipping method, stored total 500 vs recomputed
    // subtotal 450 -> delta fallback of 50.
    let order_id = create_order(
        &state,
        user_id,
        Decimal::new(500, 0),
        address_id,
        pickup_shipping_id,
        cod_id,
        Some(serde_json::json!([cart_id.to_string()])),
        order_created,
    )
    .await?;
    let tee_item_id = create_item(
        &state,
        order_id,
        tee_id,
        2,
        Decimal::new(120, 0),
        Decimal::new(240, 0),
        order_created,
    )
    .await?;
    create_item(
        &state,
        order_id,
        poster_id,
        3,
        Decimal::new(70, 0),
        Decimal::new(210, 0),
        order_created + Duration::seconds(1),
    )
    .await?;
    create_item_variant(&state, tee_item_id, "Color", "#4169E1").await?;
    create_item_variant(&state, tee_item_id, "Size", "L").await?;

    // Cart-linked upload before the order: the strongest linkage tier.
    create_upload(
        &state,
        user_id,
        Some(tee_id),
        Some(cart_id),
        "u1/front-art.pdf",
        "front-art.pdf",
        order_created - Duration::minutes(10),
    )
    .await?;
    // Same linkage but uploaded after the order was created: excluded.
    create_upload(
        &state,
        user_id,
        Some(tee_id),
        Some(cart_id),
        "u1/late-art.pdf",
        "late-art.pdf",
        order_created + Duration::minutes(10),
    )
    .await?;
    // Another user's upload: never linked.
    create_upload(
        &state,
        stranger_id,
        Some(tee_id),
        None,
        "u2/other.pdf",
        "other.pdf",
        order_created - Duration::minutes(5),
    )
    .await?;

    let view = order_service::reconstruct_order(&state, OrderLookup::ById(order_id)).await?;
    assert_eq!(view.order.id, order_id);
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.subtotal, Decimal::new(450, 0));
    assert_eq!(view.shipping_cost, Decimal::new(50, 0));
    assert_eq!(view.payment_label, "Cash on delivery");
    assert_eq!(view.shipping_method.as_deref(), Some("Store pickup"));
    assert!(view.address.is_some());
    // 2 * 0.200 + 3 * 0.080
    assert_eq!(view.total_weight, Decimal::new(640, 3));

    let tee_item = &view.items[0];
    assert_eq!(tee_item.product_name, "View Tee");
    assert_eq!(
        tee_item.image_url,
        "https://cdn.example.test/apparel-assets/tee-front.png"
    );
    assert_eq!(tee_item.design_files.len(), 1);
    assert_eq!(tee_item.design_files[0].name, "front-art.pdf");
    assert_eq!(
        tee_item.design_files[0].url,
        "https://cdn.example.test/design-uploads/u1/front-art.pdf"
    );
    let color = tee_item
        .variants
        .iter()
        .find(|v| v.group == "Color")
        .expect("color variant");
    assert_eq!(color.value, "Blue");
    let size = tee_item
        .variants
        .iter()
        .find(|v| v.group == "Size")
        .expect("size variant");
    assert_eq!(size.value, "L");

    let poster_item = &view.items[1];
    assert_eq!(poster_item.product_name, "View Poster");
    // No image key on the poster product.
    assert_eq!(poster_item.image_url, PLACEHOLDER_IMAGE_URL);
    // No cart or product match for the poster, so the user-recent tier
    // attaches the user's only in-window upload. Accepted tradeoff.
    assert_eq!(poster_item.design_files.len(), 1);
    assert_eq!(poster_item.design_files[0].name, "front-art.pdf");

    // Order 2: rated shipping method and a card payment; also the newest
    // order for the user.
    let order2_created = order_created + Duration::hours(1);
    let order2_id = create_order(
        &state,
        user_id,
        Decimal::new(126, 0),
        address_id,
        rated_shipping_id,
        card_id,
        None,
        order2_created,
    )
    .await?;
    create_item(
        &state,
        order2_id,
        tee_id,
        1,
        Decimal::new(120, 0),
        Decimal::new(120, 0),
        order2_created,
    )
    .await?;

    let latest =
        order_service::reconstruct_order(&state, OrderLookup::LatestForUser(user_id)).await?;
    assert_eq!(latest.order.id, order2_id);
    assert_eq!(latest.payment_label, "Paid electronically");
    assert_eq!(latest.subtotal, Decimal::new(120, 0));
    // 5.00 + 2.50 * 0.200, from the rates rather than the stored-total delta
    assert_eq!(latest.shipping_cost, Decimal::new(550, 2));

    // A missing order is the one terminal failure.
    let missing =
        order_service::reconstruct_order(&state, OrderLookup::ById(Uuid::new_v4())).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_item_variants, order_items, orders, cart_variants, cart, uploaded_files, addresses, shipping_methods, payment_methods, audit_logs, products RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        storage: StorageConfig::new("https://cdn.example.test"),
    })
}

async fn create_product(
    state: &AppState,
    name: &str,
    category: &str,
    base_price: Decimal,
    weight_kg: Decimal,
    image_key: Option<&str>,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        category: Set(category.to_string()),
        base_price: Set(base_price),
        weight_kg: Set(weight_kg),
        image_key: Set(image_key.map(str::to_string)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

async fn create_address(state: &AppState, user_id: Uuid) -> anyhow::Result<Uuid> {
    let address = AddressActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        recipient: Set("Test Recipient".into()),
        street: Set("1 Print Lane".into()),
        city: Set("Inktown".into()),
        region: Set("West".into()),
        postal_code: Set("12345".into()),
        phone: Set(None),
    }
    .insert(&state.orm)
    .await?;
    Ok(address.id)
}

async fn create_shipping(
    state: &AppState,
    name: &str,
    base_rate: Option<Decimal>,
    per_kg_rate: Option<Decimal>,
) -> anyhow::Result<Uuid> {
    let method = ShippingActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        base_rate: Set(base_rate),
        per_kg_rate: Set(per_kg_rate),
    }
    .insert(&state.orm)
    .await?;
    Ok(method.id)
}

async fn create_payment(state: &AppState, code: &str, label: &str) -> anyhow::Result<Uuid> {
    let method = PaymentActive {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        label: Set(label.to_string()),
    }
    .insert(&state.orm)
    .await?;
    Ok(method.id)
}

#[allow(clippy::too_many_arguments)]
async fn create_order(
    state: &AppState,
    user_id: Uuid,
    total_price: Decimal,
    address_id: Uuid,
    shipping_method_id: Uuid,
    payment_method_id: Uuid,
    selected_cart_ids: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
) -> anyhow::Result<Uuid> {
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        total_price: Set(total_price),
        address_id: Set(address_id),
        shipping_method_id: Set(shipping_method_id),
        payment_method_id: Set(payment_method_id),
        selected_cart_ids: Set(selected_cart_ids),
        created_at: Set(created_at.into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(order.id)
}

async fn create_item(
    state: &AppState,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    total: Decimal,
    created_at: DateTime<Utc>,
) -> anyhow::Result<Uuid> {
    let item = OrderItemActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        unit_price: Set(unit_price),
        total: Set(total),
        created_at: Set(created_at.into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(item.id)
}

async fn create_item_variant(
    state: &AppState,
    order_item_id: Uuid,
    group_label: &str,
    value_label: &str,
) -> anyhow::Result<()> {
    ItemVariantActive {
        id: Set(Uuid::new_v4()),
        order_item_id: Set(order_item_id),
        group_label: Set(group_label.to_string()),
        value_label: Set(value_label.to_string()),
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn create_upload(
    state: &AppState,
    user_id: Uuid,
    product_id: Option<Uuid>,
    cart_id: Option<Uuid>,
    storage_path: &str,
    file_name: &str,
    uploaded_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    UploadActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        product_id: Set(product_id),
        cart_id: Set(cart_id),
        storage_path: Set(storage_path.to_string()),
        file_name: Set(file_name.to_string()),
        mime_type: Set("application/pdf".to_string()),
        uploaded_at: Set(uploaded_at.into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}
