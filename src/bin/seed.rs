use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use storefront_core::{config::AppConfig, db::create_pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    seed_products(&pool).await?;
    seed_shipping_methods(&pool).await?;
    seed_payment_methods(&pool).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = vec![
        (
            "Classic Tee",
            "Plain cotton tee, printable front and back",
            "Apparel",
            Decimal::new(2500, 2),
            Decimal::new(200, 3),
            Some("classic-tee.png"),
        ),
        (
            "Canvas Tote",
            "Heavy canvas tote bag",
            "Accessories",
            Decimal::new(1800, 2),
            Decimal::new(150, 3),
            Some("canvas-tote.png"),
        ),
        (
            "Vinyl Sticker Sheet",
            "Die-cut sticker sheet, weatherproof",
            "Cards & Stickers",
            Decimal::new(700, 2),
            Decimal::new(20, 3),
            None,
        ),
        (
            "Event Poster A2",
            "Matte poster print",
            "Signage & Posters",
            Decimal::new(1200, 2),
            Decimal::new(80, 3),
            Some("poster-a2.png"),
        ),
    ];

    for (name, desc, category, price, weight, image_key) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, category, base_price, weight_kg, image_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(category)
        .bind(price)
        .bind(weight)
        .bind(image_key)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_shipping_methods(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let methods: Vec<(&str, Option<Decimal>, Option<Decimal>)> = vec![
        ("Standard courier", Some(Decimal::new(500, 2)), Some(Decimal::new(250, 2))),
        ("Store pickup", None, None),
    ];

    for (name, base_rate, per_kg_rate) in methods {
        sqlx::query(
            r#"
            INSERT INTO shipping_methods (id, name, base_rate, per_kg_rate)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(base_rate)
        .bind(per_kg_rate)
        .execute(pool)
        .await?;
    }

    println!("Seeded shipping methods");
    Ok(())
}

async fn seed_payment_methods(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let methods = vec![("cod", "Cash on delivery"), ("card", "Card payment")];

    for (code, label) in methods {
        sqlx::query(
            r#"
            INSERT INTO payment_methods (id, code, label)
            VALUES ($1, $2, $3)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(code)
        .bind(label)
        .execute(pool)
        .await?;
    }

    println!("Seeded payment methods");
    Ok(())
}
