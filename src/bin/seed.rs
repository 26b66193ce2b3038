use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use storefront_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin123", "admin").await?;
    let user_id = ensure_user(&pool, "customer@example.com", "customer123", "customer").await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Customer ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(row.0)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let category_id: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, slug)
        VALUES ($1, 'Apparel', 'apparel')
        ON CONFLICT (name) DO UPDATE SET slug = EXCLUDED.slug
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .fetch_one(pool)
    .await?;

    let sizes = [("Small", "S", 1), ("Medium", "M", 2), ("Large", "L", 3)];
    let mut size_ids = Vec::new();
    for (name, code, sort) in sizes {
        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO sizes (id, name, code, sort_order)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO UPDATE SET code = EXCLUDED.code
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(code)
        .bind(sort)
        .fetch_one(pool)
        .await?;
        size_ids.push(row.0);
    }

    let colors = [("Black", "#000000"), ("Rust", "#b7410e")];
    let mut color_ids = Vec::new();
    for (name, hex) in colors {
        let row: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO colors (id, name, hex_code)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET hex_code = EXCLUDED.hex_code
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(hex)
        .fetch_one(pool)
        .await?;
        color_ids.push(row.0);
    }

    let products = [
        ("Ferris Hoodie", "ferris-hoodie", 55_i64),
        ("Crab Tee", "crab-tee", 25),
    ];
    for (name, slug, price) in products {
        let product: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO products (id, name, slug, description, category_id, base_price, main_images)
            VALUES ($1, $2, $3, $4, $5, $6, '[]')
            ON CONFLICT (slug) DO UPDATE SET base_price = EXCLUDED.base_price
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .bind(format!("{name} for Rustaceans"))
        .bind(category_id.0)
        .bind(price)
        .fetch_one(pool)
        .await?;

        for (i, size_id) in size_ids.iter().enumerate() {
            for (j, color_id) in color_ids.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO product_variants
                        (id, product_id, size_id, color_id, sku, price, stock)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    ON CONFLICT (sku) DO NOTHING
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(product.0)
                .bind(size_id)
                .bind(color_id)
                .bind(format!("{}-{}{}", slug.to_uppercase(), i, j))
                .bind(price)
                .bind(50)
                .execute(pool)
                .await?;
            }
        }
    }

    println!("Seeded catalog");
    Ok(())
}
