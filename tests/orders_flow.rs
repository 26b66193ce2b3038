use storefront_api::{
    db::{create_orm_conn, create_pool},
    dto::{
        cart::{CartLineInput, SaveCartRequest},
        orders::{CancelOrderRequest, CreateOrderRequest},
    },
    middleware::auth::AuthUser,
    services::{admin_service, cart_service, order_service},
    state::AppState,
};
use uuid::Uuid;

// Tests share one database and truncate it in setup, so they take turns.
static DB_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

// Integration flow: add to cart (merging lines) -> place order -> cancel.
// 2 x 50 = 100 subtotal sits exactly on the free-shipping boundary, so
// total = 100 + 0 + 8.
#[tokio::test]
async fn checkout_and_cancel_flow() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    // Allow skipping when no DB is configured in the environment.
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let user_id = create_user(&state, "customer", "flow-customer@example.com").await?;
    let admin_id = create_user(&state, "admin", "flow-admin@example.com").await?;
    let auth_user = AuthUser {
        user_id,
        role: "customer".into(),
    };
    let auth_admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };

    let catalog = seed_catalog(&state, 50, 10).await?;
    let address_id = create_address(&state, user_id, true).await?;

    // Two adds of the same (product, variant) merge into one line.
    for _ in 0..2 {
        cart_service::add_to_cart(
            &state,
            &auth_user,
            SaveCartRequest {
                // Deliberately wrong: the stored total must be recomputed.
                total_amount: Some(999),
                items: vec![CartLineInput {
                    product_id: catalog.product_id,
                    variant_id: Some(catalog.variant_id),
                    quantity: 1,
                    price: None,
                }],
            },
        )
        .await?;
    }

    let cart = cart_service::get_cart(&state, &auth_user).await?.data.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);
    assert_eq!(cart.total_amount, 100);

    let stored_total: (i64,) =
        sqlx::query_as("SELECT total_amount FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(stored_total.0, 100, "client-supplied total must be ignored");

    // Place the order.
    let detail = order_service::create_order(
        &state,
        &auth_user,
        CreateOrderRequest {
            shipping_address_id: address_id,
            payment_method: "card".into(),
            notes: None,
        },
    )
    .await?
    .data
    .unwrap();

    assert!(detail.order.order_number.starts_with("ORD"));
    assert_eq!(detail.order.subtotal, 100);
    assert_eq!(detail.order.shipping_cost, 0, "waived at the boundary");
    assert_eq!(detail.order.tax, 8);
    assert_eq!(detail.order.total, 108);
    assert_eq!(detail.order.status, "pending");
    assert_eq!(detail.order.payment_status, "pending");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].total, 100);
    assert_eq!(detail.status_history.len(), 1);

    assert_eq!(variant_stock(&state, catalog.variant_id).await?, 8);

    let cart = cart_service::get_cart(&state, &auth_user).await?.data.unwrap();
    assert!(cart.items.is_empty(), "cart must be emptied at checkout");
    assert_eq!(cart.total_amount, 0);

    // Ordering from the now-empty cart fails and creates nothing.
    let err = order_service::create_order(
        &state,
        &auth_user,
        CreateOrderRequest {
            shipping_address_id: address_id,
            payment_method: "card".into(),
            notes: None,
        },
    )
    .await;
    assert!(err.is_err(), "empty cart must be rejected");
    let order_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(order_count.0, 1);

    // Cancel: stock restored, history appended, terminal afterwards.
    let cancelled = order_service::cancel_order(
        &state,
        &auth_user,
        detail.order.id,
        CancelOrderRequest {
            reason: Some("changed my mind".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cancelled.order.status, "cancelled");
    assert!(cancelled.order.cancelled_at.is_some());
    assert_eq!(cancelled.status_history.len(), 2);
    assert_eq!(variant_stock(&state, catalog.variant_id).await?, 10);

    let again = order_service::cancel_order(
        &state,
        &auth_user,
        detail.order.id,
        CancelOrderRequest { reason: None },
    )
    .await;
    assert!(again.is_err(), "cancelled is terminal");

    let relabel =
        admin_service::update_order_status(&state, &auth_admin, detail.order.id, "shipped".into())
            .await;
    assert!(relabel.is_err(), "cancelled orders cannot change status");

    // Admin aggregation sees the one (cancelled) order.
    let stats = admin_service::get_order_stats(&state, &auth_admin)
        .await?
        .data
        .unwrap();
    assert_eq!(stats.total_orders, 1);
    assert_eq!(stats.total_revenue, 0, "no paid orders yet");
    assert!(stats.by_status.iter().any(|s| s.status == "cancelled"));

    Ok(())
}

// Shipping kicks in below the boundary: 1 x 50 -> 50 + 10 + 4.
#[tokio::test]
async fn checkout_below_free_shipping_threshold() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let user_id = create_user(&state, "customer", "threshold-customer@example.com").await?;
    let auth_user = AuthUser {
        user_id,
        role: "customer".into(),
    };
    let catalog = seed_catalog(&state, 50, 5).await?;
    let address_id = create_address(&state, user_id, true).await?;

    cart_service::add_to_cart(
        &state,
        &auth_user,
        SaveCartRequest {
            total_amount: None,
            items: vec![CartLineInput {
                product_id: catalog.product_id,
                variant_id: Some(catalog.variant_id),
                quantity: 1,
                price: None,
            }],
        },
    )
    .await?;

    let detail = order_service::create_order(
        &state,
        &auth_user,
        CreateOrderRequest {
            shipping_address_id: address_id,
            payment_method: "card".into(),
            notes: None,
        },
    )
    .await?
    .data
    .unwrap();

    assert_eq!(detail.order.subtotal, 50);
    assert_eq!(detail.order.shipping_cost, 10);
    assert_eq!(detail.order.tax, 4);
    assert_eq!(detail.order.total, 64);

    Ok(())
}

struct Catalog {
    product_id: Uuid,
    variant_id: Uuid,
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Clean tables between runs.
    sqlx::query(
        "TRUNCATE TABLE order_status_history, order_items, orders, cart_items, carts, \
         wishlist_items, shipping_addresses, product_variants, products, colors, sizes, \
         categories, audit_logs, users RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    Ok(Some(AppState { pool, orm }))
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let row: (Uuid,) = sqlx::query_as(
        "INSERT INTO users (id, email, password_hash, role) VALUES ($1, $2, 'dummy', $3) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(role)
    .fetch_one(&state.pool)
    .await?;
    Ok(row.0)
}

async fn seed_catalog(state: &AppState, price: i64, stock: i32) -> anyhow::Result<Catalog> {
    let category: (Uuid,) = sqlx::query_as(
        "INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(format!("Category {}", Uuid::new_v4()))
    .bind(format!("category-{}", Uuid::new_v4()))
    .fetch_one(&state.pool)
    .await?;

    let size: (Uuid,) = sqlx::query_as(
        "INSERT INTO sizes (id, name, code) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(format!("Size {}", Uuid::new_v4()))
    .bind(format!("S-{}", Uuid::new_v4()))
    .fetch_one(&state.pool)
    .await?;

    let color: (Uuid,) = sqlx::query_as(
        "INSERT INTO colors (id, name, hex_code) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(format!("Color {}", Uuid::new_v4()))
    .bind(format!("#{}", &Uuid::new_v4().simple().to_string()[..6]))
    .fetch_one(&state.pool)
    .await?;

    let product: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO products (id, name, slug, category_id, base_price, main_images)
        VALUES ($1, $2, $3, $4, $5, '["test.jpg"]')
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("Test Widget")
    .bind(format!("test-widget-{}", Uuid::new_v4()))
    .bind(category.0)
    .bind(price)
    .fetch_one(&state.pool)
    .await?;

    let variant: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO product_variants (id, product_id, size_id, color_id, sku, price, stock)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(product.0)
    .bind(size.0)
    .bind(color.0)
    .bind(format!("SKU-{}", Uuid::new_v4()))
    .bind(price)
    .bind(stock)
    .fetch_one(&state.pool)
    .await?;

    Ok(Catalog {
        product_id: product.0,
        variant_id: variant.0,
    })
}

async fn create_address(state: &AppState, user_id: Uuid, is_default: bool) -> anyhow::Result<Uuid> {
    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO shipping_addresses
            (id, user_id, full_name, phone, address_line1, city, postal_code, country, is_default)
        VALUES ($1, $2, 'Test User', '555-0100', '1 Main St', 'Springfield', '12345', 'US', $3)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(is_default)
    .fetch_one(&state.pool)
    .await?;
    Ok(row.0)
}

async fn variant_stock(state: &AppState, variant_id: Uuid) -> anyhow::Result<i32> {
    let row: (i32,) = sqlx::query_as("SELECT stock FROM product_variants WHERE id = $1")
        .bind(variant_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(row.0)
}
