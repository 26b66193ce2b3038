use storefront_api::{
    db::{create_orm_conn, create_pool},
    dto::{
        addresses::{CreateAddressRequest, UpdateAddressRequest},
        wishlist::AddWishlistRequest,
    },
    middleware::auth::AuthUser,
    services::{address_service, cart_service, wishlist_service},
    state::AppState,
};
use uuid::Uuid;

static DB_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

fn address_payload(is_default: bool) -> CreateAddressRequest {
    CreateAddressRequest {
        full_name: "Test User".into(),
        phone: "555-0100".into(),
        address_line1: "1 Main St".into(),
        address_line2: None,
        city: "Springfield".into(),
        state: None,
        postal_code: "12345".into(),
        country: "US".into(),
        is_default,
    }
}

// However many addresses exist, saving one as default leaves exactly one
// default; deleting the default promotes the newest survivor.
#[tokio::test]
async fn default_address_invariant() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let user_id = create_user(&state, "addr-customer@example.com").await?;
    let user = AuthUser {
        user_id,
        role: "customer".into(),
    };

    let first = address_service::create_address(&state.pool, &user, address_payload(true))
        .await?
        .data
        .unwrap();
    let second = address_service::create_address(&state.pool, &user, address_payload(true))
        .await?
        .data
        .unwrap();
    assert_eq!(default_count(&state, user_id).await?, 1);

    // Flipping the default back via update unsets the other.
    address_service::update_address(
        &state.pool,
        &user,
        first.id,
        UpdateAddressRequest {
            full_name: None,
            phone: None,
            address_line1: None,
            address_line2: None,
            city: None,
            state: None,
            postal_code: None,
            country: None,
            is_default: Some(true),
        },
    )
    .await?;
    assert_eq!(default_count(&state, user_id).await?, 1);
    assert!(is_default(&state, first.id).await?);

    // Deleting the default promotes the most recently created survivor.
    address_service::delete_address(&state.pool, &user, first.id).await?;
    assert_eq!(default_count(&state, user_id).await?, 1);
    assert!(is_default(&state, second.id).await?);

    // Deleting the last address leaves zero defaults.
    address_service::delete_address(&state.pool, &user, second.id).await?;
    assert_eq!(default_count(&state, user_id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn wishlist_set_semantics_and_move_to_cart() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let user_id = create_user(&state, "wish-customer@example.com").await?;
    let user = AuthUser {
        user_id,
        role: "customer".into(),
    };
    let product_id = seed_product(&state, 40).await?;

    wishlist_service::add_to_wishlist(
        &state.pool,
        &user,
        AddWishlistRequest { product_id },
    )
    .await?;

    // Second add is a set violation; the wishlist is unchanged.
    let dup = wishlist_service::add_to_wishlist(
        &state.pool,
        &user,
        AddWishlistRequest { product_id },
    )
    .await;
    assert!(dup.is_err());
    let list = wishlist_service::list_wishlist(
        &state.pool,
        &user,
        storefront_api::routes::params::Pagination {
            page: None,
            limit: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(list.count, 1);

    let check = wishlist_service::check_wishlist(&state.pool, &user, product_id)
        .await?
        .data
        .unwrap();
    assert!(check.in_wishlist);

    // Moving puts one unit at base price into the cart and clears the entry.
    let cart = wishlist_service::move_to_cart(&state, &user, product_id)
        .await?
        .data
        .unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 1);
    assert_eq!(cart.items[0].price, 40);

    let check = wishlist_service::check_wishlist(&state.pool, &user, product_id)
        .await?
        .data
        .unwrap();
    assert!(!check.in_wishlist);

    // And the cart total was recomputed from the moved line.
    let cart = cart_service::get_cart(&state, &user).await?.data.unwrap();
    assert_eq!(cart.total_amount, 40);

    Ok(())
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

    sqlx::query(
        "TRUNCATE TABLE order_status_history, order_items, orders, cart_items, carts, \
         wishlist_items, shipping_addresses, product_variants, products, colors, sizes, \
         categories, audit_logs, users RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    Ok(Some(AppState { pool, orm }))
}

async fn create_user(state: &AppState, email: &str) -> anyhow::Result<Uuid> {
    let row: (Uuid,) = sqlx::query_as(
        "INSERT INTO users (id, email, password_hash, role) VALUES ($1, $2, 'dummy', 'customer') RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .fetch_one(&state.pool)
    .await?;
    Ok(row.0)
}

async fn seed_product(state: &AppState, base_price: i64) -> anyhow::Result<Uuid> {
    let category: (Uuid,) = sqlx::query_as(
        "INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(format!("Category {}", Uuid::new_v4()))
    .bind(format!("category-{}", Uuid::new_v4()))
    .fetch_one(&state.pool)
    .await?;

    let product: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO products (id, name, slug, category_id, base_price, main_images)
        VALUES ($1, 'Wish Widget', $2, $3, $4, '[]')
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(format!("wish-widget-{}", Uuid::new_v4()))
    .bind(category.0)
    .bind(base_price)
    .fetch_one(&state.pool)
    .await?;
    Ok(product.0)
}

async fn default_count(state: &AppState, user_id: Uuid) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM shipping_addresses WHERE user_id = $1 AND is_default",
    )
    .bind(user_id)
    .fetch_one(&state.pool)
    .await?;
    Ok(row.0)
}

async fn is_default(state: &AppState, id: Uuid) -> anyhow::Result<bool> {
    let row: (bool,) = sqlx::query_as("SELECT is_default FROM shipping_addresses WHERE id = $1")
        .bind(id)
        .fetch_one(&state.pool)
        .await?;
    Ok(row.0)
}
