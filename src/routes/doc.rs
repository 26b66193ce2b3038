use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        addresses::AddressList,
        cart::{CartDetail, CartItemDetail, CartList, CartValidation, SaveCartRequest},
        catalog::{ColorList, SizeList},
        categories::{CategoryList, CategoryTree},
        orders::{
            CancelOrderRequest, CreateOrderRequest, MonthlySales, OrderDetail, OrderList,
            OrderStats,
        },
        products::{
            CreateProductRequest, CreateVariantRequest, ProductDetail, ProductList,
            UpdateProductRequest, UpdateVariantRequest, VariantList,
        },
        wishlist::{WishlistCheck, WishlistList},
    },
    models::{
        Cart, CartItem, Category, Color, Order, OrderItem, Product, ProductVariant,
        ShippingAddress, Size, StatusHistoryEntry, User, WishlistItem,
    },
    response::{ApiResponse, FieldError, Pagination},
    routes::{
        addresses, admin, auth, cart, catalog, categories, health, orders, products, variants,
        wishlist,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::toggle_product,
        products::list_variants,
        products::create_variant,
        variants::get_variant,
        variants::update_variant,
        variants::delete_variant,
        variants::toggle_variant,
        categories::list_categories,
        categories::category_tree,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        categories::toggle_category,
        catalog::list_sizes,
        catalog::create_size,
        catalog::update_size,
        catalog::delete_size,
        catalog::toggle_size,
        catalog::list_colors,
        catalog::create_color,
        catalog::update_color,
        catalog::delete_color,
        catalog::toggle_color,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_cart_items,
        cart::remove_from_cart,
        cart::validate_cart,
        addresses::list_addresses,
        addresses::get_address,
        addresses::create_address,
        addresses::update_address,
        addresses::delete_address,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        wishlist::check_wishlist,
        wishlist::move_to_cart,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::cancel_order,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::update_payment_status,
        admin::order_stats,
        admin::monthly_sales
    ),
    components(
        schemas(
            User,
            Category,
            Size,
            Color,
            Product,
            ProductVariant,
            Cart,
            CartItem,
            ShippingAddress,
            Order,
            OrderItem,
            StatusHistoryEntry,
            WishlistItem,
            CategoryList,
            CategoryTree,
            SizeList,
            ColorList,
            ProductList,
            ProductDetail,
            VariantList,
            CreateProductRequest,
            UpdateProductRequest,
            CreateVariantRequest,
            UpdateVariantRequest,
            SaveCartRequest,
            CartDetail,
            CartItemDetail,
            CartList,
            CartValidation,
            AddressList,
            WishlistList,
            WishlistCheck,
            CreateOrderRequest,
            CancelOrderRequest,
            OrderDetail,
            OrderList,
            OrderStats,
            MonthlySales,
            admin::UpdateOrderStatusRequest,
            admin::UpdatePaymentStatusRequest,
            Pagination,
            FieldError,
            ApiResponse<Product>,
            ApiResponse<ProductDetail>,
            ApiResponse<CartDetail>,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Variants", description = "Product variant endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Catalog", description = "Size and color lookups"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Addresses", description = "Shipping address endpoints"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
