pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod colors;
pub mod order_items;
pub mod order_status_history;
pub mod orders;
pub mod product_variants;
pub mod products;
pub mod shipping_addresses;
pub mod sizes;
pub mod users;
pub mod wishlist_items;

pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use colors::Entity as Colors;
pub use order_items::Entity as OrderItems;
pub use order_status_history::Entity as OrderStatusHistory;
pub use orders::Entity as Orders;
pub use product_variants::Entity as ProductVariants;
pub use products::Entity as Products;
pub use shipping_addresses::Entity as ShippingAddresses;
pub use sizes::Entity as Sizes;
pub use users::Entity as Users;
pub use wishlist_items::Entity as WishlistItems;
