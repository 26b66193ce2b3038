pub mod addresses;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod catalog;
pub mod orders;
pub mod products;
pub mod wishlist;
