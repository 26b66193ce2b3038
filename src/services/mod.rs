pub mod address_service;
pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod category_service;
pub mod order_service;
pub mod product_service;
pub mod variant_service;
pub mod wishlist_service;

/// URL slug derived from a display name: lowercased, alphanumerics kept,
/// runs of anything else collapsed to single dashes.
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugify_normalizes() {
        assert_eq!(slugify("Summer T-Shirt"), "summer-t-shirt");
        assert_eq!(slugify("  Éclair &  Co. "), "clair-co");
        assert_eq!(slugify("UPPER"), "upper");
    }
}
