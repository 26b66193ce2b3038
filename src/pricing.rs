//! Pure money math for carts and orders. Amounts are i64 in the store's
//! base currency unit.

pub const FLAT_SHIPPING_COST: i64 = 10;
pub const FREE_SHIPPING_THRESHOLD: i64 = 100;
pub const TAX_RATE_PERCENT: i64 = 8;

/// Flat-rate shipping, waived once the subtotal reaches the threshold.
pub fn shipping_cost(subtotal: i64) -> i64 {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        0
    } else {
        FLAT_SHIPPING_COST
    }
}

pub fn tax(subtotal: i64) -> i64 {
    subtotal * TAX_RATE_PERCENT / 100
}

/// (shipping_cost, tax, total) for a given subtotal.
pub fn order_totals(subtotal: i64) -> (i64, i64, i64) {
    let shipping = shipping_cost(subtotal);
    let tax = tax(subtotal);
    (shipping, tax, subtotal + shipping + tax)
}

/// The price a variant actually sells at.
pub fn effective_price(price: i64, discount_price: Option<i64>) -> i64 {
    discount_price.filter(|d| *d < price).unwrap_or(price)
}

/// A cart's total is always derived from its lines, never taken from the
/// client.
pub fn cart_total(lines: &[(i64, i32)]) -> i64 {
    lines
        .iter()
        .map(|(price, quantity)| price * i64::from(*quantity))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipping_waived_at_threshold() {
        assert_eq!(shipping_cost(99), FLAT_SHIPPING_COST);
        assert_eq!(shipping_cost(100), 0);
        assert_eq!(shipping_cost(101), 0);
    }

    #[test]
    fn totals_for_boundary_subtotal() {
        // 2 x 50 = 100: free shipping kicks in exactly at the boundary.
        let (shipping, tax, total) = order_totals(100);
        assert_eq!(shipping, 0);
        assert_eq!(tax, 8);
        assert_eq!(total, 108);
    }

    #[test]
    fn totals_below_threshold_include_flat_shipping() {
        let (shipping, tax, total) = order_totals(50);
        assert_eq!(shipping, 10);
        assert_eq!(tax, 4);
        assert_eq!(total, 64);
    }

    #[test]
    fn discount_applies_only_when_lower() {
        assert_eq!(effective_price(100, Some(80)), 80);
        assert_eq!(effective_price(100, Some(120)), 100);
        assert_eq!(effective_price(100, None), 100);
    }

    #[test]
    fn cart_total_sums_lines() {
        assert_eq!(cart_total(&[(50, 2), (30, 1)]), 130);
    }
}
