//! Server-side order pricing.
//!
//! Amounts charged to a customer come only from here. Client-declared prices on cart
//! items are ignored.

use crate::domain::account::Amount;
use crate::domain::order::{CartItem, Coupon};
use crate::domain::product::Catalog;
use crate::error::{OrderError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Computes the trusted amount for `items` against a catalog snapshot.
///
/// Each line is priced at the catalog's unit price times the requested quantity. A
/// coupon other than the `"nil"` sentinel then takes `discount` percent off the sum.
///
/// # Errors
///
/// * `InvalidReference` if an item names a product the catalog does not contain.
/// * `ValidationError` if the coupon's discount lies outside 0..=100, or if the total does
///   not fit in a `Decimal`.
pub fn compute_amount(
    catalog: &Catalog,
    items: &[CartItem],
    coupon: Option<&Coupon>,
) -> Result<Amount> {
    let subtotal = items.iter().try_fold(Decimal::ZERO, |sum, item| -> Result<Decimal> {
        let product = catalog
            .get(&item.product)
            .ok_or_else(|| OrderError::InvalidReference(item.product.clone()))?;
        product
            .price
            .value()
            .checked_mul(Decimal::from(item.quantity))
            .and_then(|line| sum.checked_add(line))
            .ok_or_else(|| overflow(&item.product.to_string()))
    })?;

    let total = match coupon {
        Some(coupon) if coupon.applies() => {
            coupon.validate()?;
            subtotal
                .checked_mul(coupon.discount)
                .and_then(|off| off.checked_div(dec!(100)))
                .and_then(|off| subtotal.checked_sub(off))
                .ok_or_else(|| overflow(&coupon.name))?
        }
        _ => subtotal,
    };

    Amount::new(total)
}

fn overflow(context: &str) -> OrderError {
    OrderError::ValidationError(format!("Order total is too large to price ({context})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::NO_COUPON;
    use crate::domain::product::{Product, ProductId};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn catalog() -> Catalog {
        vec![
            Product::new("p1", Amount::new(dec!(1000)).unwrap(), 5),
            Product::new("p2", Amount::new(dec!(249.99)).unwrap(), 5),
        ]
        .into_iter()
        .collect()
    }

    fn random_catalog(rng: &mut StdRng) -> (Catalog, Vec<Product>) {
        let products: Vec<Product> = (0..rng.gen_range(1..20))
            .map(|i| {
                let cents = rng.gen_range(0..1_000_000i64);
                Product::new(
                    format!("p{i}"),
                    Amount::new(Decimal::new(cents, 2)).unwrap(),
                    100,
                )
            })
            .collect();
        (products.iter().cloned().collect(), products)
    }

    fn random_cart(rng: &mut StdRng, products: &[Product]) -> Vec<CartItem> {
        (0..rng.gen_range(0..10))
            .map(|_| {
                let product = &products[rng.gen_range(0..products.len())];
                CartItem::new(product.id.clone(), rng.gen_range(1..50))
            })
            .collect()
    }

    #[test]
    fn test_subtotal_without_coupon() {
        let items = vec![CartItem::new("p1", 2), CartItem::new("p2", 1)];
        let amount = compute_amount(&catalog(), &items, None).unwrap();
        assert_eq!(amount.value(), dec!(2249.99));
    }

    #[test]
    fn test_client_price_is_ignored() {
        let mut item = CartItem::new("p1", 2);
        item.price = Some(dec!(1));
        let amount = compute_amount(&catalog(), &[item], None).unwrap();
        assert_eq!(amount.value(), dec!(2000));
    }

    #[test]
    fn test_coupon_discount() {
        let items = vec![CartItem::new("p1", 2)];
        let coupon = Coupon::new("SPRING", dec!(15)).unwrap();
        let amount = compute_amount(&catalog(), &items, Some(&coupon)).unwrap();
        assert_eq!(amount.value(), dec!(1700));
    }

    #[test]
    fn test_full_discount_is_free() {
        let items = vec![CartItem::new("p1", 2)];
        let coupon = Coupon::new("STAFF", dec!(100)).unwrap();
        let amount = compute_amount(&catalog(), &items, Some(&coupon)).unwrap();
        assert_eq!(amount, Amount::ZERO);
    }

    #[test]
    fn test_nil_coupon_matches_no_coupon() {
        let items = vec![CartItem::new("p1", 2), CartItem::new("p2", 3)];
        let nil = Coupon::new(NO_COUPON, dec!(90)).unwrap();
        assert_eq!(
            compute_amount(&catalog(), &items, Some(&nil)).unwrap(),
            compute_amount(&catalog(), &items, None).unwrap()
        );
    }

    fn single_product(price: Decimal) -> Catalog {
        std::iter::once(Product::new("p1", Amount::new(price).unwrap(), 5)).collect()
    }

    #[test]
    fn test_huge_quantity_is_rejected_not_panicking() {
        let catalog = single_product(Decimal::from_i128_with_scale(10i128.pow(20), 0));
        let items = vec![CartItem::new("p1", u32::MAX)];

        let result = compute_amount(&catalog, &items, None);
        assert!(matches!(result, Err(OrderError::ValidationError(msg)) if msg.contains("too large")));
    }

    #[test]
    fn test_overflowing_sum_is_rejected() {
        let catalog = single_product(Decimal::MAX);
        let items = vec![CartItem::new("p1", 1), CartItem::new("p1", 1)];

        assert!(matches!(
            compute_amount(&catalog, &items, None),
            Err(OrderError::ValidationError(_))
        ));
    }

    #[test]
    fn test_unknown_product() {
        let items = vec![CartItem::new("p1", 1), CartItem::new("ghost", 1)];
        let result = compute_amount(&catalog(), &items, None);
        assert!(matches!(
            result,
            Err(OrderError::InvalidReference(id)) if id == ProductId::from("ghost")
        ));
    }

    #[test]
    fn test_out_of_range_coupon_is_rejected() {
        let items = vec![CartItem::new("p1", 1)];
        let coupon = Coupon {
            name: "BROKEN".to_string(),
            discount: dec!(150),
        };
        assert!(matches!(
            compute_amount(&catalog(), &items, Some(&coupon)),
            Err(OrderError::ValidationError(_))
        ));
    }

    #[test]
    fn test_empty_cart_costs_nothing() {
        assert_eq!(compute_amount(&catalog(), &[], None).unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_random_carts_sum_catalog_prices() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let (catalog, products) = random_catalog(&mut rng);
            let items = random_cart(&mut rng, &products);

            let expected: Decimal = items
                .iter()
                .map(|i| catalog.get(&i.product).unwrap().price.value() * Decimal::from(i.quantity))
                .sum();
            let amount = compute_amount(&catalog, &items, None).unwrap();
            assert_eq!(amount.value(), expected);
        }
    }

    #[test]
    fn test_random_coupons_scale_base_amount() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let (catalog, products) = random_catalog(&mut rng);
            let items = random_cart(&mut rng, &products);
            let discount = Decimal::from(rng.gen_range(0..=100u32));
            let coupon = Coupon::new("RANDOM", discount).unwrap();

            let base = compute_amount(&catalog, &items, None).unwrap().value();
            let discounted = compute_amount(&catalog, &items, Some(&coupon)).unwrap();
            assert_eq!(
                discounted.value(),
                base * (Decimal::ONE - discount / dec!(100))
            );
        }
    }
}
