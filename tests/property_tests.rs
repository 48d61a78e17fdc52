use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;

use storefront_cart::models::{format_price, Cart, CartLineItem, Product, ProductId};

#[derive(Debug, Clone)]
enum CartStep {
    Push(ProductId),
    Set(ProductId, u32),
    Remove(ProductId),
}

fn arb_product(id: ProductId) -> Product {
    Product {
        id,
        title: format!("Tênis {id}"),
        price: Decimal::new(i64::try_from(id).unwrap_or(0) * 1000 + 99, 2),
        image: format!("https://cdn.example.com/{id}.jpg"),
    }
}

fn arb_step() -> impl Strategy<Value = CartStep> {
    prop_oneof![
        (1u64..8).prop_map(CartStep::Push),
        (1u64..8, 0u32..6).prop_map(|(id, amount)| CartStep::Set(id, amount)),
        (1u64..8).prop_map(CartStep::Remove),
    ]
}

fn arb_line_items() -> impl Strategy<Value = Vec<CartLineItem>> {
    prop::collection::btree_map(1u64..10_000, (1i64..100_000_000, 1u32..50), 0..12).prop_map(
        |entries| {
            entries
                .into_iter()
                .map(|(id, (cents, amount))| CartLineItem {
                    id,
                    title: format!("Produto {id}"),
                    price: Decimal::new(cents, 2),
                    image: format!("https://cdn.example.com/{id}.jpg"),
                    amount,
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn test_cart_invariants_hold_under_any_steps(
        steps in prop::collection::vec(arb_step(), 0..40)
    ) {
        let mut cart = Cart::new();

        for step in steps {
            match step {
                CartStep::Push(id) => {
                    let before = cart.get_item_amount(id);
                    let appended = cart.push_product(arb_product(id));
                    prop_assert_eq!(appended, before == 0);
                    prop_assert_eq!(cart.get_item_amount(id), before.max(1));
                }
                CartStep::Set(id, amount) => {
                    let before = cart.get_item_amount(id);
                    let applied = cart.set_item_amount(id, amount);
                    if amount == 0 || before == 0 {
                        prop_assert!(!applied);
                        prop_assert_eq!(cart.get_item_amount(id), before);
                    } else {
                        prop_assert!(applied);
                        prop_assert_eq!(cart.get_item_amount(id), amount);
                    }
                }
                CartStep::Remove(id) => {
                    let was_present = cart.contains_item(id);
                    let removed = cart.remove_item(id);
                    prop_assert_eq!(removed.is_some(), was_present);
                    prop_assert!(!cart.contains_item(id));
                }
            }

            let ids: HashSet<ProductId> = cart.items().iter().map(|item| item.id).collect();
            prop_assert_eq!(ids.len(), cart.len());
            prop_assert!(cart.items().iter().all(|item| item.amount >= 1));
        }
    }

    #[test]
    fn test_push_keeps_first_insertion_order(
        ids in prop::collection::vec(1u64..6, 1..30)
    ) {
        let mut cart = Cart::new();
        let mut expected: Vec<ProductId> = Vec::new();

        for id in ids {
            cart.push_product(arb_product(id));
            if !expected.contains(&id) {
                expected.push(id);
            }
        }

        let actual: Vec<ProductId> = cart.items().iter().map(|item| item.id).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn test_stored_cart_reloads_identically(items in arb_line_items()) {
        let cart = Cart::from_items(items).unwrap();

        let stored = serde_json::to_string(&cart).unwrap();
        let reloaded: Cart = serde_json::from_str(&stored).unwrap();

        prop_assert_eq!(reloaded, cart);
    }

    #[test]
    fn test_formatted_price_shape(cents in 0i64..10_000_000_000) {
        let formatted = format_price(Decimal::new(cents, 2));

        prop_assert!(formatted.starts_with("R$ "));
        let (integer, fraction) = formatted["R$ ".len()..].split_once(',').unwrap();
        prop_assert_eq!(fraction.len(), 2);
        prop_assert_eq!(integer.replace('.', ""), (cents / 100).to_string());
        prop_assert!(integer.split('.').skip(1).all(|group| group.len() == 3));
    }
}
