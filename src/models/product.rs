use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Catalog identifier of a product
pub type ProductId = u64;

/// Product reference data as served by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub image: String,
}

/// Quantity on hand for a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: ProductId,
    pub amount: u32,
}

impl StockRecord {
    /// Whether `requested` units can be served from this stock
    pub fn covers(&self, requested: u32) -> bool {
        self.amount >= requested
    }
}

const CURRENCY_SYMBOL: &str = "R$";

/// Render a price for display, e.g. `R$ 1.234,56`.
///
/// Rounds half away from zero to two decimals. Negative prices keep their
/// sign in front of the symbol.
pub fn format_price(price: Decimal) -> String {
    let rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let cents = format!("{:.2}", rounded.abs());
    let (units, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{sign}{CURRENCY_SYMBOL} {grouped},{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(dec!(179.9)), "R$ 179,90");
        assert_eq!(format_price(dec!(0)), "R$ 0,00");
        assert_eq!(format_price(dec!(1234.5)), "R$ 1.234,50");
        assert_eq!(format_price(dec!(1234567.891)), "R$ 1.234.567,89");
        assert_eq!(format_price(dec!(999.995)), "R$ 1.000,00");
        assert_eq!(format_price(dec!(-12.5)), "-R$ 12,50");
    }

    #[test]
    fn test_stock_covers() {
        let stock = StockRecord { id: 1, amount: 3 };
        assert!(stock.covers(3));
        assert!(stock.covers(1));
        assert!(!stock.covers(4));
    }

    #[test]
    fn test_product_deserializes_catalog_payload() {
        let json = r#"{
            "id": 1,
            "title": "Tênis de Caminhada Leve Confortável",
            "price": 179.9,
            "image": "https://example.com/shoe.jpg"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 1);
        assert_eq!(product.price, dec!(179.9));
    }
}
