use serde::Serialize;
use serde_json::Value;

use super::coerce_f64;
use crate::model::QueryResult;

/// Currency assumed when a platform doesn't report one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Prices per platform and the lowest one above zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceReport {
    #[serde(flatten)]
    pub result: QueryResult,
    /// `0.0` when every platform lists the resource for free.
    pub lowest_price: f64,
    pub lowest_price_currency: String,
}

impl PriceReport {
    pub fn from_result(mut result: QueryResult) -> Self {
        let mut lowest: Option<(f64, String)> = None;

        for (_, fields) in result.endpoints.iter_mut() {
            let price = coerce_f64(fields.get("price")).unwrap_or(0.0);
            let currency = match fields.get("currency") {
                Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_uppercase(),
                _ => DEFAULT_CURRENCY.to_string(),
            };
            fields.insert("price".to_string(), Value::from(price));
            fields.insert("currency".to_string(), Value::from(currency.clone()));

            let is_lower = match &lowest {
                Some((current, _)) => price < *current,
                None => true,
            };
            if price > 0.0 && is_lower {
                lowest = Some((price, currency));
            }
        }

        let (lowest_price, lowest_price_currency) =
            lowest.unwrap_or_else(|| (0.0, DEFAULT_CURRENCY.to_string()));

        Self {
            result,
            lowest_price,
            lowest_price_currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(entries: &[(&str, Value)]) -> QueryResult {
        let mut result = QueryResult::success();
        for (platform, fields) in entries {
            result
                .endpoints
                .insert(*platform, fields.as_object().cloned().unwrap());
        }
        result
    }

    #[test]
    fn test_lowest_positive_price() {
        let report = PriceReport::from_result(result(&[
            ("spigot", json!({"price": 9.99, "currency": "usd"})),
            ("polymart", json!({"price": 4.99, "currency": "eur"})),
        ]));
        assert_eq!(report.lowest_price, 4.99);
        assert_eq!(report.lowest_price_currency, "EUR");
    }

    #[test]
    fn test_free_only_gives_zero_usd() {
        let report = PriceReport::from_result(result(&[("spigot", json!({"price": 0}))]));
        assert_eq!(report.lowest_price, 0.0);
        assert_eq!(report.lowest_price_currency, "USD");
    }

    #[test]
    fn test_free_listings_are_ignored() {
        let report = PriceReport::from_result(result(&[
            ("modrinth", json!({})),
            ("spigot", json!({"price": 12.5, "currency": "GBP"})),
            ("hangar", json!({"price": 0.0})),
        ]));
        assert_eq!(report.lowest_price, 12.5);
        assert_eq!(report.lowest_price_currency, "GBP");
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let report = PriceReport::from_result(result(&[
            ("spigot", json!({"price": 5, "currency": "usd"})),
            ("polymart", json!({"price": "5.00", "currency": "eur"})),
        ]));
        assert_eq!(report.lowest_price, 5.0);
        assert_eq!(report.lowest_price_currency, "USD");
    }

    #[test]
    fn test_fields_are_normalized() {
        let report = PriceReport::from_result(result(&[(
            "craftaro",
            json!({"price": "7.50", "currency": null}),
        )]));
        let craftaro = report.result.endpoints.get("craftaro").unwrap();
        assert_eq!(craftaro["price"], json!(7.5));
        assert_eq!(craftaro["currency"], json!("USD"));
    }
}
