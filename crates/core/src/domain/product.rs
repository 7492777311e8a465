use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(value) => Ok(Self(value)),
            Value::Number(value) => Ok(Self(value.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "product id must be a string or integer, got `{other}`"
            ))),
        }
    }
}

/// One catalog row as stored. Every attribute except `id` may be missing;
/// default resolution happens in the feature builder.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost_per_unit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub stock_quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub discount_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub demand_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sales_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_month")]
    pub month_num: Option<u32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub season: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_festival: Option<bool>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_promo: Option<bool>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub predicted_sales: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub suggested_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pricing_reason: Option<String>,
}

impl ProductRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: ProductId(id.into()), ..Self::default() }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown Product")
    }
}

fn number_from_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|number| number.is_finite())
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_month<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_from_value)
        .filter(|month| *month >= 0.0 && *month <= f64::from(u32::MAX))
        .map(|month| month.trunc() as u32))
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => Some(flag),
        Some(Value::Number(number)) => number.as_f64().map(|flag| flag != 0.0),
        Some(Value::String(raw)) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "1" => Some(true),
            "false" | "f" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => Some(raw),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    }
    .filter(|raw| !raw.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ProductId, ProductRecord};

    #[test]
    fn decodes_loosely_typed_row() {
        let record: ProductRecord = serde_json::from_value(json!({
            "id": 17,
            "name": "Mango Pulp",
            "price": "120.50",
            "cost_per_unit": 80,
            "stock_quantity": null,
            "month_num": 5.0,
            "is_festival": 1,
            "is_promo": "false",
            "category": "",
            "unrelated_column": "ignored"
        }))
        .expect("row should decode");

        assert_eq!(record.id, ProductId("17".to_string()));
        assert_eq!(record.price, Some(120.5));
        assert_eq!(record.cost_per_unit, Some(80.0));
        assert_eq!(record.stock_quantity, None);
        assert_eq!(record.month_num, Some(5));
        assert_eq!(record.is_festival, Some(true));
        assert_eq!(record.is_promo, Some(false));
        assert_eq!(record.category, None, "blank categorical is treated as absent");
    }

    #[test]
    fn unparsable_numbers_become_absent() {
        let record: ProductRecord = serde_json::from_value(json!({
            "id": "p-1",
            "price": "n/a",
            "discount_percent": "NaN"
        }))
        .expect("row should decode");

        assert_eq!(record.price, None);
        assert_eq!(record.discount_percent, None);
    }

    #[test]
    fn missing_columns_decode_as_defaults() {
        let record: ProductRecord =
            serde_json::from_value(json!({ "id": "p-2" })).expect("row should decode");

        assert_eq!(record, ProductRecord::new("p-2"));
        assert_eq!(record.display_name(), "Unknown Product");
    }

    #[test]
    fn id_must_be_scalar() {
        let result = serde_json::from_value::<ProductRecord>(json!({ "id": [1, 2] }));
        assert!(result.is_err());
    }
}
