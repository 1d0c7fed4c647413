//! Loose JSON form of segment rules, as the builders and stored campaigns
//! carry them, and its compilation into typed [`SegmentRule`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::error::SegmentationError;
use crate::rules::{Conjunction, Criterion, NumericOperator, SegmentRule, SegmentRuleSet, TagOperator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSegmentRule {
    pub id: Uuid,
    pub field: String,
    pub operator: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conjunction: Option<Conjunction>,
}

impl RawSegmentRule {
    /// Builds the typed rule.
    ///
    /// An unknown field or an operator the field does not support yields an
    /// [`Criterion::Unsatisfiable`] rule rather than an error, whatever the
    /// value. Once field and operator agree, a value of the wrong shape for
    /// the field is rejected.
    pub fn compile(&self) -> Result<SegmentRule, SegmentationError> {
        let field = self.field.as_str();
        let criterion = match field {
            "totalSpent" | "purchaseCount" | "lastPurchase" => {
                match NumericOperator::parse(&self.operator) {
                    Some(operator) => {
                        let value = numeric_value(field, &self.value)?;
                        match field {
                            "totalSpent" => Criterion::TotalSpent { operator, value },
                            "purchaseCount" => Criterion::PurchaseCount { operator, value },
                            _ => Criterion::LastPurchase {
                                operator,
                                days: value,
                            },
                        }
                    }
                    None => self.unsatisfiable(),
                }
            }
            "tag" => match TagOperator::parse(&self.operator) {
                Some(operator) => Criterion::Tag {
                    operator,
                    tag: tag_value(&self.value)?,
                },
                None => self.unsatisfiable(),
            },
            _ => self.unsatisfiable(),
        };

        Ok(SegmentRule {
            id: self.id,
            criterion,
            conjunction: self.conjunction,
        })
    }

    fn unsatisfiable(&self) -> Criterion {
        warn!(
            rule_id = %self.id,
            field = %self.field,
            operator = %self.operator,
            "Unsupported field/operator, rule will match no customers"
        );
        Criterion::Unsatisfiable {
            name: self.field.clone(),
            operator: self.operator.clone(),
            value: self.value.clone(),
        }
    }
}

fn numeric_value(field: &str, value: &Value) -> Result<f64, SegmentationError> {
    let invalid = |reason: &str| SegmentationError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    };
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid("number out of range")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid("expected a number")),
        _ => Err(invalid("expected a single number")),
    }
}

fn tag_value(value: &Value) -> Result<String, SegmentationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(SegmentationError::InvalidValue {
            field: "tag".to_string(),
            reason: "expected a single tag name".to_string(),
        }),
    }
}

/// Compiles every rule, keeping order. An empty input compiles to an empty set.
pub fn compile_rule_set(raw: &[RawSegmentRule]) -> Result<SegmentRuleSet, SegmentationError> {
    raw.iter().map(RawSegmentRule::compile).collect()
}

impl From<&SegmentRule> for RawSegmentRule {
    fn from(rule: &SegmentRule) -> Self {
        let (field, operator, value) = match &rule.criterion {
            Criterion::TotalSpent { operator, value } => {
                ("totalSpent".to_string(), operator.symbol().to_string(), number(*value))
            }
            Criterion::PurchaseCount { operator, value } => {
                ("purchaseCount".to_string(), operator.symbol().to_string(), number(*value))
            }
            Criterion::LastPurchase { operator, days } => {
                ("lastPurchase".to_string(), operator.symbol().to_string(), number(*days))
            }
            Criterion::Tag { operator, tag } => (
                "tag".to_string(),
                operator.symbol().to_string(),
                Value::String(tag.clone()),
            ),
            Criterion::Unsatisfiable {
                name,
                operator,
                value,
            } => (name.clone(), operator.clone(), value.clone()),
        };
        RawSegmentRule {
            id: rule.id,
            field,
            operator,
            value,
            conjunction: rule.conjunction,
        }
    }
}

impl From<SegmentRule> for RawSegmentRule {
    fn from(rule: SegmentRule) -> Self {
        RawSegmentRule::from(&rule)
    }
}

// Whole numbers go out as integers, matching what the builders send.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(field: &str, operator: &str, value: Value) -> RawSegmentRule {
        RawSegmentRule {
            id: Uuid::new_v4(),
            field: field.to_string(),
            operator: operator.to_string(),
            value,
            conjunction: None,
        }
    }

    #[test]
    fn test_compile_numeric_rule() {
        let rule = raw("totalSpent", ">", json!(1000)).compile().unwrap();
        assert_eq!(
            rule.criterion,
            Criterion::TotalSpent {
                operator: NumericOperator::GreaterThan,
                value: 1000.0
            }
        );
    }

    #[test]
    fn test_compile_accepts_numeric_string() {
        let rule = raw("purchaseCount", "≥", json!(" 5 ")).compile().unwrap();
        assert_eq!(
            rule.criterion,
            Criterion::PurchaseCount {
                operator: NumericOperator::GreaterThanOrEqual,
                value: 5.0
            }
        );
    }

    #[test]
    fn test_last_purchase_tolerates_full_numeric_set() {
        let rule = raw("lastPurchase", "=", json!(30)).compile().unwrap();
        assert_eq!(
            rule.criterion,
            Criterion::LastPurchase {
                operator: NumericOperator::Equals,
                days: 30.0
            }
        );
    }

    #[test]
    fn test_unknown_field_compiles_unsatisfiable() {
        let rule = raw("bogus", ">", json!(1)).compile().unwrap();
        assert!(!rule.criterion.is_satisfiable());
    }

    #[test]
    fn test_operator_field_mismatch_compiles_unsatisfiable() {
        let numeric = raw("totalSpent", "contains", json!(1)).compile().unwrap();
        assert!(!numeric.criterion.is_satisfiable());

        let tag = raw("tag", ">", json!("churned")).compile().unwrap();
        assert!(!tag.criterion.is_satisfiable());

        let between = raw("totalSpent", "between", json!(5)).compile().unwrap();
        assert!(!between.criterion.is_satisfiable());
    }

    #[test]
    fn test_mismatch_wins_over_value_shape() {
        // Editing the field leaves the previous value behind.
        for (field, operator, value) in [
            ("totalSpent", "contains", json!("vip")),
            ("tag", ">", json!(0)),
            ("totalSpent", "between", json!([10, 20])),
            ("purchaseCount", "in", Value::Null),
            ("bogus", "contains", json!({"a": 1})),
        ] {
            let rule = raw(field, operator, value).compile().unwrap();
            assert!(!rule.criterion.is_satisfiable(), "{field} {operator}");
        }
    }

    #[test]
    fn test_unsatisfiable_rule_round_trips_through_wire_form() {
        let mut original = raw("totalSpent", "contains", json!(1));
        original.conjunction = Some(Conjunction::Or);
        let compiled = original.compile().unwrap();
        let back = RawSegmentRule::from(&compiled);
        assert_eq!(back, original);
        assert_eq!(back.compile().unwrap(), compiled);
    }

    #[test]
    fn test_wrong_value_shape_is_rejected() {
        let err = raw("totalSpent", ">", json!([10, 20])).compile().unwrap_err();
        assert!(matches!(err, SegmentationError::InvalidValue { .. }));

        let err = raw("tag", "contains", json!(["a", "b"])).compile().unwrap_err();
        assert!(matches!(err, SegmentationError::InvalidValue { .. }));

        assert!(raw("tag", "contains", json!(5)).compile().is_err());
        assert!(raw("totalSpent", ">", json!("lots")).compile().is_err());
        assert!(raw("totalSpent", ">", Value::Null).compile().is_err());
    }

    #[test]
    fn test_deserialize_builder_payload() {
        let payload = json!([
            {"id": "0b0e7a38-3c57-4b5e-9b43-8d1b0c2f2a01", "field": "totalSpent", "operator": ">", "value": 500, "conjunction": "AND"},
            {"id": "0b0e7a38-3c57-4b5e-9b43-8d1b0c2f2a02", "field": "tag", "operator": "contains", "value": "frequent_buyer"}
        ]);
        let raw: Vec<RawSegmentRule> = serde_json::from_value(payload).unwrap();
        let rules = compile_rule_set(&raw).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].conjunction, Some(Conjunction::And));
        assert_eq!(rules[1].conjunction, None);
        assert_eq!(
            rules[1].criterion,
            Criterion::Tag {
                operator: TagOperator::Contains,
                tag: "frequent_buyer".to_string()
            }
        );
    }

    #[test]
    fn test_typed_rule_back_to_wire_form() {
        let rule = raw("lastPurchase", "<", json!(30))
            .compile()
            .unwrap()
            .with_conjunction(Conjunction::Or);
        let back = RawSegmentRule::from(&rule);
        assert_eq!(back.field, "lastPurchase");
        assert_eq!(back.operator, "<");
        assert_eq!(back.value, json!(30));
        assert_eq!(back.conjunction, Some(Conjunction::Or));
        assert_eq!(back.compile().unwrap(), rule);
    }
}
