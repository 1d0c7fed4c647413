//! Fluent API for constructing typed segment rule sets.

use crate::rules::{Conjunction, Criterion, NumericOperator, SegmentRule, SegmentRuleSet, TagOperator};

#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    rules: SegmentRuleSet,
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_spent(self, operator: NumericOperator, value: f64) -> Self {
        self.push(Criterion::TotalSpent { operator, value })
    }

    pub fn purchase_count(self, operator: NumericOperator, value: f64) -> Self {
        self.push(Criterion::PurchaseCount { operator, value })
    }

    /// `GreaterThan` 90 selects customers whose last purchase was more than 90 days ago.
    pub fn last_purchase(self, operator: NumericOperator, days: f64) -> Self {
        self.push(Criterion::LastPurchase { operator, days })
    }

    pub fn has_tag(self, tag: impl Into<String>) -> Self {
        self.push(Criterion::Tag {
            operator: TagOperator::Contains,
            tag: tag.into(),
        })
    }

    pub fn lacks_tag(self, tag: impl Into<String>) -> Self {
        self.push(Criterion::Tag {
            operator: TagOperator::DoesNotContain,
            tag: tag.into(),
        })
    }

    /// Joins the most recent rule to the next one with AND.
    pub fn and(self) -> Self {
        self.join(Conjunction::And)
    }

    /// Joins the most recent rule to the next one with OR.
    pub fn or(self) -> Self {
        self.join(Conjunction::Or)
    }

    pub fn build(self) -> SegmentRuleSet {
        self.rules
    }

    fn push(mut self, criterion: Criterion) -> Self {
        self.rules.push(SegmentRule::new(criterion));
        self
    }

    fn join(mut self, conjunction: Conjunction) -> Self {
        if let Some(last) = self.rules.last_mut() {
            last.conjunction = Some(conjunction);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_conjunction_on_previous_rule() {
        let rules = RuleSetBuilder::new()
            .total_spent(NumericOperator::GreaterThan, 500.0)
            .or()
            .has_tag("frequent_buyer")
            .and()
            .last_purchase(NumericOperator::LessThan, 30.0)
            .build();

        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].conjunction, Some(Conjunction::Or));
        assert_eq!(rules[1].conjunction, Some(Conjunction::And));
        assert_eq!(rules[2].conjunction, None);
        assert_ne!(rules[0].id, rules[1].id);
    }

    #[test]
    fn test_conjunction_before_any_rule_is_ignored() {
        let rules = RuleSetBuilder::new().or().lacks_tag("churned").build();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].conjunction, None);
        assert_eq!(
            rules[0].criterion,
            Criterion::Tag {
                operator: TagOperator::DoesNotContain,
                tag: "churned".to_string()
            }
        );
    }

    #[test]
    fn test_empty_builder() {
        assert!(RuleSetBuilder::new().build().is_empty());
    }
}
