//! Condition evaluator: threshold comparisons over a flattened value set.

use crate::error::EvaluateError;
use crate::value::normalize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator, spelled in the config exactly as written here.
/// Comparisons are exact IEEE-754, no epsilon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl ConditionOp {
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            ConditionOp::Eq => value == threshold,
            ConditionOp::Ne => value != threshold,
            ConditionOp::Lt => value < threshold,
            ConditionOp::Le => value <= threshold,
            ConditionOp::Gt => value > threshold,
            ConditionOp::Ge => value >= threshold,
        }
    }
}

impl fmt::Display for ConditionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ConditionOp::Eq => "==",
            ConditionOp::Ne => "!=",
            ConditionOp::Lt => "<",
            ConditionOp::Le => "<=",
            ConditionOp::Gt => ">",
            ConditionOp::Ge => ">=",
        };
        f.write_str(symbol)
    }
}

/// One threshold condition of a monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    #[serde(rename = "type")]
    pub op: ConditionOp,
    pub value: f64,
}

/// Evaluate a monitor's full condition set against a flattened value set.
///
/// A single condition is satisfied iff it holds for EVERY value (universal
/// quantifier across the range, not "any"); the set is satisfied iff all
/// conditions hold. An empty value set is treated as unsatisfied rather than
/// vacuously true, so an empty range never fires an alert.
///
/// Fails with the first normalization failure encountered; the caller treats
/// that as unsatisfied for the cycle.
pub fn evaluate(conditions: &[Condition], values: &[String]) -> Result<bool, EvaluateError> {
    if values.is_empty() {
        return Ok(false);
    }
    if conditions.is_empty() {
        return Ok(true);
    }

    let mut numbers = Vec::with_capacity(values.len());
    for (index, raw) in values.iter().enumerate() {
        let number = normalize(raw).map_err(|source| EvaluateError { index, source })?;
        numbers.push(number);
    }

    Ok(conditions
        .iter()
        .all(|condition| numbers.iter().all(|&value| condition.op.holds(value, condition.value))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(op: ConditionOp, value: f64) -> Condition {
        Condition { op, value }
    }

    fn values(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_operator_semantics() {
        assert!(ConditionOp::Eq.holds(1.0, 1.0));
        assert!(!ConditionOp::Eq.holds(1.0, 1.1));
        assert!(ConditionOp::Ne.holds(1.0, 2.0));
        assert!(ConditionOp::Lt.holds(1.0, 2.0));
        assert!(!ConditionOp::Lt.holds(2.0, 2.0));
        assert!(ConditionOp::Le.holds(2.0, 2.0));
        assert!(ConditionOp::Gt.holds(3.0, 2.0));
        assert!(!ConditionOp::Gt.holds(2.0, 2.0));
        assert!(ConditionOp::Ge.holds(2.0, 2.0));
    }

    #[test]
    fn test_condition_applies_to_every_value() {
        // 50.5 fails > 100, so the whole range is unsatisfied
        let conditions = [cond(ConditionOp::Gt, 100.0)];
        let result = evaluate(&conditions, &values(&["50,5", "120,0"])).unwrap();
        assert!(!result);

        let result = evaluate(&conditions, &values(&["150,5", "120,0"])).unwrap();
        assert!(result);
    }

    #[test]
    fn test_single_value_within_threshold() {
        let conditions = [cond(ConditionOp::Le, 10.0)];
        assert!(evaluate(&conditions, &values(&["9,9"])).unwrap());
        assert!(!evaluate(&conditions, &values(&["10,1"])).unwrap());
    }

    #[test]
    fn test_all_conditions_must_hold() {
        let conditions = [cond(ConditionOp::Gt, 0.0), cond(ConditionOp::Lt, 100.0)];
        assert!(evaluate(&conditions, &values(&["5,0", "50,0"])).unwrap());
        // 150 violates the second condition
        assert!(!evaluate(&conditions, &values(&["5,0", "150,0"])).unwrap());
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let conditions = [cond(ConditionOp::Gt, 0.0)];
        let err = evaluate(&conditions, &values(&["1,0", "abc"])).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.source.raw, "abc");
    }

    #[test]
    fn test_empty_value_set_is_unsatisfied() {
        let conditions = [cond(ConditionOp::Gt, 0.0)];
        assert!(!evaluate(&conditions, &[]).unwrap());
    }

    #[test]
    fn test_no_conditions_is_satisfied() {
        assert!(evaluate(&[], &values(&["anything"])).unwrap());
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let conditions = [cond(ConditionOp::Ge, 10.0)];
        let vals = values(&["10,0", "12,5"]);
        let first = evaluate(&conditions, &vals).unwrap();
        let second = evaluate(&conditions, &vals).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_op_serde_spelling() {
        let condition: Condition = serde_json::from_str(r#"{"type": ">=", "value": 1.5}"#).unwrap();
        assert_eq!(condition.op, ConditionOp::Ge);
        assert_eq!(condition.value, 1.5);
        assert_eq!(condition.op.to_string(), ">=");

        assert!(serde_json::from_str::<Condition>(r#"{"type": "gt", "value": 1}"#).is_err());
    }
}
