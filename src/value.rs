//! Value normalizer: raw cell text to numbers, nested range results to flat
//! value sequences.

use crate::error::ParseError;
use serde_json::Value;

/// One node of a fetched range result. Spreadsheet APIs return 2-D (and
/// sometimes ragged) arrays of cell text; the tagged variant makes flattening
/// a total recursive function instead of runtime type inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellNode {
    Leaf(String),
    Nested(Vec<CellNode>),
}

impl CellNode {
    /// An empty range result (e.g. the API omitted `values` entirely).
    pub fn empty() -> Self {
        CellNode::Nested(Vec::new())
    }

    /// Convert a JSON range result into a node tree. Scalars become leaves
    /// (numbers and booleans are stringified, null becomes the empty string),
    /// arrays recurse.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => CellNode::Nested(items.iter().map(Self::from_json).collect()),
            Value::String(text) => CellNode::Leaf(text.clone()),
            Value::Null => CellNode::Leaf(String::new()),
            other => CellNode::Leaf(other.to_string()),
        }
    }

    /// Flatten into leaf values in depth-first, left-to-right order. Strings
    /// are atomic leaves, never recursed into.
    pub fn flatten(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<String>) {
        match self {
            CellNode::Leaf(text) => out.push(text.clone()),
            CellNode::Nested(items) => {
                for item in items {
                    item.collect_leaves(out);
                }
            }
        }
    }
}

/// Parse a locale-formatted cell value where `,` is the decimal separator
/// (`"3,14"` -> `3.14`). Fails with a typed error so malformed data never
/// silently defaults.
pub fn normalize(raw: &str) -> Result<f64, ParseError> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| ParseError { raw: raw.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_comma_decimal() {
        assert_eq!(normalize("3,14").unwrap(), 3.14);
        assert_eq!(normalize("50,5").unwrap(), 50.5);
        assert_eq!(normalize("120,0").unwrap(), 120.0);
    }

    #[test]
    fn test_normalize_plain_numbers() {
        assert_eq!(normalize("42").unwrap(), 42.0);
        assert_eq!(normalize("2.5").unwrap(), 2.5);
        assert_eq!(normalize("-1,5").unwrap(), -1.5);
        assert_eq!(normalize(" 7,0 ").unwrap(), 7.0);
    }

    #[test]
    fn test_normalize_rejects_malformed_text() {
        assert!(normalize("abc").is_err());
        assert!(normalize("").is_err());
        assert!(normalize("1,2,3").is_err());
        assert!(normalize("12abc").is_err());

        let err = normalize("abc").unwrap_err();
        assert_eq!(err.raw, "abc");
    }

    #[test]
    fn test_flatten_preserves_depth_first_order() {
        let node = CellNode::Nested(vec![
            CellNode::Nested(vec![
                CellNode::Leaf("a".to_string()),
                CellNode::Leaf("b".to_string()),
            ]),
            CellNode::Nested(vec![CellNode::Leaf("c".to_string())]),
            CellNode::Leaf("d".to_string()),
        ]);
        assert_eq!(node.flatten(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_flatten_ragged_rows() {
        // batchGet responses may omit trailing cells, so rows can be ragged
        let node = CellNode::from_json(&json!([["1,0"], ["2,0", "3,0", "4,0"], []]));
        assert_eq!(node.flatten(), vec!["1,0", "2,0", "3,0", "4,0"]);
    }

    #[test]
    fn test_flatten_empty_range() {
        assert!(CellNode::empty().flatten().is_empty());
    }

    #[test]
    fn test_from_json_stringifies_scalars() {
        let node = CellNode::from_json(&json!([["9,9", 3.5, true, null]]));
        assert_eq!(node.flatten(), vec!["9,9", "3.5", "true", ""]);
    }

    #[test]
    fn test_leaf_strings_are_atomic() {
        // a string leaf must never be recursed into character by character
        let node = CellNode::Leaf("12,5".to_string());
        assert_eq!(node.flatten(), vec!["12,5"]);
    }
}
