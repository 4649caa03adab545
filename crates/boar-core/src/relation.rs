use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized form of an Odoo many2one field.
///
/// `execute_kw` returns either `false` (unset) or a two-element tuple
/// `[id, display_name]`. Carrying that shape through the codebase as raw
/// `serde_json::Value` would push the `false`-vs-tuple check into every
/// caller, so it gets collapsed here once, at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Relation {
    Empty,
    Ref { id: i64, name: String },
}

impl Relation {
    pub fn id(&self) -> Option<i64> {
        match self {
            Relation::Empty => None,
            Relation::Ref { id, .. } => Some(*id),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Relation::Empty => None,
            Relation::Ref { name, .. } => Some(name),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Relation::Empty)
    }

    /// Parses the raw XML-RPC value for a many2one field.
    pub fn from_raw(value: &Value) -> Relation {
        match value {
            Value::Array(items) if items.len() == 2 => {
                let id = items[0].as_i64();
                let name = items[1].as_str().map(|s| s.to_string());
                match (id, name) {
                    (Some(id), Some(name)) => Relation::Ref { id, name },
                    _ => Relation::Empty,
                }
            }
            _ => Relation::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_populated_many2one() {
        let raw = json!([42, "Jane Doe"]);
        assert_eq!(
            Relation::from_raw(&raw),
            Relation::Ref {
                id: 42,
                name: "Jane Doe".into()
            }
        );
    }

    #[test]
    fn false_means_empty() {
        assert_eq!(Relation::from_raw(&json!(false)), Relation::Empty);
    }

    #[test]
    fn malformed_tuple_falls_back_to_empty() {
        assert_eq!(Relation::from_raw(&json!([42])), Relation::Empty);
        assert_eq!(Relation::from_raw(&json!("not a relation")), Relation::Empty);
    }
}
