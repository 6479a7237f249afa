use crate::utils::error::{DispatchError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Body exchanged over a request channel.
pub type Payload = Value;

pub const STAFF_ON_DUTY: &str = "staff.onduty";
pub const STAFF_OFF_DUTY: &str = "staff.offduty";

pub const TYPE_KEY: &str = "type";
pub const ID_KEY: &str = "id";
pub const SPECIALITY_KEY: &str = "speciality";

/// Metadata describing what a request wants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(Map<String, Value>);

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn staff_on_duty(id: &str, speciality: impl Into<Value>) -> Self {
        Self::new()
            .with(TYPE_KEY, STAFF_ON_DUTY)
            .with(ID_KEY, id)
            .with(SPECIALITY_KEY, speciality)
    }

    pub fn staff_off_duty(id: &str) -> Self {
        Self::new().with(TYPE_KEY, STAFF_OFF_DUTY).with(ID_KEY, id)
    }

    pub fn order(speciality: impl Into<Value>) -> Self {
        Self::new()
            .with(TYPE_KEY, "order")
            .with(SPECIALITY_KEY, speciality)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn require_str(&self, key: &str) -> Result<&str> {
        match self.0.get(key) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(DispatchError::invalid_scope(
                key,
                format!("expected a string, found {}", other),
            )),
            None => Err(DispatchError::invalid_scope(key, "missing")),
        }
    }
}

impl From<Map<String, Value>> for Scope {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Scope {
    type Error = DispatchError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DispatchError::invalid_scope(
                "scope",
                format!("expected an object, found {}", other),
            )),
        }
    }
}

/// Ordered capability tokens declared by staff or requested by an order.
///
/// A single token and a one-element list normalize to the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Vec<String>")]
pub struct Specialities(Vec<String>);

impl Specialities {
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(token) => Ok(Self(vec![token.clone()])),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(token) => Ok(token.clone()),
                    other => Err(DispatchError::invalid_scope(
                        SPECIALITY_KEY,
                        format!("expected string tokens, found {}", other),
                    )),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self),
            other => Err(DispatchError::invalid_scope(
                SPECIALITY_KEY,
                format!("expected a string or a list of strings, found {}", other),
            )),
        }
    }

    /// True when every token in `requested` is declared here.
    pub fn is_superset_of(&self, requested: &Specialities) -> bool {
        requested.0.iter().all(|token| self.0.contains(token))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl TryFrom<Value> for Specialities {
    type Error = DispatchError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(&value)
    }
}

impl From<Specialities> for Vec<String> {
    fn from(specialities: Specialities) -> Self {
        specialities.0
    }
}

impl From<&str> for Specialities {
    fn from(token: &str) -> Self {
        Self(vec![token.to_string()])
    }
}

impl From<Vec<&str>> for Specialities {
    fn from(tokens: Vec<&str>) -> Self {
        Self(tokens.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Specialities {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl fmt::Display for Specialities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// A scope validated into the three request shapes the dispatcher routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    StaffOnDuty { id: String, specialities: Specialities },
    StaffOffDuty { id: String },
    Order { specialities: Specialities },
}

impl RequestKind {
    pub fn from_scope(scope: &Scope) -> Result<Self> {
        match scope.require_str(TYPE_KEY)? {
            STAFF_ON_DUTY => Ok(Self::StaffOnDuty {
                id: scope.require_str(ID_KEY)?.to_string(),
                specialities: Self::specialities(scope)?,
            }),
            STAFF_OFF_DUTY => Ok(Self::StaffOffDuty {
                id: scope.require_str(ID_KEY)?.to_string(),
            }),
            _ => Ok(Self::Order {
                specialities: Self::specialities(scope)?,
            }),
        }
    }

    fn specialities(scope: &Scope) -> Result<Specialities> {
        let value = scope
            .get(SPECIALITY_KEY)
            .ok_or_else(|| DispatchError::invalid_scope(SPECIALITY_KEY, "missing"))?;
        Specialities::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_token_normalizes_to_list() {
        let single = Specialities::from_value(&json!("grill")).unwrap();
        let list = Specialities::from_value(&json!(["grill"])).unwrap();
        assert_eq!(single, list);
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_malformed_specialities_are_rejected() {
        assert!(Specialities::from_value(&json!(42)).is_err());
        assert!(Specialities::from_value(&json!(null)).is_err());
        assert!(Specialities::from_value(&json!({"grill": true})).is_err());
        assert!(Specialities::from_value(&json!(["grill", 3])).is_err());
    }

    #[test]
    fn test_superset_uses_exact_tokens() {
        let declared = Specialities::from(vec!["grill", "fry"]);
        assert!(declared.is_superset_of(&Specialities::from("grill")));
        assert!(declared.is_superset_of(&Specialities::from(vec!["fry", "grill"])));
        assert!(!declared.is_superset_of(&Specialities::from(vec!["grill", "bake"])));
        // "gri" is a substring of "grill" but not a declared token
        assert!(!declared.is_superset_of(&Specialities::from("gri")));
        assert!(declared.is_superset_of(&Specialities::default()));
    }

    #[test]
    fn test_request_kind_classification() {
        let on = RequestKind::from_scope(&Scope::staff_on_duty("w1", json!(["grill", "fry"])));
        assert_eq!(
            on.unwrap(),
            RequestKind::StaffOnDuty {
                id: "w1".to_string(),
                specialities: Specialities::from(vec!["grill", "fry"]),
            }
        );

        let off = RequestKind::from_scope(&Scope::staff_off_duty("w1")).unwrap();
        assert_eq!(off, RequestKind::StaffOffDuty { id: "w1".to_string() });

        let order = Scope::new().with(TYPE_KEY, "order.place").with(SPECIALITY_KEY, "bake");
        assert_eq!(
            RequestKind::from_scope(&order).unwrap(),
            RequestKind::Order {
                specialities: Specialities::from("bake")
            }
        );
    }

    #[test]
    fn test_request_kind_rejects_missing_fields() {
        let no_type = Scope::new().with(ID_KEY, "w1");
        assert!(matches!(
            RequestKind::from_scope(&no_type),
            Err(DispatchError::InvalidScope { ref field, .. }) if field == TYPE_KEY
        ));

        let off_without_id = Scope::new().with(TYPE_KEY, STAFF_OFF_DUTY);
        assert!(RequestKind::from_scope(&off_without_id).is_err());

        let numeric_id = Scope::new()
            .with(TYPE_KEY, STAFF_ON_DUTY)
            .with(ID_KEY, 7)
            .with(SPECIALITY_KEY, "grill");
        assert!(RequestKind::from_scope(&numeric_id).is_err());

        let order_without_speciality = Scope::new().with(TYPE_KEY, "order");
        assert!(matches!(
            RequestKind::from_scope(&order_without_speciality),
            Err(DispatchError::InvalidScope { ref field, .. }) if field == SPECIALITY_KEY
        ));
    }

    #[test]
    fn test_scope_from_json_object() {
        let scope = Scope::try_from(json!({"type": "order", "speciality": "grill"})).unwrap();
        assert_eq!(scope.get(TYPE_KEY), Some(&json!("order")));
        assert!(Scope::try_from(json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn test_specialities_deserialize_from_string_or_list() {
        let single: Specialities = serde_json::from_value(json!("fry")).unwrap();
        let list: Specialities = serde_json::from_value(json!(["fry"])).unwrap();
        assert_eq!(single, list);
        assert_eq!(single.to_string(), "[fry]");
    }
}
