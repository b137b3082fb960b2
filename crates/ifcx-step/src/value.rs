//! Attribute values of resolved entities.

use serde::{Deserialize, Serialize};

use crate::model::EntityKey;
use crate::schema::TypeId;

/// Tri-state logical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Logical {
    /// `.F.`
    False,
    /// `.T.`
    True,
    /// `.U.`
    Unknown,
}

impl From<bool> for Logical {
    fn from(value: bool) -> Self {
        if value {
            Logical::True
        } else {
            Logical::False
        }
    }
}

/// A single forward attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Not applicable / not set (`$`).
    Null,
    /// Derived or redeclared elsewhere (`*`).
    Derived,
    /// Integer number.
    Integer(i64),
    /// Real number.
    Real(f64),
    /// Decoded string contents.
    String(String),
    /// Binary literal as hex digits, without the surrounding quotes.
    Binary(String),
    /// Boolean.
    Boolean(bool),
    /// Tri-state logical.
    Logical(Logical),
    /// Enumeration symbol (upper-case, without dots) of the given type.
    Enum(TypeId, String),
    /// Reference into the entity arena.
    Ref(EntityKey),
    /// Defined type instance wrapping its underlying value.
    Typed(TypeId, Box<Value>),
    /// Aggregate (LIST, SET, BAG or ARRAY).
    List(Vec<Value>),
}

impl Value {
    /// Wrap a value in a defined type.
    pub fn typed(type_id: TypeId, value: Value) -> Self {
        Value::Typed(type_id, Box::new(value))
    }

    /// The value inside any defined-type wrappers.
    pub fn inner(&self) -> &Value {
        match self {
            Value::Typed(_, v) => v.inner(),
            other => other,
        }
    }

    /// Try to get as an entity reference.
    pub fn as_entity(&self) -> Option<EntityKey> {
        match self.inner() {
            Value::Ref(key) => Some(*key),
            _ => None,
        }
    }

    /// Try to get as a real number (also accepts integer).
    pub fn as_real(&self) -> Option<f64> {
        match self.inner() {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Try to get as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self.inner() {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self.inner() {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self.inner() {
            Value::Boolean(b) => Some(*b),
            Value::Logical(Logical::True) => Some(true),
            Value::Logical(Logical::False) => Some(false),
            _ => None,
        }
    }

    /// Try to get as a logical.
    pub fn as_logical(&self) -> Option<Logical> {
        match self.inner() {
            Value::Logical(l) => Some(*l),
            Value::Boolean(b) => Some(Logical::from(*b)),
            _ => None,
        }
    }

    /// Try to get as an enumeration symbol.
    pub fn as_enum(&self) -> Option<&str> {
        match self.inner() {
            Value::Enum(_, symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Try to get as a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self.inner() {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Defined or enumeration type carried by the value, if any.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Value::Typed(ty, _) | Value::Enum(ty, _) => Some(*ty),
            _ => None,
        }
    }

    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is a derived value.
    pub fn is_derived(&self) -> bool {
        matches!(self, Value::Derived)
    }

    /// Every entity reference held by this value, in order.
    pub fn refs(&self) -> Vec<EntityKey> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs(&self, out: &mut Vec<EntityKey>) {
        match self {
            Value::Ref(key) => out.push(*key),
            Value::Typed(_, v) => v.collect_refs(out),
            Value::List(items) => items.iter().for_each(|v| v.collect_refs(out)),
            _ => {}
        }
    }

    /// True if the value references `key` anywhere.
    pub fn references(&self, key: EntityKey) -> bool {
        match self {
            Value::Ref(k) => *k == key,
            Value::Typed(_, v) => v.references(key),
            Value::List(items) => items.iter().any(|v| v.references(key)),
            _ => false,
        }
    }

    /// Drop references to `key`: list elements are removed, other slots
    /// become [`Value::Null`].
    pub fn strip_ref(&mut self, key: EntityKey) {
        match self {
            Value::Ref(k) if *k == key => *self = Value::Null,
            Value::Typed(_, v) => {
                v.strip_ref(key);
                if v.is_null() {
                    *self = Value::Null;
                }
            }
            Value::List(items) => {
                items.retain(|v| !matches!(v.inner(), Value::Ref(k) if *k == key));
                items.iter_mut().for_each(|v| v.strip_ref(key));
            }
            _ => {}
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<EntityKey> for Value {
    fn from(key: EntityKey) -> Self {
        Value::Ref(key)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn keys(n: usize) -> Vec<EntityKey> {
        let mut map: SlotMap<EntityKey, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_accessors_see_through_wrappers() {
        let ty = TypeId(0);
        let v = Value::typed(ty, Value::Real(2.5));
        assert_eq!(v.as_real(), Some(2.5));
        assert_eq!(v.type_id(), Some(ty));
        assert_eq!(Value::Integer(3).as_real(), Some(3.0));
        assert_eq!(Value::Logical(Logical::Unknown).as_bool(), None);
        assert!(Value::Null.is_null());
        assert!(!Value::Derived.is_null());
    }

    #[test]
    fn test_refs_in_nested_lists() {
        let k = keys(3);
        let v = Value::List(vec![
            Value::Ref(k[0]),
            Value::List(vec![Value::Ref(k[1]), Value::typed(TypeId(1), Value::Ref(k[2]))]),
        ]);
        assert_eq!(v.refs(), k);
        assert!(v.references(k[2]));
    }

    #[test]
    fn test_strip_ref() {
        let k = keys(2);
        let mut list = Value::from(vec![k[0], k[1], k[0]]);
        list.strip_ref(k[0]);
        assert_eq!(list, Value::List(vec![Value::Ref(k[1])]));

        let mut single = Value::Ref(k[1]);
        single.strip_ref(k[1]);
        assert!(single.is_null());
    }
}
