//! Runtime values for the schema-driven codec.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::per::primitives::Bits;

/// A decoded value of any ASN.1 type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Enumeration identifier, root or known extension.
    Enumerated(String),
    /// Extension index of an enumeration the schema does not list.
    UnknownEnumerated(u64),
    BitString(Bits),
    OctetString(Vec<u8>),
    /// Present components by name. Absent OPTIONAL components are missing; DEFAULT
    /// components are always filled in on decode.
    Sequence(BTreeMap<String, Value>),
    SequenceOf(Vec<Value>),
    /// Chosen alternative and its value.
    Choice(String, Box<Value>),
    /// Extension alternative the schema does not list, kept as received.
    UnknownChoice { index: u64, encoding: Vec<u8> },
}

impl Value {
    /// Build a SEQUENCE value from `(name, value)` pairs.
    pub fn sequence<'a, I>(fields: I) -> Value
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        Value::Sequence(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    pub fn choice(name: &str, value: Value) -> Value {
        Value::Choice(name.to_string(), Box::new(value))
    }

    pub fn enumerated(name: &str) -> Value {
        Value::Enumerated(name.to_string())
    }

    /// Bit string from `'0'` / `'1'` characters; other characters are ignored.
    pub fn bits(text: &str) -> Value {
        Value::BitString(
            text.chars()
                .filter_map(|c| match c {
                    '0' => Some(false),
                    '1' => Some(true),
                    _ => None,
                })
                .collect(),
        )
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_enumerated(&self) -> Option<&str> {
        match self {
            Value::Enumerated(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bits(&self) -> Option<&Bits> {
        match self {
            Value::BitString(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_octets(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Sequence(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::SequenceOf(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<(&str, &Value)> {
        match self {
            Value::Choice(name, v) => Some((name, v)),
            _ => None,
        }
    }

    /// Component `name` of a SEQUENCE value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_sequence().and_then(|m| m.get(name))
    }

    /// Follow a dotted path through sequences and choices, e.g.
    /// `"message.c1.rrcSetupRequest"`. A choice step matches the chosen alternative.
    pub fn path(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, |v, step| match v {
            Value::Sequence(m) => m.get(step),
            Value::Choice(name, inner) if name == step => Some(inner.as_ref()),
            _ => None,
        })
    }

    /// Short name of the variant, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::Int(_) => "INTEGER",
            Value::Enumerated(_) | Value::UnknownEnumerated(_) => "ENUMERATED",
            Value::BitString(_) => "BIT STRING",
            Value::OctetString(_) => "OCTET STRING",
            Value::Sequence(_) => "SEQUENCE",
            Value::SequenceOf(_) => "SEQUENCE OF",
            Value::Choice(..) | Value::UnknownChoice { .. } => "CHOICE",
        }
    }
}

/// JSON shape: NULL as `null`, bit strings as `'0'`/`'1'` text, octet strings as hex,
/// a choice as a one-entry map keyed by the alternative.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => s.serialize_unit(),
            Value::Bool(b) => s.serialize_bool(*b),
            Value::Int(i) => s.serialize_i64(*i),
            Value::Enumerated(name) => s.serialize_str(name),
            Value::UnknownEnumerated(index) => {
                let mut m = s.serialize_map(Some(1))?;
                m.serialize_entry("unknownExtension", index)?;
                m.end()
            }
            Value::BitString(bits) => crate::per::primitives::serialize_bits(bits, s),
            Value::OctetString(octets) => s.serialize_str(&hex::encode(octets)),
            Value::Sequence(fields) => fields.serialize(s),
            Value::SequenceOf(items) => items.serialize(s),
            Value::Choice(name, v) => {
                let mut m = s.serialize_map(Some(1))?;
                m.serialize_entry(name, v)?;
                m.end()
            }
            Value::UnknownChoice { index, encoding } => {
                let mut m = s.serialize_map(Some(2))?;
                m.serialize_entry("unknownAlternative", index)?;
                m.serialize_entry("encoding", &hex::encode(encoding))?;
                m.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_walks_sequences_and_choices() {
        let v = Value::sequence([(
            "message",
            Value::choice("c1", Value::sequence([("x", Value::Int(3))])),
        )]);
        assert_eq!(v.path("message.c1.x"), Some(&Value::Int(3)));
        assert_eq!(v.path("message.other.x"), None);
    }

    #[test]
    fn json_shape() {
        let v = Value::sequence([
            ("b", Value::bits("101")),
            ("o", Value::OctetString(vec![0xab, 0x01])),
            ("c", Value::choice("release", Value::Null)),
        ]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"b":"101","c":{"release":null},"o":"ab01"}"#);
    }
}
