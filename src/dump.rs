//! Format decoded records and values for display: JSON via serde, or an indented
//! text tree of a [`Value`].

use serde::Serialize;

use crate::value::Value;

/// Compact JSON of any record or value.
pub fn to_json<T: Serialize + ?Sized>(v: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(v)
}

pub fn to_json_pretty<T: Serialize + ?Sized>(v: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(v)
}

fn bit_text(v: &Value) -> String {
    match v.as_bits() {
        Some(bits) => bits.iter().by_vals().map(|b| if b { '1' } else { '0' }).collect(),
        None => String::new(),
    }
}

/// Leaf values on one line; `None` for containers.
fn scalar(v: &Value) -> Option<String> {
    Some(match v {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Enumerated(name) => name.clone(),
        Value::UnknownEnumerated(i) => format!("<unknown extension {i}>"),
        Value::BitString(bits) => format!("'{}'B ({} bits)", bit_text(v), bits.len()),
        Value::OctetString(o) => format!("'{}'H", hex::encode(o)),
        Value::UnknownChoice { index, encoding } => {
            format!("<unknown alternative {index}: '{}'H>", hex::encode(encoding))
        }
        _ => return None,
    })
}

/// Text tree of `v`, starting at `indent` levels of two spaces. Sequence components are
/// listed in name order.
pub fn value_to_dump(v: &Value, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    if let Some(s) = scalar(v) {
        return format!("{pad}{s}");
    }
    match v {
        Value::Sequence(m) if m.is_empty() => format!("{pad}{{}}"),
        Value::Sequence(m) => {
            let mut lines = vec![format!("{pad}{{")];
            for (k, val) in m {
                let sub = value_to_dump(val, indent + 1);
                lines.push(format!("{pad}  {k}: {}", sub.trim_start()));
            }
            lines.push(format!("{pad}}}"));
            lines.join("\n")
        }
        Value::SequenceOf(items) if items.is_empty() => format!("{pad}[]"),
        Value::SequenceOf(items) => {
            let mut lines = vec![format!("{pad}[")];
            for (i, item) in items.iter().enumerate() {
                let sub = value_to_dump(item, indent + 1);
                lines.push(format!("{pad}  [{i}] {}", sub.trim_start()));
            }
            lines.push(format!("{pad}]"));
            lines.join("\n")
        }
        Value::Choice(name, inner) => {
            let sub = value_to_dump(inner, indent);
            format!("{pad}{name}: {}", sub.trim_start())
        }
        other => format!("{pad}{other:?}"),
    }
}

/// First line of [`value_to_dump`], trimmed.
pub fn value_summary_line(v: &Value) -> String {
    let full = value_to_dump(v, 0);
    full.lines().next().map(|s| s.trim().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_tree() {
        let v = Value::sequence([
            ("id", Value::Int(7)),
            ("flags", Value::bits("101")),
            (
                "cfg",
                Value::choice("setup", Value::sequence([("x", Value::enumerated("n2"))])),
            ),
            ("list", Value::SequenceOf(vec![Value::Int(1), Value::Int(2)])),
            ("raw", Value::OctetString(vec![0xde, 0xad])),
        ]);
        let expected = "\
{
  cfg: setup: {
    x: n2
  }
  flags: '101'B (3 bits)
  id: 7
  list: [
    [0] 1
    [1] 2
  ]
  raw: 'dead'H
}";
        assert_eq!(value_to_dump(&v, 0), expected);
        assert_eq!(value_summary_line(&v), "{");
        assert_eq!(value_summary_line(&Value::Int(3)), "3");
    }
}
