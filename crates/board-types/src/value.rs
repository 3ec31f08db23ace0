use std::fmt;

use serde::{Deserialize, Serialize};

/// Typed contract value as it travels in call arguments and results.
///
/// Serialized as `{"type": "string-utf8", "value": "..."}`. `Display`
/// renders the wallet's canonical textual form, e.g. `(ok true)`,
/// `(err u101)` or `u"hello"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Value {
    Bool(bool),
    #[serde(rename = "uint")]
    UInt(u64),
    StringUtf8(String),
    Principal(String),
    ResponseOk(Box<Value>),
    ResponseErr(Box<Value>),
}

impl Value {
    pub fn ok(inner: Value) -> Self {
        Self::ResponseOk(Box::new(inner))
    }

    pub fn err(inner: Value) -> Self {
        Self::ResponseErr(Box::new(inner))
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::StringUtf8(text.into())
    }

    /// Name of the value's type, used in argument mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::UInt(_) => "uint",
            Self::StringUtf8(_) => "string-utf8",
            Self::Principal(_) => "principal",
            Self::ResponseOk(_) | Self::ResponseErr(_) => "response",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::StringUtf8(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::UInt(n) => write!(f, "u{}", n),
            Self::StringUtf8(s) => {
                f.write_str("u\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        _ => write!(f, "{}", c)?,
                    }
                }
                f.write_str("\"")
            }
            Self::Principal(p) => write!(f, "'{}", p),
            Self::ResponseOk(v) => write!(f, "(ok {})", v),
            Self::ResponseErr(v) => write!(f, "(err {})", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_responses() {
        assert_eq!(Value::ok(Value::Bool(true)).to_string(), "(ok true)");
        assert_eq!(Value::err(Value::UInt(101)).to_string(), "(err u101)");
    }

    #[test]
    fn renders_strings_with_escapes() {
        assert_eq!(Value::string("none").to_string(), "u\"none\"");
        assert_eq!(Value::string("say \"hi\"").to_string(), "u\"say \\\"hi\\\"\"");
        assert_eq!(Value::string("merhaba dünya").to_string(), "u\"merhaba dünya\"");
    }

    #[test]
    fn serde_tags() {
        let v: Value =
            serde_json::from_str(r#"{"type":"string-utf8","value":"hello stacks"}"#).unwrap();
        assert_eq!(v, Value::string("hello stacks"));

        let p: Value = serde_json::from_str(r#"{"type":"principal","value":"ST1ABC"}"#).unwrap();
        assert_eq!(p.type_name(), "principal");

        let json = serde_json::to_value(Value::err(Value::UInt(101))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "response-err", "value": {"type": "uint", "value": 101}})
        );
    }
}
