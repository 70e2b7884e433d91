//! Typed literal values read from pin defaults.

use crate::graph::{object_display_name, DataType};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Object or class reference, shown by its short name
    Object(String),
    /// Enum entries, structs and anything else kept as written
    Raw(String),
}

impl LiteralValue {
    /// Interpret a pin's default text according to the pin type
    pub fn from_default(text: &str, data_type: Option<&DataType>) -> Self {
        let category = data_type.map(|t| t.category.as_str()).unwrap_or_default();
        let has_object = data_type.and_then(|t| t.sub_category_object.as_ref()).is_some();

        match category {
            "bool" => match text.to_ascii_lowercase().as_str() {
                "true" => LiteralValue::Bool(true),
                "false" => LiteralValue::Bool(false),
                _ => LiteralValue::Raw(text.to_string()),
            },
            "int" | "int64" => text
                .parse()
                .map(LiteralValue::Int)
                .unwrap_or_else(|_| LiteralValue::Raw(text.to_string())),
            "byte" if !has_object => text
                .parse()
                .map(LiteralValue::Int)
                .unwrap_or_else(|_| LiteralValue::Raw(text.to_string())),
            "real" | "float" | "double" => text
                .parse()
                .map(LiteralValue::Float)
                .unwrap_or_else(|_| LiteralValue::Raw(text.to_string())),
            "string" | "name" | "text" => LiteralValue::String(text.to_string()),
            "object" | "class" | "softobject" | "softclass" | "interface" => {
                if text.is_empty() || text == "None" {
                    LiteralValue::Raw("None".to_string())
                } else {
                    LiteralValue::Object(object_display_name(text))
                }
            }
            _ => LiteralValue::Raw(text.to_string()),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Bool(b) => write!(f, "{}", b),
            LiteralValue::Int(i) => write!(f, "{}", i),
            LiteralValue::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{:.1}", v),
            LiteralValue::Float(v) => write!(f, "{}", v),
            LiteralValue::String(s) => write!(f, "\"{}\"", s),
            LiteralValue::Object(s) | LiteralValue::Raw(s) => write!(f, "{}", s),
        }
    }
}
