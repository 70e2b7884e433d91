//! # Raw Object Parser
//!
//! Turns the editor's `Begin Object ... End Object` text into a tree of
//! generic [`RawObject`]s. The parser knows nothing about nodes or pins
//! beyond the `CustomProperties Pin` line form, which it turns into child
//! objects so every pin hangs off its owning node.

mod object_parser;
mod property;

pub use object_parser::{parse_objects, ObjectParser, ParseOutput, MAX_OBJECT_DEPTH};
pub use property::{parse_property_line, parse_value, MAX_VALUE_DEPTH};

use serde::Serialize;

/// Class name given to pins declared through `CustomProperties Pin (...)`
pub const PIN_CLASS: &str = "EdGraphPin";

/// A property value as written in the dump
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    /// Quoted string, unescaped
    Text(String),
    /// Bare token (numbers, enums, object paths, `True`/`False`)
    Scalar(String),
    /// `(Key=Value, ...)`, keys kept in source order
    Struct(Vec<(String, PropertyValue)>),
    /// `(A, B, ...)`
    List(Vec<PropertyValue>),
    /// Content that could not be parsed, kept verbatim
    Raw(String),
}

impl PropertyValue {
    /// String content of a text or scalar value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) | PropertyValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&[(String, PropertyValue)]> {
        match self {
            PropertyValue::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Items of a list. An empty struct `()` is treated as an empty list.
    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::List(items) => Some(items),
            PropertyValue::Struct(fields) if fields.is_empty() => Some(&[]),
            _ => None,
        }
    }

    /// Look up a field of a struct value (first match wins)
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.as_struct()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.as_str()? {
            s if s.eq_ignore_ascii_case("true") => Some(true),
            s if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Render the value back into dump syntax
    pub fn to_source(&self) -> String {
        match self {
            PropertyValue::Text(s) => {
                format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
            }
            PropertyValue::Scalar(s) | PropertyValue::Raw(s) => s.clone(),
            PropertyValue::Struct(fields) => {
                let inner: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v.to_source()))
                    .collect();
                format!("({})", inner.join(","))
            }
            PropertyValue::List(items) => {
                let inner: Vec<String> = items.iter().map(|v| v.to_source()).collect();
                format!("({})", inner.join(","))
            }
        }
    }
}

/// One `Begin Object` block
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawObject {
    pub class_type: String,
    pub name: String,
    pub properties: Vec<(String, PropertyValue)>,
    pub children: Vec<RawObject>,
}

impl RawObject {
    pub fn new(class_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            class_type: class_type.into(),
            name: name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// First property with the given key
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// String content of a property
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(PropertyValue::as_str)
    }

    /// Class name without its package path
    /// (`/Script/BlueprintGraph.K2Node_Event` -> `K2Node_Event`)
    pub fn short_class(&self) -> &str {
        short_class_name(&self.class_type)
    }

    /// This object and all descendants, depth-first in source order
    pub fn walk(&self) -> Vec<&RawObject> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(object) = stack.pop() {
            out.push(object);
            stack.extend(object.children.iter().rev());
        }
        out
    }
}

pub fn short_class_name(class_type: &str) -> &str {
    class_type.rsplit('.').next().unwrap_or(class_type)
}
