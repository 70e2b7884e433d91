//! Typed graph produced by the builder.

use super::pins::{canonical_pin_name, ELSE, EXECUTE, THEN};
use crate::error::Diagnostic;
use crate::parser::{short_class_name, PropertyValue};
use serde::Serialize;
use std::collections::HashMap;

/// Address of a pin: owning node plus pin id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PinRef {
    pub node_guid: String,
    pub pin_id: String,
}

impl PinRef {
    pub fn new(node_guid: impl Into<String>, pin_id: impl Into<String>) -> Self {
        Self {
            node_guid: node_guid.into(),
            pin_id: pin_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    Input,
    Output,
}

/// Type information of a data pin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataType {
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category_object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

impl DataType {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }

    /// Human readable type name, e.g. `Array<Actor>` or `float`
    pub fn type_name(&self) -> String {
        let base = match (&self.sub_category_object, self.category.as_str()) {
            (Some(object), _) => object_display_name(object),
            (None, "real") => self.sub_category.clone().unwrap_or_else(|| "float".to_string()),
            (None, category) => category.to_string(),
        };
        match self.container.as_deref() {
            Some(container) => format!("{}<{}>", container, base),
            None => base,
        }
    }

    pub fn is_array(&self) -> bool {
        self.container.as_deref() == Some("Array")
    }
}

/// Short display name for an object path (`/Game/BP/BP_Door.BP_Door_C` -> `BP_Door`)
pub fn object_display_name(path: &str) -> String {
    let trimmed = path.trim_matches(|c| c == '\'' || c == '"');
    let inner = match trimmed.find('\'') {
        Some(start) => trimmed[start + 1..].trim_matches(|c| c == '\'' || c == '"'),
        None => trimmed,
    };
    let last = inner
        .rsplit(|c| c == '.' || c == '/' || c == ':')
        .next()
        .unwrap_or(inner);
    last.strip_suffix("_C").unwrap_or(last).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "type", rename_all = "lowercase")]
pub enum PinCategory {
    Exec,
    Data(DataType),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphPin {
    pub pin_id: String,
    pub pin_name: String,
    pub direction: PinDirection,
    pub category: PinCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub linked_to: Vec<PinRef>,
    pub hidden: bool,
}

impl GraphPin {
    pub fn is_exec(&self) -> bool {
        matches!(self.category, PinCategory::Exec)
    }

    pub fn is_linked(&self) -> bool {
        !self.linked_to.is_empty()
    }

    pub fn data_type(&self) -> Option<&DataType> {
        match &self.category {
            PinCategory::Data(data_type) => Some(data_type),
            PinCategory::Exec => None,
        }
    }

    pub fn type_name(&self) -> String {
        match &self.category {
            PinCategory::Exec => "exec".to_string(),
            PinCategory::Data(data_type) => data_type.type_name(),
        }
    }

    /// Pin name after alias normalization
    pub fn canonical_name(&self) -> &str {
        canonical_pin_name(&self.pin_name)
    }
}

/// A resolved member reference (`FunctionReference`, `VariableReference`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberReference {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub self_context: bool,
    /// Set for local variables (`MemberScope`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub node_guid: String,
    pub node_name: String,
    pub class_type: String,
    pub properties: Vec<(String, PropertyValue)>,
    pub pins: Vec<GraphPin>,
}

impl GraphNode {
    pub fn short_class(&self) -> &str {
        short_class_name(&self.class_type)
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(PropertyValue::as_str)
    }

    /// The node's member reference, if it names a function, variable, event or delegate
    pub fn member_reference(&self) -> Option<MemberReference> {
        for (key, value) in &self.properties {
            if !key.ends_with("Reference") {
                continue;
            }
            let Some(name) = value.get("MemberName").and_then(PropertyValue::as_str) else {
                continue;
            };
            return Some(MemberReference {
                name: name.to_string(),
                parent: value
                    .get("MemberParent")
                    .and_then(PropertyValue::as_str)
                    .map(str::to_string),
                self_context: value
                    .get("bSelfContext")
                    .and_then(PropertyValue::as_bool)
                    .unwrap_or(false),
                scope: value
                    .get("MemberScope")
                    .and_then(PropertyValue::as_str)
                    .map(str::to_string),
            });
        }

        [
            "ProxyFactoryFunctionName",
            "CustomFunctionName",
            "DelegatePropertyName",
            "InputActionName",
        ]
        .iter()
        .find_map(|key| self.property_str(key))
        .filter(|name| !name.is_empty())
        .map(|name| MemberReference {
            name: name.to_string(),
            parent: self.property_str("ProxyFactoryClass").map(str::to_string),
            self_context: false,
            scope: None,
        })
    }

    /// Macro graph name for `K2Node_MacroInstance` nodes
    /// (`...StandardMacros:ForEachLoop` -> `ForEachLoop`)
    pub fn macro_name(&self) -> Option<String> {
        let reference = self.property("MacroGraphReference")?;
        let graph = reference.get("MacroGraph").and_then(PropertyValue::as_str)?;
        let name = graph
            .trim_end_matches(|c| c == '\'' || c == '"')
            .rsplit(|c| c == ':' || c == '.')
            .next()?;
        Some(name.to_string())
    }

    pub fn pin_by_id(&self, pin_id: &str) -> Option<&GraphPin> {
        self.pins.iter().find(|p| p.pin_id == pin_id)
    }

    /// Find a pin by exact name first, then by normalized alias
    pub fn find_pin(&self, name: &str, direction: PinDirection) -> Option<&GraphPin> {
        self.pins
            .iter()
            .filter(|p| p.direction == direction)
            .find(|p| p.pin_name == name)
            .or_else(|| {
                let wanted = canonical_pin_name(name);
                self.pins
                    .iter()
                    .filter(|p| p.direction == direction)
                    .find(|p| p.canonical_name().eq_ignore_ascii_case(wanted))
            })
    }

    pub fn input(&self, name: &str) -> Option<&GraphPin> {
        self.find_pin(name, PinDirection::Input)
    }

    pub fn output(&self, name: &str) -> Option<&GraphPin> {
        self.find_pin(name, PinDirection::Output)
    }

    pub fn exec_inputs(&self) -> impl Iterator<Item = &GraphPin> {
        self.pins
            .iter()
            .filter(|p| p.is_exec() && p.direction == PinDirection::Input)
    }

    pub fn exec_outputs(&self) -> impl Iterator<Item = &GraphPin> {
        self.pins
            .iter()
            .filter(|p| p.is_exec() && p.direction == PinDirection::Output)
    }

    pub fn data_inputs(&self) -> impl Iterator<Item = &GraphPin> {
        self.pins
            .iter()
            .filter(|p| !p.is_exec() && p.direction == PinDirection::Input)
    }

    pub fn data_outputs(&self) -> impl Iterator<Item = &GraphPin> {
        self.pins
            .iter()
            .filter(|p| !p.is_exec() && p.direction == PinDirection::Output)
    }

    /// The `then`-style output used to continue a linear chain
    pub fn then_pin(&self) -> Option<&GraphPin> {
        self.output(THEN).filter(|p| p.is_exec())
    }

    pub fn else_pin(&self) -> Option<&GraphPin> {
        self.output(ELSE).filter(|p| p.is_exec())
    }

    pub fn execute_pin(&self) -> Option<&GraphPin> {
        self.input(EXECUTE)
            .filter(|p| p.is_exec())
            .or_else(|| self.exec_inputs().next())
    }

    pub fn has_exec_pins(&self) -> bool {
        self.pins.iter().any(GraphPin::is_exec)
    }

    /// A node without execution pins only produces values
    pub fn is_pure(&self) -> bool {
        !self.has_exec_pins()
    }
}

/// Graph of nodes keyed by guid, in dump order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BlueprintGraph {
    pub graph_name: String,
    nodes: Vec<GraphNode>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    pub entry_nodes: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BlueprintGraph {
    pub fn new(graph_name: impl Into<String>) -> Self {
        Self {
            graph_name: graph_name.into(),
            ..Default::default()
        }
    }

    /// Add a node. Returns `false` if its guid is already taken.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.index.contains_key(&node.node_guid) {
            return false;
        }
        self.index.insert(node.node_guid.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [GraphNode] {
        &mut self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, guid: &str) -> Option<&GraphNode> {
        self.index.get(guid).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, guid: &str) -> bool {
        self.index.contains_key(guid)
    }

    pub fn pin(&self, pin_ref: &PinRef) -> Option<(&GraphNode, &GraphPin)> {
        let node = self.node(&pin_ref.node_guid)?;
        let pin = node.pin_by_id(&pin_ref.pin_id)?;
        Some((node, pin))
    }

    /// Number of links leaving each output pin.
    ///
    /// Used to decide whether a computed value is read more than once.
    pub fn pin_usage_counts(&self) -> HashMap<PinRef, usize> {
        let mut counts = HashMap::new();
        for node in &self.nodes {
            for pin in node.data_outputs() {
                counts.insert(PinRef::new(&node.node_guid, &pin.pin_id), pin.linked_to.len());
            }
        }
        counts
    }
}
