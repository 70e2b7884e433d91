//! # Graph Builder
//!
//! Converts the raw object tree into a [`BlueprintGraph`]: node objects become
//! [`GraphNode`]s, their pin children become [`GraphPin`]s, and `LinkedTo`
//! references are resolved into symmetric [`PinRef`] links.

use super::model::{
    BlueprintGraph, DataType, GraphNode, GraphPin, PinCategory, PinDirection, PinRef,
};
use crate::error::Diagnostic;
use crate::parser::{PropertyValue, RawObject};
use std::collections::{HashMap, HashSet};

/// Class name prefixes that mark an object as a graph node
const NODE_CLASS_PREFIXES: &[&str] = &["K2Node_", "EdGraphNode_"];

/// Node classes that start an execution chain
pub const EVENT_CLASSES: &[&str] = &[
    "K2Node_Event",
    "K2Node_CustomEvent",
    "K2Node_ComponentBoundEvent",
    "K2Node_InputAction",
    "K2Node_InputKey",
    "K2Node_InputAxisEvent",
    "K2Node_InputAxisKeyEvent",
    "K2Node_InputTouch",
    "K2Node_FunctionEntry",
];

/// Build a typed graph from parsed objects.
///
/// # Arguments
///
/// * `objects` - Root objects from [`crate::parser::parse_objects`]
///
/// # Returns
///
/// The graph, with dropped links and other recoverable problems listed in
/// `graph.diagnostics`. Building never fails.
pub fn build_graph(objects: &[RawObject]) -> BlueprintGraph {
    GraphBuilder::new().build(objects)
}

/// A `LinkedTo` entry before resolution
#[derive(Debug, Clone, PartialEq)]
enum LinkTarget {
    /// `NodeName PinId`
    NodePin { node_name: String, pin_id: String },
    /// Bare pin id
    PinId(String),
    /// Older dumps reference the pin object by name
    PinObject(String),
}

impl std::fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkTarget::NodePin { node_name, pin_id } => write!(f, "{} {}", node_name, pin_id),
            LinkTarget::PinId(id) | LinkTarget::PinObject(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Default)]
pub struct GraphBuilder {
    temp_counter: u32,
    diagnostics: Vec<Diagnostic>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(mut self, objects: &[RawObject]) -> BlueprintGraph {
        let all: Vec<&RawObject> = objects.iter().flat_map(|o| o.walk()).collect();
        let graph_name = derive_graph_name(&all);
        let mut graph = BlueprintGraph::new(graph_name);

        let mut names: HashMap<String, String> = HashMap::new();
        let mut pin_objects: HashMap<String, PinRef> = HashMap::new();
        let mut pending_links: Vec<(PinRef, Vec<LinkTarget>)> = Vec::new();

        for object in all.iter().filter(|o| is_node_object(o)) {
            let (mut node, links, pin_names) = self.build_node(object);

            if graph.contains(&node.node_guid) {
                let replacement = self.temp_guid();
                self.diagnostics.push(Diagnostic::warning(
                    Some(&node.node_guid),
                    format!("Duplicate node guid on '{}', using {}", node.node_name, replacement),
                ));
                node.node_guid = replacement;
            }

            if names.contains_key(&node.node_name) {
                self.diagnostics.push(Diagnostic::warning(
                    Some(&node.node_guid),
                    format!(
                        "Duplicate node name '{}', links resolve to the first occurrence",
                        node.node_name
                    ),
                ));
            } else {
                names.insert(node.node_name.clone(), node.node_guid.clone());
            }

            for (object_name, pin_id) in pin_names {
                pin_objects
                    .entry(object_name)
                    .or_insert_with(|| PinRef::new(&node.node_guid, pin_id));
            }
            for (pin_id, targets) in links {
                pending_links.push((PinRef::new(&node.node_guid, pin_id), targets));
            }
            graph.add_node(node);
        }

        let pin_ids = index_pin_ids(&graph);
        let links = self.resolve_links(&graph, &names, &pin_ids, &pin_objects, pending_links);
        apply_links(&mut graph, links);

        graph.entry_nodes = self.find_entry_nodes(&graph);
        graph.diagnostics = self.diagnostics;

        tracing::debug!(
            "[GRAPH] Built '{}' with {} nodes and {} entry points",
            graph.graph_name,
            graph.len(),
            graph.entry_nodes.len()
        );
        graph
    }

    fn temp_guid(&mut self) -> String {
        let guid = format!("TEMP-{:08x}", self.temp_counter);
        self.temp_counter += 1;
        guid
    }

    /// Returns the node, its unresolved links per pin id, and pin object names
    #[allow(clippy::type_complexity)]
    fn build_node(
        &mut self,
        object: &RawObject,
    ) -> (GraphNode, Vec<(String, Vec<LinkTarget>)>, Vec<(String, String)>) {
        let node_guid = match object.property_str("NodeGuid") {
            Some(guid) if !guid.is_empty() => guid.to_string(),
            _ => self.temp_guid(),
        };

        let mut pins = Vec::new();
        let mut links = Vec::new();
        let mut pin_names = Vec::new();

        for child in object.children.iter().filter(|c| c.short_class().starts_with("EdGraphPin")) {
            let pin_id = match pin_field_str(child, "PinId") {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => self.temp_guid(),
            };
            let targets = link_targets(child);
            if !targets.is_empty() {
                links.push((pin_id.clone(), targets));
            }
            if !child.name.is_empty() {
                pin_names.push((child.name.clone(), pin_id.clone()));
            }
            pins.push(build_pin(child, pin_id));
        }

        let properties = object
            .properties
            .iter()
            .filter(|(k, _)| k != "NodeGuid")
            .cloned()
            .collect();

        let node = GraphNode {
            node_guid,
            node_name: object.name.clone(),
            class_type: object.class_type.clone(),
            properties,
            pins,
        };
        (node, links, pin_names)
    }

    fn resolve_links(
        &mut self,
        graph: &BlueprintGraph,
        names: &HashMap<String, String>,
        pin_ids: &HashMap<String, PinRef>,
        pin_objects: &HashMap<String, PinRef>,
        pending: Vec<(PinRef, Vec<LinkTarget>)>,
    ) -> Vec<(PinRef, PinRef)> {
        let mut resolved = Vec::new();
        let mut seen = HashSet::new();

        for (source, targets) in pending {
            let Some((_, source_pin)) = graph.pin(&source) else {
                continue;
            };

            for target in targets {
                let target_ref = match &target {
                    LinkTarget::NodePin { node_name, pin_id } => names
                        .get(node_name)
                        .map(|guid| PinRef::new(guid, pin_id))
                        .filter(|r| graph.pin(r).is_some())
                        .or_else(|| pin_ids.get(pin_id).cloned()),
                    LinkTarget::PinId(pin_id) => pin_ids.get(pin_id).cloned(),
                    LinkTarget::PinObject(name) => pin_objects.get(name).cloned(),
                };

                let Some(target_ref) = target_ref else {
                    tracing::warn!(
                        "[GRAPH] Dropping dangling link {} from {}",
                        target,
                        source.node_guid
                    );
                    self.diagnostics.push(Diagnostic::warning(
                        Some(&source.node_guid),
                        format!("Dangling link from pin '{}' to {}", source_pin.pin_name, target),
                    ));
                    continue;
                };
                if target_ref == source {
                    continue;
                }

                let Some((_, target_pin)) = graph.pin(&target_ref) else {
                    continue;
                };
                if target_pin.direction == source_pin.direction {
                    self.diagnostics.push(Diagnostic::warning(
                        Some(&source.node_guid),
                        format!(
                            "Dropping link between two {:?} pins '{}' and '{}'",
                            source_pin.direction, source_pin.pin_name, target_pin.pin_name
                        ),
                    ));
                    continue;
                }

                // Store links output -> input so both directions collapse to one entry
                let pair = match source_pin.direction {
                    PinDirection::Output => (source.clone(), target_ref),
                    PinDirection::Input => (target_ref, source.clone()),
                };
                if seen.insert(pair.clone()) {
                    resolved.push(pair);
                }
            }
        }

        resolved
    }

    fn find_entry_nodes(&mut self, graph: &BlueprintGraph) -> Vec<String> {
        let has_inbound_exec = |node: &GraphNode| node.exec_inputs().any(GraphPin::is_linked);

        let events: Vec<String> = graph
            .nodes()
            .iter()
            .filter(|n| EVENT_CLASSES.contains(&n.short_class()) && !has_inbound_exec(n))
            .map(|n| n.node_guid.clone())
            .collect();
        if !events.is_empty() {
            return events;
        }

        let chain_heads: Vec<String> = graph
            .nodes()
            .iter()
            .filter(|n| n.has_exec_pins() && !has_inbound_exec(n))
            .map(|n| n.node_guid.clone())
            .collect();
        if !chain_heads.is_empty() {
            self.diagnostics.push(Diagnostic::info(
                None,
                format!(
                    "No event nodes found, using {} chain head(s) as entry points",
                    chain_heads.len()
                ),
            ));
            return chain_heads;
        }

        match graph.nodes().iter().find(|n| n.has_exec_pins()) {
            Some(node) => {
                self.diagnostics.push(Diagnostic::info(
                    Some(&node.node_guid),
                    "Every executable node has an inbound link, starting from the first one",
                ));
                vec![node.node_guid.clone()]
            }
            None => Vec::new(),
        }
    }
}

fn is_node_object(object: &RawObject) -> bool {
    let class = object.short_class();
    NODE_CLASS_PREFIXES.iter().any(|prefix| class.starts_with(prefix))
}

/// Pin fields are flat (`PinType.PinCategory`) in current dumps and nested
/// (`PinType=(PinCategory=...)`) in older ones
fn pin_field<'a>(pin: &'a RawObject, key: &str) -> Option<&'a PropertyValue> {
    if let Some(value) = pin.property(key) {
        return Some(value);
    }
    let (outer, inner) = key.split_once('.')?;
    pin.property(outer)?.get(inner)
}

fn pin_field_str<'a>(pin: &'a RawObject, key: &str) -> Option<&'a str> {
    pin_field(pin, key).and_then(PropertyValue::as_str)
}

fn build_pin(object: &RawObject, pin_id: String) -> GraphPin {
    let pin_name = pin_field_str(object, "PinName")
        .filter(|s| !s.is_empty())
        .unwrap_or(&object.name)
        .to_string();

    let is_output = pin_field_str(object, "Direction") == Some("EGPD_Output")
        || pin_field(object, "PinType.bIsOutput")
            .or_else(|| pin_field(object, "bIsOutput"))
            .and_then(PropertyValue::as_bool)
            .unwrap_or(false);
    let direction = if is_output { PinDirection::Output } else { PinDirection::Input };

    let category_name = pin_field_str(object, "PinType.PinCategory").unwrap_or_default();
    let category = if category_name == "exec" {
        PinCategory::Exec
    } else {
        let container = pin_field_str(object, "PinType.ContainerType")
            .filter(|c| !c.is_empty() && *c != "None")
            .map(str::to_string)
            .or_else(|| {
                pin_field(object, "PinType.bIsArray")
                    .and_then(PropertyValue::as_bool)
                    .filter(|b| *b)
                    .map(|_| "Array".to_string())
            });
        PinCategory::Data(DataType {
            category: category_name.to_string(),
            sub_category: non_empty(pin_field_str(object, "PinType.PinSubCategory")),
            sub_category_object: non_empty(pin_field_str(object, "PinType.PinSubCategoryObject")),
            container,
        })
    };

    let hidden = pin_field(object, "bHidden")
        .and_then(PropertyValue::as_bool)
        .unwrap_or(false);

    GraphPin {
        pin_id,
        pin_name,
        direction,
        category,
        default_value: default_value(object),
        linked_to: Vec::new(),
        hidden,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|s| !s.is_empty() && *s != "None")
        .map(str::to_string)
}

/// `DefaultObject` wins over `DefaultValue`; localized text is unwrapped
fn default_value(object: &RawObject) -> Option<String> {
    if let Some(object_path) = non_empty(pin_field_str(object, "DefaultObject")) {
        return Some(object_path);
    }
    if let Some(value) = pin_field_str(object, "DefaultValue") {
        return Some(value.to_string());
    }
    if let Some(text) = pin_field_str(object, "DefaultTextValue") {
        return Some(unwrap_localized_text(text));
    }
    pin_field_str(object, "AutogeneratedDefaultValue").map(str::to_string)
}

/// `NSLOCTEXT("ns", "key", "Hello")` -> `Hello`, `INVTEXT("x")` -> `x`
fn unwrap_localized_text(text: &str) -> String {
    let is_wrapped = ["NSLOCTEXT(", "LOCTEXT(", "INVTEXT("]
        .iter()
        .any(|prefix| text.starts_with(prefix));
    if !is_wrapped {
        return text.to_string();
    }
    let inner = text
        .find('(')
        .and_then(|start| text.rfind(')').map(|end| &text[start + 1..end]));
    let Some(inner) = inner else {
        return text.to_string();
    };
    let last = inner.trim_end().trim_end_matches('"');
    match last.rfind('"') {
        Some(quote) => last[quote + 1..].to_string(),
        None => text.to_string(),
    }
}

fn link_targets(pin: &RawObject) -> Vec<LinkTarget> {
    let mut targets = Vec::new();

    if let Some(list) = pin_field(pin, "LinkedTo").and_then(PropertyValue::as_list) {
        for entry in list.iter().filter_map(PropertyValue::as_str) {
            let entry = entry.trim();
            match entry.split_once(char::is_whitespace) {
                Some((node_name, pin_id)) => targets.push(LinkTarget::NodePin {
                    node_name: node_name.to_string(),
                    pin_id: pin_id.trim().to_string(),
                }),
                None if !entry.is_empty() => targets.push(LinkTarget::PinId(entry.to_string())),
                None => {}
            }
        }
    }

    // Older format: LinkedTo(0)=EdGraphPin'K2Node_X_0.EdGraphPin_3'
    for (key, value) in &pin.properties {
        if !key.starts_with("LinkedTo(") {
            continue;
        }
        if let Some(path) = value.as_str() {
            let name = path
                .trim_end_matches(|c| c == '\'' || c == '"')
                .rsplit(|c| c == '\'' || c == '"' || c == '.' || c == ':')
                .next()
                .unwrap_or(path);
            targets.push(LinkTarget::PinObject(name.to_string()));
        }
    }

    targets
}

fn index_pin_ids(graph: &BlueprintGraph) -> HashMap<String, PinRef> {
    let mut index = HashMap::new();
    for node in graph.nodes() {
        for pin in &node.pins {
            index
                .entry(pin.pin_id.clone())
                .or_insert_with(|| PinRef::new(&node.node_guid, &pin.pin_id));
        }
    }
    index
}

/// Write each output -> input pair onto both pins in discovery order
fn apply_links(graph: &mut BlueprintGraph, links: Vec<(PinRef, PinRef)>) {
    let mut per_pin: HashMap<PinRef, Vec<PinRef>> = HashMap::new();
    for (output, input) in links {
        per_pin.entry(output.clone()).or_default().push(input.clone());
        per_pin.entry(input).or_default().push(output);
    }

    for node in graph.nodes_mut() {
        for pin in &mut node.pins {
            if let Some(targets) = per_pin.remove(&PinRef::new(&node.node_guid, &pin.pin_id)) {
                pin.linked_to = targets;
            }
        }
    }
}

/// `"<Asset> <Graph>"` from the first `/Game/...` export path
fn derive_graph_name(objects: &[&RawObject]) -> String {
    for object in objects {
        let Some(path) = object.property_str("ExportPath") else {
            continue;
        };
        let Some(start) = path.find("/Game/") else {
            continue;
        };
        let path = path[start..].trim_end_matches(|c| c == '\'' || c == '"');
        let (asset_path, inner) = match path.split_once(':') {
            Some((asset_path, inner)) => (asset_path, Some(inner)),
            None => (path, None),
        };
        let asset = asset_path
            .rsplit('/')
            .next()
            .and_then(|s| s.split('.').next())
            .unwrap_or(asset_path);
        let graph = inner
            .and_then(|s| s.split('.').next())
            .filter(|s| !s.is_empty())
            .unwrap_or("EventGraph");
        return format!("{} {}", asset, graph);
    }
    "EventGraph".to_string()
}
