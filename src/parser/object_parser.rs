//! Line-oriented block parser for `Begin Object` / `End Object` dumps.

use super::property::{
    max_group_depth, paren_balance, parse_property_line, parse_value, MAX_VALUE_DEPTH,
};
use super::{PropertyValue, RawObject, PIN_CLASS};
use crate::error::Diagnostic;

/// Result of parsing a dump: root objects plus anything worth reporting
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub objects: Vec<RawObject>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Objects nested deeper than this are attached to their ancestor at this
/// depth instead of their direct parent
pub const MAX_OBJECT_DEPTH: usize = 64;

/// Parse a dump into its root-level objects.
///
/// Never fails: malformed content is kept as `Raw` properties or placeholder
/// objects so later stages can still report it.
pub fn parse_objects(text: &str) -> Vec<RawObject> {
    ObjectParser::new().parse(text).objects
}

struct OpenObject {
    object: RawObject,
    /// Slot in the parent's child list when this block re-opened an earlier object
    reopened_at: Option<usize>,
    start_line: usize,
}

/// Stack-based parser over the dump's lines
#[derive(Default)]
pub struct ObjectParser {
    roots: Vec<RawObject>,
    stack: Vec<OpenObject>,
    pending: Option<(String, usize)>,
    depth_reported: bool,
    diagnostics: Vec<Diagnostic>,
}

impl ObjectParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(mut self, text: &str) -> ParseOutput {
        tracing::debug!("[PARSER] Parsing {} bytes", text.len());

        for (index, raw_line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw_line.trim_start_matches('\u{feff}').trim();

            if let Some((mut buffer, start)) = self.pending.take() {
                if is_block_marker(line) {
                    self.diagnostics.push(Diagnostic::warning(
                        None,
                        format!("Unterminated value starting on line {}", start),
                    ));
                    self.store_unparsed(buffer);
                } else {
                    buffer.push(' ');
                    buffer.push_str(line);
                    self.accept_property(buffer, start);
                    continue;
                }
            }

            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            if let Some(header) = line.strip_prefix("Begin Object") {
                self.begin_object(header, line, line_no);
            } else if line.starts_with("End Object") {
                self.end_object(line_no);
            } else if line.starts_with("Begin Map") || line.starts_with("End Map") {
                continue;
            } else if self.stack.is_empty() {
                tracing::debug!("[PARSER] Ignoring line {} outside any object", line_no);
            } else {
                self.accept_property(line.to_string(), line_no);
            }
        }

        if let Some((buffer, start)) = self.pending.take() {
            self.diagnostics.push(Diagnostic::warning(
                None,
                format!("Unterminated value starting on line {}", start),
            ));
            self.store_unparsed(buffer);
        }

        while let Some(open) = self.stack.last() {
            let message = format!(
                "Object '{}' opened on line {} was never closed",
                open.object.name, open.start_line
            );
            tracing::warn!("[PARSER] {}", message);
            self.diagnostics.push(Diagnostic::warning(None, message));
            self.close_top();
        }

        tracing::debug!("[PARSER] Parsed {} root objects", self.roots.len());
        ParseOutput {
            objects: self.roots,
            diagnostics: self.diagnostics,
        }
    }

    fn begin_object(&mut self, header: &str, line: &str, line_no: usize) {
        let attributes = parse_header_attributes(header);
        let class = header_value(&attributes, "Class");
        let name = header_value(&attributes, "Name");

        let open = match (class, name) {
            (Some(class), Some(name)) => {
                let mut object = RawObject::new(class, name);
                object.properties = attributes
                    .into_iter()
                    .filter(|(k, _)| k != "Class" && k != "Name")
                    .collect();
                OpenObject { object, reopened_at: None, start_line: line_no }
            }
            (None, Some(name)) => match self.take_sibling(&name) {
                Some((index, object)) => OpenObject {
                    object,
                    reopened_at: Some(index),
                    start_line: line_no,
                },
                None => {
                    self.diagnostics.push(Diagnostic::warning(
                        None,
                        format!(
                            "Line {}: object '{}' re-opened before it was declared",
                            line_no, name
                        ),
                    ));
                    OpenObject {
                        object: RawObject::new("", name),
                        reopened_at: None,
                        start_line: line_no,
                    }
                }
            },
            (class, None) => {
                self.diagnostics.push(Diagnostic::warning(
                    None,
                    format!("Line {}: malformed object header", line_no),
                ));
                let name = format!("MalformedObject_{}", line_no);
                let mut object = RawObject::new(class.unwrap_or_default(), name);
                object
                    .properties
                    .push(("Header".to_string(), PropertyValue::Raw(line.to_string())));
                OpenObject { object, reopened_at: None, start_line: line_no }
            }
        };

        if self.stack.len() >= MAX_OBJECT_DEPTH && !self.depth_reported {
            self.depth_reported = true;
            tracing::warn!(
                "[PARSER] Object nesting deeper than {} levels on line {}",
                MAX_OBJECT_DEPTH,
                line_no
            );
            self.diagnostics.push(Diagnostic::warning(
                None,
                format!(
                    "Line {}: object nesting deeper than {} levels, inner objects are flattened",
                    line_no, MAX_OBJECT_DEPTH
                ),
            ));
        }
        self.stack.push(open);
    }

    /// Open object that receives children closed now
    fn parent_index(&self) -> Option<usize> {
        self.stack
            .len()
            .checked_sub(1)
            .map(|top| top.min(MAX_OBJECT_DEPTH - 1))
    }

    fn siblings_mut(&mut self) -> &mut Vec<RawObject> {
        match self.parent_index() {
            Some(index) => &mut self.stack[index].object.children,
            None => &mut self.roots,
        }
    }

    fn end_object(&mut self, line_no: usize) {
        if self.stack.is_empty() {
            self.diagnostics.push(Diagnostic::warning(
                None,
                format!("Line {}: 'End Object' without a matching 'Begin Object'", line_no),
            ));
            return;
        }
        self.close_top();
    }

    fn close_top(&mut self) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        let siblings = self.siblings_mut();
        match open.reopened_at {
            Some(index) if index <= siblings.len() => siblings.insert(index, open.object),
            _ => siblings.push(open.object),
        }
    }

    /// Remove an already closed sibling so its block can be extended
    fn take_sibling(&mut self, name: &str) -> Option<(usize, RawObject)> {
        let siblings = self.siblings_mut();
        let index = siblings.iter().position(|o| o.name == name)?;
        Some((index, siblings.remove(index)))
    }

    fn accept_property(&mut self, line: String, start_line: usize) {
        if paren_balance(&line) > 0 {
            self.pending = Some((line, start_line));
            return;
        }
        if max_group_depth(&line) > MAX_VALUE_DEPTH {
            self.diagnostics.push(Diagnostic::warning(
                None,
                format!(
                    "Line {}: value nests deeper than {} groups, inner groups kept verbatim",
                    start_line, MAX_VALUE_DEPTH
                ),
            ));
        }

        if let Some(pin_body) = line.strip_prefix("CustomProperties Pin") {
            self.accept_pin(pin_body.trim(), &line, start_line);
            return;
        }

        match parse_property_line(&line) {
            Some(property) => {
                if let Some(open) = self.stack.last_mut() {
                    open.object.properties.push(property);
                }
            }
            None => self.store_unparsed(line),
        }
    }

    fn accept_pin(&mut self, body: &str, line: &str, line_no: usize) {
        let fields = match parse_value(body) {
            Some((PropertyValue::Struct(fields), rest)) if rest.trim().is_empty() => fields,
            _ => {
                self.diagnostics.push(Diagnostic::warning(
                    None,
                    format!("Line {}: could not parse pin declaration", line_no),
                ));
                self.store_unparsed(line.to_string());
                return;
            }
        };

        let name = fields
            .iter()
            .find(|(k, _)| k == "PinName")
            .and_then(|(_, v)| v.as_str())
            .unwrap_or_default()
            .to_string();
        let mut pin = RawObject::new(PIN_CLASS, name);
        pin.properties = fields;

        if let Some(open) = self.stack.last_mut() {
            open.object.children.push(pin);
        }
    }

    fn store_unparsed(&mut self, line: String) {
        if let Some(open) = self.stack.last_mut() {
            tracing::debug!("[PARSER] Keeping unparsed line in '{}'", open.object.name);
            open.object.properties.push(("Unparsed".to_string(), PropertyValue::Raw(line)));
        }
    }
}

fn is_block_marker(line: &str) -> bool {
    line.starts_with("Begin Object") || line.starts_with("End Object")
}

fn header_value(attributes: &[(String, PropertyValue)], key: &str) -> Option<String> {
    attributes
        .iter()
        .find(|(k, _)| k == key)
        .and_then(|(_, v)| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Split `Class=/Script/X.Y Name="Foo" ExportPath="..."` into key/value pairs
fn parse_header_attributes(header: &str) -> Vec<(String, PropertyValue)> {
    let mut attributes = Vec::new();
    let mut rest = header.trim_start();

    while !rest.is_empty() {
        let Some((key, after)) = rest.split_once('=') else {
            break;
        };
        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            break;
        }

        let after = after.trim_start();
        let (value, remainder) = if after.starts_with('"') {
            match parse_value(after) {
                Some((value, remainder)) => (value, remainder),
                None => (PropertyValue::Raw(after.to_string()), ""),
            }
        } else {
            let end = after.find(char::is_whitespace).unwrap_or(after.len());
            (PropertyValue::Scalar(after[..end].to_string()), &after[end..])
        };

        attributes.push((key.to_string(), value));
        rest = remainder.trim_start();
    }

    attributes
}
