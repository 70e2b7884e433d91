//! # Blueprint Graph
//!
//! Typed node/pin/link model and the builder that produces it from parsed
//! objects.

mod builder;
mod model;
pub mod pins;

pub use builder::{build_graph, GraphBuilder, EVENT_CLASSES};
pub use model::{
    object_display_name, BlueprintGraph, DataType, GraphNode, GraphPin, MemberReference,
    PinCategory, PinDirection, PinRef,
};
