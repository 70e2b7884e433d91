//! # Graph Analysis
//!
//! Turns a [`crate::graph::BlueprintGraph`] into the logical AST.
//!
//! - [`analyzer`] - traversal, dispatch and data resolution
//! - [`context`] - per-traversal state
//! - [`scope`] - lexical scopes for loop and callback variables
//! - [`processors`] - one handler per node family

pub mod analyzer;
pub mod context;
pub mod processors;
pub mod scope;

pub use analyzer::{AnalysisOutput, GraphAnalyzer};
pub use context::AnalysisContext;
pub use processors::{Continuation, NodeProcessingResult, NodeProcessor, ProcessorRegistry};
pub use scope::ScopeManager;
