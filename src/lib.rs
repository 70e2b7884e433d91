//! # Blueprint Graph Analyzer (BPGA)
//!
//! Turns the text an Unreal editor produces when Blueprint nodes are copied
//! (`Begin Object ... End Object` dumps) into a logical AST and readable
//! markdown pseudo-code.
//!
//! BPGA never executes anything. It recovers the structure of event graphs:
//! - Events with their parameters
//! - Assignments, calls, branches, loops and switches
//! - Latent actions with their completion callbacks
//! - Delegate subscriptions (`+=`, `-=`, clear)
//! - Unknown nodes, kept verbatim instead of dropped
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bpga::compile_blueprint_text;
//!
//! let text = std::fs::read_to_string("BP_Door.txt")?;
//! match compile_blueprint_text(&text) {
//!     Ok(markdown) => println!("{}", markdown),
//!     Err(e) => eprintln!("Analysis failed: {}", e),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! BPGA follows a multi-phase pipeline:
//!
//! 1. **Object Parsing** - Text to a tree of raw objects ([`parser`])
//! 2. **Graph Building** - Nodes, pins and symmetric links ([`graph`])
//! 3. **Flow Analysis** - Execution and data flow to statements ([`analysis`])
//! 4. **Rendering** - Markdown pseudo-code ([`codegen`])
//!
//! Malformed input never aborts the pipeline. Problems are collected as
//! [`Diagnostic`]s next to the result.

pub mod analysis;
pub mod ast;
pub mod codegen;
pub mod compiler;
pub mod error;
pub mod graph;
pub mod options;
pub mod parser;

// Re-export the main pipeline API
pub use compiler::{
    analyze_blueprint_text, analyze_blueprint_text_with_options, compile_blueprint_text,
    compile_blueprint_text_with_options,
};

pub use analysis::{AnalysisOutput, GraphAnalyzer, NodeProcessor, ProcessorRegistry};
pub use ast::{AstVisitor, Expression, Statement};
pub use codegen::MarkdownGenerator;
pub use error::{BpgaError, Diagnostic, Result, Severity};
pub use graph::{build_graph, BlueprintGraph};
pub use options::{AnalysisOptions, CompileOptions, FormatOptions};
pub use parser::{parse_objects, RawObject};
