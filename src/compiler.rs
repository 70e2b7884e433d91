//! # Blueprint Analyzer Pipeline
//!
//! Main entry points for turning Blueprint text dumps into a logical AST or
//! markdown pseudo-code.

use crate::analysis::{AnalysisOutput, GraphAnalyzer};
use crate::codegen::MarkdownGenerator;
use crate::error::{BpgaError, Result};
use crate::graph::build_graph;
use crate::options::{AnalysisOptions, CompileOptions};
use crate::parser::ObjectParser;

/// Analyze a Blueprint text dump into the logical AST
///
/// This is the main entry point of the analyzer. It parses the editor's
/// copy/paste text, builds the node graph and walks every entry point.
///
/// # Arguments
///
/// * `text` - The `Begin Object ... End Object` dump
///
/// # Returns
///
/// * `Ok(AnalysisOutput)` - One top-level statement per entry node plus diagnostics
/// * `Err(BpgaError)` - Only when the text contains no objects at all
///
/// # Examples
///
/// ```rust,no_run
/// use bpga::analyze_blueprint_text;
///
/// let text = std::fs::read_to_string("BP_Door.txt")?;
/// let output = analyze_blueprint_text(&text)?;
/// println!("{} entry points", output.statements.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn analyze_blueprint_text(text: &str) -> Result<AnalysisOutput> {
    analyze_blueprint_text_with_options(text, &AnalysisOptions::default())
}

/// Analyze a Blueprint text dump with explicit traversal options
///
/// # Arguments
///
/// * `text` - The `Begin Object ... End Object` dump
/// * `options` - Traversal budgets and value extraction settings
///
/// # Returns
///
/// * `Ok(AnalysisOutput)` - Statements plus parser, builder and analyzer diagnostics
/// * `Err(BpgaError)` - Empty input or invalid options
pub fn analyze_blueprint_text_with_options(
    text: &str,
    options: &AnalysisOptions,
) -> Result<AnalysisOutput> {
    options.validate()?;

    tracing::info!("[BPGA] Starting Blueprint analysis ({} bytes)", text.len());
    if text.trim().is_empty() {
        return Err(BpgaError::EmptyInput);
    }

    // Phase 1: Parse raw objects
    tracing::info!("[BPGA] Phase 1: Parsing objects...");
    let parsed = ObjectParser::new().parse(text);
    if parsed.objects.is_empty() {
        return Err(BpgaError::EmptyInput);
    }
    tracing::info!("[BPGA] Parsed {} root objects", parsed.objects.len());

    // Phase 2: Build the node graph
    tracing::info!("[BPGA] Phase 2: Building graph...");
    let graph = build_graph(&parsed.objects);
    tracing::info!(
        "[BPGA] Graph '{}': {} nodes, {} entry points",
        graph.graph_name,
        graph.len(),
        graph.entry_nodes.len()
    );

    // Phase 3: Walk execution and data flow
    tracing::info!("[BPGA] Phase 3: Analyzing flow...");
    let analyzer = GraphAnalyzer::with_options(options.clone());
    let mut output = analyzer.analyze(&graph);

    let mut diagnostics = parsed.diagnostics;
    diagnostics.append(&mut output.diagnostics);
    output.diagnostics = diagnostics;

    tracing::info!(
        "[BPGA] Analysis complete: {} statements, {} diagnostics",
        output.statements.len(),
        output.diagnostics.len()
    );

    Ok(output)
}

/// Render a Blueprint text dump as markdown pseudo-code
///
/// # Arguments
///
/// * `text` - The `Begin Object ... End Object` dump
///
/// # Returns
///
/// * `Ok(String)` - The rendered markdown
/// * `Err(BpgaError)` - Only when the text contains no objects at all
pub fn compile_blueprint_text(text: &str) -> Result<String> {
    compile_blueprint_text_with_options(text, &CompileOptions::default())
}

/// Render a Blueprint text dump with explicit analysis and format options
pub fn compile_blueprint_text_with_options(text: &str, options: &CompileOptions) -> Result<String> {
    let output = analyze_blueprint_text_with_options(text, &options.analysis)?;

    // Phase 4: Render
    tracing::info!("[BPGA] Phase 4: Rendering markdown...");
    let markdown = MarkdownGenerator::new(options.format.clone()).generate(&output);
    tracing::info!("[BPGA] Rendering complete ({} bytes)", markdown.len());

    Ok(markdown)
}
