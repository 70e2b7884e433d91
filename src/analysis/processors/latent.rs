//! Latent and async actions (ability tasks, async proxies, montage playback).
//!
//! These nodes start work that completes later. Every exec output except
//! `then` is a completion callback, and the node's data outputs carry the
//! callback payload, so they are only bound inside callback bodies.

use super::calls::not_yet_evaluated;
use super::{
    clean_member_name, kind_label, to_snake_case, NodeProcessingResult, NodeProcessor,
    ProcessorRegistry,
};
use crate::analysis::analyzer::GraphAnalyzer;
use crate::analysis::context::AnalysisContext;
use crate::ast::{
    CallbackBlock, Expression, FunctionCallExpression, LatentActionNode, Parameter, SourceLocation,
    Statement,
};
use crate::graph::{GraphNode, GraphPin, PinRef};
use std::sync::Arc;

pub fn register(registry: &mut ProcessorRegistry) {
    registry.register(
        &[
            "K2Node_LatentAbilityCall",
            "K2Node_AsyncAction",
            "K2Node_BaseAsyncTask",
            "K2Node_LatentGameplayTaskCall",
            "K2Node_PlayMontage",
        ],
        Arc::new(LatentActionProcessor),
    );
}

pub struct LatentActionProcessor;

impl NodeProcessor for LatentActionProcessor {
    fn name(&self) -> &'static str {
        "latent_action"
    }

    fn process_statement<'g>(
        &self,
        analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
    ) -> NodeProcessingResult {
        let function = node
            .member_reference()
            .map(|r| clean_member_name(&r.name).to_string())
            .unwrap_or_else(|| kind_label(node).to_string());
        let target = analyzer.resolve_target(cx, node);
        let arguments = analyzer.collect_arguments(cx, node, &[]);
        let call = FunctionCallExpression {
            target: target.map(Box::new),
            function,
            arguments,
            location: SourceLocation::of(node),
        };

        let payload: Vec<&'g GraphPin> = node.data_outputs().filter(|p| !p.hidden).collect();
        let then_id = node.then_pin().map(|p| p.pin_id.as_str());
        let triggers: Vec<&'g GraphPin> = node
            .exec_outputs()
            .filter(|p| Some(p.pin_id.as_str()) != then_id && p.is_linked())
            .collect();

        let mut callbacks = Vec::new();
        for trigger in triggers {
            let mut bindings = Vec::new();
            let mut parameters = Vec::new();
            for pin in &payload {
                let name = cx.unique_name(&to_snake_case(&pin.pin_name));
                bindings.push((
                    PinRef::new(&node.node_guid, &pin.pin_id),
                    Expression::variable(name.clone(), false),
                ));
                parameters.push(Parameter::new(name, Some(pin.type_name())));
            }
            let body = analyzer.walk_body(cx, trigger, bindings);
            callbacks.push(CallbackBlock {
                trigger: trigger.pin_name.clone(),
                bindings: parameters,
                body,
            });
        }

        NodeProcessingResult::then(Statement::LatentAction(LatentActionNode {
            call,
            callbacks,
            location: SourceLocation::of(node),
        }))
    }

    fn process_expression<'g>(
        &self,
        _analyzer: &GraphAnalyzer,
        cx: &mut AnalysisContext<'g>,
        node: &'g GraphNode,
        output: &'g GraphPin,
    ) -> Expression {
        not_yet_evaluated(cx, node, output)
    }
}
