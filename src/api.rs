//! Top level api methods for dot2tex.

use crate::{
    diagnostics::Diagnostics,
    emit::{convert_graph, Output},
    error::Result,
    graph::Graph,
    options::{EmitterContext, Options},
};

/// Given dot source laid out by graphviz (with xdot attributes), return LaTeX.
///
/// Warnings are collected in `diagnostics`.  Only a dot syntax error fails the conversion.
pub fn dot_to_tex(dot: &str, options: &Options, diagnostics: &mut Diagnostics) -> Result<String> {
    let graph = Graph::from_dot(dot)?;

    Ok(graph_to_tex(&graph, options, diagnostics))
}

/// Convert an already parsed graph.
pub fn graph_to_tex(graph: &Graph, options: &Options, diagnostics: &mut Diagnostics) -> String {
    let (output, ctx) = graph_to_output(graph, options, diagnostics);

    output.assemble(ctx.granularity)
}

/// Convert a graph, keeping the output fragments apart.  Also returns the options as
/// resolved against the graph's own settings.
pub fn graph_to_output(
    graph: &Graph,
    options: &Options,
    diagnostics: &mut Diagnostics,
) -> (Output, EmitterContext) {
    let ctx = EmitterContext::resolve(options, graph, diagnostics);
    log::debug!("resolved options: {ctx:?}");

    (convert_graph(graph, &ctx, diagnostics), ctx)
}
