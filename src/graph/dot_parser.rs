//! With Graph::from_dot(), creates a new graph given a string in the dot language.
//!
//! For details on dot, see: <https://graphviz.org/doc/info/lang.html>
use itertools::Itertools;
use pest::error::LineColLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::{Attributes, Graph, GraphKind};
use crate::error::{Error, Result};

#[derive(Parser)]
#[grammar = "dot.pest"]
pub struct DotParser;

/// Attribute defaults in effect within a graph or subgraph body.
#[derive(Debug, Clone, Default)]
struct Scope {
    node_defaults: Attributes,
    edge_defaults: Attributes,
    /// Subgraph receiving graph attributes, None for the root graph.
    subgraph: Option<usize>,
}

impl Graph {
    /// Given a string in the dot language, build a graph.
    ///
    /// Uses the Pest crate to do all the parsing.  Node defaults (`node [...]`) apply to the
    /// nodes created after them within the same body, edge defaults likewise.  Subgraphs used
    /// as edge ends stand for all of their nodes.
    pub fn from_dot(dot_str: &str) -> Result<Self> {
        let dot_graph = DotParser::parse(Rule::dotgraph, dot_str)
            .map_err(parse_failure)?
            .next()
            .ok_or_else(|| Error::GraphParseFailure {
                line: 1,
                column: 1,
                message: "empty input".to_string(),
            })?;

        let mut graph = Graph::default();
        let mut scope = Scope::default();

        for record in dot_graph.into_inner() {
            match record.as_rule() {
                Rule::strict => graph.set_strict(true),
                Rule::graph_kind => {
                    if record.as_str().eq_ignore_ascii_case("graph") {
                        graph.kind = GraphKind::Undirected;
                    }
                }
                Rule::ident => graph.set_name(Some(ident_text(record))),
                Rule::stmt_list => {
                    graph.stmt_list(record, &mut scope);
                }
                Rule::EOI => (),
                _ => unreachable!(),
            }
        }

        Ok(graph)
    }

    /// Process a statement list, returning the indexes of the nodes it mentions.
    fn stmt_list(&mut self, stmt_list: Pair<'_, Rule>, scope: &mut Scope) -> Vec<usize> {
        let mut members = vec![];

        for stmt in stmt_list.into_inner() {
            for statement in stmt.into_inner() {
                match statement.as_rule() {
                    Rule::attr_stmt => self.attr_stmt(statement, scope),
                    Rule::edge_stmt => members.extend(self.edge_stmt(statement, scope)),
                    Rule::node_stmt => members.extend(self.node_stmt(statement, scope)),
                    Rule::subgraph => members.extend(self.subgraph(statement, scope)),
                    Rule::id_assign => {
                        let attributes = attributes_from_pairs(statement);
                        self.graph_attributes_mut(scope).merge(&attributes);
                    }
                    _ => unreachable!(),
                }
            }
        }
        members.into_iter().unique().collect()
    }

    fn graph_attributes_mut(&mut self, scope: &Scope) -> &mut Attributes {
        match scope.subgraph {
            Some(subgraph_idx) => &mut self.get_subgraph_mut(subgraph_idx).attributes,
            None => self.attributes_mut(),
        }
    }

    /// `graph [...]`, `node [...]` or `edge [...]`.
    fn attr_stmt(&mut self, attr_stmt: Pair<'_, Rule>, scope: &mut Scope) {
        let mut target = "";
        let mut attributes = Attributes::new();

        for pair in attr_stmt.into_inner() {
            match pair.as_rule() {
                Rule::attr_target => target = pair.as_str(),
                Rule::attr_list => attributes = attr_list(pair),
                _ => unreachable!(),
            }
        }
        match target.to_ascii_lowercase().as_str() {
            "graph" => self.graph_attributes_mut(scope).merge(&attributes),
            "node" => scope.node_defaults.merge(&attributes),
            "edge" => scope.edge_defaults.merge(&attributes),
            _ => unreachable!(),
        }
    }

    /// A node statement creates the node (if new) and sets its attributes.
    fn node_stmt(&mut self, node_stmt: Pair<'_, Rule>, scope: &Scope) -> Option<usize> {
        let mut node_idx = None;

        for pair in node_stmt.into_inner() {
            match pair.as_rule() {
                Rule::node_id => node_idx = Some(self.node_id(pair, scope).0),
                Rule::attr_list => {
                    if let Some(node_idx) = node_idx {
                        self.get_node_mut(node_idx).attributes.merge(&attr_list(pair));
                    }
                }
                _ => unreachable!(),
            }
        }

        node_idx
    }

    /// Resolve a node id, creating the node with the current defaults if it is new.
    fn node_id(&mut self, node_id: Pair<'_, Rule>, scope: &Scope) -> (usize, Option<String>) {
        let mut name = String::new();
        let mut port = None;

        for pair in node_id.into_inner() {
            match pair.as_rule() {
                Rule::ident => name = ident_text(pair),
                Rule::port => {
                    let parts = pair.into_inner().map(ident_text).collect::<Vec<_>>();
                    port = Some(parts.join(":"));
                }
                _ => unreachable!(),
            }
        }

        let node_idx = match self.name_to_node_idx(&name) {
            Some(node_idx) => node_idx,
            None => {
                let node_idx = self.add_node(&name);
                self.get_node_mut(node_idx)
                    .attributes
                    .merge(&scope.node_defaults);
                node_idx
            }
        };

        (node_idx, port)
    }

    /// An edge chain `a -> b -> {c d}`: one edge for every pair of adjacent ends.
    fn edge_stmt(&mut self, edge_stmt: Pair<'_, Rule>, scope: &mut Scope) -> Vec<usize> {
        let mut ends: Vec<(Vec<usize>, Option<String>)> = vec![];
        let mut attributes = scope.edge_defaults.clone();

        for pair in edge_stmt.into_inner() {
            match pair.as_rule() {
                Rule::node_id | Rule::subgraph => ends.push(self.edge_end(pair, scope)),
                Rule::edge_rhs => {
                    for end in pair.into_inner() {
                        match end.as_rule() {
                            Rule::edge_op => (),
                            Rule::node_id | Rule::subgraph => ends.push(self.edge_end(end, scope)),
                            _ => unreachable!(),
                        }
                    }
                }
                Rule::attr_list => attributes.merge(&attr_list(pair)),
                _ => unreachable!(),
            }
        }

        for (tail, head) in ends.iter().zip(ends.iter().skip(1)) {
            for &src_node in &tail.0 {
                for &dst_node in &head.0 {
                    let edge_idx = self.add_edge(src_node, dst_node);
                    let edge = self.get_edge_mut(edge_idx);

                    edge.attributes.merge(&attributes);
                    if let Some(port) = &tail.1 {
                        edge.attributes.set("tailport", port);
                    }
                    if let Some(port) = &head.1 {
                        edge.attributes.set("headport", port);
                    }
                }
            }
        }

        ends.into_iter().flat_map(|(nodes, _)| nodes).collect()
    }

    fn edge_end(&mut self, end: Pair<'_, Rule>, scope: &mut Scope) -> (Vec<usize>, Option<String>) {
        match end.as_rule() {
            Rule::node_id => {
                let (node_idx, port) = self.node_id(end, scope);
                (vec![node_idx], port)
            }
            Rule::subgraph => (self.subgraph(end, scope), None),
            _ => unreachable!(),
        }
    }

    /// A subgraph body gets its own copy of the enclosing defaults.
    fn subgraph(&mut self, subgraph: Pair<'_, Rule>, scope: &Scope) -> Vec<usize> {
        let mut name = None;
        let mut members = vec![];
        let mut subgraph_idx = None;

        for pair in subgraph.into_inner() {
            match pair.as_rule() {
                Rule::subgraph_kw => (),
                Rule::ident => name = Some(ident_text(pair)),
                Rule::stmt_list => {
                    let idx = self.add_subgraph(name.take(), scope.subgraph);
                    let mut inner_scope = Scope {
                        subgraph: Some(idx),
                        ..scope.clone()
                    };

                    members = self.stmt_list(pair, &mut inner_scope);
                    subgraph_idx = Some(idx);
                }
                _ => unreachable!(),
            }
        }
        if let Some(idx) = subgraph_idx {
            self.get_subgraph_mut(idx).nodes = members.clone();
        }

        members
    }
}

impl TryFrom<&str> for Graph {
    type Error = Error;

    fn try_from(str: &str) -> Result<Self> {
        Self::from_dot(str)
    }
}

impl TryFrom<&String> for Graph {
    type Error = Error;

    fn try_from(string: &String) -> Result<Self> {
        Self::from_dot(string)
    }
}

fn parse_failure(err: pest::error::Error<Rule>) -> Error {
    let (line, column) = match err.line_col {
        LineColLocation::Pos(position) => position,
        LineColLocation::Span(start, _) => start,
    };

    Error::GraphParseFailure {
        line,
        column,
        message: err.variant.message().to_string(),
    }
}

/// `[a=b, c=d][e=f]`
fn attr_list(attr_list: Pair<'_, Rule>) -> Attributes {
    let mut attributes = Attributes::new();

    for a_list in attr_list.into_inner() {
        for attr in a_list.into_inner() {
            attributes.merge(&attributes_from_pairs(attr));
        }
    }

    attributes
}

/// An `attr` or `id_assign` pair: two idents.
fn attributes_from_pairs(pair: Pair<'_, Rule>) -> Attributes {
    let mut attributes = Attributes::new();
    let mut idents = pair.into_inner().map(ident_text);

    if let (Some(name), Some(value)) = (idents.next(), idents.next()) {
        attributes.set(&name, &value);
    }

    attributes
}

/// The text of an ident: quotes removed, concatenations joined, line continuations dropped.
fn ident_text(ident: Pair<'_, Rule>) -> String {
    let mut text = String::new();

    for pair in ident.into_inner() {
        match pair.as_rule() {
            Rule::quoted_concat => {
                for quoted in pair.into_inner() {
                    for inner in quoted.into_inner() {
                        text.push_str(&unescape_quoted(inner.as_str()));
                    }
                }
            }
            Rule::html => {
                for inner in pair.into_inner() {
                    text.push_str(inner.as_str());
                }
            }
            Rule::numeral | Rule::plain_id => text.push_str(pair.as_str()),
            _ => unreachable!(),
        }
    }

    text
}

/// Only `\"` and line continuations are handled here.  Label escapes such as `\n` and `\N`
/// are kept for the label code to expand.
fn unescape_quoted(text: &str) -> String {
    text.replace("\\\r\n", "")
        .replace("\\\n", "")
        .replace("\\\"", "\"")
}
