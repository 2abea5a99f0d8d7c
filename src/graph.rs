//! An attributed graph, as described by a dot file.
//!
//! Nodes, edges and subgraphs are kept in document order: that is the order the layout
//! engine drew them in, and the order they are converted in.

mod attributes;
pub mod dot_parser;
mod edge;
mod node;

use std::{collections::HashMap, fmt::Display};

pub use self::{
    attributes::Attributes,
    edge::{ArrowDirection, Edge, EdgeSpline},
    node::{Node, POINTS_PER_INCH},
};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GraphKind {
    Directed,
    Undirected,
}

/// A `subgraph` block.  Clusters are subgraphs whose name starts with "cluster".
#[derive(Debug, Clone, PartialEq)]
pub struct Subgraph {
    pub name: Option<String>,
    pub attributes: Attributes,
    /// Enclosing subgraph, if this one is nested.
    pub parent: Option<usize>,
    /// Indexes of the nodes that appear within the block.
    pub nodes: Vec<usize>,
}

impl Subgraph {
    pub fn is_cluster(&self) -> bool {
        self.name
            .as_deref()
            .map(|name| name.starts_with("cluster"))
            .unwrap_or(false)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    name: Option<String>,
    kind: GraphKind,
    strict: bool,
    attributes: Attributes,
    /// All nodes in the graph.
    nodes: Vec<Node>,
    /// All edges in the graph.  Edges refer to nodes by index.
    edges: Vec<Edge>,
    subgraphs: Vec<Subgraph>,
    node_index: HashMap<String, usize>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(GraphKind::Directed)
    }
}

impl Graph {
    pub fn new(kind: GraphKind) -> Self {
        Graph {
            name: None,
            kind,
            strict: false,
            attributes: Attributes::new(),
            nodes: vec![],
            edges: vec![],
            subgraphs: vec![],
            node_index: HashMap::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn is_directed(&self) -> bool {
        self.kind == GraphKind::Directed
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Return a graph level attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// Return the node indexed by node_idx.
    pub fn get_node(&self, node_idx: usize) -> &Node {
        &self.nodes[node_idx]
    }

    /// Return a mutable node indexed by node_idx.
    pub fn get_node_mut(&mut self, node_idx: usize) -> &mut Node {
        &mut self.nodes[node_idx]
    }

    /// Return the edge indexed by edge_idx.
    pub fn get_edge(&self, edge_idx: usize) -> &Edge {
        &self.edges[edge_idx]
    }

    pub fn get_edge_mut(&mut self, edge_idx: usize) -> &mut Edge {
        &mut self.edges[edge_idx]
    }

    pub fn name_to_node_idx(&self, name: &str) -> Option<usize> {
        self.node_index.get(name).copied()
    }

    /// Add a node identified by name, and return the node's index in the graph.
    ///
    /// Node names are unique: adding an existing name returns the existing node.
    pub fn add_node(&mut self, name: &str) -> usize {
        if let Some(node_idx) = self.name_to_node_idx(name) {
            return node_idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(Node::new(name));
        self.node_index.insert(name.to_string(), idx);

        idx
    }

    /// Add a new edge between two existing nodes, and return the edge's index in the graph.
    ///
    /// In a strict graph, a repeated edge merges its attributes into the existing one.
    pub fn add_edge(&mut self, src_node: usize, dst_node: usize) -> usize {
        assert!(src_node < self.nodes.len(), "edge from unknown node {src_node}");
        assert!(dst_node < self.nodes.len(), "edge to unknown node {dst_node}");

        if self.strict {
            if let Some(idx) = self.find_edge(src_node, dst_node) {
                return idx;
            }
        }
        let idx = self.edges.len();
        self.edges.push(Edge::new(src_node, dst_node));

        idx
    }

    fn find_edge(&self, src_node: usize, dst_node: usize) -> Option<usize> {
        self.edges.iter().position(|edge| {
            (edge.src_node == src_node && edge.dst_node == dst_node)
                || (!self.is_directed() && edge.src_node == dst_node && edge.dst_node == src_node)
        })
    }

    pub fn add_subgraph(&mut self, name: Option<String>, parent: Option<usize>) -> usize {
        let idx = self.subgraphs.len();
        self.subgraphs.push(Subgraph {
            name,
            attributes: Attributes::new(),
            parent,
            nodes: vec![],
        });

        idx
    }

    pub fn get_subgraph(&self, subgraph_idx: usize) -> &Subgraph {
        &self.subgraphs[subgraph_idx]
    }

    pub fn get_subgraph_mut(&mut self, subgraph_idx: usize) -> &mut Subgraph {
        &mut self.subgraphs[subgraph_idx]
    }

    pub fn nodes_iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edges_iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn subgraphs_iter(&self) -> impl Iterator<Item = &Subgraph> {
        self.subgraphs.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The operator joining edge ends in dot: "->" or "--".
    pub fn edge_op(&self) -> &'static str {
        match self.kind {
            GraphKind::Directed => "->",
            GraphKind::Undirected => "--",
        }
    }

    /// Human readable edge name, e.g. "a -> b".
    pub fn display_edge(&self, edge_idx: usize) -> String {
        let edge = self.get_edge(edge_idx);
        let src = self.get_node(edge.src_node).name();
        let dst = self.get_node(edge.dst_node).name();

        format!("{src} {} {dst}", self.edge_op())
    }

    /// True if the layout engine already drew this graph (any xdot attribute present).
    pub fn has_drawing(&self) -> bool {
        let drawn = |attributes: &Attributes| attributes.get("_draw_").is_some();

        drawn(&self.attributes)
            || self.nodes.iter().any(|node| drawn(&node.attributes))
            || self.edges.iter().any(|edge| drawn(&edge.attributes))
    }
}

impl Display for Graph {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        for node in &self.nodes {
            writeln!(fmt, "{node}")?;
        }
        for edge_idx in 0..self.edges.len() {
            writeln!(fmt, "{}", self.display_edge(edge_idx))?;
        }
        Ok(())
    }
}
