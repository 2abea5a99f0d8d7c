//! TikZ output: nodes become `\node`s and edges become paths between them, so that TikZ
//! styles apply.  Graph and cluster drawings, and everything in duplicate mode, are painted
//! as in PGF output.
//!
//! Colors named in node and edge attributes are declared once, in front of the picture.

use std::collections::HashMap;

use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::graph::{ArrowDirection, Attributes, Edge, Node};
use crate::transform::{fmt_num, Bp, Point};

use super::output::push_line;
use super::pgf::{begin_picture, end_picture, PgfPainter, PACKAGES};
use super::text::format_label;
use super::{is_bezier, label_text, ColorTable, Drawing, Emitter, Frame, Owner};

/// Graphviz node shapes and the TikZ options drawing them.
const SHAPES: [(&str, &str); 18] = [
    ("ellipse", "ellipse"),
    ("oval", "ellipse"),
    ("circle", "circle"),
    ("doublecircle", "circle,double"),
    ("point", "circle,inner sep=0pt,minimum size=3pt,fill"),
    ("box", "rectangle"),
    ("rect", "rectangle"),
    ("rectangle", "rectangle"),
    ("square", "rectangle"),
    ("diamond", "diamond"),
    ("triangle", "regular polygon,regular polygon sides=3"),
    ("invtriangle", "regular polygon,regular polygon sides=3,shape border rotate=180"),
    ("pentagon", "regular polygon,regular polygon sides=5"),
    ("hexagon", "regular polygon,regular polygon sides=6"),
    ("septagon", "regular polygon,regular polygon sides=7"),
    ("octagon", "regular polygon,regular polygon sides=8"),
    ("trapezium", "trapezium"),
    ("star", "star"),
];

/// Shapes drawn without an outline.
const UNDRAWN_SHAPES: [&str; 3] = ["plaintext", "plain", "none"];

#[derive(Debug)]
pub(super) struct TikzEmitter {
    duplicate: bool,
    painter: PgfPainter,
    colors: ColorTable,
    /// Graphviz node name to TikZ node name.
    node_names: HashMap<String, String>,
}

impl TikzEmitter {
    pub(super) fn new(duplicate: bool) -> Self {
        Self {
            duplicate,
            painter: PgfPainter::new(duplicate),
            colors: ColorTable::default(),
            node_names: HashMap::new(),
        }
    }

    fn node_name<'a>(&'a self, node: &'a Node) -> &'a str {
        self.node_names
            .get(node.name())
            .map(String::as_str)
            .unwrap_or_else(|| node.name())
    }

    fn color(&self, token: &str) -> String {
        self.colors.name(first_color(token)).unwrap_or("none").to_string()
    }

    /// Options from the `style` attribute.  Graphviz styles are translated, anything else is
    /// taken as a TikZ option.  Returns false for invisible objects.
    fn style_options(attributes: &Attributes, options: &mut Vec<String>) -> bool {
        let Some(style) = attributes.get("style") else {
            return true;
        };
        for item in split_options(style) {
            match item {
                "invis" | "invisible" => return false,
                "solid" | "filled" => {}
                "bold" => options.push("very thick".to_string()),
                "rounded" => options.push("rounded corners".to_string()),
                other => options.push(other.to_string()),
            }
        }
        true
    }

    fn node(&mut self, node: &Node, drawing: &Drawing<'_>, frame: &Frame<'_>, diagnostics: &mut Diagnostics) -> String {
        let Some(pos) = node.pos() else {
            diagnostics.warn(Error::InvalidOption {
                option: "pos".to_string(),
                message: "node has no position, not drawn".to_string(),
            });
            return String::new();
        };
        let ctx = frame.ctx;
        let attributes = drawing.attributes;
        let mut label = label_text(drawing.owner, attributes, frame.graph, ctx, diagnostics).unwrap_or_default();
        let mut options = vec![];

        if ctx.styleonly {
            options.extend(attributes.get("style").map(str::to_string));
        } else {
            let shape = attributes.get("shape").unwrap_or("ellipse");
            let visible = Self::style_options(attributes, &mut options);
            if !visible {
                options = vec!["draw=none".to_string()];
                label.clear();
            } else if !UNDRAWN_SHAPES.contains(&shape) {
                let tikz_shape = SHAPES
                    .iter()
                    .find(|(name, _)| *name == shape)
                    .map(|(_, tikz)| *tikz)
                    .unwrap_or_else(|| {
                        diagnostics.warn(Error::UnsupportedPrimitive {
                            dialect: "tikz",
                            primitive: "node shape",
                            fallback: format!("{shape} drawn as a rectangle"),
                        });
                        "rectangle"
                    });
                options.insert(0, tikz_shape.to_string());
                options.insert(0, "draw".to_string());
            }
            if visible {
                self.node_colors(attributes, &mut options);
                if !ctx.nominsize {
                    let (width, height) = node.size();
                    options.push(format!(
                        "minimum width={}bp,minimum height={}bp",
                        fmt_num(frame.transform.length(width)),
                        fmt_num(frame.transform.length(height))
                    ));
                }
            }
            push_option(&mut options, &ctx.nodeoptions);
            push_option(&mut options, attributes.get("lblstyle").unwrap_or_default());
            push_option(&mut options, attributes.get("exstyle").unwrap_or_default());
        }

        let mut code = String::new();
        push_line(
            &mut code,
            &format!(
                "\\node ({}) at {} [{}] {{{label}}};",
                self.node_name(node),
                Bp(frame.transform.apply(pos)),
                options.join(",")
            ),
        );
        code
    }

    fn node_colors(&self, attributes: &Attributes, options: &mut Vec<String>) {
        if let Some(color) = attributes.get("color") {
            options.push(format!("draw={}", self.color(color)));
        }
        if let Some(fill) = fill_color(attributes) {
            options.push(format!("fill={}", self.color(fill)));
        }
        if let Some(color) = attributes.get("fontcolor") {
            options.push(format!("text={}", self.color(color)));
        }
    }

    fn edge(
        &mut self,
        edge: &Edge,
        tail: &Node,
        head: &Node,
        drawing: &Drawing<'_>,
        frame: &Frame<'_>,
        diagnostics: &mut Diagnostics,
    ) -> String {
        // Nodes without a position were never declared, so there is nothing to connect.
        if tail.pos().is_none() || head.pos().is_none() {
            diagnostics.warn(Error::InvalidOption {
                option: "pos".to_string(),
                message: "edge end has no position, edge drawn as laid out".to_string(),
            });
            return self.painter.scope(drawing, diagnostics);
        }
        let ctx = frame.ctx;
        let attributes = drawing.attributes;
        let mut options = vec![];

        match edge.direction(frame.graph.is_directed()) {
            ArrowDirection::Forward => options.push("->".to_string()),
            ArrowDirection::Back => options.push("<-".to_string()),
            ArrowDirection::Both => options.push("<->".to_string()),
            ArrowDirection::None => {}
        }
        if ctx.styleonly {
            options.extend(attributes.get("style").map(str::to_string));
        } else {
            if !Self::style_options(attributes, &mut options) {
                return String::new();
            }
            if let Some(color) = attributes.get("color") {
                options.push(format!("draw={}", self.color(color)));
            }
            push_option(&mut options, &ctx.edgeoptions);
            push_option(&mut options, attributes.get("exstyle").unwrap_or_default());
        }

        let label = label_text(drawing.owner, attributes, frame.graph, ctx, diagnostics);
        let lblstyle = attributes.get("lblstyle").unwrap_or_default();
        let path_label = match &label {
            Some(label) if ctx.tikzedgelabels => {
                let mut label_options = vec!["auto".to_string()];
                push_option(&mut label_options, lblstyle);
                format!(" node [{}] {{{label}}}", label_options.join(","))
            }
            _ => String::new(),
        };
        let path = self.edge_path(edge, tail, head, &path_label, frame);

        let mut code = String::new();
        let options = if options.is_empty() {
            String::new()
        } else {
            format!(" [{}]", options.join(","))
        };
        push_line(&mut code, &format!("\\draw{options} {path};"));

        if !ctx.tikzedgelabels {
            if let (Some(label), Some(pos)) = (&label, edge.label_pos()) {
                code.push_str(&label_node(label, pos, lblstyle, frame));
            }
        }
        for (text, pos) in [("headlabel", "head_lp"), ("taillabel", "tail_lp")] {
            let end_label = attributes.get(text).zip(attributes.get(pos).and_then(Point::parse));
            if let Some((text, pos)) = end_label {
                let text = format_label(text, ctx.texmode);
                code.push_str(&label_node(&text, pos, lblstyle, frame));
            }
        }
        code
    }

    /// The path from tail to head: through the layout engine's spline, or straight.
    fn edge_path(&self, edge: &Edge, tail: &Node, head: &Node, label: &str, frame: &Frame<'_>) -> String {
        let tail_name = self.node_name(tail);
        let head_name = self.node_name(head);

        if let Some(topath) = edge.attr("topath") {
            return format!("({tail_name}) to[{topath}]{label} ({head_name})");
        }
        let spline = edge.spline().filter(|spline| is_bezier(&spline.points));
        let points = match spline {
            Some(spline) if !frame.ctx.straightedges => spline.points,
            _ => return format!("({tail_name}) --{label} ({head_name})"),
        };
        let points = points
            .into_iter()
            .map(|point| frame.transform.apply(point))
            .collect::<Vec<_>>();

        let mut path = format!("({tail_name})");
        let segments = points[1..].chunks(3).collect::<Vec<_>>();
        for (idx, segment) in segments.iter().enumerate() {
            if let [c1, c2, end] = segment {
                let end = if idx + 1 == segments.len() {
                    format!("{label} ({head_name})")
                } else {
                    format!(" {}", Bp(*end))
                };
                path.push_str(&format!(" .. controls {} and {} ..{end}", Bp(*c1), Bp(*c2)));
            }
        }
        path
    }
}

/// Fill color of a node with the "filled" style.
fn fill_color(attributes: &Attributes) -> Option<&str> {
    let filled = attributes
        .get("style")
        .is_some_and(|style| split_options(style).any(|item| item == "filled"));
    if !filled {
        return None;
    }

    Some(
        attributes
            .get("fillcolor")
            .or_else(|| attributes.get("color"))
            .unwrap_or("lightgray"),
    )
}

/// Color lists ("red:blue") use their first color.
fn first_color(token: &str) -> &str {
    token.split(':').next().unwrap_or(token)
}

fn label_node(text: &str, pos: Point, style: &str, frame: &Frame<'_>) -> String {
    let options = if style.is_empty() {
        String::new()
    } else {
        format!(" [{style}]")
    };

    format!("\\draw {} node{options} {{{text}}};\n", Bp(frame.transform.apply(pos)))
}

fn push_option(options: &mut Vec<String>, option: &str) {
    if !option.trim().is_empty() {
        options.push(option.trim().to_string());
    }
}

/// Split on the commas that are not within braces or parentheses.
fn split_options(style: &str) -> impl Iterator<Item = &str> {
    let mut depth = 0i32;
    let mut start = 0;
    let mut items = vec![];

    for (idx, c) in style.char_indices() {
        match c {
            '{' | '(' => depth += 1,
            '}' | ')' => depth -= 1,
            ',' if depth == 0 => {
                items.push(&style[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    items.push(&style[start..]);

    items.into_iter().map(str::trim).filter(|item| !item.is_empty())
}

/// A TikZ node name for a graphviz node: characters TikZ gives a meaning to are replaced.
fn tikz_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl Emitter for TikzEmitter {
    fn name(&self) -> &'static str {
        "tikz"
    }

    fn packages(&self) -> &'static str {
        PACKAGES
    }

    fn environment(&self) -> &'static str {
        "tikzpicture"
    }

    fn prepare(&mut self, drawings: &[Drawing<'_>], frame: &Frame<'_>, diagnostics: &mut Diagnostics) {
        for node in frame.graph.nodes_iter() {
            let mut name = tikz_name(node.name());
            while self.node_names.values().any(|taken| *taken == name) {
                name.push('_');
            }
            self.node_names.insert(node.name().to_string(), name);
        }
        if self.duplicate {
            return;
        }
        for drawing in drawings {
            if matches!(drawing.owner, Owner::Node(_) | Owner::Edge { .. }) {
                diagnostics.set_context(Some(drawing.owner.describe(frame.graph)));
                let attributes = drawing.attributes;
                let colors = [attributes.get("color"), fill_color(attributes), attributes.get("fontcolor")];
                for color in colors.into_iter().flatten() {
                    self.colors.collect(first_color(color), diagnostics);
                }
            }
        }
        diagnostics.set_context(None);
    }

    fn declarations(&self) -> String {
        self.colors
            .declarations(|name, r, g, b| format!("\\definecolor{{{name}}}{{rgb}}{{{r},{g},{b}}}"))
    }

    fn begin_figure(&self, frame: &Frame<'_>) -> String {
        begin_picture(frame)
    }

    fn end_figure(&self, _frame: &Frame<'_>) -> String {
        end_picture()
    }

    fn drawing(&mut self, drawing: &Drawing<'_>, frame: &Frame<'_>, diagnostics: &mut Diagnostics) -> String {
        if self.duplicate {
            return self.painter.scope(drawing, diagnostics);
        }
        match drawing.owner {
            Owner::Graph | Owner::Cluster(_) => self.painter.scope(drawing, diagnostics),
            Owner::Node(node) => self.node(node, drawing, frame, diagnostics),
            Owner::Edge { edge, tail, head } => self.edge(edge, tail, head, drawing, frame, diagnostics),
        }
    }
}
