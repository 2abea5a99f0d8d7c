//! Converts a laid out graph to LaTeX drawing code.
//!
//! Conversion runs in three steps:
//! 1. every graph object's xdot attributes are parsed and replayed into primitives, which are
//!    then moved into output coordinates (a `Drawing` per object, in draw order),
//! 2. the dialect's emitter sees all drawings once, to collect what it must declare up front,
//! 3. each drawing is emitted, and the fragments are assembled into an `Output`.

pub mod output;
mod pgf;
mod positions;
mod pstricks;
pub mod text;
mod tikz;

use std::collections::HashMap;

pub use self::output::Output;

use crate::color::{self, Rgb};
use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::graph::{Attributes, Edge, Graph, Node, Subgraph};
use crate::options::{Dialect, EmitterContext, TexMode, VAlignMode};
use crate::state::{self, GraphicsState, Primitive, Shape};
use crate::transform::{fmt_num, BoundingBox, CoordTransform, Point};
use crate::xdot::{self, Alignment};

use self::output::push_line;
use self::text::{expand_escapes, format_label, EscapeNames};

/// xdot attributes of graphs, clusters and nodes, in the order they are drawn.
const OBJECT_DRAWINGS: [&str; 2] = ["_draw_", "_ldraw_"];
/// xdot attributes of edges: the path, arrowheads, then labels.
const EDGE_DRAWINGS: [&str; 6] = ["_draw_", "_hdraw_", "_tdraw_", "_ldraw_", "_hldraw_", "_tldraw_"];
/// Line segments used for each cubic Bezier segment by dialects without curves.
const CURVE_STEPS: usize = 8;

/// The graph object a drawing belongs to.
#[derive(Debug, Clone, Copy)]
pub enum Owner<'g> {
    Graph,
    Cluster(&'g Subgraph),
    Node(&'g Node),
    Edge {
        edge: &'g Edge,
        tail: &'g Node,
        head: &'g Node,
    },
}

impl Owner<'_> {
    /// Human readable name, e.g. "Node: a".  Used for comments and warnings.
    pub fn describe(&self, graph: &Graph) -> String {
        match self {
            Owner::Graph => match graph.name() {
                Some(name) => format!("Graph: {name}"),
                None => "Graph".to_string(),
            },
            Owner::Cluster(cluster) => {
                format!("Cluster: {}", cluster.name.as_deref().unwrap_or_default())
            }
            Owner::Node(node) => format!("Node: {}", node.name()),
            Owner::Edge { tail, head, .. } => {
                format!("Edge: {} {} {}", tail.name(), graph.edge_op(), head.name())
            }
        }
    }
}

/// Where a label is anchored.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LabelAnchor {
    /// Centered on the position.
    Center,
    /// The position is on the text baseline.
    Baseline(Alignment),
}

/// A label written once at its object's label position, in place of the text the layout
/// engine drew.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// TeX, ready to be written.
    pub text: String,
    pub position: Point,
    pub anchor: LabelAnchor,
    pub rotation: f64,
    /// State of the first text the layout engine drew for this label.
    pub state: GraphicsState,
}

/// Everything drawn for one graph object, in output coordinates.
#[derive(Debug, Clone)]
pub struct Drawing<'g> {
    pub owner: Owner<'g>,
    pub attributes: &'g Attributes,
    /// Text primitives carry TeX, ready to be written.
    pub primitives: Vec<Primitive>,
    pub label: Option<Label>,
}

/// What emitters know about the whole conversion.
#[derive(Debug, Clone)]
pub struct Frame<'g> {
    pub ctx: &'g EmitterContext,
    pub graph: &'g Graph,
    pub transform: CoordTransform,
    /// Bounding box of the drawing, in output coordinates.
    pub bb: BoundingBox,
}

/// A LaTeX graphics dialect.
///
/// `prepare` sees every drawing before anything is emitted, so that dialects needing
/// declarations in front of the picture can collect them.  Emitters never fail: primitives
/// they can not draw are approximated, with a warning.
pub trait Emitter {
    fn name(&self) -> &'static str;

    /// False when the emitter writes something other than a LaTeX picture.
    fn is_latex(&self) -> bool {
        true
    }

    /// False for dialects without Bezier curves.  Their splines are flattened before
    /// reaching `drawing`.
    fn supports_curves(&self) -> bool {
        true
    }

    /// `\usepackage` lines needed by the drawing commands.
    fn packages(&self) -> &'static str;

    /// The picture environment, for the preview package.
    fn environment(&self) -> &'static str;

    fn prepare(&mut self, _drawings: &[Drawing<'_>], _frame: &Frame<'_>, _diagnostics: &mut Diagnostics) {}

    /// Definitions needed before the picture starts.
    fn declarations(&self) -> String {
        String::new()
    }

    fn begin_figure(&self, frame: &Frame<'_>) -> String;

    fn end_figure(&self, frame: &Frame<'_>) -> String;

    /// Drawing commands for one object.  Empty when there is nothing to draw.
    fn drawing(&mut self, drawing: &Drawing<'_>, frame: &Frame<'_>, diagnostics: &mut Diagnostics) -> String;
}

fn emitter_for(ctx: &EmitterContext) -> Box<dyn Emitter> {
    match ctx.dialect {
        Dialect::Pgf => Box::new(pgf::PgfEmitter::new(ctx.duplicate)),
        Dialect::Tikz => Box::new(tikz::TikzEmitter::new(ctx.duplicate)),
        Dialect::Pstricks => Box::new(pstricks::PstricksEmitter::new(false, ctx.duplicate)),
        Dialect::Psn => Box::new(pstricks::PstricksEmitter::new(true, ctx.duplicate)),
        Dialect::Positions => Box::new(positions::PositionsEmitter),
    }
}

/// Convert a graph, returning the output fragments.
pub fn convert_graph(graph: &Graph, ctx: &EmitterContext, diagnostics: &mut Diagnostics) -> Output {
    let mut emitter = emitter_for(ctx);
    let graph_bb = graph_bounding_box(graph, diagnostics);
    let transform = coord_transform(ctx, graph_bb.as_ref(), diagnostics);

    let mut drawings = collect_drawings(graph, ctx, &transform, diagnostics);
    if !emitter.supports_curves() {
        for drawing in drawings.iter_mut() {
            diagnostics.set_context(Some(drawing.owner.describe(graph)));
            flatten_curves(&mut drawing.primitives, emitter.name(), diagnostics);
        }
        diagnostics.set_context(None);
    }
    let bb = match graph_bb {
        Some(bb) => transform.apply_bb(&bb),
        None => extents(&drawings),
    };
    let frame = Frame {
        ctx,
        graph,
        transform,
        bb,
    };
    log::debug!(
        "converting {} drawings to {}, bounding box {:?}",
        drawings.len(),
        emitter.name(),
        frame.bb
    );

    emitter.prepare(&drawings, &frame, diagnostics);

    let mut output = Output::default();
    if emitter.is_latex() {
        output.doc_preamble = document_preamble(emitter.as_ref(), ctx);
        output.declarations = emitter.declarations();
        output.fig_preamble = emitter.begin_figure(&frame);
        if !ctx.figpreamble.is_empty() {
            push_line(&mut output.fig_preamble, &ctx.figpreamble);
        }
        if !ctx.figpostamble.is_empty() {
            push_line(&mut output.fig_postamble, &ctx.figpostamble);
        }
        output.fig_postamble.push_str(&emitter.end_figure(&frame));
        output.doc_postamble = "% End of code\n\\end{document}\n".to_string();
    }

    for drawing in &drawings {
        let describe = drawing.owner.describe(graph);
        diagnostics.set_context(Some(describe.clone()));
        let code = emitter.drawing(drawing, &frame, diagnostics);
        if code.is_empty() {
            continue;
        }
        if emitter.is_latex() {
            push_line(&mut output.body, &format!("  % {describe}"));
            for line in code.lines() {
                push_line(&mut output.body, &format!("  {line}"));
            }
        } else {
            output.body.push_str(&code);
        }
    }
    diagnostics.set_context(None);

    output
}

fn document_preamble(emitter: &dyn Emitter, ctx: &EmitterContext) -> String {
    let mut preamble = String::new();

    push_line(&mut preamble, "\\documentclass{article}");
    push_line(&mut preamble, "\\usepackage[x11names, svgnames, rgb]{xcolor}");
    push_line(
        &mut preamble,
        &format!("\\usepackage[{}]{{inputenc}}", ctx.encoding.inputenc()),
    );
    preamble.push_str(emitter.packages());
    push_line(&mut preamble, "\\usepackage{amsmath}");
    if ctx.gvcols {
        push_line(&mut preamble, "\\input{gvcols.tex}");
    }
    if !ctx.docpreamble.is_empty() {
        push_line(&mut preamble, &ctx.docpreamble);
    }
    if ctx.crop {
        push_line(&mut preamble, "\\usepackage[active,tightpage]{preview}");
        push_line(
            &mut preamble,
            &format!("\\PreviewEnvironment{{{}}}", emitter.environment()),
        );
        push_line(&mut preamble, &format!("\\setlength\\PreviewBorder{{{}}}", ctx.margin));
    }
    push_line(&mut preamble, "\\begin{document}");
    push_line(&mut preamble, "\\pagestyle{empty}");
    push_line(&mut preamble, "\\enlargethispage{100cm}");
    push_line(&mut preamble, "% Start of code");

    preamble
}

fn graph_bounding_box(graph: &Graph, diagnostics: &mut Diagnostics) -> Option<BoundingBox> {
    let bb = graph.attr("bb")?;
    let parsed = BoundingBox::parse(bb);

    if parsed.is_none() {
        diagnostics.warn(Error::InvalidOption {
            option: format!("bb=\"{bb}\""),
            message: "not a bounding box".to_string(),
        });
    }
    parsed
}

fn coord_transform(
    ctx: &EmitterContext,
    bb: Option<&BoundingBox>,
    diagnostics: &mut Diagnostics,
) -> CoordTransform {
    match (ctx.inverty, bb) {
        (true, Some(bb)) => CoordTransform::flipped(ctx.scale, bb),
        (true, None) => {
            diagnostics.warn(Error::InvalidOption {
                option: "--inverty".to_string(),
                message: "the graph has no bounding box to flip in".to_string(),
            });
            CoordTransform::new(ctx.scale, None)
        }
        (false, _) => CoordTransform::new(ctx.scale, None),
    }
}

/// Build the drawing of every object, in draw order: the graph, clusters, then edges and
/// nodes (nodes first with `switchdraworder`, or for TikZ nodes).
fn collect_drawings<'g>(
    graph: &'g Graph,
    ctx: &EmitterContext,
    transform: &CoordTransform,
    diagnostics: &mut Diagnostics,
) -> Vec<Drawing<'g>> {
    let mut owners = vec![(Owner::Graph, graph.attributes())];

    for cluster in graph.subgraphs_iter().filter(|subgraph| subgraph.is_cluster()) {
        owners.push((Owner::Cluster(cluster), &cluster.attributes));
    }
    let nodes = graph
        .nodes_iter()
        .map(|node| (Owner::Node(node), &node.attributes))
        .collect::<Vec<_>>();
    let edges = graph
        .edges_iter()
        .map(|edge| {
            let owner = Owner::Edge {
                edge,
                tail: graph.get_node(edge.src_node),
                head: graph.get_node(edge.dst_node),
            };
            (owner, &edge.attributes)
        })
        .collect::<Vec<_>>();
    // TikZ edges refer to the nodes by name, so the nodes must come first.
    let tikz_nodes = ctx.dialect == Dialect::Tikz && !ctx.duplicate;
    if ctx.switchdraworder || tikz_nodes {
        owners.extend(nodes);
        owners.extend(edges);
    } else {
        owners.extend(edges);
        owners.extend(nodes);
    }

    owners
        .into_iter()
        .map(|(owner, attributes)| {
            diagnostics.set_context(Some(owner.describe(graph)));
            let drawing = object_drawing(owner, attributes, graph, ctx, transform, diagnostics);
            diagnostics.set_context(None);
            drawing
        })
        .collect()
}

fn object_drawing<'g>(
    owner: Owner<'g>,
    attributes: &'g Attributes,
    graph: &Graph,
    ctx: &EmitterContext,
    transform: &CoordTransform,
    diagnostics: &mut Diagnostics,
) -> Drawing<'g> {
    let keys: &[&str] = match owner {
        Owner::Edge { .. } => &EDGE_DRAWINGS,
        _ => &OBJECT_DRAWINGS,
    };
    let mode = texmode(attributes, graph, ctx, diagnostics);
    let rotation = graph_rotation(graph);
    let mut state = GraphicsState::default();
    let mut primitives = vec![];
    let mut label_texts = vec![];

    for key in keys {
        let Some(drawing) = attributes.get(key) else {
            continue;
        };
        let operations = match xdot::parse(drawing, diagnostics) {
            Ok(operations) => operations,
            Err(err) => {
                diagnostics.warn(err);
                log::info!("skipping {key} of {}", owner.describe(graph));
                continue;
            }
        };
        let (replayed, next) = state::replay_from(state, &operations);
        state = next;

        let straight_edge =
            ctx.straightedges && *key == "_draw_" && matches!(owner, Owner::Edge { .. });

        for mut primitive in replayed {
            match &mut primitive.shape {
                Shape::BSpline { points, .. } if straight_edge => {
                    primitive.shape = straighten(points);
                }
                Shape::Text {
                    rotation: text_rotation,
                    ..
                } => *text_rotation += rotation,
                _ => {}
            }
            if matches!(primitive.shape, Shape::Text { .. }) && *key == "_ldraw_" {
                label_texts.push(primitive);
                continue;
            }
            if let Shape::Text { text, .. } = &mut primitive.shape {
                *text = format_label(text, mode);
            }
            primitives.push(primitive);
        }
    }

    let mut label = None;
    if ctx.duplicate {
        primitives.extend(duplicate_label_texts(label_texts, attributes, mode));
    } else if let Some(first) = label_texts.first() {
        label = label_text(owner, attributes, graph, ctx, diagnostics)
            .and_then(|text| place_label(text, first, owner, attributes, ctx));
    }

    Drawing {
        owner,
        attributes,
        primitives: primitives
            .into_iter()
            .map(|primitive| transform_primitive(primitive, transform))
            .collect(),
        label: label.map(|label| Label {
            position: transform.apply(label.position),
            ..label
        }),
    }
}

/// Text mode for an object: its own `texmode`, the graph's, then the configured one.
fn texmode(
    attributes: &Attributes,
    graph: &Graph,
    ctx: &EmitterContext,
    diagnostics: &mut Diagnostics,
) -> TexMode {
    for value in [attributes.get("texmode"), graph.attr("texmode")].into_iter().flatten() {
        match TexMode::from_name(value) {
            Some(mode) => return mode,
            None => diagnostics.warn(Error::InvalidOption {
                option: format!("texmode={value}"),
                message: "expected verbatim, math or raw".to_string(),
            }),
        }
    }
    ctx.texmode
}

fn graph_rotation(graph: &Graph) -> f64 {
    let landscape = matches!(graph.attr("landscape"), Some("true") | Some("1"));
    let rotate = graph.attr("rotate").and_then(|value| value.trim().parse::<f64>().ok());

    if landscape || rotate == Some(90.0) {
        90.0
    } else {
        0.0
    }
}

fn straighten(points: &[Point]) -> Shape {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => Shape::Polyline {
            points: vec![*first, *last],
        },
        _ => Shape::Polyline { points: vec![] },
    }
}

/// Label texts replayed as drawn by the layout engine.  A `texlbl` replaces the first one.
fn duplicate_label_texts(texts: Vec<Primitive>, attributes: &Attributes, mode: TexMode) -> Vec<Primitive> {
    let texlbl = attributes.get("texlbl");

    texts
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| texlbl.is_none() || *idx == 0)
        .map(|(_, mut primitive)| {
            if let Shape::Text { text, .. } = &mut primitive.shape {
                *text = match texlbl {
                    Some(texlbl) => texlbl.to_string(),
                    None => format_label(text, mode),
                };
            }
            primitive
        })
        .collect()
}

/// The TeX label of an object: `texlbl` as is, or `label` with its escapes expanded.
/// Nodes default to their name.
pub(crate) fn label_text(
    owner: Owner<'_>,
    attributes: &Attributes,
    graph: &Graph,
    ctx: &EmitterContext,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    if let Some(texlbl) = attributes.get("texlbl") {
        return Some(texlbl.to_string());
    }
    let label = match (attributes.get("label"), owner) {
        (Some(label), _) => label,
        (None, Owner::Node(_)) => "\\N",
        (None, _) => return None,
    };
    let mut names = EscapeNames {
        graph: graph.name(),
        edge_op: graph.edge_op(),
        ..EscapeNames::default()
    };
    match owner {
        Owner::Node(node) => names.node = Some(node.name()),
        Owner::Edge { tail, head, .. } => {
            names.tail = Some(tail.name());
            names.head = Some(head.name());
        }
        Owner::Graph | Owner::Cluster(_) => {}
    }
    let text = expand_escapes(label, &names);
    if text.is_empty() {
        return None;
    }

    Some(format_label(&text, texmode(attributes, graph, ctx, diagnostics)))
}

/// Place a label, in layout coordinates.  With `valignmode=dot` the layout engine's own
/// baseline is kept.
fn place_label(
    text: String,
    first: &Primitive,
    owner: Owner<'_>,
    attributes: &Attributes,
    ctx: &EmitterContext,
) -> Option<Label> {
    let Shape::Text {
        position,
        alignment,
        rotation,
        ..
    } = &first.shape
    else {
        return None;
    };
    let center = match owner {
        Owner::Node(node) => node.pos(),
        Owner::Edge { edge, .. } => edge.label_pos(),
        Owner::Graph | Owner::Cluster(_) => attributes.get("lp").and_then(Point::parse),
    };
    let (position, anchor) = match (ctx.valign, center) {
        (VAlignMode::Center, Some(center)) => (center, LabelAnchor::Center),
        _ => (*position, LabelAnchor::Baseline(*alignment)),
    };

    Some(Label {
        text,
        position,
        anchor,
        rotation: *rotation,
        state: first.state.clone(),
    })
}

fn transform_primitive(primitive: Primitive, transform: &CoordTransform) -> Primitive {
    let points = |points: Vec<Point>| {
        points
            .into_iter()
            .map(|point| transform.apply(point))
            .collect::<Vec<_>>()
    };
    let shape = match primitive.shape {
        Shape::Ellipse {
            center,
            radii: (rx, ry),
            filled,
        } => Shape::Ellipse {
            center: transform.apply(center),
            radii: (transform.length(rx), transform.length(ry)),
            filled,
        },
        Shape::Polygon { points: p, filled } => Shape::Polygon {
            points: points(p),
            filled,
        },
        Shape::Polyline { points: p } => Shape::Polyline { points: points(p) },
        Shape::BSpline { points: p, filled } => Shape::BSpline {
            points: points(p),
            filled,
        },
        Shape::Text {
            position,
            alignment,
            width,
            text,
            rotation,
        } => Shape::Text {
            position: transform.apply(position),
            alignment,
            width: transform.length(width),
            text,
            rotation,
        },
        Shape::Image {
            path,
            position,
            size: (width, height),
        } => {
            // Keep the position at the lower left corner, whichever way y points.
            let corner = if transform.is_flipped() {
                Point::new(position.x, position.y + height)
            } else {
                position
            };
            Shape::Image {
                path,
                position: transform.apply(corner),
                size: (transform.length(width), transform.length(height)),
            }
        }
    };

    Primitive {
        shape,
        state: primitive.state,
    }
}

/// True when the points form a chain of cubic Bezier segments.
pub(crate) fn is_bezier(points: &[Point]) -> bool {
    points.len() >= 4 && (points.len() - 1) % 3 == 0
}

/// Approximate a chain of cubic Bezier segments with straight segments.  Other point lists
/// are returned unchanged.
pub(crate) fn flatten_bezier(points: &[Point]) -> Vec<Point> {
    if !is_bezier(points) {
        return points.to_vec();
    }
    let mut flat = vec![points[0]];

    for segment in points.windows(4).step_by(3) {
        let [p0, p1, p2, p3] = [segment[0], segment[1], segment[2], segment[3]];
        for step in 1..=CURVE_STEPS {
            let t = step as f64 / CURVE_STEPS as f64;
            let u = 1.0 - t;
            let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
            flat.push(Point::new(
                a * p0.x + b * p1.x + c * p2.x + d * p3.x,
                a * p0.y + b * p1.y + c * p2.y + d * p3.y,
            ));
        }
    }
    flat
}

/// Replace b-splines with straight segments, for dialects without curves.
fn flatten_curves(primitives: &mut [Primitive], dialect: &'static str, diagnostics: &mut Diagnostics) {
    for primitive in primitives.iter_mut() {
        let Shape::BSpline { points, filled } = &primitive.shape else {
            continue;
        };
        let flat = flatten_bezier(points);
        diagnostics.warn(Error::UnsupportedPrimitive {
            dialect,
            primitive: "b-spline",
            fallback: format!("drawn as {} straight segments", flat.len().saturating_sub(1)),
        });
        primitive.shape = if *filled {
            Shape::Polygon {
                points: flat,
                filled: true,
            }
        } else {
            Shape::Polyline { points: flat }
        };
    }
}

/// Bounding box of everything drawn, for graphs without a `bb` attribute.
fn extents(drawings: &[Drawing<'_>]) -> BoundingBox {
    let mut points = vec![];

    for drawing in drawings {
        for primitive in &drawing.primitives {
            match &primitive.shape {
                Shape::Ellipse {
                    center,
                    radii: (rx, ry),
                    ..
                } => {
                    points.push(Point::new(center.x - rx, center.y - ry));
                    points.push(Point::new(center.x + rx, center.y + ry));
                }
                Shape::Polygon { points: p, .. }
                | Shape::Polyline { points: p }
                | Shape::BSpline { points: p, .. } => points.extend(p.iter().copied()),
                Shape::Text { position, .. } => points.push(*position),
                Shape::Image {
                    position,
                    size: (width, height),
                    ..
                } => {
                    points.push(*position);
                    points.push(Point::new(position.x + width, position.y + height));
                }
            }
        }
        if let Some(label) = &drawing.label {
            points.push(label.position);
        }
    }
    if points.is_empty() {
        return BoundingBox::new(Point::new(0.0, 0.0), Point::new(0.0, 0.0));
    }
    let fold = |select: fn(&Point) -> f64, pick: fn(f64, f64) -> f64| {
        points.iter().map(select).reduce(pick).unwrap_or_default()
    };

    BoundingBox::new(
        Point::new(fold(|p| p.x, f64::min), fold(|p| p.y, f64::min)),
        Point::new(fold(|p| p.x, f64::max), fold(|p| p.y, f64::max)),
    )
}

/// Colors declared in front of the picture, under stable names.
///
/// Palette colors keep their name.  Other colors are named after their rgb value.
#[derive(Debug, Clone, Default)]
pub(crate) struct ColorTable {
    declared: Vec<(String, Rgb)>,
    /// Token to declared name.  `None` for colors that paint nothing.
    tokens: HashMap<String, Option<String>>,
}

impl ColorTable {
    pub(crate) fn collect(&mut self, token: &str, diagnostics: &mut Diagnostics) {
        if self.tokens.contains_key(token) {
            return;
        }
        let color = color::resolve(token, diagnostics);
        let name = color.rgb().map(|rgb| {
            let name = match color.name() {
                Some(name) => name.to_string(),
                None => format!("dotcolor{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b),
            };
            if !self.declared.iter().any(|(declared, _)| *declared == name) {
                self.declared.push((name.clone(), rgb));
            }
            name
        });
        self.tokens.insert(token.to_string(), name);
    }

    /// Collect the colors of every primitive and label.
    pub(crate) fn collect_drawing(&mut self, drawing: &Drawing<'_>, diagnostics: &mut Diagnostics) {
        let states = drawing
            .primitives
            .iter()
            .map(|primitive| &primitive.state)
            .chain(drawing.label.as_ref().map(|label| &label.state));

        for state in states {
            self.collect(&state.pen_color, diagnostics);
            if let Some(fill) = &state.fill_color {
                self.collect(fill, diagnostics);
            }
        }
    }

    /// Declared name of a collected token.  `None` if the color paints nothing.
    pub(crate) fn name(&self, token: &str) -> Option<&str> {
        match self.tokens.get(token) {
            Some(name) => name.as_deref(),
            None => {
                log::debug!("color '{token}' was not collected");
                Some("black")
            }
        }
    }

    pub(crate) fn rgb(&self, name: &str) -> Option<Rgb> {
        self.declared
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, rgb)| *rgb)
    }

    /// One declaration per color, in order of first use.
    pub(crate) fn declarations(&self, declare: impl Fn(&str, &str, &str, &str) -> String) -> String {
        let mut declarations = String::new();

        for (name, rgb) in &self.declared {
            let (r, g, b) = rgb.fractions();
            push_line(&mut declarations, &declare(name, &fmt_num(r), &fmt_num(g), &fmt_num(b)));
        }
        declarations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::xdot::DashPattern;

    fn graph(dot: &str) -> Graph {
        Graph::from_dot(dot).unwrap()
    }

    fn drawings<'g>(graph: &'g Graph, ctx: &EmitterContext, diagnostics: &mut Diagnostics) -> Vec<Drawing<'g>> {
        collect_drawings(graph, ctx, &CoordTransform::new(ctx.scale, None), diagnostics)
    }

    const TWO_NODES: &str = r#"digraph G {
        graph [bb="0,0,54,108"];
        a [pos="27,90", _draw_="c 7 -#000000 e 27 90 27 18 ", _ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 27 85.8 0 7 1 -a "];
        b [pos="27,18", _draw_="c 7 -#000000 e 27 18 27 18 ", _ldraw_="F 14 11 -Times-Roman c 7 -#000000 T 27 13.8 0 7 1 -b "];
        a -> b [pos="e,27,36.104 27,71.697 27,63.983 27,54.712 27,46.104", _draw_="c 7 -#000000 B 4 27 71.697 27 63.983 27 54.712 27 46.104 ", _hdraw_="S 5 -solid c 7 -#000000 C 7 -#000000 P 3 30.5 46.104 27 36.104 23.5 46.104 "];
    }"#;

    #[test]
    fn test_draw_order() {
        let graph = graph(TWO_NODES);
        let mut diagnostics = Diagnostics::new();
        let ctx = EmitterContext::default();

        let names = drawings(&graph, &ctx, &mut diagnostics)
            .iter()
            .map(|drawing| drawing.owner.describe(&graph))
            .collect::<Vec<_>>();
        assert_eq!(names, ["Graph: G", "Edge: a -> b", "Node: a", "Node: b"]);

        let ctx = EmitterContext {
            switchdraworder: true,
            ..EmitterContext::default()
        };
        let names = drawings(&graph, &ctx, &mut diagnostics)
            .iter()
            .map(|drawing| drawing.owner.describe(&graph))
            .collect::<Vec<_>>();
        assert_eq!(names, ["Graph: G", "Node: a", "Node: b", "Edge: a -> b"]);
    }

    #[test]
    fn test_label_replaces_text() {
        let graph = graph(TWO_NODES);
        let mut diagnostics = Diagnostics::new();
        let drawings = drawings(&graph, &EmitterContext::default(), &mut diagnostics);
        let node_a = &drawings[2];

        assert_eq!(node_a.primitives.len(), 1);
        let label = node_a.label.as_ref().unwrap();
        assert_eq!(label.text, "a");
        assert_eq!(label.position, Point::new(27.0, 90.0));
        assert_eq!(label.anchor, LabelAnchor::Center);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_duplicate_keeps_text() {
        let graph = graph(TWO_NODES);
        let mut diagnostics = Diagnostics::new();
        let ctx = EmitterContext {
            duplicate: true,
            ..EmitterContext::default()
        };
        let drawings = drawings(&graph, &ctx, &mut diagnostics);
        let node_a = &drawings[2];

        assert!(node_a.label.is_none());
        assert_eq!(node_a.primitives.len(), 2);
        assert!(matches!(&node_a.primitives[1].shape, Shape::Text { text, .. } if text == "a"));
        assert_eq!(node_a.primitives[1].state.font_size, 14.0);
    }

    #[test]
    fn test_valign_dot_keeps_baseline() {
        let graph = graph(TWO_NODES);
        let mut diagnostics = Diagnostics::new();
        let ctx = EmitterContext {
            valign: VAlignMode::Dot,
            ..EmitterContext::default()
        };
        let drawings = drawings(&graph, &ctx, &mut diagnostics);
        let label = drawings[2].label.as_ref().unwrap();

        assert_eq!(label.position, Point::new(27.0, 85.8));
        assert_eq!(label.anchor, LabelAnchor::Baseline(Alignment::Center));
    }

    #[test]
    fn test_straightedges() {
        let graph = graph(TWO_NODES);
        let mut diagnostics = Diagnostics::new();
        let ctx = EmitterContext {
            straightedges: true,
            ..EmitterContext::default()
        };
        let drawings = drawings(&graph, &ctx, &mut diagnostics);

        assert_eq!(
            drawings[1].primitives[0].shape,
            Shape::Polyline {
                points: vec![Point::new(27.0, 71.697), Point::new(27.0, 46.104)]
            }
        );
        // Arrowheads are kept.
        assert!(matches!(drawings[1].primitives[1].shape, Shape::Polygon { filled: true, .. }));
    }

    #[test]
    fn test_malformed_string_skips_only_that_string() {
        let graph = graph(
            r#"digraph { a [pos="27,90", label="x", _draw_="e 27 90 27", _ldraw_="T 27 85 0 7 1 -x "]; }"#,
        );
        let mut diagnostics = Diagnostics::new();
        let drawings = drawings(&graph, &EmitterContext::default(), &mut diagnostics);

        assert!(drawings[1].primitives.is_empty());
        assert_eq!(drawings[1].label.as_ref().unwrap().text, "x");
        assert_eq!(diagnostics.count_kind("MalformedDrawingString"), 1);
        assert_eq!(
            diagnostics.entries()[0].context.as_deref(),
            Some("Node: a")
        );
    }

    #[test]
    fn test_label_text() {
        let graph = graph(
            r#"digraph G { a [label="\N_1"]; b [texlbl="$\beta$"]; c [label="c_1", texmode="math"]; a -> b [label="\E"]; }"#,
        );
        let ctx = EmitterContext::default();
        let mut diagnostics = Diagnostics::new();
        let node = |name: &str| graph.get_node(graph.name_to_node_idx(name).unwrap());
        let mut text = |owner: Owner<'_>, attributes: &Attributes| {
            label_text(owner, attributes, &graph, &ctx, &mut diagnostics)
        };

        assert_eq!(text(Owner::Node(node("a")), &node("a").attributes).as_deref(), Some("a\\_1"));
        assert_eq!(text(Owner::Node(node("b")), &node("b").attributes).as_deref(), Some("$\\beta$"));
        assert_eq!(text(Owner::Node(node("c")), &node("c").attributes).as_deref(), Some("$c_1$"));
        let edge = graph.get_edge(0);
        let owner = Owner::Edge {
            edge,
            tail: node("a"),
            head: node("b"),
        };
        assert_eq!(text(owner, &edge.attributes).as_deref(), Some("a-$>$b"));
        assert_eq!(text(Owner::Graph, graph.attributes()), None);
    }

    #[test]
    fn test_scale_and_flip() {
        let graph = graph(TWO_NODES);
        let options = Options {
            scale: Some(2.0),
            inverty: true,
            ..Options::default()
        };
        let mut diagnostics = Diagnostics::new();
        let ctx = EmitterContext::resolve(&options, &graph, &mut diagnostics);
        let bb = graph_bounding_box(&graph, &mut diagnostics).unwrap();
        let transform = coord_transform(&ctx, Some(&bb), &mut diagnostics);
        let drawings = collect_drawings(&graph, &ctx, &transform, &mut diagnostics);

        assert_eq!(
            drawings[2].primitives[0].shape,
            Shape::Ellipse {
                center: Point::new(54.0, 36.0),
                radii: (54.0, 36.0),
                filled: false,
            }
        );
        assert_eq!(drawings[2].primitives[0].state.dash, DashPattern::Solid);
    }

    #[test]
    fn test_flatten_bezier() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
        ];
        let flat = flatten_bezier(&points);

        assert_eq!(flat.len(), CURVE_STEPS + 1);
        assert_eq!(flat[0], points[0]);
        assert_eq!(flat[CURVE_STEPS], points[3]);
        assert_eq!(flatten_bezier(&points[..2]), points[..2].to_vec());
    }

    #[test]
    fn test_color_table() {
        let mut diagnostics = Diagnostics::new();
        let mut colors = ColorTable::default();

        for token in ["red", "#ff0000", "#123456", "none", "no-such-color"] {
            colors.collect(token, &mut diagnostics);
        }
        assert_eq!(colors.name("#ff0000"), Some("red"));
        assert_eq!(colors.name("#123456"), Some("dotcolor123456"));
        assert_eq!(colors.name("none"), None);
        assert_eq!(colors.name("no-such-color"), Some("black"));
        assert_eq!(diagnostics.count_kind("UnresolvedColor"), 1);
        assert_eq!(
            colors.declarations(|name, r, g, b| format!("{name}={r},{g},{b}")),
            "red=1,0,0\ndotcolor123456=0.0706,0.2039,0.3373\nblack=0,0,0\n"
        );
    }
}
