//! Replays drawing operations, tracking the graphics state the layout engine drew with.
//!
//! State changing operations update a single running `GraphicsState`.  Each drawing
//! primitive leaves the replay with its own copy of the state in effect when it was drawn,
//! so later changes can never alter a primitive already produced.

use crate::xdot::{Alignment, ColorRole, DashPattern, DrawOperation, FontFlags};
use crate::transform::Point;

pub const DEFAULT_LINE_WIDTH: f64 = 1.0;
pub const DEFAULT_FONT_FAMILY: &str = "Times-Roman";
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    /// Color tokens are kept as written; emitters resolve them.
    pub pen_color: String,
    /// `None` until a fill color is set.
    pub fill_color: Option<String>,
    pub line_width: f64,
    pub dash: DashPattern,
    pub font_family: String,
    pub font_size: f64,
    pub font_flags: FontFlags,
}

impl Default for GraphicsState {
    fn default() -> Self {
        GraphicsState {
            pen_color: "black".to_string(),
            fill_color: None,
            line_width: DEFAULT_LINE_WIDTH,
            dash: DashPattern::Solid,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            font_flags: FontFlags::default(),
        }
    }
}

impl GraphicsState {
    /// Apply a state changing operation.  Returns false, leaving the state untouched, for
    /// drawing operations.
    pub fn update(&mut self, operation: &DrawOperation) -> bool {
        match operation {
            DrawOperation::SetColor { role, color } => match role {
                ColorRole::Pen => self.pen_color = color.clone(),
                ColorRole::Fill => self.fill_color = Some(color.clone()),
            },
            DrawOperation::SetLineStyle { dash, width } => {
                if let Some(dash) = dash {
                    self.dash = *dash;
                }
                if let Some(width) = width {
                    self.line_width = *width;
                }
            }
            DrawOperation::SetFont { family, size } => {
                self.font_family = family.clone();
                self.font_size = *size;
            }
            DrawOperation::SetFontFlags { flags } => self.font_flags = *flags,
            DrawOperation::Ellipse { .. }
            | DrawOperation::Polygon { .. }
            | DrawOperation::Polyline { .. }
            | DrawOperation::BSpline { .. }
            | DrawOperation::Text { .. }
            | DrawOperation::Image { .. } => return false,
        }
        true
    }

    pub fn is_invisible(&self) -> bool {
        self.dash == DashPattern::Invisible
    }
}

/// What a primitive draws.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Ellipse {
        center: Point,
        radii: (f64, f64),
        filled: bool,
    },
    Polygon {
        points: Vec<Point>,
        filled: bool,
    },
    Polyline {
        points: Vec<Point>,
    },
    BSpline {
        points: Vec<Point>,
        filled: bool,
    },
    Text {
        position: Point,
        alignment: Alignment,
        width: f64,
        text: String,
        rotation: f64,
    },
    Image {
        path: String,
        position: Point,
        size: (f64, f64),
    },
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Ellipse { .. } => "ellipse",
            Shape::Polygon { .. } => "polygon",
            Shape::Polyline { .. } => "polyline",
            Shape::BSpline { .. } => "b-spline",
            Shape::Text { .. } => "text",
            Shape::Image { .. } => "image",
        }
    }

    /// True if the shape paints its interior.
    pub fn is_filled(&self) -> bool {
        match self {
            Shape::Ellipse { filled, .. }
            | Shape::Polygon { filled, .. }
            | Shape::BSpline { filled, .. } => *filled,
            Shape::Polyline { .. } | Shape::Text { .. } | Shape::Image { .. } => false,
        }
    }
}

/// A shape together with the state it was drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub state: GraphicsState,
}

/// Replays operations in order, starting from the default state.
pub fn replay(operations: &[DrawOperation]) -> Vec<Primitive> {
    replay_from(GraphicsState::default(), operations).0
}

/// Replays operations in order, starting from `state`.  Also returns the final state.
pub fn replay_from(
    mut state: GraphicsState,
    operations: &[DrawOperation],
) -> (Vec<Primitive>, GraphicsState) {
    let mut primitives = vec![];

    for operation in operations {
        if state.update(operation) {
            continue;
        }
        let shape = match operation.clone() {
            DrawOperation::Ellipse {
                center,
                radii,
                filled,
            } => Shape::Ellipse {
                center,
                radii,
                filled,
            },
            DrawOperation::Polygon { points, filled } => Shape::Polygon { points, filled },
            DrawOperation::Polyline { points } => Shape::Polyline { points },
            DrawOperation::BSpline { points, filled } => Shape::BSpline { points, filled },
            DrawOperation::Text {
                position,
                alignment,
                width,
                text,
                rotation,
            } => Shape::Text {
                position,
                alignment,
                width,
                text,
                rotation,
            },
            DrawOperation::Image {
                path,
                position,
                size,
            } => Shape::Image {
                path,
                position,
                size,
            },
            DrawOperation::SetColor { .. }
            | DrawOperation::SetLineStyle { .. }
            | DrawOperation::SetFont { .. }
            | DrawOperation::SetFontFlags { .. } => continue,
        };
        primitives.push(Primitive {
            shape,
            state: state.clone(),
        });
    }

    (primitives, state)
}
