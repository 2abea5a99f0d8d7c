//! PSTricks output, in two flavors.
//!
//! `pstricks` declares every color used with `\newrgbcolor` in front of the picture, which
//! takes a pass over the whole graph before anything is written.
//!
//! `psn` refers to colors by their native names, defining the others inline as `curcolor`
//! and `curfillcolor`.  It only uses straight line primitives: splines reach it flattened.

use crate::color::{self, Rgb};
use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::state::{GraphicsState, Primitive, Shape};
use crate::transform::{fmt_num, Bp, Point};
use crate::xdot::{Alignment, DashPattern};

use super::output::push_line;
use super::text::styled_text;
use super::{is_bezier, ColorTable, Drawing, Emitter, Frame, Label, LabelAnchor};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Role {
    Line,
    Fill,
}

impl Role {
    fn key(&self) -> &'static str {
        match self {
            Role::Line => "linecolor",
            Role::Fill => "fillcolor",
        }
    }

    fn inline_name(&self) -> &'static str {
        match self {
            Role::Line => "curcolor",
            Role::Fill => "curfillcolor",
        }
    }
}

#[derive(Debug)]
pub(super) struct PstricksEmitter {
    native: bool,
    duplicate: bool,
    colors: ColorTable,
    /// Color tokens and line style last set with `\psset`.  `\psset` is not scoped, so this
    /// carries over from one object to the next.
    pen: Option<String>,
    /// Name for the current pen, `None` when it paints nothing.
    pen_name: Option<String>,
    pen_black: bool,
    fill: Option<String>,
    fill_visible: bool,
    line_width: Option<f64>,
    dash: Option<DashPattern>,
}

impl PstricksEmitter {
    pub(super) fn new(native: bool, duplicate: bool) -> Self {
        Self {
            native,
            duplicate,
            colors: ColorTable::default(),
            pen: None,
            pen_name: None,
            pen_black: true,
            fill: None,
            fill_visible: false,
            line_width: None,
            dash: None,
        }
    }

    /// Name to use for a color, defining it inline when the native flavor has no name for
    /// it.  `None` if the color paints nothing.
    fn color_name(
        &mut self,
        token: &str,
        role: Role,
        code: &mut String,
        diagnostics: &mut Diagnostics,
    ) -> (Option<String>, bool) {
        if !self.native {
            let name = self.colors.name(token).map(str::to_string);
            let black = name
                .as_deref()
                .and_then(|name| self.colors.rgb(name))
                .map_or(true, |rgb| rgb == Rgb::BLACK);
            return (name, black);
        }
        let color = color::resolve(token, diagnostics);
        let Some(rgb) = color.rgb() else {
            return (None, false);
        };
        let name = match color.name() {
            Some(name) => name.to_string(),
            None => {
                let (r, g, b) = rgb.fractions();
                push_line(
                    code,
                    &format!(
                        "\\newrgbcolor{{{}}}{{{} {} {}}}",
                        role.inline_name(),
                        fmt_num(r),
                        fmt_num(g),
                        fmt_num(b)
                    ),
                );
                role.inline_name().to_string()
            }
        };
        (Some(name), rgb == Rgb::BLACK)
    }

    fn set_pen(&mut self, state: &GraphicsState, code: &mut String, diagnostics: &mut Diagnostics) {
        if self.pen.as_deref() == Some(state.pen_color.as_str()) {
            return;
        }
        self.pen = Some(state.pen_color.clone());
        let (name, black) = self.color_name(&state.pen_color, Role::Line, code, diagnostics);

        if let Some(name) = &name {
            push_line(code, &format!("\\psset{{{}={name}}}", Role::Line.key()));
        }
        self.pen_name = name;
        self.pen_black = black;
    }

    fn set_fill(&mut self, state: &GraphicsState, code: &mut String, diagnostics: &mut Diagnostics) {
        let token = state.fill_color.as_ref().unwrap_or(&state.pen_color);
        if self.fill.as_ref() == Some(token) {
            return;
        }
        self.fill = Some(token.clone());
        let (name, _) = self.color_name(token, Role::Fill, code, diagnostics);

        self.fill_visible = name.is_some();
        if let Some(name) = name {
            push_line(code, &format!("\\psset{{{}={name}}}", Role::Fill.key()));
        }
    }

    fn set_line_style(&mut self, state: &GraphicsState, code: &mut String) {
        if self.line_width != Some(state.line_width) {
            self.line_width = Some(state.line_width);
            push_line(code, &format!("\\psset{{linewidth={}bp}}", fmt_num(state.line_width)));
        }
        if self.dash != Some(state.dash) {
            self.dash = Some(state.dash);
            let style = match state.dash {
                DashPattern::Solid => "solid",
                DashPattern::Dashed => "dashed",
                DashPattern::Dotted => "dotted",
                DashPattern::Invisible => "none",
            };
            push_line(code, &format!("\\psset{{linestyle={style}}}"));
        }
    }

    /// Set up the state for a shape and return its options, e.g. "[fillstyle=solid]".
    /// `None` when the shape paints nothing.
    fn shape_options(
        &mut self,
        state: &GraphicsState,
        filled: bool,
        code: &mut String,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        self.set_pen(state, code, diagnostics);
        if filled {
            self.set_fill(state, code, diagnostics);
        }
        self.set_line_style(state, code);

        let fill = filled && self.fill_visible;
        let stroke = self.pen_name.is_some();
        let mut options = vec![];
        if fill {
            options.push("fillstyle=solid");
        }
        if !stroke {
            options.push("linestyle=none");
        }

        if !fill && !stroke {
            None
        } else if options.is_empty() {
            Some(String::new())
        } else {
            Some(format!("[{}]", options.join(",")))
        }
    }

    fn primitive(&mut self, primitive: &Primitive, diagnostics: &mut Diagnostics) -> String {
        let state = &primitive.state;
        let mut code = String::new();

        if state.is_invisible() {
            return code;
        }
        match &primitive.shape {
            Shape::Ellipse {
                center,
                radii: (rx, ry),
                filled,
            } => {
                if let Some(options) = self.shape_options(state, *filled, &mut code, diagnostics) {
                    let radii = Bp(Point::new(*rx, *ry));
                    push_line(&mut code, &format!("\\psellipse{options}{}{radii}", Bp(*center)));
                }
            }
            Shape::Polygon { points, filled } => {
                if let Some(options) = self.shape_options(state, *filled, &mut code, diagnostics) {
                    push_line(&mut code, &format!("\\pspolygon{options}{}", point_list(points)));
                }
            }
            Shape::Polyline { points } => {
                if let Some(options) = self.shape_options(state, false, &mut code, diagnostics) {
                    push_line(&mut code, &format!("\\psline{options}{}", point_list(points)));
                }
            }
            Shape::BSpline { points, filled } => {
                let command = if is_bezier(points) {
                    "\\psbezier"
                } else {
                    diagnostics.warn(Error::UnsupportedPrimitive {
                        dialect: self.name(),
                        primitive: "b-spline",
                        fallback: format!(
                            "{} control points are not a Bezier chain, drawn as straight segments",
                            points.len()
                        ),
                    });
                    if *filled {
                        "\\pspolygon"
                    } else {
                        "\\psline"
                    }
                };
                if let Some(options) = self.shape_options(state, *filled, &mut code, diagnostics) {
                    push_line(&mut code, &format!("{command}{options}{}", point_list(points)));
                }
            }
            Shape::Text {
                position,
                alignment,
                text,
                rotation,
                ..
            } => {
                let text = if self.duplicate {
                    styled_text(text, state)
                } else {
                    text.clone()
                };
                self.set_pen(state, &mut code, diagnostics);
                let text = self.colored(&text);
                let anchor = LabelAnchor::Baseline(*alignment);
                push_line(&mut code, &rput(anchor, *rotation, *position, &text));
            }
            Shape::Image {
                path,
                position,
                size: (width, height),
            } => {
                let center = Point::new(position.x + width / 2.0, position.y + height / 2.0);
                let image = format!(
                    "\\includegraphics[width={}bp,height={}bp]{{{path}}}",
                    fmt_num(*width),
                    fmt_num(*height)
                );
                push_line(&mut code, &rput(LabelAnchor::Center, 0.0, center, &image));
            }
        }

        code
    }

    fn label(&mut self, label: &Label, diagnostics: &mut Diagnostics) -> String {
        let mut code = String::new();

        self.set_pen(&label.state, &mut code, diagnostics);
        let text = self.colored(&label.text);
        push_line(&mut code, &rput(label.anchor, label.rotation, label.position, &text));
        code
    }

    /// Text in the current pen color.
    fn colored(&self, text: &str) -> String {
        match &self.pen_name {
            Some(name) if !self.pen_black => format!("\\textcolor{{{name}}}{{{text}}}"),
            _ => text.to_string(),
        }
    }
}

/// "(p1)(p2)..."
fn point_list(points: &[Point]) -> String {
    points.iter().map(|point| Bp(*point).to_string()).collect()
}

fn rput(anchor: LabelAnchor, rotation: f64, position: Point, text: &str) -> String {
    let reference = match anchor {
        LabelAnchor::Center => "",
        LabelAnchor::Baseline(Alignment::Left) => "[Bl]",
        LabelAnchor::Baseline(Alignment::Center) => "[B]",
        LabelAnchor::Baseline(Alignment::Right) => "[Br]",
    };
    let rotation = if rotation != 0.0 {
        format!("{{{}}}", fmt_num(rotation))
    } else {
        String::new()
    };

    format!("\\rput{reference}{rotation}{}{{{text}}}", Bp(position))
}

impl Emitter for PstricksEmitter {
    fn name(&self) -> &'static str {
        if self.native {
            "psn"
        } else {
            "pstricks"
        }
    }

    fn supports_curves(&self) -> bool {
        !self.native
    }

    fn packages(&self) -> &'static str {
        "\\usepackage{pstricks}\n"
    }

    fn environment(&self) -> &'static str {
        "pspicture"
    }

    fn prepare(&mut self, drawings: &[Drawing<'_>], frame: &Frame<'_>, diagnostics: &mut Diagnostics) {
        if self.native {
            return;
        }
        for drawing in drawings {
            diagnostics.set_context(Some(drawing.owner.describe(frame.graph)));
            self.colors.collect_drawing(drawing, diagnostics);
        }
        diagnostics.set_context(None);
    }

    fn declarations(&self) -> String {
        self.colors
            .declarations(|name, r, g, b| format!("\\newrgbcolor{{{name}}}{{{r} {g} {b}}}"))
    }

    fn begin_figure(&self, frame: &Frame<'_>) -> String {
        let mut style = "linewidth=1bp".to_string();
        if !frame.ctx.graphstyle.is_empty() {
            style.push(',');
            style.push_str(&frame.ctx.graphstyle);
        }

        format!(
            "\\begin{{pspicture}}[{style}]{}{}\n  \\pstVerb{{2 setlinejoin}} % set line join style to 'mitre'\n",
            Bp(frame.bb.lower_left),
            Bp(frame.bb.upper_right)
        )
    }

    fn end_figure(&self, _frame: &Frame<'_>) -> String {
        "\\end{pspicture}\n".to_string()
    }

    fn drawing(&mut self, drawing: &Drawing<'_>, _frame: &Frame<'_>, diagnostics: &mut Diagnostics) -> String {
        let mut code = String::new();

        for primitive in &drawing.primitives {
            code.push_str(&self.primitive(primitive, diagnostics));
        }
        if let Some(label) = &drawing.label {
            code.push_str(&self.label(label, diagnostics));
        }
        code
    }
}
