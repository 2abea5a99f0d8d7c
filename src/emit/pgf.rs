//! PGF output: every primitive is replayed as a TikZ path within a scope per object.

use crate::color::{self, Rgb};
use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::state::{GraphicsState, Primitive, Shape};
use crate::transform::{fmt_num, Bp, Point};
use crate::xdot::{Alignment, DashPattern};

use super::output::push_line;
use super::text::styled_text;
use super::{is_bezier, Drawing, Emitter, Frame, Label, LabelAnchor};

pub(super) const PACKAGES: &str = "\\usepackage{tikz}\n\\usetikzlibrary{arrows,shapes}\n";

/// Writes primitives as TikZ paths.  Colors are defined inline, as `strokecol` and
/// `fillcol`, whenever they change.
#[derive(Debug, Default)]
pub(super) struct PgfPainter {
    /// Write texts with the font size of the layout engine.
    duplicate: bool,
    pen: Option<String>,
    /// `None` when the pen paints nothing.
    pen_rgb: Option<Rgb>,
    fill: Option<String>,
    fill_visible: bool,
    line_width: Option<f64>,
    dash: Option<DashPattern>,
}

impl PgfPainter {
    pub(super) fn new(duplicate: bool) -> Self {
        Self {
            duplicate,
            ..Self::default()
        }
    }

    /// Forget the state set so far, as at the start of a scope.
    pub(super) fn reset(&mut self) {
        *self = Self::new(self.duplicate);
    }

    /// Write the primitives and label of a drawing in a scope of its own.
    pub(super) fn scope(&mut self, drawing: &Drawing<'_>, diagnostics: &mut Diagnostics) -> String {
        self.reset();
        let mut code = String::new();

        for primitive in &drawing.primitives {
            code.push_str(&self.primitive(primitive, diagnostics));
        }
        if let Some(label) = &drawing.label {
            code.push_str(&self.label(label, "", diagnostics));
        }
        if code.is_empty() {
            return code;
        }

        format!("\\begin{{scope}}\n{code}\\end{{scope}}\n")
    }

    fn set_pen(&mut self, state: &GraphicsState, code: &mut String, diagnostics: &mut Diagnostics) {
        if self.pen.as_deref() == Some(state.pen_color.as_str()) {
            return;
        }
        self.pen = Some(state.pen_color.clone());
        self.pen_rgb = color::resolve(&state.pen_color, diagnostics).rgb();

        if let Some(rgb) = self.pen_rgb {
            push_line(code, &define_color("strokecol", rgb));
            push_line(code, "\\pgfsetstrokecolor{strokecol}");
        }
    }

    fn set_fill(&mut self, state: &GraphicsState, code: &mut String, diagnostics: &mut Diagnostics) {
        // Filled shapes without a fill color use the pen color.
        let token = state.fill_color.as_ref().unwrap_or(&state.pen_color);
        if self.fill.as_ref() == Some(token) {
            return;
        }
        self.fill = Some(token.clone());
        let rgb = color::resolve(token, diagnostics).rgb();
        self.fill_visible = rgb.is_some();

        if let Some(rgb) = rgb {
            push_line(code, &define_color("fillcol", rgb));
            push_line(code, "\\pgfsetfillcolor{fillcol}");
        }
    }

    fn set_line_style(&mut self, state: &GraphicsState, code: &mut String) {
        if self.line_width != Some(state.line_width) {
            self.line_width = Some(state.line_width);
            push_line(code, &format!("\\pgfsetlinewidth{{{}bp}}", fmt_num(state.line_width)));
        }
        if self.dash != Some(state.dash) {
            self.dash = Some(state.dash);
            match state.dash {
                DashPattern::Solid => push_line(code, "\\pgfsetdash{}{0pt}"),
                DashPattern::Dashed => push_line(code, "\\pgfsetdash{{3pt}{3pt}}{0pt}"),
                DashPattern::Dotted => push_line(code, "\\pgfsetdash{{\\pgflinewidth}{2pt}}{0pt}"),
                DashPattern::Invisible => {}
            }
        }
    }

    /// Set up the state for a path, and return its command.  `None` when it paints nothing.
    fn path_command(
        &mut self,
        state: &GraphicsState,
        filled: bool,
        code: &mut String,
        diagnostics: &mut Diagnostics,
    ) -> Option<&'static str> {
        self.set_pen(state, code, diagnostics);
        if filled {
            self.set_fill(state, code, diagnostics);
        }
        self.set_line_style(state, code);

        match (self.pen_rgb.is_some(), filled && self.fill_visible) {
            (true, true) => Some("\\filldraw"),
            (true, false) => Some("\\draw"),
            (false, true) => Some("\\fill"),
            (false, false) => None,
        }
    }

    pub(super) fn primitive(&mut self, primitive: &Primitive, diagnostics: &mut Diagnostics) -> String {
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
                if let Some(command) = self.path_command(state, *filled, &mut code, diagnostics) {
                    push_line(
                        &mut code,
                        &format!(
                            "{command} {} ellipse ({}bp and {}bp);",
                            Bp(*center),
                            fmt_num(*rx),
                            fmt_num(*ry)
                        ),
                    );
                }
            }
            Shape::Polygon { points, filled } => {
                if let Some(command) = self.path_command(state, *filled, &mut code, diagnostics) {
                    push_line(&mut code, &format!("{command} {} -- cycle;", straight_path(points)));
                }
            }
            Shape::Polyline { points } => {
                if let Some(command) = self.path_command(state, false, &mut code, diagnostics) {
                    push_line(&mut code, &format!("{command} {};", straight_path(points)));
                }
            }
            Shape::BSpline { points, filled } => {
                let path = if is_bezier(points) {
                    curve_path(points)
                } else {
                    diagnostics.warn(Error::UnsupportedPrimitive {
                        dialect: "pgf",
                        primitive: "b-spline",
                        fallback: format!(
                            "{} control points are not a Bezier chain, drawn as straight segments",
                            points.len()
                        ),
                    });
                    straight_path(points)
                };
                let cycle = if *filled { " -- cycle" } else { "" };
                if let Some(command) = self.path_command(state, *filled, &mut code, diagnostics) {
                    push_line(&mut code, &format!("{command} {path}{cycle};"));
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
                let options = self.text_options(LabelAnchor::Baseline(*alignment), *rotation, "");
                push_line(&mut code, &format!("\\draw {} node{options} {{{text}}};", Bp(*position)));
            }
            Shape::Image {
                path,
                position,
                size: (width, height),
            } => {
                let center = Point::new(position.x + width / 2.0, position.y + height / 2.0);
                push_line(
                    &mut code,
                    &format!(
                        "\\draw {} node {{\\includegraphics[width={}bp,height={}bp]{{{path}}}}};",
                        Bp(center),
                        fmt_num(*width),
                        fmt_num(*height)
                    ),
                );
            }
        }

        code
    }

    /// A label node, with any extra TikZ options.
    pub(super) fn label(&mut self, label: &Label, extra: &str, diagnostics: &mut Diagnostics) -> String {
        let mut code = String::new();

        self.set_pen(&label.state, &mut code, diagnostics);
        let options = self.text_options(label.anchor, label.rotation, extra);
        push_line(
            &mut code,
            &format!("\\draw {} node{options} {{{}}};", Bp(label.position), label.text),
        );
        code
    }

    fn text_options(&self, anchor: LabelAnchor, rotation: f64, extra: &str) -> String {
        let mut options = vec![];

        match anchor {
            LabelAnchor::Center => {}
            LabelAnchor::Baseline(Alignment::Left) => options.push("anchor=base west".to_string()),
            LabelAnchor::Baseline(Alignment::Center) => options.push("anchor=base".to_string()),
            LabelAnchor::Baseline(Alignment::Right) => options.push("anchor=base east".to_string()),
        }
        if rotation != 0.0 {
            options.push(format!("rotate={}", fmt_num(rotation)));
        }
        if self.pen_rgb.is_some_and(|rgb| rgb != Rgb::BLACK) {
            options.push("text=strokecol".to_string());
        }
        if !extra.is_empty() {
            options.push(extra.to_string());
        }

        if options.is_empty() {
            String::new()
        } else {
            format!(" [{}]", options.join(","))
        }
    }
}

fn define_color(name: &str, rgb: Rgb) -> String {
    let (r, g, b) = rgb.fractions();

    format!(
        "\\definecolor{{{name}}}{{rgb}}{{{},{},{}}};",
        fmt_num(r),
        fmt_num(g),
        fmt_num(b)
    )
}

/// "(p1) -- (p2) -- ..."
pub(super) fn straight_path(points: &[Point]) -> String {
    points
        .iter()
        .map(|point| Bp(*point).to_string())
        .collect::<Vec<_>>()
        .join(" -- ")
}

/// "(p0) .. controls (p1) and (p2) .. (p3) ..."
pub(super) fn curve_path(points: &[Point]) -> String {
    let mut path = Bp(points[0]).to_string();

    for segment in points[1..].chunks(3) {
        if let [c1, c2, end] = segment {
            path.push_str(&format!(
                " .. controls {} and {} .. {}",
                Bp(*c1),
                Bp(*c2),
                Bp(*end)
            ));
        }
    }
    path
}

pub(super) fn begin_picture(frame: &Frame<'_>) -> String {
    let mut style = ">=latex',line join=bevel".to_string();
    if !frame.ctx.graphstyle.is_empty() {
        style.push(',');
        style.push_str(&frame.ctx.graphstyle);
    }

    format!("\\begin{{tikzpicture}}[{style}]\n")
}

pub(super) fn end_picture() -> String {
    "\\end{tikzpicture}\n".to_string()
}

#[derive(Debug)]
pub(super) struct PgfEmitter {
    painter: PgfPainter,
}

impl PgfEmitter {
    pub(super) fn new(duplicate: bool) -> Self {
        Self {
            painter: PgfPainter::new(duplicate),
        }
    }
}

impl Emitter for PgfEmitter {
    fn name(&self) -> &'static str {
        "pgf"
    }

    fn packages(&self) -> &'static str {
        PACKAGES
    }

    fn environment(&self) -> &'static str {
        "tikzpicture"
    }

    fn begin_figure(&self, frame: &Frame<'_>) -> String {
        begin_picture(frame)
    }

    fn end_figure(&self, _frame: &Frame<'_>) -> String {
        end_picture()
    }

    fn drawing(&mut self, drawing: &Drawing<'_>, _frame: &Frame<'_>, diagnostics: &mut Diagnostics) -> String {
        self.painter.scope(drawing, diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::replay;
    use crate::xdot;
    use pretty_assertions::assert_eq;

    fn paint(drawing: &str, duplicate: bool) -> (String, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let operations = xdot::parse(drawing, &mut diagnostics).unwrap();
        let mut painter = PgfPainter::new(duplicate);
        let code = replay(&operations)
            .iter()
            .map(|primitive| painter.primitive(primitive, &mut diagnostics))
            .collect();

        (code, diagnostics)
    }

    #[test]
    fn test_pen_color_then_box() {
        let (code, diagnostics) = paint("c 5 -red b 2 0 0 0 0", false);

        assert_eq!(
            code,
            "\\definecolor{strokecol}{rgb}{1,0,0};\n\
             \\pgfsetstrokecolor{strokecol}\n\
             \\definecolor{fillcol}{rgb}{1,0,0};\n\
             \\pgfsetfillcolor{fillcol}\n\
             \\pgfsetlinewidth{1bp}\n\
             \\pgfsetdash{}{0pt}\n\
             \\filldraw (0bp,0bp) -- (0bp,0bp) -- cycle;\n"
        );
        assert_eq!(diagnostics.count_kind("MalformedDrawingString"), 1);
        assert_eq!(diagnostics.count_kind("UnsupportedPrimitive"), 1);
    }

    #[test]
    fn test_node() {
        let (code, diagnostics) = paint(
            "c 7 -#000000 e 27 90 27 18 F 14 11 -Times-Roman T 27 85.8 0 7 1 -a ",
            true,
        );

        assert_eq!(
            code,
            "\\definecolor{strokecol}{rgb}{0,0,0};\n\
             \\pgfsetstrokecolor{strokecol}\n\
             \\pgfsetlinewidth{1bp}\n\
             \\pgfsetdash{}{0pt}\n\
             \\draw (27bp,90bp) ellipse (27bp and 18bp);\n\
             \\draw (27bp,85.8bp) node [anchor=base] {{\\fontsize{14bp}{16.8bp}\\selectfont a}};\n"
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_bezier_and_styles() {
        let (code, _) = paint(
            "S 6 -dashed S 15 -setlinewidth(2) c 4 -blue B 4 0 0 0 10 10 10 10 0 ",
            false,
        );

        assert_eq!(
            code,
            "\\definecolor{strokecol}{rgb}{0,0,1};\n\
             \\pgfsetstrokecolor{strokecol}\n\
             \\pgfsetlinewidth{2bp}\n\
             \\pgfsetdash{{3pt}{3pt}}{0pt}\n\
             \\draw (0bp,0bp) .. controls (0bp,10bp) and (10bp,10bp) .. (10bp,0bp);\n"
        );
    }

    #[test]
    fn test_invisible_and_transparent() {
        let (code, _) = paint("S 5 -invis e 1 1 1 1 ", false);
        assert_eq!(code, "");

        let (code, _) = paint("c 9 -#fffffe00 C 7 -#ffffff P 3 0 0 0 10 10 0 ", false);
        assert_eq!(
            code,
            "\\definecolor{fillcol}{rgb}{1,1,1};\n\
             \\pgfsetfillcolor{fillcol}\n\
             \\pgfsetlinewidth{1bp}\n\
             \\pgfsetdash{}{0pt}\n\
             \\fill (0bp,0bp) -- (0bp,10bp) -- (10bp,0bp) -- cycle;\n"
        );
    }

    #[test]
    fn test_colored_text() {
        let (code, _) = paint("c 5 -blue T 10 20 -1 7 3 -x_1 ", false);

        assert!(code.ends_with("\\draw (10bp,20bp) node [anchor=base west,text=strokecol] {x_1};\n"));
    }
}
