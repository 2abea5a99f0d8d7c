//! Parser for xdot drawing strings (`_draw_`, `_ldraw_`, `_hdraw_`, ... attributes).
//!
//! A drawing string is a sequence of single letter opcodes, each followed by a fixed list of
//! arguments: numbers, point lists (`n x1 y1 ... xn yn`) and length prefixed strings
//! (`n -bytes`).  For details, see: <https://graphviz.org/docs/outputs/canon/#xdot>
//!
//! | op      | arguments        | operation                          |
//! |---------|------------------|------------------------------------|
//! | `E` `e` | x y w h          | filled / unfilled ellipse          |
//! | `P` `p` | n points         | filled / unfilled polygon          |
//! | `L`     | n points         | polyline                           |
//! | `B` `b` | n points         | unfilled / filled b-spline         |
//! | `T`     | x y j w n -text  | text                               |
//! | `t`     | flags            | font characteristics               |
//! | `C` `c` | n -color         | fill / pen color                   |
//! | `F`     | size n -font     | font                               |
//! | `S`     | n -style         | line style                         |
//! | `I`     | x y w h n -name  | external image                     |

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::transform::Point;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ColorRole {
    Pen,
    Fill,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DashPattern {
    Solid,
    Dashed,
    Dotted,
    Invisible,
}

/// Font characteristics set by the `t` operator.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct FontFlags(pub u32);

impl FontFlags {
    pub const BOLD: u32 = 1;
    pub const ITALIC: u32 = 2;
    pub const UNDERLINE: u32 = 4;
    pub const SUPERSCRIPT: u32 = 8;
    pub const SUBSCRIPT: u32 = 16;
    pub const STRIKE_THROUGH: u32 = 32;

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }
}

/// One operation of a drawing string.  Owns only its literal parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOperation {
    SetColor {
        role: ColorRole,
        color: String,
    },
    /// Sets the dash pattern, the line width, or neither (for styles such as "filled").
    SetLineStyle {
        dash: Option<DashPattern>,
        width: Option<f64>,
    },
    SetFont {
        family: String,
        size: f64,
    },
    SetFontFlags {
        flags: FontFlags,
    },
    Ellipse {
        center: Point,
        /// Horizontal and vertical radius.
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
        /// Width of the text as computed by the layout engine.
        width: f64,
        text: String,
        /// Counter clockwise, in degrees.
        rotation: f64,
    },
    Image {
        path: String,
        /// Lower left corner, width and height.
        position: Point,
        size: (f64, f64),
    },
}

impl DrawOperation {
    /// True for operations that only change the graphics state.
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            DrawOperation::SetColor { .. }
                | DrawOperation::SetLineStyle { .. }
                | DrawOperation::SetFont { .. }
                | DrawOperation::SetFontFlags { .. }
        )
    }
}

const OPCODES: &str = "EePpLBbTtCcFSI";

/// Parse a drawing string into operations.
///
/// Unknown opcodes are skipped with a warning.  A truncated stream or an argument that does
/// not parse fails the whole string with `MalformedDrawingString`.
pub fn parse(drawing: &str, diagnostics: &mut Diagnostics) -> Result<Vec<DrawOperation>> {
    let mut cursor = Cursor::new(drawing);
    let mut operations = vec![];

    while let Some((offset, opcode)) = cursor.next_token() {
        let operation = match opcode {
            "E" | "e" => {
                let center = cursor.point()?;
                let rx = cursor.number()?;
                let ry = cursor.number()?;

                DrawOperation::Ellipse {
                    center,
                    radii: (rx, ry),
                    filled: opcode == "E",
                }
            }
            "P" | "p" => DrawOperation::Polygon {
                points: cursor.points()?,
                filled: opcode == "P",
            },
            "L" => DrawOperation::Polyline {
                points: cursor.points()?,
            },
            "B" | "b" => DrawOperation::BSpline {
                points: cursor.points()?,
                filled: opcode == "b",
            },
            "T" => {
                let position = cursor.point()?;
                let alignment = match cursor.integer()? {
                    -1 => Alignment::Left,
                    1 => Alignment::Right,
                    _ => Alignment::Center,
                };
                let width = cursor.number()?;
                let text = cursor.string()?.to_string();

                DrawOperation::Text {
                    position,
                    alignment,
                    width,
                    text,
                    rotation: 0.0,
                }
            }
            "t" => {
                let flags_at = cursor.pos;
                let flags = cursor.integer()?;
                let flags = u32::try_from(flags)
                    .map_err(|_| Error::malformed(flags_at, format!("font flags {flags} out of range")))?;

                DrawOperation::SetFontFlags {
                    flags: FontFlags(flags),
                }
            }
            "C" | "c" => DrawOperation::SetColor {
                role: if opcode == "C" {
                    ColorRole::Fill
                } else {
                    ColorRole::Pen
                },
                color: cursor.color(diagnostics)?.to_string(),
            },
            "F" => {
                let size = cursor.number()?;
                let family = cursor.string()?.to_string();

                DrawOperation::SetFont { family, size }
            }
            "S" => line_style(cursor.string()?),
            "I" => {
                let position = cursor.point()?;
                let width = cursor.number()?;
                let height = cursor.number()?;
                let path = cursor.string()?.to_string();

                DrawOperation::Image {
                    path,
                    position,
                    size: (width, height),
                }
            }
            unknown => {
                diagnostics.warn(Error::malformed(
                    offset,
                    format!("unknown drawing operator '{unknown}' skipped"),
                ));
                cursor.skip_to_opcode();
                continue;
            }
        };
        operations.push(operation);
    }

    Ok(operations)
}

/// Interpret the argument of the `S` operator.
fn line_style(style: &str) -> DrawOperation {
    let style = style.trim();
    let (dash, width) = match style {
        "solid" => (Some(DashPattern::Solid), None),
        "dashed" => (Some(DashPattern::Dashed), None),
        "dotted" => (Some(DashPattern::Dotted), None),
        "invis" | "invisible" => (Some(DashPattern::Invisible), None),
        "bold" => (None, Some(2.0)),
        _ => {
            let width = style
                .strip_prefix("setlinewidth(")
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(|width| width.trim().parse::<f64>().ok());

            (None, width)
        }
    };

    DrawOperation::SetLineStyle { dash, width }
}

/// Reads tokens from a drawing string, keeping track of the byte offset.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.src[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Next whitespace delimited token and its offset.
    fn next_token(&mut self) -> Option<(usize, &'a str)> {
        self.skip_whitespace();
        if self.pos >= self.src.len() {
            return None;
        }
        let start = self.pos;
        let rest = &self.src[start..];
        let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.pos += len;

        Some((start, &rest[..len]))
    }

    /// Skip forward to the next token that looks like an opcode.
    fn skip_to_opcode(&mut self) {
        loop {
            self.skip_whitespace();
            let rest = &self.src[self.pos..];
            let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
            if len == 0 {
                return;
            }
            if len == 1 && OPCODES.contains(&rest[..1]) {
                return;
            }
            self.pos += len;
        }
    }

    fn argument(&mut self) -> Result<(usize, &'a str)> {
        self.next_token()
            .ok_or_else(|| Error::malformed(self.src.len(), "drawing string ends mid-operation"))
    }

    fn number(&mut self) -> Result<f64> {
        let (offset, token) = self.argument()?;

        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(Error::malformed(offset, format!("expected a number, found '{token}'"))),
        }
    }

    fn integer(&mut self) -> Result<i64> {
        let (offset, token) = self.argument()?;

        token
            .parse::<i64>()
            .map_err(|_| Error::malformed(offset, format!("expected an integer, found '{token}'")))
    }

    fn count(&mut self) -> Result<usize> {
        let offset = self.pos;
        let count = self.integer()?;

        usize::try_from(count)
            .map_err(|_| Error::malformed(offset, format!("negative count {count}")))
    }

    fn point(&mut self) -> Result<Point> {
        Ok(Point::new(self.number()?, self.number()?))
    }

    /// A point count followed by exactly that many points.
    fn points(&mut self) -> Result<Vec<Point>> {
        let count = self.count()?;

        (0..count).map(|_| self.point()).collect()
    }

    /// The count, dash and start offset of a length prefixed string.
    fn string_header(&mut self) -> Result<(usize, usize)> {
        let len = self.count()?;
        self.skip_whitespace();

        if !self.src[self.pos..].starts_with('-') {
            return Err(Error::malformed(self.pos, "expected '-' before string"));
        }
        self.pos += 1;

        Ok((len, self.pos))
    }

    /// A length prefixed string: `n -bytes`.  The length is counted in bytes.
    fn string(&mut self) -> Result<&'a str> {
        let (len, start) = self.string_header()?;
        let remaining = self.src.len() - start;

        if len > remaining {
            return Err(Error::malformed(
                start,
                format!("string of {len} bytes declared, {remaining} available"),
            ));
        }
        let end = start + len;
        let text = self.src.get(start..end).ok_or_else(|| {
            Error::malformed(start, format!("string of {len} bytes splits a character"))
        })?;
        self.pos = end;

        Ok(text)
    }

    /// A length prefixed color.
    ///
    /// Plain colors never contain whitespace, so when the declared length runs past the color
    /// token, the token wins and parsing resumes right after it.  Gradients and HSV triples
    /// are taken as declared.
    fn color(&mut self, diagnostics: &mut Diagnostics) -> Result<&'a str> {
        let mark = self.pos;
        let declared = self.string()?;

        if declared.starts_with('[') || declared.starts_with('(') || is_hsv(declared) {
            return Ok(declared);
        }
        match declared.find(char::is_whitespace) {
            Some(token_len) if token_len > 0 => {
                let start = self.pos - declared.len();
                self.pos = start + token_len;
                diagnostics.warn(Error::malformed(
                    mark,
                    format!(
                        "color declared as {} bytes, but the token '{}' has {token_len}",
                        declared.len(),
                        &declared[..token_len]
                    ),
                ));

                Ok(&declared[..token_len])
            }
            _ => Ok(declared),
        }
    }
}

/// True for "h s v" or "h,s,v" triples.
fn is_hsv(color: &str) -> bool {
    let parts = color
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>();

    parts.len() == 3 && parts.iter().all(|part| part.parse::<f64>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse_ok(drawing: &str) -> Vec<DrawOperation> {
        let mut diagnostics = Diagnostics::new();
        parse(drawing, &mut diagnostics).unwrap()
    }

    #[test]
    fn test_parse_node_drawing() {
        let ops = parse_ok("c 7 -#ff0000 e 27 90 27 18 F 14 11 -Times-Roman T 27 86.3 0 7 1 -a");

        assert_eq!(
            ops,
            vec![
                DrawOperation::SetColor {
                    role: ColorRole::Pen,
                    color: "#ff0000".to_string()
                },
                DrawOperation::Ellipse {
                    center: Point::new(27.0, 90.0),
                    radii: (27.0, 18.0),
                    filled: false
                },
                DrawOperation::SetFont {
                    family: "Times-Roman".to_string(),
                    size: 14.0
                },
                DrawOperation::Text {
                    position: Point::new(27.0, 86.3),
                    alignment: Alignment::Center,
                    width: 7.0,
                    text: "a".to_string(),
                    rotation: 0.0
                },
            ]
        );
    }

    #[test]
    fn test_string_with_spaces() {
        let ops = parse_ok("T 10 20 -1 40 11 -hello world S 15 -setlinewidth(3)");

        assert_eq!(ops.len(), 2);
        match &ops[0] {
            DrawOperation::Text {
                text, alignment, ..
            } => {
                assert_eq!(text, "hello world");
                assert_eq!(*alignment, Alignment::Left);
            }
            other => panic!("expected text, got {other:?}"),
        }
        assert_eq!(
            ops[1],
            DrawOperation::SetLineStyle {
                dash: None,
                width: Some(3.0)
            }
        );
    }

    #[test]
    fn test_spline_points() {
        let ops = parse_ok("B 4 27 71.7 27 63.98 27 54.71 27 46.1 P 3 1 2 3 4 5 6");

        assert_eq!(ops.len(), 2);
        match &ops[0] {
            DrawOperation::BSpline { points, filled } => {
                assert_eq!(points.len(), 4);
                assert_eq!(points[3], Point::new(27.0, 46.1));
                assert!(!filled);
            }
            other => panic!("expected spline, got {other:?}"),
        }
    }

    #[test]
    fn test_color_length_mismatch_recovers() {
        let mut diagnostics = Diagnostics::new();
        let ops = parse("c 5 -red b 2 0 0 0 0", &mut diagnostics).unwrap();

        assert_eq!(
            ops,
            vec![
                DrawOperation::SetColor {
                    role: ColorRole::Pen,
                    color: "red".to_string()
                },
                DrawOperation::BSpline {
                    points: vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)],
                    filled: true
                },
            ]
        );
        assert_eq!(diagnostics.warnings().count(), 1);
    }

    #[test]
    fn test_hsv_color_kept_whole() {
        let ops = parse_ok("C 11 -0.5 0.5 0.5");

        assert_eq!(
            ops,
            vec![DrawOperation::SetColor {
                role: ColorRole::Fill,
                color: "0.5 0.5 0.5".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_opcode_skipped() {
        let mut diagnostics = Diagnostics::new();
        let ops = parse("X 1 2 3 e 1 1 2 2", &mut diagnostics).unwrap();

        assert_eq!(ops.len(), 1);
        assert_eq!(diagnostics.count_kind("MalformedDrawingString"), 1);
    }

    #[rstest(
        drawing,
        case::missing_point("e 27 90 27"),
        case::short_point_list("P 3 1 2 3 4"),
        case::string_too_long("T 1 2 0 5 20 -abc"),
        case::bad_number("E 1 x 2 3"),
        case::missing_dash("c 3 red"),
        case::not_a_number("e nan 1 inf 2"),
        case::infinite("L 2 0 0 infinity 1"),
        case::font_flags_out_of_range("t 4294967296"),
        case::negative_font_flags("t -1")
    )]
    fn test_malformed(drawing: &str) {
        let mut diagnostics = Diagnostics::new();
        let err = parse(drawing, &mut diagnostics).unwrap_err();

        assert_eq!(err.kind(), "MalformedDrawingString");
    }

    #[test]
    fn test_prefixes_of_valid_string() {
        let drawing = "c 5 -black e 27 90 27 18 F 14 11 -Times-Roman T 27 86 0 7 1 -a";
        let full = parse_ok(drawing);

        assert_eq!(full.len(), 4);
        // Cutting at an operator boundary never fails, and yields the operators before it.
        for (cut, expected) in [(0, 0), (10, 1), (24, 2), (45, 3)] {
            assert_eq!(parse_ok(&drawing[..cut]).len(), expected, "cut at {cut}");
        }
    }

    #[test]
    fn test_line_styles() {
        assert_eq!(
            line_style("dashed"),
            DrawOperation::SetLineStyle {
                dash: Some(DashPattern::Dashed),
                width: None
            }
        );
        assert_eq!(
            line_style("bold"),
            DrawOperation::SetLineStyle {
                dash: None,
                width: Some(2.0)
            }
        );
        assert_eq!(
            line_style("filled"),
            DrawOperation::SetLineStyle {
                dash: None,
                width: None
            }
        );
    }
}
