//! Coordinate handling between the layout engine's point space and the LaTeX output.
//!
//! The layout engine works in PostScript points with the origin at the lower left, which is
//! also what the LaTeX dialects expect.  Engines run with an inverted y axis (`-y`) produce
//! coordinates with the origin at the top, and need flipping against the bounding box.

use std::fmt::Display;

/// A coordinate pair, in whatever space the owner is in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Parse "x,y" (optionally followed by a "!" pin marker or a third z value).
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().trim_end_matches('!').split(',');
        let x = parts.next()?.trim().parse().ok()?;
        let y = parts.next()?.trim().parse().ok()?;

        Some(Self::new(x, y))
    }
}

/// Axis aligned rectangle, as given by the graph's `bb` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lower_left: Point,
    pub upper_right: Point,
}

impl BoundingBox {
    pub fn new(lower_left: Point, upper_right: Point) -> Self {
        Self {
            lower_left,
            upper_right,
        }
    }

    /// Parse "llx,lly,urx,ury".
    pub fn parse(text: &str) -> Option<Self> {
        let values = text
            .split(',')
            .map(|value| value.trim().parse::<f64>().ok())
            .collect::<Option<Vec<f64>>>()?;

        match values[..] {
            [llx, lly, urx, ury] => Some(Self::new(Point::new(llx, lly), Point::new(urx, ury))),
            _ => None,
        }
    }
}

/// Maps layout coordinates to output coordinates: a single global scale, and an optional
/// flip of the vertical axis around the bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordTransform {
    scale: f64,
    /// When set, y values are measured downward from this top edge.
    flip_top: Option<f64>,
}

impl Default for CoordTransform {
    fn default() -> Self {
        Self::new(1.0, None)
    }
}

impl CoordTransform {
    pub fn new(scale: f64, flip_top: Option<f64>) -> Self {
        Self { scale, flip_top }
    }

    /// A transform flipping the y axis within the given bounding box.
    pub fn flipped(scale: f64, bb: &BoundingBox) -> Self {
        Self::new(scale, Some(bb.lower_left.y + bb.upper_right.y))
    }

    pub fn is_flipped(&self) -> bool {
        self.flip_top.is_some()
    }

    pub fn apply(&self, point: Point) -> Point {
        let y = match self.flip_top {
            Some(top) => top - point.y,
            None => point.y,
        };
        Point::new(point.x * self.scale, y * self.scale)
    }

    /// Inverse of `apply`.
    pub fn invert(&self, point: Point) -> Point {
        let y = point.y / self.scale;
        let y = match self.flip_top {
            Some(top) => top - y,
            None => y,
        };
        Point::new(point.x / self.scale, y)
    }

    /// Scale a length (radius, width, line width).  Lengths are never flipped.
    pub fn length(&self, length: f64) -> f64 {
        length * self.scale
    }

    pub fn apply_bb(&self, bb: &BoundingBox) -> BoundingBox {
        let a = self.apply(bb.lower_left);
        let b = self.apply(bb.upper_right);

        BoundingBox::new(
            Point::new(a.x.min(b.x), a.y.min(b.y)),
            Point::new(a.x.max(b.x), a.y.max(b.y)),
        )
    }
}

/// Format a number for LaTeX: at most four decimals, no trailing zeros, no "-0".
pub fn fmt_num(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let text = format!("{rounded:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');

    text.to_string()
}

/// A point written in big points, as all dialects use: "(x bp,y bp)".
pub struct Bp(pub Point);

impl Display for Bp {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "({}bp,{}bp)", fmt_num(self.0.x), fmt_num(self.0.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest(
        transform,
        case::identity(CoordTransform::default()),
        case::scaled(CoordTransform::new(0.5, None)),
        case::flipped(CoordTransform::new(1.0, Some(180.0))),
        case::scaled_and_flipped(CoordTransform::new(2.5, Some(97.25)))
    )]
    fn test_invert_recovers_point(transform: CoordTransform) {
        for point in [Point::new(0.0, 0.0), Point::new(27.0, 90.0), Point::new(-3.5, 1e3)] {
            let back = transform.invert(transform.apply(point));

            assert!((back.x - point.x).abs() < 1e-9, "{back:?} != {point:?}");
            assert!((back.y - point.y).abs() < 1e-9, "{back:?} != {point:?}");
        }
    }

    #[test]
    fn test_flip_keeps_bounding_box() {
        let bb = BoundingBox::parse("0,0,54,108").unwrap();
        let transform = CoordTransform::flipped(1.0, &bb);

        assert_eq!(transform.apply(Point::new(27.0, 90.0)), Point::new(27.0, 18.0));
        assert_eq!(transform.apply_bb(&bb), bb);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Point::parse("27,90!"), Some(Point::new(27.0, 90.0)));
        assert_eq!(Point::parse("1.5, 2,0"), Some(Point::new(1.5, 2.0)));
        assert_eq!(Point::parse("27"), None);
        assert_eq!(BoundingBox::parse("0,0,54"), None);
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(27.0), "27");
        assert_eq!(fmt_num(71.697), "71.697");
        assert_eq!(fmt_num(1.0 / 3.0), "0.3333");
        assert_eq!(fmt_num(-0.00001), "0");
        assert_eq!(Bp(Point::new(1.5, -2.0)).to_string(), "(1.5bp,-2bp)");
    }
}
