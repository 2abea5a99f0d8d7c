//! Represents an edge connecting two nodes within a graph.

use crate::transform::Point;

use super::Attributes;

/// Which ends of an edge carry an arrowhead, from the `dir` attribute.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ArrowDirection {
    Forward,
    Back,
    Both,
    None,
}

/// An edge spline from the `pos` attribute: "e,x,y s,x,y p1 p2 ... pn".
///
/// The arrowhead tips ("e," and "s,") are checked but not kept; arrowheads are drawn from
/// the edge's xdot attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpline {
    /// Cubic b-spline control points: 3n + 1 of them.
    pub points: Vec<Point>,
}

impl EdgeSpline {
    pub fn parse(pos: &str) -> Option<Self> {
        let mut spline = EdgeSpline { points: vec![] };
        // Multiple splines are separated by ';'.  Only the first is used.
        let first = pos.split(';').next()?;

        for word in first.split_whitespace() {
            if let Some(tip) = word.strip_prefix("e,").or_else(|| word.strip_prefix("s,")) {
                Point::parse(tip)?;
            } else {
                spline.points.push(Point::parse(word)?);
            }
        }
        if spline.points.is_empty() {
            None
        } else {
            Some(spline)
        }
    }
}

/// An edge points from src_node to dst_node.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Node that this edge points from.  This is an index into graph.nodes.
    pub src_node: usize,
    /// Node that this edge points to.  This is an index into graph.nodes.
    pub dst_node: usize,
    pub attributes: Attributes,
}

impl Edge {
    pub fn new(src_node: usize, dst_node: usize) -> Self {
        Edge {
            src_node,
            dst_node,
            attributes: Attributes::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    pub fn spline(&self) -> Option<EdgeSpline> {
        self.attr("pos").and_then(EdgeSpline::parse)
    }

    /// Label position.
    pub fn label_pos(&self) -> Option<Point> {
        self.attr("lp").and_then(Point::parse)
    }

    /// Arrowheads as drawn by dot, which defaults to forward in digraphs.
    pub fn direction(&self, directed: bool) -> ArrowDirection {
        match self.attr("dir") {
            Some("forward") => ArrowDirection::Forward,
            Some("back") => ArrowDirection::Back,
            Some("both") => ArrowDirection::Both,
            Some("none") => ArrowDirection::None,
            _ if directed => ArrowDirection::Forward,
            _ => ArrowDirection::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spline_parse() {
        let spline = EdgeSpline::parse("e,27,36.104 27,71.697 27,63.983 27,54.712 27,46.104").unwrap();

        assert_eq!(spline.points.len(), 4);
        assert_eq!(spline.points[0], Point::new(27.0, 71.697));
        assert_eq!(EdgeSpline::parse("e,1,2"), None);
        assert_eq!(EdgeSpline::parse("1,x 2,3"), None);
        assert_eq!(EdgeSpline::parse("e,1,y 2,3"), None);
    }

    #[test]
    fn test_direction() {
        let mut edge = Edge::new(0, 1);

        assert_eq!(edge.direction(true), ArrowDirection::Forward);
        assert_eq!(edge.direction(false), ArrowDirection::None);
        edge.attributes.set("dir", "both");
        assert_eq!(edge.direction(false), ArrowDirection::Both);
    }
}
