//! Represents a node (vertice) within a graph.

use std::fmt::Display;

use crate::transform::Point;

use super::Attributes;

/// Points per inch: node sizes are given in inches, coordinates in points.
pub const POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    // Unique within a graph.
    pub(super) name: String,
    pub attributes: Attributes,
}

impl Node {
    /// Return a new node which is not yet part of a graph.
    pub(super) fn new(name: &str) -> Self {
        Node {
            name: name.to_string(),
            attributes: Attributes::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// Center of the node, as placed by the layout engine.
    pub fn pos(&self) -> Option<Point> {
        self.attr("pos").and_then(Point::parse)
    }

    /// Width and height in points.  Graphviz defaults are 0.75in by 0.5in.
    pub fn size(&self) -> (f64, f64) {
        let inches = |name: &str, default: f64| {
            self.attr(name)
                .and_then(|value| value.trim().parse::<f64>().ok())
                .unwrap_or(default)
        };

        (
            inches("width", 0.75) * POINTS_PER_INCH,
            inches("height", 0.5) * POINTS_PER_INCH,
        )
    }
}

impl Display for Node {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        if self.attributes.is_empty() {
            write!(fmt, "{}", self.name)
        } else {
            write!(fmt, "{} {}", self.name, self.attributes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_and_size() {
        let mut node = Node::new("a");

        assert_eq!(node.pos(), None);
        assert_eq!(node.size(), (54.0, 36.0));

        node.attributes.set("pos", "27,90");
        node.attributes.set("width", "1");
        assert_eq!(node.pos(), Some(Point::new(27.0, 90.0)));
        assert_eq!(node.size(), (72.0, 36.0));
        assert_eq!(node.to_string(), r#"a [pos="27,90", width="1"]"#);
    }
}
