//! Node positions as plain text, one node per line: "name x y width height", in big points.

use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::transform::fmt_num;

use super::{Drawing, Emitter, Frame, Owner};

#[derive(Debug)]
pub(super) struct PositionsEmitter;

impl Emitter for PositionsEmitter {
    fn name(&self) -> &'static str {
        "positions"
    }

    fn is_latex(&self) -> bool {
        false
    }

    fn packages(&self) -> &'static str {
        ""
    }

    fn environment(&self) -> &'static str {
        ""
    }

    fn begin_figure(&self, _frame: &Frame<'_>) -> String {
        String::new()
    }

    fn end_figure(&self, _frame: &Frame<'_>) -> String {
        String::new()
    }

    fn drawing(&mut self, drawing: &Drawing<'_>, frame: &Frame<'_>, diagnostics: &mut Diagnostics) -> String {
        let Owner::Node(node) = drawing.owner else {
            return String::new();
        };
        let Some(pos) = node.pos() else {
            diagnostics.warn(Error::InvalidOption {
                option: "pos".to_string(),
                message: "node has no position".to_string(),
            });
            return String::new();
        };
        let pos = frame.transform.apply(pos);
        let (width, height) = node.size();

        format!(
            "{} {} {} {} {}\n",
            node.name(),
            fmt_num(pos.x),
            fmt_num(pos.y),
            fmt_num(frame.transform.length(width)),
            fmt_num(frame.transform.length(height))
        )
    }
}
