//! Errors raised while converting a graph.
//!
//! Only `GraphParseFailure` aborts a whole conversion.  The other kinds abort at most one
//! object's drawing string, and are usually recorded as warnings in [crate::diagnostics].

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The xdot operator stream is truncated or an argument does not parse.
    MalformedDrawingString { offset: usize, reason: String },

    /// A dialect can not represent a primitive, and had to approximate it.
    UnsupportedPrimitive {
        dialect: &'static str,
        primitive: &'static str,
        fallback: String,
    },

    /// A color token is neither a known name nor a valid numeric form.
    UnresolvedColor { token: String, substitute: String },

    /// An option value, given on the command line or in the graph, was not understood.
    /// Only ever reported as a warning.
    InvalidOption { option: String, message: String },

    /// The dot source could not be parsed into a graph.
    GraphParseFailure {
        line: usize,
        column: usize,
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedDrawingString { offset, reason } => {
                write!(f, "malformed drawing string at byte {offset}: {reason}")
            }
            Error::UnsupportedPrimitive {
                dialect,
                primitive,
                fallback,
            } => write!(f, "{dialect} can not draw {primitive}: {fallback}"),
            Error::UnresolvedColor { token, substitute } => {
                write!(f, "unresolved color '{token}', using {substitute}")
            }
            Error::InvalidOption { option, message } => write!(f, "ignoring option {option}: {message}"),
            Error::GraphParseFailure {
                line,
                column,
                message,
            } => write!(f, "parse error at line {line}, column {column}: {message}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Error::MalformedDrawingString {
            offset,
            reason: reason.into(),
        }
    }

    /// Short name of the error kind, as shown in warnings.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MalformedDrawingString { .. } => "MalformedDrawingString",
            Error::UnsupportedPrimitive { .. } => "UnsupportedPrimitive",
            Error::UnresolvedColor { .. } => "UnresolvedColor",
            Error::InvalidOption { .. } => "InvalidOption",
            Error::GraphParseFailure { .. } => "GraphParseFailure",
        }
    }
}
