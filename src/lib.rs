pub mod api;
pub mod color;
pub mod diagnostics;
pub mod dot_examples;
pub mod emit;
pub mod error;
pub mod graph;
pub mod options;
pub mod state;
pub mod transform;
pub mod xdot;
