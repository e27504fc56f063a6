//! Literal values and the closed set of kinds they belong to.
//!
//! Every expression evaluates to exactly one [`Value`]. The [`LiteralKind`] of a
//! value drives function dispatch (see [`crate::functions`]) and the casting
//! lattice (see [`crate::casting`]).

mod kind;
mod value;


pub use kind::{DecodeError, LiteralKind};
pub use value::Value;
