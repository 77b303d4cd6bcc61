//! An implementation of Pie, the small dependently typed language from
//! _The Little Typer_, extended with user-declared inductive datatypes.

pub mod context;
pub mod core;
pub mod driver;
pub mod env;
pub mod source;
pub mod surface;
pub mod symbol;

pub use driver::{Driver, Status};
