//! SQL rendering layer: dialect abstraction.

pub mod dialect;

pub use dialect::{Dialect, SqlDialect};
