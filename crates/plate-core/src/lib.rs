mod core;
mod error;
mod ops;
mod plugin;
mod query;
mod writer;

pub use crate::core::*;
pub use crate::error::*;
pub use crate::ops::*;
pub use crate::plugin::*;
pub use crate::query::*;
pub use crate::writer::*;
