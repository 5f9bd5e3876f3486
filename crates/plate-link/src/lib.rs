mod attribute;
mod command;
mod config;
mod decorators;
mod error;
mod feature;
mod link_command;
mod plugin;
mod range;
mod schema;
pub mod ui;
mod unlink_command;

pub use crate::attribute::*;
pub use crate::command::*;
pub use crate::config::*;
pub use crate::decorators::*;
pub use crate::error::*;
pub use crate::feature::*;
pub use crate::link_command::*;
pub use crate::plugin::*;
pub use crate::range::*;
pub use crate::schema::*;
pub use crate::unlink_command::*;
