mod controller;
mod form;
mod highlight;
mod panels;
mod view;

pub use controller::*;
pub use form::*;
pub use highlight::*;
pub use panels::*;
pub use view::*;
