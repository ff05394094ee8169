pub use crate::app::App;
pub use coursepub_types::prelude::*;

// vim: ts=4
