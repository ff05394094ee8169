pub use coursepub_core::prelude::*;

// vim: ts=4
