//! Core infrastructure for coursepub.
//!
//! Shared by the server crate and the feature crates: application state,
//! the settings subsystem, authentication middleware and request extractors.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod extract;
pub mod middleware;
pub mod prelude;
pub mod settings;

pub use app::{App, AppBuilderOpts, AppState};
pub use extract::{Auth, OptionalAuth, OptionalRequestId, RequestId};

// vim: ts=4
