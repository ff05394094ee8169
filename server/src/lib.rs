//! coursepub is the publishing endpoint of an e-learning platform.
//!
//! Authoring tools upload zipped course packages with the uploader's
//! credentials. The server validates the form, the account, its role and the
//! package, enforces ownership and versioning, then stores the package and
//! its metadata. Published courses can be listed and downloaded.
//!
//! Storage is pluggable through the adapter traits in `coursepub-types`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from coursepub-types
pub use coursepub_types::auth_adapter;
pub use coursepub_types::blob_adapter;
pub use coursepub_types::error;
pub use coursepub_types::hasher;
pub use coursepub_types::meta_adapter;
pub use coursepub_types::types;
pub use coursepub_types::utils;
pub use coursepub_types::worker;

// Feature crate re-exports
pub use coursepub_core::settings;
pub use coursepub_course as course;

// Local modules
pub mod app;
pub mod bootstrap;
pub mod prelude;
pub mod routes;

pub use app::AppBuilder;

// vim: ts=4
