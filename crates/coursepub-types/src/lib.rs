//! Shared types, adapter traits, and core utilities for coursepub.
//!
//! This crate holds everything the server crate and the storage adapters
//! have to agree on, so adapters can compile in parallel with the feature
//! crates.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod auth_adapter;
pub mod blob_adapter;
pub mod error;
pub mod hasher;
pub mod meta_adapter;
pub mod prelude;
pub mod types;
pub mod utils;
pub mod worker;

// vim: ts=4
