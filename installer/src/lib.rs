//! appkg installer library.
//!
//! This crate provides the command-line front end to the `appkg` ingestion
//! pipeline. It is used by the `appkg-installer` binary and can be driven
//! programmatically for testing.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - `appkg.toml` loading and flag merging
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Error types for installer failures
//! - [`install_flow`] - Inspect and install command orchestration
//! - [`output`] - Report formatting for stderr and JSON output

pub mod cli;
pub mod config;
pub mod dirs;
pub mod error;
pub mod install_flow;
pub mod output;
