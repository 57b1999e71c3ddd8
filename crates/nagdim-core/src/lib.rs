//! nagdim-core: Core library for nagdim
//!
//! This crate provides the core functionality for `nagdim`, a tool that
//! visually dims "nag" output from AI coding-assistant session hooks by
//! installing highlight-line triggers into terminal session profiles.
//!
//! # Architecture
//!
//! ```text
//! Phrase Registry → Regex Synthesizer → (pattern set)
//!                                            ⊕ Color Deriver
//!                                            ↓
//!                                    Profile Reconciler
//!                                            ↓
//!                           Host Bridge → profile storage
//! ```
//!
//! # Modules
//!
//! - `registry`: Phrase catalog, organized into dimmer groups
//! - `synth`: Null-safe patterns, tail fragments, recognition set
//! - `color`: Dim color derivation from profile colors
//! - `trigger`: Wire model of a host profile trigger
//! - `reconcile`: Idempotent install/remove over trigger lists
//! - `host`: Bridge subprocess client and the `HostInterface` trait
//! - `apply`: Per-session operations and batch reports
//! - `watch`: Event loop reacting to session/profile/theme changes
//! - `config`: TOML configuration
//! - `logging`: Tracing setup
//!
//! # Safety
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod apply;
pub mod color;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod reconcile;
pub mod registry;
pub mod synth;
pub mod trigger;
pub mod watch;

pub use error::{Error, HostError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
