//! # sr-core
//!
//! Core types and error definitions for shortrate-rs.
//!
//! This crate provides the foundational building blocks shared across all
//! other crates in the workspace: primitive type aliases, the error taxonomy,
//! and the [`RatePath`] container every estimator starts from.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `ensure_fit!` macros.
pub mod errors;

/// Equally spaced rate observations.
pub mod rate_path;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A time measurement in years.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use rate_path::RatePath;
