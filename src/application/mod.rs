// SPDX-License-Identifier: MPL-2.0
//! Application layer - Use cases and orchestration.
//!
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//! - [`pipeline`]: The variant pipeline that dispatches a mode to the engines
//!
//! # Dependency Rule
//!
//! - Application layer depends on domain layer (uses domain types)
//! - Infrastructure layer implements application layer ports

pub mod pipeline;
pub mod port;

pub use pipeline::VariantPipeline;
