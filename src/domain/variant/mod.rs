// SPDX-License-Identifier: MPL-2.0
//! Variant recipes and dispatch vocabulary.

pub mod mode;
pub mod spec;

pub use mode::{variant_file_name, EnhancementKind, ProcessingMode};
pub use spec::{VariantSpec, COLORIZE_VARIANTS, NATURAL, SOFT, VIVID};
