// SPDX-License-Identifier: MPL-2.0
//! Domain layer - pure types and business rules.
//!
//! This module contains the value objects the pipeline is built from. It has
//! no dependency on codecs, inference runtimes or the filesystem.
//!
//! # Modules
//!
//! - [`media`]: Pixel buffers ([`RasterImage`](media::RasterImage)) and their
//!   [`ColorEncoding`](media::ColorEncoding)
//! - [`variant`]: Variant recipes ([`VariantSpec`](variant::VariantSpec),
//!   [`ProcessingMode`](variant::ProcessingMode),
//!   [`EnhancementKind`](variant::EnhancementKind))

pub mod media;
pub mod variant;
