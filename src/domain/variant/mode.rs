// SPDX-License-Identifier: MPL-2.0
//! Processing modes, enhancement kinds, and output naming.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// =============================================================================
// ProcessingMode
// =============================================================================

/// What the pipeline produces for one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingMode {
    /// Three model-free enhancements of the input.
    Enhance,
    /// Three colorizations of the input.
    Colorize,
    /// Three colorizations of the first enhancement.
    Both,
}

impl ProcessingMode {
    /// All modes, in documentation order.
    pub const ALL: [ProcessingMode; 3] = [Self::Enhance, Self::Colorize, Self::Both];

    /// Name used in requests and output file names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enhance => "enhance",
            Self::Colorize => "colorize",
            Self::Both => "both",
        }
    }

    /// Whether this mode runs the colorization network.
    #[must_use]
    pub fn needs_model(self) -> bool {
        matches!(self, Self::Colorize | Self::Both)
    }
}

impl FromStr for ProcessingMode {
    type Err = Error;

    /// Parses a mode, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enhance" => Ok(Self::Enhance),
            "colorize" => Ok(Self::Colorize),
            "both" => Ok(Self::Both),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// EnhancementKind
// =============================================================================

/// The three model-free transforms, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnhancementKind {
    /// Non-local-means denoise followed by a mild contrast lift.
    Denoise,
    /// CLAHE on the lightness channel.
    Clahe,
    /// Unsharp mask with a warm red offset.
    SharpWarm,
}

impl EnhancementKind {
    /// Output order of the enhancement engine.
    pub const ALL: [EnhancementKind; 3] = [Self::Denoise, Self::Clahe, Self::SharpWarm];

    /// Label used in output file names.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Denoise => "denoise",
            Self::Clahe => "clahe",
            Self::SharpWarm => "sharp_warm",
        }
    }
}

// =============================================================================
// Output Naming
// =============================================================================

/// Builds `{stem}_{mode}{index}_{label}.jpg`.
///
/// `index` is 1-based.
///
/// # Example
///
/// ```
/// use photo_variants::domain::variant::{variant_file_name, ProcessingMode};
///
/// let name = variant_file_name("photo", ProcessingMode::Colorize, 1, "natural");
/// assert_eq!(name, "photo_colorize1_natural.jpg");
/// ```
#[must_use]
pub fn variant_file_name(stem: &str, mode: ProcessingMode, index: usize, label: &str) -> String {
    format!("{stem}_{mode}{index}_{label}.jpg")
}
