// SPDX-License-Identifier: MPL-2.0
//! Colorization recipes.
//!
//! A [`VariantSpec`] is a named, fixed parameter set for one colorization
//! pass. The three recipes the pipeline runs are listed in
//! [`COLORIZE_VARIANTS`].

// =============================================================================
// Parameter Bounds
// =============================================================================

/// Chroma blend bounds.
pub mod blend_bounds {
    /// Fully neutral chroma.
    pub const MIN: f32 = 0.0;
    /// Predicted chroma at full strength.
    pub const MAX: f32 = 1.0;
}

/// Saturation multipliers within this distance of 1.0 skip the HSV pass.
pub const SATURATION_IDENTITY_TOLERANCE: f32 = 1e-6;

// =============================================================================
// VariantSpec
// =============================================================================

/// Named colorization recipe.
///
/// Values are stored as given; [`blend`](Self::blend) and
/// [`saturation`](Self::saturation) return sanitized values:
/// - blend is clamped to `[0, 1]`
/// - saturation is floored at `0`
///
/// NaN is treated as the lower bound for both.
///
/// # Example
///
/// ```
/// use photo_variants::domain::variant::VariantSpec;
///
/// let spec = VariantSpec::new("loud", 1.7, -0.5, false);
/// assert_eq!(spec.blend(), 1.0);
/// assert_eq!(spec.saturation(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantSpec {
    label: &'static str,
    blend: f32,
    saturation: f32,
    edge_smooth: bool,
}

impl VariantSpec {
    /// Creates a recipe. Out-of-range values are corrected on read.
    #[must_use]
    pub const fn new(label: &'static str, blend: f32, saturation: f32, edge_smooth: bool) -> Self {
        Self {
            label,
            blend,
            saturation,
            edge_smooth,
        }
    }

    /// Label used in output file names.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Chroma damping factor in `[0, 1]`.
    #[must_use]
    pub fn blend(&self) -> f32 {
        if self.blend.is_nan() {
            return blend_bounds::MIN;
        }
        self.blend.clamp(blend_bounds::MIN, blend_bounds::MAX)
    }

    /// HSV saturation multiplier, never negative.
    #[must_use]
    pub fn saturation(&self) -> f32 {
        if self.saturation.is_nan() {
            return 0.0;
        }
        self.saturation.max(0.0)
    }

    /// Whether the saturation pass changes anything.
    #[must_use]
    pub fn adjusts_saturation(&self) -> bool {
        (self.saturation() - 1.0).abs() >= SATURATION_IDENTITY_TOLERANCE
    }

    /// Whether the edge-preserving smoothing pass runs.
    #[must_use]
    pub fn edge_smooth(&self) -> bool {
        self.edge_smooth
    }

    /// Returns a copy with a different blend.
    #[must_use]
    pub const fn with_blend(mut self, blend: f32) -> Self {
        self.blend = blend;
        self
    }

    /// Returns a copy with a different saturation multiplier.
    #[must_use]
    pub const fn with_saturation(mut self, saturation: f32) -> Self {
        self.saturation = saturation;
        self
    }

    /// Returns a copy with edge smoothing switched on or off.
    #[must_use]
    pub const fn with_edge_smooth(mut self, edge_smooth: bool) -> Self {
        self.edge_smooth = edge_smooth;
        self
    }
}

// =============================================================================
// Recipe Table
// =============================================================================

/// Balanced colors.
pub const NATURAL: VariantSpec = VariantSpec::new("natural", 0.85, 1.00, true);

/// Damped, slightly desaturated colors.
pub const SOFT: VariantSpec = VariantSpec::new("soft", 0.65, 0.90, true);

/// Strong colors.
pub const VIVID: VariantSpec = VariantSpec::new("vivid", 0.92, 1.25, true);

/// Recipes used by the `colorize` and `both` modes, in output order.
pub const COLORIZE_VARIANTS: [VariantSpec; 3] = [NATURAL, SOFT, VIVID];
