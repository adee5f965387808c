//! Linear window level transformation.

/// The amplitude of the display range produced by the VOI transforms.
pub(crate) const Y_MAX: f64 = 255.;

/// The parameters of a single window level
/// for a VOI transformation,
/// comprising the window center and the window width.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindowLevel {
    /// The _Window Width_.
    ///
    /// Should be greater than 0
    pub width: f64,
    /// The _Window Center_.
    pub center: f64,
}

impl WindowLevel {
    /// Create a new window level.
    #[inline]
    pub fn new(width: f64, center: f64) -> Self {
        WindowLevel { width, center }
    }
}

/// A linear VOI transformation defined by a window level.
///
/// Maps a modality value `x` to `((x - c) / w + 0.5) * 255`.
/// The output is not clamped:
/// values outside of the window fall outside of `0..=255`,
/// and it is up to the renderer to saturate them.
///
/// A window width of 0 is a precondition violation,
/// yielding infinite or NaN outputs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinearVoi {
    window_level: WindowLevel,
}

impl LinearVoi {
    /// Create a linear VOI transformation from the given window level.
    #[inline]
    pub fn new(window_level: WindowLevel) -> Self {
        LinearVoi { window_level }
    }

    /// The window level of this transformation.
    #[inline]
    pub fn window_level(&self) -> WindowLevel {
        self.window_level
    }

    /// Apply the transformation to a modality value.
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        window_level_linear(value, self.window_level.width, self.window_level.center)
    }
}

fn window_level_linear(value: f64, window_width: f64, window_center: f64) -> f64 {
    ((value - window_center) / window_width + 0.5) * Y_MAX
}
