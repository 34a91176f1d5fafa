use crate::error::ConfigError;

/// Rectangle of the complex plane covered by the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub cx_min: f64,
    pub cx_max: f64,
    pub cy_min: f64,
    pub cy_max: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            cx_min: -2.5,
            cx_max: 1.5,
            cy_min: -2.0,
            cy_max: 2.0,
        }
    }
}

impl Viewport {
    fn is_valid(&self) -> bool {
        let corners = [self.cx_min, self.cx_max, self.cy_min, self.cy_max];
        corners.iter().all(|v| v.is_finite())
            && self.cx_min < self.cx_max
            && self.cy_min < self.cy_max
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteMode {
    /// Six-segment hue wheel.
    Hue,
    /// Equal channels, bright at the minimum iteration count.
    Grayscale,
}

/// What the palette does with a count outside the frame's min/max.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangePolicy {
    Clamp,
    Reject,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaletteOptions {
    pub mode: PaletteMode,
    pub invert: bool,
    /// Offset added to the hue before wrapping, in segments (0..6).
    pub rotation: f64,
    /// Keeps the hue off exact segment boundaries.
    pub epsilon: f64,
    pub range_policy: RangePolicy,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        PaletteOptions {
            mode: PaletteMode::Hue,
            invert: false,
            rotation: 0.0,
            epsilon: 1e-4,
            range_policy: RangePolicy::Clamp,
        }
    }
}

/// Deflate effort used by the png encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    Fast,
    Default,
    Best,
}

#[derive(Clone, Debug, PartialEq)]
/// Everything needed to render and store one image
pub struct RenderConfig {
    /// Number of pixel columns
    pub width: usize,
    /// Number of pixel rows
    pub height: usize,
    pub viewport: Viewport,
    /// The maximum number of iterations per pixel. So, also the maximum
    /// value stored in the iteration field.
    pub iteration_max: u32,
    pub escape_radius: f64,
    /// Force rows within half a pixel of the real axis onto it.
    pub symmetry_snap: bool,
    pub palette: PaletteOptions,
    /// Threads used by the rasterizer. One means no pool at all.
    pub workers: u32,
    pub compression: Compression,
    /// Upper bound on bytes held by the pixel buffer and its encoded copy.
    pub memory_budget: Option<usize>,
    pub file_name: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 800,
            height: 800,
            viewport: Viewport::default(),
            iteration_max: 200,
            escape_radius: 2.0,
            symmetry_snap: true,
            palette: PaletteOptions::default(),
            workers: 1,
            compression: Compression::Default,
            memory_budget: None,
            file_name: "mandelbrot.png".to_string(),
        }
    }
}

impl RenderConfig {
    pub const CHANNELS: usize = 3;

    /// Size of the pixel buffer, `None` if it does not fit in `usize`.
    pub fn raw_len(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)?
            .checked_mul(Self::CHANNELS)
    }

    pub fn pixel_width(&self) -> f64 {
        (self.viewport.cx_max - self.viewport.cx_min) / self.width as f64
    }

    pub fn pixel_height(&self) -> f64 {
        (self.viewport.cy_max - self.viewport.cy_min) / self.height as f64
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = u32::MAX as usize;
        if self.width == 0 || self.height == 0 || self.width > max || self.height > max {
            return Err(ConfigError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }
        if !self.viewport.is_valid() {
            return Err(ConfigError::InvalidViewport);
        }
        let iter_limit = u16::MAX as u32;
        if self.iteration_max == 0 || self.iteration_max > iter_limit {
            return Err(ConfigError::IterationMax {
                got: self.iteration_max,
                max: iter_limit,
            });
        }
        if !(self.escape_radius.is_finite() && self.escape_radius > 0.0) {
            return Err(ConfigError::EscapeRadius);
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if !(self.palette.epsilon.is_finite() && self.palette.rotation.is_finite()) {
            return Err(ConfigError::Palette);
        }
        Ok(())
    }
}
