use log::{debug, trace};
use scoped_threadpool::Pool;

use crate::colorings::Coloring;
use crate::config::RenderConfig;
use crate::error::{PaletteError, RenderError};
use crate::image::PixelBuffer;

/// Smallest and largest iteration count of one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameStats {
    pub min: u32,
    pub max: u32,
}

impl FrameStats {
    /// Identity for `merge`.
    const EMPTY: FrameStats = FrameStats {
        min: u32::MAX,
        max: 0,
    };

    fn add(&mut self, v: u32) {
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    fn merge(self, other: FrameStats) -> FrameStats {
        FrameStats {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/*
Pixel (px, py) maps to the complex point
x(px) = cx_min + px * pw
y(py) = cy_min + py * ph
with pw, ph the width and height of one pixel in the complex plane. Rows go
top to bottom with increasing y, so the image is mirrored relative to the
usual mathematical orientation; the set is symmetric about the real axis.

When symmetry_snap is on, the row whose y lies within ph/2 of the real axis is
put exactly on it, which keeps the main antenna one pixel thick.
 */
pub struct PixelToComplex {
    x0: f64,
    y0: f64,
    pw: f64,
    ph: f64,
    snap: bool,
}

impl PixelToComplex {
    pub fn from_config(cfg: &RenderConfig) -> PixelToComplex {
        PixelToComplex {
            x0: cfg.viewport.cx_min,
            y0: cfg.viewport.cy_min,
            pw: cfg.pixel_width(),
            ph: cfg.pixel_height(),
            snap: cfg.symmetry_snap,
        }
    }
    pub fn cvt(&self, px: usize, py: usize) -> (f64, f64) {
        (self.cvt_x(px), self.cvt_y(py))
    }
    pub fn cvt_x(&self, px: usize) -> f64 {
        self.x0 + px as f64 * self.pw
    }
    pub fn cvt_y(&self, py: usize) -> f64 {
        let y = self.y0 + py as f64 * self.ph;
        if self.snap && y.abs() < self.ph / 2.0 {
            0.0
        } else {
            y
        }
    }
}

/// Number of iterations of z -> z^2 + c, starting at z = 0, that stay inside
/// the escape circle. `max_iter` if the orbit never leaves it.
pub fn escape_time(cx: f64, cy: f64, max_iter: u32, escape_radius: f64) -> u32 {
    let er2 = escape_radius * escape_radius;
    let mut iter = 0;
    let (mut zx, mut zy) = (0.0f64, 0.0f64);
    let (mut zx2, mut zy2) = (0.0f64, 0.0f64);
    while iter < max_iter {
        zy = 2.0 * zx * zy + cy;
        zx = zx2 - zy2 + cx;
        zx2 = zx * zx;
        zy2 = zy * zy;
        if zx2 + zy2 >= er2 {
            break;
        }
        iter += 1;
    }
    iter
}

// The iteration count lives in the first two channels of a pixel until the
// palette pass replaces it.
fn store_count(px: &mut [u8], v: u32) {
    let [lo, hi] = (v as u16).to_le_bytes();
    px[0] = lo;
    px[1] = hi;
    px[2] = 0;
}

fn load_count(px: &[u8]) -> u32 {
    u16::from_le_bytes([px[0], px[1]]) as u32
}

fn rasterize_row(
    line: &mut [u8],
    py: usize,
    converter: &PixelToComplex,
    cfg: &RenderConfig,
) -> FrameStats {
    let mut stats = FrameStats::EMPTY;
    let y = converter.cvt_y(py);
    for (px, pixel) in line.chunks_exact_mut(RenderConfig::CHANNELS).enumerate() {
        let x = converter.cvt_x(px);
        let mv = escape_time(x, y, cfg.iteration_max, cfg.escape_radius);
        store_count(pixel, mv);
        stats.add(mv);
    }
    stats
}

/// Reserve the pixel buffer up front so a failed allocation aborts the render
/// before any work is done.
fn allocate(cfg: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    let bytes = cfg.raw_len().ok_or(RenderError::Allocation {
        bytes: usize::MAX,
        source: None,
    })?;
    if let Some(budget) = cfg.memory_budget {
        // the encoder needs room for a compressed copy next to the raw pixels
        let needed = bytes.saturating_mul(2);
        if needed > budget {
            return Err(RenderError::OverBudget { needed, budget });
        }
    }
    let mut data = Vec::new();
    data.try_reserve_exact(bytes)
        .map_err(|e| RenderError::Allocation {
            bytes,
            source: Some(e),
        })?;
    data.resize(bytes, 0);
    Ok(data)
}

/// First pass: fill `data` with iteration counts and return their range.
/// With more than one worker, rows are spread over a scoped pool; the pool is
/// joined before the per-row ranges are merged.
pub(crate) fn rasterize(data: &mut [u8], cfg: &RenderConfig) -> FrameStats {
    trace!("begin rasterize");
    let converter = PixelToComplex::from_config(cfg);
    let stride = cfg.width * RenderConfig::CHANNELS;
    let stats = if cfg.workers <= 1 {
        data.chunks_exact_mut(stride)
            .enumerate()
            .map(|(py, line)| rasterize_row(line, py, &converter, cfg))
            .fold(FrameStats::EMPTY, FrameStats::merge)
    } else {
        let mut row_stats = vec![FrameStats::EMPTY; cfg.height];
        let mut pool = Pool::new(cfg.workers);
        pool.scoped(|scope| {
            let converter = &converter;
            for ((py, line), slot) in data
                .chunks_exact_mut(stride)
                .enumerate()
                .zip(row_stats.iter_mut())
            {
                scope.execute(move || *slot = rasterize_row(line, py, converter, cfg));
            }
        });
        row_stats
            .into_iter()
            .fold(FrameStats::EMPTY, FrameStats::merge)
    };
    trace!("end rasterize");
    stats
}

/// Second pass: replace every stored iteration count with its color.
pub(crate) fn apply_palette(
    data: &mut [u8],
    stats: FrameStats,
    coloring: &Coloring,
) -> Result<(), PaletteError> {
    trace!("begin apply_palette");
    for pixel in data.chunks_exact_mut(RenderConfig::CHANNELS) {
        let rgb = coloring.color(load_count(pixel), stats)?;
        pixel.copy_from_slice(&rgb);
    }
    trace!("end apply_palette");
    Ok(())
}

/// Allocate a buffer and fill it with iteration counts, according to the
/// configuration.
pub fn make_iteration_field(cfg: &RenderConfig) -> Result<(Vec<u8>, FrameStats), RenderError> {
    cfg.validate()?;
    let mut data = allocate(cfg)?;
    let stats = rasterize(&mut data, cfg);
    debug!("iteration range {}..={}", stats.min, stats.max);
    Ok((data, stats))
}

// Make a colored pixel buffer of the mandelbrot set, according to the configuration.
pub fn make_mandel_image(cfg: &RenderConfig) -> Result<PixelBuffer, RenderError> {
    let (mut data, stats) = make_iteration_field(cfg)?;
    let coloring = Coloring::from_options(&cfg.palette);
    apply_palette(&mut data, stats, &coloring)?;
    Ok(PixelBuffer::new(data, cfg.width as u32, cfg.height as u32, stats))
}
