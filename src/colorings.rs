use dyn_clone::DynClone;

use crate::config::{PaletteMode, PaletteOptions, RangePolicy};
use crate::error::PaletteError;
use crate::mandel_image::FrameStats;

pub type Rgb = [u8; 3];

pub trait Palette: DynClone + Sync + Send {
    /// Get the color for an iteration count, given the smallest and the
    /// largest count seen in the frame. `min < max` is guaranteed.
    fn get(&self, v: u32, min: u32, max: u32) -> Rgb;
}

dyn_clone::clone_trait_object!(Palette);

#[derive(Clone)]
pub struct HueWheel {
    rotation: f64,
    epsilon: f64,
}

impl HueWheel {
    pub fn new(rotation: f64, epsilon: f64) -> HueWheel {
        HueWheel { rotation, epsilon }
    }
}

impl Palette for HueWheel {
    fn get(&self, v: u32, min: u32, max: u32) -> Rgb {
        let span = (max - min) as f64;
        let h = (self.rotation + self.epsilon + 4.0 * (v - min) as f64 / span) % 6.0;
        let c = 255.0;
        let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
        let (c, x) = (c as u8, x as u8);

        let mut rgb = [0u8; 3];
        match h as i64 {
            0 => (rgb[0], rgb[1]) = (c, x),
            1 => (rgb[0], rgb[1]) = (x, c),
            2 => (rgb[1], rgb[2]) = (c, x),
            3 => (rgb[1], rgb[2]) = (x, c),
            4 => (rgb[0], rgb[2]) = (x, c),
            _ => (rgb[0], rgb[2]) = (c, x),
        }
        rgb
    }
}

#[derive(Clone)]
pub struct Grayscale {}

impl Palette for Grayscale {
    fn get(&self, v: u32, min: u32, max: u32) -> Rgb {
        let level = 255 * u64::from(max - v) / u64::from(max - min);
        let level = level as u8;
        [level, level, level]
    }
}

/// Applies the frame range, inversion and out-of-range policy around a
/// palette.
#[derive(Clone)]
pub struct Coloring {
    palette: Box<dyn Palette>,
    invert: bool,
    range_policy: RangePolicy,
}

impl Coloring {
    pub fn new(palette: Box<dyn Palette>, invert: bool, range_policy: RangePolicy) -> Coloring {
        Coloring {
            palette,
            invert,
            range_policy,
        }
    }

    pub fn from_options(opts: &PaletteOptions) -> Coloring {
        let palette: Box<dyn Palette> = match opts.mode {
            PaletteMode::Hue => Box::new(HueWheel::new(opts.rotation, opts.epsilon)),
            PaletteMode::Grayscale => Box::new(Grayscale {}),
        };
        Coloring::new(palette, opts.invert, opts.range_policy)
    }

    pub fn color(&self, v: u32, stats: FrameStats) -> Result<Rgb, PaletteError> {
        if stats.min > stats.max {
            return Err(PaletteError::InvalidRange {
                min: stats.min,
                max: stats.max,
            });
        }
        let v = if v < stats.min || v > stats.max {
            match self.range_policy {
                RangePolicy::Clamp => v.clamp(stats.min, stats.max),
                RangePolicy::Reject => {
                    return Err(PaletteError::OutOfRange {
                        count: v,
                        min: stats.min,
                        max: stats.max,
                    })
                }
            }
        } else {
            v
        };
        // a single-valued frame is widened to one step for normalisation
        let (min, max) = if stats.min == stats.max {
            match stats.max.checked_add(1) {
                Some(max) => (stats.min, max),
                None => (stats.min - 1, stats.max),
            }
        } else {
            (stats.min, stats.max)
        };
        let v = if self.invert { max - (v - min) } else { v };
        Ok(self.palette.get(v, min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(min: u32, max: u32) -> FrameStats {
        FrameStats { min, max }
    }

    fn hue() -> Coloring {
        Coloring::from_options(&PaletteOptions::default())
    }

    #[test]
    fn hue_wheel_known_colors() {
        let coloring = hue();
        assert_eq!(coloring.color(0, stats(0, 10)).unwrap(), [255, 0, 0]);
        assert_eq!(coloring.color(4, stats(0, 10)).unwrap(), [101, 255, 0]);
        assert_eq!(coloring.color(10, stats(0, 10)).unwrap(), [0, 0, 255]);
    }

    #[test]
    fn same_input_same_color() {
        let coloring = hue();
        for v in 0..=200 {
            let a = coloring.color(v, stats(0, 200)).unwrap();
            let b = coloring.clone().color(v, stats(0, 200)).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn one_channel_stays_dark_in_every_segment() {
        let coloring = hue();
        for v in 3..=203 {
            let rgb = coloring.color(v, stats(3, 203)).unwrap();
            assert!(rgb.contains(&0), "{v} -> {rgb:?}");
            assert!(rgb.contains(&255), "{v} -> {rgb:?}");
        }
    }

    #[test]
    fn rotation_walks_the_wheel() {
        let opts = PaletteOptions {
            rotation: 2.0,
            ..PaletteOptions::default()
        };
        let coloring = Coloring::from_options(&opts);
        assert_eq!(coloring.color(0, stats(0, 10)).unwrap(), [0, 255, 0]);
    }

    #[test]
    fn degenerate_range_is_defined() {
        let coloring = hue();
        assert_eq!(coloring.color(5, stats(5, 5)).unwrap(), [255, 0, 0]);
        let gray = Coloring::from_options(&PaletteOptions {
            mode: PaletteMode::Grayscale,
            ..PaletteOptions::default()
        });
        assert_eq!(gray.color(5, stats(5, 5)).unwrap(), [255, 255, 255]);
    }

    #[test]
    fn grayscale_fades_towards_max() {
        let gray = Coloring::from_options(&PaletteOptions {
            mode: PaletteMode::Grayscale,
            ..PaletteOptions::default()
        });
        assert_eq!(gray.color(0, stats(0, 10)).unwrap(), [255, 255, 255]);
        assert_eq!(gray.color(5, stats(0, 10)).unwrap(), [127, 127, 127]);
        assert_eq!(gray.color(10, stats(0, 10)).unwrap(), [0, 0, 0]);
    }

    #[test]
    fn invert_swaps_ends_of_range() {
        let inverted = Coloring::from_options(&PaletteOptions {
            invert: true,
            ..PaletteOptions::default()
        });
        let plain = hue();
        assert_eq!(
            inverted.color(0, stats(0, 10)).unwrap(),
            plain.color(10, stats(0, 10)).unwrap()
        );
    }

    #[test]
    fn out_of_range_counts_follow_policy() {
        let clamp = hue();
        assert_eq!(
            clamp.color(50, stats(0, 10)).unwrap(),
            clamp.color(10, stats(0, 10)).unwrap()
        );
        let reject = Coloring::from_options(&PaletteOptions {
            range_policy: RangePolicy::Reject,
            ..PaletteOptions::default()
        });
        assert!(matches!(
            reject.color(50, stats(0, 10)),
            Err(PaletteError::OutOfRange { count: 50, min: 0, max: 10 })
        ));
    }

    #[test]
    fn reversed_frame_range_is_an_error() {
        for policy in [RangePolicy::Clamp, RangePolicy::Reject] {
            let coloring = Coloring::from_options(&PaletteOptions {
                range_policy: policy,
                ..PaletteOptions::default()
            });
            assert!(matches!(
                coloring.color(4, stats(5, 3)),
                Err(PaletteError::InvalidRange { min: 5, max: 3 })
            ));
        }
    }

    #[test]
    fn reject_uses_frame_range_not_widened_range() {
        let reject = Coloring::from_options(&PaletteOptions {
            range_policy: RangePolicy::Reject,
            ..PaletteOptions::default()
        });
        assert!(matches!(
            reject.color(6, stats(5, 5)),
            Err(PaletteError::OutOfRange { count: 6, min: 5, max: 5 })
        ));
        assert_eq!(reject.color(5, stats(5, 5)).unwrap(), [255, 0, 0]);
        let clamp = hue();
        assert_eq!(clamp.color(6, stats(5, 5)).unwrap(), [255, 0, 0]);
    }

    #[test]
    fn single_valued_frame_at_top_of_range() {
        let gray = Coloring::from_options(&PaletteOptions {
            mode: PaletteMode::Grayscale,
            ..PaletteOptions::default()
        });
        assert_eq!(gray.color(u32::MAX, stats(u32::MAX, u32::MAX)).unwrap(), [0, 0, 0]);
    }
}
