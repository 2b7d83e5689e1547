//! RPM-band crossfading.
//!
//! Converts the current RPM into a per-layer weight so that, for a sane
//! table, at most the two RPM-adjacent layers are audible and the hand-off
//! between them is a linear ramp.
//!
//! For layer `i` with envelope level `E`:
//!
//! | RPM region | Weight |
//! |------------|--------|
//! | `[min, normal)` | `E * (r - min) / ((normal - min) / divider)` |
//! | `[normal, max]` | `E` |
//! | `(max, upper)` | `E * (1 - (r - max) / ((upper - max) / divider))` |
//! | elsewhere | 0, channel muted and deprioritized |
//!
//! Ramp ratios are clamped to `[0, 1]`, so a divider above 1 shortens the
//! ramp instead of overshooting. The three regions are tested one after the
//! other and a later match overwrites an earlier one; a misconfigured table
//! therefore gets the last matching region, never a sum.

use crate::layer::{LayerBand, LayerTable};
use crate::math::clamp01;

/// Ramp widths at or below this are treated as plateaus.
const MIN_RAMP_WIDTH: f32 = 1e-3;

/// Blend weight of one layer for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerWeight {
    /// Gain multiplier in `[0, E]`.
    pub weight: f32,
    /// Whether the layer is inside any of its regions.
    pub audible: bool,
}

impl LayerWeight {
    /// Outside every region.
    pub const SILENT: Self = Self {
        weight: 0.0,
        audible: false,
    };

    fn audible(weight: f32) -> Self {
        Self {
            weight,
            audible: true,
        }
    }
}

/// Weight of a single band at `rpm`.
///
/// `upper_bound` is where the ramp-out reaches zero; `range_divider`
/// scales both ramp widths (`1.0` leaves them unchanged).
pub fn band_weight(
    band: &LayerBand,
    upper_bound: f32,
    rpm: f32,
    envelope: f32,
    range_divider: f32,
) -> LayerWeight {
    let divider = if range_divider > 0.0 {
        range_divider
    } else {
        1.0
    };
    let mut result = LayerWeight::SILENT;

    if rpm >= band.min && rpm < band.normal {
        let range = (band.normal - band.min) / divider;
        result = if range > MIN_RAMP_WIDTH {
            LayerWeight::audible(envelope * clamp01((rpm - band.min) / range))
        } else {
            LayerWeight::audible(envelope)
        };
    }
    if rpm >= band.normal && rpm <= band.max {
        result = LayerWeight::audible(envelope);
    }
    if rpm > band.max && rpm < upper_bound {
        let range = (upper_bound - band.max) / divider;
        result = if range > MIN_RAMP_WIDTH {
            LayerWeight::audible(envelope * (1.0 - clamp01((rpm - band.max) / range)))
        } else {
            LayerWeight::audible(envelope)
        };
    }

    result
}

/// Crossfade weights for a whole layer set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CrossfadeEngine {
    table: LayerTable,
    range_divider: f32,
}

impl CrossfadeEngine {
    /// Wrap a band table.
    pub fn new(table: LayerTable, range_divider: f32) -> Self {
        Self {
            table,
            range_divider,
        }
    }

    /// The underlying band table.
    pub fn table(&self) -> &LayerTable {
        &self.table
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Weight of layer `index` at `rpm`; silent for an out-of-range index.
    pub fn weight(&self, index: usize, rpm: f32, envelope: f32) -> LayerWeight {
        match (self.table.band(index), self.table.upper_bound(index)) {
            (Some(band), Some(upper)) => {
                band_weight(band, upper, rpm, envelope, self.range_divider)
            }
            _ => LayerWeight::SILENT,
        }
    }

    /// Fill `out` with every layer's weight. Extra slots are left untouched.
    pub fn weights_into(&self, rpm: f32, envelope: f32, out: &mut [LayerWeight]) {
        for (index, slot) in out.iter_mut().enumerate().take(self.table.len()) {
            *slot = self.weight(index, rpm, envelope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::AudioLayer;
    use alloc::vec;

    fn engine() -> CrossfadeEngine {
        let layers = vec![
            AudioLayer::new("a", 1500.0),
            AudioLayer::new("b", 4000.0),
        ];
        CrossfadeEngine::new(LayerTable::build(&layers, 1000.0, 10000.0), 1.0)
    }

    #[test]
    fn plateau_at_center() {
        let xf = engine();
        assert_eq!(xf.weight(0, 1500.0, 0.8).weight, 0.8);
        assert_eq!(xf.weight(1, 4000.0, 0.8).weight, 0.8);
    }

    #[test]
    fn ramp_in_is_linear() {
        let xf = engine();
        let w = xf.weight(1, 3200.0, 1.0);
        assert!(w.audible);
        assert!((w.weight - 0.2).abs() < 1e-5, "got {}", w.weight);
    }

    #[test]
    fn ramp_out_reaches_zero_at_upper_bound() {
        let xf = engine();
        // layer 0 ramps out over (2500, 5000)
        assert!((xf.weight(0, 3750.0, 1.0).weight - 0.5).abs() < 1e-5);
        let at_upper = xf.weight(0, 5000.0, 1.0);
        assert_eq!(at_upper, LayerWeight::SILENT);
    }

    #[test]
    fn below_first_band_of_second_layer_is_silent() {
        let xf = engine();
        assert_eq!(xf.weight(1, 1500.0, 1.0), LayerWeight::SILENT);
    }

    #[test]
    fn zero_width_ramp_is_plateau() {
        let band = LayerBand {
            min: 2000.0,
            normal: 2000.0,
            max: 3000.0,
        };
        // min == normal: region 1 is empty, region 2 covers rpm == normal
        assert_eq!(band_weight(&band, 3000.0, 2000.0, 0.5, 1.0).weight, 0.5);
        // max == upper: no ramp-out at all, no division by zero
        let w = band_weight(&band, 3000.0, 3000.5, 0.5, 1.0);
        assert_eq!(w, LayerWeight::SILENT);
    }

    #[test]
    fn divider_shortens_ramp_and_clamps() {
        let band = LayerBand {
            min: 1000.0,
            normal: 2000.0,
            max: 3000.0,
        };
        // Corrected precedence: (normal - min) / 2 = 500 rpm ramp
        let w = band_weight(&band, 5000.0, 1250.0, 1.0, 2.0);
        assert!((w.weight - 0.5).abs() < 1e-5, "got {}", w.weight);
        let w = band_weight(&band, 5000.0, 1900.0, 1.0, 2.0);
        assert_eq!(w.weight, 1.0);
    }

    #[test]
    fn overlapping_regions_last_write_wins() {
        // Pathological band where the ramp-out region overlaps the ramp-in.
        let band = LayerBand {
            min: 0.0,
            normal: 4000.0,
            max: 1000.0,
        };
        // rpm 2000 is in [min, normal) (0.5) and in (max, upper) (1 - 1000/4000 = 0.75)
        let w = band_weight(&band, 5000.0, 2000.0, 1.0, 1.0);
        assert!((w.weight - 0.75).abs() < 1e-5, "got {}", w.weight);
    }

    #[test]
    fn weights_into_fills_slots() {
        let xf = engine();
        let mut out = [LayerWeight::SILENT; 3];
        out[2].weight = 9.0;
        xf.weights_into(1500.0, 1.0, &mut out);
        assert_eq!(out[0].weight, 1.0);
        assert_eq!(out[1], LayerWeight::SILENT);
        assert_eq!(out[2].weight, 9.0);
    }
}
