//! Level Meter Math
//!
//! Pure conversions from decibel readings to meter-bar heights. The shapes
//! here reproduce the panel's established visual behavior exactly: output
//! levels pivot around a damped "height before peak" point with separate
//! scaling above and below 0 dB, and gain reduction fills linearly against
//! the floor. Heights are clamped above by the meter height only; callers
//! clamp below at render time.

use serde::{Deserialize, Serialize};

/// Default positive-range divisor for output levels, in dB
pub const DEFAULT_CEILING_DB: f64 = 20.0;
/// Default negative-range divisor, in dB
pub const DEFAULT_FLOOR_DB: f64 = 60.0;
/// Default damping applied to the meter height for the pre-peak point
pub const DEFAULT_DAMPING: f64 = 0.8;
/// Default unit suffix applied to rendered heights
pub const DEFAULT_UNITS: &str = "px";

/// Meter scaling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterScale {
    /// Divisor for levels above 0 dB
    pub ceiling: f64,
    /// Divisor for levels below 0 dB and for gain reduction
    pub floor: f64,
    /// Fraction of the meter height reached at 0 dB
    pub damping: f64,
    /// Unit suffix for rendered heights
    pub units: String,
}

impl Default for MeterScale {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_CEILING_DB,
            floor: DEFAULT_FLOOR_DB,
            damping: DEFAULT_DAMPING,
            units: DEFAULT_UNITS.to_string(),
        }
    }
}

impl MeterScale {
    /// The damped pivot height, computed once per rendered meter element
    pub fn height_before_peak(&self, meter_height: f64) -> f64 {
        height_before_peak(meter_height, self.damping)
    }

    /// Output-meter height for a level reading
    pub fn output_height(&self, db: f64, meter_height: f64) -> f64 {
        output_height(
            db,
            meter_height,
            self.height_before_peak(meter_height),
            self.ceiling,
            self.floor,
        )
    }

    /// Reduction-meter height for a gain-reduction reading
    pub fn reduction_height(&self, db: f64, meter_height: f64) -> f64 {
        reduction_height(db, meter_height, self.floor)
    }

    /// Render a height with the configured unit suffix
    pub fn css(&self, height: f64) -> String {
        format!("{}{}", height, self.units)
    }
}

/// The damped height a level of exactly 0 dB reaches
pub fn height_before_peak(meter_height: f64, damping: f64) -> f64 {
    meter_height * damping
}

/// Convert an output level to a bar height
///
/// Non-finite and exactly-zero readings collapse to 0 (0 dB only occurs
/// as the not-playing placeholder). Levels above 0 dB stretch beyond the
/// pivot against `ceiling`, levels below shrink against `floor`. Clamped
/// above by `meter_height`; negative results are possible and are the
/// caller's concern.
pub fn output_height(
    db: f64,
    meter_height: f64,
    height_before_peak: f64,
    ceiling: f64,
    floor: f64,
) -> f64 {
    if !db.is_finite() || db == 0.0 {
        return 0.0;
    }
    let divisor = if db > 0.0 { ceiling } else { floor };
    let height = height_before_peak + (db / divisor) * height_before_peak;
    height.min(meter_height)
}

/// Convert a gain-reduction reading to a bar height
///
/// Readings that round to zero (including small negatives like -0.0001)
/// and non-finite readings draw nothing; otherwise the bar fills
/// proportionally to `floor`, saturating at the full meter height.
pub fn reduction_height(db: f64, meter_height: f64, floor: f64) -> f64 {
    if !db.is_finite() || db.round() == 0.0 {
        return 0.0;
    }
    (meter_height * (db / floor)).abs().min(meter_height)
}
