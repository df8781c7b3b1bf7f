use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Orientation strategy as named in the parameter source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    FixedTiltedPlane,
    FixedTiltedPlaneSeasonalAdjustment,
    UnlimitedRows,
    SingleAxisElevationTracking,
    SingleAxisHorizontalTracking,
    TiltAndRollTracking,
    TwoAxisTracking,
    AzimuthVerticalAxisTracking,
}

impl Strategy {
    pub const ALL: [Strategy; 8] = [
        Strategy::FixedTiltedPlane,
        Strategy::FixedTiltedPlaneSeasonalAdjustment,
        Strategy::UnlimitedRows,
        Strategy::SingleAxisElevationTracking,
        Strategy::SingleAxisHorizontalTracking,
        Strategy::TiltAndRollTracking,
        Strategy::TwoAxisTracking,
        Strategy::AzimuthVerticalAxisTracking,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::FixedTiltedPlane => "FixedTiltedPlane",
            Strategy::FixedTiltedPlaneSeasonalAdjustment => "FixedTiltedPlaneSeasonalAdjustment",
            Strategy::UnlimitedRows => "UnlimitedRows",
            Strategy::SingleAxisElevationTracking => "SingleAxisElevationTracking(E-W)",
            Strategy::SingleAxisHorizontalTracking => "SingleAxisHorizontalTracking(N-S)",
            Strategy::TiltAndRollTracking => "TiltAndRollTracking",
            Strategy::TwoAxisTracking => "TwoAxisTracking",
            Strategy::AzimuthVerticalAxisTracking => "AzimuthVerticalAxisTracking",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Strategy::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| ConfigurationError::UnknownStrategy(s.to_string()))
    }
}

/// Fixed plane; slope and azimuth never change during the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPlane {
    pub slope: f64,
    pub azimuth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Backtracking {
    pub row_pitch: f64,
    pub array_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bifacial {
    pub clearance_at_zero_tilt: f64,
    pub array_width: f64,
}

/// Orientation of a single-axis tracker's rotation axis, derived from its
/// tilt and azimuth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisLayout {
    /// Horizontal axis running east-west (azimuth ±π/2).
    EastWest,
    /// Horizontal axis running north-south (azimuth 0).
    NorthSouth,
    /// Any other axis: tilted, or horizontal at an arbitrary azimuth.
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleAxisTracker {
    pub axis_tilt: f64,
    pub axis_azimuth: f64,
    pub min_tilt: f64,
    pub max_tilt: f64,
    pub min_rotation_angle: f64,
    pub max_rotation_angle: f64,
    pub backtracking: Option<Backtracking>,
}

/// Tolerance used when classifying axis angles that were converted from degrees.
const AXIS_EPSILON: f64 = 1e-9;

impl SingleAxisTracker {
    pub fn axis_layout(&self) -> AxisLayout {
        if self.axis_tilt.abs() > AXIS_EPSILON {
            AxisLayout::General
        } else if (self.axis_azimuth.abs() - std::f64::consts::FRAC_PI_2).abs() <= AXIS_EPSILON {
            AxisLayout::EastWest
        } else if self.axis_azimuth.abs() <= AXIS_EPSILON {
            AxisLayout::NorthSouth
        } else {
            AxisLayout::General
        }
    }

    /// True when the tracker may tilt toward either side of its axis.
    pub fn faces_both_sides(&self) -> bool {
        self.min_tilt <= 0.0
    }
}

/// Azimuth limits expressed relative to a reference direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AzimuthLimits {
    pub reference: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoAxisTracker {
    pub min_tilt: f64,
    pub max_tilt: f64,
    pub azimuth: AzimuthLimits,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalAxisTracker {
    pub slope: f64,
    pub azimuth: AzimuthLimits,
}

/// Month and day without a year; resolved against each simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub month: u32,
    pub day: u32,
}

impl CalendarDay {
    pub fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalTilt {
    pub azimuth: f64,
    pub summer_start: CalendarDay,
    pub winter_start: CalendarDay,
    pub summer_tilt: f64,
    pub winter_tilt: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrackMode {
    NoTracking(FixedPlane),
    SingleAxis(SingleAxisTracker),
    VerticalAxis(VerticalAxisTracker),
    TwoAxis(TwoAxisTracker),
    SeasonalFixedTilt(SeasonalTilt),
}

impl TrackMode {
    pub fn label(&self) -> &'static str {
        match self {
            TrackMode::NoTracking(_) => "NoTracking",
            TrackMode::SingleAxis(_) => "SingleAxis",
            TrackMode::VerticalAxis(_) => "VerticalAxis",
            TrackMode::TwoAxis(_) => "TwoAxis",
            TrackMode::SeasonalFixedTilt(_) => "SeasonalFixedTilt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfiguration {
    pub strategy: Strategy,
    pub mode: TrackMode,
    pub bifacial: Option<Bifacial>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientationResult {
    pub surface_slope: f64,
    pub surface_azimuth: f64,
    pub rotation_angle: f64,
    pub ground_clearance: f64,
    pub backtracking_correction: f64,
    pub incidence_angle: f64,
}

/// Sun position in radians. Azimuth: 0 = south, negative = east.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarPosition {
    pub day_of_year: i32,
    pub declination: f64,
    pub equation_of_time: f64,
    pub local_solar_time: f64,
    pub hour_angle: f64,
    pub zenith: f64,
    pub azimuth: f64,
}
