use std::f64::consts::{FRAC_PI_2, PI};

use chrono::{DateTime, Datelike, TimeZone, Utc};
use tracing::{debug, trace};

use crate::angles::{self, calendar_day_of_year, cos_incidence_angle, incidence_angle, wrap_azimuth};
use crate::diagnostics::{DiagnosticsSink, Severity, TracingSink};
use crate::error::{ConfigurationError, GeometryError, Result};
use crate::params::ParameterProvider;
use crate::resolver;
use crate::types::{
    AxisLayout, AzimuthLimits, Backtracking, Bifacial, OrientationResult, SeasonalTilt,
    SingleAxisTracker, TrackMode, TrackerConfiguration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonBoundaries {
    pub year: i32,
    pub summer_day: i32,
    pub winter_day: i32,
}

impl SeasonBoundaries {
    pub fn resolve(year: i32, schedule: &SeasonalTilt) -> Self {
        Self {
            year,
            summer_day: calendar_day_of_year(year, schedule.summer_start),
            winter_day: calendar_day_of_year(year, schedule.winter_start),
        }
    }

    pub fn is_summer(&self, day_of_year: i32) -> bool {
        if self.winter_day > self.summer_day {
            day_of_year >= self.summer_day && day_of_year < self.winter_day
        } else {
            !(day_of_year >= self.winter_day && day_of_year < self.summer_day)
        }
    }
}

/// Orientation engine for one tracker instance. Angles are radians;
/// azimuths use 0 = south, negative = east, ±π = north.
///
/// Carries the seasonal boundaries of the current year and the last defined
/// surface azimuth of a tilted-axis tracker between timesteps. Geometry
/// errors are logged to the engine's own sink before they are returned.
#[derive(Debug, Clone, Default)]
pub struct OrientationEngine<S = TracingSink> {
    config: Option<TrackerConfiguration>,
    season: Option<SeasonBoundaries>,
    last_surface_azimuth: f64,
    sink: S,
}

impl OrientationEngine {
    pub fn new(config: TrackerConfiguration) -> Self {
        Self::with_sink(config, TracingSink)
    }

    pub fn configure(
        provider: &dyn ParameterProvider,
        sink: &mut dyn DiagnosticsSink,
    ) -> std::result::Result<Self, ConfigurationError> {
        resolver::resolve(provider, sink).map(Self::new)
    }
}

impl<S: DiagnosticsSink> OrientationEngine<S> {
    pub fn with_sink(config: TrackerConfiguration, sink: S) -> Self {
        let last_surface_azimuth = match config.mode {
            TrackMode::SingleAxis(t) => t.axis_azimuth,
            _ => 0.0,
        };
        Self {
            config: Some(config),
            season: None,
            last_surface_azimuth,
            sink,
        }
    }

    /// Resolves the configuration, reporting to `sink`, which the engine
    /// then keeps for its own diagnostics.
    pub fn configure_with(
        provider: &dyn ParameterProvider,
        mut sink: S,
    ) -> std::result::Result<Self, ConfigurationError> {
        let config = resolver::resolve(provider, &mut sink)?;
        Ok(Self::with_sink(config, sink))
    }

    pub fn configuration(&self) -> Option<&TrackerConfiguration> {
        self.config.as_ref()
    }

    pub fn season_boundaries(&self) -> Option<SeasonBoundaries> {
        self.season
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn evaluate(
        &mut self,
        sun_zenith: f64,
        sun_azimuth: f64,
        year: i32,
        day_of_year: i32,
    ) -> Result<OrientationResult> {
        let config = match self.config {
            Some(config) => config,
            None => return Err(self.fatal(GeometryError::ModeUnset).into()),
        };

        let mut out = OrientationResult::default();
        match config.mode {
            TrackMode::NoTracking(plane) => {
                out.surface_slope = plane.slope;
                out.surface_azimuth = plane.azimuth;
            }
            TrackMode::SingleAxis(tracker) => {
                self.single_axis(&tracker, sun_zenith, sun_azimuth, &mut out);
            }
            TrackMode::TwoAxis(tracker) => {
                out.surface_slope = sun_zenith.max(tracker.min_tilt).min(tracker.max_tilt);
                out.surface_azimuth = limit_azimuth(sun_azimuth, &tracker.azimuth);
            }
            TrackMode::VerticalAxis(tracker) => {
                out.surface_slope = tracker.slope;
                out.surface_azimuth = limit_azimuth(sun_azimuth, &tracker.azimuth);
            }
            TrackMode::SeasonalFixedTilt(schedule) => {
                let bounds = self.season_for(year, &schedule);
                out.surface_slope = if bounds.is_summer(day_of_year) {
                    schedule.summer_tilt
                } else {
                    schedule.winter_tilt
                };
                out.surface_azimuth = schedule.azimuth;
            }
        }

        if let (Some(bifacial), TrackMode::NoTracking(_) | TrackMode::SingleAxis(_)) =
            (config.bifacial, config.mode)
        {
            out.ground_clearance = match ground_clearance(&bifacial, out.surface_slope) {
                Ok(clearance) => clearance,
                Err(e) => return Err(self.fatal(e).into()),
            };
        }

        out.incidence_angle = incidence_angle(
            sun_zenith,
            sun_azimuth,
            out.surface_slope,
            out.surface_azimuth,
        );
        Ok(out)
    }

    /// Evaluates at a wall-clock instant for a site in degrees (longitude
    /// east positive), computing the sun position on the way.
    pub fn evaluate_at<Tz: TimeZone>(
        &mut self,
        latitude: f64,
        longitude: f64,
        dt: &DateTime<Tz>,
    ) -> Result<OrientationResult> {
        let pos = angles::solar_position(latitude, longitude, dt);
        let year = dt.with_timezone(&Utc).year();
        self.evaluate(pos.zenith, pos.azimuth, year, pos.day_of_year)
    }

    fn fatal(&mut self, err: GeometryError) -> GeometryError {
        self.sink.log(&err.to_string(), Severity::Fatal);
        err
    }

    fn season_for(&mut self, year: i32, schedule: &SeasonalTilt) -> SeasonBoundaries {
        match self.season {
            Some(bounds) if bounds.year == year => bounds,
            _ => {
                let bounds = SeasonBoundaries::resolve(year, schedule);
                debug!(
                    year,
                    summer_day = bounds.summer_day,
                    winter_day = bounds.winter_day,
                    "resolved seasonal tilt boundaries"
                );
                self.season = Some(bounds);
                bounds
            }
        }
    }

    fn single_axis(
        &mut self,
        tracker: &SingleAxisTracker,
        sun_zenith: f64,
        sun_azimuth: f64,
        out: &mut OrientationResult,
    ) {
        match tracker.axis_layout() {
            AxisLayout::EastWest => {
                let sun_south = sun_azimuth.abs() < tracker.axis_azimuth.abs();
                let surface_azimuth = if !tracker.faces_both_sides() {
                    wrap_azimuth(tracker.axis_azimuth - FRAC_PI_2)
                } else if sun_south {
                    0.0
                } else {
                    PI
                };
                let slope = true_tracking_slope(sun_zenith, sun_azimuth, surface_azimuth);
                let (slope, correction) = apply_backtracking(slope, tracker.backtracking);
                let slope = if !tracker.faces_both_sides() {
                    slope.max(tracker.min_tilt).min(tracker.max_tilt)
                } else if sun_south {
                    slope.min(tracker.max_tilt)
                } else {
                    slope.min(tracker.min_tilt.abs())
                };
                out.surface_azimuth = surface_azimuth;
                out.surface_slope = slope;
                out.backtracking_correction = correction;
                out.rotation_angle = if surface_azimuth.abs() > FRAC_PI_2 { -slope } else { slope };
            }
            AxisLayout::NorthSouth => {
                let surface_azimuth = if sun_azimuth >= tracker.axis_azimuth {
                    FRAC_PI_2
                } else {
                    -FRAC_PI_2
                };
                let slope = true_tracking_slope(sun_zenith, sun_azimuth, surface_azimuth);
                let (slope, correction) = apply_backtracking(slope, tracker.backtracking);
                let slope = slope.min(tracker.max_tilt);
                out.surface_azimuth = surface_azimuth;
                out.surface_slope = slope;
                out.backtracking_correction = correction;
                out.rotation_angle = if surface_azimuth < 0.0 { -slope } else { slope };
            }
            AxisLayout::General => {
                let cos_axis = cos_incidence_angle(
                    sun_zenith,
                    sun_azimuth,
                    tracker.axis_tilt,
                    tracker.axis_azimuth,
                );
                let rotation = (sun_zenith.sin() * (sun_azimuth - tracker.axis_azimuth).sin())
                    .atan2(cos_axis)
                    .max(tracker.min_rotation_angle)
                    .min(tracker.max_rotation_angle);
                let slope = (rotation.cos() * tracker.axis_tilt.cos()).clamp(-1.0, 1.0).acos();
                if slope != 0.0 {
                    self.last_surface_azimuth =
                        tilted_axis_azimuth(rotation, slope, tracker.axis_azimuth);
                }
                out.rotation_angle = rotation;
                out.surface_slope = slope;
                out.surface_azimuth = self.last_surface_azimuth;
            }
        }
    }
}

/// Slope of a horizontal-axis surface facing `surface_azimuth` that follows
/// the sun without limits.
pub fn true_tracking_slope(sun_zenith: f64, sun_azimuth: f64, surface_azimuth: f64) -> f64 {
    (sun_zenith.sin() * (surface_azimuth - sun_azimuth).cos()).atan2(sun_zenith.cos())
}

/// Reduces `slope` when the row's shadow would exceed the row pitch.
/// Returns the corrected slope and the correction applied (zero if none).
pub fn apply_backtracking(slope: f64, backtracking: Option<Backtracking>) -> (f64, f64) {
    let Some(bt) = backtracking else {
        return (slope, 0.0);
    };
    if bt.array_width / slope.cos() > bt.row_pitch {
        let correction = (bt.row_pitch * slope.cos() / bt.array_width).acos();
        trace!(slope, correction, "backtracking");
        (slope - correction, correction)
    } else {
        (slope, 0.0)
    }
}

/// Surface azimuth of a tilted-axis tracker at a given rotation; `slope`
/// must be non-zero.
pub fn tilted_axis_azimuth(rotation: f64, slope: f64, axis_azimuth: f64) -> f64 {
    let offset = (rotation.sin() / slope.sin()).clamp(-1.0, 1.0).asin();
    let azimuth = if rotation < -FRAC_PI_2 {
        -offset - PI + axis_azimuth
    } else if rotation > FRAC_PI_2 {
        -offset + PI + axis_azimuth
    } else {
        offset + axis_azimuth
    };
    wrap_azimuth(azimuth)
}

/// Follows `sun_azimuth` within limits expressed relative to the reference
/// direction. The shift into the reference frame and back uses the same
/// east/west branch.
pub fn limit_azimuth(sun_azimuth: f64, limits: &AzimuthLimits) -> f64 {
    if sun_azimuth >= 0.0 {
        let relative = (sun_azimuth - limits.reference).max(limits.min).min(limits.max);
        relative + limits.reference
    } else {
        let relative = (sun_azimuth + limits.reference).max(limits.min).min(limits.max);
        relative - limits.reference
    }
}

pub fn ground_clearance(bifacial: &Bifacial, slope: f64) -> std::result::Result<f64, GeometryError> {
    let clearance = bifacial.clearance_at_zero_tilt - bifacial.array_width * slope.sin() / 2.0;
    if clearance < 0.0 {
        return Err(GeometryError::NegativeGroundClearance { clearance, slope });
    }
    Ok(clearance)
}
