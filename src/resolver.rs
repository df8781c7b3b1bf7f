use std::cmp::Ordering;
use std::str::FromStr;

use chrono::Month;
use tracing::{debug, info};

use crate::angles::{days_in_months, deg_to_rad};
use crate::diagnostics::{DiagnosticsSink, Severity};
use crate::error::ConfigurationError;
use crate::params::{ParamValue, ParameterProvider};
use crate::types::{
    AzimuthLimits, Backtracking, Bifacial, CalendarDay, FixedPlane, SeasonalTilt,
    SingleAxisTracker, Strategy, TrackMode, TrackerConfiguration, TwoAxisTracker,
    VerticalAxisTracker,
};

pub const SECTION: &str = "Orientation";
pub const FILE_SECTION: &str = "File";
pub const VERSION_KEY: &str = "Version";
pub const STRATEGY_KEY: &str = "Strategy";

/// First input-format version using the current tilt-and-roll key names.
pub const BASELINE_VERSION: &str = "2.0";

/// Leap year used to validate month/day pairs, so Feb 29 is accepted.
const VALIDATION_YEAR: i32 = 2000;

/// Reads the strategy and its parameters. Angles are given in degrees and
/// stored in radians. Fatal problems are logged to `sink` before returning.
pub fn resolve(
    provider: &dyn ParameterProvider,
    sink: &mut dyn DiagnosticsSink,
) -> Result<TrackerConfiguration, ConfigurationError> {
    let mut lookup = Lookup { provider, sink };
    let strategy_name = lookup.text(SECTION, STRATEGY_KEY)?;
    let strategy = Strategy::from_str(&strategy_name).map_err(|e| lookup.fatal(e))?;

    let mode = match strategy {
        Strategy::FixedTiltedPlane | Strategy::UnlimitedRows => TrackMode::NoTracking(FixedPlane {
            slope: lookup.angle("PlaneTilt")?,
            azimuth: lookup.angle("PlaneAzimuth")?,
        }),
        Strategy::FixedTiltedPlaneSeasonalAdjustment => {
            TrackMode::SeasonalFixedTilt(SeasonalTilt {
                azimuth: lookup.angle("PlaneAzimuth")?,
                summer_start: lookup.calendar_day("SummerMonth", "SummerDay")?,
                winter_start: lookup.calendar_day("WinterMonth", "WinterDay")?,
                summer_tilt: lookup.angle("PlaneTiltSummer")?,
                winter_tilt: lookup.angle("PlaneTiltWinter")?,
            })
        }
        Strategy::SingleAxisElevationTracking | Strategy::SingleAxisHorizontalTracking => {
            let min_tilt = lookup.angle("MinTilt")?;
            let max_tilt = lookup.angle("MaxTilt")?;
            TrackMode::SingleAxis(SingleAxisTracker {
                axis_tilt: lookup.angle("AxisTilt")?,
                axis_azimuth: lookup.angle("AxisAzimuth")?,
                min_tilt,
                max_tilt,
                min_rotation_angle: min_tilt,
                max_rotation_angle: max_tilt,
                backtracking: lookup.backtracking()?,
            })
        }
        Strategy::TiltAndRollTracking => {
            let version = lookup.format_version()?;
            let (min_key, max_key) = rotation_limit_keys(&version)?;
            let min_rotation_angle = lookup.angle(min_key)?;
            let max_rotation_angle = lookup.angle(max_key)?;
            TrackMode::SingleAxis(SingleAxisTracker {
                axis_tilt: lookup.angle("AxisTilt")?,
                axis_azimuth: lookup.angle("AxisAzimuth")?,
                min_tilt: min_rotation_angle,
                max_tilt: max_rotation_angle,
                min_rotation_angle,
                max_rotation_angle,
                backtracking: None,
            })
        }
        Strategy::TwoAxisTracking => TrackMode::TwoAxis(TwoAxisTracker {
            min_tilt: lookup.angle("MinTilt")?,
            max_tilt: lookup.angle("MaxTilt")?,
            azimuth: lookup.azimuth_limits()?,
        }),
        Strategy::AzimuthVerticalAxisTracking => TrackMode::VerticalAxis(VerticalAxisTracker {
            slope: lookup.angle("PlaneTilt")?,
            azimuth: lookup.azimuth_limits()?,
        }),
    };

    let bifacial = match mode {
        TrackMode::NoTracking(_) | TrackMode::SingleAxis(_) => lookup.bifacial()?,
        _ => None,
    };

    info!(strategy = %strategy, mode = mode.label(), bifacial = bifacial.is_some(), "resolved tracker configuration");
    Ok(TrackerConfiguration {
        strategy,
        mode,
        bifacial,
    })
}

/// Key names of the tilt-and-roll rotation limits for a given format version.
pub fn rotation_limit_keys(version: &str) -> Result<(&'static str, &'static str), ConfigurationError> {
    if compare_versions(version, BASELINE_VERSION)? == Ordering::Less {
        Ok(("MinPhi", "MaxPhi"))
    } else {
        Ok(("MinRotationAngle", "MaxRotationAngle"))
    }
}

/// Compares dotted numeric versions component by component; missing
/// components count as zero, so "2" == "2.0.0".
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, ConfigurationError> {
    let pa = parse_version(a)?;
    let pb = parse_version(b)?;
    let len = pa.len().max(pb.len());
    for i in 0..len {
        let x = pa.get(i).copied().unwrap_or(0);
        let y = pb.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }
    Ok(Ordering::Equal)
}

fn parse_version(version: &str) -> Result<Vec<u32>, ConfigurationError> {
    let trimmed = version.trim().trim_start_matches(['v', 'V']);
    if trimmed.is_empty() {
        return Err(ConfigurationError::InvalidVersion(version.to_string()));
    }
    trimmed
        .split('.')
        .map(|part| {
            part.parse::<u32>()
                .map_err(|_| ConfigurationError::InvalidVersion(version.to_string()))
        })
        .collect()
}

/// Parses a month given either as a name ("June", "Jun") or a number 1-12.
pub fn parse_month(value: &ParamValue) -> Option<u32> {
    match value {
        ParamValue::Text(name) => {
            let name = name.trim();
            Month::from_str(name)
                .ok()
                .map(|m| m.number_from_month())
                .or_else(|| name.parse::<u32>().ok().filter(|m| (1..=12).contains(m)))
        }
        ParamValue::Number(n) if n.fract() == 0.0 && (1.0..=12.0).contains(n) => Some(*n as u32),
        _ => None,
    }
}

struct Lookup<'a, 's> {
    provider: &'a dyn ParameterProvider,
    sink: &'a mut (dyn DiagnosticsSink + 's),
}

impl Lookup<'_, '_> {
    fn fatal(&mut self, err: ConfigurationError) -> ConfigurationError {
        self.sink.log(&err.to_string(), Severity::Fatal);
        err
    }

    fn required(&mut self, section: &str, key: &str) -> Result<ParamValue, ConfigurationError> {
        match self.provider.scalar(section, key) {
            Some(value) => Ok(value),
            None => Err(self.fatal(ConfigurationError::MissingParameter {
                section: section.to_string(),
                key: key.to_string(),
            })),
        }
    }

    fn wrong_type(&mut self, section: &str, key: &str, expected: &'static str) -> ConfigurationError {
        self.fatal(ConfigurationError::InvalidParameter {
            section: section.to_string(),
            key: key.to_string(),
            expected,
        })
    }

    fn text(&mut self, section: &str, key: &str) -> Result<String, ConfigurationError> {
        match self.required(section, key)? {
            ParamValue::Text(s) => Ok(s),
            _ => Err(self.wrong_type(section, key, "string")),
        }
    }

    fn number(&mut self, key: &str) -> Result<f64, ConfigurationError> {
        match self.required(SECTION, key)? {
            ParamValue::Number(v) => Ok(v),
            ParamValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(v) => Ok(v),
                Err(_) => Err(self.wrong_type(SECTION, key, "number")),
            },
            ParamValue::Flag(_) => Err(self.wrong_type(SECTION, key, "number")),
        }
    }

    fn angle(&mut self, key: &str) -> Result<f64, ConfigurationError> {
        Ok(deg_to_rad(self.number(key)?))
    }

    fn flag_or(&mut self, key: &str, default: bool) -> Result<bool, ConfigurationError> {
        match self.provider.scalar(SECTION, key) {
            None => {
                debug!(key, default, "optional flag absent, using default");
                Ok(default)
            }
            Some(ParamValue::Flag(b)) => Ok(b),
            Some(ParamValue::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                _ => Err(self.wrong_type(SECTION, key, "boolean")),
            },
            Some(ParamValue::Number(_)) => Err(self.wrong_type(SECTION, key, "boolean")),
        }
    }

    fn format_version(&mut self) -> Result<String, ConfigurationError> {
        let version = match self.provider.scalar(FILE_SECTION, VERSION_KEY) {
            Some(ParamValue::Text(v)) => v,
            Some(ParamValue::Number(v)) => v.to_string(),
            Some(ParamValue::Flag(_)) => {
                return Err(self.wrong_type(FILE_SECTION, VERSION_KEY, "version string"))
            }
            None => {
                self.sink.log(
                    &format!(
                        "No input format version declared, assuming {}",
                        BASELINE_VERSION
                    ),
                    Severity::Warning,
                );
                BASELINE_VERSION.to_string()
            }
        };
        match parse_version(&version) {
            Ok(_) => Ok(version),
            Err(e) => Err(self.fatal(e)),
        }
    }

    fn calendar_day(&mut self, month_key: &str, day_key: &str) -> Result<CalendarDay, ConfigurationError> {
        let raw_month = self.required(SECTION, month_key)?;
        let month = match parse_month(&raw_month) {
            Some(m) => m,
            None => {
                return Err(self.fatal(ConfigurationError::InvalidDate {
                    section: SECTION.to_string(),
                    key: month_key.to_string(),
                    value: format!("{:?}", raw_month),
                }))
            }
        };
        let day = self.number(day_key)?;
        let last = days_in_months(VALIDATION_YEAR)[(month - 1) as usize];
        if day.fract() != 0.0 || day < 1.0 || day > last as f64 {
            return Err(self.fatal(ConfigurationError::InvalidDate {
                section: SECTION.to_string(),
                key: day_key.to_string(),
                value: day.to_string(),
            }));
        }
        Ok(CalendarDay::new(month, day as u32))
    }

    fn azimuth_limits(&mut self) -> Result<AzimuthLimits, ConfigurationError> {
        Ok(AzimuthLimits {
            reference: self.angle("AzimuthReference")?,
            min: self.angle("MinAzimuth")?,
            max: self.angle("MaxAzimuth")?,
        })
    }

    fn backtracking(&mut self) -> Result<Option<Backtracking>, ConfigurationError> {
        if !self.flag_or("Backtracking", false)? {
            return Ok(None);
        }
        Ok(Some(Backtracking {
            row_pitch: self.number("RowPitch")?,
            array_width: self.number("ArrayWidth")?,
        }))
    }

    fn bifacial(&mut self) -> Result<Option<Bifacial>, ConfigurationError> {
        if !self.flag_or("Bifacial", false)? {
            return Ok(None);
        }
        Ok(Some(Bifacial {
            clearance_at_zero_tilt: self.number("GroundClearance")?,
            array_width: self.number("ArrayWidth")?,
        }))
    }
}
