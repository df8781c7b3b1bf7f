pub mod angles;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod params;
pub mod resolver;
pub mod types;

pub use angles::{
    calendar_day_of_year, cos_incidence_angle, day_of_year, days_in_months, deg_to_rad,
    equation_of_time, hour_angle, incidence_angle, leap_year, rad_to_deg, solar_azimuth,
    solar_declination, solar_position, solar_zenith_angle, wrap_azimuth, DEGREES_PER_HOUR,
    EARTH_AXIAL_TILT,
};

pub use diagnostics::{CollectingSink, DiagnosticsSink, Severity, TracingSink};

pub use engine::{
    apply_backtracking, ground_clearance, limit_azimuth, tilted_axis_azimuth,
    true_tracking_slope, OrientationEngine, SeasonBoundaries,
};

pub use error::{ConfigurationError, GeometryError, Result, TrackerError};

pub use params::{ParamValue, ParameterProvider, ParameterSet};

pub use resolver::{compare_versions, parse_month, resolve, rotation_limit_keys, BASELINE_VERSION};

pub use types::{
    AxisLayout, AzimuthLimits, Backtracking, Bifacial, CalendarDay, FixedPlane,
    OrientationResult, SeasonalTilt, SingleAxisTracker, SolarPosition, Strategy, TrackMode,
    TrackerConfiguration, TwoAxisTracker, VerticalAxisTracker,
};
