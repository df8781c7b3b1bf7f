use std::cmp::Ordering;
use std::f64::consts::{FRAC_PI_2, PI};
use std::str::FromStr;

use pv_orientation::angles::deg_to_rad;
use pv_orientation::diagnostics::{CollectingSink, Severity};
use pv_orientation::engine::OrientationEngine;
use pv_orientation::error::ConfigurationError;
use pv_orientation::params::{ParamValue, ParameterSet};
use pv_orientation::resolver::*;
use pv_orientation::types::*;

macro_rules! assert_approx {
    ($left:expr, $right:expr, $tol:expr) => {{
        let (l, r) = ($left as f64, $right as f64);
        assert!(
            (l - r).abs() <= $tol,
            "assert_approx failed: left={}, right={}, diff={}, tol={}",
            l, r, (l - r).abs(), $tol
        );
    }};
}

fn params(strategy: &str) -> ParameterSet {
    ParameterSet::new()
        .with(FILE_SECTION, VERSION_KEY, "2.1")
        .with(SECTION, STRATEGY_KEY, strategy)
}

fn horizontal_tracker(strategy: &str, axis_azimuth: f64) -> ParameterSet {
    params(strategy)
        .with(SECTION, "AxisTilt", 0.0)
        .with(SECTION, "AxisAzimuth", axis_azimuth)
        .with(SECTION, "MinTilt", -55.0)
        .with(SECTION, "MaxTilt", 55.0)
}

fn seasonal_params() -> ParameterSet {
    params("FixedTiltedPlaneSeasonalAdjustment")
        .with(SECTION, "PlaneAzimuth", 0.0)
        .with(SECTION, "SummerMonth", "June")
        .with(SECTION, "SummerDay", 21)
        .with(SECTION, "WinterMonth", "December")
        .with(SECTION, "WinterDay", 21)
        .with(SECTION, "PlaneTiltSummer", 10.0)
        .with(SECTION, "PlaneTiltWinter", 50.0)
}

// ── Strategies ──

#[test]
fn test_strategy_names_parse() {
    for strategy in Strategy::ALL {
        assert_eq!(Strategy::from_str(strategy.name()), Ok(strategy));
    }
    assert_eq!(
        Strategy::from_str("SingleAxisHorizontalTracking(N-S)"),
        Ok(Strategy::SingleAxisHorizontalTracking)
    );
}

#[test]
fn test_fixed_plane_converted_to_radians() {
    let p = params("FixedTiltedPlane")
        .with(SECTION, "PlaneTilt", 30.0)
        .with(SECTION, "PlaneAzimuth", -15.0);
    let mut sink = CollectingSink::new();
    let config = resolve(&p, &mut sink).unwrap();
    assert_eq!(config.strategy, Strategy::FixedTiltedPlane);
    match config.mode {
        TrackMode::NoTracking(plane) => {
            assert_approx!(plane.slope, deg_to_rad(30.0), 1e-15);
            assert_approx!(plane.azimuth, deg_to_rad(-15.0), 1e-15);
        }
        other => panic!("unexpected mode {:?}", other),
    }
    assert!(config.bifacial.is_none());
    assert!(sink.entries.is_empty(), "{:?}", sink.entries);
}

#[test]
fn test_unlimited_rows_is_fixed_plane_with_own_strategy() {
    let p = params("UnlimitedRows")
        .with(SECTION, "PlaneTilt", 20.0)
        .with(SECTION, "PlaneAzimuth", 0.0);
    let config = resolve(&p, &mut CollectingSink::new()).unwrap();
    assert_eq!(config.strategy, Strategy::UnlimitedRows);
    assert!(matches!(config.mode, TrackMode::NoTracking(_)));
}

#[test]
fn test_east_west_tracker_layout() {
    let p = horizontal_tracker("SingleAxisElevationTracking(E-W)", 90.0);
    let config = resolve(&p, &mut CollectingSink::new()).unwrap();
    match config.mode {
        TrackMode::SingleAxis(t) => {
            assert_eq!(t.axis_layout(), AxisLayout::EastWest);
            assert_approx!(t.axis_azimuth, FRAC_PI_2, 1e-12);
            assert_approx!(t.min_tilt, deg_to_rad(-55.0), 1e-15);
            assert_eq!(t.min_rotation_angle, t.min_tilt);
            assert_eq!(t.max_rotation_angle, t.max_tilt);
            assert!(t.backtracking.is_none());
        }
        other => panic!("unexpected mode {:?}", other),
    }
}

#[test]
fn test_north_south_tracker_with_backtracking() {
    let p = horizontal_tracker("SingleAxisHorizontalTracking(N-S)", 0.0)
        .with(SECTION, "Backtracking", true)
        .with(SECTION, "RowPitch", 6.0)
        .with(SECTION, "ArrayWidth", 2.2);
    let config = resolve(&p, &mut CollectingSink::new()).unwrap();
    match config.mode {
        TrackMode::SingleAxis(t) => {
            assert_eq!(t.axis_layout(), AxisLayout::NorthSouth);
            assert_eq!(
                t.backtracking,
                Some(Backtracking {
                    row_pitch: 6.0,
                    array_width: 2.2,
                })
            );
        }
        other => panic!("unexpected mode {:?}", other),
    }
}

#[test]
fn test_backtracking_requires_pitch_and_width() {
    let p = horizontal_tracker("SingleAxisHorizontalTracking(N-S)", 0.0)
        .with(SECTION, "Backtracking", true)
        .with(SECTION, "ArrayWidth", 2.2);
    let mut sink = CollectingSink::new();
    let err = resolve(&p, &mut sink).unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::MissingParameter {
            section: SECTION.to_string(),
            key: "RowPitch".to_string(),
        }
    );
    assert!(sink.has_fatal());
}

#[test]
fn test_bifacial_tracker() {
    let p = horizontal_tracker("SingleAxisHorizontalTracking(N-S)", 0.0)
        .with(SECTION, "Bifacial", "yes")
        .with(SECTION, "GroundClearance", 1.5)
        .with(SECTION, "ArrayWidth", 2.0);
    let config = resolve(&p, &mut CollectingSink::new()).unwrap();
    assert_eq!(
        config.bifacial,
        Some(Bifacial {
            clearance_at_zero_tilt: 1.5,
            array_width: 2.0,
        })
    );
}

#[test]
fn test_bifacial_requires_clearance() {
    let p = params("FixedTiltedPlane")
        .with(SECTION, "PlaneTilt", 25.0)
        .with(SECTION, "PlaneAzimuth", 0.0)
        .with(SECTION, "Bifacial", true)
        .with(SECTION, "ArrayWidth", 2.0);
    let err = resolve(&p, &mut CollectingSink::new()).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::MissingParameter { ref key, .. } if key == "GroundClearance"
    ));
}

#[test]
fn test_two_axis_limits() {
    let p = params("TwoAxisTracking")
        .with(SECTION, "MinTilt", 0.0)
        .with(SECTION, "MaxTilt", 70.0)
        .with(SECTION, "AzimuthReference", 180.0)
        .with(SECTION, "MinAzimuth", -120.0)
        .with(SECTION, "MaxAzimuth", 120.0);
    let config = resolve(&p, &mut CollectingSink::new()).unwrap();
    match config.mode {
        TrackMode::TwoAxis(t) => {
            assert_approx!(t.max_tilt, deg_to_rad(70.0), 1e-15);
            assert_approx!(t.azimuth.reference, PI, 1e-15);
            assert_approx!(t.azimuth.min, deg_to_rad(-120.0), 1e-15);
        }
        other => panic!("unexpected mode {:?}", other),
    }
    assert!(config.bifacial.is_none());
}

#[test]
fn test_vertical_axis() {
    let p = params("AzimuthVerticalAxisTracking")
        .with(SECTION, "PlaneTilt", 35.0)
        .with(SECTION, "AzimuthReference", 0.0)
        .with(SECTION, "MinAzimuth", -90.0)
        .with(SECTION, "MaxAzimuth", 90.0);
    let config = resolve(&p, &mut CollectingSink::new()).unwrap();
    match config.mode {
        TrackMode::VerticalAxis(t) => {
            assert_approx!(t.slope, deg_to_rad(35.0), 1e-15);
            assert_approx!(t.azimuth.max, FRAC_PI_2, 1e-12);
        }
        other => panic!("unexpected mode {:?}", other),
    }
}

// ── Seasonal calendar fields ──

#[test]
fn test_seasonal_month_names() {
    let config = resolve(&seasonal_params(), &mut CollectingSink::new()).unwrap();
    match config.mode {
        TrackMode::SeasonalFixedTilt(s) => {
            assert_eq!(s.summer_start, CalendarDay::new(6, 21));
            assert_eq!(s.winter_start, CalendarDay::new(12, 21));
            assert_approx!(s.summer_tilt, deg_to_rad(10.0), 1e-15);
            assert_approx!(s.winter_tilt, deg_to_rad(50.0), 1e-15);
        }
        other => panic!("unexpected mode {:?}", other),
    }
}

#[test]
fn test_seasonal_month_numbers_and_leap_day() {
    let p = seasonal_params()
        .with(SECTION, "SummerMonth", 2)
        .with(SECTION, "SummerDay", 29);
    let config = resolve(&p, &mut CollectingSink::new()).unwrap();
    match config.mode {
        TrackMode::SeasonalFixedTilt(s) => assert_eq!(s.summer_start, CalendarDay::new(2, 29)),
        other => panic!("unexpected mode {:?}", other),
    }
}

#[test]
fn test_seasonal_invalid_month() {
    let p = seasonal_params().with(SECTION, "WinterMonth", "Juno");
    let mut sink = CollectingSink::new();
    let err = resolve(&p, &mut sink).unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidDate { ref key, .. } if key == "WinterMonth"));
    assert_eq!(sink.count(Severity::Fatal), 1);
}

#[test]
fn test_seasonal_day_past_month_end() {
    let p = seasonal_params().with(SECTION, "SummerDay", 31);
    let err = resolve(&p, &mut CollectingSink::new()).unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidDate { ref key, .. } if key == "SummerDay"));
}

#[test]
fn test_parse_month_forms() {
    assert_eq!(parse_month(&ParamValue::from("June")), Some(6));
    assert_eq!(parse_month(&ParamValue::from("dec")), Some(12));
    assert_eq!(parse_month(&ParamValue::from("3")), Some(3));
    assert_eq!(parse_month(&ParamValue::from(11)), Some(11));
    assert_eq!(parse_month(&ParamValue::from("13")), None);
    assert_eq!(parse_month(&ParamValue::from(6.5)), None);
    assert_eq!(parse_month(&ParamValue::from(true)), None);
}

// ── Fatal configuration errors ──

#[test]
fn test_unknown_strategy_is_fatal() {
    let p = params("SunflowerTracking");
    let mut sink = CollectingSink::new();
    let err = resolve(&p, &mut sink).unwrap_err();
    assert_eq!(err, ConfigurationError::UnknownStrategy("SunflowerTracking".to_string()));
    assert_eq!(sink.count(Severity::Fatal), 1);
}

#[test]
fn test_missing_strategy_is_fatal() {
    let p = ParameterSet::new().with(FILE_SECTION, VERSION_KEY, "2.0");
    let err = resolve(&p, &mut CollectingSink::new()).unwrap_err();
    assert!(matches!(err, ConfigurationError::MissingParameter { ref key, .. } if key == STRATEGY_KEY));
}

#[test]
fn test_missing_required_key_prevents_engine() {
    let mut p = horizontal_tracker("SingleAxisHorizontalTracking(N-S)", 0.0);
    p.remove(SECTION, "MaxTilt");
    let mut sink = CollectingSink::new();
    let result = OrientationEngine::configure(&p, &mut sink);
    assert!(matches!(
        result,
        Err(ConfigurationError::MissingParameter { ref key, .. }) if key == "MaxTilt"
    ));
    assert!(sink.has_fatal());
}

#[test]
fn test_wrong_type_is_fatal() {
    let p = params("FixedTiltedPlane")
        .with(SECTION, "PlaneTilt", true)
        .with(SECTION, "PlaneAzimuth", 0.0);
    let err = resolve(&p, &mut CollectingSink::new()).unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidParameter { expected: "number", .. }));
}

#[test]
fn test_numeric_text_accepted() {
    let p = params("FixedTiltedPlane")
        .with(SECTION, "PlaneTilt", "12.5")
        .with(SECTION, "PlaneAzimuth", 0.0);
    let config = resolve(&p, &mut CollectingSink::new()).unwrap();
    match config.mode {
        TrackMode::NoTracking(plane) => assert_approx!(plane.slope, deg_to_rad(12.5), 1e-15),
        other => panic!("unexpected mode {:?}", other),
    }
}

// ── Format versions ──

#[test]
fn test_compare_versions() {
    assert_eq!(compare_versions("2", "2.0.0"), Ok(Ordering::Equal));
    assert_eq!(compare_versions("1.10", "1.9"), Ok(Ordering::Greater));
    assert_eq!(compare_versions("v2.1", "2.0"), Ok(Ordering::Greater));
    assert_eq!(compare_versions("1.99", BASELINE_VERSION), Ok(Ordering::Less));
    assert!(compare_versions("two", "2.0").is_err());
}

fn tilt_and_roll(version: &str) -> ParameterSet {
    ParameterSet::new()
        .with(FILE_SECTION, VERSION_KEY, version)
        .with(SECTION, STRATEGY_KEY, "TiltAndRollTracking")
        .with(SECTION, "AxisTilt", 20.0)
        .with(SECTION, "AxisAzimuth", 0.0)
}

#[test]
fn test_legacy_rotation_limit_keys() {
    let p = tilt_and_roll("1.5")
        .with(SECTION, "MinPhi", -45.0)
        .with(SECTION, "MaxPhi", 45.0);
    let config = resolve(&p, &mut CollectingSink::new()).unwrap();
    match config.mode {
        TrackMode::SingleAxis(t) => {
            assert_eq!(t.axis_layout(), AxisLayout::General);
            assert_approx!(t.min_rotation_angle, deg_to_rad(-45.0), 1e-15);
            assert_approx!(t.max_rotation_angle, deg_to_rad(45.0), 1e-15);
        }
        other => panic!("unexpected mode {:?}", other),
    }
}

#[test]
fn test_current_rotation_limit_keys() {
    let p = tilt_and_roll("2.0")
        .with(SECTION, "MinRotationAngle", -60.0)
        .with(SECTION, "MaxRotationAngle", 60.0)
        .with(SECTION, "MinPhi", -45.0);
    let config = resolve(&p, &mut CollectingSink::new()).unwrap();
    match config.mode {
        TrackMode::SingleAxis(t) => {
            assert_approx!(t.min_rotation_angle, deg_to_rad(-60.0), 1e-15);
        }
        other => panic!("unexpected mode {:?}", other),
    }
}

#[test]
fn test_legacy_file_with_current_keys_fails() {
    let p = tilt_and_roll("1.0")
        .with(SECTION, "MinRotationAngle", -60.0)
        .with(SECTION, "MaxRotationAngle", 60.0);
    let err = resolve(&p, &mut CollectingSink::new()).unwrap_err();
    assert!(matches!(err, ConfigurationError::MissingParameter { ref key, .. } if key == "MinPhi"));
}

#[test]
fn test_rotation_limit_keys() {
    assert_eq!(rotation_limit_keys("1.9.9"), Ok(("MinPhi", "MaxPhi")));
    assert_eq!(
        rotation_limit_keys("2.0"),
        Ok(("MinRotationAngle", "MaxRotationAngle"))
    );
}

#[test]
fn test_missing_version_warns_and_uses_baseline() {
    let p = ParameterSet::new()
        .with(SECTION, STRATEGY_KEY, "TiltAndRollTracking")
        .with(SECTION, "AxisTilt", 10.0)
        .with(SECTION, "AxisAzimuth", 0.0)
        .with(SECTION, "MinRotationAngle", -60.0)
        .with(SECTION, "MaxRotationAngle", 60.0);
    let mut sink = CollectingSink::new();
    resolve(&p, &mut sink).unwrap();
    assert_eq!(sink.count(Severity::Warning), 1);
    assert!(!sink.has_fatal());
}

#[test]
fn test_invalid_version_is_fatal_for_tilt_and_roll() {
    let p = tilt_and_roll("latest")
        .with(SECTION, "MinRotationAngle", -60.0)
        .with(SECTION, "MaxRotationAngle", 60.0);
    let mut sink = CollectingSink::new();
    let err = resolve(&p, &mut sink).unwrap_err();
    assert_eq!(err, ConfigurationError::InvalidVersion("latest".to_string()));
    assert!(sink.has_fatal());
}

#[test]
fn test_version_ignored_without_versioned_keys() {
    let p = params("FixedTiltedPlane")
        .with(FILE_SECTION, VERSION_KEY, "latest")
        .with(SECTION, "PlaneTilt", 30.0)
        .with(SECTION, "PlaneAzimuth", 0.0);
    let mut sink = CollectingSink::new();
    let config = resolve(&p, &mut sink).unwrap();
    assert_eq!(config.strategy, Strategy::FixedTiltedPlane);
    assert!(sink.entries.is_empty());

    let unversioned = ParameterSet::new()
        .with(SECTION, STRATEGY_KEY, "FixedTiltedPlane")
        .with(SECTION, "PlaneTilt", 30.0)
        .with(SECTION, "PlaneAzimuth", 0.0);
    let mut sink = CollectingSink::new();
    resolve(&unversioned, &mut sink).unwrap();
    assert!(sink.entries.is_empty());
}

// ── JSON parameter files ──

#[test]
fn test_resolve_from_json() {
    let json = r#"{
        "File": { "Version": "2.3" },
        "Orientation": {
            "Strategy": "SingleAxisHorizontalTracking(N-S)",
            "AxisTilt": 0,
            "AxisAzimuth": 0,
            "MinTilt": -60,
            "MaxTilt": 60,
            "Backtracking": true,
            "RowPitch": 5.5,
            "ArrayWidth": 2.0
        }
    }"#;
    let p = ParameterSet::from_json_str(json).unwrap();
    let mut engine = OrientationEngine::configure(&p, &mut CollectingSink::new()).unwrap();
    let config = engine.configuration().copied().unwrap();
    assert_eq!(config.strategy, Strategy::SingleAxisHorizontalTracking);
    let r = engine.evaluate(0.3, FRAC_PI_2, 2025, 120).unwrap();
    assert_approx!(r.surface_slope, 0.3, 1e-12);
}

#[test]
fn test_malformed_json_rejected() {
    let err = ParameterSet::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, ConfigurationError::Source(_)));
}
