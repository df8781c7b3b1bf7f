use chrono::{TimeZone, Timelike};
use chrono_tz::America::Chicago;
use tracing_subscriber::EnvFilter;

use pv_orientation::angles::rad_to_deg;
use pv_orientation::{OrientationEngine, ParameterSet, TracingSink};

const PARAMETERS: &str = r#"{
    "File": { "Version": "2.0" },
    "Orientation": {
        "Strategy": "SingleAxisHorizontalTracking(N-S)",
        "AxisTilt": 0,
        "AxisAzimuth": 0,
        "MinTilt": -55,
        "MaxTilt": 55,
        "Backtracking": true,
        "RowPitch": 5.0,
        "ArrayWidth": 2.0,
        "Bifacial": true,
        "GroundClearance": 1.5
    }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let latitude = 39.8;
    let longitude = -89.6;

    let params = ParameterSet::from_json_str(PARAMETERS)?;
    let mut engine = OrientationEngine::configure(&params, &mut TracingSink)?;

    println!("=== Single-Axis Tracker Orientation ===");
    println!(
        "Location: Springfield, IL ({:.1}°N, {:.1}°W)",
        latitude, -longitude
    );
    println!("Date: 2026-03-21 (America/Chicago)");
    println!();
    println!(" time   slope  azimuth  rotation  backtrack  clearance    aoi");

    for hour in 6..=19 {
        let dt = Chicago.with_ymd_and_hms(2026, 3, 21, hour, 0, 0).unwrap();
        let r = engine.evaluate_at(latitude, longitude, &dt)?;
        println!(
            "{:02}:{:02}  {:6.2}  {:7.2}  {:8.2}  {:9.2}  {:9.2}  {:6.2}",
            dt.hour(),
            dt.minute(),
            rad_to_deg(r.surface_slope),
            rad_to_deg(r.surface_azimuth),
            rad_to_deg(r.rotation_angle),
            rad_to_deg(r.backtracking_correction),
            r.ground_clearance,
            rad_to_deg(r.incidence_angle),
        );
    }

    Ok(())
}
