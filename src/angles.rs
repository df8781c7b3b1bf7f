use std::f64::consts::{PI, TAU};

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

use crate::types::{CalendarDay, SolarPosition};

pub const EARTH_AXIAL_TILT: f64 = 23.45;
pub const DEGREES_PER_HOUR: f64 = 15.0;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (PI / 180.0)
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad * (180.0 / PI)
}

/// Brings an azimuth back into (-π, π] with a single 2π shift.
///
/// Values more than one period out of range are not expected from the
/// tracker formulas and are left with one shift applied.
pub fn wrap_azimuth(azimuth: f64) -> f64 {
    if azimuth > PI {
        azimuth - TAU
    } else if azimuth <= -PI {
        azimuth + TAU
    } else {
        azimuth
    }
}

pub fn leap_year(year: i32) -> bool {
    (year % 400 == 0) || (year % 4 == 0 && year % 100 != 0)
}

pub fn days_in_months(year: i32) -> [u32; 12] {
    [
        31,
        if leap_year(year) { 29 } else { 28 },
        31, 30, 31, 30, 31, 31, 30, 31, 30, 31,
    ]
}

/// Month is clamped to 1-12; the day is added as given.
pub fn day_of_year(year: i32, month: u32, day: u32) -> i32 {
    let dim = days_in_months(year);
    let month = month.clamp(1, 12);
    let sum: u32 = dim[..(month - 1) as usize].iter().sum();
    (sum + day) as i32
}

/// Day of year of a month/day pair in `year`. A day past the end of the
/// month (Feb 29 in a common year) falls on the month's last day.
pub fn calendar_day_of_year(year: i32, date: CalendarDay) -> i32 {
    let month = date.month.clamp(1, 12);
    let last = days_in_months(year)[(month - 1) as usize];
    day_of_year(year, month, date.day.clamp(1, last))
}

/// Cosine of the angle between the sun direction and the normal of a
/// surface with the given slope and azimuth. All angles in radians.
pub fn cos_incidence_angle(
    sun_zenith: f64,
    sun_azimuth: f64,
    surface_slope: f64,
    surface_azimuth: f64,
) -> f64 {
    let cos_inc = sun_zenith.cos() * surface_slope.cos()
        + sun_zenith.sin() * surface_slope.sin() * (sun_azimuth - surface_azimuth).cos();
    cos_inc.clamp(-1.0, 1.0)
}

pub fn incidence_angle(
    sun_zenith: f64,
    sun_azimuth: f64,
    surface_slope: f64,
    surface_azimuth: f64,
) -> f64 {
    cos_incidence_angle(sun_zenith, sun_azimuth, surface_slope, surface_azimuth).acos()
}

pub fn intermediate_angle_b(n: i32) -> f64 {
    deg_to_rad((n - 1) as f64 * (360.0 / 365.0))
}

/// Equation of time in minutes.
pub fn equation_of_time(n: i32) -> f64 {
    let b = intermediate_angle_b(n);
    229.18
        * (0.000075
            + 0.001868 * b.cos()
            - 0.032077 * b.sin()
            - 0.014615 * (2.0 * b).cos()
            - 0.040849 * (2.0 * b).sin())
}

/// Solar declination in radians.
pub fn solar_declination(n: i32) -> f64 {
    deg_to_rad(EARTH_AXIAL_TILT * deg_to_rad(360.0 * ((284 + n) as f64 / 365.0)).sin())
}

/// Hour angle in radians, negative before solar noon.
pub fn hour_angle(local_solar_time: f64) -> f64 {
    deg_to_rad(DEGREES_PER_HOUR * (local_solar_time - 12.0))
}

pub fn solar_zenith_angle(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let cos_zenith = latitude.sin() * declination.sin()
        + latitude.cos() * declination.cos() * hour_angle.cos();
    cos_zenith.clamp(-1.0, 1.0).acos()
}

/// Sun azimuth measured from south, east negative, in (-π, π].
pub fn solar_azimuth(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let sin_az = -declination.cos() * hour_angle.sin();
    let cos_az = declination.sin() * latitude.cos()
        - declination.cos() * latitude.sin() * hour_angle.cos();
    wrap_azimuth(sin_az.atan2(cos_az) - PI)
}

/// Sun position for a site given in degrees (longitude east positive).
pub fn solar_position<Tz: TimeZone>(
    latitude: f64,
    longitude: f64,
    dt: &DateTime<Tz>,
) -> SolarPosition {
    let utc = dt.with_timezone(&Utc);
    let utc_hours = utc.hour() as f64 + utc.minute() as f64 / 60.0 + utc.second() as f64 / 3600.0;
    let n = utc.ordinal() as i32;
    let eot = equation_of_time(n);
    let decl = solar_declination(n);
    let lst = (utc_hours + (4.0 * longitude + eot) / 60.0).rem_euclid(24.0);
    let ha = hour_angle(lst);
    let lat = deg_to_rad(latitude);
    SolarPosition {
        day_of_year: n,
        declination: decl,
        equation_of_time: eot,
        local_solar_time: lst,
        hour_angle: ha,
        zenith: solar_zenith_angle(lat, decl, ha),
        azimuth: solar_azimuth(lat, decl, ha),
    }
}
