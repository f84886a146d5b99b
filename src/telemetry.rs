//! Target telemetry snapshot and display formatting.
//!
//! Holds the latest gimbal/target readings as one value that is always
//! read and written as a group, plus the helpers that turn raw wire
//! units into display strings.

use chrono::{DateTime, Local};

/// Raw angle readings arrive in centi-degrees.
pub const ANGLE_SCALE: f64 = 0.01;
/// Raw range readings arrive in centimeters.
pub const DISTANCE_SCALE: f64 = 0.01;

/// One complete set of target readings, as pushed by a producer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TargetData {
    pub z_angle: f64,
    pub pitch_angle: f64,
    pub roll_angle: f64,
    pub yaw_angle: f64,
    pub distance: f64,
    pub height: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub range_enabled: bool,
}

/// The lock-guarded state the render loop samples each frame.
///
/// All fields are overwritten together under one lock, so a reader can
/// never observe half of one update and half of another.
#[derive(Clone, Copy, Debug)]
pub struct TelemetrySnapshot {
    pub data: TargetData,
    pub last_update: DateTime<Local>,
}

impl TelemetrySnapshot {
    pub fn new() -> Self {
        Self {
            data: TargetData::default(),
            last_update: Local::now(),
        }
    }

    pub fn overwrite(&mut self, data: TargetData) {
        self.data = data;
        self.last_update = Local::now();
    }
}

pub fn format_angle(raw: f64) -> String {
    format!("{:.2}\u{00b0}", raw * ANGLE_SCALE)
}

pub fn format_distance(raw: f64) -> String {
    format!("{:.2} m", raw * DISTANCE_SCALE)
}

pub fn format_height(height: f64) -> String {
    format!("{:.2} m", height)
}

pub fn format_coordinate(coord: f64) -> String {
    format!("{:.6}\u{00b0}", coord)
}

/// Microsecond-precision timestamp truncated to millisecond display.
pub fn format_timestamp(time: DateTime<Local>) -> String {
    let full = time.format("%Y-%m-%d %H:%M:%S%.6f").to_string();
    full[..full.len() - 3].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angles_are_scaled_from_centidegrees() {
        assert_eq!(format_angle(1234.0), "12.34\u{00b0}");
        assert_eq!(format_angle(-50.0), "-0.50\u{00b0}");
    }

    #[test]
    fn distance_is_scaled_from_centimeters() {
        assert_eq!(format_distance(12345.0), "123.45 m");
    }

    #[test]
    fn coordinates_keep_six_decimals() {
        assert_eq!(format_coordinate(121.5654), "121.565400\u{00b0}");
    }

    #[test]
    fn timestamp_is_truncated_to_milliseconds() {
        let formatted = format_timestamp(Local::now());
        let fraction = formatted.rsplit('.').next().unwrap();
        assert_eq!(fraction.len(), 3);
        assert!(fraction.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn overwrite_replaces_every_field_and_stamps_time() {
        let mut snapshot = TelemetrySnapshot::new();
        let before = snapshot.last_update;
        let data = TargetData {
            z_angle: 100.0,
            pitch_angle: -200.0,
            roll_angle: 3.0,
            yaw_angle: 4.0,
            distance: 5000.0,
            height: 120.5,
            longitude: 121.0,
            latitude: 25.0,
            range_enabled: true,
        };
        snapshot.overwrite(data);
        assert_eq!(snapshot.data, data);
        assert!(snapshot.last_update >= before);
    }
}
