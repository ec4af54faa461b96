use std::fmt;

use crate::error::{FrameError, Result};
use crate::sensor::STANDARD_ID_MAX;

/// Classic CAN payload capacity.
pub const MAX_DATA_LEN: usize = 8;

/// Payload length of every sensor frame.
pub const SENSOR_FRAME_LEN: u8 = 8;

/// Level steps per unit fill fraction (0.1 mm steps over a 1 m scale).
pub const LEVEL_SCALE: f64 = 10_000.0;

/// Added to the temperature so that byte value 0 means -40 °C.
pub const TEMPERATURE_OFFSET: i32 = 40;

const LEVEL_OFFSET: usize = 0;
const TEMPERATURE_BYTE: usize = 6;

/// A classic CAN data frame as handed to a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CanFrame {
    /// Frame identifier.
    pub id: u32,
    /// Number of meaningful bytes in `data`.
    pub len: u8,
    /// Payload buffer; bytes past `len` are zero.
    pub data: [u8; MAX_DATA_LEN],
}

impl CanFrame {
    /// Create a frame from a payload slice of at most 8 bytes.
    pub fn new(id: u32, payload: &[u8]) -> Result<Self> {
        if payload.len() > MAX_DATA_LEN {
            return Err(FrameError::PayloadTooLong {
                len: payload.len(),
                max: MAX_DATA_LEN,
            });
        }
        let mut data = [0u8; MAX_DATA_LEN];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            id,
            len: payload.len() as u8,
            data,
        })
    }

    /// The meaningful part of the payload.
    pub fn payload(&self) -> &[u8] {
        &self.data[..usize::from(self.len).min(MAX_DATA_LEN)]
    }

    /// Whether the identifier needs the 29-bit extended format.
    pub fn is_extended(&self) -> bool {
        self.id > STANDARD_ID_MAX
    }

    /// Level field of a sensor frame (bytes 0-1, little-endian).
    pub fn level_raw(&self) -> u16 {
        u16::from_le_bytes([self.data[LEVEL_OFFSET], self.data[LEVEL_OFFSET + 1]])
    }

    /// Temperature field of a sensor frame (byte 6).
    pub fn temperature_raw(&self) -> u8 {
        self.data[TEMPERATURE_BYTE]
    }
}

/// Formats the frame the way `cansend` accepts it, e.g. `0CF60665#C409000000001E00`.
impl fmt::Display for CanFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_extended() {
            write!(f, "{:08X}#", self.id)?;
        } else {
            write!(f, "{:03X}#", self.id)?;
        }
        for byte in self.payload() {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// One emulated sensor reading before range enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReading {
    /// Fill fraction; 0.0 is empty, 1.0 is full (1 m).
    pub level: f64,
    /// Temperature in °C.
    pub temperature: i32,
}

impl SensorReading {
    pub fn new(level: f64, temperature: i32) -> Self {
        Self { level, temperature }
    }
}

/// Encode a fill fraction as 0.1 mm steps, clamped to `[0.0, 1.0]`.
///
/// NaN encodes as 0.
pub fn encode_level(level: f64) -> u16 {
    if level.is_nan() {
        return 0;
    }
    (LEVEL_SCALE * level.clamp(0.0, 1.0)).round() as u16
}

/// Encode a temperature in °C as `temperature + 40`, clamped to a byte.
pub fn encode_temperature(temperature: i32) -> u8 {
    temperature
        .saturating_add(TEMPERATURE_OFFSET)
        .clamp(0, i32::from(u8::MAX)) as u8
}

/// Build the 8-byte sensor frame for `reading` on identifier `id`.
///
/// Wire layout:
/// ```text
/// ┌────────────────┬────────────┬──────────────┬────────┐
/// │ Level (2B LE)  │ 0 0 0 0    │ Temp + 40    │ 0      │
/// │ 0.1 mm steps   │ (4B)       │ (1B)         │ (1B)   │
/// └────────────────┴────────────┴──────────────┴────────┘
/// ```
pub fn encode_reading(id: u32, reading: &SensorReading) -> CanFrame {
    let mut data = [0u8; MAX_DATA_LEN];
    data[LEVEL_OFFSET..LEVEL_OFFSET + 2].copy_from_slice(&encode_level(reading.level).to_le_bytes());
    data[TEMPERATURE_BYTE] = encode_temperature(reading.temperature);
    CanFrame {
        id,
        len: SENSOR_FRAME_LEN,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::{sensor_id, DEFAULT_BASE_ID};

    #[test]
    fn level_is_clamped_at_both_ends() {
        let cases = [(-0.5, 0), (0.0, 0), (0.5, 5000), (1.0, 10000), (1.5, 10000)];
        for (level, expected) in cases {
            assert_eq!(encode_level(level), expected, "level {level}");
        }
    }

    #[test]
    fn level_rounds_to_nearest_step() {
        assert_eq!(encode_level(0.12346), 1235);
        assert_eq!(encode_level(0.00004), 0);
        assert_eq!(encode_level(0.99996), 10000);
    }

    #[test]
    fn level_handles_non_finite_values() {
        assert_eq!(encode_level(f64::NAN), 0);
        assert_eq!(encode_level(f64::INFINITY), 10000);
        assert_eq!(encode_level(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn temperature_is_offset_and_clamped() {
        let cases = [(-50, 0), (-40, 0), (0, 40), (215, 255), (300, 255)];
        for (temperature, expected) in cases {
            assert_eq!(encode_temperature(temperature), expected, "temp {temperature}");
        }
        assert_eq!(encode_temperature(i32::MAX), 255);
        assert_eq!(encode_temperature(i32::MIN), 0);
    }

    #[test]
    fn reading_populates_only_level_and_temperature() {
        let id = sensor_id(DEFAULT_BASE_ID, 0);
        let frame = encode_reading(id, &SensorReading::new(0.25, -10));

        assert_eq!(frame.id, 0x0CF6_0665);
        assert_eq!(frame.len, SENSOR_FRAME_LEN);
        assert_eq!(frame.data, [0xC4, 0x09, 0, 0, 0, 0, 30, 0]);
        assert_eq!(frame.level_raw(), 2500);
        assert_eq!(frame.temperature_raw(), 30);
    }

    #[test]
    fn display_matches_cansend_syntax() {
        let frame = encode_reading(0x0CF6_0665, &SensorReading::new(0.25, -10));
        assert_eq!(frame.to_string(), "0CF60665#C409000000001E00");

        let short = CanFrame::new(0x123, &[0xDE, 0xAD]).unwrap();
        assert_eq!(short.to_string(), "123#DEAD");
        assert!(!short.is_extended());
    }

    #[test]
    fn new_rejects_oversized_payload() {
        let err = CanFrame::new(1, &[0u8; 9]).unwrap_err();
        assert_eq!(err, FrameError::PayloadTooLong { len: 9, max: 8 });

        let frame = CanFrame::new(1, &[1, 2, 3]).unwrap();
        assert_eq!(frame.payload(), &[1, 2, 3]);
        assert_eq!(frame.data, [1, 2, 3, 0, 0, 0, 0, 0]);
    }
}
