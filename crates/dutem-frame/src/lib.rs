//! CAN frame layout and reading encoding for DUT-EM fuel-level sensors.
//!
//! Every sensor reports on its own extended identifier with an 8-byte payload:
//! - Bytes 0-1: level in 0.1 mm steps (little-endian, 1 m full scale)
//! - Byte 6: temperature offset by 40 (0 == -40 °C)
//! - Remaining bytes: zero
//!
//! Range enforcement lives here, not in the channel store.

pub mod codec;
pub mod error;
pub mod sensor;

pub use codec::{
    encode_level, encode_reading, encode_temperature, CanFrame, SensorReading, LEVEL_SCALE,
    MAX_DATA_LEN, SENSOR_FRAME_LEN, TEMPERATURE_OFFSET,
};
pub use error::{FrameError, Result};
pub use sensor::{
    checked_sensor_id, sensor_id, sensor_index, DEFAULT_BASE_ID, DEFAULT_SENSOR_COUNT,
    EXTENDED_ID_MAX, STANDARD_ID_MAX,
};
