use std::time::Duration;

use dutem_frame::{checked_sensor_id, DEFAULT_BASE_ID, DEFAULT_SENSOR_COUNT};
use serde::Serialize;

use crate::error::{EmulatorError, Result};

/// Default time between emissions.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// How a pass over the channels is paced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    /// Wait one interval after every submitted frame. A pass over `k` enabled
    /// channels takes `k` intervals. This is the established DUT-EM emulator
    /// cadence.
    #[default]
    Sequential,
    /// Submit every enabled channel's frame back-to-back, then wait one
    /// interval. Opt-in only.
    Simultaneous,
}

/// Emulator session configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmulatorConfig {
    /// Identifier base; sensor `i` reports on `base_id + i + 1`.
    pub base_id: u32,
    /// Number of emulated sensors.
    pub channel_count: usize,
    /// Time between emissions.
    #[serde(rename = "interval_ms", serialize_with = "duration_millis::serialize")]
    pub interval: Duration,
    pub sweep_mode: SweepMode,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            base_id: DEFAULT_BASE_ID,
            channel_count: DEFAULT_SENSOR_COUNT,
            interval: DEFAULT_INTERVAL,
            sweep_mode: SweepMode::Sequential,
        }
    }
}

impl EmulatorConfig {
    /// Check that every channel maps to a valid extended identifier and that
    /// the cadence is usable.
    pub fn validate(&self) -> Result<()> {
        if self.channel_count == 0 {
            return Err(EmulatorError::InvalidConfig(
                "channel_count must be at least 1".to_string(),
            ));
        }
        if self.interval.is_zero() {
            return Err(EmulatorError::InvalidConfig(
                "interval must be greater than zero".to_string(),
            ));
        }
        checked_sensor_id(self.base_id, self.channel_count - 1).map_err(|err| {
            EmulatorError::InvalidConfig(format!(
                "base_id 0x{:X} with {} channels: {err}",
                self.base_id, self.channel_count
            ))
        })?;
        Ok(())
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().min(u128::from(u64::MAX)) as u64)
    }
}
