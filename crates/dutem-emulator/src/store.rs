//! Per-channel emulated readings.
//!
//! The store accepts any value; clamping happens only when a frame is encoded.
//! Indices outside `0..channel_count()` are ignored without error.

use std::sync::{PoisonError, RwLock};

use dutem_frame::SensorReading;
use serde::Serialize;

/// Emulated state of one sensor channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ChannelParams {
    /// Whether the channel takes part in emission.
    pub enabled: bool,
    /// Fill fraction, nominally `[0.0, 1.0]`.
    pub level: f64,
    /// Temperature in °C, nominally `[-40, 215]`.
    pub temperature: i32,
}

impl ChannelParams {
    pub fn reading(&self) -> SensorReading {
        SensorReading::new(self.level, self.temperature)
    }
}

/// Fixed-capacity arena of channel records, each behind its own lock.
///
/// Reads of one record are consistent; there is no snapshot across records.
#[derive(Debug)]
pub struct ChannelStore {
    channels: Box<[RwLock<ChannelParams>]>,
}

impl ChannelStore {
    /// Create a store with `count` disabled channels.
    pub fn new(count: usize) -> Self {
        Self {
            channels: (0..count)
                .map(|_| RwLock::new(ChannelParams::default()))
                .collect(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn enable(&self, index: usize) {
        self.update(index, |params| params.enabled = true);
    }

    pub fn disable(&self, index: usize) {
        self.update(index, |params| params.enabled = false);
    }

    /// Overwrite the level; no clamping.
    pub fn set_level(&self, index: usize, level: f64) {
        self.update(index, |params| params.level = level);
    }

    /// Overwrite the temperature; no clamping.
    pub fn set_temperature(&self, index: usize, temperature: i32) {
        self.update(index, |params| params.temperature = temperature);
    }

    /// Overwrite level and temperature.
    pub fn set(&self, index: usize, level: f64, temperature: i32) {
        self.set_level(index, level);
        self.set_temperature(index, temperature);
    }

    /// Copy of one channel record, or `None` for an out-of-range index.
    pub fn channel(&self, index: usize) -> Option<ChannelParams> {
        let slot = self.channels.get(index)?;
        let params = *slot.read().unwrap_or_else(PoisonError::into_inner);
        Some(params)
    }

    /// Copy of every channel record, read one at a time.
    pub fn snapshot(&self) -> Vec<ChannelParams> {
        (0..self.channel_count())
            .filter_map(|index| self.channel(index))
            .collect()
    }

    pub fn enabled_count(&self) -> usize {
        self.snapshot().iter().filter(|params| params.enabled).count()
    }

    fn update(&self, index: usize, f: impl FnOnce(&mut ChannelParams)) {
        let Some(slot) = self.channels.get(index) else {
            tracing::trace!(index, "ignoring out-of-range channel index");
            return;
        };
        let mut params = slot.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_all_disabled_and_zeroed() {
        let store = ChannelStore::new(8);
        assert_eq!(store.channel_count(), 8);
        assert!(store
            .snapshot()
            .iter()
            .all(|params| *params == ChannelParams::default()));
        assert_eq!(store.enabled_count(), 0);
    }

    #[test]
    fn mutators_touch_only_addressed_channel() {
        let store = ChannelStore::new(8);
        store.enable(2);
        store.set(2, 0.75, 18);

        let params = store.channel(2).unwrap();
        assert!(params.enabled);
        assert_eq!(params.level, 0.75);
        assert_eq!(params.temperature, 18);

        for index in [0, 1, 3, 4, 5, 6, 7] {
            assert_eq!(store.channel(index), Some(ChannelParams::default()));
        }

        store.disable(2);
        assert!(!store.channel(2).unwrap().enabled);
        assert_eq!(store.channel(2).unwrap().level, 0.75);
    }

    #[test]
    fn out_of_range_values_are_stored_verbatim() {
        let store = ChannelStore::new(8);
        store.set_level(0, -3.5);
        store.set_temperature(0, 900);
        let params = store.channel(0).unwrap();
        assert_eq!(params.level, -3.5);
        assert_eq!(params.temperature, 900);
    }

    #[test]
    fn out_of_range_index_is_a_no_op() {
        let store = ChannelStore::new(8);
        store.set(1, 0.5, 20);
        let before = store.snapshot();

        for index in [8, 9, 100, usize::MAX] {
            store.enable(index);
            store.disable(index);
            store.set_level(index, 0.9);
            store.set_temperature(index, 99);
            store.set(index, 0.1, -5);
        }

        assert_eq!(store.snapshot(), before);
        assert_eq!(store.channel(8), None);
    }

    #[test]
    fn capacity_is_configurable() {
        let store = ChannelStore::new(3);
        store.enable(2);
        store.enable(3);
        assert_eq!(store.channel_count(), 3);
        assert_eq!(store.enabled_count(), 1);
    }

    #[test]
    fn params_convert_to_reading() {
        let params = ChannelParams {
            enabled: true,
            level: 0.4,
            temperature: -7,
        };
        assert_eq!(params.reading(), SensorReading::new(0.4, -7));
    }
}
