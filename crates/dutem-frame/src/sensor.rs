//! Sensor identifier scheme.
//!
//! Sensor `i` (0-based) reports on identifier `base + i + 1`, so with the
//! default base the first sensor uses `0x0CF60665`.

use crate::error::{FrameError, Result};

/// Identifier base for the DUT-EM sensor family.
pub const DEFAULT_BASE_ID: u32 = 0x0CF6_0664;

/// Number of sensors a DUT-EM device family exposes.
pub const DEFAULT_SENSOR_COUNT: usize = 8;

/// Largest 11-bit standard identifier.
pub const STANDARD_ID_MAX: u32 = 0x7FF;

/// Largest 29-bit extended identifier.
pub const EXTENDED_ID_MAX: u32 = 0x1FFF_FFFF;

/// Identifier for sensor `index` relative to `base`.
///
/// Wraps on overflow; use [`checked_sensor_id`] when `base` is untrusted.
pub fn sensor_id(base: u32, index: usize) -> u32 {
    base.wrapping_add(index as u32).wrapping_add(1)
}

/// Identifier for sensor `index`, rejecting results outside the extended range.
pub fn checked_sensor_id(base: u32, index: usize) -> Result<u32> {
    let id = (index as u64)
        .checked_add(1)
        .and_then(|offset| offset.checked_add(u64::from(base)));
    match id {
        Some(id) if id <= u64::from(EXTENDED_ID_MAX) => Ok(id as u32),
        id => Err(FrameError::IdOutOfRange {
            id: id.unwrap_or(u64::MAX),
            max: EXTENDED_ID_MAX,
        }),
    }
}

/// Inverse of [`sensor_id`]: the sensor index an identifier belongs to.
///
/// Returns `None` when `id` is not one of the `count` identifiers above `base`.
pub fn sensor_index(base: u32, id: u32, count: usize) -> Option<usize> {
    let offset = id.checked_sub(base)?.checked_sub(1)? as usize;
    (offset < count).then_some(offset)
}
