//! Error Detection Code.
//!
//! The EDC is a 32bit CRC stored little-endian right after the area it protects. It's used to
//! detect (not correct) corruption in Mode 1 and Mode 2 sectors.

use crate::tables::Tables;

/// Feed `bytes` into the running EDC `state` and return the new state. Calling this function on
/// consecutive slices and threading the state through gives the same result as a single call over
/// the concatenated data. A fresh computation starts with a state of 0.
pub fn edc_update(tables: &Tables, state: u32, bytes: &[u8]) -> u32 {
    let lut = tables.edc();

    bytes.iter().fold(state, |edc, &b| {
        (edc >> 8) ^ lut[((edc ^ u32::from(b)) & 0xff) as usize]
    })
}

/// Compute the EDC of `covered` and compare it with the little-endian value in `stored`
pub fn edc_matches(tables: &Tables, covered: &[u8], stored: &[u8; 4]) -> bool {
    edc_update(tables, 0, covered) == u32::from_le_bytes(*stored)
}
