//! Conversion between MIDI tick deltas and wall-clock milliseconds
//!
//! Tempo is always microseconds per quarter note and resolution is always
//! ticks (pulses) per quarter note, matching what a Standard MIDI File stores.
//! The inverse conversion truncates, so `ms_to_ticks(ticks_to_ms(d))` may land
//! one tick short of `d`.

use crate::{CodecError, Result};

/// Default tempo of a MIDI file without a SetTempo event: 120 BPM
pub const DEFAULT_TEMPO: u32 = 500_000;

/// Largest tempo a SetTempo meta event can carry (24 bits)
pub const MAX_TEMPO: u32 = 0x00FF_FFFF;

/// Convert a tick delta into milliseconds
///
/// # Examples
/// ```
/// use melody_core::timing::ticks_to_ms;
///
/// // One quarter note at 120 BPM
/// assert_eq!(ticks_to_ms(480, 500_000, 480).unwrap(), 500.0);
/// ```
pub fn ticks_to_ms(delta_ticks: u32, tempo: u32, ppqn: u16) -> Result<f64> {
    if ppqn == 0 {
        return Err(CodecError::InvalidResolution);
    }
    Ok((tempo as f64 * delta_ticks as f64) / ppqn as f64 / 1000.0)
}

/// Convert milliseconds into a tick delta, truncating towards zero
pub fn ms_to_ticks(ms: f64, tempo: u32, ppqn: u16) -> Result<u32> {
    if tempo == 0 {
        return Err(CodecError::InvalidTempo(tempo));
    }
    if ppqn == 0 {
        return Err(CodecError::InvalidResolution);
    }
    // `as` saturates: negative and NaN land on 0, huge values on u32::MAX
    Ok(((ms * 1000.0 * ppqn as f64) / tempo as f64) as u32)
}

/// Milliseconds covered by a single tick
pub fn ms_per_tick(tempo: u32, ppqn: u16) -> Result<f64> {
    if ppqn == 0 {
        return Err(CodecError::InvalidResolution);
    }
    Ok(tempo as f64 / ppqn as f64 / 1000.0)
}

/// Ticks elapsing in one millisecond
pub fn ticks_per_ms(tempo: u32, ppqn: u16) -> Result<f64> {
    if tempo == 0 {
        return Err(CodecError::InvalidTempo(tempo));
    }
    Ok(1.0 / ms_per_tick(tempo, ppqn)?)
}

/// Decode the big-endian 24-bit payload of a SetTempo event
pub fn tempo_from_bytes(bytes: [u8; 3]) -> u32 {
    u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]])
}

/// Encode a tempo as the 24-bit payload of a SetTempo event
pub fn tempo_to_bytes(tempo: u32) -> Result<[u8; 3]> {
    if tempo > MAX_TEMPO {
        return Err(CodecError::InvalidTempo(tempo));
    }
    let [_, hi, mid, lo] = tempo.to_be_bytes();
    Ok([hi, mid, lo])
}

/// Beats per minute for display
pub fn bpm(tempo: u32) -> f64 {
    if tempo == 0 {
        return 0.0;
    }
    60_000_000.0 / tempo as f64
}
