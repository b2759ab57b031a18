//! Conversions between MIDI data bytes and the float domain the DSP runs in.

const PITCH_BEND_CENTER: i32 = 8192;
const PITCH_BEND_MAX_UP: f32 = 8191.0;
const PITCH_BEND_MAX_DOWN: f32 = 8192.0;

/// Equal-tempered frequency for a (possibly fractional) MIDI note, A4 = 440 Hz.
pub fn midi_note_to_freq(note: f32) -> f32 {
    440.0 * 2.0_f32.powf((note - 69.0) / 12.0)
}

/// Combine the two 7-bit pitch bend bytes into [-1, 1], centre 0.
///
/// The 14-bit range is asymmetric (8192 steps down, 8191 up), so each side is
/// scaled separately and both extremes land exactly on ±1.
pub fn pitch_bend_from_data(lsb: u8, msb: u8) -> f32 {
    let raw = (((msb & 0x7F) as i32) << 7 | (lsb & 0x7F) as i32) - PITCH_BEND_CENTER;
    let value = if raw >= 0 {
        raw as f32 / PITCH_BEND_MAX_UP
    } else {
        raw as f32 / PITCH_BEND_MAX_DOWN
    };
    value.clamp(-1.0, 1.0)
}

/// Inverse of [`pitch_bend_from_data`]: returns `(lsb, msb)`.
pub fn pitch_bend_to_data(value: f32) -> (u8, u8) {
    let value = if value.is_finite() { value.clamp(-1.0, 1.0) } else { 0.0 };
    let offset = if value >= 0.0 {
        (value * PITCH_BEND_MAX_UP).round() as i32
    } else {
        (value * PITCH_BEND_MAX_DOWN).round() as i32
    };
    let raw = (offset + PITCH_BEND_CENTER).clamp(0, 0x3FFF);
    ((raw & 0x7F) as u8, ((raw >> 7) & 0x7F) as u8)
}

/// MIDI velocity (0-127) to a linear gain in [0, 1].
pub fn velocity_to_gain(velocity: u8) -> f32 {
    velocity.min(127) as f32 / 127.0
}

pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Frequency ratio for a detune in cents.
pub fn cents_to_ratio(cents: f32) -> f32 {
    2.0_f32.powf(cents / 1200.0)
}
