//! Wacom IV: 7-byte (r1.3, no tilt) or 9-byte (r1.4, with tilt) packets.

use super::{Decode, DecodeCtx, StylusDelta};
use crate::error::{Result, TmError};
use crate::stylus::ButtonMask;
use crate::wire::*;

fn decode_common(b: &[u8], ctx: &mut DecodeCtx<'_>) -> StylusDelta {
    let mut delta = StylusDelta::default();

    let x = (i32::from(b[0] & 0x03) << 14) | (i32::from(b[1]) << 7) | i32::from(b[2]);
    let y = (i32::from(b[3] & 0x03) << 14) | (i32::from(b[4]) << 7) | i32::from(b[5]);
    delta.point = Some((x, y));

    let engaged = b[0] & IV_MASK0_ENGAGEMENT != IV_DISENGAGED_OR_MENU;
    delta.proximity = Some(engaged);
    if !engaged {
        *ctx.eraser_latch = false;
    } else if !*ctx.eraser_latch {
        *ctx.eraser_latch = b[0] & IV_MASK0_STYLUS == 0;
    }
    delta.eraser = Some(*ctx.eraser_latch);

    let pressure_bit0 = b[3] & IV_MASK3_PRESSURE0 != 0;
    let pressure_lo = b[6] & IV_MASK6_PRESSURE_LO;
    let pressure_hi = u8::from(b[6] & IV_MASK6_PRESSURE_HI != 0);
    let raw = u16::from(pressure_lo) | (u16::from(pressure_hi) << 6) | (u16::from(pressure_bit0) << 7);
    delta.raw_pressure = Some(raw);
    delta.pressure = Some(((f32::from(raw) / 255.0) * PRESSURE_SCALE) as u16);

    let mut buttons = ButtonMask::empty();
    let raw_buttons = (b[3] & IV_MASK3_BUTTONS) >> 3;
    if raw_buttons & 0x1 != 0 {
        buttons |= ButtonMask::TIP;
    }
    if raw_buttons & 0x2 != 0 {
        buttons |= ButtonMask::SIDE1;
    }
    if raw_buttons & 0x4 != 0 {
        if *ctx.eraser_latch {
            buttons |= ButtonMask::ERASER;
        } else {
            buttons |= ButtonMask::SIDE2;
        }
    }
    if b[0] & IV_MASK0_BUTTON_FLAG != 0 {
        buttons |= ButtonMask::TIP;
    }
    delta.buttons = Some(buttons);

    delta
}

fn decode_tilt(b: &[u8]) -> (i16, i16) {
    let tx_raw = i16::from(b[7] & IV_MASK7_TILT);
    let tx_sign = b[7] & IV_MASK7_TILT_BASE != 0;
    let ty_raw = i16::from(b[8] & IV_MASK8_TILT);
    let ty_sign = b[8] & IV_MASK8_TILT_BASE != 0;
    let tx = if tx_sign { -tx_raw } else { tx_raw };
    let ty = if ty_sign { -ty_raw } else { ty_raw };
    (
        ((f32::from(tx) / 63.0) * TILT_SCALE) as i16,
        ((f32::from(ty) / 63.0) * TILT_SCALE) as i16,
    )
}

#[derive(Clone, Copy, Debug)]
pub struct WacomIv13;

impl Decode for WacomIv13 {
    fn decode(&self, b: &[u8], ctx: &mut DecodeCtx<'_>) -> Result<StylusDelta> {
        if b.len() < 7 {
            return Err(TmError::ShortPacket { expected: 7, got: b.len() });
        }
        Ok(decode_common(b, ctx))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct WacomIv14;

impl Decode for WacomIv14 {
    fn decode(&self, b: &[u8], ctx: &mut DecodeCtx<'_>) -> Result<StylusDelta> {
        if b.len() < 9 {
            return Err(TmError::ShortPacket { expected: 9, got: b.len() });
        }
        let mut delta = decode_common(b, ctx);
        delta.tilt = Some(decode_tilt(b));
        Ok(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::stylus::StylusState;

    fn fresh_ctx(settings: &Settings, previous: &StylusState, sd_prev: &mut u8, latch: &mut bool) -> DecodeCtx<'_> {
        DecodeCtx { previous, settings, sd_prev_raw_pressure: sd_prev, eraser_latch: latch }
    }

    // The b0 top bits here (0xA0 & 0x60 = 0x20) equal IV_DISENGAGED_OR_MENU,
    // so this packet decodes as out-of-proximity even though b0's high bit
    // is set; only the position fields are meaningful while disengaged.
    #[test]
    fn literal_scenario_bytes_decode_as_disengaged() {
        let settings = Settings::default();
        let previous = StylusState::default();
        let mut sd_prev = 0u8;
        let mut latch = false;
        let mut ctx = fresh_ctx(&settings, &previous, &mut sd_prev, &mut latch);
        let bytes = [0xA0, 0x10, 0x20, 0x00, 0x11, 0x00, 0x3F, 0x00, 0x00];
        let delta = WacomIv14.decode(&bytes, &mut ctx).unwrap();
        assert_eq!(delta.point, Some((0x10 << 7 | 0x20, 0x11 << 7)));
        assert!(!delta.proximity.unwrap());
        assert!(!delta.buttons.unwrap().contains(ButtonMask::TIP));
    }

    #[test]
    fn tip_down_with_tilt_when_engaged() {
        let settings = Settings::default();
        let previous = StylusState::default();
        let mut sd_prev = 0u8;
        let mut latch = false;
        let mut ctx = fresh_ctx(&settings, &previous, &mut sd_prev, &mut latch);
        // b0 engaged (top bits != DISENGAGED_OR_MENU), tip bit set via b0's button flag.
        let bytes = [0x08, 0x10, 0x20, 0x00, 0x11, 0x00, 0x3F, 0x00, 0x00];
        let delta = WacomIv14.decode(&bytes, &mut ctx).unwrap();
        assert_eq!(delta.point, Some((0x10 << 7 | 0x20, 0x11 << 7)));
        assert!(delta.proximity.unwrap());
        assert_eq!(delta.tilt, Some((0, 0)));
        assert!(delta.buttons.unwrap().contains(ButtonMask::TIP));
    }
}
