//! Wacom V (Intuos-generation): 9-byte packets, classified by masking byte 0.

use super::{Decode, DecodeCtx, StylusDelta};
use crate::error::{Result, TmError};
use crate::stylus::{tool_type_for_id, ButtonMask, ToolType};
use crate::wire::*;

#[derive(Clone, Copy, Debug)]
pub struct WacomV;

fn decode_tilt(b: &[u8]) -> (i16, i16) {
    let tx_raw = i16::from(b[7] & V_MASK7_TILT_X);
    let tx_sign = b[7] & V_MASK7_TILT_X_BASE != 0;
    let ty_raw = i16::from(b[8] & V_MASK8_TILT_Y);
    let ty_sign = b[8] & V_MASK8_TILT_Y_BASE != 0;
    let tx = if tx_sign { -tx_raw } else { tx_raw };
    let ty = if ty_sign { -ty_raw } else { ty_raw };
    (
        ((f32::from(tx) / 63.0) * TILT_SCALE) as i16,
        ((f32::from(ty) / 63.0) * TILT_SCALE) as i16,
    )
}

impl Decode for WacomV {
    fn decode(&self, b: &[u8], _ctx: &mut DecodeCtx<'_>) -> Result<StylusDelta> {
        if b.len() < 9 {
            return Err(TmError::ShortPacket { expected: 9, got: b.len() });
        }
        let mut delta = StylusDelta::default();
        let b0 = b[0];

        if (V_PKT_TOOL_ID_LO..=V_PKT_TOOL_ID_HI).contains(&b0) {
            let id = (u16::from(b[1] & V_MASK1_TOOL_HI) << 5) | (u16::from(b[2] & V_MASK2_TOOL_LO) >> 2);
            let serial = (u64::from(b[2] & 0x03) << 38)
                | (u64::from(b[3]) << 31)
                | (u64::from(b[4]) << 24)
                | (u64::from(b[5]) << 17)
                | (u64::from(b[6]) << 10)
                | (u64::from(b[7]) << 3)
                | u64::from(b[8] >> 4);
            delta.tool_id = Some(id);
            delta.serial = Some(serial);
            delta.tool_type = Some(tool_type_for_id(id));
            delta.proximity = Some(true);
            return Ok(delta);
        }

        if (V_PKT_DISENGAGE_LO..=V_PKT_DISENGAGE_HI).contains(&b0) {
            delta.proximity = Some(false);
            delta.pressure = Some(0);
            delta.wheel = Some(0);
            delta.rotation = Some(0);
            delta.throttle = Some(0);
            delta.buttons = Some(ButtonMask::empty());
            return Ok(delta);
        }

        let x = (i32::from(b[1]) << 9) | (i32::from(b[2]) << 2) | i32::from((b[6] >> 6) & 0x03);
        let y = (i32::from(b[3]) << 9) | (i32::from(b[4]) << 2) | i32::from((b[6] >> 4) & 0x03);
        delta.point = Some((x, y));
        delta.proximity = Some(true);

        let is_airbrush_wheel = matches!(b0, 0xB4..=0xB5 | 0xF4..=0xF5);
        let is_stylus_pressure = matches!(b0, 0xA0..=0xA7 | 0xE0..=0xE7);
        let is_mouse_pos = matches!(b0, 0xA8..=0xA9 | 0xE8..=0xE9 | 0xB0..=0xB1 | 0xF0..=0xF1);
        let is_rotation_follow = matches!(b0, 0xAA..=0xAB | 0xEA..=0xEB);

        if is_stylus_pressure {
            let hi = u16::from(b[5] & V_MASK5_PRESSURE_HI);
            let lo = u16::from(b[6] & V_MASK6_PRESSURE_LO);
            let raw = (hi << 7) | lo;
            delta.raw_pressure = Some(raw);
            delta.pressure = Some(((f32::from(raw) / 1023.0) * PRESSURE_SCALE) as u16);
            delta.tilt = Some(decode_tilt(b));

            let mut buttons = ButtonMask::empty();
            if raw > 8 {
                buttons |= ButtonMask::TIP;
            }
            if b[0] & V_MASK0_BUTTON1 != 0 {
                buttons |= ButtonMask::SIDE1;
            }
            if b[0] & V_MASK0_BUTTON2 != 0 {
                buttons |= ButtonMask::SIDE2;
            }
            delta.buttons = Some(buttons);
        } else if is_airbrush_wheel {
            let wheel = (i16::from(b[5] & 0x7F) << 3) | i16::from(b[6] >> 5);
            delta.wheel = Some(wheel);
            delta.tilt = Some(decode_tilt(b));
        } else if is_mouse_pos {
            let mut buttons = ButtonMask::empty();
            if b[8] & 0x01 != 0 {
                buttons |= ButtonMask::TIP;
            }
            if b[8] & 0x02 != 0 {
                buttons |= ButtonMask::SIDE1;
            }
            if b[8] & 0x04 != 0 {
                buttons |= ButtonMask::SIDE2;
            }
            delta.buttons = Some(buttons);
            delta.throttle = Some(i16::from(b[6] & 0x3F));
            delta.wheel = Some(i16::from(b[8] & V_MASK8_LENS_BUTTONS));
        } else if is_rotation_follow {
            let rotation = (i16::from(b[6] & 0x7F) << 2) | i16::from(b[7] >> 6);
            delta.rotation = Some(rotation);
        } else {
            return Err(TmError::ProtocolDesync("unrecognized wacom v packet type"));
        }

        Ok(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::stylus::StylusState;

    fn ctx<'a>(
        previous: &'a StylusState,
        settings: &'a Settings,
        sd: &'a mut u8,
        latch: &'a mut bool,
    ) -> DecodeCtx<'a> {
        DecodeCtx { previous, settings, sd_prev_raw_pressure: sd, eraser_latch: latch }
    }

    #[test]
    fn tool_id_packet_identifies_pen() {
        let settings = Settings::default();
        let previous = StylusState::default();
        let mut sd = 0u8;
        let mut latch = false;
        let mut c = ctx(&previous, &settings, &mut sd, &mut latch);
        // b0 in tool-id range; id bits arranged so the decoded id == TOOL_ID_PEN.
        let id = TOOL_ID_PEN;
        let b1 = ((id >> 5) & 0x7F) as u8;
        let b2 = (((id & 0x1F) << 2) as u8) & V_MASK2_TOOL_LO;
        let bytes = [0xC2, b1, b2, 0, 0, 0, 0, 0, 0];
        let delta = WacomV.decode(&bytes, &mut c).unwrap();
        assert_eq!(delta.tool_type, Some(ToolType::Pen));
    }
}
