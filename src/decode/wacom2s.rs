//! Wacom II-S: 7-byte binary packets and comma-separated ASCII lines.

use super::{Decode, DecodeCtx, StylusDelta};
use crate::error::{Result, TmError};
use crate::stylus::ButtonMask;
use crate::wire::*;

#[derive(Clone, Copy, Debug)]
pub struct WacomIIsBinary;

impl Decode for WacomIIsBinary {
    fn decode(&self, b: &[u8], ctx: &mut DecodeCtx<'_>) -> Result<StylusDelta> {
        if b.len() < 7 {
            return Err(TmError::ShortPacket { expected: 7, got: b.len() });
        }
        let mut delta = StylusDelta::default();

        let x = (i32::from(b[0] & 0x03) << 14) | (i32::from(b[1]) << 7) | i32::from(b[2]);
        let y = (i32::from(b[3] & 0x03) << 14) | (i32::from(b[4]) << 7) | i32::from(b[5]);
        delta.point = Some((x, y));

        let proximity = b[0] & IIS_MASK0_PROXIMITY != 0;
        let off_tablet = b[0] & IIS_MASK0_ENGAGED == IIS_DISENGAGED;
        delta.proximity = Some(proximity && !off_tablet);

        if proximity && !*ctx.eraser_latch {
            // First packet after proximity decides whether this contact is
            // the eraser nib; sticky until proximity is lost.
            *ctx.eraser_latch = b[6] & IIS_MASK6_ERASER_OR_2 != 0;
        }
        if off_tablet {
            *ctx.eraser_latch = false;
        }
        delta.eraser = Some(*ctx.eraser_latch);

        let is_sd = matches!(ctx.settings.command_set, crate::settings::CommandSet::BitpadII);
        if is_sd {
            // SD-series discrete pressure levels with an undocumented
            // hysteresis quirk: 0x22 following 0x00 means "higher still."
            let raw = b[6] & (IIS_MASK6_PRESSURE_LO | IIS_MASK6_PRESSURE_HI);
            let level = match (raw, *ctx.sd_prev_raw_pressure) {
                (0x00, 0x22) => 2u16,
                (0x22, _) => 1,
                (0x23, _) => 2,
                _ => 0,
            };
            *ctx.sd_prev_raw_pressure = raw;
            delta.raw_pressure = Some(level);
            delta.pressure = Some(level * (u16::MAX / 2));
        } else if b[0] & IIS_MASK0_PRESSURE != 0 {
            let raw_lo = b[6] & IIS_MASK6_PRESSURE_LO;
            let raw_hi = u8::from(b[6] & IIS_MASK6_PRESSURE_HI != 0);
            let raw = u16::from(raw_lo) | (u16::from(raw_hi) << 6);
            delta.raw_pressure = Some(raw);
            delta.pressure = Some(((f32::from(raw) / 127.0) * PRESSURE_SCALE) as u16);
        } else if b[6] & IIS_MASK6_BUTTON_FLAG != 0 {
            delta.pressure = Some(u16::MAX);
        } else {
            delta.pressure = Some(0);
        }

        let mut buttons = ButtonMask::empty();
        if b[6] & IIS_MASK6_ERASER_OR_TIP != 0 {
            buttons |= ButtonMask::TIP;
        }
        if b[6] & IIS_MASK6_BUTTON1 != 0 {
            buttons |= ButtonMask::SIDE1;
        }
        if *ctx.eraser_latch && b[6] & IIS_MASK6_ERASER_OR_2 != 0 {
            buttons |= ButtonMask::ERASER;
        } else if b[6] & IIS_MASK6_ERASER_OR_2 != 0 {
            buttons |= ButtonMask::SIDE2;
        }
        delta.buttons = Some(buttons);

        Ok(delta)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct WacomIIsAscii;

impl Decode for WacomIIsAscii {
    fn decode(&self, b: &[u8], ctx: &mut DecodeCtx<'_>) -> Result<StylusDelta> {
        let line = std::str::from_utf8(b).map_err(|_| TmError::ProtocolDesync("non-utf8 ascii line"))?;
        let mut fields = line.trim().split(',');
        let kind = fields.next().ok_or(TmError::ProtocolDesync("empty ascii line"))?;
        let mut delta = StylusDelta::default();

        match kind {
            "#" | "!" => {
                let x: i32 = fields
                    .next()
                    .and_then(|s| s.parse().ok())
                    .ok_or(TmError::ProtocolDesync("bad x field"))?;
                let y: i32 = fields
                    .next()
                    .and_then(|s| s.parse().ok())
                    .ok_or(TmError::ProtocolDesync("bad y field"))?;
                let last: i32 = fields
                    .next()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);

                let (mut tx, mut ty) = (x, y);
                if matches!(ctx.settings.coordsys, crate::settings::CoordSys::Relative) {
                    tx = ctx.previous.point.0 + x;
                    ty = if matches!(ctx.settings.origin, crate::settings::Origin::LowerLeft) {
                        ctx.previous.point.1 - y
                    } else {
                        ctx.previous.point.1 + y
                    };
                }
                delta.point = Some((tx, ty));
                delta.proximity = Some(true);

                if kind == "#" {
                    let mut buttons = ButtonMask::empty();
                    if last & 1 != 0 {
                        buttons |= ButtonMask::TIP;
                    }
                    if last & 2 != 0 {
                        buttons |= ButtonMask::SIDE1;
                    }
                    delta.buttons = Some(buttons);
                    delta.pressure = Some(if last != 0 { u16::MAX } else { 0 });
                } else {
                    let pressure = last.clamp(0, 127) as u16;
                    delta.raw_pressure = Some(pressure);
                    delta.pressure = Some(((f32::from(pressure) / 127.0) * PRESSURE_SCALE) as u16);
                }
            }
            "*" => {
                // Puck packets: position only, no pressure semantics yet handled.
                delta.proximity = Some(true);
            }
            _ => return Err(TmError::ProtocolDesync("unrecognized ascii line kind")),
        }

        Ok(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::stylus::StylusState;

    #[test]
    fn binary_tip_down_decodes_position_and_button() {
        let settings = Settings::default();
        let previous = StylusState::default();
        let mut sd_prev = 0u8;
        let mut latch = false;
        let mut ctx = DecodeCtx {
            previous: &previous,
            settings: &settings,
            sd_prev_raw_pressure: &mut sd_prev,
            eraser_latch: &mut latch,
        };
        // proximity set, engaged, tip down, no pressure-mode bit.
        let bytes = [0x40 | 0x20, 0x10, 0x20, 0x00, 0x11, 0x00, 0x01];
        let delta = WacomIIsBinary.decode(&bytes, &mut ctx).unwrap();
        assert_eq!(delta.proximity, Some(true));
        assert!(delta.buttons.unwrap().contains(ButtonMask::TIP));
    }
}
