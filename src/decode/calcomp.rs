//! CalComp/BitPad-II compatible packets: 7 bytes, shaped like Wacom II-S but
//! with CalComp's own field widths (a 3-bit Y-high nibble, an 8-bit pressure
//! byte rather than a 6+1 split).

use super::{Decode, DecodeCtx, StylusDelta};
use crate::error::{Result, TmError};
use crate::stylus::ButtonMask;
use crate::wire::*;

#[derive(Clone, Copy, Debug)]
pub struct CalComp;

impl Decode for CalComp {
    fn decode(&self, b: &[u8], ctx: &mut DecodeCtx<'_>) -> Result<StylusDelta> {
        if b.len() < 7 {
            return Err(TmError::ShortPacket { expected: 7, got: b.len() });
        }
        let mut delta = StylusDelta::default();

        let x = (i32::from(b[0] & 0x03) << 14) | (i32::from(b[1]) << 7) | i32::from(b[2]);
        let y = (i32::from((b[3] & CAL_MASK3_Y_HIGH) >> 3) << 14)
            | (i32::from(b[4]) << 7)
            | i32::from(b[5]);
        delta.point = Some((x, y));

        let proximity = b[0] & CAL_MASK0_PROXIMITY != 0;
        let off_tablet = b[0] & CAL_MASK0_ENGAGED == 0;
        delta.proximity = Some(proximity && !off_tablet);

        if proximity && !*ctx.eraser_latch {
            *ctx.eraser_latch = b[0] & CAL_MASK0_STYLUS == 0;
        }
        if off_tablet {
            *ctx.eraser_latch = false;
        }
        delta.eraser = Some(*ctx.eraser_latch);

        let raw = u16::from(b[6] & CAL_MASK6_PRESSURE);
        delta.raw_pressure = Some(raw);
        delta.pressure = Some(((f32::from(raw) / 255.0) * PRESSURE_SCALE) as u16);

        let mut buttons = ButtonMask::empty();
        if b[6] & CAL_MASK6_ERASER != 0 {
            if *ctx.eraser_latch {
                buttons |= ButtonMask::ERASER;
            } else {
                buttons |= ButtonMask::TIP;
            }
        }
        if b[6] & CAL_MASK6_BUTTON1 != 0 {
            buttons |= ButtonMask::SIDE1;
        }
        delta.buttons = Some(buttons);

        Ok(delta)
    }
}
