//! Graphire: a Wacom-IV-like framing with a dedicated tool-type byte, 10-bit
//! pressure, and a separate mouse wheel/button path.

use super::{Decode, DecodeCtx, StylusDelta};
use crate::error::{Result, TmError};
use crate::stylus::{ButtonMask, ToolType};

#[derive(Clone, Copy, Debug)]
pub struct Graphire;

impl Decode for Graphire {
    fn decode(&self, b: &[u8], ctx: &mut DecodeCtx<'_>) -> Result<StylusDelta> {
        if b.len() < 7 {
            return Err(TmError::ShortPacket { expected: 7, got: b.len() });
        }
        let mut delta = StylusDelta::default();

        let x = (i32::from(b[0] & 0x03) << 14) | (i32::from(b[1]) << 7) | i32::from(b[2]);
        let y = (i32::from(b[3] & 0x03) << 14) | (i32::from(b[4]) << 7) | i32::from(b[5]);
        delta.point = Some((x, y));

        let tool_bits = (b[1] >> 5) & 0x03;
        delta.tool_type = Some(match tool_bits {
            0 => ToolType::Pen,
            1 => ToolType::Eraser,
            2 => ToolType::Mouse2D,
            _ => ToolType::None,
        });

        let engaged = b[0] & 0x40 != 0;
        delta.proximity = Some(engaged);
        if !engaged {
            *ctx.eraser_latch = false;
        } else {
            *ctx.eraser_latch = tool_bits == 1;
        }
        delta.eraser = Some(*ctx.eraser_latch);

        let raw = u16::from(b[6] & 0x3F) | (u16::from(b[3] & 0x04 != 0) << 6);
        delta.raw_pressure = Some(raw);
        delta.pressure = Some(((f32::from(raw) / 1023.0) * crate::wire::PRESSURE_SCALE) as u16);

        let mut buttons = ButtonMask::empty();
        if b[6] & 0x01 != 0 {
            buttons |= ButtonMask::TIP;
        }
        if b[6] & 0x02 != 0 {
            buttons |= ButtonMask::SIDE1;
        }
        delta.buttons = Some(buttons);
        delta.wheel = Some(i16::from(b[6] & 0x80 != 0) - i16::from(b[6] & 0x40 != 0));

        Ok(delta)
    }
}
