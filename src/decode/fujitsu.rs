//! Fujitsu P-Series: 5-byte fixed-point packets, tip button only, a fixed
//! 1024x768 output range.

use super::{Decode, DecodeCtx, StylusDelta};
use crate::error::{Result, TmError};
use crate::stylus::ButtonMask;

pub const FUJITSU_OUTPUT_WIDTH: i32 = 1024;
pub const FUJITSU_OUTPUT_HEIGHT: i32 = 768;

#[derive(Clone, Copy, Debug)]
pub struct FujitsuP;

impl Decode for FujitsuP {
    fn decode(&self, b: &[u8], _ctx: &mut DecodeCtx<'_>) -> Result<StylusDelta> {
        if b.len() < 5 {
            return Err(TmError::ShortPacket { expected: 5, got: b.len() });
        }
        let mut delta = StylusDelta::default();

        let x_fixed = (u16::from(b[1]) << 8) | u16::from(b[2]);
        let y_fixed = (u16::from(b[3]) << 8) | u16::from(b[4]);
        let x = (i32::from(x_fixed) * FUJITSU_OUTPUT_WIDTH) / i32::from(u16::MAX);
        let y = (i32::from(y_fixed) * FUJITSU_OUTPUT_HEIGHT) / i32::from(u16::MAX);
        delta.point = Some((x, y));
        delta.proximity = Some(true);

        let mut buttons = ButtonMask::empty();
        if b[0] & 0x01 != 0 {
            buttons |= ButtonMask::TIP;
        }
        delta.buttons = Some(buttons);
        delta.pressure = Some(if b[0] & 0x01 != 0 { u16::MAX } else { 0 });

        Ok(delta)
    }
}
