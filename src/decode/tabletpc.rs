//! TabletPC ISD-V4: 9-byte position packets and an 11-byte query reply.

use super::{Decode, DecodeCtx, StylusDelta};
use crate::error::{Result, TmError};
use crate::stylus::ButtonMask;
use crate::wire::*;

#[derive(Clone, Copy, Debug)]
pub struct TabletPc;

impl Decode for TabletPc {
    fn decode(&self, b: &[u8], _ctx: &mut DecodeCtx<'_>) -> Result<StylusDelta> {
        if b.len() == TPC_QUERY_REPLY_SIZE {
            // Caller routes query replies separately via `decode_query`; treat
            // an 11-byte buffer reaching here as a framing mistake.
            return Err(TmError::ProtocolDesync("query reply handed to position decoder"));
        }
        if b.len() < 9 {
            return Err(TmError::ShortPacket { expected: 9, got: b.len() });
        }
        let mut delta = StylusDelta::default();

        let x = (i32::from(b[1]) << 9) | (i32::from(b[2]) << 2) | i32::from((b[6] & TPC_MASK6_X) >> 5);
        let y = (i32::from(b[3]) << 9) | (i32::from(b[4]) << 2) | i32::from((b[6] & TPC_MASK6_Y) >> 3);
        delta.point = Some((x, y));

        let proximity = b[0] & TPC_MASK0_PROXIMITY != 0;
        delta.proximity = Some(proximity);

        let eraser = b[0] & TPC_MASK0_ERASER != 0;
        delta.eraser = Some(eraser);

        let pressure_hi = u16::from(b[6] & TPC_MASK6_PRESSURE_HI);
        let pressure_lo = u16::from(b[5] & TPC_MASK5_PRESSURE_LO);
        let raw = (pressure_hi << 7) | pressure_lo;
        delta.raw_pressure = Some(raw);
        let pressure = if raw <= TPC_PRESSURE_DEADZONE {
            0
        } else {
            (((f32::from(raw - TPC_PRESSURE_DEADZONE)) / 255.0) * PRESSURE_SCALE) as u16
        };
        delta.pressure = Some(pressure);

        let mut buttons = ButtonMask::empty();
        if b[0] & TPC_MASK0_TOUCH != 0 {
            buttons |= ButtonMask::TIP;
        }
        if b[0] & TPC_MASK0_SWITCH1 != 0 {
            buttons |= ButtonMask::SIDE1;
        }
        if eraser {
            buttons |= ButtonMask::ERASER;
        }
        delta.buttons = Some(buttons);

        Ok(delta)
    }
}

/// Decoded contents of the 11-byte query reply, used once at probe time to
/// learn the tablet's maximum coordinates and firmware version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TabletPcQueryReply {
    pub max_x: i32,
    pub max_y: i32,
    pub firmware_major: u8,
    pub firmware_minor: u8,
}

pub fn decode_query(b: &[u8]) -> Result<TabletPcQueryReply> {
    if b.len() < TPC_QUERY_REPLY_SIZE {
        return Err(TmError::ShortPacket { expected: TPC_QUERY_REPLY_SIZE, got: b.len() });
    }
    let max_x =
        (i32::from(b[1]) << 9) | (i32::from(b[2]) << 2) | i32::from((b[6] & TPC_QUERY6_X) >> 5);
    let max_y =
        (i32::from(b[3]) << 9) | (i32::from(b[4]) << 2) | i32::from((b[6] & TPC_QUERY6_Y) >> 3);
    Ok(TabletPcQueryReply {
        max_x,
        max_y,
        firmware_major: b[9] & 0x7F,
        firmware_minor: b[10] & 0x7F,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::stylus::StylusState;

    #[test]
    fn eraser_bit_tags_tool_as_eraser() {
        let settings = Settings::default();
        let previous = StylusState::default();
        let mut sd = 0u8;
        let mut latch = false;
        let mut ctx = DecodeCtx {
            previous: &previous,
            settings: &settings,
            sd_prev_raw_pressure: &mut sd,
            eraser_latch: &mut latch,
        };
        let b0 = TPC_MASK0_PROXIMITY | TPC_MASK0_ERASER;
        let bytes = [b0, 0, 0, 0, 0, 0, 0, 0, 0];
        let delta = TabletPc.decode(&bytes, &mut ctx).unwrap();
        assert_eq!(delta.eraser, Some(true));
        assert!(delta.buttons.unwrap().contains(ButtonMask::ERASER));
        assert_eq!(delta.proximity, Some(true));
    }
}
