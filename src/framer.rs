//! Reassembles the raw byte stream into binary packets, ASCII data lines,
//! and command replies.

use crate::decode::Dialect;
use crate::settings::{CommandSet, OutputFormat, Settings};

/// Fujitsu P-Series frames a packet on any byte greater than this, rather
/// than the high-bit-set rule every other dialect uses.
const FUJITSU_START_THRESHOLD: u8 = 130;
const FUJITSU_PACKET_SIZE: usize = 5;

/// A framer parameter snapshot computed fresh each tick from `Settings`, so
/// a mid-stream reconfiguration takes effect cleanly at the next tick
/// boundary rather than being read off mutable shared state mid-packet.
#[derive(Clone, Copy, Debug)]
pub struct FrameParams {
    pub packet_size: usize,
    pub ascii: bool,
    pub fujitsu: bool,
    pub tabletpc: bool,
}

impl FrameParams {
    #[must_use]
    pub fn from_settings(settings: &Settings, dialect: &Dialect) -> Self {
        Self {
            packet_size: settings.packet_size(),
            ascii: matches!(settings.output_format, OutputFormat::Ascii)
                && matches!(settings.command_set, CommandSet::WacomIIs),
            fujitsu: matches!(dialect, Dialect::FujitsuP(_)),
            tabletpc: matches!(settings.command_set, CommandSet::TabletPc),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    BinaryPacket(Vec<u8>),
    AsciiDataPacket(Vec<u8>),
    CommandReply(Vec<u8>),
}

#[derive(Default)]
pub struct Framer {
    binary_buf: Vec<u8>,
    line_buf: Vec<u8>,
    comma_count: u32,
}

impl Framer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards any in-flight accumulator. Called explicitly on every
    /// `setup`/`reinit` control command rather than relying on framing
    /// heuristics to recover from a mid-stream protocol switch.
    pub fn drain(&mut self) {
        self.binary_buf.clear();
        self.line_buf.clear();
        self.comma_count = 0;
    }

    /// Feed one byte at a time, draining completed frames into `out`.
    pub fn feed(&mut self, byte: u8, params: &FrameParams, out: &mut Vec<Frame>) {
        if params.fujitsu {
            self.feed_fujitsu(byte, out);
            return;
        }

        if byte & 0x80 != 0 {
            if !self.binary_buf.is_empty() {
                // A fresh start byte arrived before the prior packet completed;
                // the incomplete accumulator is simply dropped.
                self.binary_buf.clear();
            }
            self.binary_buf.push(byte);
            self.line_buf.clear();
            self.comma_count = 0;
            return;
        }

        if !self.binary_buf.is_empty() {
            self.binary_buf.push(byte);
            let expected = if params.tabletpc && self.binary_buf[0] & crate::wire::TPC_MASK0_QUERY_DATA != 0 {
                crate::wire::TPC_QUERY_REPLY_SIZE
            } else {
                params.packet_size
            };
            if self.binary_buf.len() >= expected {
                let packet = std::mem::take(&mut self.binary_buf);
                out.push(Frame::BinaryPacket(packet));
            }
            return;
        }

        // Not in a binary packet: normalize line terminators and accumulate
        // either an ASCII data line or a command reply line.
        match byte {
            b'\n' => self.terminate_line(out),
            b'\r' => {
                if self.line_buf.is_empty() {
                    // leading \r is ignored.
                } else {
                    self.terminate_line(out);
                }
            }
            b',' => {
                self.line_buf.push(byte);
                self.comma_count += 1;
                // SD-series answers the ID query with a comma-terminated
                // line rather than \r; the third comma ends it.
                if self.comma_count >= 3 {
                    self.terminate_line(out);
                }
            }
            _ => self.line_buf.push(byte),
        }
    }

    /// Fujitsu P-Series framing: any byte over 130 opens a packet (not the
    /// high-bit rule every other dialect uses), and packets are always
    /// exactly 5 bytes.
    fn feed_fujitsu(&mut self, byte: u8, out: &mut Vec<Frame>) {
        if byte > FUJITSU_START_THRESHOLD {
            if !self.binary_buf.is_empty() {
                self.binary_buf.clear();
            }
            self.binary_buf.push(byte);
            return;
        }
        if self.binary_buf.is_empty() {
            return;
        }
        self.binary_buf.push(byte);
        if self.binary_buf.len() >= FUJITSU_PACKET_SIZE {
            let packet = std::mem::take(&mut self.binary_buf);
            out.push(Frame::BinaryPacket(packet));
        }
    }

    fn terminate_line(&mut self, out: &mut Vec<Frame>) {
        if self.line_buf.is_empty() {
            return;
        }
        let line = std::mem::take(&mut self.line_buf);
        self.comma_count = 0;
        let frame = match line.first() {
            Some(b'#' | b'!' | b'*') => Frame::AsciiDataPacket(line),
            _ => Frame::CommandReply(line),
        };
        out.push(frame);
    }

    /// Feed a whole byte window at once, returning every completed frame.
    pub fn feed_all(&mut self, bytes: &[u8], params: &FrameParams) -> Vec<Frame> {
        let mut out = Vec::new();
        for &b in bytes {
            self.feed(b, params, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(packet_size: usize) -> FrameParams {
        FrameParams { packet_size, ascii: false, fujitsu: false, tabletpc: false }
    }

    #[test]
    fn binary_packet_completes_at_expected_length_without_next_start_byte() {
        let mut f = Framer::new();
        let frames = f.feed_all(&[0x80, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06], &params(7));
        assert_eq!(frames.len(), 1);
        assert!(matches!(&frames[0], Frame::BinaryPacket(p) if p.len() == 7));
    }

    #[test]
    fn new_start_byte_discards_incomplete_accumulator() {
        let mut f = Framer::new();
        let frames = f.feed_all(&[0x80, 0x01, 0x80, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06], &params(7));
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn command_reply_terminates_on_cr() {
        let mut f = Framer::new();
        let frames = f.feed_all(b"~#GD-0608-R00,V1.2-7\r", &params(7));
        assert_eq!(frames.len(), 1);
        assert!(matches!(&frames[0], Frame::CommandReply(_)));
    }

    #[test]
    fn ascii_data_line_is_distinguished_from_command_reply() {
        let mut f = Framer::new();
        let frames = f.feed_all(b"#,100,200,1\r", &params(7));
        assert_eq!(frames.len(), 1);
        assert!(matches!(&frames[0], Frame::AsciiDataPacket(_)));
    }

    #[test]
    fn crlf_collapses_to_one_terminator() {
        let mut f = Framer::new();
        let frames = f.feed_all(b"~R\r\n", &params(7));
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn drain_clears_in_flight_state() {
        let mut f = Framer::new();
        let _ = f.feed_all(&[0x80, 0x01, 0x02], &params(7));
        f.drain();
        let frames = f.feed_all(&[0x80, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06], &params(7));
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn fujitsu_framing_opens_on_byte_above_130_not_high_bit() {
        let mut f = Framer::new();
        let fujitsu_params = FrameParams { packet_size: 7, ascii: false, fujitsu: true, tabletpc: false };
        // 0x81 (129) is high-bit-set but below the 130 threshold, so it must
        // NOT open a packet; 0x83 (131) does.
        let frames = f.feed_all(&[0x81, 0x83, 0x01, 0x02, 0x03, 0x04], &fujitsu_params);
        assert_eq!(frames.len(), 1);
        assert!(matches!(&frames[0], Frame::BinaryPacket(p) if p.len() == 5));
    }

    #[test]
    fn fujitsu_framing_discards_incomplete_packet_on_new_start_byte() {
        let mut f = Framer::new();
        let fujitsu_params = FrameParams { packet_size: 7, ascii: false, fujitsu: true, tabletpc: false };
        let frames = f.feed_all(&[0x83, 0x01, 0x83, 0x01, 0x02, 0x03, 0x04], &fujitsu_params);
        assert_eq!(frames.len(), 1);
    }
}
