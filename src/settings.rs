//! The 32-bit packed settings word and its named sub-fields.

use crate::error::{Result, TmError};

macro_rules! bitfield_enum {
    ($name:ident, $repr:ty, { $($variant:ident = $value:expr),+ $(,)? }) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, strum::AsRefStr)]
        pub enum $name {
            $($variant),+
        }
        impl $name {
            #[must_use]
            pub const fn bits(self) -> $repr {
                match self {
                    $(Self::$variant => $value),+
                }
            }
            #[must_use]
            pub fn from_bits(bits: $repr) -> Option<Self> {
                match bits {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

bitfield_enum!(CommandSet, u8, {
    BitpadII = 0,
    Mm1201 = 1,
    WacomIIs = 2,
    WacomIv = 3,
    WacomV = 4,
    TabletPc = 5,
});

bitfield_enum!(BaudRate, u8, {
    B2400 = 0,
    B4800 = 1,
    B9600 = 2,
    B19200 = 3,
    B38400 = 4,
});

bitfield_enum!(Parity, u8, {
    None0 = 0,
    None1 = 1,
    Odd = 2,
    Even = 3,
});

bitfield_enum!(DataBits, u8, { Seven = 0, Eight = 1 });
bitfield_enum!(StopBits, u8, { One = 0, Two = 1 });

bitfield_enum!(TransferMode, u8, {
    Suppressed = 0,
    Point = 1,
    SwitchStream = 2,
    Stream = 3,
});

bitfield_enum!(OutputFormat, u8, { Binary = 0, Ascii = 1 });
bitfield_enum!(CoordSys, u8, { Absolute = 0, Relative = 1 });

bitfield_enum!(TransferRate, u8, {
    R50 = 0,
    R67 = 1,
    R100 = 2,
    RMax = 3,
    R200 = 4,
});

bitfield_enum!(Resolution, u8, {
    R500 = 0,
    R508 = 1,
    R1000 = 2,
    R1270 = 3,
    R2540 = 4,
});

bitfield_enum!(Origin, u8, { UpperLeft = 0, LowerLeft = 1 });

bitfield_enum!(Terminator, u8, {
    Cr = 0,
    Lf = 1,
    CrLf = 2,
    CrLf2 = 3,
});

/// The active settings plus whichever parts of the setup word govern wire
/// behavior directly.
///
/// `packet_size` is derived, not stored independently, per the invariant in
/// the decoder table: it is a pure function of command_set/output_format/tilt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub command_set: CommandSet,
    pub baud_rate: BaudRate,
    pub parity: Parity,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub cts: bool,
    pub dsr: bool,
    pub transfer_mode: TransferMode,
    pub output_format: OutputFormat,
    pub coordsys: CoordSys,
    pub transfer_rate: TransferRate,
    pub resolution: Resolution,
    pub origin: Origin,
    pub oor_data: bool,
    pub terminator: Terminator,
    pub pnp: bool,
    pub sensitivity_soft: bool,
    pub read_height_2mm: bool,
    pub mdm: bool,
    pub tilt: bool,
    pub mm_comm_961: bool,
    pub portrait: bool,
    pub cursor_data_1248: bool,
    pub remote_mode: bool,
    pub increment: i32,
    pub interval: i32,
    pub xrez: i32,
    pub yrez: i32,
    pub xscale: i32,
    pub yscale: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            command_set: CommandSet::WacomIIs,
            baud_rate: BaudRate::B9600,
            parity: Parity::None0,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            cts: false,
            dsr: false,
            transfer_mode: TransferMode::Stream,
            output_format: OutputFormat::Binary,
            coordsys: CoordSys::Absolute,
            transfer_rate: TransferRate::RMax,
            resolution: Resolution::R1270,
            origin: Origin::UpperLeft,
            oor_data: false,
            terminator: Terminator::Cr,
            pnp: false,
            sensitivity_soft: false,
            read_height_2mm: false,
            mdm: false,
            tilt: false,
            mm_comm_961: false,
            portrait: false,
            cursor_data_1248: false,
            remote_mode: false,
            increment: 0,
            interval: 0,
            xrez: 1270,
            yrez: 1270,
            xscale: crate::wire::INCHES_12_AT_1270_PPI,
            yscale: crate::wire::INCHES_12_AT_1270_PPI,
        }
    }
}

impl Settings {
    /// Length in bytes of a single decoded data packet under these settings.
    ///
    /// See §3 of the data model: a pure function of command_set, output
    /// format and whether tilt reporting is enabled.
    #[must_use]
    pub fn packet_size(&self) -> usize {
        match self.command_set {
            CommandSet::WacomIIs | CommandSet::BitpadII | CommandSet::Mm1201 => 7,
            CommandSet::WacomIv => {
                if self.tilt {
                    9
                } else {
                    7
                }
            }
            CommandSet::WacomV | CommandSet::TabletPc => 9,
        }
    }

    /// Pack the 25 sub-fields into the 32-bit setup word.
    #[must_use]
    pub fn to_bits(&self) -> u32 {
        let mut bits: u32 = 0;
        bits |= u32::from(self.command_set.bits()) << 30;
        bits |= u32::from(self.baud_rate.bits()) << 28;
        bits |= u32::from(self.parity.bits()) << 26;
        bits |= u32::from(self.data_bits.bits()) << 25;
        bits |= u32::from(self.stop_bits.bits()) << 24;
        bits |= u32::from(self.cts) << 23;
        bits |= u32::from(self.dsr) << 22;
        bits |= u32::from(self.transfer_mode.bits()) << 20;
        bits |= u32::from(self.output_format.bits()) << 19;
        bits |= u32::from(self.coordsys.bits()) << 18;
        bits |= u32::from(self.transfer_rate.bits()) << 16;
        bits |= u32::from(self.resolution.bits()) << 14;
        bits |= u32::from(self.origin.bits()) << 13;
        bits |= u32::from(self.oor_data) << 12;
        bits |= u32::from(self.terminator.bits()) << 10;
        bits |= u32::from(self.pnp) << 8;
        bits |= u32::from(self.sensitivity_soft) << 7;
        bits |= u32::from(self.read_height_2mm) << 6;
        bits |= u32::from(self.mdm) << 5;
        bits |= u32::from(self.tilt) << 4;
        bits |= u32::from(self.mm_comm_961) << 3;
        bits |= u32::from(self.portrait) << 2;
        bits |= u32::from(self.cursor_data_1248) << 1;
        bits |= u32::from(self.remote_mode);
        bits
    }

    /// Unpack the 32-bit setup word, preserving `increment`/`interval`/`xrez`/`yrez`.
    pub fn apply_bits(&mut self, bits: u32) -> Result<()> {
        self.command_set = CommandSet::from_bits(((bits >> 30) & 0x3) as u8)
            .ok_or(TmError::BadSettingsImport("command_set"))?;
        self.baud_rate = BaudRate::from_bits(((bits >> 28) & 0x3) as u8)
            .ok_or(TmError::BadSettingsImport("baud_rate"))?;
        self.parity = Parity::from_bits(((bits >> 26) & 0x3) as u8)
            .ok_or(TmError::BadSettingsImport("parity"))?;
        self.data_bits = DataBits::from_bits(((bits >> 25) & 0x1) as u8)
            .ok_or(TmError::BadSettingsImport("data_bits"))?;
        self.stop_bits = StopBits::from_bits(((bits >> 24) & 0x1) as u8)
            .ok_or(TmError::BadSettingsImport("stop_bits"))?;
        self.cts = (bits >> 23) & 1 != 0;
        self.dsr = (bits >> 22) & 1 != 0;
        self.transfer_mode = TransferMode::from_bits(((bits >> 20) & 0x3) as u8)
            .ok_or(TmError::BadSettingsImport("transfer_mode"))?;
        self.output_format = OutputFormat::from_bits(((bits >> 19) & 0x1) as u8)
            .ok_or(TmError::BadSettingsImport("output_format"))?;
        self.coordsys = CoordSys::from_bits(((bits >> 18) & 0x1) as u8)
            .ok_or(TmError::BadSettingsImport("coordsys"))?;
        self.transfer_rate = TransferRate::from_bits(((bits >> 16) & 0x3) as u8)
            .ok_or(TmError::BadSettingsImport("transfer_rate"))?;
        self.resolution = Resolution::from_bits(((bits >> 14) & 0x3) as u8)
            .ok_or(TmError::BadSettingsImport("resolution"))?;
        self.origin =
            Origin::from_bits(((bits >> 13) & 0x1) as u8).ok_or(TmError::BadSettingsImport("origin"))?;
        self.oor_data = (bits >> 12) & 1 != 0;
        self.terminator = Terminator::from_bits(((bits >> 10) & 0x3) as u8)
            .ok_or(TmError::BadSettingsImport("terminator"))?;
        self.pnp = (bits >> 8) & 1 != 0;
        self.sensitivity_soft = (bits >> 7) & 1 != 0;
        self.read_height_2mm = (bits >> 6) & 1 != 0;
        self.mdm = (bits >> 5) & 1 != 0;
        self.tilt = (bits >> 4) & 1 != 0;
        self.mm_comm_961 = (bits >> 3) & 1 != 0;
        self.portrait = (bits >> 2) & 1 != 0;
        self.cursor_data_1248 = (bits >> 1) & 1 != 0;
        self.remote_mode = bits & 1 != 0;
        Ok(())
    }

    /// Parse `"<8 hex digits>,<inc>,<int>,<xrez>,<yrez>"`, optionally
    /// prefixed with `~R` or `~Wn`.
    pub fn import(&mut self, state: &str) -> Result<()> {
        let body = state
            .trim_start_matches("~R")
            .trim_start_matches(|c: char| c == '~' || c == 'W' || c.is_ascii_digit())
            .trim();
        let mut parts = body.splitn(5, ',');
        let hex = parts.next().ok_or(TmError::BadSettingsImport("missing setup word"))?;
        let bits = u32::from_str_radix(hex.trim(), 16)
            .map_err(|_| TmError::BadSettingsImport("setup word not hex"))?;
        self.apply_bits(bits)?;
        if let Some(v) = parts.next() {
            self.increment = v.trim().parse().unwrap_or(self.increment);
        }
        if let Some(v) = parts.next() {
            self.interval = v.trim().parse().unwrap_or(self.interval);
        }
        if let Some(v) = parts.next() {
            self.xrez = v.trim().parse().unwrap_or(self.xrez);
        }
        if let Some(v) = parts.next() {
            self.yrez = v.trim().parse().unwrap_or(self.yrez);
        }
        Ok(())
    }

    /// Render the setup string in the same shape `import` accepts.
    #[must_use]
    pub fn settings_string(&self, notail: bool) -> String {
        let hex = format!("{:08X}", self.to_bits());
        if notail {
            hex
        } else {
            format!(
                "{},{:03},{:02},{},{}",
                hex, self.increment, self.interval, self.xrez, self.yrez
            )
        }
    }

    /// Human-readable multi-line rendering of all fields, for `?info`.
    #[must_use]
    pub fn description(&self) -> String {
        format!(
            "command_set={:?} baud={:?} parity={:?} data_bits={:?} stop_bits={:?}\n\
             transfer_mode={:?} output_format={:?} coordsys={:?} transfer_rate={:?}\n\
             resolution={:?} origin={:?} terminator={:?} tilt={} packet_size={}",
            self.command_set,
            self.baud_rate,
            self.parity,
            self.data_bits,
            self.stop_bits,
            self.transfer_mode,
            self.output_format,
            self.coordsys,
            self.transfer_rate,
            self.resolution,
            self.origin,
            self.terminator,
            self.tilt,
            self.packet_size(),
        )
    }

    // ---- Presets for tablets that never answer a settings query ----

    #[must_use]
    pub fn init_sd() -> Self {
        Self {
            command_set: CommandSet::WacomIIs,
            output_format: OutputFormat::Binary,
            transfer_mode: TransferMode::Stream,
            increment: 0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn init_pl() -> Self {
        Self {
            command_set: CommandSet::WacomIv,
            tilt: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn init_pen_partner() -> Self {
        Self {
            command_set: CommandSet::WacomIv,
            tilt: false,
            baud_rate: BaudRate::B9600,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn init_tablet_pc(use_38400: bool) -> Self {
        Self {
            command_set: CommandSet::TabletPc,
            baud_rate: if use_38400 { BaudRate::B38400 } else { BaudRate::B19200 },
            output_format: OutputFormat::Binary,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn init_intuos() -> Self {
        Self {
            command_set: CommandSet::WacomV,
            baud_rate: BaudRate::B38400,
            tilt: true,
            resolution: Resolution::R2540,
            xscale: 1270 * 20,
            yscale: 1270 * 16,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn init_calcomp() -> Self {
        Self {
            command_set: CommandSet::BitpadII,
            output_format: OutputFormat::Binary,
            ..Self::default()
        }
    }

    /// Fujitsu P-Series never answers a `~R` settings query; its framing
    /// (5-byte fixed packets) is selected on the dialect, not on
    /// `command_set`, so this preset only needs a plausible line config.
    #[must_use]
    pub fn init_fujitsu() -> Self {
        Self {
            command_set: CommandSet::BitpadII,
            output_format: OutputFormat::Binary,
            baud_rate: BaudRate::B9600,
            xscale: crate::decode::FUJITSU_OUTPUT_WIDTH,
            yscale: crate::decode::FUJITSU_OUTPUT_HEIGHT,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_size_follows_command_set_and_tilt() {
        let mut s = Settings::default();
        s.command_set = CommandSet::WacomIIs;
        assert_eq!(s.packet_size(), 7);
        s.command_set = CommandSet::WacomIv;
        s.tilt = false;
        assert_eq!(s.packet_size(), 7);
        s.tilt = true;
        assert_eq!(s.packet_size(), 9);
        s.command_set = CommandSet::WacomV;
        assert_eq!(s.packet_size(), 9);
        s.command_set = CommandSet::TabletPc;
        assert_eq!(s.packet_size(), 9);
    }

    #[test]
    fn setup_word_round_trips() {
        let mut s = Settings::default();
        s.import("E202C910,002,02,1270,1270").unwrap();
        assert_eq!(s.settings_string(false), "E202C910,002,02,1270,1270");
    }

    #[test]
    fn bits_round_trip_through_apply() {
        let s = Settings::init_intuos();
        let bits = s.to_bits();
        let mut s2 = Settings::default();
        s2.apply_bits(bits).unwrap();
        assert_eq!(s.to_bits(), s2.to_bits());
    }
}
