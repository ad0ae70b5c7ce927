//! Byte-level wire constants: command strings and packet bit masks.
//!
//! These mirror the tablet firmware's own documented (and in a few cases
//! undocumented but empirically observed) packet layouts. Field names match
//! the bit they extract, not any particular vendor's internal terminology.

// ---- Commands sent to the tablet ----

pub const CMD_START: &str = "ST\r";
pub const CMD_STOP: &str = "SP\r";
pub const CMD_SELF_TEST: &str = "TE\r";
pub const CMD_TABLET_ID: &str = "~#\r";
pub const CMD_TABLET_SIZE: &str = "~C\r";
pub const CMD_READ_SETTING: &str = "~R\r";
pub const CMD_READ_SETTING_BANK1: &str = "~R1\r";
pub const CMD_READ_SETTING_BANK2: &str = "~R2\r";
pub const CMD_RESET_DEFAULTS: &str = "RE\r";
pub const CMD_RESET_WACOM_II: &str = "\r$";
pub const CMD_RESET_WACOM_IV: &str = "\r#";

pub const CMD_ASCII_MODE: &str = "AS1\r";
pub const CMD_BINARY_MODE: &str = "AS0\r";
pub const CMD_SUPPRESS: &str = "SU0\r";
pub const CMD_INTERVAL_OFF: &str = "IT0\r";
pub const CMD_INCREMENT_OFF: &str = "IN0\r";
pub const CMD_RESOLUTION_1000: &str = "IC1\r";
pub const CMD_RESOLUTION_50: &str = "IC0\r";
pub const CMD_PRESSURE_ON: &str = "PH1\r";
pub const CMD_PRESSURE_OFF: &str = "PH0\r";
pub const CMD_ABSOLUTE: &str = "DE0\r";
pub const CMD_RELATIVE: &str = "DE1\r";
pub const CMD_TILT_ON: &str = "FM1\r";
pub const CMD_TILT_OFF: &str = "FM0\r";
pub const CMD_ORIGIN_UL: &str = "OC0\r";
pub const CMD_ORIGIN_LL: &str = "OC1\r";
pub const CMD_STREAM: &str = "SR\r";
pub const CMD_POINT: &str = "PO\r";
pub const CMD_SWITCH_STREAM: &str = "SW\r";

pub const TPC_STOP: &str = "0";
pub const TPC_QUERY: &str = "*";
pub const TPC_SAMPLE_1: &str = "1";

pub const CALCOMP_PREFIX: &str = "\x1b%";

pub const KNOWN_DIGITIZERS: [&str; 3] = ["WAC", "FUJ", "FPI"];

/// One table row: tablet-ID reply prefix, human-readable name, and the
/// model family it implies for settings defaults.
pub struct SeriesRow {
    pub prefix: &'static str,
    pub name: &'static str,
}

/// Ordered longest-prefix-first so `"CTE"` is tried before `"CT"`.
pub const SERIES_TABLE: &[SeriesRow] = &[
    SeriesRow { prefix: "ISD", name: "TabletPC" },
    SeriesRow { prefix: "CTE", name: "Graphire3" },
    SeriesRow { prefix: "ETA", name: "Graphire2" },
    SeriesRow { prefix: "PTU", name: "Cintiq Partner" },
    SeriesRow { prefix: "XD", name: "Intuos2" },
    SeriesRow { prefix: "GD", name: "Intuos" },
    SeriesRow { prefix: "ET", name: "Graphire" },
    SeriesRow { prefix: "PL", name: "Cintiq" },
    SeriesRow { prefix: "UD", name: "ArtZ" },
    SeriesRow { prefix: "KT", name: "ArtPad" },
    SeriesRow { prefix: "CT", name: "PenPartner" },
    SeriesRow { prefix: "SD", name: "SD Series" },
    SeriesRow { prefix: "Cal", name: "CalComp" },
    SeriesRow { prefix: "FUJ", name: "FujitsuP" },
    SeriesRow { prefix: "FPI", name: "FujitsuP" },
];

// ---- Wacom II-S binary packet (7 bytes) ----

pub const IIS_MASK0_PROXIMITY: u8 = 0x40;
pub const IIS_MASK0_PRESSURE: u8 = 0x10;
pub const IIS_MASK0_ENGAGED: u8 = 0x60;
pub const IIS_DISENGAGED: u8 = 0x20;
pub const IIS_MASK6_ERASER_OR_TIP: u8 = 0x01;
pub const IIS_MASK6_BUTTON1: u8 = 0x02;
pub const IIS_MASK6_ERASER_OR_2: u8 = 0x04;
pub const IIS_MASK6_PRESSURE_LO: u8 = 0x3F;
pub const IIS_MASK6_PRESSURE_HI: u8 = 0x40;
pub const IIS_MASK6_BUTTON_FLAG: u8 = 0x20;

// ---- Wacom IV (7 or 9 bytes) ----

pub const IV_MASK0_ENGAGEMENT: u8 = 0x60;
pub const IV_DISENGAGED_OR_MENU: u8 = 0x20;
pub const IV_MASK0_STYLUS: u8 = 0x20;
pub const IV_MASK0_BUTTON_FLAG: u8 = 0x08;
pub const IV_MASK3_BUTTONS: u8 = 0x78;
pub const IV_MASK3_PRESSURE0: u8 = 0x04;
pub const IV_MASK6_PRESSURE_LO: u8 = 0x3F;
pub const IV_MASK6_PRESSURE_HI: u8 = 0x40;
pub const IV_MASK7_TILT: u8 = 0x3F;
pub const IV_MASK7_TILT_BASE: u8 = 0x40;
pub const IV_MASK8_TILT: u8 = 0x3F;
pub const IV_MASK8_TILT_BASE: u8 = 0x40;

// ---- Wacom V (9 bytes, classified on byte 0) ----

pub const V_MASK1_TOOL_HI: u8 = 0x7F;
pub const V_MASK2_TOOL_LO: u8 = 0x7C;
pub const V_MASK7_TILT_X: u8 = 0x3F;
pub const V_MASK7_TILT_X_BASE: u8 = 0x40;
pub const V_MASK8_TILT_Y: u8 = 0x3F;
pub const V_MASK8_TILT_Y_BASE: u8 = 0x40;
pub const V_MASK5_PRESSURE_HI: u8 = 0x07;
pub const V_MASK6_PRESSURE_LO: u8 = 0x7F;
pub const V_MASK0_BUTTON1: u8 = 0x02;
pub const V_MASK0_BUTTON2: u8 = 0x04;
pub const V_MASK8_LENS_BUTTONS: u8 = 0x1F;

pub const V_PKT_DISENGAGE_LO: u8 = 0x80;
pub const V_PKT_DISENGAGE_HI: u8 = 0x81;
pub const V_PKT_TOOL_ID_LO: u8 = 0xC0;
pub const V_PKT_TOOL_ID_HI: u8 = 0xC3;

pub const TOOL_ID_PEN: u16 = 0x0822;
pub const TOOL_ID_PEN2: u16 = 0x0022;
pub const TOOL_ID_PENCIL1: u16 = 0x0842;
pub const TOOL_ID_GRIP_PEN: u16 = 0x0852;
pub const TOOL_ID_STROKE_PEN1: u16 = 0x0832;
pub const TOOL_ID_STROKE_PEN2: u16 = 0x0032;
pub const TOOL_ID_MOUSE_2D: u16 = 0x0007;
pub const TOOL_ID_MOUSE_3D: u16 = 0x009C;
pub const TOOL_ID_MOUSE_4D: u16 = 0x0094;
pub const TOOL_ID_LENS: u16 = 0x0096;
pub const TOOL_ID_ERASER1: u16 = 0x082A;
pub const TOOL_ID_ERASER2: u16 = 0x085A;
pub const TOOL_ID_ERASER3: u16 = 0x091A;
pub const TOOL_ID_ERASER4: u16 = 0x00FA;
pub const TOOL_ID_AIRBRUSH: u16 = 0x0112;

// ---- TabletPC ISD-V4 (9-byte position packet, 11-byte query reply) ----

pub const TPC_MASK0_QUERY_DATA: u8 = 0x40;
pub const TPC_MASK0_PROXIMITY: u8 = 0x20;
pub const TPC_MASK0_ERASER: u8 = 0x04;
pub const TPC_MASK0_TOUCH: u8 = 0x01;
pub const TPC_MASK0_SWITCH1: u8 = 0x02;
pub const TPC_MASK0_SWITCH2: u8 = 0x04;
pub const TPC_MASK6_PRESSURE_HI: u8 = 0x01;
pub const TPC_MASK5_PRESSURE_LO: u8 = 0x7F;
pub const TPC_MASK6_X: u8 = 0x60;
pub const TPC_MASK6_Y: u8 = 0x18;
pub const TPC_PRESSURE_DEADZONE: u16 = 24;

pub const TPC_QUERY_REPLY_SIZE: usize = 11;
pub const TPC_QUERY0_DATA: u8 = 0x3F;
pub const TPC_QUERY6_PRESSURE_HI: u8 = 0x07;
pub const TPC_QUERY5_PRESSURE_LO: u8 = 0x7F;
pub const TPC_QUERY6_X: u8 = 0x60;
pub const TPC_QUERY6_Y: u8 = 0x18;

// ---- CalComp (7 bytes) ----

pub const CAL_MASK0_PROXIMITY: u8 = 0x40;
pub const CAL_MASK0_ENGAGED: u8 = 0x60;
pub const CAL_MASK0_STYLUS: u8 = 0x20;
pub const CAL_MASK3_Y_HIGH: u8 = 0x18;
pub const CAL_MASK6_PRESSURE: u8 = 0xFF;
pub const CAL_MASK6_ERASER: u8 = 0x01;
pub const CAL_MASK6_BUTTON1: u8 = 0x02;

// ---- Misc scale constants ----

pub const PRESSURE_SCALE: f32 = 65535.0;
pub const TILT_SCALE: f32 = 32767.0;
pub const INCHES_12_AT_1270_PPI: i32 = 15240;
