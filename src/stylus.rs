//! The decoded transducer state and the pieces needed to map it to events.

bitflags::bitflags! {
    #[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
    pub struct ButtonMask: u16 {
        const TIP     = 0b0001;
        const SIDE1   = 0b0010;
        const SIDE2   = 0b0100;
        const ERASER  = 0b1000;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::AsRefStr)]
pub enum ToolType {
    None,
    Pen,
    Pencil,
    Brush,
    Eraser,
    Airbrush,
    Mouse2D,
    Mouse4D,
    Lens,
}

impl Default for ToolType {
    fn default() -> Self {
        Self::None
    }
}

/// Maps a tool-identification id (reported by Wacom V stylus-in packets)
/// to a tool type.
#[must_use]
pub fn tool_type_for_id(id: u16) -> ToolType {
    use crate::wire::*;
    match id {
        TOOL_ID_PEN | TOOL_ID_PEN2 | TOOL_ID_GRIP_PEN => ToolType::Pen,
        TOOL_ID_PENCIL1 => ToolType::Pencil,
        TOOL_ID_STROKE_PEN1 | TOOL_ID_STROKE_PEN2 => ToolType::Brush,
        TOOL_ID_ERASER1 | TOOL_ID_ERASER2 | TOOL_ID_ERASER3 | TOOL_ID_ERASER4 => ToolType::Eraser,
        TOOL_ID_AIRBRUSH => ToolType::Airbrush,
        TOOL_ID_MOUSE_2D => ToolType::Mouse2D,
        TOOL_ID_MOUSE_3D | TOOL_ID_MOUSE_4D => ToolType::Mouse4D,
        TOOL_ID_LENS => ToolType::Lens,
        _ => ToolType::None,
    }
}

/// Identifies the transducer to the host event sink. Fixed for the lifetime
/// of a connection once generated at proximity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProximityDescriptor {
    pub unique_id: u64,
    pub capability: ButtonMask,
}

impl ProximityDescriptor {
    #[must_use]
    pub fn from_serial(device_path_hash: u64, serial: u64) -> Self {
        Self {
            unique_id: device_path_hash ^ serial.wrapping_mul(0x9E37_79B9_7F4A_7C15),
            capability: ButtonMask::all(),
        }
    }
}

/// A decoded snapshot of the transducer. Compared against the previous
/// snapshot by [`crate::event_synth::EventSynth`] to produce events.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StylusState {
    pub point: (i32, i32),
    pub old_point: (i32, i32),
    pub motion: (i32, i32),
    pub tilt: (i16, i16),
    pub raw_pressure: u16,
    pub pressure: u16,
    pub buttons: ButtonMask,
    pub off_tablet: bool,
    pub pen_near: bool,
    pub eraser_flag: bool,
    pub menu_button: u8,
    pub tool_type: ToolType,
    pub tool_id: u16,
    pub serial: u64,
    pub rotation: i16,
    pub wheel: i16,
    pub throttle: i16,
    pub proximity: ProximityDescriptor,
}

impl StylusState {
    /// Reset to "off tablet, no buttons," used on panic and on wake-from-sleep.
    pub fn reset(&mut self) {
        let proximity = self.proximity;
        *self = Self::default();
        self.off_tablet = true;
        self.proximity = proximity;
    }

    pub fn set_point(&mut self, x: i32, y: i32) {
        self.old_point = self.point;
        self.motion = (x - self.old_point.0, y - self.old_point.1);
        self.point = (x, y);
    }
}

/// How a single physical stylus input (tip, side1, side2, eraser) maps to a
/// semantic click kind reported to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::AsRefStr)]
pub enum ClickKind {
    None,
    SystemButton1,
    SystemButton2,
    SystemButton3,
    SystemButton4,
    SystemButton5,
    Eraser,
    DoubleClick,
    SingleClick,
    ControlClick,
    ClickOrRelease,
}

/// Default mapping: tip -> button1, side1 -> button1, side2 -> button2, eraser -> eraser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonMapping {
    pub tip: ClickKind,
    pub side1: ClickKind,
    pub side2: ClickKind,
    pub eraser: ClickKind,
}

impl Default for ButtonMapping {
    fn default() -> Self {
        Self {
            tip: ClickKind::SystemButton1,
            side1: ClickKind::SystemButton1,
            side2: ClickKind::SystemButton2,
            eraser: ClickKind::Eraser,
        }
    }
}

impl ButtonMapping {
    #[must_use]
    pub fn resolve(&self, raw: ButtonMask) -> [bool; 11] {
        let mut out = [false; 11];
        let mut mark = |kind: ClickKind| {
            let idx = match kind {
                ClickKind::None => return,
                ClickKind::SystemButton1 => 0,
                ClickKind::SystemButton2 => 1,
                ClickKind::SystemButton3 => 2,
                ClickKind::SystemButton4 => 3,
                ClickKind::SystemButton5 => 4,
                ClickKind::Eraser => 5,
                ClickKind::DoubleClick => 6,
                ClickKind::SingleClick => 7,
                ClickKind::ControlClick => 8,
                ClickKind::ClickOrRelease => 9,
            };
            out[idx] = true;
        };
        if raw.contains(ButtonMask::TIP) {
            mark(self.tip);
        }
        if raw.contains(ButtonMask::SIDE1) {
            mark(self.side1);
        }
        if raw.contains(ButtonMask::SIDE2) {
            mark(self.side2);
        }
        if raw.contains(ButtonMask::ERASER) {
            mark(self.eraser);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_preserves_proximity_descriptor_but_clears_state() {
        let mut s = StylusState::default();
        s.proximity = ProximityDescriptor::from_serial(1, 2);
        s.point = (100, 200);
        s.buttons = ButtonMask::TIP;
        s.reset();
        assert!(s.off_tablet);
        assert_eq!(s.point, (0, 0));
        assert_eq!(s.buttons, ButtonMask::empty());
        assert_eq!(s.proximity, ProximityDescriptor::from_serial(1, 2));
    }

    #[test]
    fn default_button_mapping_matches_source_defaults() {
        let m = ButtonMapping::default();
        let resolved = m.resolve(ButtonMask::TIP | ButtonMask::ERASER);
        assert!(resolved[0]); // SystemButton1 via tip
        assert!(resolved[5]); // Eraser
    }
}
