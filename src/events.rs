//! Synthetic pointer/tablet events delivered to the host.

use crate::stylus::{ClickKind, ToolType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::AsRefStr)]
pub enum PointerKind {
    Pen,
    Eraser,
    Mouse,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    ProximityEnter { kind: PointerKind, tool_type: ToolType },
    ProximityExit { kind: PointerKind },
    ButtonDown { kind: ClickKind, click_count: u8 },
    ButtonUp { kind: ClickKind },
    Move { point: (f32, f32) },
    Dragged { point: (f32, f32), held: ClickKind },
}

/// Opaque sink for synthesized events. The daemon never mentions a
/// platform-specific event type; an embedder supplies this.
pub trait EventSink {
    fn post(&mut self, event: Event);
}

/// An in-process sink used by tests and by `--command`-mode runs, which
/// simply records every posted event in order.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl EventSink for RecordingSink {
    fn post(&mut self, event: Event) {
        self.events.push(event);
    }
}
