//! Compares successive decoded stylus states and synthesizes the minimal
//! deterministic event sequence witnessing the difference.

use crate::events::{Event, EventSink, PointerKind};
use crate::stylus::{ButtonMapping, ButtonMask, ClickKind, StylusState};

#[derive(Default)]
pub struct EventSynth {
    current: StylusState,
    previous: StylusState,
    button_mapping: ButtonMapping,
    /// Per-click-kind latched state, indexed the same way as
    /// `ButtonMapping::resolve`'s output.
    button_state: [bool; 11],
    drag_active: bool,
}

fn pointer_kind(state: &StylusState) -> PointerKind {
    use crate::stylus::ToolType;
    if state.eraser_flag || matches!(state.tool_type, ToolType::Eraser) {
        PointerKind::Eraser
    } else if matches!(state.tool_type, ToolType::Mouse2D | ToolType::Mouse4D) {
        PointerKind::Mouse
    } else {
        PointerKind::Pen
    }
}

impl EventSynth {
    #[must_use]
    pub fn new(button_mapping: ButtonMapping) -> Self {
        Self { button_mapping, ..Self::default() }
    }

    pub fn set_button_mapping(&mut self, mapping: ButtonMapping) {
        self.button_mapping = mapping;
    }

    /// Feed a freshly decoded state, emitting events to `sink` in the fixed
    /// order specified for the engine: proximity, double-click, single-click,
    /// click-or-release/drag toggle, per-button transitions, then move.
    ///
    /// `mapped_point` is the screen-space position for this state, already
    /// passed through [`crate::mapper::Mapper`]; `Move`/`Dragged` report it
    /// rather than the raw tablet-space point carried on `new_state`.
    pub fn update(&mut self, new_state: StylusState, mapped_point: (f32, f32), sink: &mut dyn EventSink) {
        self.current = new_state;
        let resolved = self.button_mapping.resolve(self.current.buttons);

        if self.current.off_tablet != self.previous.off_tablet {
            let kind = pointer_kind(&self.current);
            if self.current.off_tablet {
                sink.post(Event::ProximityExit { kind });
            } else {
                sink.post(Event::ProximityEnter { kind, tool_type: self.current.tool_type });
            }
        }

        let double_click_idx = 6;
        let single_click_idx = 7;
        let click_or_release_idx = 9;

        if resolved[double_click_idx] && !self.button_state[double_click_idx] {
            for _ in 0..2 {
                sink.post(Event::ButtonDown { kind: ClickKind::DoubleClick, click_count: 2 });
                sink.post(Event::ButtonUp { kind: ClickKind::DoubleClick });
            }
        }
        if resolved[single_click_idx] && !self.button_state[single_click_idx] {
            sink.post(Event::ButtonDown { kind: ClickKind::SingleClick, click_count: 1 });
            sink.post(Event::ButtonUp { kind: ClickKind::SingleClick });
        }
        if resolved[click_or_release_idx] != self.button_state[click_or_release_idx] {
            if resolved[click_or_release_idx] && !self.drag_active {
                self.drag_active = true;
                sink.post(Event::ButtonDown { kind: ClickKind::SystemButton1, click_count: 1 });
            } else if !resolved[click_or_release_idx] && self.drag_active {
                self.drag_active = false;
                sink.post(Event::ButtonUp { kind: ClickKind::SystemButton1 });
            }
        }

        let tracked = [
            (0, ClickKind::SystemButton1),
            (1, ClickKind::SystemButton2),
            (5, ClickKind::Eraser),
            (2, ClickKind::SystemButton3),
            (3, ClickKind::SystemButton4),
            (4, ClickKind::SystemButton5),
            (8, ClickKind::ControlClick),
        ];
        let mut any_fired = false;
        // Tablets rarely hold more than one or two of these down at once, so
        // this stays on the stack in the common case.
        let mut held_kinds: smallvec::SmallVec<[ClickKind; 4]> = smallvec::SmallVec::new();
        for (idx, kind) in tracked {
            if resolved[idx] {
                held_kinds.push(kind);
            }
            if resolved[idx] != self.button_state[idx] {
                any_fired = true;
                if resolved[idx] {
                    sink.post(Event::ButtonDown { kind, click_count: 1 });
                } else {
                    sink.post(Event::ButtonUp { kind });
                }
            }
        }

        let position_changed = self.current.point != self.previous.point;
        if !any_fired && position_changed {
            match held_kinds.first() {
                Some(&kind) => sink.post(Event::Dragged { point: mapped_point, held: kind }),
                None => sink.post(Event::Move { point: mapped_point }),
            }
        }

        self.button_state = resolved;
        self.previous = self.current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;

    #[test]
    fn no_events_emitted_when_state_is_unchanged() {
        let mut synth = EventSynth::new(ButtonMapping::default());
        let mut sink = RecordingSink::default();
        let state = StylusState::default();
        synth.update(state, (0.0, 0.0), &mut sink);
        sink.events.clear();
        synth.update(state, (0.0, 0.0), &mut sink);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn proximity_enter_emits_exactly_one_event() {
        let mut synth = EventSynth::new(ButtonMapping::default());
        let mut sink = RecordingSink::default();
        let mut state = StylusState::default();
        state.off_tablet = true;
        synth.update(state, (0.0, 0.0), &mut sink);
        sink.events.clear();

        state.off_tablet = false;
        synth.update(state, (0.0, 0.0), &mut sink);
        assert_eq!(sink.events.len(), 1);
        assert!(matches!(sink.events[0], Event::ProximityEnter { .. }));
    }

    #[test]
    fn tip_down_then_up_emits_matching_button_events() {
        let mut synth = EventSynth::new(ButtonMapping::default());
        let mut sink = RecordingSink::default();
        let mut state = StylusState::default();
        synth.update(state, (0.0, 0.0), &mut sink);
        sink.events.clear();

        state.buttons = ButtonMask::TIP;
        synth.update(state, (0.0, 0.0), &mut sink);
        assert!(sink.events.iter().any(|e| matches!(e, Event::ButtonDown { .. })));

        sink.events.clear();
        state.buttons = ButtonMask::empty();
        synth.update(state, (0.0, 0.0), &mut sink);
        assert!(sink.events.iter().any(|e| matches!(e, Event::ButtonUp { .. })));
    }
}
