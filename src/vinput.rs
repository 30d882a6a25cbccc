//! Virtual input snapshots.
//!
//! Parsed HID fields are coalesced into per-slot axis and button state
//! between drains: the last write to a slot wins, and [`drain`] hands the
//! pending snapshot to the consumer and clears it. This is how a polled
//! input pipeline turns a burst of reports into one state change per tick.
//!
//! [`drain`]: VirtualInputState::drain

use std::collections::BTreeMap;

use tracing::debug;

/// Slots per controller, for axes and buttons alike
pub const SLOT_COUNT: u8 = 128;

/// One coalesced input state change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Axis {
        controller: i32,
        slot: u8,
        value: f32,
    },
    ButtonPressed {
        controller: i32,
        slot: u8,
    },
    ButtonReleased {
        controller: i32,
        slot: u8,
    },
}

/// Pending snapshot of axis and button changes
#[derive(Debug, Default)]
pub struct VirtualInputState {
    axes: BTreeMap<u8, (i32, f32)>,
    pressed: BTreeMap<u8, i32>,
    released: BTreeMap<u8, i32>,
}

impl VirtualInputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an axis value. Slots past the last one are ignored.
    pub fn set_axis(&mut self, controller: i32, slot: u8, value: f32) {
        if slot >= SLOT_COUNT {
            debug!("axis slot {} out of range", slot);
            return;
        }
        self.axes.insert(slot, (controller, value));
    }

    /// Record a button press. Slots past the last one are ignored.
    pub fn press_button(&mut self, controller: i32, slot: u8) {
        if slot >= SLOT_COUNT {
            debug!("button slot {} out of range", slot);
            return;
        }
        self.pressed.insert(slot, controller);
    }

    /// Record a button release. Slots past the last one are ignored.
    pub fn release_button(&mut self, controller: i32, slot: u8) {
        if slot >= SLOT_COUNT {
            debug!("button slot {} out of range", slot);
            return;
        }
        self.released.insert(slot, controller);
    }

    /// Whether anything is pending.
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty() && self.pressed.is_empty() && self.released.is_empty()
    }

    /// Hand over and clear the pending snapshot.
    ///
    /// Axis events come first, then presses, then releases, each in slot
    /// order.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        let mut events =
            Vec::with_capacity(self.axes.len() + self.pressed.len() + self.released.len());
        for (slot, (controller, value)) in std::mem::take(&mut self.axes) {
            events.push(InputEvent::Axis {
                controller,
                slot,
                value,
            });
        }
        for (slot, controller) in std::mem::take(&mut self.pressed) {
            events.push(InputEvent::ButtonPressed { controller, slot });
        }
        for (slot, controller) in std::mem::take(&mut self.released) {
            events.push(InputEvent::ButtonReleased { controller, slot });
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_to_a_slot_wins() {
        let mut state = VirtualInputState::new();
        state.set_axis(0, 3, 0.25);
        state.set_axis(1, 3, 0.75);

        let events = state.drain();
        assert_eq!(
            events,
            vec![InputEvent::Axis {
                controller: 1,
                slot: 3,
                value: 0.75
            }]
        );
    }

    #[test]
    fn drain_clears_the_snapshot() {
        let mut state = VirtualInputState::new();
        state.set_axis(0, 0, 1.0);
        state.press_button(0, 1);
        state.release_button(0, 2);
        assert!(!state.is_empty());

        assert_eq!(state.drain().len(), 3);
        assert!(state.is_empty());
        assert!(state.drain().is_empty());
    }

    #[test]
    fn events_are_ordered_axes_presses_releases() {
        let mut state = VirtualInputState::new();
        state.release_button(0, 9);
        state.press_button(0, 5);
        state.set_axis(0, 7, -1.0);

        let events = state.drain();
        assert!(matches!(events[0], InputEvent::Axis { slot: 7, .. }));
        assert!(matches!(events[1], InputEvent::ButtonPressed { slot: 5, .. }));
        assert!(matches!(
            events[2],
            InputEvent::ButtonReleased { slot: 9, .. }
        ));
    }

    #[test]
    fn out_of_range_slots_are_ignored() {
        let mut state = VirtualInputState::new();
        state.set_axis(0, SLOT_COUNT, 1.0);
        state.press_button(0, 200);
        state.release_button(0, 255);
        assert!(state.is_empty());

        // The last valid slot still works
        state.set_axis(0, SLOT_COUNT - 1, 0.5);
        assert_eq!(state.drain().len(), 1);
    }
}
