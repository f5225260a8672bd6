//! Key-state tracking
//!
//! Hosts forward raw key-down/key-up codes; the simulation reads one
//! [`TickInput`] snapshot per frame. Press edges are latched until the next
//! snapshot, so a tap that goes down and up between two frames still jumps.

use std::collections::BTreeSet;

use crate::sim::TickInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Jump,
    /// Run, and shoot in fire mode
    Run,
    Spin,
}

const ACTION_COUNT: usize = 5;

impl Action {
    const fn index(self) -> usize {
        match self {
            Action::Left => 0,
            Action::Right => 1,
            Action::Jump => 2,
            Action::Run => 3,
            Action::Spin => 4,
        }
    }

    /// Map a DOM-style key code to an action
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Action::Left),
            "ArrowRight" | "KeyD" => Some(Action::Right),
            "ArrowUp" | "KeyW" | "Space" => Some(Action::Jump),
            "ShiftLeft" | "ShiftRight" => Some(Action::Run),
            "KeyX" => Some(Action::Spin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyState {
    /// Codes currently held
    held: BTreeSet<String>,
    /// Fresh presses since the last snapshot
    pressed: [bool; ACTION_COUNT],
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key went down. Auto-repeat of an already-held key is not a new press.
    pub fn press(&mut self, code: &str) {
        let Some(action) = Action::from_key_code(code) else {
            return;
        };
        let was_down = self.is_down(action);
        if self.held.insert(code.to_string()) && !was_down {
            self.pressed[action.index()] = true;
        }
    }

    pub fn release(&mut self, code: &str) {
        self.held.remove(code);
    }

    /// Whether any key bound to `action` is held
    pub fn is_down(&self, action: Action) -> bool {
        self.held
            .iter()
            .any(|code| Action::from_key_code(code) == Some(action))
    }

    /// Drop everything (focus loss)
    pub fn clear(&mut self) {
        self.held.clear();
        self.pressed = [false; ACTION_COUNT];
    }

    /// Input for the next tick; consumes the latched press edges
    pub fn snapshot(&mut self) -> TickInput {
        let pressed = std::mem::take(&mut self.pressed);
        TickInput {
            left: self.is_down(Action::Left),
            right: self.is_down(Action::Right),
            jump_held: self.is_down(Action::Jump),
            jump_pressed: pressed[Action::Jump.index()],
            run_held: self.is_down(Action::Run),
            run_pressed: pressed[Action::Run.index()],
            spin_pressed: pressed[Action::Spin.index()],
        }
    }
}
