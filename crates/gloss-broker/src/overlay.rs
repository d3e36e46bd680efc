//! Overlay lifecycle state machine for the injection context
//!
//! Visibility changes always pass through `Entering`/`Exiting`. A toggle that
//! arrives while a transition is in flight is rejected, which is what
//! debounces double-toggles; no timers involved.

/// The five lifecycle phases of a tab's overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    /// No injection context exists in the tab yet.
    Uninjected,
    Hidden,
    Entering,
    Visible,
    Exiting,
}

/// A visibility transition started by a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Enter,
    Exit,
}

/// Guarded visibility FSM, held only by the injection context.
#[derive(Debug)]
pub struct OverlayLifecycle {
    phase: OverlayPhase,
}

impl Default for OverlayLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayLifecycle {
    pub fn new() -> Self {
        Self {
            phase: OverlayPhase::Uninjected,
        }
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    /// Visible to the user, including while the exit transition plays out.
    pub fn is_visible(&self) -> bool {
        matches!(self.phase, OverlayPhase::Visible | OverlayPhase::Exiting)
    }

    /// Mark the injection context as present. Only meaningful from
    /// `Uninjected`.
    pub fn injected(&mut self) {
        if self.phase == OverlayPhase::Uninjected {
            self.phase = OverlayPhase::Hidden;
        }
    }

    /// Start a visibility transition. Returns `None` when the toggle is
    /// rejected: either a transition is already in flight or the overlay was
    /// never injected.
    pub fn begin_toggle(&mut self) -> Option<Transition> {
        match self.phase {
            OverlayPhase::Hidden => {
                self.phase = OverlayPhase::Entering;
                Some(Transition::Enter)
            }
            OverlayPhase::Visible => {
                self.phase = OverlayPhase::Exiting;
                Some(Transition::Exit)
            }
            OverlayPhase::Entering | OverlayPhase::Exiting => {
                tracing::debug!("toggle rejected, transition in flight");
                None
            }
            OverlayPhase::Uninjected => {
                tracing::debug!("toggle rejected, overlay not injected");
                None
            }
        }
    }

    /// Complete the in-flight transition. A no-op outside `Entering` /
    /// `Exiting`.
    pub fn finish_transition(&mut self) {
        self.phase = match self.phase {
            OverlayPhase::Entering => OverlayPhase::Visible,
            OverlayPhase::Exiting => OverlayPhase::Hidden,
            other => other,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle_never_skips_transition_phases() {
        let mut overlay = OverlayLifecycle::new();
        overlay.injected();
        assert_eq!(overlay.phase(), OverlayPhase::Hidden);

        assert_eq!(overlay.begin_toggle(), Some(Transition::Enter));
        assert_eq!(overlay.phase(), OverlayPhase::Entering);
        overlay.finish_transition();
        assert_eq!(overlay.phase(), OverlayPhase::Visible);

        assert_eq!(overlay.begin_toggle(), Some(Transition::Exit));
        assert_eq!(overlay.phase(), OverlayPhase::Exiting);
        overlay.finish_transition();
        assert_eq!(overlay.phase(), OverlayPhase::Hidden);
    }

    #[test]
    fn test_double_toggle_is_debounced() {
        let mut overlay = OverlayLifecycle::new();
        overlay.injected();

        // Two toggles before the first transition completes: exactly one
        // hidden->visible transition, not two overlapping ones.
        assert_eq!(overlay.begin_toggle(), Some(Transition::Enter));
        assert_eq!(overlay.begin_toggle(), None);
        overlay.finish_transition();
        assert_eq!(overlay.phase(), OverlayPhase::Visible);
    }

    #[test]
    fn test_toggle_before_injection_rejected() {
        let mut overlay = OverlayLifecycle::new();
        assert_eq!(overlay.begin_toggle(), None);
        assert_eq!(overlay.phase(), OverlayPhase::Uninjected);
    }

    #[test]
    fn test_injected_is_idempotent_from_later_phases() {
        let mut overlay = OverlayLifecycle::new();
        overlay.injected();
        overlay.begin_toggle();
        overlay.injected();
        assert_eq!(overlay.phase(), OverlayPhase::Entering);
    }

    #[test]
    fn test_finish_without_transition_is_noop() {
        let mut overlay = OverlayLifecycle::new();
        overlay.injected();
        overlay.finish_transition();
        assert_eq!(overlay.phase(), OverlayPhase::Hidden);
    }
}
