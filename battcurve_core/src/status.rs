//! Cycle phases reported by the controller.

/// Where a [`crate::CycleController`] currently is.
///
/// `Idle -> Charging -> Discharging -> Completed`, or `Aborted` from any
/// phase on a device error, a watchdog, or an interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePhase {
    #[default]
    Idle,
    Charging,
    Discharging,
    Completed,
    Aborted,
}

impl CyclePhase {
    pub fn name(&self) -> &'static str {
        match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Charging => "charging",
            CyclePhase::Discharging => "discharging",
            CyclePhase::Completed => "completed",
            CyclePhase::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CyclePhase::Completed | CyclePhase::Aborted)
    }
}
