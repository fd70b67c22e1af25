/// Execution state of the processor between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Fetching and executing instructions.
    #[default]
    Running,
    /// Parked by `WAI` until an interrupt line is raised.
    Waiting,
    /// Halted by `STP`; only reset resumes execution.
    Stopped,
}

impl RunState {
    /// Returns `true` when the next step fetches an instruction or services
    /// an interrupt.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::RunState;

    #[test]
    fn run_state_default_is_running() {
        assert_eq!(RunState::default(), RunState::Running);
    }

    #[test]
    fn only_running_state_executes() {
        assert!(RunState::Running.is_running());
        assert!(!RunState::Waiting.is_running());
        assert!(!RunState::Stopped.is_running());
    }
}
