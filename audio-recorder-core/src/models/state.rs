/// Recorder state machine.
///
/// State transitions:
/// ```text
/// idle → capturing ⇄ paused
///            ↓          ↓
///         stopped ← ────┘
/// ```
///
/// `Stopped` is terminal: a stopped recorder is never restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Capturing,
    Paused,
    Stopped,
}

impl RecordingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Derive the state from the recorder's flags.
    pub(crate) fn from_flags(started: bool, session_active: bool, stopped: bool) -> Self {
        if stopped {
            Self::Stopped
        } else if started {
            Self::Capturing
        } else if session_active {
            Self::Paused
        } else {
            Self::Idle
        }
    }
}
