use thread_priority::{get_current_thread_priority, set_current_thread_priority, ThreadPriority};

/// Raises the calling thread to the highest scheduling priority the OS
/// grants and puts the previous priority back on restore.
///
/// Without the needed privilege (e.g. `CAP_SYS_NICE` on Linux) the raise
/// fails with a warning and the thread keeps its priority.
#[derive(Debug, Default)]
pub struct PriorityBoost {
    previous: Option<ThreadPriority>,
}

impl PriorityBoost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&mut self) {
        if self.previous.is_some() {
            return;
        }

        let previous = match get_current_thread_priority() {
            Ok(priority) => priority,
            Err(e) => {
                log::warn!("failed to read thread priority: {:?}", e);
                return;
            }
        };

        match set_current_thread_priority(ThreadPriority::Max) {
            Ok(()) => {
                log::debug!("acquisition thread priority raised from {:?}", previous);
                self.previous = Some(previous);
            }
            Err(e) => log::warn!("failed to raise thread priority: {:?}", e),
        }
    }

    /// Undo a successful `raise`. No-op otherwise.
    pub fn restore(&mut self) {
        if let Some(previous) = self.previous.take() {
            if let Err(e) = set_current_thread_priority(previous) {
                log::warn!("failed to restore thread priority: {:?}", e);
            }
        }
    }

    pub fn is_raised(&self) -> bool {
        self.previous.is_some()
    }
}
