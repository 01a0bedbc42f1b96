use std::time::Duration;

/// Configuration for a recording controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Seconds of audio the PCM buffer holds (default: 5).
    pub buffer_duration_secs: u32,

    /// Sleep between checks while paused (default: 10 ms).
    pub paused_poll_interval: Duration,

    /// Ask the capture source to raise the acquisition thread's priority (default: true).
    pub elevate_priority: bool,

    /// Name of the acquisition thread.
    pub thread_name: String,
}

impl RecorderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.buffer_duration_secs == 0 {
            return Err("buffer duration must be positive".into());
        }
        if self.paused_poll_interval.is_zero() {
            return Err("paused poll interval must be positive".into());
        }
        if self.paused_poll_interval > Duration::from_secs(1) {
            return Err(format!(
                "paused poll interval too long: {:?}",
                self.paused_poll_interval
            ));
        }
        if self.thread_name.is_empty() {
            return Err("thread name must not be empty".into());
        }
        Ok(())
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            buffer_duration_secs: 5,
            paused_poll_interval: Duration::from_millis(10),
            elevate_priority: true,
            thread_name: "audio-recording".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(RecorderConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_duration() {
        let config = RecorderConfig {
            buffer_duration_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_poll_interval() {
        let zero = RecorderConfig {
            paused_poll_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let slow = RecorderConfig {
            paused_poll_interval: Duration::from_secs(2),
            ..Default::default()
        };
        assert!(slow.validate().is_err());
    }
}
