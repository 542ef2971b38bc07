//! Relay configuration

/// Relay behavior options
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    /// Tell a sender when its relay target is not reachable
    ///
    /// Off by default: unreachable targets are dropped silently and
    /// WebRTC negotiation retries at a higher layer.
    pub notify_unreachable: bool,
}

impl RelayConfig {
    /// Enable or disable `recipient-unavailable` replies
    pub fn notify_unreachable(mut self, enabled: bool) -> Self {
        self.notify_unreachable = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_silent_drop() {
        assert!(!RelayConfig::default().notify_unreachable);
        assert!(RelayConfig::default().notify_unreachable(true).notify_unreachable);
    }
}
