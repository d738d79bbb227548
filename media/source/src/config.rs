/*!
    Listener configuration.
*/

use std::time::Duration;

/**
    Default UDP port producers stream to.
*/
pub const DEFAULT_PORT: u16 = 5555;

/**
    Configuration for the UDP stream listener.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceConfig {
    /// UDP port to listen on.
    pub port: u16,
    /// Upper bound for a single native read; also the probe timeout.
    pub read_timeout: Duration,
}

impl SourceConfig {
    /**
        Create a configuration for the given port with default timeouts.
    */
    pub fn new(port: u16) -> Self {
        Self {
            port,
            read_timeout: Duration::from_millis(100),
        }
    }

    /**
        The listener URL (all interfaces, given port).
    */
    pub fn url(&self) -> String {
        format!("udp://@:{}", self.port)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_binds_all_interfaces() {
        assert_eq!(SourceConfig::new(5555).url(), "udp://@:5555");
        assert_eq!(SourceConfig::new(9000).url(), "udp://@:9000");
    }

    #[test]
    fn default_config() {
        let config = SourceConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.read_timeout, Duration::from_millis(100));
    }
}
