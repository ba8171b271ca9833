use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_RETRY_COUNT: u32 = 0;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024;

/// Configuration shared by all transports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    /// Target address, interpreted by the transport (`host:port`, a
    /// serial device path, ...).
    pub address: String,
    /// Default I/O timeout, also the connect deadline.
    pub timeout: Duration,
    /// Extra attempts made by [`RetryConn`](crate::RetryConn). The raw
    /// transports ignore it.
    pub retry_count: u32,
    /// Pause between attempts made by [`RetryConn`](crate::RetryConn).
    pub retry_delay: Duration,
    /// Capacity of the receive buffer. Longer responses are truncated.
    pub max_frame_size: usize,
}

impl Default for TransportOptions {
    fn default() -> Self {
        TransportOptions {
            address: String::new(),
            timeout: DEFAULT_TIMEOUT,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl TransportOptions {
    pub fn new(address: impl Into<String>) -> Self {
        TransportOptions {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retry_count: u32, retry_delay: Duration) -> Self {
        self.retry_count = retry_count;
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = TransportOptions::default();
        assert_eq!(options.address, "");
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.retry_count, 0);
        assert_eq!(options.retry_delay, Duration::from_millis(100));
        assert_eq!(options.max_frame_size, 1024);
    }

    #[test]
    fn setters_keep_other_defaults() {
        let options = TransportOptions::new("127.0.0.1:502")
            .with_timeout(Duration::from_millis(250))
            .with_max_frame_size(260);
        assert_eq!(options.address, "127.0.0.1:502");
        assert_eq!(options.timeout, Duration::from_millis(250));
        assert_eq!(options.max_frame_size, 260);
        assert_eq!(options.retry_count, DEFAULT_RETRY_COUNT);
        assert_eq!(options.retry_delay, DEFAULT_RETRY_DELAY);
    }
}
