use std::time::Duration;

use log::warn;

use super::config::TransportOptions;
use super::conn::Conn;
use super::error::{ConnError, Error, Result};

/// Wraps a [`Conn`] and retries failed opens and exchanges.
///
/// Up to `retry_count` extra attempts are made, `retry_delay` apart. Only
/// connection errors are retried; sentinels such as a closed connection
/// come back at once. Before an exchange is retried the inner connection
/// is reopened, since a failed exchange leaves the stream in an unknown
/// state. A retried request may reach the device more than once.
#[derive(Debug)]
pub struct RetryConn<C> {
    inner: C,
    retry_count: u32,
    retry_delay: Duration,
}

impl<C: Conn> RetryConn<C> {
    /// Takes the retry policy from `options`. The default timeout stays the
    /// inner connection's own.
    pub fn new(inner: C, options: &TransportOptions) -> Self {
        RetryConn {
            inner,
            retry_count: options.retry_count,
            retry_delay: options.retry_delay,
        }
    }

    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    /// One exchange with retries. `None` uses the inner default timeout.
    fn exchange(&mut self, data: &[u8], timeout: Option<Duration>) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                if let Err(err) = self.reopen() {
                    match err {
                        Error::Conn(err) if attempt < self.retry_count => {
                            attempt += 1;
                            self.back_off(&err, attempt);
                            continue;
                        }
                        err => return Err(err),
                    }
                }
            }
            let result = match timeout {
                Some(timeout) => self.inner.send_with_timeout(data, timeout),
                None => self.inner.send(data),
            };
            match result {
                Err(Error::Conn(err)) if attempt < self.retry_count => {
                    attempt += 1;
                    self.back_off(&err, attempt);
                }
                result => return result,
            }
        }
    }

    fn back_off(&self, err: &ConnError, attempt: u32) {
        warn!(
            "{}; retry {}/{} in {:?}",
            err, attempt, self.retry_count, self.retry_delay
        );
        std::thread::sleep(self.retry_delay);
    }

    fn reopen(&mut self) -> Result<()> {
        // the old stream is discarded either way
        let _ = self.inner.close();
        self.inner.open()
    }
}

impl<C: Conn> Conn for RetryConn<C> {
    fn open(&mut self) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.inner.open() {
                Err(Error::Conn(err)) if attempt < self.retry_count => {
                    attempt += 1;
                    self.back_off(&err, attempt);
                }
                result => return result,
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn send(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.exchange(data, None)
    }

    fn send_with_timeout(&mut self, data: &[u8], timeout: Duration) -> Result<Vec<u8>> {
        self.exchange(data, Some(timeout))
    }

    // raw stream access has no request boundary to retry on
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.inner.read(buf)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.inner.write(data)
    }
}
