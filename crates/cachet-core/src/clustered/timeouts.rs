//! Client-side timeouts for clustered operations.

use std::time::Duration;

/// Default timeout for read and write operations.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for establishing the cluster connection.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(150);

/// Read, write and connection timeouts of a clustering service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timeouts {
    read: Duration,
    write: Duration,
    connection: Duration,
}

impl Timeouts {
    /// Creates a new builder seeded with the default timeouts.
    pub fn builder() -> TimeoutsBuilder {
        TimeoutsBuilder::default()
    }

    /// Returns the timeout applied to read operations.
    pub fn read_operation_timeout(&self) -> Duration {
        self.read
    }

    /// Returns the timeout applied to write operations.
    pub fn write_operation_timeout(&self) -> Duration {
        self.write
    }

    /// Returns the timeout applied to connection establishment.
    pub fn connection_timeout(&self) -> Duration {
        self.connection
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: DEFAULT_OPERATION_TIMEOUT,
            write: DEFAULT_OPERATION_TIMEOUT,
            connection: DEFAULT_CONNECTION_TIMEOUT,
        }
    }
}

/// Builder for [`Timeouts`]; unset timeouts keep their defaults.
#[derive(Debug, Default)]
pub struct TimeoutsBuilder {
    read: Option<Duration>,
    write: Option<Duration>,
    connection: Option<Duration>,
}

impl TimeoutsBuilder {
    /// Sets the read operation timeout.
    pub fn read(mut self, timeout: Duration) -> Self {
        self.read = Some(timeout);
        self
    }

    /// Sets the write operation timeout.
    pub fn write(mut self, timeout: Duration) -> Self {
        self.write = Some(timeout);
        self
    }

    /// Sets both read and write operation timeouts.
    pub fn operations(self, timeout: Duration) -> Self {
        self.read(timeout).write(timeout)
    }

    /// Sets the connection timeout.
    pub fn connection(mut self, timeout: Duration) -> Self {
        self.connection = Some(timeout);
        self
    }

    /// Builds the timeouts.
    pub fn build(self) -> Timeouts {
        let defaults = Timeouts::default();
        Timeouts {
            read: self.read.unwrap_or(defaults.read),
            write: self.write.unwrap_or(defaults.write),
            connection: self.connection.unwrap_or(defaults.connection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let timeouts = Timeouts::builder().build();

        assert_eq!(timeouts, Timeouts::default());
        assert_eq!(timeouts.read_operation_timeout(), Duration::from_secs(5));
        assert_eq!(timeouts.write_operation_timeout(), Duration::from_secs(5));
        assert_eq!(timeouts.connection_timeout(), Duration::from_secs(150));
    }

    #[test]
    fn test_builder_overrides_only_what_was_set() {
        let timeouts = Timeouts::builder().read(Duration::from_secs(9)).build();

        assert_eq!(timeouts.read_operation_timeout(), Duration::from_secs(9));
        assert_eq!(timeouts.write_operation_timeout(), DEFAULT_OPERATION_TIMEOUT);
        assert_eq!(timeouts.connection_timeout(), DEFAULT_CONNECTION_TIMEOUT);
    }

    #[test]
    fn test_operations_sets_read_and_write() {
        let timeouts = Timeouts::builder()
            .operations(Duration::from_millis(250))
            .connection(Duration::from_secs(1))
            .build();

        assert_eq!(timeouts.read_operation_timeout(), Duration::from_millis(250));
        assert_eq!(timeouts.write_operation_timeout(), Duration::from_millis(250));
        assert_eq!(timeouts.connection_timeout(), Duration::from_secs(1));
    }
}
