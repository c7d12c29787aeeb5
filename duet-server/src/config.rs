/// Runtime switches for the room coordinator.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Echo server-side log lines back to the requesting client as `log` events.
    pub echo_logs: bool,
    /// Treat an inbound `bye` as an explicit leave instead of a logged notice.
    pub leave_on_bye: bool,
    /// Capacity of the coordinator command mailbox.
    pub command_buffer: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            echo_logs: true,
            leave_on_bye: false,
            command_buffer: 256,
        }
    }
}
