use std::fmt;

/// Why a connection went away. Informational only: room reconciliation
/// depends on the disconnect itself, never on the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The client sent a close frame.
    ClientClosed,
    /// The underlying stream ended without a close frame.
    TransportClosed,
    /// Reading or writing the stream failed.
    TransportError(String),
    /// The server closed the connection after an unauthorized event.
    ProtocolViolation(String),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::ClientClosed => f.write_str("client namespace disconnect"),
            DisconnectReason::TransportClosed => f.write_str("transport close"),
            DisconnectReason::TransportError(e) => write!(f, "transport error: {}", e),
            DisconnectReason::ProtocolViolation(e) => {
                write!(f, "server namespace disconnect: {}", e)
            }
        }
    }
}
