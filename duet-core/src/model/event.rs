use crate::model::conn::ConnId;
use crate::model::room::RoomKey;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Why an inbound frame could not be turned into a [`ClientEvent`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("frame must be a JSON array")]
    NotAnArray,

    #[error("frame has no event name")]
    MissingEventName,

    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    #[error("event '{event}' is missing argument {position}")]
    MissingArgument { event: &'static str, position: usize },

    #[error("event '{event}' argument {position} must be {expected}")]
    InvalidArgument {
        event: &'static str,
        position: usize,
        expected: &'static str,
    },
}

/// Events a client may send. Frames look like `["create or join", "alpha"]`.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Opaque handshake data for the other member of `room`.
    Message { payload: Value, room: RoomKey },
    CreateOrJoin { room: RoomKey },
    IpAddr,
    Bye,
}

impl ClientEvent {
    pub const MESSAGE: &'static str = "message";
    pub const CREATE_OR_JOIN: &'static str = "create or join";
    pub const IPADDR: &'static str = "ipaddr";
    pub const BYE: &'static str = "bye";

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Message { .. } => Self::MESSAGE,
            ClientEvent::CreateOrJoin { .. } => Self::CREATE_OR_JOIN,
            ClientEvent::IpAddr => Self::IPADDR,
            ClientEvent::Bye => Self::BYE,
        }
    }

    pub fn from_frame(text: &str) -> Result<Self, ProtocolError> {
        let (name, mut args) = split_frame(text)?;

        match name.as_str() {
            Self::MESSAGE => {
                if args.is_empty() {
                    return Err(ProtocolError::MissingArgument {
                        event: Self::MESSAGE,
                        position: 0,
                    });
                }
                let room = room_arg(&args, Self::MESSAGE, 1)?;
                let payload = args.swap_remove(0);
                Ok(ClientEvent::Message { payload, room })
            }
            Self::CREATE_OR_JOIN => Ok(ClientEvent::CreateOrJoin {
                room: room_arg(&args, Self::CREATE_OR_JOIN, 0)?,
            }),
            Self::IPADDR => Ok(ClientEvent::IpAddr),
            Self::BYE => Ok(ClientEvent::Bye),
            _ => Err(ProtocolError::UnknownEvent(name)),
        }
    }

    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for ClientEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        seq.serialize_element(self.name())?;
        match self {
            ClientEvent::Message { payload, room } => {
                seq.serialize_element(payload)?;
                seq.serialize_element(room)?;
            }
            ClientEvent::CreateOrJoin { room } => seq.serialize_element(room)?,
            ClientEvent::IpAddr | ClientEvent::Bye => {}
        }
        seq.end()
    }
}

/// Events the relay sends to a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// The receiver is the first member of `room`.
    Created { room: RoomKey, conn_id: ConnId },
    /// The receiver is the second member of `room`.
    Joined { room: RoomKey, conn_id: ConnId },
    Full { room: RoomKey },
    /// Sent to the first member when a second one arrives.
    PeerJoined { room: RoomKey },
    /// Both members may start the handshake.
    Ready,
    Message { payload: Value, room: RoomKey },
    IpAddr { address: Ipv4Addr },
    PeerLeft { conn_id: ConnId },
    /// Server-side log entries echoed to the client for debugging.
    /// Entries are usually strings but may carry a relayed payload as is.
    Log { lines: Vec<Value> },
}

impl ServerEvent {
    pub const CREATED: &'static str = "created";
    pub const JOINED: &'static str = "joined";
    pub const FULL: &'static str = "full";
    pub const PEER_JOINED: &'static str = "peer-joined";
    pub const READY: &'static str = "ready";
    pub const MESSAGE: &'static str = "message";
    pub const IPADDR: &'static str = "ipaddr";
    pub const PEER_LEFT: &'static str = "peer-left";
    pub const LOG: &'static str = "log";

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Created { .. } => Self::CREATED,
            ServerEvent::Joined { .. } => Self::JOINED,
            ServerEvent::Full { .. } => Self::FULL,
            ServerEvent::PeerJoined { .. } => Self::PEER_JOINED,
            ServerEvent::Ready => Self::READY,
            ServerEvent::Message { .. } => Self::MESSAGE,
            ServerEvent::IpAddr { .. } => Self::IPADDR,
            ServerEvent::PeerLeft { .. } => Self::PEER_LEFT,
            ServerEvent::Log { .. } => Self::LOG,
        }
    }

    /// Builds a `log` event in the `["Message from server:", line]` shape.
    pub fn log(line: impl Into<String>) -> Self {
        Self::log_entries([Value::String(line.into())])
    }

    /// Like [`ServerEvent::log`], with each entry kept as its own element.
    pub fn log_entries(entries: impl IntoIterator<Item = Value>) -> Self {
        let mut lines = vec![Value::from("Message from server:")];
        lines.extend(entries);
        ServerEvent::Log { lines }
    }

    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_frame(text: &str) -> Result<Self, ProtocolError> {
        let (name, mut args) = split_frame(text)?;

        match name.as_str() {
            Self::CREATED => Ok(ServerEvent::Created {
                room: room_arg(&args, Self::CREATED, 0)?,
                conn_id: conn_arg(&args, Self::CREATED, 1)?,
            }),
            Self::JOINED => Ok(ServerEvent::Joined {
                room: room_arg(&args, Self::JOINED, 0)?,
                conn_id: conn_arg(&args, Self::JOINED, 1)?,
            }),
            Self::FULL => Ok(ServerEvent::Full {
                room: room_arg(&args, Self::FULL, 0)?,
            }),
            Self::PEER_JOINED => Ok(ServerEvent::PeerJoined {
                room: room_arg(&args, Self::PEER_JOINED, 0)?,
            }),
            Self::READY => Ok(ServerEvent::Ready),
            Self::MESSAGE => {
                if args.is_empty() {
                    return Err(ProtocolError::MissingArgument {
                        event: Self::MESSAGE,
                        position: 0,
                    });
                }
                let room = room_arg(&args, Self::MESSAGE, 1)?;
                let payload = args.swap_remove(0);
                Ok(ServerEvent::Message { payload, room })
            }
            Self::IPADDR => {
                let address = str_arg(&args, Self::IPADDR, 0)?
                    .parse()
                    .map_err(|_| ProtocolError::InvalidArgument {
                        event: Self::IPADDR,
                        position: 0,
                        expected: "an IPv4 address",
                    })?;
                Ok(ServerEvent::IpAddr { address })
            }
            Self::PEER_LEFT => Ok(ServerEvent::PeerLeft {
                conn_id: conn_arg(&args, Self::PEER_LEFT, 0)?,
            }),
            Self::LOG => {
                let lines = match args.first_mut() {
                    Some(Value::Array(items)) => std::mem::take(items),
                    Some(_) => {
                        return Err(ProtocolError::InvalidArgument {
                            event: Self::LOG,
                            position: 0,
                            expected: "an array",
                        });
                    }
                    None => Vec::new(),
                };
                Ok(ServerEvent::Log { lines })
            }
            _ => Err(ProtocolError::UnknownEvent(name)),
        }
    }
}

impl Serialize for ServerEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        seq.serialize_element(self.name())?;
        match self {
            ServerEvent::Created { room, conn_id } | ServerEvent::Joined { room, conn_id } => {
                seq.serialize_element(room)?;
                seq.serialize_element(conn_id)?;
            }
            ServerEvent::Full { room } | ServerEvent::PeerJoined { room } => {
                seq.serialize_element(room)?;
            }
            ServerEvent::Ready => {}
            ServerEvent::Message { payload, room } => {
                seq.serialize_element(payload)?;
                seq.serialize_element(room)?;
            }
            ServerEvent::IpAddr { address } => seq.serialize_element(&address.to_string())?,
            ServerEvent::PeerLeft { conn_id } => seq.serialize_element(conn_id)?,
            ServerEvent::Log { lines } => seq.serialize_element(lines)?,
        }
        seq.end()
    }
}

fn split_frame(text: &str) -> Result<(String, Vec<Value>), ProtocolError> {
    let Value::Array(mut items) = serde_json::from_str::<Value>(text)? else {
        return Err(ProtocolError::NotAnArray);
    };
    if items.is_empty() {
        return Err(ProtocolError::MissingEventName);
    }
    let Value::String(name) = items.remove(0) else {
        return Err(ProtocolError::MissingEventName);
    };
    Ok((name, items))
}

fn str_arg<'a>(
    args: &'a [Value],
    event: &'static str,
    position: usize,
) -> Result<&'a str, ProtocolError> {
    match args.get(position) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ProtocolError::InvalidArgument {
            event,
            position,
            expected: "a string",
        }),
        None => Err(ProtocolError::MissingArgument { event, position }),
    }
}

fn room_arg(args: &[Value], event: &'static str, position: usize) -> Result<RoomKey, ProtocolError> {
    let key = str_arg(args, event, position)?;
    if key.is_empty() {
        return Err(ProtocolError::InvalidArgument {
            event,
            position,
            expected: "a non-empty room key",
        });
    }
    Ok(RoomKey::from(key))
}

fn conn_arg(args: &[Value], event: &'static str, position: usize) -> Result<ConnId, ProtocolError> {
    str_arg(args, event, position)?
        .parse()
        .map_err(|_| ProtocolError::InvalidArgument {
            event,
            position,
            expected: "a connection id",
        })
}
