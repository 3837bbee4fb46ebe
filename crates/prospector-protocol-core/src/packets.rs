use crate::codec::*;
use crate::state::ConnectionState;
use bytes::{BufMut, BytesMut};
use prospector_types::ByteCursor;

pub const HANDSHAKE_ID: i32 = 0x00;
pub const STATUS_REQUEST_ID: i32 = 0x00;
pub const STATUS_RESPONSE_ID: i32 = 0x00;
pub const PING_REQUEST_ID: i32 = 0x01;
pub const PONG_RESPONSE_ID: i32 = 0x01;

/// Longest server address a handshake may carry.
pub const MAX_SERVER_ADDRESS_CHARS: usize = 255;

/// Packets of the handshake and status states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusPacket {
    // === Handshaking (serverbound) ===
    Handshake {
        protocol_version: i32,
        server_address: String,
        server_port: u16,
        next_state: i32,
    },

    // === Status ===
    StatusRequest,
    StatusResponse {
        json: String,
    },
    PingRequest {
        payload: i64,
    },
    PongResponse {
        payload: i64,
    },
}

impl StatusPacket {
    pub fn packet_id(&self) -> i32 {
        match self {
            StatusPacket::Handshake { .. } => HANDSHAKE_ID,
            StatusPacket::StatusRequest => STATUS_REQUEST_ID,
            StatusPacket::StatusResponse { .. } => STATUS_RESPONSE_ID,
            StatusPacket::PingRequest { .. } => PING_REQUEST_ID,
            StatusPacket::PongResponse { .. } => PONG_RESPONSE_ID,
        }
    }

    /// Encode the packet body, without the packet id or length prefix.
    pub fn encode_payload(&self, buf: &mut BytesMut) {
        match self {
            StatusPacket::Handshake {
                protocol_version,
                server_address,
                server_port,
                next_state,
            } => {
                write_varint(buf, *protocol_version);
                write_string(buf, server_address);
                buf.put_u16(*server_port);
                write_varint(buf, *next_state);
            }
            StatusPacket::StatusRequest => {}
            StatusPacket::StatusResponse { json } => write_string(buf, json),
            StatusPacket::PingRequest { payload } | StatusPacket::PongResponse { payload } => {
                buf.put_i64(*payload)
            }
        }
    }

    /// Packet id followed by the body.
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, self.packet_id());
        self.encode_payload(&mut buf);
        buf
    }

    /// Decode a packet the server sends in `state`.
    pub fn decode_clientbound(state: ConnectionState, packet_id: i32, payload: &[u8]) -> CodecResult<Self> {
        decode_exact(payload, |cur| match (state, packet_id) {
            (ConnectionState::Status, STATUS_RESPONSE_ID) => Ok(StatusPacket::StatusResponse {
                json: read_string(cur, MAX_STRING_CHARS).field("status json")?,
            }),
            (ConnectionState::Status, PONG_RESPONSE_ID) => Ok(StatusPacket::PongResponse {
                payload: read_i64(cur).field("pong payload")?,
            }),
            _ => Err(CodecError::UnknownTypeId {
                kind: "clientbound packet",
                id: packet_id,
            }),
        })
    }

    /// Decode a packet the client sends in `state`.
    pub fn decode_serverbound(state: ConnectionState, packet_id: i32, payload: &[u8]) -> CodecResult<Self> {
        decode_exact(payload, |cur| match (state, packet_id) {
            (ConnectionState::Handshaking, HANDSHAKE_ID) => Ok(StatusPacket::Handshake {
                protocol_version: read_varint(cur).field("protocol version")?,
                server_address: read_string(cur, MAX_SERVER_ADDRESS_CHARS).field("server address")?,
                server_port: read_u16(cur).field("server port")?,
                next_state: read_next_state(cur).field("next state")?,
            }),
            (ConnectionState::Status, STATUS_REQUEST_ID) => Ok(StatusPacket::StatusRequest),
            (ConnectionState::Status, PING_REQUEST_ID) => Ok(StatusPacket::PingRequest {
                payload: read_i64(cur).field("ping payload")?,
            }),
            _ => Err(CodecError::UnknownTypeId {
                kind: "serverbound packet",
                id: packet_id,
            }),
        })
    }
}

/// The handshake's next state, which must name a state the handshake can enter.
fn read_next_state(cur: &mut ByteCursor<'_>) -> CodecResult<i32> {
    let next = read_varint(cur)?;
    match ConnectionState::from_handshake_next(next) {
        Some(_) => Ok(next),
        None => Err(CodecError::UnknownTypeId {
            kind: "handshake next state",
            id: next,
        }),
    }
}

/// A packet body must be consumed exactly.
fn decode_exact<T>(
    payload: &[u8],
    decode: impl FnOnce(&mut ByteCursor<'_>) -> CodecResult<T>,
) -> CodecResult<T> {
    let mut cur = ByteCursor::new(payload);
    let value = decode(&mut cur)?;
    if !cur.is_empty() {
        return Err(CodecError::TrailingBytes(cur.remaining()));
    }
    Ok(value)
}
