use crate::config::SessionConfig;
use crate::status_json::{JsonStatusParser, ServerStatusInfo, StatusJsonParser};
use bytes::BytesMut;
use prospector_protocol_core::{CodecError, Connection, ConnectionError, ConnectionState, Frame, StatusPacket};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::Instant;
use tracing::debug;

/// Where a status session is. Transitions only move forward; `Complete` and
/// `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    HandshakeSent,
    StatusRequestSent,
    StatusResponseReceived,
    PingSent,
    Complete,
    Failed(FailureReason),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Complete | SessionState::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("connection timed out")]
    Timeout,
    #[error("server closed the connection")]
    ConnectionClosed,
    #[error("I/O error: {0}")]
    Io(String),
    #[error("framing error: {0}")]
    Framing(String),
    #[error("malformed packet: {0}")]
    Codec(String),
    #[error("unexpected response: {0}")]
    ProtocolMismatch(String),
}

impl From<ConnectionError> for FailureReason {
    fn from(err: ConnectionError) -> Self {
        match err {
            ConnectionError::Timeout => FailureReason::Timeout,
            ConnectionError::Closed => FailureReason::ConnectionClosed,
            ConnectionError::Io(e) => FailureReason::Io(e.to_string()),
            ConnectionError::Frame(e) => FailureReason::Framing(e.to_string()),
        }
    }
}

impl From<CodecError> for FailureReason {
    fn from(err: CodecError) -> Self {
        FailureReason::Codec(err.to_string())
    }
}

/// One status query against one server: handshake, status request, ping.
/// A session owns its socket and is used once; retry by building a new one.
pub struct StatusSession<P = JsonStatusParser> {
    config: SessionConfig,
    parser: P,
    state: SessionState,
}

impl StatusSession<JsonStatusParser> {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_parser(config, JsonStatusParser)
    }
}

impl<P: StatusJsonParser> StatusSession<P> {
    pub fn with_parser(config: SessionConfig, parser: P) -> Self {
        Self {
            config,
            parser,
            state: SessionState::Disconnected,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run the whole exchange. Every step shares one deadline set here.
    pub async fn run(&mut self) -> Result<ServerStatusInfo, FailureReason> {
        if self.state != SessionState::Disconnected {
            return Err(FailureReason::ProtocolMismatch(format!(
                "session already used (state {:?})",
                self.state
            )));
        }
        let deadline = Instant::now() + self.config.timeout;
        self.transition(SessionState::Connecting);
        let result = match Connection::connect(&self.config.host, self.config.port, deadline).await {
            Ok(conn) => self.exchange(conn).await,
            Err(e) => Err(e.into()),
        };
        match &result {
            Ok(_) => self.transition(SessionState::Complete),
            Err(reason) => self.transition(SessionState::Failed(reason.clone())),
        }
        result
    }

    async fn exchange<S>(&mut self, mut conn: Connection<S>) -> Result<ServerStatusInfo, FailureReason>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let next_state = ConnectionState::Status
            .handshake_next()
            .ok_or_else(|| FailureReason::ProtocolMismatch("status is not a handshake target".into()))?;
        let handshake = StatusPacket::Handshake {
            protocol_version: self.config.protocol_version,
            server_address: self.config.host.clone(),
            server_port: self.config.port,
            next_state,
        };
        send(&mut conn, &handshake).await?;
        self.transition(SessionState::HandshakeSent);

        send(&mut conn, &StatusPacket::StatusRequest).await?;
        self.transition(SessionState::StatusRequestSent);

        let json = match receive(&mut conn).await? {
            StatusPacket::StatusResponse { json } => json,
            other => return Err(unexpected("status response", &other)),
        };
        let mut info = self
            .parser
            .parse(&json)
            .map_err(|e| FailureReason::ProtocolMismatch(e.to_string()))?;
        self.transition(SessionState::StatusResponseReceived);

        let sent = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        let ping_start = Instant::now();
        send(&mut conn, &StatusPacket::PingRequest { payload: sent }).await?;
        self.transition(SessionState::PingSent);

        match receive(&mut conn).await? {
            StatusPacket::PongResponse { payload } => {
                if payload != sent {
                    debug!(
                        "{} echoed pong payload {} instead of {}",
                        self.config.address(),
                        payload,
                        sent
                    );
                }
            }
            other => return Err(unexpected("pong", &other)),
        }
        info.latency_ms = ping_start.elapsed().as_millis() as u64;
        conn.shutdown().await;
        Ok(info)
    }

    fn transition(&mut self, next: SessionState) {
        debug!("{}: {:?} -> {:?}", self.config.address(), self.state, next);
        self.state = next;
    }
}

async fn send<S>(conn: &mut Connection<S>, packet: &StatusPacket) -> Result<(), FailureReason>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut payload = BytesMut::new();
    packet.encode_payload(&mut payload);
    conn.write_packet(packet.packet_id(), &payload).await?;
    Ok(())
}

async fn receive<S>(conn: &mut Connection<S>) -> Result<StatusPacket, FailureReason>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let Frame { packet_id, payload } = conn.read_frame().await?;
    Ok(StatusPacket::decode_clientbound(
        ConnectionState::Status,
        packet_id,
        &payload,
    )?)
}

fn unexpected(expected: &str, got: &StatusPacket) -> FailureReason {
    FailureReason::ProtocolMismatch(format!(
        "expected {}, got packet 0x{:02X}",
        expected,
        got.packet_id()
    ))
}
