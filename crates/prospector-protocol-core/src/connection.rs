use crate::codec::{read_varint, write_varint, CodecError, FieldContext};
use bytes::{Buf, Bytes, BytesMut};
use prospector_types::ByteCursor;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tracing::trace;

/// Largest frame body a length prefix may announce (3-byte VarInt maximum).
pub const MAX_PACKET_LEN: usize = 2_097_151;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame length prefix is not a valid VarInt")]
    MalformedLength,
    #[error("negative frame length {0}")]
    NegativeLength(i32),
    #[error("frame length {0} exceeds {max}", max = MAX_PACKET_LEN)]
    TooLarge(usize),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("deadline expired")]
    Timeout,
    #[error("connection closed by peer")]
    Closed,
    #[error("I/O error: {0}")]
    Io(io::Error),
    #[error("framing error: {0}")]
    Frame(#[from] FrameError),
}

impl From<io::Error> for ConnectionError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => ConnectionError::Closed,
            _ => ConnectionError::Io(err),
        }
    }
}

/// One packet: its id and the bytes after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub packet_id: i32,
    pub payload: Bytes,
}

/// Incremental frame parser. Bytes arrive in arbitrary chunks; a length prefix is
/// only consumed once it decodes completely, and then the body is awaited.
#[derive(Debug, Default)]
pub struct FrameAccumulator {
    buf: BytesMut,
    pending_len: Option<usize>,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes held that are not yet part of a returned frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Take the next complete frame, or `None` if more bytes are needed.
    pub fn try_frame(&mut self) -> Result<Option<Frame>, FrameError> {
        let len = match self.pending_len {
            Some(len) => len,
            None => {
                let mut peek = ByteCursor::new(&self.buf);
                let raw = match read_varint(&mut peek) {
                    Ok(raw) => raw,
                    Err(e) if e.is_truncated() => return Ok(None),
                    Err(_) => return Err(FrameError::MalformedLength),
                };
                let width = peek.position();
                let len = usize::try_from(raw).map_err(|_| FrameError::NegativeLength(raw))?;
                if len > MAX_PACKET_LEN {
                    return Err(FrameError::TooLarge(len));
                }
                self.buf.advance(width);
                self.pending_len = Some(len);
                len
            }
        };
        if self.buf.len() < len {
            return Ok(None);
        }
        let body = self.buf.split_to(len).freeze();
        self.pending_len = None;

        let mut cur = ByteCursor::new(&body);
        let packet_id = read_varint(&mut cur).field("packet id")?;
        let payload = body.slice(cur.position()..);
        Ok(Some(Frame { packet_id, payload }))
    }
}

/// Length-prefix a packet id and body.
pub fn encode_frame(packet_id: i32, payload: &[u8]) -> BytesMut {
    let mut packet_buf = BytesMut::new();
    write_varint(&mut packet_buf, packet_id);
    packet_buf.extend_from_slice(payload);

    let mut frame = BytesMut::with_capacity(packet_buf.len() + 3);
    write_varint(&mut frame, packet_buf.len() as i32);
    frame.extend_from_slice(&packet_buf);
    frame
}

/// A framed connection where every read and write shares one deadline.
pub struct Connection<S> {
    stream: S,
    frames: FrameAccumulator,
    deadline: Instant,
}

impl Connection<TcpStream> {
    /// Open a TCP connection, bounded by `deadline`.
    pub async fn connect(host: &str, port: u16, deadline: Instant) -> Result<Self, ConnectionError> {
        let stream = timeout_at(deadline, TcpStream::connect((host, port)))
            .await
            .map_err(|_| ConnectionError::Timeout)??;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream, deadline))
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S, deadline: Instant) -> Self {
        Self {
            stream,
            frames: FrameAccumulator::new(),
            deadline,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Read a single packet frame.
    pub async fn read_frame(&mut self) -> Result<Frame, ConnectionError> {
        loop {
            if let Some(frame) = self.frames.try_frame()? {
                trace!(
                    "Read packet id=0x{:02X} len={}",
                    frame.packet_id,
                    frame.payload.len()
                );
                return Ok(frame);
            }
            let mut tmp = [0u8; 4096];
            let n = timeout_at(self.deadline, self.stream.read(&mut tmp))
                .await
                .map_err(|_| ConnectionError::Timeout)??;
            if n == 0 {
                return Err(ConnectionError::Closed);
            }
            self.frames.push(&tmp[..n]);
        }
    }

    /// Write a packet with the given ID and payload.
    pub async fn write_packet(&mut self, packet_id: i32, payload: &[u8]) -> Result<(), ConnectionError> {
        let frame = encode_frame(packet_id, payload);
        let stream = &mut self.stream;
        timeout_at(self.deadline, async move {
            stream.write_all(&frame).await?;
            stream.flush().await
        })
        .await
        .map_err(|_| ConnectionError::Timeout)??;
        trace!("Wrote packet id=0x{:02X} len={}", packet_id, payload.len());
        Ok(())
    }

    /// Close the write side. Errors are ignored; the connection is finished either way.
    pub async fn shutdown(mut self) {
        let _ = timeout_at(self.deadline, self.stream.shutdown()).await;
    }
}
