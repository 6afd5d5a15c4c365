//! Per-socket pumps.
//!
//! A [`Connection`] is two threads sharing nothing but the connection's
//! bounded outbound queue and the world/hub handles:
//!
//! - the **reader** reads one `\n`-terminated frame at a time, enforcing
//!   `max_message_size` and a read deadline of `pong_wait` that every
//!   received frame extends. Frames decode through the [`Codec`]; actions
//!   go to the world, chat goes to the hub, undecodable frames are logged
//!   and skipped. When the socket ends the reader unregisters.
//! - the **writer** drains the outbound queue, coalescing whatever is
//!   already queued into one flush, and emits a ping frame every
//!   `ping_period`. It stops when the hub closes the queue or a write
//!   fails, then shuts the socket down.
//!
//! Transport upgrade (HTTP, websockets) happens before a stream gets here.

use std::error::Error;
use std::fmt;
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{select, Receiver};
use log::{debug, error, info, warn};
use warfield_core::{Codec, ConnectionId, EntityId, Frame, Inbound, RegisterError, SubmitError};

use crate::actor::WorldHandle;
use crate::config::ServerConfig;
use crate::hub::HubHandle;

// ── Duplex ─────────────────────────────────────────────────────────

/// A bidirectional byte stream that can be split between two threads.
pub trait Duplex: Read + Write + Send + Sized + 'static {
    /// A second handle to the same stream.
    fn try_clone(&self) -> io::Result<Self>;
    /// Bound each blocking read. `None` blocks forever.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
    /// Bound each blocking write. `None` blocks forever.
    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
    /// Close both directions, waking any blocked reader.
    fn shutdown(&self) -> io::Result<()>;
}

impl Duplex for TcpStream {
    fn try_clone(&self) -> io::Result<Self> {
        TcpStream::try_clone(self)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_write_timeout(self, timeout)
    }

    fn shutdown(&self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

// ── ConnectionError ────────────────────────────────────────────────

/// Why a pump stopped, or why a connection could not be opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionError {
    /// The socket failed. Read deadlines surface as `TimedOut`.
    Io(ErrorKind),
    /// The peer sent a frame longer than the limit.
    MessageTooLarge {
        /// Configured `max_message_size`.
        limit: usize,
    },
    /// The peer hung up, or the hub closed the outbound queue.
    Closed,
    /// The hub refused the registration.
    Refused(RegisterError),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(kind) => write!(f, "i/o error: {kind}"),
            Self::MessageTooLarge { limit } => {
                write!(f, "frame exceeds {limit} bytes")
            }
            Self::Closed => write!(f, "connection closed"),
            Self::Refused(e) => write!(f, "registration refused: {e}"),
        }
    }
}

impl Error for ConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Refused(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ConnectionError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => Self::Io(ErrorKind::TimedOut),
            ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe => Self::Closed,
            kind => Self::Io(kind),
        }
    }
}

impl From<RegisterError> for ConnectionError {
    fn from(e: RegisterError) -> Self {
        Self::Refused(e)
    }
}

// ── Settings and context ───────────────────────────────────────────

/// The per-connection slice of [`ServerConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PumpSettings {
    /// Capacity of the outbound queue.
    pub outbound_queue: usize,
    /// Largest inbound frame in bytes, `\n` or `\r\n` terminator excluded.
    pub max_message_size: usize,
    /// Write timeout per socket write.
    pub write_wait: Duration,
    /// Read deadline, extended by every received frame.
    pub pong_wait: Duration,
    /// Interval between ping frames.
    pub ping_period: Duration,
}

impl PumpSettings {
    /// Extract the pump settings from a server configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            outbound_queue: config.outbound_queue,
            max_message_size: config.max_message_size,
            write_wait: config.write_wait,
            pong_wait: config.pong_wait,
            ping_period: config.ping_period,
        }
    }
}

impl Default for PumpSettings {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

/// Everything a new connection needs to reach the rest of the server.
#[derive(Clone)]
pub struct ConnectionContext {
    /// World submission handle.
    pub world: WorldHandle,
    /// Hub submission handle.
    pub hub: HubHandle,
    /// Frame codec shared by every connection.
    pub codec: Arc<dyn Codec>,
    /// Queue sizes and timers.
    pub settings: PumpSettings,
}

// ── Connection ─────────────────────────────────────────────────────

/// A registered connection and its two pump threads.
///
/// Dropping a `Connection` detaches the pumps; they keep running until the
/// socket ends or the hub closes the queue.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    entity: EntityId,
    name: String,
    reader: JoinHandle<ConnectionError>,
    writer: JoinHandle<ConnectionError>,
}

impl Connection {
    /// Register `stream` with the hub and start its pumps.
    ///
    /// On success a welcome notice and a fresh snapshot are broadcast to
    /// every connection. A refused registration closes the stream and
    /// returns [`ConnectionError::Refused`].
    pub fn open<S: Duplex>(stream: S, ctx: &ConnectionContext) -> Result<Self, ConnectionError> {
        let settings = ctx.settings;
        let read_half = stream.try_clone()?;
        stream.set_write_timeout(Some(settings.write_wait))?;

        let (tx, rx) = crossbeam_channel::bounded(settings.outbound_queue);
        let reg = match ctx.hub.register(tx) {
            Ok(reg) => reg,
            Err(e) => {
                warn!("connection refused: {e}");
                close(&stream, "refused connection");
                return Err(e.into());
            }
        };
        let id = reg.id;

        let codec = Arc::clone(&ctx.codec);
        let writer = thread::Builder::new()
            .name(format!("warfield-{id}-tx"))
            .spawn(move || write_pump(stream, id, rx, codec, settings));
        let writer = match writer {
            Ok(handle) => handle,
            Err(e) => {
                error!("{id}: writer thread spawn failed: {e}");
                let _ = ctx.hub.unregister(id);
                return Err(e.into());
            }
        };

        let reader_ctx = ctx.clone();
        let (entity, name) = (reg.entity, reg.name.clone());
        let reader = thread::Builder::new()
            .name(format!("warfield-{id}-rx"))
            .spawn(move || read_pump(read_half, id, entity, name, reader_ctx));
        let reader = match reader {
            Ok(handle) => handle,
            Err(e) => {
                error!("{id}: reader thread spawn failed: {e}");
                // Closing the queue stops the writer.
                let _ = ctx.hub.unregister(id);
                return Err(e.into());
            }
        };

        let mut frames = vec![ctx.codec.encode_notice(&format!("{} joined", reg.name))];
        match ctx.world.snapshot() {
            Ok(snap) => frames.extend(ctx.codec.encode_snapshot(&snap)),
            Err(e) => debug!("{id}: no welcome snapshot: {e}"),
        }
        if let Err(e) = ctx.hub.broadcast(frames) {
            debug!("{id}: welcome broadcast skipped: {e}");
        }

        Ok(Self {
            id,
            entity: reg.entity,
            name: reg.name,
            reader,
            writer,
        })
    }

    /// Hub-assigned connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Entity logged in for this connection.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for both pumps. Returns why the reader stopped, or `None` if
    /// it panicked.
    pub fn join(self) -> Option<ConnectionError> {
        let read = self.reader.join().ok();
        if let Ok(write) = self.writer.join() {
            debug!("{}: writer stopped: {write}", self.id);
        }
        read
    }
}

fn close<S: Duplex>(stream: &S, who: impl fmt::Display) {
    if let Err(e) = stream.shutdown() {
        debug!("{who}: shutdown: {e}");
    }
}

// ── Reader ─────────────────────────────────────────────────────────

/// Splits a stream into `\n`-terminated frames under a size limit and a
/// deadline.
struct FrameReader<S: Duplex> {
    inner: BufReader<S>,
    limit: usize,
    deadline: Instant,
    buf: Vec<u8>,
}

impl<S: Duplex> FrameReader<S> {
    fn new(stream: S, limit: usize, wait: Duration) -> Self {
        Self {
            inner: BufReader::new(stream),
            limit,
            deadline: Instant::now() + wait,
            buf: Vec::with_capacity(limit.min(4096)),
        }
    }

    /// Push the deadline to `wait` from now.
    fn extend_deadline(&mut self, wait: Duration) {
        self.deadline = Instant::now() + wait;
    }

    /// The next frame, without its terminator or a trailing `\r`.
    ///
    /// Each blocking read is bounded by the time left before the deadline,
    /// so a peer trickling bytes cannot hold the frame open past it.
    fn next_frame(&mut self) -> Result<&[u8], ConnectionError> {
        self.buf.clear();
        loop {
            let left = self
                .deadline
                .checked_duration_since(Instant::now())
                .filter(|d| !d.is_zero())
                .ok_or(ConnectionError::Io(ErrorKind::TimedOut))?;
            self.inner.get_ref().set_read_timeout(Some(left))?;
            let (used, complete) = {
                let available = match self.inner.fill_buf() {
                    Ok(bytes) => bytes,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                };
                if available.is_empty() {
                    return Err(ConnectionError::Closed);
                }
                match available.iter().position(|&b| b == b'\n') {
                    Some(end) => {
                        self.buf.extend_from_slice(&available[..end]);
                        (end + 1, true)
                    }
                    None => {
                        self.buf.extend_from_slice(available);
                        (available.len(), false)
                    }
                }
            };
            self.inner.consume(used);
            // A trailing `\r` may still turn out to be part of the terminator.
            let body = match self.buf.last() {
                Some(b'\r') => self.buf.len() - 1,
                _ => self.buf.len(),
            };
            if body > self.limit {
                return Err(ConnectionError::MessageTooLarge { limit: self.limit });
            }
            if complete {
                break;
            }
        }
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        Ok(&self.buf)
    }

    fn get_ref(&self) -> &S {
        self.inner.get_ref()
    }
}

fn read_pump<S: Duplex>(
    stream: S,
    id: ConnectionId,
    entity: EntityId,
    name: String,
    ctx: ConnectionContext,
) -> ConnectionError {
    let settings = ctx.settings;
    let mut frames = FrameReader::new(stream, settings.max_message_size, settings.pong_wait);
    let exit = 'frames: loop {
        let bytes = match frames.next_frame() {
            Ok(bytes) => bytes,
            Err(e) => break e,
        };
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("{id}: dropped non-UTF-8 frame: {e}");
                frames.extend_deadline(settings.pong_wait);
                continue;
            }
        };
        let decoded = ctx.codec.decode(text);
        frames.extend_deadline(settings.pong_wait);
        let messages = match decoded {
            Ok(messages) => messages,
            Err(e) => {
                warn!("{id}: dropped frame: {e}");
                continue;
            }
        };
        for message in messages {
            if let Err(e) = dispatch(message, id, entity, &ctx) {
                debug!("{id}: {e}; reader stopping");
                break 'frames ConnectionError::Closed;
            }
        }
    };

    match &exit {
        ConnectionError::Closed => info!("{id} ('{name}') disconnected"),
        ConnectionError::Io(ErrorKind::TimedOut) => {
            info!("{id} ('{name}') timed out after {:?}", settings.pong_wait)
        }
        ConnectionError::MessageTooLarge { .. } => warn!("{id} ('{name}') dropped: {exit}"),
        other => error!("{id} ('{name}') read failed: {other}"),
    }

    if ctx.hub.unregister(id).is_ok() {
        let notice = ctx.codec.encode_notice(&format!("{name} left"));
        let _ = ctx.hub.broadcast(vec![notice]);
    }
    close(frames.get_ref(), id);
    exit
}

fn dispatch(
    message: Inbound,
    id: ConnectionId,
    entity: EntityId,
    ctx: &ConnectionContext,
) -> Result<(), SubmitError> {
    match message {
        Inbound::Action(action) => ctx.world.submit(action.into_event(entity)),
        Inbound::Chat(text) => ctx.hub.chat(id, text),
        Inbound::Pong => {
            debug!("{id}: pong");
            Ok(())
        }
    }
}

// ── Writer ─────────────────────────────────────────────────────────

fn write_pump<S: Duplex>(
    stream: S,
    id: ConnectionId,
    rx: Receiver<Frame>,
    codec: Arc<dyn Codec>,
    settings: PumpSettings,
) -> ConnectionError {
    let ping = crossbeam_channel::tick(settings.ping_period);
    let mut out = BufWriter::new(stream);
    let exit = loop {
        let written = select! {
            recv(rx) -> msg => match msg {
                Ok(frame) => write_batch(&mut out, &frame, &rx).map_err(ConnectionError::from),
                Err(_) => Err(ConnectionError::Closed),
            },
            recv(ping) -> _ => {
                write_batch(&mut out, &codec.encode_ping(), &rx).map_err(ConnectionError::from)
            }
        };
        if let Err(e) = written {
            break e;
        }
    };
    match &exit {
        ConnectionError::Closed => debug!("{id}: outbound queue closed"),
        other => warn!("{id}: write failed: {other}"),
    }
    close(out.get_ref(), id);
    exit
}

/// Write `first` and everything already queued behind it, then flush once.
fn write_batch<W: Write>(out: &mut W, first: &str, rx: &Receiver<Frame>) -> io::Result<()> {
    write_frame(out, first)?;
    for frame in rx.try_iter().take(rx.len()) {
        write_frame(out, &frame)?;
    }
    out.flush()
}

fn write_frame<W: Write>(out: &mut W, frame: &str) -> io::Result<()> {
    out.write_all(frame.as_bytes())?;
    out.write_all(b"\n")
}
