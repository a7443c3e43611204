use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Read};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TrySendError};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, trace, warn};
use wombat::{write_message, ClientEvent, ConnectionId, ServerEvent};

use crate::{Config, Coordinator, Deliveries};

/// Longest accepted line, not counting the newline.
pub const MAX_LINE_LEN: usize = 64 * 1024;
/// Events waiting for a slow connection before it is dropped.
pub const SEND_QUEUE_LEN: usize = 256;
/// A connection that accepts no bytes for this long is dropped.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that happened on one of the connections.
enum Inbound {
    Connected { conn: ConnectionId, outlet: Outlet },
    Event { conn: ConnectionId, event: ClientEvent },
    Malformed { conn: ConnectionId, message: String },
    Disconnected { conn: ConnectionId },
}

/// The coordinator's end of a connection.
struct Outlet {
    queue: SyncSender<ServerEvent>,
    /// Kept to tear the connection down when it falls behind.
    stream: TcpStream,
}

/// Accepts connections and runs the coordinator until the listener fails.
///
/// Every connection gets one thread that reads and decodes lines and one that
/// writes responses from a bounded queue. All events are funneled into this
/// thread, which handles them one at a time. It never blocks on a socket: a
/// connection whose queue is full gets disconnected.
pub fn serve(listener: TcpListener, config: Config) -> anyhow::Result<()> {
    info!(addr = %listener.local_addr()?, "Listening");
    let (sender, receiver) = mpsc::channel();
    let acceptor = thread::spawn(move || accept(listener, sender));
    run_coordinator(Coordinator::new(config), receiver);
    match acceptor.join() {
        Ok(result) => result,
        Err(_) => anyhow::bail!("The acceptor thread panicked"),
    }
}

fn accept(listener: TcpListener, sender: Sender<Inbound>) -> anyhow::Result<()> {
    let mut next_id = 1;
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                warn!(%err, "Failed to accept a connection");
                continue;
            }
        };
        let conn = ConnectionId(next_id);
        next_id += 1;
        info!(%conn, peer = ?stream.peer_addr().ok(), "Connected");

        let (reader, writer) = match split(&stream) {
            Ok(halves) => halves,
            Err(err) => {
                warn!(%conn, %err, "Failed to set up the connection");
                continue;
            }
        };
        let (queue, outgoing) = mpsc::sync_channel(SEND_QUEUE_LEN);
        let outlet = Outlet { queue, stream };
        if sender.send(Inbound::Connected { conn, outlet }).is_err() {
            break;
        }
        thread::spawn(move || write_events(conn, writer, outgoing));
        let sender = sender.clone();
        thread::spawn(move || read_events(conn, reader, sender));
    }
    Ok(())
}

/// Returns separate handles for the reader and the writer thread.
fn split(stream: &TcpStream) -> io::Result<(TcpStream, TcpStream)> {
    stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
    Ok((stream.try_clone()?, stream.try_clone()?))
}

fn read_events(conn: ConnectionId, stream: TcpStream, sender: Sender<Inbound>) {
    let mut reader = BufReader::new(stream);
    let mut buf = String::new();
    // One byte more than the limit, to tell a full line from an endless one
    let limit = MAX_LINE_LEN as u64 + 1;
    loop {
        buf.clear(); // because read_line() appends to the buffer
        match (&mut reader).take(limit).read_line(&mut buf) {
            Ok(0) => break,
            Ok(n) if n > MAX_LINE_LEN && !buf.ends_with('\n') => {
                debug!(%conn, "Line too long");
                let message = format!("Lines must not exceed {} bytes", MAX_LINE_LEN);
                let _ = sender.send(Inbound::Malformed { conn, message });
                break;
            }
            Ok(_) => {}
            Err(err) => {
                debug!(%conn, %err, "Read failed");
                break;
            }
        }
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }
        trace!(%conn, line, "Received");
        let inbound = match serde_json::from_str::<ClientEvent>(line) {
            Ok(event) => Inbound::Event { conn, event },
            Err(err) => Inbound::Malformed {
                conn,
                message: format!("Malformed event: {}", err),
            },
        };
        if sender.send(inbound).is_err() {
            return;
        }
    }
    let _ = sender.send(Inbound::Disconnected { conn });
}

/// Drains the queue of one connection until the coordinator drops it.
fn write_events(conn: ConnectionId, mut stream: TcpStream, outgoing: Receiver<ServerEvent>) {
    for event in outgoing {
        if let Err(err) = write_message(&mut stream, &event) {
            // Timeouts end up here too
            warn!(%conn, %err, "Failed to send");
            let _ = stream.shutdown(Shutdown::Both);
            return;
        }
    }
}

fn run_coordinator(mut coordinator: Coordinator, receiver: Receiver<Inbound>) {
    let mut outlets: HashMap<ConnectionId, Outlet> = HashMap::new();
    for inbound in receiver {
        let deliveries = match inbound {
            Inbound::Connected { conn, outlet } => {
                outlets.insert(conn, outlet);
                Vec::new()
            }
            Inbound::Event { conn, event } => {
                debug!(%conn, ?event, "Handling event");
                coordinator.handle(conn, event)
            }
            Inbound::Malformed { conn, message } => {
                debug!(%conn, %message, "Malformed event");
                vec![(conn, ServerEvent::Error { message })]
            }
            Inbound::Disconnected { conn } => {
                info!(%conn, "Disconnected");
                // The writer still flushes what is queued
                outlets.remove(&conn);
                coordinator.disconnect(conn)
            }
        };
        send_all(&mut outlets, deliveries);
    }
}

fn send_all(outlets: &mut HashMap<ConnectionId, Outlet>, deliveries: Deliveries) {
    for (conn, event) in deliveries {
        let Some(outlet) = outlets.get(&conn) else {
            continue;
        };
        match outlet.queue.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                // The reader notices the shutdown and reports the disconnect
                warn!(%conn, "Connection is not keeping up, dropping it");
                let _ = outlet.stream.shutdown(Shutdown::Both);
                outlets.remove(&conn);
            }
            Err(TrySendError::Disconnected(_)) => {
                outlets.remove(&conn);
            }
        }
    }
}
