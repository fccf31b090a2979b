//! Dispatch engine
//!
//! Owns the listening socket, the handler registry and the shutdown flag.
//! `serve_all` runs the accept loop on the calling thread and spawns one
//! worker thread per connection; on shutdown it stops accepting, then joins
//! every worker before returning.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use gammarpc_common::transport::framing;
use gammarpc_common::{Message, Operation, Payload, Result, RpcError};

use crate::registry::{Handler, HandlerRegistry};

/// Tuning knobs for the accept and worker loops.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// How long the accept loop sleeps when no connection is pending
    pub accept_poll_interval: Duration,
    /// How long a worker sleeps when its connection is idle
    pub worker_poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            accept_poll_interval: Duration::from_millis(50),
            worker_poll_interval: Duration::from_millis(10),
        }
    }
}

/// Cooperative stop flag shared between the engine, its workers and the
/// embedding application.
///
/// Cloning yields another handle to the same flag. Signalling is sticky:
/// once set, `serve_all` returns after joining its workers, and every worker
/// exits at the top of its next iteration. In-flight handlers are not
/// preempted.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown.
    pub fn signal(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested.
    pub fn is_signalled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The gammarpc server engine.
///
/// # Example
///
/// ```no_run
/// use gammarpc_common::Payload;
/// use gammarpc_server::Server;
///
/// let server = Server::bind("0.0.0.0:3000").unwrap();
/// server.register("echo", |input: &Payload| Some(input.clone())).unwrap();
/// server.serve_all().unwrap();
/// ```
pub struct Server {
    listener: TcpListener,
    registry: Arc<HandlerRegistry>,
    shutdown: ShutdownSignal,
    config: ServerConfig,
}

impl Server {
    /// Binds to `addr` and prepares an empty registry.
    pub fn bind(addr: &str) -> Result<Self> {
        Self::bind_with_config(addr, ServerConfig::default())
    }

    /// Binds to `addr` with explicit loop tuning.
    pub fn bind_with_config(addr: &str, config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        tracing::info!(addr, "listening");
        Ok(Server {
            listener,
            registry: Arc::new(HandlerRegistry::new()),
            shutdown: ShutdownSignal::new(),
            config,
        })
    }

    /// The actual bound address (useful after binding port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Registers `handler` under `name`, replacing any prior entry.
    ///
    /// Registration is permitted both before and during `serve_all`;
    /// replacement is atomic with respect to concurrent dispatches.
    pub fn register<F>(&self, name: &str, handler: F) -> Result<()>
    where
        F: Fn(&Payload) -> Option<Payload> + Send + Sync + 'static,
    {
        self.registry.register(name, Arc::new(handler) as Handler)
    }

    /// Removes the handler for `name`; returns whether one was present.
    pub fn unregister(&self, name: &str) -> bool {
        self.registry.unregister(name)
    }

    /// A handle that makes `serve_all` return when signalled.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Serves requests until the shutdown signal is raised.
    ///
    /// The listener runs in non-blocking mode and is polled at the accept
    /// poll interval, so shutdown never has to close the socket out from
    /// under the loop. Each accepted connection gets its own worker thread;
    /// all workers are joined before this returns.
    pub fn serve_all(&self) -> Result<()> {
        self.listener.set_nonblocking(true)?;
        let mut workers: Vec<JoinHandle<()>> = Vec::new();
        let mut outcome = Ok(());

        while !self.shutdown.is_signalled() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    tracing::info!(%peer, "connection established");
                    match self.spawn_worker(stream, peer) {
                        Ok(handle) => workers.push(handle),
                        Err(e) => {
                            outcome = Err(e);
                            break;
                        }
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    // idle: reap finished workers so the roster stays
                    // bounded by live connections
                    workers.retain(|h| !h.is_finished());
                    thread::sleep(self.config.accept_poll_interval);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    outcome = Err(e.into());
                    break;
                }
            }
        }

        tracing::info!(workers = workers.len(), "accept loop stopped, joining workers");
        for handle in workers {
            let _ = handle.join();
        }
        outcome
    }

    fn spawn_worker(&self, stream: TcpStream, peer: SocketAddr) -> Result<JoinHandle<()>> {
        let registry = Arc::clone(&self.registry);
        let shutdown = self.shutdown.clone();
        let poll = self.config.worker_poll_interval;
        let handle = thread::Builder::new()
            .name(format!("gammarpc-worker-{peer}"))
            .spawn(move || match serve_connection(stream, peer, &registry, &shutdown, poll) {
                Ok(()) => tracing::debug!(%peer, "worker finished"),
                Err(e) => tracing::warn!(%peer, error = %e, "worker terminated"),
            })?;
        Ok(handle)
    }
}

/// Handles one client until its stream closes, a wire fault occurs, or
/// shutdown is requested.
///
/// Each iteration first observes the shutdown flag, then probes the socket
/// with a non-blocking one-byte peek: zero bytes means the peer closed,
/// `WouldBlock` means the connection is idle, and pending data switches the
/// stream back to blocking mode for exactly one request/reply cycle. The
/// reply for request k is therefore fully written before request k+1 is
/// read.
fn serve_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    registry: &HandlerRegistry,
    shutdown: &ShutdownSignal,
    poll: Duration,
) -> Result<()> {
    loop {
        if shutdown.is_signalled() {
            tracing::debug!(%peer, "worker stopping on shutdown");
            return Ok(());
        }

        stream.set_nonblocking(true)?;
        let mut probe = [0u8; 1];
        match stream.peek(&mut probe) {
            Ok(0) => {
                tracing::debug!(%peer, "peer closed connection");
                return Ok(());
            }
            Ok(_) => {
                stream.set_nonblocking(false)?;
                dispatch_one(&mut stream, peer, registry)?;
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(poll),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
}

/// Receives one envelope and runs the dispatch state machine for it.
fn dispatch_one(stream: &mut TcpStream, peer: SocketAddr, registry: &HandlerRegistry) -> Result<()> {
    let msg = match framing::receive_message(stream) {
        Ok(msg) => msg,
        // the frame was consumed whole, so the stream is still in sync;
        // an unknown operation is ignored rather than fatal
        Err(RpcError::UnknownOperation(op)) => {
            tracing::warn!(%peer, operation = op, "ignoring message with unrecognised operation");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match msg.operation {
        Operation::Find => {
            let exists = registry.lookup(&msg.function_name).is_some();
            tracing::debug!(%peer, name = %msg.function_name, exists, "find");
            let reply = Message::reply_success(
                msg.request_id,
                &msg.function_name,
                Payload::scalar(i64::from(exists)),
            );
            framing::send_message(stream, &reply)
        }
        Operation::Call => {
            let reply = run_handler(&msg, registry, peer);
            framing::send_message(stream, &reply)
        }
        Operation::ReplySuccess | Operation::ReplyFailure => {
            tracing::warn!(%peer, "ignoring unexpected reply envelope");
            Ok(())
        }
    }
}

/// Invokes the handler for a `CALL` request and shapes the reply envelope.
///
/// An unregistered name, or a handler output that is absent or violates the
/// blob invariant, becomes the synthesised failure envelope; neither ever
/// propagates as a connection error.
fn run_handler(msg: &Message, registry: &HandlerRegistry, peer: SocketAddr) -> Message {
    let Some(handler) = registry.lookup(&msg.function_name) else {
        tracing::warn!(
            %peer,
            error = %RpcError::HandlerAbsent(msg.function_name.clone()),
            "call failed"
        );
        return Message::failure(msg.request_id);
    };

    tracing::debug!(%peer, name = %msg.function_name, "dispatching call");
    match handler(&msg.payload) {
        Some(output) if output.is_well_formed() => {
            Message::reply_success(msg.request_id, &msg.function_name, output)
        }
        _ => {
            tracing::warn!(
                %peer,
                error = %RpcError::HandlerFailed(msg.function_name.clone()),
                "call failed"
            );
            Message::failure(msg.request_id)
        }
    }
}
