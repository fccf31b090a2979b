//! gammarpc Server
//!
//! This crate provides the server side of the gammarpc runtime: a registry
//! mapping function names to handler closures, and a dispatch engine that
//! serves remote `FIND` and `CALL` requests over TCP.
//!
//! # Architecture
//!
//! The engine runs one OS thread per accepted connection. The accept loop
//! polls a non-blocking listener so a shutdown signal can stop it without
//! closing the listener from another thread; each worker likewise observes
//! the signal at its iteration boundaries. Requests within one connection
//! are dispatched strictly sequentially and replied to in arrival order;
//! connections proceed independently of each other.
//!
//! # Error Policy
//!
//! Wire faults (malformed frames, oversize messages, framing mismatches,
//! I/O errors) terminate only the worker they occurred on. A `CALL` for an
//! unregistered name, or a handler returning no usable payload, is answered
//! with a `REPLY_FAILURE` envelope and never tears the connection down.
//!
//! # Example
//!
//! ```no_run
//! use gammarpc_common::Payload;
//! use gammarpc_server::Server;
//!
//! let server = Server::bind("127.0.0.1:3000").unwrap();
//! server.register("add2", |input: &Payload| {
//!     let blob = input.blob.as_deref()?;
//!     let sum = (input.scalar as i8).wrapping_add(blob[0] as i8);
//!     Some(Payload::scalar(sum as i64))
//! }).unwrap();
//!
//! let shutdown = server.shutdown_signal();
//! // `shutdown.signal()` from elsewhere makes serve_all return
//! server.serve_all().unwrap();
//! ```
//!
//! # Main Components
//!
//! - [`Server`] - bind, register, serve, shut down
//! - [`HandlerRegistry`] - name → handler store with replace-on-duplicate
//! - [`ShutdownSignal`] - cooperative stop flag shared with workers

pub mod registry;
pub mod server;

pub use registry::{Handler, HandlerRegistry};
pub use server::{Server, ServerConfig, ShutdownSignal};
