//! gammarpc Client
//!
//! This crate provides the client side of the gammarpc runtime: a blocking
//! connection to one server over which remote function names are resolved
//! (`find`) and invoked (`call`).
//!
//! # Usage
//!
//! ```no_run
//! use gammarpc_client::Client;
//! use gammarpc_common::Payload;
//!
//! let mut client = Client::connect("[::1]:3000").unwrap();
//!
//! let handle = client.find("add2").unwrap().expect("add2 not registered");
//! let reply = client.call(&handle, &Payload::with_blob(3, vec![100])).unwrap();
//! assert_eq!(reply.unwrap().scalar, 103);
//!
//! client.close();
//! ```
//!
//! A client instance is single-threaded: one request is in flight at a time,
//! and the reply to request k is read before request k+1 is sent.
//!
//! # Main Components
//!
//! - [`Client`] - connect, find, call, close
//! - [`Handle`] - opaque token for a resolved remote name

pub mod client;
pub mod handle;

pub use client::Client;
pub use handle::Handle;
