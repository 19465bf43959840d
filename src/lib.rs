//! tinyhttpd - a minimal static-file HTTP/1.x server
//!
//! Core library: transport and listener sockets, the request parser, the
//! response formatter and the per-connection dispatch loop.

pub mod config;
pub mod error;
pub mod http;
pub mod server;
