//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.x subset: one request head is read per loop
//! iteration, answered with a formatted head and, for existing files, the raw
//! file bytes.
//!
//! # Architecture
//!
//! - **`parser`**: byte-at-a-time `CRLF CRLF` scanner and request-line parsing
//! - **`request`**: method, version, URI and raw header lines
//! - **`response`**: 200/403/404 head formatting and local path resolution
//! - **`mime`**: extension to content-type lookup
//! - **`writer`**: head serialization and the partial-send loop
//! - **`socket`**: one HTTP exchange over a transport, with liveness tracking
//! - **`connection`**: the per-connection dispatch loop
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Serving   │ ← Wait for a request head (per-byte timeout)
//!        └──────┬──────┘
//!               │ Head received          connection down
//!               ▼                       ───────────────┐
//!        ┌──────────────────┐                          │
//!        │   Responding     │ ← Send head, stream file │
//!        └──────┬───────────┘                          │
//!               │ Sent                                 ▼
//!               ├─ OK → Serving                 ┌────────────┐
//!               └─ send/stream failed ─────────▶│ Terminated │
//!                                               └────────────┘
//! ```
//!
//! On termination the transport is shut down in both directions.

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod socket;
pub mod writer;
