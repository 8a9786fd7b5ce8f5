//! HTTP protocol implementation.
//!
//! One request is served per connection: the server reads a request, answers
//! it, and closes.
//!
//! # Architecture
//!
//! - **`message`**: fields shared by requests and responses
//! - **`request`** / **`response`**: immutable message types and builders
//! - **`parser`**: frames request heads and decodes whole messages from bytes
//! - **`receiver`**: readiness-driven, cancellable framing loop for one connection
//! - **`sender`**: serializes and writes a response to one connection
//! - **`connection`**: the per-client record kept in the server's registry
//! - **`mime`**: content types for served files
//!
//! # Receive State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │  WaitingHeaders  │ ← accumulate until "\r\n\r\n"
//!        └────────┬─────────┘
//!                 │ head parsed
//!                 ▼
//!        ┌──────────────────┐
//!        │   ReadingBody    │ ← POST: wait for Content-Length bytes
//!        └────────┬─────────┘
//!                 │ body complete → Request returned, back to WaitingHeaders
//!                 │
//!   read of 0 → Closed    read error → Failed    close() + timeout → Cancelled
//! ```

pub mod connection;
pub mod message;
pub mod mime;
pub mod parser;
pub mod receiver;
pub mod request;
pub mod response;
pub mod sender;
