//! Porthole - a minimal task-per-connection HTTP server
//!
//! Accepts TCP connections, frames one request per connection, dispatches
//! it against a static route table, answers, and closes.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod server;
pub mod sync;
