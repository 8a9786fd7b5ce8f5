//! Server lifecycle
//!
//! The server owns the listening socket, the connection and worker
//! registries, and the console output queue.
//!
//! - **`listener`**: accept loop; registers each connection and spawns its worker
//! - **`worker`**: one request/response exchange per connection
//!
//! # Lifecycle
//!
//! ```text
//! Created ──run()──▶ Running ──stop()──▶ Stopping ──shutdown()──▶ Stopped
//! ```
//!
//! `stop()` wakes the accept loop and cancels every registered receiver.
//! `shutdown()` then joins every worker. Workers keep the server alive
//! through an `Arc`, so no registry is dropped while a worker still runs.

pub mod listener;
pub mod worker;

use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::http::connection::{Connection, ConnectionId};
use crate::http::receiver::DEFAULT_POLL_TIMEOUT;
use crate::sync::{Queue, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServerState {
    Created = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

impl ServerState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Created,
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

/// Settings the server is started with.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub name: String,
    pub listen_addr: String,
    /// Upper bound on one receive readiness wait; also the cancellation latency.
    pub poll_timeout: Duration,
}

impl ServerOptions {
    pub fn new(listen_addr: impl Into<String>) -> Self {
        Self {
            name: crate::config::DEFAULT_NAME.to_string(),
            listen_addr: listen_addr.into(),
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            name: cfg.server.name.clone(),
            listen_addr: cfg.server.listen_addr.clone(),
            poll_timeout: cfg.poll_timeout(),
        }
    }
}

pub struct Server {
    name: String,
    listener: TcpListener,
    local_addr: SocketAddr,
    poll_timeout: Duration,
    state: AtomicU8,
    dispatcher: Dispatcher,
    connections: Registry<ConnectionId, Connection>,
    workers: Registry<ConnectionId, JoinHandle<()>>,
    output: Queue<String>,
    accept_wake: Notify,
}

impl Server {
    /// Binds the listening socket. The server does not accept until
    /// [`Server::run`] is called.
    pub async fn bind(options: ServerOptions, dispatcher: Dispatcher) -> anyhow::Result<Arc<Self>> {
        let listener = TcpListener::bind(&options.listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", options.listen_addr))?;
        let local_addr = listener
            .local_addr()
            .context("failed to read the bound address")?;

        tracing::debug!(name = %options.name, %local_addr, "Server bound");

        Ok(Arc::new(Self {
            name: options.name,
            listener,
            local_addr,
            poll_timeout: options.poll_timeout,
            state: AtomicU8::new(ServerState::Created as u8),
            dispatcher,
            connections: Registry::new(),
            workers: Registry::new(),
            output: Queue::new(),
            accept_wake: Notify::new(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ServerState {
        ServerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.state() == ServerState::Running
    }

    /// Number of connections currently registered.
    pub fn active_connections(&self) -> usize {
        let guard = self.connections.lock();
        self.connections.len(&guard)
    }

    /// Begins shutdown: the accept loop exits and every registered receiver
    /// is cancelled. Calling it again has no effect.
    pub fn stop(&self) {
        let transitioned = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| {
                match ServerState::from_u8(s) {
                    ServerState::Created | ServerState::Running => {
                        Some(ServerState::Stopping as u8)
                    }
                    ServerState::Stopping | ServerState::Stopped => None,
                }
            })
            .is_ok();
        if !transitioned {
            return;
        }

        self.info("Stopping the server...");
        self.accept_wake.notify_one();

        let guard = self.connections.lock();
        for (_, connection) in self.connections.iter(&guard) {
            connection.receiver().close();
        }
    }

    /// Stops the server if needed and joins every worker.
    ///
    /// Returns once no worker is left running.
    pub async fn shutdown(&self) {
        self.stop();

        self.info("Releasing the workers.");
        loop {
            let handles = {
                let mut guard = self.workers.lock();
                self.workers.take_all(&mut guard)
            };
            if handles.is_empty() {
                break;
            }
            for (id, handle) in handles {
                self.reap(id, handle).await;
            }
        }
        self.info("Released the workers.");

        self.state.store(ServerState::Stopped as u8, Ordering::Release);
        self.info("Released the server.");
    }

    /// Writes and removes every queued console line. Returns whether
    /// anything was written.
    pub fn output_message(&self, out: &mut impl Write) -> io::Result<bool> {
        if self.output.empty() {
            return Ok(false);
        }
        while !self.output.empty() {
            writeln!(out, "{}", self.output.pop())?;
        }
        Ok(true)
    }

    /// Removes and returns every queued console line.
    pub fn drain_output(&self) -> Vec<String> {
        let mut lines = Vec::new();
        while !self.output.empty() {
            lines.push(self.output.pop());
        }
        lines
    }

    async fn reap(&self, id: ConnectionId, handle: JoinHandle<()>) {
        if let Err(e) = handle.await {
            self.error(format!("Worker for client {id} ended abnormally: {e}"));
        }
    }

    fn info(&self, line: impl AsRef<str>) {
        self.output.push(format!("[INFO] {}", line.as_ref()));
    }

    fn error(&self, line: impl AsRef<str>) {
        self.output.push(format!("[ERR] {}", line.as_ref()));
    }
}
