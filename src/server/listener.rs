use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::Context;
use tokio::net::TcpStream;

use crate::http::connection::{Connection, MAX_CONNECTIONS};
use crate::server::{Server, ServerState};

impl Server {
    /// Accepts connections until [`Server::stop`] is called, spawning one
    /// worker per connection.
    ///
    /// Returns immediately if the server was already started or stopped.
    pub async fn run(self: &Arc<Self>) -> anyhow::Result<()> {
        let started = self
            .state
            .compare_exchange(
                ServerState::Created as u8,
                ServerState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if !started {
            tracing::warn!(state = ?self.state(), "Server cannot be started from this state");
            return Ok(());
        }

        self.info(format!("Listening on {}", self.local_addr));

        while self.is_running() {
            tokio::select! {
                _ = self.accept_wake.notified() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        if !self.is_running() {
                            // Shutting down; the socket closes on drop
                            break;
                        }
                        if let Err(e) = self.register(stream, peer).await {
                            self.error(format!("Server Wait For Client failed: {e:#}"));
                        }
                    }
                    Err(e) => {
                        self.error(format!(
                            "Server Wait For Client failed: failed to accept a connection. {e}"
                        ));
                    }
                },
            }
        }

        tracing::debug!("Accept loop finished");
        Ok(())
    }

    /// Stores the connection under the lowest free id and spawns its worker.
    async fn register(self: &Arc<Self>, stream: TcpStream, peer: SocketAddr) -> anyhow::Result<()> {
        let id = {
            let mut guard = self.connections.lock();
            let id = (1..=MAX_CONNECTIONS)
                .find(|id| !self.connections.check_exist(id, &guard))
                .context("no free client id")?;

            let connection = Connection::new(id, stream, peer, self.poll_timeout);
            if !self.is_running() {
                // stop() already walked the registry
                connection.receiver().close();
            }
            self.connections.insert_or_assign(id, connection, &mut guard);
            id
        };

        tracing::debug!(id, %peer, "Connection registered");

        let server = Arc::clone(self);
        let handle = tokio::spawn(async move { server.serve(id).await });

        let previous = {
            let mut guard = self.workers.lock();
            self.workers.insert_or_assign(id, handle, &mut guard)
        };

        // The previous holder of this id has already released its connection
        if let Some(previous) = previous {
            self.reap(id, previous).await;
        }

        Ok(())
    }
}
