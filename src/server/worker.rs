use std::net::SocketAddr;
use std::sync::Arc;

use crate::http::connection::ConnectionId;
use crate::http::message::DEFAULT_VERSION;
use crate::http::receiver::ReceiveError;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::sender::Sender;
use crate::server::Server;

impl Server {
    /// Serves the single exchange of connection `id`, then releases it.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered.
    pub(crate) async fn serve(self: Arc<Self>, id: ConnectionId) {
        let (peer, receiver, sender) = {
            let guard = self.connections.lock();
            let connection = self.connections.at(&id, &guard);
            (
                connection.peer(),
                Arc::clone(connection.receiver()),
                Arc::clone(connection.sender()),
            )
        };

        match receiver.get_request().await {
            Ok(request) if self.is_running() => {
                self.exchange(peer, &request, &sender).await;
            }
            Ok(request) => {
                tracing::debug!(%peer, path = request.path(), "Request dropped during shutdown");
            }
            Err(ReceiveError::Malformed(e)) => {
                self.info(format!("Malformed request from {peer}: {e}"));
                let response = Response::bad_request(DEFAULT_VERSION);
                if let Err(e) = sender.send_response(&response).await {
                    self.error(format!("Failed to send response to {peer}: {e:#}"));
                }
            }
            Err(ReceiveError::Closed) => {
                tracing::debug!(%peer, "Peer closed without a request");
            }
            Err(ReceiveError::Cancelled) => {
                tracing::debug!(%peer, "Receive cancelled");
            }
            Err(e @ ReceiveError::Io(_)) => {
                self.error(format!("Receive from {peer} failed: {e}"));
            }
        }

        let mut guard = self.connections.lock();
        self.info(format!("Released client {peer}"));
        self.connections.erase(&id, &mut guard);
    }

    async fn exchange(&self, peer: SocketAddr, request: &Request, sender: &Sender) {
        self.info(format!("Received request from {peer}"));
        match request.method() {
            Method::UNKNOWN(_) => self.info(format!("Unknown request from {peer}")),
            method => self.info(format!(
                "{} {} {} from {peer}",
                method.as_str(),
                request.path(),
                request.version()
            )),
        }

        let response = self.dispatcher.handle(request);

        self.info(format!(
            "{} {} {} from {peer}",
            response.status().status_line(),
            request.path(),
            request.version()
        ));

        match sender.send_response(&response).await {
            Ok(()) => self.info(format!("Sent response to {peer}")),
            Err(e) => self.error(format!("Failed to send response to {peer}: {e:#}")),
        }
    }
}
