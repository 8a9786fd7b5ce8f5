use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;

use crate::http::receiver::Receiver;
use crate::http::sender::Sender;

/// Identifier of a live connection. Ids are reused once released.
pub type ConnectionId = u8;

/// Highest id handed out; at most this many connections are live at once.
pub const MAX_CONNECTIONS: ConnectionId = ConnectionId::MAX;

/// One accepted client.
///
/// The receiver and sender share the socket. It is closed once the
/// connection and every handle cloned from it have been dropped.
pub struct Connection {
    id: ConnectionId,
    peer: SocketAddr,
    receiver: Arc<Receiver>,
    sender: Arc<Sender>,
}

impl Connection {
    pub fn new(id: ConnectionId, stream: TcpStream, peer: SocketAddr, poll_timeout: Duration) -> Self {
        let stream = Arc::new(stream);
        Self {
            id,
            peer,
            receiver: Arc::new(Receiver::with_poll_timeout(Arc::clone(&stream), poll_timeout)),
            sender: Arc::new(Sender::new(stream)),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn receiver(&self) -> &Arc<Receiver> {
        &self.receiver
    }

    pub fn sender(&self) -> &Arc<Sender> {
        &self.sender
    }
}
