use std::io::ErrorKind;
use std::net::{SocketAddr, SocketAddrV4, UdpSocket};

use log::{trace, warn};

/// Maximum single datagram this server ever sends or expects to receive. Generous enough
/// for a FULL packet at small world sizes (planet count well under 128).
pub const MAX_DATAGRAM_SIZE: usize = 8192;

/// A non-blocking UDP endpoint, drained to exhaustion once per tick.
pub struct Transport {
    socket: UdpSocket,
}

impl Transport {
    pub fn bind(address: SocketAddrV4) -> std::io::Result<Transport> {
        let socket = UdpSocket::bind(address)?;
        socket.set_nonblocking(true)?;
        Ok(Transport { socket })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Returns the next pending datagram, or `None` once the socket would block. A
    /// `WouldBlock` result on an empty socket is expected steady state, not an error.
    pub fn try_recv(&self, buffer: &mut [u8]) -> std::io::Result<Option<(usize, SocketAddr)>> {
        match self.socket.recv_from(buffer) {
            Ok((len, from)) => Ok(Some((len, from))),
            Err(error) if error.kind() == ErrorKind::WouldBlock => {
                trace!("no datagram pending");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    pub fn send_to(&self, payload: &[u8], destination: SocketAddr) {
        if let Err(error) = self.socket.send_to(payload, destination) {
            warn!("failed to send {} bytes to {destination}: {error}", payload.len());
        }
    }
}
