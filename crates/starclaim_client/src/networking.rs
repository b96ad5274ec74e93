use std::io::ErrorKind;
use std::net::{SocketAddrV4, UdpSocket};

use bytes::BytesMut;
use log::{trace, warn};
use starclaim_common::packet::{JOIN_PREFIX, Packet, SERVER_FULL_MESSAGE};
use starclaim_common::{Decoder, Encoder, PacketCodec};

const MAX_DATAGRAM_SIZE: usize = 8192;

pub enum InboundMessage {
    Packet(Packet),
    ServerFull,
}

/// A non-blocking UDP endpoint connected to exactly one server.
pub struct ClientSocket {
    socket: UdpSocket,
    codec: PacketCodec,
    recv_buffer: Vec<u8>,
}

impl ClientSocket {
    pub fn connect(bind: SocketAddrV4, server: SocketAddrV4) -> std::io::Result<ClientSocket> {
        let socket = UdpSocket::bind(bind)?;
        socket.set_nonblocking(true)?;
        socket.connect(server)?;
        Ok(ClientSocket {
            socket,
            codec: PacketCodec,
            recv_buffer: vec![0u8; MAX_DATAGRAM_SIZE],
        })
    }

    pub fn send_join(&self) {
        if let Err(error) = self.socket.send(JOIN_PREFIX) {
            warn!("failed to send JOIN: {error}");
        }
    }

    pub fn send_packet(&mut self, packet: Packet) {
        let mut buf = BytesMut::new();
        if let Err(error) = self.codec.encode(packet, &mut buf) {
            warn!("failed to encode outgoing packet: {error}");
            return;
        }
        if let Err(error) = self.socket.send(&buf) {
            warn!("failed to send packet: {error}");
        }
    }

    /// Drains every pending datagram, decoding each as far as possible. A `WouldBlock`
    /// result on an empty socket is expected steady state, not an error.
    pub fn drain(&mut self) -> Vec<InboundMessage> {
        let mut messages = Vec::new();
        loop {
            let len = match self.socket.recv(&mut self.recv_buffer) {
                Ok(len) => len,
                Err(error) if error.kind() == ErrorKind::WouldBlock => {
                    trace!("no datagram pending");
                    break;
                }
                Err(error) => {
                    warn!("receive error: {error}");
                    break;
                }
            };

            let datagram = &self.recv_buffer[..len];
            if datagram == SERVER_FULL_MESSAGE {
                messages.push(InboundMessage::ServerFull);
                continue;
            }

            match self.codec.decode(datagram) {
                Ok(packet) => messages.push(InboundMessage::Packet(packet)),
                Err(error) => warn!("dropping malformed datagram from server: {error}"),
            }
        }
        messages
    }
}
