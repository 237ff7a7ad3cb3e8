pub mod protocol;
pub mod sim;
pub mod types;

use scope_config::TelemetryConfig;
use std::io;
use std::net::{SocketAddr, UdpSocket};

pub use protocol::{decode, MalformedTelemetry};
pub use types::OrientationSample;

/// A raw telemetry datagram, borrowed from the listener's receive buffer.
#[derive(Debug)]
pub struct Datagram<'a> {
    pub payload: &'a [u8],
    pub source: SocketAddr,
}

/// Non-blocking UDP listener for mount telemetry.
///
/// Each `poll_once` performs at most one receive and returns immediately whether or not
/// a datagram was pending. Payloads are handed back undecoded.
pub struct TelemetryListener {
    socket: UdpSocket,
    buf: Vec<u8>,
    received: u64,
}

impl TelemetryListener {
    /// Bind the listener to the configured local endpoint.
    pub fn bind(config: &TelemetryConfig) -> io::Result<Self> {
        let addr = config.socket_addr();
        let socket = UdpSocket::bind(&addr)?;
        socket.set_nonblocking(true)?;
        tracing::info!(%addr, "Telemetry listener bound");

        Ok(Self {
            socket,
            buf: vec![0u8; config.recv_buffer_bytes],
            received: 0,
        })
    }

    /// Receive at most one pending datagram.
    ///
    /// `Ok(None)` means nothing was pending. Errors are transient: the listener stays
    /// usable and the next call retries independently.
    pub fn poll_once(&mut self) -> io::Result<Option<Datagram<'_>>> {
        match self.socket.recv_from(&mut self.buf) {
            Ok((n, source)) => {
                self.received += 1;
                Ok(Some(Datagram {
                    payload: &self.buf[..n],
                    source,
                }))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Total datagrams received since binding.
    pub fn received(&self) -> u64 {
        self.received
    }
}
