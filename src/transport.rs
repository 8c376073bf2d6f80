// Copyright (C) 2022 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of gelf-adapter.
//
// gelf-adapter is free software: you can redistribute it and/or modify it under the terms of the
// GNU General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// gelf-adapter is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
// even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with gelf-adapter.  If
// not, see <http://www.gnu.org/licenses/>.

//! The GELF transport layer.
//!
//! This module defines the [`Transport`] trait that all implementations must support, the UDP &
//! TCP implementations, and a [`TransportRegistry`] for dialing a transport by name.
//!
//! # Examples
//!
//! To send GELF messages over UDP to a collector on port 12201 on the loopback interface:
//!
//! ```rust
//! use gelf_adapter::transport::UdpTransport;
//! let transpo = UdpTransport::local().unwrap();
//! ```
//!
//! By name, the way a [`Route`](crate::route::Route) does it:
//!
//! ```rust
//! use gelf_adapter::transport::{Options, TransportRegistry};
//! let registry = TransportRegistry::default();
//! assert!(registry.lookup("udp").is_some());
//! assert!(registry.lookup("carrier-pigeon").is_none());
//! let transpo = registry.dial("tcp", "some-host.domain.io:12201", &Options::new());
//! assert!(transpo.is_err()); // no such host, after all
//! ```
//!
//! Messages go out exactly as the caller hands them over: no framing, no delimiter. Over UDP each
//! message is one datagram; over TCP it's up to the receiver to split the stream.

use crate::error::{Error, Result};

use tracing::debug;

use std::{
    collections::{BTreeMap, HashMap},
    net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket},
};

/// Free-form transport options, as carried by a [`Route`](crate::route::Route)
pub type Options = BTreeMap<String, String>;

/// The conventional GELF port
pub const DEFAULT_PORT: u16 = 12201;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      transport mechanisms                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Operations all transport layers must support.
pub trait Transport {
    /// Send one message on this transport mechanism, in a single write.
    ///
    /// A failure here is final as far as the message is concerned; implementations shall not
    /// retry nor reconnect.
    fn send(&self, buf: &[u8]) -> Result<usize>;
    /// Release the underlying connection. Sending after this is an error (or a no-op, depending on
    /// the transport).
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        (**self).send(buf)
    }
    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

/// Resolve `addr` to the first [`SocketAddr`] it names.
fn resolve<A: ToSocketAddrs>(addr: A) -> Result<SocketAddr> {
    addr.to_socket_addrs()
        .map_err(Error::transport)?
        .next()
        .ok_or_else(|| {
            Error::transport(std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                "address resolved to nothing",
            ))
        })
}

/// Sending GELF messages via UDP datagrams.
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Construct a [`Transport`] implementation via UDP at `addr`.
    pub fn new<A: ToSocketAddrs>(addr: A) -> Result<UdpTransport> {
        let peer = resolve(addr)?;
        // Bind to any available port on the matching wildcard address...
        let local = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).map_err(Error::transport)?;
        // and connect to the collector at `addr`:
        socket.connect(peer).map_err(Error::transport)?;
        debug!("UDP transport connected to {}", peer);
        Ok(UdpTransport { socket })
    }
    /// Construct a [`Transport`] implementation via UDP at 127.0.0.1:12201
    pub fn local() -> Result<UdpTransport> {
        UdpTransport::new(("127.0.0.1", DEFAULT_PORT))
    }
}

impl Transport for UdpTransport {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        self.socket.send(buf).map_err(Error::transport)
    }
}

/// Sending GELF messages via a TCP stream
pub struct TcpTransport {
    socket: TcpStream,
}

impl TcpTransport {
    /// Construct a [`Transport`] implementation via TCP at `addr`.
    pub fn new<A: ToSocketAddrs>(addr: A) -> Result<TcpTransport> {
        let socket = TcpStream::connect(addr).map_err(Error::transport)?;
        debug!(
            "TCP transport connected to {}",
            socket
                .peer_addr()
                .map(|a| a.to_string())
                .unwrap_or_default()
        );
        Ok(TcpTransport { socket })
    }
}

impl Transport for TcpTransport {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        use std::io::Write;
        // `Write` is implemented for `&TcpStream` as well as `TcpStream`, which lets us write
        // through a shared reference.
        let mut writer: &TcpStream = &self.socket;
        writer.write_all(buf).map_err(Error::transport)?;
        writer.flush().map_err(Error::transport)?;
        Ok(buf.len())
    }
    fn close(&self) -> Result<()> {
        match self.socket.shutdown(Shutdown::Both) {
            // Already torn-down by the peer; nothing left to release.
            Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            other => other.map_err(Error::transport),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                     looking transports up                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Establish a connection to `address`
pub type Dialer = fn(address: &str, options: &Options) -> Result<Box<dyn Transport + Send>>;

fn dial_udp(address: &str, _options: &Options) -> Result<Box<dyn Transport + Send>> {
    Ok(Box::new(UdpTransport::new(address)?))
}

fn dial_tcp(address: &str, _options: &Options) -> Result<Box<dyn Transport + Send>> {
    Ok(Box::new(TcpTransport::new(address)?))
}

/// Transports, by name.
///
/// The default registry knows "udp" & "tcp"; callers may [`register`](Self::register) more.
pub struct TransportRegistry {
    dialers: HashMap<String, Dialer>,
}

impl std::default::Default for TransportRegistry {
    fn default() -> Self {
        let mut registry = TransportRegistry::empty();
        registry.register("udp", dial_udp);
        registry.register("tcp", dial_tcp);
        registry
    }
}

impl TransportRegistry {
    /// A registry that knows no transports at all
    pub fn empty() -> TransportRegistry {
        TransportRegistry {
            dialers: HashMap::new(),
        }
    }
    /// Make `dialer` available under `name`, replacing anything already registered there.
    pub fn register<S: Into<String>>(&mut self, name: S, dialer: Dialer) {
        self.dialers.insert(name.into(), dialer);
    }
    pub fn lookup(&self, name: &str) -> Option<Dialer> {
        self.dialers.get(name).copied()
    }
    /// Look-up `name` & dial `address` with it.
    pub fn dial(
        &self,
        name: &str,
        address: &str,
        options: &Options,
    ) -> Result<Box<dyn Transport + Send>> {
        let dialer = self.lookup(name).ok_or_else(|| Error::UnknownTransport {
            name: name.to_string(),
            back: backtrace::Backtrace::new(),
        })?;
        dialer(address, options)
    }
}
