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

//! [`GelfAdapter`]: draining a stream of log records into a GELF collector.
//!
//! The adapter is deliberately best-effort. Each record is translated, serialized & sent exactly
//! once; if either of the last two steps fails the record is logged & dropped, and the adapter
//! moves on to the next one. There is no retry, no reconnect, no buffering. A send that blocks
//! blocks the stream.

use crate::{
    error::Result,
    gelf::translate,
    identity::HostIdentity,
    record::LogRecord,
    route::Route,
    transport::{Transport, TransportRegistry},
};

use tracing::{debug, error};

/// The transport a route-built [`GelfAdapter`] will use when the route doesn't name one
pub const DEFAULT_TRANSPORT: &str = "udp";

/// Name under which this adapter is known to routing frameworks
pub const ADAPTER_NAME: &str = "gelf";

/// Ships [`LogRecord`]s to a GELF collector over `T`.
///
/// The adapter owns its transport outright; run one adapter per destination.
pub struct GelfAdapter<T: Transport> {
    host: HostIdentity,
    transport: T,
}

impl GelfAdapter<Box<dyn Transport + Send>> {
    /// Dial the transport named by `route` (UDP if it names none) at `route.address`.
    ///
    /// This is the only place a [`GelfAdapter`] can fail: if the transport is unknown, or the
    /// destination can't be dialed, you get no adapter at all.
    pub fn new(route: &Route, registry: &TransportRegistry, host: HostIdentity) -> Result<Self> {
        let name = route.adapter_transport(DEFAULT_TRANSPORT);
        let transport = registry.dial(name, &route.address, &route.options)?;
        debug!("GELF adapter ready: {} via {}", route, name);
        Ok(GelfAdapter { host, transport })
    }
}

impl<T: Transport> GelfAdapter<T> {
    /// Use an already-established transport.
    pub fn with_transport(transport: T, host: HostIdentity) -> Self {
        GelfAdapter { host, transport }
    }
    pub fn host(&self) -> &HostIdentity {
        &self.host
    }
    /// Translate, serialize & send one record, returning the number of bytes sent.
    pub fn dispatch(&self, record: &LogRecord) -> Result<usize> {
        let payload = translate(record, &self.host).to_bytes()?;
        self.transport.send(&payload)
    }
    /// Drain `logstream`, in order, until it's exhausted.
    ///
    /// Failures are logged (via [`tracing`]) & otherwise swallowed; the offending record is lost.
    /// Hand this an [`std::sync::mpsc::Receiver`] and it will run until every sender has been
    /// dropped.
    pub fn stream<I>(&self, logstream: I)
    where
        I: IntoIterator<Item = LogRecord>,
    {
        for record in logstream {
            if let Err(err) = self.dispatch(&record) {
                error!(
                    container_id = %record.container.id,
                    "Graylog: dropping message: {}", err
                );
            }
        }
    }
    /// Release the transport.
    pub fn close(self) -> Result<()> {
        self.transport.close()
    }
}

#[cfg(test)]
mod smoke {

    use super::*;

    use crate::{
        error::Error,
        record::{Container, ContainerConfig},
    };

    use chrono::prelude::*;
    use serde_json::Value;

    use std::{
        cell::{Cell, RefCell},
        io::Read,
        sync::Arc,
    };

    /// Records every successful send; fails the sends whose (zero-based) ordinals are in `fail`.
    struct MockTransport {
        fail: Vec<usize>,
        calls: Cell<usize>,
        sent: RefCell<Vec<Vec<u8>>>,
    }

    impl MockTransport {
        fn failing(fail: Vec<usize>) -> MockTransport {
            MockTransport {
                fail,
                calls: Cell::new(0),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for MockTransport {
        fn send(&self, buf: &[u8]) -> Result<usize> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if self.fail.contains(&n) {
                return Err(Error::transport(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                )));
            }
            self.sent.borrow_mut().push(buf.to_vec());
            Ok(buf.len())
        }
    }

    fn container() -> Arc<Container> {
        Arc::new(Container {
            id: "c0ffee".to_string(),
            name: "/worker".to_string(),
            image: "sha256:abc".to_string(),
            created: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
            config: ContainerConfig {
                image: "worker:latest".to_string(),
                entrypoint: vec![],
                cmd: vec!["worker".to_string(), "--verbose".to_string()],
            },
        })
    }

    fn record(data: &str) -> LogRecord {
        LogRecord::new(
            container(),
            "stdout",
            data,
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        )
    }

    fn short_message(payload: &[u8]) -> String {
        let json: Value = serde_json::from_slice(payload).unwrap();
        assert_eq!(json["version"], "1.1");
        json["short_message"].as_str().unwrap().to_string()
    }

    #[test]
    fn failed_send_does_not_stop_the_stream() {
        // Let the "dropping message" diagnostic show up in the test output.
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let adapter = GelfAdapter::with_transport(
            MockTransport::failing(vec![0]),
            HostIdentity::new("bree.local"),
        );
        adapter.stream(vec![record("A"), record("B")]);

        assert_eq!(adapter.transport.calls.get(), 2);
        let sent = adapter.transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(short_message(&sent[0]), "B");
    }

    #[test]
    fn order_is_preserved() {
        let adapter = GelfAdapter::with_transport(
            MockTransport::failing(vec![1, 3]),
            HostIdentity::new("bree.local"),
        );
        adapter.stream((0..6).map(|i| record(&format!("line {}", i))));

        let sent: Vec<String> = adapter
            .transport
            .sent
            .borrow()
            .iter()
            .map(|p| short_message(p))
            .collect();
        assert_eq!(sent, vec!["line 0", "line 2", "line 4", "line 5"]);
    }

    #[test]
    fn dispatch_reports_errors() {
        let adapter =
            GelfAdapter::with_transport(MockTransport::failing(vec![0]), HostIdentity::default());
        assert!(matches!(
            adapter.dispatch(&record("A")),
            Err(Error::Transport { .. })
        ));
        let n = adapter.dispatch(&record("B")).unwrap();
        assert_eq!(n, adapter.transport.sent.borrow()[0].len());
        assert!(adapter.host().is_empty());
    }

    #[test]
    fn stream_drains_a_channel() {
        let (tx, rx) = std::sync::mpsc::channel();
        let producer = std::thread::spawn(move || {
            for data in ["one", "two", "three"] {
                tx.send(record(data)).unwrap();
            }
            // dropping `tx` closes the stream
        });

        let adapter =
            GelfAdapter::with_transport(MockTransport::failing(vec![]), HostIdentity::default());
        adapter.stream(rx);
        producer.join().unwrap();

        let sent = adapter.transport.sent.borrow();
        let got: Vec<String> = sent.iter().map(|p| short_message(p)).collect();
        assert_eq!(got, vec!["one", "two", "three"]);

        let json: Value = serde_json::from_slice(&sent[0]).unwrap();
        assert_eq!(json["timestamp"], 1_700_000_000);
        assert_eq!(json["level"], 3);
        assert_eq!(json["container_name"], "worker");
        assert_eq!(json["command"], " worker --verbose");
        assert!(json.get("host").is_none());
    }

    #[test]
    fn unknown_transport_is_fatal() {
        let route: Route = "gelf+carrier-pigeon://127.0.0.1:12201".parse().unwrap();
        match GelfAdapter::new(&route, &TransportRegistry::default(), HostIdentity::default()) {
            Err(Error::UnknownTransport { name, .. }) => assert_eq!(name, "carrier-pigeon"),
            Err(err) => panic!("unexpected error {}", err),
            Ok(_) => panic!("built an adapter on a transport that doesn't exist"),
        }
    }

    #[test]
    fn end_to_end_udp() {
        let collector = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let route: Route = format!("gelf://{}", collector.local_addr().unwrap())
            .parse()
            .unwrap();
        let adapter = GelfAdapter::new(
            &route,
            &TransportRegistry::default(),
            HostIdentity::new("bree.local"),
        )
        .unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        for data in ["one", "two", "three"] {
            tx.send(record(data)).unwrap();
        }
        drop(tx);
        adapter.stream(rx);

        let mut buf = [0u8; 2048];
        for expected in ["one", "two", "three"] {
            let n = collector.recv(&mut buf).unwrap();
            let json: Value = serde_json::from_slice(&buf[..n]).unwrap();
            assert_eq!(json["short_message"], expected);
            assert_eq!(json["host"], "bree.local");
        }
    }

    #[test]
    fn end_to_end_tcp() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let route = Route::new("gelf+tcp", listener.local_addr().unwrap().to_string());
        let collector = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut out = Vec::new();
            stream.read_to_end(&mut out).unwrap();
            out
        });

        let adapter = GelfAdapter::new(
            &route,
            &TransportRegistry::default(),
            HostIdentity::new("bree.local"),
        )
        .unwrap();
        adapter.stream(vec![record("one"), record("two"), record("three")]);
        adapter.close().unwrap();

        // No framing: the collector sees three JSON objects back-to-back.
        let bytes = collector.join().unwrap();
        let got: Vec<String> = serde_json::Deserializer::from_slice(&bytes)
            .into_iter::<Value>()
            .map(|v| v.unwrap()["short_message"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(got, vec!["one", "two", "three"]);
    }
}
