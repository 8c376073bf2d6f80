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

//! Ship a few records over TCP to a GELF input on the local host (or the address given as the
//! first argument).

use chrono::Utc;
use gelf_adapter::{
    adapter::{GelfAdapter, ADAPTER_NAME},
    identity::HostIdentity,
    record::{Container, ContainerConfig, LogRecord},
    route::Route,
    transport::TransportRegistry,
};

use std::sync::Arc;

pub fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:12201".to_string());
    let route = Route::new(format!("{}+tcp", ADAPTER_NAME), address);
    let adapter = GelfAdapter::new(
        &route,
        &TransportRegistry::default(),
        HostIdentity::resolve(),
    )
    .unwrap();

    let container = Arc::new(Container {
        id: "5e1f0c1d2a3b".to_string(),
        name: "/tcp-test".to_string(),
        image: "sha256:0123456789abcdef".to_string(),
        created: Utc::now(),
        config: ContainerConfig {
            image: "gelf-test:latest".to_string(),
            entrypoint: vec!["/bin/sh".to_string(), "-c".to_string()],
            cmd: vec!["tcp-test".to_string()],
        },
    });

    let (tx, rx) = std::sync::mpsc::channel();
    let producer = std::thread::spawn(move || {
        for (source, data) in [
            ("stdout", "你好, TCP socket."),
            ("stderr", "你好, TCP socket."),
            ("tty", "你好, TCP socket."),
        ] {
            tx.send(LogRecord::new(container.clone(), source, data, Utc::now()))
                .unwrap();
        }
    });

    adapter.stream(rx);
    producer.join().unwrap();
    adapter.close().unwrap();
}
