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
//! Ship container log records to a [Graylog] collector as [GELF].
//!
//! [Graylog]: https://graylog.org
//! [GELF]: https://go2docs.graylog.org/current/getting_in_log_data/gelf.html
//!
//! # Introduction
//!
//! Something (a Docker event watcher, say) is multiplexing the output of many containers into a
//! single, ordered stream of [`LogRecord`]s. This crate takes that stream & forwards each record,
//! reformatted as a GELF message, to a remote collector over UDP or TCP, so that the containers
//! themselves never need to know Graylog exists.
//!
//! [`LogRecord`]: record::LogRecord
//!
//! The translation from a record to bytes on the wire happens in three steps:
//!
//! 1. mapping the [`LogRecord`] to a [`GelfMessage`] (see [`gelf::translate`])
//!
//! 2. serializing that message to JSON
//!
//! 3. transporting the JSON to the collector (see [`Transport`])
//!
//! [`GelfMessage`]: gelf::GelfMessage
//! [`Transport`]: transport::Transport
//!
//! Delivery is strictly best-effort. A record that can't be serialized or sent is logged (through
//! [`tracing`]) & dropped, and the adapter moves on to the next one.
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
//!
//! # Usage
//!
//! ```no_run
//! use gelf_adapter::{
//!     adapter::GelfAdapter, identity::HostIdentity, route::Route, transport::TransportRegistry,
//! };
//!
//! // Ship to Graylog's GELF TCP input on some.other.host:
//! let route: Route = "gelf+tcp://some.other.host:12201".parse().unwrap();
//! let adapter = GelfAdapter::new(
//!     &route,
//!     &TransportRegistry::default(),
//!     HostIdentity::resolve(),
//! )
//! .unwrap();
//!
//! let (tx, rx) = std::sync::mpsc::channel();
//! // ...hand `tx` to whatever is collecting container output...
//! # drop(tx);
//! adapter.stream(rx); // returns once every sender has been dropped
//! ```

pub mod adapter;
pub mod error;
pub mod gelf;
pub mod identity;
pub mod level;
pub mod record;
pub mod route;
pub mod transport;
