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
//! Inbound log records.
//!
//! These are produced by whatever is multiplexing container output (a Docker event watcher, say);
//! this crate only ever reads them.

use chrono::prelude::*;

use std::sync::Arc;

/// The bits of a container's configuration the adapter reports.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContainerConfig {
    /// Image reference the container was created from (`nginx:1.25`, say)
    pub image: String,
    pub entrypoint: Vec<String>,
    pub cmd: Vec<String>,
}

/// Descriptor for the container that emitted a line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Container {
    pub id: String,
    /// Display name; Docker reports these with a leading '/'
    pub name: String,
    /// Image identifier (typically a `sha256:` digest)
    pub image: String,
    pub created: DateTime<Utc>,
    pub config: ContainerConfig,
}

/// One line of container output.
///
/// Many records from the same container will share a single [`Container`], hence the [`Arc`].
#[derive(Clone, Debug, Default)]
pub struct LogRecord {
    /// The raw line, as written by the container
    pub data: String,
    /// When the line was emitted
    pub time: DateTime<Utc>,
    /// The stream the line was written to; "stdout" or "stderr", normally
    pub source: String,
    pub container: Arc<Container>,
}

impl LogRecord {
    pub fn new<S1: Into<String>, S2: Into<String>>(
        container: Arc<Container>,
        source: S1,
        data: S2,
        time: DateTime<Utc>,
    ) -> LogRecord {
        LogRecord {
            data: data.into(),
            time,
            source: source.into(),
            container,
        }
    }
}
