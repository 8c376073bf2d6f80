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

//! [GELF] message formatting
//!
//! [GELF]: https://go2docs.graylog.org/current/getting_in_log_data/gelf.html
//!
//! [`translate`] maps a [`LogRecord`] onto a [`GelfMessage`], and [`GelfMessage::to_bytes`]
//! produces the JSON payload that goes out on the wire.
//!
//! # Field presence
//!
//! Graylog treats a missing field differently from a field set to `""` or `0`, so every optional
//! field that is empty (or zero) is left off entirely. Only `version` & `short_message` are always
//! present.

use crate::{
    error::{Error, Result},
    identity::HostIdentity,
    level::Level,
    record::LogRecord,
};

use backtrace::Backtrace;
use bytes::{buf::BufMut, Bytes, BytesMut};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// The only GELF version we speak
pub const GELF_VERSION: &str = "1.1";

fn is_zero(x: &i64) -> bool {
    *x == 0
}

/// One GELF message.
///
/// Borrows what it can from the [`LogRecord`] it was built from; it's meant to be serialized
/// immediately & dropped.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GelfMessage<'a> {
    pub version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub host: &'a str,
    pub short_message: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub full_message: &'a str,
    #[serde(skip_serializing_if = "is_zero")]
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,

    #[serde(skip_serializing_if = "str::is_empty")]
    pub image_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub image_name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub container_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub container_name: &'a str,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub command: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created: String,
}

impl<'a> GelfMessage<'a> {
    /// Serialize this message to UTF-8 JSON.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut writer = BytesMut::with_capacity(512).writer();
        serde_json::to_writer(&mut writer, self).map_err(|err| Error::Serialize {
            source: Box::new(err),
            back: Backtrace::new(),
        })?;
        Ok(writer.into_inner().freeze())
    }
}

/// Docker reports container names with a leading '/'; remove (just) one.
fn container_name(name: &str) -> &str {
    name.strip_prefix('/').unwrap_or(name)
}

/// The entrypoint & command, each space-joined, then joined with a space.
///
/// Note that the separating space is always present: a container with no entrypoint yields
/// `" app"`, and one with neither yields `" "`.
fn command_line(entrypoint: &[String], cmd: &[String]) -> String {
    format!("{} {}", entrypoint.join(" "), cmd.join(" "))
}

/// RFC 3339 in UTC with up to nine fractional digits; trailing zeros are dropped, as is the
/// fraction altogether when it's zero (`2020-09-13T12:26:40Z`, `2020-09-13T12:26:40.12Z`).
fn rfc3339_nano(t: &DateTime<Utc>) -> String {
    let full = t.to_rfc3339_opts(SecondsFormat::Nanos, true);
    let trimmed = full
        .strip_suffix('Z')
        .and_then(|s| s.split_once('.'))
        .map(|(whole, frac)| match frac.trim_end_matches('0') {
            "" => format!("{}Z", whole),
            frac => format!("{}.{}Z", whole, frac),
        });
    trimmed.unwrap_or(full)
}

/// Map `record` to a [`GelfMessage`] on behalf of `host`.
///
/// Pure & infallible: no field is validated, and any of them may be empty.
pub fn translate<'a>(record: &'a LogRecord, host: &'a HostIdentity) -> GelfMessage<'a> {
    let container = &record.container;
    GelfMessage {
        version: GELF_VERSION,
        host: host.as_str(),
        short_message: &record.data,
        full_message: "",
        timestamp: record.time.timestamp(),
        level: Level::from_source(&record.source),
        image_id: &container.image,
        image_name: &container.config.image,
        container_id: &container.id,
        container_name: container_name(&container.name),
        command: command_line(&container.config.entrypoint, &container.config.cmd),
        created: rfc3339_nano(&container.created),
    }
}
