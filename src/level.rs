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
//! GELF severity levels.
//!
//! GELF reuses the eight syslog severities verbatim, so [`Level`] replicates the names used in
//! `<syslog.h>`.

type StdResult<T, E> = std::result::Result<T, E>;

/// RFC [5424] defines eight severity levels for messages; GELF's `level` field carries the same
/// numeric codes. The enumeration values duplicate the constants documented in the `syslog()`
/// manual [page].
///
/// [5424]: https://datatracker.ietf.org/doc/html/rfc5424
/// [page]: https://man7.org/linux/man-pages/man3/syslog.3.html
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Level {
    /// system is unusable
    LOG_EMERG = 0,
    /// action must be take immediately
    LOG_ALERT = 1,
    /// critical conditions
    LOG_CRIT = 2,
    /// error conditions
    LOG_ERR = 3,
    /// warning conditions
    LOG_WARNING = 4,
    /// normal, but significant condition
    LOG_NOTICE = 5,
    /// informational message
    LOG_INFO = 6,
    /// debug-level message
    LOG_DEBUG = 7,
}

impl Level {
    /// Map the stream a container line was written to onto a GELF level.
    ///
    /// Only two origins are recognized: `stdout` is reported as [`Level::LOG_ERR`] and `stderr` as
    /// [`Level::LOG_INFO`]. Yes, that's backwards from what anyone would expect, but deployed
    /// Graylog dashboards & alerts key off these values, so they stay put. Anything else has no
    /// level at all, and the field is left off the wire.
    pub fn from_source(source: &str) -> Option<Level> {
        match source {
            "stdout" => Some(Level::LOG_ERR),
            "stderr" => Some(Level::LOG_INFO),
            _ => None,
        }
    }
}

impl serde::Serialize for Level {
    fn serialize<S>(&self, serializer: S) -> StdResult<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}
