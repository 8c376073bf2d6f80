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
//! [gelf-adapter](crate) errors

use backtrace::Backtrace;

/// [gelf-adapter](crate) error type
///
/// Like its syslog cousin, this crate eschews [thiserror] & [anyhow] in favor of a plain
/// enumeration whose arms are chosen on the basis of what the caller will need to do in response.
/// Only [`Error::UnknownTransport`], [`Error::BadRoute`] and a [`Error::Transport`] returned from a
/// dial will ever reach the caller; everything that goes wrong once the adapter is streaming is
/// logged & swallowed.
///
/// [thiserror]: https://docs.rs/thiserror
/// [anyhow]: https://docs.rs/anyhow
#[non_exhaustive]
pub enum Error {
    /// The route named a transport nobody registered
    UnknownTransport { name: String, back: Backtrace },
    /// A route URI couldn't be parsed
    BadRoute {
        uri: String,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// Failed to serialize a GELF message
    Serialize {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// General transport layer error (dialing or sending)
    Transport {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
}

impl Error {
    pub(crate) fn transport<E>(err: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Transport {
            source: Box::new(err),
            back: Backtrace::new(),
        }
    }
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::UnknownTransport { name, .. } => {
                write!(f, "unable to find adapter transport '{}'", name)
            }
            Error::BadRoute { uri, source, .. } => {
                write!(f, "couldn't parse route '{}': {}", uri, source)
            }
            Error::Serialize { source, .. } => {
                write!(f, "While serializing a GELF message, got {}", source)
            }
            Error::Transport { source, .. } => write!(f, "Transport error: {}", source),
            _ => write!(f, "Other gelf-adapter error"),
        }
    }
}

impl std::fmt::Debug for Error {
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::UnknownTransport { name: _, back } => write!(f, "{}\n{:?}", self, back),
            Error::BadRoute { back, .. } => write!(f, "{}\n{:?}", self, back),
            Error::Serialize { source: _, back } => write!(f, "{}\n{:?}", self, back),
            Error::Transport { source: _, back } => write!(f, "{}\n{:?}", self, back),
            err => write!(f, "gelf-adapter error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    #[allow(unreachable_patterns)]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::BadRoute { source, .. }
            | Error::Serialize { source, .. }
            | Error::Transport { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn display() {
        let err = Error::UnknownTransport {
            name: "carrier-pigeon".to_string(),
            back: Backtrace::new(),
        };
        assert_eq!(
            format!("{}", err),
            "unable to find adapter transport 'carrier-pigeon'"
        );
        assert!(std::error::Error::source(&err).is_none());

        let err = Error::transport(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert_eq!(format!("{}", err), "Transport error: refused");
        assert!(std::error::Error::source(&err).is_some());
    }
}
