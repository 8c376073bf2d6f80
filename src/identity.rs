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

//! Figuring-out who "we" are.
//!
//! Every GELF message carries a `host` field naming the machine that produced it. When the adapter
//! runs inside a container, [gethostname()] returns the container's hostname, which is rarely what
//! an operator wants to see in Graylog. So [`HostIdentity`] is resolved as follows, first success
//! wins:
//!
//! 1. the `LOGSPOUT_HOSTNAME` environment variable, if set & non-empty
//! 2. the contents of `/opt/dockerhostname`, if it exists & can be read (the usual trick is to
//!    bind-mount the host's `/etc/hostname` there)
//! 3. [gethostname()]
//!
//! [gethostname()]: https://man7.org/linux/man-pages/man2/gethostname.2.html
//!
//! ```rust
//! use gelf_adapter::identity::HostIdentity;
//! let host = HostIdentity::builder()
//!     .env_var("MY_APP_HOSTNAME")
//!     .path("/i/am/not/there")
//!     .resolve();
//! // Falls through to gethostname()
//! assert_eq!(host, HostIdentity::from_os());
//! ```

use tracing::debug;

use std::path::{Path, PathBuf};

/// Environment variable consulted first
pub const HOSTNAME_ENV_VAR: &str = "LOGSPOUT_HOSTNAME";
/// File consulted if [`HOSTNAME_ENV_VAR`] isn't set
pub const HOSTNAME_PATH: &str = "/opt/dockerhostname";

/// The identity reported in the `host` field of every message.
///
/// Resolved once, at startup, and never changed thereafter; clone it into as many adapters as you
/// like.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostIdentity(String);

impl HostIdentity {
    /// Use `name`, verbatim.
    pub fn new<S: Into<String>>(name: S) -> HostIdentity {
        HostIdentity(name.into())
    }
    /// Resolve from the default environment variable & path.
    pub fn resolve() -> HostIdentity {
        HostIdentity::builder().resolve()
    }
    pub fn builder() -> HostIdentityBuilder {
        HostIdentityBuilder {
            env_var: HOSTNAME_ENV_VAR.to_string(),
            path: PathBuf::from(HOSTNAME_PATH),
        }
    }
    /// Ask the operating system.
    ///
    /// This cannot fail; if the hostname can't be had for any reason, this returns an empty
    /// identity (which will just leave the `host` field off of outgoing messages).
    pub fn from_os() -> HostIdentity {
        // `hostname::get()` returns an `Result<OsString,_>`, which is really kind of a hassle to work
        // with...
        HostIdentity(
            hostname::get()
                .map(|hn| hn.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where to look for a [`HostIdentity`] before falling back to the operating system.
pub struct HostIdentityBuilder {
    env_var: String,
    path: PathBuf,
}

impl HostIdentityBuilder {
    pub fn env_var<S: Into<String>>(mut self, env_var: S) -> Self {
        self.env_var = env_var.into();
        self
    }
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }
    /// Walk the fallback chain. Never fails.
    pub fn resolve(self) -> HostIdentity {
        if let Some(name) = std::env::var_os(&self.env_var) {
            if !name.is_empty() {
                debug!("host identity taken from ${}", self.env_var);
                return HostIdentity(name.to_string_lossy().into_owned());
            }
        }
        // The file's contents are used as-is: no trimming, so a trailing newline in the file
        // winds up in the `host` field.
        match std::fs::read(&self.path) {
            Ok(bytes) => {
                debug!("host identity read from {}", self.path.display());
                HostIdentity(String::from_utf8_lossy(&bytes).into_owned())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HostIdentity::from_os(),
            Err(err) => {
                debug!(
                    "couldn't read {} ({}); falling back to the OS hostname",
                    self.path.display(),
                    err
                );
                HostIdentity::from_os()
            }
        }
    }
}
