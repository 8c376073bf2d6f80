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

//! Where log records are to be shipped.
//!
//! A [`Route`] names an adapter, an address & some free-form options. The adapter name may carry a
//! transport after a '+': `gelf+tcp` asks for TCP, plain `gelf` takes the default. Routes are
//! usually written as URIs:
//!
//! ```rust
//! use gelf_adapter::route::Route;
//! let route: Route = "gelf+tcp://graylog.local:12201?tag=prod".parse().unwrap();
//! assert_eq!(route.adapter_transport("udp"), "tcp");
//! assert_eq!(route.address, "graylog.local:12201");
//! ```

use crate::{
    error::{Error, Result},
    transport::{Options, DEFAULT_PORT},
};

use backtrace::Backtrace;

/// A destination for log records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    /// Adapter name, optionally suffixed with "+transport"
    pub adapter: String,
    /// `host:port`
    pub address: String,
    pub options: Options,
}

impl Route {
    pub fn new<S1: Into<String>, S2: Into<String>>(adapter: S1, address: S2) -> Route {
        Route {
            adapter: adapter.into(),
            address: address.into(),
            options: Options::new(),
        }
    }
    pub fn with_option<S1: Into<String>, S2: Into<String>>(mut self, key: S1, value: S2) -> Route {
        self.options.insert(key.into(), value.into());
        self
    }
    /// The transport named in the adapter (`gelf+tcp` :=> "tcp"), or `default` if there is none.
    pub fn adapter_transport<'a>(&'a self, default: &'a str) -> &'a str {
        match self.adapter.split_once('+') {
            Some((_, transport)) if !transport.is_empty() => transport,
            _ => default,
        }
    }
}

fn bad_route<E>(uri: &str, err: E) -> Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    Error::BadRoute {
        uri: uri.to_string(),
        source: err.into(),
        back: Backtrace::new(),
    }
}

impl std::str::FromStr for Route {
    type Err = Error;
    /// Parse `adapter[+transport]://host[:port][?key=value&...]`; the port defaults to 12201.
    fn from_str(s: &str) -> Result<Route> {
        let url = url::Url::parse(s).map_err(|err| bad_route(s, err))?;
        let host = url.host_str().ok_or_else(|| bad_route(s, "no host"))?;
        let port = url.port().unwrap_or(DEFAULT_PORT);
        Ok(Route {
            adapter: url.scheme().to_string(),
            address: format!("{}:{}", host, port),
            options: url.query_pairs().into_owned().collect(),
        })
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.adapter, self.address)
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn parse() {
        let route: Route = "gelf+tcp://graylog:12201?a=b&tag=prod".parse().unwrap();
        assert_eq!(route.adapter, "gelf+tcp");
        assert_eq!(route.adapter_transport("udp"), "tcp");
        assert_eq!(route.address, "graylog:12201");
        assert_eq!(route.options.get("a").map(String::as_str), Some("b"));
        assert_eq!(route.options.get("tag").map(String::as_str), Some("prod"));

        let route: Route = "gelf://graylog".parse().unwrap();
        assert_eq!(route.adapter_transport("udp"), "udp");
        assert_eq!(route.address, "graylog:12201");
        assert!(route.options.is_empty());
        assert_eq!(format!("{}", route), "gelf://graylog:12201");

        let route: Route = "gelf://[::1]:5555".parse().unwrap();
        assert_eq!(route.address, "[::1]:5555");
    }

    #[test]
    fn bad_routes() {
        assert!(matches!(
            "graylog:12201".parse::<Route>(),
            Err(Error::BadRoute { .. })
        ));
        assert!(matches!(
            "no scheme here".parse::<Route>(),
            Err(Error::BadRoute { .. })
        ));
    }

    #[test]
    fn transport_suffix() {
        assert_eq!(Route::new("gelf", "h:1").adapter_transport("udp"), "udp");
        assert_eq!(Route::new("gelf+", "h:1").adapter_transport("udp"), "udp");
        assert_eq!(Route::new("gelf+tls", "h:1").adapter_transport("udp"), "tls");
        let route = Route::new("gelf", "h:1").with_option("k", "v");
        assert_eq!(route.options.len(), 1);
    }
}
