//! Websocket connection url, carrying the arguments the server needs to resume a session.

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use snafu::prelude::*;

use crate::Config;

/// Path of the websocket endpoint under a site url
pub const API_PATH: &str = "/api/v4/websocket";

const CONNECTION_ID_KEY: &str = "connection_id";
const SEQUENCE_NUMBER_KEY: &str = "sequence_number";

/// Parse string as connection url error
#[derive(Debug, Snafu)]
#[snafu(
    visibility(pub(crate)),
    module(parse_connect_url_error_variant),
    context(suffix(false))
)]
pub enum ParseConnectURLError {
    /// the str is not a valid url
    #[snafu(display("{s} is an invalid url: {source}"))]
    InvalidURL {
        /// string be parsed
        s: String,
        /// source error
        source: url::ParseError,
    },

    /// the parsed url schema is not supported
    #[snafu(display("the url {s} has invalid schema {schema}"))]
    InvalidSchema {
        /// the url
        s: String,
        /// invalid schema
        schema: String,
    },

    /// the parsed url has no host
    #[snafu(display("the url {s} has no host"))]
    NoHost {
        /// the url
        s: String,
    },

    /// the parsed url has invalid sequence number(not unsigned number)
    #[snafu(display("the url {s} has invalid sequence_number"))]
    InvalidSequenceNumber {
        /// the url
        s: String,
        /// source error
        source: ParseIntError,
    },
}

/// Arguments telling the server where the client wants to resume from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeArguments {
    /// last connection id issued by server, empty if none
    pub connection_id: String,
    /// next event sequence number the client expects
    pub sequence_number: u64,
}

/// Parsed websocket connection url
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectURL {
    base: url::Url,
    /// resume arguments appended as query parameters
    pub resume: ResumeArguments,
}

impl ConnectURL {
    /// Derive the websocket url of a chat site.
    ///
    /// The scheme is switched to `ws`/`wss`, the configured websocket port is appended if the
    /// site url does not carry one, and [`API_PATH`] is appended to the path.
    pub fn from_site_url(site: &str, config: &Config) -> Result<Self, ParseConnectURLError> {
        let mut u = url::Url::parse(site)
            .with_context(|_| parse_connect_url_error_variant::InvalidURL { s: site })?;

        let (schema, default_port) = match u.scheme() {
            "https" | "wss" => ("wss", config.websocket_secure_port),
            "http" | "ws" => ("ws", config.websocket_port),
            other => {
                return parse_connect_url_error_variant::InvalidSchema {
                    s: site,
                    schema: other,
                }
                .fail()
            }
        };

        ensure!(
            u.host().is_some(),
            parse_connect_url_error_variant::NoHost { s: site }
        );

        // switching between special schemes never fails
        let _ = u.set_scheme(schema);
        if u.port().is_none() {
            let _ = u.set_port(Some(default_port));
        }

        let path = format!("{}{}", u.path().trim_end_matches('/'), API_PATH);
        u.set_path(&path);
        u.set_query(None);
        u.set_fragment(None);

        log::debug!("Derived websocket url {} from site {}", u, site);

        Ok(Self {
            base: u,
            resume: ResumeArguments::default(),
        })
    }

    /// construct final url
    pub fn url(&self) -> url::Url {
        let mut u = self.base.clone();

        u.query_pairs_mut()
            .append_pair(CONNECTION_ID_KEY, &self.resume.connection_id)
            .append_pair(
                SEQUENCE_NUMBER_KEY,
                &format!("{}", self.resume.sequence_number),
            );

        u
    }

    /// replace resume arguments
    pub fn with_resume(mut self, resume: ResumeArguments) -> Self {
        self.resume = resume;
        self
    }
}

impl FromStr for ConnectURL {
    type Err = ParseConnectURLError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = url::Url::parse(s)
            .with_context(|_| parse_connect_url_error_variant::InvalidURL { s })?;

        ensure!(
            url.scheme() == "wss" || url.scheme() == "ws",
            parse_connect_url_error_variant::InvalidSchema {
                s,
                schema: url.scheme(),
            }
        );

        ensure!(
            url.host().is_some(),
            parse_connect_url_error_variant::NoHost { s }
        );

        let mut resume = ResumeArguments::default();
        let mut others = Vec::new();

        for (k, v) in url.query_pairs() {
            match k.as_ref() {
                CONNECTION_ID_KEY => resume.connection_id = v.into_owned(),
                SEQUENCE_NUMBER_KEY => {
                    resume.sequence_number = v.parse().with_context(|_| {
                        parse_connect_url_error_variant::InvalidSequenceNumber { s }
                    })?
                }
                _ => others.push((k.into_owned(), v.into_owned())),
            }
        }

        let mut base = url.clone();
        base.set_query(None);
        if !others.is_empty() {
            base.query_pairs_mut().extend_pairs(others);
        }

        Ok(Self { base, resume })
    }
}

impl Display for ConnectURL {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.url().fmt(f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn query(u: &url::Url, key: &str) -> Option<String> {
        u.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_url_carries_resume_arguments() {
        let mut info: ConnectURL = "wss://chat.example.com/api/v4/websocket".parse().unwrap();
        info.resume = ResumeArguments {
            connection_id: "abc".to_string(),
            sequence_number: 42,
        };

        let u = info.url();
        assert_eq!(query(&u, "connection_id").unwrap(), "abc");
        assert_eq!(query(&u, "sequence_number").unwrap(), "42");
        assert_eq!(u.path(), "/api/v4/websocket");
    }

    #[test]
    fn test_fresh_url_has_empty_connection_id() {
        let info: ConnectURL = "ws://127.0.0.1:8065/api/v4/websocket".parse().unwrap();
        let u = info.url();
        assert_eq!(query(&u, "connection_id").unwrap(), "");
        assert_eq!(query(&u, "sequence_number").unwrap(), "0");
    }

    #[test]
    fn test_parse_keeps_other_query_and_reads_resume() {
        let info: ConnectURL =
            "ws://localhost/ws?foo=bar&connection_id=xyz&sequence_number=7".parse().unwrap();
        assert_eq!(info.resume.connection_id, "xyz");
        assert_eq!(info.resume.sequence_number, 7);

        let u = info.url();
        assert_eq!(query(&u, "foo").unwrap(), "bar");
        assert_eq!(u.query_pairs().filter(|(k, _)| k == "connection_id").count(), 1);
    }

    #[test]
    fn test_parse_rejects_http_schema() {
        let err = "https://chat.example.com".parse::<ConnectURL>().unwrap_err();
        assert!(matches!(err, ParseConnectURLError::InvalidSchema { .. }));
    }

    #[test]
    fn test_parse_rejects_invalid_sequence_number() {
        let err = "ws://localhost/ws?sequence_number=-1"
            .parse::<ConnectURL>()
            .unwrap_err();
        assert!(matches!(
            err,
            ParseConnectURLError::InvalidSequenceNumber { .. }
        ));
    }

    #[test]
    fn test_from_site_url_https() {
        let config = Config::default().with_websocket_secure_port(8443);
        let info = ConnectURL::from_site_url("https://chat.example.com/", &config).unwrap();
        let u = info.url();
        assert_eq!(u.scheme(), "wss");
        assert_eq!(u.port(), Some(8443));
        assert_eq!(u.path(), "/api/v4/websocket");
    }

    #[test]
    fn test_from_site_url_keeps_explicit_port_and_subpath() {
        let info =
            ConnectURL::from_site_url("http://localhost:8065/team/", &Config::default()).unwrap();
        let u = info.url();
        assert_eq!(u.scheme(), "ws");
        assert_eq!(u.port(), Some(8065));
        assert_eq!(u.path(), "/team/api/v4/websocket");
    }

    #[test]
    fn test_from_site_url_rejects_ftp() {
        let err = ConnectURL::from_site_url("ftp://example.com", &Config::default()).unwrap_err();
        assert!(matches!(err, ParseConnectURLError::InvalidSchema { .. }));
    }
}
