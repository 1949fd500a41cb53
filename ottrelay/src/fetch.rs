//! Upstream fetcher with bounded redirect following
//!
//! Opens the HTTP(S) connection to a resolved source URL. Redirects are
//! followed manually in an explicit loop with a hop counter, so relative
//! `Location` values resolve against the URL that issued them and a redirect
//! loop cannot recurse without bound.

use crate::config::RelayConfig;
use crate::error::{Error, Result};
use reqwest::header::{ACCEPT, LOCATION, RANGE, USER_AGENT};
use reqwest::{redirect, Client, Response, StatusCode};
use tracing::debug;
use url::Url;

/// HTTP client for upstream sources.
///
/// Cheap to clone via the inner `reqwest::Client`; one fetcher serves all
/// relay sessions, each session gets its own connection.
#[derive(Debug, Clone)]
pub struct UpstreamFetcher {
    client: Client,
    config: RelayConfig,
}

impl UpstreamFetcher {
    /// Build a fetcher with redirects disabled on the inner client; the hop
    /// loop in [`UpstreamFetcher::fetch`] is the only redirect handling.
    pub fn new(config: RelayConfig) -> Result<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(Error::Client)?;

        Ok(Self { client, config })
    }

    /// Open `url` and return the live response body.
    ///
    /// `range` is the client's Range header, forwarded verbatim when
    /// relaying on-demand content. Success means 200 or 206; a redirect is
    /// re-issued against the resolved `Location` for at most
    /// `config.max_redirects` hops; anything else is a terminal error.
    pub async fn fetch(&self, url: &str, range: Option<&str>) -> Result<Response> {
        let mut current = Url::parse(url)?;

        for _ in 0..=self.config.max_redirects {
            let mut request = self
                .client
                .get(current.clone())
                .header(USER_AGENT, &self.config.user_agent)
                .header(ACCEPT, "*/*");
            if let Some(range) = range {
                request = request.header(RANGE, range);
            }

            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout
                } else {
                    Error::Unreachable(e)
                }
            })?;

            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or(Error::MissingLocation)?;
                // Location may be relative; resolve against the URL that sent it.
                let next = current.join(location)?;
                debug!("Upstream redirect {} -> {}", current, next);
                current = next;
                continue;
            }

            if status == StatusCode::OK || status == StatusCode::PARTIAL_CONTENT {
                return Ok(response);
            }

            return Err(Error::Rejected {
                status: status.as_u16(),
            });
        }

        Err(Error::TooManyRedirects {
            hops: self.config.max_redirects,
        })
    }
}
