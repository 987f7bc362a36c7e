//! HTTP client for the session catalog portal.
//!
//! The portal is a cookie-session web app: log in once, then request the
//! search view per (day, venue) and keep following the "Get More Results"
//! link until the page stops offering one.

use async_trait::async_trait;
use html_scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::SessionSource;
use super::card::session_rows;
use super::errors::CatalogError;
use crate::config::{Config, Credentials, Facet};

const LOGIN_PATH: &str = "/connect/login.ww";
const SEARCH_PATH: &str = "/connect/search.ww";

/// Anchor text of the pagination control.
const MORE_RESULTS_TEXT: &str = "Get More Results";

/// Facet parameter the search view uses for venue filtering.
const VENUE_PARAM: &str = "i(728)";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

static LOGIN_FORM_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#loginUsername").unwrap());
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
    delay: Duration,
    ready_interval: Duration,
    ready_attempts: u32,
}

impl CatalogClient {
    pub fn new(config: &Config) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.page_timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: Url::parse(&config.base_url)?,
            delay: config.request_delay,
            ready_interval: config.page_ready_interval,
            ready_attempts: config.page_ready_attempts,
        })
    }

    /// Log in to the portal. The session cookie is kept by the client.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), CatalogError> {
        let url = self.base_url.join(LOGIN_PATH)?;

        // The login form hands out the session cookie the POST must carry.
        self.load(&url).await?;

        let resp = self
            .http
            .post(url.clone())
            .form(&[
                ("loginUsername", credentials.username.as_str()),
                ("loginPassword", credentials.password.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        if shows_login_form(&body) {
            return Err(CatalogError::LoginRejected {
                username: credentials.username.clone(),
            });
        }

        info!(username = credentials.username.as_str(), "logged in to catalog");
        Ok(())
    }

    /// Search view listing one day's sessions at one venue, sorted by time.
    pub fn search_url(&self, day: &Facet, venue: &Facet) -> Result<Url, CatalogError> {
        let mut url = self.base_url.join(SEARCH_PATH)?;
        url.query_pairs_mut()
            .append_pair("searchPhrase", "")
            .append_pair("searchType", "session")
            .append_pair("tc", "0")
            .append_pair("sortBy", "daytime")
            .append_pair("dayID", &day.code.to_string())
            .append_pair("p", "")
            .append_pair(VENUE_PARAM, &venue.code.to_string());
        Ok(url)
    }

    /// GET a page, polling until it answers successfully.
    ///
    /// Gives up with [`CatalogError::NotReady`] after `ready_attempts` tries.
    async fn load(&self, url: &Url) -> Result<String, CatalogError> {
        let mut last_error = None;

        for attempt in 1..=self.ready_attempts {
            match self.http.get(url.clone()).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp.text().await?),
                Ok(resp) => {
                    debug!(url = %url, status = %resp.status(), attempt, "page not ready");
                }
                Err(e) => {
                    debug!(url = %url, error = %e, attempt, "page request failed");
                    last_error = Some(e);
                }
            }

            if attempt < self.ready_attempts {
                tokio::time::sleep(self.ready_interval).await;
            }
        }

        Err(CatalogError::NotReady {
            url: url.to_string(),
            attempts: self.ready_attempts,
            last_error,
        })
    }
}

#[async_trait]
impl SessionSource for CatalogClient {
    async fn fetch_rows(&self, day: &Facet, venue: &Facet) -> Result<Vec<String>, CatalogError> {
        let mut url = self.search_url(day, venue)?;
        let mut rows = Vec::new();
        let mut page = 1u32;

        loop {
            let body = self.load(&url).await?;
            let (page_rows, next) = {
                let document = Html::parse_document(&body);
                (
                    session_rows(&document),
                    more_results_link(&document, &url)?,
                )
            };

            debug!(
                day = day.name.as_str(),
                venue = venue.name.as_str(),
                page,
                rows = page_rows.len(),
                "Fetched results page"
            );
            rows.extend(page_rows);

            match next {
                Some(next) if next == url => {
                    warn!(url = %url, "pagination link points at the current page, stopping");
                    break;
                }
                Some(next) => {
                    info!(
                        day = day.name.as_str(),
                        venue = venue.name.as_str(),
                        "Getting more results"
                    );
                    tokio::time::sleep(self.delay).await;
                    url = next;
                    page += 1;
                }
                None => break,
            }
        }

        Ok(rows)
    }
}

fn shows_login_form(body: &str) -> bool {
    Html::parse_document(body)
        .select(&LOGIN_FORM_SEL)
        .next()
        .is_some()
}

/// Target of the "Get More Results" anchor, resolved against `current`.
///
/// `None` only when the page has no such anchor (the last page). An anchor
/// whose target cannot be requested is an error rather than the end of paging.
fn more_results_link(document: &Html, current: &Url) -> Result<Option<Url>, CatalogError> {
    let Some(anchor) = document
        .select(&ANCHOR_SEL)
        .find(|a| a.text().collect::<String>().trim() == MORE_RESULTS_TEXT)
    else {
        return Ok(None);
    };
    let href = anchor.attr("href").unwrap_or_default().trim();

    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return Err(CatalogError::UnfollowablePagination {
            url: current.to_string(),
            href: href.to_string(),
        });
    }

    Ok(Some(current.join(href)?))
}
