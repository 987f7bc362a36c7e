//! Client for the portal's private scheduling call.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::trace;
use url::Url;
use url::form_urlencoded;

use super::ScheduleLookup;
use super::errors::ScheduleError;
use crate::config::Config;

const SCHEDULE_PATH: &str =
    "/connect/dwr/call/plaincall/ConnectAjax.getSchedulingJSON.dwr";

pub struct ScheduleClient {
    http: reqwest::Client,
    url: Url,
}

impl ScheduleClient {
    pub fn new(config: &Config) -> Result<Self, ScheduleError> {
        let http = reqwest::Client::builder()
            .timeout(config.page_timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            http,
            url: Url::parse(&config.base_url)?.join(SCHEDULE_PATH)?,
        })
    }

    /// DWR call envelope asking for one session's scheduling data.
    fn envelope(session_id: &str) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("callCount", "1")
            .append_pair("windowName", "")
            .append_pair("c0-scriptName", "ConnectAjax")
            .append_pair("c0-methodName", "getSchedulingJSON")
            .append_pair("c0-id", "0")
            .append_pair("c0-param0", &format!("number:{session_id}"))
            .append_pair("c0-param1", "false")
            .append_pair("batchId", "5")
            .append_pair("instanceId", "0")
            .append_pair("page", "%2Fconnect%2Fsearch.ww")
            .append_pair("scriptSessionId", "1234567")
            .finish()
    }
}

#[async_trait]
impl ScheduleLookup for ScheduleClient {
    async fn lookup(&self, session_id: &str) -> Result<String, ScheduleError> {
        let resp = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "text/plain")
            .body(Self::envelope(session_id))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScheduleError::Status {
                status,
                session_id: session_id.to_string(),
            });
        }

        let body = resp.text().await?;
        trace!(session_id, bytes = body.len(), "schedule reply received");
        Ok(body)
    }
}
