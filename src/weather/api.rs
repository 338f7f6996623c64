//! Thin client for the Visual Crossing timeline endpoint.

use crate::weather::error::WeatherError;
use bon::bon;
use chrono::NaiveDate;
use log::debug;
use reqwest::header::ACCEPT;
use serde_json::Value;

/// Default service root for the timeline API.
pub const TIMELINE_BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";

/// Issues one timeline request per (locale, day) and hands back the parsed
/// JSON document.
///
/// The client carries the API key and the fixed query parameters. Each key is
/// attempted exactly once: no retries, no rate limiting.
///
/// # Examples
///
/// ```no_run
/// # use nuforc_enrich::TimelineClient;
/// # use chrono::NaiveDate;
/// # async fn run() -> Result<(), nuforc_enrich::WeatherError> {
/// let client = TimelineClient::builder().key("secret".to_string()).build();
/// let day = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
/// let payload = client.timeline("Chicago,IL", day, day).await?;
/// # Ok(())
/// # }
/// ```
pub struct TimelineClient {
    http: reqwest::Client,
    base_url: String,
    key: String,
    unit_group: String,
    include: String,
}

#[bon]
impl TimelineClient {
    /// Builds a client. `base_url`, `unit_group`, and `include` default to the
    /// production endpoint, `us` units, and daily granularity.
    #[builder]
    pub fn new(
        key: String,
        base_url: Option<String>,
        unit_group: Option<String>,
        include: Option<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| TIMELINE_BASE_URL.to_string()),
            key,
            unit_group: unit_group.unwrap_or_else(|| "us".to_string()),
            include: include.unwrap_or_else(|| "days".to_string()),
        }
    }

    /// Fetches the timeline document for one locale over `start..=end`.
    ///
    /// The URL embeds the locale and both dates; the job passes the same date
    /// for both ends of the window. Any non-2xx status maps to
    /// [`WeatherError::HttpStatus`], transport failures to
    /// [`WeatherError::NetworkRequest`].
    pub async fn timeline(
        &self,
        locale: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Value, WeatherError> {
        let url = format!("{}/{}/{}/{}/", self.base_url, locale, start, end);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(&[
                ("unitGroup", self.unit_group.as_str()),
                ("key", self.key.as_str()),
                ("include", self.include.as_str()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::NetworkRequest(url.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::HttpStatus { url, status });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| WeatherError::BodyDecode(url, e))
    }
}
