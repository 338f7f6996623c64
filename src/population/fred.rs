//! Client for FRED's release-tables page, which serves the state population
//! figures as an HTML table rather than an API payload.

use crate::population::error::PopulationError;
use bon::bon;
use log::debug;

/// Default page root for FRED release tables.
pub const RELEASE_TABLES_BASE_URL: &str = "https://fred.stlouisfed.org/release/tables";

/// Release id of the annual state resident population table.
const POPULATION_RELEASE_ID: u32 = 118;
/// Element id selecting the per-state breakdown within the release.
const POPULATION_ELEMENT_ID: u32 = 259194;

/// Fetches one release-table page per year and hands back the raw HTML.
pub struct ReleaseTables {
    http: reqwest::Client,
    base_url: String,
    release_id: u32,
    element_id: u32,
}

#[bon]
impl ReleaseTables {
    /// Builds a client. All parameters default to the state population table
    /// on the production site.
    #[builder]
    pub fn new(base_url: Option<String>, release_id: Option<u32>, element_id: Option<u32>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| RELEASE_TABLES_BASE_URL.to_string()),
            release_id: release_id.unwrap_or(POPULATION_RELEASE_ID),
            element_id: element_id.unwrap_or(POPULATION_ELEMENT_ID),
        }
    }

    /// Fetches the page holding the table observed on January 1st of `year`.
    pub async fn table_page(&self, year: i32) -> Result<String, PopulationError> {
        let url = format!(
            "{}?rid={}&eid={}&od={}-01-01",
            self.base_url, self.release_id, self.element_id, year
        );
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| PopulationError::NetworkRequest(url.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PopulationError::HttpStatus { url, status });
        }

        response
            .text()
            .await
            .map_err(|e| PopulationError::BodyRead(url, e))
    }
}
