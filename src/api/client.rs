//! `ureq`-backed implementation of the photo read API.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::people::{PersonRecord, TypeCount};

use super::{ApiError, ListingPage, PhotoListing};

/// Blocking HTTP client against a configured base endpoint.
pub struct HttpListing {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpListing {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { agent, base_url }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.endpoint, Duration::from_secs(config.timeout_secs))
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.agent.get(&url);
        for (key, value) in params {
            request = request.query(key, value);
        }

        let response = request.call().map_err(|e| match e {
            ureq::Error::Status(code, _) => ApiError::Status(code),
            ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
        })?;

        response
            .into_json::<T>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl PhotoListing for HttpListing {
    fn list_photos(&self, params: &[(&'static str, String)]) -> Result<ListingPage, ApiError> {
        self.get_json("/photos", params)
    }

    fn list_people(&self) -> Result<Vec<PersonRecord>, ApiError> {
        self.get_json("/people", &[])
    }

    fn type_counts(&self) -> Result<Vec<TypeCount>, ApiError> {
        self.get_json("/types", &[])
    }
}
