//! HTTP client for the external call-record store.
//!
//! Persistence is delegated to a separate records service; this module
//! provides the gateway for storing analyzed call records and fetching
//! them back for aggregation queries.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind, InternalErrorKind};
use analysis::CallAnalysisRecord;
use chrono::NaiveDate;
use log::*;
use serde::Serialize;

/// Query parameters for fetching a window of stored records.
#[derive(Debug, Clone, Serialize)]
pub struct RecordQuery {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
}

/// Call-record store API client
pub struct CallStoreClient {
    client: reqwest::Client,
    base_url: String,
}

impl CallStoreClient {
    /// Create a new client with the given API key and base URL
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        let mut header_value = reqwest::header::HeaderValue::from_str(api_key).map_err(|e| {
            warn!("Failed to create auth header: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Invalid API key format".to_string(),
                )),
            }
        })?;
        header_value.set_sensitive(true);
        headers.insert("authorization", header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Verify the API key is valid by making a test request
    pub async fn verify_api_key(&self) -> Result<bool, Error> {
        let url = format!("{}/records", self.base_url);

        let response = self.client.head(&url).send().await.map_err(|e| {
            warn!("Failed to verify call store API key: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        })?;

        // 2xx means a valid key, 401 means an invalid one
        Ok(response.status().is_success())
    }

    /// Persist one analyzed call record
    pub async fn store_record(&self, record: &CallAnalysisRecord) -> Result<(), Error> {
        let url = format!("{}/records", self.base_url);

        debug!("Storing call record: {}", record.id);

        let response = self
            .client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to store call record: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        if response.status().is_success() {
            info!("Stored call record: {}", record.id);
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("Call store rejected record: {}", error_text);
            Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(error_text)),
            })
        }
    }

    /// Fetch the records matching a date window and optional filters
    pub async fn fetch_records(
        &self,
        query: &RecordQuery,
    ) -> Result<Vec<CallAnalysisRecord>, Error> {
        let url = format!("{}/records", self.base_url);

        debug!(
            "Fetching call records from {} to {}",
            query.from_date, query.to_date
        );

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to fetch call records: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        if response.status().is_success() {
            let records: Vec<CallAnalysisRecord> = response.json().await.map_err(|e| {
                warn!("Failed to parse call store response: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                        "Invalid response from call store".to_string(),
                    )),
                }
            })?;
            debug!("Fetched {} call record(s)", records.len());
            Ok(records)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("Call store query failed: {}", error_text);
            Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(error_text)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis::{build_record, RoleLexicon};
    use mockito::Server;
    use serde_json::json;

    fn sample_record() -> CallAnalysisRecord {
        let raw = json!({
            "id": "call_gateway_test",
            "timestamp": "2026-05-01T12:00:00Z",
            "segments": [
                {"speaker_id": "Agent Ana", "start_time": 0.0, "end_time": 5.0, "text": "Ana falando, em que posso ajudar?"},
                {"speaker_id": "Cliente", "start_time": 5.5, "end_time": 9.0, "text": "Tenho um problema na fatura."}
            ],
            "sentiment_analysis": [
                {"label": "satisfação", "score": 0.8}
            ]
        });
        build_record(&raw, &RoleLexicon::default())
    }

    #[tokio::test]
    async fn store_record_posts_to_records_endpoint() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/records")
            .match_header("authorization", "test_key")
            .with_status(201)
            .create_async()
            .await;

        let client = CallStoreClient::new("test_key", &server.url()).unwrap();
        client.store_record(&sample_record()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn store_record_surfaces_rejection_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/records")
            .with_status(422)
            .with_body("duplicate id")
            .create_async()
            .await;

        let client = CallStoreClient::new("test_key", &server.url()).unwrap();
        let err = client.store_record(&sample_record()).await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Other("duplicate id".to_string()))
        );
    }

    #[tokio::test]
    async fn fetch_records_sends_window_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/records")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("from_date".into(), "2026-05-01".into()),
                mockito::Matcher::UrlEncoded("to_date".into(), "2026-05-07".into()),
                mockito::Matcher::UrlEncoded("campaign".into(), "onboarding".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::to_string(&vec![sample_record()]).unwrap())
            .create_async()
            .await;

        let client = CallStoreClient::new("test_key", &server.url()).unwrap();
        let query = RecordQuery {
            from_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2026, 5, 7).unwrap(),
            agent_id: None,
            campaign: Some("onboarding".to_string()),
        };
        let records = client.fetch_records(&query).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "call_gateway_test");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_records_maps_upstream_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/records")
            .with_status(500)
            .with_body("store unavailable")
            .create_async()
            .await;

        let client = CallStoreClient::new("test_key", &server.url()).unwrap();
        let query = RecordQuery {
            from_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2026, 5, 7).unwrap(),
            agent_id: None,
            campaign: None,
        };
        let err = client.fetch_records(&query).await.unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Other(_))
        ));
    }

    #[tokio::test]
    async fn verify_api_key_reports_rejection() {
        let mut server = Server::new_async().await;
        server
            .mock("HEAD", "/records")
            .with_status(401)
            .create_async()
            .await;

        let client = CallStoreClient::new("bad_key", &server.url()).unwrap();
        assert!(!client.verify_api_key().await.unwrap());
    }
}
