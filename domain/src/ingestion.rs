//! Webhook ingestion: analyze one raw payload and persist the result.

use crate::error::Error;
use crate::gateway::call_store::CallStoreClient;
use analysis::{build_record, CallAnalysisRecord, RoleLexicon};
use log::*;
use serde_json::Value;

/// Analyze a raw webhook payload and store the resulting record.
///
/// Analysis itself never fails: malformed payloads degrade to an error
/// record that is stored like any other, so the upstream pipeline is never
/// asked to retry on our account. Only store transport failures propagate.
pub async fn ingest(
    store: &CallStoreClient,
    raw: &Value,
    lexicon: &RoleLexicon,
) -> Result<CallAnalysisRecord, Error> {
    let record = build_record(raw, lexicon);
    info!(
        "Analyzed call {} for agent {} (satisfaction {:.2})",
        record.id, record.agent_id, record.satisfaction_score
    );

    store.store_record(&record).await?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, ExternalErrorKind};
    use mockito::Server;
    use serde_json::json;

    #[tokio::test]
    async fn ingest_analyzes_and_stores_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/records")
            .with_status(201)
            .create_async()
            .await;

        let store = CallStoreClient::new("test_key", &server.url()).unwrap();
        let raw = json!({
            "id": "call_ingest_1",
            "timestamp": "2026-05-01T10:00:00Z",
            "agent_name": "Agente Rui",
            "segments": [
                {"speaker_id": "Agente Rui", "start_time": 0.0, "end_time": 4.0, "text": "Aqui é o Rui da central de atendimento."},
                {"speaker_id": "Cliente", "start_time": 4.5, "end_time": 8.0, "text": "Preciso de ajuda com o plano."}
            ],
            "sentiment_analysis": [{"label": "satisfação", "score": 0.9}]
        });

        let record = ingest(&store, &raw, &RoleLexicon::default())
            .await
            .unwrap();

        assert_eq!(record.id, "call_ingest_1");
        assert_eq!(record.agent_name, "Agente Rui");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_payload_still_stores_an_error_record() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/records")
            .with_status(201)
            .create_async()
            .await;

        let store = CallStoreClient::new("test_key", &server.url()).unwrap();
        let record = ingest(&store, &json!("not an object"), &RoleLexicon::default())
            .await
            .unwrap();

        assert_eq!(record.satisfaction_score, 0.0);
        assert_eq!(record.tags, vec!["error".to_string()]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn store_rejection_propagates() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/records")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let store = CallStoreClient::new("test_key", &server.url()).unwrap();
        let err = ingest(&store, &json!({}), &RoleLexicon::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Other(_))
        ));
    }
}
