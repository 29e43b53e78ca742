//! Backend access tests

use chrono::DateTime;
use ingest_wizard::backend::api::NO_RESPONSE_MESSAGE;
use ingest_wizard::backend::simulated::RECORDS_RANGE;
use ingest_wizard::backend::{
    Backend, BackendError, ErrorResponse, HttpBackend, IngestBackend, NO_COLUMNS_SELECTED,
    SimulatedBackend,
};
use ingest_wizard::models::{ConnectionConfig, DataSourceKind};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn clickhouse_config(database: &str) -> ConnectionConfig {
    ConnectionConfig::new()
        .with("host", "localhost")
        .with("port", "8123")
        .with("database", database)
}

fn flat_file_config() -> ConnectionConfig {
    ConnectionConfig::new().with("fileName", "users.csv")
}

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

mod simulated_tests {
    use super::*;

    #[tokio::test]
    async fn test_clickhouse_default_database() {
        let backend = SimulatedBackend::instant();
        let response = backend
            .fetch_columns(DataSourceKind::ClickHouse, &clickhouse_config("default"))
            .await
            .unwrap();
        assert_eq!(response.columns.len(), 14);
        assert_eq!(response.columns[0], "price");
    }

    #[tokio::test]
    async fn test_unknown_database_lists_nothing() {
        let backend = SimulatedBackend::instant();
        let response = backend
            .fetch_columns(DataSourceKind::ClickHouse, &clickhouse_config("warehouse"))
            .await
            .unwrap();
        assert!(response.columns.is_empty());
    }

    #[tokio::test]
    async fn test_missing_clickhouse_fields_rejected() {
        let backend = SimulatedBackend::instant();
        let config = ConnectionConfig::new().with("host", "localhost");
        let err = backend
            .fetch_columns(DataSourceKind::ClickHouse, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Validation(_)));
        assert!(
            err.message()
                .starts_with("Missing required ClickHouse connection parameters")
        );
    }

    #[tokio::test]
    async fn test_missing_file_name_rejected() {
        let backend = SimulatedBackend::instant();
        let err = backend
            .fetch_columns(DataSourceKind::FlatFile, &ConnectionConfig::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::Validation("Missing required file name".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_selection_rejected() {
        let backend = SimulatedBackend::instant();
        let err = backend
            .ingest_data(DataSourceKind::FlatFile, &flat_file_config(), &[])
            .await
            .unwrap_err();
        assert_eq!(err.message(), NO_COLUMNS_SELECTED);
    }

    #[tokio::test]
    async fn test_flat_file_to_clickhouse_ingestion() {
        let backend = SimulatedBackend::instant();
        let listing = backend
            .fetch_columns(DataSourceKind::FlatFile, &flat_file_config())
            .await
            .unwrap();
        assert_eq!(listing.columns.len(), 10);

        let selected = listing.columns[..2].to_vec();
        let result = backend
            .ingest_data(DataSourceKind::FlatFile, &flat_file_config(), &selected)
            .await
            .unwrap();

        assert!(RECORDS_RANGE.contains(&result.records_count));
        assert_eq!(
            result.message,
            "Successfully ingested data from Flat File to ClickHouse"
        );
        let parsed = DateTime::parse_from_rfc3339(&result.timestamp).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert!(result.timestamp.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_clickhouse_ingestion_message() {
        let backend = SimulatedBackend::instant();
        let result = backend
            .ingest_data(
                DataSourceKind::ClickHouse,
                &clickhouse_config("default"),
                &cols(&["price"]),
            )
            .await
            .unwrap();
        assert_eq!(
            result.message,
            "Successfully ingested data from ClickHouse to Flat File"
        );
    }
}

mod http_tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_columns_posts_tables() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tables"))
            .and(body_json(json!({
                "dataSource": "ClickHouse",
                "config": {"host": "localhost", "port": "8123", "database": "default"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "columns": ["id", "name"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(format!("{}/api", server.uri()));
        let response = backend
            .fetch_columns(DataSourceKind::ClickHouse, &clickhouse_config("default"))
            .await
            .unwrap();
        assert_eq!(response.columns, cols(&["id", "name"]));
    }

    #[tokio::test]
    async fn test_ingest_posts_columns() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ingest"))
            .and(body_json(json!({
                "dataSource": "Flat File",
                "config": {"fileName": "users.csv"},
                "columns": ["user_id", "email_address"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "recordsCount": 42,
                "message": "Successfully ingested data from Flat File to ClickHouse",
                "timestamp": "2024-05-01T10:00:00.000Z"
            })))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(format!("{}/api/", server.uri()));
        let result = backend
            .ingest_data(
                DataSourceKind::FlatFile,
                &flat_file_config(),
                &cols(&["user_id", "email_address"]),
            )
            .await
            .unwrap();
        assert_eq!(result.records_count, 42);
        assert_eq!(result.timestamp, "2024-05-01T10:00:00.000Z");
    }

    #[tokio::test]
    async fn test_server_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tables"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "Unknown database"})),
            )
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let err = backend
            .fetch_columns(DataSourceKind::ClickHouse, &clickhouse_config("nope"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::Rejected {
                status: 400,
                message: "Unknown database".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_status_fallback_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ingest"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let err = backend
            .ingest_data(DataSourceKind::FlatFile, &flat_file_config(), &cols(&["a"]))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Server error: 500");

        let shape = ErrorResponse::from(err);
        assert!(shape.is_error);
        assert_eq!(
            serde_json::to_value(&shape).unwrap(),
            json!({"isError": true, "message": "Server error: 500"})
        );
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let backend = HttpBackend::new("http://127.0.0.1:1");
        let err = backend
            .fetch_columns(DataSourceKind::FlatFile, &flat_file_config())
            .await
            .unwrap_err();
        assert_eq!(err, BackendError::Unreachable(NO_RESPONSE_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn test_validation_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri());
        let err = backend
            .fetch_columns(DataSourceKind::FlatFile, &ConnectionConfig::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Validation(_)));
    }
}

mod interchangeable_tests {
    use super::*;

    #[tokio::test]
    async fn test_same_validation_errors() {
        let network = Backend::network("http://127.0.0.1:1");
        let simulated = Backend::Simulated(SimulatedBackend::instant());
        let config = ConnectionConfig::new().with("port", "8123");

        let a = network
            .fetch_columns(DataSourceKind::ClickHouse, &config)
            .await
            .unwrap_err();
        let b = simulated
            .fetch_columns(DataSourceKind::ClickHouse, &config)
            .await
            .unwrap_err();
        assert_eq!(a, b);

        let a = network
            .ingest_data(DataSourceKind::ClickHouse, &config, &[])
            .await
            .unwrap_err();
        let b = simulated
            .ingest_data(DataSourceKind::ClickHouse, &config, &[])
            .await
            .unwrap_err();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_same_listing_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tables"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "columns": SimulatedBackend::flat_file_columns()
            })))
            .mount(&server)
            .await;

        let network = Backend::network(server.uri());
        let simulated = Backend::Simulated(SimulatedBackend::instant());

        let a = network
            .fetch_columns(DataSourceKind::FlatFile, &flat_file_config())
            .await
            .unwrap();
        let b = simulated
            .fetch_columns(DataSourceKind::FlatFile, &flat_file_config())
            .await
            .unwrap();
        assert_eq!(a, b);
        assert!(!network.is_simulated());
        assert!(simulated.is_simulated());
    }
}
