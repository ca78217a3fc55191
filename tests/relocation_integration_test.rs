use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;
use zoo_tracker::config::BackendConfig;
use zoo_tracker::{
    BackendClient, RelocationOptions, RelocationService, RestAnimalRegistry, RestHistoryLedger,
    SessionContext, ZooError,
};

fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(&BackendConfig {
        url: server.base_url(),
        api_key: "test-key".to_string(),
        timeout_seconds: 5,
    })
    .unwrap()
}

fn service_for(
    server: &MockServer,
    compensate: bool,
) -> RelocationService<RestAnimalRegistry, RestHistoryLedger> {
    let client = client_for(server);
    RelocationService::with_options(
        RestAnimalRegistry::new(client.clone()),
        RestHistoryLedger::new(client, 100),
        RelocationOptions {
            compensate_on_ledger_failure: compensate,
        },
    )
}

fn keeper() -> SessionContext {
    SessionContext::for_user("keeper-7", "user-token")
}

fn updated_row(enclosure_id: &str) -> serde_json::Value {
    json!([{
        "id": "A101",
        "name": "Zuri",
        "species_id": "giraffe",
        "enclosure_id": enclosure_id,
        "status": "active",
        "species": {"id": "giraffe", "common_name": "Giraffe"},
        "enclosure": {
            "id": enclosure_id,
            "name": enclosure_id.replace('-', " "),
            "area_id": "africa"
        }
    }])
}

/// A101 從 Savanna-1 移到 Savanna-2：讀取、更新、寫入紀錄各一次
#[tokio::test]
async fn test_routine_rotation_end_to_end() {
    let server = MockServer::start();

    let read_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/animals")
            .query_param("id", "eq.A101")
            .query_param("select", "enclosure_id")
            .header("apikey", "test-key")
            .header("authorization", "Bearer user-token");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([{"enclosure_id": "Savanna-1"}]));
    });

    let update_mock = server.mock(|when, then| {
        when.method(PATCH)
            .path("/rest/v1/animals")
            .query_param("id", "eq.A101")
            .header("prefer", "return=representation")
            .json_body(json!({"enclosure_id": "Savanna-2"}));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(updated_row("Savanna-2"));
    });

    let append_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/animal_movements")
            .json_body(json!({
                "animal_id": "A101",
                "from_enclosure_id": "Savanna-1",
                "to_enclosure_id": "Savanna-2",
                "notes": "routine rotation"
            }));
        then.status(201);
    });

    let service = service_for(&server, false);
    let updated = service
        .relocate(&keeper(), "A101", Some("Savanna-2"), Some("routine rotation"))
        .await
        .unwrap();

    read_mock.assert();
    update_mock.assert();
    append_mock.assert_hits(1);

    assert_eq!(updated.animal.enclosure_id.as_deref(), Some("Savanna-2"));
    assert_eq!(updated.enclosure.unwrap().name, "Savanna 2");
    assert_eq!(updated.species.unwrap().common_name, "Giraffe");
}

#[tokio::test]
async fn test_no_prior_enclosure_records_null_source() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/animals")
            .query_param("id", "eq.A101");
        then.status(200).json_body(json!([{"enclosure_id": null}]));
    });
    server.mock(|when, then| {
        when.method(PATCH).path("/rest/v1/animals");
        then.status(200).json_body(updated_row("Aviary-1"));
    });
    let append_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/animal_movements")
            .json_body(json!({
                "animal_id": "A101",
                "from_enclosure_id": null,
                "to_enclosure_id": "Aviary-1",
                "notes": null
            }));
        then.status(201);
    });

    service_for(&server, false)
        .relocate(&keeper(), "A101", Some("Aviary-1"), None)
        .await
        .unwrap();

    append_mock.assert_hits(1);
}

#[tokio::test]
async fn test_missing_destination_never_reaches_backend() {
    let server = MockServer::start();
    let any_animals = server.mock(|when, then| {
        when.path("/rest/v1/animals");
        then.status(200).json_body(json!([]));
    });
    let any_movements = server.mock(|when, then| {
        when.path("/rest/v1/animal_movements");
        then.status(201);
    });

    let err = service_for(&server, false)
        .relocate(&keeper(), "A101", None, Some("no destination picked"))
        .await
        .unwrap_err();

    assert!(matches!(err, ZooError::Validation { .. }));
    assert_eq!(err.user_message(), "Please select a destination enclosure");
    assert_eq!(any_animals.hits(), 0);
    assert_eq!(any_movements.hits(), 0);
}

#[tokio::test]
async fn test_unknown_animal_stops_before_update() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/animals");
        then.status(200).json_body(json!([]));
    });
    let update_mock = server.mock(|when, then| {
        when.method(PATCH).path("/rest/v1/animals");
        then.status(200).json_body(json!([]));
    });

    let err = service_for(&server, false)
        .relocate(&keeper(), "GHOST", Some("Savanna-2"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ZooError::NotFound { entity: "animal", .. }));
    assert_eq!(update_mock.hits(), 0);
}

/// 紀錄寫入失敗時動物已經移動，不自動回復
#[tokio::test]
async fn test_ledger_failure_leaves_animal_moved() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/animals");
        then.status(200).json_body(json!([{"enclosure_id": "Savanna-1"}]));
    });
    let update_mock = server.mock(|when, then| {
        when.method(PATCH)
            .path("/rest/v1/animals")
            .json_body(json!({"enclosure_id": "Savanna-2"}));
        then.status(200).json_body(updated_row("Savanna-2"));
    });
    let revert_mock = server.mock(|when, then| {
        when.method(PATCH)
            .path("/rest/v1/animals")
            .json_body(json!({"enclosure_id": "Savanna-1"}));
        then.status(204);
    });
    server.mock(|when, then| {
        when.method(POST).path("/rest/v1/animal_movements");
        then.status(409).json_body(json!({
            "code": "23503",
            "message": "insert or update on table \"animal_movements\" violates foreign key constraint",
            "details": null,
            "hint": null
        }));
    });

    let err = service_for(&server, false)
        .relocate(&keeper(), "A101", Some("Savanna-2"), None)
        .await
        .unwrap_err();

    assert!(err.is_partial_failure());
    update_mock.assert_hits(1);
    assert_eq!(revert_mock.hits(), 0);

    match err {
        ZooError::LedgerAppendFailed {
            animal_id,
            destination,
            compensated,
            source,
        } => {
            assert_eq!(animal_id, "A101");
            assert_eq!(destination, "Savanna-2");
            assert!(!compensated);
            assert!(matches!(*source, ZooError::Backend { status: 409, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_ledger_failure_with_compensation_reverts_animal() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/animals");
        then.status(200).json_body(json!([{"enclosure_id": "Savanna-1"}]));
    });
    server.mock(|when, then| {
        when.method(PATCH)
            .path("/rest/v1/animals")
            .json_body(json!({"enclosure_id": "Savanna-2"}));
        then.status(200).json_body(updated_row("Savanna-2"));
    });
    let revert_mock = server.mock(|when, then| {
        when.method(PATCH)
            .path("/rest/v1/animals")
            .query_param("id", "eq.A101")
            .header("prefer", "return=minimal")
            .json_body(json!({"enclosure_id": "Savanna-1"}));
        then.status(204);
    });
    server.mock(|when, then| {
        when.method(POST).path("/rest/v1/animal_movements");
        then.status(500);
    });

    let err = service_for(&server, true)
        .relocate(&keeper(), "A101", Some("Savanna-2"), None)
        .await
        .unwrap_err();

    revert_mock.assert_hits(1);
    assert!(!err.is_partial_failure());
    assert!(err.user_message().contains("move reverted"));
    assert!(err.user_message().contains("The backend rejected the request"));
}

#[tokio::test]
async fn test_anonymous_session_uses_api_key_as_bearer() {
    let server = MockServer::start();
    let read_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/animals")
            .header("authorization", "Bearer test-key");
        then.status(200).json_body(json!([{"enclosure_id": "Savanna-1"}]));
    });

    let client = client_for(&server);
    let registry = RestAnimalRegistry::new(client);
    let current = zoo_tracker::domain::ports::AnimalRegistry::get_current_enclosure(
        &registry,
        &SessionContext::anonymous(),
        "A101",
    )
    .await
    .unwrap();

    read_mock.assert();
    assert_eq!(current.as_deref(), Some("Savanna-1"));
}
