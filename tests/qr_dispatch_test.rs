use httpmock::prelude::*;
use serde_json::json;
use zoo_tracker::config::BackendConfig;
use zoo_tracker::domain::ports::AnimalRegistry;
use zoo_tracker::{
    dispatch, BackendClient, QrOutcome, QrPayload, RestAnimalRegistry, SessionContext,
};

/// 掃描到本 app 產生的 QR：依 action 分派後到後端查詢動物
#[test]
fn test_scanned_view_animal_resolves_against_backend() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/animals")
            .query_param("id", "eq.A101");
        then.status(200).json_body(json!([{
            "id": "A101",
            "name": "Zuri",
            "enclosure_id": "Savanna-2",
            "enclosure": {"id": "Savanna-2", "name": "Savanna 2"}
        }]));
    });

    let scanned = QrPayload::view_animal("A101").encode().unwrap();
    let animal_id = match dispatch(&scanned, "qr") {
        QrOutcome::ViewAnimal { animal_id } => animal_id,
        other => panic!("unexpected outcome: {other:?}"),
    };

    let registry = RestAnimalRegistry::new(
        BackendClient::new(&BackendConfig {
            url: server.base_url(),
            api_key: "test-key".to_string(),
            timeout_seconds: 5,
        })
        .unwrap(),
    );
    let animal = tokio_test::block_on(registry.get_animal(&SessionContext::anonymous(), &animal_id))
        .unwrap();

    lookup.assert();
    assert_eq!(animal.animal.name, "Zuri");
}

#[test]
fn test_app_marker_wins_over_embedded_references() {
    let payload = json!({
        "type": "zoo-tracker",
        "version": "1.0",
        "action": "add_to_checklist",
        "data": {"speciesId": "lion", "checklistId": "night-check"},
        "timestamp": 1767225600000i64,
        "animal_id": "A101"
    })
    .to_string();

    assert_eq!(
        dispatch(&payload, "qr"),
        QrOutcome::AddToChecklist {
            species_id: "lion".to_string(),
            checklist_id: Some("night-check".to_string()),
        }
    );
}

#[test]
fn test_dispatch_order_for_plain_payloads() {
    let cases = [
        ("http://zoo.example.org/tickets", "OpenUrl"),
        (r#"{"animal_id": "A9", "species_id": "lion"}"#, "NavigateToAnimal"),
        (r#"{"speciesId": "lion"}"#, "OfferSpeciesChecklist"),
        ("enclosure sign 14", "Unhandled"),
        (r#"{"type": "other-app", "action": "view_animal"}"#, "Unhandled"),
    ];

    for (raw, expected) in cases {
        let outcome = dispatch(raw, "qr");
        let name = match &outcome {
            QrOutcome::OpenUrl { .. } => "OpenUrl",
            QrOutcome::NavigateToAnimal { .. } => "NavigateToAnimal",
            QrOutcome::OfferSpeciesChecklist { .. } => "OfferSpeciesChecklist",
            QrOutcome::Unhandled { .. } => "Unhandled",
            _ => "other",
        };
        assert_eq!(name, expected, "payload {raw}");
    }
}

/// 離開 app 或需要使用者選擇清單的結果要先確認
#[test]
fn test_confirmation_only_for_outcomes_leaving_the_app() {
    let generated = QrPayload::add_to_checklist("lion", None).encode().unwrap();
    let decoded = QrPayload::decode(&generated).unwrap();
    assert_eq!(decoded.action, "add_to_checklist");
    assert_eq!(decoded.version, "1.0");
    assert!(!dispatch(&generated, "qr").requires_confirmation());

    assert!(dispatch("https://zoo.example.org/map", "qr").requires_confirmation());
    assert!(dispatch(r#"{"species_id": "lion"}"#, "qr").requires_confirmation());
    assert!(!dispatch("enclosure sign 14", "qr").requires_confirmation());
    assert!(QrPayload::decode("https://zoo.example.org/map").is_err());
}
