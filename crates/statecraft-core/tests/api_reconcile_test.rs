#![allow(clippy::unwrap_used)]
// End-to-end lifecycle through a real `ApiClient` against wiremock.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use statecraft_core::{
    ApplyOutcome, Asset, AttributeBag, Instance, Phase, ProviderConfig, Reconciler, connect,
};

const ITEM: &str = "/v2/engine/asset/assets/abc123/";

fn asset_json(name: &str) -> serde_json::Value {
    json!({
        "id": "abc123",
        "name": name,
        "geometry": "{\"coordinates\":[1,2],\"type\":\"Point\"}",
        "kind": null,
    })
}

#[tokio::test]
async fn asset_lifecycle_over_http() {
    let server = MockServer::start().await;
    let config = ProviderConfig::new(
        format!("{}/", server.uri()).parse().unwrap(),
        SecretString::from("Token s3cr3t".to_owned()),
    );
    let reconciler = Reconciler::new(connect(&config).unwrap());

    Mock::given(method("POST"))
        .and(path("/v2/engine/asset/assets/"))
        .and(header("authorization", "Token s3cr3t"))
        .and(body_partial_json(json!({
            "name": "Pump-1",
            "geometry": { "type": "Point", "coordinates": [1, 2] },
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(asset_json("Pump-1")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ITEM))
        .respond_with(ResponseTemplate::new(200).set_body_json(asset_json("Pump-1")))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(ITEM))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let desired = AttributeBag::new()
        .with("name", "Pump-1")
        .with("geometry", r#"{"type":"Point","coordinates":[1,2]}"#);

    let mut instance = Instance::<Asset>::new();
    let outcome = instance.apply(&reconciler, &desired).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::Created);
    assert_eq!(instance.id(), Some("abc123"));

    assert!(instance.refresh(&reconciler).await.unwrap());
    let outcome = instance.apply(&reconciler, &desired).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::Unchanged);

    instance.destroy(&reconciler).await.unwrap();
    assert_eq!(instance.phase(), Phase::Absent);

    // The GET mock is spent; wiremock answers 404 for unmatched requests.
    let observed = reconciler.read::<Asset>("abc123").await.unwrap();
    assert!(observed.is_absent());
}
