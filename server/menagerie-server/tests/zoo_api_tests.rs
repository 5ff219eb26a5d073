mod common;

use axum::http::StatusCode;
use common::{link, TestApp, ALICE, BOB};
use serde_json::json;

#[tokio::test]
async fn create_with_species_name_checks_the_animal_out() {
    let app = TestApp::new();
    let lion = app.create_animal(ALICE, "Lion").await;

    let zoo = app
        .create_zoo(
            ALICE,
            json!({ "name": "City Zoo", "city": "Corvallis", "admission": 12.5, "species_list": ["Lion"] }),
        )
        .await;
    assert_eq!(zoo["species_list"], json!([link(&lion)]));
    assert_eq!(zoo["user_id"], "alice");
    assert!(zoo.get("link_errors").is_none());

    let lion = app.get(&link(&lion), ALICE).await.json();
    assert_eq!(lion["checked_in"], false);
}

#[tokio::test]
async fn create_reports_item_errors_and_links_the_rest() {
    let app = TestApp::new();
    let zebra = app.create_animal(ALICE, "Zebra").await;
    app.create_animal(ALICE, "Lion").await;
    app.create_animal(ALICE, "Lion").await;
    app.create_animal(BOB, "Tiger").await;

    let zoo = app
        .create_zoo(
            ALICE,
            json!({ "name": "City Zoo", "species_list": ["Lion", "Tiger", "Unicorn", link(&zebra)] }),
        )
        .await;

    assert_eq!(zoo["species_list"], json!([link(&zebra)]));
    assert_eq!(
        zoo["link_errors"],
        json!([
            { "item": "Lion", "reason": "ambiguous" },
            { "item": "Tiger", "reason": "not_authorized" },
            { "item": "Unicorn", "reason": "not_found" }
        ])
    );

    let lions = app.get("/animals?checkedIn=true", ALICE).await.json();
    assert_eq!(lions.as_array().unwrap().len(), 2, "ambiguous lions stay checked in");
}

#[tokio::test]
async fn create_without_name_is_400() {
    let app = TestApp::new();
    let response = app.post("/zoos", ALICE, json!({ "city": "Corvallis" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn link_then_unlink_restores_the_animal() {
    let app = TestApp::new();
    let lion = app.create_animal(ALICE, "Lion").await;
    let zoo = app.create_zoo(ALICE, json!({ "name": "City Zoo" })).await;
    let nested = format!("{}{}", link(&zoo), link(&lion));

    let linked = app.put(&nested, ALICE, None).await;
    assert_eq!(linked.status, StatusCode::CREATED);
    assert_eq!(linked.json()["species_list"], json!([link(&lion)]));
    assert_eq!(app.get(&link(&lion), ALICE).await.json()["checked_in"], false);

    let found = app.get(&nested, ALICE).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.json()["species"], "Lion");

    let unlinked = app.delete(&nested, ALICE).await;
    assert_eq!(unlinked.status, StatusCode::OK);
    assert_eq!(unlinked.json()["species_list"], json!([]));
    assert_eq!(app.get(&link(&lion), ALICE).await.json()["checked_in"], true);

    assert_eq!(app.get(&nested, ALICE).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&nested, ALICE).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn linking_an_animal_held_elsewhere_conflicts() {
    let app = TestApp::new();
    let lion = app.create_animal(ALICE, "Lion").await;
    let first = app
        .create_zoo(ALICE, json!({ "name": "First", "species_list": [link(&lion)] }))
        .await;
    let second = app.create_zoo(ALICE, json!({ "name": "Second" })).await;

    let again = app
        .put(&format!("{}{}", link(&first), link(&lion)), ALICE, None)
        .await;
    assert_eq!(again.status, StatusCode::CREATED, "relinking is idempotent");

    let conflict = app
        .put(&format!("{}{}", link(&second), link(&lion)), ALICE, None)
        .await;
    assert_eq!(conflict.status, StatusCode::CONFLICT);

    let second = app.get(&link(&second), ALICE).await.json();
    assert_eq!(second["species_list"], json!([]));
}

#[tokio::test]
async fn linking_someone_elses_animal_is_forbidden() {
    let app = TestApp::new();
    let tiger = app.create_animal(BOB, "Tiger").await;
    let zoo = app.create_zoo(ALICE, json!({ "name": "City Zoo" })).await;

    let response = app
        .put(&format!("{}{}", link(&zoo), link(&tiger)), ALICE, None)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get(&link(&tiger), BOB).await.json()["checked_in"], true);
}

#[tokio::test]
async fn nested_listing_follows_species_list_order() {
    let app = TestApp::new();
    let lion = app.create_animal(ALICE, "Lion").await;
    let zebra = app.create_animal(ALICE, "Zebra").await;
    let zoo = app
        .create_zoo(ALICE, json!({ "name": "City Zoo", "species_list": ["Zebra", "Lion"] }))
        .await;

    let animals = app.get(&format!("{}/animals", link(&zoo)), ALICE).await;
    assert_eq!(animals.status, StatusCode::OK);
    let animals = animals.json();
    assert_eq!(animals[0]["id"], zebra["id"]);
    assert_eq!(animals[1]["id"], lion["id"]);

    let foreign = app.get(&format!("{}/animals", link(&zoo)), BOB).await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn put_without_species_list_checks_everything_back_in() {
    let app = TestApp::new();
    let lion = app.create_animal(ALICE, "Lion").await;
    let zoo = app
        .create_zoo(
            ALICE,
            json!({ "name": "City Zoo", "city": "Corvallis", "species_list": ["Lion"] }),
        )
        .await;

    let replaced = app
        .put(&link(&zoo), ALICE, Some(json!({ "name": "Renamed Zoo" })))
        .await;
    assert_eq!(replaced.status, StatusCode::OK);
    let replaced = replaced.json();
    assert_eq!(replaced["name"], "Renamed Zoo");
    assert!(replaced["city"].is_null());
    assert_eq!(replaced["species_list"], json!([]));
    assert_eq!(app.get(&link(&lion), ALICE).await.json()["checked_in"], true);
}

#[tokio::test]
async fn patch_only_touches_present_fields() {
    let app = TestApp::new();
    let lion = app.create_animal(ALICE, "Lion").await;
    let zebra = app.create_animal(ALICE, "Zebra").await;
    let zoo = app
        .create_zoo(
            ALICE,
            json!({ "name": "City Zoo", "city": "Corvallis", "species_list": ["Lion"] }),
        )
        .await;

    let patched = app.patch(&link(&zoo), ALICE, json!({ "state": "OR" })).await.json();
    assert_eq!(patched["city"], "Corvallis");
    assert_eq!(patched["state"], "OR");
    assert_eq!(patched["species_list"], json!([link(&lion)]));

    let swapped = app
        .patch(&link(&zoo), ALICE, json!({ "species_list": [link(&zebra)] }))
        .await
        .json();
    assert_eq!(swapped["species_list"], json!([link(&zebra)]));
    assert_eq!(app.get(&link(&lion), ALICE).await.json()["checked_in"], true);
    assert_eq!(app.get(&link(&zebra), ALICE).await.json()["checked_in"], false);
}

#[tokio::test]
async fn deleting_a_zoo_keeps_its_animals() {
    let app = TestApp::new();
    let lion = app.create_animal(ALICE, "Lion").await;
    let zoo = app
        .create_zoo(ALICE, json!({ "name": "City Zoo", "species_list": ["Lion"] }))
        .await;

    assert_eq!(app.delete(&link(&zoo), BOB).await.status, StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&link(&zoo), ALICE).await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&link(&zoo), ALICE).await.status, StatusCode::NOT_FOUND);

    let lion = app.get(&link(&lion), ALICE).await;
    assert_eq!(lion.status, StatusCode::OK);
    assert_eq!(lion.json()["checked_in"], true);
}

#[tokio::test]
async fn zoo_listing_is_per_user() {
    let app = TestApp::new();
    app.create_zoo(ALICE, json!({ "name": "Alice Zoo" })).await;
    app.create_zoo(BOB, json!({ "name": "Bob Zoo" })).await;

    let zoos = app.get("/zoos", ALICE).await.json();
    assert_eq!(zoos.as_array().unwrap().len(), 1);
    assert_eq!(zoos[0]["name"], "Alice Zoo");
}

#[tokio::test]
async fn wipe_route_can_be_disabled() {
    let app = TestApp::new();
    app.create_animal(ALICE, "Lion").await;
    let wiped = app
        .request(axum::http::Method::DELETE, "/delete", None, None)
        .await;
    assert_eq!(wiped.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/animals", ALICE).await.json(), json!([]));

    let mut config = common::test_config();
    config.server.enable_wipe = false;
    let locked = TestApp::with_config(config);
    let response = locked
        .request(axum::http::Method::DELETE, "/delete", None, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
