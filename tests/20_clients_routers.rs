mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn client_crud_roundtrip() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = server.register("Ana", "ana@example.com", "s3cret", None).await?;

    let id = server.create_client(&token, "Acme", "it@acme.test").await?;

    let res = server.get(&token, &format!("/api/clients/{}", id)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["client"]["name"], "Acme");

    let res = server
        .put(&token, &format!("/api/clients/{}", id), &json!({ "phone": "555-0199" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["client"]["phone"], "555-0199");
    // Untouched fields keep their values on a partial update.
    assert_eq!(body["client"]["name"], "Acme");

    let res = server.delete(&token, &format!("/api/clients/{}", id)).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.get(&token, &format!("/api/clients/{}", id)).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn client_creation_requires_all_fields() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = server.register("Ana", "ana@example.com", "s3cret", None).await?;

    let res = server
        .post(&token, "/api/clients", &json!({ "name": "Acme", "email": "it@acme.test" }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_message(res).await?, "Missing required fields");
    Ok(())
}

#[tokio::test]
async fn client_with_tickets_cannot_be_deleted() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = server.register("Ana", "ana@example.com", "s3cret", None).await?;

    let client_id = server.create_client(&token, "Acme", "it@acme.test").await?;
    server.create_ticket(&token, "VPN down", client_id).await?;

    let res = server.delete(&token, &format!("/api/clients/{}", client_id)).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        common::error_message(res).await?,
        "Cannot delete client with active tickets"
    );

    // The client is still there.
    let res = server.get(&token, &format!("/api/clients/{}", client_id)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn router_lifecycle_with_duplicate_serial() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = server.register("Ana", "ana@example.com", "s3cret", None).await?;
    let client_id = server.create_client(&token, "Acme", "it@acme.test").await?;

    let res = server
        .post(
            &token,
            "/api/routers",
            &json!({ "model": "RB4011", "serial_number": "SN-001", "client_id": client_id }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let router_id = body["router"]["id"].as_i64().unwrap();
    assert_eq!(body["router"]["status"], "offline");

    let res = server
        .post(
            &token,
            "/api/routers",
            &json!({ "model": "RB5009", "serial_number": "SN-001", "client_id": client_id }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_message(res).await?, "Serial number already exists");

    // Status ping flips the state and stamps last_seen.
    let res = server
        .put(
            &token,
            &format!("/api/routers/{}/status", router_id),
            &json!({ "status": "online" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["router"]["status"], "online");
    assert!(body["router"]["last_seen"].is_string());

    let res = server
        .put(&token, &format!("/api/routers/{}/status", router_id), &json!({}))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_message(res).await?, "Status is required");
    Ok(())
}

#[tokio::test]
async fn router_requires_existing_client() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = server.register("Ana", "ana@example.com", "s3cret", None).await?;

    let res = server
        .post(
            &token,
            "/api/routers",
            &json!({ "model": "RB4011", "serial_number": "SN-001", "client_id": 9999 }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::error_message(res).await?, "Client not found");
    Ok(())
}

#[tokio::test]
async fn router_rejects_unknown_status_label() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = server.register("Ana", "ana@example.com", "s3cret", None).await?;
    let client_id = server.create_client(&token, "Acme", "it@acme.test").await?;

    let res = server
        .post(
            &token,
            "/api/routers",
            &json!({
                "model": "RB4011",
                "serial_number": "SN-001",
                "client_id": client_id,
                "status": "rebooting",
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn site_creation_and_partial_update() -> Result<()> {
    let server = common::spawn_app().await?;
    // Agents may only list sites; creation takes an admin or technician.
    let token = server
        .register("Tom", "tom@example.com", "s3cret", Some("technician"))
        .await?;

    let res = server
        .post(
            &token,
            "/api/sites",
            &json!({
                "name": "HQ",
                "latitude": 40.4168,
                "longitude": -3.7038,
                "type": "datacenter",
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let site_id = body["site"]["id"].as_i64().unwrap();
    assert_eq!(body["site"]["site_type"], "datacenter");
    assert_eq!(body["site"]["status"], "active");

    let res = server
        .put(&token, &format!("/api/sites/{}", site_id), &json!({ "status": "inactive" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["site"]["status"], "inactive");
    assert_eq!(body["site"]["name"], "HQ");

    // Latitude and longitude are mandatory on creation.
    let res = server.post(&token, "/api/sites", &json!({ "name": "Branch" })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
