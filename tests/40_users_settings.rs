mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn user_management_is_admin_only() -> Result<()> {
    let server = common::spawn_app().await?;
    let admin = server
        .register("Root", "root@example.com", "s3cret", Some("admin"))
        .await?;
    let agent = server.register("Ana", "ana@example.com", "s3cret", None).await?;

    let res = server.get(&agent, "/api/users").await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(common::error_message(res).await?, "Insufficient permissions");

    let res = server.get(&admin, "/api/users").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn admin_creates_and_updates_a_user() -> Result<()> {
    let server = common::spawn_app().await?;
    let admin = server
        .register("Root", "root@example.com", "s3cret", Some("admin"))
        .await?;

    let res = server
        .post(
            &admin,
            "/api/users",
            &json!({
                "name": "Tom",
                "email": "tom@example.com",
                "password": "s3cret",
                "role": "technician",
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let tom_id = body["user"]["id"].as_i64().unwrap();
    assert_eq!(body["user"]["role"], "technician");

    // Promote Tom; an empty password field means keep the current one.
    let res = server
        .put(
            &admin,
            &format!("/api/users/{}", tom_id),
            &json!({ "role": "agent", "password": "" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["user"]["role"], "agent");

    // The original password still works.
    server.login("tom@example.com", "s3cret").await?;
    Ok(())
}

#[tokio::test]
async fn admin_cannot_delete_own_account() -> Result<()> {
    let server = common::spawn_app().await?;
    let admin = server
        .register("Root", "root@example.com", "s3cret", Some("admin"))
        .await?;

    let body: Value = server.get(&admin, "/api/auth/profile").await?.json().await?;
    let my_id = body["user"]["id"].as_i64().unwrap();

    let res = server.delete(&admin, &format!("/api/users/{}", my_id)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(common::error_message(res).await?, "Cannot delete your own account");
    Ok(())
}

#[tokio::test]
async fn technician_directory_lists_only_active_technicians() -> Result<()> {
    let server = common::spawn_app().await?;
    let admin = server
        .register("Root", "root@example.com", "s3cret", Some("admin"))
        .await?;
    server
        .register("Tom", "tom@example.com", "s3cret", Some("technician"))
        .await?;
    let benched = server
        .register("Ben", "ben@example.com", "s3cret", Some("technician"))
        .await?;

    let body: Value = server.get(&benched, "/api/auth/profile").await?.json().await?;
    let ben_id = body["user"]["id"].as_i64().unwrap();
    server
        .put(&admin, &format!("/api/users/{}", ben_id), &json!({ "status": "inactive" }))
        .await?;

    // Any role may read the directory.
    let agent = server.register("Ana", "ana@example.com", "s3cret", None).await?;
    let body: Value = server.get(&agent, "/api/users/technicians").await?.json().await?;
    let technicians = body["technicians"].as_array().unwrap();
    assert_eq!(technicians.len(), 1);
    assert_eq!(technicians[0]["name"], "Tom");
    Ok(())
}

#[tokio::test]
async fn settings_are_admin_only_and_upsert_in_batch() -> Result<()> {
    let server = common::spawn_app().await?;
    let admin = server
        .register("Root", "root@example.com", "s3cret", Some("admin"))
        .await?;
    let agent = server.register("Ana", "ana@example.com", "s3cret", None).await?;

    let res = server.get(&agent, "/api/settings").await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .post(
            &admin,
            "/api/settings",
            &json!({ "maintenance_mode": "false", "session_timeout": 30 }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["settings"].as_array().unwrap().len(), 2);

    // Non-string values are stored as their textual form.
    let body: Value = server
        .get(&admin, "/api/settings/session_timeout")
        .await?
        .json()
        .await?;
    assert_eq!(body["setting"]["value"], "30");
    assert_eq!(body["setting"]["category"], "security");

    // Upserting again replaces the value for the same key.
    server
        .post(&admin, "/api/settings", &json!({ "session_timeout": 45 }))
        .await?;
    let body: Value = server
        .get(&admin, "/api/settings/session_timeout")
        .await?
        .json()
        .await?;
    assert_eq!(body["setting"]["value"], "45");

    let res = server.get(&admin, "/api/settings/not_a_key").await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn empty_settings_payload_is_rejected() -> Result<()> {
    let server = common::spawn_app().await?;
    let admin = server
        .register("Root", "root@example.com", "s3cret", Some("admin"))
        .await?;

    let res = server.post(&admin, "/api/settings", &json!({})).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_message(res).await?, "Invalid data format");
    Ok(())
}
