mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{ids, TestApp};

fn server_names(application: &Value) -> Vec<String> {
    application["servers"]
        .as_array()
        .expect("servers array")
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn application_round_trip_replaces_servers() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let it = app.department("IT").await;
    let srv1 = app.server("srv-1", "10.0.0.1").await;
    let srv2 = app.server("srv-2", "10.0.0.2").await;
    let srv3 = app.server("srv-3", "10.0.0.3").await;

    let res = app
        .post(
            "/api/aplicacao",
            &admin,
            json!({
                "name": "Payroll",
                "description": "Monthly payroll",
                "department_id": it,
                "server_ids": [srv1, srv2]
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.body["data"]["id"].as_i64().unwrap();

    let fetched = app.get(&format!("/api/aplicacao/{}", id), &admin).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["data"]["department_name"], "IT");
    assert_eq!(server_names(&fetched.body["data"]), vec!["srv-1", "srv-2"]);

    let updated = app
        .put(
            &format!("/api/aplicacao/{}", id),
            &admin,
            json!({
                "name": "Payroll",
                "description": "Moved",
                "department_id": it,
                "server_ids": [srv3]
            }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["description"], "Moved");
    assert_eq!(server_names(&updated.body["data"]), vec!["srv-3"]);
}

#[tokio::test]
async fn create_requires_name_and_department() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let res = app.post("/api/aplicacao", &admin, json!({ "description": "x" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["field_errors"]["name"], "name is required");
    assert_eq!(res.body["field_errors"]["department_id"], "department_id is required");
}

#[tokio::test]
async fn unknown_server_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let it = app.department("IT").await;

    let res = app
        .post(
            "/api/aplicacao",
            &admin,
            json!({ "name": "CRM", "department_id": it, "server_ids": [404] }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["field_errors"]["server_ids"].is_string());

    let list = app.get("/api/aplicacao", &admin).await;
    assert!(ids(&list.body).is_empty());
}

#[tokio::test]
async fn duplicate_name_is_a_conflict() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let it = app.department("IT").await;
    let body = json!({ "name": "CRM", "department_id": it });

    assert_eq!(app.post("/api/aplicacao", &admin, body.clone()).await.status, StatusCode::CREATED);
    let res = app.post("/api/aplicacao", &admin, body).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn renaming_into_a_taken_name_is_a_conflict() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let it = app.department("IT").await;
    app.post("/api/aplicacao", &admin, json!({ "name": "CRM", "department_id": it }))
        .await;
    let id = app
        .post("/api/aplicacao", &admin, json!({ "name": "ERP", "department_id": it }))
        .await
        .body["data"]["id"]
        .as_i64()
        .unwrap();

    let res = app
        .put(
            &format!("/api/aplicacao/{}", id),
            &admin,
            json!({ "name": "CRM", "description": "renamed", "department_id": it }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "CONFLICT");
    assert_eq!(res.body["error"], "Application name already in use");

    let current = app.get(&format!("/api/aplicacao/{}", id), &admin).await;
    assert_eq!(current.body["data"]["name"], "ERP");
    assert_eq!(current.body["data"]["description"], "");
}

#[tokio::test]
async fn standard_user_cannot_place_applications_elsewhere() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let it = app.department("IT").await;
    let hr = app.department("HR").await;
    app.standard_user(&admin, "jdoe", Some(it)).await;
    let token = app.standard_token("jdoe").await;

    let foreign = app
        .post("/api/aplicacao", &token, json!({ "name": "Payroll", "department_id": hr }))
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let own = app
        .post("/api/aplicacao", &token, json!({ "name": "Helpdesk", "department_id": it }))
        .await;
    assert_eq!(own.status, StatusCode::CREATED);
    let id = own.body["data"]["id"].as_i64().unwrap();

    let moved = app
        .put(
            &format!("/api/aplicacao/{}", id),
            &token,
            json!({ "name": "Helpdesk", "department_id": hr }),
        )
        .await;
    assert_eq!(moved.status, StatusCode::FORBIDDEN);

    let list = app.get("/api/aplicacao", &token).await;
    assert_eq!(ids(&list.body), vec![id]);
    assert_eq!(list.body["data"][0]["department_id"], it);

    let admin_move = app
        .put(
            &format!("/api/aplicacao/{}", id),
            &admin,
            json!({ "name": "Helpdesk", "department_id": hr }),
        )
        .await;
    assert_eq!(admin_move.status, StatusCode::OK);
}

#[tokio::test]
async fn update_of_missing_application_is_not_found() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let it = app.department("IT").await;

    let res = app
        .put("/api/aplicacao/999", &admin, json!({ "name": "Ghost", "department_id": it }))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn bulk_delete_empties_the_list() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let it = app.department("IT").await;
    for name in ["A", "B", "C"] {
        app.post("/api/aplicacao", &admin, json!({ "name": name, "department_id": it }))
            .await;
    }

    let res = app.delete("/api/aplicacao", &admin).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["deleted"], 3);

    let list = app.get("/api/aplicacao", &admin).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["data"], json!([]));
}

#[tokio::test]
async fn standard_user_sees_only_their_department() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let it = app.department("IT").await;
    let hr = app.department("HR").await;

    let mine = app
        .post("/api/aplicacao", &admin, json!({ "name": "Helpdesk", "department_id": it }))
        .await
        .body["data"]["id"]
        .as_i64()
        .unwrap();
    let theirs = app
        .post("/api/aplicacao", &admin, json!({ "name": "Payroll", "department_id": hr }))
        .await
        .body["data"]["id"]
        .as_i64()
        .unwrap();

    app.standard_user(&admin, "jdoe", Some(it)).await;
    let token = app.standard_token("jdoe").await;

    let list = app.get("/api/aplicacao", &token).await;
    assert_eq!(ids(&list.body), vec![mine]);

    let admin_list = app.get("/api/aplicacao", &admin).await;
    assert_eq!(ids(&admin_list.body), vec![theirs, mine]);

    let hidden = app.get(&format!("/api/aplicacao/{}", theirs), &token).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let delete = app.delete(&format!("/api/aplicacao/{}", theirs), &token).await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let purge = app.delete("/api/aplicacao", &token).await;
    assert_eq!(purge.status, StatusCode::FORBIDDEN);

    let own = app.delete(&format!("/api/aplicacao/{}", mine), &token).await;
    assert_eq!(own.status, StatusCode::OK);
}

#[tokio::test]
async fn user_without_department_sees_nothing() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let it = app.department("IT").await;
    app.post("/api/aplicacao", &admin, json!({ "name": "Helpdesk", "department_id": it }))
        .await;

    app.standard_user(&admin, "drifter", None).await;
    let token = app.standard_token("drifter").await;

    let list = app.get("/api/aplicacao", &token).await;
    assert_eq!(list.status, StatusCode::OK);
    assert!(ids(&list.body).is_empty());
}
