mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{ids, names, TestApp};

#[tokio::test]
async fn departments_crud_in_name_order() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    for name in ["Sales", "IT", "HR"] {
        let res = app.post("/api/departamento", &admin, json!({ "name": name })).await;
        assert_eq!(res.status, StatusCode::CREATED);
    }

    let list = app.get("/api/departamento", &admin).await;
    assert_eq!(names(&list.body), vec!["HR", "IT", "Sales"]);

    let it = list.body["data"][1]["id"].as_i64().unwrap();
    let renamed = app
        .put(&format!("/api/departamento/{}", it), &admin, json!({ "name": "Technology" }))
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["data"]["name"], "Technology");

    let dup = app.post("/api/departamento", &admin, json!({ "name": "HR" })).await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body["code"], "CONFLICT");

    let blank = app.post("/api/departamento", &admin, json!({ "name": "  " })).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["field_errors"]["name"], "name is required");
}

#[tokio::test]
async fn department_in_use_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let it = app.department("IT").await;
    app.post("/api/aplicacao", &admin, json!({ "name": "Helpdesk", "department_id": it }))
        .await;

    let res = app.delete(&format!("/api/departamento/{}", it), &admin).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "CONFLICT");
    assert_eq!(res.body["error"], "Department is still in use");

    app.delete("/api/aplicacao", &admin).await;
    let res = app.delete(&format!("/api/departamento/{}", it), &admin).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn profiles_are_seeded_and_admin_only_to_change() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.standard_user(&admin, "jdoe", None).await;
    let token = app.standard_token("jdoe").await;

    let list = app.get("/api/profiles", &token).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(ids(&list.body), vec![2, 1]);

    let create = app.post("/api/profiles", &token, json!({ "name": "auditor" })).await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);

    let create = app.post("/api/profiles", &admin, json!({ "name": "auditor" })).await;
    assert_eq!(create.status, StatusCode::CREATED);

    let in_use = app.delete("/api/profiles/1", &admin).await;
    assert_eq!(in_use.status, StatusCode::BAD_REQUEST);
    assert_eq!(in_use.body["error"], "Profile is still in use");
}

#[tokio::test]
async fn read_only_resources() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let srv = app.server("srv-1", "10.0.0.1").await;
    app.server("srv-2", "10.0.0.2").await;
    app.general_department("Finance").await;

    let servers = app.get("/api/servidor", &admin).await;
    assert_eq!(servers.status, StatusCode::OK);
    assert_eq!(names(&servers.body), vec!["srv-2", "srv-1"]);

    let one = app.get(&format!("/api/servidor/{}", srv), &admin).await;
    assert_eq!(one.body["data"]["ip_address"], "10.0.0.1");

    let missing = app.get("/api/servidor/999", &admin).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let deps = app.get("/api/deps", &admin).await;
    assert_eq!(names(&deps.body), vec!["Finance"]);

    let write = app.post("/api/servidor", &admin, json!({ "name": "x" })).await;
    assert_eq!(write.status, StatusCode::METHOD_NOT_ALLOWED);
}
