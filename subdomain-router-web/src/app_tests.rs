use actix_web::http::{StatusCode, header};
use actix_web::{App, test};
use serde_json::Value;

use super::configure;
use super::test_mocks::{ROOT, SELF_IP, TestApp, test_app};

const REGISTRY: &str = r#"{
    "blog.example.com": ["https://example.org", "", "URL", true],
    "docs.example.com": ["https://docs.example.org/", "", "URL", true],
    "lab.example.com": ["http://10.0.0.5:8080", "", "URL", true]
}"#;

macro_rules! init_app {
    ($app:expr) => {
        test::init_service(App::new().configure(configure($app.state.clone()))).await
    };
}

fn get(host: &str, uri: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .insert_header((header::HOST, host))
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[actix_web::test]
async fn redirects_absolute_url_with_path() {
    let app: TestApp = test_app(REGISTRY, false).await;
    let service = init_app!(app);

    let resp = test::call_service(&service, get("blog.example.com", "/post/1").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "https://example.org/post/1");

    let resp = test::call_service(&service, get("docs.example.com", "/guide").to_request()).await;
    assert_eq!(location(&resp), "https://docs.example.org/guide");
}

#[actix_web::test]
async fn redirect_forms_differ_on_empty_path() {
    let app = test_app(REGISTRY, false).await;
    let service = init_app!(app);

    let resp = test::call_service(&service, get("blog.example.com", "/").to_request()).await;
    assert_eq!(location(&resp), "https://example.org");

    let resp = test::call_service(&service, get("lab.example.com:5678", "/").to_request()).await;
    assert_eq!(location(&resp), "http://10.0.0.5:8080/");
}

#[actix_web::test]
async fn unknown_subdomain_is_404() {
    let app = test_app(REGISTRY, false).await;
    let service = init_app!(app);

    let resp = test::call_service(&service, get("nope.example.com", "/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert_eq!(body, "Subdomain not found");
}

#[actix_web::test]
async fn root_host_serves_index() {
    let app = test_app(REGISTRY, false).await;
    let service = init_app!(app);

    let resp = test::call_service(&service, get(ROOT, "/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("blog.example.com"));
    assert!(body.contains("https://example.org"));
}

#[actix_web::test]
async fn api_is_only_served_on_root_host() {
    let app = test_app(REGISTRY, false).await;
    let service = init_app!(app);

    let resp = test::call_service(&service, get("blog.example.com", "/api/records").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "https://example.org/api/records");
}

#[actix_web::test]
async fn forwarded_host_does_not_change_routing() {
    let app = test_app(REGISTRY, false).await;
    let service = init_app!(app);

    let req = get(ROOT, "/")
        .insert_header(("X-Forwarded-Host", "blog.example.com"))
        .insert_header((header::FORWARDED, "host=blog.example.com"))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = get("blog.example.com", "/api/records")
        .insert_header(("X-Forwarded-Host", ROOT))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "https://example.org/api/records");
}

#[actix_web::test]
async fn api_answers_on_root_host_with_port() {
    let app = test_app(REGISTRY, false).await;
    let service = init_app!(app);

    let resp = test::call_service(&service, get("example.com:8080", "/api/records").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn add_page_requires_parameters() {
    let app = test_app("{}", false).await;
    let service = init_app!(app);

    let resp = test::call_service(&service, get(ROOT, "/api/add_page?target=https://x.example").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Missing 'name' parameter");

    let resp = test::call_service(&service, get(ROOT, "/api/add_page?name=blog").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn add_then_visit_then_delete() {
    let app = test_app("{}", false).await;
    let service = init_app!(app);

    let resp = test::call_service(
        &service,
        get(ROOT, "/api/add_page?name=blog&target=https%3A%2F%2Fexample.org").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["record"]["content"], SELF_IP);
    assert_eq!(body["record"]["providerRecordId"], "rec-1");

    let resp = test::call_service(&service, get("blog.example.com", "/x").to_request()).await;
    assert_eq!(location(&resp), "https://example.org/x");

    let records: Value = test::call_and_read_body_json(&service, get(ROOT, "/api/records").to_request()).await;
    assert_eq!(records["blog.example.com"]["content"], SELF_IP);

    let resp = test::call_service(&service, get(ROOT, "/api/delete_page?name=blog").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(app.provider.records.lock().await.is_empty());

    let resp = test::call_service(&service, get("blog.example.com", "/x").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn provider_failure_is_bad_gateway() {
    let app = test_app("{}", false).await;
    *app.provider.fail_mutations.lock().await = true;
    let service = init_app!(app);

    let resp = test::call_service(
        &service,
        get(ROOT, "/api/add_page?name=blog&target=https%3A%2F%2Fexample.org").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn delete_unknown_is_404() {
    let app = test_app(REGISTRY, false).await;
    let service = init_app!(app);

    let resp = test::call_service(&service, get(ROOT, "/api/delete_page?name=nope").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn reload_and_save_round_trip_through_file() {
    let app = test_app(REGISTRY, false).await;
    let service = init_app!(app);

    std::fs::write(
        app.registry_path(),
        r#"{"blog.example.com": ["https://moved.example.org", "", "URL", true]}"#,
    )
    .unwrap();
    let body: Value = test::call_and_read_body_json(&service, get(ROOT, "/api/reload_sites").to_request()).await;
    assert_eq!(body["status"], "reloaded");
    assert_eq!(body["sites"]["blog.example.com"], "https://moved.example.org");
    assert_eq!(body["sites"]["lab.example.com"], "http://10.0.0.5:8080");

    let body: Value = test::call_and_read_body_json(&service, get(ROOT, "/api/save_sites").to_request()).await;
    assert_eq!(body["status"], "saved");

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(app.registry_path()).unwrap()).unwrap();
    assert_eq!(
        saved["blog.example.com"],
        serde_json::json!(["https://moved.example.org", "", "URL", true])
    );
}

#[actix_web::test]
async fn reload_with_broken_file_keeps_sites() {
    let app = test_app(REGISTRY, false).await;
    let service = init_app!(app);

    std::fs::write(app.registry_path(), "{ not json").unwrap();
    let resp = test::call_service(&service, get(ROOT, "/api/reload_sites").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = test::call_service(&service, get("blog.example.com", "/").to_request()).await;
    assert_eq!(location(&resp), "https://example.org");
}

#[actix_web::test]
async fn matrix_documents_when_configured() {
    let app = test_app("{}", true).await;
    let service = init_app!(app);

    let body: Value =
        test::call_and_read_body_json(&service, get(ROOT, "/.well-known/matrix/server").to_request()).await;
    assert_eq!(body["m.server"], "matrix.example.com:443");

    let body: Value =
        test::call_and_read_body_json(&service, get(ROOT, "/.well-known/matrix/client").to_request()).await;
    assert_eq!(body["m.homeserver"]["base_url"], "https://matrix.example.com");
}

#[actix_web::test]
async fn matrix_documents_absent_without_config() {
    let app = test_app("{}", false).await;
    let service = init_app!(app);

    // Falls through to the resolver, which serves the index on the root host.
    let resp = test::call_service(&service, get(ROOT, "/.well-known/matrix/server").to_request()).await;
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("<!DOCTYPE html>"));
}
