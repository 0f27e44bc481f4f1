mod common;

use std::time::Duration;

use serde_json::{Value, json};

use common::{MockBackend, logged_in_tokens, teacher_row};
use examtrack::client::dto::{Fields, ListParams};
use examtrack::client::{AuthTokens, HttpModelClient, ModelApi, delete_record, list_records};
use examtrack::error::AppError;
use examtrack::models::Teacher;

#[tokio::test]
async fn list_sends_paging_query_and_reads_wrapped_page() {
    let backend = MockBackend::start().await;
    backend.respond(
        "get_model_data/",
        200,
        json!({"data": [teacher_row("T01", "Smith", "Ann")], "total_count": 23}),
    );
    let client = HttpModelClient::new(backend.transport(logged_in_tokens()));

    let page = list_records::<Teacher>(&client, &ListParams::new(1, 10, ""))
        .await
        .expect("Failed to list teachers");

    assert_eq!(page.total, 23);
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].code, "T01");

    let calls = backend.calls_to("get_model_data/");
    assert_eq!(calls.len(), 1);
    let query = &calls[0].query;
    assert_eq!(calls[0].method, "GET");
    assert_eq!(query.get("model").map(String::as_str), Some("Enseignants"));
    assert_eq!(query.get("page").map(String::as_str), Some("1"));
    assert_eq!(query.get("itemsPerPage").map(String::as_str), Some("10"));
    assert_eq!(query.get("search").map(String::as_str), Some(""));
}

#[tokio::test]
async fn bare_array_page_counts_its_rows() {
    let backend = MockBackend::start().await;
    backend.respond(
        "get_model_data/",
        200,
        json!([teacher_row("T01", "A", "B"), teacher_row("T02", "C", "D")]),
    );
    let client = HttpModelClient::new(backend.transport(logged_in_tokens()));

    let page = client
        .list("Enseignants", &ListParams::new(2, 10, "x"))
        .await
        .expect("Failed to list");
    assert_eq!(page.total, 2);
    assert_eq!(page.rows.len(), 2);
}

#[tokio::test]
async fn requests_carry_bearer_token_and_request_id() {
    let backend = MockBackend::start().await;
    let client = HttpModelClient::new(backend.transport(logged_in_tokens()));

    client
        .list("Formations", &ListParams::new(1, 10, ""))
        .await
        .expect("Failed to list");

    let call = &backend.calls()[0];
    assert_eq!(
        call.headers.get("authorization").and_then(|v| v.to_str().ok()),
        Some("Bearer access-token")
    );
    assert!(call.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn create_and_update_send_model_payloads() {
    let backend = MockBackend::start().await;
    let client = HttpModelClient::new(backend.transport(logged_in_tokens()));

    let mut fields = Fields::new();
    fields.insert("nom".into(), json!("Smith"));
    client
        .create("Enseignants", &fields)
        .await
        .expect("Failed to create");
    client
        .update("Enseignants", "Code_Enseignant", &json!("T01"), &fields)
        .await
        .expect("Failed to update");

    let created = &backend.calls_to("add_model_row/")[0];
    assert_eq!(
        created.body,
        json!({"model": "Enseignants", "fields": {"nom": "Smith"}})
    );

    let updated = &backend.calls_to("edit_model/")[0];
    assert_eq!(
        updated.body,
        json!({
            "model": "Enseignants",
            "field": "Code_Enseignant",
            "value": "T01",
            "updates": {"nom": "Smith"}
        })
    );
}

#[tokio::test]
async fn delete_sends_model_key_field_and_value() {
    let backend = MockBackend::start().await;
    let client = HttpModelClient::new(backend.transport(logged_in_tokens()));
    let teacher: Teacher =
        serde_json::from_value(teacher_row("T01", "Smith", "Ann")).expect("valid teacher");

    delete_record(&client, &teacher)
        .await
        .expect("Failed to delete");

    let calls = backend.calls_to("delete_model/");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "POST");
    assert_eq!(
        calls[0].body,
        json!({"model": "Enseignants", "field": "Code_Enseignant", "value": "T01"})
    );
}

#[tokio::test]
async fn blank_key_is_rejected_without_a_request() {
    let backend = MockBackend::start().await;
    let client = HttpModelClient::new(backend.transport(logged_in_tokens()));

    let teacher = Teacher {
        code: "   ".to_string(),
        ..Teacher::default()
    };
    let err = delete_record(&client, &teacher).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = client
        .update("Formations", "id", &Value::Null, &Fields::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn search_posts_query_with_limit() {
    let backend = MockBackend::start().await;
    backend.respond(
        "search_model/",
        200,
        json!({"results": [teacher_row("T07", "Smith", "Ann")], "count": 1}),
    );
    let client = HttpModelClient::new(backend.transport(logged_in_tokens()));

    let hits = client
        .search("Enseignants", "smi", 50)
        .await
        .expect("Failed to search");
    assert_eq!(hits.len(), 1);
    assert_eq!(
        backend.calls_to("search_model/")[0].body,
        json!({"model": "Enseignants", "query": "smi", "limit": 50})
    );
}

#[tokio::test]
async fn json_error_body_message_is_surfaced() {
    let backend = MockBackend::start().await;
    backend.respond("add_model_row/", 400, json!({"error": "Code already exists"}));
    let client = HttpModelClient::new(backend.transport(logged_in_tokens()));

    let err = client
        .create("Enseignants", &Fields::new())
        .await
        .unwrap_err();
    match err {
        AppError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Code already exists");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn non_json_errors_get_fixed_messages() {
    let backend = MockBackend::start().await;
    backend.respond_text("get_model_data/", 404, "<html>Not Found</html>");
    backend.respond_text("search_model/", 500, "<html>Traceback</html>");
    backend.respond_text("add_model_row/", 502, "<html>Bad gateway</html>");
    let client = HttpModelClient::new(backend.transport(logged_in_tokens()));

    let err = client
        .list("Enseignants", &ListParams::new(1, 10, ""))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "API endpoint not found. Please check the server configuration."
    );

    let err = client.search("Enseignants", "x", 5).await.unwrap_err();
    assert_eq!(err.to_string(), "Server error. Please check the server logs.");

    let err = client
        .create("Enseignants", &Fields::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Server error: 502 Bad Gateway");
}

#[tokio::test]
async fn unauthorized_response_clears_tokens() {
    let backend = MockBackend::start().await;
    backend.respond(
        "get_model_data/",
        401,
        json!({"detail": "Given token not valid"}),
    );
    let tokens = logged_in_tokens();
    let client = HttpModelClient::new(backend.transport(tokens.clone()));

    let err = client
        .list("Enseignants", &ListParams::new(1, 10, ""))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
    assert!(!tokens.is_present());
}

#[tokio::test]
async fn slow_backend_times_out() {
    let backend = MockBackend::start().await;
    backend.delay("get_model_data/", Duration::from_secs(2));
    let mut config = backend.config();
    config.timeout = Duration::from_millis(150);
    let client = HttpModelClient::new(backend.transport_with(config, AuthTokens::default()));

    let err = client
        .list("Enseignants", &ListParams::new(1, 10, ""))
        .await
        .unwrap_err();
    match err {
        AppError::Timeout { after } => assert_eq!(after, Duration::from_millis(150)),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn upload_rejects_unsupported_extension() {
    let backend = MockBackend::start().await;
    let client = HttpModelClient::new(backend.transport(logged_in_tokens()));
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("teachers.pdf");
    std::fs::write(&path, b"not a sheet").expect("Failed to write file");

    let err = client.upload("teachers", &path).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Please select a valid Excel file (.xlsx, .xls) or CSV file"
    );
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn upload_posts_multipart_file_to_model_endpoint() {
    let backend = MockBackend::start().await;
    backend.respond(
        "upload_enseignants_xlsx/",
        200,
        json!({"message": "12 teachers imported"}),
    );
    let client = HttpModelClient::new(backend.transport(logged_in_tokens()));
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("teachers.csv");
    std::fs::write(&path, "Code_Enseignant,nom\nT01,Smith\n").expect("Failed to write file");

    let result = client
        .upload("Enseignants", &path)
        .await
        .expect("Failed to upload");
    assert_eq!(result["message"], "12 teachers imported");

    let call = &backend.calls_to("upload_enseignants_xlsx/")[0];
    let content_type = call
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"));
    assert!(call.raw.contains("name=\"excel_file\""));
    assert!(call.raw.contains("filename=\"teachers.csv\""));
    assert!(call.raw.contains("T01,Smith"));
}

#[tokio::test]
async fn upload_rejects_unknown_model() {
    let backend = MockBackend::start().await;
    let client = HttpModelClient::new(backend.transport(logged_in_tokens()));
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("rooms.xlsx");
    std::fs::write(&path, b"x").expect("Failed to write file");

    let err = client.upload("Rooms", &path).await.unwrap_err();
    assert!(err.is_client_side());
    assert!(backend.calls().is_empty());
}
