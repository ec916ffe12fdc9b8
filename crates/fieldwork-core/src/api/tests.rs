use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response as AxumResponse};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use super::*;
use crate::files::UploadFile;
use crate::forms::WorkOrderForm;
use crate::session::MemorySessionStore;
use crate::test_support::sample_order;

#[derive(Clone, Default)]
struct FakeServer {
    recorded: Arc<Mutex<Vec<String>>>,
}

impl FakeServer {
    fn record(&self, entry: impl Into<String>) {
        self.recorded.lock().unwrap().push(entry.into());
    }

    fn recorded(&self) -> Vec<String> {
        self.recorded.lock().unwrap().clone()
    }
}

fn valid_token() -> String {
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"id":7,"username":"Jeff","role":"admin"}"#)
    )
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {}", valid_token()))
}

fn unauthorized() -> AxumResponse {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid token" }))).into_response()
}

async fn login(Json(body): Json<Value>) -> AxumResponse {
    if body["username"] == "Jeff" && body["password"] == "hunter2" {
        Json(json!({ "token": valid_token() })).into_response()
    } else {
        unauthorized()
    }
}

async fn me(headers: HeaderMap) -> AxumResponse {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "id": 7, "username": "Jeff", "role": "admin" })).into_response()
}

async fn list(headers: HeaderMap) -> AxumResponse {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([
        { "id": 1, "customer": "Acme", "status": "Scheduled", "scheduledDate": "2025-06-01T09:00:00Z" },
        { "id": "2", "customer": "Globex", "status": "On Hold", "notes": "[]" }
    ]))
    .into_response()
}

async fn show(headers: HeaderMap, Path(id): Path<i64>) -> AxumResponse {
    if !authorized(&headers) {
        return unauthorized();
    }
    match id {
        13 => (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "You are not allowed to edit this work order." })),
        )
            .into_response(),
        14 => StatusCode::FORBIDDEN.into_response(),
        500 => (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response(),
        _ => Json(json!({ "id": id, "customer": "Acme", "poNumber": "77" })).into_response(),
    }
}

async fn update_status(
    State(server): State<FakeServer>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> AxumResponse {
    if !authorized(&headers) {
        return unauthorized();
    }
    server.record(format!("status {id} {}", body["status"].as_str().unwrap_or_default()));
    Json(json!({ "ok": true })).into_response()
}

async fn edit(
    State(server): State<FakeServer>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AxumResponse {
    if !authorized(&headers) {
        return unauthorized();
    }
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let mime = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.unwrap();
                server.record(format!("{id} file {name} {file_name} {mime} {}", bytes.len()));
            }
            None => {
                let value = field.text().await.unwrap();
                server.record(format!("{id} text {name}={value}"));
            }
        }
    }
    Json(json!({ "ok": true })).into_response()
}

async fn add_note(headers: HeaderMap, Json(body): Json<Value>) -> AxumResponse {
    if !authorized(&headers) {
        return unauthorized();
    }
    let text = body["text"].clone();
    Json(json!({
        "notes": [
            { "text": "older", "by": "tech", "createdAt": "2025-06-01T08:00:00Z" },
            { "text": text, "by": "Jeff", "createdAt": "2025-06-02T08:00:00Z" }
        ]
    }))
    .into_response()
}

async fn delete_attachment(
    State(server): State<FakeServer>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> AxumResponse {
    if !authorized(&headers) {
        return unauthorized();
    }
    server.record(format!("delete {}", body["photoPath"].as_str().unwrap_or_default()));
    StatusCode::NO_CONTENT.into_response()
}

async fn files(Query(query): Query<HashMap<String, String>>) -> AxumResponse {
    match query.get("key").map(String::as_str) {
        Some("uploads/wo.pdf") => Redirect::to("/blobs/wo.pdf").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn blob() -> &'static [u8] {
    b"%PDF-1.4 fake"
}

async fn spawn_fake_server() -> (String, FakeServer) {
    let server = FakeServer::default();
    let router = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/work-orders", get(list).post(edit_create))
        .route("/work-orders/{id}", get(show).put(update_status))
        .route("/work-orders/{id}/edit", put(edit))
        .route("/work-orders/{id}/notes", post(add_note))
        .route(
            "/work-orders/{id}/attachment",
            axum::routing::delete(delete_attachment),
        )
        .route("/files", get(files))
        .route("/blobs/wo.pdf", get(blob))
        .with_state(server.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), server)
}

async fn edit_create(
    State(server): State<FakeServer>,
    headers: HeaderMap,
    multipart: Multipart,
) -> AxumResponse {
    edit(State(server), headers, Path(0), multipart).await
}

fn api(base_url: &str, store: MemorySessionStore) -> WorkOrderApi<MemorySessionStore> {
    WorkOrderApi::new(ClientConfig::new(base_url).unwrap(), store).unwrap()
}

fn signed_in_store() -> MemorySessionStore {
    MemorySessionStore::with_session(Session::from_token(valid_token()))
}

#[tokio::test(flavor = "current_thread")]
async fn login_persists_decoded_session() {
    let (base_url, _) = spawn_fake_server().await;
    let store = MemorySessionStore::new();
    let client = api(&base_url, store.clone());

    let session = client.login("  Jeff ", " hunter2 ").await.unwrap();
    assert_eq!(session.username.as_deref(), Some("Jeff"));
    assert_eq!(session.role.as_deref(), Some("admin"));
    assert_eq!(store.load_session().unwrap(), Some(session));

    let user = client.me().await.unwrap();
    assert_eq!(user.username.as_deref(), Some("Jeff"));
}

#[tokio::test(flavor = "current_thread")]
async fn login_rejects_blank_fields_without_network() {
    // Nothing listens on this port; a request would fail with Http instead.
    let client = api("http://127.0.0.1:9", MemorySessionStore::new());
    let error = client.login("   ", "secret").await.unwrap_err();
    assert!(matches!(error, Error::Validation(_)));
}

#[tokio::test(flavor = "current_thread")]
async fn login_maps_401_to_invalid_credentials() {
    let (base_url, _) = spawn_fake_server().await;
    let client = api(&base_url, MemorySessionStore::new());
    let error = client.login("Jeff", "wrong").await.unwrap_err();
    assert!(matches!(error, Error::InvalidCredentials));
    assert_eq!(error.to_string(), "Invalid username or password.");
}

#[tokio::test(flavor = "current_thread")]
async fn any_401_clears_the_stored_session() {
    let (base_url, _) = spawn_fake_server().await;
    let store = MemorySessionStore::with_session(Session::from_token("expired-token"));
    let client = api(&base_url, store.clone());

    let error = client.list_work_orders().await.unwrap_err();
    assert!(error.requires_login());
    assert!(store.load_session().unwrap().is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn list_decodes_mixed_rows() {
    let (base_url, _) = spawn_fake_server().await;
    let client = api(&base_url, signed_in_store());

    let orders = client.list_work_orders().await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[1].id, WorkOrderId::new(2));
    assert_eq!(
        orders[1].status,
        WorkOrderStatus::Other("On Hold".to_string())
    );
}

#[tokio::test(flavor = "current_thread")]
async fn forbidden_and_server_errors_carry_messages() {
    let (base_url, _) = spawn_fake_server().await;
    let store = signed_in_store();
    let client = api(&base_url, store.clone());

    match client.get_work_order(WorkOrderId::new(13)).await.unwrap_err() {
        Error::Forbidden(message) => {
            assert_eq!(message, "You are not allowed to edit this work order.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    match client.get_work_order(WorkOrderId::new(14)).await.unwrap_err() {
        Error::Forbidden(message) => assert_eq!(message, DEFAULT_FORBIDDEN_MESSAGE),
        other => panic!("unexpected error: {other:?}"),
    }
    match client.get_work_order(WorkOrderId::new(500)).await.unwrap_err() {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable (500)");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // 403 and 5xx leave the session alone.
    assert!(store.load_session().unwrap().is_some());
}

#[tokio::test(flavor = "current_thread")]
async fn status_update_sends_label() {
    let (base_url, server) = spawn_fake_server().await;
    let client = api(&base_url, signed_in_store());

    client
        .update_status(WorkOrderId::new(5), &WorkOrderStatus::WaitingOnParts)
        .await
        .unwrap();
    assert_eq!(server.recorded(), vec!["status 5 Waiting on Parts"]);
}

#[tokio::test(flavor = "current_thread")]
async fn edit_sends_all_text_fields_then_files() {
    let (base_url, server) = spawn_fake_server().await;
    let client = api(&base_url, signed_in_store());

    let order = sample_order(8);
    let mut form = WorkOrderForm::from_work_order(&order);
    form.status = WorkOrderStatus::Scheduled;
    let pdf = UploadFile::pdf("WO-PO-8-signed.pdf", b"%PDF".to_vec()).unwrap();
    let submission = FormSubmission::new(form, vec![pdf]).unwrap();

    client
        .edit_work_order(WorkOrderId::new(8), &submission)
        .await
        .unwrap();

    assert_eq!(
        server.recorded(),
        vec![
            "8 text poNumber=PO-8".to_string(),
            "8 text customer=Customer 8".to_string(),
            "8 text siteLocation=12 Harbor Rd, Portland ME".to_string(),
            "8 text billingAddress=1 Main St".to_string(),
            "8 text problemDescription=Walk-in cooler not holding temperature".to_string(),
            "8 text status=Scheduled".to_string(),
            "8 file pdfFile WO-PO-8-signed.pdf application/pdf 4".to_string(),
        ]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn create_posts_multipart_with_default_status() {
    let (base_url, server) = spawn_fake_server().await;
    let client = api(&base_url, signed_in_store());

    let form = WorkOrderForm {
        customer: "Initech".to_string(),
        billing_address: "4120 Freidrich Ln".to_string(),
        problem_description: "Printer on fire".to_string(),
        ..WorkOrderForm::for_create()
    };
    let photo = UploadFile::photo("photo-1-0.jpg", vec![0xFF, 0xD8, 0xFF]).unwrap();
    client
        .create_work_order(&FormSubmission::new(form, vec![photo]).unwrap())
        .await
        .unwrap();

    let recorded = server.recorded();
    assert!(recorded.contains(&"0 text status=Parts In".to_string()));
    assert!(recorded.contains(&"0 file photoFile photo-1-0.jpg image/jpeg 3".to_string()));
}

#[tokio::test(flavor = "current_thread")]
async fn blank_required_fields_block_create_and_edit_requests() {
    let (base_url, server) = spawn_fake_server().await;
    let client = api(&base_url, signed_in_store());

    let blank_create = FormSubmission {
        form: WorkOrderForm {
            customer: "  ".to_string(),
            ..WorkOrderForm::for_create()
        },
        files: vec![UploadFile::photo("photo-1-0.jpg", vec![0xFF, 0xD8, 0xFF]).unwrap()],
    };
    let error = client.create_work_order(&blank_create).await.unwrap_err();
    assert!(matches!(error, Error::Validation(_)));

    let mut form = WorkOrderForm::from_work_order(&sample_order(8));
    form.billing_address.clear();
    form.problem_description = "\n".to_string();
    let blank_edit = FormSubmission {
        form,
        files: Vec::new(),
    };
    let error = client
        .edit_work_order(WorkOrderId::new(8), &blank_edit)
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Validation(_)));
    assert!(error.to_string().contains("Billing Address"));

    assert!(server.recorded().is_empty());

    // A dead port proves the same without a server.
    let offline = api("http://127.0.0.1:9", signed_in_store());
    let error = offline.create_work_order(&blank_create).await.unwrap_err();
    assert!(matches!(error, Error::Validation(_)));
}

#[tokio::test(flavor = "current_thread")]
async fn photo_upload_sends_files_only() {
    let (base_url, server) = spawn_fake_server().await;
    let client = api(&base_url, signed_in_store());

    let photos = vec![
        UploadFile::photo("photo-9-0.jpg", vec![1, 2]).unwrap(),
        UploadFile::photo("photo-9-1.jpg", vec![3]).unwrap(),
    ];
    client
        .upload_photos(WorkOrderId::new(3), &photos)
        .await
        .unwrap();

    assert_eq!(
        server.recorded(),
        vec![
            "3 file photoFile photo-9-0.jpg image/jpeg 2".to_string(),
            "3 file photoFile photo-9-1.jpg image/jpeg 1".to_string(),
        ]
    );
    assert!(client.upload_photos(WorkOrderId::new(3), &[]).await.is_err());
}

#[tokio::test(flavor = "current_thread")]
async fn notes_come_back_newest_first() {
    let (base_url, _) = spawn_fake_server().await;
    let client = api(&base_url, signed_in_store());

    let notes = client
        .add_note(WorkOrderId::new(1), "  Compressor replaced ")
        .await
        .unwrap();
    assert_eq!(notes[0].text, "Compressor replaced");
    assert_eq!(notes[1].text, "older");

    assert!(client.add_note(WorkOrderId::new(1), "   ").await.is_err());
}

#[tokio::test(flavor = "current_thread")]
async fn delete_attachment_sends_photo_key() {
    let (base_url, server) = spawn_fake_server().await;
    let client = api(&base_url, signed_in_store());

    client
        .delete_attachment(WorkOrderId::new(1), " uploads/a.jpg ")
        .await
        .unwrap();
    assert_eq!(server.recorded(), vec!["delete uploads/a.jpg"]);
}

#[tokio::test(flavor = "current_thread")]
async fn download_follows_file_resolver_redirect() {
    let (base_url, _) = spawn_fake_server().await;
    let client = api(&base_url, signed_in_store());

    let bytes = client.download_file("uploads/wo.pdf").await.unwrap();
    assert_eq!(bytes, b"%PDF-1.4 fake");

    let missing = client.download_file("uploads/missing.pdf").await.unwrap_err();
    assert!(matches!(missing, Error::Api { status: 404, .. }));
}

#[tokio::test(flavor = "current_thread")]
async fn logout_is_local_only() {
    let store = signed_in_store();
    let client = api("http://127.0.0.1:9", store.clone());
    client.logout().unwrap();
    assert!(client.current_session().unwrap().is_none());
}
