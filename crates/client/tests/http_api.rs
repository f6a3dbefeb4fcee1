//! `HttpTimetableApi` against a one-shot local HTTP responder.
//!
//! Each test binds an ephemeral port, serves a single canned response, and
//! inspects the raw request the client sent.

use assert_matches::assert_matches;
use chrono::NaiveDate;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use schoolgrid_client::api::{ApiError, HttpTimetableApi, TimetableApi};
use schoolgrid_client::session::{Session, SessionHandle};
use schoolgrid_core::normalize::GENERIC_ERROR_MESSAGE;
use schoolgrid_core::record::AssignmentPayload;
use schoolgrid_core::slot::AssignmentSlot;
use schoolgrid_core::types::{Day, GridContext};

// ---------------------------------------------------------------------------
// Responder
// ---------------------------------------------------------------------------

fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Serve one response; the handle resolves to the raw request text.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/api", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (base, handle)
}

fn api(base: String, token: Option<&str>) -> HttpTimetableApi {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpTimetableApi::with_client(
        client,
        base,
        SessionHandle::new(Session::new(token.map(str::to_string))),
    )
}

fn payload() -> AssignmentPayload {
    AssignmentPayload::for_cell(
        GridContext::Class(12),
        Day::Monday,
        1,
        &[AssignmentSlot::new(7, 3)],
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        false,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_unwraps_envelope_and_sends_bearer_token() {
    let (base, server) =
        serve_once("200 OK", r#"{"data":[{"id":1,"period_name":"I"},{"id":2}]}"#).await;

    let periods = api(base, Some("abc")).list_periods().await.unwrap();
    let request = server.await.unwrap().to_ascii_lowercase();

    assert_eq!(periods.len(), 2);
    assert_eq!(periods[0].period_name, "I");
    assert!(request.starts_with("get /api/periods http/1.1"));
    assert!(request.contains("authorization: bearer abc"));
}

#[tokio::test]
async fn records_use_context_path_without_token() {
    let (base, server) = serve_once(
        "200 OK",
        r#"[{"id":55,"day":"Tuesday","periodId":2,"subjectId":4,"teacherId":2}]"#,
    )
    .await;

    let records = api(base, None)
        .list_records(GridContext::Teacher(2))
        .await
        .unwrap();
    let request = server.await.unwrap().to_ascii_lowercase();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cell()[0].id, Some(55));
    assert!(request.starts_with("get /api/timetable-teacher/2 http/1.1"));
    assert!(!request.contains("authorization:"));
}

#[tokio::test]
async fn list_without_array_is_unexpected_shape() {
    let (base, server) = serve_once("200 OK", r#"{"status":"ok"}"#).await;

    let result = api(base, None).list_classes().await;
    server.await.unwrap();

    assert_matches!(result, Err(ApiError::UnexpectedShape(msg)) if msg.starts_with("/classes"));
}

#[tokio::test]
async fn upsert_returns_nested_record_id() {
    let (base, server) = serve_once("200 OK", r#"{"data":{"id":99}}"#).await;

    let id = api(base, Some("abc")).upsert_assignment(&payload()).await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(id, Some(99));
    assert!(request.starts_with("POST /api/period-class-teacher-subject HTTP/1.1"));
    assert!(request.contains(r#""periodId":1"#));
    assert!(request.contains(r#""classId":12"#));
    assert!(request.contains(r#""effectFrom":"2026-09-01""#));
}

#[tokio::test]
async fn conflict_carries_backend_warning() {
    let (base, server) = serve_once("409 Conflict", r#"{"warning":"Teacher already booked"}"#).await;

    let result = api(base, None).upsert_assignment(&payload()).await;
    server.await.unwrap();

    assert_matches!(result, Err(ApiError::Conflict { message }) if message == "Teacher already booked");
}

#[tokio::test]
async fn non_json_failure_uses_generic_message() {
    let (base, server) = serve_once("500 Internal Server Error", "oops").await;

    let result = api(base, None).delete_assignment(55).await;
    let request = server.await.unwrap();

    assert!(request.starts_with("DELETE /api/period-class-teacher-subject/55 HTTP/1.1"));
    assert_matches!(
        result,
        Err(ApiError::Rejected { status: 500, message }) if message == GENERIC_ERROR_MESSAGE
    );
}

#[tokio::test]
async fn delete_accepts_empty_success_body() {
    let (base, server) = serve_once("200 OK", "").await;

    api(base, None).delete_assignment(55).await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn unauthorized_response_invalidates_session() {
    let (base, server) = serve_once("401 Unauthorized", r#"{"message":"Token expired"}"#).await;
    let session = SessionHandle::new(Session::new(Some("stale".into())));
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let api = HttpTimetableApi::with_client(client, base, session.clone());

    let err = api.list_classes().await.unwrap_err();
    server.await.unwrap();

    assert_matches!(err, ApiError::Rejected { status: 401, ref message } if message == "Token expired");
    assert_eq!(session.token().await, None);
}
