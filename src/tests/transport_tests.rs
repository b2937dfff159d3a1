use super::*;
use crate::model::SeatId;
use crate::test_support::{roster_file, spawn_backend, transport_for};
use serde_json::json;

#[tokio::test]
async fn upload_sends_multipart_file_field() {
    let (url, backend) = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let file = roster_file(dir.path(), "roster.xlsx");

    let res = transport_for(&url).upload(&file).await.expect("upload");

    assert_eq!(res.message, "Uploaded 2 student records");
    assert_eq!(res.departments, vec!["CS", "EE"]);
    let uploads = backend.uploads.lock().unwrap().clone();
    assert_eq!(uploads, vec![("file".to_string(), "roster.xlsx".to_string(), 16)]);
}

#[tokio::test]
async fn upload_error_body_is_remote_error_verbatim() {
    let (url, backend) = spawn_backend().await;
    backend.reply_upload(
        400,
        r#"{"error":"Required column 'year' not found","available_columns":["name"],"expected_names":["year","class"]}"#,
    );
    let dir = tempfile::tempdir().unwrap();
    let file = roster_file(dir.path(), "roster.xls");

    let err = transport_for(&url).upload(&file).await.unwrap_err();
    assert_eq!(err.to_string(), "Required column 'year' not found");
    assert!(matches!(err, SeatingError::Remote(_)));
}

#[tokio::test]
async fn generate_posts_exact_payload_and_decodes_seats() {
    let (url, backend) = spawn_backend().await;
    backend.reply_generate(
        200,
        r#"[{"department":"cs","name":"A","roll_number":"1","room":"Room 1","seat":1,"year":"2"},
            {"department":"ee","name":"B","roll_number":"2","room":"Room 2","seat":1,"year":"2"}]"#,
    );
    let req = GenerateRequest {
        departments: vec!["CS".into(), "EE".into()],
        classrooms: 2,
        students_per_class: 30,
    };

    let seats = transport_for(&url).generate(&req).await.expect("generate");

    assert_eq!(seats.len(), 2);
    assert_eq!(seats[1].room, "Room 2");
    assert_eq!(seats[0].seat, SeatId::Number(1));
    let sent = backend.generates.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![json!({"departments":["CS","EE"],"classrooms":2,"studentsPerClass":30})]
    );
}

#[tokio::test]
async fn generate_error_keeps_details_for_hint() {
    let (url, backend) = spawn_backend().await;
    backend.reply_generate(
        500,
        r#"{"error":"Unexpected error","details":"boom","solution":"Check server logs for more information"}"#,
    );
    let req = GenerateRequest {
        departments: vec!["CS".into()],
        classrooms: 1,
        students_per_class: 1,
    };

    let err = transport_for(&url).generate(&req).await.unwrap_err();
    assert_eq!(err.to_string(), "Unexpected error");
    assert_eq!(
        err.hint().as_deref(),
        Some("boom (Check server logs for more information)")
    );
}

#[tokio::test]
async fn malformed_body_is_transport_error() {
    let (url, backend) = spawn_backend().await;
    backend.reply_generate(200, "<html>oops</html>");
    let req = GenerateRequest {
        departments: vec!["CS".into()],
        classrooms: 1,
        students_per_class: 1,
    };

    let err = transport_for(&url).generate(&req).await.unwrap_err();
    assert!(matches!(err, SeatingError::Transport(_)), "{err:?}");
    assert!(err.to_string().contains(GENERATE_PATH));
}

#[tokio::test]
async fn shape_mismatch_is_transport_error() {
    let (url, backend) = spawn_backend().await;
    backend.reply_generate(200, r#"[{"room":"Room 1"}]"#);
    let req = GenerateRequest {
        departments: vec!["CS".into()],
        classrooms: 1,
        students_per_class: 1,
    };

    let err = transport_for(&url).generate(&req).await.unwrap_err();
    assert!(matches!(err, SeatingError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn seat_without_room_is_rejected() {
    let (url, backend) = spawn_backend().await;
    backend.reply_generate(
        200,
        r#"[{"department":"cs","name":"A","roll_number":"1","room":"Room 1","seat":1},
            {"department":"cs","name":"B","roll_number":"2","room":" ","seat":2}]"#,
    );
    let req = GenerateRequest {
        departments: vec!["CS".into()],
        classrooms: 1,
        students_per_class: 2,
    };

    let err = transport_for(&url).generate(&req).await.unwrap_err();
    assert!(matches!(err, SeatingError::Transport(_)), "{err:?}");
    assert!(err.to_string().contains("record 1"), "{err}");
}

#[tokio::test]
async fn seat_without_department_is_rejected() {
    let (url, backend) = spawn_backend().await;
    backend.reply_generate(
        200,
        r#"[{"department":"","name":"A","roll_number":"1","room":"Room 1","seat":1}]"#,
    );
    let req = GenerateRequest {
        departments: vec!["CS".into()],
        classrooms: 1,
        students_per_class: 1,
    };

    let err = transport_for(&url).generate(&req).await.unwrap_err();
    assert!(matches!(err, SeatingError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn non_success_status_without_error_field() {
    let (url, backend) = spawn_backend().await;
    backend.reply_generate(502, "[]");
    let req = GenerateRequest {
        departments: vec!["CS".into()],
        classrooms: 1,
        students_per_class: 1,
    };

    let err = transport_for(&url).generate(&req).await.unwrap_err();
    assert!(err.to_string().contains("502"), "{err}");
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let req = GenerateRequest {
        departments: vec!["CS".into()],
        classrooms: 1,
        students_per_class: 1,
    };
    let err = transport_for(&format!("http://{addr}"))
        .generate(&req)
        .await
        .unwrap_err();
    assert!(matches!(err, SeatingError::Transport(_)));
}

#[test]
fn mime_follows_extension() {
    assert_eq!(mime_for(Path::new("a.XLS")), XLS_MIME);
    assert_eq!(mime_for(Path::new("a.xlsx")), XLSX_MIME);
}
