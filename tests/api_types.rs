use metrika_logs::api::{
    types::{ApiErrorBody, LogRequestEnvelope},
    LogStatus, RequestId,
};

#[test]
fn parses_log_request_envelope() {
    let raw = r#"{
        "log_request": {
            "request_id": 123456,
            "counter_id": 1,
            "source": "visits",
            "status": "processed",
            "size": 2048,
            "parts": [{"part_number": 0, "size": 1024}, {"part_number": 1, "size": 1024}]
        }
    }"#;
    let env: LogRequestEnvelope = serde_json::from_str(raw).unwrap();
    let info = env.log_request;
    assert_eq!(info.request_id, Some(RequestId("123456".into())));
    assert_eq!(info.status, LogStatus::Processed);
    assert_eq!(info.parts.len(), 2);
    assert_eq!(info.parts[1].part_number, 1);
}

#[test]
fn unknown_status_is_kept_verbatim() {
    let raw = r#"{"log_request": {"status": "cleaned_by_user"}}"#;
    let env: LogRequestEnvelope = serde_json::from_str(raw).unwrap();
    assert_eq!(env.log_request.request_id, None);
    assert_eq!(env.log_request.status, LogStatus::Other("cleaned_by_user".into()));
    assert_eq!(env.log_request.status.to_string(), "cleaned_by_user");
}

#[test]
fn error_body_lists_every_message() {
    let raw = r#"{"errors": [{"error_type": "invalid_parameter", "message": "bad field"},
                            {"message": "bad date"}],
                 "code": 400, "message": "Invalid request"}"#;
    let body: ApiErrorBody = serde_json::from_str(raw).unwrap();
    assert_eq!(body.describe(), "Invalid request\n- bad field\n- bad date");
}
