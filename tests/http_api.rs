//! `HttpLogsApi` against a local wiremock server.
//!
//! The client is blocking, so the tests are plain `#[test]`s that keep a
//! tokio runtime around only for mounting mocks and verifying expectations.

mod common;

use common::fast_config;
use metrika_logs::{
    api::{HttpLogsApi, LogStatus, LogsApi, RequestId},
    catalog::{Attribution, ReportType},
    config::Config,
    error::{ApiError, ExportError},
    pipeline::Exporter,
    request::{ReportRequest, RequestParams},
};
use serde_json::json;
use time::macros::date;
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "secret-token";
const COUNTER: &str = "42";

struct Server {
    server: MockServer,
    rt: Runtime,
}

impl Server {
    fn start() -> Self {
        let rt = Runtime::new().expect("tokio runtime");
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    fn verify(&self) {
        self.rt.block_on(self.server.verify());
    }

    fn config(&self) -> Config {
        let mut cfg = fast_config();
        cfg.api.base_url = self.server.uri();
        cfg.api.max_retries = 2;
        cfg.api.retry_backoff_ms = 0;
        cfg
    }

    fn api(&self, cfg: &Config) -> HttpLogsApi {
        HttpLogsApi::new(cfg, TOKEN, COUNTER).expect("client builds")
    }
}

fn request() -> ReportRequest {
    let params = RequestParams {
        report_type: ReportType::Visits,
        fields: vec!["ym:s:date".into(), "ym:s:clientID".into()],
        date1: "2024-06-01".into(),
        date2: "2024-06-02".into(),
        attribution: Attribution::Last,
        ensure_required_metrics: false,
    };
    ReportRequest::new(&params, date!(2024 - 06 - 10)).unwrap()
}

#[test]
fn token_check_sends_oauth_header() {
    let srv = Server::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/counters"))
            .and(header("authorization", "OAuth secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "counters": [] })))
            .expect(1),
    );

    let api = srv.api(&srv.config());
    api.verify_token().unwrap();
    srv.verify();
}

#[test]
fn unavailable_is_retried_up_to_max_retries() {
    let srv = Server::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/counter/42/logrequest/7"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3),
    );

    let api = srv.api(&srv.config());
    let err = api.request_info(&RequestId("7".into())).unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 503,
            message: "Service Unavailable".into(),
        }
    );
    srv.verify();
}

#[test]
fn create_rejection_joins_vendor_messages() {
    let srv = Server::start();
    srv.mount(
        Mock::given(method("POST"))
            .and(path("/counter/42/logrequests"))
            .and(query_param("source", "visits"))
            .and(query_param("date1", "2024-06-01"))
            .and(query_param("fields", "ym:s:date,ym:s:clientID"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "message": "Invalid request",
                "errors": [{ "message": "bad field" }],
            })))
            .expect(1),
    );

    let api = srv.api(&srv.config());
    let err = api.create_request(&request()).unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 400,
            message: "Invalid request\n- bad field".into(),
        }
    );
    srv.verify();
}

#[test]
fn created_without_request_id_is_an_error() {
    let srv = Server::start();
    srv.mount(
        Mock::given(method("POST"))
            .and(path("/counter/42/logrequests"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "log_request": { "status": "created" } })),
            ),
    );

    let mut cfg = srv.config();
    cfg.api.verify_token = false;
    let exporter = Exporter::new(&cfg, srv.api(&cfg));
    let err = exporter.run(&request()).unwrap_err();
    assert!(matches!(err, ExportError::MissingRequestId));
}

#[test]
fn full_exchange_downloads_and_cleans() {
    let srv = Server::start();
    let processed = json!({
        "log_request": {
            "request_id": 7,
            "status": "processed",
            "parts": [{ "part_number": 0, "size": 40 }],
        }
    });

    srv.mount(
        Mock::given(method("GET"))
            .and(path("/counters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1),
    );
    srv.mount(
        Mock::given(method("POST"))
            .and(path("/counter/42/logrequests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "log_request": { "request_id": 7, "status": "created" }
            })))
            .expect(1),
    );
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/counter/42/logrequest/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(processed))
            .expect(1),
    );
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/counter/42/logrequest/7/part/0/download"))
            .and(header("authorization", "OAuth secret-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("ym:s:date\tym:s:clientID\n2024-06-01\t11\n"),
            )
            .expect(1),
    );
    srv.mount(
        Mock::given(method("POST"))
            .and(path("/counter/42/logrequest/7/clean"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "log_request": { "request_id": 7, "status": "cleaned_by_user" }
            })))
            .expect(1),
    );

    let cfg = srv.config();
    let exporter = Exporter::new(&cfg, srv.api(&cfg));
    let out = exporter.run(&request()).unwrap();

    assert_eq!(out.request_id.to_string(), "7");
    assert_eq!(out.parts, 1);
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0]["ym:s:clientID"], "11");
    srv.verify();
}

#[test]
fn status_reply_parses_parts() {
    let srv = Server::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/counter/42/logrequest/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "log_request": {
                    "request_id": "9",
                    "status": "processing",
                    "parts": [],
                }
            }))),
    );

    let api = srv.api(&srv.config());
    let info = api.request_info(&RequestId("9".into())).unwrap();
    assert_eq!(info.status, LogStatus::Processing);
    assert!(info.parts.is_empty());
}

#[test]
fn empty_error_body_falls_back_to_reason() {
    let srv = Server::start();
    srv.mount(
        Mock::given(method("GET"))
            .and(path("/counter/42/logrequest/7/part/0/download"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1),
    );

    let api = srv.api(&srv.config());
    let err = api.download_part(&RequestId("7".into()), 0).unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 404,
            message: "Not Found".into(),
        }
    );
    srv.verify();
}
