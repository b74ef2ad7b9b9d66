use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use rfq_desk::config::{Backend, StorageConfig};
use rfq_desk::service::seed;
use rfq_desk::{DeskState, db, desk_router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BACKENDS: [Backend; 2] = [Backend::Json, Backend::Sqlite];

async fn seeded_app(backend: Backend) -> (TempDir, Router) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let cfg = StorageConfig {
        backend,
        data_dir: dir.path().join("instance"),
        database_url: format!("sqlite:{}", dir.path().join("rfq.sqlite").display()),
        seed: true,
    };
    let storage = db::open(&cfg).await.expect("failed to open storage");
    seed::ensure_seed(storage.as_ref())
        .await
        .expect("failed to seed storage");
    let app = desk_router(DeskState::new(storage), 1024 * 1024);
    (dir, app)
}

async fn send_raw(app: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(body)
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    send_raw(app, method, uri, body).await
}

#[tokio::test]
async fn health_reports_ok() {
    let (_dir, app) = seeded_app(Backend::Json).await;
    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn seeded_rfq_is_readable_and_unknown_is_404() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;

        let (status, body) = send(&app, "GET", "/api/rfq/1", None).await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(body["id"], 1);
        assert_eq!(body["rfq_number"], "RFQ-0000-0");
        assert_eq!(body["title"], "RFQ — Demo Screen — Revision 0");
        assert_eq!(body["status"], "Received");
        assert_eq!(body["supplier"], "");

        let (status, body) = send(&app, "GET", "/api/rfq/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{backend:?}");
        assert_eq!(body, json!({"error": "not found"}));
    }
}

#[tokio::test]
async fn patch_with_only_disallowed_fields_is_rejected_and_changes_nothing() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;
        let (_, before) = send(&app, "GET", "/api/rfq/1", None).await;

        let (status, body) = send(
            &app,
            "PATCH",
            "/api/rfq/1",
            Some(json!({"bogus": "x", "id": 99})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{backend:?}");
        assert_eq!(body, json!({"error": "no valid fields"}));

        let (_, after) = send(&app, "GET", "/api/rfq/1", None).await;
        assert_eq!(before, after, "{backend:?}");
    }
}

#[tokio::test]
async fn patch_updates_only_allowed_fields() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;
        let (status, body) = send(
            &app,
            "PATCH",
            "/api/rfq/1",
            Some(json!({"title": "New Title", "bogus": "x", "grand_total": 1200})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(body["title"], "New Title");
        assert_eq!(body["grand_total"], "1200");
        assert_eq!(body["status"], "Received");
        assert!(body.get("bogus").is_none());

        let (_, stored) = send(&app, "GET", "/api/rfq/1", None).await;
        assert_eq!(stored, body, "{backend:?}");
    }
}

#[tokio::test]
async fn patch_of_unknown_rfq_is_404_on_every_backend() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;
        let (status, _) = send(&app, "PATCH", "/api/rfq/7", Some(json!({"title": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{backend:?}");
        let (status, _) = send(&app, "GET", "/api/rfq/7", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{backend:?}");
    }
}

#[tokio::test]
async fn malformed_body_counts_as_empty() {
    let (_dir, app) = seeded_app(Backend::Json).await;
    let (status, body) = send_raw(&app, "PATCH", "/api/rfq/1", Body::from("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no valid fields");

    let (status, _) = send_raw(&app, "PATCH", "/api/rfq/1", Body::from("[1,2]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn seeded_solt_is_grouped_by_tab() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;
        let (status, body) = send(&app, "GET", "/api/rfq/1/solt", None).await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(body["rfq_id"], 1);
        assert_eq!(
            body["tabs"],
            json!([
                {"tab_index": 0, "name": "Section 1"},
                {"tab_index": 1, "name": "Section 2"}
            ])
        );
        let tab0: Vec<&str> = body["lines"]["0"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["item"].as_str().unwrap())
            .collect();
        assert_eq!(tab0, vec!["Line item A", "Line item B"]);
        assert_eq!(body["lines"]["0"][1]["line_total"], 500.0);
        assert_eq!(body["lines"]["1"][0]["line_no"], 1);
        assert_eq!(body["lines"]["1"][0]["item"], "Line item C");
    }
}

#[tokio::test]
async fn unknown_rfq_has_empty_solt() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;
        let (status, body) = send(&app, "GET", "/api/rfq/77/solt", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"rfq_id": 77, "tabs": [], "lines": {}}));
    }
}

#[tokio::test]
async fn add_line_computes_total_and_next_line_no() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;
        let (status, line) = send(
            &app,
            "POST",
            "/api/rfq/1/solt/line",
            Some(json!({
                "unit_price": 150,
                "qty": 2,
                "tab_index": 0,
                "item": "Valve",
                "uom": "EA",
                "currency": "USD"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{backend:?}");
        assert_eq!(line["line_total"], 300.0);
        assert_eq!(line["line_no"], 3);
        assert_eq!(line["id"], 4);
        assert_eq!(line["note"], "");

        let (_, fresh) = send(
            &app,
            "POST",
            "/api/rfq/1/solt/line",
            Some(json!({"tab_index": 5, "qty": "abc", "unit_price": 10})),
        )
        .await;
        assert_eq!(fresh["line_no"], 1);
        assert_eq!(fresh["qty"], 0.0);
        assert_eq!(fresh["line_total"], 0.0);
        assert_eq!(fresh["item"], Value::Null);
    }
}

#[tokio::test]
async fn add_line_rejects_non_integer_tab() {
    let (_dir, app) = seeded_app(Backend::Json).await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/rfq/1/solt/line",
        Some(json!({"tab_index": "second"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn line_total_recomputes_until_explicitly_overridden() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;
        let (_, line) = send(
            &app,
            "POST",
            "/api/rfq/1/solt/line",
            Some(json!({"tab_index": 1, "qty": 1, "unit_price": 20})),
        )
        .await;
        let uri = format!("/api/rfq/1/solt/line/{}", line["id"]);

        let (status, updated) = send(&app, "PATCH", &uri, Some(json!({"qty": 5}))).await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(updated["line_total"], 100.0);

        let (_, updated) = send(&app, "PATCH", &uri, Some(json!({"line_total": 999}))).await;
        assert_eq!(updated["line_total"], 999.0);

        let (_, updated) = send(&app, "PATCH", &uri, Some(json!({"note": "rush"}))).await;
        assert_eq!(updated["line_total"], 999.0);
        assert_eq!(updated["note"], "rush");

        let (_, updated) = send(
            &app,
            "PATCH",
            &uri,
            Some(json!({"unit_price": "4", "line_total": 1})),
        )
        .await;
        assert_eq!(updated["unit_price"], 4.0);
        assert_eq!(updated["line_total"], 1.0);

        let (_, solt) = send(&app, "GET", "/api/rfq/1/solt", None).await;
        assert_eq!(solt["lines"]["1"][1]["line_total"], 1.0, "{backend:?}");
    }
}

#[tokio::test]
async fn patch_line_errors() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;

        let (status, body) =
            send(&app, "PATCH", "/api/rfq/1/solt/line/1", Some(json!({"id": 5}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{backend:?}");
        assert_eq!(body["error"], "no valid fields");

        let (status, body) =
            send(&app, "PATCH", "/api/rfq/1/solt/line/999", Some(json!({"qty": 1}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{backend:?}");
        assert_eq!(body["error"], "not found");

        // line 1 belongs to rfq 1
        let (status, _) =
            send(&app, "PATCH", "/api/rfq/2/solt/line/1", Some(json!({"qty": 1}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{backend:?}");
    }
}

#[tokio::test]
async fn moving_a_line_between_tabs_regroups_it() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;
        let (status, _) = send(
            &app,
            "PATCH",
            "/api/rfq/1/solt/line/1",
            Some(json!({"tab_index": 1, "line_no": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, solt) = send(&app, "GET", "/api/rfq/1/solt", None).await;
        let ids: Vec<i64> = solt["lines"]["1"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 1], "{backend:?}");
    }
}

#[tokio::test]
async fn delete_is_idempotent_and_does_not_renumber() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;
        let (_, before) = send(&app, "GET", "/api/rfq/1/solt", None).await;

        let (status, body) = send(&app, "DELETE", "/api/rfq/1/solt/line/999", None).await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(body, json!({"ok": true}));
        let (_, after) = send(&app, "GET", "/api/rfq/1/solt", None).await;
        assert_eq!(before, after);

        let (_, body) = send(&app, "DELETE", "/api/rfq/1/solt/line/1", None).await;
        assert_eq!(body, json!({"ok": true}));
        let (_, after) = send(&app, "GET", "/api/rfq/1/solt", None).await;
        assert_eq!(after["lines"]["0"].as_array().unwrap().len(), 1);
        assert_eq!(after["lines"]["0"][0]["line_no"], 2);

        let (_, line) = send(
            &app,
            "POST",
            "/api/rfq/1/solt/line",
            Some(json!({"tab_index": 0})),
        )
        .await;
        assert_eq!(line["line_no"], 3, "{backend:?}");
        assert_eq!(line["id"], 4, "{backend:?}");
    }
}

#[tokio::test]
async fn rename_tab_creates_updates_and_validates() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;

        let (status, body) = send(
            &app,
            "PATCH",
            "/api/rfq/1/solt/tab/0",
            Some(json!({"name": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{backend:?}");
        assert_eq!(body["error"], "name required");

        let (status, body) = send(&app, "PATCH", "/api/rfq/1/solt/tab/0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "name required");

        let (status, body) = send(
            &app,
            "PATCH",
            "/api/rfq/1/solt/tab/0",
            Some(json!({"name": "  Mechanical "})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"tab_index": 0, "name": "Mechanical"}));

        let (_, body) = send(
            &app,
            "PATCH",
            "/api/rfq/1/solt/tab/4",
            Some(json!({"name": "Spares"})),
        )
        .await;
        assert_eq!(body, json!({"tab_index": 4, "name": "Spares"}));

        let (_, solt) = send(&app, "GET", "/api/rfq/1/solt", None).await;
        assert_eq!(
            solt["tabs"],
            json!([
                {"tab_index": 0, "name": "Mechanical"},
                {"tab_index": 1, "name": "Section 2"},
                {"tab_index": 4, "name": "Spares"}
            ]),
            "{backend:?}"
        );
    }
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = StorageConfig {
        backend: Backend::Json,
        data_dir: dir.path().to_path_buf(),
        database_url: String::new(),
        seed: true,
    };
    let storage = db::open(&cfg).await.unwrap();
    seed::ensure_seed(storage.as_ref()).await.unwrap();
    let app = desk_router(DeskState::new(storage), 64);

    let payload = json!({"title": "x".repeat(256)});
    let (status, _) = send(&app, "PATCH", "/api/rfq/1", Some(payload)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn non_finite_numbers_are_stored_as_zero() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;

        let (status, line) = send(
            &app,
            "POST",
            "/api/rfq/1/solt/line",
            Some(json!({"tab_index": 0, "qty": "nan", "unit_price": "inf"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{backend:?}");
        assert_eq!(line["qty"], 0.0);
        assert_eq!(line["unit_price"], 0.0);
        assert_eq!(line["line_total"], 0.0);

        let uri = format!("/api/rfq/1/solt/line/{}", line["id"]);
        let (status, updated) = send(
            &app,
            "PATCH",
            &uri,
            Some(json!({"qty": "-Infinity", "line_total": "NaN"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(updated["qty"], 0.0);
        assert_eq!(updated["line_total"], 0.0);

        let (status, solt) = send(&app, "GET", "/api/rfq/1/solt", None).await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(solt["lines"]["0"][2]["line_total"], 0.0);
    }
}

#[tokio::test]
async fn overflowing_product_does_not_corrupt_the_store() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;

        let (status, line) = send(
            &app,
            "POST",
            "/api/rfq/1/solt/line",
            Some(json!({"qty": "1e308", "unit_price": "1e308"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{backend:?}");
        assert_eq!(line["qty"], 1e308);
        assert_eq!(line["line_total"], 0.0);

        let uri = format!("/api/rfq/1/solt/line/{}", line["id"]);
        let (status, updated) = send(&app, "PATCH", &uri, Some(json!({"qty": 1e308}))).await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(updated["line_total"], 0.0);

        let (status, _) = send(&app, "GET", "/api/rfq/1/solt", None).await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        let (status, other) = send(
            &app,
            "POST",
            "/api/rfq/2/solt/line",
            Some(json!({"qty": 1, "unit_price": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{backend:?}");
        assert_eq!(other["line_total"], 3.0);
    }
}

#[tokio::test]
async fn extreme_line_numbers_are_rejected_without_panicking() {
    for backend in BACKENDS {
        let (_dir, app) = seeded_app(backend).await;

        for bad in [json!(0), json!(-1), json!(1e300)] {
            let (status, _) = send(
                &app,
                "PATCH",
                "/api/rfq/1/solt/line/1",
                Some(json!({"line_no": bad})),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{backend:?} {bad}");
        }
        let (status, _) = send(
            &app,
            "PATCH",
            "/api/rfq/1/solt/line/1",
            Some(json!({"tab_index": "1e300"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{backend:?}");

        let (status, _) = send(
            &app,
            "PATCH",
            "/api/rfq/1/solt/line/1",
            Some(json!({"line_no": i64::MAX})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");

        let (status, body) = send(
            &app,
            "POST",
            "/api/rfq/1/solt/line",
            Some(json!({"tab_index": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{backend:?}");
        assert_eq!(body["error"], "line_no out of range");

        // other tabs still number normally
        let (status, line) = send(
            &app,
            "POST",
            "/api/rfq/1/solt/line",
            Some(json!({"tab_index": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{backend:?}");
        assert_eq!(line["line_no"], 2);

        let (status, solt) = send(&app, "GET", "/api/rfq/1/solt", None).await;
        assert_eq!(status, StatusCode::OK, "{backend:?}");
        assert_eq!(solt["lines"]["0"][1]["line_no"], i64::MAX);
    }
}
