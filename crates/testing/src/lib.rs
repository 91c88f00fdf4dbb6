
#[cfg(test)]
mod firebase_tests {
    use std::sync::Arc;

    use axum::{
        extract::State,
        http::{Method, StatusCode, Uri},
        response::{IntoResponse, Response},
        Json, Router,
    };
    use codeviz_core::Store;
    use codeviz_server::Server;
    use codeviz_storage_firebase::{FirebaseConfig, FirebaseError, FirebaseStore};
    use parking_lot::Mutex;
    use serde_json::{json, Map, Value};
    use tower::ServiceExt;

    #[derive(Clone, Debug)]
    struct Recorded {
        method: Method,
        path: String,
        query: Option<String>,
        body: Value,
    }

    /// Minimal stand-in for the realtime database REST interface.
    #[derive(Clone, Default)]
    struct FakeDb {
        calls: Arc<Mutex<Vec<Recorded>>>,
        required_auth: Option<String>,
    }

    async fn record(State(db): State<FakeDb>, method: Method, uri: Uri, body: String) -> Response {
        let query = uri.query().map(str::to_owned);
        if let Some(expected) = &db.required_auth {
            if query.as_deref() != Some(format!("auth={expected}").as_str()) {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "Permission denied"})),
                )
                    .into_response();
            }
        }
        let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        db.calls.lock().push(Recorded {
            method: method.clone(),
            path: uri.path().to_string(),
            query,
            body: body.clone(),
        });
        if method == Method::GET {
            Json(json!({"github_token": "abc"})).into_response()
        } else {
            Json(body).into_response()
        }
    }

    async fn spawn_fake(db: FakeDb) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(record).with_state(db);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn config(url: &str, token: Option<&str>) -> FirebaseConfig {
        let mut cfg = FirebaseConfig::new(url);
        cfg.auth_token = token.map(str::to_owned);
        cfg.timeout_ms = 5_000;
        cfg
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_set_and_get_use_rest_verbs() {
        let db = FakeDb {
            required_auth: Some("s3cret".into()),
            ..FakeDb::default()
        };
        let url = spawn_fake(db.clone()).await;
        let store = FirebaseStore::new(config(&url, Some("s3cret"))).unwrap();

        let got = tokio::task::spawn_blocking(move || {
            let mut fields = Map::new();
            fields.insert("github_token".into(), json!("abc"));
            store.update("users/u1", &fields)?;
            store.set("progress/u1", &json!({"step": 1}))?;
            store.get("users/u1")
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(got, Some(json!({"github_token": "abc"})));

        let calls = db.calls.lock().clone();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].method, Method::PATCH);
        assert_eq!(calls[0].path, "/users/u1.json");
        assert_eq!(calls[0].query.as_deref(), Some("auth=s3cret"));
        assert_eq!(calls[0].body, json!({"github_token": "abc"}));
        assert_eq!(calls[1].method, Method::PUT);
        assert_eq!(calls[1].path, "/progress/u1.json");
        assert_eq!(calls[1].body, json!({"step": 1}));
        assert_eq!(calls[2].method, Method::GET);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rejected_requests_carry_status() {
        let db = FakeDb {
            required_auth: Some("right".into()),
            ..FakeDb::default()
        };
        let url = spawn_fake(db.clone()).await;
        let store = FirebaseStore::new(config(&url, None)).unwrap();

        let err = tokio::task::spawn_blocking(move || store.set("progress/u1", &json!(1)))
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, FirebaseError::Status { status: 401, .. }));
        assert!(db.calls.lock().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn graphql_link_reaches_the_database() {
        let db = FakeDb::default();
        let url = spawn_fake(db.clone()).await;
        let server = Server::new(FirebaseStore::new(config(&url, None)).unwrap());

        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json")
            .header("x-user-id", "u42")
            .body(axum::body::Body::from(
                json!({"query": r#"mutation { linkGithub(token: "<t>") }"#}).to_string(),
            ))
            .unwrap();
        let resp = server.router().oneshot(req).await.unwrap();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["linkGithub"], "GitHub account linked");

        let calls = db.calls.lock().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::PATCH);
        assert_eq!(calls[0].path, "/users/u42.json");
        assert_eq!(calls[0].query, None);
        assert_eq!(calls[0].body, json!({"github_token": "&lt;t&gt;"}));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn hostile_user_ids_never_reach_the_database() {
        let db = FakeDb::default();
        let url = spawn_fake(db.clone()).await;
        let server = Server::new(FirebaseStore::new(config(&url, None)).unwrap());

        for user in ["attacker/../../progress/victim", "u1?x=1", "u1#frag", "a.b"] {
            let req = axum::http::Request::builder()
                .method("POST")
                .uri("/graphql")
                .header("content-type", "application/json")
                .header("x-user-id", user)
                .body(axum::body::Body::from(
                    json!({"query": r#"mutation { linkGithub(token: "t") }"#}).to_string(),
                ))
                .unwrap();
            let resp = server.router().oneshot(req).await.unwrap();
            let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["errors"][0]["extensions"]["code"], "INTERNAL", "{user}");
            assert!(body["data"].is_null(), "{user}");
        }
        assert!(db.calls.lock().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn odd_characters_stay_inside_one_segment() {
        let db = FakeDb::default();
        let url = spawn_fake(db.clone()).await;
        let store = FirebaseStore::new(config(&url, None)).unwrap();

        tokio::task::spawn_blocking(move || store.set("progress/a b%", &json!(1)))
            .await
            .unwrap()
            .unwrap();

        let calls = db.calls.lock().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "/progress/a%20b%25.json");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn oversized_explain_never_calls_the_database() {
        let db = FakeDb::default();
        let url = spawn_fake(db.clone()).await;
        let server = Server::new(FirebaseStore::new(config(&url, None)).unwrap());
        let ops = server.operations();
        assert!(ops.explain_code(&">".repeat(2501)).is_err());
        assert!(db.calls.lock().is_empty());
    }
}
