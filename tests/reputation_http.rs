// tests/reputation_http.rs
//
// HttpReputation against a local mock of the code-host and model-host APIs.

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::time::Duration;

use trend_radar::config::ReputationSettings;
use trend_radar::reputation::{HttpReputation, Metric, ReputationResult, ReputationSource};
use trend_radar::ReferenceKind;

async fn repo(Path((_owner, repo)): Path<(String, String)>, headers: HeaderMap) -> Response {
    match repo.as_str() {
        "popular" => Json(json!({ "stargazers_count": 237, "watchers_count": 237 })).into_response(),
        "unstarred" => Json(json!({ "stargazers_count": 0 })).into_response(),
        "watchers-only" => Json(json!({ "watchers_count": 12 })).into_response(),
        "limited" => (StatusCode::FORBIDDEN, "API rate limit exceeded").into_response(),
        "garbage" => "this is not json".into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "stargazers_count": 999 })).into_response()
        }
        "private" => {
            let authed = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some("token s3cret");
            if authed {
                Json(json!({ "stargazers_count": 5 })).into_response()
            } else {
                StatusCode::NOT_FOUND.into_response()
            }
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn model(Path((_org, name)): Path<(String, String)>) -> Response {
    match name.as_str() {
        "liked" => Json(json!({ "likes": 42, "downloads": 1000 })).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn mock_base() -> String {
    let app = Router::new()
        .route("/repos/{owner}/{repo}", get(repo))
        .route("/api/models/{org}/{name}", get(model));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str, token: Option<&str>) -> HttpReputation {
    HttpReputation::new(&ReputationSettings {
        timeout_ms: 300,
        github_api: base.to_string(),
        hf_api: base.to_string(),
        user_agent: "trend-radar-tests".into(),
        github_token: token.map(str::to_string),
    })
    .unwrap()
}

#[tokio::test]
async fn stars_on_200() {
    let rep = client(&mock_base().await, None);
    let r = rep
        .lookup(ReferenceKind::Code, "https://github.com/acme/popular")
        .await;
    assert_eq!(r, ReputationResult::ok(Metric::Stars, 237));

    let r = rep
        .lookup(ReferenceKind::Code, "https://github.com/acme/watchers-only")
        .await;
    assert_eq!(r, ReputationResult::ok(Metric::Stars, 12));
}

#[tokio::test]
async fn zero_stars_is_fresh() {
    let rep = client(&mock_base().await, None);
    let r = rep
        .lookup(ReferenceKind::Code, "https://github.com/acme/unstarred")
        .await;
    assert_eq!(r.value, 0);
    assert!(r.fresh);
}

#[tokio::test]
async fn rate_limit_not_found_and_bad_body_are_unfresh() {
    let rep = client(&mock_base().await, None);
    for repo in ["limited", "nope", "garbage", "private"] {
        let r = rep
            .lookup(ReferenceKind::Code, &format!("https://github.com/acme/{repo}"))
            .await;
        assert_eq!(r, ReputationResult::failed(Metric::Stars), "repo {repo}");
    }
}

#[tokio::test]
async fn timeout_is_unfresh_and_does_not_raise() {
    let rep = client(&mock_base().await, None);
    let started = std::time::Instant::now();
    let r = rep
        .lookup(ReferenceKind::Code, "https://github.com/acme/slow")
        .await;
    assert_eq!(r, ReputationResult::failed(Metric::Stars));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn token_is_sent_when_configured() {
    let rep = client(&mock_base().await, Some("s3cret"));
    let r = rep
        .lookup(ReferenceKind::Code, "https://github.com/acme/private")
        .await;
    assert_eq!(r, ReputationResult::ok(Metric::Stars, 5));
}

#[tokio::test]
async fn model_likes() {
    let rep = client(&mock_base().await, None);
    let r = rep
        .lookup(ReferenceKind::Model, "https://huggingface.co/org/liked")
        .await;
    assert_eq!(r, ReputationResult::ok(Metric::Likes, 42));

    let r = rep
        .lookup(ReferenceKind::Model, "https://huggingface.co/org/unknown")
        .await;
    assert_eq!(r, ReputationResult::failed(Metric::Likes));
}

#[tokio::test]
async fn unreachable_host_is_unfresh() {
    let rep = client("http://127.0.0.1:9", None);
    let r = rep
        .lookup(ReferenceKind::Model, "https://huggingface.co/org/liked")
        .await;
    assert_eq!(r, ReputationResult::failed(Metric::Likes));
}
