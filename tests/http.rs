mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{BASE_TIME, Fixture, commit, init_repo, linear_history};
use gitamite::git::Registry;
use gitamite::routes::{AppState, create_router};

fn app(fixture: &Fixture) -> Router {
    let registry = Registry::load(fixture.dir.path()).unwrap();
    create_router(AppState::new(Arc::new(registry), Arc::new(fixture.views())))
}

fn history_fixture(count: usize) -> Fixture {
    Fixture::new(|root| {
        let repo = init_repo(root, "demo");
        linear_history(&repo, count);
    })
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

#[tokio::test]
async fn lists_repositories() {
    let fixture = Fixture::new(|root| {
        let repo = init_repo(root, "demo");
        linear_history(&repo, 2);
        init_repo(root, "empty");
    });

    let (status, body) = get(app(&fixture), "/").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["demo", "empty"]);
    assert_eq!(body[1]["is_empty"], json!(true));
}

#[tokio::test]
async fn serves_tree_and_blob_views() {
    let fixture = Fixture::new(|root| {
        let repo = init_repo(root, "demo");
        commit(
            &repo,
            Some("refs/heads/main"),
            &[("src/lib.rs", b"pub fn x() {}\n"), ("notes.txt", b"hello\n")],
            "initial",
            &[],
            BASE_TIME,
        );
        repo.set_head("refs/heads/main").unwrap();
    });

    let (status, tree) = get(app(&fixture), "/repo/demo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tree["view"], "tree");
    assert_eq!(tree["entries"][0]["name"], "src");
    assert_eq!(tree["entries"][0]["kind"], "tree");

    let (status, sub) = get(app(&fixture), "/repo/demo/tree/src").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sub["path"], "src");
    assert_eq!(sub["entries"][0]["path"], "src/lib.rs");

    let (status, blob) = get(app(&fixture), "/repo/demo/blob/notes.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(blob["view"], "blob");
    assert_eq!(blob["content"], "hello\n");

    let commit_id = tree["commit_id"].as_str().unwrap().to_string();
    let uri = format!("/repo/demo/commit/{}/blob/src/lib.rs", &commit_id[..10]);
    let (status, pinned) = get(app(&fixture), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pinned["commit_id"], commit_id.as_str());
    assert_eq!(pinned["language"], "rs");
}

#[tokio::test]
async fn errors_are_json_with_kind() {
    let fixture = history_fixture(1);

    let (status, body) = get(app(&fixture), "/repo/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "repo_not_found");

    let (status, body) = get(app(&fixture), "/repo/demo/commit/no-such-ref/tree").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "revision_not_found");

    let (status, body) = get(app(&fixture), "/repo/demo/blob/missing.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (status, body) = get(app(&fixture), "/repo/demo/tree/log.txt").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "not_a_tree");

    let (status, body) = get(app(&fixture), "/repo/demo/tree/a/../log.txt").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_path");
}

#[tokio::test]
async fn paginates_commits_with_cursor() {
    let fixture = history_fixture(5);

    let (status, first) = get(app(&fixture), "/repo/demo/commits?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["view"], "log");
    assert_eq!(first["commits"].as_array().unwrap().len(), 2);
    assert_eq!(first["commits"][0]["message"], "commit 4");
    let cursor = first["next_cursor"].as_str().unwrap().to_string();

    let uri = format!("/repo/demo/main/commits?limit=2&after={cursor}");
    let (status, second) = get(app(&fixture), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["commits"][0]["message"], "commit 2");

    let (status, body) = get(app(&fixture), "/repo/demo/commits?after=not-a-cursor").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "revision_not_found");
}

#[tokio::test]
async fn serves_diff_and_blame() {
    let fixture = history_fixture(2);

    let (status, diff) = get(app(&fixture), "/repo/demo/commit/main").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(diff["view"], "diff");
    assert_eq!(diff["stats"]["insertions"], 1);
    assert_eq!(diff["stats"]["deletions"], 1);

    let (status, same) = get(app(&fixture), "/repo/demo/commit/main?against=main").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(same["files"].as_array().unwrap().len(), 0);

    let (status, blame) = get(app(&fixture), "/repo/demo/blame/blob/log.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(blame["view"], "blame");
    assert_eq!(blame["lines"][0]["content"], "entry 1");
}

#[tokio::test]
async fn creates_and_deletes_repositories() {
    let fixture = history_fixture(1);
    let app = app(&fixture);

    let (status, created) = send(app.clone(), Method::POST, "/repo", Some(json!({ "name": "fresh" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "fresh");
    assert_eq!(created["is_empty"], json!(true));
    assert!(fixture.dir.path().join("fresh").is_dir());

    let (status, body) = send(app.clone(), Method::POST, "/repo", Some(json!({ "name": "fresh" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "already_exists");

    let (status, body) = send(app.clone(), Method::POST, "/repo", Some(json!({ "name": "../up" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_name");

    let (status, _) = send(app.clone(), Method::DELETE, "/repo", Some(json!({ "name": "fresh" }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!fixture.dir.path().join("fresh").exists());

    let (status, body) = get(app, "/repo/fresh/refs").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "repo_not_found");
}

#[tokio::test]
async fn lists_refs() {
    let fixture = Fixture::new(|root| {
        let repo = init_repo(root, "demo");
        let ids = linear_history(&repo, 1);
        let tip = repo.find_commit(ids[0]).unwrap();
        repo.branch("feature", &tip, false).unwrap();
        repo.tag_lightweight("v1", tip.as_object(), false).unwrap();
    });

    let (status, refs) = get(app(&fixture), "/repo/demo/refs").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<(&str, &str)> = refs
        .as_array()
        .unwrap()
        .iter()
        .map(|r| (r["name"].as_str().unwrap(), r["kind"].as_str().unwrap()))
        .collect();
    assert_eq!(names, [("feature", "branch"), ("main", "branch"), ("v1", "tag")]);
    assert_eq!(refs[1]["is_head"], json!(true));
}

#[tokio::test]
async fn commits_accept_ref_query_for_colliding_names() {
    let fixture = Fixture::new(|root| {
        let repo = init_repo(root, "demo");
        let ids = linear_history(&repo, 3);
        let first = repo.find_commit(ids[0]).unwrap();
        repo.branch("tree", &first, false).unwrap();
    });

    let (status, page) = get(app(&fixture), "/repo/demo/commits?ref=tree").await;
    assert_eq!(status, StatusCode::OK);
    let messages: Vec<&str> = page["commits"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, ["commit 0"]);

    let (status, page) = get(app(&fixture), "/repo/demo/commits?ref=refs/heads/main&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["commits"][0]["message"], "commit 2");
}
