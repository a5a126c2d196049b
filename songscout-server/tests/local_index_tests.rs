//! Elasticsearch client tests against an in-process index server

use std::sync::{Arc, Mutex};

use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use songscout_common::config::LocalIndexConfig;
use songscout_common::Platform;
use songscout_server::services::local_index::search_local;
use songscout_server::services::{ElasticsearchIndex, IndexError, IndexField, LocalIndex};

/// Requests seen by the fake index: search bodies and requested document ids
#[derive(Default)]
struct Seen {
    searches: Mutex<Vec<Value>>,
    doc_ids: Mutex<Vec<String>>,
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Fake `music_data` index
///
/// `_doc/missing` answers 404, `_doc/gone` answers 200 with `found: false`,
/// any other id is found and echoed back as the song name.
async fn spawn_index(seen: Arc<Seen>) -> String {
    let search_seen = seen.clone();
    let app = Router::new()
        .route("/", get(|| async { Json(json!({"tagline": "You Know, for Search"})) }))
        .route(
            "/music_data/_search",
            post(move |Json(body): Json<Value>| {
                let seen = search_seen.clone();
                async move {
                    seen.searches.lock().unwrap().push(body);
                    Json(json!({
                        "took": 3,
                        "hits": {
                            "total": {"value": 2},
                            "hits": [
                                {
                                    "_id": "1",
                                    "_score": 7.1,
                                    "_source": {
                                        "song": "晴天",
                                        "singer": "周杰伦",
                                        "album": "叶惠美",
                                        "author": "周杰伦",
                                        "composer": "周杰伦",
                                        "geci": "故事的小黄花"
                                    }
                                },
                                {
                                    "_id": "2",
                                    "_score": 5.4,
                                    "_source": {"song": "晴天 Live", "singer": "周杰伦", "album": null, "geci": null}
                                }
                            ]
                        }
                    }))
                }
            }),
        )
        .route(
            "/music_data/_doc/:id",
            get(move |Path(id): Path<String>| {
                let seen = seen.clone();
                async move {
                    seen.doc_ids.lock().unwrap().push(id.clone());
                    match id.as_str() {
                        "missing" => (
                            StatusCode::NOT_FOUND,
                            Json(json!({"_id": id, "found": false})),
                        ),
                        "gone" => (StatusCode::OK, Json(json!({"_id": id, "found": false}))),
                        _ => (
                            StatusCode::OK,
                            Json(json!({
                                "_id": id,
                                "found": true,
                                "_source": {"song": id, "singer": "周杰伦", "composer": null}
                            })),
                        ),
                    }
                }
            }),
        );

    serve(app).await
}

fn index(base_url: &str) -> ElasticsearchIndex {
    let config = LocalIndexConfig {
        index: "music_data".to_string(),
        timeout_secs: 2,
        ..Default::default()
    };
    ElasticsearchIndex::new(&config, base_url).unwrap()
}

#[tokio::test]
async fn test_search_field_sends_match_query() {
    let seen = Arc::new(Seen::default());
    let index = index(&spawn_index(seen.clone()).await);

    let hits = index.search_field(IndexField::Singer, "周杰伦").await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "1");
    assert_eq!(hits[0].document.album, "叶惠美");
    assert_eq!(hits[1].document.song, "晴天 Live");
    assert_eq!(hits[1].document.album, "");
    assert_eq!(hits[1].document.geci, "");

    let searches = seen.searches.lock().unwrap();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0]["query"]["match"]["singer"], "周杰伦");
}

#[tokio::test]
async fn test_search_local_over_http() {
    let seen = Arc::new(Seen::default());
    let index = index(&spawn_index(seen.clone()).await);

    let songs = search_local(&index, "晴天", 10).await;

    // Every field query returns the same two ids, so later fields add nothing
    let ids: Vec<_> = songs.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert!(songs.iter().all(|s| s.platform == Platform::Local));
    assert_eq!(songs[0].lyric_text.as_deref(), Some("故事的小黄花"));
    assert_eq!(seen.searches.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_get_found_document() {
    let index = index(&spawn_index(Arc::new(Seen::default())).await);

    let doc = index.get("42").await.unwrap();

    assert_eq!(doc.song, "42");
    assert_eq!(doc.singer, "周杰伦");
    assert_eq!(doc.composer, "");
}

#[tokio::test]
async fn test_get_missing_document_is_not_found() {
    let index = index(&spawn_index(Arc::new(Seen::default())).await);

    assert!(matches!(index.get("missing").await, Err(IndexError::NotFound(id)) if id == "missing"));
    assert!(matches!(index.get("gone").await, Err(IndexError::NotFound(id)) if id == "gone"));
}

#[tokio::test]
async fn test_get_encodes_reserved_characters() {
    let seen = Arc::new(Seen::default());
    let index = index(&spawn_index(seen.clone()).await);

    let doc = index.get("abc#def").await.unwrap();
    assert_eq!(doc.song, "abc#def");

    let doc = index.get("abc?x=1").await.unwrap();
    assert_eq!(doc.song, "abc?x=1");

    let doc = index.get("a/b").await.unwrap();
    assert_eq!(doc.song, "a/b");

    assert_eq!(*seen.doc_ids.lock().unwrap(), vec!["abc#def", "abc?x=1", "a/b"]);
}

#[tokio::test]
async fn test_ping_healthy_index() {
    let index = index(&spawn_index(Arc::new(Seen::default())).await);
    assert!(index.ping().await.is_ok());
}

#[tokio::test]
async fn test_ping_error_status() {
    let app = Router::new().route("/", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
    let index = index(&serve(app).await);

    assert!(matches!(index.ping().await, Err(IndexError::Status(503))));
}

#[tokio::test]
async fn test_ping_unreachable_index() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let index = index(&format!("http://{}", addr));

    assert!(matches!(index.ping().await, Err(IndexError::Network(_))));
}

#[tokio::test]
async fn test_search_error_status() {
    let app = Router::new().route(
        "/music_data/_search",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "shard failure") }),
    );
    let index = index(&serve(app).await);

    let result = index.search_field(IndexField::Song, "晴天").await;

    assert!(matches!(result, Err(IndexError::Status(500))));
}
