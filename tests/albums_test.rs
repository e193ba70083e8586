mod common;

use std::collections::HashSet;

use rand::{SeedableRng, rngs::StdRng};
use serde_json::json;
use spotshuffle::{
    error::{AlbumError, ApiError},
    spotify::albums::{
        get_album_details, get_user_saved_albums, select_random_albums, select_random_albums_with,
    },
    spotify::client::SpotifyClient,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{StaticSessions, album_json, page_json, session};

fn api(server: &MockServer) -> SpotifyClient {
    common::client(
        server,
        StaticSessions::new(Some(session("token", 3600)), None),
    )
}

/// Serves a library of `total` albums, `album-1` at offset 0 and so on.
async fn mount_library(server: &MockServer, total: u64) {
    for offset in 0..total {
        let id = format!("album-{}", offset + 1);
        Mock::given(method("GET"))
            .and(path("/v1/me/albums"))
            .and(query_param("limit", "1"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
                Some(album_json(&id, &format!("Album {}", offset + 1))),
                total,
                offset,
            )))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_get_user_saved_albums_sends_paging_and_market() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/albums"))
        .and(query_param("limit", "20"))
        .and(query_param("offset", "40"))
        .and(query_param("market", "from_token"))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            Some(album_json("album-41", "Forty One")),
            57,
            40,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let page = get_user_saved_albums(&api(&server), 20, 40).await.unwrap();

    assert_eq!(page.total, 57);
    assert_eq!(page.offset, 40);
    assert_eq!(page.items.len(), 1);
    let album = &page.items[0].album;
    assert_eq!(album.id, "album-41");
    assert_eq!(album.artist_names(), "Artist of Forty One");
    assert_eq!(
        album.external_url(),
        Some("https://open.spotify.com/album/album-41")
    );
}

#[tokio::test]
async fn test_get_user_saved_albums_clamps_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/albums"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(None, 0, 0)))
        .expect(1)
        .mount(&server)
        .await;

    let page = get_user_saved_albums(&api(&server), 500, 0).await.unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_get_user_saved_albums_wraps_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/albums"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "status": 403, "message": "Insufficient client scope" }
        })))
        .mount(&server)
        .await;

    let err = get_user_saved_albums(&api(&server), 1, 0)
        .await
        .unwrap_err();

    assert!(matches!(err, AlbumError::SavedAlbums(_)));
    assert_eq!(
        err.to_string(),
        "failed to fetch saved albums: 403 - Insufficient client scope"
    );
}

#[tokio::test]
async fn test_get_album_details_includes_tracks() {
    let server = MockServer::start().await;
    let mut body = album_json("abc", "Details");
    body["label"] = json!("Some Label");
    body["tracks"] = json!({
        "total": 2,
        "items": [
            { "id": "t1", "name": "Intro", "uri": "spotify:track:t1", "duration_ms": 61000, "track_number": 1, "artists": [{ "name": "A" }] },
            { "id": "t2", "name": "Outro", "uri": "spotify:track:t2", "duration_ms": 185000, "track_number": 2, "artists": [{ "name": "A" }] }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/v1/albums/abc"))
        .and(query_param("market", "from_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let details = get_album_details(&api(&server), "abc").await.unwrap();

    assert_eq!(details.album.id, "abc");
    assert_eq!(details.label.as_deref(), Some("Some Label"));
    assert_eq!(details.tracks.total, 2);
    assert_eq!(details.tracks.items[1].name, "Outro");
}

#[tokio::test]
async fn test_get_album_details_reports_missing_album() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/albums/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "status": 404, "message": "Non existing id" }
        })))
        .mount(&server)
        .await;

    let err = get_album_details(&api(&server), "nope").await.unwrap_err();

    match &err {
        AlbumError::Details { id, source } => {
            assert_eq!(id, "nope");
            assert_eq!(source.status(), Some(404));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "failed to fetch album details for nope: 404 - Non existing id"
    );
}

#[tokio::test]
async fn test_random_albums_are_distinct_when_count_fits() {
    let server = MockServer::start().await;
    mount_library(&server, 10).await;
    let client = api(&server);

    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let picked = select_random_albums_with(&client, 4, &mut rng)
            .await
            .unwrap();

        let ids: HashSet<&str> = picked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(picked.len(), 4);
        assert_eq!(ids.len(), 4);
    }
}

#[tokio::test]
async fn test_random_albums_return_whole_library_when_count_exceeds_total() {
    let server = MockServer::start().await;
    mount_library(&server, 2).await;
    let client = api(&server);

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let picked = select_random_albums_with(&client, 5, &mut rng)
            .await
            .unwrap();

        let mut ids: Vec<&str> = picked.iter().map(|a| a.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["album-1", "album-2"], "seed {seed}");
    }
}

#[tokio::test]
async fn test_random_albums_fetch_each_album_once() {
    let server = MockServer::start().await;
    mount_library(&server, 3).await;

    let picked = select_random_albums(&api(&server), 3).await.unwrap();

    assert_eq!(picked.len(), 3);
    // one request for the total, then one per album
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_random_albums_empty_library_makes_one_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/albums"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(None, 0, 0)))
        .expect(1)
        .mount(&server)
        .await;

    let picked = select_random_albums(&api(&server), 3).await.unwrap();
    assert!(picked.is_empty());
}

#[tokio::test]
async fn test_random_albums_zero_count_makes_no_calls() {
    let server = MockServer::start().await;

    let picked = select_random_albums(&api(&server), 0).await.unwrap();

    assert!(picked.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_random_albums_abort_on_first_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/albums"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            Some(album_json("album-1", "One")),
            3,
            0,
        )))
        .mount(&server)
        .await;
    for offset in ["1", "2"] {
        Mock::given(method("GET"))
            .and(path("/v1/me/albums"))
            .and(query_param("offset", offset))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": { "status": 500, "message": "Server error" }
            })))
            .mount(&server)
            .await;
    }

    // with three albums and a request for three, offsets 1 and 2 are always drawn
    let err = select_random_albums(&api(&server), 3).await.unwrap_err();

    assert!(matches!(err, AlbumError::Random(_)));
    assert!(matches!(
        err.api_error(),
        ApiError::Status { status: 500, .. }
    ));
    assert!(err.to_string().starts_with("failed to get random albums:"));
}

#[tokio::test]
async fn test_random_albums_stop_when_library_shrinks() {
    let server = MockServer::start().await;
    // offset 0 reports two albums, but offset 1 has disappeared meanwhile
    Mock::given(method("GET"))
        .and(path("/v1/me/albums"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            Some(album_json("album-1", "One")),
            2,
            0,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/albums"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(None, 1, 1)))
        .mount(&server)
        .await;

    let picked = select_random_albums(&api(&server), 2).await.unwrap();

    let ids: Vec<&str> = picked.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["album-1"]);
}
