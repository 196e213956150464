use mockito::Server;
use serde_json::json;

use social_downloader_lib::downloader::{ApiClient, ApiConfig, Downloader, MediaData, Platform};

fn downloader_for(server: &mockito::ServerGuard) -> Downloader {
    let config = ApiConfig::default().with_base_url(Some(server.url()));
    Downloader::new(ApiClient::new(config).unwrap())
}

#[tokio::test]
async fn test_rate_limit_surfaces_retry_hint() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/tiktok/download")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(json!({ "error": "slow down", "retryAfter": "30s" }).to_string())
        .create_async()
        .await;

    let result = downloader_for(&server)
        .download("https://www.tiktok.com/@user/video/1")
        .await;

    mock.assert_async().await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("slow down"));
    assert_eq!(result.retry_after.as_deref(), Some("30s"));
}

#[tokio::test]
async fn test_facebook_service_down() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/v1/facebook/download")
        .with_status(503)
        .with_body("<html>down</html>")
        .create_async()
        .await;

    let result = downloader_for(&server)
        .download("https://www.facebook.com/watch?v=1")
        .await;

    assert!(!result.success);
    assert!(result
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("temporarily unavailable"));
}

#[tokio::test]
async fn test_youtube_two_step_hits_each_endpoint_once() {
    let mut server = Server::new_async().await;
    let info = server
        .mock("POST", "/api/v1/youtube/info")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({ "success": true, "data": { "id": "abc", "title": "Clip", "duration": 12.0 } })
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let download = server
        .mock("POST", "/api/v1/youtube/download")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "success": true,
                "method": "ytdl-core",
                "data": { "id": "abc", "title": "Clip", "downloadUrl": "https://cdn.example/abc.mp4" }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let downloader = downloader_for(&server);
    let url = "https://youtu.be/abc";

    let first = downloader.download_two_step(url).await;
    assert!(first.info.success);
    assert!(first.needs_resolution());
    assert_eq!(first.info.platform(), Some(Platform::YouTube));

    let resolved = downloader.complete_two_step(url, first).await;
    let link = resolved.download.as_deref().and_then(|r| r.download_url());
    assert_eq!(link, Some("https://cdn.example/abc.mp4"));

    info.assert_async().await;
    download.assert_async().await;
}

#[tokio::test]
async fn test_instagram_node_is_flattened() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/instagram/media")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "success": true,
                "data": {
                    "shortcode": "XYZ",
                    "is_video": true,
                    "video_url": "https://cdn.example/xyz.mp4",
                    "owner": { "username": "someone" }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let result = downloader_for(&server)
        .download("https://www.instagram.com/p/XYZ/")
        .await;

    assert!(result.success);
    match result.data {
        Some(MediaData::Instagram(media)) => {
            assert_eq!(media.id, "XYZ");
            assert_eq!(media.download_url.as_deref(), Some("https://cdn.example/xyz.mp4"));
            assert_eq!(media.post_url.as_deref(), Some("https://instagram.com/p/XYZ"));
        }
        other => panic!("expected instagram data, got {:?}", other),
    }
}
