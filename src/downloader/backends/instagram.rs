use async_trait::async_trait;
use serde::Deserialize;

use crate::downloader::errors::DownloadError;
use crate::downloader::http::{ApiClient, Envelope};
use crate::downloader::models::{DownloadResult, InstagramMedia, InstagramNode, MediaData};
use crate::downloader::platform::Platform;
use crate::downloader::traits::DownloaderBackend;

use super::present;

const NO_MEDIA: &str = "No media data found. Post may be private or deleted.";
const NO_VIDEO_URL: &str = "Failed to get Instagram video URL";

/// Body of the simple `/video` endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimpleVideo {
    success: Option<bool>,
    error: Option<String>,
    is_video: Option<bool>,
    video_url: Option<String>,
    image_url: Option<String>,
}

/// Flatten a GraphQL node into the shared shape, adding legacy aliases.
pub fn flatten_node(node: InstagramNode, source_url: &str) -> InstagramMedia {
    let is_video = node.is_video.unwrap_or(false);
    let username = present(node.owner.as_ref().and_then(|o| o.username.clone()));
    let shortcode = present(node.shortcode.clone());

    let id = shortcode
        .clone()
        .or_else(|| present(node.node_id.clone()))
        .unwrap_or_else(|| "instagram-media".to_string());

    let title = present(node.caption.clone()).unwrap_or_else(|| {
        format!(
            "Instagram {} by @{}",
            if is_video { "Video" } else { "Image" },
            username.as_deref().unwrap_or("unknown")
        )
    });

    let download_url = if is_video {
        present(node.video_url.clone())
    } else {
        present(node.display_url.clone())
    };

    let safe_title = match (&username, &shortcode) {
        (Some(user), Some(code)) => Some(format!("{}_{}", user, code)),
        (None, code) => code.clone(),
        (Some(_), None) => None,
    };

    InstagramMedia {
        id,
        title,
        media_type: if is_video { "video" } else { "image" }.to_string(),
        download_url,
        video_url: node.video_url.clone(),
        image_url: node.display_url.clone(),
        post_url: shortcode
            .as_ref()
            .map(|code| format!("https://instagram.com/p/{}", code)),
        post_id: shortcode,
        safe_title,
        url: Some(source_url.to_string()),
        create_time: node.taken_at_timestamp,
        node,
    }
}

/// GraphQL-backed Instagram lookup (2-5 seconds on the backend)
pub struct InstagramBackend {
    client: ApiClient,
}

impl InstagramBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Simple lookup returning only the media links
    pub async fn video_url(&self, url: &str) -> Result<DownloadResult, DownloadError> {
        log::info!("[Instagram] Getting video URL (simple method): {}", url);

        let route = &self.client.config().routes.instagram_video;
        let response = self.client.get(route, &[("url", url)]).await?;
        if let Some(err) = response.status_error() {
            return Err(err);
        }

        let body: SimpleVideo = response.decode()?;
        if body.success == Some(false) {
            return Err(DownloadError::Rejected(
                present(body.error).unwrap_or_else(|| NO_VIDEO_URL.to_string()),
            ));
        }

        let is_video = body.is_video.unwrap_or(false);
        let media = InstagramMedia {
            id: "instagram-video".to_string(),
            title: "Instagram Video".to_string(),
            media_type: if is_video { "video" } else { "image" }.to_string(),
            download_url: body.video_url.clone(),
            video_url: body.video_url,
            image_url: body.image_url,
            node: InstagramNode {
                is_video: body.is_video,
                ..Default::default()
            },
            ..Default::default()
        };

        Ok(DownloadResult::succeeded(MediaData::Instagram(media))
            .with_message(Some("Instagram video URL retrieved successfully".to_string()))
            .with_method(Some("graphql-simple".to_string())))
    }
}

#[async_trait]
impl DownloaderBackend for InstagramBackend {
    fn name(&self) -> &'static str {
        "instagram"
    }

    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn download(&self, url: &str) -> Result<DownloadResult, DownloadError> {
        log::info!("[Instagram] Fetching media via GraphQL API for: {}", url);

        let route = &self.client.config().routes.instagram_media;
        let response = self.client.get(route, &[("url", url)]).await?;
        if let Some(err) = response.status_error() {
            return Err(err);
        }

        let envelope: Envelope<InstagramNode> = response.decode()?;
        let error = envelope.error.clone();
        match envelope.data {
            Some(node) if envelope.success => {
                Ok(DownloadResult::succeeded(MediaData::Instagram(flatten_node(node, url)))
                    .with_message(Some("Instagram media retrieved successfully".to_string()))
                    .with_method(Some("graphql-api".to_string())))
            }
            _ => Err(DownloadError::Rejected(
                present(error).unwrap_or_else(|| NO_MEDIA.to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::backends::test_support::client_for;
    use crate::downloader::models::InstagramOwner;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const URL: &str = "https://www.instagram.com/reel/C0xyz/";

    fn video_node() -> InstagramNode {
        InstagramNode {
            node_id: Some("3199".to_string()),
            typename: Some("GraphVideo".to_string()),
            shortcode: Some("C0xyz".to_string()),
            display_url: Some("https://cdn.example/thumb.jpg".to_string()),
            video_url: Some("https://cdn.example/video.mp4".to_string()),
            is_video: Some(true),
            owner: Some(InstagramOwner {
                username: Some("natgeo".to_string()),
                ..Default::default()
            }),
            taken_at_timestamp: Some(1_700_000_000),
            ..Default::default()
        }
    }

    #[test]
    fn test_flatten_treats_empty_strings_as_missing() {
        let mut node = video_node();
        node.shortcode = Some(String::new());
        node.owner = Some(InstagramOwner {
            username: Some(String::new()),
            ..Default::default()
        });

        let media = flatten_node(node, URL);

        assert_eq!(media.id, "3199");
        assert_eq!(media.title, "Instagram Video by @unknown");
        assert_eq!(media.safe_title, None);
        assert_eq!(media.post_id, None);
        assert_eq!(media.post_url, None);

        let mut node = video_node();
        node.owner = Some(InstagramOwner {
            username: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(flatten_node(node, URL).safe_title.as_deref(), Some("C0xyz"));
    }

    #[test]
    fn test_flatten_video_node() {
        let media = flatten_node(video_node(), URL);

        assert_eq!(media.id, "C0xyz");
        assert_eq!(media.title, "Instagram Video by @natgeo");
        assert_eq!(media.media_type, "video");
        assert_eq!(media.download_url.as_deref(), Some("https://cdn.example/video.mp4"));
        assert_eq!(media.image_url.as_deref(), Some("https://cdn.example/thumb.jpg"));
        assert_eq!(media.post_id.as_deref(), Some("C0xyz"));
        assert_eq!(media.safe_title.as_deref(), Some("natgeo_C0xyz"));
        assert_eq!(media.post_url.as_deref(), Some("https://instagram.com/p/C0xyz"));
        assert_eq!(media.url.as_deref(), Some(URL));
        assert_eq!(media.create_time, Some(1_700_000_000));
        assert_eq!(media.node.typename.as_deref(), Some("GraphVideo"));
    }

    #[test]
    fn test_flatten_image_node_uses_display_url_and_caption() {
        let node = InstagramNode {
            is_video: Some(false),
            video_url: None,
            caption: Some("sunset".to_string()),
            owner: None,
            ..video_node()
        };
        let media = flatten_node(node, URL);

        assert_eq!(media.title, "sunset");
        assert_eq!(media.media_type, "image");
        assert_eq!(media.download_url.as_deref(), Some("https://cdn.example/thumb.jpg"));
        assert_eq!(media.safe_title.as_deref(), Some("C0xyz"));
    }

    #[test]
    fn test_flatten_without_shortcode_uses_node_id() {
        let node = InstagramNode {
            shortcode: None,
            ..video_node()
        };
        let media = flatten_node(node, URL);
        assert_eq!(media.id, "3199");
        assert_eq!(media.post_url, None);
    }

    #[tokio::test]
    async fn test_media_endpoint_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/instagram/media")
            .match_query(Matcher::UrlEncoded("url".into(), URL.into()))
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "data": {
                        "__typename": "GraphVideo",
                        "shortcode": "C0xyz",
                        "is_video": true,
                        "video_url": "https://cdn.example/video.mp4",
                        "display_url": "https://cdn.example/thumb.jpg",
                        "dimensions": {"height": 1920, "width": 1080},
                        "owner": {"username": "natgeo", "is_verified": true},
                        "sidecar": [{"is_video": false, "display_url": "https://cdn.example/1.jpg"}]
                    }
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let backend = InstagramBackend::new(client_for(&server));
        let result = backend.download(URL).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.method.as_deref(), Some("graphql-api"));
        match result.data {
            Some(MediaData::Instagram(media)) => {
                assert!(media.is_video());
                assert_eq!(media.node.dimensions.unwrap().height, 1920);
                assert_eq!(media.node.sidecar.unwrap().len(), 1);
            }
            other => panic!("expected instagram data, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_data_is_soft_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/instagram/media")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let backend = InstagramBackend::new(client_for(&server));
        let err = backend.download(URL).await.unwrap_err();
        assert_eq!(err, DownloadError::Rejected(NO_MEDIA.to_string()));
    }

    #[tokio::test]
    async fn test_http_error_uses_backend_error_field() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/instagram/media")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":"Post not found"}"#)
            .create_async()
            .await;

        let backend = InstagramBackend::new(client_for(&server));
        let err = backend.download(URL).await.unwrap_err();
        assert_eq!(err.to_string(), "Post not found");
    }

    #[tokio::test]
    async fn test_simple_video_endpoint() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/instagram/video")
            .match_query(Matcher::UrlEncoded("url".into(), URL.into()))
            .with_status(200)
            .with_body(r#"{"isVideo":true,"videoUrl":"https://cdn.example/v.mp4","imageUrl":"https://cdn.example/i.jpg"}"#)
            .create_async()
            .await;

        let backend = InstagramBackend::new(client_for(&server));
        let result = backend.video_url(URL).await.unwrap();

        assert_eq!(result.method.as_deref(), Some("graphql-simple"));
        assert_eq!(result.download_url(), Some("https://cdn.example/v.mp4"));
        match result.data {
            Some(MediaData::Instagram(media)) => {
                assert_eq!(media.id, "instagram-video");
                assert_eq!(media.media_type, "video");
                assert_eq!(media.image_url.as_deref(), Some("https://cdn.example/i.jpg"));
            }
            other => panic!("expected instagram data, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_simple_video_declared_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/instagram/video")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success":false}"#)
            .create_async()
            .await;

        let backend = InstagramBackend::new(client_for(&server));
        let err = backend.video_url(URL).await.unwrap_err();
        assert_eq!(err, DownloadError::Rejected(NO_VIDEO_URL.to_string()));
    }
}
