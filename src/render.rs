// Plain-text rendering of results for the terminal front end

use std::fmt::Write;

use crate::downloader::models::{
    FacebookMedia, InstagramMedia, MediaData, TikTokMedia, YouTubeMedia,
};
use crate::downloader::utils::{
    format_count, format_duration, format_media_length, format_timestamp, parse_retry_after,
};
use crate::downloader::{BackendHealth, DownloadResult, TwoStepResult};

pub fn render_health(health: BackendHealth) -> &'static str {
    match health {
        BackendHealth::Online => "● Backend Online",
        BackendHealth::Offline => "● Backend Offline",
        BackendHealth::Checking => "● Checking...",
    }
}

pub fn render_result(result: &DownloadResult) -> String {
    let mut out = String::new();

    if !result.success {
        let _ = writeln!(out, "✗ Download Failed");
        let _ = writeln!(
            out,
            "  {}",
            result.error.as_deref().unwrap_or("Something went wrong. Please try again.")
        );
        if let Some(hint) = result.retry_after.as_deref() {
            match parse_retry_after(hint) {
                Some(wait) => {
                    let _ = writeln!(out, "  Try again in {}", format_duration(wait));
                }
                None => {
                    let _ = writeln!(out, "  Retry after: {}", hint);
                }
            }
        }
        return out;
    }

    let _ = writeln!(out, "✓ Download Ready!");
    if let Some(message) = result.message.as_deref() {
        let _ = writeln!(out, "  {}", message);
    }

    match &result.data {
        Some(MediaData::Tiktok(media)) => render_tiktok(&mut out, media),
        Some(MediaData::Youtube(media)) => render_youtube(&mut out, media),
        Some(MediaData::Facebook(media)) => render_facebook(&mut out, media),
        Some(MediaData::Instagram(media)) => render_instagram(&mut out, media),
        None => {}
    }

    if let Some(method) = result.method.as_deref() {
        let _ = writeln!(out, "  Method:    {}", method);
    }
    match result.download_url() {
        Some(url) => {
            let _ = writeln!(out, "  Download:  {}", url);
        }
        None => {
            let _ = writeln!(out, "  Download:  (link not resolved yet)");
        }
    }

    out
}

pub fn render_two_step(result: &TwoStepResult) -> String {
    let mut out = render_result(&result.info);
    if result.needs_resolution() {
        let _ = writeln!(out, "… Info found, now resolving download link");
    }
    out
}

fn field(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {:<10} {}", format!("{}:", label), value);
}

fn render_tiktok(out: &mut String, media: &TikTokMedia) {
    field(out, "Title", or_untitled(&media.title));
    if let Some(author) = &media.author {
        let name = author
            .nickname
            .as_deref()
            .or(author.unique_id.as_deref())
            .or(author.username.as_deref())
            .unwrap_or("Unknown");
        field(out, "Author", name);
    }
    if let Some(stats) = &media.statistics {
        if let Some(plays) = stats.play_count {
            field(out, "Views", format_count(plays));
        }
        if let Some(likes) = stats.like_count {
            field(out, "Likes", format_count(likes));
        }
    }
    if let Some(music) = &media.music {
        field(out, "Music", &music.title);
    }
    if let Some(created) = media.create_time.and_then(format_timestamp) {
        field(out, "Posted", created);
    }
    if !media.hashtags.is_empty() {
        field(out, "Tags", format!("#{}", media.hashtags.join(" #")));
    }
}

fn render_youtube(out: &mut String, media: &YouTubeMedia) {
    field(out, "Title", or_untitled(&media.title));
    if let Some(author) = &media.author {
        let name = author
            .name
            .as_deref()
            .or(author.channel.as_deref())
            .unwrap_or("Unknown");
        field(out, "Channel", name);
    }
    if let Some(duration) = media.duration {
        field(out, "Duration", format_media_length(duration));
    }
    if let Some(stats) = &media.statistics {
        if let Some(views) = stats.views {
            field(out, "Views", format_count(views));
        }
        if let Some(likes) = stats.likes {
            field(out, "Likes", format_count(likes));
        }
    }
    if let Some(format) = &media.format {
        field(out, "Format", format!("{} {}", format.quality, format.container));
    }
    if let Some(uploaded) = media.upload_date.as_deref() {
        field(out, "Uploaded", uploaded);
    }
}

fn render_facebook(out: &mut String, media: &FacebookMedia) {
    field(out, "Title", or_untitled(&media.title));
    let mut qualities = Vec::new();
    if media.qualities.hd {
        qualities.push("HD");
    }
    if media.qualities.sd {
        qualities.push("SD");
    }
    if !qualities.is_empty() {
        field(out, "Quality", qualities.join(", "));
    }
}

fn render_instagram(out: &mut String, media: &InstagramMedia) {
    field(out, "Title", or_untitled(&media.title));
    field(out, "Type", &media.media_type);
    if let Some(owner) = &media.node.owner {
        if let Some(username) = owner.username.as_deref() {
            let verified = if owner.is_verified == Some(true) { " ✔" } else { "" };
            field(out, "Author", format!("@{}{}", username, verified));
        }
    }
    if let Some(views) = media.node.video_view_count {
        field(out, "Views", format_count(views));
    }
    if let Some(likes) = media.node.like_count {
        field(out, "Likes", format_count(likes));
    }
    if let Some(items) = &media.node.sidecar {
        field(out, "Carousel", format!("{} items", items.len()));
    }
    if let Some(posted) = media.create_time.and_then(format_timestamp) {
        field(out, "Posted", posted);
    }
    if let Some(post_url) = media.post_url.as_deref() {
        field(out, "Post", post_url);
    }
}

fn or_untitled(title: &str) -> &str {
    if title.is_empty() {
        "Untitled"
    } else {
        title
    }
}
