// Platform detection from a pasted URL

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported source services
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    TikTok,
    Instagram,
    Facebook,
    YouTube,
}

/// Hostname markers checked in order
const MARKERS: &[(&str, Platform)] = &[
    ("youtube.com", Platform::YouTube),
    ("youtu.be", Platform::YouTube),
    ("tiktok.com", Platform::TikTok),
    ("instagram.com", Platform::Instagram),
    ("facebook.com", Platform::Facebook),
    ("fb.watch", Platform::Facebook),
];

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::TikTok,
        Platform::Instagram,
        Platform::Facebook,
        Platform::YouTube,
    ];

    /// Detect the platform, routing anything unrecognised to TikTok.
    ///
    /// The fallback is deliberate: an unknown URL reaches the TikTok backend
    /// and fails there with whatever error that backend returns. Use
    /// [`Platform::from_url`] to tell the two cases apart.
    pub fn detect(url: &str) -> Platform {
        Self::from_url(url).unwrap_or(Platform::TikTok)
    }

    /// Strict detection: `None` when no marker matches.
    pub fn from_url(url: &str) -> Option<Platform> {
        let lower = url.to_lowercase();
        MARKERS
            .iter()
            .find(|(marker, _)| lower.contains(marker))
            .map(|(_, platform)| *platform)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TikTok => "tiktok",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::YouTube => "youtube",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TikTok => "TikTok",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::YouTube => "YouTube",
        }
    }

    /// Example URL shown in an empty input
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::TikTok => "https://www.tiktok.com/@username/video...",
            Self::Instagram => "https://www.instagram.com/p/...",
            Self::Facebook => "https://www.facebook.com/...",
            Self::YouTube => "https://www.youtube.com/watch?v=...",
        }
    }

    /// Whether metadata and the final link come from separate requests
    pub fn has_two_phase_backend(&self) -> bool {
        matches!(self, Self::YouTube)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiktok" => Ok(Self::TikTok),
            "instagram" | "ig" => Ok(Self::Instagram),
            "facebook" | "fb" => Ok(Self::Facebook),
            "youtube" | "yt" => Ok(Self::YouTube),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_each_platform() {
        assert_eq!(Platform::detect("https://www.tiktok.com/@a/video/1"), Platform::TikTok);
        assert_eq!(Platform::detect("https://vm.tiktok.com/ZM123/"), Platform::TikTok);
        assert_eq!(Platform::detect("https://www.instagram.com/reel/C1/"), Platform::Instagram);
        assert_eq!(Platform::detect("https://www.facebook.com/watch?v=1"), Platform::Facebook);
        assert_eq!(Platform::detect("https://fb.watch/abc/"), Platform::Facebook);
        assert_eq!(Platform::detect("https://www.youtube.com/watch?v=x"), Platform::YouTube);
        assert_eq!(Platform::detect("https://youtu.be/x"), Platform::YouTube);
    }

    #[test]
    fn test_detection_is_case_insensitive() {
        assert_eq!(Platform::detect("HTTPS://WWW.YOUTUBE.COM/watch?v=x"), Platform::YouTube);
        assert_eq!(Platform::detect("https://Instagram.com/p/X"), Platform::Instagram);
    }

    #[test]
    fn test_unknown_url_falls_back_to_tiktok() {
        assert_eq!(Platform::detect("https://example.com/x"), Platform::TikTok);
        assert_eq!(Platform::detect(""), Platform::TikTok);
        assert_eq!(Platform::from_url("https://example.com/x"), None);
    }

    #[test]
    fn test_only_youtube_is_two_phase() {
        for platform in Platform::ALL {
            assert_eq!(
                platform.has_two_phase_backend(),
                platform == Platform::YouTube
            );
        }
    }

    #[test]
    fn test_parse_platform_names() {
        assert_eq!("Instagram".parse::<Platform>(), Ok(Platform::Instagram));
        assert_eq!("fb".parse::<Platform>(), Ok(Platform::Facebook));
        assert!("vimeo".parse::<Platform>().is_err());
    }
}
