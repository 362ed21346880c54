//! Upload policy: accepted types, size ceiling, authorization lifetime

use std::time::Duration;

/// Largest accepted upload, both declared at presign time and actually stored
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Lifetime of a presigned upload URL
pub const PRESIGN_TTL: Duration = Duration::from_secs(300);

/// `Cache-Control` attached to published images; keys are never reused
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Content types a client may declare for a raw upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageContentType {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
    /// `image/webp`
    Webp,
}

impl ImageContentType {
    /// Every accepted content type
    pub const ALL: [Self; 3] = [Self::Jpeg, Self::Png, Self::Webp];

    /// Parses a declared content type, ignoring case and surrounding whitespace
    #[must_use]
    pub fn parse(declared: &str) -> Option<Self> {
        let normalized = declared.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|content_type| content_type.mime() == normalized)
    }

    /// Canonical MIME type
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Extension used for raw object keys
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// Reverse of [`Self::extension`]
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|content_type| content_type.extension() == extension)
    }
}
