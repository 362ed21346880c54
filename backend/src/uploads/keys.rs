//! Object key layout
//!
//! Raw uploads live under `raw/`, published images under
//! `public/showoff/{post_id}/`. Tokens are UUIDv4 rendered as 32 lowercase hex
//! characters.

use uuid::Uuid;

use super::policy::ImageContentType;
use crate::sanitizer::OUTPUT_EXTENSION;

/// Private prefix for client uploads awaiting commit
pub const RAW_PREFIX: &str = "raw";

/// Prefix served publicly
pub const PUBLIC_PREFIX: &str = "public";

const COLLECTION: &str = "showoff";
const TOKEN_LEN: usize = 32;

/// Fresh random token used for raw keys and image ids
#[must_use]
pub fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Fresh raw key for an upload of `content_type`
#[must_use]
pub fn new_raw_key(content_type: ImageContentType) -> String {
    format!("{RAW_PREFIX}/{}.{}", new_token(), content_type.extension())
}

/// Whether `key` has the shape of a raw key issued by [`new_raw_key`]
#[must_use]
pub fn is_raw_key(key: &str) -> bool {
    let Some(file_name) = key
        .strip_prefix(RAW_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return false;
    };
    let Some((token, extension)) = file_name.split_once('.') else {
        return false;
    };

    token.len() == TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        && ImageContentType::from_extension(extension).is_some()
}

/// Keys of one published original/thumbnail pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedKeys {
    /// Full-size image key
    pub original: String,
    /// Thumbnail key
    pub thumbnail: String,
}

impl PublishedKeys {
    /// Keys for `image_id` under `post_id`
    #[must_use]
    pub fn new(post_id: &str, image_id: &str) -> Self {
        let stem = format!("{PUBLIC_PREFIX}/{COLLECTION}/{post_id}/{image_id}");
        Self {
            original: format!("{stem}.{OUTPUT_EXTENSION}"),
            thumbnail: format!("{stem}_thumb.{OUTPUT_EXTENSION}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_raw_key_layout() {
        let key = new_raw_key(ImageContentType::Jpeg);
        assert!(key.starts_with("raw/"));
        assert!(key.ends_with(".jpg"));
        assert_eq!(key.len(), "raw/".len() + 32 + ".jpg".len());
        assert!(is_raw_key(&key));

        assert!(new_raw_key(ImageContentType::Png).ends_with(".png"));
        assert!(new_raw_key(ImageContentType::Webp).ends_with(".webp"));
    }

    #[test]
    fn test_raw_keys_are_unique() {
        let keys: HashSet<String> = (0..1000)
            .map(|_| new_raw_key(ImageContentType::Png))
            .collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_is_raw_key_rejects_foreign_keys() {
        let token = "0123456789abcdef0123456789abcdef";
        assert!(is_raw_key(&format!("raw/{token}.webp")));

        for key in [
            String::new(),
            format!("{token}.jpg"),
            format!("raw/{token}"),
            format!("raw/{token}.gif"),
            format!("raw/{}.jpg", token.to_uppercase()),
            format!("raw/{}.jpg", &token[1..]),
            format!("raw/../{token}.jpg"),
            format!("rawx/{token}.jpg"),
            format!("public/showoff/post42/{token}.webp"),
            format!("raw/{token}.jpg.jpg"),
        ] {
            assert!(!is_raw_key(&key), "{key}");
        }
    }

    #[test]
    fn test_published_keys() {
        let keys = PublishedKeys::new("post42", "abc");
        assert_eq!(keys.original, "public/showoff/post42/abc.webp");
        assert_eq!(keys.thumbnail, "public/showoff/post42/abc_thumb.webp");
    }
}
