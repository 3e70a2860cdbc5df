use url::Url;

/// What a remote media reference points at, determined syntactically.
/// No network access — classification must be cheap enough to run before
/// deciding whether to open a streaming session at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A single playable video with its canonical identifier.
    Video { id: String },
    /// A playlist page (not a single playable resource).
    Playlist,
    /// Anything else: malformed URL, unsupported host, channel page, ...
    Unsupported,
}

impl SourceKind {
    /// Whether this reference may be handed to the fetcher.
    pub fn is_video(&self) -> bool {
        matches!(self, SourceKind::Video { .. })
    }
}

/// YouTube video ids are 11 characters from [A-Za-z0-9_-].
const VIDEO_ID_LEN: usize = 11;

fn is_youtube_host(host: &str) -> bool {
    matches!(
        host,
        "www.youtube.com" | "youtube.com" | "m.youtube.com" | "music.youtube.com"
    )
}

fn is_video_id(id: &str) -> bool {
    id.len() == VIDEO_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Rewrite a YouTube shorts URL to the canonical `watch?v=<id>` form.
///
/// Everything else — already-canonical watch URLs, other hosts, and strings
/// that fail URL parsing — passes through unchanged. Parse failures are not
/// errors here; the validator rejects them later. The transform is pure and
/// idempotent.
pub fn normalize_url(raw: &str) -> String {
    let parsed = match Url::parse(raw.trim()) {
        Ok(u) => u,
        Err(_) => return raw.to_string(),
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return raw.to_string();
    }

    let Some(host) = parsed.host_str() else {
        return raw.to_string();
    };

    if !is_youtube_host(host) {
        return raw.to_string();
    }

    if let Some(id) = parsed.path().strip_prefix("/shorts/") {
        // Shorts paths may carry trailing segments or nothing after the prefix.
        let id = id.trim_end_matches('/');
        if !id.is_empty() && !id.contains('/') {
            return format!("{}://{}/watch?v={}", parsed.scheme(), host, id);
        }
    }

    raw.to_string()
}

/// Classify a (post-normalization) URL without any network access.
///
/// Only a single playable video reference classifies as `Video`: a
/// `watch?v=<id>` URL on a YouTube host, a `youtu.be/<id>` short link, or a
/// `/shorts/<id>` path. Playlist pages classify as `Playlist`; everything
/// else — malformed strings, non-http(s) schemes, unsupported hosts,
/// channels — is `Unsupported`.
pub fn classify(raw: &str) -> SourceKind {
    let parsed = match Url::parse(raw.trim()) {
        Ok(u) => u,
        Err(_) => return SourceKind::Unsupported,
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return SourceKind::Unsupported;
    }

    let Some(host) = parsed.host_str() else {
        return SourceKind::Unsupported;
    };

    if host == "youtu.be" {
        let id = parsed.path().trim_matches('/');
        return if is_video_id(id) {
            SourceKind::Video { id: id.to_string() }
        } else {
            SourceKind::Unsupported
        };
    }

    if !is_youtube_host(host) {
        return SourceKind::Unsupported;
    }

    match parsed.path() {
        "/watch" => {
            // A watch URL inside a playlist still denotes one playable video,
            // so only the `v` parameter matters here.
            let id = parsed
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned());
            match id {
                Some(id) if is_video_id(&id) => SourceKind::Video { id },
                _ => SourceKind::Unsupported,
            }
        }
        "/playlist" => SourceKind::Playlist,
        path => match path.strip_prefix("/shorts/") {
            Some(id) if is_video_id(id.trim_end_matches('/')) => SourceKind::Video {
                id: id.trim_end_matches('/').to_string(),
            },
            _ => SourceKind::Unsupported,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_shorts_to_watch() {
        assert_eq!(
            normalize_url("https://www.youtube.com/shorts/abc123def45"),
            "https://www.youtube.com/watch?v=abc123def45"
        );
    }

    #[test]
    fn test_normalize_preserves_host() {
        assert_eq!(
            normalize_url("https://m.youtube.com/shorts/abc123def45"),
            "https://m.youtube.com/watch?v=abc123def45"
        );
    }

    #[test]
    fn test_normalize_watch_is_noop() {
        let url = "https://www.youtube.com/watch?v=abc123def45";
        assert_eq!(normalize_url(url), url);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_url("https://www.youtube.com/shorts/abc123def45");
        assert_eq!(normalize_url(&once), once);
    }

    #[test]
    fn test_normalize_other_host_unchanged() {
        let url = "https://vimeo.com/shorts/abc123def45";
        assert_eq!(normalize_url(url), url);
    }

    #[test]
    fn test_normalize_unparsable_unchanged() {
        assert_eq!(normalize_url("not-a-url"), "not-a-url");
        assert_eq!(normalize_url(""), "");
        assert_eq!(normalize_url("::::"), "::::");
    }

    #[test]
    fn test_normalize_non_http_scheme_unchanged() {
        let url = "ftp://www.youtube.com/shorts/abc123def45";
        assert_eq!(normalize_url(url), url);
    }

    #[test]
    fn test_classify_watch_url() {
        assert_eq!(
            classify("https://www.youtube.com/watch?v=abc123def45"),
            SourceKind::Video {
                id: "abc123def45".to_string()
            }
        );
    }

    #[test]
    fn test_classify_short_link() {
        assert!(classify("https://youtu.be/abc123def45").is_video());
    }

    #[test]
    fn test_classify_watch_inside_playlist() {
        assert!(classify("https://www.youtube.com/watch?v=abc123def45&list=PLx").is_video());
    }

    #[test]
    fn test_classify_playlist_page() {
        assert_eq!(
            classify("https://www.youtube.com/playlist?list=PLabc"),
            SourceKind::Playlist
        );
    }

    #[test]
    fn test_classify_channel_page() {
        assert_eq!(
            classify("https://www.youtube.com/@somechannel"),
            SourceKind::Unsupported
        );
    }

    #[test]
    fn test_classify_rejects_malformed() {
        assert_eq!(classify("not-a-url"), SourceKind::Unsupported);
        assert_eq!(classify(""), SourceKind::Unsupported);
    }

    #[test]
    fn test_classify_rejects_bad_id() {
        assert_eq!(
            classify("https://www.youtube.com/watch?v=short"),
            SourceKind::Unsupported
        );
        assert_eq!(
            classify("https://www.youtube.com/watch"),
            SourceKind::Unsupported
        );
    }

    #[test]
    fn test_classify_rejects_other_host() {
        assert_eq!(
            classify("https://vimeo.com/watch?v=abc123def45"),
            SourceKind::Unsupported
        );
    }

    #[test]
    fn test_classify_rejects_file_scheme() {
        assert_eq!(
            classify("file:///etc/passwd"),
            SourceKind::Unsupported
        );
    }
}
