use std::path::Path;

/// Extensions (lower-case, without the dot) treated as video files.
pub const VIDEO_EXTENSIONS: [&str; 8] = ["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v"];

/// Content type used when the extension is not in the map.
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Check if a file is a supported video file based on extension.
///
/// Only the extension is compared case-insensitively; the rest of the name is
/// never looked at.
pub fn is_video_file(path: &Path) -> bool {
    lowercase_extension(path)
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// MIME type served for a video path.
pub fn content_type_for(path: &Path) -> &'static str {
    match lowercase_extension(path).as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("mov") => "video/quicktime",
        Some("wmv") => "video/x-ms-wmv",
        Some("flv") => "video/x-flv",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_video_file() {
        for name in ["test.mp4", "test.avi", "test.mkv", "a.mov", "a.wmv", "a.flv", "a.webm", "a.m4v"] {
            assert!(is_video_file(Path::new(name)), "{name} should be a video");
        }
        assert!(!is_video_file(Path::new("test.txt")));
        assert!(!is_video_file(Path::new("image.jpg")));
        assert!(!is_video_file(Path::new("no_extension")));
        assert!(!is_video_file(Path::new(".mp4")));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(is_video_file(Path::new("VIDEO.MP4")));
        assert!(is_video_file(Path::new("video.Mp4")));
        assert!(is_video_file(Path::new("video.mP4")));
        assert!(is_video_file(Path::new("video.mp4")));
        assert!(is_video_file(Path::new("video.MKV")));
        assert!(!is_video_file(Path::new("video.TXT")));
    }

    #[test]
    fn only_the_extension_counts() {
        assert!(!is_video_file(Path::new("mp4")));
        assert!(!is_video_file(Path::new("movie.mp4.part")));
        assert!(is_video_file(Path::new("/library/not-a.txt/clip.webm")));
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for(Path::new("a.mp4")), "video/mp4");
        assert_eq!(content_type_for(Path::new("a.M4V")), "video/mp4");
        assert_eq!(content_type_for(Path::new("a.webm")), "video/webm");
        assert_eq!(content_type_for(Path::new("a.avi")), "video/x-msvideo");
        assert_eq!(content_type_for(Path::new("a.mkv")), "video/x-matroska");
        assert_eq!(content_type_for(Path::new("a.mov")), "video/quicktime");
        assert_eq!(content_type_for(Path::new("a.wmv")), "video/x-ms-wmv");
        assert_eq!(content_type_for(Path::new("a.flv")), "video/x-flv");
        assert_eq!(content_type_for(Path::new("a.bin")), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new("noext")), DEFAULT_CONTENT_TYPE);
    }
}
