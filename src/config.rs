//! Playback source configuration.
//!
//! This is a demo shell: the playback source is a fixed local file and no
//! external configurability is exposed. The struct exists so the pipeline
//! description format has a single, tested seam.

/// Local file played back at startup.
pub const DEFAULT_MEDIA_URI: &str = "file:///sdcard/demo.mp4";

/// Video sink element handed to playbin.
pub const DEFAULT_VIDEO_SINK: &str = "glimagesink";

pub struct PlayerConfig {
    pub media_uri: String,
    pub video_sink: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            media_uri: DEFAULT_MEDIA_URI.to_string(),
            video_sink: DEFAULT_VIDEO_SINK.to_string(),
        }
    }
}

impl PlayerConfig {
    /// The playbin description handed to the pipeline shim.
    pub fn pipeline_description(&self) -> String {
        format!(
            "playbin uri={} video-sink={}",
            self.media_uri, self.video_sink
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_description_uses_local_file_and_gl_sink() {
        let desc = PlayerConfig::default().pipeline_description();
        assert_eq!(
            desc,
            "playbin uri=file:///sdcard/demo.mp4 video-sink=glimagesink"
        );
    }

    #[test]
    fn custom_source_renders_into_description() {
        let config = PlayerConfig {
            media_uri: "file:///sdcard/Movies/clip.mkv".to_string(),
            video_sink: "autovideosink".to_string(),
        };
        assert_eq!(
            config.pipeline_description(),
            "playbin uri=file:///sdcard/Movies/clip.mkv video-sink=autovideosink"
        );
    }
}
