//! Small helpers shared by the recording button, the audio player and the
//! acta composer.

/// Audio extensions the composer accepts as playable input.
const AUDIO_EXTENSIONS: [&str; 6] = [".mp3", ".m4a", ".wav", ".aac", ".ogg", ".webm"];

/// Format milliseconds as "MM:SS".
///
/// Minutes are not capped at 59: a 61-minute recording renders as "61:40".
pub fn format_time(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}", minutes, secs)
}

/// Format seconds as "MM:SS" (player progress labels).
pub fn format_seconds(seconds: f64) -> String {
    format_time((seconds.max(0.0) * 1000.0) as u64)
}

/// Classify a picked file as audio by its extension, case-insensitively.
/// Anything else is treated as a generic attachment.
pub fn is_audio_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    AUDIO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65_000), "01:05");
        assert_eq!(format_time(3_700_000), "61:40");
        assert_eq!(format_time(999), "00:00");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "00:00");
        assert_eq!(format_seconds(65.0), "01:05");
        assert_eq!(format_seconds(-3.0), "00:00");
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file("reunion.mp3"));
        assert!(is_audio_file("notas.m4a"));
        assert!(is_audio_file("clip.OGG"));
        assert!(is_audio_file("grabacion.webm"));
        assert!(!is_audio_file("acta.pdf"));
        assert!(!is_audio_file("notas.docx"));
        assert!(!is_audio_file("sin_extension"));
    }
}
