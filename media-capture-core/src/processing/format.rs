use crate::traits::encoder::EncoderFactory;

/// Pick the first encoding in `preferences` the engine claims to support.
///
/// Returns an empty string when nothing matches; the failure surfaces later,
/// when an encoder is created with it.
pub fn negotiate_mime_type<F: EncoderFactory + ?Sized>(preferences: &[String], encoders: &F) -> String {
    for mime_type in preferences {
        if encoders.supports_format(mime_type) {
            log::debug!("Negotiated output format {}", mime_type);
            return mime_type.clone();
        }
    }
    log::warn!("No preferred output format is supported: {:?}", preferences);
    String::new()
}

/// File extension for a MIME type, ignoring codec parameters.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "video/webm" | "audio/webm" => "webm",
        "video/mp4" | "audio/mp4" => "mp4",
        "video/x-matroska" => "mkv",
        "audio/ogg" => "ogg",
        _ => "bin",
    }
}
