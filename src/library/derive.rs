//! Display metadata derived from file names.

/// Extensions always stripped from names, whatever the scan is configured for.
const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "wav", "ogg", "flac"];

/// Return true if `ext` (without the dot) is a known audio extension.
pub fn is_audio_extension(ext: &str) -> bool {
    AUDIO_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

/// Last path component of `name`, accepting both `/` and `\` separators.
pub(super) fn file_name_of(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Strip a trailing audio extension (case-insensitive): a built-in one or any
/// of `extra`, which are configured extensions with or without the dot.
pub fn strip_audio_extension<'a>(name: &'a str, extra: &[String]) -> &'a str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && is_listed(ext, extra) => stem,
        _ => name,
    }
}

fn is_listed(ext: &str, extra: &[String]) -> bool {
    is_audio_extension(ext)
        || extra
            .iter()
            .any(|e| e.trim().trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Split a file name of the form `"<artist> - <title>.<ext>"`.
///
/// Both parts are `None` when the separator is missing or either side is
/// blank after trimming. Everything after the first separator is the title.
pub fn derive(name: &str, extra: &[String]) -> (Option<String>, Option<String>) {
    let stem = strip_audio_extension(file_name_of(name), extra);
    let Some((artist, title)) = stem.split_once(" - ") else {
        return (None, None);
    };

    let (artist, title) = (artist.trim(), title.trim());
    if artist.is_empty() || title.is_empty() {
        return (None, None);
    }
    (Some(artist.to_string()), Some(title.to_string()))
}

/// Playlist text: `"Artist - Title"` when both are known, else the bare name.
pub fn display_name(
    file_name: &str,
    artist: Option<&str>,
    title: Option<&str>,
    extra: &[String],
) -> String {
    match (artist, title) {
        (Some(a), Some(t)) => format!("{a} - {t}"),
        _ => strip_audio_extension(file_name_of(file_name), extra).to_string(),
    }
}
