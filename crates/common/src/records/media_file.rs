//! One `FILE` fact of a media object

use crate::gedcom::Fact;

const MIME_TYPES: &[(&str, &str)] = &[
    ("bmp", "image/bmp"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("ged", "text/x-gedcom"),
    ("gif", "image/gif"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("mov", "video/quicktime"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("ogg", "audio/ogg"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("rar", "application/x-rar-compressed"),
    ("svg", "image/svg+xml"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("txt", "text/plain"),
    ("wav", "audio/wav"),
    ("webp", "image/webp"),
    ("zip", "application/zip"),
];

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A file attached to a media object. Owned by its media record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    media_xref: String,
    fact: Fact,
}

impl MediaFile {
    pub fn new(fact: Fact, media_xref: &str) -> Self {
        Self {
            media_xref: media_xref.to_string(),
            fact,
        }
    }

    /// Xref of the owning media object.
    pub fn media_xref(&self) -> &str {
        &self.media_xref
    }

    /// Path or URL as written in the `FILE` line.
    pub fn filename(&self) -> &str {
        self.fact.value()
    }

    /// `2 TITL`, empty when absent.
    pub fn title(&self) -> &str {
        self.fact.attribute("TITL").unwrap_or("")
    }

    /// `2 FORM`, empty when absent.
    pub fn format(&self) -> &str {
        self.fact.attribute("FORM").unwrap_or("")
    }

    /// `3 TYPE` below the format (photo, document, ...), empty when absent.
    pub fn media_type(&self) -> &str {
        self.fact.nested(3, "TYPE").unwrap_or("")
    }

    /// Lower-case extension of the filename, or the format when the
    /// filename has none.
    pub fn extension(&self) -> String {
        let name = self
            .filename()
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or("");

        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
            _ => self.format().to_ascii_lowercase(),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        let extension = self.extension();
        MIME_TYPES
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, mime)| *mime)
            .unwrap_or(DEFAULT_MIME_TYPE)
    }

    pub fn is_image(&self) -> bool {
        self.mime_type().starts_with("image/")
    }

    /// Files hosted elsewhere are referenced by URL.
    pub fn is_external(&self) -> bool {
        let name = self.filename();
        name.starts_with("http://") || name.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(gedcom: &str) -> MediaFile {
        MediaFile::new(Fact::new(gedcom).unwrap(), "M1")
    }

    #[test]
    fn test_attributes() {
        let media_file = file("1 FILE photos/Wedding.JPG\n2 FORM jpg\n3 TYPE photo\n2 TITL The wedding");
        assert_eq!(media_file.media_xref(), "M1");
        assert_eq!(media_file.filename(), "photos/Wedding.JPG");
        assert_eq!(media_file.title(), "The wedding");
        assert_eq!(media_file.format(), "jpg");
        assert_eq!(media_file.media_type(), "photo");
        assert_eq!(media_file.extension(), "jpg");
        assert_eq!(media_file.mime_type(), "image/jpeg");
        assert!(media_file.is_image());
        assert!(!media_file.is_external());
    }

    #[test]
    fn test_missing_attributes_are_empty() {
        let media_file = file("1 FILE letter.pdf");
        assert_eq!(media_file.title(), "");
        assert_eq!(media_file.format(), "");
        assert_eq!(media_file.media_type(), "");
        assert_eq!(media_file.mime_type(), "application/pdf");
        assert!(!media_file.is_image());
    }

    #[test]
    fn test_format_used_when_filename_has_no_extension() {
        let media_file = file("1 FILE https://example.com/image?id=42\n2 FORM png");
        assert_eq!(media_file.extension(), "png");
        assert!(media_file.is_image());
        assert!(media_file.is_external());
    }

    #[test]
    fn test_unknown_extension() {
        let media_file = file("1 FILE archive.xyz");
        assert_eq!(media_file.mime_type(), "application/octet-stream");
        assert!(!media_file.is_image());
    }

    #[test]
    fn test_dotfile_is_not_an_extension() {
        let media_file = file("1 FILE scans/.hidden\n2 FORM gif");
        assert_eq!(media_file.extension(), "gif");
    }
}
