/// Photo selection state
///
/// Holds at most one selected file. Files with a media type outside the
/// accepted set never make it into the selection.

use std::path::Path;
use std::sync::Arc;

use crate::error::InvalidMediaType;

/// Accepted image media types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    /// `image/jpg`, a common non-standard alias of `image/jpeg`
    Jpg,
    Png,
    Heic,
}

impl MediaType {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" => Some(MediaType::Jpeg),
            "image/jpg" => Some(MediaType::Jpg),
            "image/png" => Some(MediaType::Png),
            "image/heic" => Some(MediaType::Heic),
            _ => None,
        }
    }

    /// Default file extension, used when the file name has none
    pub fn extension(self) -> &'static str {
        match self {
            MediaType::Jpeg => "jpeg",
            MediaType::Jpg => "jpg",
            MediaType::Png => "png",
            MediaType::Heic => "heic",
        }
    }
}

/// Media type a desktop file would be declared with, derived from its extension
pub fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" => "image/jpg".to_string(),
        "jpeg" => "image/jpeg".to_string(),
        "png" => "image/png".to_string(),
        "heic" => "image/heic".to_string(),
        "" => "application/octet-stream".to_string(),
        other => format!("image/{}", other),
    }
}

/// A user-selected image file
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    /// Raw file contents, shared so snapshots are cheap
    pub bytes: Arc<Vec<u8>>,
    /// Declared media type, e.g. "image/png"
    pub media_type: String,
    /// Original file name, e.g. "IMG_0042.png"
    pub filename: String,
}

impl ImageFile {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            media_type: media_type.into(),
            filename: filename.into(),
        }
    }

    /// Same file metadata with different contents
    pub fn with_bytes(&self, bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            media_type: self.media_type.clone(),
            filename: self.filename.clone(),
        }
    }

    /// Extension of the original file name, lowercased.
    /// Falls back to the media type's extension.
    pub fn extension(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .filter(|ext| !ext.is_empty())
            .or_else(|| MediaType::from_mime(&self.media_type).map(|m| m.extension().to_string()))
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// The current photo selection
#[derive(Debug, Clone, Default)]
pub struct ImageSelection {
    current: Option<ImageFile>,
}

impl ImageSelection {
    /// Replace the selection, or reject the file and keep the previous one
    pub fn select(&mut self, file: ImageFile) -> Result<(), InvalidMediaType> {
        if MediaType::from_mime(&file.media_type).is_none() {
            return Err(InvalidMediaType {
                filename: file.filename,
                media_type: file.media_type,
            });
        }

        self.current = Some(file);
        Ok(())
    }

    pub fn current(&self) -> Option<&ImageFile> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_media_types() {
        assert_eq!(MediaType::from_mime("image/jpeg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_mime("image/jpg"), Some(MediaType::Jpg));
        assert_eq!(MediaType::from_mime("image/png"), Some(MediaType::Png));
        assert_eq!(MediaType::from_mime("IMAGE/HEIC"), Some(MediaType::Heic));
        assert_eq!(MediaType::from_mime("image/gif"), None);
        assert_eq!(MediaType::from_mime("application/pdf"), None);
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a/photo.JPG")), "image/jpg");
        assert_eq!(mime_for_path(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("photo.heic")), "image/heic");
        assert_eq!(mime_for_path(Path::new("photo.gif")), "image/gif");
        assert_eq!(mime_for_path(Path::new("photo")), "application/octet-stream");
    }

    #[test]
    fn test_rejected_file_keeps_previous_selection() {
        let mut selection = ImageSelection::default();
        let png = ImageFile::new(vec![1, 2, 3], "image/png", "me.png");
        selection.select(png.clone()).unwrap();

        let err = selection
            .select(ImageFile::new(vec![9], "image/gif", "cat.gif"))
            .unwrap_err();

        assert_eq!(err.media_type, "image/gif");
        assert_eq!(selection.current(), Some(&png));
    }

    #[test]
    fn test_rejected_file_with_empty_selection() {
        let mut selection = ImageSelection::default();
        assert!(selection
            .select(ImageFile::new(vec![], "text/plain", "notes.txt"))
            .is_err());
        assert!(selection.current().is_none());
    }

    #[test]
    fn test_extension() {
        assert_eq!(ImageFile::new(vec![], "image/png", "Me.PNG").extension(), "png");
        assert_eq!(ImageFile::new(vec![], "image/jpeg", "camera-upload").extension(), "jpeg");
        assert_eq!(ImageFile::new(vec![], "", "noext").extension(), "bin");
    }
}
