//! Storage keys, upload payloads, and on-device scratch files.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::error::{Error, Result};
use crate::models::WorkOrderId;
use crate::util::is_http_url;

/// Photos wider than this are downscaled before upload.
pub const MAX_PHOTO_WIDTH: u32 = 1600;
/// JPEG quality used for re-encoded photos.
pub const PHOTO_JPEG_QUALITY: u8 = 70;

pub const PDF_MIME: &str = "application/pdf";
pub const JPEG_MIME: &str = "image/jpeg";
pub const PNG_MIME: &str = "image/png";

/// Multipart field an attachment is uploaded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadField {
    Photo,
    Pdf,
}

impl UploadField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photoFile",
            Self::Pdf => "pdfFile",
        }
    }
}

/// One file part of a multipart work order request.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub field: UploadField,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        field: UploadField,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let file_name = file_name.into().trim().to_string();
        let mime_type = mime_type.into().trim().to_string();
        if file_name.is_empty() {
            return Err(Error::InvalidInput(
                "Upload file name cannot be empty".to_string(),
            ));
        }
        if bytes.is_empty() {
            return Err(Error::InvalidInput(format!("{file_name} is empty")));
        }
        let mime_type = if mime_type.is_empty() {
            guess_mime(&file_name)
        } else {
            mime_type
        };

        Ok(Self {
            field,
            file_name,
            mime_type,
            bytes,
        })
    }

    /// A photo part; the MIME type is guessed from the file name.
    pub fn photo(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        Self::new(UploadField::Photo, file_name, "", bytes)
    }

    pub fn pdf(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        Self::new(UploadField::Pdf, file_name, PDF_MIME, bytes)
    }
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("UploadFile")
            .field("field", &self.field.as_str())
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Resolves a storage key into a fetchable URL.
///
/// Absolute URLs pass through, `uploads/` keys go through the `/files`
/// resolver, and anything else is treated as a path on the API host.
#[must_use]
pub fn file_url(api_base_url: &str, key: &str) -> Option<String> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    if is_http_url(key) {
        return Some(key.to_string());
    }

    let base = api_base_url.trim_end_matches('/');
    if key.starts_with("uploads/") {
        Some(format!("{base}/files?key={}", urlencoding::encode(key)))
    } else {
        Some(format!("{base}/{}", key.trim_start_matches('/')))
    }
}

/// MIME type for a file name, falling back to `application/octet-stream`.
#[must_use]
pub fn guess_mime(file_name: &str) -> String {
    let lower = file_name.trim().to_ascii_lowercase();
    let known = [
        (".pdf", PDF_MIME),
        (".jpg", JPEG_MIME),
        (".jpeg", JPEG_MIME),
        (".png", PNG_MIME),
        (".heic", "image/heic"),
        (".webp", "image/webp"),
        (".gif", "image/gif"),
    ];
    if let Some((_, mime)) = known.iter().find(|(ext, _)| lower.ends_with(ext)) {
        return (*mime).to_string();
    }

    mime_guess::from_path(&lower)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[must_use]
pub fn photo_upload_name(timestamp_ms: i64, index: usize) -> String {
    format!("photo-{timestamp_ms}-{index}.jpg")
}

#[must_use]
pub fn pdf_upload_name(timestamp_ms: i64) -> String {
    format!("workorder-{timestamp_ms}.pdf")
}

/// Downscales a photo to at most [`MAX_PHOTO_WIDTH`] and re-encodes it as JPEG.
///
/// Uploads must stay small enough for the collaborator's body limit. When the
/// bytes cannot be decoded or re-encoded the original bytes are returned.
#[must_use]
pub fn prepare_photo_for_upload(bytes: Vec<u8>) -> Vec<u8> {
    match reencode_photo(&bytes) {
        Ok(processed) => processed,
        Err(error) => {
            tracing::debug!("Uploading original photo bytes: {}", error);
            bytes
        }
    }
}

fn reencode_photo(bytes: &[u8]) -> Result<Vec<u8>> {
    let source = image::load_from_memory(bytes)?;
    let (width, _) = source.dimensions();
    let resized = if width > MAX_PHOTO_WIDTH {
        source.resize(MAX_PHOTO_WIDTH, u32::MAX, FilterType::Triangle)
    } else {
        source
    };
    encode_jpeg(&resized, PHOTO_JPEG_QUALITY)
}

/// Encodes an image as JPEG, flattening any alpha channel.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut cursor = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut cursor, quality).encode_image(&rgb)?;
    Ok(cursor.into_inner())
}

/// Scratch directory for downloaded and generated files.
///
/// Files are overwritten by name and never cleaned up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// `<platform cache dir>/fieldwork`, or the temp dir when there is none.
    pub fn platform_default() -> Result<Self> {
        let base = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(base.join("fieldwork"))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn preview_pdf_path(&self, id: WorkOrderId) -> PathBuf {
        self.root.join(format!("wo_preview_{id}.pdf"))
    }

    #[must_use]
    pub fn annotation_source_path(&self, id: WorkOrderId) -> PathBuf {
        self.root.join(format!("wo_{id}.pdf"))
    }

    #[must_use]
    pub fn signed_pdf_path(&self, timestamp_ms: i64) -> PathBuf {
        self.root.join(format!("signed_{timestamp_ms}.pdf"))
    }

    pub fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if !path.starts_with(&self.root) {
            return Err(Error::InvalidInput(format!(
                "{} is outside the cache directory",
                path.display()
            )));
        }
        std::fs::write(path, bytes)?;
        tracing::debug!("Cached {} bytes at {}", bytes.len(), path.display());
        Ok(())
    }
}
