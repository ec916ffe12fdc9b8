//! Turning picked files and ink rasters into uploads and previews.
#![cfg_attr(not(target_os = "android"), allow(dead_code))]

use std::io::Cursor;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use fieldwork_core::files::{
    guess_mime, pdf_upload_name, photo_upload_name, prepare_photo_for_upload, UploadField,
    UploadFile, JPEG_MIME,
};
use fieldwork_core::{Error, Result};
use image::{ImageFormat, RgbaImage};

/// A file read from the platform picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Downscales each photo and names re-encoded JPEGs `photo-<ms>-<i>.jpg`.
/// Photos that cannot be decoded keep their name and bytes.
pub fn photo_uploads(picked: Vec<PickedFile>, timestamp_ms: i64) -> Result<Vec<UploadFile>> {
    picked
        .into_iter()
        .enumerate()
        .map(|(index, file)| {
            let processed = prepare_photo_for_upload(file.bytes);
            if processed.starts_with(&[0xFF, 0xD8, 0xFF]) {
                UploadFile::new(
                    UploadField::Photo,
                    photo_upload_name(timestamp_ms, index),
                    JPEG_MIME,
                    processed,
                )
            } else {
                let mime = guess_mime(&file.name);
                UploadFile::new(UploadField::Photo, file.name, mime, processed)
            }
        })
        .collect()
}

pub fn pdf_upload(picked: PickedFile, timestamp_ms: i64) -> Result<UploadFile> {
    if !picked.bytes.starts_with(b"%PDF") {
        return Err(Error::InvalidInput(format!(
            "{} is not a PDF file.",
            picked.name
        )));
    }
    UploadFile::pdf(pdf_upload_name(timestamp_ms), picked.bytes)
}

/// PNG data URI for drawing a raster in the web view.
pub fn png_data_uri(image: &RgbaImage) -> Result<String> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(format!(
        "data:image/png;base64,{}",
        BASE64_STANDARD.encode(cursor.into_inner())
    ))
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage, Rgba};
    use pretty_assertions::assert_eq;

    use super::*;

    fn png_bytes() -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        RgbImage::from_pixel(4, 4, Rgb([10, 200, 30]))
            .write_to(&mut cursor, ImageFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn photos_are_reencoded_and_renamed() {
        let uploads = photo_uploads(
            vec![PickedFile {
                name: "IMG_1.png".to_string(),
                bytes: png_bytes(),
            }],
            42,
        )
        .unwrap();
        assert_eq!(uploads[0].file_name, "photo-42-0.jpg");
        assert_eq!(uploads[0].mime_type, "image/jpeg");
        assert_eq!(uploads[0].field, UploadField::Photo);
    }

    #[test]
    fn undecodable_photos_keep_their_name() {
        let uploads = photo_uploads(
            vec![PickedFile {
                name: "scan.heic".to_string(),
                bytes: b"not really heic".to_vec(),
            }],
            42,
        )
        .unwrap();
        assert_eq!(uploads[0].file_name, "scan.heic");
        assert_eq!(uploads[0].bytes, b"not really heic".to_vec());
    }

    #[test]
    fn pdf_upload_checks_header() {
        let upload = pdf_upload(
            PickedFile {
                name: "quote.pdf".to_string(),
                bytes: b"%PDF-1.5\n".to_vec(),
            },
            7,
        )
        .unwrap();
        assert_eq!(upload.file_name, "workorder-7.pdf");
        assert_eq!(upload.field, UploadField::Pdf);

        assert!(pdf_upload(
            PickedFile {
                name: "photo.jpg".to_string(),
                bytes: vec![0xFF, 0xD8, 0xFF],
            },
            7,
        )
        .is_err());
    }

    #[test]
    fn data_uri_is_png() {
        let uri = png_data_uri(&RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]))).unwrap();
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }
}
