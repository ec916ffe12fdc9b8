//! Flattening ink layers into PDF pages.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbaImage;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use super::pdf::{self, PageGeometry};
use crate::error::{Error, Result};

/// Ink raster for one page, sized like the rendered canvas of that page.
#[derive(Debug, Clone, Copy)]
pub struct InkOverlay<'a> {
    pub page_index: usize,
    pub image: &'a RgbaImage,
}

/// Stamps each overlay over its whole page and returns the new document.
///
/// Overlays without any visible pixel are skipped. When nothing is left to
/// stamp the input bytes are returned unchanged.
pub fn composite_ink(pdf_bytes: &[u8], overlays: &[InkOverlay<'_>]) -> Result<Vec<u8>> {
    let inked: Vec<&InkOverlay<'_>> = overlays
        .iter()
        .filter(|overlay| overlay.image.pixels().any(|pixel| pixel[3] > 0))
        .collect();
    if inked.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = pdf::load(pdf_bytes)?;
    let pages = pdf::page_geometries(&document)?;
    for overlay in &inked {
        let page = pages.get(overlay.page_index).ok_or_else(|| {
            Error::InvalidInput(format!(
                "Page {} is out of range (document has {} pages)",
                overlay.page_index + 1,
                pages.len()
            ))
        })?;
        stamp_page(&mut document, page, overlay.image)?;
        debug!(page = overlay.page_index, "Stamped ink layer");
    }

    let mut output = Vec::new();
    document.save_to(&mut output)?;
    Ok(output)
}

fn stamp_page(document: &mut Document, page: &PageGeometry, ink: &RgbaImage) -> Result<()> {
    let image_id = add_image_xobject(document, ink)?;

    let mut resources = effective_resources(document, page.id)?;
    let mut xobjects = match resources.get(b"XObject") {
        Ok(value) => pdf::resolve(document, value)?.as_dict()?.clone(),
        Err(_) => Dictionary::new(),
    };
    let name = unused_name(&xobjects);
    xobjects.set(name.as_bytes().to_vec(), image_id);
    resources.set("XObject", xobjects);

    let mut contents = existing_contents(document, page.id)?;
    let open_id = document.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
    let stamp = format!(
        "Q\nq {} cm /{name} Do\nQ\n",
        page.display_to_user_matrix()
            .iter()
            .map(|value| format_number(*value))
            .collect::<Vec<_>>()
            .join(" ")
    );
    let stamp_id = document.add_object(Stream::new(dictionary! {}, stamp.into_bytes()));
    contents.insert(0, Object::Reference(open_id));
    contents.push(Object::Reference(stamp_id));

    let page_dict = document.get_dictionary_mut(page.id)?;
    page_dict.set("Resources", resources);
    page_dict.set("Contents", contents);
    Ok(())
}

/// RGB image with the ink alpha as its soft mask.
fn add_image_xobject(document: &mut Document, ink: &RgbaImage) -> Result<ObjectId> {
    let (width, height) = ink.dimensions();
    let pixel_count = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in ink.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
    }

    let mask_id = document.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        deflate(&alpha)?,
    ));
    Ok(document.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
            "SMask" => mask_id,
        },
        deflate(&rgb)?,
    )))
}

/// The page's resources, including ones inherited from the page tree, as an
/// owned dictionary that can be set directly on the page.
fn effective_resources(document: &Document, page_id: ObjectId) -> Result<Dictionary> {
    match pdf::inherited(document, page_id, b"Resources")? {
        Some(Object::Dictionary(resources)) => Ok(resources.clone()),
        Some(other) => Err(Error::Pdf(format!("Resources is not a dictionary: {other:?}"))),
        None => Ok(Dictionary::new()),
    }
}

fn existing_contents(document: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = document.get_dictionary(page_id)?;
    let Ok(contents) = page.get(b"Contents") else {
        return Ok(Vec::new());
    };
    match pdf::resolve(document, contents)? {
        Object::Array(items) => Ok(items.clone()),
        Object::Stream(_) => Ok(vec![contents.clone()]),
        other => Err(Error::Pdf(format!("Unexpected page contents: {other:?}"))),
    }
}

fn unused_name(xobjects: &Dictionary) -> String {
    (0..)
        .map(|index| format!("FwInk{index}"))
        .find(|name| !xobjects.has(name.as_bytes()))
        .unwrap_or_else(|| "FwInk".to_string())
}

fn deflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

fn format_number(value: f64) -> String {
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() || text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::ZlibDecoder;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    use super::super::pdf::fixtures::{sample_pdf, sample_pdf_with_inherited_box};
    use super::*;

    fn inked(width: u32, height: u32) -> RgbaImage {
        let mut image = RgbaImage::new(width, height);
        for x in 10..20 {
            image.put_pixel(x, 5, Rgba([0, 0, 0, 255]));
        }
        image
    }

    fn page_ids(document: &Document) -> Vec<ObjectId> {
        document.get_pages().into_values().collect()
    }

    fn stream_text(document: &Document, object: &Object) -> String {
        let id = object.as_reference().unwrap();
        let stream = document.get_object(id).unwrap().as_stream().unwrap();
        String::from_utf8(stream.content.clone()).unwrap()
    }

    #[test]
    fn without_ink_returns_input_verbatim() {
        let bytes = sample_pdf(&[(612, 792, 0)]);
        assert_eq!(composite_ink(&bytes, &[]).unwrap(), bytes);

        let blank = RgbaImage::new(612, 792);
        let overlays = [InkOverlay {
            page_index: 0,
            image: &blank,
        }];
        assert_eq!(composite_ink(&bytes, &overlays).unwrap(), bytes);
    }

    #[test]
    fn inked_page_gains_image_and_other_pages_are_untouched() {
        let bytes = sample_pdf(&[(612, 792, 0), (612, 792, 0)]);
        let before = Document::load_mem(&bytes).unwrap();
        let untouched_before = format!("{:?}", before.get_dictionary(page_ids(&before)[1]).unwrap());

        let ink = inked(612, 792);
        let output = composite_ink(
            &bytes,
            &[InkOverlay {
                page_index: 0,
                image: &ink,
            }],
        )
        .unwrap();

        let after = Document::load_mem(&output).unwrap();
        let ids = page_ids(&after);
        let untouched_after = format!("{:?}", after.get_dictionary(ids[1]).unwrap());
        assert_eq!(untouched_after, untouched_before);

        let page = after.get_dictionary(ids[0]).unwrap();
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(stream_text(&after, &contents[0]), "q\n");
        assert_eq!(
            stream_text(&after, &contents[2]),
            "Q\nq 612 0 0 792 0 0 cm /FwInk0 Do\nQ\n"
        );

        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        assert!(resources.has(b"Font"));
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let image_id = xobjects.get(b"FwInk0").unwrap().as_reference().unwrap();
        let image = after.get_object(image_id).unwrap().as_stream().unwrap();
        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 612);
        assert_eq!(image.dict.get(b"Height").unwrap().as_i64().unwrap(), 792);

        let mask_id = image.dict.get(b"SMask").unwrap().as_reference().unwrap();
        let mask = after.get_object(mask_id).unwrap().as_stream().unwrap();
        let mut alpha = Vec::new();
        ZlibDecoder::new(mask.content.as_slice())
            .read_to_end(&mut alpha)
            .unwrap();
        assert_eq!(alpha.len(), 612 * 792);
        assert_eq!(alpha.iter().filter(|value| **value == 255).count(), 10);
    }

    #[test]
    fn rotated_page_uses_rotation_aware_matrix() {
        let bytes = sample_pdf(&[(792, 612, 90)]);
        let ink = inked(612, 792);
        let output = composite_ink(
            &bytes,
            &[InkOverlay {
                page_index: 0,
                image: &ink,
            }],
        )
        .unwrap();

        let document = Document::load_mem(&output).unwrap();
        let page = document.get_dictionary(page_ids(&document)[0]).unwrap();
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(
            stream_text(&document, &contents[2]),
            "Q\nq 0 612 -792 0 792 0 cm /FwInk0 Do\nQ\n"
        );
    }

    #[test]
    fn inherited_box_pages_are_supported() {
        let bytes = sample_pdf_with_inherited_box(&[(500, 700, 0)]);
        let ink = inked(600, 840);
        let output = composite_ink(
            &bytes,
            &[InkOverlay {
                page_index: 0,
                image: &ink,
            }],
        )
        .unwrap();
        assert!(Document::load_mem(&output).is_ok());
    }

    #[test]
    fn out_of_range_page_is_rejected() {
        let bytes = sample_pdf(&[(612, 792, 0)]);
        let ink = inked(612, 792);
        let result = composite_ink(
            &bytes,
            &[InkOverlay {
                page_index: 3,
                image: &ink,
            }],
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn numbers_are_written_compactly() {
        assert_eq!(format_number(612.0), "612");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-792.125), "-792.125");
    }
}
