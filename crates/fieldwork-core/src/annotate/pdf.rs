//! Page tree helpers on top of `lopdf`.

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};

/// Guards against cyclic `Parent` or reference chains in malformed files.
const MAX_CHAIN_DEPTH: usize = 32;

/// Page box and rotation of one page, with inherited attributes resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub id: ObjectId,
    /// `[llx, lly, urx, ury]` in user space units.
    pub media_box: [f64; 4],
    /// Clockwise display rotation: 0, 90, 180 or 270.
    pub rotation: u16,
}

impl PageGeometry {
    #[must_use]
    pub fn user_width(&self) -> f64 {
        (self.media_box[2] - self.media_box[0]).abs()
    }

    #[must_use]
    pub fn user_height(&self) -> f64 {
        (self.media_box[3] - self.media_box[1]).abs()
    }

    /// Width and height as displayed, after rotation.
    #[must_use]
    pub fn display_size(&self) -> (f64, f64) {
        if self.rotation % 180 == 0 {
            (self.user_width(), self.user_height())
        } else {
            (self.user_height(), self.user_width())
        }
    }

    /// `cm` operands mapping the unit square of a displayed-page image onto
    /// user space.
    #[must_use]
    pub fn display_to_user_matrix(&self) -> [f64; 6] {
        let w = self.user_width();
        let h = self.user_height();
        let x0 = self.media_box[0].min(self.media_box[2]);
        let y0 = self.media_box[1].min(self.media_box[3]);
        match self.rotation {
            90 => [0.0, h, -w, 0.0, x0 + w, y0],
            180 => [-w, 0.0, 0.0, -h, x0 + w, y0 + h],
            270 => [0.0, -h, w, 0.0, x0, y0 + h],
            _ => [w, 0.0, 0.0, h, x0, y0],
        }
    }
}

pub fn load(pdf_bytes: &[u8]) -> Result<Document> {
    if pdf_bytes.is_empty() {
        return Err(Error::Pdf("PDF data is empty".to_string()));
    }
    let document = Document::load_mem(pdf_bytes)?;
    if document.get_pages().is_empty() {
        return Err(Error::Pdf("PDF has no pages".to_string()));
    }
    Ok(document)
}

/// Geometry of every page in document order.
pub fn page_geometries(document: &Document) -> Result<Vec<PageGeometry>> {
    document
        .get_pages()
        .into_values()
        .map(|id| {
            let media_box = inherited(document, id, b"MediaBox")?
                .ok_or_else(|| Error::Pdf(format!("Page {} {} has no MediaBox", id.0, id.1)))
                .and_then(|value| parse_box(document, value))?;
            let rotation = inherited(document, id, b"Rotate")?
                .and_then(|value| value.as_i64().ok())
                .map_or(0, normalize_rotation);
            Ok(PageGeometry {
                id,
                media_box,
                rotation,
            })
        })
        .collect()
}

/// Follows indirect references to the underlying object.
pub fn resolve<'a>(document: &'a Document, object: &'a Object) -> Result<&'a Object> {
    let mut current = object;
    for _ in 0..MAX_CHAIN_DEPTH {
        match current {
            Object::Reference(id) => current = document.get_object(*id)?,
            other => return Ok(other),
        }
    }
    Err(Error::Pdf("Reference chain is too deep".to_string()))
}

/// Looks up a page attribute, walking up the page tree for inheritable keys.
pub fn inherited<'a>(
    document: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>> {
    let mut node: &Dictionary = document.get_dictionary(page_id)?;
    for _ in 0..MAX_CHAIN_DEPTH {
        if let Ok(value) = node.get(key) {
            return resolve(document, value).map(Some);
        }
        let Ok(parent) = node.get(b"Parent") else {
            return Ok(None);
        };
        node = resolve(document, parent)?.as_dict()?;
    }
    Err(Error::Pdf("Page tree is too deep".to_string()))
}

fn parse_box(document: &Document, value: &Object) -> Result<[f64; 4]> {
    let items = value.as_array()?;
    if items.len() != 4 {
        return Err(Error::Pdf("MediaBox must have four numbers".to_string()));
    }
    let mut parsed = [0.0; 4];
    for (slot, item) in parsed.iter_mut().zip(items) {
        *slot = number(resolve(document, item)?)?;
    }
    if (parsed[2] - parsed[0]).abs() < f64::EPSILON || (parsed[3] - parsed[1]).abs() < f64::EPSILON {
        return Err(Error::Pdf("MediaBox has zero area".to_string()));
    }
    Ok(parsed)
}

fn number(object: &Object) -> Result<f64> {
    match object {
        Object::Integer(value) => Ok(*value as f64),
        Object::Real(value) => Ok(f64::from(*value)),
        other => Err(Error::Pdf(format!("Expected a number, found {other:?}"))),
    }
}

const fn normalize_rotation(raw: i64) -> u16 {
    match raw.rem_euclid(360) {
        90 => 90,
        180 => 180,
        270 => 270,
        _ => 0,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// One entry per page: width, height, rotation.
    pub fn sample_pdf(pages: &[(i64, i64, i64)]) -> Vec<u8> {
        build(pages, false)
    }

    /// Same as [`sample_pdf`] but with the first page's size inherited from
    /// the page tree node.
    pub fn sample_pdf_with_inherited_box(pages: &[(i64, i64, i64)]) -> Vec<u8> {
        build(pages, true)
    }

    fn media_box(width: i64, height: i64) -> Vec<Object> {
        vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(width),
            Object::Integer(height),
        ]
    }

    fn build(pages: &[(i64, i64, i64)], inherit_first: bool) -> Vec<u8> {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = document.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for (index, (width, height, rotation)) in pages.iter().enumerate() {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 18.into()]),
                    Operation::new("Td", vec![72.into(), 72.into()]),
                    Operation::new("Tj", vec![Object::string_literal(format!("Page {}", index + 1))]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = document.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Rotate" => *rotation,
            };
            if !(inherit_first && index == 0) {
                page.set("MediaBox", media_box(*width, *height));
            }
            kids.push(document.add_object(page).into());
        }

        let (first_width, first_height, _) = pages[0];
        let tree = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => media_box(first_width, first_height),
        };
        document.objects.insert(pages_id, Object::Dictionary(tree));
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        document.save_to(&mut bytes).expect("save sample pdf");
        bytes
    }
}
