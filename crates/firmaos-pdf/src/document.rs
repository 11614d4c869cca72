//! lopdf-backed implementation of the document-mutation contract
//!
//! `StampDocument` wraps an in-memory lopdf document and exposes the
//! primitives the compositor needs: embed an image or a standard font
//! once, then draw them onto pages by appending content-stream
//! operations. All coordinates are document space with Y measured from
//! the page bottom.

use crate::error::SignError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Pages parsed with 0-based indices; lopdf numbers pages from 1.
fn page_number(page_index: usize) -> u32 {
    page_index as u32 + 1
}

fn op_err(e: impl ToString) -> SignError {
    SignError::Operation(e.to_string())
}

/// An embedded image XObject with its natural pixel dimensions.
#[derive(Debug, Clone)]
pub struct ImageRef {
    id: ObjectId,
    name: String,
    pub width: u32,
    pub height: u32,
}

/// An embedded font resource.
#[derive(Debug, Clone)]
pub struct FontRef {
    id: ObjectId,
    name: String,
}

/// The two standard fonts the stamp uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampFont {
    Courier,
    CourierBold,
}

impl StampFont {
    fn base_font(self) -> &'static str {
        match self {
            StampFont::Courier => "Courier",
            StampFont::CourierBold => "Courier-Bold",
        }
    }
}

/// RGB fill color in the 0..=1 range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
}

/// Map text to WinAnsi bytes; characters outside the code page degrade
/// to `?` rather than corrupting the content stream.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

pub struct StampDocument {
    doc: Document,
    resource_seq: u32,
}

impl StampDocument {
    /// Load a document from raw bytes. Corrupt or unreadable input is a
    /// recoverable `DocumentLoad` failure; no partial state is retained.
    pub fn load(bytes: &[u8]) -> Result<Self, SignError> {
        let doc = Document::load_mem(bytes).map_err(|e| SignError::DocumentLoad(e.to_string()))?;
        Ok(Self {
            doc,
            resource_seq: 0,
        })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    fn page_object_id(&self, page_index: usize) -> Result<ObjectId, SignError> {
        self.doc
            .get_pages()
            .get(&page_number(page_index))
            .copied()
            .ok_or(SignError::PageNotFound(page_index))
    }

    fn page_dict(&self, page_id: ObjectId) -> Result<&Dictionary, SignError> {
        self.doc
            .get_object(page_id)
            .map_err(op_err)?
            .as_dict()
            .map_err(op_err)
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary, SignError> {
        self.doc
            .get_object_mut(page_id)
            .map_err(op_err)?
            .as_dict_mut()
            .map_err(op_err)
    }

    /// Natural page size `(width, height)` from the MediaBox, with the
    /// parent-node fallback and a Letter default for pathological files.
    pub fn page_size(&self, page_index: usize) -> Result<(f64, f64), SignError> {
        let page_id = self.page_object_id(page_index)?;
        let page = self.page_dict(page_id)?;

        if let Ok(media_box) = page.get(b"MediaBox") {
            return self.parse_media_box(media_box);
        }

        if let Ok(parent_ref) = page.get(b"Parent") {
            if let Ok(parent_id) = parent_ref.as_reference() {
                if let Ok(parent) = self.doc.get_object(parent_id) {
                    if let Ok(parent_dict) = parent.as_dict() {
                        if let Ok(media_box) = parent_dict.get(b"MediaBox") {
                            return self.parse_media_box(media_box);
                        }
                    }
                }
            }
        }

        // US Letter default
        Ok((612.0, 792.0))
    }

    fn parse_media_box(&self, obj: &Object) -> Result<(f64, f64), SignError> {
        let arr = match obj {
            Object::Array(a) => a,
            Object::Reference(id) => self
                .doc
                .get_object(*id)
                .map_err(op_err)?
                .as_array()
                .map_err(op_err)?,
            _ => return Err(SignError::Operation("MediaBox is not an array".into())),
        };
        if arr.len() != 4 {
            return Err(SignError::Operation(format!(
                "MediaBox has {} elements, expected 4",
                arr.len()
            )));
        }
        let mut values = [0.0f64; 4];
        for (i, obj) in arr.iter().enumerate() {
            values[i] = match obj {
                Object::Integer(n) => *n as f64,
                Object::Real(r) => *r as f64,
                _ => return Err(SignError::Operation("MediaBox entry is not numeric".into())),
            };
        }
        Ok((values[2] - values[0], values[3] - values[1]))
    }

    fn next_resource_name(&mut self, prefix: &str) -> String {
        self.resource_seq += 1;
        format!("{}{}", prefix, self.resource_seq)
    }

    /// Decode a PNG and store it as a grayscale Image XObject, returning
    /// its natural pixel dimensions.
    pub fn embed_image(&mut self, png_bytes: &[u8]) -> Result<ImageRef, SignError> {
        let decoded = image::load_from_memory(png_bytes)
            .map_err(|e| SignError::ImageRasterization(e.to_string()))?;
        let gray = decoded.to_luma8();
        let (width, height) = gray.dimensions();

        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            gray.into_raw(),
        );
        let id = self.doc.add_object(Object::Stream(stream));
        let name = self.next_resource_name("Im");

        Ok(ImageRef {
            id,
            name,
            width,
            height,
        })
    }

    /// Register one of the Type1 standard fonts with WinAnsi encoding.
    pub fn embed_font(&mut self, font: StampFont) -> FontRef {
        let id = self.doc.add_object(Object::Dictionary(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        }));
        let name = self.next_resource_name("F");
        FontRef { id, name }
    }

    /// Draw an embedded image at `(x, y)` (bottom-left corner) scaled to
    /// `width` x `height`.
    pub fn draw_image(
        &mut self,
        page_index: usize,
        image: &ImageRef,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), SignError> {
        let page_id = self.page_object_id(page_index)?;
        self.ensure_page_resource(page_id, "XObject", &image.name, image.id)?;

        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(width as f32),
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(height as f32),
                    Object::Real(x as f32),
                    Object::Real(y as f32),
                ],
            ),
            Operation::new("Do", vec![Object::Name(image.name.clone().into_bytes())]),
            Operation::new("Q", vec![]),
        ];
        self.append_operations(page_id, operations)
    }

    /// Draw a text run with its baseline at `(x, y)`.
    pub fn draw_text(
        &mut self,
        page_index: usize,
        text: &str,
        x: f64,
        y: f64,
        size: f64,
        font: &FontRef,
        color: Color,
    ) -> Result<(), SignError> {
        let page_id = self.page_object_id(page_index)?;
        self.ensure_page_resource(page_id, "Font", &font.name, font.id)?;

        let operations = vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "rg",
                vec![
                    Object::Real(color.r as f32),
                    Object::Real(color.g as f32),
                    Object::Real(color.b as f32),
                ],
            ),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(font.name.clone().into_bytes()),
                    Object::Real(size as f32),
                ],
            ),
            Operation::new(
                "Td",
                vec![Object::Real(x as f32), Object::Real(y as f32)],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(
                    encode_win_ansi(text),
                    lopdf::StringFormat::Literal,
                )],
            ),
            Operation::new("ET", vec![]),
        ];
        self.append_operations(page_id, operations)
    }

    /// Serialize the mutated document to a fresh byte vector.
    pub fn save(&mut self) -> Result<Vec<u8>, SignError> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| SignError::Save(e.to_string()))?;
        Ok(buffer)
    }

    /// Append encoded operations as an extra content stream so existing
    /// page content is left untouched.
    fn append_operations(
        &mut self,
        page_id: ObjectId,
        operations: Vec<Operation>,
    ) -> Result<(), SignError> {
        let encoded = Content { operations }.encode().map_err(op_err)?;
        let stream_id = self
            .doc
            .add_object(Object::Stream(Stream::new(dictionary! {}, encoded)));

        let page = self.page_dict_mut(page_id)?;
        let contents = match page.get(b"Contents") {
            Ok(Object::Reference(id)) => Object::Array(vec![
                Object::Reference(*id),
                Object::Reference(stream_id),
            ]),
            Ok(Object::Array(existing)) => {
                let mut arr = existing.clone();
                arr.push(Object::Reference(stream_id));
                Object::Array(arr)
            }
            _ => Object::Reference(stream_id),
        };
        page.set("Contents", contents);
        Ok(())
    }

    /// Make `name -> target` visible in the page's resource dictionary,
    /// creating missing levels and following indirect dictionaries.
    fn ensure_page_resource(
        &mut self,
        page_id: ObjectId,
        category: &str,
        name: &str,
        target: ObjectId,
    ) -> Result<(), SignError> {
        // Where does the Resources dictionary live?
        let resources_ref = {
            let page = self.page_dict(page_id)?;
            match page.get(b"Resources") {
                Ok(Object::Reference(id)) => Some(*id),
                _ => None,
            }
        };

        if resources_ref.is_none() {
            let page = self.page_dict_mut(page_id)?;
            if !matches!(page.get(b"Resources"), Ok(Object::Dictionary(_))) {
                page.set("Resources", Object::Dictionary(Dictionary::new()));
            }
        }

        // The category subdictionary may itself be indirect
        let category_ref = {
            let resources = match resources_ref {
                Some(rid) => self
                    .doc
                    .get_object(rid)
                    .map_err(op_err)?
                    .as_dict()
                    .map_err(op_err)?,
                None => {
                    let page = self.page_dict(page_id)?;
                    page.get(b"Resources")
                        .map_err(op_err)?
                        .as_dict()
                        .map_err(op_err)?
                }
            };
            match resources.get(category.as_bytes()) {
                Ok(Object::Reference(id)) => Some(*id),
                _ => None,
            }
        };

        if let Some(cid) = category_ref {
            let dict = self
                .doc
                .get_object_mut(cid)
                .map_err(op_err)?
                .as_dict_mut()
                .map_err(op_err)?;
            dict.set(name, Object::Reference(target));
            return Ok(());
        }

        let resources = match resources_ref {
            Some(rid) => self
                .doc
                .get_object_mut(rid)
                .map_err(op_err)?
                .as_dict_mut()
                .map_err(op_err)?,
            None => {
                let page = self.page_dict_mut(page_id)?;
                page.get_mut(b"Resources")
                    .map_err(op_err)?
                    .as_dict_mut()
                    .map_err(op_err)?
            }
        };
        if !matches!(resources.get(category.as_bytes()), Ok(Object::Dictionary(_))) {
            resources.set(category, Object::Dictionary(Dictionary::new()));
        }
        resources
            .get_mut(category.as_bytes())
            .map_err(op_err)?
            .as_dict_mut()
            .map_err(op_err)?
            .set(name, Object::Reference(target));
        Ok(())
    }
}
