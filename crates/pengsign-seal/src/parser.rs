//! PDF loading and low-level document mutation
//!
//! Thin wrapper around `lopdf::Document` exposing the operations the sealing
//! engine needs: page lookup and sizing, appending content streams to
//! existing pages, registering font/XObject resources, and appending the
//! audit page to the page tree.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::SealError;
use crate::fonts::{BuiltinFont, EmbeddedBuiltins};

pub struct PdfDocument {
    doc: Document,
}

impl PdfDocument {
    /// Load a PDF from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SealError> {
        let doc = Document::load_mem(bytes).map_err(|e| SealError::Parse(e.to_string()))?;
        Ok(Self { doc })
    }

    /// A document with no pages; only useful as an object container.
    pub fn empty() -> Self {
        Self {
            doc: Document::new(),
        }
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Page number (1-indexed) to object id map.
    pub fn page_ids(&self) -> BTreeMap<u32, ObjectId> {
        self.doc.get_pages()
    }

    /// Page dimensions as (width, height), resolving the MediaBox from the
    /// page or its parent, defaulting to US Letter when absent.
    pub fn page_size(&self, page_id: ObjectId) -> Result<(f64, f64), SealError> {
        let page = self.dict(page_id)?;

        if let Ok(media_box) = page.get(b"MediaBox") {
            return self.parse_rect(media_box);
        }

        if let Ok(parent_ref) = page.get(b"Parent") {
            if let Ok(parent_id) = parent_ref.as_reference() {
                if let Ok(parent) = self.dict(parent_id) {
                    if let Ok(media_box) = parent.get(b"MediaBox") {
                        return self.parse_rect(media_box);
                    }
                }
            }
        }

        Ok((612.0, 792.0))
    }

    /// Append a content stream to a page, preserving existing content.
    pub fn append_content(&mut self, page_id: ObjectId, ops: Vec<u8>) -> Result<(), SealError> {
        let stream_id = self.doc.add_object(Stream::new(Dictionary::new(), ops));

        let page = self.dict_mut(page_id)?;
        let new_contents = match page.remove(b"Contents") {
            Some(Object::Reference(existing)) => Object::Array(vec![
                Object::Reference(existing),
                Object::Reference(stream_id),
            ]),
            Some(Object::Array(mut array)) => {
                array.push(Object::Reference(stream_id));
                Object::Array(array)
            }
            _ => Object::Reference(stream_id),
        };
        page.set("Contents", new_contents);
        Ok(())
    }

    /// Register an indirect object under a page's resource dictionary, e.g.
    /// `("Font", "F1", id)` or `("XObject", "Im4", id)`. Handles resource
    /// and category dictionaries stored inline or as references.
    pub fn add_page_resource(
        &mut self,
        page_id: ObjectId,
        category: &str,
        name: &str,
        target: ObjectId,
    ) -> Result<(), SealError> {
        let resources_id = {
            let page = self.dict(page_id)?;
            page.get(b"Resources")
                .ok()
                .and_then(|obj| obj.as_reference().ok())
        };

        if resources_id.is_none() {
            let page = self.dict_mut(page_id)?;
            if !page.has(b"Resources") {
                page.set("Resources", Object::Dictionary(Dictionary::new()));
            }
        }

        let category_id = {
            let resources = match resources_id {
                Some(id) => self.dict(id)?,
                None => {
                    let page = self.dict(page_id)?;
                    match page.get(b"Resources") {
                        Ok(Object::Dictionary(dict)) => dict,
                        _ => {
                            return Err(SealError::PageTree(
                                "page resources are not a dictionary".to_string(),
                            ))
                        }
                    }
                }
            };
            resources
                .get(category.as_bytes())
                .ok()
                .and_then(|obj| obj.as_reference().ok())
        };

        // Category dictionary stored as its own object.
        if let Some(category_id) = category_id {
            let dict = self.dict_mut(category_id)?;
            dict.set(name, Object::Reference(target));
            return Ok(());
        }

        let resources = match resources_id {
            Some(id) => self.dict_mut(id)?,
            None => {
                let page = self.dict_mut(page_id)?;
                page.get_mut(b"Resources")
                    .map_err(|e| SealError::PageTree(e.to_string()))?
                    .as_dict_mut()
                    .map_err(|e| SealError::PageTree(e.to_string()))?
            }
        };
        if !resources.has(category.as_bytes()) {
            resources.set(category, Object::Dictionary(Dictionary::new()));
        }
        let entry = resources
            .get_mut(category.as_bytes())
            .map_err(|e| SealError::PageTree(e.to_string()))?
            .as_dict_mut()
            .map_err(|e| SealError::PageTree(e.to_string()))?;
        entry.set(name, Object::Reference(target));
        Ok(())
    }

    /// Append a new page carrying one content stream and the built-in font
    /// resources, returning the new page's object id.
    pub fn append_page(
        &mut self,
        width: f64,
        height: f64,
        content: Vec<u8>,
        builtins: &EmbeddedBuiltins,
    ) -> Result<ObjectId, SealError> {
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));
        let pages_id = self.pages_root()?;

        let mut font_dict = Dictionary::new();
        for font in BuiltinFont::ALL {
            font_dict.set(
                font.resource_name(),
                Object::Reference(builtins.object_id(font)),
            );
        }
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(font_dict));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width as f32),
                Object::Real(height as f32),
            ]),
        );
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Dictionary(resources));
        let page_id = self.doc.add_object(Object::Dictionary(page_dict));

        let total = self.doc.get_pages().len() as i64 + 1;
        let pages = self.dict_mut(pages_id)?;
        let mut kids = pages
            .get(b"Kids")
            .map_err(|e| SealError::PageTree(e.to_string()))?
            .as_array()
            .map_err(|e| SealError::PageTree(e.to_string()))?
            .clone();
        kids.push(Object::Reference(page_id));
        pages.set("Kids", Object::Array(kids));
        pages.set("Count", Object::Integer(total));

        Ok(page_id)
    }

    /// Serialize the document.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, SealError> {
        self.doc.compress();
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| SealError::Save(e.to_string()))?;
        Ok(buffer)
    }

    /// Resolve the root Pages node from the trailer.
    fn pages_root(&self) -> Result<ObjectId, SealError> {
        let root = self
            .doc
            .trailer
            .get(b"Root")
            .map_err(|_| SealError::PageTree("no Root in trailer".to_string()))?
            .as_reference()
            .map_err(|_| SealError::PageTree("Root is not a reference".to_string()))?;
        let catalog = self.dict(root)?;
        catalog
            .get(b"Pages")
            .map_err(|_| SealError::PageTree("no Pages in catalog".to_string()))?
            .as_reference()
            .map_err(|_| SealError::PageTree("Pages is not a reference".to_string()))
    }

    fn dict(&self, id: ObjectId) -> Result<&Dictionary, SealError> {
        self.doc
            .get_object(id)
            .map_err(|e| SealError::PageTree(e.to_string()))?
            .as_dict()
            .map_err(|e| SealError::PageTree(e.to_string()))
    }

    fn dict_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary, SealError> {
        self.doc
            .get_object_mut(id)
            .map_err(|e| SealError::PageTree(e.to_string()))?
            .as_dict_mut()
            .map_err(|e| SealError::PageTree(e.to_string()))
    }

    fn parse_rect(&self, obj: &Object) -> Result<(f64, f64), SealError> {
        let arr = match obj {
            Object::Array(a) => a,
            Object::Reference(id) => self
                .doc
                .get_object(*id)
                .map_err(|e| SealError::PageTree(e.to_string()))?
                .as_array()
                .map_err(|_| SealError::PageTree("MediaBox reference is not an array".into()))?,
            _ => return Err(SealError::PageTree("MediaBox is not an array".into())),
        };

        if arr.len() != 4 {
            return Err(SealError::PageTree(format!(
                "MediaBox has {} elements, expected 4",
                arr.len()
            )));
        }

        let mut values = [0.0f64; 4];
        for (i, obj) in arr.iter().enumerate() {
            values[i] = self.extract_number(obj)?;
        }

        Ok((values[2] - values[0], values[3] - values[1]))
    }

    fn extract_number(&self, obj: &Object) -> Result<f64, SealError> {
        match obj {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(r) => Ok(*r as f64),
            Object::Reference(id) => {
                let resolved = self
                    .doc
                    .get_object(*id)
                    .map_err(|e| SealError::PageTree(e.to_string()))?;
                self.extract_number(resolved)
            }
            _ => Err(SealError::PageTree(
                "expected number in rectangle".to_string(),
            )),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use lopdf::{Dictionary, Document, Object};

    /// Build a minimal N-page Letter-size PDF with identifiable page text.
    pub fn create_test_pdf(num_pages: u32, content_prefix: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");

        let pages_id = doc.new_object_id();
        let catalog_id = doc.new_object_id();

        let mut page_ids = Vec::new();
        for page_num in 0..num_pages {
            let page_id = doc.new_object_id();
            let content_id = doc.new_object_id();

            let content = format!(
                "BT /F1 12 Tf 50 700 Td ({}-Page-{}) Tj ET",
                content_prefix,
                page_num + 1
            );
            doc.objects.insert(
                content_id,
                Object::Stream(lopdf::Stream::new(Dictionary::new(), content.into_bytes())),
            );

            let mut page_dict = Dictionary::new();
            page_dict.set("Type", Object::Name(b"Page".to_vec()));
            page_dict.set("Parent", Object::Reference(pages_id));
            page_dict.set("Contents", Object::Reference(content_id));
            page_dict.set(
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            );

            doc.objects.insert(page_id, Object::Dictionary(page_dict));
            page_ids.push(Object::Reference(page_id));
        }

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", Object::Integer(num_pages as i64));
        pages_dict.set("Kids", Object::Array(page_ids));
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let mut catalog_dict = Dictionary::new();
        catalog_dict.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog_dict.set("Pages", Object::Reference(pages_id));
        doc.objects
            .insert(catalog_id, Object::Dictionary(catalog_dict));

        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }
}
