//! Page copying between documents
//!
//! Output documents are built from scratch, so every placed page is a deep
//! copy of its source page: the page dictionary, its content streams, and
//! everything the page references (fonts, images, annotations).

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::types::Result;

/// Fallback page size in points (US Letter)
pub(crate) const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (612.0, 792.0);

/// Copies pages from one source document into an output document.
///
/// Holds the object-id cache for a single source, so resources shared
/// between its pages land in the output exactly once. Use one copier per
/// source document; ids from different sources would collide in the cache.
pub(crate) struct PageCopier {
    cache: HashMap<ObjectId, ObjectId>,
}

impl PageCopier {
    pub(crate) fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Copy one page into `output`, rewiring it under `parent_id`.
    ///
    /// The source page's `Parent` entry is dropped and replaced; everything
    /// else is copied deeply.
    pub(crate) fn copy_page(
        &mut self,
        output: &mut Document,
        source: &Document,
        page_id: ObjectId,
        parent_id: ObjectId,
    ) -> Result<ObjectId> {
        // Register the page up front so back-references (annotation "P"
        // entries and the like) resolve to the copied page.
        let new_page_id = output.new_object_id();
        self.cache.insert(page_id, new_page_id);

        let page_dict = source.get_dictionary(page_id)?.clone();
        let mut new_dict = Dictionary::new();
        for (key, value) in page_dict.iter() {
            if key == b"Parent" {
                continue;
            }
            new_dict.set(key.clone(), self.copy_value(output, source, value)?);
        }
        new_dict.set("Parent", Object::Reference(parent_id));

        output
            .objects
            .insert(new_page_id, Object::Dictionary(new_dict));
        Ok(new_page_id)
    }

    /// Deep copy a PDF object, following references once each.
    fn copy_value(
        &mut self,
        output: &mut Document,
        source: &Document,
        obj: &Object,
    ) -> Result<Object> {
        match obj {
            Object::Reference(id) => {
                if let Some(&new_id) = self.cache.get(id) {
                    return Ok(Object::Reference(new_id));
                }

                // Reserve the output id before recursing so reference
                // cycles terminate.
                let new_id = output.new_object_id();
                self.cache.insert(*id, new_id);

                let referenced = source.get_object(*id)?;
                let copied = self.copy_value(output, source, referenced)?;
                output.objects.insert(new_id, copied);

                Ok(Object::Reference(new_id))
            }
            Object::Dictionary(dict) => {
                let mut new_dict = Dictionary::new();
                for (key, value) in dict.iter() {
                    new_dict.set(key.clone(), self.copy_value(output, source, value)?);
                }
                Ok(Object::Dictionary(new_dict))
            }
            Object::Array(arr) => {
                let new_arr: Result<Vec<_>> = arr
                    .iter()
                    .map(|item| self.copy_value(output, source, item))
                    .collect();
                Ok(Object::Array(new_arr?))
            }
            Object::Stream(stream) => {
                let mut new_dict = Dictionary::new();
                for (key, value) in stream.dict.iter() {
                    new_dict.set(key.clone(), self.copy_value(output, source, value)?);
                }
                Ok(Object::Stream(Stream {
                    dict: new_dict,
                    content: stream.content.clone(),
                    allows_compression: stream.allows_compression,
                    start_position: None,
                }))
            }
            // Primitive types: just clone
            _ => Ok(obj.clone()),
        }
    }
}

/// MediaBox of the document's first page, used to size inserted blanks.
///
/// Falls back to US Letter when the document has no pages or the first
/// page's MediaBox is missing or indirect.
pub(crate) fn first_page_media_box(doc: &Document) -> Vec<Object> {
    doc.get_pages()
        .values()
        .next()
        .and_then(|&page_id| doc.get_dictionary(page_id).ok())
        .and_then(|page_dict| page_dict.get(b"MediaBox").and_then(|obj| obj.as_array()).ok())
        .cloned()
        .unwrap_or_else(default_media_box)
}

/// Default MediaBox for US Letter size
fn default_media_box() -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(DEFAULT_PAGE_DIMENSIONS.0 as i64),
        Object::Integer(DEFAULT_PAGE_DIMENSIONS.1 as i64),
    ]
}
