//! PDF container access (§4.0): loading the document, walking the page
//! tree, and resolving per-page resources and content-stream operators.
//!
//! Grounded in the teacher's `deserialize.rs`, specifically
//! `parse_pdf_from_bytes`'s trailer→Root→Pages→Kids walk
//! (`collect_page_refs`) and its per-page content-stream decompression.
//! The teacher's graphics/path/color operator handling and its
//! `PdfDocument`/`PdfPage` writer-side model have no counterpart here:
//! this module only ever reads.

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::ExtractionError;

/// A page's resolved resource dictionary and decoded content-stream
/// operators, ready for the extractor (§4.2) to walk.
pub struct PageHandle {
    pub index: usize,
    pub resources: Dictionary,
    pub operations: Vec<lopdf::content::Operation>,
}

/// Loads a PDF document and every page's resources and operators, in
/// document order.
pub fn load(bytes: &[u8]) -> Result<(Document, Vec<PageHandle>), ExtractionError> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| ExtractionError::MalformedContainer(e.to_string()))?;

    let root_ref = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| ExtractionError::MalformedContainer("trailer missing /Root".into()))?;
    let root_dict = doc
        .get_object(root_ref)
        .and_then(Object::as_dict)
        .map_err(|_| ExtractionError::MalformedContainer("/Root is not a dictionary".into()))?;
    let pages_ref = root_dict
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| ExtractionError::MalformedContainer("catalog missing /Pages".into()))?;

    let mut page_refs = Vec::new();
    collect_page_refs(&doc, pages_ref, &mut page_refs)?;

    let mut pages = Vec::with_capacity(page_refs.len());
    for (index, page_ref) in page_refs.into_iter().enumerate() {
        let page_dict = doc
            .get_object(page_ref)
            .and_then(Object::as_dict)
            .map_err(|_| ExtractionError::MalformedContainer(format!("page {index} is not a dictionary")))?;

        let resources = resolve_resources(&doc, page_ref)
            .unwrap_or_default();

        let content_bytes = decode_content_bytes(&doc, page_dict, index)?;
        let content = lopdf::content::Content::decode(&content_bytes)
            .map_err(|e| ExtractionError::ContentStreamDecode { page: index, source: e.to_string() })?;

        pages.push(PageHandle { index, resources, operations: content.operations });
    }

    Ok((doc, pages))
}

/// Recursively walks `/Pages /Kids`, collecting `/Page` object IDs in
/// document order (teacher's `collect_page_refs`).
fn collect_page_refs(
    doc: &Document,
    node: ObjectId,
    out: &mut Vec<ObjectId>,
) -> Result<(), ExtractionError> {
    let dict = doc
        .get_object(node)
        .and_then(Object::as_dict)
        .map_err(|_| ExtractionError::MalformedContainer(format!("page-tree node {node:?} is not a dictionary")))?;

    match dict.get(b"Type").and_then(Object::as_name_str) {
        Ok("Page") => {
            out.push(node);
            Ok(())
        }
        _ => {
            let kids = dict
                .get(b"Kids")
                .and_then(Object::as_array)
                .map_err(|_| ExtractionError::MalformedContainer(format!("page-tree node {node:?} missing /Kids")))?;
            for kid in kids {
                let kid_ref = kid
                    .as_reference()
                    .map_err(|_| ExtractionError::MalformedContainer("/Kids entry is not a reference".into()))?;
                collect_page_refs(doc, kid_ref, out)?;
            }
            Ok(())
        }
    }
}

/// Climbs the `/Parent` chain from a page object until a `/Resources`
/// dictionary is found, since resources may be inherited.
fn resolve_resources(doc: &Document, mut node: ObjectId) -> Option<Dictionary> {
    for _ in 0..64 {
        let dict = doc.get_object(node).and_then(Object::as_dict).ok()?;
        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok(d) = resources.as_dict() {
                return Some(d.clone());
            }
            if let Ok(r) = resources.as_reference() {
                if let Ok(d) = doc.get_object(r).and_then(Object::as_dict) {
                    return Some(d.clone());
                }
            }
        }
        node = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

fn decode_content_bytes(
    doc: &Document,
    page_dict: &Dictionary,
    page: usize,
) -> Result<Vec<u8>, ExtractionError> {
    let contents = page_dict
        .get(b"Contents")
        .map_err(|_| ExtractionError::MalformedContainer(format!("page {page} missing /Contents")))?;

    let mut refs = Vec::new();
    match contents {
        Object::Reference(r) => refs.push(*r),
        Object::Array(arr) => {
            for obj in arr {
                if let Ok(r) = obj.as_reference() {
                    refs.push(r);
                }
            }
        }
        _ => {}
    }

    let mut bytes = Vec::new();
    for r in refs {
        let stream = doc
            .get_object(r)
            .and_then(Object::as_stream)
            .map_err(|_| ExtractionError::ContentStreamDecode { page, source: "Contents entry is not a stream".into() })?;
        let decoded = stream
            .decompressed_content()
            .map_err(|e| ExtractionError::ContentStreamDecode { page, source: e.to_string() })?;
        bytes.extend_from_slice(&decoded);
        bytes.push(b'\n');
    }
    Ok(bytes)
}
