//! PDF collaborator: text-layer extraction, AcroForm form fields and image
//! loading.
//!
//! Page rasterization needs a native renderer, so it stays behind the
//! [`PageRasterizer`] trait and is supplied by the embedder.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::debug;
use lopdf::{Document, Object};

use crate::error::{AcordExtractError, Result};

/// Marker line under which form-field key/value pairs are appended to the
/// extracted text.
pub const FORM_FIELDS_MARKER: &str = "=== PDF FORM FIELDS ===";

/// Renders PDF pages to base64-encoded PNG images, one per page.
pub trait PageRasterizer: Send + Sync {
    fn page_images(&self, pdf: &[u8]) -> Result<Vec<String>>;
}

/// Extract the text layer of a PDF file, with any AcroForm field values
/// appended under [`FORM_FIELDS_MARKER`].
pub fn extract_text(path: &Path) -> Result<String> {
    let doc = Document::load(path).map_err(|e| AcordExtractError::Pdf(e.to_string()))?;
    document_text(&doc)
}

/// Same as [`extract_text`], for an in-memory PDF.
pub fn extract_text_bytes(pdf: &[u8]) -> Result<String> {
    let doc = Document::load_mem(pdf).map_err(|e| AcordExtractError::Pdf(e.to_string()))?;
    document_text(&doc)
}

fn document_text(doc: &Document) -> Result<String> {
    let mut sections = Vec::new();

    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) if !text.trim().is_empty() => sections.push(text),
            Ok(_) => {}
            Err(e) => debug!("Skipping unreadable page {}: {}", page_number, e),
        }
    }

    let fields = form_fields(doc);
    if !fields.is_empty() {
        let mut block = vec![format!("\n{}", FORM_FIELDS_MARKER)];
        for (name, value) in fields {
            if !value.is_empty() {
                block.push(format!("{}: {}", name, value));
            }
        }
        sections.push(block.join("\n"));
    }

    Ok(sections.join("\n\n"))
}

/// Read the AcroForm field dictionary, if any. Scanned forms have none.
fn form_fields(doc: &Document) -> Vec<(String, String)> {
    let mut fields = Vec::new();

    let Ok(catalog) = doc.catalog() else {
        return fields;
    };
    let Ok(acro_form) = catalog.get(b"AcroForm") else {
        return fields;
    };
    let acro_form = resolve(doc, acro_form);
    let Ok(acro_form) = acro_form.as_dict() else {
        return fields;
    };
    let Ok(list) = acro_form.get(b"Fields").and_then(Object::as_array) else {
        return fields;
    };

    for entry in list {
        let Ok(id) = entry.as_reference() else {
            continue;
        };
        let Ok(field) = doc.get_dictionary(id) else {
            continue;
        };
        let Some(name) = field
            .get(b"T")
            .ok()
            .and_then(|t| t.as_str().ok())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        else {
            continue;
        };
        let value = field
            .get(b"V")
            .ok()
            .map(|v| object_text(doc, v))
            .unwrap_or_default();
        fields.push((name, value));
    }

    fields
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn object_text(doc: &Document, object: &Object) -> String {
    match resolve(doc, object) {
        Object::String(bytes, _) => String::from_utf8_lossy(bytes).into_owned(),
        Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
        Object::Integer(n) => n.to_string(),
        Object::Real(n) => n.to_string(),
        Object::Boolean(b) => b.to_string(),
        Object::Null => String::new(),
        other => format!("{:?}", other),
    }
}

/// Load an image file as a base64 payload for the vision channel.
pub fn load_image_as_base64(path: &Path) -> Result<String> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(AcordExtractError::Pdf(format!(
            "{} is not an image file (detected {})",
            path.display(),
            mime
        )));
    }
    let bytes = std::fs::read(path)?;
    Ok(BASE64.encode(bytes))
}

#[cfg(test)]
pub(crate) fn sample_pdf(text: &str, form_fields: &[(&str, &str)]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode content stream"),
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };

    if !form_fields.is_empty() {
        let field_ids: Vec<Object> = form_fields
            .iter()
            .map(|(name, value)| {
                doc.add_object(dictionary! {
                    "T" => Object::string_literal(*name),
                    "V" => Object::string_literal(*value),
                })
                .into()
            })
            .collect();
        let acro_id = doc.add_object(dictionary! { "Fields" => field_ids });
        catalog.set("AcroForm", acro_id);
    }

    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("serialize sample pdf");
    buffer
}
