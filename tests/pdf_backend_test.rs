//! MuPDF/lopdf backend against PDFs generated on the fly

mod common;

use std::path::Path;
use std::sync::Arc;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use common::{config, FakeEngine};
use hybrid_ocr::document::{DocumentBackend, DocumentFormat, DocumentHandle, RasterZoom};
use hybrid_ocr::pdf::{ContentSanitizer, PdfBackend};
use hybrid_ocr::{Pipeline, Route};

/// Write a PDF with one page per entry; `None` pages have an empty content
/// stream. Page 0 carries an indirect `Text` and a direct `Link` annotation.
fn build_pdf(path: &Path, pages: &[Option<&str>]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for (index, text) in pages.iter().enumerate() {
        let operations = match text {
            Some(text) => vec![
                Operation::new("q", vec![]),
                Operation::new("Q", vec![]),
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        let content = Content { operations }.encode().unwrap();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        if index == 0 {
            let note_id = doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Text",
                "Rect" => vec![10.into(), 10.into(), 30.into(), 30.into()],
                "Contents" => Object::string_literal("reviewer note"),
            });
            let link = dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![40.into(), 40.into(), 80.into(), 60.into()],
            };
            page.set("Annots", vec![note_id.into(), Object::Dictionary(link)]);
        }
        kids.push(doc.add_object(page).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn test_open_reports_page_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("three.pdf");
    build_pdf(&path, &[Some("one"), Some("two"), None]);

    let doc = PdfBackend.open(&path).unwrap();
    assert_eq!(doc.page_count(), 3);
}

#[test]
fn test_open_rejects_non_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not.pdf");
    std::fs::write(&path, b"plain text, not a document").unwrap();

    assert!(PdfBackend.open(&path).is_err());
}

#[test]
fn test_annotations_listed_and_removed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotated.pdf");
    build_pdf(&path, &[Some("Hello World")]);

    let mut doc = PdfBackend.open(&path).unwrap();
    let annotations = doc.annotations(0).unwrap();
    assert_eq!(annotations.len(), 2);
    assert!(annotations[0].object.is_some());
    assert_eq!(annotations[0].subtype.as_deref(), Some("Text"));
    assert_eq!(annotations[1].object, None);
    assert_eq!(annotations[1].subtype.as_deref(), Some("Link"));

    let report = ContentSanitizer::new().sanitize_page(&mut doc, 0);
    assert_eq!(report.annotations_removed, 2);
    assert_eq!(report.failures, 0);
    assert!(doc.annotations(0).unwrap().is_empty());
}

#[test]
fn test_stale_annotation_ref_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotated.pdf");
    build_pdf(&path, &[Some("Hello World")]);

    let mut doc = PdfBackend.open(&path).unwrap();
    let annotations = doc.annotations(0).unwrap();
    doc.delete_annotation(0, &annotations[0]).unwrap();

    // Index 0 now holds the link, not the note
    assert!(doc.delete_annotation(0, &annotations[0]).is_err());
}

#[test]
fn test_sanitized_stream_drops_empty_state_pair() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stream.pdf");
    build_pdf(&path, &[Some("Hello World")]);

    let mut doc = PdfBackend.open(&path).unwrap();
    let report = ContentSanitizer::new().sanitize_page(&mut doc, 0);
    assert_eq!(report.streams_rewritten, 1);

    let streams = doc.content_streams(0).unwrap();
    assert_eq!(streams.len(), 1);
    let content = Content::decode(&doc.read_stream(streams[0]).unwrap()).unwrap();
    let operators: Vec<&str> = content.operations.iter().map(|op| op.operator.as_str()).collect();
    assert_eq!(operators, vec!["BT", "Tf", "Td", "Tj", "ET"]);
}

#[test]
fn test_text_extraction_sees_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("text.pdf");
    build_pdf(&path, &[Some("Hello World")]);

    let mut doc = PdfBackend.open(&path).unwrap();
    assert!(doc.extract_text(0).unwrap().contains("Hello World"));

    let stream = doc.content_streams(0).unwrap()[0];
    doc.update_stream(stream, Vec::new()).unwrap();
    assert!(doc.extract_text(0).unwrap().trim().is_empty());
}

#[test]
fn test_rasterize_produces_scaled_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raster.pdf");
    build_pdf(&path, &[Some("Hello World")]);

    let mut doc = PdfBackend.open(&path).unwrap();
    let image = doc.rasterize(0, RasterZoom::default()).unwrap();

    assert_eq!(image.page_no, 0);
    assert_eq!((image.width, image.height), (918, 1188));
    assert_eq!(DocumentFormat::from_magic_bytes(&image.png), Some(DocumentFormat::Png));
}

#[test]
fn test_out_of_range_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("one.pdf");
    build_pdf(&path, &[Some("only")]);

    let mut doc = PdfBackend.open(&path).unwrap();
    assert!(doc.extract_text(1).is_err());
    assert!(doc.annotations(1).is_err());
}

#[tokio::test]
async fn test_pipeline_over_real_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.pdf");
    build_pdf(&path, &[Some("Hello World"), None, Some("DRAFT")]);

    let engine = Arc::new(FakeEngine::with_texts(&[(1, "scanned page"), (2, "scanned draft")]));
    let pipeline = Pipeline::new(config(5, "draft"), PdfBackend, engine.clone()).unwrap();

    let extraction = pipeline.process_file(&path).await.unwrap();

    assert_eq!(extraction.route, Route::Merged);
    let pages: Vec<_> = extraction
        .pages
        .iter()
        .map(|r| (r.page_no, r.text.clone().unwrap_or_default(), r.ocr))
        .collect();
    assert_eq!(
        pages,
        vec![
            (0, "Hello World".to_string(), false),
            (1, "scanned page".to_string(), true),
            (2, "scanned draft".to_string(), true),
        ]
    );
    assert_eq!(engine.batches(), vec![vec![1, 2]]);
}
