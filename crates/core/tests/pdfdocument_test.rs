//! Document-level behaviour: xref loading across revisions, object
//! resolution, recovery and the page tree.

mod common;

use std::sync::Arc;

use common::{PdfBuilder, catalog, multi_page, single_page};
use folio_core::document::XRefLocation;
use folio_core::{PDFDocument, PDFObjRef, PDFObject, ParseOptions, PdfError};

#[test]
fn resolving_twice_returns_the_cached_object() {
    let doc = PDFDocument::new(single_page("BT ET")).unwrap();
    let a = doc.resolve(5, 0).unwrap();
    let b = doc.resolve(5, 0).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.get("BaseFont"), Some(&PDFObject::Name("Helvetica".into())));
}

#[test]
fn incremental_update_shadows_old_definition() {
    let mut b = PdfBuilder::new();
    catalog(&mut b, &[]);
    b.object(3, "(first)");
    b.xref_section("/Root 1 0 R");
    b.object(3, "(second)");
    b.xref_section("/Root 1 0 R");
    let doc = PDFDocument::new(b.build()).unwrap();

    assert_eq!(doc.xref().revisions(), 2);
    assert_eq!(
        doc.resolve(3, 0).unwrap().as_ref(),
        &PDFObject::String(b"second".to_vec())
    );
}

#[test]
fn freed_object_resolves_to_null() {
    let mut b = PdfBuilder::new();
    catalog(&mut b, &[]);
    b.object(3, "(soon gone)");
    b.xref_section("/Root 1 0 R");
    // an update that frees object 3
    let pos = b.build().len();
    b.raw(
        format!(
            "xref\n3 1\n0000000000 00001 f \ntrailer\n<< /Root 1 0 R /Size 4 /Prev {} >>\nstartxref\n{pos}\n%%EOF\n",
            first_xref(&b.build())
        )
        .as_bytes(),
    );
    let doc = PDFDocument::new(b.build()).unwrap();
    assert_eq!(doc.xref().get(3).map(|e| &e.location), Some(&XRefLocation::Free));
    assert!(doc.resolve(3, 0).unwrap().is_null());
}

fn first_xref(data: &[u8]) -> usize {
    data.windows(5).position(|w| w == b"xref\n").unwrap()
}

#[test]
fn dangling_reference_is_null() {
    let doc = PDFDocument::new(single_page("")).unwrap();
    assert!(doc.resolve(42, 0).unwrap().is_null());
    assert!(matches!(
        doc.require(&PDFObjRef::new(42, 0)),
        Err(PdfError::UnresolvedReference { objid: 42, genno: 0 })
    ));
}

#[test]
fn objects_inside_object_streams() {
    let mut b = PdfBuilder::new();
    b.object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.object_stream(
        4,
        &[
            (2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>"),
            (3, "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 100] >>"),
        ],
    );
    b.xref_stream(5, "/Root 1 0 R");
    let doc = PDFDocument::new(b.build()).unwrap();

    assert!(matches!(
        doc.xref().get(3).map(|e| &e.location),
        Some(XRefLocation::Compressed { stream_objid: 4, index: 1 })
    ));
    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.page(0).unwrap().mediabox(&doc), (0.0, 0.0, 200.0, 100.0));
}

fn packed_page_tree(b: &mut PdfBuilder) {
    b.object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.object_stream(
        4,
        &[
            (2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>"),
            (3, "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 100] >>"),
        ],
    );
}

#[test]
fn broken_startxref_recovers_packed_objects() {
    let mut b = PdfBuilder::new();
    packed_page_tree(&mut b);
    b.xref_stream(5, "/Root 1 0 R");
    let good = b.build();
    let tail = good.windows(10).rposition(|w| w == b"startxref\n").unwrap();
    let mut broken = good[..tail].to_vec();
    broken.extend_from_slice(b"startxref\n999999\n%%EOF\n");

    let recovered = PDFDocument::new(&broken).unwrap();
    assert!(recovered.xref().is_fallback());
    assert!(matches!(
        recovered.xref().get(3).map(|e| &e.location),
        Some(XRefLocation::Compressed { stream_objid: 4, index: 1 })
    ));
    assert_eq!(recovered.page_count(), PDFDocument::new(&good).unwrap().page_count());
    assert_eq!(recovered.page_count(), 1);
}

#[test]
fn objects_missing_from_xref_are_found_in_object_streams() {
    // a classic table only lists objects 1 and 4
    let mut b = PdfBuilder::new();
    packed_page_tree(&mut b);
    b.xref_section("/Root 1 0 R");
    let doc = PDFDocument::new(b.build()).unwrap();
    assert!(!doc.xref().is_fallback());
    assert!(doc.xref().get(2).is_none());
    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.page(0).unwrap().mediabox(&doc), (0.0, 0.0, 200.0, 100.0));
}

#[test]
fn wrong_length_recovers_at_endstream() {
    let content = b"BT /F1 12 Tf (Hello) Tj ET";
    let mut b = PdfBuilder::new();
    catalog(&mut b, &[3]);
    b.object(
        3,
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>",
    );
    let mut body = b"<< /Length 7 >>\nstream\n".to_vec();
    body.extend_from_slice(content);
    body.extend_from_slice(b"\nendstream");
    b.object_bytes(4, &body);
    b.object(5, common::HELVETICA);
    b.xref_section("/Root 1 0 R");
    let doc = PDFDocument::new(b.build()).unwrap();

    let page = doc.page(0).unwrap();
    assert_eq!(page.content_data(&doc).as_ref(), content);
}

#[test]
fn missing_xref_recovers_same_pages() {
    let good = multi_page(&["one", "two", "three"]);
    let cut = first_xref(&good);
    let broken = &good[..cut];

    let doc = PDFDocument::new(&good).unwrap();
    let recovered = PDFDocument::new(broken).unwrap();
    assert!(recovered.xref().is_fallback());
    assert_eq!(recovered.page_count(), doc.page_count());
    assert_eq!(recovered.page_count(), 3);
}

#[test]
fn strict_mode_refuses_recovery() {
    let good = multi_page(&["one"]);
    let broken = good[..first_xref(&good)].to_vec();
    assert!(PDFDocument::with_options(&broken, ParseOptions::new().strict(true)).is_err());
}

#[test]
fn non_pdf_input_is_rejected() {
    assert!(matches!(PDFDocument::new(b""), Err(PdfError::NotPdf)));
    assert!(matches!(
        PDFDocument::new(b"just some text, nothing else"),
        Err(PdfError::NotPdf)
    ));
}

#[test]
fn page_inherits_resources_from_parent() {
    let doc = PDFDocument::new(multi_page(&["a", "b"])).unwrap();
    let page = doc.page(1).unwrap();
    assert!(!page.attrs.contains_key("Resources"));
    let resources = page.resources(&doc);
    assert!(resources.contains_key("Font"));
    assert_eq!(page.mediabox(&doc), (0.0, 0.0, 612.0, 792.0));
}

#[test]
fn page_tree_cycle_terminates() {
    let mut b = PdfBuilder::new();
    b.object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.object(2, "<< /Type /Pages /Kids [3 0 R 4 0 R] /Count 2 >>");
    b.object(3, "<< /Type /Page /Parent 2 0 R >>");
    // a Pages node listing its own parent
    b.object(4, "<< /Type /Pages /Kids [2 0 R 5 0 R] /Parent 2 0 R >>");
    b.object(5, "<< /Parent 4 0 R >>");
    b.xref_section("/Root 1 0 R");
    let doc = PDFDocument::new(b.build()).unwrap();
    let ids: Vec<_> = doc.pages().map(|p| p.pageid).collect();
    assert_eq!(ids, [Some(3), Some(5)]);
}

#[test]
fn info_and_page_labels() {
    let mut b = PdfBuilder::new();
    b.object(
        1,
        "<< /Type /Catalog /Pages 2 0 R /PageLabels << /Nums [0 << /S /r >> 2 << /S /D /P (A-) >>] >> >>",
    );
    b.object(2, "<< /Type /Pages /Kids [3 0 R 4 0 R 5 0 R] /Count 3 >>");
    for id in 3..=5 {
        b.object(id, "<< /Type /Page /Parent 2 0 R >>");
    }
    b.object(6, "<< /Title (Report) /Author <FEFF004A006F> >>");
    b.xref_section("/Root 1 0 R /Info 6 0 R");
    let doc = PDFDocument::new(b.build()).unwrap();

    assert_eq!(
        doc.info_strings(),
        [("Author".to_string(), "Jo".to_string()), ("Title".to_string(), "Report".to_string())]
    );
    let labels = doc.page_labels().unwrap();
    assert_eq!(labels.labels(3).collect::<Vec<_>>(), ["i", "ii", "A-1"]);
}

#[test]
fn page_labels_from_number_tree_kids() {
    let mut b = PdfBuilder::new();
    b.object(1, "<< /Type /Catalog /Pages 2 0 R /PageLabels 7 0 R >>");
    b.object(2, "<< /Type /Pages /Kids [3 0 R 4 0 R 5 0 R 6 0 R] /Count 4 >>");
    for id in 3..=6 {
        b.object(id, "<< /Type /Page /Parent 2 0 R >>");
    }
    b.object(7, "<< /Kids [8 0 R 9 0 R] >>");
    b.object(8, "<< /Nums [0 << /S /R >>] /Limits [0 0] >>");
    b.object(9, "<< /Nums [2 << /S /a /St 3 >>] /Limits [2 2] >>");
    b.xref_section("/Root 1 0 R");
    let doc = PDFDocument::new(b.build()).unwrap();

    let labels = doc.page_labels().unwrap();
    assert_eq!(labels.labels(4).collect::<Vec<_>>(), ["I", "II", "c", "d"]);

    let plain = PDFDocument::new(single_page("")).unwrap();
    assert!(matches!(plain.page_labels(), Err(PdfError::NoPageLabels)));
}

#[test]
fn embedded_files_across_name_tree_kids() {
    let mut b = PdfBuilder::new();
    b.object(1, "<< /Type /Catalog /Pages 2 0 R /Names << /EmbeddedFiles 3 0 R >> >>");
    b.object(2, "<< /Type /Pages /Kids [] /Count 0 >>");
    b.object(3, "<< /Kids [4 0 R 5 0 R] >>");
    b.object(4, "<< /Names [(a.txt) 6 0 R] /Limits [(a.txt) (a.txt)] >>");
    b.object(
        5,
        "<< /Names [(b) << /Type /Filespec /F (old.bin) /UF <FEFF0062002E00620069006E> \
         /Desc (Binary) /EF << /F 8 0 R >> >> (c) << /Type /Filespec /F (c) >>] >>",
    );
    b.object(6, "<< /Type /Filespec /F (a.txt) /EF << /F 7 0 R >> >>");
    b.flate_stream(7, "/Type /EmbeddedFile /Subtype /text#2Fplain", b"hello");
    b.stream(8, "/Type /EmbeddedFile", &[0, 1]);
    b.xref_section("/Root 1 0 R");
    let doc = PDFDocument::new(b.build()).unwrap();

    let keys: Vec<Vec<u8>> = doc.name_tree("EmbeddedFiles").into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, [b"a.txt".to_vec(), b"b".to_vec(), b"c".to_vec()]);

    // the entry without /EF is skipped
    let files = doc.embedded_files();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].filename, "a.txt");
    assert_eq!(files[0].mime_type.as_deref(), Some("text/plain"));
    assert_eq!(files[0].data.as_ref(), b"hello".as_slice());
    assert_eq!(files[1].name, "b");
    assert_eq!(files[1].filename, "b.bin");
    assert_eq!(files[1].description.as_deref(), Some("Binary"));
    assert_eq!(files[1].data.as_ref(), [0, 1]);
}

#[test]
fn object_stream_nested_in_another_is_refused() {
    let mut b = PdfBuilder::new();
    catalog(&mut b, &[]);
    b.object_stream(4, &[(7, "(seven)")]);
    // the xref then claims 4 is itself packed inside 6
    b.object_stream(6, &[(4, "null")]);
    b.xref_stream(8, "/Root 1 0 R");
    let doc = PDFDocument::new(b.build()).unwrap();

    assert!(matches!(
        doc.xref().get(4).map(|e| &e.location),
        Some(XRefLocation::Compressed { stream_objid: 6, index: 0 })
    ));
    assert!(matches!(doc.object_stream(4), Err(PdfError::MalformedStructure(_))));
    assert!(doc.resolve(7, 0).unwrap().is_null());
}

#[test]
fn reference_chains_are_followed() {
    let mut b = PdfBuilder::new();
    catalog(&mut b, &[]);
    b.object(3, "4 0 R");
    b.object(4, "5 0 R");
    b.object(5, "42");
    b.xref_section("/Root 1 0 R");
    let data = b.build();

    let doc = PDFDocument::new(&data).unwrap();
    let end = doc.resolve_deep(&PDFObject::Ref(PDFObjRef::new(3, 0))).unwrap();
    assert_eq!(end.as_ref(), &PDFObject::Int(42));

    let shallow = PDFDocument::with_options(&data, ParseOptions::new().max_ref_depth(1)).unwrap();
    assert!(matches!(
        shallow.resolve_deep(&PDFObject::Ref(PDFObjRef::new(3, 0))),
        Err(PdfError::MalformedStructure(_))
    ));
}

#[test]
fn document_is_shareable_across_threads() {
    let doc = Arc::new(PDFDocument::new(multi_page(&["x", "y"])).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let doc = Arc::clone(&doc);
            std::thread::spawn(move || doc.page_count())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 2);
    }
}
