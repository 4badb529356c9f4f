//! Text and image extraction end to end.

mod common;

use common::{HELVETICA, PdfBuilder, catalog, multi_page, single_page};
use folio_core::api::{ExtractOptions, extract_images, extract_pages_text, extract_text_runs};
use folio_core::{PDFDocument, TextRun, extract_text};

fn listing(runs: &[TextRun]) -> String {
    runs.iter()
        .map(|r| {
            let (x, y) = r.origin();
            format!(
                "p{} ({x:.1}, {y:.1}) {:.1} {}: {}",
                r.page_index,
                r.scaled_size(),
                r.font.as_deref().unwrap_or("-"),
                r.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn hello_on_page_zero() {
    let data = single_page("BT /F1 12 Tf (Hello) Tj ET");
    assert_eq!(extract_text(&data, None).unwrap(), "Hello\n\x0c");

    let doc = PDFDocument::new(&data).unwrap();
    let runs = extract_text_runs(&doc, &ExtractOptions::default()).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].page_index, 0);
    assert_eq!(runs[0].text, "Hello");
    assert_eq!(runs[0].size, 12.0);
}

#[test]
fn positioned_runs_snapshot() {
    let data = single_page(
        "BT /F1 12 Tf 72 720 Td (Hello) Tj 14 TL T* [(W) 120 (orld)] TJ \
         /F1 9 Tf 0 -40 Td (caf\\351) Tj ET \
         q 2 0 0 2 100 100 cm BT /F1 10 Tf (big) Tj ET Q",
    );
    let doc = PDFDocument::new(&data).unwrap();
    let runs = extract_text_runs(&doc, &ExtractOptions::default()).unwrap();
    insta::assert_snapshot!(listing(&runs), @r"
    p0 (72.0, 720.0) 12.0 Helvetica: Hello
    p0 (72.0, 706.0) 12.0 Helvetica: World
    p0 (72.0, 666.0) 9.0 Helvetica: café
    p0 (100.0, 100.0) 20.0 Helvetica: big
    ");
}

#[test]
fn plain_text_layout() {
    let data = single_page(
        "BT /F1 10 Tf 72 700 Td (Two) Tj 20 0 Td (words) Tj ET \
         BT /F1 10 Tf 72 680 Td (next line) Tj ET",
    );
    assert_eq!(extract_text(&data, None).unwrap(), "Two words\nnext line\n\x0c");
}

#[test]
fn type0_font_with_tounicode() {
    let tounicode = "/CIDInit /ProcSet findresource begin 12 dict begin begincmap \
        /CMapName /Test-UCS def 1 begincodespacerange <0000> <FFFF> endcodespacerange \
        2 beginbfchar <0041> <0041> <0042> <0042> endbfchar \
        1 beginbfrange <0010> <0012> <0078> endbfrange endcmap end end";
    let mut b = PdfBuilder::new();
    catalog(&mut b, &[3]);
    b.object(
        3,
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R /Resources << /Font << /F2 5 0 R >> >> >>",
    );
    b.stream(4, "", b"BT /F2 12 Tf <00410042> Tj <001000110012> Tj ET");
    b.object(
        5,
        "<< /Type /Font /Subtype /Type0 /BaseFont /ABCDEF+Test /Encoding /Identity-H \
         /DescendantFonts [6 0 R] /ToUnicode 7 0 R >>",
    );
    b.object(
        6,
        "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /ABCDEF+Test /DW 500 \
         /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> >>",
    );
    b.stream(7, "", tounicode.as_bytes());
    b.xref_section("/Root 1 0 R");

    let doc = PDFDocument::new(b.build()).unwrap();
    let runs = extract_text_runs(&doc, &ExtractOptions::default()).unwrap();
    let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, ["AB", "xyz"]);
    // two glyphs at DW 500, size 12
    assert!((runs[0].width - 12.0).abs() < 1e-9);
}

/// One page drawing `content` with the given font dictionary as `/F2`
/// (object 5) and its descendant (object 6), when there is one.
fn type0_page(content: &[u8], font: &str, descendant: Option<&str>) -> PDFDocument {
    let mut b = PdfBuilder::new();
    catalog(&mut b, &[3]);
    b.object(
        3,
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R /Resources << /Font << /F2 5 0 R >> >> >>",
    );
    b.stream(4, "", content);
    b.object(5, font);
    if let Some(d) = descendant {
        b.object(6, d);
    }
    b.xref_section("/Root 1 0 R");
    PDFDocument::new(b.build()).unwrap()
}

fn run_texts(doc: &PDFDocument) -> Vec<String> {
    extract_text_runs(doc, &ExtractOptions::default())
        .unwrap()
        .into_iter()
        .map(|r| r.text)
        .collect()
}

#[test]
fn identity_named_tounicode_and_one_byte_cmap() {
    let doc = type0_page(
        b"BT /F2 10 Tf <00410042> Tj ET",
        "<< /Type /Font /Subtype /Type0 /BaseFont /X /Encoding /DLIdent-H \
         /DescendantFonts [6 0 R] /ToUnicode /Identity-H >>",
        Some("<< /Type /Font /Subtype /CIDFontType0 /BaseFont /X >>"),
    );
    assert_eq!(run_texts(&doc), ["AB"]);

    let doc = type0_page(
        b"BT /F2 10 Tf (AB) Tj ET",
        "<< /Type /Font /Subtype /Type0 /BaseFont /X /Encoding /OneByteIdentityH \
         /DescendantFonts [6 0 R] /ToUnicode /Identity-H >>",
        Some("<< /Type /Font /Subtype /CIDFontType0 /BaseFont /X >>"),
    );
    assert_eq!(run_texts(&doc), ["AB"]);
}

#[test]
fn adobe_ucs_cids_are_unicode_without_tounicode() {
    let doc = type0_page(
        b"BT /F2 10 Tf <00E90041> Tj ET",
        "<< /Type /Font /Subtype /Type0 /BaseFont /X /Encoding /Identity-H /DescendantFonts [6 0 R] >>",
        Some(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /X \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> >>",
        ),
    );
    assert_eq!(run_texts(&doc), ["\u{e9}A"]);
}

#[test]
fn widths_near_the_code_limit_are_dropped() {
    let doc = type0_page(
        b"BT /F2 10 Tf (AB) Tj ET",
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding \
         /FirstChar 4294967295 /Widths [1 2] >>",
        None,
    );
    let runs = extract_text_runs(&doc, &ExtractOptions::default()).unwrap();
    assert_eq!(runs[0].text, "AB");

    let doc = type0_page(
        b"BT /F2 10 Tf <0041> Tj ET",
        "<< /Type /Font /Subtype /Type0 /BaseFont /X /Encoding /Identity-H \
         /DescendantFonts [6 0 R] /ToUnicode /Identity-H >>",
        Some("<< /Type /Font /Subtype /CIDFontType2 /BaseFont /X /W [4294967295 [100 200] 65 [300]] >>"),
    );
    let runs = extract_text_runs(&doc, &ExtractOptions::default()).unwrap();
    assert_eq!(runs[0].text, "A");
    assert!((runs[0].width - 3.0).abs() < 1e-9);
}

#[test]
fn unknown_font_keeps_the_previous_one() {
    let data = single_page("BT /F1 12 Tf (one) Tj /F9 10 Tf ( two) Tj ET");
    let doc = PDFDocument::new(&data).unwrap();
    let runs = extract_text_runs(&doc, &ExtractOptions::default()).unwrap();
    let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, ["one", " two"]);
    assert_eq!(runs[1].font.as_deref(), Some("Helvetica"));
    assert_eq!(runs[1].size, 10.0);
}

#[test]
fn differences_and_unmapped_codes() {
    let mut b = PdfBuilder::new();
    catalog(&mut b, &[3]);
    b.object(
        3,
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>",
    );
    b.stream(4, "", b"BT /F1 12 Tf <01020381> Tj ET");
    b.object(
        5,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Custom \
         /Encoding << /BaseEncoding /WinAnsiEncoding /Differences [1 /fi /Euro /uni00E9] >> >>",
    );
    b.xref_section("/Root 1 0 R");
    let doc = PDFDocument::new(b.build()).unwrap();
    let runs = extract_text_runs(&doc, &ExtractOptions::default()).unwrap();
    assert_eq!(runs[0].text, "\u{FB01}€é\u{FFFD}");
}

#[test]
fn page_selection() {
    let data = multi_page(&["one", "two", "three"]);
    let doc = PDFDocument::new(&data).unwrap();

    let pages = extract_pages_text(&doc, &ExtractOptions::new().page_numbers([2, 0])).unwrap();
    let got: Vec<(usize, &str)> = pages.iter().map(|(i, t)| (*i, t.as_str())).collect();
    assert_eq!(got, [(0, "one\n\x0c"), (2, "three\n\x0c")]);

    let pages = extract_pages_text(&doc, &ExtractOptions::new().maxpages(2)).unwrap();
    assert_eq!(pages.len(), 2);

    let pages = extract_pages_text(&doc, &ExtractOptions::new().page_numbers([7, 1])).unwrap();
    assert_eq!(pages, [(1, "two\n\x0c".to_string())]);

    let pages =
        extract_pages_text(&doc, &ExtractOptions::new().page_numbers([0, 1, 2]).maxpages(2)).unwrap();
    let got: Vec<usize> = pages.iter().map(|(i, _)| *i).collect();
    assert_eq!(got, [0, 1]);

    let threaded = extract_pages_text(&doc, &ExtractOptions::new().threads(3)).unwrap();
    let serial = extract_pages_text(&doc, &ExtractOptions::new()).unwrap();
    assert_eq!(threaded, serial);
}

#[test]
fn form_xobjects_and_recursion_guard() {
    let mut b = PdfBuilder::new();
    catalog(&mut b, &[3]);
    b.object(
        3,
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> /XObject << /Fm1 6 0 R >> >> >>",
    );
    b.stream(4, "", b"/Fm1 Do");
    b.object(5, HELVETICA);
    b.stream(
        6,
        "/Type /XObject /Subtype /Form /BBox [0 0 100 100] /Matrix [1 0 0 1 10 20] \
         /Resources << /Font << /F1 5 0 R >> /XObject << /Self 6 0 R >> >>",
        b"BT /F1 8 Tf (inside) Tj ET /Self Do",
    );
    b.xref_section("/Root 1 0 R");
    let doc = PDFDocument::new(b.build()).unwrap();
    let runs = extract_text_runs(&doc, &ExtractOptions::default()).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].text, "inside");
    assert_eq!(runs[0].origin(), (10.0, 20.0));
}

#[test]
fn images_with_metadata() {
    let jpeg = hex::decode("ffd8ffe000104a464946").unwrap();
    let mut b = PdfBuilder::new();
    catalog(&mut b, &[3]);
    b.object(
        3,
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R \
         /Resources << /XObject << /Im1 5 0 R /Im2 6 0 R >> >> >>",
    );
    b.stream(4, "", b"q 50 0 0 40 10 10 cm /Im1 Do Q /Im2 Do BI /W 2 /H 1 /BPC 1 /IM true ID \x80\x40 EI");
    b.stream(
        5,
        "/Type /XObject /Subtype /Image /Width 4 /Height 4 /ColorSpace /DeviceRGB \
         /BitsPerComponent 8 /Filter /DCTDecode",
        &jpeg,
    );
    b.flate_stream(
        6,
        "/Type /XObject /Subtype /Image /Width 2 /Height 2 /ColorSpace [/ICCBased 7 0 R] /BitsPerComponent 8",
        &[0, 64, 128, 255],
    );
    b.stream(7, "/N 1", b"");
    b.xref_section("/Root 1 0 R");
    let doc = PDFDocument::new(b.build()).unwrap();

    let images = extract_images(&doc, &ExtractOptions::default()).unwrap();
    assert_eq!(images.len(), 3);

    let dct = &images[0];
    assert_eq!((dct.name.as_str(), dct.width, dct.height), ("Im1", 4, 4));
    assert_eq!(dct.filter.as_deref(), Some("DCTDecode"));
    assert_eq!(dct.data.as_ref(), jpeg.as_slice());
    assert_eq!(dct.ctm, (50.0, 0.0, 0.0, 40.0, 10.0, 10.0));

    let flate = &images[1];
    assert_eq!(flate.filter, None);
    assert_eq!(flate.color_space.as_deref(), Some("ICCBased"));
    assert_eq!(flate.data.as_ref(), [0, 64, 128, 255]);

    let inline = &images[2];
    assert!(inline.image_mask);
    assert_eq!(inline.bits_per_component, 1);
    assert_eq!(inline.data.as_ref(), [0x80, 0x40]);

    let decoded_only = extract_images(&doc, &ExtractOptions::new().include_raw_images(false)).unwrap();
    assert_eq!(decoded_only.len(), 2);
}

#[test]
fn broken_content_still_yields_text() {
    let data = single_page("BT /F1 12 Tf (before) Tj ] >> ) (after) Tj /Unknown 3 xyz ET");
    let doc = PDFDocument::new(&data).unwrap();
    let runs = extract_text_runs(&doc, &ExtractOptions::default()).unwrap();
    let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, ["before", "after"]);
}
