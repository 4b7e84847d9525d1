#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use base64::Engine as _;
use chrono::NaiveDate;
use lopdf::content::Content;
use lopdf::{Document, Object};
use personnel_pdf::{Record, RenderConfig};

/// Surface the renderer's page-break and overflow logs under `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

/// A record with only the mandatory fields.
pub fn minimal_record() -> Record {
    Record {
        first_name: "Erika".into(),
        last_name: "Mustermann".into(),
        date_of_birth: "1964-08-12".into(),
        ..Default::default()
    }
}

/// Readable content streams so tests can look at the drawn text.
pub fn plain_config() -> RenderConfig {
    RenderConfig {
        compress_streams: false,
        ..Default::default()
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, _| {
        image::Rgba([0, 0, 0, if x % 2 == 0 { 255 } else { 0 }])
    });
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn png_data_url(width: u32, height: u32) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png_bytes(width, height))
    )
}

/// Output directory: tests/output/<case>/
pub fn output_dir(case: &str) -> PathBuf {
    let dir = PathBuf::from("tests/output").join(case);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Every string shown with `Tj`, per page (1-based), decoded from WinAnsi.
pub fn shown_text(pdf: &[u8]) -> BTreeMap<u32, Vec<String>> {
    let doc = Document::load_mem(pdf).expect("generated PDF parses");
    doc.get_pages()
        .into_iter()
        .map(|(number, page_id)| {
            let data = doc.get_page_content(page_id).expect("page content");
            let content = Content::decode(&data).expect("content stream decodes");
            let strings = content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(bytes, _)) => Some(winansi_to_string(bytes)),
                    _ => None,
                })
                .collect();
            (number, strings)
        })
        .collect()
}

/// How often `operator` occurs in each page's content stream (pages 1-based).
pub fn operator_counts(pdf: &[u8], operator: &str) -> BTreeMap<u32, usize> {
    let doc = Document::load_mem(pdf).expect("generated PDF parses");
    doc.get_pages()
        .into_iter()
        .map(|(number, page_id)| {
            let data = doc.get_page_content(page_id).expect("page content");
            let content = Content::decode(&data).expect("content stream decodes");
            let count = content
                .operations
                .iter()
                .filter(|op| op.operator == operator)
                .count();
            (number, count)
        })
        .collect()
}

/// Colour image XObjects in the file; soft masks are DeviceGray and not counted.
pub fn rgb_image_count(pdf: &[u8]) -> usize {
    let doc = Document::load_mem(pdf).expect("generated PDF parses");
    doc.objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|stream| {
            let name = |key: &[u8]| stream.dict.get(key).and_then(Object::as_name).ok();
            name(b"Subtype") == Some(b"Image".as_slice())
                && name(b"ColorSpace") == Some(b"DeviceRGB".as_slice())
        })
        .count()
}

pub fn page_count(pdf: &[u8]) -> usize {
    Document::load_mem(pdf)
        .expect("generated PDF parses")
        .get_pages()
        .len()
}

/// Latin-1 agrees with WinAnsi for everything the fixtures use.
fn winansi_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Page (1-based) of the first shown string containing `needle`.
pub fn page_of(text: &BTreeMap<u32, Vec<String>>, needle: &str) -> Option<u32> {
    text.iter()
        .find(|(_, strings)| strings.iter().any(|s| s.contains(needle)))
        .map(|(page, _)| *page)
}
