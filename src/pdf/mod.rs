mod canvas;
pub(crate) mod chrome;
pub mod image;
mod layout;
mod paginate;

use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use pdf_writer::{Filter, Name, Pdf, Rect, Ref, TextStr};

use crate::config::RenderConfig;
use crate::error::Error;
use crate::fonts::FontSet;
use crate::model::{Block, Placement, Record};

use self::canvas::Surface;
use self::image::PreparedImage;
use self::paginate::{Layout, Paginator};

pub use self::chrome::CONTENT_TOP;

const MM_TO_PT: f32 = 72.0 / 25.4;

/// Everything measurement and drawing read, passed explicitly to every
/// primitive. Immutable for the duration of a render.
pub struct RenderContext<'a> {
    pub(crate) config: &'a RenderConfig,
    pub(crate) fonts: FontSet,
    pub(crate) today: NaiveDate,
    pub(crate) brand_mark: Option<Arc<PreparedImage>>,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &'a RenderConfig, today: NaiveDate) -> Self {
        RenderContext {
            config,
            fonts: FontSet::helvetica(),
            today,
            brand_mark: None,
        }
    }

    pub fn with_brand_mark(mut self, image: Arc<PreparedImage>) -> Self {
        self.brand_mark = Some(image);
        self
    }
}

/// A finished document.
#[derive(Debug)]
pub struct Rendered {
    pub pdf: Vec<u8>,
    pub file_name: String,
    pub page_count: usize,
    pub placements: Vec<Placement>,
}

/// Best effort: an unreadable brand mark is logged and left out.
fn load_brand_mark(path: &Path) -> Option<Arc<PreparedImage>> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("Brand mark {} could not be read: {e}", path.display());
            return None;
        }
    };
    match PreparedImage::from_bytes(&data) {
        Ok(img) => Some(Arc::new(img)),
        Err(e) => {
            log::warn!("Brand mark {} skipped: {e}", path.display());
            None
        }
    }
}

fn context<'a>(config: &'a RenderConfig, today: NaiveDate) -> Result<RenderContext<'a>, Error> {
    config.validate()?;
    let ctx = RenderContext::new(config, today);
    Ok(match config.brand_mark.as_deref().and_then(load_brand_mark) {
        Some(mark) => ctx.with_brand_mark(mark),
        None => ctx,
    })
}

/// Render a record into a PDF plus its download file name.
pub fn render_record(
    record: &Record,
    config: &RenderConfig,
    today: NaiveDate,
) -> Result<Rendered, Error> {
    let t0 = std::time::Instant::now();
    let ctx = context(config, today)?;

    let blocks = crate::assemble::build_blocks(record);
    let t_assemble = t0.elapsed();

    let layout = paginate_blocks(&ctx, &blocks);
    let t_layout = t0.elapsed();

    let author = format!("{} {}", record.first_name.trim(), record.last_name.trim());
    let rendered = finish(
        &ctx,
        layout,
        crate::naming::file_name(record, today),
        Some(&author),
    );
    let t_total = t0.elapsed();

    log::info!(
        "Render phases: assemble={:.1}ms, layout={:.1}ms, write={:.1}ms ({} blocks, {} pages, {} bytes)",
        t_assemble.as_secs_f64() * 1000.0,
        (t_layout - t_assemble).as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
        blocks.len(),
        rendered.page_count,
        rendered.pdf.len(),
    );
    Ok(rendered)
}

/// Render an arbitrary block stream with the configured chrome. The file name
/// is derived from the document title.
pub fn render_blocks(
    blocks: &[Block],
    config: &RenderConfig,
    today: NaiveDate,
) -> Result<Rendered, Error> {
    let ctx = context(config, today)?;
    let layout = paginate_blocks(&ctx, blocks);
    let file_name = format!(
        "{}_{}.pdf",
        today.format("%Y-%m-%d"),
        crate::naming::sanitize(&config.title)
    );
    Ok(finish(&ctx, layout, file_name, None))
}

fn paginate_blocks(ctx: &RenderContext, blocks: &[Block]) -> Layout {
    let mut paginator = Paginator::new(ctx);
    for block in blocks {
        paginator.place(block);
    }
    log::debug!(
        "Placed {} blocks, cursor ended on page {}",
        blocks.len(),
        paginator.cursor().page_number()
    );
    paginator.finish()
}

fn finish(
    ctx: &RenderContext,
    layout: Layout,
    file_name: String,
    author: Option<&str>,
) -> Rendered {
    let Layout {
        surface,
        placements,
    } = layout;
    let page_count = surface.page_count();
    Rendered {
        pdf: write_pdf(ctx, surface, author),
        file_name,
        page_count,
        placements,
    }
}

fn write_pdf(ctx: &RenderContext, surface: Surface, author: Option<&str>) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    let font_pairs: Vec<(&str, Ref)> = ctx
        .fonts
        .entries()
        .into_iter()
        .map(|entry| {
            let font_ref = alloc();
            pdf.type1_font(font_ref)
                .base_font(Name(entry.base_font.as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            (entry.pdf_name, font_ref)
        })
        .collect();

    let image_xobjects: Vec<(&str, Ref)> = surface
        .images
        .iter()
        .map(|(name, img)| (name.as_str(), self::image::embed(&mut pdf, img, &mut alloc)))
        .collect();

    let n = surface.pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, canvas) in surface.pages.into_iter().enumerate() {
        let raw = canvas.content.finish();
        if ctx.config.compress_streams {
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            pdf.stream(content_ids[i], &compressed)
                .filter(Filter::FlateDecode);
        } else {
            pdf.stream(content_ids[i], raw.as_slice());
        }
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    let geometry = ctx.config.page;
    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(
            0.0,
            0.0,
            geometry.width * MM_TO_PT,
            geometry.height * MM_TO_PT,
        ))
        .parent(pages_id)
        .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut fonts = resources.fonts();
            for (name, font_ref) in &font_pairs {
                fonts.pair(Name(name.as_bytes()), *font_ref);
            }
        }
        if !image_xobjects.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, xobj_ref) in &image_xobjects {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
    }

    let today = ctx.today;
    let mut info = pdf.document_info(info_id);
    info.title(TextStr(&ctx.config.title))
        .creator(TextStr(concat!("personnel-pdf ", env!("CARGO_PKG_VERSION"))))
        .creation_date(
            pdf_writer::Date::new(today.year() as u16)
                .month(today.month() as u8)
                .day(today.day() as u8),
        );
    if let Some(author) = author {
        info.author(TextStr(author));
    }
    drop(info);

    pdf.finish()
}
