use crate::fonts::{Face, PT_TO_MM};

use super::RenderContext;
use super::canvas::Surface;

pub(crate) const HEADER_BAND_HEIGHT: f32 = 24.0;
const ACCENT_STRIPE: f32 = 0.8;
/// First y below the header band. Wide top margins push content further
/// down, see `PageGeometry::content_top`.
pub const CONTENT_TOP: f32 = 34.0;

const TITLE_SIZE: f32 = 16.0;
const MARKER_SIZE: f32 = 9.0;
const FOOTER_SIZE: f32 = 7.5;
const BRAND_MARK_PADDING: f32 = 5.0;

/// Paint background, header band, page marker and footer on the newest page.
pub(crate) fn paint(ctx: &RenderContext, surface: &mut Surface, page_number: u32) {
    let page = ctx.config.page;
    let theme = &ctx.config.theme;
    let brand = ctx.brand_mark.as_ref().map(|img| {
        let size = img.fit_within(40.0, HEADER_BAND_HEIGHT - 2.0 * BRAND_MARK_PADDING);
        (surface.image_name(img), size)
    });
    let canvas = surface.current();

    canvas.fill_rect(0.0, 0.0, page.width, page.height, theme.background);
    canvas.fill_rect(0.0, 0.0, page.width, HEADER_BAND_HEIGHT, theme.header_fill);
    canvas.fill_rect(0.0, HEADER_BAND_HEIGHT, page.width, ACCENT_STRIPE, theme.accent);

    let mut title_x = page.margin;
    if let Some((name, (w, h))) = brand {
        let top = (HEADER_BAND_HEIGHT - h) / 2.0;
        canvas.image(&name, page.margin, top, w, h);
        title_x += w + BRAND_MARK_PADDING;
    }

    // Vertically centred in the band.
    let band_baseline = HEADER_BAND_HEIGHT / 2.0 + TITLE_SIZE * PT_TO_MM * 0.35;
    canvas.text(
        title_x,
        band_baseline,
        ctx.fonts.face(Face::Bold),
        TITLE_SIZE,
        theme.header_text,
        &ctx.config.title,
    );

    let marker = format!("Seite {page_number}");
    let regular = ctx.fonts.face(Face::Regular);
    let marker_width = regular.text_width(&marker, MARKER_SIZE);
    canvas.text(
        page.width - page.margin - marker_width,
        band_baseline,
        regular,
        MARKER_SIZE,
        theme.header_text,
        &marker,
    );

    let footer = format!("Erstellt am {}", ctx.today.format("%d.%m.%Y"));
    canvas.text(
        page.margin,
        page.height - page.margin / 2.0,
        regular,
        FOOTER_SIZE,
        theme.muted,
        &footer,
    );
}
