use std::sync::Arc;

use crate::model::{Block, BlockKind, Placement};

use super::RenderContext;
use super::canvas::{Canvas, Surface};
use super::chrome;
use super::image::PreparedImage;
use super::layout;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageState {
    BeforeFirstPage,
    OnPage(u32),
}

/// Running position of the paginator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cursor {
    pub state: PageState,
    pub y: f32,
}

impl Cursor {
    pub fn page_number(&self) -> u32 {
        match self.state {
            PageState::BeforeFirstPage => 0,
            PageState::OnPage(n) => n,
        }
    }
}

/// Pages drawn by a finished paginator.
pub(crate) struct Layout {
    pub(crate) surface: Surface,
    pub(crate) placements: Vec<Placement>,
}

/// Places blocks top to bottom, breaking to a fresh page whenever the next
/// atomic unit would cross the bottom margin.
pub(crate) struct Paginator<'a> {
    ctx: &'a RenderContext<'a>,
    surface: Surface,
    cursor: Cursor,
    placements: Vec<Placement>,
}

impl<'a> Paginator<'a> {
    pub(crate) fn new(ctx: &'a RenderContext<'a>) -> Self {
        Paginator {
            ctx,
            surface: Surface::new(),
            cursor: Cursor {
                state: PageState::BeforeFirstPage,
                y: ctx.config.page.content_top(),
            },
            placements: Vec::new(),
        }
    }

    pub(crate) fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn content_width(&self) -> f32 {
        self.ctx.config.page.content_width()
    }

    fn content_top(&self) -> f32 {
        self.ctx.config.page.content_top()
    }

    fn at_page_top(&self) -> bool {
        self.cursor.y <= self.content_top()
    }

    /// Open the next physical page and repaint its chrome. Used for the first
    /// page as well as for every later break.
    fn transition_to_next_page(&mut self) {
        let next = self.cursor.page_number() + 1;
        self.surface.push_page(Canvas::new(self.ctx.config.page));
        chrome::paint(self.ctx, &mut self.surface, next);
        self.cursor = Cursor {
            state: PageState::OnPage(next),
            y: self.content_top(),
        };
        log::debug!("Opened page {next}");
    }

    /// Make room for `required` units and return the origin to draw at.
    ///
    /// Breaks at most once. A block taller than a whole page is placed at the
    /// top of a fresh page and allowed to overflow.
    pub(crate) fn ensure_space(&mut self, required: f32) -> f32 {
        let bottom = self.ctx.config.page.content_bottom();
        match self.cursor.state {
            PageState::BeforeFirstPage => self.transition_to_next_page(),
            PageState::OnPage(_) if self.cursor.y + required > bottom && !self.at_page_top() => {
                self.transition_to_next_page()
            }
            PageState::OnPage(_) => {}
        }
        if self.cursor.y + required > bottom {
            log::warn!(
                "Block of height {required:.1} does not fit on page {} ({:.1} usable); it will overflow the bottom margin",
                self.cursor.page_number(),
                bottom - self.content_top(),
            );
        }
        self.cursor.y
    }

    fn advance(&mut self, kind: BlockKind, top: f32, height: f32) {
        self.cursor.y = top + height;
        self.placements.push(Placement {
            page: self.cursor.page_number(),
            kind,
            top,
            bottom: top + height,
        });
    }

    pub(crate) fn place(&mut self, block: &Block) {
        match block {
            Block::SectionHeader { title } => self.place_section_header(title),
            Block::LabelValue { label, value } => self.place_label_value(label, value),
            Block::TwoColumnPair {
                label1,
                value1,
                label2,
                value2,
            } => self.place_two_column_pair(
                (label1.as_str(), value1.as_str()),
                (label2.as_str(), value2.as_str()),
            ),
            Block::BulletList { items } => self.place_bullet_list(items),
            Block::Image {
                image,
                width,
                height,
                caption,
            } => self.place_image_block(image, (*width, *height), caption.as_deref()),
        }
    }

    pub(crate) fn place_section_header(&mut self, title: &str) {
        let height = layout::section_header_height();
        let top = self.ensure_space(height + layout::keep_with_next_height());
        layout::draw_section_header(self.ctx, self.surface.current(), title, top);
        self.advance(BlockKind::SectionHeader, top, height);
    }

    pub(crate) fn place_label_value(&mut self, label: &str, value: &str) {
        let height = layout::label_value_height(self.ctx, label, value, self.content_width());
        let top = self.ensure_space(height);
        layout::draw_label_value(self.ctx, self.surface.current(), label, value, top);
        self.advance(BlockKind::LabelValue, top, height);
    }

    pub(crate) fn place_two_column_pair(&mut self, left: (&str, &str), right: (&str, &str)) {
        let height = layout::two_column_height(self.ctx, left, right, self.content_width());
        let top = self.ensure_space(height);
        layout::draw_two_column(self.ctx, self.surface.current(), left, right, top);
        self.advance(BlockKind::TwoColumnPair, top, height);
    }

    /// Items are atomic, the list is not.
    pub(crate) fn place_bullet_list(&mut self, items: &[String]) {
        for item in items {
            let height = layout::bullet_item_height(self.ctx, item, self.content_width());
            let top = self.ensure_space(height);
            layout::draw_bullet_item(self.ctx, self.surface.current(), item, top);
            self.advance(BlockKind::BulletItem, top, height);
        }
    }

    pub(crate) fn place_image_block(
        &mut self,
        image: &Arc<PreparedImage>,
        size: (f32, f32),
        caption: Option<&str>,
    ) {
        let height = layout::image_block_height(size.1, caption);
        let top = self.ensure_space(height);
        let name = self.surface.image_name(image);
        layout::draw_image_block(self.ctx, self.surface.current(), &name, size, caption, top);
        self.advance(BlockKind::Image, top, height);
    }

    /// Close the document; an empty block stream still yields one page.
    pub(crate) fn finish(mut self) -> Layout {
        if self.cursor.state == PageState::BeforeFirstPage {
            self.transition_to_next_page();
        }
        Layout {
            surface: self.surface,
            placements: self.placements,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::config::RenderConfig;
    use crate::pdf::chrome::CONTENT_TOP;

    fn ctx(config: &RenderConfig) -> RenderContext<'_> {
        RenderContext::new(config, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    }

    fn png_image() -> Arc<PreparedImage> {
        let img = image::RgbaImage::from_pixel(30, 10, image::Rgba([0, 0, 0, 128]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        Arc::new(PreparedImage::from_bytes(&out.into_inner()).unwrap())
    }

    fn long_item(i: usize) -> String {
        format!(
            "Wunsch {i}: flexible Arbeitszeiten mit der Möglichkeit, an zwei Tagen pro Woche \
             mobil zu arbeiten, sowie ein ergonomischer Arbeitsplatz mit höhenverstellbarem \
             Schreibtisch und einem zweiten Monitor für die Arbeit an umfangreichen Tabellen"
        )
    }

    fn mixed_blocks() -> Vec<Block> {
        let image = png_image();
        let mut blocks = Vec::new();
        for section in 0..12 {
            blocks.push(Block::SectionHeader {
                title: format!("Abschnitt {section}"),
            });
            blocks.push(Block::TwoColumnPair {
                label1: "Vorname".into(),
                value1: "Erika".into(),
                label2: "Nachname".into(),
                value2: long_item(section),
            });
            blocks.push(Block::LabelValue {
                label: "Anschrift".into(),
                value: long_item(section + 100),
            });
            blocks.push(Block::BulletList {
                items: (0..3).map(long_item).collect(),
            });
            blocks.push(Block::Image {
                image: Arc::clone(&image),
                width: 60.0,
                height: 20.0,
                caption: (section % 2 == 0).then(|| "Datum: 01.03.2024".to_string()),
            });
        }
        blocks
    }

    fn paginate(config: &RenderConfig, blocks: &[Block]) -> Layout {
        let ctx = ctx(config);
        let mut paginator = Paginator::new(&ctx);
        for block in blocks {
            paginator.place(block);
        }
        paginator.finish()
    }

    #[test]
    fn starts_before_first_page() {
        let config = RenderConfig::default();
        let ctx = ctx(&config);
        let paginator = Paginator::new(&ctx);
        assert_eq!(paginator.cursor().state, PageState::BeforeFirstPage);
        assert_eq!(paginator.cursor().page_number(), 0);
    }

    #[test]
    fn empty_stream_still_has_one_page() {
        let config = RenderConfig::default();
        let layout = paginate(&config, &[]);
        assert_eq!(layout.surface.page_count(), 1);
        assert!(layout.placements.is_empty());
    }

    #[test]
    fn cursor_is_monotonic_within_a_page() {
        let config = RenderConfig::default();
        let layout = paginate(&config, &mixed_blocks());
        assert!(layout.surface.page_count() > 1);

        let mut prev: Option<Placement> = None;
        for p in &layout.placements {
            assert!(p.bottom >= p.top);
            if let Some(prev) = prev {
                assert!(p.page == prev.page || p.page == prev.page + 1, "{prev:?} -> {p:?}");
                if p.page == prev.page {
                    assert!(p.top >= prev.bottom, "{prev:?} -> {p:?}");
                } else {
                    assert_eq!(p.top, CONTENT_TOP);
                }
            } else {
                assert_eq!(p.page, 1);
            }
            prev = Some(*p);
        }
        assert_eq!(
            layout.placements.last().unwrap().page as usize,
            layout.surface.page_count()
        );
    }

    #[test]
    fn nothing_crosses_the_bottom_margin() {
        let config = RenderConfig::default();
        let bottom = config.page.content_bottom();
        let layout = paginate(&config, &mixed_blocks());
        for p in &layout.placements {
            assert!(p.bottom <= bottom + 1e-3, "{p:?} overflows {bottom}");
        }
    }

    #[test]
    fn pairs_and_images_are_never_split() {
        let config = RenderConfig::default();
        let layout = paginate(&config, &mixed_blocks());
        let atomic = layout
            .placements
            .iter()
            .filter(|p| matches!(p.kind, BlockKind::TwoColumnPair | BlockKind::Image));
        // One placement per atomic block, so 12 pairs + 12 images.
        assert_eq!(atomic.clone().count(), 24);
        for p in atomic {
            assert!(p.bottom <= config.page.content_bottom() + 1e-3);
        }
    }

    #[test]
    fn breaks_before_a_block_that_does_not_fit() {
        let config = RenderConfig::default();
        let ctx = ctx(&config);
        let mut paginator = Paginator::new(&ctx);
        paginator.ensure_space(0.0);
        let bottom = config.page.content_bottom();
        paginator.advance(BlockKind::LabelValue, CONTENT_TOP, bottom - CONTENT_TOP - 5.0);

        let origin = paginator.ensure_space(10.0);
        assert_eq!(origin, CONTENT_TOP);
        assert_eq!(paginator.cursor().state, PageState::OnPage(2));
        assert_eq!(paginator.surface.page_count(), 2);
    }

    #[test]
    fn exact_fit_does_not_break() {
        let config = RenderConfig::default();
        let ctx = ctx(&config);
        let mut paginator = Paginator::new(&ctx);
        let bottom = config.page.content_bottom();
        let origin = paginator.ensure_space(bottom - CONTENT_TOP);
        assert_eq!(origin, CONTENT_TOP);
        assert_eq!(paginator.cursor().page_number(), 1);
    }

    #[test]
    fn oversized_block_is_placed_without_looping() {
        let config = RenderConfig::default();
        let huge = "wort ".repeat(4000);
        let blocks = vec![
            Block::LabelValue {
                label: "Kurz".into(),
                value: "ok".into(),
            },
            Block::LabelValue {
                label: "Riesig".into(),
                value: huge,
            },
            Block::LabelValue {
                label: "Danach".into(),
                value: "weiter".into(),
            },
        ];
        let layout = paginate(&config, &blocks);
        let pages: Vec<u32> = layout.placements.iter().map(|p| p.page).collect();
        // The giant value moves to a fresh page once and overflows there.
        assert_eq!(pages, vec![1, 2, 3]);
        assert_eq!(layout.placements[1].top, CONTENT_TOP);
        assert!(layout.placements[1].bottom > config.page.content_bottom());
        assert_eq!(layout.surface.page_count(), 3);
    }

    #[test]
    fn bullet_items_straddle_pages_individually() {
        let config = RenderConfig::default();
        let items: Vec<String> = (0..40).map(long_item).collect();
        let layout = paginate(&config, &[Block::BulletList { items }]);
        assert!(layout.surface.page_count() > 1);
        assert_eq!(layout.placements.len(), 40);
        assert!(layout.placements.iter().all(|p| p.kind == BlockKind::BulletItem));
        for p in &layout.placements {
            assert!(p.bottom <= config.page.content_bottom() + 1e-3);
        }
    }

    #[test]
    fn header_keeps_some_content_with_it() {
        let config = RenderConfig::default();
        let ctx = ctx(&config);
        let mut paginator = Paginator::new(&ctx);
        paginator.ensure_space(0.0);
        let bottom = config.page.content_bottom();
        // Room for the header and almost, but not quite, a one-line pair.
        let free = layout::section_header_height() + layout::keep_with_next_height() - 0.1;
        paginator.advance(BlockKind::LabelValue, CONTENT_TOP, bottom - CONTENT_TOP - free);
        paginator.place_section_header("Bankverbindung");
        paginator.place_two_column_pair(("IBAN", "DE02120300000000202051"), ("BIC", "BYLADEM1001"));

        let header = paginator.placements[1];
        let pair = paginator.placements[2];
        assert_eq!(header.kind, BlockKind::SectionHeader);
        assert_eq!(header.page, 2);
        assert_eq!(header.top, CONTENT_TOP);
        assert_eq!(pair.page, header.page);
    }

    #[test]
    fn wide_top_margin_pushes_content_below_it() {
        let mut config = RenderConfig::default();
        config.page.margin = 45.0;
        let layout = paginate(&config, &mixed_blocks());
        let mut prev_page = 0;
        for p in &layout.placements {
            assert!(p.top >= 45.0, "{p:?} starts above the margin");
            if p.page != prev_page {
                assert_eq!(p.top, 45.0);
                prev_page = p.page;
            }
        }
    }

    #[test]
    fn reservation_covers_the_smallest_following_field() {
        let config = RenderConfig::default();
        let ctx = ctx(&config);
        let width = config.page.content_width();
        let one_line_pair = layout::two_column_height(&ctx, ("A", "x"), ("B", "y"), width);
        let one_line_field = layout::label_value_height(&ctx, "A", "x", width);
        assert!(layout::keep_with_next_height() >= one_line_pair - 1e-4);
        assert!(layout::keep_with_next_height() >= one_line_field - 1e-4);
    }

    #[test]
    fn header_is_never_left_alone_at_a_page_bottom() {
        let config = RenderConfig::default();
        let bottom = config.page.content_bottom();
        // Shift a header through every position near the bottom in small steps.
        for step in 0..200 {
            let ctx = ctx(&config);
            let mut paginator = Paginator::new(&ctx);
            paginator.ensure_space(0.0);
            let filler = bottom - CONTENT_TOP - 40.0 + step as f32 * 0.2;
            paginator.advance(BlockKind::LabelValue, CONTENT_TOP, filler);
            paginator.place_section_header("Steuerdaten");
            paginator.place_two_column_pair(("Steuer-ID", "12345678901"), ("Steuerklasse", "I"));
            let header = paginator.placements[1];
            let pair = paginator.placements[2];
            assert_eq!(header.page, pair.page, "header orphaned with {filler:.1} used");
        }
    }

    #[test]
    fn measuring_is_idempotent_and_leaves_cursor_alone() {
        let config = RenderConfig::default();
        let ctx = ctx(&config);
        let mut paginator = Paginator::new(&ctx);
        paginator.place_label_value("Vorname", "Erika");
        let before = paginator.cursor();
        let width = config.page.content_width();
        let iban = long_item(1);
        let a = layout::two_column_height(&ctx, ("IBAN", iban.as_str()), ("BIC", ""), width);
        let b = layout::two_column_height(&ctx, ("IBAN", iban.as_str()), ("BIC", ""), width);
        assert_eq!(a, b);
        let item = long_item(2);
        let c = layout::bullet_item_height(&ctx, &item, width);
        assert_eq!(c, layout::bullet_item_height(&ctx, &item, width));
        assert_eq!(paginator.cursor(), before);
    }

    #[test]
    fn pair_height_is_max_of_columns() {
        let config = RenderConfig::default();
        let ctx = ctx(&config);
        let width = config.page.content_width();
        let long = long_item(3);
        let short = layout::two_column_height(&ctx, ("A", "x"), ("B", "y"), width);
        let tall = layout::two_column_height(&ctx, ("A", "x"), ("B", long.as_str()), width);
        let swapped = layout::two_column_height(&ctx, ("B", long.as_str()), ("A", "x"), width);
        assert!(tall > short);
        assert_eq!(tall, swapped);
    }
}
