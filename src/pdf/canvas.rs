use std::sync::Arc;

use pdf_writer::{Content, Name, Str};

use crate::config::PageGeometry;
use crate::fonts::{FontEntry, to_winansi_bytes};

use super::image::PreparedImage;

const MM_TO_PT: f32 = 72.0 / 25.4;

fn fill_color(content: &mut Content, [r, g, b]: [u8; 3]) {
    content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
}

/// One physical page. Takes top-down coordinates in document units and writes
/// bottom-up points into the page content stream.
pub(crate) struct Canvas {
    pub(super) content: Content,
    geometry: PageGeometry,
}

impl Canvas {
    pub(crate) fn new(geometry: PageGeometry) -> Self {
        Canvas {
            content: Content::new(),
            geometry,
        }
    }

    fn x(&self, x: f32) -> f32 {
        x * MM_TO_PT
    }

    fn y(&self, y: f32) -> f32 {
        (self.geometry.height - y) * MM_TO_PT
    }

    pub(crate) fn fill_rect(&mut self, x: f32, top: f32, width: f32, height: f32, color: [u8; 3]) {
        let (px, py) = (self.x(x), self.y(top + height));
        self.content.save_state();
        fill_color(&mut self.content, color);
        self.content
            .rect(px, py, width * MM_TO_PT, height * MM_TO_PT)
            .fill_nonzero();
        self.content.restore_state();
    }

    /// Horizontal rule of `thickness` whose top edge sits at `y`.
    pub(crate) fn rule(&mut self, x1: f32, x2: f32, y: f32, thickness: f32, color: [u8; 3]) {
        self.fill_rect(x1, y, x2 - x1, thickness, color);
    }

    pub(crate) fn text(
        &mut self,
        x: f32,
        baseline: f32,
        font: &FontEntry,
        font_size: f32,
        color: [u8; 3],
        text: &str,
    ) {
        if text.is_empty() {
            return;
        }
        let (px, py) = (self.x(x), self.y(baseline));
        let bytes = to_winansi_bytes(text);
        self.content.save_state();
        fill_color(&mut self.content, color);
        self.content.begin_text();
        self.content.set_font(Name(font.pdf_name.as_bytes()), font_size);
        self.content.next_line(px, py);
        self.content.show(Str(&bytes));
        self.content.end_text();
        self.content.restore_state();
    }

    pub(crate) fn image(&mut self, name: &str, x: f32, top: f32, width: f32, height: f32) {
        let (px, py) = (self.x(x), self.y(top + height));
        self.content.save_state();
        self.content
            .transform([width * MM_TO_PT, 0.0, 0.0, height * MM_TO_PT, px, py]);
        self.content.x_object(Name(name.as_bytes()));
        self.content.restore_state();
    }
}

/// Every page drawn so far plus the image XObjects they reference.
pub(crate) struct Surface {
    pub(super) pages: Vec<Canvas>,
    pub(super) images: Vec<(String, Arc<PreparedImage>)>,
}

impl Surface {
    pub(crate) fn new() -> Self {
        Surface {
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    pub(crate) fn push_page(&mut self, canvas: Canvas) {
        self.pages.push(canvas);
    }

    pub(crate) fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The page currently receiving ink. Only valid once a page exists.
    pub(crate) fn current(&mut self) -> &mut Canvas {
        self.pages.last_mut().expect("page opened before drawing")
    }

    /// Resource name for `image`, registering it on first use.
    pub(crate) fn image_name(&mut self, image: &Arc<PreparedImage>) -> String {
        if let Some((name, _)) = self.images.iter().find(|(_, i)| Arc::ptr_eq(i, image)) {
            return name.clone();
        }
        let name = format!("Im{}", self.images.len() + 1);
        self.images.push((name.clone(), Arc::clone(image)));
        name
    }
}
