use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Fixed page geometry in document units (millimetres).
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry {
            width: 210.0,
            height: 297.0,
            margin: 15.0,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// First y available to content: below the header band, and never above
    /// the top margin.
    pub fn content_top(&self) -> f32 {
        crate::pdf::chrome::CONTENT_TOP.max(self.margin)
    }

    /// Lowest y any block may reach.
    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Theme {
    pub background: [u8; 3],
    pub header_fill: [u8; 3],
    pub header_text: [u8; 3],
    pub accent: [u8; 3],
    pub text: [u8; 3],
    pub muted: [u8; 3],
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: [250, 249, 246],
            header_fill: [28, 52, 84],
            header_text: [255, 255, 255],
            accent: [196, 146, 58],
            text: [33, 37, 41],
            muted: [120, 126, 133],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub page: PageGeometry,
    pub title: String,
    pub theme: Theme,
    /// PNG or JPEG drawn at the left of every header band.
    pub brand_mark: Option<PathBuf>,
    pub compress_streams: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            page: PageGeometry::default(),
            title: "Personalfragebogen".to_string(),
            theme: Theme::default(),
            brand_mark: None,
            compress_streams: true,
        }
    }
}

impl RenderConfig {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: RenderConfig =
            serde_json::from_str(&contents).map_err(|source| Error::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let page = &self.page;
        if !(page.width > 0.0 && page.height > 0.0) {
            return Err(Error::Config(format!(
                "page size must be positive, got {}x{}",
                page.width, page.height
            )));
        }
        if !(page.margin >= 0.0) || page.content_width() <= 0.0 {
            return Err(Error::Config(format!(
                "margin {} leaves no content width on a {} wide page",
                page.margin, page.width
            )));
        }
        if page.content_bottom() <= page.content_top() {
            return Err(Error::Config(format!(
                "page height {} leaves no room below the header band",
                page.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.page.content_width(), 180.0);
        assert_eq!(config.page.content_bottom(), 282.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn content_top_respects_band_and_margin() {
        let mut page = PageGeometry::default();
        assert_eq!(page.content_top(), crate::pdf::chrome::CONTENT_TOP);
        page.margin = 40.0;
        assert_eq!(page.content_top(), 40.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"title": "Stammdaten", "page": {"margin": 20}}"#).unwrap();
        assert_eq!(config.title, "Stammdaten");
        assert_eq!(config.page.margin, 20.0);
        assert_eq!(config.page.width, 210.0);
        assert!(config.compress_streams);
    }

    #[test]
    fn rejects_degenerate_geometry() {
        let mut config = RenderConfig::default();
        config.page.margin = 105.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = RenderConfig::default();
        config.page.height = 40.0;
        assert!(config.validate().is_err());

        let mut config = RenderConfig::default();
        config.page.width = f32::NAN;
        assert!(config.validate().is_err());
    }
}
