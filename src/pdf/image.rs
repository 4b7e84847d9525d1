use std::fmt;

use base64::Engine as _;
use pdf_writer::{Filter, Pdf, Ref};

use crate::error::Error;

pub(crate) enum Encoding {
    /// RGB baseline JPEG, embedded as-is.
    Jpeg(Vec<u8>),
    /// zlib-compressed RGB samples with an optional zlib-compressed alpha mask.
    Flate { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

/// A raster image decoded and re-encoded for embedding, ready before layout.
pub struct PreparedImage {
    pub(crate) pixel_width: u32,
    pub(crate) pixel_height: u32,
    pub(crate) encoding: Encoding,
}

impl fmt::Debug for PreparedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.encoding {
            Encoding::Jpeg(_) => "jpeg",
            Encoding::Flate { alpha: Some(_), .. } => "flate+alpha",
            Encoding::Flate { alpha: None, .. } => "flate",
        };
        write!(f, "PreparedImage({}x{} {kind})", self.pixel_width, self.pixel_height)
    }
}

impl PreparedImage {
    /// Decode PNG or JPEG bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let format = image::guess_format(data).map_err(|e| Error::Image(e.to_string()))?;
        let decoded = image::load_from_memory_with_format(data, format)
            .map_err(|e| Error::Image(e.to_string()))?;
        let (w, h) = (decoded.width(), decoded.height());
        if w == 0 || h == 0 {
            return Err(Error::Image(format!("image has no pixels ({w}x{h})")));
        }

        if format == image::ImageFormat::Jpeg && decoded.color() == image::ColorType::Rgb8 {
            return Ok(PreparedImage {
                pixel_width: w,
                pixel_height: h,
                encoding: Encoding::Jpeg(data.to_vec()),
            });
        }

        let rgba: image::RgbaImage = decoded.to_rgba8();
        let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);
        let rgb_data: Vec<u8> = rgba
            .pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect();
        let alpha = has_alpha.then(|| {
            let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
            miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6)
        });

        Ok(PreparedImage {
            pixel_width: w,
            pixel_height: h,
            encoding: Encoding::Flate {
                rgb: miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6),
                alpha,
            },
        })
    }

    /// Decode a `data:image/...;base64,` URL or bare base64 payload.
    pub fn from_source(source: &str) -> Result<Self, Error> {
        let source = source.trim();
        let payload = match source.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| Error::Image("data URL without payload".to_string()))?;
                if !header.ends_with(";base64") {
                    return Err(Error::Image(format!(
                        "unsupported data URL encoding {header:?}"
                    )));
                }
                payload
            }
            None => source,
        };
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| Error::Image(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Height over width.
    pub fn aspect_ratio(&self) -> f32 {
        self.pixel_height as f32 / self.pixel_width as f32
    }

    /// Largest size with this aspect ratio that fits `max_width` x `max_height`.
    pub fn fit_within(&self, max_width: f32, max_height: f32) -> (f32, f32) {
        let ratio = self.aspect_ratio();
        if max_width * ratio <= max_height {
            (max_width, max_width * ratio)
        } else {
            (max_height / ratio, max_height)
        }
    }
}

/// Write `img` as an image XObject (plus soft mask) and return its reference.
pub(crate) fn embed(pdf: &mut Pdf, img: &PreparedImage, alloc: &mut impl FnMut() -> Ref) -> Ref {
    let xobj_ref = alloc();
    let (w, h) = (img.pixel_width as i32, img.pixel_height as i32);

    match &img.encoding {
        Encoding::Jpeg(data) => {
            let mut xobj = pdf.image_xobject(xobj_ref, data);
            xobj.filter(Filter::DctDecode);
            xobj.width(w);
            xobj.height(h);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
        }
        Encoding::Flate { rgb, alpha } => {
            let smask_ref = alpha.as_ref().map(|alpha| {
                let mask_ref = alloc();
                let mut mask = pdf.image_xobject(mask_ref, alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(w);
                mask.height(h);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                mask_ref
            });

            let mut xobj = pdf.image_xobject(xobj_ref, rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w);
            xobj.height(h);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
        }
    }
    xobj_ref
}
