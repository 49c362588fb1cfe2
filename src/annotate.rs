//! Drawing of detection boxes and their captions onto frames.

use crate::constants::annotate::{
    BORDER_THICKNESS, CAPTION_PADDING, FILL_ALPHA, FONT_CANDIDATES,
};
use crate::detection::{BoundingBox, DetectionRecord, TargetFilter, display_label};
use crate::error::{Error, Result};
use crate::frames::FrameBuffer;
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stable colour per class id.
///
/// Colours are derived from the class id alone, so the same class gets the
/// same colour across runs. The palette grows when a larger id shows up.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colours: Vec<Rgb<u8>>,
}

impl Palette {
    /// Palette pre-filled for `classes` class ids.
    pub fn new(classes: usize) -> Self {
        let mut palette = Self::default();
        palette.grow(classes);
        palette
    }

    /// Number of colours currently held.
    pub fn len(&self) -> usize {
        self.colours.len()
    }

    /// Whether no colour has been generated yet.
    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    /// Colour for `class_id`, growing the palette if needed.
    pub fn colour(&mut self, class_id: usize) -> Rgb<u8> {
        if class_id >= self.colours.len() {
            self.grow(class_id + 1);
        }
        self.colours[class_id]
    }

    fn grow(&mut self, len: usize) {
        while self.colours.len() < len {
            let id = self.colours.len();
            self.colours.push(class_colour(id));
        }
    }
}

/// Hue stepped by the golden ratio so neighbouring ids stay distinguishable.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn class_colour(id: usize) -> Rgb<u8> {
    const GOLDEN: f32 = 0.618_034;
    let hue = (id as f32 * GOLDEN).fract() * 6.0;
    let x = 1.0 - (hue % 2.0 - 1.0).abs();
    let (r, g, b) = match hue as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    // Value 0.9, saturation 0.8.
    let channel = |c: f32| ((0.18 + 0.72 * c) * 255.0).round() as u8;
    Rgb([channel(r), channel(g), channel(b)])
}

/// Draw `bbox` onto `image`: a translucent fill and a solid border.
///
/// The box is clamped to the image; boxes fully outside it draw nothing.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
pub fn draw_detection(image: &mut RgbImage, bbox: BoundingBox, colour: Rgb<u8>) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let max_x = (width - 1) as i32;
    let max_y = (height - 1) as i32;

    if bbox.x2 < 0 || bbox.y2 < 0 || bbox.x1 > max_x || bbox.y1 > max_y {
        return;
    }
    let x1 = bbox.x1.clamp(0, max_x) as u32;
    let y1 = bbox.y1.clamp(0, max_y) as u32;
    let x2 = bbox.x2.clamp(0, max_x) as u32;
    let y2 = bbox.y2.clamp(0, max_y) as u32;
    if x2 < x1 || y2 < y1 {
        return;
    }

    for y in y1..=y2 {
        for x in x1..=x2 {
            let on_border = x - x1 < BORDER_THICKNESS
                || x2 - x < BORDER_THICKNESS
                || y - y1 < BORDER_THICKNESS
                || y2 - y < BORDER_THICKNESS;
            let pixel = image.get_pixel_mut(x, y);
            *pixel = if on_border {
                colour
            } else {
                blend(*pixel, colour, FILL_ALPHA)
            };
        }
    }
}

/// Font used for box captions, loaded from a TrueType/OpenType file.
pub struct CaptionFont {
    font: FontVec,
    scale: PxScale,
    path: PathBuf,
}

impl fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptionFont")
            .field("path", &self.path)
            .field("size", &self.scale.y)
            .finish_non_exhaustive()
    }
}

impl CaptionFont {
    /// Load the font at `path`, rendering captions `size` pixels high.
    pub fn load(path: &Path, size: f32) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::FontRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let font = FontVec::try_from_vec(bytes).map_err(|e| Error::InvalidFont {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            font,
            scale: PxScale::from(size),
            path: path.to_path_buf(),
        })
    }

    /// First usable font among the common system locations.
    pub fn discover(size: f32) -> Option<Self> {
        FONT_CANDIDATES.iter().find_map(|candidate| {
            match Self::load(Path::new(candidate), size) {
                Ok(font) => Some(font),
                Err(e) => {
                    debug!("Caption font candidate skipped: {e}");
                    None
                }
            }
        })
    }

    /// File the font was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Draw `text` on a `colour` label just above `bbox`, or inside its top
/// edge when there is no room above.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn draw_caption(
    image: &mut RgbImage,
    bbox: BoundingBox,
    text: &str,
    colour: Rgb<u8>,
    font: &CaptionFont,
) {
    let (text_width, text_height) = text_size(font.scale, &font.font, text);
    let label_width = text_width as i32 + 2 * CAPTION_PADDING;
    let label_height = text_height as i32 + 2 * CAPTION_PADDING;

    let x = bbox.x1.max(0);
    let y = if bbox.y1 >= label_height {
        bbox.y1 - label_height
    } else {
        bbox.y1.max(0)
    };

    draw_filled_rect_mut(
        image,
        Rect::at(x, y).of_size(label_width as u32, label_height as u32),
        colour,
    );
    draw_text_mut(
        image,
        text_colour(colour),
        x + CAPTION_PADDING,
        y + CAPTION_PADDING,
        font.scale,
        &font.font,
        text,
    );
}

/// Black on light labels, white on dark ones.
fn text_colour(background: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b] = background.0.map(u32::from);
    if r * 299 + g * 587 + b * 114 > 128_000 {
        Rgb([0, 0, 0])
    } else {
        Rgb([255, 255, 255])
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(base: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let mix = |b: u8, o: u8| {
        f32::from(o)
            .mul_add(alpha, f32::from(b) * (1.0 - alpha))
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Rgb([
        mix(base[0], over[0]),
        mix(base[1], over[1]),
        mix(base[2], over[2]),
    ])
}

/// Draw every record onto `image`, coloured by class.
///
/// With a `font`, each box is captioned with its label and confidence.
pub fn annotate(
    image: &mut RgbImage,
    records: &[DetectionRecord],
    palette: &mut Palette,
    font: Option<&CaptionFont>,
) {
    for record in records {
        draw_record(image, record, record.bbox, palette, font);
    }
}

fn draw_record(
    image: &mut RgbImage,
    record: &DetectionRecord,
    bbox: BoundingBox,
    palette: &mut Palette,
    font: Option<&CaptionFont>,
) {
    let colour = palette.colour(record.class_id);
    draw_detection(image, bbox, colour);
    if let Some(font) = font {
        let caption = display_label(&record.label, record.confidence);
        draw_caption(image, bbox, &caption, colour, font);
    }
}

/// Redraw the latest frame with the detections selected by `filter`.
///
/// Starts from the buffered original so deselected boxes disappear. Boxes
/// are in the coordinates of the processed frame and are scaled to the
/// original's size. Returns `None` when the buffer is empty.
pub fn render_selection(
    frames: &FrameBuffer,
    filter: TargetFilter,
    palette: &mut Palette,
    font: Option<&CaptionFont>,
) -> Option<RgbImage> {
    let frame = frames.latest()?;
    let mut image = frame.original.clone();

    let (width, height) = frame.original.dimensions();
    let (src_width, src_height) = frame.processed.dimensions();
    let sx = f64::from(width) / f64::from(src_width.max(1));
    let sy = f64::from(height) / f64::from(src_height.max(1));

    for (index, record) in frame.detections.iter().enumerate() {
        if filter.accepts(index) {
            draw_record(&mut image, record, record.bbox.scaled(sx, sy), palette, font);
        }
    }
    Some(image)
}
