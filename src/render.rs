//! Rasterizing the source artwork into one icon canvas.
//!
//! The whole source image is scaled into the largest centered square that
//! fits the canvas.  For square canvases that square is the canvas itself,
//! so the source fills it exactly and its own aspect ratio is discarded.
//! For rectangular canvases the longer axis keeps transparent bands of
//! `|width - height| / 2` pixels on either side.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::io;

use crate::error::{Error, Result};
use crate::iconspec::PixelSize;
use crate::raster::{Image, PixelFormat};

/// Resampling filter used for every icon.
const FILTER: FilterType = FilterType::Lanczos3;

/// Longest canvas edge that will be rendered, in pixels.
pub const MAX_EDGE: u32 = 16_384;

/// Returns true if a canvas of `size` can be rendered: it has pixels and no
/// edge is longer than [`MAX_EDGE`].
pub fn is_renderable(size: PixelSize) -> bool {
    !size.is_empty() && size.width <= MAX_EDGE && size.height <= MAX_EDGE
}

/// Renders `source` into a canvas of `size` pixels.  Returns `None` when the
/// target has zero area or an edge longer than [`MAX_EDGE`].
pub fn render(source: &Image, size: PixelSize) -> Result<Option<Image>> {
    if !is_renderable(size) {
        return Ok(None);
    }
    if source.is_empty() {
        return Err(Error::EmptySource);
    }
    let source = to_rgba_buffer(source)?;

    let side = size.width.min(size.height);
    let scaled = if source.dimensions() == (side, side) {
        source
    } else {
        imageops::resize(&source, side, side, FILTER)
    };

    let canvas = if size.is_square() {
        scaled
    } else {
        let mut canvas = RgbaImage::new(size.width, size.height);
        let x = (size.width - side) / 2;
        let y = (size.height - side) / 2;
        imageops::replace(&mut canvas, &scaled, i64::from(x), i64::from(y));
        canvas
    };

    let (width, height) = canvas.dimensions();
    Ok(Some(Image::from_data(PixelFormat::RGBA, width, height,
                             canvas.into_raw())?))
}

/// Renders and PNG-encodes one icon.  Returns `None` when
/// [`is_renderable`] rejects the target.
pub fn render_png(source: &Image, size: PixelSize) -> Result<Option<Vec<u8>>> {
    match render(source, size)? {
        Some(icon) => Ok(Some(icon.to_png_bytes()?)),
        None => Ok(None),
    }
}

fn to_rgba_buffer(source: &Image) -> Result<RgbaImage> {
    let rgba = source.to_rgba();
    let (width, height) = (rgba.width(), rgba.height());
    RgbaImage::from_raw(width, height, rgba.into_data()).ok_or_else(|| {
        Error::Io(io::Error::new(io::ErrorKind::InvalidData,
                                 "pixel buffer does not match dimensions"))
    })
}
