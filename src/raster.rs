// Fit-to-viewport raster scaling. Decodes with a guessed-format fallback and
// downscales with fast_image_resize; images already inside the bounds pass
// through untouched so thumbnails are never upscaled.

use fast_image_resize::images::Image as FastImage;
use fast_image_resize::{PixelType, ResizeOptions, Resizer};
use std::io::Cursor;

use crate::{Error, Result};

pub struct FittedRaster {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub fn fit_to_viewport(bytes: &[u8], max_width: u32, max_height: u32) -> Result<FittedRaster> {
    if max_width == 0 || max_height == 0 {
        return Err(Error::Resize("target dimensions are zero".to_string()));
    }

    // If magic-byte sniffing fails (IO error), fall back to a fresh reader
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .unwrap_or_else(|_| image::ImageReader::new(Cursor::new(bytes)));

    let dyn_img = reader.decode().map_err(|e| Error::Decode(e.to_string()))?;
    let (width, height) = (dyn_img.width(), dyn_img.height());
    let rgba = dyn_img.to_rgba8();

    if width <= max_width && height <= max_height {
        return Ok(FittedRaster { rgba: rgba.into_raw(), width, height });
    }

    let scale = (max_width as f32 / width as f32).min(max_height as f32 / height as f32);
    let new_width = ((width as f32 * scale).round() as u32).max(1);
    let new_height = ((height as f32 * scale).round() as u32).max(1);

    let src = FastImage::from_vec_u8(width, height, rgba.into_raw(), PixelType::U8x4)
        .map_err(|e| Error::Resize(e.to_string()))?;
    let mut dst = FastImage::new(new_width, new_height, PixelType::U8x4);

    let mut resizer = Resizer::new();
    resizer
        .resize(&src, &mut dst, &ResizeOptions::default())
        .map_err(|e| Error::Resize(e.to_string()))?;

    Ok(FittedRaster { rgba: dst.buffer().to_vec(), width: new_width, height: new_height })
}
