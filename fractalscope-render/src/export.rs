//! PNG export with embedded view metadata (tEXt chunks).

use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use crate::error::RenderError;
use crate::frame::Frame;
use crate::image::RgbImage;

/// Metadata to embed in an exported PNG as tEXt chunks.
#[derive(Debug, Clone)]
pub struct ExportMetadata {
    pub fractal_kind: String,
    pub center_re: f64,
    pub center_im: f64,
    pub scale: f64,
    pub max_iter: u32,
    pub palette: String,
}

impl ExportMetadata {
    pub fn from_frame(frame: &Frame) -> Self {
        let s = &frame.snapshot;
        Self {
            fractal_kind: s.kind.to_string(),
            center_re: s.center.re,
            center_im: s.center.im,
            scale: s.scale,
            max_iter: s.max_iter,
            palette: s.palette.to_string(),
        }
    }
}

/// Write an RGB image as a PNG file with embedded view metadata.
///
/// Uses the `png` crate directly so custom tEXt chunks can be injected.
pub fn export_png(image: &RgbImage, path: &Path, metadata: &ExportMetadata) -> crate::Result<()> {
    let file = std::fs::File::create(path)
        .map_err(|e| RenderError::Export(format!("failed to create {}: {e}", path.display())))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, image.width, image.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    for (key, value) in text_chunks(image, metadata) {
        encoder
            .add_text_chunk(key.clone(), value)
            .map_err(|e| RenderError::Export(format!("failed to add text chunk '{key}': {e}")))?;
    }

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| RenderError::Export(format!("failed to write PNG header: {e}")))?;
    png_writer
        .write_image_data(&image.pixels)
        .map_err(|e| RenderError::Export(format!("failed to write PNG image data: {e}")))?;

    debug!("Exported PNG {}x{} to {}", image.width, image.height, path.display());
    Ok(())
}

fn text_chunks(image: &RgbImage, meta: &ExportMetadata) -> Vec<(String, String)> {
    let description = format!(
        "{} - Center: {} {:+}i, Scale: {:e}, Iterations: {}",
        meta.fractal_kind, meta.center_re, meta.center_im, meta.scale, meta.max_iter,
    );
    vec![
        ("Software".into(), "FractalScope".into()),
        ("Description".into(), description),
        ("FractalScope.Kind".into(), meta.fractal_kind.clone()),
        ("FractalScope.CenterRe".into(), meta.center_re.to_string()),
        ("FractalScope.CenterIm".into(), meta.center_im.to_string()),
        ("FractalScope.Scale".into(), meta.scale.to_string()),
        ("FractalScope.MaxIterations".into(), meta.max_iter.to_string()),
        ("FractalScope.Palette".into(), meta.palette.clone()),
        (
            "FractalScope.Resolution".into(),
            format!("{}x{}", image.width, image.height),
        ),
    ]
}
