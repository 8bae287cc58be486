//! Canvas persistence.
//!
//! The output format follows the destination extension. JPEG output honours
//! a quality setting; every other format uses the `image` crate defaults.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use image::{ImageFormat, codecs::jpeg::JpegEncoder};

use crate::compositor::Canvas;
use crate::error::GridError;

/// Write `canvas` to `path`, creating missing parent directories.
///
/// An existing file at `path` is overwritten.
///
/// # Errors
///
/// Returns [`GridError::OutputWrite`] if the extension names no supported
/// image format, the directory cannot be created, or encoding fails.
///
/// # Example
///
/// ```no_run
/// use looking_glass::{Canvas, GridError, encode};
///
/// let canvas = Canvas::new(1024, 1024);
/// encode::save_canvas(&canvas, "outputs/blank.jpg", 90)?;
/// # Ok::<(), GridError>(())
/// ```
pub fn save_canvas<P: AsRef<Path>>(
    canvas: &Canvas,
    path: P,
    jpeg_quality: u8,
) -> Result<(), GridError> {
    let path = path.as_ref();
    let write_error = |reason: String| GridError::OutputWrite {
        path: path.to_path_buf(),
        reason,
    };

    let format = ImageFormat::from_path(path).map_err(|error| write_error(error.to_string()))?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| {
            write_error(format!("cannot create {}: {error}", parent.display()))
        })?;
    }

    log::debug!(
        "Encoding {}x{} canvas as {:?} to {}",
        canvas.width(),
        canvas.height(),
        format,
        path.display()
    );

    match format {
        ImageFormat::Jpeg => {
            let file = File::create(path).map_err(|error| write_error(error.to_string()))?;
            let mut writer = BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(&mut writer, jpeg_quality.clamp(1, 100));
            canvas
                .write_with_encoder(encoder)
                .map_err(|error| write_error(error.to_string()))?;
            writer.flush().map_err(|error| write_error(error.to_string()))?;
        }
        other => canvas
            .save_with_format(path, other)
            .map_err(|error| write_error(error.to_string()))?,
    }

    Ok(())
}
