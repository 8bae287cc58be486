//! Internal utility functions.
//!
//! Pixel-plane copying shared by the FFmpeg-backed source.

use ffmpeg_next::frame::Video as VideoFrame;

/// Copy pixel data from an RGB24 FFmpeg frame into a tightly-packed buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3).
/// This strips that padding so the result can be passed directly to
/// [`image::RgbImage::from_raw`].
pub(crate) fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * 3;
    let rows = height as usize;
    let data = video_frame.data(0);

    if stride == row_bytes {
        return data[..row_bytes * rows].to_vec();
    }

    let mut buffer = Vec::with_capacity(row_bytes * rows);
    for row in data.chunks(stride).take(rows) {
        buffer.extend_from_slice(&row[..row_bytes]);
    }
    buffer
}
