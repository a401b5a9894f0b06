//! Screen capture frame decoding
//!
//! The `capture` command transfers the device's LCD contents as a fixed
//! size block of big-endian RGB565 pixels with no header, footer, or
//! delimiter. Decoding expands each pixel to 32-bit ARGB with opaque alpha
//! by shifting each color field into the high bits of its output byte. The
//! low bits are left unrenormalized (no replication or dithering); the
//! exact arithmetic is part of the device contract and deliberately not a
//! "nicer" RGB565 to RGB888 conversion.

use crate::error::ParseError;

/// A decoded screen frame: `width * height` ARGB8888 pixels in row order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFrame {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl PixelFrame {
    /// An empty frame, used when a capture fails softly
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }

    /// Frame width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// The pixel buffer, `0xAARRGGBB` per element, row-major
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// True for the zero-size frame produced by a failed capture
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// Number of raw payload bytes for a `width x height` capture
pub const fn payload_len(width: usize, height: usize) -> usize {
    width * height * 2
}

/// Decode a raw capture payload into a [`PixelFrame`]
///
/// The payload must be exactly `width * height` big-endian u16 values;
/// anything shorter means the serial read timed out mid-transfer.
pub fn decode_rgb565(payload: &[u8], width: usize, height: usize) -> Result<PixelFrame, ParseError> {
    let expected = payload_len(width, height);
    if payload.len() != expected {
        return Err(ParseError::ShortPayload {
            expected,
            actual: payload.len(),
        });
    }

    tracing::trace!(width, height, "decoding screen frame");
    let pixels = payload
        .chunks_exact(2)
        .map(|pair| {
            let px = u16::from_be_bytes([pair[0], pair[1]]) as u32;
            0xFF00_0000 + ((px & 0xF800) << 8) + ((px & 0x07E0) << 5) + ((px & 0x001F) << 3)
        })
        .collect();

    Ok(PixelFrame {
        width,
        height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decode_primary_colors() {
        // Red-only, green-only, blue-only RGB565 pixels, big-endian on the
        // wire. The expansion keeps the field's high bits and leaves the
        // low output bits zero.
        let payload = [0xF8, 0x00, 0x07, 0xE0, 0x00, 0x1F];
        let frame = decode_rgb565(&payload, 3, 1).unwrap();
        assert_eq!(
            frame.pixels(),
            &[0xFFF8_0000, 0xFF00_FC00, 0xFF00_00F8]
        );
    }

    #[test]
    fn decode_black_and_white() {
        let payload = [0x00, 0x00, 0xFF, 0xFF];
        let frame = decode_rgb565(&payload, 2, 1).unwrap();
        assert_eq!(frame.pixels(), &[0xFF00_0000, 0xFFF8_FCF8]);
    }

    #[test]
    fn decode_full_screen_size() {
        let payload = vec![0u8; payload_len(320, 240)];
        let frame = decode_rgb565(&payload, 320, 240).unwrap();
        assert_eq!(frame.width(), 320);
        assert_eq!(frame.height(), 240);
        assert_eq!(frame.pixels().len(), 76_800);
    }

    #[test]
    fn decode_rejects_short_payload() {
        let payload = vec![0u8; 100];
        let err = decode_rgb565(&payload, 320, 240).unwrap_err();
        assert_eq!(
            err,
            ParseError::ShortPayload {
                expected: 153_600,
                actual: 100,
            }
        );
    }

    #[test]
    fn empty_frame() {
        let frame = PixelFrame::empty();
        assert!(frame.is_empty());
        assert_eq!(frame.width(), 0);
        assert_eq!(frame.height(), 0);
    }

    proptest! {
        #[test]
        fn decode_always_opaque(hi: u8, lo: u8) {
            let frame = decode_rgb565(&[hi, lo], 1, 1).unwrap();
            let px = frame.pixels()[0];
            prop_assert_eq!(px >> 24, 0xFF);
            // Low bits of each expanded channel stay clear.
            prop_assert_eq!(px & 0x0007_0307, 0);
        }
    }
}
