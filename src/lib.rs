//! QR code reader.
//!
//! Takes raw pixel data (grayscale, RGB or RGBA), locates a QR symbol,
//! geometrically rectifies it, extracts and error-corrects the encoded bit
//! stream, and decodes the payload as a UTF-8 string.

mod common;
pub mod reader;

pub use common::error::{QRError, QRResult};
pub use common::metadata::{ECLevel, Version};
pub use reader::{decode, QRReader};
