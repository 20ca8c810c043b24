pub mod bitmap;
pub mod bitstream;
pub mod codec;
pub mod ec;
pub mod error;
pub mod interleave;
pub mod metadata;
pub mod template;
