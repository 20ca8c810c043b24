use proptest::prelude::*;

use qrixel::{decode, QRError};

// Public surface boundary tests
//------------------------------------------------------------------------------

#[test]
fn test_rejects_zero_dimensions() {
    assert_eq!(decode(0, 100, &[0; 100]), Err(QRError::InvalidArgument));
    assert_eq!(decode(100, 0, &[0; 100]), Err(QRError::InvalidArgument));
}

#[test]
fn test_rejects_empty_buffer() {
    assert_eq!(decode(100, 100, &[]), Err(QRError::InvalidArgument));
}

#[test]
fn test_rejects_unrecognized_pixel_layout() {
    // Two bytes per pixel is neither luma, RGB nor RGBA
    assert_eq!(decode(10, 10, &[0; 200]), Err(QRError::InvalidArgument));
    // An arbitrary length that is no multiple at all
    assert_eq!(decode(10, 10, &[0; 123]), Err(QRError::InvalidArgument));
}

#[test]
fn test_rejects_tiny_image() {
    assert_eq!(decode(10, 10, &[255; 100]), Err(QRError::ImageTooSmall));
    assert_eq!(decode(39, 100, &[255; 3900]), Err(QRError::ImageTooSmall));
}

#[test]
fn test_blank_image_has_no_finders() {
    assert_eq!(decode(100, 100, &[255; 10_000]), Err(QRError::FinderNotFound));
    assert_eq!(decode(100, 100, &[0; 10_000]), Err(QRError::FinderNotFound));
}

#[test]
fn test_rgba_layout_is_accepted() {
    // White RGBA image passes validation and fails later, on recognition
    assert_eq!(decode(50, 50, &[255; 50 * 50 * 4]), Err(QRError::FinderNotFound));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Arbitrary noise must produce an error, never a panic.
    #[test]
    fn proptest_noise_never_panics(bytes in proptest::collection::vec(any::<u8>(), 48 * 48)) {
        prop_assert!(decode(48, 48, &bytes).is_err());
    }
}
