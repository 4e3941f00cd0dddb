use std::io::Cursor;

use super::*;

fn encode(img: image::RgbaImage, format: image::ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_premul() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50u8, 200u8, 128u8]).unwrap();
    let frame = decode_frame(&encode(img, image::ImageFormat::Png)).unwrap();
    assert_eq!(frame.width, 1);
    assert_eq!(frame.height, 1);
    assert_eq!(
        frame.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_jpeg_is_opaque() {
    let rgb = image::RgbImage::from_pixel(4, 2, image::Rgb([10, 200, 30]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(rgb)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();

    let frame = decode_frame(&buf).unwrap();
    assert_eq!((frame.width, frame.height), (4, 2));
    assert_eq!(frame.rgba8_premul.len(), 4 * 2 * 4);
    assert!(frame.rgba8_premul.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn decode_garbage_fails() {
    assert!(decode_frame(b"definitely not an image").is_err());
    assert!(decode_frame(&[]).is_err());
}
