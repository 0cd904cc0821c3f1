mod common;

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use companion::screenshot::{MAX_PIXELS, MIN_PIXELS, clamp_dimensions};
use companion::{DecodedImage, decode};
use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma, Rgba, RgbaImage};

#[test]
fn empty_payload_is_absent() {
    assert!(decode("").is_none());
    assert!(decode("   ").is_none());
}

#[test]
fn malformed_payloads_are_absent() {
    for raw in ["not base64 at all!", "zzz", "AA==", "data:image/png;base64,@@@@"] {
        assert!(decode(raw).is_none(), "{raw:?} decoded");
    }
    let text = BASE64.encode(b"definitely not an image");
    assert!(decode(&text).is_none());
}

#[test]
fn decodes_png_and_jpeg() {
    let png = decode(&common::png_base64(8, 6)).unwrap();
    assert_eq!((png.width(), png.height()), (8, 6));
    let jpeg = decode(&common::jpeg_base64(16, 16)).unwrap();
    assert_eq!((jpeg.width(), jpeg.height()), (16, 16));
}

#[test]
fn accepts_data_urls() {
    let url = format!("data:image/png;base64,{}", common::png_base64(3, 3));
    assert!(decode(&url).is_some());
}

#[test]
fn accepts_line_wrapped_payloads() {
    let flat = common::png_base64(8, 8);
    let wrapped = flat
        .as_bytes()
        .chunks(64)
        .map(|line| std::str::from_utf8(line).unwrap())
        .collect::<Vec<_>>()
        .join("\r\n");
    assert!(wrapped.contains('\n'));
    let img = decode(&wrapped).unwrap();
    assert_eq!((img.width(), img.height()), (8, 8));
}

#[test]
fn alpha_and_grayscale_become_rgb() {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 0])))
        .write_to(&mut buf, ImageOutputFormat::Png)
        .unwrap();
    let rgba = decode(&BASE64.encode(buf.into_inner())).unwrap();
    assert_eq!(rgba.as_rgb().get_pixel(0, 0).0, [10, 20, 30]);

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([77])))
        .write_to(&mut buf, ImageOutputFormat::Png)
        .unwrap();
    let gray = decode(&BASE64.encode(buf.into_inner())).unwrap();
    assert_eq!(gray.as_rgb().get_pixel(1, 1).0, [77, 77, 77]);
}

#[test]
fn clamps_pixel_budget() {
    let (w, h) = clamp_dimensions(4000, 3000);
    assert!((w as u64 * h as u64) <= MAX_PIXELS);
    assert!(w > h);

    let (w, h) = clamp_dimensions(64, 32);
    assert!((w as u64 * h as u64) >= MIN_PIXELS);
    assert!(w > h);

    assert_eq!(clamp_dimensions(640, 480), (640, 480));
}

#[test]
fn encodes_resized_png_for_the_model() {
    let img = decode(&common::png_base64(32, 32)).unwrap();
    let data = img.to_image_data().unwrap();
    assert_eq!(data.mime, "image/png");
    let round = DecodedImage::new(
        image::load_from_memory(&BASE64.decode(&data.base64).unwrap())
            .unwrap()
            .to_rgb8(),
    );
    assert!((round.width() as u64 * round.height() as u64) >= MIN_PIXELS);
    assert_eq!(round.width(), round.height());
}
