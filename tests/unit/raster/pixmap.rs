use super::*;

#[test]
fn pixmap_rejects_oversized_and_mismatched_buffers() {
    assert!(matches!(
        canvas_size(70_000, 1).unwrap_err(),
        StillreelError::Image(_)
    ));
    assert!(image_premul_bytes_to_pixmap(&[0; 7], 1, 2).is_err());

    let pixmap = image_premul_bytes_to_pixmap(&[10, 20, 30, 255, 0, 0, 0, 0], 2, 1).unwrap();
    assert_eq!((pixmap.width(), pixmap.height()), (2, 1));
    assert_eq!(&pixmap.data_as_u8_slice()[..4], &[10, 20, 30, 255]);
}

#[test]
fn opaque_targets_keep_premultiplied_values() {
    // Half-covered white becomes mid gray when there is no alpha channel to hold coverage.
    let out = premul_rgba8_to_image(vec![128, 128, 128, 128], 1, 1, ColorType::Rgb8).unwrap();
    assert_eq!(out.color(), ColorType::Rgb8);
    assert_eq!(out.to_rgb8().get_pixel(0, 0).0, [128, 128, 128]);

    let out = premul_rgba8_to_image(vec![128, 128, 128, 128], 1, 1, ColorType::Rgba8).unwrap();
    assert_eq!(out.to_rgba8().get_pixel(0, 0).0, [255, 255, 255, 128]);
}

#[test]
fn color_type_is_restored() {
    let rgba = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        2,
        2,
        image::Rgba([40, 40, 40, 255]),
    ));
    for color in [
        ColorType::L8,
        ColorType::La8,
        ColorType::Rgb8,
        ColorType::Rgba8,
        ColorType::L16,
        ColorType::La16,
        ColorType::Rgb16,
        ColorType::Rgba16,
        ColorType::Rgb32F,
        ColorType::Rgba32F,
    ] {
        assert_eq!(convert_to_color_type(rgba.clone(), color).color(), color);
    }

    let gray = convert_to_color_type(rgba, ColorType::L8).to_luma8();
    assert_eq!(gray.get_pixel(1, 1).0, [40]);
}
