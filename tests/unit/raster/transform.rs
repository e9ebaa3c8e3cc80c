use image::{ColorType, GenericImageView as _, Rgb, RgbImage};

use super::*;

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 90])
    }))
}

#[test]
fn names_map_to_the_closed_set() {
    assert_eq!(
        Transformation::from_name("grayscale"),
        Some(Transformation::Grayscale)
    );
    assert_eq!(
        Transformation::from_name("rotate"),
        Some(Transformation::Rotate { degrees: 45.0 })
    );
    assert_eq!(
        Transformation::from_name("resize"),
        Some(Transformation::Resize {
            width: 640,
            height: 480
        })
    );
    assert_eq!(Transformation::from_name("Grayscale"), None);
    assert_eq!(Transformation::from_name("unknown-name"), None);
    assert_eq!(Transformation::from_name(""), None);

    for name in ["grayscale", "rotate", "resize"] {
        assert_eq!(Transformation::from_name(name).unwrap().name(), name);
    }
}

#[test]
fn grayscale_is_single_channel() {
    let out = Transformation::Grayscale
        .apply_to(&gradient(20, 10))
        .unwrap();
    assert_eq!(out.color(), ColorType::L8);
    assert_eq!(out.dimensions(), (20, 10));

    let with_alpha = DynamicImage::ImageRgba8(image::RgbaImage::new(4, 4));
    assert_eq!(
        Transformation::Grayscale
            .apply_to(&with_alpha)
            .unwrap()
            .color(),
        ColorType::L8
    );
}

#[test]
fn resize_ignores_aspect_ratio() {
    let t = Transformation::from_name("resize").unwrap();
    let out = t.apply_to(&gradient(1920, 1080)).unwrap();
    assert_eq!(out.dimensions(), (640, 480));
}

#[test]
fn rotate_keeps_canvas_and_blackens_corners() {
    let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 40, Rgb([255, 255, 255])));
    let out = Transformation::Rotate { degrees: 45.0 }
        .apply_to(&white)
        .unwrap();
    assert_eq!(out.color(), ColorType::Rgb8);
    let out = out.to_rgb8();
    assert_eq!(out.dimensions(), (40, 40));

    // The rotated square is a diamond; the corners fall outside it.
    for (x, y) in [(0, 0), (39, 0), (0, 39), (39, 39)] {
        assert_eq!(out.get_pixel(x, y).0, [0, 0, 0], "corner ({x}, {y})");
    }
    for (x, y) in [(20, 20), (20, 3), (3, 20), (36, 20)] {
        assert!(out.get_pixel(x, y).0[0] >= 250, "inside ({x}, {y})");
    }
}

#[test]
fn rotate_turns_counter_clockwise() {
    // A red block right of center should end up above center after a quarter turn.
    let src = RgbImage::from_fn(40, 40, |x, y| {
        if (28..36).contains(&x) && (16..24).contains(&y) {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 0])
        }
    });
    let out = Transformation::Rotate { degrees: 90.0 }
        .apply_to(&DynamicImage::ImageRgb8(src))
        .unwrap()
        .to_rgb8();

    let above = out.get_pixel(20, 8).0;
    assert!(above[0] >= 200 && above[1] <= 30, "above center: {above:?}");
    for (x, y) in [(32, 20), (20, 32), (8, 20)] {
        assert!(out.get_pixel(x, y).0[0] <= 30, "({x}, {y}) should be dark");
    }
}

#[test]
fn rotate_preserves_color_type() {
    let gray = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(6, 6, image::Luma([9])));
    let out = Transformation::Rotate { degrees: 45.0 }
        .apply_to(&gray)
        .unwrap();
    assert_eq!(out.color(), ColorType::L8);
}

#[test]
fn rotate_leaves_transparent_corners_with_alpha() {
    let opaque = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        40,
        40,
        image::Rgba([0, 0, 255, 255]),
    ));
    let out = Transformation::Rotate { degrees: 45.0 }
        .apply_to(&opaque)
        .unwrap();
    assert_eq!(out.color(), ColorType::Rgba8);
    let out = out.to_rgba8();
    assert_eq!(out.get_pixel(0, 0).0[3], 0);
    assert_eq!(out.get_pixel(20, 20).0[3], 255);
    assert!(out.get_pixel(20, 20).0[2] >= 250);
}

#[test]
fn apply_in_place_grayscale_and_resize() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("img.png");
    gradient(50, 40).save(&path).unwrap();

    let outcome = apply_named_transformation(&path, "grayscale", &path).unwrap();
    assert_eq!(outcome, TransformOutcome::Applied(Transformation::Grayscale));
    assert_eq!(open_image(&path).unwrap().color(), ColorType::L8);

    let outcome = apply_named_transformation(&path, "resize", &path).unwrap();
    assert!(matches!(
        outcome,
        TransformOutcome::Applied(Transformation::Resize { .. })
    ));
    assert_eq!(open_image(&path).unwrap().dimensions(), (640, 480));
}

#[test]
fn unknown_name_passes_through_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.jpg");
    gradient(64, 48).save(&input).unwrap();
    let before = std::fs::read(&input).unwrap();

    let out = dir.path().join("out.jpg");
    let outcome = apply_named_transformation(&input, "unknown-name", &out).unwrap();
    assert_eq!(outcome, TransformOutcome::PassedThrough);
    assert_eq!(std::fs::read(&out).unwrap(), before);

    let outcome = apply_named_transformation(&input, "sepia", &input).unwrap();
    assert_eq!(outcome, TransformOutcome::PassedThrough);
    assert_eq!(std::fs::read(&input).unwrap(), before);
}
