#[cfg(test)]
mod tests {
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use magick::{CompositeOp, ErrorKind, MagickError, MagickImage};
    use std::fs;
    use std::path::Path;

    /// 600x552 with a transparent border around an opaque disc.
    fn heart() -> DynamicImage {
        let (w, h) = (600u32, 552u32);
        let pixels = RgbaImage::from_fn(w, h, |x, y| {
            let dx = x as f32 - w as f32 / 2.0;
            let dy = y as f32 - h as f32 / 2.0;
            if dx * dx + dy * dy < 200.0 * 200.0 {
                Rgba([220, (x % 256) as u8, (y % 256) as u8, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        DynamicImage::ImageRgba8(pixels)
    }

    fn write_png(dir: &TempDir, name: &str, image: &DynamicImage) -> std::path::PathBuf {
        let child = dir.child(name);
        image.save_with_format(child.path(), ImageFormat::Png).unwrap();
        child.path().to_path_buf()
    }

    fn setup_image(dir: &TempDir) -> MagickImage {
        magick::genesis();
        let path = write_png(dir, "heart_original.png", &heart());
        MagickImage::from_file(&path).unwrap()
    }

    #[test]
    fn test_image_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let image = setup_image(&temp_dir);
        assert_eq!(image.width().unwrap(), 600);
        assert_eq!(image.height().unwrap(), 552);
        assert_eq!(image.image_type().unwrap(), "PNG");

        let result = MagickImage::from_file(temp_dir.child("heart_whatwhat.png").path());
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Input);
    }

    #[test]
    fn test_image_from_blob() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_png(&temp_dir, "blob.png", &heart());
        let source = fs::read(&path).unwrap();

        let image = MagickImage::from_blob(&source, "png").unwrap();
        assert_eq!(image.list_length(), 1);
        assert_eq!(image.width().unwrap(), 600);

        assert!(MagickImage::from_blob(&source, "image/png").is_ok());
        assert!(MagickImage::from_blob(&[], "png").is_err());
    }

    #[test]
    fn test_bad_data_from_blob() {
        let temp_dir = TempDir::new().unwrap();
        let source = fs::read(write_png(&temp_dir, "bad.png", &heart())).unwrap();

        let cases: Vec<(&[u8], &str)> = vec![
            (source.as_slice(), ""),
            (source.as_slice(), "   "),
            (&b""[..], "png"),
            (&b"blah"[..], "jpg"),
            (&b"   "[..], "image/jpg"),
            (&b""[..], " "),
            (&b""[..], ":"),
        ];
        for (data, hint) in cases {
            let err = MagickImage::from_blob(data, hint).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Input, "hint {:?}", hint);
        }
    }

    #[test]
    fn test_parse_geometry() {
        let temp_dir = TempDir::new().unwrap();
        let image = setup_image(&temp_dir);
        let geometry = image.parse_geometry("100x100>").unwrap();
        assert_eq!(geometry.width, Some(100));
        assert!(geometry.has(magick::GeometryFlag::ShrinkOnly));
        assert!(image.parse_geometry("blurgh").is_err());
    }

    #[test]
    fn test_resize_ratio() {
        let temp_dir = TempDir::new().unwrap();
        let image = setup_image(&temp_dir);
        let ratio = image.resize_ratio(300, 300).unwrap();
        assert!(ratio > 0.27);
        assert!(ratio < 0.28);
        assert_eq!(image.fit_scale(300, 300).unwrap(), 0.5);
    }

    #[test]
    fn test_resize() {
        let temp_dir = TempDir::new().unwrap();
        let mut image = setup_image(&temp_dir);
        image.resize("100x100!").unwrap();
        assert_eq!(image.width().unwrap(), 100);
        assert_eq!(image.height().unwrap(), 100);

        let mut image = setup_image(&temp_dir);
        let err = image.resize("blurgh").unwrap_err();
        assert!(matches!(err, MagickError::Parse(_)));
        assert_eq!(image.width().unwrap(), 600);
        assert_eq!(image.height().unwrap(), 552);
    }

    #[test]
    fn test_resize_keeps_aspect_and_shrink_only() {
        let temp_dir = TempDir::new().unwrap();
        let mut image = setup_image(&temp_dir);
        image.resize("100x100").unwrap();
        assert_eq!((image.width().unwrap(), image.height().unwrap()), (100, 92));

        let mut image = setup_image(&temp_dir);
        image.resize("1000x1000>").unwrap();
        assert_eq!((image.width().unwrap(), image.height().unwrap()), (600, 552));
    }

    #[test]
    fn test_crop() {
        let temp_dir = TempDir::new().unwrap();
        let mut image = setup_image(&temp_dir);
        image.crop("100x100!+10+10").unwrap();
        assert_eq!(image.width().unwrap(), 100);
        assert_eq!(image.height().unwrap(), 100);

        let mut image = setup_image(&temp_dir);
        assert!(image.crop("blurgh").is_err());

        let mut image = setup_image(&temp_dir);
        let err = image.crop("100x100+550+10").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Operation);
        assert_eq!(image.width().unwrap(), 600);
    }

    #[test]
    fn test_shadow() {
        let temp_dir = TempDir::new().unwrap();
        let mut image = setup_image(&temp_dir);
        image.shadow("#000", 75.0, 2.0, 0, 0).unwrap();
        assert_eq!(image.width().unwrap(), 608);
        assert_eq!(image.height().unwrap(), 560);

        let mut image = setup_image(&temp_dir);
        assert_eq!(
            image.shadow("#000", 150.0, 2.0, 0, 0).unwrap_err().kind(),
            ErrorKind::Input
        );
    }

    #[test]
    fn test_compose() {
        let temp_dir = TempDir::new().unwrap();
        let background = DynamicImage::ImageRgba8(RgbaImage::from_pixel(600, 552, Rgba([0, 0, 200, 255])));
        let path = write_png(&temp_dir, "blue_background.png", &background);
        let mut image = MagickImage::from_file(&path).unwrap();
        let overlay = setup_image(&temp_dir);

        assert_eq!(image.width().unwrap(), overlay.width().unwrap());
        assert_eq!(image.height().unwrap(), overlay.height().unwrap());

        image.compose(CompositeOp::Screen, &overlay, 150, 150).unwrap();
        assert_eq!(image.width().unwrap(), 600);
        assert_eq!(image.height().unwrap(), 552);

        let output = temp_dir.child("test_compose.png");
        image.to_file(output.path()).unwrap();
        assert!(output.path().exists());
    }

    #[test]
    fn test_compose_with_destroyed_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut image = setup_image(&temp_dir);
        let mut overlay = setup_image(&temp_dir);
        overlay.destroy().unwrap();

        let err = image.compose(CompositeOp::Over, &overlay, 0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[test]
    fn test_fill_background_color() {
        let temp_dir = TempDir::new().unwrap();
        let mut image = setup_image(&temp_dir);
        image.fill_background_color("#CCC").unwrap();
        assert!(!image.frames()[0].color_type().has_alpha());

        let mut image = setup_image(&temp_dir);
        assert_eq!(
            image.fill_background_color("not-a-color").unwrap_err().kind(),
            ErrorKind::Parse
        );
    }

    #[test]
    fn test_separate_alpha_channel_and_negate() {
        let temp_dir = TempDir::new().unwrap();
        let mut image = setup_image(&temp_dir);
        image.separate_alpha_channel().unwrap();
        let mask = image.frames()[0].image.to_luma8();
        assert_eq!(mask.get_pixel(300, 276).0, [255]);
        assert_eq!(mask.get_pixel(0, 0).0, [0]);

        image.negate().unwrap();
        let negative = image.frames()[0].image.to_luma8();
        assert_eq!(negative.get_pixel(300, 276).0, [0]);
        assert_eq!(negative.get_pixel(0, 0).0, [255]);
    }

    #[test]
    fn test_strip_and_progressive() {
        let temp_dir = TempDir::new().unwrap();
        let mut image = setup_image(&temp_dir);
        image.strip().unwrap();
        image.progressive().unwrap();

        let bytes = image.to_blob("jpg").unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);

        let bytes = image.to_blob("png").unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (600, 552));
    }

    #[test]
    fn test_to_blob_round_trips_pixels() {
        let temp_dir = TempDir::new().unwrap();
        let image = setup_image(&temp_dir);
        let bytes = image.to_blob("png").unwrap();
        assert!(!bytes.is_empty());

        let again = MagickImage::from_blob(&bytes, "png").unwrap();
        assert_eq!(again.frames()[0].image.to_rgba8(), image.frames()[0].image.to_rgba8());

        assert_eq!(image.to_blob("").unwrap_err().kind(), ErrorKind::Input);
    }

    #[test]
    fn test_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let image = setup_image(&temp_dir);
        let output = temp_dir.child("out/test_out.png");
        image.to_file(output.path()).unwrap();

        let stat = fs::metadata(output.path()).unwrap();
        assert!(stat.len() > 0);
        assert!(MagickImage::from_file(output.path()).is_ok());
    }

    #[test]
    fn test_set_property() {
        let temp_dir = TempDir::new().unwrap();
        let mut image = setup_image(&temp_dir);
        image.set_property("jpeg:sampling-factor", "4:4:4").unwrap();
        let factor = image.get_property("jpeg:sampling-factor").unwrap();
        assert_eq!(factor, Some("4:4:4"));
    }

    #[test]
    fn test_destroy() {
        let temp_dir = TempDir::new().unwrap();
        let mut image = setup_image(&temp_dir);
        assert!(image.destroy().is_ok());
        assert_eq!(image.list_length(), 0);
        assert_eq!(image.destroy().unwrap_err().kind(), ErrorKind::State);
    }

    #[test]
    fn test_full_stack() {
        let temp_dir = TempDir::new().unwrap();

        let mut image = setup_image(&temp_dir);
        image.resize("100x100").unwrap();
        image.to_file(temp_dir.child("test_resize.png").path()).unwrap();

        let mut image = setup_image(&temp_dir);
        image.crop("100x100+10+10").unwrap();
        image.to_file(temp_dir.child("test_crop.png").path()).unwrap();

        let mut image = setup_image(&temp_dir);
        image.shadow("#000", 90.0, 10.0, 0, 0).unwrap();
        image.to_file(temp_dir.child("test_shadow.png").path()).unwrap();

        let mut image = setup_image(&temp_dir);
        image.fill_background_color("red").unwrap();
        image.to_file(temp_dir.child("test_fill.png").path()).unwrap();

        let mut image = setup_image(&temp_dir);
        image.resize("100x100>").unwrap();
        image.shadow("#000", 90.0, 10.0, 0, 0).unwrap();
        image.fill_background_color("#CCC").unwrap();
        let combo = temp_dir.child("test_combo.jpg");
        image.to_file(combo.path()).unwrap();
        assert_eq!(
            MagickImage::from_file(combo.path()).unwrap().image_type().unwrap(),
            "JPEG"
        );

        let mut image = setup_image(&temp_dir);
        image.separate_alpha_channel().unwrap();
        image.negate().unwrap();
        image.to_file(temp_dir.child("test_alpha_negative.jpg").path()).unwrap();

        for name in [
            "test_resize.png",
            "test_crop.png",
            "test_shadow.png",
            "test_fill.png",
            "test_alpha_negative.jpg",
        ] {
            assert!(Path::new(temp_dir.child(name).path()).exists(), "{}", name);
        }
    }

    const HEART_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="276">
        <circle cx="150" cy="138" r="100" fill="#dc143c"/>
    </svg>"##;

    #[test]
    fn test_svg_from_blob() {
        let image = MagickImage::from_blob(HEART_SVG.as_bytes(), "svg").unwrap();
        assert_eq!(image.list_length(), 1);
        assert_eq!((image.width().unwrap(), image.height().unwrap()), (300, 276));
        assert_eq!(image.image_type().unwrap(), "SVG");

        assert!(MagickImage::from_blob(HEART_SVG.as_bytes(), "image/svg+xml").is_ok());
        assert_eq!(
            MagickImage::from_blob(b"<svg", "svg").unwrap_err().kind(),
            ErrorKind::Input
        );
    }

    #[test]
    fn test_svg_resize() {
        let temp_dir = TempDir::new().unwrap();
        let mut image = MagickImage::from_blob(HEART_SVG.as_bytes(), "svg").unwrap();
        image.resize("100x100!").unwrap();
        assert_eq!((image.width().unwrap(), image.height().unwrap()), (100, 100));

        let output = temp_dir.child("test_from_svg.jpg");
        image.to_file(output.path()).unwrap();
        assert_eq!(
            MagickImage::from_file(output.path()).unwrap().image_type().unwrap(),
            "JPEG"
        );

        // Vector output is not available.
        assert_eq!(image.to_blob("svg").unwrap_err().kind(), ErrorKind::Input);
        assert!(image.to_file(temp_dir.child("out.svg").path()).is_err());
    }

    #[test]
    fn test_percent_on_one_axis() {
        let temp_dir = TempDir::new().unwrap();
        let mut image = setup_image(&temp_dir);
        image.resize("25%x100!").unwrap();
        assert_eq!((image.width().unwrap(), image.height().unwrap()), (150, 100));

        let mut image = setup_image(&temp_dir);
        image.resize("25x100%!").unwrap();
        assert_eq!((image.width().unwrap(), image.height().unwrap()), (150, 552));
    }

    #[test]
    fn test_oversized_results_are_refused() {
        let temp_dir = TempDir::new().unwrap();
        let mut image = setup_image(&temp_dir);

        let err = image.resize("1000000x1000000!").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Operation);
        let err = image.shadow("#000", 50.0, 3.0e9, 0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Operation);
        let err = image.shadow("#000", 50.0, 2.0, 0, i32::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Operation);

        assert_eq!((image.width().unwrap(), image.height().unwrap()), (600, 552));
    }
}
