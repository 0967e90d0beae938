// SPDX-License-Identifier: MPL-2.0
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::{Array3, ArrayView2};
use photo_variants::application::port::{AIError, ChromaPredictor, PredictorProvider};
use photo_variants::config::{self, Config};
use photo_variants::media::load_image;
use photo_variants::{Error, VariantPipeline};
use tempfile::tempdir;

/// Stand-in for the colorization network: a sepia-like constant tint.
struct SepiaPredictor;

impl ChromaPredictor for SepiaPredictor {
    fn predict(&self, luminance: ArrayView2<'_, f32>) -> Result<Array3<f32>, AIError> {
        assert_eq!(luminance.dim(), (224, 224));
        Ok(Array3::from_shape_fn((56, 56, 2), |(_, _, c)| if c == 0 { 8.0 } else { 22.0 }))
    }

    fn input_size(&self) -> (usize, usize) {
        (224, 224)
    }
}

fn mock_pipeline() -> VariantPipeline {
    let provider: Arc<dyn PredictorProvider> = Arc::new(Arc::new(SepiaPredictor));
    VariantPipeline::with_provider(provider, config::DEFAULT_JPEG_QUALITY)
}

fn write_gray_png(dir: &Path, name: &str, size: u32) -> PathBuf {
    let path = dir.join(name);
    image_rs::RgbImage::from_pixel(size, size, image_rs::Rgb([128, 128, 128]))
        .save(&path)
        .expect("failed to write gray png");
    path
}

fn write_portrait_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image_rs::RgbImage::from_fn(96, 64, |x, y| {
        let v = ((x * 2 + y * 3) % 256) as u8;
        image_rs::Rgb([v, v, v])
    })
    .save(&path)
    .expect("failed to write png");
    path
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn enhance_mid_gray_yields_three_distinct_full_size_images() {
    let dir = tempdir().expect("failed to create temp dir");
    let input = write_gray_png(dir.path(), "gray.png", 512);

    let paths = mock_pipeline()
        .process(&input, &dir.path().join("out"), "enhance")
        .expect("enhance should succeed");
    assert_eq!(paths.len(), 3);

    let images: Vec<_> = paths.iter().map(|p| load_image(p).expect("output decodes")).collect();
    for image in &images {
        assert_eq!(image.dimensions(), (512, 512));
    }
    assert_ne!(images[0], images[1]);
    assert_ne!(images[1], images[2]);
    assert_ne!(images[0], images[2]);
}

#[test]
fn enhance_is_byte_for_byte_deterministic() {
    let dir = tempdir().expect("failed to create temp dir");
    let input = write_portrait_png(dir.path(), "portrait.png");
    let pipeline = mock_pipeline();

    let first = pipeline.process(&input, &dir.path().join("a"), "enhance").unwrap();
    let second = pipeline.process(&input, &dir.path().join("b"), "enhance").unwrap();

    assert_eq!(names(&first), names(&second));
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap(), "{} differs", a.display());
    }
}

#[test]
fn mode_spelling_variants_are_equivalent() {
    let dir = tempdir().expect("failed to create temp dir");
    let input = write_portrait_png(dir.path(), "portrait.png");
    let pipeline = mock_pipeline();

    let reference = pipeline.process(&input, &dir.path().join("ref"), "colorize").unwrap();
    for (i, spelling) in ["COLORIZE", " colorize "].into_iter().enumerate() {
        let paths = pipeline
            .process(&input, &dir.path().join(format!("alt{i}")), spelling)
            .unwrap();
        assert_eq!(names(&paths), names(&reference));
        for (a, b) in paths.iter().zip(&reference) {
            assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
        }
    }
}

#[test]
fn unknown_mode_is_rejected() {
    let dir = tempdir().expect("failed to create temp dir");
    let input = write_portrait_png(dir.path(), "portrait.png");
    let out = dir.path().join("out");

    match mock_pipeline().process(&input, &out, "pastel") {
        Err(Error::InvalidMode(mode)) => assert_eq!(mode, "pastel"),
        other => panic!("expected InvalidMode, got {other:?}"),
    }
    assert!(!out.exists());
}

#[test]
fn colorize_and_both_produce_named_outputs() {
    let dir = tempdir().expect("failed to create temp dir");
    let input = write_portrait_png(dir.path(), "photo.png");
    let pipeline = mock_pipeline();

    let colorized = pipeline.process(&input, &dir.path().join("c"), "colorize").unwrap();
    assert_eq!(
        names(&colorized),
        ["photo_colorize1_natural.jpg", "photo_colorize2_soft.jpg", "photo_colorize3_vivid.jpg"]
    );

    let both = pipeline.process(&input, &dir.path().join("b"), "both").unwrap();
    assert_eq!(names(&both), ["photo_both1_natural.jpg", "photo_both2_soft.jpg", "photo_both3_vivid.jpg"]);

    // The grayscale input gains color
    let natural = load_image(&colorized[0]).unwrap();
    assert!(natural.pixels().any(|[r, g, b]| r.abs_diff(b) > 5 || g.abs_diff(b) > 5));
    for path in colorized.iter().chain(&both) {
        assert_eq!(load_image(path).unwrap().dimensions(), (96, 64));
    }

    // Each recipe is its own render, never a copy of another
    for outputs in [&colorized, &both] {
        let decoded: Vec<_> = outputs.iter().map(|p| load_image(p).unwrap()).collect();
        assert_ne!(decoded[0], decoded[1]);
        assert_ne!(decoded[1], decoded[2]);
        assert_ne!(decoded[0], decoded[2]);
    }
}

#[test]
fn missing_model_files_abort_before_writing() {
    let dir = tempdir().expect("failed to create temp dir");
    let input = write_portrait_png(dir.path(), "photo.png");
    let model_dir = dir.path().join("models");
    fs::create_dir_all(&model_dir).unwrap();
    // Only one of the three artifacts is installed
    fs::write(model_dir.join("pts_in_hull.npy"), b"placeholder").unwrap();

    let settings = Config {
        model_dir: Some(model_dir.clone()),
        ..Config::default()
    };
    let pipeline = VariantPipeline::new(&settings);
    let out = dir.path().join("out");

    for mode in ["colorize", "both"] {
        match pipeline.process(&input, &out, mode) {
            Err(Error::ModelFilesMissing { dir, missing }) => {
                assert_eq!(dir, model_dir);
                assert_eq!(missing.len(), 2);
                assert!(missing.iter().any(|m| m.ends_with(".onnx")));
            }
            other => panic!("expected ModelFilesMissing for {mode}, got {other:?}"),
        }
    }
    assert!(!out.exists() || fs::read_dir(&out).unwrap().next().is_none());

    // Enhancement needs no model
    let paths = pipeline.process(&input, &out, "enhance").unwrap();
    assert_eq!(paths.len(), 3);
}

#[test]
fn undecodable_input_is_invalid_image() {
    let dir = tempdir().expect("failed to create temp dir");
    let input = dir.path().join("notes.png");
    fs::write(&input, "definitely not pixels").unwrap();

    let result = mock_pipeline().process(&input, &dir.path().join("out"), "colorize");
    assert!(matches!(result, Err(Error::InvalidImage(_))));
}

#[test]
fn settings_file_controls_jpeg_quality() {
    let dir = tempdir().expect("failed to create temp dir");
    let settings_path = dir.path().join("settings.toml");
    let settings = Config {
        jpeg_quality: Some(40),
        ..Config::default()
    };
    config::save_to_path(&settings, &settings_path).unwrap();
    let loaded = config::load_from_path(&settings_path).unwrap();
    let input = write_portrait_png(dir.path(), "photo.png");

    let provider: Arc<dyn PredictorProvider> = Arc::new(Arc::new(SepiaPredictor));
    let low = VariantPipeline::with_provider(Arc::clone(&provider), loaded.jpeg_quality());
    let high = VariantPipeline::with_provider(provider, 100);

    let low_paths = low.process(&input, &dir.path().join("low"), "enhance").unwrap();
    let high_paths = high.process(&input, &dir.path().join("high"), "enhance").unwrap();
    let size = |p: &PathBuf| fs::metadata(p).unwrap().len();
    assert!(size(&low_paths[1]) < size(&high_paths[1]));
}

#[tokio::test]
async fn async_entry_point_writes_three_files() {
    let dir = tempdir().expect("failed to create temp dir");
    let input = write_portrait_png(dir.path(), "photo.png");
    let pipeline = Arc::new(mock_pipeline());

    let paths = pipeline
        .process_async(input, dir.path().join("out"), "both".to_string())
        .await
        .expect("async processing should succeed");
    assert_eq!(paths.len(), 3);
    assert!(paths.iter().all(|p| p.is_file()));
}
