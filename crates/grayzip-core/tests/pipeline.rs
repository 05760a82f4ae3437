//! End-to-end runs against real ZIP archives built on the fly.

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use grayzip_core::{Config, ExtractionError, ImageError, Pipeline, PipelineError};
use image::{ImageFormat, Rgba, RgbaImage};
use zip::write::SimpleFileOptions;

/// Entry to store in a test archive.
enum Entry<'a> {
    Dir(&'a str),
    File(&'a str, Vec<u8>),
}

fn build_zip(path: &Path, entries: &[Entry<'_>]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for entry in entries {
        match entry {
            Entry::Dir(name) => writer
                .add_directory(*name, SimpleFileOptions::default())
                .unwrap(),
            Entry::File(name, bytes) => {
                writer
                    .start_file(*name, SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(bytes).unwrap();
            }
        }
    }
    writer.finish().unwrap();
}

fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

fn colored_png(pixel: [u8; 4]) -> Vec<u8> {
    png_bytes(&RgbaImage::from_pixel(3, 3, Rgba(pixel)))
}

fn read_png(path: &Path) -> RgbaImage {
    image::open(path).unwrap().to_rgba8()
}

struct Workspace {
    _dir: tempfile::TempDir,
    archive: PathBuf,
    extraction_root: PathBuf,
    output_root: PathBuf,
}

impl Workspace {
    fn new(entries: &[Entry<'_>]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("images.zip");
        build_zip(&archive, entries);
        Self {
            extraction_root: dir.path().join("extracted"),
            output_root: dir.path().join("gray"),
            archive,
            _dir: dir,
        }
    }

    async fn run(&self) -> Result<grayzip_core::BatchSummary, PipelineError> {
        Pipeline::new(&Config::default())
            .run(&self.archive, &self.extraction_root, &self.output_root)
            .await
    }

    fn unzipped(&self) -> PathBuf {
        self.extraction_root.join("unzipped")
    }
}

#[tokio::test]
async fn directory_only_archive_runs_an_empty_batch() {
    let ws = Workspace::new(&[Entry::Dir("a/"), Entry::Dir("a/b/"), Entry::Dir("c/")]);

    let summary = ws.run().await.unwrap();

    assert_eq!(summary.images, 0);
    assert!(ws.unzipped().join("a/b").is_dir());
    assert!(ws.unzipped().join("c").is_dir());
    assert_eq!(summary.extracted_to, ws.unzipped());
}

#[tokio::test]
async fn nested_file_is_extracted_byte_identical() {
    let payload = colored_png([1, 2, 3, 4]);
    let ws = Workspace::new(&[Entry::File("a/b.png", payload.clone())]);

    let summary = ws.run().await.unwrap();

    assert_eq!(std::fs::read(ws.unzipped().join("a/b.png")).unwrap(), payload);
    // Only top-level images are converted
    assert_eq!(summary.images, 0);
    assert!(!ws.output_root.join("b.png").exists());
}

#[tokio::test]
async fn top_level_images_are_converted() {
    let ws = Workspace::new(&[
        Entry::File("color.png", colored_png([30, 60, 90, 255])),
        Entry::File("notes.txt", b"not an image".to_vec()),
        Entry::File("upper.PNG", colored_png([0, 0, 0, 255])),
    ]);

    let summary = ws.run().await.unwrap();

    assert_eq!(summary.images, 1);
    let result = read_png(&ws.output_root.join("color.png"));
    assert!(result.pixels().all(|p| *p == Rgba([60, 60, 60, 255])));
    assert!(!ws.output_root.join("upper.PNG").exists());
    assert!(!ws.output_root.join("notes.txt").exists());
}

#[tokio::test]
async fn gray_images_round_trip_unchanged() {
    let source = RgbaImage::from_fn(5, 4, |x, y| {
        let v = (x * 40 + y * 7) as u8;
        Rgba([v, v, v, 200])
    });
    let ws = Workspace::new(&[Entry::File("gray.png", png_bytes(&source))]);

    ws.run().await.unwrap();

    assert_eq!(read_png(&ws.output_root.join("gray.png")), source);
}

#[tokio::test]
async fn corrupt_image_fails_run_after_siblings_finish() {
    let ws = Workspace::new(&[
        Entry::File("one.png", colored_png([10, 20, 30, 255])),
        Entry::File("broken.png", b"\x89PNG\r\n\x1a\ntruncated".to_vec()),
        Entry::File("two.png", colored_png([90, 90, 0, 255])),
    ]);

    let err = ws.run().await.unwrap_err();

    match err {
        PipelineError::Transform {
            failed,
            total,
            first,
        } => {
            assert_eq!((failed, total), (1, 3));
            assert!(matches!(*first, ImageError::Decode { .. }));
            assert_eq!(first.path(), ws.unzipped().join("broken.png").as_path());
        }
        other => panic!("expected transform failure, got {other}"),
    }

    assert_eq!(
        read_png(&ws.output_root.join("one.png")).get_pixel(0, 0),
        &Rgba([20, 20, 20, 255])
    );
    assert_eq!(
        read_png(&ws.output_root.join("two.png")).get_pixel(0, 0),
        &Rgba([60, 60, 60, 255])
    );
    assert!(!ws.output_root.join("broken.png").exists());
}

#[tokio::test]
async fn rerun_overwrites_previous_outputs() {
    let ws = Workspace::new(&[
        Entry::File("a.png", colored_png([0, 30, 60, 255])),
        Entry::File("b.png", colored_png([255, 0, 0, 255])),
    ]);
    std::fs::create_dir_all(&ws.output_root).unwrap();
    std::fs::write(ws.output_root.join("a.png"), b"stale").unwrap();

    ws.run().await.unwrap();
    let summary = ws.run().await.unwrap();

    assert_eq!(summary.images, 2);
    assert_eq!(
        read_png(&ws.output_root.join("a.png")).get_pixel(2, 2),
        &Rgba([30, 30, 30, 255])
    );
    assert_eq!(
        read_png(&ws.output_root.join("b.png")).get_pixel(0, 0),
        &Rgba([85, 85, 85, 255])
    );
}

#[tokio::test]
async fn bounded_concurrency_converts_whole_batch() {
    let entries: Vec<(String, Vec<u8>)> = (0..8)
        .map(|i| (format!("img{i}.png"), colored_png([i * 10, 0, 0, 255])))
        .collect();
    let entries: Vec<Entry<'_>> = entries
        .iter()
        .map(|(name, bytes)| Entry::File(name, bytes.clone()))
        .collect();
    let ws = Workspace::new(&entries);

    let mut config = Config::default();
    config.transform.max_concurrent = 1;
    let summary = Pipeline::new(&config)
        .run(&ws.archive, &ws.extraction_root, &ws.output_root)
        .await
        .unwrap();

    assert_eq!(summary.images, 8);
    for i in 0..8u8 {
        let gray = (i * 10) / 3;
        assert_eq!(
            read_png(&ws.output_root.join(format!("img{i}.png"))).get_pixel(1, 1),
            &Rgba([gray, gray, gray, 255])
        );
    }
}

#[tokio::test]
async fn missing_archive_aborts_before_transforms() {
    let dir = tempfile::tempdir().unwrap();
    let output_root = dir.path().join("gray");

    let err = Pipeline::new(&Config::default())
        .run(
            &dir.path().join("absent.zip"),
            &dir.path().join("extracted"),
            &output_root,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Extraction(ExtractionError::Open { .. })
    ));
    assert!(!output_root.exists());
}

#[tokio::test]
async fn traversal_entry_is_rejected() {
    let ws = Workspace::new(&[
        Entry::File("../escape.png", colored_png([1, 1, 1, 255])),
        Entry::File("ok.png", colored_png([2, 2, 2, 255])),
    ]);

    let err = ws.run().await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Extraction(ExtractionError::UnsafePath { .. })
    ));
    assert!(!ws.extraction_root.join("escape.png").exists());
    assert!(!ws.output_root.exists());
}
