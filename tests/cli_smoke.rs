use std::{io::Cursor, path::PathBuf};

use image::{Rgba, RgbaImage};

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_batchframe")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "batchframe.exe"
            } else {
                "batchframe"
            });
            p
        })
}

fn write_png(path: &std::path::Path, img: RgbaImage) {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, buf).unwrap();
}

#[test]
fn cli_run_writes_archive() {
    let dir = PathBuf::from("target").join("cli_smoke");
    let out_dir = dir.join("out");
    let _ = std::fs::remove_dir_all(&out_dir);
    std::fs::create_dir_all(&dir).unwrap();

    let frame_path = dir.join("frame.png");
    write_png(
        &frame_path,
        RgbaImage::from_fn(20, 20, |_, y| {
            if !(4..16).contains(&y) {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        }),
    );
    let photo_path = dir.join("photo.png");
    write_png(&photo_path, RgbaImage::from_pixel(32, 24, Rgba([10, 120, 200, 255])));
    let notes_path = dir.join("notes.txt");
    std::fs::write(&notes_path, "not a photo").unwrap();

    let status = std::process::Command::new(exe())
        .arg("run")
        .arg("--frame")
        .arg(&frame_path)
        .arg("--out")
        .arg(&out_dir)
        .args(["--prefix", "smoke_", "--quality", "0.8"])
        .arg(&photo_path)
        .arg(&notes_path)
        .status()
        .unwrap();
    assert!(status.success());

    let archives: Vec<_> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(archives.len(), 1);
    assert!(archives[0].starts_with("smoke_batch_"));
    assert!(archives[0].ends_with(".zip"));

    let f = std::fs::File::open(out_dir.join(&archives[0])).unwrap();
    let mut zip = zip::ZipArchive::new(f).unwrap();
    assert!(zip.by_name("smoke_photos/smoke_photo.jpg").is_ok());
}

#[test]
fn cli_config_prints_effective_settings() {
    let output = std::process::Command::new(exe())
        .args(["config", "--prefix", "x_", "--max-dimension", "1200"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let cfg: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(cfg["prefix"], "x_");
    assert_eq!(cfg["max_dimension"], 1200);
}

#[test]
fn cli_rejects_out_of_range_quality() {
    let output = std::process::Command::new(exe())
        .args(["config", "--quality", "3"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
