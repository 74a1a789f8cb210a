//! Resilience tests - wrong settings, full images, damaged tables, and cleaning.

use image::{ImageBuffer, Rgb};
use std::fs;
use std::path::{Path, PathBuf};
use steg_notepad::config::StorageArguments;
use steg_notepad::encoding::DataEncoder;
use steg_notepad::notepad::{clean_images, decode_text, encode_text};
use steg_notepad::storage::{ChunkWrite, CoverImageSet, ImageStream, StreamMode};
use steg_notepad::Error;
use tempfile::TempDir;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 29 % 256) as u8, (y * 31 % 256) as u8, 128])
    });
    img.save(&path).expect("Failed to write cover image");
    path
}

fn protected(images: Vec<PathBuf>, password: &str) -> StorageArguments {
    let mut args = StorageArguments::new(images);
    args.encoding.password = password.to_string();
    args.encoding.use_compression = true;
    args
}

/// Overwrite the first bits of the stream, where the chunk table lives.
fn corrupt_table(image: &Path, data: &[u8]) {
    let covers = CoverImageSet::new(vec![image.to_path_buf()]).unwrap();
    let mut stream = ImageStream::open(&covers, StreamMode::Write).unwrap();
    stream.seek_to_bit(0).unwrap();
    assert!(matches!(
        stream.write_content_chunk(data).unwrap(),
        ChunkWrite::Written(_)
    ));
    stream.close().unwrap();
}

#[test]
fn test_wrong_password_fails_decode() {
    let temp_dir = TempDir::new().unwrap();
    let image = write_png(temp_dir.path(), "cover.png", 64, 64);

    let pairs = [
        ("secret", "wrong"),
        ("secret", "Secret"),
        ("secret", "secret "),
        ("correct horse battery staple", "correct horse battery stapl"),
        ("0", "00"),
        ("pässwörd", "passwort"),
    ];

    for (password, wrong) in pairs {
        encode_text("top secret", &protected(vec![image.clone()], password), &DataEncoder).unwrap();

        let err = decode_text(&protected(vec![image.clone()], wrong), &DataEncoder).unwrap_err();
        assert!(err.is_decode_error(), "{password:?} vs {wrong:?}: {err}");

        // The right password still works afterwards.
        let text = decode_text(&protected(vec![image.clone()], password), &DataEncoder).unwrap();
        assert_eq!(text, "top secret");
    }
}

#[test]
fn test_sixteen_bit_cover_left_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let image = temp_dir.path().join("wide.png");
    ImageBuffer::from_pixel(32, 32, Rgb([40_000u16, 1_234, 65_535]))
        .save(&image)
        .unwrap();
    let before = fs::read(&image).unwrap();

    let args = StorageArguments::new(vec![image.clone()]);
    assert!(matches!(
        encode_text("hi", &args, &DataEncoder),
        Err(Error::UnsupportedColorType { .. })
    ));
    assert_eq!(fs::read(&image).unwrap(), before);
    assert_eq!(image::open(&image).unwrap().color(), image::ColorType::Rgb16);
}

#[test]
fn test_wrong_seed_fails_decode() {
    let temp_dir = TempDir::new().unwrap();
    let image = write_png(temp_dir.path(), "cover.png", 64, 64);

    let mut args = protected(vec![image], "pw");
    args.encoding.random_seed = "alpha".to_string();
    args.encoding.dummy_count = 12;
    encode_text("seeded note", &args, &DataEncoder).unwrap();

    args.encoding.random_seed = "beta".to_string();
    assert!(decode_text(&args, &DataEncoder).is_err());
}

#[test]
fn test_insufficient_capacity_leaves_images_untouched() {
    let temp_dir = TempDir::new().unwrap();
    // 16x16 = 768 bits; 129 are reserved for the table.
    let image = write_png(temp_dir.path(), "small.png", 16, 16);
    let before = fs::read(&image).unwrap();

    let args = StorageArguments::new(vec![image.clone()]);
    let note = "x".repeat(80);
    let err = encode_text(&note, &args, &DataEncoder).unwrap_err();

    match err {
        Error::InsufficientCapacity { needed, available } => {
            assert_eq!(available, 768);
            assert_eq!(needed, 129 + 640);
        }
        other => panic!("expected InsufficientCapacity, got {other}"),
    }

    assert_eq!(fs::read(&image).unwrap(), before);
    assert!(matches!(
        decode_text(&args, &DataEncoder),
        Err(Error::ChunkTable(_))
    ));
}

#[test]
fn test_exact_capacity_fits() {
    let temp_dir = TempDir::new().unwrap();
    let image = write_png(temp_dir.path(), "small.png", 16, 16);
    let args = StorageArguments::new(vec![image]);

    // (768 - 129) / 8 = 79 whole bytes.
    let note = "y".repeat(79);
    encode_text(&note, &args, &DataEncoder).unwrap();
    assert_eq!(decode_text(&args, &DataEncoder).unwrap(), note);
}

#[test]
fn test_failed_save_keeps_previous_note() {
    let temp_dir = TempDir::new().unwrap();
    let image = write_png(temp_dir.path(), "cover.png", 16, 16);
    let args = StorageArguments::new(vec![image]);

    encode_text("keep me", &args, &DataEncoder).unwrap();
    assert!(encode_text(&"z".repeat(200), &args, &DataEncoder).is_err());

    assert_eq!(decode_text(&args, &DataEncoder).unwrap(), "keep me");
}

#[test]
fn test_clean_destroys_note() {
    let temp_dir = TempDir::new().unwrap();
    let images = vec![
        write_png(temp_dir.path(), "a.png", 32, 32),
        write_png(temp_dir.path(), "b.png", 32, 32),
    ];
    let args = protected(images.clone(), "secret");

    encode_text("soon gone", &args, &DataEncoder).unwrap();

    let covers = CoverImageSet::from_arguments(&args).unwrap();
    let overwritten = clean_images(&covers).unwrap();
    assert_eq!(overwritten, 2 * 32 * 32 * 3);

    assert!(decode_text(&args, &DataEncoder).is_err());

    // Cleaned images still accept a new note.
    encode_text("fresh start", &args, &DataEncoder).unwrap();
    assert_eq!(decode_text(&args, &DataEncoder).unwrap(), "fresh start");
}

#[test]
fn test_clean_only_touches_low_bits() {
    let temp_dir = TempDir::new().unwrap();
    let image = write_png(temp_dir.path(), "cover.png", 20, 20);
    let before = image::open(&image).unwrap().to_rgb8();

    let covers = CoverImageSet::new(vec![image.clone()]).unwrap();
    clean_images(&covers).unwrap();

    let after = image::open(&image).unwrap().to_rgb8();
    for (b, a) in before.pixels().zip(after.pixels()) {
        for channel in 0..3 {
            assert_eq!(b.0[channel] & 0xFE, a.0[channel] & 0xFE);
        }
    }
}

#[test]
fn test_corrupt_magic_is_chunk_table_error() {
    let temp_dir = TempDir::new().unwrap();
    let image = write_png(temp_dir.path(), "cover.png", 32, 32);
    let args = StorageArguments::new(vec![image.clone()]);

    encode_text("table goes bad", &args, &DataEncoder).unwrap();
    corrupt_table(&image, b"XXXX");

    assert!(matches!(
        decode_text(&args, &DataEncoder),
        Err(Error::ChunkTable(_))
    ));
}

#[test]
fn test_corrupt_entry_count_is_chunk_table_error() {
    let temp_dir = TempDir::new().unwrap();
    let image = write_png(temp_dir.path(), "cover.png", 32, 32);
    let args = StorageArguments::new(vec![image.clone()]);

    encode_text("count goes bad", &args, &DataEncoder).unwrap();

    let mut header = b"SNCT".to_vec();
    header.extend_from_slice(&u64::MAX.to_le_bytes());
    corrupt_table(&image, &header);

    assert!(matches!(
        decode_text(&args, &DataEncoder),
        Err(Error::ChunkTable(_))
    ));
}

#[test]
fn test_missing_image_reported() {
    let temp_dir = TempDir::new().unwrap();
    let args = StorageArguments::new(vec![temp_dir.path().join("gone.png")]);

    assert!(matches!(
        encode_text("nowhere", &args, &DataEncoder),
        Err(Error::ImageNotFound(_))
    ));
}

#[test]
fn test_lossy_format_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("photo.jpg");
    fs::write(&path, b"not really a jpeg").unwrap();

    let args = StorageArguments::new(vec![path]);
    assert!(matches!(
        encode_text("nope", &args, &DataEncoder),
        Err(Error::UnsupportedFormat(_))
    ));
}

#[test]
fn test_unicode_round_trip_across_configs() {
    let temp_dir = TempDir::new().unwrap();
    let image = write_png(temp_dir.path(), "cover.png", 96, 96);
    let note = "Grüße aus Zürich 🌍 / 日本語のメモ / Ελληνικά";

    let configs: [(&str, &str, usize, u32, bool); 5] = [
        ("", "", 0, 0, false),
        ("", "", 0, 0, true),
        ("pw", "", 0, 0, false),
        ("", "seed", 9, 0, false),
        ("pw", "seed", 25, 4, true),
    ];

    for (password, seed, dummies, hashes, compress) in configs {
        let mut args = StorageArguments::new(vec![image.clone()]);
        args.encoding.password = password.to_string();
        args.encoding.random_seed = seed.to_string();
        args.encoding.dummy_count = dummies;
        args.encoding.additional_hashes = hashes;
        args.encoding.use_compression = compress;

        encode_text(note, &args, &DataEncoder).unwrap();
        assert_eq!(decode_text(&args, &DataEncoder).unwrap(), note);
    }
}
