//! Fixture builders shared by the unit tests.

use crate::image_processor::encode_png_best;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, Rgba, RgbaImage};
use std::io::Write;
use std::path::Path;

/// Deterministic pseudo-random RGBA pixels (xorshift), incompressible on purpose
pub fn noise_rgba(width: u32, height: u32) -> RgbaImage {
    let mut state: u32 = 0x9E37_79B9;
    RgbaImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, a] = state.to_le_bytes();
        Rgba([r, g, b, a])
    })
}

/// PNG written with the same settings the compressor uses
pub fn write_png(path: &Path, img: &DynamicImage) {
    std::fs::write(path, encode_png_best(img).unwrap()).unwrap();
}

/// Valid 8-bit RGBA PNG whose IDAT uses stored (uncompressed) deflate blocks
pub fn write_png_uncompressed(path: &Path, img: &DynamicImage) {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut raw = Vec::with_capacity((height * (width * 4 + 1)) as usize);
    for row in rgba.rows() {
        raw.push(0); // filter: none
        for pixel in row {
            raw.extend_from_slice(&pixel.0);
        }
    }

    write_raw_png(path, width, height, COLOR_RGBA, &[], &raw);
}

/// Uncompressed 8-bit palette PNG. `alpha` becomes a tRNS chunk when given.
pub fn write_indexed_png_uncompressed(
    path: &Path,
    (width, height): (u32, u32),
    palette: &[[u8; 3]],
    alpha: Option<&[u8]>,
    index_at: impl Fn(u32, u32) -> u8,
) {
    let mut raw = Vec::with_capacity((height * (width + 1)) as usize);
    for y in 0..height {
        raw.push(0);
        raw.extend((0..width).map(|x| index_at(x, y)));
    }

    let mut chunks = vec![(*b"PLTE", palette.concat())];
    if let Some(alpha) = alpha {
        chunks.push((*b"tRNS", alpha.to_vec()));
    }

    write_raw_png(path, width, height, COLOR_INDEXED, &chunks, &raw);
}

const COLOR_INDEXED: u8 = 3;
const COLOR_RGBA: u8 = 6;

fn write_raw_png(
    path: &Path,
    width: u32,
    height: u32,
    color_type: u8,
    extra_chunks: &[([u8; 4], Vec<u8>)],
    scanlines: &[u8],
) {
    let mut zlib = ZlibEncoder::new(Vec::new(), Compression::none());
    zlib.write_all(scanlines).unwrap();
    let idat = zlib.finish().unwrap();

    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);

    let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    write_chunk(&mut png, b"IHDR", &ihdr);
    for (kind, data) in extra_chunks {
        write_chunk(&mut png, kind, data);
    }
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    std::fs::write(path, png).unwrap();
}

fn write_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    let start = png.len();
    png.extend_from_slice(kind);
    png.extend_from_slice(data);
    let crc = crc32fast::hash(&png[start..]);
    png.extend_from_slice(&crc.to_be_bytes());
}

#[test]
fn test_uncompressed_fixture_decodes() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("raw.png");
    let img = DynamicImage::ImageRgba8(noise_rgba(5, 3));
    write_png_uncompressed(&path, &img);

    let decoded = image::open(&path).unwrap();
    assert_eq!(decoded.to_rgba8(), img.to_rgba8());
}

#[test]
fn test_indexed_fixture_decodes() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("indexed.png");
    let palette = [[255, 0, 0], [0, 0, 255]];
    write_indexed_png_uncompressed(&path, (4, 2), &palette, Some(&[255, 0]), |x, _| (x % 2) as u8);

    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    assert_eq!(decoded.get_pixel(1, 1), &Rgba([0, 0, 255, 0]));
}
