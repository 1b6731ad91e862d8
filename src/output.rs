// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writing pictures to disk.
//!
//! Files are named from everything that determines their content, so a
//! rerun with the same seed and settings overwrites its own output and
//! nothing else: `D3-<seed>-10000K-xz.png`.

use std::fs::File;
use std::path::{Path, PathBuf};

use image::png::PNGEncoder;
use image::ColorType;
use log::info;
use num::clamp;

use crate::errors::Result;
use crate::render::Image;

/// The file name for one plane of one attractor.
pub fn file_name(dimension: usize, seed: &str, iterations: usize, label: &str) -> String {
    format!("D{}-{}-{}K-{}.png", dimension, seed, iterations / 1000, label)
}

/// The file name for the escape-time basin of one map.
pub fn basin_file_name(dimension: usize, seed: &str) -> String {
    format!("D{}-{}-basin.png", dimension, seed)
}

/// Quantizes [0, 1] channels to bytes.
pub fn pixelate(image: &Image) -> Vec<u8> {
    image
        .channels
        .iter()
        .map(|c| clamp((c * 255.0).round(), 0.0, 255.0) as u8)
        .collect()
}

/// Encodes an image as an 8-bit RGB PNG.
pub fn write_image(path: &Path, image: &Image) -> Result<()> {
    let output = File::create(path)?;
    let encoder = PNGEncoder::new(output);
    encoder.encode(
        &pixelate(image),
        image.width as u32,
        image.height as u32,
        ColorType::RGB(8),
    )?;
    Ok(())
}

/// Writes every plane of one attractor into `directory`, returning the
/// paths written.
pub fn write_images(
    directory: &Path,
    dimension: usize,
    seed: &str,
    iterations: usize,
    images: &[Image],
) -> Result<Vec<PathBuf>> {
    images
        .iter()
        .map(|image| -> Result<PathBuf> {
            let path = directory.join(file_name(dimension, seed, iterations, &image.label));
            write_image(&path, image)?;
            info!("Saved {}", path.display());
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Image {
        Image {
            label: "xy".to_string(),
            width: 2,
            height: 1,
            channels: vec![0.0, 0.5, 1.0, 1.0, 0.0, 0.25],
        }
    }

    #[test]
    fn names_carry_seed_iterations_and_plane() {
        assert_eq!(file_name(3, "AMY", 10_000_000, "xz"), "D3-AMY-10000K-xz.png");
        assert_eq!(file_name(8, "QQ", 500_000, "uv"), "D8-QQ-500K-uv.png");
        assert_eq!(basin_file_name(2, "QQ"), "D2-QQ-basin.png");
    }

    #[test]
    fn channels_become_bytes() {
        assert_eq!(pixelate(&tiny()), vec![0, 128, 255, 255, 0, 64]);
    }

    #[test]
    fn writes_png_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_images(dir.path(), 3, "AMY", 2000, &[tiny()]).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("D3-AMY-2K-xy.png"));
        let bytes = std::fs::read(&paths[0]).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
