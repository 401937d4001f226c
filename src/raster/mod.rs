//! Raster image to burn program
//!
//! The image is shrunk to a coarse grid, turned gray, stretched to the full
//! 0-255 range and quantized to a handful of shades. The program then sweeps
//! the grid row by row in a serpentine, and each shade becomes a feed rate:
//! dark pixels are crossed slowly so they burn deeper.

use crate::{Result, SolarplotError};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use ndarray::Array2;
use std::io::Write;
use std::path::Path;

/// Layout and feed settings for a raster burn, in program units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterSettings {
    pub origin_x: f64,
    pub origin_y: f64,
    pub size_x: f64,
    pub size_y: f64,
    /// Grid size in pixels
    pub columns: u32,
    pub rows: u32,
    /// Feed for black, per minute
    pub min_feed: f64,
    /// Feed for white, per minute
    pub max_feed: f64,
    /// Number of gray levels
    pub shades: u32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            size_x: 5.0,
            size_y: 5.0,
            columns: 32,
            rows: 32,
            min_feed: 10.0,
            max_feed: 30.0,
            shades: 8,
        }
    }
}

impl RasterSettings {
    pub fn validate(&self) -> Result<()> {
        if self.columns < 2 || self.rows < 2 {
            return Err(SolarplotError::Config(format!(
                "raster grid must be at least 2x2, got {}x{}",
                self.columns, self.rows
            )));
        }
        if !(2..=256).contains(&self.shades) {
            return Err(SolarplotError::Config(format!(
                "shades must be between 2 and 256, got {}",
                self.shades
            )));
        }
        if !(self.min_feed > 0.0) || self.max_feed < self.min_feed {
            return Err(SolarplotError::Config(format!(
                "feed range {}..{} is invalid",
                self.min_feed, self.max_feed
            )));
        }
        Ok(())
    }

    /// Width of one gray level on the 0-255 scale
    fn shade_step(&self) -> f64 {
        256.0 / f64::from(self.shades)
    }

    /// Feed rate for a quantized shade
    pub fn feed_for_shade(&self, shade: u32) -> f64 {
        let norm_shade = f64::from(shade) / f64::from(self.shades - 1);
        self.min_feed + norm_shade * (self.max_feed - self.min_feed)
    }
}

/// Counts reported after generating a program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterStats {
    pub pixels: usize,
    pub moves: usize,
}

impl RasterStats {
    pub fn pixels_per_move(&self) -> f64 {
        if self.moves == 0 {
            0.0
        } else {
            self.pixels as f64 / self.moves as f64
        }
    }
}

/// Opens an image file in any format the `image` crate understands
pub fn load<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Resizes with bilinear filtering and converts to gray levels
///
/// The result is indexed `[row, column]` and uses the weights
/// `0.30 R + 0.59 G + 0.11 B`.
pub fn grayscale(image: &DynamicImage, columns: u32, rows: u32) -> Array2<f64> {
    let small = imageops::resize(&image.to_rgb8(), columns, rows, FilterType::Triangle);

    Array2::from_shape_fn((rows as usize, columns as usize), |(row, column)| {
        let pixel = small.get_pixel(column as u32, row as u32);
        0.30 * f64::from(pixel[0]) + 0.59 * f64::from(pixel[1]) + 0.11 * f64::from(pixel[2])
    })
}

/// Stretches the values to cover 0-255
///
/// A flat image has no range to stretch and becomes all zeros.
pub fn normalize(data: &mut Array2<f64>) {
    let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if !(range > 0.0) {
        data.fill(0.0);
        return;
    }
    data.mapv_inplace(|gray| (gray - min) / range * 255.0);
}

/// Snaps each value down to the bottom of its gray level
pub fn quantize(data: &mut Array2<f64>, shades: u32) {
    let step = 256.0 / f64::from(shades);
    data.mapv_inplace(|gray| (gray / step).floor() * step);
}

/// Writes the serpentine burn program for a quantized grid
///
/// Even rows run left to right and odd rows right to left. A `G1` is
/// written at the first and last pixel of each row and wherever the shade
/// changes.
pub fn generate<W: Write>(
    data: &Array2<f64>,
    settings: &RasterSettings,
    mut out: W,
) -> Result<RasterStats> {
    settings.validate()?;
    let (height, width) = data.dim();
    if width < 2 || height < 2 {
        return Err(SolarplotError::Config(format!(
            "raster grid must be at least 2x2, got {}x{}",
            width, height
        )));
    }

    writeln!(out, "G90")?; // Absolute positioning
    writeln!(out, "G20")?; // Inches
    writeln!(out, "G94")?; // Feed per minute
    writeln!(out, "G0 X{:.4} Y{:.4}", settings.origin_x, settings.origin_y)?;

    let step = settings.shade_step();
    let mut moves = 0;
    for y in 0..height {
        let mut last_shade = None;
        let program_y = y as f64 * settings.size_y / (height - 1) as f64 + settings.origin_y;

        for i in 0..width {
            let x = if y % 2 == 0 { i } else { width - 1 - i };
            let program_x = x as f64 * settings.size_x / (width - 1) as f64 + settings.origin_x;

            let shade = ((data[[y, x]] / step) as u32).min(settings.shades - 1);
            if last_shade != Some(shade) || i == 0 || i == width - 1 {
                writeln!(
                    out,
                    "G1 X{:.4} Y{:.4} F{:.4}",
                    program_x,
                    program_y,
                    settings.feed_for_shade(shade)
                )?;
                last_shade = Some(shade);
                moves += 1;
            }
        }
    }
    out.flush()?;

    Ok(RasterStats {
        pixels: width * height,
        moves,
    })
}

/// Blows the grid back up to `width` x `height` for a visual check
pub fn preview(data: &Array2<f64>, width: u32, height: u32) -> GrayImage {
    let (rows, columns) = data.dim();
    let small = GrayImage::from_fn(columns as u32, rows as u32, |x, y| {
        Luma([data[[y as usize, x as usize]].clamp(0.0, 255.0) as u8])
    });
    imageops::resize(&small, width, height, FilterType::Nearest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use ndarray::array;
    use tempfile::tempdir;

    fn program(data: &Array2<f64>, settings: &RasterSettings) -> (Vec<String>, RasterStats) {
        let mut buffer = Vec::new();
        let stats = generate(data, settings, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        (text.lines().map(str::to_string).collect(), stats)
    }

    #[test]
    fn test_normalize_stretches_range() {
        let mut data = array![[10.0, 20.0], [30.0, 60.0]];
        normalize(&mut data);
        assert_eq!(data[[0, 0]], 0.0);
        assert_eq!(data[[1, 1]], 255.0);
        assert!((data[[0, 1]] - 51.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_flat_image() {
        let mut data = Array2::from_elem((3, 3), 128.0);
        normalize(&mut data);
        assert!(data.iter().all(|&gray| gray == 0.0));
    }

    #[test]
    fn test_quantize_to_levels() {
        let mut data = array![[0.0, 31.9, 32.0, 255.0]];
        quantize(&mut data, 8);
        assert_eq!(data, array![[0.0, 0.0, 32.0, 224.0]]);
    }

    #[test]
    fn test_feed_for_shade() {
        let settings = RasterSettings::default();
        assert_eq!(settings.feed_for_shade(0), 10.0);
        assert_eq!(settings.feed_for_shade(7), 30.0);
    }

    #[test]
    fn test_serpentine_program() {
        let settings = RasterSettings {
            size_x: 2.0,
            size_y: 1.0,
            columns: 3,
            rows: 2,
            ..RasterSettings::default()
        };
        // One shade change in the first row, flat second row
        let data = array![[0.0, 0.0, 224.0], [0.0, 0.0, 0.0]];
        let (lines, stats) = program(&data, &settings);

        assert_eq!(
            lines,
            vec![
                "G90",
                "G20",
                "G94",
                "G0 X0.0000 Y0.0000",
                "G1 X0.0000 Y0.0000 F10.0000",
                "G1 X2.0000 Y0.0000 F30.0000",
                "G1 X2.0000 Y1.0000 F10.0000",
                "G1 X0.0000 Y1.0000 F10.0000",
            ]
        );
        assert_eq!(stats, RasterStats { pixels: 6, moves: 4 });
        assert!((stats.pixels_per_move() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_degenerate_grid() {
        let data = Array2::zeros((1, 4));
        let settings = RasterSettings::default();
        assert!(matches!(
            generate(&data, &settings, Vec::new()),
            Err(SolarplotError::Config(_))
        ));

        let settings = RasterSettings {
            shades: 1,
            ..RasterSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_image_pipeline() {
        // Left half black, right half white
        let image = RgbImage::from_fn(64, 64, |x, _| {
            if x < 32 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let dir = tempdir().unwrap();
        let path = dir.path().join("halves.png");
        image.save(&path).unwrap();

        let loaded = load(&path).unwrap();
        let mut data = grayscale(&loaded, 8, 4);
        assert_eq!(data.dim(), (4, 8));

        normalize(&mut data);
        quantize(&mut data, 8);
        assert_eq!(data[[0, 0]], 0.0);
        assert_eq!(data[[0, 7]], 224.0);

        let settings = RasterSettings {
            columns: 8,
            rows: 4,
            ..RasterSettings::default()
        };
        let (lines, stats) = program(&data, &settings);
        assert_eq!(stats.pixels, 32);
        assert!(lines.iter().skip(4).all(|line| line.starts_with("G1 ")));

        let big = preview(&data, 80, 40);
        assert_eq!(big.dimensions(), (80, 40));
        assert_eq!(big.get_pixel(0, 0)[0], 0);
        assert_eq!(big.get_pixel(79, 0)[0], 224);
    }
}
