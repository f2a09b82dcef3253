use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use image::{ImageBuffer, Rgba};

pub struct Writer {}

impl Writer {
    pub fn write_png(
        output_path: &PathBuf,
        width: u32,
        height: u32,
        pixels: &[u32],
    ) -> Result<(), std::io::Error> {
        Writer::validate_pixel_count(width, height, pixels)?;

        let mut rgba = Vec::with_capacity(pixels.len() * 4);

        for &pixel in pixels {
            rgba.push(((pixel >> 16) & 0xFF) as u8);
            rgba.push(((pixel >> 8) & 0xFF) as u8);
            rgba.push((pixel & 0xFF) as u8);
            rgba.push(((pixel >> 24) & 0xFF) as u8);
        }

        let buffer = match ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(width, height, rgba) {
            Some(buffer) => buffer,
            None => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "Pixel data does not fill the image buffer",
                ));
            }
        };

        buffer
            .save_with_format(output_path, image::ImageFormat::Png)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

        Ok(())
    }

    pub fn write_ppm(
        output_path: &PathBuf,
        width: u32,
        height: u32,
        pixels: &[u32],
    ) -> Result<(), std::io::Error> {
        Writer::validate_pixel_count(width, height, pixels)?;

        let mut file = File::create(output_path)?;

        file.write_all(b"P6\n")?;
        file.write_all(format!("{} {}\n", width, height).as_bytes())?;
        file.write_all(b"255\n")?;

        for &pixel in pixels {
            let r = ((pixel >> 16) & 0xFF) as u8;
            let g = ((pixel >> 8) & 0xFF) as u8;
            let b = (pixel & 0xFF) as u8;

            file.write_all(&[r, g, b])?;
        }

        Ok(())
    }

    fn validate_pixel_count(width: u32, height: u32, pixels: &[u32]) -> Result<(), std::io::Error> {
        let expected_size = width as usize * height as usize;
        let actual_size = pixels.len();

        if expected_size != actual_size {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "Invalid pixel data size for {}x{} image: expected {} pixels, got {}",
                    width, height, expected_size, actual_size
                ),
            ));
        }
        Ok(())
    }
}
