use crate::radiance::RadianceSource;
use crate::sampling::{plane_to_sphere, sphere_to_plane};
use anyhow::{bail, Context, Result};
use glam::{Vec2, Vec3};
use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use std::path::Path;

/// Equirectangular radiance image in linear float RGB.
///
/// Column `x` covers `theta = 2π x / width` and row `y` covers
/// `phi = π y / height`, matching [`plane_to_sphere`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl EnvironmentMap {
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Vec3>) -> Result<Self> {
        if width == 0 || height == 0 {
            bail!("Environment map must not be empty ({width}x{height})");
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            bail!("Environment map {width}x{height} expects {expected} pixels, got {}", pixels.len());
        }
        Ok(Self { width, height, pixels })
    }

    /// Fills texel `(x, y)` with `f` evaluated at `plane_to_sphere(x / width, y / height)`.
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Result<Self>
    where
        F: Fn(Vec3) -> Vec3,
    {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            let v = y as f32 / height as f32;
            for x in 0..width {
                let u = x as f32 / width as f32;
                pixels.push(f(plane_to_sphere(Vec2::new(u, v))));
            }
        }
        Self::from_pixels(width, height, pixels)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = ImageReader::open(path)
            .with_context(|| format!("Failed to open environment '{}'", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("Failed to detect format of '{}'", path.display()))?;
        let image =
            reader.decode().with_context(|| format!("Failed to decode environment '{}'", path.display()))?;
        Self::from_image(&image)
    }

    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let rgb = image.to_rgb32f();
        let pixels = rgb.pixels().map(|pixel| Vec3::from_array(pixel.0)).collect();
        Self::from_pixels(rgb.width(), rgb.height(), pixels)
    }

    /// Sky-to-ground gradient with a small warm sun, handy when no capture is at hand.
    pub fn neutral_gradient(width: u32, height: u32) -> Result<Self> {
        let sun = Vec3::new(0.4, 0.3, 0.85).normalize();
        Self::from_fn(width, height, |dir| {
            let up = dir.z.clamp(-1.0, 1.0);
            let sky = Vec3::new(0.25, 0.35, 0.6).lerp(Vec3::new(0.65, 0.7, 0.9), up.max(0.0));
            let ground = Vec3::new(0.08, 0.07, 0.05).lerp(Vec3::new(0.2, 0.18, 0.16), (up + 1.0).min(1.0));
            let base = if up >= 0.0 { sky } else { ground };
            let glow = dir.dot(sun).max(0.0).powf(64.0);
            base + Vec3::new(1.0, 0.9, 0.75) * glow * 8.0
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Bilinear lookup with texel `(x, y)` at `(x / width, y / height)`.
    /// Wraps horizontally and clamps vertically.
    pub fn get(&self, u: f32, v: f32) -> Vec3 {
        let x = u * self.width as f32;
        let y = v * self.height as f32;
        let x0 = x.floor();
        let y0 = y.floor();
        let tx = x - x0;
        let ty = y - y0;

        let width = self.width as f32;
        let max_y = (self.height - 1) as f32;
        let ix0 = x0.rem_euclid(width) as u32 % self.width;
        let ix1 = (x0 + 1.0).rem_euclid(width) as u32 % self.width;
        let iy0 = y0.clamp(0.0, max_y) as u32;
        let iy1 = (y0 + 1.0).clamp(0.0, max_y) as u32;

        let c00 = self.pixel(ix0, iy0);
        let c10 = self.pixel(ix1, iy0);
        let c01 = self.pixel(ix0, iy1);
        let c11 = self.pixel(ix1, iy1);

        let c0 = c00 * (1.0 - tx) + c10 * tx;
        let c1 = c01 * (1.0 - tx) + c11 * tx;
        c0 * (1.0 - ty) + c1 * ty
    }

    pub fn get_spherical(&self, direction: Vec3) -> Vec3 {
        let uv = sphere_to_plane(direction);
        self.get(uv.x, uv.y)
    }

    /// Clamps to `[0, 1]` and writes an 8-bit image in any format `image` can encode.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut out = RgbImage::new(self.width, self.height);
        for (x, y, pixel) in out.enumerate_pixels_mut() {
            let color = self.pixel(x, y).clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
            *pixel = Rgb([color.x.round() as u8, color.y.round() as u8, color.z.round() as u8]);
        }
        out.save(path).with_context(|| format!("Failed to write image '{}'", path.display()))
    }
}

impl RadianceSource for EnvironmentMap {
    fn radiance(&self, direction: Vec3) -> Vec3 {
        self.get_spherical(direction)
    }
}
