//! Image Surface capability and image providers.
//!
//! The core never touches a GPU. It needs rectangle slicing, offset drawing,
//! filling and scaling, expressed by [`ImageSurface`]. macroquad's CPU-side
//! [`Image`] implements it, so maps load and compose without a window.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use macroquad::prelude::{Color, Image, Rect, Vec2};

use crate::tile::Flip;

/// Pixel buffer operations the loader and composer rely on.
pub trait ImageSurface: Sized {
    /// A fully transparent surface of the given size.
    fn blank(width: u32, height: u32) -> Self;

    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Copies `src_rect` of `src` onto `self` with its top-left at `dst`,
    /// applying `flip`. Pixels falling outside `self` are clipped.
    fn draw_sub_image_flipped(&mut self, src: &Self, src_rect: Rect, dst: Vec2, flip: Flip);

    /// Fills `rect` (clipped to the surface) with `color`.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// A resampled copy of the whole surface.
    fn resized(&self, width: u32, height: u32) -> Self;

    /// An independent copy of `rect` (clipped to the surface).
    fn sub_view(&self, rect: Rect) -> Self;

    /// [`draw_sub_image_flipped`](Self::draw_sub_image_flipped) without flags.
    fn draw_sub_image(&mut self, src: &Self, src_rect: Rect, dst: Vec2) {
        self.draw_sub_image_flipped(src, src_rect, dst, Flip::NONE);
    }
}

/// Source of decoded images for tilesets.
pub trait ImageProvider {
    /// Surface type produced.
    type Surface: ImageSurface;

    /// Loads the image at `path` (already joined with the referencing
    /// document's directory).
    fn load_image(&mut self, path: &Path) -> anyhow::Result<Self::Surface>;
}

/// Reads image files from disk and decodes them with macroquad.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageProvider;

impl ImageProvider for FileImageProvider {
    type Surface = Image;

    fn load_image(&mut self, path: &Path) -> anyhow::Result<Image> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Reading image {}", path.display()))?;
        Image::from_file_with_format(&bytes, None)
            .map_err(|e| anyhow!("Decoding image {}: {e}", path.display()))
    }
}

/// Serves pre-decoded images, for embedded assets and tests.
///
/// Lookup is by exact path first, then by file name.
#[derive(Default, Clone)]
pub struct MemoryImageProvider {
    images: HashMap<PathBuf, Image>,
}

impl MemoryImageProvider {
    /// Provider with no images.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `image` under `path`.
    pub fn insert(&mut self, path: impl Into<PathBuf>, image: Image) -> &mut Self {
        self.images.insert(path.into(), image);
        self
    }
}

impl ImageProvider for MemoryImageProvider {
    type Surface = Image;

    fn load_image(&mut self, path: &Path) -> anyhow::Result<Image> {
        if let Some(img) = self.images.get(path) {
            return Ok(img.clone());
        }
        let name = path.file_name();
        self.images
            .iter()
            .find(|(k, _)| k.file_name().is_some() && k.file_name() == name)
            .map(|(_, img)| img.clone())
            .ok_or_else(|| anyhow!("No image registered for {}", path.display()))
    }
}

const MAX_DIM: u32 = u16::MAX as u32;

fn clamp_dim(v: u32) -> u16 {
    if v > MAX_DIM {
        log::warn!("surface dimension {v} clamped to {MAX_DIM}");
    }
    v.min(MAX_DIM) as u16
}

fn color_bytes(c: Color) -> [u8; 4] {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [q(c.r), q(c.g), q(c.b), q(c.a)]
}

/// Source-over blend of `src` onto `dst`.
fn blend(dst: &mut [u8], src: [u8; 4]) {
    match src[3] {
        0 => {}
        255 => dst.copy_from_slice(&src),
        a => {
            let a = a as u32;
            let inv = 255 - a;
            for i in 0..3 {
                dst[i] = ((src[i] as u32 * a + dst[i] as u32 * inv) / 255) as u8;
            }
            dst[3] = (a + dst[3] as u32 * inv / 255).min(255) as u8;
        }
    }
}

/// Integer pixel bounds of `rect` intersected with `0..w` x `0..h`.
fn clip(rect: Rect, w: u32, h: u32) -> (u32, u32, u32, u32) {
    let x0 = rect.x.floor().max(0.0) as u32;
    let y0 = rect.y.floor().max(0.0) as u32;
    let x1 = ((rect.x + rect.w).ceil().max(0.0) as u32).min(w);
    let y1 = ((rect.y + rect.h).ceil().max(0.0) as u32).min(h);
    (x0.min(x1), y0.min(y1), x1, y1)
}

#[inline]
fn px(img: &Image, x: u32, y: u32) -> usize {
    (y as usize * img.width as usize + x as usize) * 4
}

impl ImageSurface for Image {
    fn blank(width: u32, height: u32) -> Self {
        let (w, h) = (clamp_dim(width), clamp_dim(height));
        Image {
            bytes: vec![0; w as usize * h as usize * 4],
            width: w,
            height: h,
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    fn draw_sub_image_flipped(&mut self, src: &Self, src_rect: Rect, dst: Vec2, flip: Flip) {
        let (sx0, sy0, sx1, sy1) = clip(src_rect, src.width as u32, src.height as u32);
        let (sw, sh) = (sx1 - sx0, sy1 - sy0);
        if sw == 0 || sh == 0 {
            return;
        }
        let (ow, oh) = if flip.diagonal { (sh, sw) } else { (sw, sh) };
        let dx0 = dst.x.round() as i64;
        let dy0 = dst.y.round() as i64;
        let (tw, th) = (self.width as i64, self.height as i64);

        for v in 0..oh {
            let ty = dy0 + v as i64;
            if ty < 0 || ty >= th {
                continue;
            }
            for u in 0..ow {
                let tx = dx0 + u as i64;
                if tx < 0 || tx >= tw {
                    continue;
                }
                let uu = if flip.horizontal { ow - 1 - u } else { u };
                let vv = if flip.vertical { oh - 1 - v } else { v };
                let (sx, sy) = if flip.diagonal { (vv, uu) } else { (uu, vv) };
                let si = px(src, sx0 + sx, sy0 + sy);
                let pixel = [
                    src.bytes[si],
                    src.bytes[si + 1],
                    src.bytes[si + 2],
                    src.bytes[si + 3],
                ];
                let di = px(self, tx as u32, ty as u32);
                blend(&mut self.bytes[di..di + 4], pixel);
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let (x0, y0, x1, y1) = clip(rect, self.width as u32, self.height as u32);
        let c = color_bytes(color);
        for y in y0..y1 {
            for x in x0..x1 {
                let i = px(self, x, y);
                blend(&mut self.bytes[i..i + 4], c);
            }
        }
    }

    fn resized(&self, width: u32, height: u32) -> Self {
        let mut out = <Image as ImageSurface>::blank(width, height);
        let (sw, sh) = (self.width as u32, self.height as u32);
        if sw == 0 || sh == 0 {
            return out;
        }
        let (ow, oh) = (out.width as u32, out.height as u32);
        for y in 0..oh {
            let sy = (y as u64 * sh as u64 / oh as u64) as u32;
            for x in 0..ow {
                let sx = (x as u64 * sw as u64 / ow as u64) as u32;
                let si = px(self, sx, sy);
                let di = px(&out, x, y);
                out.bytes[di..di + 4].copy_from_slice(&self.bytes[si..si + 4]);
            }
        }
        out
    }

    fn sub_view(&self, rect: Rect) -> Self {
        let (x0, y0, x1, y1) = clip(rect, self.width as u32, self.height as u32);
        let mut out = <Image as ImageSurface>::blank(x1 - x0, y1 - y0);
        let row = (x1 - x0) as usize * 4;
        for y in y0..y1 {
            let si = px(self, x0, y);
            let di = px(&out, 0, y - y0);
            out.bytes[di..di + row].copy_from_slice(&self.bytes[si..si + row]);
        }
        out
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn pixel(img: &Image, x: u32, y: u32) -> [u8; 4] {
        let i = px(img, x, y);
        [img.bytes[i], img.bytes[i + 1], img.bytes[i + 2], img.bytes[i + 3]]
    }

    /// 2x2 image with distinct opaque corners.
    fn corners() -> Image {
        let mut img = <Image as ImageSurface>::blank(2, 2);
        img.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::from_rgba(255, 0, 0, 255));
        img.fill_rect(Rect::new(1.0, 0.0, 1.0, 1.0), Color::from_rgba(0, 255, 0, 255));
        img.fill_rect(Rect::new(0.0, 1.0, 1.0, 1.0), Color::from_rgba(0, 0, 255, 255));
        img.fill_rect(Rect::new(1.0, 1.0, 1.0, 1.0), Color::from_rgba(255, 255, 255, 255));
        img
    }

    #[test]
    fn blank_is_transparent_and_sized() {
        let img = <Image as ImageSurface>::blank(3, 2);
        assert_eq!(img.dimensions(), (3, 2));
        assert!(img.bytes.iter().all(|b| *b == 0));
    }

    #[test]
    fn draw_clips_to_target() {
        let src = corners();
        let mut dst = <Image as ImageSurface>::blank(2, 2);
        dst.draw_sub_image(&src, Rect::new(0.0, 0.0, 2.0, 2.0), Vec2::new(1.0, 1.0));
        assert_eq!(pixel(&dst, 1, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(&dst, 0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn horizontal_flip_mirrors_columns() {
        let src = corners();
        let mut dst = <Image as ImageSurface>::blank(2, 2);
        let flip = Flip {
            horizontal: true,
            ..Flip::NONE
        };
        dst.draw_sub_image_flipped(&src, Rect::new(0.0, 0.0, 2.0, 2.0), Vec2::ZERO, flip);
        assert_eq!(pixel(&dst, 0, 0), [0, 255, 0, 255]);
        assert_eq!(pixel(&dst, 1, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn diagonal_flip_transposes() {
        let src = corners();
        let mut dst = <Image as ImageSurface>::blank(2, 2);
        let flip = Flip {
            diagonal: true,
            ..Flip::NONE
        };
        dst.draw_sub_image_flipped(&src, Rect::new(0.0, 0.0, 2.0, 2.0), Vec2::ZERO, flip);
        assert_eq!(pixel(&dst, 1, 0), [0, 0, 255, 255]);
        assert_eq!(pixel(&dst, 0, 1), [0, 255, 0, 255]);
    }

    #[test]
    fn vertical_flip_mirrors_rows() {
        let src = corners();
        let mut dst = <Image as ImageSurface>::blank(2, 2);
        let flip = Flip {
            vertical: true,
            ..Flip::NONE
        };
        dst.draw_sub_image_flipped(&src, Rect::new(0.0, 0.0, 2.0, 2.0), Vec2::ZERO, flip);
        assert_eq!(pixel(&dst, 0, 0), [0, 0, 255, 255]);
        assert_eq!(pixel(&dst, 1, 0), [255, 255, 255, 255]);
        assert_eq!(pixel(&dst, 0, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(&dst, 1, 1), [0, 255, 0, 255]);
    }

    #[test]
    fn diagonal_then_horizontal_rotates_clockwise() {
        let src = corners();
        let mut dst = <Image as ImageSurface>::blank(2, 2);
        let flip = Flip {
            diagonal: true,
            horizontal: true,
            ..Flip::NONE
        };
        dst.draw_sub_image_flipped(&src, Rect::new(0.0, 0.0, 2.0, 2.0), Vec2::ZERO, flip);
        // red green / blue white turned a quarter clockwise
        assert_eq!(pixel(&dst, 0, 0), [0, 0, 255, 255]);
        assert_eq!(pixel(&dst, 1, 0), [255, 0, 0, 255]);
        assert_eq!(pixel(&dst, 0, 1), [255, 255, 255, 255]);
        assert_eq!(pixel(&dst, 1, 1), [0, 255, 0, 255]);
    }

    #[test]
    fn diagonal_flip_on_non_square_region_swaps_extent() {
        let src = corners();
        let mut dst = <Image as ImageSurface>::blank(2, 2);
        let flip = Flip {
            diagonal: true,
            ..Flip::NONE
        };
        dst.draw_sub_image_flipped(&src, Rect::new(0.0, 0.0, 2.0, 1.0), Vec2::ZERO, flip);
        assert_eq!(pixel(&dst, 0, 0), [255, 0, 0, 255]);
        assert_eq!(pixel(&dst, 0, 1), [0, 255, 0, 255]);
        assert_eq!(pixel(&dst, 1, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn sub_view_and_resize() {
        let src = corners();
        let view = src.sub_view(Rect::new(1.0, 0.0, 1.0, 2.0));
        assert_eq!(view.dimensions(), (1, 2));
        assert_eq!(pixel(&view, 0, 1), [255, 255, 255, 255]);

        let big = src.resized(4, 4);
        assert_eq!(big.dimensions(), (4, 4));
        assert_eq!(pixel(&big, 3, 0), [0, 255, 0, 255]);
        assert_eq!(pixel(&big, 1, 1), [255, 0, 0, 255]);
    }

    #[test]
    fn memory_provider_falls_back_to_file_name() {
        let mut provider = MemoryImageProvider::new();
        provider.insert("tiles.png", corners());
        let img = provider
            .load_image(Path::new("/some/map/dir/tiles.png"))
            .expect("registered by file name");
        assert_eq!(img.dimensions(), (2, 2));
        assert!(provider.load_image(Path::new("other.png")).is_err());
    }
}
