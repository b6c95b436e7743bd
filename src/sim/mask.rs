//! Bit masks for silhouette-accurate collision
//!
//! Birds and pipes collide on their opaque pixels, not their bounding boxes.
//! A mask stores one bit per pixel, rows packed into `u64` words, so an overlap
//! test compares 64 pixels at a time.

use glam::IVec2;

/// A packed 1-bit-per-pixel silhouette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl Mask {
    /// Create an empty (fully transparent) mask
    pub fn new(width: u32, height: u32) -> Self {
        let words_per_row = (width as usize).div_ceil(64);
        Self {
            width,
            height,
            words_per_row,
            bits: vec![0; words_per_row * height as usize],
        }
    }

    /// Build a mask by evaluating `solid` for every pixel
    pub fn from_fn(width: u32, height: u32, mut solid: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if solid(x, y) {
                    mask.set(x, y);
                }
            }
        }
        mask
    }

    /// Oval bird silhouette inscribed in `width` x `height`
    pub fn bird(width: u32, height: u32) -> Self {
        let rx = width as f32 / 2.0;
        let ry = height as f32 / 2.0;
        Self::from_fn(width, height, |x, y| {
            let dx = (x as f32 + 0.5 - rx) / rx;
            let dy = (y as f32 + 0.5 - ry) / ry;
            dx * dx + dy * dy <= 1.0
        })
    }

    /// Upright pipe: a full-width cap on top of a body inset on both sides
    pub fn pipe(width: u32, height: u32, cap_height: u32, body_inset: u32) -> Self {
        Self::from_fn(width, height, |x, y| {
            y < cap_height || (x >= body_inset && x < width - body_inset)
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set(&mut self, x: u32, y: u32) {
        debug_assert!(x < self.width && y < self.height);
        let idx = y as usize * self.words_per_row + x as usize / 64;
        self.bits[idx] |= 1u64 << (x % 64);
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y as usize * self.words_per_row + x as usize / 64;
        self.bits[idx] & (1u64 << (x % 64)) != 0
    }

    /// Number of solid pixels
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// Mirror top-to-bottom (an upright pipe becomes a hanging one)
    pub fn flipped_vertical(&self) -> Self {
        let mut flipped = Self::new(self.width, self.height);
        let wpr = self.words_per_row;
        for y in 0..self.height as usize {
            let src = (self.height as usize - 1 - y) * wpr;
            flipped.bits[y * wpr..(y + 1) * wpr].copy_from_slice(&self.bits[src..src + wpr]);
        }
        flipped
    }

    /// Read up to 64 pixels of row `y` starting at column `x`
    fn window(&self, y: u32, x: u32, len: u32) -> u64 {
        debug_assert!(len > 0 && len <= 64 && x + len <= self.width);
        let row = y as usize * self.words_per_row;
        let word = x as usize / 64;
        let shift = x % 64;

        let mut bits = self.bits[row + word] >> shift;
        if shift > 0 && word + 1 < self.words_per_row {
            bits |= self.bits[row + word + 1] << (64 - shift);
        }
        if len < 64 { bits & ((1u64 << len) - 1) } else { bits }
    }

    /// First solid pixel shared with `other`, whose top-left corner sits at
    /// `offset` in this mask's coordinates
    pub fn overlap(&self, other: &Mask, offset: IVec2) -> Option<IVec2> {
        let x0 = offset.x.max(0);
        let y0 = offset.y.max(0);
        let x1 = (offset.x + other.width as i32).min(self.width as i32);
        let y1 = (offset.y + other.height as i32).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        for y in y0..y1 {
            let mut x = x0;
            while x < x1 {
                let len = (x1 - x).min(64) as u32;
                let mine = self.window(y as u32, x as u32, len);
                let theirs = other.window((y - offset.y) as u32, (x - offset.x) as u32, len);
                let shared = mine & theirs;
                if shared != 0 {
                    return Some(IVec2::new(x + shared.trailing_zeros() as i32, y));
                }
                x += len as i32;
            }
        }
        None
    }

    #[inline]
    pub fn overlaps(&self, other: &Mask, offset: IVec2) -> bool {
        self.overlap(other, offset).is_some()
    }
}
