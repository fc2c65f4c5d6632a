use crate::tile::Tile;

/// Per-pixel escape counts for a full frame, row-major, row 0 at the top.
///
/// Every value lies in `[0, max_iter]`; `max_iter` marks a sample that never
/// escaped. Keeping counts separate from colours lets a palette change
/// recolour without re-evaluating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationGrid {
    pub width: u32,
    pub height: u32,
    pub max_iter: u32,
    pub data: Vec<u32>,
}

impl IterationGrid {
    /// A grid where every sample is marked interior.
    pub fn new(width: u32, height: u32, max_iter: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            max_iter,
            data: vec![max_iter; size],
        }
    }

    #[inline]
    pub fn get(&self, px: u32, py: u32) -> u32 {
        self.data[py as usize * self.width as usize + px as usize]
    }

    /// Whether the sample at `(px, py)` stayed bounded for the whole budget.
    pub fn is_interior(&self, px: u32, py: u32) -> bool {
        self.get(px, py) >= self.max_iter
    }

    /// Number of samples that escaped.
    pub fn escaped_count(&self) -> usize {
        self.data.iter().filter(|&&n| n < self.max_iter).count()
    }

    /// Copy a tile's counts into the matching region.
    pub fn blit_tile(&mut self, tile: &Tile, tile_data: &[u32]) {
        debug_assert_eq!(tile_data.len(), tile.pixel_count());
        let tw = tile.width as usize;
        for row in 0..tile.height as usize {
            let dst_start = (tile.y as usize + row) * self.width as usize + tile.x as usize;
            let src_start = row * tw;
            self.data[dst_start..dst_start + tw]
                .copy_from_slice(&tile_data[src_start..src_start + tw]);
        }
    }

    /// Map every count onto the 0–255 palette index range.
    pub fn normalized(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&n| normalize(n, self.max_iter))
            .collect()
    }
}

/// `floor(min(count, max_iter) * 255 / max_iter)`.
///
/// Interior samples land on 255; a zero budget maps everything to 0.
#[inline]
pub fn normalize(count: u32, max_iter: u32) -> u8 {
    if max_iter == 0 {
        return 0;
    }
    let clamped = count.min(max_iter) as u64;
    (clamped * 255 / max_iter as u64) as u8
}
