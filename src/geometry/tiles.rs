// magick/src/geometry/tiles.rs
use super::GeometrySpec;
use crate::core::{MagickError, Result};

/// A rectangle inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether this rectangle lies inside a `width x height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

/// How a frame is cut into tiles.
///
/// Each axis is cut on its own. A percentage gives `ceil(100 / percent)`
/// columns (rows) with edges at `floor(i * size * percent / 100)`, so every
/// tile is non-empty and the tiles cover the frame exactly. A pixel size gives
/// tiles of that size with the last column (row) clipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    pub columns: u32,
    pub rows: u32,
    col_edges: Vec<u32>,
    row_edges: Vec<u32>,
}

impl TileGrid {
    pub fn for_geometry(spec: &GeometrySpec, source_width: u32, source_height: u32) -> Result<Self> {
        if source_width == 0 || source_height == 0 {
            return Err(MagickError::Operation("Cannot tile an empty frame".to_string()));
        }

        let col_edges = match spec.width_percentage() {
            Some(p) => percent_edges(p, source_width)?,
            None => pixel_edges(spec.width.unwrap_or(source_width), source_width),
        };
        let row_edges = match spec.height_percentage() {
            Some(p) => percent_edges(p, source_height)?,
            None => pixel_edges(spec.height.unwrap_or(source_height), source_height),
        };

        let grid = Self {
            columns: col_edges.len() as u32 - 1,
            rows: row_edges.len() as u32 - 1,
            col_edges,
            row_edges,
        };
        log::debug!(
            "Tile grid for {} on {}x{}: {} columns x {} rows",
            spec,
            source_width,
            source_height,
            grid.columns,
            grid.rows
        );
        Ok(grid)
    }

    pub fn len(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tile rectangles in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Region> + '_ {
        self.row_edges.windows(2).flat_map(move |rows| {
            self.col_edges
                .windows(2)
                .map(move |cols| Region::new(cols[0], rows[0], cols[1] - cols[0], rows[1] - rows[0]))
        })
    }
}

fn percent_edges(percent: u32, size: u32) -> Result<Vec<u32>> {
    if percent == 0 {
        return Err(MagickError::Parse("Tile percentage must be positive".to_string()));
    }

    let count = 100u32.div_ceil(percent);
    if (size as u64) * (percent.min(100) as u64) < 100 {
        return Err(MagickError::Operation(format!(
            "{}px is too small for {}% tiles",
            size, percent
        )));
    }

    let mut edges: Vec<u32> = (0..count)
        .map(|i| ((i as u64 * size as u64 * percent as u64) / 100) as u32)
        .collect();
    edges.push(size);
    Ok(edges)
}

fn pixel_edges(tile: u32, size: u32) -> Vec<u32> {
    let tile = tile.max(1);
    let mut edges: Vec<u32> = (0..size.div_ceil(tile)).map(|i| i * tile).collect();
    edges.push(size);
    edges
}
