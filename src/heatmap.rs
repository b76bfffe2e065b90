use crate::model::ShotEvent;

pub const DEFAULT_COLS: usize = 24;
pub const DEFAULT_ROWS: usize = 16;
pub const INTENSITY_CEILING: f64 = 0.9;

/// Which end of the half the local x axis points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfConvention {
    /// -1 at the goal being attacked, +1 at halfway.
    Attacked,
    /// -1 at halfway, +1 at the goal line.
    Defended,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirroredShot {
    /// Depth from the goal line: 0 at the goal, 1 at halfway.
    pub u: f64,
    /// Lateral position across the pitch in [0, 1].
    pub v: f64,
    pub local_x: f64,
}

/// Folds a shot into the canonical half. Shots recorded past midfield are reflected
/// through the centre spot, which keeps the side of the pitch they came from.
pub fn mirror_shot(x: f64, y: f64, convention: HalfConvention) -> MirroredShot {
    let x = x.clamp(0.0, 1.0);
    let y = y.clamp(0.0, 1.0);
    let (fx, fy) = if x > 0.5 { (1.0 - x, 1.0 - y) } else { (x, y) };
    let u = (2.0 * fx).clamp(0.0, 1.0);
    let local_x = match convention {
        HalfConvention::Attacked => 2.0 * u - 1.0,
        HalfConvention::Defended => 1.0 - 2.0 * u,
    };
    MirroredShot { u, v: fy, local_x }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapGrid {
    pub cols: usize,
    pub rows: usize,
    cells: Vec<f64>,
    max: f64,
}

impl HeatmapGrid {
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cells: vec![0.0; cols * rows],
            max: 0.0,
        }
    }

    /// Accumulates each shot's xG into its cell.
    pub fn bin(shots: &[ShotEvent], cols: usize, rows: usize, convention: HalfConvention) -> Self {
        let mut grid = Self::new(cols, rows);
        for shot in shots {
            grid.add(shot.x, shot.y, shot.xg, convention);
        }
        grid
    }

    pub fn add(&mut self, x: f64, y: f64, weight: f64, convention: HalfConvention) {
        if !weight.is_finite() || weight <= 0.0 {
            return;
        }
        let shot = mirror_shot(x, y, convention);
        let (col, row) = self.cell_of(&shot);
        let idx = row * self.cols + col;
        self.cells[idx] += weight;
        if self.cells[idx] > self.max {
            self.max = self.cells[idx];
        }
    }

    fn cell_of(&self, shot: &MirroredShot) -> (usize, usize) {
        let col = (((shot.local_x + 1.0) / 2.0) * self.cols as f64).floor() as usize;
        let row = (shot.v * self.rows as f64).floor() as usize;
        (col.min(self.cols - 1), row.min(self.rows - 1))
    }

    pub fn value(&self, col: usize, row: usize) -> f64 {
        if col >= self.cols || row >= self.rows {
            return 0.0;
        }
        self.cells[row * self.cols + col]
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        self.max <= 0.0
    }

    /// Cell value relative to the hottest cell, capped below fully saturated.
    pub fn intensity(&self, col: usize, row: usize) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.value(col, row) / self.max).clamp(0.0, INTENSITY_CEILING)
    }
}
