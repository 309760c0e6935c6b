//! Terrain grid - smoothed noise classified into terrain kinds

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Water,
    Plains,
    Forest,
    Mountains,
    Desert,
}

impl Terrain {
    pub fn from_noise(value: f64) -> Self {
        if value < 0.3 {
            Terrain::Water
        } else if value < 0.5 {
            Terrain::Plains
        } else if value < 0.7 {
            Terrain::Forest
        } else if value < 0.85 {
            Terrain::Mountains
        } else {
            Terrain::Desert
        }
    }

    pub fn fertility(&self) -> f64 {
        match self {
            Terrain::Water => 0.0,
            Terrain::Plains => 0.8,
            Terrain::Mountains => 0.2,
            Terrain::Desert => 0.1,
            Terrain::Forest => 0.7,
        }
    }

    pub fn habitability(&self) -> f64 {
        match self {
            Terrain::Water => 0.0,
            Terrain::Plains => 0.9,
            Terrain::Mountains => 0.3,
            Terrain::Desert => 0.2,
            Terrain::Forest => 0.6,
        }
    }

    pub fn is_land(&self) -> bool {
        *self != Terrain::Water
    }
}

/// Row-major grid of terrain cells
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainGrid {
    pub cols: usize,
    pub rows: usize,
    cells: Vec<Terrain>,
}

impl TerrainGrid {
    /// Uniform noise smoothed by a 3x3 box average, then classified
    pub fn generate(cols: usize, rows: usize, rng: &mut impl Rng) -> Self {
        let noise: Vec<f64> = (0..cols * rows).map(|_| rng.gen::<f64>()).collect();

        let mut cells = Vec::with_capacity(cols * rows);
        for y in 0..rows {
            for x in 0..cols {
                let mut sum = 0.0;
                let mut count = 0;
                for ny in y.saturating_sub(1)..=(y + 1).min(rows - 1) {
                    for nx in x.saturating_sub(1)..=(x + 1).min(cols - 1) {
                        sum += noise[ny * cols + nx];
                        count += 1;
                    }
                }
                cells.push(Terrain::from_noise(sum / count as f64));
            }
        }

        Self { cols, rows, cells }
    }

    /// A grid of one terrain kind, handy for tests
    pub fn uniform(cols: usize, rows: usize, terrain: Terrain) -> Self {
        Self {
            cols,
            rows,
            cells: vec![terrain; cols * rows],
        }
    }

    /// True if the cell list covers exactly `cols` x `rows` and neither is zero
    pub fn is_well_formed(&self) -> bool {
        self.cols > 0 && self.rows > 0 && self.cols.checked_mul(self.rows) == Some(self.cells.len())
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.cols && (cell.y as usize) < self.rows
    }

    pub fn get(&self, cell: Cell) -> Option<Terrain> {
        if !self.contains(cell) {
            return None;
        }
        self.cells.get(cell.y as usize * self.cols + cell.x as usize).copied()
    }

    pub fn land_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().enumerate().filter(|(_, t)| t.is_land()).map(move |(i, _)| {
            Cell::new((i % self.cols) as i32, (i / self.cols) as i32)
        })
    }

    pub fn count(&self, terrain: Terrain) -> usize {
        self.cells.iter().filter(|t| **t == terrain).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_noise_classification() {
        assert_eq!(Terrain::from_noise(0.1), Terrain::Water);
        assert_eq!(Terrain::from_noise(0.3), Terrain::Plains);
        assert_eq!(Terrain::from_noise(0.6), Terrain::Forest);
        assert_eq!(Terrain::from_noise(0.8), Terrain::Mountains);
        assert_eq!(Terrain::from_noise(0.9), Terrain::Desert);
    }

    #[test]
    fn test_generate_dimensions() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let grid = TerrainGrid::generate(20, 15, &mut rng);
        assert_eq!(grid.cols, 20);
        assert_eq!(grid.rows, 15);
        assert!(grid.get(Cell::new(19, 14)).is_some());
        assert!(grid.get(Cell::new(20, 0)).is_none());
        assert!(grid.get(Cell::new(-1, 0)).is_none());
    }

    #[test]
    fn test_well_formed_grid() {
        assert!(TerrainGrid::uniform(4, 3, Terrain::Plains).is_well_formed());
        let mut grid = TerrainGrid::uniform(4, 3, Terrain::Plains);
        grid.cols = 0;
        assert!(!grid.is_well_formed());
        grid.cols = 5;
        assert!(!grid.is_well_formed());
        assert!(!TerrainGrid::uniform(0, 0, Terrain::Plains).is_well_formed());
    }

    #[test]
    fn test_smoothing_pulls_toward_middle() {
        // Averages of uniform noise rarely reach the tails
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let grid = TerrainGrid::generate(60, 40, &mut rng);
        let land = grid.land_cells().count();
        assert!(land > grid.count(Terrain::Water));
    }

    #[test]
    fn test_fertility_table() {
        assert_eq!(Terrain::Plains.fertility(), 0.8);
        assert_eq!(Terrain::Water.habitability(), 0.0);
        assert!(!Terrain::Water.is_land());
    }
}
