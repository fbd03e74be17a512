use super::DepthGrid;
use crate::config::GridConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Depth jump between horizontally adjacent cells, usually an obstacle
    /// silhouette.
    Obstacle,
    /// Depth jump between vertically adjacent cells, usually a curb, step or
    /// drop.
    Terrain,
}

/// Gradient edge between cell `(row, col)` and its right (obstacle) or lower
/// (terrain) neighbour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridEdge {
    pub row: usize,
    pub col: usize,
    pub kind: EdgeKind,
    pub jump: f32,
}

impl DepthGrid {
    /// Finds neighbouring cells whose depths differ by more than the
    /// configured gradient thresholds. Cells without data never form an edge.
    pub fn edges(&self, config: &GridConfig) -> Vec<GridEdge> {
        let mut edges = Vec::new();
        let (rows, cols) = (self.rows(), self.cols());

        for row in 0..rows {
            for col in 0..cols {
                let here = self.get(row, col);
                if !here.is_finite() {
                    continue;
                }

                if col + 1 < cols {
                    let right = self.get(row, col + 1);
                    if right.is_finite() && (right - here).abs() > config.h_gradient_threshold {
                        edges.push(GridEdge {
                            row,
                            col,
                            kind: EdgeKind::Obstacle,
                            jump: right - here,
                        });
                    }
                }
                if row + 1 < rows {
                    let below = self.get(row + 1, col);
                    if below.is_finite() && (below - here).abs() > config.v_gradient_threshold {
                        edges.push(GridEdge {
                            row,
                            col,
                            kind: EdgeKind::Terrain,
                            jump: below - here,
                        });
                    }
                }
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn finds_obstacle_and_terrain_edges() {
        let grid = DepthGrid::from_cells(array![
            [3.0, 3.2, 1.5],
            [2.0, 2.1, f32::INFINITY],
        ]);
        let edges = grid.edges(&GridConfig::default());

        assert!(edges.contains(&GridEdge {
            row: 0,
            col: 1,
            kind: EdgeKind::Obstacle,
            jump: 1.5 - 3.2,
        }));
        assert!(edges
            .iter()
            .any(|e| e.kind == EdgeKind::Terrain && e.row == 0 && e.col == 0));
        assert!(edges
            .iter()
            .any(|e| e.kind == EdgeKind::Terrain && e.row == 0 && e.col == 1));
        // No edge into or out of the empty cell.
        assert!(!edges.iter().any(|e| e.row == 0 && e.col == 2));
        assert_eq!(edges.len(), 3);
    }
}
