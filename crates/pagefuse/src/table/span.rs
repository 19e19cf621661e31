//! Colspan/rowspan inference and the validity filter.

use crate::geometry::Rect;
use crate::types::Cell;

use super::grid::GridCell;

/// Containment threshold above which a smaller cell fully nested inside a
/// larger one is considered a detection artifact and dropped rather than
/// rendered as its own table cell.
const NESTED_INVALID_THRESHOLD: f32 = 0.1;

/// Turn grid-snapped cells plus their assigned content into final `Cell`s
/// with inferred spans, dropping any cell that a larger sibling swallows.
pub fn build_cells(x_grid: &[f32], y_grid: &[f32], snapped: &[Vec<GridCell>], contents: &[Vec<String>]) -> Vec<Vec<Cell>> {
    let flat: Vec<(&GridCell, &str)> = snapped
        .iter()
        .zip(contents)
        .flat_map(|(row, row_contents)| row.iter().zip(row_contents.iter().map(|s| s.as_str())))
        .collect();

    let rows = snapped.len();
    let mut out: Vec<Vec<Cell>> = vec![Vec::new(); rows];

    for &(grid_cell, content) in &flat {
        if is_invalid(grid_cell, &flat) {
            continue;
        }
        let colspan = col_span(&grid_cell.rect, x_grid);
        let rowspan = row_span(&grid_cell.rect, y_grid);
        out[grid_cell.row].push(Cell { rect: grid_cell.rect, content: content.to_string(), colspan, rowspan });
    }

    for row in &mut out {
        row.sort_by(|a, b| a.rect.x0.partial_cmp(&b.rect.x0).unwrap_or(std::cmp::Ordering::Equal));
    }
    out
}

/// A cell is invalid if some other cell strictly larger in area contains
/// more than [`NESTED_INVALID_THRESHOLD`] of it — a smaller duplicate that
/// slipped past de-overlap because it fell below the absorption threshold.
fn is_invalid(cell: &GridCell, all: &[(&GridCell, &str)]) -> bool {
    all.iter().any(|(other, _)| {
        other.rect.area() > cell.rect.area() && cell.rect.containment(&other.rect) > NESTED_INVALID_THRESHOLD && !std::ptr::eq(*other, cell)
    })
}

/// Number of grid columns this cell's span covers, counting grid lines
/// strictly between its snapped left and right edges.
fn col_span(rect: &Rect, x_grid: &[f32]) -> usize {
    span_count(rect.x0, rect.x1, x_grid)
}

fn row_span(rect: &Rect, y_grid: &[f32]) -> usize {
    span_count(rect.y0, rect.y1, y_grid)
}

fn span_count(start: f32, end: f32, grid: &[f32]) -> usize {
    let crossed = grid.iter().filter(|&&v| v > start + f32::EPSILON && v < end - f32::EPSILON).count();
    (crossed + 1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::grid::GridCell;

    fn gc(rect: Rect, row: usize, col: usize) -> GridCell {
        GridCell { rect, row, col }
    }

    /// rowspan: a cell taller than its neighbor's single row covers two
    /// row bands.
    #[test]
    fn tall_cell_gets_rowspan_two() {
        let y_grid = vec![0.0, 20.0, 40.0];
        let rect = Rect::new(0.0, 0.0, 50.0, 40.0);
        assert_eq!(row_span(&rect, &y_grid), 2);
    }

    /// colspan: a cell wider than its neighbors' single column covers
    /// two column bands.
    #[test]
    fn wide_cell_gets_colspan_two() {
        let x_grid = vec![0.0, 50.0, 100.0];
        let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
        assert_eq!(col_span(&rect, &x_grid), 2);
    }

    #[test]
    fn single_band_cell_has_span_one() {
        let grid = vec![0.0, 50.0, 100.0];
        assert_eq!(col_span(&Rect::new(0.0, 0.0, 50.0, 20.0), &grid), 1);
    }

    #[test]
    fn nested_small_cell_is_dropped_as_invalid() {
        let big = gc(Rect::new(0.0, 0.0, 100.0, 50.0), 0, 0);
        let small = gc(Rect::new(10.0, 10.0, 30.0, 30.0), 0, 0);
        let x_grid = vec![0.0, 100.0];
        let y_grid = vec![0.0, 50.0];
        let snapped = vec![vec![big, small]];
        let contents = vec![vec!["outer".to_string(), "inner".to_string()]];
        let cells = build_cells(&x_grid, &y_grid, &snapped, &contents);
        assert_eq!(cells[0].len(), 1);
        assert_eq!(cells[0][0].content, "outer");
    }
}
