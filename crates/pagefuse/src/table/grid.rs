//! Grid normalization: snap cell edges onto a shared coordinate grid so that
//! rowspan/colspan inference can compare cells by grid index rather than by
//! fuzzy pixel position.

use crate::geometry::Rect;

/// Maximum pixel distance between two edges for them to merge into one grid
/// line, rather than becoming distinct lines.
const SNAP_TOLERANCE: f32 = 4.0;

/// A cell's rect snapped onto the page's x/y grids, kept alongside its
/// original content.
#[derive(Debug, Clone)]
pub struct GridCell {
    pub rect: Rect,
    pub row: usize,
    pub col: usize,
}

/// Build the shared x and y grid lines and snap every row's cells onto them.
///
/// `rows` is the output of [`super::sweep::sweep_rows`] resolved back to
/// rects: one `Vec<Rect>` per reading-order row.
///
/// The x grid is built from the row(s) with the most columns (the finest
/// partition observed), since a row with fewer, wider cells is likely
/// spanning columns rather than defining new ones. The y grid is the set of
/// distinct row bands, one per input row.
pub fn normalize(rows: &[Vec<Rect>]) -> (Vec<f32>, Vec<f32>, Vec<Vec<GridCell>>) {
    let mut min_cols = usize::MAX;
    let mut max_cols = 0usize;
    for row in rows {
        min_cols = min_cols.min(row.len());
        max_cols = max_cols.max(row.len());
    }
    if rows.is_empty() {
        min_cols = 0;
        max_cols = 0;
    }

    let x_grid = build_x_grid(rows, max_cols);
    let y_grid = build_y_grid(rows);

    let snapped: Vec<Vec<GridCell>> = rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            row.iter()
                .map(|cell| {
                    let x0 = snap(&x_grid, cell.x0);
                    let x1 = snap(&x_grid, cell.x1);
                    let y0 = snap(&y_grid, cell.y0);
                    let y1 = snap(&y_grid, cell.y1);
                    GridCell {
                        rect: Rect::new(x0, y0, x1, y1),
                        row: row_idx,
                        col: col_index(&x_grid, x0),
                    }
                })
                .collect()
        })
        .collect();

    let _ = min_cols; // retained for callers inspecting table shape bounds
    (x_grid, y_grid, snapped)
}

/// Build x-axis grid lines from the row(s) with `max_cols` cells — the
/// finest observed column partition — averaging edges that fall within
/// [`SNAP_TOLERANCE`] of each other across those rows.
fn build_x_grid(rows: &[Vec<Rect>], max_cols: usize) -> Vec<f32> {
    let mut edges: Vec<f32> = Vec::new();
    for row in rows.iter().filter(|r| r.len() == max_cols) {
        for cell in row {
            push_running_average(&mut edges, cell.x0);
            push_running_average(&mut edges, cell.x1);
        }
    }
    edges.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    edges.dedup_by(|a, b| (*a - *b).abs() < SNAP_TOLERANCE);
    edges
}

/// Build y-axis grid lines from the shortest cells across the whole table —
/// the ones least likely to be rowspans — rather than per swept row: a
/// rowspan cell that the sweep merged in alongside its siblings would
/// otherwise tie on width with them and get picked as a row's own
/// representative edge, collapsing the very band it spans.
fn build_y_grid(rows: &[Vec<Rect>]) -> Vec<f32> {
    let flat: Vec<&Rect> = rows.iter().flatten().collect();
    let min_height = flat.iter().map(|c| c.height()).fold(f32::INFINITY, f32::min);

    let mut edges: Vec<f32> = Vec::new();
    for cell in flat.iter().filter(|c| c.height() <= min_height * 1.5) {
        push_running_average(&mut edges, cell.y0);
        push_running_average(&mut edges, cell.y1);
    }
    edges.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    edges.dedup_by(|a, b| (*a - *b).abs() < SNAP_TOLERANCE);
    edges
}

/// Merge `value` into `edges` as a running average if an existing entry is
/// within tolerance, otherwise append it as a new line.
fn push_running_average(edges: &mut Vec<f32>, value: f32) {
    if let Some(existing) = edges.iter_mut().find(|e| (**e - value).abs() < SNAP_TOLERANCE) {
        *existing = (*existing + value) / 2.0;
    } else {
        edges.push(value);
    }
}

/// Snap `value` to the nearest grid line, or leave it unchanged if the grid
/// is empty or every line is farther than [`SNAP_TOLERANCE`].
fn snap(grid: &[f32], value: f32) -> f32 {
    grid.iter()
        .min_by(|a, b| (**a - value).abs().partial_cmp(&(**b - value).abs()).unwrap_or(std::cmp::Ordering::Equal))
        .copied()
        .unwrap_or(value)
}

fn col_index(x_grid: &[f32], x0: f32) -> usize {
    x_grid.iter().position(|&v| (v - x0).abs() < f32::EPSILON).unwrap_or(0)
}
