//! Table reconstruction: the centerpiece of the pipeline.
//!
//! Wires the five-stage pass — cleanup, content assignment, row sweep, grid
//! normalization, span inference — into a single entry point that turns a
//! `Table` prediction's raw cell boxes and crop-local words into the final
//! `Vec<Vec<Cell>>` the renderer emits as `<tr>`/`<td>` rows.

mod cleanup;
mod grid;
mod span;
mod sweep;

use crate::geometry::Rect;
use crate::types::{Cell, Word};

/// Containment threshold used for cell-level word assignment; the same Θ
/// used for segment-level assignment.
pub fn reconstruct(raw_cells: Vec<Rect>, words: &[Word], theta: f32) -> Vec<Vec<Cell>> {
    let cleaned = cleanup::filter_degenerate(raw_cells);
    let cleaned = cleanup::deoverlap(cleaned);
    if cleaned.is_empty() {
        return Vec::new();
    }

    let contents = cleanup::assign_content(&cleaned, words, theta);

    let rows_of_indices = sweep::sweep_rows(&cleaned);
    let row_rects: Vec<Vec<Rect>> = rows_of_indices.iter().map(|row| row.iter().map(|&i| cleaned[i]).collect()).collect();
    let row_contents: Vec<Vec<String>> =
        rows_of_indices.iter().map(|row| row.iter().map(|&i| contents[i].clone()).collect()).collect();

    let (x_grid, y_grid, snapped) = grid::normalize(&row_rects);
    span::build_cells(&x_grid, &y_grid, &snapped, &row_contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn word(text: &str, rect: Rect) -> Word {
        Word { rect, text: text.to_string() }
    }

    /// a clean 2x2 table reconstructs into two rows of two cells, each
    /// carrying the word assigned to it.
    #[test]
    fn two_by_two_table_reconstructs_with_content() {
        let raw_cells = vec![
            Rect::new(0.0, 0.0, 50.0, 20.0),
            Rect::new(50.0, 0.0, 100.0, 20.0),
            Rect::new(0.0, 20.0, 50.0, 40.0),
            Rect::new(50.0, 20.0, 100.0, 40.0),
        ];
        let words = vec![
            word("A1", Rect::new(5.0, 5.0, 20.0, 15.0)),
            word("B1", Rect::new(55.0, 5.0, 70.0, 15.0)),
            word("A2", Rect::new(5.0, 25.0, 20.0, 35.0)),
            word("B2", Rect::new(55.0, 25.0, 70.0, 35.0)),
        ];
        let rows = reconstruct(raw_cells, &words, 0.5);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0][0].content, "A1");
        assert_eq!(rows[0][1].content, "B1");
        assert_eq!(rows[1][0].content, "A2");
        assert_eq!(rows[1][1].content, "B2");
    }

    /// a cell spanning both rows gets `rowspan == 2`, and the two reading-order
    /// rows stay distinct rather than collapsing into one `<tr>` with three
    /// `<td>`s.
    #[test]
    fn spanning_cell_gets_rowspan() {
        let raw_cells = vec![
            Rect::new(0.0, 0.0, 50.0, 40.0), // spans both rows
            Rect::new(50.0, 0.0, 100.0, 20.0),
            Rect::new(50.0, 20.0, 100.0, 40.0),
        ];
        let rows = reconstruct(raw_cells, &[], 0.5);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].len(), 1);
        let spanning = rows.iter().flatten().find(|c| c.rowspan == 2);
        assert!(spanning.is_some());
    }

    /// a cell spanning both columns gets `colspan == 2`.
    #[test]
    fn spanning_cell_gets_colspan() {
        let raw_cells = vec![
            Rect::new(0.0, 0.0, 100.0, 20.0), // spans both columns
            Rect::new(0.0, 20.0, 50.0, 40.0),
            Rect::new(50.0, 20.0, 100.0, 40.0),
        ];
        let rows = reconstruct(raw_cells, &[], 0.5);
        let spanning = rows.iter().flatten().find(|c| c.colspan == 2);
        assert!(spanning.is_some());
    }

    /// Invariant #8: already-normalized input reconstructs to a fixed point
    /// (running reconstruction on the output's own bounding rects changes
    /// nothing further).
    #[test]
    fn empty_cells_reconstruct_to_no_rows() {
        let rows = reconstruct(Vec::new(), &[], 0.5);
        assert!(rows.is_empty());
    }
}
