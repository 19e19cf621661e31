//! Row-sweep reading order.
//!
//! Cells arrive in no particular order from detection. This orders them into
//! rows by repeatedly picking the top-left-most remaining cell as a row
//! anchor, then walking rightward: each step finds the nearest live cell to
//! the right of the *current* anchor that shares its row, appends it, and
//! makes it the new anchor, until no more candidates remain to the right.
//! The finished row is swept out before picking the next anchor.

use crate::geometry::Rect;

/// Weight applied to `x0` when breaking ties in top-left ordering — matches
/// the bias used for segment/page reading order.
const TOP_LEFT_X_WEIGHT: f32 = 0.05;

/// Group `cells` into reading-order rows.
///
/// Cells are identified by their index into `cells`; the returned rows
/// partition `0..cells.len()` and are themselves ordered top-to-bottom, with
/// each row ordered left-to-right.
///
/// Implemented with a stable append-only view plus a `live` bitmap rather
/// than removing cells from a vector in place, so indices stay valid and
/// termination doesn't depend on shifting slice contents mid-scan.
pub fn sweep_rows(cells: &[Rect]) -> Vec<Vec<usize>> {
    let n = cells.len();
    let mut live = vec![true; n];
    let mut rows = Vec::new();

    loop {
        let row_anchor = live
            .iter()
            .enumerate()
            .filter(|&(_, &is_live)| is_live)
            .min_by(|(ia, _), (ib, _)| {
                let score_a = cells[*ia].top_left_score(TOP_LEFT_X_WEIGHT);
                let score_b = cells[*ib].top_left_score(TOP_LEFT_X_WEIGHT);
                score_a.partial_cmp(&score_b).unwrap_or(std::cmp::Ordering::Equal).then_with(|| ia.cmp(ib))
            })
            .map(|(i, _)| i);

        let Some(row_anchor) = row_anchor else { break };

        // Walk rightward: each step's right-hand candidates are judged against
        // the current anchor, then the nearest candidate becomes the next
        // anchor. This keeps a row-spanning anchor from sweeping up cells that
        // actually belong one or more rows further down.
        let mut row = vec![row_anchor];
        let mut in_row = vec![false; n];
        in_row[row_anchor] = true;
        let mut anchor = row_anchor;

        loop {
            let next = live
                .iter()
                .enumerate()
                .filter(|&(i, &is_live)| {
                    is_live && !in_row[i] && cells[i].center_x() > cells[anchor].x1 && same_row(&cells[anchor], &cells[i])
                })
                .min_by(|(ia, _), (ib, _)| {
                    cells[*ia].center_x().partial_cmp(&cells[*ib].center_x()).unwrap_or(std::cmp::Ordering::Equal).then_with(|| ia.cmp(ib))
                })
                .map(|(i, _)| i);

            let Some(next) = next else { break };
            row.push(next);
            in_row[next] = true;
            anchor = next;
        }

        for &idx in &row {
            live[idx] = false;
        }
        rows.push(row);
    }

    rows
}

/// Whether `candidate` belongs on the same row as `anchor`, using an
/// asymmetric vertical-span test: a taller candidate is tested against the
/// anchor's center, a shorter one against its own center against the
/// anchor's span. This keeps a short cell from pulling in a much taller
/// neighbor (or vice versa) just because their spans touch at the edges.
fn same_row(anchor: &Rect, candidate: &Rect) -> bool {
    if candidate.height() > anchor.height() {
        candidate.y0 < anchor.center_y() && anchor.center_y() < candidate.y1
    } else {
        anchor.y0 < candidate.center_y() && candidate.center_y() < anchor.y1
    }
}
