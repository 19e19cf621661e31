//! Cell cleanup: degenerate filter and de-overlap pass.

use crate::assign::smallest_overlapping_rect;
use crate::geometry::Rect;
use crate::types::Word;

const MAX_OVERLAP: f32 = 0.8;
const MIN_CELL_HEIGHT: f32 = 16.0;

/// Drop raw cell boxes that are too thin, inverted, or have negative
/// origins — segmentation noise rather than real cells.
pub fn filter_degenerate(raw_cells: Vec<Rect>) -> Vec<Rect> {
    raw_cells
        .into_iter()
        .filter(|r| r.y1 - r.y0 >= MIN_CELL_HEIGHT && r.x1 > r.x0 && r.y1 > r.y0 && r.x0 >= 0.0 && r.y0 >= 0.0)
        .collect()
}

/// De-overlap pass: absorb near-duplicate cells and shrink small overlaps
/// away from the smaller cell's edges.
///
/// Mutates `cells` in place; absorbed cells are removed from the returned
/// vector. Deterministic given the input order: pairs are visited `(i, j)`
/// with `i < j`, and a `j` already marked absorbed is never revisited as a
/// candidate to keep.
pub fn deoverlap(mut cells: Vec<Rect>) -> Vec<Rect> {
    let n = cells.len();
    let mut absorbed = vec![false; n];

    for i in 0..n {
        if absorbed[i] {
            continue;
        }
        for j in (i + 1)..n {
            if absorbed[j] {
                continue;
            }
            // Direction matters: we ask "how much of the later-discovered
            // cell j already lies inside i", so a small duplicate candidate
            // surfacing after its primary detection gets absorbed.
            let overlap = cells[j].containment(&cells[i]);
            if overlap > MAX_OVERLAP {
                absorbed[j] = true;
            } else if overlap > 0.0 {
                shrink_smaller_away(&mut cells, i, j);
            }
        }
    }

    cells.into_iter().zip(absorbed).filter_map(|(c, was_absorbed)| if was_absorbed { None } else { Some(c) }).collect()
}

/// Shrink the larger of `cells[i]`/`cells[j]` on whichever edge is closest
/// to the smaller one, eliminating the overlap while preserving layout.
fn shrink_smaller_away(cells: &mut [Rect], i: usize, j: usize) {
    let (keep_idx, adjust_idx) = if cells[i].area() <= cells[j].area() { (i, j) } else { (j, i) };
    let keep = cells[keep_idx];
    let adjust = cells[adjust_idx];

    let diffs = [
        (keep.x0 - adjust.x1).abs(), // left
        (keep.y0 - adjust.y1).abs(), // top
        (keep.x1 - adjust.x0).abs(), // right
        (keep.y1 - adjust.y0).abs(), // bottom
    ];
    let side = diffs
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    let adjusted = &mut cells[adjust_idx];
    match side {
        0 => adjusted.x1 = keep.x0,
        1 => adjusted.y1 = keep.y0,
        2 => adjusted.x0 = keep.x1,
        _ => adjusted.y0 = keep.y1,
    }
}

/// Assign the parent segment's words (already translated into crop-local
/// coordinates) to each cleaned cell, using the same smallest-overlap rule
/// as segment assignment.
pub fn assign_content(cells: &[Rect], words: &[Word], theta: f32) -> Vec<String> {
    let mut contents = vec![String::new(); cells.len()];
    for word in words {
        if let Some(idx) = smallest_overlapping_rect(&word.rect, cells.iter(), theta) {
            if !contents[idx].is_empty() {
                contents[idx].push(' ');
            }
            contents[idx].push_str(&word.text);
        }
    }
    contents
}
