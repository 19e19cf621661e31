//! Word-to-segment assignment and realignment.

use crate::geometry::Rect;
use crate::types::{Label, Prediction, Segment, TextMode, Word};

/// Assign each word to exactly one segment, then shrink-wrap non-table/
/// non-illustration segments to the bounding box of their assigned words.
///
/// Returns segments sorted ascending by `y0` (stable) — the reading order
/// consumed by the renderer.
pub fn assign_and_realign(words: &[Word], predictions: &[Prediction], theta: f32) -> Vec<Segment> {
    let mut segments: Vec<Segment> = predictions
        .iter()
        .enumerate()
        .map(|(i, p)| Segment {
            prediction_index: i,
            rect: p.rect,
            label: p.label,
            content: String::new(),
            words: Vec::new(),
        })
        .collect();

    for word in words {
        if let Some(target) = smallest_overlapping_segment(word, &segments, theta) {
            let s = &mut segments[target];
            if !s.content.is_empty() {
                s.content.push(' ');
            }
            s.content.push_str(&word.text);
            s.words.push(word.clone());
        }
    }

    for segment in &mut segments {
        realign(segment);
    }

    segments.sort_by(|a, b| a.rect.y0.partial_cmp(&b.rect.y0).unwrap_or(std::cmp::Ordering::Equal));
    segments
}

/// Containment threshold for a text-extraction mode.
pub fn theta_for(mode: TextMode, thresholds: &crate::config::Thresholds) -> f32 {
    thresholds.for_mode(mode)
}

/// Pick the smallest-area segment whose containment of `word` exceeds
/// `theta`, or `None` if no segment qualifies (word is dropped).
fn smallest_overlapping_segment(word: &Word, segments: &[Segment], theta: f32) -> Option<usize> {
    smallest_overlapping_rect(&word.rect, segments.iter().map(|s| &s.rect), theta)
}

/// Index of the smallest-area rect (by original order on ties) among
/// `targets` whose containment of `rect` exceeds `theta`. Shared by segment
/// assignment and table-cell content assignment, which both follow the same
/// "smallest enclosing region wins" rule.
pub fn smallest_overlapping_rect<'a>(rect: &Rect, targets: impl Iterator<Item = &'a Rect>, theta: f32) -> Option<usize> {
    targets
        .enumerate()
        .filter(|(_, t)| rect.containment(t) > theta)
        .min_by(|(ia, a), (ib, b)| {
            a.area().partial_cmp(&b.area()).unwrap_or(std::cmp::Ordering::Equal).then_with(|| ia.cmp(ib))
        })
        .map(|(i, _)| i)
}

/// Shrink-wrap a segment's rect to the bounding box of its assigned words.
/// Table and illustration regions keep the detector's coordinates since they
/// bound non-textual content.
fn realign(segment: &mut Segment) {
    if segment.words.is_empty() {
        return;
    }
    if matches!(segment.label, Label::Table | Label::Illustration) {
        return;
    }
    let rects = segment.words.iter().map(|w| &w.rect);
    if let Some(bbox) = crate::geometry::Rect::union_of(rects) {
        segment.rect = bbox;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn word(text: &str, rect: Rect) -> Word {
        Word { rect, text: text.to_string() }
    }

    /// single paragraph.
    #[test]
    fn single_paragraph_gathers_all_words_and_realigns() {
        let predictions = vec![Prediction::new(Rect::new(10.0, 10.0, 200.0, 40.0), 1.0, Label::Paragraph)];
        let words = vec![
            word("Hello", Rect::new(12.0, 15.0, 60.0, 35.0)),
            word("world", Rect::new(70.0, 15.0, 140.0, 35.0)),
        ];
        let segments = assign_and_realign(&words, &predictions, 0.5);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].content, "Hello world");
        assert_eq!(segments[0].rect, Rect::new(12.0, 15.0, 140.0, 35.0));
    }

    /// smallest-wins assignment: a word overlapping two nested
    /// segments goes to the smaller (header), not the larger (paragraph).
    #[test]
    fn word_is_assigned_to_smallest_overlapping_segment() {
        let predictions = vec![
            Prediction::new(Rect::new(0.0, 0.0, 500.0, 100.0), 1.0, Label::Paragraph),
            Prediction::new(Rect::new(10.0, 10.0, 200.0, 40.0), 1.0, Label::Header),
        ];
        let words = vec![word("Title", Rect::new(20.0, 15.0, 180.0, 35.0))];
        let segments = assign_and_realign(&words, &predictions, 0.5);

        let header = segments.iter().find(|s| s.label == Label::Header).unwrap();
        let paragraph = segments.iter().find(|s| s.label == Label::Paragraph).unwrap();
        assert_eq!(header.content, "Title");
        assert!(paragraph.content.is_empty());
    }

    #[test]
    fn word_below_threshold_is_dropped() {
        let predictions = vec![Prediction::new(Rect::new(0.0, 0.0, 10.0, 10.0), 1.0, Label::Paragraph)];
        // Word mostly outside the segment: containment well under 0.5.
        let words = vec![word("stray", Rect::new(8.0, 8.0, 28.0, 28.0))];
        let segments = assign_and_realign(&words, &predictions, 0.5);
        assert!(segments[0].content.is_empty());
        assert!(segments[0].words.is_empty());
    }

    #[test]
    fn table_segment_is_not_realigned() {
        let predictions = vec![Prediction::new(Rect::new(0.0, 0.0, 100.0, 100.0), 1.0, Label::Table)];
        let words = vec![word("cell", Rect::new(5.0, 5.0, 20.0, 20.0))];
        let segments = assign_and_realign(&words, &predictions, 0.5);
        assert_eq!(segments[0].rect, Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn assignment_is_idempotent_across_runs() {
        let predictions = vec![Prediction::new(Rect::new(10.0, 10.0, 200.0, 40.0), 1.0, Label::Paragraph)];
        let words = vec![word("Hello", Rect::new(12.0, 15.0, 60.0, 35.0))];
        let first = assign_and_realign(&words, &predictions, 0.5);
        let second = assign_and_realign(&words, &predictions, 0.5);
        assert_eq!(first[0].rect, second[0].rect);
        assert_eq!(first[0].content, second[0].content);
    }

    #[test]
    fn segments_are_sorted_by_y0() {
        let predictions = vec![
            Prediction::new(Rect::new(0.0, 100.0, 50.0, 150.0), 1.0, Label::Paragraph),
            Prediction::new(Rect::new(0.0, 0.0, 50.0, 50.0), 1.0, Label::Header),
        ];
        let segments = assign_and_realign(&[], &predictions, 0.5);
        assert_eq!(segments[0].label, Label::Header);
        assert_eq!(segments[1].label, Label::Paragraph);
    }
}
