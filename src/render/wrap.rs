//! Greedy word wrapping over parsed segments.

use crate::markup::{SegmentKind, TextSegment};
use crate::render::font::FontMetrics;

/// Builds one output line, fusing words that came from the same source
/// segment so colour runs stay intact.
#[derive(Default)]
struct LineBuilder {
    segments: Vec<TextSegment>,
    source: Option<usize>,
}

impl LineBuilder {
    fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn push_text(&mut self, source: usize, piece: &str, width: i32, template: &TextSegment) {
        if self.source == Some(source)
            && let Some(last) = self.segments.last_mut()
        {
            last.text.push_str(piece);
            last.pixel_width += width;
            return;
        }
        self.segments.push(TextSegment {
            kind: SegmentKind::Text,
            text: piece.to_string(),
            icon_id: None,
            pixel_width: width,
            color: template.color,
        });
        self.source = Some(source);
    }

    fn push_icon(&mut self, segment: &TextSegment) {
        self.segments.push(segment.clone());
        self.source = None;
    }

    fn take(&mut self) -> Vec<TextSegment> {
        self.source = None;
        std::mem::take(&mut self.segments)
    }
}

/// Pack `segments` into lines. The first line has `first_width` pixels, every
/// later line `width`. Text splits on single spaces; runs of spaces survive
/// as one space unit each. Icons never split. A unit wider than a whole line
/// is placed alone rather than dropped. `LineBreak` segments end the current
/// line and are not part of the output.
pub fn wrap_segments(
    segments: &[TextSegment],
    first_width: i32,
    width: i32,
    metrics: &dyn FontMetrics,
) -> Vec<Vec<TextSegment>> {
    let width = width.max(0);
    let space_width = metrics.string_width(" ");

    let mut lines = Vec::new();
    let mut line = LineBuilder::default();
    let mut remaining = first_width.max(0);

    for (source, segment) in segments.iter().enumerate() {
        match segment.kind {
            SegmentKind::LineBreak => {
                lines.push(line.take());
                remaining = width;
            }
            SegmentKind::Icon => {
                if segment.pixel_width > remaining && !line.is_empty() {
                    lines.push(line.take());
                    remaining = width;
                }
                line.push_icon(segment);
                remaining -= segment.pixel_width;
            }
            SegmentKind::Text => {
                for (word_index, word) in segment.text.split(' ').enumerate() {
                    if word.is_empty() {
                        if word_index == 0 {
                            continue;
                        }
                        if space_width <= remaining {
                            line.push_text(source, " ", space_width, segment);
                            remaining -= space_width;
                        } else {
                            if !line.is_empty() {
                                lines.push(line.take());
                            }
                            remaining = width;
                        }
                        continue;
                    }

                    let word_width = metrics.string_width(word);
                    let spaced = word_index > 0 && !line.is_empty();
                    let needed = word_width + if spaced { space_width } else { 0 };

                    if needed <= remaining {
                        if spaced {
                            line.push_text(source, &format!(" {word}"), needed, segment);
                        } else {
                            line.push_text(source, word, word_width, segment);
                        }
                        remaining -= needed;
                    } else {
                        if !line.is_empty() {
                            lines.push(line.take());
                        }
                        remaining = width;
                        line.push_text(source, word, word_width, segment);
                        remaining -= word_width;
                    }
                }
            }
        }
    }

    if !line.is_empty() {
        lines.push(line.take());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{flatten_text, total_width};
    use crate::render::font::FixedMetrics;
    use crate::widget::color::Rgba;

    const M: FixedMetrics = FixedMetrics::REGULAR;

    fn text(s: &str) -> TextSegment {
        TextSegment::text(s, Rgba::WHITE, &M)
    }

    fn rendered(lines: &[Vec<TextSegment>]) -> Vec<String> {
        lines.iter().map(|l| flatten_text(l)).collect()
    }

    #[test]
    fn empty_input_has_no_lines() {
        assert!(wrap_segments(&[], 100, 100, &M).is_empty());
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let lines = wrap_segments(&[text("supercalifragilisticexpialidocious")], 50, 50, &M);
        assert_eq!(rendered(&lines), ["supercalifragilisticexpialidocious"]);
    }

    #[test]
    fn oversized_word_between_short_words() {
        let lines = wrap_segments(&[text("a supercalifragilistic b")], 60, 60, &M);
        assert_eq!(rendered(&lines), ["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn wraps_on_word_boundaries() {
        // 6px per char: "the quick" = 54, "brown" fits a fresh 60px line
        let lines = wrap_segments(&[text("the quick brown fox")], 60, 60, &M);
        assert_eq!(rendered(&lines), ["the quick", "brown fox"]);
    }

    #[test]
    fn first_line_budget_differs() {
        let lines = wrap_segments(&[text("aa bb cc")], 12, 100, &M);
        assert_eq!(rendered(&lines), ["aa", "bb cc"]);
    }

    #[test]
    fn consecutive_spaces_preserved() {
        let lines = wrap_segments(&[text("a  b")], 100, 100, &M);
        assert_eq!(rendered(&lines), ["a  b"]);
        assert_eq!(total_width(&lines[0]), 24);
    }

    #[test]
    fn line_break_forces_new_line() {
        let segs = vec![text("one"), TextSegment::line_break(Rgba::WHITE), text("two")];
        let lines = wrap_segments(&segs, 500, 500, &M);
        assert_eq!(rendered(&lines), ["one", "two"]);
        assert!(lines.iter().flatten().all(|s| s.kind != SegmentKind::LineBreak));
    }

    #[test]
    fn icons_are_atomic() {
        let segs = vec![text("abc"), TextSegment::icon(1, 12, Rgba::WHITE), text("d")];
        let lines = wrap_segments(&segs, 24, 24, &M);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 1);
        assert_eq!(lines[1][0].icon_id, Some(1));
        assert_eq!(lines[1][1].text, "d");
    }

    #[test]
    fn colour_runs_stay_separate() {
        let red = Rgba::rgb(255, 0, 0);
        let segs = vec![text("hello "), TextSegment::text("world", red, &M)];
        let lines = wrap_segments(&segs, 500, 500, &M);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[0][0].text, "hello ");
        assert_eq!(lines[0][1].color, red);
    }

    #[test]
    fn negative_budgets_clamp() {
        let lines = wrap_segments(&[text("hi")], -40, -40, &M);
        assert_eq!(rendered(&lines), ["hi"]);
    }

    #[test]
    fn lines_respect_budget() {
        let sample = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod";
        for budget in [30, 48, 60, 90, 150] {
            let lines = wrap_segments(&[text(sample)], budget, budget, &M);
            for line in &lines {
                let w = total_width(line);
                let single_word = !flatten_text(line).contains(' ');
                assert!(w <= budget || single_word, "budget {budget}: {w} > {budget}");
            }
            let joined = rendered(&lines).join(" ");
            assert_eq!(joined, sample);
        }
    }
}
