//! Chat markup tokenizer.
//!
//! Chat text carries inline tags: `<img=N>` icons, `<col=RRGGBB>` colour
//! runs closed by `</col>`, the named resets `<colNORMAL>`/`<colHIGHLIGHT>`
//! and `<br>` hard breaks. The tokenizer walks the string once, carrying the
//! current colour as loop state, and emits segments measured with the active
//! font.
//!
//! Tag priority at each `<`: `<br>`, `<img=N>`, named colour, `<col=...>`,
//! `</col>`, any other `<col...>` (dropped), then the literal character.

use crate::config::FontSize;
use crate::render::font::FontMetrics;
use crate::render::icon::IconResolver;
use crate::widget::color::Rgba;

/// Width reserved for an icon id the resolver doesn't know.
const MISSING_ICON_WIDTH: i32 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Text,
    Icon,
    LineBreak,
}

/// Atomic renderable unit. `text` is empty for icons and breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub kind: SegmentKind,
    pub text: String,
    pub icon_id: Option<u32>,
    pub pixel_width: i32,
    pub color: Rgba,
}

impl TextSegment {
    pub fn text(text: impl Into<String>, color: Rgba, metrics: &dyn FontMetrics) -> Self {
        let text = text.into();
        let pixel_width = metrics.string_width(&text);
        Self { kind: SegmentKind::Text, text, icon_id: None, pixel_width, color }
    }

    pub fn icon(id: u32, pixel_width: i32, color: Rgba) -> Self {
        Self {
            kind: SegmentKind::Icon,
            text: String::new(),
            icon_id: Some(id),
            pixel_width,
            color,
        }
    }

    pub fn line_break(color: Rgba) -> Self {
        Self {
            kind: SegmentKind::LineBreak,
            text: String::new(),
            icon_id: None,
            pixel_width: 0,
            color,
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == SegmentKind::Text
    }
}

/// Colour inputs for a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupStyle {
    pub base_color: Rgba,
    /// Host theme highlight colour for `<colHIGHLIGHT>`; base colour if absent.
    pub highlight_color: Option<Rgba>,
    /// When false, `<col=...>` and `</col>` are stripped without effect.
    pub retain_contextual_colours: bool,
    pub font_size: FontSize,
}

impl MarkupStyle {
    pub fn plain(base_color: Rgba, font_size: FontSize) -> Self {
        Self {
            base_color,
            highlight_color: None,
            retain_contextual_colours: false,
            font_size,
        }
    }
}

/// Horizontal space an icon takes: sprite width plus one pixel of padding,
/// scaled to 75% in small-font mode.
pub fn icon_width(icons: &dyn IconResolver, id: u32, font_size: FontSize) -> i32 {
    let width = icons.sprite(id).map_or(MISSING_ICON_WIDTH, |s| s.width as i32 + 1);
    match font_size {
        FontSize::Regular => width,
        FontSize::Small => (width as f32 * 0.75) as i32,
    }
}

/// Accumulates literal characters until a tag forces a flush.
struct SegmentBuilder<'a> {
    segments: Vec<TextSegment>,
    pending: String,
    metrics: &'a dyn FontMetrics,
}

impl<'a> SegmentBuilder<'a> {
    fn new(metrics: &'a dyn FontMetrics) -> Self {
        Self { segments: Vec::new(), pending: String::new(), metrics }
    }

    fn flush(&mut self, color: Rgba) {
        if !self.pending.is_empty() {
            let text = std::mem::take(&mut self.pending);
            self.segments.push(TextSegment::text(text, color, self.metrics));
        }
    }

    fn push(&mut self, segment: TextSegment, color: Rgba) {
        self.flush(color);
        self.segments.push(segment);
    }

    fn finish(mut self, color: Rgba) -> Vec<TextSegment> {
        self.flush(color);
        self.segments
    }
}

/// Match `<img=DIGITS>` at the start of `rest`. Returns the tag length and the
/// id, or `None` for the id when the digits overflow.
fn match_img(rest: &str) -> Option<(usize, Option<u32>)> {
    let body = rest.strip_prefix("<img=")?;
    let digits = body.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || body.as_bytes().get(digits) != Some(&b'>') {
        return None;
    }
    let id = body[..digits].parse::<u32>().ok();
    Some(("<img=".len() + digits + 1, id))
}

/// Length of a `<...>` tag starting at `rest`, if it is closed.
fn tag_len(rest: &str) -> Option<usize> {
    rest.find('>').map(|end| end + 1)
}

/// Parse game-channel markup into coloured segments.
pub fn parse_markup(
    text: &str,
    style: &MarkupStyle,
    metrics: &dyn FontMetrics,
    icons: &dyn IconResolver,
) -> Vec<TextSegment> {
    let mut out = SegmentBuilder::new(metrics);
    let mut color = style.base_color;
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];

        if rest.starts_with('<') {
            if rest.starts_with("<br>") {
                out.push(TextSegment::line_break(color), color);
                i += "<br>".len();
                continue;
            }

            if let Some((len, id)) = match_img(rest) {
                match id {
                    Some(id) => {
                        let width = icon_width(icons, id, style.font_size);
                        out.push(TextSegment::icon(id, width, color), color);
                    }
                    None => out.pending.push_str(&rest[..len]),
                }
                i += len;
                continue;
            }

            if rest.starts_with("<colNORMAL>") {
                out.flush(color);
                color = style.base_color;
                i += "<colNORMAL>".len();
                continue;
            }
            if rest.starts_with("<colHIGHLIGHT>") {
                out.flush(color);
                color = style.highlight_color.unwrap_or(style.base_color);
                i += "<colHIGHLIGHT>".len();
                continue;
            }

            if rest.starts_with("<col=")
                && let Some(len) = tag_len(rest)
            {
                if style.retain_contextual_colours {
                    out.flush(color);
                    let value = &rest["<col=".len()..len - 1];
                    color = Rgba::from_hex(value).unwrap_or(style.base_color);
                }
                i += len;
                continue;
            }

            if rest.starts_with("</col>") {
                if style.retain_contextual_colours {
                    out.flush(color);
                    color = style.base_color;
                }
                i += "</col>".len();
                continue;
            }

            if rest.starts_with("<col")
                && let Some(len) = tag_len(rest)
            {
                i += len;
                continue;
            }
        }

        let Some(ch) = rest.chars().next() else { break };
        out.pending.push(ch);
        i += ch.len_utf8();
    }

    out.finish(color)
}

/// Parse single-colour text, recognizing only `<img=N>`.
pub fn parse_icons(
    text: &str,
    color: Rgba,
    font_size: FontSize,
    metrics: &dyn FontMetrics,
    icons: &dyn IconResolver,
) -> Vec<TextSegment> {
    let mut out = SegmentBuilder::new(metrics);
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];
        if let Some((len, Some(id))) = match_img(rest) {
            let width = icon_width(icons, id, font_size);
            out.push(TextSegment::icon(id, width, color), color);
            i += len;
            continue;
        }
        let Some(ch) = rest.chars().next() else { break };
        out.pending.push(ch);
        i += ch.len_utf8();
    }

    out.finish(color)
}

/// Concatenated text of all text segments.
pub fn flatten_text(segments: &[TextSegment]) -> String {
    segments.iter().filter(|s| s.is_text()).map(|s| s.text.as_str()).collect()
}

/// Summed pixel width, icons included.
pub fn total_width(segments: &[TextSegment]) -> i32 {
    segments.iter().map(|s| s.pixel_width).sum()
}
