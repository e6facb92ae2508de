//! Turns stored chat entries into wrapped, faded render lines.

use crate::config::FontSize;
use crate::markup::{self, MarkupStyle, SegmentKind, TextSegment};
use crate::message::filter::effective_fade_seconds;
use crate::message::{ChatEntry, Direction, EntryKind, MessageType};
use crate::render::font::FontMetrics;
use crate::render::icon::IconResolver;
use crate::render::timestamp::format_timestamp;
use crate::render::wrap::wrap_segments;
use crate::widget::color::Rgba;

/// Bodies longer than this many characters are cut and marked with "...".
pub const MAX_MESSAGE_LENGTH: usize = 500;

/// How long a line takes to fade from opaque to invisible after its fade
/// window ends.
pub const FADE_TAIL_MS: i64 = 1200;

/// One visual row of segments sharing an opacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderLine {
    pub segments: Vec<TextSegment>,
    pub alpha: u8,
}

impl RenderLine {
    pub fn width(&self) -> i32 {
        markup::total_width(&self.segments)
    }

    pub fn text(&self) -> String {
        markup::flatten_text(&self.segments)
    }
}

/// Per-channel rendering settings for a pass.
#[derive(Debug, Clone, Copy)]
pub struct LineStyle<'a> {
    pub text_color: Rgba,
    pub highlight_color: Option<Rgba>,
    pub retain_contextual_colours: bool,
    pub font_size: FontSize,
    pub wrap: bool,
    /// Content width available to a line.
    pub width: i32,
    /// Timestamp pattern; `None` when timestamps are off.
    pub timestamp_format: Option<&'a str>,
    pub hide_repeat_count: bool,
    /// Channel fade window in seconds (0 = never fade).
    pub fade_seconds: u32,
}

/// Base colour for game message types that carry one.
pub fn type_color(message_type: MessageType) -> Option<Rgba> {
    match message_type {
        MessageType::DidYouKnow => Some(Rgba::rgb(125, 255, 100)),
        MessageType::Broadcast => Some(Rgba::rgb(255, 255, 0)),
        MessageType::TradeReq => Some(Rgba::rgb(126, 0, 128)),
        _ => None,
    }
}

/// Opacity for an entry of the given age.
///
/// Opaque until the fade window ends, then linear down to zero over
/// [`FADE_TAIL_MS`].
pub fn calculate_alpha(timestamp_ms: i64, now_ms: i64, fade_seconds: u32) -> u8 {
    if fade_seconds == 0 {
        return 255;
    }
    let fade_ms = i64::from(fade_seconds) * 1000;
    let age = now_ms - timestamp_ms;
    if age <= fade_ms {
        return 255;
    }
    let progress = ((age - fade_ms) as f64 / FADE_TAIL_MS as f64).min(1.0);
    (255.0 * (1.0 - progress)) as u8
}

/// Cut overlong bodies on a char boundary.
fn truncate_body(text: &str) -> String {
    match text.char_indices().nth(MAX_MESSAGE_LENGTH) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn timestamp_header(
    entry: &ChatEntry,
    style: &LineStyle<'_>,
    metrics: &dyn FontMetrics,
) -> Option<TextSegment> {
    let pattern = style.timestamp_format.filter(|p| !p.is_empty())?;
    let stamp = format_timestamp(&format!("{pattern} "), entry.timestamp_ms)?;
    Some(TextSegment::text(stamp, style.text_color, metrics))
}

/// Build the render lines for one entry.
pub fn build_entry_lines(
    entry: &ChatEntry,
    style: &LineStyle<'_>,
    now_ms: i64,
    metrics: &dyn FontMetrics,
    icons: &dyn IconResolver,
) -> Vec<RenderLine> {
    let alpha = calculate_alpha(entry.timestamp_ms, now_ms, effective_fade_seconds(entry, style.fade_seconds));

    let mut header: Vec<TextSegment> = timestamp_header(entry, style, metrics).into_iter().collect();
    let mut body = truncate_body(&entry.text);

    let body_segments = match &entry.kind {
        EntryKind::Game { message_type, .. } => {
            if entry.repeat_count > 1 && !style.hide_repeat_count {
                body.push_str(&format!(" ({})", entry.repeat_count));
            }
            let base_color = if style.retain_contextual_colours {
                type_color(*message_type).unwrap_or(style.text_color)
            } else {
                style.text_color
            };
            let markup_style = MarkupStyle {
                base_color,
                highlight_color: style.highlight_color,
                retain_contextual_colours: style.retain_contextual_colours,
                font_size: style.font_size,
            };
            markup::parse_markup(&body, &markup_style, metrics, icons)
        }
        EntryKind::Private { direction, sender } => {
            let prefix = match direction {
                Direction::Outgoing => "To ",
                Direction::Incoming => "From ",
            };
            header.push(TextSegment::text(prefix, style.text_color, metrics));
            header.extend(markup::parse_icons(sender, style.text_color, style.font_size, metrics, icons));
            header.push(TextSegment::text(": ", style.text_color, metrics));
            markup::parse_icons(&body, style.text_color, style.font_size, metrics, icons)
        }
        EntryKind::SystemNotice { .. } => {
            markup::parse_icons(&body, style.text_color, style.font_size, metrics, icons)
        }
    };

    if !style.wrap {
        let mut segments = header;
        segments.extend(body_segments.into_iter().filter(|s| s.kind != SegmentKind::LineBreak));
        return vec![RenderLine { segments, alpha }];
    }

    let header_width = markup::total_width(&header);
    let wrapped = wrap_segments(&body_segments, style.width - header_width, style.width, metrics);

    let mut wrapped = wrapped.into_iter();
    let mut first = header;
    first.extend(wrapped.next().unwrap_or_default());

    let mut lines = vec![RenderLine { segments: first, alpha }];
    lines.extend(wrapped.map(|segments| RenderLine { segments, alpha }));
    lines
}
