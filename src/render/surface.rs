//! Abstract 2D drawing target for panels.

use std::fmt;

use image::RgbaImage;

use crate::config::FontSize;
use crate::widget::color::Rgba;

/// Axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        Rect::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }
}

/// Drawing primitives a panel needs. Text is positioned by its baseline.
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    fn draw_text(&mut self, text: &str, x: i32, baseline: i32, color: Rgba, font_size: FontSize);
    /// Draw `image` scaled to `width` x `height` with its top-left at (x, y).
    fn draw_image(&mut self, image: &RgbaImage, x: i32, y: i32, width: i32, height: i32, alpha: u8);
    /// Restrict later draws to `rect`; `None` removes the clip.
    fn set_clip(&mut self, rect: Option<Rect>);
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    FillRect { rect: Rect, color: Rgba },
    Text { text: String, x: i32, y: i32, color: Rgba, font_size: FontSize },
    Image { x: i32, y: i32, width: i32, height: i32, alpha: u8 },
    Clip(Option<Rect>),
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawCommand::FillRect { rect, color } => write!(
                f,
                "fill {},{} {}x{} {}",
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                String::from(*color)
            ),
            DrawCommand::Text { text, x, y, color, .. } => {
                write!(f, "text {x},{y} {} {text:?}", String::from(*color))
            }
            DrawCommand::Image { x, y, width, height, alpha } => {
                write!(f, "image {x},{y} {width}x{height} a={alpha}")
            }
            DrawCommand::Clip(Some(rect)) => {
                write!(f, "clip {},{} {}x{}", rect.x, rect.y, rect.width, rect.height)
            }
            DrawCommand::Clip(None) => write!(f, "clip none"),
        }
    }
}

/// Surface that records draw calls instead of rasterizing them.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// One command per line, for snapshot tests and the `dump` command.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            out.push_str(&command.to_string());
            out.push('\n');
        }
        out
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn draw_text(&mut self, text: &str, x: i32, baseline: i32, color: Rgba, font_size: FontSize) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y: baseline,
            color,
            font_size,
        });
    }

    fn draw_image(&mut self, _image: &RgbaImage, x: i32, y: i32, width: i32, height: i32, alpha: u8) {
        self.commands.push(DrawCommand::Image { x, y, width, height, alpha });
    }

    fn set_clip(&mut self, rect: Option<Rect>) {
        self.commands.push(DrawCommand::Clip(rect));
    }
}

/// Translates every draw by a fixed offset. Used to place a panel's local
/// coordinates at its slot on a larger canvas.
pub struct OffsetSurface<'a> {
    inner: &'a mut dyn Surface,
    dx: i32,
    dy: i32,
}

impl<'a> OffsetSurface<'a> {
    pub fn new(inner: &'a mut dyn Surface, dx: i32, dy: i32) -> Self {
        Self { inner, dx, dy }
    }
}

impl Surface for OffsetSurface<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let rect = Rect::new(rect.x + self.dx, rect.y + self.dy, rect.width, rect.height);
        self.inner.fill_rect(rect, color);
    }

    fn draw_text(&mut self, text: &str, x: i32, baseline: i32, color: Rgba, font_size: FontSize) {
        self.inner.draw_text(text, x + self.dx, baseline + self.dy, color, font_size);
    }

    fn draw_image(&mut self, image: &RgbaImage, x: i32, y: i32, width: i32, height: i32, alpha: u8) {
        self.inner.draw_image(image, x + self.dx, y + self.dy, width, height, alpha);
    }

    fn set_clip(&mut self, rect: Option<Rect>) {
        let rect = rect.map(|r| Rect::new(r.x + self.dx, r.y + self.dy, r.width, r.height));
        self.inner.set_clip(rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(a.intersect(&Rect::new(5, 5, 10, 10)), Rect::new(5, 5, 5, 5));
        assert_eq!(a.intersect(&Rect::new(20, 20, 5, 5)).width, 0);
        assert!(a.contains(9, 9));
        assert!(!a.contains(10, 0));
    }

    #[test]
    fn records_in_order() {
        let mut s = RecordingSurface::new();
        s.set_clip(Some(Rect::new(0, 0, 4, 4)));
        s.fill_rect(Rect::new(0, 0, 4, 4), Rgba::BLACK);
        s.draw_text("hi", 1, 12, Rgba::WHITE, FontSize::Regular);
        s.set_clip(None);
        assert_eq!(
            s.dump(),
            "clip 0,0 4x4\nfill 0,0 4x4 #000000FF\ntext 1,12 #FFFFFFFF \"hi\"\nclip none\n"
        );
        assert_eq!(s.texts(), ["hi"]);
    }

    #[test]
    fn offset_translates_draws() {
        let mut s = RecordingSurface::new();
        {
            let mut offset = OffsetSurface::new(&mut s, 10, 20);
            offset.set_clip(Some(Rect::new(0, 0, 4, 4)));
            offset.draw_text("x", 1, 2, Rgba::WHITE, FontSize::Small);
            offset.set_clip(None);
        }
        assert_eq!(s.dump(), "clip 10,20 4x4\ntext 11,22 #FFFFFFFF \"x\"\nclip none\n");
    }
}
