//! Grid auto-layout for boxes added without an explicit position

use serde::{Serialize, Serializer};

/// A patching rectangle: position and size in patcher coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    /// Same size, moved by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }
}

impl Serialize for Rect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.x, self.y, self.w, self.h].serialize(serializer)
    }
}

pub const DEFAULT_PATCHER_RECT: Rect = Rect::new(85.0, 104.0, 640.0, 480.0);

const DEFAULT_PAD: f64 = 48.0;
const DEFAULT_BOX_WIDTH: f64 = 66.0;
const DEFAULT_BOX_HEIGHT: f64 = 22.0;

/// Places boxes left to right in columns, wrapping at the patcher's width.
#[derive(Debug, Clone)]
pub struct LayoutManager {
    bounds: Rect,
    pad: f64,
    box_width: f64,
    box_height: f64,
    column: usize,
    row: usize,
}

impl LayoutManager {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            pad: DEFAULT_PAD,
            box_width: DEFAULT_BOX_WIDTH,
            box_height: DEFAULT_BOX_HEIGHT,
            column: 0,
            row: 0,
        }
    }

    /// Next free slot. `size` overrides the default box size.
    pub fn next_rect(&mut self, size: Option<(f64, f64)>) -> Rect {
        let (w, h) = size.unwrap_or((self.box_width, self.box_height));
        let x = self.pad + 3.0 * self.pad * self.column as f64;
        let y = self.pad + 1.5 * self.pad * self.row as f64;

        self.column += 1;
        if x + w + 2.0 * self.pad > self.bounds.w {
            self.column = 0;
            self.row += 1;
        }

        Rect::new(x, y, w, h)
    }
}

impl Default for LayoutManager {
    fn default() -> Self {
        Self::new(DEFAULT_PATCHER_RECT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_box_at_pad() {
        let mut layout = LayoutManager::default();
        assert_eq!(layout.next_rect(None), Rect::new(48.0, 48.0, 66.0, 22.0));
        assert_eq!(layout.next_rect(None).x, 192.0);
    }

    #[test]
    fn test_wraps_at_patcher_width() {
        let mut layout = LayoutManager::default();
        let xs: Vec<f64> = (0..5).map(|_| layout.next_rect(None)).map(|r| r.x).collect();
        assert_eq!(xs, vec![48.0, 192.0, 336.0, 480.0, 48.0]);

        let mut layout = LayoutManager::default();
        let fifth = (0..5).map(|_| layout.next_rect(None)).last().unwrap();
        assert_eq!(fifth.y, 48.0 + 72.0);
    }

    #[test]
    fn test_explicit_size() {
        let mut layout = LayoutManager::default();
        let r = layout.next_rect(Some((24.0, 24.0)));
        assert_eq!((r.w, r.h), (24.0, 24.0));
    }

    #[test]
    fn test_rect_serializes_as_array() {
        let json = serde_json::to_string(&Rect::new(1.0, 2.0, 3.0, 4.5)).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.5]");
    }
}
