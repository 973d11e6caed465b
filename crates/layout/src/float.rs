//! Float exclusions of one block formatting context.
//!
//! Floats are stored with absolute coordinates. Line boxes and block boxes
//! that establish a formatting context ask for the band of horizontal space
//! left free over a vertical range.
//! Spec: <https://www.w3.org/TR/CSS22/visuren.html#floats>

use css::{Clear, Float};

use crate::geometry::Rect;

#[derive(Clone, Copy, Debug, PartialEq)]
struct FloatExclusion {
    /// Margin box of the float.
    rect: Rect,
    side: Float,
}

/// Horizontal space available over a vertical range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub left: f32,
    pub right: f32,
}

impl Band {
    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ExclusionSpace {
    floats: Vec<FloatExclusion>,
    /// Top of the most recently placed float; later floats may not go higher.
    last_float_top: f32,
}

impl ExclusionSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.floats.is_empty()
    }

    /// Free band within `[left, right]` over `[top, top + height)`.
    pub fn band(&self, top: f32, height: f32, left: f32, right: f32) -> Band {
        let bottom = top + height.max(1.0);
        let mut band = Band { left, right };
        for exclusion in &self.floats {
            if exclusion.rect.y >= bottom || exclusion.rect.bottom() <= top {
                continue;
            }
            match exclusion.side {
                Float::Left => band.left = band.left.max(exclusion.rect.right()),
                Float::Right => band.right = band.right.min(exclusion.rect.x),
                Float::None => {}
            }
        }
        band
    }

    /// Whether any float narrows `[left, right]` over the given range.
    pub fn narrows(&self, top: f32, height: f32, left: f32, right: f32) -> bool {
        let band = self.band(top, height, left, right);
        band.left > left || band.right < right
    }

    /// The nearest float bottom strictly below `y`, if any.
    pub fn next_edge_below(&self, y: f32) -> Option<f32> {
        self.floats
            .iter()
            .map(|exclusion| exclusion.rect.bottom())
            .filter(|bottom| *bottom > y)
            .min_by(f32::total_cmp)
    }

    /// Position of a float margin box of `size` placed no higher than `top`
    /// within `[left, right]`. Returns the margin box.
    pub fn place(&mut self, side: Float, width: f32, height: f32, top: f32, left: f32, right: f32) -> Rect {
        let mut y = top.max(self.last_float_top);
        loop {
            let band = self.band(y, height, left, right);
            let fits = band.width() >= width || (band.left <= left && band.right >= right);
            if fits {
                let x = if side == Float::Right {
                    band.right - width
                } else {
                    band.left
                };
                let rect = Rect::new(x, y, width, height.max(0.0));
                self.add(side, rect);
                return rect;
            }
            match self.next_edge_below(y) {
                Some(next) => y = next,
                None => {
                    let rect = Rect::new(left, y, width, height.max(0.0));
                    self.add(side, rect);
                    return rect;
                }
            }
        }
    }

    fn add(&mut self, side: Float, rect: Rect) {
        self.last_float_top = rect.y;
        if side != Float::None {
            self.floats.push(FloatExclusion { rect, side });
        }
    }

    /// The y a box with `clear` must start at or below.
    pub fn clearance(&self, clear: Clear) -> Option<f32> {
        let wanted = |side: Float| match clear {
            Clear::None => false,
            Clear::Left => side == Float::Left,
            Clear::Right => side == Float::Right,
            Clear::Both => true,
        };
        self.floats
            .iter()
            .filter(|exclusion| wanted(exclusion.side))
            .map(|exclusion| exclusion.rect.bottom())
            .max_by(f32::total_cmp)
    }

    /// Bottom of the lowest float; formatting context roots grow to contain it.
    pub fn bottom(&self) -> Option<f32> {
        self.floats
            .iter()
            .map(|exclusion| exclusion.rect.bottom())
            .max_by(f32::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_float_narrows_band_until_its_bottom() {
        let mut space = ExclusionSpace::new();
        let placed = space.place(Float::Left, 100.0, 50.0, 0.0, 0.0, 300.0);
        assert_eq!(placed, Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(space.band(40.0, 20.0, 0.0, 300.0).left, 100.0);
        assert_eq!(space.band(50.0, 20.0, 0.0, 300.0).left, 0.0);
        assert_eq!(space.clearance(Clear::Left), Some(50.0));
        assert_eq!(space.clearance(Clear::Right), None);
    }

    #[test]
    fn floats_stack_then_drop_below() {
        let mut space = ExclusionSpace::new();
        space.place(Float::Left, 200.0, 30.0, 0.0, 0.0, 300.0);
        let right = space.place(Float::Right, 100.0, 10.0, 0.0, 0.0, 300.0);
        assert_eq!(right.x, 200.0);
        let third = space.place(Float::Left, 150.0, 10.0, 0.0, 0.0, 300.0);
        assert_eq!((third.x, third.y), (0.0, 30.0));
    }
}
