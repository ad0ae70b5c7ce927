//! Tablet-to-screen coordinate mapping: absolute and mouse (relative) modes,
//! active-area clamping, and proportional rescaling on display reconfiguration.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn clamp_point(&self, p: (f32, f32)) -> (f32, f32) {
        (
            p.0.clamp(self.x, self.x + self.width),
            p.1.clamp(self.y, self.y + self.height),
        )
    }

    #[must_use]
    pub fn contains(&self, p: (f32, f32)) -> bool {
        p.0 >= self.x && p.0 <= self.x + self.width && p.1 >= self.y && p.1 <= self.y + self.height
    }

    /// Preserve proportional placement: multiply origin and size by an axis
    /// ratio, used when the host's display bounds change underneath us.
    #[must_use]
    pub fn rescale(&self, ratio_x: f32, ratio_y: f32) -> Self {
        Self {
            x: self.x * ratio_x,
            y: self.y * ratio_y,
            width: self.width * ratio_x,
            height: self.height * ratio_y,
        }
    }
}

pub struct Mapper {
    pub tablet: Rect,
    pub screen: Rect,
    pub mouse_mode: bool,
    pub scaling: f32,
    screen_pos: (f32, f32),
}

impl Mapper {
    #[must_use]
    pub fn new(tablet: Rect, screen: Rect) -> Self {
        let screen_pos = (screen.x, screen.y);
        Self { tablet, screen, mouse_mode: false, scaling: 1.0, screen_pos }
    }

    /// Absolute-mode mapping: clamp to the tablet rectangle, then scale
    /// proportionally into the screen rectangle.
    #[must_use]
    pub fn absolute(&self, tablet_point: (f32, f32)) -> (f32, f32) {
        let (cx, cy) = self.tablet.clamp_point(tablet_point);
        let nx = (cx - self.tablet.x) / self.tablet.width;
        let ny = (cy - self.tablet.y) / self.tablet.height;
        (self.screen.x + nx * self.screen.width, self.screen.y + ny * self.screen.height)
    }

    /// Mouse-mode mapping: accumulate the reported tablet delta into the
    /// screen position. Returns `None` if the raw point left the tablet
    /// rectangle (the caller should treat the stylus as out of proximity).
    pub fn mouse(&mut self, tablet_point: (f32, f32), motion: (f32, f32)) -> Option<(f32, f32)> {
        if !self.tablet.contains(tablet_point) {
            return None;
        }
        let ratio = (self.screen.width / self.tablet.width).min(self.screen.height / self.tablet.height);
        let factor = ratio * 2.0 * self.scaling;
        self.screen_pos.0 += motion.0 * factor;
        self.screen_pos.1 += motion.1 * factor;
        self.screen_pos = self.screen.clamp_point(self.screen_pos);
        Some(self.screen_pos)
    }

    /// Apply a point through whichever mode is active.
    pub fn map(&mut self, tablet_point: (f32, f32), motion: (f32, f32)) -> Option<(f32, f32)> {
        if self.mouse_mode {
            self.mouse(tablet_point, motion)
        } else {
            Some(self.absolute(tablet_point))
        }
    }

    /// Re-derive `tablet`/`screen` proportionally after a display
    /// reconfiguration, preserving each rectangle's relative placement.
    pub fn on_display_reconfigure(&mut self, old_screen: Rect, new_screen: Rect) {
        let ratio_x = new_screen.width / old_screen.width;
        let ratio_y = new_screen.height / old_screen.height;
        self.screen = self.screen.rescale(ratio_x, ratio_y);
        self.screen_pos = (self.screen_pos.0 * ratio_x, self.screen_pos.1 * ratio_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_is_idempotent() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        let p = (150.0, -20.0);
        let once = r.clamp_point(p);
        let twice = r.clamp_point(once);
        assert_eq!(once, twice);
    }

    #[test]
    fn absolute_mapping_is_monotone_in_each_axis() {
        let m = Mapper::new(Rect::new(0.0, 0.0, 1000.0, 1000.0), Rect::new(0.0, 0.0, 1920.0, 1080.0));
        let a = m.absolute((100.0, 100.0));
        let b = m.absolute((200.0, 100.0));
        assert!(b.0 > a.0);
        assert_eq!(a.1, b.1);
    }

    #[test]
    fn relative_mode_advances_with_flipped_y_on_lower_left_origin() {
        // This mirrors the II-S relative-mode decoder, which flips Y before
        // the mapper ever sees the point; the mapper itself is origin-agnostic
        // and just accumulates whatever motion it's given.
        let mut m = Mapper::new(Rect::new(0.0, 0.0, 15240.0, 15240.0), Rect::new(0.0, 0.0, 1920.0, 1080.0));
        m.mouse_mode = true;
        let moved = m.mouse((10.0, 5.0), (10.0, -5.0)).unwrap();
        assert!(moved.0 > 0.0);
        assert!(moved.1 < m.screen.y + m.screen.height);
    }
}
