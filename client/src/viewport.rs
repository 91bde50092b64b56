use floodmap_shared::geo::project_bounds;
use floodmap_shared::{LatLng, LatLngBounds, WorldPoint, project, unproject};

use crate::config::{MAX_ZOOM, MIN_ZOOM, WHEEL_PX_PER_ZOOM_LEVEL};

/// Viewport manages the pan/zoom transformation from Web Mercator world
/// pixels (zoom 0) to screen pixels. `scale` is `2^zoom`.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

fn min_scale() -> f64 {
    MIN_ZOOM.exp2()
}

fn max_scale() -> f64 {
    (MAX_ZOOM as f64).exp2()
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

impl Viewport {
    /// Viewport of a `canvas_w` x `canvas_h` canvas centred on `center`.
    pub fn centered_on(center: LatLng, zoom: f64, canvas_w: f64, canvas_h: f64) -> Self {
        let mut vp = Self {
            scale: zoom.exp2().clamp(min_scale(), max_scale()),
            ..Self::default()
        };
        vp.center_world(project(center), canvas_w, canvas_h);
        vp
    }

    pub fn zoom(&self) -> f64 {
        self.scale.log2()
    }

    pub fn can_zoom_in(&self) -> bool {
        self.scale < max_scale()
    }

    pub fn can_zoom_out(&self) -> bool {
        self.scale > min_scale()
    }

    /// Convert world coordinates to screen coordinates.
    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (
            wx * self.scale + self.offset_x,
            wy * self.scale + self.offset_y,
        )
    }

    /// Convert screen coordinates to world coordinates.
    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.offset_x) / self.scale,
            (sy - self.offset_y) / self.scale,
        )
    }

    pub fn latlng_to_screen(&self, p: LatLng) -> (f64, f64) {
        let w = project(p);
        self.world_to_screen(w.x, w.y)
    }

    pub fn screen_to_latlng(&self, sx: f64, sy: f64) -> LatLng {
        let (x, y) = self.screen_to_world(sx, sy);
        unproject(WorldPoint { x, y })
    }

    /// World rectangle `(min_x, min_y, max_x, max_y)` visible on the canvas.
    pub fn visible_world(&self, canvas_w: f64, canvas_h: f64) -> (f64, f64, f64, f64) {
        let (x1, y1) = self.screen_to_world(0.0, 0.0);
        let (x2, y2) = self.screen_to_world(canvas_w, canvas_h);
        (x1, y1, x2, y2)
    }

    /// Wheel zoom toward a focus point (screen coordinates).
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        let factor = (-delta / WHEEL_PX_PER_ZOOM_LEVEL).exp2();
        self.set_scale_around(self.scale * factor, screen_x, screen_y);
    }

    /// Step whole zoom levels (buttons, keyboard), snapping to an integer zoom.
    pub fn zoom_by(&mut self, levels: f64, screen_x: f64, screen_y: f64) {
        let target = (self.zoom() + levels).round();
        self.set_scale_around(target.exp2(), screen_x, screen_y);
    }

    fn set_scale_around(&mut self, scale: f64, screen_x: f64, screen_y: f64) {
        let new_scale = scale.clamp(min_scale(), max_scale());
        let ratio = new_scale / self.scale;

        // Adjust offset so the point under the cursor stays fixed
        self.offset_x = screen_x - (screen_x - self.offset_x) * ratio;
        self.offset_y = screen_y - (screen_y - self.offset_y) * ratio;
        self.scale = new_scale;
    }

    /// Pan by screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    fn center_world(&mut self, center: WorldPoint, canvas_w: f64, canvas_h: f64) {
        self.offset_x = canvas_w / 2.0 - center.x * self.scale;
        self.offset_y = canvas_h / 2.0 - center.y * self.scale;
    }

    /// Frame `bounds` at the largest whole zoom level that still shows all of it.
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, canvas_w: f64, canvas_h: f64) {
        if canvas_w <= 0.0 || canvas_h <= 0.0 {
            return;
        }
        let (min_x, min_y, max_x, max_y) = project_bounds(bounds);
        let world_w = max_x - min_x;
        let world_h = max_y - min_y;

        let fit = if world_w <= 0.0 && world_h <= 0.0 {
            max_scale()
        } else {
            let sx = if world_w > 0.0 { canvas_w / world_w } else { f64::MAX };
            let sy = if world_h > 0.0 { canvas_h / world_h } else { f64::MAX };
            sx.min(sy)
        };
        // Snap down to a whole level; the epsilon absorbs log2 rounding on exact fits.
        let zoom = (fit.log2() + 1e-9).floor();
        self.scale = zoom.exp2().clamp(min_scale(), max_scale());
        self.center_world(
            WorldPoint {
                x: (min_x + max_x) / 2.0,
                y: (min_y + max_y) / 2.0,
            },
            canvas_w,
            canvas_h,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn croatia() -> LatLngBounds {
        LatLngBounds {
            south: 45.2,
            west: 15.6,
            north: 45.9,
            east: 16.8,
        }
    }

    #[test]
    fn world_screen_round_trip() {
        let vp = Viewport {
            offset_x: 37.0,
            offset_y: -12.0,
            scale: 8.0,
        };
        let (sx, sy) = vp.world_to_screen(100.0, 50.0);
        let (wx, wy) = vp.screen_to_world(sx, sy);
        assert!(close(wx, 100.0) && close(wy, 50.0));
    }

    #[test]
    fn centered_view_puts_center_mid_canvas() {
        let c = LatLng::new(45.8, 16.0);
        let vp = Viewport::centered_on(c, 10.0, 800.0, 600.0);
        let (sx, sy) = vp.latlng_to_screen(c);
        assert!(close(sx, 400.0) && close(sy, 300.0));
        assert!(close(vp.zoom(), 10.0));
    }

    #[test]
    fn wheel_zoom_keeps_focus_fixed() {
        let mut vp = Viewport::centered_on(LatLng::new(0.0, 0.0), 3.0, 800.0, 600.0);
        let before = vp.screen_to_world(200.0, 150.0);
        vp.zoom_at(-WHEEL_PX_PER_ZOOM_LEVEL, 200.0, 150.0);
        let after = vp.screen_to_world(200.0, 150.0);
        assert!(close(before.0, after.0) && close(before.1, after.1));
        assert!(close(vp.zoom(), 4.0));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = Viewport::centered_on(LatLng::new(0.0, 0.0), 18.0, 800.0, 600.0);
        vp.zoom_by(5.0, 400.0, 300.0);
        assert!(close(vp.zoom(), MAX_ZOOM as f64));
        assert!(!vp.can_zoom_in());
        vp.zoom_by(-40.0, 400.0, 300.0);
        assert!(close(vp.zoom(), MIN_ZOOM));
        assert!(!vp.can_zoom_out());
    }

    #[test]
    fn zoom_steps_snap_to_whole_levels() {
        let mut vp = Viewport::centered_on(LatLng::new(0.0, 0.0), 3.3, 800.0, 600.0);
        vp.zoom_by(1.0, 400.0, 300.0);
        assert!(close(vp.zoom(), 4.0));
    }

    #[test]
    fn fit_shows_whole_bounds_at_tightest_whole_zoom() {
        let (w, h) = (800.0, 600.0);
        let mut vp = Viewport::default();
        vp.fit_bounds(&croatia(), w, h);
        assert!(close(vp.zoom().fract(), 0.0));

        let (bx1, by1, bx2, by2) = project_bounds(&croatia());
        let (vx1, vy1, vx2, vy2) = vp.visible_world(w, h);
        assert!(vx1 <= bx1 && vy1 <= by1 && vx2 >= bx2 && vy2 >= by2);

        let mut tighter = vp.clone();
        tighter.zoom_by(1.0, w / 2.0, h / 2.0);
        let (tx1, ty1, tx2, ty2) = tighter.visible_world(w, h);
        assert!(tx1 > bx1 || ty1 > by1 || tx2 < bx2 || ty2 < by2);
    }

    #[test]
    fn fit_centers_on_bounds() {
        let (w, h) = (1024.0, 768.0);
        let mut vp = Viewport::default();
        vp.fit_bounds(&croatia(), w, h);
        let (bx1, by1, bx2, by2) = project_bounds(&croatia());
        let (sx, sy) = vp.world_to_screen((bx1 + bx2) / 2.0, (by1 + by2) / 2.0);
        assert!(close(sx, w / 2.0) && close(sy, h / 2.0));
    }

    #[test]
    fn fit_on_a_point_uses_max_zoom() {
        let p = LatLng::new(45.0, 16.0);
        let mut vp = Viewport::default();
        vp.fit_bounds(&LatLngBounds::from_point(p), 800.0, 600.0);
        assert!(close(vp.zoom(), MAX_ZOOM as f64));
    }

    #[test]
    fn fit_ignores_empty_canvas() {
        let mut vp = Viewport::default();
        vp.fit_bounds(&croatia(), 0.0, 600.0);
        assert_eq!(vp, Viewport::default());
    }
}
