// Focal-point-preserving zoom over an abstract scrollable viewport. Zoom is
// quantized to fixed steps inside a bounded range; a zoom change keeps the
// chosen screen point visually stationary by re-projecting its fractional
// position through the new rendered size and recentering the scroll offset
// on it.

use crate::config::ViewerConfig;

const ZOOM_EPS: f32 = 1e-3;

/// Viewer state for a single opened photo. Created when the photo opens,
/// dropped when the viewer closes.
pub struct ZoomViewport {
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
    step: f32,
    /// Natural raster dimensions, unknown until the image finishes loading.
    natural: Option<(f32, f32)>,
    scroll: (f32, f32),
    client: (f32, f32),
}

impl ZoomViewport {
    pub fn new(config: &ViewerConfig, client_width: f32, client_height: f32) -> Self {
        let (min_zoom, max_zoom, step) = config.zoom_bounds();
        Self {
            zoom: min_zoom,
            min_zoom,
            max_zoom,
            step,
            natural: None,
            scroll: (0.0, 0.0),
            client: (client_width.max(0.0), client_height.max(0.0)),
        }
    }

    /// Called once the raster has loaded. Zoom operations are no-ops until
    /// then.
    pub fn set_natural_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.natural = Some((width as f32, height as f32));
    }

    pub fn set_client_size(&mut self, width: f32, height: f32) {
        self.client = (width.max(0.0), height.max(0.0));
        self.scroll = self.clamped_scroll(self.scroll.0, self.scroll.1);
    }

    /// Scroll offsets as reported by the viewport.
    pub fn set_scroll(&mut self, left: f32, top: f32) {
        self.scroll = self.clamped_scroll(left, top);
    }

    pub fn scroll(&self) -> (f32, f32) {
        self.scroll
    }

    pub fn current_zoom(&self) -> f32 {
        self.zoom
    }

    pub fn can_zoom_in(&self) -> bool {
        self.natural.is_some() && self.zoom + self.step <= self.max_zoom + ZOOM_EPS
    }

    pub fn can_zoom_out(&self) -> bool {
        self.natural.is_some() && self.zoom - self.step >= self.min_zoom - ZOOM_EPS
    }

    /// Rendered image size at the current zoom. Width is zoom * natural
    /// width; height follows the natural aspect so the raster is never
    /// distorted.
    pub fn rendered_size(&self) -> Option<(f32, f32)> {
        self.natural.map(|(nw, nh)| {
            let width = self.zoom * nw;
            (width, width * nh / nw)
        })
    }

    /// Step the zoom up, keeping `focal` (screen pixels relative to the
    /// rendered image) visually fixed. Without a focal point the current
    /// viewport center is used, so toolbar zoom keeps the center of view
    /// stable.
    pub fn zoom_in(&mut self, focal: Option<(f32, f32)>) {
        self.apply_step(self.step, focal);
    }

    pub fn zoom_out(&mut self, focal: Option<(f32, f32)>) {
        self.apply_step(-self.step, focal);
    }

    /// Click-to-zoom policy, wired up only when the caller registers a click
    /// handler: zoom in on the clicked point until the bound, then a click
    /// at max zoom steps back out.
    pub fn click_zoom(&mut self, x: f32, y: f32) {
        if self.zoom + ZOOM_EPS >= self.max_zoom {
            self.zoom_out(Some((x, y)));
        } else {
            self.zoom_in(Some((x, y)));
        }
    }

    fn apply_step(&mut self, delta: f32, focal: Option<(f32, f32)>) {
        let Some((cur_width, cur_height)) = self.rendered_size() else {
            // Raster not loaded yet
            return;
        };

        let target = self.zoom + delta;
        if target < self.min_zoom - ZOOM_EPS || target > self.max_zoom + ZOOM_EPS {
            // Out of bounds is a no-op, scroll untouched
            return;
        }

        let (fx, fy) = focal.unwrap_or((
            self.scroll.0 + self.client.0 / 2.0,
            self.scroll.1 + self.client.1 / 2.0,
        ));

        // Fractional position of the focal point within the rendered image
        let ratio_x = fx / cur_width;
        let ratio_y = fy / cur_height;

        self.zoom = target.clamp(self.min_zoom, self.max_zoom);

        let (new_width, new_height) = match self.rendered_size() {
            Some(size) => size,
            None => return,
        };

        // Put the re-projected focal pixel under the viewport center
        let new_fx = ratio_x * new_width;
        let new_fy = ratio_y * new_height;
        self.scroll =
            self.clamped_scroll(new_fx - self.client.0 / 2.0, new_fy - self.client.1 / 2.0);
    }

    // The abstract viewport clamps like a browser: never negative, never
    // past the scrollable extent.
    fn clamped_scroll(&self, left: f32, top: f32) -> (f32, f32) {
        let (width, height) = self.rendered_size().unwrap_or((0.0, 0.0));
        let max_left = (width - self.client.0).max(0.0);
        let max_top = (height - self.client.1).max(0.0);
        (left.clamp(0.0, max_left), top.clamp(0.0, max_top))
    }
}
