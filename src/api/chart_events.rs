use tracing::trace;

use crate::error::{KlineError, KlineResult};
use crate::interaction::{KeyResponse, ViewportChange};
use crate::render::Renderer;

use super::LifeChart;

/// Input handlers. Pointer coordinates are viewport pixels; the plot
/// margins are subtracted here so the controller only sees plot offsets.
impl<R: Renderer> LifeChart<R> {
    pub fn zoom_in(&mut self) -> ViewportChange {
        self.controller.zoom_in()
    }

    pub fn zoom_out(&mut self) -> ViewportChange {
        self.controller.zoom_out()
    }

    pub fn reset_zoom(&mut self) -> ViewportChange {
        self.controller.reset()
    }

    pub fn wheel_zoom(&mut self, wheel_delta_y: f64, pointer_x: f64) -> KlineResult<ViewportChange> {
        let plot = self.plot_rect()?;
        let offset = finite_pointer(pointer_x)? - plot.left;
        trace!(pointer_x, offset, "wheel over plot");
        self.controller.wheel_zoom(wheel_delta_y, offset, plot.width)
    }

    pub fn set_visible_range(&mut self, start: f64, end: f64) -> ViewportChange {
        self.controller.set_range(start, end)
    }

    pub fn set_visible_start(&mut self, start: f64) -> ViewportChange {
        self.controller.set_start(start)
    }

    pub fn set_visible_end(&mut self, end: f64) -> ViewportChange {
        self.controller.set_end(end)
    }

    pub fn begin_pinch(&mut self, distance: f64) -> KlineResult<()> {
        self.controller.begin_pinch(distance)
    }

    pub fn update_pinch(&mut self, distance: f64) -> KlineResult<ViewportChange> {
        self.controller.update_pinch(distance)
    }

    pub fn end_pinch(&mut self) {
        self.controller.end_pinch();
    }

    pub fn brush_to_ages(&mut self, start_age: f64, end_age: f64) -> KlineResult<ViewportChange> {
        self.controller.brush_to_ages(start_age, end_age)
    }

    /// Brush handles in viewport pixels; the brush track spans the plot width.
    pub fn brush_to_pixels(&mut self, start_x: f64, end_x: f64) -> KlineResult<ViewportChange> {
        let plot = self.plot_rect()?;
        self.controller.brush_to_pixels(
            finite_pointer(start_x)? - plot.left,
            finite_pointer(end_x)? - plot.left,
            plot.width,
        )
    }

    pub fn handle_key(&mut self, key: &str, text_input_focused: bool) -> KeyResponse {
        self.controller.handle_key(key, text_input_focused)
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.controller.toggle_fullscreen()
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.controller.is_fullscreen()
    }
}

fn finite_pointer(x: f64) -> KlineResult<f64> {
    if x.is_finite() {
        Ok(x)
    } else {
        Err(KlineError::InvalidData(
            "pointer coordinate must be finite".to_owned(),
        ))
    }
}
