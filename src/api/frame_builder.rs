use crate::core::model::TimelinePoint;
use crate::core::scale::{FORTUNE_MAX, FORTUNE_MIN};
use crate::core::{AgeBands, LinearScale, PlotRect, ProjectedCandle};
use crate::error::KlineResult;
use crate::render::{
    Color, LinePrimitive, LineStrokeStyle, RectPrimitive, RenderFrame, Renderer, TextHAlign,
    TextPrimitive,
};

use super::derived::{KeyYearKind, TrendSample};
use super::LifeChart;

/// Fortune levels that get a gridline and a label.
const VALUE_GRID: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 100.0];
const SHORT_AVERAGE_COLOR: Color = Color::rgb(0.961, 0.620, 0.043);
const LONG_AVERAGE_COLOR: Color = Color::rgb(0.231, 0.510, 0.965);
const BOUNDARY_COLOR: Color = Color::rgba(0.612, 0.639, 0.686, 0.8);
const LABEL_GAP_PX: f64 = 4.0;

impl<R: Renderer> LifeChart<R> {
    /// Materializes the current window into backend-agnostic draw commands.
    pub fn build_render_frame(&self) -> KlineResult<RenderFrame> {
        let plot = self.plot_rect()?;
        let (bands, scale) = self.plot_layout()?;
        let mut frame = RenderFrame::new(self.config.viewport);

        self.append_axes(&mut frame, plot, bands, scale)?;
        if self.result.is_none() {
            return Ok(frame);
        }

        let visible = self.visible_points();
        if self.config.show_period_boundaries {
            self.append_period_boundaries(&mut frame, plot, bands);
        }
        let candles = self.project_visible_candles()?;
        self.append_candles(&mut frame, &candles);
        if self.config.show_moving_averages {
            let samples = self.trend_samples();
            let layout = (bands, scale);
            append_average_line(&mut frame, &samples, layout, |s| s.short, SHORT_AVERAGE_COLOR)?;
            append_average_line(&mut frame, &samples, layout, |s| s.long, LONG_AVERAGE_COLOR)?;
        }
        if self.config.show_key_years {
            self.append_key_year_labels(&mut frame, &visible, bands, scale)?;
        }
        Ok(frame)
    }

    pub fn render(&mut self) -> KlineResult<()> {
        let frame = self.build_render_frame()?;
        self.renderer.render(&frame)
    }

    fn append_axes(
        &self,
        frame: &mut RenderFrame,
        plot: PlotRect,
        bands: AgeBands,
        scale: LinearScale,
    ) -> KlineResult<()> {
        let font = self.config.font_size_px;
        for value in VALUE_GRID {
            let y = scale.domain_to_pixel(value)?;
            let style = if value == FORTUNE_MIN || value == FORTUNE_MAX {
                LineStrokeStyle::Solid
            } else {
                LineStrokeStyle::Dashed
            };
            frame.push_line(
                LinePrimitive::new(plot.left, y, plot.right(), y, 1.0, self.config.axis_color)
                    .with_stroke_style(style),
            );
            frame.push_text(TextPrimitive::new(
                format!("{value:.0}"),
                plot.left - LABEL_GAP_PX,
                y + font / 2.0,
                font,
                self.config.label_color,
                TextHAlign::Right,
            ));
        }
        frame.push_line(LinePrimitive::new(
            plot.left,
            plot.top,
            plot.left,
            plot.bottom(),
            1.0,
            self.config.axis_color,
        ));

        let window = bands.window();
        let step = age_label_step(window.span());
        for age in window.start()..=window.end() {
            if age != window.start() && age % step != 0 {
                continue;
            }
            frame.push_text(TextPrimitive::new(
                age.to_string(),
                bands.center_x(age),
                plot.bottom() + LABEL_GAP_PX + font,
                font,
                self.config.label_color,
                TextHAlign::Center,
            ));
        }
        Ok(())
    }

    fn append_period_boundaries(&self, frame: &mut RenderFrame, plot: PlotRect, bands: AgeBands) {
        let window = bands.window();
        for boundary in self.period_boundaries() {
            if boundary.age == window.start() {
                continue;
            }
            let x = bands.band_for_age(boundary.age).start;
            frame.push_line(
                LinePrimitive::new(x, plot.top, x, plot.bottom(), 1.0, BOUNDARY_COLOR)
                    .with_stroke_style(LineStrokeStyle::Dashed),
            );
            if !boundary.period.is_empty() {
                frame.push_text(TextPrimitive::new(
                    boundary.period,
                    x + LABEL_GAP_PX,
                    plot.top + self.config.font_size_px,
                    self.config.font_size_px,
                    self.config.label_color,
                    TextHAlign::Left,
                ));
            }
        }
    }

    fn append_candles(&self, frame: &mut RenderFrame, candles: &[ProjectedCandle]) {
        let style = self.config.candle_style;
        for candle in candles {
            let geometry = &candle.geometry;
            let palette = style.palette(geometry.trend);
            for wick in &geometry.wicks {
                frame.push_line(LinePrimitive::new(
                    wick.x,
                    wick.y_from,
                    wick.x,
                    wick.y_to,
                    style.wick_width_px,
                    palette.wick,
                ));
            }
            frame.push_rect(RectPrimitive::new(
                geometry.body.x,
                geometry.body.y,
                geometry.body.width,
                geometry.body.height,
                palette.body,
            ));
        }
    }

    fn append_key_year_labels(
        &self,
        frame: &mut RenderFrame,
        visible: &[&TimelinePoint],
        bands: AgeBands,
        scale: LinearScale,
    ) -> KlineResult<()> {
        let font = self.config.font_size_px;
        for key in self.key_years().iter() {
            let Some(point) = visible.iter().find(|point| point.age == key.age) else {
                continue;
            };
            let y = match key.kind {
                KeyYearKind::High => scale.domain_to_pixel(point.high)? - LABEL_GAP_PX,
                KeyYearKind::Low => scale.domain_to_pixel(point.low)? + LABEL_GAP_PX + font,
            };
            frame.push_text(TextPrimitive::new(
                format!("{:.0}", key.score),
                bands.center_x(key.age),
                y,
                font,
                self.config.candle_style.palette(point.trend()).body,
                TextHAlign::Center,
            ));
        }
        Ok(())
    }
}

/// Joins consecutive samples that both carry a value; gaps break the line.
fn append_average_line(
    frame: &mut RenderFrame,
    samples: &[TrendSample],
    (bands, scale): (AgeBands, LinearScale),
    value: impl Fn(&TrendSample) -> Option<f64>,
    color: Color,
) -> KlineResult<()> {
    for pair in samples.windows(2) {
        let (Some(from), Some(to)) = (value(&pair[0]), value(&pair[1])) else {
            continue;
        };
        frame.push_line(LinePrimitive::new(
            bands.center_x(pair[0].age),
            scale.domain_to_pixel(from)?,
            bands.center_x(pair[1].age),
            scale.domain_to_pixel(to)?,
            1.5,
            color,
        ));
    }
    Ok(())
}

fn age_label_step(span: i32) -> i32 {
    if span <= 15 {
        1
    } else if span <= 40 {
        5
    } else {
        10
    }
}

#[cfg(test)]
mod tests {
    use super::age_label_step;

    #[test]
    fn age_labels_thin_out_as_the_window_widens() {
        assert_eq!(age_label_step(10), 1);
        assert_eq!(age_label_step(30), 5);
        assert_eq!(age_label_step(100), 10);
    }
}
