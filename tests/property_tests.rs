use life_kline::core::{
    AgeWindow, CandleInput, LinearScale, PixelBand, ValueScale, WickKind, project_candle,
};
use life_kline::interaction::{ViewportChange, ViewportController};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Input {
    ZoomIn,
    ZoomOut,
    Reset,
    Wheel { delta: f64, offset: f64 },
    Range { start: f64, end: f64 },
    Brush { from: f64, to: f64 },
    Pinch { begin: f64, update: f64 },
    Key(&'static str),
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        Just(Input::ZoomIn),
        Just(Input::ZoomOut),
        Just(Input::Reset),
        (-240.0f64..240.0, -50.0f64..1_050.0)
            .prop_map(|(delta, offset)| Input::Wheel { delta, offset }),
        (-20.0f64..130.0, -20.0f64..130.0).prop_map(|(start, end)| Input::Range { start, end }),
        (-20.0f64..1_020.0, -20.0f64..1_020.0).prop_map(|(from, to)| Input::Brush { from, to }),
        (1.0f64..500.0, 1.0f64..500.0).prop_map(|(begin, update)| Input::Pinch { begin, update }),
        prop::sample::select(vec!["+", "=", "-", "0", "f", "x"]).prop_map(Input::Key),
    ]
}

fn apply(controller: &mut ViewportController, input: &Input) -> Option<ViewportChange> {
    match *input {
        Input::ZoomIn => Some(controller.zoom_in()),
        Input::ZoomOut => Some(controller.zoom_out()),
        Input::Reset => Some(controller.reset()),
        Input::Wheel { delta, offset } => controller.wheel_zoom(delta, offset, 1_000.0).ok(),
        Input::Range { start, end } => Some(controller.set_range(start, end)),
        Input::Brush { from, to } => controller.brush_to_pixels(from, to, 1_000.0).ok(),
        Input::Pinch { begin, update } => {
            controller.begin_pinch(begin).ok()?;
            let change = controller.update_pinch(update).ok();
            controller.end_pinch();
            change
        }
        Input::Key(key) => {
            controller.handle_key(key, false);
            None
        }
    }
}

proptest! {
    #[test]
    fn viewport_invariant_holds_under_any_input_sequence(
        inputs in prop::collection::vec(input(), 1..40)
    ) {
        let mut controller = ViewportController::new();
        for input in &inputs {
            let before = controller.window();
            let change = apply(&mut controller, input);
            let window = controller.window();

            prop_assert!(window.start() >= 1);
            prop_assert!(window.end() <= 100);
            prop_assert!(window.start() < window.end());
            prop_assert!(window.span() >= 10);
            prop_assert_eq!(AgeWindow::new(window.start(), window.end()).ok(), Some(window));

            match change {
                Some(ViewportChange::Applied(applied)) => prop_assert_eq!(applied, window),
                Some(ViewportChange::Unchanged | ViewportChange::Rejected(_)) => {
                    prop_assert_eq!(before, window);
                }
                None => {}
            }
        }
    }

    #[test]
    fn candle_body_stays_inside_wicks(
        low in 0.0f64..50.0,
        range in 0.0f64..50.0,
        open_ratio in 0.0f64..=1.0,
        close_ratio in 0.0f64..=1.0,
        band_width in 1.0f64..60.0,
    ) {
        let high = low + range;
        let open = low + open_ratio * range;
        let close = low + close_ratio * range;
        let scale = LinearScale::fortune(PixelBand::new(10.0, 300.0)).expect("scale");
        let candle = project_candle(
            CandleInput::new(open, close, high, low),
            PixelBand::new(0.0, band_width),
            scale.band(),
            Some(&scale as &dyn ValueScale),
        ).expect("candle");

        prop_assert!(candle.body.width >= 3.0);
        prop_assert!(candle.body.height >= 3.0 - 1e-9);
        prop_assert!(!candle.used_fallback_scale);
        if let Some(upper) = candle.wick(WickKind::Upper) {
            prop_assert!(upper.y_from < candle.body.top());
            prop_assert!((upper.y_to - candle.body.top()).abs() <= 1e-9);
        }
        if let Some(lower) = candle.wick(WickKind::Lower) {
            prop_assert!(lower.y_from > candle.body.bottom());
            prop_assert!((lower.y_to - candle.body.bottom()).abs() <= 1e-9);
        }
        prop_assert!(candle.wicks.len() <= 2);
    }
}
