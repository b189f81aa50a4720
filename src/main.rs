//! Arcade Minis entry point
//!
//! On the web the URL hash picks the game (`index.html#snake`). Natively the
//! binary runs a short scripted, headless session of one game and logs the
//! result, which is handy for eyeballing tuning changes.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use arcade_minis::Settings;
    use arcade_minis::games::{
        Breakout, Flappy, GameId, Jumper, Rhythm, Shooter, Snake, Stacker,
    };
    use arcade_minis::platform::{self, web::launch};

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        // A new hash means a new game: start over from a clean page
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Some(window) = web_sys::window() {
                    let _ = window.location().reload();
                }
            });
            window.add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let hash = window.location().hash().unwrap_or_default();
        let Some(id) = GameId::parse(&hash) else {
            log::info!("No game selected, showing menu");
            if let Some(menu) = document.get_element_by_id("menu") {
                menu.set_inner_html(&platform::menu_html(&GameId::ALL));
                let _ = menu.set_attribute("class", "");
            }
            return Ok(());
        };

        if let Some(menu) = document.get_element_by_id("menu") {
            let _ = menu.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        log::info!("Launching {} with seed {}", id.as_str(), seed);

        match id {
            GameId::Breakout => launch::<Breakout>(&document, &canvas, &settings, seed),
            GameId::Flappy => launch::<Flappy>(&document, &canvas, &settings, seed),
            GameId::Jumper => launch::<Jumper>(&document, &canvas, &settings, seed),
            GameId::Shooter => launch::<Shooter>(&document, &canvas, &settings, seed),
            GameId::Rhythm => launch::<Rhythm>(&document, &canvas, &settings, seed),
            GameId::Snake => launch::<Snake>(&document, &canvas, &settings, seed),
            GameId::Stacker => launch::<Stacker>(&document, &canvas, &settings, seed),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use arcade_minis::games::{
        Breakout, Flappy, GameId, Jumper, Rhythm, Shooter, Snake, Stacker,
    };
    use arcade_minis::input::{GestureRecognizer, PointerEvent};
    use arcade_minis::renderer::RecordingCanvas;
    use arcade_minis::sim::{Game, GameLoop, LoopPhase, ManualScheduler, Services};
    use arcade_minis::Settings;

    /// Frames simulated before giving up (about a minute at 60 Hz)
    const MAX_FRAMES: u32 = 3600;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Scripted pointer input: a tap to start, then a slow sweep of short
    /// drags and swipes around the middle of the canvas
    fn script(frame: u32, size: Vec2) -> Vec<PointerEvent> {
        let center = size / 2.0;
        let time = frame as f64 * FRAME_MS;
        match frame % 60 {
            0 => vec![
                PointerEvent::down(center.x, center.y).at_time(time),
                PointerEvent::up(center.x, center.y).at_time(time + 40.0),
            ],
            20 => {
                let x = center.x + ((frame / 60) as f32 * 0.9).sin() * size.x * 0.3;
                vec![
                    PointerEvent::down(center.x, center.y).at_time(time),
                    PointerEvent::moved(x, center.y).at_time(time + 60.0),
                    PointerEvent::up(x, center.y).at_time(time + 80.0),
                ]
            }
            _ => Vec::new(),
        }
    }

    fn play<G: Game>(seed: u64) {
        let settings = Settings::default();
        let mut game_loop: GameLoop<G, ManualScheduler> =
            GameLoop::new(seed, ManualScheduler::new(), Services::headless(seed));
        let size = game_loop.game().logical_size();
        let mut canvas = RecordingCanvas::new(size);
        let mut recognizer =
            GestureRecognizer::new(settings.gesture_config()).with_drag_stream(game_loop.game().wants_drag());

        game_loop.start();
        let mut now = 0.0;
        for frame in 0..MAX_FRAMES {
            for event in script(frame, Vec2::new(size.width, size.height)) {
                if let Some(gesture) = recognizer.classify(event) {
                    game_loop.push_gesture(gesture);
                }
            }
            now += FRAME_MS;
            canvas.reset();
            for token in game_loop.scheduler_mut().take_due() {
                game_loop.on_frame(token, now, &mut canvas);
            }
            if !game_loop.is_scheduled() {
                break;
            }
        }

        match game_loop.phase() {
            LoopPhase::Ended(outcome) => log::info!(
                "{} finished: {:?} with score {} after {} updates",
                game_loop.game().name(),
                outcome,
                game_loop.game().score(),
                game_loop.updates()
            ),
            phase => log::info!(
                "{} still {:?} after {} frames, score {}",
                game_loop.game().name(),
                phase,
                MAX_FRAMES,
                game_loop.game().score()
            ),
        }
        log::debug!("Last frame issued {} draw calls", canvas.commands.len());
    }

    pub fn run(arg: Option<String>, seed: u64) {
        let ids: Vec<GameId> = match arg.as_deref().map(GameId::parse) {
            Some(Some(id)) => vec![id],
            Some(None) => {
                log::error!(
                    "Unknown game {:?}; expected one of: {}",
                    arg.unwrap_or_default(),
                    GameId::ALL.map(|id| id.as_str()).join(", ")
                );
                return;
            }
            None => GameId::ALL.to_vec(),
        };
        for id in ids {
            match id {
                GameId::Breakout => play::<Breakout>(seed),
                GameId::Flappy => play::<Flappy>(seed),
                GameId::Jumper => play::<Jumper>(seed),
                GameId::Shooter => play::<Shooter>(seed),
                GameId::Rhythm => play::<Rhythm>(seed),
                GameId::Snake => play::<Snake>(seed),
                GameId::Stacker => play::<Stacker>(seed),
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let game = args.next();
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    log::info!("Arcade Minis (native) - headless run, seed {}", seed);
    log::info!("Build with `trunk serve` for the playable web version");
    headless::run(game, seed);
}
