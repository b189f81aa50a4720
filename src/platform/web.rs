//! Browser glue (wasm only)

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, KeyboardEvent};

use super::{best_line, key_gesture, outcome_heading};
use crate::audio::AudioManager;
use crate::highscores::LocalScoreStore;
use crate::input::{
    CoordinateMapper, GestureKind, GestureRecognizer, PointerEvent, PointerPhase, SurfaceRect,
};
use crate::renderer::Canvas2d;
use crate::settings::Settings;
use crate::sim::{
    FrameHandle, FrameScheduler, FrameToken, Game, GameLoop, Outcome, OutcomePresenter,
    OutcomeReport, Services,
};

/// `requestAnimationFrame` scheduler; every frame calls `handler(token, time)`
pub struct RafScheduler {
    handler: Rc<dyn Fn(FrameToken, f64)>,
}

impl RafScheduler {
    pub fn new(handler: impl Fn(FrameToken, f64) + 'static) -> Self {
        Self {
            handler: Rc::new(handler),
        }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self, token: FrameToken) -> Option<FrameHandle> {
        let window = web_sys::window()?;
        let handler = self.handler.clone();
        let closure = Closure::once(move |time: f64| handler(token, time));
        let id = window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok()?;
        closure.forget();
        Some(FrameHandle(id))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle.0);
        }
    }
}

/// Outcome overlay made of `#outcome`, `#outcome-title`, `#outcome-message`
/// and `#outcome-best`
pub struct DomPresenter {
    document: Document,
}

impl DomPresenter {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }
}

impl OutcomePresenter for DomPresenter {
    fn present(&mut self, report: &OutcomeReport) {
        let Some(overlay) = self.document.get_element_by_id("outcome") else {
            log::warn!("No outcome overlay, {}: {}", report.game, report.message);
            return;
        };
        self.set_text("outcome-title", outcome_heading(report));
        self.set_text("outcome-message", &report.message);
        self.set_text("outcome-best", &best_line(report));
        let class = match report.outcome {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
        };
        let _ = overlay.set_attribute("class", class);
    }

    fn dismiss(&mut self) {
        if let Some(overlay) = self.document.get_element_by_id("outcome") {
            let _ = overlay.set_attribute("class", "hidden");
        }
    }
}

/// Everything a running page owns for its one game
struct Runtime<G: Game> {
    game_loop: GameLoop<G, RafScheduler>,
    canvas: Canvas2d,
}

impl<G: Game> Runtime<G> {
    fn frame(&mut self, token: FrameToken, time: f64) {
        let Runtime { game_loop, canvas } = self;
        game_loop.on_frame(token, time, canvas);
    }
}

/// Pointer events -> logical coordinates -> recognizer
struct PointerInput {
    canvas: HtmlCanvasElement,
    mapper: CoordinateMapper,
    recognizer: GestureRecognizer,
}

impl PointerInput {
    fn handle(&mut self, phase: PointerPhase, event: &web_sys::PointerEvent) {
        // Read the rect on every event: it moves on resize and rotation
        let bounds = self.canvas.get_bounding_client_rect();
        let rect = SurfaceRect::new(
            bounds.left() as f32,
            bounds.top() as f32,
            bounds.width() as f32,
            bounds.height() as f32,
        );
        let position = self
            .mapper
            .to_logical(&rect, event.client_x() as f32, event.client_y() as f32);
        if phase == PointerPhase::Down {
            let _ = self.canvas.set_pointer_capture(event.pointer_id());
        }
        self.recognizer.feed(PointerEvent::new(
            phase,
            event.pointer_id(),
            position,
            event.time_stamp(),
        ));
    }
}

/// Start game `G` on `canvas`: loop, input, keyboard and restart button
pub fn launch<G: Game + 'static>(
    document: &Document,
    canvas: &HtmlCanvasElement,
    settings: &Settings,
    seed: u64,
) -> Result<(), JsValue> {
    let logical = G::new(seed).logical_size();
    let canvas2d = Canvas2d::new(canvas, logical)
        .ok_or_else(|| JsValue::from_str("2D canvas context unavailable"))?;

    let services = Services::new(
        settings,
        seed,
        Box::new(AudioManager::new(settings)),
        Box::new(LocalScoreStore::new()),
        Box::new(DomPresenter::new(document.clone())),
    );

    let runtime = Rc::new_cyclic(|weak: &std::rc::Weak<RefCell<Runtime<G>>>| {
        let weak = weak.clone();
        let scheduler = RafScheduler::new(move |token, time| {
            if let Some(rt) = weak.upgrade() {
                rt.borrow_mut().frame(token, time);
            }
        });
        RefCell::new(Runtime {
            game_loop: GameLoop::new(seed, scheduler, services),
            canvas: canvas2d,
        })
    });

    setup_pointer(canvas, &runtime, settings)?;
    setup_keyboard(&runtime, logical.width, logical.height)?;
    setup_restart_button(document, &runtime)?;

    runtime.borrow_mut().game_loop.start();
    Ok(())
}

fn setup_pointer<G: Game + 'static>(
    canvas: &HtmlCanvasElement,
    runtime: &Rc<RefCell<Runtime<G>>>,
    settings: &Settings,
) -> Result<(), JsValue> {
    // Keep the browser from scrolling or zooming on touch
    canvas.style().set_property("touch-action", "none")?;

    let (logical, wants_drag) = {
        let rt = runtime.borrow();
        let game = rt.game_loop.game();
        (game.logical_size(), game.wants_drag())
    };

    let mut recognizer = GestureRecognizer::new(settings.gesture_config());
    let kinds: &[GestureKind] = if wants_drag {
        &[
            GestureKind::Tap,
            GestureKind::Swipe,
            GestureKind::DragStart,
            GestureKind::DragMove,
        ]
    } else {
        &[GestureKind::Tap, GestureKind::Swipe]
    };
    for &kind in kinds {
        let weak = Rc::downgrade(runtime);
        recognizer.on(kind, move |gesture| {
            if let Some(rt) = weak.upgrade() {
                rt.borrow_mut().game_loop.push_gesture(*gesture);
            }
        });
    }

    let input = Rc::new(RefCell::new(PointerInput {
        canvas: canvas.clone(),
        mapper: CoordinateMapper::new(logical),
        recognizer,
    }));

    for (name, phase) in [
        ("pointerdown", PointerPhase::Down),
        ("pointermove", PointerPhase::Move),
        ("pointerup", PointerPhase::Up),
        ("pointercancel", PointerPhase::Cancel),
    ] {
        let input = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
            event.prevent_default();
            input.borrow_mut().handle(phase, &event);
        });
        canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn setup_keyboard<G: Game + 'static>(
    runtime: &Rc<RefCell<Runtime<G>>>,
    width: f32,
    height: f32,
) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let center = Vec2::new(width / 2.0, height / 2.0);
    let runtime = runtime.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
        let key = event.key();
        if key == "r" || key == "R" {
            runtime.borrow_mut().game_loop.restart();
            return;
        }
        if let Some(gesture) = key_gesture(&key, center) {
            event.prevent_default();
            runtime.borrow_mut().game_loop.push_gesture(gesture);
        }
    });
    window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn setup_restart_button<G: Game + 'static>(
    document: &Document,
    runtime: &Rc<RefCell<Runtime<G>>>,
) -> Result<(), JsValue> {
    let Some(btn) = document.get_element_by_id("restart-btn") else {
        log::warn!("No restart button; press R to restart");
        return Ok(());
    };
    let runtime = runtime.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
        runtime.borrow_mut().game_loop.restart();
    });
    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
