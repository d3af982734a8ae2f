//! Critter Hunt entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, MouseEvent};

    use critter_hunt::sim::{GameEngine, GameEvent, RemovalReason, RestBreak, RestTransition};
    use critter_hunt::{GameOptions, OptionsPatch, RestOptions};

    // DOM rendering stays in JS; Rust only says what changed
    #[wasm_bindgen(inline_js = "
        export function render_spawn(id, variant, kind, x, y) {
            const area = document.getElementById('game-area');
            if (!area) return;
            const el = document.createElement('div');
            el.className = 'critter ' + kind;
            el.dataset.entityId = id;
            el.textContent = variant;
            el.style.left = x + 'px';
            el.style.top = y + 'px';
            area.appendChild(el);
        }

        export function render_remove(id, reason, delta) {
            const el = document.querySelector('[data-entity-id=\"' + id + '\"]');
            if (!el) return;
            el.classList.add(reason);
            if (delta !== 0) {
                const pop = document.createElement('div');
                pop.className = 'score-pop ' + (delta > 0 ? 'plus' : 'minus');
                pop.textContent = (delta > 0 ? '+' : '') + delta;
                pop.style.left = el.style.left;
                pop.style.top = el.style.top;
                el.parentNode.appendChild(pop);
                setTimeout(() => pop.remove(), 800);
            }
            setTimeout(() => el.remove(), 300);
        }

        export function show_rest_overlay(visible, seconds, progress) {
            const overlay = document.getElementById('rest-overlay');
            if (!overlay) return;
            overlay.classList.toggle('hidden', !visible);
            const countdown = document.getElementById('rest-countdown');
            if (countdown) countdown.textContent = seconds;
            const fill = document.getElementById('rest-progress');
            if (fill) fill.style.width = (progress * 100) + '%';
        }

        export function show_game_over(visible, score, level) {
            const panel = document.getElementById('game-over');
            if (!panel) return;
            panel.classList.toggle('hidden', !visible);
            const s = document.getElementById('final-score');
            if (s) s.textContent = score;
            const l = document.getElementById('final-level');
            if (l) l.textContent = level;
        }

        export function area_width() {
            const area = document.getElementById('game-area');
            return area ? area.clientWidth : 0;
        }

        export function area_height() {
            const area = document.getElementById('game-area');
            return area ? area.clientHeight : 0;
        }

        export function quick_rest_requested() {
            return new URLSearchParams(window.location.search).get('quickRest') === 'true';
        }
    ")]
    extern "C" {
        fn render_spawn(id: u32, variant: &str, kind: &str, x: f32, y: f32);
        fn render_remove(id: u32, reason: &str, delta: i32);
        fn show_rest_overlay(visible: bool, seconds: u32, progress: f32);
        fn show_game_over(visible: bool, score: i32, level: u32);
        fn area_width() -> f64;
        fn area_height() -> f64;
        fn quick_rest_requested() -> bool;
    }

    /// Game instance holding all state
    struct Game {
        engine: GameEngine,
        rest: RestBreak,
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    impl Game {
        /// Advance both timers to `now` and push the results to the page
        fn update(&mut self, now: u64) {
            self.engine
                .set_play_area(area_width() as f32, area_height() as f32);
            self.engine.advance_to(now);
            for transition in self.rest.drive(now, &mut self.engine) {
                if transition == RestTransition::Ended {
                    show_rest_overlay(false, 0, 1.0);
                }
            }
            if self.rest.is_resting() {
                show_rest_overlay(
                    true,
                    self.rest.seconds_left(now) as u32,
                    self.rest.progress(now),
                );
            }
            self.render_events();
            self.update_hud();
        }

        fn render_events(&mut self) {
            for event in self.engine.drain_events() {
                match event {
                    GameEvent::Spawned {
                        id,
                        kind,
                        variant,
                        position,
                        ..
                    } => render_spawn(id, variant, kind.as_str(), position.x, position.y),
                    GameEvent::Removed {
                        id,
                        reason,
                        points_delta,
                    } => {
                        let reason = match reason {
                            RemovalReason::Scored => "clicked",
                            RemovalReason::Missed => "escaped",
                            RemovalReason::Cleared => "cleared",
                        };
                        render_remove(id, reason, points_delta as i32);
                    }
                    GameEvent::LevelUp { level } => log::info!("Level {}", level),
                    GameEvent::LifeLost { .. } => {}
                    GameEvent::GameOver {
                        final_score,
                        final_level,
                    } => show_game_over(true, final_score as i32, final_level),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let stats = self.engine.stats();
            let fields = [
                ("hud-score", stats.score.to_string()),
                ("hud-level", stats.level.to_string()),
                ("hud-lives", format!("{}/{}", stats.lives.max(0), stats.max_lives)),
            ];
            for (id, text) in fields {
                if let Some(el) = document.get_element_by_id(id) {
                    if el.text_content().as_deref() != Some(text.as_str()) {
                        el.set_text_content(Some(&text));
                    }
                }
            }
        }
    }

    /// Milliseconds since page load
    fn now_ms() -> u64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map_or(0, |p| p.now() as u64)
    }

    /// Merge a JSON options patch into the running game and persist it
    #[wasm_bindgen]
    pub fn update_options(json: &str) -> Result<(), JsValue> {
        let patch: OptionsPatch =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        GAME.with(|slot| {
            let slot = slot.borrow();
            let Some(game) = slot.as_ref() else {
                return Err(JsValue::from_str("game not running"));
            };
            let mut g = game.borrow_mut();
            g.engine
                .update_options(&patch)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            g.engine.options().save();
            Ok(())
        })
    }

    /// Start a rest right away
    #[wasm_bindgen]
    pub fn force_rest() {
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                let g = &mut *game.borrow_mut();
                let now = now_ms();
                g.engine.advance_to(now);
                if g.rest.force_rest(now) == Some(RestTransition::Started) {
                    g.engine.pause();
                }
            }
        });
    }

    /// Current stats as JSON, for the console
    #[wasm_bindgen]
    pub fn game_stats() -> String {
        GAME.with(|slot| {
            slot.borrow().as_ref().map_or_else(String::new, |game| {
                let g = game.borrow();
                let stats = (g.engine.stats(), g.rest.stats(now_ms()));
                serde_json::to_string(&stats).unwrap_or_default()
            })
        })
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Critter Hunt starting...");

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let engine = GameEngine::new(GameOptions::load(), seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let rest_options = if quick_rest_requested() {
            RestOptions::quick()
        } else {
            RestOptions::standard()
        };
        let rest = RestBreak::new(rest_options).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let game = Rc::new(RefCell::new(Game { engine, rest }));

        {
            let mut g = game.borrow_mut();
            let now = now_ms();
            g.engine.advance_to(now);
            g.engine.start();
            g.rest.start(now);
        }
        log::info!("Game initialized with seed: {}", seed);

        setup_click_handler(&document, game.clone());
        setup_restart_button(&document, game.clone());
        setup_auto_pause(&document, game.clone());

        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));
        request_animation_frame(game);

        log::info!("Critter Hunt running!");
        Ok(())
    }

    fn setup_click_handler(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        let Some(area) = document.get_element_by_id("game-area") else {
            log::warn!("No #game-area element, clicks disabled");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let id = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest("[data-entity-id]").ok().flatten())
                .and_then(|el| el.get_attribute("data-entity-id"))
                .and_then(|id| id.parse().ok());
            if let Some(id) = id {
                let mut g = game.borrow_mut();
                g.engine.advance_to(now_ms());
                g.engine.handle_click(id);
            }
        });
        let _ = area.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_restart_button(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.engine.advance_to(now_ms());
                g.engine.restart();
                show_game_over(false, 0, 1);
                if g.rest.is_resting() {
                    g.engine.pause();
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        // Visibility change (tab switch, minimize)
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let g = &mut *game.borrow_mut();
            let now = now_ms();
            g.engine.advance_to(now);
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                g.engine.pause();
                g.rest.suspend();
                log::info!("Auto-paused (tab hidden)");
            } else if g.rest.unsuspend(now) == Some(RestTransition::Started) || g.rest.is_resting()
            {
                log::info!("Tab visible, still resting");
            } else {
                g.engine.resume();
            }
        });
        let _ = document.add_event_listener_with_callback(
            "visibilitychange",
            closure.as_ref().unchecked_ref(),
        );
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        game.borrow_mut().update(now_ms());
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autoplay: a scripted player with human-ish reaction times.
/// Optional first argument is the RNG seed.
#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), critter_hunt::ConfigError> {
    use critter_hunt::sim::{EntityId, EntityKind, GameEngine, GameEvent, RestBreak, SessionStatus};
    use critter_hunt::{GameOptions, RestOptions};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    const FRAME_MS: u64 = 16;
    const RUN_MS: u64 = 120_000;

    env_logger::init();
    log::info!("Critter Hunt (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let mut engine = GameEngine::new(GameOptions::load(), seed)?;
    let mut rest = RestBreak::new(RestOptions::quick())?;
    let mut player = Pcg32::seed_from_u64(seed ^ 0x5eed);
    // (click time, id) for every critter the player has decided to click
    let mut intents: Vec<(u64, EntityId)> = Vec::new();

    engine.start();
    rest.start(0);

    let mut now = 0;
    while now < RUN_MS && engine.status() != SessionStatus::Over {
        now += FRAME_MS;
        engine.advance_to(now);
        for transition in rest.drive(now, &mut engine) {
            log::info!("Rest {:?} at {}ms", transition, now);
        }

        for event in engine.drain_events() {
            match event {
                GameEvent::Spawned { id, kind, .. } => {
                    // Mostly goes for predators, sometimes slips on the others
                    let wants = match kind {
                        EntityKind::Predator => player.random_bool(0.85),
                        EntityKind::Prey | EntityKind::Omnivore => player.random_bool(0.1),
                    };
                    if wants {
                        intents.push((now + player.random_range(300..2500), id));
                    }
                }
                GameEvent::GameOver {
                    final_score,
                    final_level,
                } => log::info!("Game over at {}ms: {} points, level {}", now, final_score, final_level),
                other => log::debug!("{:?}", other),
            }
        }

        let (due, pending): (Vec<_>, Vec<_>) = intents.into_iter().partition(|(at, _)| *at <= now);
        intents = pending;
        for (_, id) in due {
            engine.handle_click(id);
        }
    }

    let stats = engine.stats();
    println!(
        "{}",
        serde_json::to_string_pretty(&stats).unwrap_or_else(|_| format!("{:?}", stats))
    );
    Ok(())
}
