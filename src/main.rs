//! Fall Game entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, HtmlInputElement, KeyboardEvent, MouseEvent};

    use fall_game::audio::{AudioManager, SoundEffect};
    use fall_game::consts::MAX_FRAME_GAP_MS;
    use fall_game::effects::Burst;
    use fall_game::platform::{self, MonotonicClock};
    use fall_game::session::GameSession;
    use fall_game::sim::{Category, Click, GameEvent, GamePhase, ObjectId};
    use fall_game::{Difficulty, KeyValueStore, MemoryStore, Settings, view};

    /// Particle travel at the end of a burst, in px
    const BURST_SPREAD_PX: f32 = 60.0;

    /// Game instance holding all state
    struct Game {
        session: GameSession<Box<dyn KeyValueStore>>,
        audio: AudioManager,
        clock: MonotonicClock,
        /// Simulation time: real time with long gaps clipped
        sim_time: u64,
        last_real: Option<u64>,
        document: Document,
        /// Live DOM nodes per falling object
        elements: HashMap<ObjectId, Element>,
        /// Live DOM nodes per particle burst
        particles: HashMap<u64, Vec<HtmlElement>>,
        last_phase: GamePhase,
    }

    impl Game {
        fn new(store: Box<dyn KeyValueStore>, seed: u64, document: Document) -> Self {
            let session = GameSession::new(store, seed);
            let audio = AudioManager::new(session.settings());
            Self {
                session,
                audio,
                clock: MonotonicClock::new(),
                sim_time: 0,
                last_real: None,
                document,
                elements: HashMap::new(),
                particles: HashMap::new(),
                last_phase: GamePhase::Ready,
            }
        }

        /// One animation frame: advance the simulation, then redraw
        fn frame(&mut self) {
            let real = self.clock.now_ms();
            let gap = self.last_real.map_or(0, |last| real.saturating_sub(last));
            self.last_real = Some(real);
            self.sim_time += gap.min(MAX_FRAME_GAP_MS);
            let now = self.sim_time;

            for event in self.session.tick(now) {
                self.on_event(&event);
            }

            self.sync_objects(now);
            self.sync_particles(now);
            self.update_hud();
        }

        fn on_event(&mut self, event: &GameEvent) {
            if let Some(sound) = SoundEffect::for_event(event) {
                self.audio.play(sound);
            }
            match event {
                GameEvent::NewHighScore { score } => {
                    log::info!("New high score: {}", score);
                    self.render_leaderboard();
                }
                GameEvent::FreezeStarted { until_ms } => {
                    log::debug!("Frozen until {} ms", until_ms);
                }
                _ => {}
            }
        }

        /// Make the board's children match the registry
        fn sync_objects(&mut self, now: u64) {
            let Some(board) = self.document.get_element_by_id("game-area") else {
                return;
            };
            let views = view::project(&self.session.state, now);
            let live: HashSet<ObjectId> = views.iter().map(|v| v.id).collect();

            self.elements.retain(|id, el| {
                let keep = live.contains(id);
                if !keep {
                    el.remove();
                }
                keep
            });

            for v in &views {
                if !self.elements.contains_key(&v.id) {
                    match create_object_element(&self.document, v) {
                        Ok(el) => {
                            let _ = board.append_child(&el);
                            self.elements.insert(v.id, el);
                        }
                        Err(e) => log::warn!("Failed to create element for #{}: {:?}", v.id, e),
                    }
                }
                let Some(el) = self.elements.get(&v.id) else {
                    continue;
                };
                if el.class_name() != v.class_name {
                    el.set_class_name(&v.class_name);
                }
                if let Some(html) = el.dyn_ref::<HtmlElement>() {
                    let state = if v.frozen { "paused" } else { "running" };
                    let _ = html.style().set_property("animation-play-state", state);
                }
            }
        }

        /// Mirror the effects system's bursts as particle divs
        fn sync_particles(&mut self, now: u64) {
            let Some(board) = self.document.get_element_by_id("game-area") else {
                return;
            };
            let bursts = self.session.effects.bursts();
            let live: HashSet<u64> = bursts.iter().map(|b| b.id).collect();
            self.particles.retain(|id, nodes| {
                let keep = live.contains(id);
                if !keep {
                    nodes.iter().for_each(|n| n.remove());
                }
                keep
            });

            for burst in bursts {
                if !self.particles.contains_key(&burst.id) {
                    let nodes = create_particles(&self.document, burst);
                    for node in &nodes {
                        let _ = board.append_child(node);
                    }
                    self.particles.insert(burst.id, nodes);
                }
                let Some(nodes) = self.particles.get(&burst.id) else {
                    continue;
                };
                let opacity = 1.0 - burst.progress(now);
                for (node, particle) in nodes.iter().zip(&burst.particles) {
                    let offset = burst.particle_offset(particle, now, BURST_SPREAD_PX);
                    let style = node.style();
                    let _ = style.set_property(
                        "transform",
                        &format!("translate({:.1}px, {:.1}px)", offset.x, offset.y),
                    );
                    let _ = style.set_property("opacity", &format!("{:.2}", opacity));
                }
            }
        }

        fn update_hud(&mut self) {
            let hud = view::hud(&self.session.state);
            set_text(&self.document, "score", &hud.score.to_string());
            set_text(&self.document, "high-score", &hud.high_score.to_string());
            set_text(&self.document, "pause-btn", hud.pause_label());
            if let Some(board) = self.document.get_element_by_id("game-area") {
                let _ = board.class_list().toggle_with_force("frozen", hud.frozen);
            }

            if hud.phase != self.last_phase {
                self.last_phase = hud.phase;
                set_hidden(&self.document, "pause-overlay", hud.phase != GamePhase::Paused);
                let in_run = matches!(hud.phase, GamePhase::Playing | GamePhase::Paused);
                set_hidden(&self.document, "start-btn", in_run);
                set_hidden(&self.document, "end-btn", !in_run);
            }
        }

        fn render_leaderboard(&self) {
            let Some(list) = self.document.get_element_by_id("leaderboard-list") else {
                return;
            };
            list.set_text_content(None);
            let board = self.session.leaderboard();
            if board.is_empty() {
                set_text(&self.document, "leaderboard-empty", "No scores yet");
                return;
            }
            set_text(&self.document, "leaderboard-empty", "");
            let me = self.session.player().map(|p| p.id.as_str());
            for (i, entry) in board.entries.iter().enumerate() {
                let Ok(item) = self.document.create_element("li") else {
                    continue;
                };
                item.set_text_content(Some(&format!(
                    "{}. {} - {} ({})",
                    i + 1,
                    entry.username,
                    entry.score,
                    entry.date
                )));
                if me == Some(entry.user_id.as_str()) {
                    item.set_class_name("me");
                }
                let _ = list.append_child(&item);
            }
        }

        /// Switch between the sign-in and game screens
        fn show_screens(&self) {
            let signed_in = self.session.player().is_some();
            set_hidden(&self.document, "auth-screen", signed_in);
            set_hidden(&self.document, "game-screen", !signed_in);
            if let Some(player) = self.session.player() {
                set_text(&self.document, "player-name", &player.username);
                set_text(&self.document, "games-played", &player.games_played.to_string());
            }
            self.render_leaderboard();
        }

        fn clear_board(&mut self) {
            self.elements.drain().for_each(|(_, el)| el.remove());
            self.particles
                .drain()
                .for_each(|(_, nodes)| nodes.iter().for_each(|n| n.remove()));
        }

        fn apply_settings(&mut self, settings: Settings) {
            self.audio.apply_settings(&settings);
            self.session.apply_settings(settings, self.sim_time);
        }
    }

    fn create_object_element(document: &Document, v: &view::ObjectView) -> Result<Element, JsValue> {
        let el = document.create_element("div")?;
        el.set_id(&format!("element-{}", v.id));
        el.set_class_name(&v.class_name);
        el.set_attribute("data-type", v.category.as_str())?;
        el.set_text_content(Some(v.emoji));
        let html: HtmlElement = el.clone().dyn_into()?;
        let style = html.style();
        style.set_property("left", &format!("{:.2}%", v.left_percent))?;
        style.set_property(
            "animation",
            &format!("fall {:.3}s linear forwards", v.fall_duration_secs),
        )?;
        // Objects created mid-fall (e.g. after a restore) start part-way down
        style.set_property(
            "animation-delay",
            &format!("-{:.3}s", v.progress * v.fall_duration_secs),
        )?;
        Ok(el)
    }

    fn create_particles(document: &Document, burst: &Burst) -> Vec<HtmlElement> {
        burst
            .particles
            .iter()
            .filter_map(|p| {
                let el: HtmlElement = document.create_element("div").ok()?.dyn_into().ok()?;
                el.set_class_name("particle");
                let style = el.style();
                style.set_property("left", &format!("{:.2}%", burst.origin.x)).ok()?;
                style.set_property("top", &format!("{:.2}%", burst.origin.y)).ok()?;
                style.set_property("width", &format!("{}px", p.size)).ok()?;
                style.set_property("height", &format!("{}px", p.size)).ok()?;
                style.set_property("background", p.color).ok()?;
                Some(el)
            })
            .collect()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    /// Attach a click handler to the element with `id`
    fn on_click(document: &Document, id: &str, handler: impl FnMut(MouseEvent) + 'static) {
        if let Some(el) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(handler);
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Fall Game starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let store: Box<dyn KeyValueStore> = match platform::storage::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("{}; progress will not be saved", e);
                Box::new(MemoryStore::new())
            }
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(store, seed, document.clone())));
        log::info!("Game initialized with seed: {}", seed);

        {
            let mut g = game.borrow_mut();
            g.session.restore();
            g.show_screens();
        }

        setup_auth_form(&document, game.clone());
        setup_board(&document, game.clone());
        setup_controls(&document, game.clone());
        setup_settings(&document, game.clone());
        setup_keyboard(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Fall Game running!");
    }

    fn setup_auth_form(document: &Document, game: Rc<RefCell<Game>>) {
        let submit = {
            let game = game.clone();
            move || {
                let mut g = game.borrow_mut();
                let name = g
                    .document
                    .get_element_by_id("username-input")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| input.value())
                    .unwrap_or_default();
                let error = match g.session.login(&name) {
                    Ok(player) => {
                        log::info!("Signed in as {}", player.username);
                        String::new()
                    }
                    Err(e) => e.to_string(),
                };
                set_text(&g.document, "auth-error", &error);
                if error.is_empty() {
                    g.show_screens();
                }
            }
        };

        {
            let submit = submit.clone();
            on_click(document, "auth-submit", move |_event: MouseEvent| submit());
        }

        if let Some(input) = document.get_element_by_id("username-input") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == "Enter" {
                    event.prevent_default();
                    submit();
                }
            });
            let _ = input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// One delegated mousedown listener for every falling object
    fn setup_board(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(board) = document.get_element_by_id("game-area") else {
            log::error!("No #game-area element; clicks disabled");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(target) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(".game-element").ok().flatten())
            else {
                return;
            };
            let id = target
                .id()
                .strip_prefix("element-")
                .and_then(|n| n.parse::<u64>().ok())
                .map(ObjectId);
            let category = target
                .get_attribute("data-type")
                .and_then(|t| Category::from_str(&t));
            if let (Some(id), Some(category)) = (id, category) {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.session.click(Click { id, category });
            }
        });
        let _ = board.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_controls(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click(document, "start-btn", move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.clear_board();
                let now = g.sim_time;
                if g.session.start(now).is_some() {
                    set_text(&g.document, "game-over", "");
                }
            });
        }
        {
            let game = game.clone();
            on_click(document, "pause-btn", move |_event: MouseEvent| {
                game.borrow_mut().session.toggle_pause();
            });
        }
        {
            let game = game.clone();
            on_click(document, "end-btn", move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                let now = g.sim_time;
                let Some(summary) = g.session.end_game(now) else {
                    return;
                };
                g.on_event(&summary.event);
                g.clear_board();
                let rank = summary
                    .rank
                    .map(|r| format!(" - rank #{}", r))
                    .unwrap_or_default();
                set_text(
                    &g.document,
                    "game-over",
                    &format!("Game over! Final score: {}{}", summary.final_score, rank),
                );
                g.show_screens();
            });
        }
        on_click(document, "logout-btn", move |_event: MouseEvent| {
            let mut g = game.borrow_mut();
            let now = g.sim_time;
            g.session.logout(now);
            g.clear_board();
            let settings = g.session.settings().clone();
            g.audio.apply_settings(&settings);
            g.show_screens();
        });
    }

    fn setup_settings(document: &Document, game: Rc<RefCell<Game>>) {
        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            let game = game.clone();
            let id = format!("difficulty-{}", difficulty.as_str().to_lowercase());
            on_click(document, &id, move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                let settings = Settings {
                    difficulty,
                    ..g.session.settings().clone()
                };
                g.apply_settings(settings);
                log::info!("Difficulty: {}", difficulty.as_str());
            });
        }

        let toggles: [(&str, fn(&mut Settings, bool)); 3] = [
            ("sound-toggle", |s, on| s.sound_enabled = on),
            ("motion-toggle", |s, on| s.reduced_motion = on),
            ("freeze-blocks-toggle", |s, on| s.freeze_blocks_clicks = on),
        ];
        for (id, apply) in toggles {
            let game = game.clone();
            let Some(input) = document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            else {
                continue;
            };
            let checkbox = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                let mut settings = g.session.settings().clone();
                apply(&mut settings, checkbox.checked());
                g.apply_settings(settings);
            });
            let _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if event.code() == "Space" || event.code() == "KeyP" {
                let mut g = game.borrow_mut();
                if matches!(g.session.state.phase, GamePhase::Playing | GamePhase::Paused) {
                    event.prevent_default();
                    g.session.toggle_pause();
                }
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
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
        game.borrow_mut().frame();
        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().session.auto_pause();
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().session.auto_pause();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Fall Game (native) starting...");
    log::info!("The playable build is the web one (`trunk serve`); running a headless demo");

    run_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play 30 simulated seconds with a bot that grabs hearts and snowflakes
#[cfg(not(target_arch = "wasm32"))]
fn run_demo() {
    use fall_game::GameSession;
    use fall_game::sim::{Category, Click, GameEvent};
    use fall_game::view;

    const STEP_MS: u64 = 100;
    const DEMO_MS: u64 = 30_000;
    const REACTION_MS: u64 = 700;

    let store = match fall_game::platform::storage::open() {
        Ok(store) => store,
        Err(e) => {
            log::error!("{}", e);
            return;
        }
    };
    let seed = fall_game::unix_now_ms() as u64;
    let mut session = GameSession::new(store, seed);
    if let Err(e) = session.login("demo-bot") {
        log::error!("{}", e);
        return;
    }
    session.start(0);

    let mut now = 0;
    while now < DEMO_MS {
        now += STEP_MS;
        if now % REACTION_MS == 0 {
            let target = view::project(&session.state, now)
                .into_iter()
                .find(|v| v.category != Category::Hazard);
            if let Some(v) = target {
                session.click(Click {
                    id: v.id,
                    category: v.category,
                });
            }
        }
        for event in session.tick(now) {
            match event {
                GameEvent::Spawned { .. } | GameEvent::Expired { .. } => log::debug!("{:>6} ms {:?}", now, event),
                _ => log::info!("{:>6} ms {:?}", now, event),
            }
        }
    }

    let Some(summary) = session.end_game(now) else {
        return;
    };
    println!("\nFinal score: {}", summary.final_score);
    if let Some(player) = summary.player {
        println!(
            "{}: {} games, best {}, average {:.1}",
            player.username,
            player.games_played,
            player.high_score,
            player.average_score()
        );
    }
    println!("\nLeaderboard:");
    for (i, entry) in session.leaderboard().entries.iter().enumerate() {
        println!("{:>2}. {:<20} {:>5}  {}", i + 1, entry.username, entry.score, entry.date);
    }
}
