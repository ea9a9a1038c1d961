use std::cell::RefCell;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::EngineConfig;
use crate::error::GameError;
use crate::game::GameSession;
use crate::types::{Difficulty, GameState, Player, Position};

static SESSION: Lazy<Mutex<GameSession>> = Lazy::new(|| Mutex::new(GameSession::default()));

thread_local! {
    static RENDER_CALLBACK: RefCell<Option<js_sys::Function>> = const { RefCell::new(None) };
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn session() -> Result<MutexGuard<'static, GameSession>, GameError> {
    SESSION.lock().map_err(|_| GameError::SessionUnavailable)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Serializes the state, hands it to the render callback, if one is
/// registered, and returns it to the caller.
fn publish(state: GameState) -> Result<JsValue, JsValue> {
    let value = to_js(&state)?;
    // Cloned out so the callback may replace itself.
    let callback = RENDER_CALLBACK.with(|slot| slot.borrow().clone());
    if let Some(callback) = callback {
        callback.call1(&JsValue::NULL, &value)?;
    }
    Ok(value)
}

/// Runs `f` on the session and publishes the resulting state.
fn update(f: impl FnOnce(&mut GameSession)) -> Result<JsValue, JsValue> {
    let state = {
        let mut game = session()?;
        f(&mut game);
        game.to_game_state()
    };
    publish(state)
}

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}

/// Registers (or clears, with `undefined`) the function called with every
/// new game state.
#[wasm_bindgen]
pub fn set_render_callback(callback: Option<js_sys::Function>) {
    RENDER_CALLBACK.with(|slot| *slot.borrow_mut() = callback);
}

/// Replaces the session. `config` may be `undefined` for defaults.
#[wasm_bindgen]
pub fn new_game(config: JsValue) -> Result<JsValue, JsValue> {
    let config: EngineConfig = if config.is_undefined() || config.is_null() {
        EngineConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|err| GameError::Config(err.to_string()))?
    };
    let fresh = GameSession::new(config)?;
    update(|game| {
        let human = game.human_player();
        let difficulty = game.difficulty();
        let sound = game.sound_enabled();
        *game = fresh;
        game.set_difficulty(difficulty);
        game.set_sound_enabled(sound);
        game.set_human_player(human);
    })
}

#[wasm_bindgen]
pub fn reset_game() -> Result<JsValue, JsValue> {
    update(GameSession::reset)
}

#[wasm_bindgen]
pub fn set_difficulty(level: &str) -> Result<JsValue, JsValue> {
    let difficulty: Difficulty = level.parse()?;
    update(|game| game.set_difficulty(difficulty))
}

/// Picks the human's color and restarts the game.
#[wasm_bindgen]
pub fn set_player_color(color: &str) -> Result<JsValue, JsValue> {
    let player: Player = color.parse()?;
    update(|game| game.set_human_player(player))
}

#[wasm_bindgen]
pub fn set_sound_enabled(enabled: bool) -> Result<JsValue, JsValue> {
    update(|game| game.set_sound_enabled(enabled))
}

/// Human click on a square. Illegal or out-of-turn clicks change nothing.
#[wasm_bindgen]
pub fn place(row: u8, col: u8) -> Result<JsValue, JsValue> {
    let pos = Position::try_new(row, col)?;
    update(|game| {
        game.play(pos);
    })
}

/// Plays the computer's turn; the page calls this `ai_delay_ms` after it
/// sees `awaiting_computer`.
#[wasm_bindgen]
pub fn ai_move() -> Result<JsValue, JsValue> {
    update(|game| {
        game.play_computer_turn();
    })
}

#[wasm_bindgen]
pub fn get_state() -> Result<JsValue, JsValue> {
    let state = session()?.to_game_state();
    to_js(&state)
}

#[wasm_bindgen]
pub fn get_legal_moves() -> Result<JsValue, JsValue> {
    let moves = session()?.legal_moves();
    to_js(&moves)
}

/// Final score, or `null` while the game is running.
#[wasm_bindgen]
pub fn get_result() -> Result<JsValue, JsValue> {
    match session()?.result() {
        Some(result) => to_js(&result),
        None => Ok(JsValue::NULL),
    }
}

#[wasm_bindgen]
pub fn ai_delay_ms() -> Result<u32, JsValue> {
    Ok(session()?.config().ai_delay_ms)
}

/// Selector values accepted by [`set_difficulty`].
#[wasm_bindgen]
pub fn difficulty_levels() -> Result<JsValue, JsValue> {
    to_js(&Difficulty::ALL)
}
