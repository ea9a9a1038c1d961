use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::ai;
use crate::board::{Board, positions};
use crate::config::EngineConfig;
use crate::error::GameError;
use crate::rules::{self, has_any_legal_move, is_legal_move};
use crate::types::{Difficulty, GameResult, GameState, Player, Position, SoundCue};

/// Hooks for the page around the session: redraws and stone feedback.
/// All methods default to doing nothing.
pub trait SessionObserver: Send {
    /// Called after every state-affecting operation.
    fn render(&mut self, _state: &GameState) {}

    fn stone_placed(&mut self, _player: Player, _pos: Position) {}

    fn stones_flipped(&mut self, _player: Player, _flipped: &[Position]) {}

    /// Only called while sound is enabled.
    fn sound(&mut self, _cue: SoundCue) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SessionObserver for NullObserver {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    Terminal(GameResult),
}

/// One local game between the human and the computer.
///
/// The session owns the authoritative board; the computer only ever searches
/// copies of it.
pub struct GameSession {
    board: Board,
    current_player: Player,
    human_player: Player,
    difficulty: Difficulty,
    phase: Phase,
    config: EngineConfig,
    sound_enabled: bool,
    /// Color that was forced to pass by the last end check.
    passed: Option<Player>,
    flipped: Vec<u8>,
    last_move: Option<Position>,
    sounds: Vec<SoundCue>,
    rng: ChaCha20Rng,
    observer: Box<dyn SessionObserver>,
}

impl GameSession {
    pub fn new(config: EngineConfig) -> Result<Self, GameError> {
        Self::with_observer(config, Box::new(NullObserver))
    }

    pub fn with_observer(
        config: EngineConfig,
        observer: Box<dyn SessionObserver>,
    ) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self::build(config, observer))
    }

    fn build(config: EngineConfig, observer: Box<dyn SessionObserver>) -> Self {
        let seed = config.seed.unwrap_or_else(clock_seed);
        Self {
            board: Board::new(),
            current_player: Player::Black,
            human_player: Player::Black,
            difficulty: Difficulty::default(),
            phase: Phase::InProgress,
            config,
            sound_enabled: true,
            passed: None,
            flipped: Vec::new(),
            last_move: None,
            sounds: Vec::new(),
            rng: ChaCha20Rng::seed_from_u64(seed),
            observer,
        }
    }

    /// Starts a fresh game keeping color, difficulty and sound settings.
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.current_player = Player::Black;
        self.phase = Phase::InProgress;
        self.passed = None;
        self.flipped.clear();
        self.last_move = None;
        self.sounds.clear();
        info!(
            human = %self.human_player,
            difficulty = self.difficulty.as_str(),
            "new game"
        );
        self.render();
    }

    /// Chooses the human's color and restarts. Playing white hands the
    /// opening move to the computer.
    pub fn set_human_player(&mut self, player: Player) {
        self.human_player = player;
        self.reset();
    }

    /// Takes effect on the next computer turn.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        debug!(difficulty = difficulty.as_str(), "difficulty changed");
        self.difficulty = difficulty;
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    /// Human move attempt. Returns `false` and changes nothing when the game
    /// is over, it is not the human's turn, or the move is illegal.
    pub fn play(&mut self, pos: Position) -> bool {
        if self.is_terminal() || self.current_player != self.human_player {
            return false;
        }
        if !is_legal_move(&self.board, pos, self.current_player) {
            debug!(%pos, player = %self.current_player, "ignored illegal move");
            return false;
        }
        self.apply_move(pos);
        true
    }

    /// `true` while the game runs and the computer is the side to move.
    pub fn awaits_computer(&self) -> bool {
        !self.is_terminal() && self.current_player != self.human_player
    }

    /// Lets the computer move. Returns the chosen square, or `None` when it
    /// is not the computer's turn.
    pub fn play_computer_turn(&mut self) -> Option<Position> {
        if !self.awaits_computer() {
            return None;
        }
        let player = self.current_player;
        match ai::choose_move(
            &self.board,
            player,
            self.difficulty,
            &self.config,
            &mut self.rng,
        ) {
            Some(pos) => {
                debug!(%pos, %player, difficulty = self.difficulty.as_str(), "computer move");
                self.apply_move(pos);
                Some(pos)
            }
            None => {
                // End checks pass a side without moves before its turn comes
                // up, so this only happens on a hand-loaded position.
                self.flipped.clear();
                self.check_end();
                self.render();
                None
            }
        }
    }

    fn apply_move(&mut self, pos: Position) {
        let player = self.current_player;
        let flips = rules::place(&mut self.board, pos, player);
        debug_assert_ne!(flips, 0, "apply_move requires a legal move");

        let flipped: Vec<Position> = positions(flips).collect();
        self.flipped = flipped.iter().map(|p| p.index() as u8).collect();
        self.last_move = Some(pos);
        self.passed = None;
        self.sounds.clear();

        self.observer.stone_placed(player, pos);
        self.emit_sound(SoundCue::PLACE);
        if !flipped.is_empty() {
            self.observer.stones_flipped(player, &flipped);
            self.emit_sound(SoundCue::FLIP);
        }

        self.current_player = player.opponent();
        self.check_end();
        self.render();
    }

    /// Ends the game when nobody can move, or passes the turn when only the
    /// side to move is stuck.
    fn check_end(&mut self) {
        let black_moves = has_any_legal_move(&self.board, Player::Black);
        let white_moves = has_any_legal_move(&self.board, Player::White);

        if !black_moves && !white_moves {
            let (black_count, white_count) = self.board.count();
            let result = GameResult::from_counts(black_count, white_count);
            info!(black_count, white_count, "{result}");
            self.phase = Phase::Terminal(result);
            return;
        }

        let to_move_can_play = match self.current_player {
            Player::Black => black_moves,
            Player::White => white_moves,
        };
        if !to_move_can_play {
            let passing = self.current_player;
            debug!(player = %passing, "forced pass");
            self.passed = Some(passing);
            self.current_player = passing.opponent();
        }
    }

    fn emit_sound(&mut self, cue: SoundCue) {
        if self.sound_enabled {
            self.sounds.push(cue);
            self.observer.sound(cue);
        }
    }

    fn render(&mut self) {
        let state = self.to_game_state();
        self.observer.render(&state);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn human_player(&self) -> Player {
        self.human_player
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Terminal(_))
    }

    pub fn result(&self) -> Option<GameResult> {
        match self.phase {
            Phase::Terminal(result) => Some(result),
            Phase::InProgress => None,
        }
    }

    /// Legal moves of the side to move; empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Position> {
        if self.is_terminal() {
            return Vec::new();
        }
        rules::legal_moves(&self.board, self.current_player)
    }

    pub fn message(&self) -> String {
        match (self.phase, self.passed) {
            (Phase::Terminal(result), _) => result.to_string(),
            (Phase::InProgress, Some(passing)) => {
                format!("{passing} passes. {}'s turn", passing.opponent())
            }
            (Phase::InProgress, None) => format!("{}'s turn", self.current_player),
        }
    }

    pub fn to_game_state(&self) -> GameState {
        let (black_count, white_count) = self.board.count();
        GameState {
            board: self.board.to_array().to_vec(),
            current_player: self.current_player.code(),
            human_player: self.human_player.code(),
            difficulty: self.difficulty,
            black_count,
            white_count,
            is_game_over: self.is_terminal(),
            is_pass: self.passed.is_some(),
            flipped: self.flipped.clone(),
            last_move: self.last_move,
            awaiting_computer: self.awaits_computer(),
            message: self.message(),
            sounds: self.sounds.clone(),
        }
    }

    #[cfg(test)]
    fn load_position(&mut self, board: Board, to_move: Player) {
        self.board = board;
        self.current_player = to_move;
        self.phase = Phase::InProgress;
        self.passed = None;
        self.flipped.clear();
        self.check_end();
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::build(EngineConfig::default(), Box::new(NullObserver))
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::types::{PLAYER_BLACK, PLAYER_WHITE};

    const FULL_BOARD: u64 = u64::MAX;

    fn bit(row: u8, col: u8) -> u64 {
        1u64 << Position::new(row, col).index()
    }

    fn seeded(difficulty: Difficulty) -> GameSession {
        let config = EngineConfig {
            seed: Some(42),
            advanced_depth: 2,
            ..EngineConfig::default()
        };
        let mut game = GameSession::new(config).unwrap();
        game.set_difficulty(difficulty);
        game
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Render(String),
        Placed(Player, Position),
        Flipped(usize),
        Sound(SoundCue),
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Event>>>);

    impl SessionObserver for Recorder {
        fn render(&mut self, state: &GameState) {
            self.0.lock().unwrap().push(Event::Render(state.message.clone()));
        }

        fn stone_placed(&mut self, player: Player, pos: Position) {
            self.0.lock().unwrap().push(Event::Placed(player, pos));
        }

        fn stones_flipped(&mut self, _player: Player, flipped: &[Position]) {
            self.0.lock().unwrap().push(Event::Flipped(flipped.len()));
        }

        fn sound(&mut self, cue: SoundCue) {
            self.0.lock().unwrap().push(Event::Sound(cue));
        }
    }

    #[test]
    fn initial_state_is_correct() {
        let game = GameSession::default();
        let state = game.to_game_state();

        assert_eq!(state.current_player, PLAYER_BLACK);
        assert_eq!(state.human_player, PLAYER_BLACK);
        assert_eq!(state.black_count, 2);
        assert_eq!(state.white_count, 2);
        assert!(!state.is_game_over);
        assert!(!state.is_pass);
        assert!(!state.awaiting_computer);
        assert!(state.flipped.is_empty());
        assert_eq!(state.message, "Black's turn");
        assert_eq!(game.legal_moves().len(), 4);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig {
            advanced_depth: 0,
            ..EngineConfig::default()
        };

        assert!(matches!(
            GameSession::new(config),
            Err(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn human_move_flips_and_hands_turn_to_computer() {
        let mut game = seeded(Difficulty::Intermediate);

        assert!(game.play(Position::new(2, 3)));

        let state = game.to_game_state();
        assert_eq!(state.current_player, PLAYER_WHITE);
        assert_eq!(state.flipped, vec![Position::new(3, 3).index() as u8]);
        assert_eq!(state.last_move, Some(Position::new(2, 3)));
        assert_eq!((state.black_count, state.white_count), (4, 1));
        assert!(state.awaiting_computer);
        assert_eq!(state.sounds, vec![SoundCue::PLACE, SoundCue::FLIP]);
    }

    #[test]
    fn illegal_move_attempts_are_ignored() {
        let mut game = seeded(Difficulty::Beginner);
        let before = game.to_game_state();

        assert!(!game.play(Position::new(0, 0)));
        assert!(!game.play(Position::new(3, 3)));

        assert_eq!(game.to_game_state(), before);
    }

    #[test]
    fn human_cannot_move_on_computer_turn() {
        let mut game = seeded(Difficulty::Beginner);
        assert!(game.play(Position::new(2, 3)));
        let before = game.to_game_state();

        // (2,2) is legal for white but white belongs to the computer.
        assert!(!game.play(Position::new(2, 2)));
        assert_eq!(game.to_game_state(), before);
    }

    #[test]
    fn computer_turn_is_noop_when_human_to_move() {
        let mut game = seeded(Difficulty::Advanced);

        assert_eq!(game.play_computer_turn(), None);
        assert_eq!(game.board(), &Board::new());
    }

    #[test]
    fn computer_replies_with_legal_move() {
        for difficulty in Difficulty::ALL {
            let mut game = seeded(difficulty);
            assert!(game.play(Position::new(2, 3)));
            let board = *game.board();

            let mv = game.play_computer_turn().expect("white has replies");

            assert!(is_legal_move(&board, mv, Player::White));
            assert_eq!(game.current_player(), Player::Black);
            assert!(!game.awaits_computer());
        }
    }

    #[test]
    fn human_white_lets_computer_open() {
        let mut game = seeded(Difficulty::Intermediate);
        game.set_human_player(Player::White);

        assert!(game.awaits_computer());
        assert!(!game.play(Position::new(2, 3)));

        let opening = game.play_computer_turn().expect("black opens");

        assert_eq!(opening, Position::new(2, 3));
        assert_eq!(game.current_player(), Player::White);
        assert!(!game.awaits_computer());
        assert_eq!(game.to_game_state().human_player, PLAYER_WHITE);
    }

    #[test]
    fn no_moves_for_either_side_ends_game_by_count() {
        let mut game = GameSession::default();
        let black = FULL_BOARD ^ bit(0, 0);

        game.load_position(Board::from_bitboards(black, 0), Player::Black);

        assert_eq!(
            game.phase(),
            Phase::Terminal(GameResult {
                winner: PLAYER_BLACK,
                black_count: 63,
                white_count: 0,
            })
        );
        assert!(game.legal_moves().is_empty());
        assert!(!game.awaits_computer());
        assert_eq!(game.message(), "Game over! Black: 63 White: 0 - Black wins");
    }

    #[test]
    fn full_even_board_is_a_draw() {
        let mut game = GameSession::default();

        game.load_position(
            Board::from_bitboards(0x0000_0000_FFFF_FFFF, 0xFFFF_FFFF_0000_0000),
            Player::White,
        );

        let result = game.result().expect("game over");
        assert_eq!(result.winner(), None);
        assert_eq!((result.black_count, result.white_count), (32, 32));
    }

    #[test]
    fn stuck_side_passes_and_computer_takes_over() {
        let mut game = seeded(Difficulty::Beginner);
        let black = bit(0, 1);
        let white = FULL_BOARD ^ bit(0, 0) ^ black;

        game.load_position(Board::from_bitboards(black, white), Player::Black);

        assert_eq!(game.current_player(), Player::White);
        assert_eq!(game.board(), &Board::from_bitboards(black, white));
        assert!(game.awaits_computer());
        let state = game.to_game_state();
        assert!(state.is_pass);
        assert!(state.flipped.is_empty());
        assert_eq!(state.message, "Black passes. White's turn");

        assert_eq!(game.play_computer_turn(), Some(Position::new(0, 0)));

        let state = game.to_game_state();
        assert!(state.is_game_over);
        assert_eq!((state.black_count, state.white_count), (0, 64));
        assert_eq!(state.flipped, vec![1]);
        assert_eq!(game.result().and_then(|r| r.winner()), Some(Player::White));
    }

    #[test]
    fn move_that_forces_pass_keeps_its_flips() {
        let mut game = seeded(Difficulty::Beginner);
        // Both white stones sit on the left edge behind a black stone, so
        // white can never bracket anything.
        game.load_position(
            Board::from_bitboards(bit(0, 0) | bit(4, 0), bit(0, 1) | bit(4, 1)),
            Player::Black,
        );
        assert_eq!(game.current_player(), Player::Black);

        assert!(game.play(Position::new(0, 2)));

        let state = game.to_game_state();
        assert!(state.is_pass);
        assert!(!state.is_game_over);
        assert_eq!(state.flipped, vec![Position::new(0, 1).index() as u8]);
        assert_eq!(state.last_move, Some(Position::new(0, 2)));
        assert_eq!(state.message, "White passes. Black's turn");
        assert_eq!(game.current_player(), Player::Black);
        assert!(!game.awaits_computer());
        assert_eq!(game.legal_moves(), vec![Position::new(4, 2)]);
    }

    #[test]
    fn terminal_game_ignores_input() {
        let mut game = GameSession::default();
        game.load_position(Board::from_bitboards(FULL_BOARD ^ bit(0, 0), 0), Player::Black);
        let before = game.to_game_state();

        assert!(!game.play(Position::new(0, 0)));
        assert_eq!(game.play_computer_turn(), None);
        assert_eq!(game.to_game_state(), before);
    }

    #[test]
    fn reset_restores_opening_and_keeps_settings() {
        let mut game = seeded(Difficulty::Random);
        game.set_sound_enabled(false);
        assert!(game.play(Position::new(2, 3)));

        game.reset();

        assert_eq!(game.board(), &Board::new());
        assert_eq!(game.current_player(), Player::Black);
        assert_eq!(game.difficulty(), Difficulty::Random);
        assert!(!game.sound_enabled());
        assert!(game.to_game_state().last_move.is_none());
    }

    #[test]
    fn sound_toggle_does_not_change_outcomes() {
        let mut loud = seeded(Difficulty::Beginner);
        let mut quiet = seeded(Difficulty::Beginner);
        quiet.set_sound_enabled(false);

        for game in [&mut loud, &mut quiet] {
            game.play(Position::new(2, 3));
            game.play_computer_turn();
        }

        assert_eq!(loud.board(), quiet.board());
        assert!(!loud.to_game_state().sounds.is_empty());
        assert!(quiet.to_game_state().sounds.is_empty());
    }

    #[test]
    fn difficulty_change_applies_to_next_computer_turn() {
        let mut game = seeded(Difficulty::Beginner);
        game.set_human_player(Player::White);
        game.set_difficulty(Difficulty::Intermediate);

        // Greedy takes the first of four one-flip openings.
        assert_eq!(game.play_computer_turn(), Some(Position::new(2, 3)));
    }

    #[test]
    fn observer_sees_placements_flips_sounds_and_renders() {
        let recorder = Recorder::default();
        let events = Arc::clone(&recorder.0);
        let mut game = GameSession::with_observer(
            EngineConfig {
                seed: Some(1),
                ..EngineConfig::default()
            },
            Box::new(recorder),
        )
        .unwrap();

        game.play(Position::new(2, 3));

        let events = events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                Event::Placed(Player::Black, Position::new(2, 3)),
                Event::Sound(SoundCue::PLACE),
                Event::Flipped(1),
                Event::Sound(SoundCue::FLIP),
                Event::Render("White's turn".to_string()),
            ]
        );
    }

    #[test]
    fn full_game_through_session_reaches_terminal_state() {
        let mut game = seeded(Difficulty::Advanced);
        game.set_human_player(Player::White);

        // Let the human side play greedily through the session API.
        for _ in 0..130 {
            if game.is_terminal() {
                break;
            }
            if game.awaits_computer() {
                game.play_computer_turn();
            } else {
                let mv = game.legal_moves()[0];
                assert!(game.play(mv));
            }
        }

        let result = game.result().expect("game finished");
        let (black, white) = game.board().count();
        assert_eq!((result.black_count, result.white_count), (black, white));
        assert!(rules::is_terminal(game.board()));
    }
}
