//! Screen flow: menu, play, game over
//!
//! The menu and game-over screens run a playerless demo session in the
//! background; starting a game swaps in a fresh session with a player. The
//! app is the only place sim events meet the audio layer.

use glam::IVec2;

use crate::audio::{AudioManager, AudioSink};
use crate::consts::*;
use crate::input::InputState;
use crate::render::{
    HEALTH_ICON_WIDTH, LIFE_ICON_WIDTH, NUMBER_WIDTH, PLUS_ICON_WIDTH, Surface, draw_game,
    draw_text,
};
use crate::sim::{GameEvent, GameState, Player, Sound, tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Play { paused: bool },
    GameOver { score: u32 },
}

/// Top-level application: owns the current screen, the running session,
/// and the audio routing.
pub struct App<S: AudioSink> {
    pub screen: Screen,
    pub state: GameState,
    audio: AudioManager<S>,
    base_seed: u64,
    sessions: u64,
}

impl<S: AudioSink> App<S> {
    pub fn new(sink: S, seed: u64) -> Self {
        Self {
            screen: Screen::Menu,
            state: GameState::new(seed, None),
            audio: AudioManager::new(sink, seed),
            base_seed: seed,
            sessions: 0,
        }
    }

    /// Each session (demo or real) gets its own seed so restarting never
    /// replays the previous run.
    fn next_seed(&mut self) -> u64 {
        self.sessions += 1;
        self.base_seed.wrapping_add(self.sessions)
    }

    /// Advance one frame.
    pub fn update(&mut self, input: &InputState) {
        match self.screen {
            Screen::Menu => {
                tick(&mut self.state, None);
                if input.fire_pressed {
                    let seed = self.next_seed();
                    log::info!("starting game with seed {seed}");
                    self.state = GameState::new(seed, Some(Player::new()));
                    self.screen = Screen::Play { paused: false };
                    // Level-start jingle queued by the session constructor
                    self.drain_events();
                }
            }
            Screen::Play { paused } => {
                if input.pause_pressed {
                    self.screen = Screen::Play { paused: !paused };
                    return;
                }
                if paused {
                    return;
                }
                // Game over is detected before the frame runs, so the final
                // death animation stays on screen for one menu transition
                if let Some(player) = &self.state.player {
                    if player.lives < 0 {
                        let score = player.score;
                        log::info!("game over with score {score}");
                        self.audio.play(Sound::Over);
                        let seed = self.next_seed();
                        self.state = GameState::new(seed, None);
                        self.screen = Screen::GameOver { score };
                        return;
                    }
                }
                tick(&mut self.state, Some(input));
                self.drain_events();
            }
            Screen::GameOver { .. } => {
                tick(&mut self.state, None);
                if input.fire_pressed {
                    let seed = self.next_seed();
                    self.state = GameState::new(seed, None);
                    self.screen = Screen::Menu;
                }
            }
        }
    }

    fn drain_events(&mut self) {
        for event in self.state.events.drain(..) {
            match event {
                GameEvent::Sound(sound) => self.audio.play(sound),
            }
        }
    }

    /// Draw the current screen back to front.
    pub fn draw(&self, surface: &mut impl Surface) {
        draw_game(&self.state, surface);
        match self.screen {
            Screen::Menu => {
                surface.blit("title", IVec2::ZERO);
                let anim = (((self.state.timer + 40).rem_euclid(160)) / 4).min(9);
                surface.blit(&format!("space{anim}"), IVec2::new(130, 280));
            }
            Screen::Play { paused } => {
                self.draw_status(surface);
                if paused {
                    draw_text(surface, "PAUSED", HEIGHT / 2 - 20, None);
                }
            }
            Screen::GameOver { score } => {
                draw_score(surface, score);
                draw_text(surface, "LEVEL 1", 451, None);
                surface.blit("over", IVec2::ZERO);
            }
        }
    }

    /// Score, level number, and the lives/health icon strip.
    fn draw_status(&self, surface: &mut impl Surface) {
        let Some(player) = &self.state.player else {
            return;
        };
        draw_score(surface, player.score);
        draw_text(surface, &format!("LEVEL {}", self.state.level + 1), 451, None);

        let mut x = 0;
        for _ in 0..player.lives.min(2) {
            surface.blit("life", IVec2::new(x, 450));
            x += LIFE_ICON_WIDTH;
        }
        if player.lives > 2 {
            surface.blit("plus", IVec2::new(x, 450));
            x += PLUS_ICON_WIDTH;
        }
        if player.lives >= 0 {
            for _ in 0..player.health {
                surface.blit("health", IVec2::new(x, 450));
                x += HEALTH_ICON_WIDTH;
            }
        }
    }
}

fn draw_score(surface: &mut impl Surface, score: u32) {
    let text = score.to_string();
    let x = WIDTH - 2 - NUMBER_WIDTH * text.len() as i32;
    draw_text(surface, &text, 451, Some(x));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{NullAudio, PlaybackError};

    #[derive(Debug, Default)]
    struct RecordingSink {
        played: Vec<String>,
    }

    impl AudioSink for RecordingSink {
        fn play(&mut self, name: &str, _variant: u32) -> Result<(), PlaybackError> {
            self.played.push(name.to_owned());
            Ok(())
        }
    }

    fn fire() -> InputState {
        InputState { fire_pressed: true, fire_held: true, ..Default::default() }
    }

    #[test]
    fn test_menu_runs_demo_until_fire() {
        let mut app = App::new(NullAudio, 1);
        assert!(app.state.player.is_none());

        app.update(&InputState::default());
        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.state.timer, 0);

        app.update(&fire());
        assert_eq!(app.screen, Screen::Play { paused: false });
        assert!(app.state.player.is_some());
        // A fresh session, not the demo's continuation
        assert_eq!(app.state.timer, -1);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut app = App::new(NullAudio, 1);
        app.update(&fire());

        let pause = InputState { pause_pressed: true, ..Default::default() };
        app.update(&pause);
        assert_eq!(app.screen, Screen::Play { paused: true });

        let frozen_timer = app.state.timer;
        for _ in 0..10 {
            app.update(&InputState::default());
        }
        assert_eq!(app.state.timer, frozen_timer);

        app.update(&pause);
        app.update(&InputState::default());
        assert_eq!(app.state.timer, frozen_timer + 1);
    }

    #[test]
    fn test_game_over_flow() {
        let mut app = App::new(RecordingSink::default(), 1);
        app.update(&fire());

        if let Some(player) = app.state.player.as_mut() {
            player.lives = -1;
            player.score = 700;
        }
        app.update(&InputState::default());
        assert_eq!(app.screen, Screen::GameOver { score: 700 });
        assert!(app.state.player.is_none());
        assert!(app.audio.sink().played.contains(&"over".to_owned()));

        app.update(&fire());
        assert_eq!(app.screen, Screen::Menu);
    }

    #[test]
    fn test_play_sounds_reach_the_sink() {
        let mut app = App::new(RecordingSink::default(), 1);
        // Starting a game plays the level-start jingle immediately
        app.update(&fire());
        assert!(app.audio.sink().played.contains(&"level".to_owned()));
    }

    #[test]
    fn test_menu_prompt_animation_clamps() {
        let mut app = App::new(NullAudio, 1);
        #[derive(Default)]
        struct Names(Vec<String>);
        impl Surface for Names {
            fn blit(&mut self, sprite: &str, _pos: IVec2) {
                self.0.push(sprite.to_owned());
            }
        }
        app.state.timer = 0; // (0 + 40) % 160 / 4 = 10, clamped to 9
        let mut names = Names::default();
        app.draw(&mut names);
        assert!(names.0.contains(&"title".to_owned()));
        assert!(names.0.contains(&"space9".to_owned()));
    }
}
