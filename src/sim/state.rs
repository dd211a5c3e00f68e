//! Game state and core simulation types
//!
//! Every entity owns its own mutable state; the session (`GameState`) owns
//! the entity collections and is their sole mutator. Sprite keys are pure
//! functions of entity state plus the session frame timer, recomputed every
//! frame - nothing stores a previous sprite.

use glam::IVec2;
use rand::Rng;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Anchor, Body, Gravity};
use super::levels::Grid;
use crate::consts::*;

/// Named sound effects the simulation can request. The audio layer decides
/// how (and whether) each one actually plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sound {
    /// Player blows a new orb
    Blow,
    /// Player jumps
    Jump,
    /// Robot winds up a bolt
    Laser,
    /// Robot caught in an orb
    Trap,
    /// Orb bursts
    Pop,
    /// Player hit but alive
    Ouch,
    /// Player hit and out of health
    Die,
    /// Health or life pickup
    Bonus,
    /// Scoring fruit pickup
    Score,
    /// Level start jingle
    Level,
    /// Game over jingle (requested by the shell, not the sim)
    Over,
}

impl Sound {
    pub fn name(&self) -> &'static str {
        match self {
            Sound::Blow => "blow",
            Sound::Jump => "jump",
            Sound::Laser => "laser",
            Sound::Trap => "trap",
            Sound::Pop => "pop",
            Sound::Ouch => "ouch",
            Sound::Die => "die",
            Sound::Bonus => "bonus",
            Sound::Score => "score",
            Sound::Level => "level",
            Sound::Over => "over",
        }
    }

    /// Number of numbered variants on disk; one is chosen at random per play.
    pub fn variants(&self) -> u32 {
        match self {
            Sound::Blow | Sound::Laser | Sound::Trap | Sound::Pop | Sound::Ouch => 4,
            _ => 1,
        }
    }
}

/// Side effects of one frame, drained by the shell after each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Sound(Sound),
}

/// Robot temperament, fixed at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotKind {
    Normal,
    /// Aims at orbs and yields better fruit when trapped
    Aggressive,
}

impl RobotKind {
    pub fn index(&self) -> u32 {
        match self {
            RobotKind::Normal => 0,
            RobotKind::Aggressive => 1,
        }
    }
}

/// Fruit pickup types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FruitKind {
    Apple,
    Raspberry,
    Lemon,
    ExtraHealth,
    ExtraLife,
}

impl FruitKind {
    pub fn index(&self) -> u32 {
        match self {
            FruitKind::Apple => 0,
            FruitKind::Raspberry => 1,
            FruitKind::Lemon => 2,
            FruitKind::ExtraHealth => 3,
            FruitKind::ExtraLife => 4,
        }
    }

    /// Points awarded on pickup; only consulted for the basic fruits.
    pub fn score(&self) -> u32 {
        (self.index() + 1) * 100
    }
}

/// Horizontal projectile fired by a robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bolt {
    pub body: Body,
    pub direction_x: i32,
    pub active: bool,
}

pub const BOLT_SPEED: i32 = 7;

impl Bolt {
    pub fn new(pos: IVec2, direction_x: i32) -> Self {
        Self {
            body: Body::new(pos, IVec2::new(BOLT_WIDTH, BOLT_HEIGHT), Anchor::Centre),
            direction_x,
            active: true,
        }
    }

    pub fn sprite(&self, timer: i32) -> String {
        let dir = if self.direction_x > 0 { 1 } else { 0 };
        format!("bolt{}{}", dir, timer.div_euclid(4).rem_euclid(2))
    }
}

/// Short burst animation left behind by expiring orbs and fruit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pop {
    pub body: Body,
    pub style: u32,
    pub timer: i32,
}

/// Frames a pop stays on screen before the session prunes it.
pub const POP_LIFETIME: i32 = 12;

impl Pop {
    pub fn new(pos: IVec2, style: u32) -> Self {
        Self {
            body: Body::new(pos, IVec2::new(POP_WIDTH, POP_HEIGHT), Anchor::Centre),
            style,
            timer: -1,
        }
    }

    pub fn sprite(&self) -> String {
        format!("pop{}{}", self.style, self.timer.div_euclid(2))
    }
}

/// Collectible pickup, falling under gravity until grabbed or expired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fruit {
    pub body: Body,
    pub gravity: Gravity,
    pub kind: FruitKind,
    pub time_to_live: i32,
}

impl Fruit {
    /// The kind is drawn at construction, seeded by the kind of robot the
    /// source orb trapped. Randomly spawned fruit counts as Normal-sourced.
    pub fn new(pos: IVec2, trapped_kind: RobotKind, rng: &mut Pcg32) -> Self {
        use FruitKind::*;
        let kind = match trapped_kind {
            RobotKind::Normal => *[Apple, Raspberry, Lemon]
                .choose(rng)
                .unwrap_or(&Apple),
            RobotKind::Aggressive => {
                // 10 of each basic fruit, 9 extra-health, 1 extra-life
                let mut pool = Vec::with_capacity(40);
                for _ in 0..10 {
                    pool.extend_from_slice(&[Apple, Raspberry, Lemon]);
                }
                pool.extend_from_slice(&[ExtraHealth; 9]);
                pool.push(ExtraLife);
                *pool.choose(rng).unwrap_or(&Apple)
            }
        };
        Self {
            body: Body::new(pos, IVec2::new(FRUIT_WIDTH, FRUIT_HEIGHT), Anchor::CentreBottom),
            gravity: Gravity::default(),
            kind,
            time_to_live: 500,
        }
    }

    pub fn sprite(&self, timer: i32) -> String {
        let bob = [0, 1, 2, 1][timer.div_euclid(6).rem_euclid(4) as usize];
        format!("fruit{}{}", self.kind.index(), bob)
    }
}

/// Bubble orb fired by the player; traps robots and floats them off-screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orb {
    pub id: u32,
    pub body: Body,
    pub direction_x: i32,
    pub floating: bool,
    /// Set when a robot is caught; determines the released fruit odds
    pub trapped_kind: Option<RobotKind>,
    pub timer: i32,
    /// Frames of horizontal travel before floating; extended by held fire
    pub blown_frames: i32,
}

pub const ORB_MAX_TIMER: i32 = 250;
pub const ORB_SPEED: i32 = 4;

impl Orb {
    pub fn new(id: u32, pos: IVec2, direction_x: i32) -> Self {
        Self {
            id,
            body: Body::new(pos, IVec2::new(ORB_WIDTH, ORB_HEIGHT), Anchor::Centre),
            direction_x,
            floating: false,
            trapped_kind: None,
            timer: -1,
            blown_frames: 6,
        }
    }

    /// Called for each bolt; a hit pushes the orb to the brink of expiry.
    pub fn hit_test(&mut self, point: IVec2) -> bool {
        let collided = self.body.contains(point);
        if collided {
            self.timer = ORB_MAX_TIMER - 1;
        }
        collided
    }

    pub fn sprite(&self) -> String {
        if self.timer < 9 {
            format!("orb{}", self.timer.div_euclid(3))
        } else if let Some(kind) = self.trapped_kind {
            format!("trap{}{}", kind.index(), (self.timer / 4) % 8)
        } else {
            format!("orb{}", 3 + ((self.timer - 9) / 8) % 4)
        }
    }
}

/// Enemy robot: patrols, fires bolts, and can be trapped in orbs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Robot {
    pub body: Body,
    pub gravity: Gravity,
    pub kind: RobotKind,
    /// Patrol speed, fixed at spawn
    pub speed: i32,
    pub direction_x: i32,
    pub alive: bool,
    pub change_dir_timer: i32,
    pub fire_timer: i32,
}

impl Robot {
    pub fn new(pos: IVec2, kind: RobotKind, rng: &mut Pcg32) -> Self {
        Self {
            body: Body::new(pos, IVec2::new(ROBOT_WIDTH, ROBOT_HEIGHT), Anchor::CentreBottom),
            gravity: Gravity::default(),
            kind,
            speed: rng.random_range(1..=3),
            direction_x: 1,
            alive: true,
            change_dir_timer: 0,
            fire_timer: 100,
        }
    }

    pub fn sprite(&self, timer: i32) -> String {
        let dir = if self.direction_x > 0 { 1 } else { 0 };
        let frame = if self.fire_timer < 12 {
            5 + self.fire_timer / 4
        } else {
            1 + timer.div_euclid(4).rem_euclid(4)
        };
        format!("robot{}{}{}", self.kind.index(), dir, frame)
    }
}

/// The player-controlled character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub gravity: Gravity,
    pub lives: i32,
    pub score: u32,
    pub health: i32,
    pub direction_x: i32,
    pub fire_timer: i32,
    pub hurt_timer: i32,
    /// Id of the orb still being inflated by held fire input
    pub blowing_orb: Option<u32>,
    /// Horizontal intent applied this frame, kept only for sprite selection
    pub move_dx: i32,
}

impl Player {
    pub fn new() -> Self {
        let mut player = Self {
            body: Body::new(
                IVec2::ZERO,
                IVec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
                Anchor::CentreBottom,
            ),
            gravity: Gravity::default(),
            lives: 2,
            score: 0,
            health: 3,
            direction_x: 1,
            fire_timer: 0,
            hurt_timer: 100,
            blowing_orb: None,
            move_dx: 0,
        };
        player.reset();
        player
    }

    /// Reposition at the spawn point with full health, for a new life or
    /// level. Starts with a brief invulnerability window.
    pub fn reset(&mut self) {
        self.body.pos = IVec2::new(WIDTH / 2, 100);
        self.gravity.vel_y = 0;
        self.direction_x = 1;
        self.fire_timer = 0;
        self.hurt_timer = 100;
        self.health = 3;
        self.blowing_orb = None;
    }

    /// Called for each bolt. Damage only lands while `hurt_timer` is
    /// negative; the window 0..=100 after recoil ends is deliberately still
    /// hittable with no recoil display - observable behaviour, not a bug.
    pub fn hit_test(&mut self, point: IVec2, direction_x: i32) -> bool {
        if self.body.contains(point) && self.hurt_timer < 0 {
            self.hurt_timer = 200;
            self.health -= 1;
            self.gravity.vel_y = -12;
            self.gravity.landed = false;
            self.direction_x = direction_x;
            return true;
        }
        false
    }

    pub fn sprite(&self, timer: i32) -> String {
        // Flicker while invulnerable
        if self.hurt_timer > 0 && self.hurt_timer.rem_euclid(2) == 0 {
            return "blank".to_owned();
        }
        let dir = if self.direction_x > 0 { 1 } else { 0 };
        if self.hurt_timer > 100 {
            if self.health > 0 {
                format!("recoil{dir}")
            } else {
                format!("fall{}", timer.div_euclid(4).rem_euclid(2))
            }
        } else if self.fire_timer > 0 {
            format!("blow{dir}")
        } else if self.move_dx == 0 {
            "still".to_owned()
        } else {
            format!("run{}{}", dir, timer.div_euclid(8).rem_euclid(4))
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete state of one play session (deterministic, serializable).
///
/// A session with no player is demo mode: robots patrol, no input is read
/// and no sounds are requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub player: Option<Player>,
    pub level: i32,
    pub level_colour: i32,
    pub grid: Grid,
    /// Frame counter, reset to -1 on each level
    pub timer: i32,
    pub fruits: Vec<Fruit>,
    pub bolts: Vec<Bolt>,
    pub enemies: Vec<Robot>,
    pub pops: Vec<Pop>,
    pub orbs: Vec<Orb>,
    /// Shuffled robot kinds yet to spawn this level
    pub pending_enemies: Vec<RobotKind>,
    next_orb_id: u32,
    /// Per-frame side effects, cleared at the start of every tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(seed: u64, player: Option<Player>) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player,
            level: -1,
            level_colour: -1,
            grid: Grid::load(0),
            timer: -1,
            fruits: Vec::new(),
            bolts: Vec::new(),
            enemies: Vec::new(),
            pops: Vec::new(),
            orbs: Vec::new(),
            pending_enemies: Vec::new(),
            next_orb_id: 1,
            events: Vec::new(),
        };
        super::tick::next_level(&mut state);
        state
    }

    /// Per-frame chance of any one robot firing; rises with the level.
    pub fn fire_probability(&self) -> f64 {
        0.001 + 0.0001 * f64::from(self.level.min(100))
    }

    /// Simultaneous on-screen enemy cap; rises with the level.
    pub fn max_enemies(&self) -> usize {
        ((self.level + 6) / 2).min(8) as usize
    }

    /// Find a free top-row column for a robot to drop in from, scanning from
    /// a random starting column and wrapping. Falls back to the playfield
    /// centre if every column is blocked.
    pub fn robot_spawn_x(&mut self) -> i32 {
        let start = self.rng.random_range(0..NUM_COLUMNS as usize);
        for i in 0..NUM_COLUMNS as usize {
            let grid_x = (start + i) % NUM_COLUMNS as usize;
            if self.grid.column_free(grid_x) {
                return GRID_BLOCK_SIZE * grid_x as i32 + LEVEL_X_OFFSET + 12;
            }
        }
        WIDTH / 2
    }

    /// Request a sound effect. Demo sessions stay silent.
    pub fn play_sound(&mut self, sound: Sound) {
        if self.player.is_some() {
            self.events.push(GameEvent::Sound(sound));
        }
    }

    pub fn allocate_orb_id(&mut self) -> u32 {
        let id = self.next_orb_id;
        self.next_orb_id += 1;
        id
    }

    pub(super) fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fruit_distribution_from_aggressive() {
        // 40-slot pool: extra-life 1/40, extra-health 9/40
        let mut rng = Pcg32::seed_from_u64(7);
        let n = 4000;
        let mut lives = 0;
        let mut healths = 0;
        for _ in 0..n {
            let fruit = Fruit::new(IVec2::new(400, 200), RobotKind::Aggressive, &mut rng);
            match fruit.kind {
                FruitKind::ExtraLife => lives += 1,
                FruitKind::ExtraHealth => healths += 1,
                _ => {}
            }
        }
        let life_rate = f64::from(lives) / f64::from(n);
        let health_rate = f64::from(healths) / f64::from(n);
        assert!((life_rate - 1.0 / 40.0).abs() < 0.01, "life rate {life_rate}");
        assert!((health_rate - 9.0 / 40.0).abs() < 0.03, "health rate {health_rate}");
    }

    #[test]
    fn test_fruit_from_normal_is_basic() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..200 {
            let fruit = Fruit::new(IVec2::new(400, 200), RobotKind::Normal, &mut rng);
            assert!(matches!(
                fruit.kind,
                FruitKind::Apple | FruitKind::Raspberry | FruitKind::Lemon
            ));
        }
    }

    #[test]
    fn test_sprite_keys_are_pure() {
        let mut rng = Pcg32::seed_from_u64(3);
        let robot = Robot::new(IVec2::new(400, 200), RobotKind::Aggressive, &mut rng);
        assert_eq!(robot.sprite(42), robot.sprite(42));

        let orb = Orb::new(1, IVec2::new(300, 200), -1);
        assert_eq!(orb.sprite(), orb.sprite());

        let player = Player::new();
        assert_eq!(player.sprite(17), player.sprite(17));
    }

    #[test]
    fn test_orb_sprite_progression() {
        let mut orb = Orb::new(1, IVec2::new(300, 200), 1);
        orb.timer = 0;
        assert_eq!(orb.sprite(), "orb0");
        orb.timer = 8;
        assert_eq!(orb.sprite(), "orb2");
        orb.timer = 9;
        assert_eq!(orb.sprite(), "orb3");
        orb.trapped_kind = Some(RobotKind::Aggressive);
        orb.timer = 40;
        assert_eq!(orb.sprite(), "trap12");
    }

    #[test]
    fn test_orb_hit_test_forces_expiry() {
        let mut orb = Orb::new(1, IVec2::new(300, 200), 1);
        assert!(!orb.hit_test(IVec2::new(500, 200)));
        assert_eq!(orb.timer, -1);
        assert!(orb.hit_test(IVec2::new(310, 210)));
        assert_eq!(orb.timer, ORB_MAX_TIMER - 1);
    }

    #[test]
    fn test_player_invulnerability_gate() {
        let mut player = Player::new();
        // Fresh player has hurt_timer = 100: inside the rect but immune
        let point = player.body.centre();
        assert!(!player.hit_test(point, 1));
        player.hurt_timer = 0;
        assert!(!player.hit_test(point, 1));
        player.hurt_timer = -1;
        assert!(player.hit_test(point, -1));
        assert_eq!(player.hurt_timer, 200);
        assert_eq!(player.health, 2);
        assert_eq!(player.gravity.vel_y, -12);
        assert_eq!(player.direction_x, -1);
    }

    #[test]
    fn test_max_enemies_caps_at_eight() {
        let mut state = GameState::new(1, None);
        state.level = 0;
        assert_eq!(state.max_enemies(), 3);
        state.level = 10;
        assert_eq!(state.max_enemies(), 8);
        state.level = 100;
        assert_eq!(state.max_enemies(), 8);
    }

    #[test]
    fn test_fire_probability_capped() {
        let mut state = GameState::new(1, None);
        state.level = 0;
        assert!((state.fire_probability() - 0.001).abs() < 1e-9);
        state.level = 250;
        assert!((state.fire_probability() - 0.011).abs() < 1e-9);
    }

    #[test]
    fn test_demo_session_is_silent() {
        let mut state = GameState::new(1, None);
        state.play_sound(Sound::Pop);
        assert!(state.events.is_empty());

        let mut state = GameState::new(1, Some(Player::new()));
        state.events.clear();
        state.play_sound(Sound::Pop);
        assert_eq!(state.events, vec![GameEvent::Sound(Sound::Pop)]);
    }
}
