//! Per-frame simulation update
//!
//! `tick` advances one session by one frame. The update order is a contract:
//! fruits, bolts, enemies, pops, orbs, then the player, then pruning, then
//! spawning and the level-advance check. Orbs must be updated before the
//! advance check observes trapped robots, and pruning must run before the
//! spawn counters look at collection sizes.

use std::mem;

use glam::IVec2;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::levels::{Grid, LEVELS};
use super::state::{
    BOLT_SPEED, Bolt, Fruit, FruitKind, GameEvent, GameState, ORB_MAX_TIMER, ORB_SPEED, Orb,
    POP_LIFETIME, Pop, Robot, RobotKind, Sound,
};
use crate::consts::*;
use crate::input::InputState;
use crate::sign;

/// Advance to the next level (or loop past the last layout): new grid,
/// cleared collections, reset player, refilled pending-enemy queue.
pub fn next_level(state: &mut GameState) {
    state.level_colour = (state.level_colour + 1) % 4;
    state.level += 1;
    state.grid = Grid::load(state.level as usize % LEVELS.len());
    state.timer = -1;

    if let Some(player) = state.player.as_mut() {
        player.reset();
    }

    state.fruits.clear();
    state.bolts.clear();
    state.enemies.clear();
    state.pops.clear();
    state.orbs.clear();

    let num_enemies = 10 + state.level;
    // 1 + level/1.5 aggressive robots, integer truncation
    let num_strong = 1 + state.level * 2 / 3;
    let num_weak = num_enemies - num_strong;

    state.pending_enemies.clear();
    state
        .pending_enemies
        .extend(std::iter::repeat_n(RobotKind::Aggressive, num_strong as usize));
    state
        .pending_enemies
        .extend(std::iter::repeat_n(RobotKind::Normal, num_weak as usize));
    let mut pending = mem::take(&mut state.pending_enemies);
    pending.shuffle(state.rng());
    state.pending_enemies = pending;

    log::info!(
        "level {} start: {} pending enemies ({} aggressive)",
        state.level,
        num_enemies,
        num_strong
    );
    state.play_sound(Sound::Level);
}

/// Advance the session by one frame. `input` is None in demo mode (the
/// player, if any, is not updated).
pub fn tick(state: &mut GameState, input: Option<&InputState>) {
    state.events.clear();
    state.timer += 1;

    update_fruits(state);
    update_bolts(state);
    update_enemies(state);
    for pop in &mut state.pops {
        pop.timer += 1;
    }
    update_orbs(state);
    if let Some(input) = input {
        update_player(state, input);
    }

    prune(state);

    // A random fruit drops every 100 frames while the level is still live
    if state.timer % 100 == 0 && state.pending_enemies.len() + state.enemies.len() > 0 {
        let pos = IVec2::new(
            state.rng().random_range(70..=730),
            state.rng().random_range(75..=400),
        );
        let fruit = Fruit::new(pos, RobotKind::Normal, state.rng());
        state.fruits.push(fruit);
    }

    // A queued robot drops in every 81 frames while under the enemy cap
    if state.timer % 81 == 0
        && !state.pending_enemies.is_empty()
        && state.enemies.len() < state.max_enemies()
    {
        if let Some(kind) = state.pending_enemies.pop() {
            let pos = IVec2::new(state.robot_spawn_x(), -30);
            let robot = Robot::new(pos, kind, state.rng());
            state.enemies.push(robot);
        }
    }

    // Advance once everything is cleared and no orb still holds a robot
    if state.pending_enemies.is_empty()
        && state.fruits.is_empty()
        && state.enemies.is_empty()
        && state.pops.is_empty()
        && !state.orbs.iter().any(|o| o.trapped_kind.is_some())
    {
        next_level(state);
    }
}

fn update_fruits(state: &mut GameState) {
    let mut fruits = mem::take(&mut state.fruits);
    for fruit in &mut fruits {
        fruit.gravity.apply(&mut fruit.body, &state.grid, true);

        let mut sound = None;
        if let Some(player) = state.player.as_mut() {
            if player.body.contains(fruit.body.centre()) {
                match fruit.kind {
                    FruitKind::ExtraHealth => {
                        player.health = (player.health + 1).min(3);
                        sound = Some(Sound::Bonus);
                    }
                    FruitKind::ExtraLife => {
                        player.lives += 1;
                        sound = Some(Sound::Bonus);
                    }
                    _ => {
                        player.score += fruit.kind.score();
                        sound = Some(Sound::Score);
                    }
                }
                fruit.time_to_live = 0;
            }
        }
        if let Some(sound) = sound {
            state.play_sound(sound);
        } else {
            fruit.time_to_live -= 1;
        }

        if fruit.time_to_live <= 0 {
            let pos = fruit.body.pos + IVec2::new(0, -27);
            state.pops.push(Pop::new(pos, 0));
        }
    }
    state.fruits = fruits;
}

fn update_bolts(state: &mut GameState) {
    let mut bolts = mem::take(&mut state.bolts);
    for bolt in &mut bolts {
        if bolt
            .body
            .stepped_move(&state.grid, bolt.direction_x, 0, BOLT_SPEED)
        {
            // Hit a block or the playfield edge
            bolt.active = false;
            continue;
        }

        // Orbs soak up bolts before the player is checked
        for orb in &mut state.orbs {
            if orb.hit_test(bolt.body.pos) {
                bolt.active = false;
                break;
            }
        }
        if !bolt.active {
            continue;
        }

        let mut sound = None;
        if let Some(player) = state.player.as_mut() {
            if player.hit_test(bolt.body.pos, bolt.direction_x) {
                bolt.active = false;
                sound = Some(if player.health > 0 { Sound::Ouch } else { Sound::Die });
            }
        }
        if let Some(sound) = sound {
            state.play_sound(sound);
        }
    }
    state.bolts = bolts;
}

fn update_enemies(state: &mut GameState) {
    let mut enemies = mem::take(&mut state.enemies);
    for robot in &mut enemies {
        update_robot(robot, state);
    }
    state.enemies = enemies;
}

fn update_robot(robot: &mut Robot, state: &mut GameState) {
    robot.gravity.apply(&mut robot.body, &state.grid, true);

    robot.change_dir_timer -= 1;
    robot.fire_timer += 1;

    // Patrol; a wall hit forces a direction re-pick next check
    if robot
        .body
        .stepped_move(&state.grid, robot.direction_x, 0, robot.speed)
    {
        robot.change_dir_timer = 0;
    }

    if robot.change_dir_timer <= 0 {
        // Uniform over left, right, and (when a player exists) toward them
        let mut directions = vec![-1, 1];
        if let Some(player) = &state.player {
            directions.push(sign(player.body.pos.x - robot.body.pos.x));
        }
        robot.direction_x = directions
            .as_slice()
            .choose(state.rng())
            .copied()
            .unwrap_or(1);
        robot.change_dir_timer = state.rng().random_range(100..=250);
    }

    // Aggressive robots snap toward the first nearby orb at their height
    if robot.kind == RobotKind::Aggressive && robot.fire_timer >= 24 {
        for orb in &state.orbs {
            if orb.body.pos.y >= robot.body.top()
                && orb.body.pos.y < robot.body.bottom()
                && (orb.body.pos.x - robot.body.pos.x).abs() < 200
            {
                robot.direction_x = sign(orb.body.pos.x - robot.body.pos.x);
                robot.fire_timer = 0;
                break;
            }
        }
    }

    if robot.fire_timer >= 12 {
        // Windup trigger: a per-frame probability draw, ten times as likely
        // when sharing a height band with the player
        let mut probability = state.fire_probability();
        if let Some(player) = &state.player {
            if robot.body.top() < player.body.bottom() && robot.body.bottom() > player.body.top() {
                probability *= 10.0;
            }
        }
        if state.rng().random::<f64>() < probability {
            robot.fire_timer = 0;
            state.play_sound(Sound::Laser);
        }
    } else if robot.fire_timer == 8 {
        // The launch is a fixed number of frames into the windup animation
        let pos = IVec2::new(
            robot.body.pos.x + robot.direction_x * 20,
            robot.body.pos.y - 38,
        );
        state.bolts.push(Bolt::new(pos, robot.direction_x));
    }

    // Capture check: the first untrapped orb containing this robot's centre
    let mut trapped = false;
    for orb in &mut state.orbs {
        if orb.trapped_kind.is_none() && robot.body.contains(orb.body.centre()) {
            robot.alive = false;
            orb.floating = true;
            orb.trapped_kind = Some(robot.kind);
            trapped = true;
            break;
        }
    }
    if trapped {
        state.play_sound(Sound::Trap);
    }
}

fn update_orbs(state: &mut GameState) {
    let mut orbs = mem::take(&mut state.orbs);
    for orb in &mut orbs {
        orb.timer += 1;

        if orb.floating {
            let drift = state.rng().random_range(1..=2);
            orb.body.stepped_move(&state.grid, 0, -1, drift);
        } else if orb
            .body
            .stepped_move(&state.grid, orb.direction_x, 0, ORB_SPEED)
        {
            orb.floating = true;
        }

        if orb.timer == orb.blown_frames {
            orb.floating = true;
        } else if orb.timer >= ORB_MAX_TIMER || orb.body.pos.y <= -40 {
            // Burst: leave a pop, release a fruit if a robot was trapped
            state.pops.push(Pop::new(orb.body.pos, 1));
            if let Some(kind) = orb.trapped_kind {
                let fruit = Fruit::new(orb.body.pos, kind, state.rng());
                state.fruits.push(fruit);
            }
            state.play_sound(Sound::Pop);
        }
    }
    state.orbs = orbs;
}

fn update_player(state: &mut GameState, input: &InputState) {
    let Some(mut player) = state.player.take() else {
        return;
    };

    // Collision detection is off while falling out after death
    let detect = player.health > 0;
    player.gravity.apply(&mut player.body, &state.grid, detect);

    player.fire_timer -= 1;
    player.hurt_timer -= 1;

    if player.gravity.landed {
        // Landing ends the recoil state early
        player.hurt_timer = player.hurt_timer.min(100);
    }

    player.move_dx = 0;

    if player.hurt_timer > 100 {
        if player.health > 0 {
            // Recoil-slide in the direction the bolt pushed us
            player
                .body
                .stepped_move(&state.grid, player.direction_x, 0, 4);
        } else if player.body.top() >= HEIGHT * 3 / 2 {
            // Death fall complete: spend a life and respawn
            player.lives -= 1;
            player.reset();
        }
    } else {
        if input.left {
            player.move_dx = -1;
        } else if input.right {
            player.move_dx = 1;
        }

        if player.move_dx != 0 {
            player.direction_x = player.move_dx;
            // Movement is locked during the first half of the fire animation
            if player.fire_timer < 10 {
                player
                    .body
                    .stepped_move(&state.grid, player.move_dx, 0, 4);
            }
        }

        // Blow a new orb on the fire edge, capped at five in flight
        if input.fire_pressed && player.fire_timer <= 0 && state.orbs.len() < 5 {
            let x = (player.body.pos.x + player.direction_x * 38)
                .clamp(PLAYFIELD_LEFT, PLAYFIELD_RIGHT);
            let y = player.body.pos.y - 35;
            let id = state.allocate_orb_id();
            state
                .orbs
                .push(Orb::new(id, IVec2::new(x, y), player.direction_x));
            player.blowing_orb = Some(id);
            state.events.push(GameEvent::Sound(Sound::Blow));
            player.fire_timer = 20;
        }

        if input.jump_pressed && player.gravity.vel_y == 0 && player.gravity.landed {
            player.gravity.vel_y = -16;
            player.gravity.landed = false;
            state.events.push(GameEvent::Sound(Sound::Jump));
        }
    }

    // Held fire keeps inflating the current orb until it detaches
    if input.fire_held {
        if let Some(id) = player.blowing_orb {
            match state.orbs.iter_mut().find(|o| o.id == id) {
                Some(orb) => {
                    orb.blown_frames += 4;
                    if orb.blown_frames >= 120 {
                        player.blowing_orb = None;
                    }
                }
                // The orb already burst
                None => player.blowing_orb = None,
            }
        }
    } else {
        player.blowing_orb = None;
    }

    state.player = Some(player);
}

fn prune(state: &mut GameState) {
    state.fruits.retain(|f| f.time_to_live > 0);
    state.bolts.retain(|b| b.active);
    state.enemies.retain(|e| e.alive);
    state.pops.retain(|p| p.timer < POP_LIFETIME);
    state
        .orbs
        .retain(|o| o.timer < ORB_MAX_TIMER && o.body.pos.y > -40);
}
