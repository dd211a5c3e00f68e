//! Per-frame input snapshots
//!
//! The simulation only ever sees an immutable `InputState` built once per
//! frame. Edge detection (pressed-this-frame) happens here, in the shell
//! layer, never in the core.

/// Raw held-key state as polled from whatever device layer hosts the game.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawKeys {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub fire: bool,
    pub pause: bool,
}

/// One frame of input. The `*_pressed` fields are true only on the frame
/// the key transitioned from released to held.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    /// UP edge - jump
    pub jump_pressed: bool,
    /// Fire edge - blow an orb / advance a screen
    pub fire_pressed: bool,
    /// Pause edge - toggle pause
    pub pause_pressed: bool,
    /// Fire held - keeps inflating the current orb
    pub fire_held: bool,
}

/// Converts raw held-key state into an edge-detected `InputState`.
#[derive(Debug, Default)]
pub struct InputTracker {
    prev_fire: bool,
    prev_pause: bool,
    prev_up: bool,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call exactly once per frame.
    pub fn snapshot(&mut self, keys: &RawKeys) -> InputState {
        let state = InputState {
            left: keys.left,
            right: keys.right,
            up: keys.up,
            jump_pressed: keys.up && !self.prev_up,
            fire_pressed: keys.fire && !self.prev_fire,
            pause_pressed: keys.pause && !self.prev_pause,
            fire_held: keys.fire,
        };

        self.prev_fire = keys.fire;
        self.prev_pause = keys.pause;
        self.prev_up = keys.up;

        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_edge_fires_once() {
        let mut tracker = InputTracker::new();
        let held = RawKeys { fire: true, ..Default::default() };

        let first = tracker.snapshot(&held);
        assert!(first.fire_pressed);
        assert!(first.fire_held);

        let second = tracker.snapshot(&held);
        assert!(!second.fire_pressed);
        assert!(second.fire_held);

        let released = tracker.snapshot(&RawKeys::default());
        assert!(!released.fire_held);

        let again = tracker.snapshot(&held);
        assert!(again.fire_pressed);
    }

    #[test]
    fn test_jump_edge_tracks_up_key() {
        let mut tracker = InputTracker::new();
        let up = RawKeys { up: true, ..Default::default() };

        assert!(tracker.snapshot(&up).jump_pressed);
        assert!(!tracker.snapshot(&up).jump_pressed);
        assert!(tracker.snapshot(&up).up);
    }

    #[test]
    fn test_directions_pass_through() {
        let mut tracker = InputTracker::new();
        let keys = RawKeys { left: true, right: true, ..Default::default() };
        let state = tracker.snapshot(&keys);
        assert!(state.left);
        assert!(state.right);
        assert!(!state.fire_held);
    }
}
