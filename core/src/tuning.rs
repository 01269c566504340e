use serde::Deserialize;

/// Gameplay constants shared by the world and its systems.
///
/// Every field has a default, so configuration files only need to name the
/// values they change. Distances are in pixels, speeds in pixels per second
/// and durations in seconds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Width of the visible play area.
    pub screen_width: f32,
    /// Height of the visible play area.
    pub screen_height: f32,
    /// Width of a single grid cell.
    pub tile_width: f32,
    /// Height of a single grid cell.
    pub tile_height: f32,
    /// Downward acceleration applied to airborne robots.
    pub gravity: f32,
    /// Horizontal robot speed.
    pub run_speed: f32,
    /// Magnitude of the upward launch velocity applied when jumping.
    pub jump_velocity: f32,
    /// Magnitude of the upward velocity applied after stomping a crawler.
    pub stomp_bounce: f32,
    /// Magnitude of the upward velocity applied when the robot dies.
    pub death_bounce: f32,
    /// Left edge of the robot at spawn.
    pub spawn_x: f32,
    /// Feet of the robot at spawn.
    pub spawn_bottom: f32,
    /// Lives the robot starts with.
    pub starting_lives: u32,
    /// Grace period after resurrection during which nothing can hurt the robot.
    pub invulnerability: f32,
    /// Base crawler walking speed before the per-walk scale is applied.
    pub crawler_speed: f32,
    /// Points awarded for a coin.
    pub coin_points: u32,
    /// Points awarded for a stomp.
    pub stomp_points: u32,
    /// Score interval that awards an extra life; zero disables extra lives.
    pub extra_life_every: u32,
    /// Frames a collected coin lingers before it is removed.
    pub coin_pickup_frames: u32,
    /// Falling speed of meteors.
    pub meteor_speed: f32,
    /// Horizontal position the robot must pass in the final scene.
    pub flagpole_x: f32,
    /// Index of the scene in which meteors fall.
    pub meteor_scene: u32,
    /// Seed for every deterministic random stream.
    pub seed: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            screen_width: 640.0,
            screen_height: 480.0,
            tile_width: 32.0,
            tile_height: 32.0,
            gravity: 2000.0,
            run_speed: 200.0,
            jump_velocity: 850.0,
            stomp_bounce: 400.0,
            death_bounce: 400.0,
            spawn_x: 40.0,
            spawn_bottom: 448.0,
            starting_lives: 5,
            invulnerability: 1.5,
            crawler_speed: 60.0,
            coin_points: 10,
            stomp_points: 50,
            extra_life_every: 1000,
            coin_pickup_frames: 5,
            meteor_speed: 200.0,
            flagpole_x: 560.0,
            meteor_scene: 1,
            seed: 0x5eed_0f_70b0_7a11,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Tuning;

    #[test]
    fn partial_tables_fall_back_to_defaults() {
        let tuning: Tuning = toml::from_str("gravity = 1500.0\nstarting_lives = 3\n")
            .expect("valid tuning table");

        assert_eq!(tuning.gravity, 1500.0);
        assert_eq!(tuning.starting_lives, 3);
        assert_eq!(tuning.run_speed, Tuning::default().run_speed);
    }
}
