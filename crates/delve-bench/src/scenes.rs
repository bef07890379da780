use glam::Vec3;

/// Camera altitude for every flight; above the highest possible terrain
/// with the default settings (base 8 + amplitude 12).
const FLIGHT_ALTITUDE: f32 = 28.0;

/// Configuration for a single benchmark flight.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub name: String,
    /// World units travelled along +X per frame.
    pub speed: f32,
    pub start: Vec3,
    /// Downward tilt of the camera in radians.
    pub pitch: f32,
}

impl SceneConfig {
    pub fn new(name: &str, speed: f32) -> Self {
        Self {
            name: name.to_string(),
            speed,
            start: Vec3::new(8.0, FLIGHT_ALTITUDE, 8.0),
            pitch: -0.35,
        }
    }
}

/// Hovering, cruising, and a flight fast enough to outrun the upload budget.
pub fn standard_scenes() -> Vec<SceneConfig> {
    vec![
        SceneConfig::new("hover", 0.0),
        SceneConfig::new("cruise", 1.5),
        SceneConfig::new("sprint", 6.0),
    ]
}

/// Single flight at a user-chosen speed.
pub fn custom_scene(speed: f32) -> SceneConfig {
    SceneConfig::new(&format!("custom-{speed}"), speed)
}
