use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use error_chain::bail;
use log::warn;
use url::form_urlencoded;

use crate::errors::*;
use crate::navigator::MotionSpeeds;
use crate::scheduler::{FrameScheduler, DEFAULT_TARGET_FPS};
use crate::units::GridSize;

pub const DEFAULT_MAZE_SIZE: usize = 20;
pub const DEFAULT_RESTART_DELAY_MS: u64 = 1000;

/// Texture names a renderer applies to the maze surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceTextures {
    pub wall: String,
    pub floor: String,
    pub ceiling: String,
}

impl Default for SurfaceTextures {
    fn default() -> SurfaceTextures {
        SurfaceTextures {
            wall: String::from("brick"),
            floor: String::from("wood"),
            ceiling: String::from("ceiling"),
        }
    }
}

/// Everything the screensaver can be configured with.
#[derive(Debug, Clone, PartialEq)]
pub struct MazeSettings {
    pub size: usize,
    /// Base speeds before the speed multiplier is applied.
    pub base_speeds: MotionSpeeds,
    pub speed_multiplier: f32,
    pub target_fps: u32,
    pub restart_delay: Duration,
    pub textures: SurfaceTextures,
    /// Report ticks per second while running.
    pub debug: bool,
}

impl Default for MazeSettings {
    fn default() -> MazeSettings {
        MazeSettings {
            size: DEFAULT_MAZE_SIZE,
            base_speeds: MotionSpeeds::default(),
            speed_multiplier: 1.0,
            target_fps: DEFAULT_TARGET_FPS,
            restart_delay: Duration::from_millis(DEFAULT_RESTART_DELAY_MS),
            textures: SurfaceTextures::default(),
            debug: false,
        }
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim()
        .parse::<T>()
        .map_err(|_| ErrorKind::InvalidConfiguration(format!("{}={} is not a valid number", key, value)).into())
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "" | "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" => Ok(false),
        _ => Err(ErrorKind::InvalidConfiguration(format!("{}={} is not true or false", key, value)).into()),
    }
}

impl MazeSettings {
    /// Settings from a browser source style query such as `?size=20&speed=1&wall=brick`,
    /// starting from the defaults. Keys and values are form url decoded.
    pub fn from_query(query: &str) -> Result<MazeSettings> {
        let mut settings = MazeSettings::default();
        settings.apply_query(query)?;
        Ok(settings)
    }

    /// Overwrite the settings named in `query`, leaving the rest alone.
    pub fn apply_query(&mut self, query: &str) -> Result<()> {
        let query = query.trim().trim_start_matches('?');

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "size" => self.size = parse_number(key, value)?,
                "speed" => self.speed_multiplier = parse_number(key, value)?,
                "fps" => self.target_fps = parse_number(key, value)?,
                "wall" => self.textures.wall = value.to_string(),
                "floor" => self.textures.floor = value.to_string(),
                "ceiling" => self.textures.ceiling = value.to_string(),
                "debug" => self.debug = parse_flag(key, value)?,
                _ => warn!("Ignoring unknown maze setting {}={}", key, value),
            }
        }
        Ok(())
    }

    /// The form url encoded query that reproduces these settings. `fps` and `debug` are only
    /// added when they differ from the defaults. The base speeds and restart delay are not
    /// part of the query.
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("size", &self.size.to_string())
             .append_pair("speed", &self.speed_multiplier.to_string())
             .append_pair("wall", &self.textures.wall)
             .append_pair("floor", &self.textures.floor)
             .append_pair("ceiling", &self.textures.ceiling);
        if self.target_fps != DEFAULT_TARGET_FPS {
            query.append_pair("fps", &self.target_fps.to_string());
        }
        if self.debug {
            query.append_pair("debug", "true");
        }
        query.finish()
    }

    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            bail!(ErrorKind::InvalidConfiguration("size must be at least 1".to_string()));
        }
        if self.size > u32::max_value() as usize {
            bail!(ErrorKind::InvalidConfiguration(format!("size {} is too large", self.size)));
        }
        if self.target_fps == 0 {
            bail!(ErrorKind::InvalidConfiguration("fps must be at least 1".to_string()));
        }
        let speeds = self.motion_speeds();
        let positive = |s: f32| s.is_finite() && s > 0.0;
        if !positive(speeds.move_speed) || !positive(speeds.turn_speed) {
            bail!(ErrorKind::InvalidConfiguration(format!("speeds must be finite and positive, got {:?} \
                                                           (multiplier {})",
                                                          speeds,
                                                          self.speed_multiplier)));
        }
        Ok(())
    }

    #[inline]
    pub fn grid_size(&self) -> GridSize {
        GridSize(self.size)
    }

    /// Base speeds scaled by the speed multiplier.
    pub fn motion_speeds(&self) -> MotionSpeeds {
        MotionSpeeds {
            move_speed: self.base_speeds.move_speed * self.speed_multiplier,
            turn_speed: self.base_speeds.turn_speed * self.speed_multiplier,
        }
    }

    #[inline]
    pub fn frame_scheduler(&self) -> FrameScheduler {
        FrameScheduler::new(self.target_fps)
    }
}

impl fmt::Display for MazeSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_query())
    }
}
