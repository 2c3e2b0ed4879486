use std::path::PathBuf;

/// Runtime configuration, loaded from `ROSTRO_*` environment variables.
pub struct Config {
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Path to the cascade model file.
    pub model_path: PathBuf,
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
    /// Requested interval between video ticks, in milliseconds.
    pub tick_interval_ms: u64,
    /// Frames discarded after opening the camera (AGC stabilization).
    pub warmup_frames: usize,
    /// Ticks a demo-menu recognition run lasts before returning to the menu.
    pub demo_frames: u64,
    /// Optional matcher distance ceiling; unset keeps closest-always-wins.
    pub max_distance: Option<f32>,
}

impl Config {
    /// Load configuration from `ROSTRO_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let model_path = std::env::var("ROSTRO_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| rostro_core::default_model_path());

        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".local/share")
            })
            .join("rostro");

        let db_path = std::env::var("ROSTRO_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("facial_data.db"));

        Self {
            camera_device: std::env::var("ROSTRO_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            model_path,
            db_path,
            tick_interval_ms: env_u64("ROSTRO_TICK_INTERVAL_MS", 10),
            warmup_frames: env_usize("ROSTRO_WARMUP_FRAMES", 4),
            demo_frames: env_u64("ROSTRO_DEMO_FRAMES", 300),
            max_distance: env_f32_opt("ROSTRO_MAX_DISTANCE"),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_f32_opt(key: &str) -> Option<f32> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
