use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Acceleration cuts for detection and severity, in m/s². All
/// comparisons against them are strict greater-than.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionThresholds {
    /// Minimum magnitude before a sample is considered at all.
    #[serde(default = "default_candidate_mps2")]
    pub candidate_mps2: f64,
    /// Above this a candidate is at least `Medium`.
    #[serde(default = "default_medium_mps2")]
    pub medium_mps2: f64,
    /// Above this a candidate is `High`.
    #[serde(default = "default_high_mps2")]
    pub high_mps2: f64,
}

fn default_candidate_mps2() -> f64 {
    15.0
}

fn default_medium_mps2() -> f64 {
    20.0
}

fn default_high_mps2() -> f64 {
    25.0
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            candidate_mps2: default_candidate_mps2(),
            medium_mps2: default_medium_mps2(),
            high_mps2: default_high_mps2(),
        }
    }
}

/// Session behavior that is policy rather than physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPolicy {
    /// Keep low-severity candidates in the session's diagnostic list
    /// instead of dropping them outright.
    #[serde(default)]
    pub keep_low_severity: bool,
    /// Spoken word that confirms the latest pending event.
    #[serde(default = "default_voice_keyword")]
    pub voice_keyword: String,
    /// How long after a detection the keyword still counts, in seconds.
    #[serde(default = "default_voice_window_secs")]
    pub voice_window_secs: f64,
}

fn default_voice_keyword() -> String {
    "pothole".to_string()
}

fn default_voice_window_secs() -> f64 {
    5.0
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            keep_low_severity: false,
            voice_keyword: default_voice_keyword(),
            voice_window_secs: default_voice_window_secs(),
        }
    }
}

/// A named bundle of thresholds and policy. Profiles load from JSON so
/// deployments can tune detection without a rebuild; omitted fields
/// fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thresholds: DetectionThresholds,
    #[serde(default)]
    pub policy: SessionPolicy,
}

impl Default for DetectionProfile {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            name: "Default".to_string(),
            description: "Built-in fixed thresholds".to_string(),
            thresholds: DetectionThresholds::default(),
            policy: SessionPolicy::default(),
        }
    }
}

impl DetectionProfile {
    /// Rejects profiles whose numbers cannot classify coherently.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if !(t.candidate_mps2 > 0.0) {
            bail!("Profile {:?}: candidate threshold must be positive", self.id);
        }
        if !(t.candidate_mps2 < t.medium_mps2 && t.medium_mps2 < t.high_mps2) {
            bail!(
                "Profile {:?}: thresholds must be strictly increasing (got {} / {} / {})",
                self.id,
                t.candidate_mps2,
                t.medium_mps2,
                t.high_mps2
            );
        }
        if self.policy.voice_keyword.trim().is_empty() {
            bail!("Profile {:?}: voice keyword must not be empty", self.id);
        }
        if !(self.policy.voice_window_secs > 0.0) {
            bail!("Profile {:?}: voice window must be positive", self.id);
        }
        Ok(())
    }
}

/// All profiles known to the app, keyed by id. The built-in default is
/// always present and can be shadowed by a loaded profile with id
/// `"default"`.
pub struct ProfileStore {
    profiles: HashMap<String, DetectionProfile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        let default = DetectionProfile::default();
        let mut profiles = HashMap::new();
        profiles.insert(default.id.clone(), default);
        Self { profiles }
    }

    /// Load every `*.json` profile in a directory.
    pub fn load_profiles_from_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read profiles directory: {:?}", dir))?;

        let mut loaded = 0;
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to list profiles directory: {:?}", dir))?
                .path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read profile: {:?}", path))?;
                self.load_profile(&content)
                    .with_context(|| format!("Failed to load profile: {:?}", path))?;
                loaded += 1;
            }
        }

        info!("loaded {} detection profile(s) from {:?}", loaded, dir);
        Ok(loaded)
    }

    /// Load a single profile from a JSON string.
    pub fn load_profile(&mut self, json: &str) -> Result<()> {
        let profile: DetectionProfile =
            serde_json::from_str(json).context("Failed to parse profile JSON")?;
        profile.validate()?;
        self.profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&DetectionProfile> {
        self.profiles.get(id)
    }

    pub fn profiles(&self) -> Vec<&DetectionProfile> {
        self.profiles.values().collect()
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}
