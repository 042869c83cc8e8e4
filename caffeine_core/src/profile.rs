//! User profile persistence.
//!
//! Every setter persists immediately. Writers hold an exclusive lock on a
//! sidecar `.lock` file from load to atomic save, so concurrent setters each
//! see the other's change. A missing or corrupted profile file loads as the
//! default profile.

use crate::{Error, Result, SensitivityLevel, UserProfile, WeightUnit};
use chrono::NaiveTime;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Owner of the single user profile
///
/// Setters validate their input, then persist through [`ProfileStore::update`].
pub trait ProfileStore {
    fn profile(&self) -> Result<UserProfile>;

    fn update<F>(&mut self, f: F) -> Result<UserProfile>
    where
        F: FnOnce(&mut UserProfile) -> Result<()>;

    fn set_weight(&mut self, value: Option<f64>, unit: WeightUnit) -> Result<UserProfile> {
        if let Some(v) = value {
            validate_positive("weight", v)?;
        }
        self.update(|p| {
            p.weight_value = value;
            p.weight_unit = unit;
            Ok(())
        })
    }

    fn set_height(&mut self, value: Option<f64>) -> Result<UserProfile> {
        if let Some(v) = value {
            validate_positive("height", v)?;
        }
        self.update(|p| {
            p.height_value = value;
            Ok(())
        })
    }

    fn set_bedtime(&mut self, bedtime: NaiveTime) -> Result<UserProfile> {
        self.update(|p| {
            p.bedtime = bedtime;
            Ok(())
        })
    }

    fn set_sensitivity(&mut self, level: SensitivityLevel) -> Result<UserProfile> {
        self.update(|p| {
            p.sensitivity_level = level;
            Ok(())
        })
    }

    fn set_use_weight_based_hints(&mut self, enabled: bool) -> Result<UserProfile> {
        self.update(|p| {
            p.use_weight_based_hints = enabled;
            Ok(())
        })
    }
}

/// JSON file-backed profile store
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }
}

impl ProfileStore for JsonProfileStore {
    fn profile(&self) -> Result<UserProfile> {
        Ok(load_profile(&self.path))
    }

    fn update<F>(&mut self, f: F) -> Result<UserProfile>
    where
        F: FnOnce(&mut UserProfile) -> Result<()>,
    {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;

        let mut profile = load_profile(&self.path);
        let saved = f(&mut profile)
            .and_then(|()| save_profile(&self.path, &profile))
            .map(|()| profile);

        lock.unlock()?;
        saved
    }
}

/// In-memory profile store, for tests and embedding
#[derive(Clone, Debug, Default)]
pub struct MemoryProfileStore {
    profile: UserProfile,
}

impl MemoryProfileStore {
    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }
}

impl ProfileStore for MemoryProfileStore {
    fn profile(&self) -> Result<UserProfile> {
        Ok(self.profile.clone())
    }

    fn update<F>(&mut self, f: F) -> Result<UserProfile>
    where
        F: FnOnce(&mut UserProfile) -> Result<()>,
    {
        let mut next = self.profile.clone();
        f(&mut next)?;
        self.profile = next;
        Ok(self.profile.clone())
    }
}

/// Check that a body measurement is a positive finite number
pub fn validate_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "{} must be a positive number, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Load the profile, treating a missing, unreadable or corrupt file as the default
fn load_profile(path: &Path) -> UserProfile {
    if !path.exists() {
        tracing::info!("No profile file found, using default profile");
        return UserProfile::default();
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Unable to open profile {:?}: {}. Using defaults.", path, e);
            return UserProfile::default();
        }
    };

    if let Err(e) = file.lock_shared() {
        tracing::warn!("Unable to lock profile {:?}: {}. Using defaults.", path, e);
        return UserProfile::default();
    }

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    let _ = file.unlock();
    if let Err(e) = read {
        tracing::warn!("Failed to read profile {:?}: {}. Using defaults.", path, e);
        return UserProfile::default();
    }

    serde_json::from_str::<UserProfile>(&contents).unwrap_or_else(|e| {
        tracing::warn!("Failed to parse profile {:?}: {}. Using defaults.", path, e);
        UserProfile::default()
    })
}

/// Atomically replace the profile file with pretty JSON
fn save_profile(path: &Path, profile: &UserProfile) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "profile path missing parent")
    })?;
    let temp = NamedTempFile::new_in(parent)?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string_pretty(profile)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Saved profile to {:?}", path);
    Ok(())
}
