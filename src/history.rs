use crate::mode::GameMode;
use crate::stats::{is_personal_best, SessionStats};
use chrono::Local;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// One row of the session history log.
#[derive(Debug, Serialize)]
struct SessionRecord {
    date: String,
    mode: String,
    rounds: usize,
    average_ms: f64,
    best_ms: f64,
    worst_ms: f64,
    median_ms: f64,
    std_dev_ms: f64,
    consistency: f64,
    false_starts: usize,
}

/// Append-only CSV log of completed sessions, one row per session.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "reflx") {
            pd.config_dir().join("history.csv")
        } else {
            PathBuf::from("reflx_history.csv")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, mode: GameMode, stats: &SessionStats) -> csv::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        writer.serialize(SessionRecord {
            date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            mode: mode.key(),
            rounds: stats.valid_rounds,
            average_ms: (stats.average * 100.0).round() / 100.0,
            best_ms: stats.best,
            worst_ms: stats.worst,
            median_ms: stats.median,
            std_dev_ms: (stats.standard_deviation * 100.0).round() / 100.0,
            consistency: (stats.consistency_score * 100.0).round() / 100.0,
            false_starts: stats.false_starts,
        })?;
        writer.flush()?;

        Ok(())
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Player profile persisted across sessions. The game core never
/// touches this; the app layer updates it when a session completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub personal_best_ms: Option<f64>,
    pub total_sessions: u64,
    pub total_rounds: u64,
    pub total_false_starts: u64,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            personal_best_ms: None,
            total_sessions: 0,
            total_rounds: 0,
            total_false_starts: 0,
        }
    }
}

impl Profile {
    /// Fold a completed session into the profile. Returns true when the
    /// session's best time set a new personal best.
    pub fn record_session(&mut self, stats: &SessionStats) -> bool {
        self.total_sessions += 1;
        self.total_rounds += stats.total_rounds as u64;
        self.total_false_starts += stats.false_starts as u64;

        // an all-false-start session has best 0; never a PB
        if stats.valid_rounds > 0 && is_personal_best(stats.best, self.personal_best_ms) {
            self.personal_best_ms = Some(stats.best);
            return true;
        }
        false
    }
}

/// JSON-file-backed profile storage.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "reflx") {
            pd.config_dir().join("profile.json")
        } else {
            PathBuf::from("reflx_profile.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self) -> Profile {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(profile) = serde_json::from_slice::<Profile>(&bytes) {
                return profile;
            }
        }
        Profile::default()
    }

    pub fn save(&self, profile: &Profile) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(profile).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::session_stats;
    use crate::game::RoundOutcome;
    use tempfile::tempdir;

    fn sample_stats() -> SessionStats {
        session_stats(&[
            RoundOutcome::valid(1, 200),
            RoundOutcome::false_start(2),
            RoundOutcome::valid(2, 180),
            RoundOutcome::valid(3, 220),
        ])
    }

    #[test]
    fn history_append_writes_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let log = HistoryLog::with_path(&path);

        log.append(GameMode::Standard, &sample_stats()).unwrap();
        log.append(GameMode::Expert, &sample_stats()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,mode,rounds,average_ms"));
        assert!(lines[1].contains(",standard,"));
        assert!(lines[2].contains(",expert,"));
    }

    #[test]
    fn profile_roundtrip() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::with_path(dir.path().join("profile.json"));

        let mut profile = Profile::default();
        profile.record_session(&sample_stats());
        store.save(&profile).unwrap();

        assert_eq!(store.load(), profile);
    }

    #[test]
    fn missing_profile_loads_default() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Profile::default());
    }

    #[test]
    fn corrupt_profile_loads_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = ProfileStore::with_path(&path);
        assert_eq!(store.load(), Profile::default());
    }

    #[test]
    fn record_session_tracks_personal_best() {
        let mut profile = Profile::default();

        let first = session_stats(&[RoundOutcome::valid(1, 250)]);
        assert!(profile.record_session(&first));
        assert_eq!(profile.personal_best_ms, Some(250.0));

        let slower = session_stats(&[RoundOutcome::valid(1, 300)]);
        assert!(!profile.record_session(&slower));
        assert_eq!(profile.personal_best_ms, Some(250.0));

        let faster = session_stats(&[RoundOutcome::valid(1, 190)]);
        assert!(profile.record_session(&faster));
        assert_eq!(profile.personal_best_ms, Some(190.0));

        assert_eq!(profile.total_sessions, 3);
        assert_eq!(profile.total_rounds, 3);
    }

    #[test]
    fn all_false_start_session_is_never_a_personal_best() {
        let mut profile = Profile::default();
        let stats = session_stats(&[
            RoundOutcome::false_start(1),
            RoundOutcome::false_start(1),
        ]);
        assert!(!profile.record_session(&stats));
        assert_eq!(profile.personal_best_ms, None);
        assert_eq!(profile.total_false_starts, 2);
    }
}
