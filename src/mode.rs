use clap::ValueEnum;

/// Game difficulty presets. Each mode fixes the randomized
/// pre-stimulus delay window and the number of rounds per session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum GameMode {
    Beginner,
    Standard,
    Advanced,
    Expert,
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::Standard
    }
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Beginner,
        GameMode::Standard,
        GameMode::Advanced,
        GameMode::Expert,
    ];

    /// Lower bound of the randomized delay before the stimulus.
    pub fn min_delay_ms(&self) -> u64 {
        match self {
            GameMode::Beginner => 2000,
            GameMode::Standard => 1500,
            GameMode::Advanced => 1000,
            GameMode::Expert => 800,
        }
    }

    /// Upper bound of the randomized delay before the stimulus.
    pub fn max_delay_ms(&self) -> u64 {
        match self {
            GameMode::Beginner => 6000,
            GameMode::Standard => 5000,
            GameMode::Advanced => 4000,
            GameMode::Expert => 3000,
        }
    }

    /// Rounds per session. False-start retries do not count against
    /// this total.
    pub fn rounds(&self) -> u32 {
        match self {
            GameMode::Beginner => 5,
            GameMode::Standard => 5,
            GameMode::Advanced => 7,
            GameMode::Expert => 10,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GameMode::Beginner => "2-6 second delay, relaxed pace",
            GameMode::Standard => "1.5-5 second delay, the default",
            GameMode::Advanced => "1-4 second delay, 7 rounds",
            GameMode::Expert => "0.8-3 second delay, 10 rounds",
        }
    }

    /// Stable lowercase key used in config and history files.
    pub fn key(&self) -> String {
        self.to_string().to_lowercase()
    }

    /// Look up a mode by key. Unknown or missing keys fall back to
    /// Standard rather than failing the session.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "beginner" => GameMode::Beginner,
            "standard" => GameMode::Standard,
            "advanced" => GameMode::Advanced,
            "expert" => GameMode::Expert,
            _ => GameMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_windows_are_well_formed() {
        for mode in GameMode::ALL {
            assert!(mode.min_delay_ms() <= mode.max_delay_ms());
            assert!(mode.rounds() >= 1);
        }
    }

    #[test]
    fn test_key_roundtrip() {
        for mode in GameMode::ALL {
            assert_eq!(GameMode::from_key(&mode.key()), mode);
        }
    }

    #[test]
    fn test_unknown_key_falls_back_to_standard() {
        assert_eq!(GameMode::from_key("nightmare"), GameMode::Standard);
        assert_eq!(GameMode::from_key(""), GameMode::Standard);
        assert_eq!(GameMode::from_key("  Expert "), GameMode::Expert);
    }

    #[test]
    fn test_standard_window_matches_preset() {
        assert_eq!(GameMode::Standard.min_delay_ms(), 1500);
        assert_eq!(GameMode::Standard.max_delay_ms(), 5000);
        assert_eq!(GameMode::Standard.rounds(), 5);
    }

    #[test]
    fn test_expert_window_matches_preset() {
        assert_eq!(GameMode::Expert.min_delay_ms(), 800);
        assert_eq!(GameMode::Expert.max_delay_ms(), 3000);
        assert_eq!(GameMode::Expert.rounds(), 10);
    }
}
