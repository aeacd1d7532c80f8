//! Configuration constants for the trivia client
//!
//! This module contains the fixed game rules and the limits used to
//! validate tunable options, along with the keys under which state is
//! persisted locally.

/// Game rules for a single quiz
pub mod quiz {
    /// Number of questions played in every game
    pub const QUESTIONS_PER_GAME: usize = 10;
    /// Points awarded for each correct answer
    pub const POINTS_PER_QUESTION: u64 = 10;
    /// Bonus awarded once when every question is answered correctly
    pub const PERFECT_BONUS: u64 = 50;
    /// Time in milliseconds to answer a question
    pub const QUESTION_TIME_MS: u64 = 15_000;
    /// Interval in milliseconds between countdown ticks
    pub const TICK_MS: u64 = 100;
    /// Delay in milliseconds between resolving a question and presenting the next
    pub const FEEDBACK_DELAY_MS: u64 = 2_000;
    /// Minimum question time in seconds accepted by the options
    pub const MIN_QUESTION_TIME: u64 = 5;
    /// Maximum question time in seconds accepted by the options
    pub const MAX_QUESTION_TIME: u64 = 120;
    /// Minimum tick in milliseconds accepted by the options
    pub const MIN_TICK_MS: u64 = 10;
    /// Maximum tick in milliseconds accepted by the options
    pub const MAX_TICK_MS: u64 = 1_000;
    /// Maximum feedback delay in seconds accepted by the options
    pub const MAX_FEEDBACK_DELAY: u64 = 30;
}

/// Recently served question history
pub mod history {
    /// Maximum number of question identifiers remembered across games
    pub const MAX_RECENT: usize = 40;
    /// Upper bound accepted for a configured history limit
    pub const MAX_RECENT_LIMIT: usize = 500;
    /// Storage key of the persisted history
    pub const STORAGE_KEY: &str = "kambia_recent_questions";
}

/// Player identity
pub mod identity {
    /// Number of digits in a phone identifier
    pub const PHONE_LENGTH: usize = 9;
    /// Storage key of the last phone entered at login
    pub const STORAGE_KEY: &str = "kambia_last_phone";
}

/// Ranking projections
pub mod ranking {
    /// Number of entries shown on the home dashboard
    pub const DASHBOARD_LIMIT: usize = 10;
    /// Number of trailing digits left readable when masking a phone
    pub const VISIBLE_DIGITS: usize = 3;
}

/// Administrator messages
pub mod messages {
    /// Messages shown when the backend does not provide any
    pub const FALLBACK: [&str; 2] = [
        "Bienvenido al Trivial de Kambia.",
        "Responde correctamente para sumar puntos.",
    ];
    /// Text shown when the message list is empty
    pub const EMPTY: &str = "No hay mensajes.";
}

/// Backend service
pub mod backend {
    /// Default endpoint of the spreadsheet-backed service
    pub const DEFAULT_ENDPOINT: &str = "https://script.google.com/macros/s/AKfycbyvsBUGUrTNX7vJMVo4-QOdi7ahROI02y13_TGYKlb6JwTHXw_bivO8mqRmMxJfM4aEAg/exec";
    /// Maximum length accepted for a configured endpoint
    pub const MAX_ENDPOINT_LENGTH: usize = 2_048;
}

/// Application version tracking
pub mod version {
    /// Version of this build
    pub const CURRENT: &str = env!("CARGO_PKG_VERSION");
    /// Storage key of the last version that ran on this device
    pub const STORAGE_KEY: &str = "kambia_app_version";
}

/// Interstitial media
pub mod media {
    /// Maximum length of a clip source path
    pub const MAX_SOURCE_LENGTH: usize = 512;
}
