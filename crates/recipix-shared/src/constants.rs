/// Maximum recipe title length in characters
pub const MAX_TITLE_LEN: usize = 100;

/// Maximum length of the free-text steps in characters
pub const MAX_STEPS_LEN: usize = 1000;

/// Maximum length of the notes attached to a rating
pub const MAX_NOTES_LEN: usize = 200;

/// Maximum ingredient unit length in characters
pub const MAX_UNIT_LEN: usize = 20;

/// Inclusive preparation time bounds, in minutes
pub const PREPARATION_TIME_RANGE: std::ops::RangeInclusive<i64> = 1..=1000;

/// Inclusive servings bounds
pub const SERVINGS_RANGE: std::ops::RangeInclusive<i64> = 1..=100;

/// Inclusive rating bounds
pub const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// File extensions accepted for recipe images
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Maximum image size in bytes (5 MiB)
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// Default HTTP API port
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// URL prefix under which stored images are served
pub const UPLOADS_PREFIX: &str = "uploads";
