//! Record ID generation.
//!
//! Two shapes are in use: `"{unix_millis}-{6 alphanumeric}"` for
//! operationally-created records (finance operations, VM commands, notes)
//! and plain UUIDv4 strings for everything else.

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

/// Timestamp-prefixed ID with a short random suffix.
pub fn timestamped() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// UUIDv4 string ID.
pub fn uuid() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamped_ids_have_millis_and_suffix() {
        let id = timestamped();
        let (millis, suffix) = id.split_once('-').expect("dash separator");
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn timestamped_ids_are_distinct() {
        let a = timestamped();
        let b = timestamped();
        assert_ne!(a, b);
    }
}
