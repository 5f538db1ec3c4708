use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use shared::SessionStatus;

/// Placeholder stored when the location is not known yet
pub const LOCATION_TO_BE_DEFINED: &str = "Local a Definir";

pub const DEFAULT_MAX_PARTICIPANTS: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledSession {
    pub id: String,
    pub title: String,
    pub subject_id: String,
    pub teacher_id: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub max_participants: u32,
    pub topics: Vec<String>,
    pub materials_needed: Option<String>,
    /// Stored status; see [`ScheduledSession::effective_status`]
    pub status: SessionStatus,
    pub file_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ScheduledSession {
    pub fn has_defined_location(&self) -> bool {
        let location = self.location.trim();
        !location.is_empty() && location != LOCATION_TO_BE_DEFINED
    }

    /// A session without a real location is always shown as pending
    pub fn effective_status(&self) -> SessionStatus {
        if self.has_defined_location() {
            self.status
        } else {
            SessionStatus::PendingLocation
        }
    }
}

pub fn normalize_location(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        LOCATION_TO_BE_DEFINED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// "a, b,, c " -> ["a", "b", "c"]
pub fn parse_topics(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts "HH:MM" and "HH:MM:SS", with an optional fractional part as
/// returned by some databases ("14:00:00.000")
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    let without_fraction = trimmed.split('.').next().unwrap_or(trimmed);
    NaiveTime::parse_from_str(without_fraction, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(without_fraction, "%H:%M"))
        .ok()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(location: &str) -> ScheduledSession {
        ScheduledSession {
            id: "s1".to_string(),
            title: "Cálculo I".to_string(),
            subject_id: "sub1".to_string(),
            teacher_id: None,
            date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            location: location.to_string(),
            max_participants: DEFAULT_MAX_PARTICIPANTS,
            topics: vec![],
            materials_needed: None,
            status: SessionStatus::Scheduled,
            file_url: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_effective_status_depends_on_location() {
        assert_eq!(session_at("Sala 101").effective_status(), SessionStatus::Scheduled);
        assert_eq!(
            session_at(LOCATION_TO_BE_DEFINED).effective_status(),
            SessionStatus::PendingLocation
        );
        assert_eq!(session_at("   ").effective_status(), SessionStatus::PendingLocation);
    }

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location("  "), LOCATION_TO_BE_DEFINED);
        assert_eq!(normalize_location(" Bloco B "), "Bloco B");
    }

    #[test]
    fn test_parse_topics_drops_blanks() {
        assert_eq!(
            parse_topics(" limites, derivadas,, integrais "),
            vec!["limites", "derivadas", "integrais"]
        );
        assert!(parse_topics("").is_empty());
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("14:00"), NaiveTime::from_hms_opt(14, 0, 0));
        assert_eq!(parse_time("09:30:00"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_time("09:30:00.000"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_time("nine"), None);
        assert_eq!(format_time(NaiveTime::from_hms_opt(9, 5, 0).unwrap()), "09:05");
    }
}
