//! Crisis events as reported by the detection collaborator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How urgent a crisis is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        })
    }
}

impl FromStr for Severity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(ValidationError::UnknownSeverity(s.to_string())),
        }
    }
}

/// A detected condition requiring an ordered set of remediation automations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisEvent {
    /// Crisis category, e.g. `"Staff Resignation"`. Selects the response template.
    #[serde(rename = "type")]
    pub crisis_type: String,
    pub severity: Severity,
    /// Raw sender field, e.g. `"Jane Doe <jane@example.com>"`.
    pub sender: String,
    pub subject: String,
    /// The keyword that made the detector flag the message.
    pub trigger_keyword: String,
    /// Automations to run, in execution order.
    pub automation_keys: Vec<String>,
}

impl CrisisEvent {
    /// Number of automations reported in the run summary: the requested ones
    /// plus drafting and dispatch.
    #[must_use]
    pub fn reported_automation_count(&self) -> usize {
        self.automation_keys.len() + 2
    }
}

/// Result of one detection call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionOutcome {
    pub emails_checked: u32,
    pub crisis: Option<CrisisEvent>,
}

impl DetectionOutcome {
    #[must_use]
    pub fn clear(emails_checked: u32) -> Self {
        Self {
            emails_checked,
            crisis: None,
        }
    }

    #[must_use]
    pub fn detected(emails_checked: u32, crisis: CrisisEvent) -> Self {
        Self {
            emails_checked,
            crisis: Some(crisis),
        }
    }

    #[must_use]
    pub fn is_detected(&self) -> bool {
        self.crisis.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resignation() -> CrisisEvent {
        CrisisEvent {
            crisis_type: "Staff Resignation".to_string(),
            severity: Severity::High,
            sender: "Jane Doe <jane@example.com>".to_string(),
            subject: "My two weeks notice".to_string(),
            trigger_keyword: "resign".to_string(),
            automation_keys: vec![
                "emergency_hiring".to_string(),
                "schedule_adjustment".to_string(),
            ],
        }
    }

    #[test]
    fn should_count_draft_and_dispatch_in_reported_total() {
        assert_eq!(resignation().reported_automation_count(), 4);
    }

    #[test]
    fn should_parse_severity_case_insensitively() {
        assert_eq!("high".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!(" Medium ".parse::<Severity>().unwrap(), Severity::Medium);
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn should_order_severities_from_low_to_high() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn should_serialize_crisis_type_as_type_field() {
        let json = serde_json::to_value(resignation()).unwrap();
        assert_eq!(json["type"], "Staff Resignation");
        assert_eq!(json["severity"], "HIGH");
    }

    #[test]
    fn should_report_detection_state() {
        assert!(!DetectionOutcome::clear(3).is_detected());
        assert!(DetectionOutcome::detected(3, resignation()).is_detected());
    }
}
