//! Keyword rules mapping message text to a crisis.

use crisiswatch_domain::crisis::{CrisisEvent, Severity};

/// One trigger keyword and the crisis it signals.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub keyword: &'static str,
    pub crisis_type: &'static str,
    pub severity: Severity,
    pub automations: &'static [&'static str],
}

const RESIGNATION: &[&str] = &[
    "emergency_hiring",
    "schedule_adjustment",
    "staff_alert",
    "manager_notification",
    "payroll_update",
    "access_revocation",
    "exit_documentation",
    "post_job_website",
];

/// Built-in restaurant-operations rules.
pub const RULES: &[KeywordRule] = &[
    KeywordRule {
        keyword: "resign",
        crisis_type: "Staff Resignation",
        severity: Severity::High,
        automations: RESIGNATION,
    },
    KeywordRule {
        keyword: "quit",
        crisis_type: "Staff Resignation",
        severity: Severity::High,
        automations: RESIGNATION,
    },
    KeywordRule {
        keyword: "leaving",
        crisis_type: "Staff Departure",
        severity: Severity::Medium,
        automations: &[
            "schedule_adjustment",
            "manager_notification",
            "staffing_forecast",
            "post_job_website",
        ],
    },
    KeywordRule {
        keyword: "sick",
        crisis_type: "Staff Shortage",
        severity: Severity::Medium,
        automations: &[
            "schedule_adjustment",
            "staff_alert",
            "shift_coverage_request",
            "manager_notification",
        ],
    },
    KeywordRule {
        keyword: "emergency",
        crisis_type: "General Emergency",
        severity: Severity::High,
        automations: &[
            "staff_alert",
            "manager_notification",
            "emergency_protocol",
            "safety_check",
            "incident_report",
            "emergency_contacts",
        ],
    },
    KeywordRule {
        keyword: "broken",
        crisis_type: "Equipment Failure",
        severity: Severity::High,
        automations: &[
            "equipment_repair_request",
            "menu_adjustment",
            "manager_notification",
            "vendor_contact",
            "warranty_check",
            "safety_lockout",
        ],
    },
    KeywordRule {
        keyword: "malfunction",
        crisis_type: "Equipment Failure",
        severity: Severity::High,
        automations: &[
            "equipment_repair_request",
            "vendor_contact",
            "menu_adjustment",
            "tech_dispatch",
        ],
    },
    KeywordRule {
        keyword: "delay",
        crisis_type: "Supply Chain Issue",
        severity: Severity::Medium,
        automations: &[
            "emergency_supplier_order",
            "menu_adjustment",
            "backup_vendor_search",
            "inventory_reallocation",
        ],
    },
    KeywordRule {
        keyword: "shortage",
        crisis_type: "Inventory Emergency",
        severity: Severity::High,
        automations: &[
            "emergency_supplier_order",
            "menu_adjustment",
            "backup_vendor_search",
            "inventory_alert",
            "pos_menu_update",
            "delivery_prioritization",
        ],
    },
    KeywordRule {
        keyword: "complaint",
        crisis_type: "Customer Issue",
        severity: Severity::Medium,
        automations: &[
            "customer_response",
            "manager_notification",
            "service_recovery",
            "quality_review",
        ],
    },
    KeywordRule {
        keyword: "inspection",
        crisis_type: "Health Inspection",
        severity: Severity::High,
        automations: &[
            "compliance_check",
            "staff_briefing",
            "documentation_prep",
            "cleaning_protocol",
            "temp_log_review",
            "manager_notification",
        ],
    },
    KeywordRule {
        keyword: "violation",
        crisis_type: "Compliance Issue",
        severity: Severity::High,
        automations: &[
            "compliance_check",
            "corrective_action",
            "documentation_update",
            "staff_retraining",
            "manager_notification",
        ],
    },
    KeywordRule {
        keyword: "fire",
        crisis_type: "Fire Emergency",
        severity: Severity::High,
        automations: &[
            "emergency_protocol",
            "emergency_contacts",
            "staff_alert",
            "manager_notification",
            "incident_report",
            "insurance_notification",
        ],
    },
];

/// Match `subject` and `body` against `rules`.
///
/// The most severe matching rule wins; among equally severe rules the first
/// one listed wins. Matching is case-insensitive substring search.
#[must_use]
pub fn analyze(
    rules: &[KeywordRule],
    sender: &str,
    subject: &str,
    body: &str,
) -> Option<CrisisEvent> {
    let text = format!("{subject} {body}").to_lowercase();
    let mut best: Option<&KeywordRule> = None;
    for rule in rules.iter().filter(|rule| text.contains(rule.keyword)) {
        if best.is_none_or(|current| rule.severity > current.severity) {
            best = Some(rule);
        }
    }
    best.map(|rule| CrisisEvent {
        crisis_type: rule.crisis_type.to_string(),
        severity: rule.severity,
        sender: sender.to_string(),
        subject: subject.to_string(),
        trigger_keyword: rule.keyword.to_string(),
        automation_keys: rule.automations.iter().map(ToString::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_detect_resignation_from_subject() {
        let crisis = analyze(RULES, "Jane <jane@x.io>", "I resign", "").unwrap();
        assert_eq!(crisis.crisis_type, "Staff Resignation");
        assert_eq!(crisis.trigger_keyword, "resign");
        assert_eq!(crisis.automation_keys.len(), 8);
    }

    #[test]
    fn should_prefer_higher_severity_when_several_keywords_match() {
        let crisis = analyze(
            RULES,
            "ops@x.io",
            "Delivery delay",
            "Also the fryer is BROKEN",
        )
        .unwrap();
        assert_eq!(crisis.crisis_type, "Equipment Failure");
        assert_eq!(crisis.severity, Severity::High);
    }

    #[test]
    fn should_keep_first_rule_when_severities_tie() {
        let crisis = analyze(RULES, "a@b.c", "emergency: fire in the kitchen", "").unwrap();
        assert_eq!(crisis.trigger_keyword, "emergency");
    }

    #[test]
    fn should_return_none_for_routine_message() {
        assert!(analyze(RULES, "a@b.c", "Weekly menu", "See attached").is_none());
    }
}
