//! Response drafting: deterministic template substitution.

use serde::{Deserialize, Serialize};

use crate::crisis::CrisisEvent;

/// Where a response email is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftState {
    Drafting,
    Ready,
    Sent,
    SendFailed,
}

/// A response email addressed to the crisis sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub recipient: String,
    pub subject: String,
    pub content: String,
    pub state: DraftState,
}

impl EmailDraft {
    /// An empty draft replying to `crisis`.
    #[must_use]
    pub fn for_crisis(crisis: &CrisisEvent) -> Self {
        Self {
            recipient: crisis.sender.clone(),
            subject: format!("Re: {}", crisis.subject),
            content: String::new(),
            state: DraftState::Drafting,
        }
    }
}

struct Template {
    crisis_type: Option<&'static str>,
    fallback_name: &'static str,
    intro: &'static str,
    actions_heading: &'static str,
    actions: &'static [&'static str],
    closing: &'static str,
    signature: &'static str,
}

const TEMPLATES: &[Template] = &[
    Template {
        crisis_type: Some("Staff Resignation"),
        fallback_name: "Team Member",
        intro: "Thank you for your notice. We understand and respect your decision.",
        actions_heading: "We have already initiated our emergency staffing protocol:",
        actions: &[
            "Posted urgent job listings to multiple platforms",
            "Contacted our staffing agency partners",
            "Adjusted schedules to ensure coverage",
            "Notified the management team",
        ],
        closing: concat!(
            "Please coordinate with HR for your final paperwork and any handover requirements.",
            "\n\nWe wish you the very best in your future endeavors.",
        ),
        signature: "Warm regards,\nBrew AI Management System",
    },
    Template {
        crisis_type: Some("Equipment Failure"),
        fallback_name: "Team",
        intro: "Thank you for reporting this equipment issue promptly.",
        actions_heading: "We have taken immediate action:",
        actions: &[
            "Created an emergency repair ticket",
            "Contacted our equipment service provider",
            "Technician dispatched - ETA: 2 hours",
            "Adjusted menu to work around the issue",
            "Notified kitchen staff",
        ],
        closing: "Please monitor the situation and report any changes.",
        signature: "Best regards,\nBrew AI Maintenance System",
    },
];

const GENERIC: Template = Template {
    crisis_type: None,
    fallback_name: "Team",
    intro: "Your message has been received and processed by our AI monitoring system.",
    actions_heading: "We have initiated the following automated responses:",
    actions: &[
        "Relevant team members have been notified",
        "Appropriate corrective actions are underway",
        "Management has been briefed on the situation",
    ],
    closing: "Our team will follow up with you shortly.",
    signature: "Best regards,\nBrew AI System",
};

/// Turns a [`CrisisEvent`] into response content.
///
/// Pure: the same crisis always produces byte-identical output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseDrafter;

impl ResponseDrafter {
    #[must_use]
    pub fn draft(&self, crisis: &CrisisEvent) -> String {
        let template = TEMPLATES
            .iter()
            .find(|t| t.crisis_type == Some(crisis.crisis_type.as_str()))
            .unwrap_or(&GENERIC);

        let name = sender_display_name(&crisis.sender).unwrap_or(template.fallback_name);
        let bullets = template
            .actions
            .iter()
            .map(|action| format!("• {action}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Dear {name},\n\n{intro}\n\n{heading}\n{bullets}\n\n{closing}\n\n{signature}",
            intro = template.intro,
            heading = template.actions_heading,
            closing = template.closing,
            signature = template.signature,
        )
    }
}

/// The display part of a sender field: text before `<`, or the whole field.
///
/// Returns `None` when nothing printable remains.
#[must_use]
pub fn sender_display_name(sender: &str) -> Option<&str> {
    let name = sender.split('<').next().unwrap_or_default().trim();
    (!name.is_empty()).then_some(name)
}
