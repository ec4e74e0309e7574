//! Built-in restaurant-operations automations.

use super::{AutomationDefinition, DRAFT_RESPONSE_KEY, SEND_RESPONSE_KEY, StepTemplate};
use crate::id::AutomationId;

/// Pacing used for steps whose latency is not measured separately.
const STANDARD_STEP_MS: u64 = 600;

const NAMES: &[(u32, &str, &str)] = &[
    (1, "emergency_hiring", "Emergency Hiring"),
    (2, "schedule_adjustment", "Schedule Adjustment"),
    (3, "staff_alert", "Staff Alert"),
    (4, "manager_notification", "Manager Notification"),
    (5, DRAFT_RESPONSE_KEY, "Draft Response Email"),
    (6, SEND_RESPONSE_KEY, "Send Email Response"),
    (7, "emergency_supplier_order", "Emergency Supplier Order"),
    (8, "menu_adjustment", "Menu Adjustment"),
    (9, "inventory_check", "Inventory Check"),
    (10, "equipment_repair_request", "Equipment Repair Request"),
    (11, "compliance_check", "Compliance Check"),
    (12, "staff_briefing", "Staff Briefing"),
    (13, "customer_response", "Customer Response"),
    (14, "corrective_action", "Corrective Action"),
    (15, "weather_promotion", "Weather Promotion"),
    (16, "payroll_update", "Payroll Update"),
    (17, "access_revocation", "Access Revocation"),
    (18, "exit_documentation", "Exit Documentation"),
    (19, "staffing_forecast", "Staffing Forecast"),
    (20, "shift_coverage_request", "Shift Coverage Request"),
    (21, "emergency_protocol", "Emergency Protocol"),
    (22, "safety_check", "Safety Check"),
    (23, "incident_report", "Incident Report"),
    (24, "emergency_contacts", "Emergency Contacts"),
    (25, "vendor_contact", "Vendor Contact"),
    (26, "warranty_check", "Warranty Check"),
    (27, "safety_lockout", "Safety Lockout"),
    (28, "tech_dispatch", "Tech Dispatch"),
    (29, "backup_vendor_search", "Backup Vendor Search"),
    (30, "inventory_reallocation", "Inventory Reallocation"),
    (31, "inventory_alert", "Inventory Alert"),
    (32, "pos_menu_update", "POS Menu Update"),
    (33, "delivery_prioritization", "Delivery Prioritization"),
    (34, "service_recovery", "Service Recovery"),
    (35, "quality_review", "Quality Review"),
    (36, "documentation_prep", "Documentation Prep"),
    (37, "cleaning_protocol", "Cleaning Protocol"),
    (38, "temp_log_review", "Temp Log Review"),
    (39, "documentation_update", "Documentation Update"),
    (40, "staff_retraining", "Staff Retraining"),
];

type StepRow = (&'static str, &'static str, u64);

const STEPS: &[(&str, &[StepRow])] = &[
    (
        "emergency_hiring",
        &[
            ("Analyzing current staffing levels", "Checking staff database...", STANDARD_STEP_MS),
            (
                "Identifying immediate coverage needs",
                "Calculating shift coverage gaps...",
                STANDARD_STEP_MS,
            ),
            ("Generating job posting", "Drafting urgent job posting...", STANDARD_STEP_MS),
            (
                "Posting to job boards",
                "Publishing to Indeed, LinkedIn, ZipRecruiter...",
                STANDARD_STEP_MS,
            ),
            (
                "Contacting staffing agencies",
                "Sending urgent requests to 3 agencies...",
                STANDARD_STEP_MS,
            ),
            ("Notifying HR manager", "Sending notification email to HR...", STANDARD_STEP_MS),
        ],
    ),
    (
        "schedule_adjustment",
        &[
            ("Loading current schedule", "Fetching weekly schedule...", STANDARD_STEP_MS),
            (
                "Identifying available staff",
                "Checking staff availability database...",
                STANDARD_STEP_MS,
            ),
            (
                "Contacting available employees",
                "Sending SMS to 5 available staff members...",
                STANDARD_STEP_MS,
            ),
            ("Updating schedule", "Adjusting shift assignments...", STANDARD_STEP_MS),
            ("Sending notifications", "Notifying affected employees...", STANDARD_STEP_MS),
        ],
    ),
    (
        "staff_alert",
        &[
            ("Compiling alert message", "Creating urgent notification...", STANDARD_STEP_MS),
            ("Sending SMS alerts", "Broadcasting to all staff via SMS...", STANDARD_STEP_MS),
            ("Sending email alerts", "Sending email notifications...", STANDARD_STEP_MS),
            ("Updating announcement board", "Posting to digital signage...", STANDARD_STEP_MS),
        ],
    ),
    (
        "manager_notification",
        &[
            ("Preparing incident report", "Generating crisis summary...", STANDARD_STEP_MS),
            ("Calling manager", "Initiating phone call to manager...", STANDARD_STEP_MS),
            ("Sending detailed email", "Sending incident details via email...", STANDARD_STEP_MS),
        ],
    ),
    (
        "equipment_repair_request",
        &[
            ("Documenting equipment issue", "Creating repair ticket...", STANDARD_STEP_MS),
            ("Checking warranty status", "Verifying equipment warranty...", STANDARD_STEP_MS),
            (
                "Contacting repair service",
                "Submitting emergency repair request...",
                STANDARD_STEP_MS,
            ),
            ("Scheduling technician", "Technician ETA: 2 hours...", STANDARD_STEP_MS),
            (
                "Notifying kitchen staff",
                "Alerting team about equipment status...",
                STANDARD_STEP_MS,
            ),
        ],
    ),
    (
        "menu_adjustment",
        &[
            ("Analyzing affected menu items", "Checking menu dependencies...", STANDARD_STEP_MS),
            ("Disabling unavailable items", "Updating POS system...", STANDARD_STEP_MS),
            ("Updating online menu", "Syncing changes to website & apps...", STANDARD_STEP_MS),
            ("Notifying servers", "Sending menu update to floor staff...", STANDARD_STEP_MS),
        ],
    ),
    (
        "emergency_supplier_order",
        &[
            (
                "Calculating shortage quantities",
                "Analyzing inventory shortfall...",
                STANDARD_STEP_MS,
            ),
            ("Contacting primary supplier", "Placing emergency order...", STANDARD_STEP_MS),
            (
                "Finding backup suppliers",
                "Checking alternate vendor availability...",
                STANDARD_STEP_MS,
            ),
            ("Confirming delivery time", "Delivery ETA: 3 hours...", STANDARD_STEP_MS),
            ("Updating inventory system", "Recording pending delivery...", STANDARD_STEP_MS),
        ],
    ),
    (
        "compliance_check",
        &[
            (
                "Loading compliance checklist",
                "Fetching inspection requirements...",
                STANDARD_STEP_MS,
            ),
            ("Running automated checks", "Verifying 47 compliance items...", STANDARD_STEP_MS),
            ("Generating compliance report", "Creating detailed report...", STANDARD_STEP_MS),
            ("Flagging issues", "Identifying items needing attention...", STANDARD_STEP_MS),
            ("Assigning tasks", "Creating task assignments for team...", STANDARD_STEP_MS),
        ],
    ),
    (
        "payroll_update",
        &[
            ("Calculating final pay", "Computing remaining wages and PTO...", STANDARD_STEP_MS),
            ("Processing benefits", "Calculating benefits payout...", STANDARD_STEP_MS),
            ("Generating documents", "Creating final pay statement...", STANDARD_STEP_MS),
            ("Notifying accounting", "Sending to payroll department...", STANDARD_STEP_MS),
        ],
    ),
    (
        "access_revocation",
        &[
            ("Identifying access points", "Listing all system access...", STANDARD_STEP_MS),
            (
                "Scheduling revocation",
                "Setting up access removal for last day...",
                STANDARD_STEP_MS,
            ),
            ("Notifying IT", "Sending request to IT department...", STANDARD_STEP_MS),
            ("Creating checklist", "Generating offboarding checklist...", STANDARD_STEP_MS),
        ],
    ),
    (
        "exit_documentation",
        &[
            ("Generating exit interview", "Creating exit interview form...", STANDARD_STEP_MS),
            ("Preparing final paperwork", "Compiling required documents...", STANDARD_STEP_MS),
            (
                "Creating reference letter",
                "Drafting reference letter template...",
                STANDARD_STEP_MS,
            ),
            ("Notifying HR", "Sending package to HR...", STANDARD_STEP_MS),
        ],
    ),
    (
        DRAFT_RESPONSE_KEY,
        &[
            ("Analyzing crisis context", "Understanding situation...", 400),
            ("Generating personalized response", "Drafting response from template...", 1200),
            ("Including automation summary", "Adding action items taken...", 500),
            ("Formatting email", "Finalizing email format...", 300),
        ],
    ),
    (
        SEND_RESPONSE_KEY,
        &[
            ("Authenticating with mail provider", "Connecting to mail API...", 400),
            ("Composing message", "Preparing email payload...", 300),
            ("Sending email", "Handing message to mail provider...", 700),
            ("Confirming delivery", "Verifying email delivery...", 300),
        ],
    ),
];

const DEFAULT_STEPS: &[StepRow] = &[
    ("Initializing automation", "Starting process...", STANDARD_STEP_MS),
    ("Processing data", "Analyzing information...", STANDARD_STEP_MS),
    ("Executing actions", "Running automation tasks...", STANDARD_STEP_MS),
    ("Completing automation", "Finalizing...", STANDARD_STEP_MS),
];

fn to_templates(rows: &[StepRow]) -> Vec<StepTemplate> {
    rows.iter()
        .map(|(name, narration, ms)| StepTemplate::new(*name, *narration, *ms))
        .collect()
}

pub(super) fn default_steps() -> Vec<StepTemplate> {
    to_templates(DEFAULT_STEPS)
}

pub(super) fn definitions() -> impl Iterator<Item = AutomationDefinition> {
    NAMES.iter().map(|(id, key, name)| {
        let steps = STEPS
            .iter()
            .find(|(step_key, _)| step_key == key)
            .map_or_else(default_steps, |(_, rows)| to_templates(rows));
        AutomationDefinition {
            id: AutomationId::new(*id),
            key: (*key).to_string(),
            name: (*name).to_string(),
            steps,
        }
    })
}
