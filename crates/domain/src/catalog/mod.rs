//! Automation catalog: the static registry of remediation automations.
//!
//! Every automation the detection collaborator can request is identified by a
//! stable `key` (e.g. `"emergency_hiring"`). The catalog maps keys to an
//! [`AutomationDefinition`]: a display name and an ordered list of
//! [`StepTemplate`]s.
//!
//! Lookups never fail. A key the catalog has never heard of resolves to a
//! synthesised definition using the generic four-step default template, so a
//! crisis referencing a brand new automation still runs end-to-end.

mod builtin;

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::AutomationId;

/// Key of the pseudo-automation narrating the drafting phase.
pub const DRAFT_RESPONSE_KEY: &str = "draft_response";

/// Key of the pseudo-automation narrating the dispatch phase.
pub const SEND_RESPONSE_KEY: &str = "send_response";

/// One unit of narrated, timed work inside an automation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTemplate {
    /// Short label shown next to the step's status.
    pub name: String,
    /// Log line emitted when the step starts.
    pub narration: String,
    /// Expected latency of the step's action. Used as a ceiling hint by the
    /// runner and as pacing by simulated executors.
    pub estimated_duration_ms: u64,
}

impl StepTemplate {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        narration: impl Into<String>,
        estimated_duration_ms: u64,
    ) -> Self {
        Self {
            name: name.into(),
            narration: narration.into(),
            estimated_duration_ms,
        }
    }
}

/// An immutable automation definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationDefinition {
    pub id: AutomationId,
    pub key: String,
    pub name: String,
    pub steps: Vec<StepTemplate>,
}

/// Registry of [`AutomationDefinition`]s keyed by automation key.
#[derive(Debug, Clone)]
pub struct AutomationCatalog {
    definitions: HashMap<String, AutomationDefinition>,
    default_steps: Vec<StepTemplate>,
}

impl Default for AutomationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AutomationCatalog {
    /// Catalog with no registered definitions; every lookup falls back.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            definitions: HashMap::new(),
            default_steps: builtin::default_steps(),
        }
    }

    /// Catalog preloaded with the restaurant-operations automations.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for definition in builtin::definitions() {
            catalog.insert(definition);
        }
        catalog
    }

    /// Register (or replace) a definition.
    pub fn insert(&mut self, definition: AutomationDefinition) {
        self.definitions.insert(definition.key.clone(), definition);
    }

    /// Whether `key` has a registered definition.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.definitions.contains_key(key)
    }

    /// Resolve a key to its definition, falling back to the default template.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Cow<'_, AutomationDefinition> {
        match self.definitions.get(key) {
            Some(definition) => Cow::Borrowed(definition),
            None => Cow::Owned(AutomationDefinition {
                id: AutomationId::FALLBACK,
                key: key.to_string(),
                name: display_name_for_key(key),
                steps: self.default_steps.clone(),
            }),
        }
    }

    /// All registered definitions, ordered by id.
    #[must_use]
    pub fn definitions(&self) -> Vec<&AutomationDefinition> {
        let mut all: Vec<_> = self.definitions.values().collect();
        all.sort_by_key(|definition| definition.id);
        all
    }

    /// The generic template used for unknown keys.
    #[must_use]
    pub fn default_steps(&self) -> &[StepTemplate] {
        &self.default_steps
    }
}

/// Turn `"backup_vendor_search"` into `"Backup Vendor Search"`.
#[must_use]
pub fn display_name_for_key(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
