//! Engine configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::bus::DeliveryMode;
use crate::casemap::CaseMapping;

/// Describes the server environment and local preferences for one engine.
///
/// The embedding application owns where this comes from (file, CLI, hard
/// -coded); the engine only reads it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Our own nickname on this connection. Tracked across renames.
    pub nickname: String,
    /// The initial case-folding rule; replaced if the server announces a
    /// different `CASEMAPPING` via ISUPPORT.
    pub casemapping: CaseMapping,
    /// CTCP verbs classified as actions rather than generic CTCPs.
    pub action_verbs: HashSet<String>,
    /// Capability tokens requested automatically when the server offers
    /// them during pre-registration negotiation.
    pub request_caps: Vec<String>,
    /// How the event bus hands events to listeners.
    pub delivery: DeliveryMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nickname: "ircflow".to_owned(),
            casemapping: CaseMapping::default(),
            action_verbs: HashSet::from(["ACTION".to_owned()]),
            request_caps: vec![
                "multi-prefix".to_owned(),
                "tsirc".to_owned(),
                "userhost-in-names".to_owned(),
            ],
            delivery: DeliveryMode::Sync,
        }
    }
}

impl EngineConfig {
    /// Whether a CTCP verb is in the action set (compared case-insensitively,
    /// the set itself holds uppercase verbs).
    pub fn is_action_verb(&self, verb: &str) -> bool {
        self.action_verbs.contains(&verb.to_ascii_uppercase())
    }
}
