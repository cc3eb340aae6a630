//! Agent tiers: which model answers, and how loudly it logs.

use std::fmt;

/// The two delegation tiers, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Primary,
    Fallback,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Primary => write!(f, "primary"),
            Tier::Fallback => write!(f, "fallback"),
        }
    }
}

/// Immutable per-tier settings. Temperature is always zero so identical questions get
/// reproducible answers.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTier {
    tier: Tier,
    model: String,
    verbose: bool,
    temperature: f32,
}

impl AgentTier {
    /// Primary tier: logs every agent step at info level.
    pub fn primary(model: impl Into<String>) -> Self {
        Self {
            tier: Tier::Primary,
            model: model.into(),
            verbose: true,
            temperature: 0.0,
        }
    }

    /// Fallback tier: quiet, cheaper model.
    pub fn fallback(model: impl Into<String>) -> Self {
        Self {
            tier: Tier::Fallback,
            model: model.into(),
            verbose: false,
            temperature: 0.0,
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Verbose tiers log agent steps at info instead of debug.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}
