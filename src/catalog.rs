//! Static template catalogs for negotiation vignettes, decisions and agents.
//!
//! Catalogs are plain TOML. The built-in catalog is embedded at compile time
//! from `catalog/builtin.toml`; a replacement can be loaded from disk.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const BUILTIN_CATALOG: &str = include_str!("../catalog/builtin.toml");

/// One participant in a negotiation vignette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NegotiationParticipant {
    pub name: String,
    pub role: String,
    pub concern: String,
}

/// Pre-authored negotiation vignette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NegotiationTemplate {
    /// One-line summary shown in the log.
    pub message: String,
    pub participant_count: u32,
    pub title: String,
    pub scenario: String,
    pub agents: Vec<NegotiationParticipant>,
    /// Dialogue lines in order.
    pub transcript: Vec<String>,
    pub outcome: String,
    pub impact_summary: String,
}

/// Pre-authored coordination decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionTemplate {
    /// One-line summary shown in the log.
    pub summary: String,
    pub title: String,
    pub description: String,
    pub analysis: String,
    pub implementation_steps: Vec<String>,
    pub responsible_agent: String,
    pub confidence: String,
    pub energy_impact: String,
    pub cost_impact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentPerformance {
    /// Percent.
    pub efficiency: f64,
    /// Percent.
    pub uptime: f64,
    pub decisions: u32,
}

/// Static description of one coordinating agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    pub current_tasks: Vec<String>,
    pub performance: AgentPerformance,
    pub recent_actions: Vec<String>,
    pub next_scheduled: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default, rename = "negotiation")]
    negotiations: Vec<NegotiationTemplate>,
    #[serde(default, rename = "decision")]
    decisions: Vec<DecisionTemplate>,
    #[serde(default, rename = "agent")]
    agents: Vec<AgentProfile>,
}

/// Read-only template tables shared by the event generator and consumers.
#[derive(Debug, Clone)]
pub struct Catalog {
    negotiations: Vec<Arc<NegotiationTemplate>>,
    decisions: Vec<Arc<DecisionTemplate>>,
    agents: Vec<AgentProfile>,
}

impl Catalog {
    /// The catalog shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded TOML is malformed.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Loads a catalog from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or lacks
    /// negotiation or decision templates.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a catalog from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Toml`] on malformed input and [`Error::EmptyCatalog`]
    /// if either template list is empty.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(s)?;
        if file.negotiations.is_empty() {
            return Err(Error::EmptyCatalog("negotiation"));
        }
        if file.decisions.is_empty() {
            return Err(Error::EmptyCatalog("decision"));
        }
        Ok(Self {
            negotiations: file.negotiations.into_iter().map(Arc::new).collect(),
            decisions: file.decisions.into_iter().map(Arc::new).collect(),
            agents: file.agents,
        })
    }

    pub fn negotiations(&self) -> &[Arc<NegotiationTemplate>] {
        &self.negotiations
    }

    pub fn decisions(&self) -> &[Arc<DecisionTemplate>] {
        &self.decisions
    }

    pub fn agents(&self) -> &[AgentProfile] {
        &self.agents
    }
}
