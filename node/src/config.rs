//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};

use steward_types::{Address, Amount, CycleParams, Height, Role};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a Steward node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Cycle settings of the engine electing the governance role.
    #[serde(default = "default_governance_cycle")]
    pub governance: CycleConfig,

    /// Cycle settings of the engine electing the decision-module role.
    #[serde(default = "default_decision_module_cycle")]
    pub decision_module: CycleConfig,

    /// Genesis height and initial balances.
    #[serde(default)]
    pub genesis: GenesisConfig,
}

/// One engine's identity and cycle timing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Address of the engine; also the genesis holder of its role.
    pub engine: Address,

    /// Length of each of the four phase windows, in blocks.
    #[serde(default = "default_period_length")]
    pub period_length: u64,

    /// Percentage of circulating stake that must support the finalist.
    #[serde(default = "default_quorum_percent")]
    pub quorum_percent: u8,

    /// Blocks after genesis before this engine's first cycle starts.
    #[serde(default)]
    pub offset: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    #[serde(default)]
    pub start_height: u64,

    #[serde(default)]
    pub balances: Vec<GenesisBalance>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub address: Address,
    pub amount: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_governance_cycle() -> CycleConfig {
    CycleConfig {
        engine: Address::from_low_u64(0x01),
        period_length: default_period_length(),
        quorum_percent: default_quorum_percent(),
        offset: 0,
    }
}

fn default_decision_module_cycle() -> CycleConfig {
    CycleConfig {
        engine: Address::from_low_u64(0x02),
        period_length: default_period_length(),
        quorum_percent: default_quorum_percent(),
        offset: 2 * default_period_length(),
    }
}

fn default_period_length() -> u64 {
    100
}

fn default_quorum_percent() -> u8 {
    50
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CycleConfig {
    pub fn params(&self) -> Result<CycleParams, NodeError> {
        CycleParams::new(self.period_length, self.quorum_percent)
            .map_err(|e| NodeError::Config(e.to_string()))
    }
}

impl GenesisConfig {
    pub fn height(&self) -> Height {
        Height::new(self.start_height)
    }

    pub fn allocations(&self) -> impl Iterator<Item = (Address, Amount)> + '_ {
        self.balances
            .iter()
            .map(|b| (b.address, Amount::from(b.amount)))
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn cycle(&self, role: Role) -> &CycleConfig {
        match role {
            Role::Governance => &self.governance,
            Role::DecisionModule => &self.decision_module,
        }
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        for role in Role::ALL {
            let cycle = self.cycle(role);
            cycle
                .params()
                .map_err(|e| NodeError::Config(format!("[{role}] {e}")))?;
            if self
                .genesis
                .start_height
                .checked_add(cycle.offset)
                .is_none()
            {
                return Err(NodeError::Config(format!(
                    "[{role}] offset {} overflows the genesis height",
                    cycle.offset
                )));
            }
        }
        if self.governance.engine == self.decision_module.engine {
            return Err(NodeError::Config(format!(
                "governance and decision_module engines share address {}",
                self.governance.engine
            )));
        }
        self.log_format()?;
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            governance: default_governance_cycle(),
            decision_module: default_decision_module_cycle(),
            genesis: GenesisConfig::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
