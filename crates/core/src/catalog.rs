//! Static agent catalog.
//!
//! The set of scenarios is closed: support, billing and sales. Each one maps to a single
//! [`AgentDescriptor`] that names the agent's role, its instructions and the ordered list of
//! tools it is allowed to call. Descriptors are `'static` and never mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    RecommendPlan,
    SubmitOrder,
}

impl ToolName {
    pub const ALL: [ToolName; 2] = [ToolName::RecommendPlan, ToolName::SubmitOrder];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecommendPlan => "recommend_plan",
            Self::SubmitOrder => "submit_order",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::RecommendPlan => "Recommends internet or service plans based on customer profile",
            Self::SubmitOrder => "Submits an order and confirms the upgrade",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == value)
            .ok_or_else(|| CatalogError::UnknownTool(value.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AgentDescriptor {
    pub name: &'static str,
    pub role: &'static str,
    pub instructions: &'static str,
    pub tools: &'static [ToolName],
}

static SUPPORT_AGENT: AgentDescriptor = AgentDescriptor {
    name: "SupportAgent",
    role: "Technical Support Expert",
    instructions: "Help troubleshoot technical issues and suggest upgrades.",
    tools: &[ToolName::RecommendPlan, ToolName::SubmitOrder],
};

static BILLING_AGENT: AgentDescriptor = AgentDescriptor {
    name: "BillingAgent",
    role: "Billing Advisor",
    instructions: "Help customers with billing concerns and suggest appropriate plans.",
    tools: &[ToolName::RecommendPlan],
};

static SALES_AGENT: AgentDescriptor = AgentDescriptor {
    name: "SalesAgent",
    role: "Sales Optimization AI",
    instructions: "Identify opportunities and upsell suitable services to customers.",
    tools: &[ToolName::RecommendPlan, ToolName::SubmitOrder],
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Support,
    Billing,
    Sales,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Support, Scenario::Billing, Scenario::Sales];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Support => "support",
            Self::Billing => "billing",
            Self::Sales => "sales",
        }
    }

    /// Label shown in the scenario selector.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Support => "Support",
            Self::Billing => "Billing",
            Self::Sales => "Sales",
        }
    }

    pub fn descriptor(&self) -> &'static AgentDescriptor {
        match self {
            Self::Support => &SUPPORT_AGENT,
            Self::Billing => &BILLING_AGENT,
            Self::Sales => &SALES_AGENT,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Scenario {
    type Err = CatalogError;

    /// Case-insensitive on the three known keys. Surrounding whitespace is not stripped.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "support" => Ok(Self::Support),
            "billing" => Ok(Self::Billing),
            "sales" => Ok(Self::Sales),
            _ => Err(CatalogError::NotFound(value.to_string())),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no agent is configured for scenario `{0}`")]
    NotFound(String),
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Catalog;

impl Catalog {
    pub fn lookup(scenario: &str) -> Result<&'static AgentDescriptor, CatalogError> {
        scenario.parse::<Scenario>().map(|scenario| scenario.descriptor())
    }

    pub fn descriptors() -> impl Iterator<Item = (Scenario, &'static AgentDescriptor)> {
        Scenario::ALL.into_iter().map(|scenario| (scenario, scenario.descriptor()))
    }
}
