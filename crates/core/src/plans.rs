//! Plan recommendation and order submission.
//!
//! Both functions are pure and have a fixed, literal outcome space. Inputs arrive as untyped
//! JSON objects from the chat capability, so extraction is lenient: missing keys, non-string
//! values and non-object payloads are all treated as absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const UPGRADE_ELIGIBLE_PLAN: &str = "150 Mbps";
pub const UPGRADE_PLAN: &str = "Gigabit Extra (1.25 Gbps)";
pub const UPGRADE_PRICE: &str = "$89.99/month";
pub const UPGRADE_BONUS: &str = "Includes SecurityEdge™";
pub const NO_BETTER_PLAN_MESSAGE: &str = "No better plan available.";
pub const ORDER_SUBMITTED_STATUS: &str = "Order Submitted";
pub const ORDER_CONFIRMATION_MESSAGE: &str = "You will receive an email shortly.";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_plan: Option<String>,
    /// Accepted for forward compatibility; no recommendation currently reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomerProfile {
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let mut extra = object.clone();
        let current_plan = extra.remove("current_plan").and_then(into_string);
        let usage = extra.remove("usage").filter(|usage| !usage.is_null());

        Self { current_plan, usage, extra }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub plan: Option<String>,
}

impl OrderRequest {
    pub fn from_json(value: &Value) -> Self {
        let plan = value.get("plan").cloned().and_then(into_string);
        Self { plan }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecommendationResult {
    Upgrade { recommended_plan: String, price: String, bonus: String },
    NoBetterPlan { message: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub status: String,
    pub plan: Option<String>,
    pub confirmation: String,
}

pub fn recommend_plan(profile: &CustomerProfile) -> RecommendationResult {
    if profile.current_plan.as_deref() == Some(UPGRADE_ELIGIBLE_PLAN) {
        return RecommendationResult::Upgrade {
            recommended_plan: UPGRADE_PLAN.to_string(),
            price: UPGRADE_PRICE.to_string(),
            bonus: UPGRADE_BONUS.to_string(),
        };
    }

    RecommendationResult::NoBetterPlan { message: NO_BETTER_PLAN_MESSAGE.to_string() }
}

pub fn submit_order(order: &OrderRequest) -> OrderConfirmation {
    OrderConfirmation {
        status: ORDER_SUBMITTED_STATUS.to_string(),
        plan: order.plan.clone(),
        confirmation: ORDER_CONFIRMATION_MESSAGE.to_string(),
    }
}

fn into_string(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        _ => None,
    }
}
