use anyhow::Result;
use async_trait::async_trait;
use plandesk_core::catalog::{AgentDescriptor, CatalogError, ToolName};
use plandesk_core::plans::{recommend_plan, submit_order, CustomerProfile, OrderRequest};
use serde::Serialize;
use serde_json::{json, Value};

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// JSON schema for the tool's argument object.
    fn parameters(&self) -> Value;
    async fn execute(&self, input: Value) -> Result<Value>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RecommendPlanTool;

#[async_trait]
impl Tool for RecommendPlanTool {
    fn name(&self) -> &'static str {
        ToolName::RecommendPlan.as_str()
    }

    fn description(&self) -> &'static str {
        ToolName::RecommendPlan.description()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "current_plan": {
                    "type": "string",
                    "description": "The customer's current plan, e.g. \"150 Mbps\""
                },
                "usage": {
                    "description": "Free-form description of how the customer uses the service"
                }
            }
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let profile = CustomerProfile::from_json(&input);
        Ok(serde_json::to_value(recommend_plan(&profile))?)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SubmitOrderTool;

#[async_trait]
impl Tool for SubmitOrderTool {
    fn name(&self) -> &'static str {
        ToolName::SubmitOrder.as_str()
    }

    fn description(&self) -> &'static str {
        ToolName::SubmitOrder.description()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "plan": {
                    "type": "string",
                    "description": "The plan the customer agreed to order"
                }
            }
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let order = OrderRequest::from_json(&input);
        Ok(serde_json::to_value(submit_order(&order))?)
    }
}

pub fn builtin(tool: ToolName) -> Box<dyn Tool> {
    match tool {
        ToolName::RecommendPlan => Box::new(RecommendPlanTool),
        ToolName::SubmitOrder => Box::new(SubmitOrderTool),
    }
}

/// Function definition in the shape chat-completion APIs expect.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FunctionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// Tools available to a single agent, kept in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn for_agent(agent: &AgentDescriptor) -> Self {
        let mut registry = Self::default();
        for tool in agent.tools {
            registry.tools.push(builtin(*tool));
        }
        registry
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                kind: "function",
                function: FunctionDefinition {
                    name: tool.name(),
                    description: tool.description(),
                    parameters: tool.parameters(),
                },
            })
            .collect()
    }

    pub async fn invoke(&self, name: &str, input: Value) -> Result<Value> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| CatalogError::UnknownTool(name.to_string()))?;
        tool.execute(input).await
    }
}

#[cfg(test)]
mod tests {
    use plandesk_core::catalog::{CatalogError, Scenario};
    use serde_json::json;

    use super::ToolRegistry;

    #[test]
    fn registry_follows_agent_tool_order() {
        let support = ToolRegistry::for_agent(Scenario::Support.descriptor());
        assert_eq!(support.names(), vec!["recommend_plan", "submit_order"]);

        let billing = ToolRegistry::for_agent(Scenario::Billing.descriptor());
        assert_eq!(billing.names(), vec!["recommend_plan"]);
    }

    #[test]
    fn definitions_use_function_calling_shape() {
        let registry = ToolRegistry::for_agent(Scenario::Sales.descriptor());
        let definitions =
            serde_json::to_value(registry.definitions()).expect("definitions should serialize");

        assert_eq!(definitions[0]["type"], "function");
        assert_eq!(definitions[0]["function"]["name"], "recommend_plan");
        assert_eq!(
            definitions[0]["function"]["description"],
            "Recommends internet or service plans based on customer profile"
        );
        assert_eq!(definitions[1]["function"]["parameters"]["properties"]["plan"]["type"], "string");
    }

    #[tokio::test]
    async fn invoke_dispatches_to_core_functions() {
        let registry = ToolRegistry::for_agent(Scenario::Support.descriptor());

        let recommendation = registry
            .invoke("recommend_plan", json!({ "current_plan": "150 Mbps" }))
            .await
            .expect("recommend_plan should run");
        assert_eq!(recommendation["recommended_plan"], "Gigabit Extra (1.25 Gbps)");

        let confirmation =
            registry.invoke("submit_order", json!({})).await.expect("submit_order should run");
        assert_eq!(
            confirmation,
            json!({
                "status": "Order Submitted",
                "plan": null,
                "confirmation": "You will receive an email shortly."
            })
        );
    }

    #[tokio::test]
    async fn invoke_rejects_tools_the_agent_does_not_own() {
        let registry = ToolRegistry::for_agent(Scenario::Billing.descriptor());

        let error = registry
            .invoke("submit_order", json!({ "plan": "Gigabit Extra" }))
            .await
            .expect_err("billing agent cannot submit orders");
        assert_eq!(
            error.downcast_ref::<CatalogError>(),
            Some(&CatalogError::UnknownTool("submit_order".to_string()))
        );
        assert!(error.to_string().contains("unknown tool `submit_order`"));
    }
}
