//! Domain core for plandesk: the static agent catalog, the plan tools and the shared
//! configuration and error types.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod plans;

pub use catalog::{AgentDescriptor, Catalog, CatalogError, Scenario, ToolName};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use plans::{
    recommend_plan, submit_order, CustomerProfile, OrderConfirmation, OrderRequest,
    RecommendationResult,
};
