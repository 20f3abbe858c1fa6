//! Dashboard pipeline services

pub mod environment;
pub mod location;
pub mod orchestrator;
pub mod recommendation;
pub mod session;

pub use environment::EnvironmentFetcher;
pub use location::{LocationResolver, Resolution};
pub use orchestrator::{DashboardSnapshot, DashboardState, Orchestrator};
pub use recommendation::{EngineOutput, RecommendationEngine};
pub use session::SessionRegistry;
