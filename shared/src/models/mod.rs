//! Domain models for the NovaFarm dashboard

mod crop;
mod dashboard;
mod metrics;
mod recommendation;
mod soil;
mod weather;

pub use crop::*;
pub use dashboard::*;
pub use metrics::*;
pub use recommendation::*;
pub use soil::*;
pub use weather::*;
