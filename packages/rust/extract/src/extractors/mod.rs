//! Built-in extractors, one per entity kind.

mod capability;
mod command;
mod economics;
mod quality;
mod recovery;
mod trigger;
mod workflow;

pub use capability::CapabilityExtractor;
pub use command::CommandRouteExtractor;
pub use economics::EconomicsExtractor;
pub use quality::QualityCheckExtractor;
pub use recovery::RecoveryExtractor;
pub use trigger::TriggerExtractor;
pub use workflow::WorkflowExtractor;
