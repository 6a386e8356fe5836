//! Conductor System
//!
//! Post-planning synthesis: invokes the planner's tool calls, reconciles
//! their results, schedules the visit and renders the reply.

pub mod action;
pub mod aggregator;
pub mod allocator;
pub mod context;
pub mod invoker;
pub mod renderer;
pub mod route;
pub mod types;
pub mod verifier;

pub use action::ActionExecutor;
pub use aggregator::aggregate;
pub use allocator::{Schedulable, Slot, TimeAllocation, TimeAllocator};
pub use context::{ContextExtractor, Occasion, VisitContext};
pub use invoker::ToolInvoker;
pub use renderer::{ItineraryRenderer, ResponseShape};
pub use route::RoutePlanner;
pub use types::{
    ActionResult, DecisionPlan, ItineraryStop, PlanningDataset, ReasoningStep, TraceEntry,
};
pub use verifier::ConstraintVerifier;
