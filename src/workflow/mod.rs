pub mod compare_flow;
pub mod failure;
pub mod single_flow;

pub use compare_flow::{CompareFlow, CompareOutcome, Side, SideOutcome};
pub use failure::{FlowError, FlowFailure};
pub use single_flow::{analyze, SingleFlow, SingleState};
