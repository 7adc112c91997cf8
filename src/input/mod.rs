//! Input sources that feed attribute reports into the host.
//!
//! Current input sources:
//! - `simulation`: synthetic reports for every subscribed attribute

pub mod simulation;
