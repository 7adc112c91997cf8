//! Matter sensor adapter library.
//!
//! Infers a canonical profile for a Matter sensor from its declared
//! capabilities, subscribes to the attributes backing that profile, and
//! translates attribute reports into typed capability events.

pub mod capabilities;
pub mod config;
pub mod device;
pub mod error;
pub mod host;
pub mod input;
pub mod matter;
pub mod profile;
