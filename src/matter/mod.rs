//! Protocol side: attribute addressing, cluster definitions, the decoder
//! table and the capability-to-attribute subscription map.

pub mod attribute;
pub mod clusters;
pub mod decoder;
pub mod subscriptions;

pub use attribute::{AttributeKey, AttributeReport, RawValue};
pub use decoder::DecoderTable;
