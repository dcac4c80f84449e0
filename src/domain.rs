//! Domain state records and their mutation rules
//!
//! Each application owns one small persisted record, mutated only
//! through tool handlers and flushed after every mutating call. The
//! serialized field names match the JSON files the original demos
//! produced, for cross-compatibility.

pub mod adventure;
pub mod cart;
pub mod fraud;
pub mod lead;
pub mod wellness;
