//! The nl802154 command tables.
//!
//! Each module exports a `COMMANDS` table; [`Registry::standard`] registers
//! all of them.
//!
//! [`Registry::standard`]: crate::registry::Registry::standard

pub mod mac;
pub mod phy;
pub mod security;
