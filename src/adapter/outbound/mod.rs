//! Outbound adapters: concrete implementations of outbound ports.

pub mod postgres;
