//! Inbound ports (driving side): interfaces the scheduler drives.

pub mod task;
