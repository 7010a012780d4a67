//! Runtime configuration sources layered over the persisted file.

pub mod environment;
