//! # adaptx-cli: Collaborator Components and Driver Support
//!
//! The pieces surrounding the optimizer core that make it runnable end to
//! end: the restricted SQL parser, the toy row-level executor, the JSON
//! dataset loader, and the plan renderer. The `adaptx` binary wires them into
//! a batch query loop.

pub mod display;
pub mod executor;
pub mod loader;
pub mod parser;
