//! Fingerprinting pipeline stages
//!
//! Traversal (with exclusion filtering) produces the included files, each
//! file is hashed independently, and the per-file digests are reduced into
//! one digest that does not depend on enumeration order.

pub mod filter;
pub mod hasher;
pub mod path;
pub mod reducer;
pub mod walker;
