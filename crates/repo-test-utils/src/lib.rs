//! Shared test utilities for the repository-storage workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`archive`]: build zip fixtures in memory
//! - [`git`]: fake VCS metadata directories
//! - [`store`]: [`TestStore`](store::TestStore), a temp base directory with assertions

pub mod archive;
pub mod git;
pub mod store;
