//! Workspace Membership Module
//!
//! - **`membership`** - `MembershipOracle` trait, roles, errors
//! - **`memory`** - in-process oracle (config seeds, tests)
//! - **`db`** - PostgreSQL oracle over `workspace_members`

pub mod membership;
pub mod memory;
pub mod db;

pub use membership::{MembershipError, MembershipOracle, WorkspaceRole};
pub use memory::InMemoryMembership;
pub use db::PgMembership;
