//! Well-known role name constants.
//!
//! These must match the CHECK constraint on the `users` table.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CEO: &str = "ceo";
pub const ROLE_VIEWER: &str = "viewer";
