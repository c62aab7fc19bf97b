//! User Fixtures

use serde::Deserialize;

use crate::users::User;

/// Wrapper for sample users in YAML
#[derive(Debug, Deserialize)]
pub struct UsersFixture {
    /// Sample users
    pub users: Vec<User>,
}
