use serde::{Deserialize, Serialize};

/// Configuration for the users_info module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersInfoConfig {
    /// Answer an empty `GET /users` with `204 No Content` instead of `200 []`.
    #[serde(default)]
    pub no_content_when_empty: bool,
}
