use serde::{Deserialize, Serialize};

// Users, sessions and posts never leave the query layer as whole rows;
// only categories travel into templates as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
}
