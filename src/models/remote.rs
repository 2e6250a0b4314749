use serde::{Deserialize, Serialize};

use super::quotes::Quote;

/// a record as served by the remote posts endpoint. only `title` is consumed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePost {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
}

impl RemotePost {
    pub fn into_quote(self, category: &str) -> Quote {
        Quote::new(self.title, category)
    }
}
