//! Typed calls for the pads REST routes.
//!
//! | Operation | Method | Path                        |
//! |-----------|--------|-----------------------------|
//! | List      | GET    | `{base}/pads/paginated?...` |
//! | Get       | GET    | `{base}/pads/{id}`          |
//! | Create    | POST   | `{base}/pads`               |
//! | Update    | PUT    | `{base}/pads/{id}`          |
//! | Delete    | DELETE | `{base}/pads/{id}`          |

use crate::client::{ApiClient, Method};
use crate::error::Result;
use crate::model::{Pad, PadDraft, Page, SimpleStatus};
use crate::query::FilterQuery;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const DEFAULT_API_BASE: &str = "/chaospad/api/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadsEndpoint {
    collection: String,
}

impl Default for PadsEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl PadsEndpoint {
    pub fn new(api_base: &str) -> Self {
        Self {
            collection: format!("{}/pads", api_base.trim_end_matches('/')),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn item(&self, id: &str) -> String {
        format!("{}/{}", self.collection, id)
    }

    pub fn paginated(&self, query: &FilterQuery) -> String {
        format!("{}/paginated?{}", self.collection, query.to_query_string())
    }

    pub fn list<C: ApiClient>(&self, client: &mut C, query: &FilterQuery) -> Result<Page<Pad>> {
        let body = client.request(Method::Get, &self.paginated(query), None)?;
        decode(body)
    }

    pub fn get<C: ApiClient>(&self, client: &mut C, id: &str) -> Result<Pad> {
        let body = client.request(Method::Get, &self.item(id), None)?;
        decode(body)
    }

    /// PUT to the record when the draft carries an id, POST to the collection
    /// otherwise.
    pub fn save<C: ApiClient>(&self, client: &mut C, draft: &PadDraft) -> Result<Pad> {
        let body = draft.to_request_body()?;
        let response = match draft.target_id() {
            Some(id) => client.request(Method::Put, &self.item(id), Some(&body))?,
            None => client.request(Method::Post, &self.collection, Some(&body))?,
        };
        decode(response)
    }

    /// Deletes are acknowledged with a status object, but an empty body is
    /// accepted as success too.
    pub fn delete<C: ApiClient>(&self, client: &mut C, id: &str) -> Result<Option<SimpleStatus>> {
        let body = client.request(Method::Delete, &self.item(id), None)?;
        Ok(serde_json::from_value(body).ok())
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T> {
    Ok(serde_json::from_value(body)?)
}
