//! Data API client
//!
//! Every operation is a single `POST {base_url}/action/{action}` carrying the
//! target database/collection/data source and an `api-key` header.

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{tally_pipeline, Project, ProjectStore, VoteRecord, VoteTally, VOTE_CAP_PER_IP};
use crate::config::{Secret, StoreConfig};
use crate::error::AppError;
use crate::logger;

const DATABASE_ERROR_MESSAGE: &str = "Error connecting to database.";

/// `ProjectStore` backed by a remote Data API endpoint
pub struct DataApiStore {
    client: Client,
    base_url: String,
    api_key: Secret,
    database: String,
    collection: String,
    data_source: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionRequest<'a> {
    collection: &'a str,
    database: &'a str,
    data_source: &'a str,
    #[serde(flatten)]
    body: Value,
}

#[derive(Deserialize)]
struct DocumentsResponse<T> {
    documents: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    modified_count: u64,
}

impl DataApiStore {
    pub fn new(client: Client, config: &StoreConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            database: config.database.clone(),
            collection: config.collection.clone(),
            data_source: config.data_source.clone(),
        }
    }

    async fn action<T: DeserializeOwned>(&self, action: &str, body: Value) -> Result<T, AppError> {
        let request = ActionRequest {
            collection: &self.collection,
            database: &self.database,
            data_source: &self.data_source,
            body,
        };

        let res = self
            .client
            .post(format!("{}/action/{action}", self.base_url))
            .header(ACCEPT, "application/json")
            .header("api-key", self.api_key.expose())
            .json(&request)
            .send()
            .await?;

        if res.status() != StatusCode::OK {
            logger::log_warning(&format!(
                "Data API {action} returned status {}",
                res.status()
            ));
            return Err(AppError::internal(DATABASE_ERROR_MESSAGE));
        }

        Ok(res.json::<T>().await?)
    }
}

impl ProjectStore for DataApiStore {
    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let res: DocumentsResponse<Project> = self
            .action("find", json!({ "projection": { "votes": 0 } }))
            .await?;
        Ok(res.documents)
    }

    async fn cast_vote(
        &self,
        project_id: u64,
        ip: &str,
        user_agent: &str,
    ) -> Result<bool, AppError> {
        let vote = VoteRecord::now(ip, user_agent);
        let res: UpdateResponse = self
            .action(
                "updateOne",
                json!({
                    "filter": { "_id": project_id },
                    "update": { "$push": { "votes": vote } }
                }),
            )
            .await?;
        Ok(res.modified_count != 0)
    }

    async fn vote_tallies(&self) -> Result<Vec<VoteTally>, AppError> {
        let res: DocumentsResponse<VoteTally> = self
            .action(
                "aggregate",
                json!({ "pipeline": tally_pipeline(VOTE_CAP_PER_IP) }),
            )
            .await?;
        Ok(res.documents)
    }
}
