//! Default resource handler backed by a [`Datasource`]

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{json, Value};

use super::error::{HandlerError, Operation};
use super::traits::{HandlerResult, ResourceHandler};
use crate::datasource::Datasource;
use crate::request::ResourceRequest;
use crate::response::Reply;

/// Id browsers request on their own; never forwarded to the datasource
pub const FAVICON_ID: &str = "favicon.ico";

/// Stock CRUD behaviour: forward each operation to the datasource
///
/// The datasource reference is injected at construction and may be swapped
/// later with [`set_datasource`](Self::set_datasource). Requests already
/// running keep the datasource they started with.
#[derive(Debug)]
pub struct DatasourceHandler<D> {
    datasource: RwLock<Arc<D>>,
}

impl<D: Datasource> DatasourceHandler<D> {
    /// Create a handler over `datasource`
    pub fn new(datasource: D) -> Self {
        Self::from_arc(Arc::new(datasource))
    }

    /// Create a handler over an already shared datasource
    pub fn from_arc(datasource: Arc<D>) -> Self {
        Self {
            datasource: RwLock::new(datasource),
        }
    }

    /// Current datasource
    pub fn datasource(&self) -> Arc<D> {
        self.datasource
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the datasource used by subsequent requests
    pub fn set_datasource(&self, datasource: Arc<D>) {
        *self
            .datasource
            .write()
            .unwrap_or_else(PoisonError::into_inner) = datasource;
        tracing::info!("Datasource replaced");
    }
}

/// Split an update body into its `(old, new)` pair
fn split_pair(body: Option<Value>) -> Result<(Value, Value), HandlerError> {
    match body {
        Some(Value::Array(items)) => match <[Value; 2]>::try_from(items) {
            Ok([old, new]) => Ok((old, new)),
            Err(items) => Err(HandlerError::serialization(
                Operation::Update,
                format!(
                    "Update body must hold exactly [old, new], got {} elements",
                    items.len()
                ),
            )),
        },
        _ => Err(HandlerError::serialization(
            Operation::Update,
            "Update body must be a JSON array [old, new]",
        )),
    }
}

impl<D: Datasource> ResourceHandler for DatasourceHandler<D> {
    async fn query(&self, req: ResourceRequest) -> HandlerResult {
        tracing::debug!(constraints = ?req.query_params, "query");
        let records = self.datasource().query(&req.query_params).await?;
        Ok(Reply::json(Value::Array(records)))
    }

    async fn retrieve(&self, req: ResourceRequest) -> HandlerResult {
        let id = req.require_id(Operation::Retrieve)?;
        if id == FAVICON_ID {
            return Ok(Reply::not_found());
        }
        tracing::debug!(id = %id, "retrieve");
        let record = self.datasource().retrieve(id).await?;
        Ok(Reply::Data(record))
    }

    async fn insert(&self, req: ResourceRequest) -> HandlerResult {
        // An absent body is treated like an empty parsed form.
        let record = req.body.unwrap_or_else(|| json!({}));
        let inserted = self.datasource().insert(record).await?;
        tracing::debug!(id = ?inserted.get("id"), "insert");
        Ok(Reply::json(inserted))
    }

    async fn update(&self, req: ResourceRequest) -> HandlerResult {
        let id = req.require_id(Operation::Update)?.to_string();
        let (old, new) = split_pair(req.body).map_err(|e| e.with_record(id.as_str()))?;
        tracing::debug!(id = %id, "update");
        self.datasource().update(&id, old, new).await?;
        Ok(Reply::empty())
    }

    async fn delete(&self, req: ResourceRequest) -> HandlerResult {
        let id = req.require_id(Operation::Delete)?;
        tracing::debug!(id = %id, "delete");
        self.datasource().delete(id).await?;
        Ok(Reply::empty())
    }
}
