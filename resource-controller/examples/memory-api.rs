//! In-memory REST collection
//!
//! Run with:
//!
//! ```bash
//! cargo run --example memory-api
//! RESOURCE_SERVICE__PORT=3000 RESOURCE_ERRORS__MODE=typed cargo run --example memory-api
//! ```
//!
//! Then:
//!
//! ```bash
//! curl -s localhost:8080/
//! curl -s -d '{"title":"write docs"}' -H 'content-type: application/json' localhost:8080/
//! curl -s -X PUT -H 'content-type: application/json' \
//!     -d '[{"id":"<id>","title":"write docs"},{"title":"docs written"}]' localhost:8080/<id>
//! ```

use resource_controller::prelude::*;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_for_service("memory-api")?;
    init_tracing(&config)?;

    let datasource = MemoryDatasource::new();
    for title in ["buy milk", "fix the fence"] {
        if let Err(e) = datasource.insert(json!({ "title": title, "done": false })).await {
            tracing::warn!("Failed to seed record: {}", e);
        }
    }
    tracing::info!(records = datasource.len(), "Seeded datasource");

    let result = ResourceController::with_datasource(datasource, config)
        .run()
        .await;

    shutdown_tracing();
    result
}
