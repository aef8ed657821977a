//! Explicit startup routine.
//!
//! Hosts call [`bootstrap`] once, before serving traffic, with every
//! channel handler the process supports. Each handler's definition is
//! upserted into the `channels` table (leaving the operator-owned `enabled`
//! flag untouched) and the in-process [`ChannelRegistry`] is built from the
//! same list. Running it again is a no-op apart from refreshing display
//! metadata.

use std::sync::Arc;

use courier_db::repositories::ChannelRepo;
use courier_db::DbPool;

use crate::channel::{ChannelHandler, ChannelRegistry};
use crate::error::EngineResult;

/// Persist channel definitions and build the handler registry.
pub async fn bootstrap(
    pool: &DbPool,
    handlers: Vec<Arc<dyn ChannelHandler>>,
) -> EngineResult<ChannelRegistry> {
    let mut registry = ChannelRegistry::new();

    for handler in handlers {
        let channel = ChannelRepo::upsert_definition(
            pool,
            handler.name(),
            handler.display_name(),
            handler.description(),
        )
        .await?;

        tracing::info!(
            channel = %channel.name,
            enabled = channel.enabled,
            "Channel registered"
        );
        registry.insert(handler);
    }

    tracing::info!(channels = registry.len(), "Bootstrap complete");
    Ok(registry)
}
