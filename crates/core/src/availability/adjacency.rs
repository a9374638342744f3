//! Slots immediately before and after an existing event

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use slotline_domain::constants::{
    ADJACENCY_SPAN_HOURS, DEFAULT_BUFFER_MINUTES, DEFAULT_DURATION_MINUTES,
    DEFAULT_SLOT_INTERVAL_MINUTES,
};
use slotline_domain::{AvailabilitySlot, CalendarEvent, Result, SchedulingConfig};
use tracing::{debug, instrument};

use super::cache::{anchor_span, AnchorAvailabilityCache, AnchorCacheOptions};
use crate::calendar_ports::CalendarGateway;
use crate::utils::clock::Clock;

/// Scan parameters for adjacency requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdjacencyParams {
    pub duration_minutes: u32,
    pub slot_interval_minutes: u32,
    pub buffer_minutes: u32,
}

impl Default for AdjacencyParams {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_DURATION_MINUTES,
            slot_interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
        }
    }
}

impl AdjacencyParams {
    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self {
            duration_minutes: config.default_duration_minutes,
            slot_interval_minutes: config.slot_interval_minutes,
            buffer_minutes: config.buffer_minutes,
        }
    }
}

/// Builds adjacency caches around anchor events.
pub struct AdjacencyMode {
    gateway: Arc<dyn CalendarGateway>,
    clock: Arc<dyn Clock>,
    span: Duration,
}

impl AdjacencyMode {
    pub fn new(gateway: Arc<dyn CalendarGateway>, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock, span: Duration::hours(i64::from(ADJACENCY_SPAN_HOURS)) }
    }

    pub fn with_span(mut self, span: Duration) -> Self {
        self.span = span;
        self
    }

    fn options(&self, params: &AdjacencyParams) -> AnchorCacheOptions {
        AnchorCacheOptions {
            slot_interval_minutes: params.slot_interval_minutes,
            buffer_minutes: params.buffer_minutes,
            lookaround: self.span,
            before_span: Some(self.span),
            after_span: self.span,
        }
    }

    /// Fetch once around `anchor` and return a cache serving any duration.
    #[instrument(skip(self, anchor), fields(anchor_id = %anchor.id))]
    pub async fn availability_cache(
        &self,
        anchor: CalendarEvent,
        params: &AdjacencyParams,
    ) -> Result<AnchorAvailabilityCache> {
        // Reject before touching the network.
        anchor_span(&anchor)?;

        AnchorAvailabilityCache::build(
            self.gateway.as_ref(),
            anchor,
            self.options(params),
            self.clock.clone(),
        )
        .await
    }

    /// Before/after slots of `params.duration_minutes` around `anchor`.
    pub async fn find_slots(
        &self,
        anchor: CalendarEvent,
        params: &AdjacencyParams,
    ) -> Result<Vec<AvailabilitySlot>> {
        let mut cache = self.availability_cache(anchor, params).await?;
        let slots = cache.get_slots_for_duration(params.duration_minutes)?.to_vec();
        debug!(slots = slots.len(), "adjacency slots generated");
        Ok(slots)
    }
}
