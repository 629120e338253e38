//! Listing service - list and detail reads for events, schedules and speakers
//!
//! Each operation normalizes its typed filter, compiles it against the caller's tenant
//! and runs the count and page queries together. Rows are decoded into the typed
//! views; a row that does not decode is reported as a store error, not skipped.

use convene_query::{
    CompiledQuery, EntityQuerySpec, NormalizedFilter, ObjectId, Page, PaginatedExecutor,
    PaginationPolicy, PipelineCompiler, PlanExecutor, QueryError, StoreError, TenantContext,
};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::models::{EventView, ScheduleView, Speaker};
use crate::queries::{
    EventFilter, EventListing, EventSpeakerFilter, EventSpeakerListing, ScheduleFilter,
    ScheduleListing, SpeakerFilter, SpeakerListing,
};
use crate::{Error, Result};

pub struct ListingService {
    executor: PaginatedExecutor,
    policy: PaginationPolicy,
}

impl ListingService {
    pub fn new(store: Arc<dyn PlanExecutor>, policy: PaginationPolicy) -> Self {
        Self {
            executor: PaginatedExecutor::new(store),
            policy,
        }
    }

    pub async fn list_events(
        &self,
        ctx: &TenantContext,
        filter: &EventFilter,
    ) -> Result<Page<EventView>> {
        let normalized = filter.normalize(&self.policy)?;
        self.list(&EventListing, ctx, normalized).await
    }

    pub async fn list_schedules(
        &self,
        ctx: &TenantContext,
        filter: &ScheduleFilter,
    ) -> Result<Page<ScheduleView>> {
        let normalized = filter.normalize(&self.policy, None)?;
        self.list(&ScheduleListing, ctx, normalized).await
    }

    /// Schedules listing `speaker_id` among their speakers.
    pub async fn list_schedules_for_speaker(
        &self,
        ctx: &TenantContext,
        speaker_id: ObjectId,
        filter: &ScheduleFilter,
    ) -> Result<Page<ScheduleView>> {
        let normalized = filter.normalize(&self.policy, Some(speaker_id))?;
        self.list(&ScheduleListing, ctx, normalized).await
    }

    pub async fn list_speakers(
        &self,
        ctx: &TenantContext,
        filter: &SpeakerFilter,
    ) -> Result<Page<Speaker>> {
        let normalized = filter.normalize(&self.policy)?;
        self.list(&SpeakerListing, ctx, normalized).await
    }

    /// Speakers listed by at least one schedule of `event_id`.
    pub async fn list_speakers_for_event(
        &self,
        ctx: &TenantContext,
        event_id: ObjectId,
        filter: &EventSpeakerFilter,
    ) -> Result<Page<Speaker>> {
        let normalized = filter.normalize(&self.policy)?;
        self.list(&EventSpeakerListing::new(event_id), ctx, normalized)
            .await
    }

    pub async fn get_event(&self, ctx: &TenantContext, id: ObjectId) -> Result<EventView> {
        self.get(&EventListing, ctx, id).await
    }

    pub async fn get_schedule(&self, ctx: &TenantContext, id: ObjectId) -> Result<ScheduleView> {
        self.get(&ScheduleListing, ctx, id).await
    }

    pub async fn get_speaker(&self, ctx: &TenantContext, id: ObjectId) -> Result<Speaker> {
        self.get(&SpeakerListing, ctx, id).await
    }

    async fn list<T: DeserializeOwned>(
        &self,
        spec: &dyn EntityQuerySpec,
        ctx: &TenantContext,
        filter: NormalizedFilter,
    ) -> Result<Page<T>> {
        let filter_fields = filter.shape().join(",");
        let compiled = PipelineCompiler::compile(spec, ctx, filter);
        if matches!(compiled, CompiledQuery::Empty { .. }) {
            tracing::info!(
                entity = spec.entity(),
                tenant = %ctx.tenant_id,
                user = %ctx.user_id,
                "Tenant claim does not match caller, returning empty page"
            );
        }

        let page = self
            .executor
            .run(compiled)
            .await
            .map_err(|e| log_failure(spec.entity(), ctx, &filter_fields, e))?;

        tracing::debug!(
            entity = spec.entity(),
            tenant = %ctx.tenant_id,
            filter_fields = %filter_fields,
            total = page.total,
            page = page.page,
            "Listed"
        );

        page.try_map(|doc| decode(spec.collection(), doc))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        spec: &dyn EntityQuerySpec,
        ctx: &TenantContext,
        id: ObjectId,
    ) -> Result<T> {
        let pipeline = PipelineCompiler::compile_lookup(spec, ctx, id);
        let row = self
            .executor
            .first(&pipeline)
            .await
            .map_err(|e| log_failure(spec.entity(), ctx, "_id", e))?;

        match row {
            Some(doc) => decode(spec.collection(), doc),
            None => Err(Error::NotFound {
                entity: spec.entity(),
                id: id.to_string(),
            }),
        }
    }
}

fn log_failure(entity: &str, ctx: &TenantContext, filter_fields: &str, err: QueryError) -> Error {
    if let QueryError::Store(store) = &err {
        tracing::error!(
            entity,
            tenant = %ctx.tenant_id,
            filter_fields,
            retriable = store.is_retriable(),
            error = %store,
            "Listing query failed"
        );
    }
    err.into()
}

fn decode<T: DeserializeOwned>(collection: &str, doc: JsonValue) -> Result<T> {
    serde_json::from_value(doc).map_err(|e| {
        Error::Store(StoreError::Decode {
            collection: collection.to_string(),
            message: e.to_string(),
        })
    })
}
