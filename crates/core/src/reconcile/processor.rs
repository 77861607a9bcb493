//! Per-order state machine.
//!
//! [`OrderProcessor::process`] is the isolation boundary: every error raised
//! while handling one order becomes that order's [`Outcome::Failed`] and
//! never reaches the run loop.

use std::collections::HashSet;
use std::sync::Arc;

use calsync_domain::{
    Attendee, OrderIdentity, Outcome, Result, SkipReason, SyncConfig, WorkOrder,
};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::differ::diff;
use super::index::{EventIndex, OrderKeyExtractor};
use super::mapper::EventMapper;
use super::ports::{BodyRenderer, CalendarTarget, WorkOrderSource};
use super::schedule::ScheduleResolver;

pub struct OrderProcessor {
    source: Arc<dyn WorkOrderSource>,
    target: Arc<dyn CalendarTarget>,
    renderer: Arc<dyn BodyRenderer>,
    resolver: ScheduleResolver,
    mapper: EventMapper,
    extractor: OrderKeyExtractor,
    dry_run: bool,
}

impl OrderProcessor {
    pub fn new(
        source: Arc<dyn WorkOrderSource>,
        target: Arc<dyn CalendarTarget>,
        renderer: Arc<dyn BodyRenderer>,
        settings: &SyncConfig,
    ) -> Result<Self> {
        Ok(Self {
            source,
            target,
            renderer,
            resolver: ScheduleResolver::new(&settings.service_order_url),
            mapper: EventMapper::new(&settings.time_zone, &settings.service_order_url),
            extractor: OrderKeyExtractor::new(
                &settings.order_number_prefix,
                &settings.service_order_url,
            )?,
            dry_run: settings.dry_run,
        })
    }

    pub fn extractor(&self) -> &OrderKeyExtractor {
        &self.extractor
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Reconcile one order against the calendar snapshot.
    pub async fn process(&self, order: &WorkOrder, index: &EventIndex, today: NaiveDate) -> Outcome {
        match self.try_process(order, index, today).await {
            Ok(outcome) => {
                debug!(order = %order.label(), %outcome, "order reconciled");
                outcome
            }
            Err(err) => {
                warn!(order = %order.label(), error = %err, "order failed");
                Outcome::Failed(err.to_string())
            }
        }
    }

    async fn try_process(
        &self,
        order: &WorkOrder,
        index: &EventIndex,
        today: NaiveDate,
    ) -> Result<Outcome> {
        let Some(to_date) = order.request_to_date()? else {
            return Ok(Outcome::Skipped(SkipReason::Unschedulable));
        };
        if to_date.date() < today {
            return Ok(Outcome::Past);
        }

        let identity = order.identity()?;
        let existing = index.lookup(
            Some(identity.service_order_id.as_str()),
            Some(identity.custom_order_number.as_str()),
        );

        if order.is_cancelled() {
            return match existing {
                Some(event_id) => {
                    self.delete(&identity, event_id).await?;
                    Ok(Outcome::Deleted)
                }
                None => Ok(Outcome::Skipped(SkipReason::NothingToDelete)),
            };
        }

        let schedule = self.resolver.resolve(order)?;
        let asset_count = self.source.count_assets(&identity.service_order_id).await?;
        let hyperlink =
            self.mapper.hyperlink(&identity.service_order_id, &identity.custom_order_number);
        let body = self.renderer.render(&hyperlink, asset_count);
        let attendees = self.gather_attendees(&identity).await?;
        let incoming =
            self.mapper.to_canonical(order, &schedule, body, order.address_line(), attendees);

        let Some(event_id) = existing else {
            if self.dry_run {
                info!(order = %identity.custom_order_number, "dry run: would have created event");
            } else {
                let event_id = self.target.create_event(&incoming).await?;
                info!(order = %identity.custom_order_number, %event_id, "created event");
            }
            return Ok(Outcome::Created);
        };

        let current = self.target.get_event(event_id).await?;
        let projected = self.mapper.project_existing(&current, &self.extractor)?;
        let changes = diff(&projected, &incoming);
        if changes.is_empty() {
            return Ok(Outcome::Skipped(SkipReason::UpToDate));
        }

        let attendees_only = changes.attendees_only();
        if self.dry_run {
            info!(
                order = %identity.custom_order_number,
                %event_id,
                fields = %changes,
                "dry run: would have updated event"
            );
        } else {
            self.target.update_event(event_id, &incoming, attendees_only).await?;
            info!(
                order = %identity.custom_order_number,
                %event_id,
                fields = %changes,
                attendees_only,
                "updated event"
            );
        }
        Ok(Outcome::Updated)
    }

    async fn delete(&self, identity: &OrderIdentity, event_id: &str) -> Result<()> {
        if self.dry_run {
            info!(order = %identity.custom_order_number, %event_id, "dry run: would have deleted event");
            return Ok(());
        }
        self.target.delete_event(event_id).await?;
        info!(order = %identity.custom_order_number, %event_id, "deleted event for cancelled order");
        Ok(())
    }

    /// Assigned technicians, one attendee per distinct employee.
    async fn gather_attendees(&self, identity: &OrderIdentity) -> Result<Vec<Attendee>> {
        let assignments = self.source.fetch_assignments(&identity.service_order_id).await?;

        let mut seen = HashSet::new();
        let mut attendees = Vec::new();
        for assignment in assignments {
            if !seen.insert(assignment.employee_id.clone()) {
                continue;
            }
            match self.source.fetch_attendee(&assignment.employee_id).await {
                Ok(attendee) => attendees.push(attendee),
                Err(err) => warn!(
                    order = %identity.custom_order_number,
                    employee_id = %assignment.employee_id,
                    error = %err,
                    "could not resolve attendee; leaving them off the event"
                ),
            }
        }
        Ok(attendees)
    }
}

