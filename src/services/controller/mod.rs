//! Applies completed gestures to the task and event stores.
//!
//! The controller owns a merged, optimistic view of the calendar. A drop or
//! resize is shown immediately, written to the owning store, and either
//! confirmed or rolled back with a user-facing [`Notice`].

use std::collections::HashMap;

use crate::error::{ScheduleError, ScheduleResult, StoreError, StoreResult};
use crate::models::drag::{DragItem, DropResult};
use crate::models::event::CalendarEvent;
use crate::models::settings::Settings;
use crate::models::task::TaskUpdate;
use crate::services::gesture::{CalendarCallbacks, GestureCommit};
use crate::services::merge::{merge_events, MergeOptions};
use crate::services::optimistic::{Notice, Optimistic, Settled};
use crate::services::schedule::{self, Rescheduled, ScheduleOptions};
use crate::services::store::{Clock, EventStore, TaskStore};

/// Store write produced by a drop or resize.
#[derive(Clone, Debug, PartialEq)]
pub enum WriteTarget {
    Task { task_id: String, update: TaskUpdate },
    Event(CalendarEvent),
}

/// A write that has been applied optimistically and still has to be
/// performed and settled with [`CalendarController::complete`].
#[derive(Clone, Debug, PartialEq)]
pub struct PendingWrite {
    /// Id of the calendar entry being moved
    pub event_id: String,
    /// Identifies the optimistic proposal this write settles
    pub generation: u64,
    pub rescheduled: Rescheduled,
    /// Entry as shown while the write is in flight
    pub proposed: CalendarEvent,
    pub target: WriteTarget,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DropOutcome {
    Applied(Rescheduled),
    /// The drop did not resolve to a valid schedule; nothing changed.
    Ignored,
}

pub struct CalendarController<T: TaskStore, E: EventStore, C: Clock> {
    tasks: T,
    events: E,
    clock: C,
    merge: MergeOptions,
    schedule: ScheduleOptions,
    order: Vec<String>,
    cache: HashMap<String, Optimistic<CalendarEvent>>,
    notices: Vec<Notice>,
    generation: u64,
}

impl<T: TaskStore, E: EventStore, C: Clock> CalendarController<T, E, C> {
    pub fn new(tasks: T, events: E, clock: C, settings: &Settings) -> Self {
        Self {
            tasks,
            events,
            clock,
            merge: MergeOptions::from_settings(settings),
            schedule: ScheduleOptions::from_settings(settings),
            order: Vec::new(),
            cache: HashMap::new(),
            notices: Vec::new(),
            generation: 0,
        }
    }

    pub fn task_store(&self) -> &T {
        &self.tasks
    }

    pub fn task_store_mut(&mut self) -> &mut T {
        &mut self.tasks
    }

    pub fn event_store(&self) -> &E {
        &self.events
    }

    pub fn event_store_mut(&mut self) -> &mut E {
        &mut self.events
    }

    /// Reload tasks, projects and events and rebuild the merged view.
    /// Entries with a write in flight keep showing their proposal.
    pub fn refresh(&mut self) -> ScheduleResult<()> {
        let tasks = self.tasks.tasks()?;
        let projects = self.tasks.projects()?;
        let events = self.events.events()?;
        let merged = merge_events(&events, &tasks, &projects, &self.merge);

        let mut cache = HashMap::with_capacity(merged.len());
        let mut order = Vec::with_capacity(merged.len());
        for event in merged {
            let id = event.id.clone();
            let entry = match self.cache.remove(&id) {
                Some(mut entry) => {
                    entry.refresh(event);
                    entry
                }
                None => Optimistic::new(event),
            };
            order.push(id.clone());
            cache.insert(id, entry);
        }

        log::debug!("Refreshed calendar with {} entries", order.len());
        self.order = order;
        self.cache = cache;
        Ok(())
    }

    /// Current merged view in merge order.
    pub fn events(&self) -> Vec<CalendarEvent> {
        self.order
            .iter()
            .filter_map(|id| self.cache.get(id))
            .map(|entry| entry.current().clone())
            .collect()
    }

    pub fn event(&self, id: &str) -> Option<&CalendarEvent> {
        self.cache.get(id).map(Optimistic::current)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.cache.get(id).is_some_and(Optimistic::is_pending)
    }

    /// Drain the notices queued since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Apply a drop optimistically and return the store write to perform.
    ///
    /// Returns `Ok(None)` when the drop is invalid. Fails with
    /// `EntityNotFound` when the task or event was deleted meanwhile.
    pub fn begin_drop(
        &mut self,
        item: &DragItem,
        drop: &DropResult,
    ) -> ScheduleResult<Option<PendingWrite>> {
        if !item.event.is_draggable {
            log::warn!("Ignoring drop of non-draggable event {}", item.event.id);
            return Ok(None);
        }

        let Some(rescheduled) = schedule::recalculate(item, drop, &self.schedule) else {
            log::warn!(
                "Ignoring drop of {} on {}: date out of range",
                item.event.id,
                drop.target_date
            );
            return Ok(None);
        };

        self.begin_write(&item.event, rescheduled).map(Some)
    }

    /// Apply a resize optimistically and return the store write to perform.
    pub fn begin_resize(
        &mut self,
        item: &DragItem,
        rescheduled: &Rescheduled,
    ) -> ScheduleResult<PendingWrite> {
        self.begin_write(&item.event, rescheduled.clone())
    }

    /// Send a pending write to the owning store.
    pub fn perform(&mut self, write: &PendingWrite) -> StoreResult<()> {
        match &write.target {
            WriteTarget::Task { task_id, update } => self.tasks.update_task(task_id, update),
            WriteTarget::Event(event) => self.events.replace_event(event.clone()),
        }
    }

    /// Settle a pending write with the store's answer. A failure restores
    /// the previous schedule and queues an error notice.
    ///
    /// A write overtaken by a newer drop of the same entry never touches the
    /// newer proposal: its success becomes the rollback target, its failure
    /// is logged and returned without rolling back.
    pub fn complete(&mut self, write: PendingWrite, result: StoreResult<()>) -> ScheduleResult<()> {
        let entry = self
            .cache
            .get_mut(&write.event_id)
            .ok_or_else(|| ScheduleError::NoPendingWrite(write.event_id.clone()))?;

        let err = match result {
            Ok(()) => {
                return match entry.confirm(write.generation, write.proposed) {
                    Settled::Applied => {
                        log::debug!("Saved new schedule for {}", write.event_id);
                        Ok(())
                    }
                    Settled::Superseded => {
                        log::debug!(
                            "Saved schedule for {} behind a newer move",
                            write.event_id
                        );
                        Ok(())
                    }
                    Settled::NotPending => Err(ScheduleError::NoPendingWrite(write.event_id)),
                };
            }
            Err(err) => err,
        };

        match entry.fail(write.generation, err.to_string()) {
            Settled::Applied => {
                let title = entry.current().title.clone();
                log::error!("Failed to reschedule {}: {}", write.event_id, err);
                self.notices
                    .push(Notice::error(format!("Could not move \"{}\": {}", title, err)));
            }
            Settled::Superseded => {
                log::warn!(
                    "Earlier move of {} failed after a newer move: {}",
                    write.event_id,
                    err
                );
            }
            Settled::NotPending => return Err(ScheduleError::NoPendingWrite(write.event_id)),
        }

        Err(match err {
            StoreError::TaskNotFound(id) | StoreError::EventNotFound(id) => {
                ScheduleError::EntityNotFound(id)
            }
            other => ScheduleError::Store(other),
        })
    }

    /// Drop an event and write it through synchronously.
    pub fn drop_event(&mut self, item: &DragItem, drop: &DropResult) -> ScheduleResult<DropOutcome> {
        match self.begin_drop(item, drop)? {
            Some(write) => self.settle(write),
            None => Ok(DropOutcome::Ignored),
        }
    }

    /// Resize an event and write it through synchronously.
    pub fn resize_event(
        &mut self,
        item: &DragItem,
        rescheduled: &Rescheduled,
    ) -> ScheduleResult<DropOutcome> {
        let write = self.begin_resize(item, rescheduled)?;
        self.settle(write)
    }

    /// Route a finished gesture: moves and resizes are written through the
    /// stores, everything else goes to `callbacks`.
    pub fn handle_commit<CB: CalendarCallbacks + ?Sized>(
        &mut self,
        commit: GestureCommit,
        callbacks: &mut CB,
    ) -> ScheduleResult<()> {
        match commit {
            GestureCommit::Drop { item, drop } => self.drop_event(&item, &drop).map(|_| ()),
            GestureCommit::Resize {
                item, rescheduled, ..
            } => self.resize_event(&item, &rescheduled).map(|_| ()),
            other => {
                other.dispatch(callbacks);
                Ok(())
            }
        }
    }

    fn settle(&mut self, write: PendingWrite) -> ScheduleResult<DropOutcome> {
        let rescheduled = write.rescheduled.clone();
        let result = self.perform(&write);
        self.complete(write, result)?;
        Ok(DropOutcome::Applied(rescheduled))
    }

    fn begin_write(
        &mut self,
        event: &CalendarEvent,
        rescheduled: Rescheduled,
    ) -> ScheduleResult<PendingWrite> {
        let target = match self.write_target(event, &rescheduled) {
            Ok(target) => target,
            Err(err) => {
                if let ScheduleError::EntityNotFound(id) = &err {
                    log::warn!("Cannot move {}: {} no longer exists", event.id, id);
                    self.notices
                        .push(Notice::warning(format!("\"{}\" no longer exists", event.title)));
                }
                return Err(err);
            }
        };

        self.generation += 1;
        let generation = self.generation;
        let proposed = schedule::apply_to_event(event, &rescheduled);
        self.cache
            .entry(event.id.clone())
            .or_insert_with(|| Optimistic::new(event.clone()))
            .begin(proposed.clone(), generation);
        if !self.order.contains(&event.id) {
            self.order.push(event.id.clone());
        }

        log::debug!(
            "Moving {} to {} - {}",
            event.id,
            rescheduled.start,
            rescheduled.end
        );
        Ok(PendingWrite {
            event_id: event.id.clone(),
            generation,
            rescheduled,
            proposed,
            target,
        })
    }

    fn write_target(
        &self,
        event: &CalendarEvent,
        rescheduled: &Rescheduled,
    ) -> ScheduleResult<WriteTarget> {
        if event.is_task {
            let task_id = event
                .task_id
                .clone()
                .ok_or_else(|| ScheduleError::EntityNotFound(event.id.clone()))?;
            let task = self
                .tasks
                .task(&task_id)?
                .ok_or_else(|| ScheduleError::EntityNotFound(task_id.clone()))?;
            let update = schedule::task_update(
                &task,
                rescheduled,
                self.clock.today(),
                self.schedule.field_format,
            );
            Ok(WriteTarget::Task { task_id, update })
        } else {
            let stored = self
                .events
                .event(&event.id)?
                .ok_or_else(|| ScheduleError::EntityNotFound(event.id.clone()))?;
            Ok(WriteTarget::Event(schedule::apply_to_event(&stored, rescheduled)))
        }
    }
}
