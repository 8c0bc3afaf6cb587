//! Pointer gesture state machine for the calendar grids.
//!
//! One machine per rendered grid. A gesture goes
//! `Idle -> PointerDown -> Dragging -> Idle`, ending either in exactly one
//! [`GestureCommit`] on pointer-up or in nothing when cleared.
//!
//! - Create: mousedown on empty time, drag to select a range
//! - Move: drag an existing event body
//! - Resize: drag the top/bottom edge of an existing timed event

mod auto_scroll;
mod callbacks;

pub use auto_scroll::AutoScroll;
pub use callbacks::{CalendarCallbacks, GestureCommit};
#[cfg(test)]
pub use callbacks::MockCalendarCallbacks;

use chrono::{DateTime, Duration, Local, NaiveDate};

use super::geometry::{snap_minutes, GridGeometry};
use super::schedule::{self, Rescheduled, ResizeHandle, ScheduleOptions};
use crate::error::GestureError;
use crate::models::drag::{CalendarView, DragItem, DropResult, DropZone, TimeOfDay};
use crate::models::settings::Settings;
use crate::utils::date::to_local;

/// Pointer position resolved against the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridPoint {
    pub date: NaiveDate,
    /// Day column index (week view has several)
    pub column: usize,
    /// Hour label of the cell under the pointer
    pub hour: u32,
    /// Vertical offset inside that cell
    pub offset_px: f32,
    pub zone: DropZone,
    /// Horizontal pointer position in viewport coordinates
    pub x: f32,
}

impl GridPoint {
    pub fn timed(date: NaiveDate, column: usize, hour: u32, offset_px: f32) -> Self {
        Self {
            date,
            column,
            hour,
            offset_px,
            zone: DropZone::Timed,
            x: 0.0,
        }
    }

    pub fn all_day(date: NaiveDate, column: usize) -> Self {
        Self {
            date,
            column,
            hour: 0,
            offset_px: 0.0,
            zone: DropZone::AllDay,
            x: 0.0,
        }
    }

    pub fn at_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }
}

/// What started the gesture.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureKind {
    Create,
    Move(DragItem),
    Resize { item: DragItem, handle: ResizeHandle },
}

#[derive(Clone, Debug, PartialEq)]
pub enum GestureState {
    Idle,
    PointerDown {
        kind: GestureKind,
        origin: GridPoint,
    },
    Dragging {
        kind: GestureKind,
        origin: GridPoint,
        current: GridPoint,
    },
}

/// Provisional placement shown while dragging.
#[derive(Clone, Debug, PartialEq)]
pub struct DragIndicator {
    pub date: NaiveDate,
    pub column: usize,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub all_day: bool,
}

pub struct GestureMachine {
    view: CalendarView,
    geometry: GridGeometry,
    schedule: ScheduleOptions,
    auto_scroll: AutoScroll,
    click_threshold_px: f32,
    min_gesture: Duration,
    state: GestureState,
    indicator: Option<DragIndicator>,
}

impl GestureMachine {
    pub fn new(view: CalendarView, settings: &Settings) -> Self {
        Self {
            view,
            geometry: GridGeometry::from_settings(settings),
            schedule: ScheduleOptions::from_settings(settings),
            auto_scroll: AutoScroll::from_settings(settings),
            click_threshold_px: settings.click_threshold_px,
            min_gesture: settings.min_gesture_duration(),
            state: GestureState::Idle,
            indicator: None,
        }
    }

    pub fn view(&self) -> CalendarView {
        self.view
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    pub fn indicator(&self) -> Option<&DragIndicator> {
        self.indicator.as_ref()
    }

    /// Start a gesture. Rejected while another gesture is active.
    pub fn pointer_down(&mut self, kind: GestureKind, origin: GridPoint) -> Result<(), GestureError> {
        if self.is_active() {
            log::warn!("Ignoring pointer down on {:?}: gesture already in progress", origin.date);
            return Err(GestureError::GestureInProgress);
        }

        if let GestureKind::Move(item) | GestureKind::Resize { item, .. } = &kind {
            if !item.event.is_draggable {
                return Err(GestureError::NotDraggable(item.event.id.clone()));
            }
        }

        log::debug!("Gesture started in {:?} view at {:?}", self.view, origin);
        self.indicator = None;
        self.state = GestureState::PointerDown { kind, origin };
        Ok(())
    }

    /// Track the pointer. Returns the updated indicator, if any.
    pub fn pointer_move(&mut self, point: GridPoint) -> Option<&DragIndicator> {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        self.state = match state {
            GestureState::Idle => GestureState::Idle,
            GestureState::PointerDown { kind, origin }
            | GestureState::Dragging { kind, origin, .. } => GestureState::Dragging {
                kind,
                origin,
                current: point,
            },
        };

        self.indicator = match &self.state {
            GestureState::Dragging {
                kind,
                origin,
                current,
            } => self.provisional(kind, origin, current),
            _ => None,
        };
        self.indicator.as_ref()
    }

    /// Scroll increment to apply while dragging near a viewport edge.
    /// Has no effect on the gesture itself.
    pub fn auto_scroll(&self, pointer_x: f32, viewport_left: f32, viewport_right: f32) -> f32 {
        match self.state {
            GestureState::Dragging { .. } => {
                self.auto_scroll.delta(pointer_x, viewport_left, viewport_right)
            }
            _ => 0.0,
        }
    }

    /// Finish the gesture at `point` and return its commit, if any.
    pub fn pointer_up(&mut self, point: GridPoint) -> Option<GestureCommit> {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        self.indicator = None;

        let (kind, origin, current) = match state {
            GestureState::Idle => return None,
            GestureState::PointerDown { kind, origin } => (kind, origin, point),
            GestureState::Dragging { kind, origin, .. } => (kind, origin, point),
        };

        let commit = self.commit(kind, &origin, &current);
        log::debug!("Gesture finished: {:?}", commit);
        commit
    }

    /// Cancel any gesture without emitting a commit. Returns whether a
    /// gesture was active.
    pub fn clear(&mut self) -> bool {
        let was_active = self.is_active();
        if was_active {
            log::debug!("Gesture cleared");
        }
        self.state = GestureState::Idle;
        self.indicator = None;
        was_active
    }

    fn y(&self, point: &GridPoint) -> f32 {
        point.hour as f32 * self.geometry.hour_height + point.offset_px
    }

    fn is_click(&self, origin: &GridPoint, current: &GridPoint) -> bool {
        if origin.column != current.column || origin.zone != current.zone {
            return false;
        }
        let dy = self.y(current) - self.y(origin);
        let dx = current.x - origin.x;
        dx.hypot(dy) < self.click_threshold_px
    }

    fn time_at(&self, point: &GridPoint) -> TimeOfDay {
        self.geometry.time_at(point.hour, point.offset_px)
    }

    fn slot_at(&self, point: &GridPoint) -> TimeOfDay {
        self.geometry.slot_at(point.hour, point.offset_px)
    }

    /// Ordered `(start, end)` of a create selection ending at `current`.
    fn selection(&self, origin: &GridPoint, current: &GridPoint) -> Option<(DateTime<Local>, DateTime<Local>)> {
        let mut from = self.time_at(origin);
        let mut to = self.time_at(current);
        if to < from {
            std::mem::swap(&mut from, &mut to);
        }

        let start = to_local(from.on(current.date)?)?;
        let end = to_local(to.on(current.date)?)?;
        Some((start, end))
    }

    /// Drop target for moving `item` from `origin` to `current`.
    fn drop_target(&self, item: &DragItem, origin: &GridPoint, current: &GridPoint) -> DropResult {
        if self.view == CalendarView::Month {
            return DropResult::month_cell(current.date);
        }
        if current.zone == DropZone::AllDay {
            return DropResult::all_day(current.date, self.view);
        }

        // Timed drop: shift by the pointer delta so the grab point stays put.
        // Events coming from the all-day row land where the pointer is.
        let time = if item.event.all_day || origin.zone == DropZone::AllDay {
            self.slot_at(current)
        } else {
            let delta = self.time_at(current).total_minutes() as i64
                - self.time_at(origin).total_minutes() as i64;
            let original = TimeOfDay::from_time(item.event.start.time()).total_minutes() as i64;
            let shifted = snap_minutes(original + delta, self.geometry.snap);
            let last = self.geometry.last_slot().total_minutes() as i64;
            TimeOfDay::from_minutes(shifted.clamp(0, last) as u32)
        };
        DropResult::timed(current.date, time, self.view)
    }

    fn resized(&self, item: &DragItem, handle: ResizeHandle, current: &GridPoint) -> Option<Rescheduled> {
        schedule::resize(
            &item.event,
            handle,
            current.date,
            self.time_at(current),
            &self.schedule,
        )
    }

    fn provisional(&self, kind: &GestureKind, origin: &GridPoint, current: &GridPoint) -> Option<DragIndicator> {
        let (start, end, all_day) = match kind {
            GestureKind::Create => {
                if origin.zone == DropZone::AllDay {
                    return None;
                }
                let (start, end) = self.selection(origin, current)?;
                (start, end, false)
            }
            GestureKind::Move(item) => {
                let drop = self.drop_target(item, origin, current);
                let placed = schedule::recalculate(item, &drop, &self.schedule)?;
                (placed.start, placed.end, placed.all_day)
            }
            GestureKind::Resize { item, handle } => {
                let placed = self.resized(item, *handle, current)?;
                (placed.start, placed.end, false)
            }
        };

        Some(DragIndicator {
            date: current.date,
            column: current.column,
            start,
            end,
            all_day,
        })
    }

    fn commit(&self, kind: GestureKind, origin: &GridPoint, current: &GridPoint) -> Option<GestureCommit> {
        let click = self.is_click(origin, current);

        match kind {
            GestureKind::Create => {
                if origin.zone == DropZone::AllDay {
                    return Some(GestureCommit::AllDayClick { date: origin.date });
                }
                let slot_click = GestureCommit::TimeSlotClick {
                    date: origin.date,
                    time: self.slot_at(origin),
                };
                if click || current.zone == DropZone::AllDay {
                    return Some(slot_click);
                }
                match self.selection(origin, current) {
                    Some((start, end)) if end - start >= self.min_gesture => Some(GestureCommit::Create {
                        date: current.date,
                        start,
                        end,
                    }),
                    _ => Some(slot_click),
                }
            }
            GestureKind::Move(item) => {
                if click {
                    return Some(GestureCommit::EventClick(item.event));
                }
                let drop = self.drop_target(&item, origin, current);
                Some(GestureCommit::Drop { item, drop })
            }
            GestureKind::Resize { item, handle } => {
                if click {
                    return None;
                }
                let rescheduled = self.resized(&item, handle, current)?;
                Some(GestureCommit::Resize {
                    item,
                    handle,
                    rescheduled,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::CalendarEvent;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    // Tuesday
    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
    }

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
    }

    fn local(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Local> {
        to_local(date.and_hms_opt(hour, minute, 0).unwrap()).unwrap()
    }

    fn machine(view: CalendarView) -> GestureMachine {
        GestureMachine::new(view, &Settings::default())
    }

    fn meeting(view: CalendarView) -> DragItem {
        let event = CalendarEvent::new(
            "e1",
            "Meeting",
            local(tuesday(), 9, 0),
            local(tuesday(), 10, 0),
        )
        .unwrap();
        DragItem::new(event, view)
    }

    #[test]
    fn test_drag_create_scenario() {
        let mut machine = machine(CalendarView::Week);
        machine
            .pointer_down(GestureKind::Create, GridPoint::timed(tuesday(), 1, 9, 0.0))
            .unwrap();
        machine.pointer_move(GridPoint::timed(tuesday(), 1, 9, 45.0));
        let commit = machine.pointer_up(GridPoint::timed(tuesday(), 1, 10, 30.0));

        assert_eq!(
            commit,
            Some(GestureCommit::Create {
                date: tuesday(),
                start: local(tuesday(), 9, 0),
                end: local(tuesday(), 10, 30),
            })
        );
        assert!(!machine.is_active());
    }

    #[test]
    fn test_short_click_fires_time_slot_click() {
        let mut machine = machine(CalendarView::Week);
        machine
            .pointer_down(GestureKind::Create, GridPoint::timed(tuesday(), 1, 9, 10.0))
            .unwrap();
        let commit = machine.pointer_up(GridPoint::timed(tuesday(), 1, 9, 16.0));

        assert_eq!(
            commit,
            Some(GestureCommit::TimeSlotClick {
                date: tuesday(),
                time: TimeOfDay::new(9, 15),
            })
        );
    }

    #[test]
    fn test_click_at_bottom_of_last_hour_stays_on_the_day() {
        let mut machine = machine(CalendarView::Day);
        machine
            .pointer_down(GestureKind::Create, GridPoint::timed(tuesday(), 0, 23, 55.0))
            .unwrap();
        let commit = machine.pointer_up(GridPoint::timed(tuesday(), 0, 23, 56.0));

        assert_eq!(
            commit,
            Some(GestureCommit::TimeSlotClick {
                date: tuesday(),
                time: TimeOfDay::new(23, 45),
            })
        );
    }

    #[test]
    fn test_drag_below_minimum_duration_is_click() {
        let settings = Settings {
            snap_minutes: 5,
            ..Default::default()
        };
        let mut machine = GestureMachine::new(CalendarView::Day, &settings);
        machine
            .pointer_down(GestureKind::Create, GridPoint::timed(tuesday(), 0, 9, 0.0))
            .unwrap();
        let commit = machine.pointer_up(GridPoint::timed(tuesday(), 0, 9, 12.0));

        assert!(matches!(commit, Some(GestureCommit::TimeSlotClick { .. })));
    }

    #[test]
    fn test_upward_drag_swaps_range() {
        let mut machine = machine(CalendarView::Day);
        machine
            .pointer_down(GestureKind::Create, GridPoint::timed(tuesday(), 0, 11, 0.0))
            .unwrap();
        let indicator = machine
            .pointer_move(GridPoint::timed(tuesday(), 0, 9, 30.0))
            .cloned()
            .unwrap();

        assert_eq!(indicator.start, local(tuesday(), 9, 30));
        assert_eq!(indicator.end, local(tuesday(), 11, 0));
    }

    #[test]
    fn test_cross_column_drag_follows_pointer_day() {
        let mut machine = machine(CalendarView::Week);
        machine
            .pointer_down(GestureKind::Create, GridPoint::timed(tuesday(), 1, 9, 0.0))
            .unwrap();
        let indicator = machine
            .pointer_move(GridPoint::timed(wednesday(), 2, 10, 0.0))
            .cloned()
            .unwrap();
        assert_eq!(indicator.column, 2);
        assert_eq!(indicator.date, wednesday());

        let commit = machine.pointer_up(GridPoint::timed(wednesday(), 2, 10, 0.0));
        assert_eq!(
            commit,
            Some(GestureCommit::Create {
                date: wednesday(),
                start: local(wednesday(), 9, 0),
                end: local(wednesday(), 10, 0),
            })
        );
    }

    #[test]
    fn test_all_day_row_click() {
        let mut machine = machine(CalendarView::Week);
        machine
            .pointer_down(GestureKind::Create, GridPoint::all_day(tuesday(), 1))
            .unwrap();
        let commit = machine.pointer_up(GridPoint::all_day(tuesday(), 1));

        assert_eq!(commit, Some(GestureCommit::AllDayClick { date: tuesday() }));
    }

    #[test]
    fn test_second_pointer_down_is_rejected() {
        let mut machine = machine(CalendarView::Week);
        let origin = GridPoint::timed(tuesday(), 1, 9, 0.0);
        machine.pointer_down(GestureKind::Create, origin.clone()).unwrap();
        machine.pointer_move(GridPoint::timed(tuesday(), 1, 10, 0.0));

        let result = machine.pointer_down(GestureKind::Create, GridPoint::timed(tuesday(), 1, 14, 0.0));
        assert_eq!(result, Err(GestureError::GestureInProgress));

        // The original gesture is untouched
        match machine.state() {
            GestureState::Dragging { origin: kept, .. } => assert_eq!(kept, &origin),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_clear_cancels_without_commit() {
        let mut machine = machine(CalendarView::Week);
        machine
            .pointer_down(GestureKind::Create, GridPoint::timed(tuesday(), 1, 9, 0.0))
            .unwrap();
        machine.pointer_move(GridPoint::timed(tuesday(), 1, 11, 0.0));

        assert!(machine.clear());
        assert!(machine.indicator().is_none());
        assert_eq!(machine.pointer_up(GridPoint::timed(tuesday(), 1, 11, 0.0)), None);
        assert!(!machine.clear());
    }

    #[test]
    fn test_pointer_up_when_idle_is_noop() {
        let mut machine = machine(CalendarView::Day);
        assert_eq!(machine.pointer_up(GridPoint::timed(tuesday(), 0, 9, 0.0)), None);
    }

    #[test]
    fn test_non_draggable_event_cannot_start_move() {
        let mut machine = machine(CalendarView::Week);
        let mut item = meeting(CalendarView::Week);
        item.event.is_draggable = false;

        let result = machine.pointer_down(GestureKind::Move(item), GridPoint::timed(tuesday(), 1, 9, 0.0));
        assert_eq!(result, Err(GestureError::NotDraggable("e1".to_string())));
        assert!(!machine.is_active());
    }

    #[test]
    fn test_move_keeps_grab_offset() {
        let mut machine = machine(CalendarView::Week);
        let item = meeting(CalendarView::Week);
        // Grab the event 30 minutes below its start
        machine
            .pointer_down(GestureKind::Move(item.clone()), GridPoint::timed(tuesday(), 1, 9, 30.0))
            .unwrap();
        machine.pointer_move(GridPoint::timed(wednesday(), 2, 14, 0.0));
        let indicator = machine.indicator().cloned().unwrap();
        assert_eq!(indicator.start, local(wednesday(), 13, 30));
        assert_eq!(indicator.end, local(wednesday(), 14, 30));

        let commit = machine.pointer_up(GridPoint::timed(wednesday(), 2, 14, 0.0));
        assert_eq!(
            commit,
            Some(GestureCommit::Drop {
                item,
                drop: DropResult::timed(wednesday(), TimeOfDay::new(13, 30), CalendarView::Week),
            })
        );
    }

    #[test]
    fn test_move_past_end_of_day_lands_on_last_slot() {
        let mut machine = machine(CalendarView::Week);
        let item = meeting(CalendarView::Week);
        machine
            .pointer_down(GestureKind::Move(item.clone()), GridPoint::timed(tuesday(), 1, 9, 0.0))
            .unwrap();

        let commit = machine.pointer_up(GridPoint::timed(wednesday(), 2, 23, 55.0));
        assert_eq!(
            commit,
            Some(GestureCommit::Drop {
                item,
                drop: DropResult::timed(wednesday(), TimeOfDay::new(23, 45), CalendarView::Week),
            })
        );
    }

    #[test]
    fn test_move_into_all_day_row() {
        let mut machine = machine(CalendarView::Week);
        let item = meeting(CalendarView::Week);
        machine
            .pointer_down(GestureKind::Move(item.clone()), GridPoint::timed(tuesday(), 1, 9, 0.0))
            .unwrap();
        let commit = machine.pointer_up(GridPoint::all_day(wednesday(), 2));

        assert_eq!(
            commit,
            Some(GestureCommit::Drop {
                item,
                drop: DropResult::all_day(wednesday(), CalendarView::Week),
            })
        );
    }

    #[test]
    fn test_month_view_move_drops_on_cell() {
        let mut machine = machine(CalendarView::Month);
        let item = meeting(CalendarView::Month);
        machine
            .pointer_down(GestureKind::Move(item.clone()), GridPoint::all_day(tuesday(), 2).at_x(200.0))
            .unwrap();
        let commit = machine.pointer_up(GridPoint::all_day(wednesday(), 3).at_x(340.0));

        assert_eq!(
            commit,
            Some(GestureCommit::Drop {
                item,
                drop: DropResult::month_cell(wednesday()),
            })
        );
    }

    #[test]
    fn test_move_without_travel_is_event_click() {
        let mut machine = machine(CalendarView::Week);
        let item = meeting(CalendarView::Week);
        machine
            .pointer_down(GestureKind::Move(item.clone()), GridPoint::timed(tuesday(), 1, 9, 20.0))
            .unwrap();
        let commit = machine.pointer_up(GridPoint::timed(tuesday(), 1, 9, 24.0));

        assert_eq!(commit, Some(GestureCommit::EventClick(item.event)));
    }

    #[test]
    fn test_resize_bottom_handle() {
        let mut machine = machine(CalendarView::Day);
        let item = meeting(CalendarView::Day);
        machine
            .pointer_down(
                GestureKind::Resize {
                    item: item.clone(),
                    handle: ResizeHandle::Bottom,
                },
                GridPoint::timed(tuesday(), 0, 10, 0.0),
            )
            .unwrap();
        let commit = machine.pointer_up(GridPoint::timed(tuesday(), 0, 11, 30.0));

        match commit {
            Some(GestureCommit::Resize { rescheduled, handle, .. }) => {
                assert_eq!(handle, ResizeHandle::Bottom);
                assert_eq!(rescheduled.start, local(tuesday(), 9, 0));
                assert_eq!(rescheduled.end, local(tuesday(), 11, 30));
            }
            other => panic!("unexpected commit {other:?}"),
        }
    }

    #[test]
    fn test_resize_past_start_is_discarded() {
        let mut machine = machine(CalendarView::Day);
        let item = meeting(CalendarView::Day);
        machine
            .pointer_down(
                GestureKind::Resize {
                    item,
                    handle: ResizeHandle::Bottom,
                },
                GridPoint::timed(tuesday(), 0, 10, 0.0),
            )
            .unwrap();

        assert_eq!(machine.pointer_up(GridPoint::timed(tuesday(), 0, 8, 0.0)), None);
    }

    #[test]
    fn test_auto_scroll_only_while_dragging() {
        let mut machine = machine(CalendarView::Week);
        assert_eq!(machine.auto_scroll(10.0, 0.0, 1000.0), 0.0);

        machine
            .pointer_down(GestureKind::Create, GridPoint::timed(tuesday(), 1, 9, 0.0))
            .unwrap();
        machine.pointer_move(GridPoint::timed(tuesday(), 1, 10, 0.0).at_x(980.0));
        let before = machine.indicator().cloned();

        assert_eq!(machine.auto_scroll(980.0, 0.0, 1000.0), 20.0);
        assert_eq!(machine.indicator().cloned(), before);
    }

    #[test]
    fn test_commit_dispatches_once() {
        let mut machine = machine(CalendarView::Week);
        machine
            .pointer_down(GestureKind::Create, GridPoint::timed(tuesday(), 1, 9, 0.0))
            .unwrap();
        let commit = machine
            .pointer_up(GridPoint::timed(tuesday(), 1, 10, 30.0))
            .unwrap();

        let mut callbacks = MockCalendarCallbacks::new();
        callbacks
            .expect_on_drag_create()
            .with(eq(local(tuesday(), 9, 0)), eq(local(tuesday(), 10, 30)))
            .times(1)
            .return_const(());
        callbacks.expect_on_time_slot_click().never();

        commit.dispatch(&mut callbacks);
    }
}
