//! Deterministic single-threaded timer queue with a virtual clock.
//!
//! Tasks are ordered by (due time, scheduling order) and removed from the
//! queue before they run, so a task scheduled by a running task with a later
//! deadline is never executed in the same pass. There is no preemption: every
//! callback runs to completion before the next one starts.

use std::fmt;
use std::rc::Rc;

use crate::{Error, Page, Result};

pub(crate) struct TimerCallback(pub(crate) Rc<dyn Fn(&mut Page) -> Result<()>>);

impl Clone for TimerCallback {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl fmt::Debug for TimerCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TimerCallback")
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) callback: TimerCallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
}

#[derive(Debug)]
pub(crate) struct Scheduler {
    pub(crate) task_queue: Vec<ScheduledTask>,
    pub(crate) now_ms: i64,
    pub(crate) timer_step_limit: usize,
    next_timer_id: i64,
    next_task_order: i64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            task_queue: Vec::new(),
            now_ms: 0,
            timer_step_limit: 10_000,
            next_timer_id: 1,
            next_task_order: 0,
        }
    }
}

impl Scheduler {
    fn allocate_timer_id(&mut self) -> i64 {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        id
    }

    fn allocate_task_order(&mut self) -> i64 {
        let order = self.next_task_order;
        self.next_task_order += 1;
        order
    }
}

impl Page {
    pub(crate) fn set_timeout(&mut self, delay_ms: i64, callback: TimerCallback) -> i64 {
        let id = self.scheduler.allocate_timer_id();
        let order = self.scheduler.allocate_task_order();
        let due_at = self.scheduler.now_ms.saturating_add(delay_ms.max(0));
        self.scheduler.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            callback,
        });
        id
    }

    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .scheduler
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Runtime(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.scheduler.now_ms;
        self.scheduler.now_ms = self.scheduler.now_ms.saturating_add(delta_ms);
        let ran = self.run_due_timers_internal()?;
        self.trace_line(format!(
            "[timer] advance delta_ms={} from={} to={} ran_due={}",
            delta_ms, from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.scheduler.now_ms {
            return Err(Error::Runtime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.scheduler.now_ms
            )));
        }
        let from = self.scheduler.now_ms;
        self.scheduler.now_ms = target_ms;
        let ran = self.run_due_timers_internal()?;
        self.trace_line(format!(
            "[timer] advance_to from={} to={} ran_due={}",
            from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    /// Runs every task due at the current virtual time, including tasks that
    /// become due while running, without moving the clock.
    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_due_timers_internal()?;
        self.trace_line(format!(
            "[timer] run_due now_ms={} ran={}",
            self.scheduler.now_ms, ran
        ));
        Ok(ran)
    }

    /// Drains the queue, jumping the clock to each task's deadline. Errs with
    /// the step limit when tasks keep rescheduling themselves, which a held
    /// spinner session does.
    pub fn flush(&mut self) -> Result<usize> {
        let mut ran = 0usize;
        while let Some(idx) = self.next_task_index(None) {
            if ran >= self.scheduler.timer_step_limit {
                return Err(Error::Runtime("timer step limit exceeded".into()));
            }
            let task = self.scheduler.task_queue.remove(idx);
            if task.due_at > self.scheduler.now_ms {
                self.scheduler.now_ms = task.due_at;
            }
            (task.callback.0)(self)?;
            ran += 1;
        }
        self.trace_line(format!(
            "[timer] flush now_ms={} ran={}",
            self.scheduler.now_ms, ran
        ));
        Ok(ran)
    }

    fn run_due_timers_internal(&mut self) -> Result<usize> {
        let mut ran = 0usize;
        while let Some(idx) = self.next_task_index(Some(self.scheduler.now_ms)) {
            if ran >= self.scheduler.timer_step_limit {
                return Err(Error::Runtime("timer step limit exceeded".into()));
            }
            let task = self.scheduler.task_queue.remove(idx);
            (task.callback.0)(self)?;
            ran += 1;
        }
        Ok(ran)
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.scheduler
            .task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }
}
