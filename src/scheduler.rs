// Delayed-task queue for the single UI context.
//
// Nothing here runs on its own: the host loop advances the clock, asks for the next
// deadline to sleep on, and pops due tasks one by one. Cancelling a task removes its
// token from the queue, so a removed task can never be popped afterwards.

use std::time::{Duration, Instant};

/// Work the UI context can be asked to do later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// One step of the blinder's alpha convergence.
    BlinderTick,
    /// Recognizer: finger held still long enough to show press feedback.
    ShowPress,
    /// Recognizer: finger held still long enough to count as a long press.
    LongPress,
}

/// Identity of one posted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskToken(u64);

#[derive(Debug)]
struct Pending {
    due: Instant,
    token: TaskToken,
    task: Task,
}

#[derive(Debug)]
pub struct UiScheduler {
    now: Instant,
    next_token: u64,
    queue: Vec<Pending>,
}

impl UiScheduler {
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            next_token: 0,
            queue: Vec::new(),
        }
    }

    /// Current time as last observed by the host loop.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Move the clock forward. Time never goes backwards.
    pub fn advance_to(&mut self, now: Instant) {
        if now > self.now {
            self.now = now;
        }
    }

    pub fn post(&mut self, task: Task) -> TaskToken {
        self.post_delayed(task, Duration::ZERO)
    }

    pub fn post_delayed(&mut self, task: Task, delay: Duration) -> TaskToken {
        let token = TaskToken(self.next_token);
        self.next_token += 1;
        self.queue.push(Pending {
            due: self.now + delay,
            token,
            task,
        });
        token
    }

    /// Remove a pending task. Returns false if it already ran or was removed.
    pub fn remove(&mut self, token: TaskToken) -> bool {
        let before = self.queue.len();
        self.queue.retain(|p| p.token != token);
        self.queue.len() != before
    }

    pub fn is_pending(&self, token: TaskToken) -> bool {
        self.queue.iter().any(|p| p.token == token)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Earliest due time among pending tasks.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.iter().map(|p| p.due).min()
    }

    /// Pop the earliest task that is due at the current clock, oldest post first on ties.
    pub fn pop_due(&mut self) -> Option<(TaskToken, Task)> {
        let now = self.now;
        let idx = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= now)
            .min_by_key(|(_, p)| (p.due, p.token))
            .map(|(i, _)| i)?;
        let pending = self.queue.swap_remove(idx);
        Some((pending.token, pending.task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delay_task_is_due_immediately() {
        let mut sched = UiScheduler::new(Instant::now());
        let token = sched.post(Task::BlinderTick);
        assert_eq!(sched.pop_due(), Some((token, Task::BlinderTick)));
        assert!(sched.is_empty());
    }

    #[test]
    fn delayed_task_waits_for_clock() {
        let start = Instant::now();
        let mut sched = UiScheduler::new(start);
        sched.post_delayed(Task::LongPress, Duration::from_millis(500));
        assert_eq!(sched.pop_due(), None);
        assert_eq!(sched.next_deadline(), Some(start + Duration::from_millis(500)));

        sched.advance_to(start + Duration::from_millis(499));
        assert_eq!(sched.pop_due(), None);
        sched.advance_to(start + Duration::from_millis(500));
        assert!(matches!(sched.pop_due(), Some((_, Task::LongPress))));
    }

    #[test]
    fn due_tasks_pop_in_deadline_order() {
        let start = Instant::now();
        let mut sched = UiScheduler::new(start);
        sched.post_delayed(Task::LongPress, Duration::from_millis(20));
        sched.post_delayed(Task::ShowPress, Duration::from_millis(10));
        sched.post_delayed(Task::BlinderTick, Duration::from_millis(10));
        sched.advance_to(start + Duration::from_millis(30));

        let order: Vec<Task> = std::iter::from_fn(|| sched.pop_due().map(|(_, t)| t)).collect();
        assert_eq!(order, vec![Task::ShowPress, Task::BlinderTick, Task::LongPress]);
    }

    #[test]
    fn removed_task_never_runs() {
        let start = Instant::now();
        let mut sched = UiScheduler::new(start);
        let token = sched.post_delayed(Task::BlinderTick, Duration::from_millis(16));
        assert!(sched.is_pending(token));
        assert!(sched.remove(token));
        assert!(!sched.remove(token));
        sched.advance_to(start + Duration::from_secs(1));
        assert_eq!(sched.pop_due(), None);
    }

    #[test]
    fn clock_is_monotonic() {
        let start = Instant::now();
        let mut sched = UiScheduler::new(start + Duration::from_millis(10));
        sched.advance_to(start);
        assert_eq!(sched.now(), start + Duration::from_millis(10));
    }
}
