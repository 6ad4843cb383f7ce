//! Hand-driven platform fakes: nothing happens until the test says so.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::task::Context;

use futures_channel::oneshot;
use futures_util::future::{FutureExt, LocalBoxFuture};
use futures_util::task::noop_waker;

use crate::application::error::WidgetLoadError;
use crate::application::widget_loader::LoadResult;
use crate::ports::outbound::{PollHandle, PollTimer, TaskSpawner, WidgetFactory, WidgetScriptHost};

// =============================================================================
// Poll timer
// =============================================================================

struct PollSlot {
    period_ms: u32,
    active: Cell<bool>,
    tick: RefCell<Box<dyn FnMut()>>,
}

/// Interval timer that only ticks when [`fire`](Self::fire) is called.
#[derive(Default)]
pub struct ManualPollTimer {
    slots: RefCell<Vec<Rc<PollSlot>>>,
    started: Cell<usize>,
}

impl ManualPollTimer {
    /// Tick every interval that is still running, once.
    pub fn fire(&self) {
        let live: Vec<Rc<PollSlot>> = self
            .slots
            .borrow()
            .iter()
            .filter(|slot| slot.active.get())
            .cloned()
            .collect();
        for slot in live {
            if slot.active.get() {
                (slot.tick.borrow_mut())();
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|slot| slot.active.get())
            .count()
    }

    /// Intervals started over the timer's lifetime.
    pub fn started(&self) -> usize {
        self.started.get()
    }

    pub fn last_period(&self) -> Option<u32> {
        self.slots.borrow().last().map(|slot| slot.period_ms)
    }
}

impl PollTimer for ManualPollTimer {
    fn start(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> PollHandle {
        let slot = Rc::new(PollSlot {
            period_ms,
            active: Cell::new(true),
            tick: RefCell::new(tick),
        });
        self.slots.borrow_mut().push(Rc::clone(&slot));
        self.started.set(self.started.get() + 1);

        let weak = Rc::downgrade(&slot);
        PollHandle::new(move || {
            if let Some(slot) = weak.upgrade() {
                slot.active.set(false);
            }
        })
    }
}

// =============================================================================
// Spawner
// =============================================================================

/// Collects spawned tasks and polls them on demand with a no-op waker.
#[derive(Default)]
pub struct ManualSpawner {
    tasks: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
}

impl ManualSpawner {
    /// Poll every task until none of them makes progress.
    pub fn run_until_idle(&self) {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        loop {
            let tasks: Vec<_> = self.tasks.borrow_mut().drain(..).collect();
            if tasks.is_empty() {
                return;
            }
            let polled = tasks.len();
            let mut pending = Vec::new();
            for mut task in tasks {
                if task.poll_unpin(&mut cx).is_pending() {
                    pending.push(task);
                }
            }

            let progressed = pending.len() < polled || !self.tasks.borrow().is_empty();
            self.tasks.borrow_mut().extend(pending);
            if !progressed {
                return;
            }
        }
    }
}

impl TaskSpawner for ManualSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.tasks.borrow_mut().push(task);
    }
}

// =============================================================================
// Script host
// =============================================================================

/// Script host whose loads stay pending until resolved or failed by the test.
#[derive(Default)]
pub struct ManualScriptHost {
    requests: Cell<usize>,
    last_url: RefCell<Option<String>>,
    waiting: RefCell<Vec<oneshot::Sender<LoadResult>>>,
}

impl ManualScriptHost {
    pub fn requests(&self) -> usize {
        self.requests.get()
    }

    pub fn last_url(&self) -> Option<String> {
        self.last_url.borrow().clone()
    }

    /// Complete every outstanding load with `factory`.
    pub fn resolve(&self, factory: Rc<dyn WidgetFactory>) {
        for waiter in self.waiting.borrow_mut().drain(..) {
            let _ = waiter.send(Ok(Rc::clone(&factory)));
        }
    }

    /// Fail every outstanding load with `error`.
    pub fn fail(&self, error: WidgetLoadError) {
        for waiter in self.waiting.borrow_mut().drain(..) {
            let _ = waiter.send(Err(error.clone()));
        }
    }
}

impl WidgetScriptHost for ManualScriptHost {
    fn load(&self, script_url: &str) -> LocalBoxFuture<'static, LoadResult> {
        self.requests.set(self.requests.get() + 1);
        *self.last_url.borrow_mut() = Some(script_url.to_string());

        let (tx, rx) = oneshot::channel();
        self.waiting.borrow_mut().push(tx);
        async move {
            rx.await.unwrap_or_else(|_| {
                Err(WidgetLoadError::ApiUnavailable(
                    "script request abandoned".to_string(),
                ))
            })
        }
        .boxed_local()
    }
}
