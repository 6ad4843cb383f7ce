//! Widget fakes: a factory that records every construction and a widget
//! that records every command.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::application::error::AdapterConstructionError;
use crate::ports::outbound::{
    VideoWidget, WidgetEvent, WidgetEventSink, WidgetFactory, WidgetParams,
};

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetCommand {
    Play,
    Pause,
    SeekTo(f64, bool),
    Destroy,
}

/// Shared view into a [`RecordingWidget`].
#[derive(Default)]
pub struct WidgetProbe {
    commands: RefCell<Vec<WidgetCommand>>,
    time: Cell<Option<f64>>,
}

impl WidgetProbe {
    pub fn commands(&self) -> Vec<WidgetCommand> {
        self.commands.borrow().clone()
    }

    pub fn set_time(&self, seconds: Option<f64>) {
        self.time.set(seconds);
    }
}

pub struct RecordingWidget {
    probe: Rc<WidgetProbe>,
}

impl RecordingWidget {
    pub fn new() -> (Self, Rc<WidgetProbe>) {
        let probe = Rc::new(WidgetProbe::default());
        (
            Self {
                probe: Rc::clone(&probe),
            },
            probe,
        )
    }

    fn record(&self, command: WidgetCommand) {
        self.probe.commands.borrow_mut().push(command);
    }
}

impl VideoWidget for RecordingWidget {
    fn play(&self) {
        self.record(WidgetCommand::Play);
    }

    fn pause(&self) {
        self.record(WidgetCommand::Pause);
    }

    fn seek_to(&self, seconds: f64, allow_seek_ahead: bool) {
        self.record(WidgetCommand::SeekTo(seconds, allow_seek_ahead));
    }

    fn current_time(&self) -> Option<f64> {
        self.probe.time.get()
    }

    fn destroy(&self) {
        self.record(WidgetCommand::Destroy);
    }
}

struct Built {
    params: WidgetParams,
    events: WidgetEventSink,
    probe: Option<Rc<WidgetProbe>>,
}

/// Factory handing out [`RecordingWidget`]s, or widgets queued with
/// [`push_widget`](Self::push_widget) (mocks, typically).
#[derive(Default)]
pub struct ScriptedWidgetFactory {
    queued: RefCell<VecDeque<Box<dyn VideoWidget>>>,
    failures: RefCell<VecDeque<String>>,
    during_construct: RefCell<Vec<WidgetEvent>>,
    built: RefCell<Vec<Built>>,
}

impl ScriptedWidgetFactory {
    /// Use `widget` for the next construction.
    pub fn push_widget(&self, widget: Box<dyn VideoWidget>) {
        self.queued.borrow_mut().push_back(widget);
    }

    /// Reject the next construction with `reason`.
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.failures.borrow_mut().push_back(reason.into());
    }

    /// Deliver `events` synchronously from inside the next construction,
    /// before the widget is handed back.
    pub fn emit_during_construct(&self, events: impl IntoIterator<Item = WidgetEvent>) {
        self.during_construct.borrow_mut().extend(events);
    }

    pub fn constructed(&self) -> usize {
        self.built.borrow().len()
    }

    pub fn params(&self, index: usize) -> WidgetParams {
        self.with_built(index, |built| built.params.clone())
    }

    /// Deliver `event` through the sink handed to widget `index`.
    pub fn emit(&self, index: usize, event: WidgetEvent) {
        let sink = self.with_built(index, |built| Rc::clone(&built.events));
        sink(event);
    }

    pub fn commands(&self, index: usize) -> Vec<WidgetCommand> {
        self.probe(index).commands()
    }

    pub fn destroy_calls(&self, index: usize) -> usize {
        self.commands(index)
            .iter()
            .filter(|c| **c == WidgetCommand::Destroy)
            .count()
    }

    pub fn set_time(&self, index: usize, seconds: f64) {
        self.probe(index).set_time(Some(seconds));
    }

    /// Make widget `index` unable to report its position.
    pub fn clear_time(&self, index: usize) {
        self.probe(index).set_time(None);
    }

    fn probe(&self, index: usize) -> Rc<WidgetProbe> {
        self.with_built(index, |built| built.probe.clone())
            .unwrap_or_else(|| panic!("widget {index} was supplied by the test, not recorded"))
    }

    fn with_built<R>(&self, index: usize, f: impl FnOnce(&Built) -> R) -> R {
        let built = self.built.borrow();
        match built.get(index) {
            Some(entry) => f(entry),
            None => panic!("widget {index} was never constructed ({} built)", built.len()),
        }
    }
}

impl WidgetFactory for ScriptedWidgetFactory {
    fn construct(
        &self,
        params: WidgetParams,
        events: WidgetEventSink,
    ) -> Result<Box<dyn VideoWidget>, AdapterConstructionError> {
        if let Some(reason) = self.failures.borrow_mut().pop_front() {
            return Err(AdapterConstructionError::new(params.video_id, reason));
        }

        let queued = self.queued.borrow_mut().pop_front();
        let (widget, probe) = match queued {
            Some(widget) => (widget, None),
            None => {
                let (widget, probe) = RecordingWidget::new();
                (Box::new(widget) as Box<dyn VideoWidget>, Some(probe))
            }
        };
        self.built.borrow_mut().push(Built {
            params,
            events: Rc::clone(&events),
            probe,
        });

        let early: Vec<WidgetEvent> = self.during_construct.borrow_mut().drain(..).collect();
        for event in early {
            events(event);
        }
        Ok(widget)
    }
}
