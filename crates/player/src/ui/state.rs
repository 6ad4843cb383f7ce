//! Viewer state signals
//!
//! Mirrors the controller into Dioxus signals. The panel signal is written by
//! the components that call the selection router; the view signal follows
//! every coordinator and session change through an observer.

use dioxus::prelude::*;

use crate::application::selection_router::PanelState;
use crate::application::view_coordinator::{ViewCoordinator, ViewSnapshot};

#[derive(Clone, Copy)]
pub struct ViewerState {
    pub panel: Signal<PanelState>,
    pub view: Signal<ViewSnapshot>,
}

impl ViewerState {
    /// Must be created inside an active Dioxus runtime.
    pub fn new(coordinator: &ViewCoordinator) -> Self {
        let panel = Signal::new(PanelState::Hidden);
        let view = Signal::new(coordinator.snapshot());

        coordinator.observe(move |snapshot| {
            let mut view = view;
            // Teardown can notify after the owning scope is gone.
            if let Ok(mut current) = view.try_write() {
                *current = snapshot.clone();
            };
        });

        Self { panel, view }
    }

    pub fn show(&mut self, panel: PanelState) {
        self.panel.set(panel);
    }
}
