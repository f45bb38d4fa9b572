use tracing::info;

use crate::kernel::router::{Modal, RouteParams, Screen};

/// Performs navigation. Rendering is somebody else's job.
pub trait ScreenRouter {
    fn navigate(&mut self, screen: Screen, params: &RouteParams);
    fn go_back(&mut self);
    fn open_modal(&mut self, modal: Modal);
    fn close_modal(&mut self);
}

/// Headless router for the simulator binary: records the current screen and logs.
#[derive(Debug, Default)]
pub struct LoggingScreenRouter {
    history: Vec<Screen>,
    modal: Option<Modal>,
}

impl LoggingScreenRouter {
    pub fn new(start: Screen) -> Self {
        Self {
            history: vec![start],
            modal: None,
        }
    }

    pub fn current(&self) -> Option<Screen> {
        self.history.last().copied()
    }

    pub fn modal(&self) -> Option<Modal> {
        self.modal
    }
}

impl ScreenRouter for LoggingScreenRouter {
    fn navigate(&mut self, screen: Screen, params: &RouteParams) {
        let keys: Vec<&str> = params.keys().map(String::as_str).collect();
        info!(screen = screen.as_str(), ?keys, "navigate");
        self.history.push(screen);
    }

    fn go_back(&mut self) {
        if self.history.len() > 1 {
            self.history.pop();
        }
        info!(screen = ?self.current(), "go back");
    }

    fn open_modal(&mut self, modal: Modal) {
        info!(?modal, "open modal");
        self.modal = Some(modal);
    }

    fn close_modal(&mut self) {
        if let Some(modal) = self.modal.take() {
            info!(?modal, "close modal");
        }
    }
}
