use ratatui::Frame;

use crate::{
    ui::{render_results, render_test},
    App, AppState,
};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Pointing test screen - the canvas with the active target
pub struct TestScreen;

impl Screen for TestScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_test(app, f.area(), f.buffer_mut());
    }
}

/// Results screen - trials scatter with the fitted model
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_results(app, f.area(), f.buffer_mut());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Testing => Box::new(TestScreen),
        AppState::Results => Box::new(ResultsScreen),
    }
}
