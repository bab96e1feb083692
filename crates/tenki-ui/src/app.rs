use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::models::{ForecastModel, PendingAction};
use crate::services::ForecastService;

/// Shell state: the forecast model plus the service it drives
pub struct App {
    pub title: String,
    pub model: ForecastModel,
    service: ForecastService,
}

impl App {
    pub fn new(title: impl Into<String>, service: ForecastService) -> Self {
        Self {
            title: title.into(),
            model: ForecastModel::new(),
            service,
        }
    }

    /// Handle a key press. Returns true when the shell should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Up | KeyCode::Char('k') => self.model.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.model.select_next(),
            KeyCode::Enter | KeyCode::Char('s') => self.model.request_forecast(),
            _ => {}
        }
        false
    }

    /// Run queued network and storage work. Called after each draw.
    ///
    /// Returns true if something ran and the screen needs redrawing.
    pub async fn tick(&mut self) -> bool {
        match self.model.take_pending() {
            Some(PendingAction::LoadAreas) => {
                let result = self.service.list_areas().await;
                self.model.on_areas_loaded(result);
                true
            }
            Some(PendingAction::FetchForecast(code)) => {
                let result = self.service.show_forecast(&code).await;
                self.model.on_forecast_loaded(&code, result);
                true
            }
            None => false,
        }
    }
}
