//! State behind the forecast screen: area selector, status line and result text.
//!
//! Network and storage work is requested through [`PendingAction`] so the
//! event loop can draw the "loading" text before the blocking call runs.

use tenki_weather::{Area, ForecastItem, WeatherError};

pub const STATUS_LOADING_AREAS: &str = "地域リストを取得中...";
pub const STATUS_READY: &str = "地域を選んで「表示」を押してください。";
pub const RESULT_PLACEHOLDER: &str = "ここに結果が表示されます。";
pub const RESULT_NO_SELECTION: &str = "地域を選んでください。";
pub const RESULT_FETCHING: &str = "天気情報を取得中...";

/// Work the event loop should run after the next draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    LoadAreas,
    FetchForecast(String),
}

#[derive(Debug)]
pub struct ForecastModel {
    areas: Vec<Area>,
    selected: Option<usize>,
    status: String,
    result_text: String,
    loading: bool,
    pending: Option<PendingAction>,
}

impl Default for ForecastModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastModel {
    /// Fresh state; the area list is requested immediately.
    pub fn new() -> Self {
        Self {
            areas: Vec::new(),
            selected: None,
            status: STATUS_LOADING_AREAS.to_string(),
            result_text: RESULT_PLACEHOLDER.to_string(),
            loading: true,
            pending: Some(PendingAction::LoadAreas),
        }
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_area(&self) -> Option<&Area> {
        self.selected.and_then(|i| self.areas.get(i))
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn result_text(&self) -> &str {
        &self.result_text
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Take the queued action, leaving none behind
    pub fn take_pending(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    /// Apply the outcome of the startup area list request.
    ///
    /// On success the first area (alphabetically) is selected. On failure the
    /// selector stays empty and the error is shown in the status line.
    pub fn on_areas_loaded(&mut self, result: Result<Vec<Area>, WeatherError>) {
        self.loading = false;
        match result {
            Ok(areas) => {
                self.selected = if areas.is_empty() { None } else { Some(0) };
                self.areas = areas;
                self.status = STATUS_READY.to_string();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load area list");
                self.areas.clear();
                self.selected = None;
                self.status = format!("地域リストの取得に失敗しました: {}", e);
            }
        }
    }

    pub fn select_next(&mut self) {
        if self.areas.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < self.areas.len() => i + 1,
            Some(i) => i,
            None => 0,
        });
    }

    pub fn select_previous(&mut self) {
        if self.areas.is_empty() {
            return;
        }
        self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
    }

    /// The "show" action.
    ///
    /// Queues a fetch for the selected area, or asks the user to pick one.
    /// Ignored while another request is running.
    pub fn request_forecast(&mut self) {
        if self.loading {
            return;
        }
        match self.selected_area() {
            Some(area) => {
                let code = area.code.clone();
                tracing::info!(code = %code, "Forecast requested");
                self.result_text = RESULT_FETCHING.to_string();
                self.loading = true;
                self.pending = Some(PendingAction::FetchForecast(code));
            }
            None => {
                self.result_text = RESULT_NO_SELECTION.to_string();
            }
        }
    }

    /// Apply the outcome of fetch, save and reload for `code`
    pub fn on_forecast_loaded(
        &mut self,
        code: &str,
        result: Result<Vec<ForecastItem>, WeatherError>,
    ) {
        self.loading = false;
        self.result_text = match result {
            Ok(items) => format_forecast(code, &items),
            Err(e) => {
                tracing::error!(code, error = %e, hint = e.user_message(), "Forecast failed");
                format!("天気情報の取得に失敗しました: {}", e)
            }
        };
    }
}

/// Result text for a loaded forecast: the area code, then date and weather per day
pub fn format_forecast(code: &str, items: &[ForecastItem]) -> String {
    let mut lines = vec![format!("地域コード：{}", code), String::new()];
    for item in items {
        lines.push(item.date.clone());
        lines.push(item.weather_text.clone());
        lines.push(String::new());
    }
    lines.join("\n").trim().to_string()
}
