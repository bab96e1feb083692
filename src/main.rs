use anyhow::Result;
use tenki_core::{App, AppError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let (mut app, validation) = App::load().map_err(startup_error)?;

    // Initialize logging once the log file location is known
    tenki_core::init(&app.config().logging)?;
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    app.initialize()?;
    tracing::info!("tenki started");

    let result = tenki_ui::run(app.config()).await;
    if let Err(e) = &result {
        tracing::error!("Shell exited with error: {:#}", e);
    }

    app.shutdown();
    result
}

/// Report a startup failure once: the user-facing hint, caused by the detail
fn startup_error(e: AppError) -> anyhow::Error {
    let hint = e.user_message();
    anyhow::Error::new(e).context(hint)
}
