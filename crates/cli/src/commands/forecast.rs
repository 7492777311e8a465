use pricecast_core::calendar::CalendarContext;
use pricecast_core::pipeline::{run_forecast, ForecastReport};
use pricecast_db::open_store;

use crate::commands::{load_config, runtime, CommandResult};

pub fn run() -> CommandResult {
    run_for(CalendarContext::now())
}

/// Runs the forecast flow for an explicit month instead of the current one.
pub fn run_for(context: CalendarContext) -> CommandResult {
    let config = match load_config("forecast") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime("forecast") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    runtime.block_on(async {
        let store = match open_store(&config.store).await {
            Ok(store) => store,
            Err(error) => return CommandResult::from_store("forecast", &error),
        };

        match run_forecast(store.as_ref(), context).await {
            Ok(report) => CommandResult::completed("forecast", report.status(), summary(&report)),
            Err(error) => CommandResult::from_pipeline("forecast", &error),
        }
    })
}

fn summary(report: &ForecastReport) -> String {
    if report.total == 0 {
        return "no products found; nothing to forecast".to_string();
    }

    let mut message = format!(
        "wrote predicted_sales for {} of {} products (month {}, {})",
        report.updated, report.total, report.month, report.season
    );
    if let Some(metrics) = &report.metrics {
        message.push_str(&format!("; holdout mse {:.2}, r2 {:.3}", metrics.mse, metrics.r2));
    }
    if let Some(sample) = &report.sample {
        message.push_str(&format!(
            "; sample: {} in {} ({}) -> {:.1} units",
            sample.product_name, sample.month_name, sample.season, sample.predicted_sales
        ));
    }
    if !report.failures.is_empty() {
        let ids: Vec<&str> =
            report.failures.iter().map(|failure| failure.product_id.0.as_str()).collect();
        message.push_str(&format!("; failed: {}", ids.join(", ")));
    }
    message
}
