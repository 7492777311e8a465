use pricecast_core::calendar::CalendarContext;
use pricecast_core::pipeline::{run_optimize, PricingReport};
use pricecast_db::open_store;

use crate::commands::{load_config, runtime, CommandResult};

pub fn run() -> CommandResult {
    run_for(CalendarContext::now())
}

pub fn run_for(context: CalendarContext) -> CommandResult {
    let config = match load_config("optimize") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime("optimize") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    runtime.block_on(async {
        let store = match open_store(&config.store).await {
            Ok(store) => store,
            Err(error) => return CommandResult::from_store("optimize", &error),
        };

        match run_optimize(store.as_ref(), context, &config.pricing).await {
            Ok(report) => CommandResult::completed("optimize", report.status(), summary(&report)),
            Err(error) => CommandResult::from_pipeline("optimize", &error),
        }
    })
}

fn summary(report: &PricingReport) -> String {
    if report.total == 0 {
        return "no products found; nothing to price".to_string();
    }

    let mut message = format!(
        "priced {} of {} products (month {}, {}): {} raise, {} discount, {} hold",
        report.updated,
        report.total,
        report.month,
        report.season,
        report.raised,
        report.discounted,
        report.held
    );
    if report.skipped > 0 {
        message.push_str(&format!("; skipped {} without a positive price", report.skipped));
    }
    if !report.failures.is_empty() {
        let ids: Vec<&str> =
            report.failures.iter().map(|failure| failure.product_id.0.as_str()).collect();
        message.push_str(&format!("; failed: {}", ids.join(", ")));
    }
    message
}
