use pricecast_core::config::{AppConfig, LoadOptions};
use pricecast_core::store::{CATALOG_COLUMNS, PRICING_COLUMNS};
use pricecast_db::open_store;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn skipped(name: &'static str, reason: &str) -> Self {
        Self { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                concat!(
                    "{{\"overall_status\":\"fail\",",
                    "\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}"
                ),
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.extend(check_store(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["store_connectivity", "catalog_columns", "pricing_columns"] {
                checks.push(DoctorCheck::skipped(name, "configuration did not load"));
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_store(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return unreachable_store(format!("failed to initialize async runtime: {error}"));
        }
    };

    runtime.block_on(async {
        let store = match open_store(&config.store).await {
            Ok(store) => store,
            Err(error) => {
                return unreachable_store(format!("failed to open product store: {error}"));
            }
        };

        // the catalog lookup doubles as the connectivity check
        let catalog = match store.missing_columns(&CATALOG_COLUMNS).await {
            Ok(missing) => missing,
            Err(error) => {
                let details =
                    format!("product table `{}` unreadable: {error}", config.store.table);
                return unreachable_store(details);
            }
        };
        let pricing =
            store.missing_columns(&PRICING_COLUMNS).await.map_err(|error| error.to_string());

        store_checks(&config.store.table, catalog, pricing)
    })
}

fn unreachable_store(details: String) -> Vec<DoctorCheck> {
    vec![
        DoctorCheck { name: "store_connectivity", status: CheckStatus::Fail, details },
        DoctorCheck::skipped("catalog_columns", "the store was not reachable"),
        DoctorCheck::skipped("pricing_columns", "the store was not reachable"),
    ]
}

/// A table lacking every catalog column is treated as absent rather than
/// reachable with a broken schema.
fn store_checks(
    table: &str,
    catalog: Vec<String>,
    pricing: Result<Vec<String>, String>,
) -> Vec<DoctorCheck> {
    if catalog.len() == CATALOG_COLUMNS.len() {
        return unreachable_store(format!("product table `{table}` not found"));
    }

    let pricing_check = match pricing {
        Ok(missing) => columns_check("pricing_columns", missing),
        Err(error) => DoctorCheck {
            name: "pricing_columns",
            status: CheckStatus::Fail,
            details: format!("schema lookup failed: {error}"),
        },
    };

    vec![
        DoctorCheck {
            name: "store_connectivity",
            status: CheckStatus::Pass,
            details: format!("connected to product table `{table}`"),
        },
        columns_check("catalog_columns", catalog),
        pricing_check,
    ]
}

fn columns_check(name: &'static str, missing: Vec<String>) -> DoctorCheck {
    if missing.is_empty() {
        DoctorCheck { name, status: CheckStatus::Pass, details: "all columns present".to_string() }
    } else {
        DoctorCheck {
            name,
            status: CheckStatus::Fail,
            details: format!("missing columns: {}", missing.join(", ")),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
