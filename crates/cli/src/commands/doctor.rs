use replique_agent::client_from_config;
use replique_core::config::AppConfig;
use replique_db::{DbPool, ProductRepository, SqlProductRepository};
use serde::Serialize;

use crate::commands::{build_runtime, load_config, open_database, CommandResult};

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
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into() }
    }

    fn fail(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into() }
    }

    fn skipped(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Skipped, details: details.into() }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const DATABASE_CHECKS: [&str; 2] = ["database_connectivity", "catalog_ready"];

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Fail { 1 } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match load_config() {
        Ok(config) => {
            checks.push(DoctorCheck::pass(
                "config_validation",
                "configuration loaded and validated",
            ));
            checks.extend(check_database(&config));
            checks.push(check_recommender(&config));
        }
        Err(failure) => {
            checks.push(DoctorCheck::fail("config_validation", failure.message));
            for name in DATABASE_CHECKS.into_iter().chain(["recommender_readiness"]) {
                checks.push(DoctorCheck::skipped(
                    name,
                    "skipped because configuration did not load",
                ));
            }
        }
    }

    // Skipped checks do not fail the report.
    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_database(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(failure) => {
            return DATABASE_CHECKS
                .into_iter()
                .map(|name| DoctorCheck::fail(name, failure.message.clone()))
                .collect();
        }
    };

    runtime.block_on(async {
        let pool = match open_database(config).await {
            Ok(pool) => pool,
            Err(failure) => {
                return vec![
                    DoctorCheck::fail("database_connectivity", failure.message),
                    DoctorCheck::skipped(
                        "catalog_ready",
                        "skipped because database is unreachable",
                    ),
                ];
            }
        };

        let checks = vec![
            DoctorCheck::pass(
                "database_connectivity",
                format!("connected using `{}`, schema is current", config.database.url),
            ),
            check_catalog(&pool).await,
        ];
        pool.close().await;
        checks
    })
}

async fn check_catalog(pool: &DbPool) -> DoctorCheck {
    match SqlProductRepository::new(pool.clone()).list().await {
        Ok(products) if products.is_empty() => {
            DoctorCheck::fail("catalog_ready", "catalog is empty; run `replique seed`")
        }
        Ok(products) => {
            DoctorCheck::pass("catalog_ready", format!("{} product(s)", products.len()))
        }
        Err(error) => DoctorCheck::fail("catalog_ready", error.to_string()),
    }
}

fn check_recommender(config: &AppConfig) -> DoctorCheck {
    if !config.recommender.enabled {
        return DoctorCheck::skipped(
            "recommender_readiness",
            "recommender disabled; shoppers get the fallback reply",
        );
    }

    match client_from_config(&config.recommender) {
        Ok(_) => DoctorCheck::pass(
            "recommender_readiness",
            format!(
                "{} client ready for model `{}`",
                config.recommender.provider.as_str(),
                config.recommender.model
            ),
        ),
        Err(error) => DoctorCheck::fail("recommender_readiness", error.to_string()),
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
