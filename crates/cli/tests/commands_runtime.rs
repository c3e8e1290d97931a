use std::env;
use std::sync::{Mutex, OnceLock};

use replique_agent::FALLBACK_MESSAGE;
use replique_cli::commands::cart::CartCommand;
use replique_cli::commands::price::ConfigureArgs;
use replique_cli::commands::{cart, config, doctor, migrate, price, recommend, seed};
use rust_decimal::Decimal;
use serde_json::Value;

const MANAGED_KEYS: &[&str] = &[
    "REPLIQUE_DATABASE_URL",
    "REPLIQUE_DATABASE_MAX_CONNECTIONS",
    "REPLIQUE_DATABASE_TIMEOUT_SECS",
    "REPLIQUE_PRICING_ASSEMBLY_FEE",
    "REPLIQUE_PRICING_DELIVERY_FEE",
    "REPLIQUE_CART_SNAPSHOT_SLOT",
    "REPLIQUE_RECOMMENDER_ENABLED",
    "REPLIQUE_RECOMMENDER_PROVIDER",
    "REPLIQUE_RECOMMENDER_API_KEY",
    "REPLIQUE_RECOMMENDER_BASE_URL",
    "REPLIQUE_RECOMMENDER_MODEL",
    "REPLIQUE_RECOMMENDER_TIMEOUT_SECS",
    "REPLIQUE_LOGGING_LEVEL",
    "REPLIQUE_LOGGING_FORMAT",
    "REPLIQUE_LOG_LEVEL",
    "REPLIQUE_LOG_FORMAT",
    "GEMINI_API_KEY",
];

#[test]
fn migrate_returns_success_with_memory_database() {
    with_env(&[("REPLIQUE_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("REPLIQUE_DATABASE_URL", "postgres://localhost/replique")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    with_file_database(&[], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);
        assert_eq!(first_payload["data"]["inserted"], 6);
        assert!(first_payload["message"]
            .as_str()
            .unwrap_or_default()
            .contains("  - p1: Nordic TV Console"));

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        let second_payload = parse_payload(&second.output);
        assert_eq!(second_payload["data"]["inserted"], 0);
        assert_eq!(first_payload["data"]["products"], second_payload["data"]["products"]);
    });
}

#[test]
fn price_reports_live_quote_for_seeded_product() {
    with_file_database(&[], || {
        assert_eq!(seed::run().exit_code, 0);

        let result = price::run(configure("p1", |args| {
            args.material = Some("plywood".to_string());
            args.assembly = true;
            args.quantity = 2;
        }));
        assert_eq!(result.exit_code, 0, "price failed: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "price");
        assert_eq!(payload["data"]["quote"]["unit_price"], 69_000);
        assert_eq!(payload["data"]["quote"]["total_price"], 138_000);
        assert_eq!(payload["data"]["configuration"]["material"], "birch_plywood");
    });
}

#[test]
fn price_clamps_and_flags_custom_dimensions() {
    with_file_database(&[], || {
        assert_eq!(seed::run().exit_code, 0);

        let result = price::run(configure("p1", |args| {
            args.width = Some(Decimal::from(180));
            args.height = Some(Decimal::from(5));
        }));
        assert_eq!(result.exit_code, 0, "price failed: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["adjusted_axes"], serde_json::json!(["height"]));
        assert_eq!(payload["data"]["quote"]["customized"], true);
    });
}

#[test]
fn price_rejects_unknown_product_and_material() {
    with_file_database(&[], || {
        assert_eq!(seed::run().exit_code, 0);

        let missing = price::run(configure("p404", |_| {}));
        assert_eq!(missing.exit_code, 8);
        assert_eq!(parse_payload(&missing.output)["error_class"], "product_not_found");

        let plastic = price::run(configure("p1", |args| {
            args.material = Some("plastic".to_string());
        }));
        assert_eq!(plastic.exit_code, 7);
        assert_eq!(parse_payload(&plastic.output)["error_class"], "domain_validation");
    });
}

#[test]
fn cart_commands_persist_across_invocations() {
    with_file_database(&[], || {
        assert_eq!(seed::run().exit_code, 0);

        let plywood_console = |quantity: u32| {
            configure("p1", move |args| {
                args.material = Some("plywood".to_string());
                args.assembly = true;
                args.quantity = quantity;
            })
        };

        let added = cart::run(CartCommand::Add(plywood_console(2)));
        assert_eq!(added.exit_code, 0, "cart add failed: {}", added.output);
        assert_eq!(parse_payload(&added.output)["data"]["totals"]["total"], 143_000);

        let merged = cart::run(CartCommand::Add(plywood_console(1)));
        let merged_payload = parse_payload(&merged.output);
        assert!(merged_payload["message"].as_str().unwrap_or_default().contains("quantity now 3"));

        let shelf = cart::run(CartCommand::Add(configure("p2", |_| {})));
        assert_eq!(shelf.exit_code, 0, "cart add failed: {}", shelf.output);

        let shown = parse_payload(&cart::run(CartCommand::Show).output);
        let lines = shown["data"]["lines"].as_array().cloned().unwrap_or_default();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["quantity"], 3);
        assert_eq!(lines[0]["unit_price"], 69_000);
        assert_eq!(shown["data"]["totals"]["subtotal"], 207_000 + 35_000);
        assert_eq!(shown["data"]["totals"]["total"], 207_000 + 35_000 + 5_000);

        let line_id = lines[1]["line_id"].as_str().unwrap_or_default().to_string();
        let removed = cart::run(CartCommand::RemoveLine { line_id: line_id.clone() });
        assert_eq!(removed.exit_code, 0);
        let again = cart::run(CartCommand::RemoveLine { line_id });
        assert_eq!(again.exit_code, 8);
        assert_eq!(parse_payload(&again.output)["error_class"], "line_not_found");

        let cleared = parse_payload(&cart::run(CartCommand::Clear).output);
        assert_eq!(cleared["data"]["totals"]["total"], 0);
        assert_eq!(cleared["data"]["totals"]["delivery_fee"], 0);
    });
}

#[test]
fn cart_add_with_zero_quantity_leaves_cart_unchanged() {
    with_file_database(&[], || {
        assert_eq!(seed::run().exit_code, 0);

        let rejected = cart::run(CartCommand::Add(configure("p1", |args| args.quantity = 0)));
        assert_eq!(rejected.exit_code, 7);
        assert_eq!(parse_payload(&rejected.output)["error_class"], "invalid_quantity");

        let shown = parse_payload(&cart::run(CartCommand::Show).output);
        assert_eq!(shown["data"]["lines"], serde_json::json!([]));
    });
}

#[test]
fn cart_remove_drops_every_variant_of_a_product() {
    with_file_database(&[], || {
        assert_eq!(seed::run().exit_code, 0);

        assert_eq!(cart::run(CartCommand::Add(configure("p1", |_| {}))).exit_code, 0);
        let walnut = configure("p1", |args| args.color = Some("walnut".to_string()));
        assert_eq!(cart::run(CartCommand::Add(walnut)).exit_code, 0);

        let removed = cart::run(CartCommand::Remove { product: "p1".to_string() });
        let payload = parse_payload(&removed.output);
        assert_eq!(payload["message"], "removed 2 line(s) for p1");
        assert_eq!(payload["data"]["lines"], serde_json::json!([]));
    });
}

#[test]
fn recommend_serves_fallback_when_disabled() {
    with_env(&[("REPLIQUE_DATABASE_URL", "sqlite::memory:")], || {
        let result = recommend::run(vec!["a".to_string(), "black bookshelf".to_string()]);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["message"], FALLBACK_MESSAGE);
        assert_eq!(payload["data"]["source"], "fallback");
        assert_eq!(payload["data"]["response"]["recommendedProductIds"], serde_json::json!([]));
    });
}

#[test]
fn recommend_requires_an_api_key_when_gemini_is_enabled() {
    with_env(
        &[
            ("REPLIQUE_DATABASE_URL", "sqlite::memory:"),
            ("REPLIQUE_RECOMMENDER_ENABLED", "true"),
        ],
        || {
            let result = recommend::run(vec!["desk".to_string()]);
            assert_eq!(result.exit_code, 2);
            assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
        },
    );
}

#[test]
fn config_reports_sources_and_redacts_secrets() {
    with_env(
        &[
            ("REPLIQUE_DATABASE_URL", "sqlite::memory:"),
            ("GEMINI_API_KEY", "AIzaSyTopSecretValue123"),
        ],
        || {
            let result = config::run();
            assert_eq!(result.exit_code, 0);
            assert!(!result.output.contains("TopSecret"));

            let payload = parse_payload(&result.output);
            let entries = payload["data"].as_array().cloned().unwrap_or_default();
            let find = |key: &str| {
                entries.iter().find(|entry| entry["key"] == key).cloned().unwrap_or_default()
            };
            assert_eq!(find("database.url")["source"], "env (REPLIQUE_DATABASE_URL)");
            assert_eq!(find("recommender.api_key")["value"], "AIza***");
            assert_eq!(find("recommender.api_key")["source"], "env (GEMINI_API_KEY)");
            assert_eq!(find("pricing.delivery_fee")["source"], "default");
        },
    );
}

#[test]
fn doctor_passes_on_seeded_database() {
    with_file_database(&[], || {
        let empty: Value = serde_json::from_str(&doctor::run(true).output).expect("doctor json");
        assert_eq!(empty["overall_status"], "fail");

        assert_eq!(seed::run().exit_code, 0);
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0, "doctor failed: {}", result.output);

        let report: Value = serde_json::from_str(&result.output).expect("doctor json");
        assert_eq!(report["overall_status"], "pass");
        let statuses = report["checks"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|check| (check["name"].clone(), check["status"].clone()))
            .collect::<Vec<_>>();
        assert!(statuses.contains(&("catalog_ready".into(), "pass".into())));
        assert!(statuses.contains(&("recommender_readiness".into(), "skipped".into())));
    });
}

fn configure(product: &str, edit: impl FnOnce(&mut ConfigureArgs)) -> ConfigureArgs {
    let mut args =
        ConfigureArgs { product: product.to_string(), quantity: 1, ..ConfigureArgs::default() };
    edit(&mut args);
    args
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_file_database(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("replique.db").display());

    let mut all_vars = vec![("REPLIQUE_DATABASE_URL", url.as_str())];
    all_vars.extend_from_slice(vars);
    with_env(&all_vars, test_fn);
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let previous_values: Vec<(&str, Option<String>)> =
        MANAGED_KEYS.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in MANAGED_KEYS {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
