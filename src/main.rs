use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use infobox_probe::validation::{OXYGEN_LABEL, OXYGEN_TEMPLATE};
use infobox_probe::{Config, DefaultSession, FieldExpectation, NavigationResult};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct CheckReport {
    expectation: &'static str,
    value: f64,
    passed: bool,
    detail: String,
}

#[derive(Debug, Serialize)]
struct RunReport {
    navigation: NavigationResult,
    checks: Vec<CheckReport>,
}

fn cli() -> Command {
    Command::new("infobox-probe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Open an encyclopedia article and check a value in its infobox")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON config file; missing fields use defaults")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("headed")
                .long("headed")
                .help("Show the browser window and slow every action down")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("expect")
                .long("expect")
                .value_name("VALUE")
                .help("Value the row must show (repeatable)")
                .value_parser(value_parser!(f64))
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("expect-mismatch")
                .long("expect-mismatch")
                .value_name("VALUE")
                .help("Value the row must NOT show (repeatable)")
                .value_parser(value_parser!(f64))
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("label")
                .long("label")
                .help("Text identifying the infobox row")
                .default_value(OXYGEN_LABEL),
        )
        .arg(
            Arg::new("template")
                .long("template")
                .help("Phrase with a {} slot for the decimal-comma value")
                .default_value(OXYGEN_TEMPLATE),
        )
        .arg(
            Arg::new("no-highlight")
                .long("no-highlight")
                .help("Skip outlining the matched value in the page")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("screenshot")
                .long("screenshot")
                .value_name("PNG")
                .help("Save a screenshot after the checks")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print a JSON report instead of text")
                .action(ArgAction::SetTrue),
        )
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if matches.get_flag("headed") {
        let demo = Config::demo();
        config.browser.headless = demo.browser.headless;
        config.browser.slow_mo_ms = demo.browser.slow_mo_ms;
    }
    if matches.get_flag("no-highlight") {
        config.validation.highlight = false;
    }
    Ok(config)
}

fn values(matches: &ArgMatches, id: &str) -> Vec<f64> {
    matches
        .get_many::<f64>(id)
        .map(|values| values.copied().collect())
        .unwrap_or_default()
}

#[derive(Debug)]
struct PlannedCheck {
    expectation: &'static str,
    field: FieldExpectation,
}

/// Positive checks first, then negative ones. Without any `--expect` or
/// `--expect-mismatch`, the oxygen share must read 20.95 and must not read 25.0.
fn planned_checks(matches: &ArgMatches) -> anyhow::Result<Vec<PlannedCheck>> {
    let label = matches
        .get_one::<String>("label")
        .map(String::as_str)
        .unwrap_or(OXYGEN_LABEL);
    let template = matches
        .get_one::<String>("template")
        .map(String::as_str)
        .unwrap_or(OXYGEN_TEMPLATE);

    let mut expected = values(matches, "expect");
    let mut unexpected = values(matches, "expect-mismatch");
    if expected.is_empty() && unexpected.is_empty() {
        expected.push(20.95);
        unexpected.push(25.0);
    }

    let mut checks = Vec::with_capacity(expected.len() + unexpected.len());
    for (kind, list) in [("match", expected), ("mismatch", unexpected)] {
        for value in list {
            checks.push(PlannedCheck {
                expectation: kind,
                field: FieldExpectation::new(label, value, template)?,
            });
        }
    }
    Ok(checks)
}

async fn run_check(session: &DefaultSession, check: PlannedCheck) -> CheckReport {
    let value = check.field.value.value();
    let result = if check.expectation == "match" {
        session
            .validate_field_value(&check.field)
            .await
            .map(|outcome| outcome.row_text)
    } else {
        session
            .expect_mismatch(&check.field)
            .await
            .map(|mismatch| mismatch.to_string())
    };

    match result {
        Ok(detail) => CheckReport {
            expectation: check.expectation,
            value,
            passed: true,
            detail,
        },
        Err(e) => CheckReport {
            expectation: check.expectation,
            value,
            passed: false,
            detail: e.to_string(),
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    let planned = planned_checks(&matches)?;

    let session = DefaultSession::with_config(config)
        .await
        .context("failed to start Chrome")?;
    let navigation = session
        .open_target_article()
        .await
        .context("could not reach the target article")?;

    let mut checks = Vec::with_capacity(planned.len());
    for check in planned {
        checks.push(run_check(&session, check).await);
    }

    if let Some(path) = matches.get_one::<PathBuf>("screenshot") {
        session
            .save_screenshot(path)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    session.close().await?;

    let all_passed = checks.iter().all(|check| check.passed);
    let report = RunReport { navigation, checks };

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.navigation.url);
        for check in &report.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            println!("{} {} {}: {}", status, check.expectation, check.value, check.detail);
        }
    }

    if all_passed {
        info!("all checks passed");
        Ok(())
    } else {
        error!("some checks failed");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["infobox-probe"];
        argv.extend_from_slice(args);
        cli().try_get_matches_from(argv).unwrap()
    }

    fn summary(checks: &[PlannedCheck]) -> Vec<(&'static str, String)> {
        checks
            .iter()
            .map(|check| (check.expectation, check.field.expected_substring()))
            .collect()
    }

    #[test]
    fn no_expectations_runs_both_oxygen_cases() {
        let checks = planned_checks(&parse(&[])).unwrap();
        assert_eq!(
            summary(&checks),
            vec![
                ("match", "20,95 % — кислород (O2)".to_string()),
                ("mismatch", "25,0 % — кислород (O2)".to_string()),
            ]
        );
    }

    #[test]
    fn explicit_expectations_replace_the_defaults() {
        let checks = planned_checks(&parse(&["--expect-mismatch", "30"])).unwrap();
        assert_eq!(
            summary(&checks),
            vec![("mismatch", "30,0 % — кислород (O2)".to_string())]
        );

        let checks = planned_checks(&parse(&[
            "--expect",
            "78.08",
            "--expect",
            "78.1",
            "--label",
            "азот",
            "--template",
            "{} % — азот (N2)",
        ]))
        .unwrap();
        assert_eq!(
            summary(&checks),
            vec![
                ("match", "78,08 % — азот (N2)".to_string()),
                ("match", "78,1 % — азот (N2)".to_string()),
            ]
        );
        assert!(checks.iter().all(|check| check.field.label == "азот"));
    }

    #[test]
    fn template_without_slot_is_rejected() {
        let matches = parse(&["--template", "кислород"]);
        assert!(planned_checks(&matches).is_err());
    }

    #[test]
    fn defaults_without_flags() {
        let config = load_config(&parse(&[])).unwrap();
        assert!(config.browser.headless);
        assert_eq!(config.browser.slow_mo_ms, 0);
        assert!(config.validation.highlight);
    }

    #[test]
    fn headed_and_no_highlight_override_config_file() {
        let dir = std::env::temp_dir()
            .join(format!("infobox-probe-cli-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(
            &path,
            r#"{ "browser": { "element_timeout_ms": 4000 }, "site": { "query": "Марс" } }"#,
        )
        .unwrap();

        let config = load_config(&parse(&[
            "--config",
            path.to_str().unwrap(),
            "--headed",
            "--no-highlight",
        ]))
        .unwrap();

        assert!(!config.browser.headless);
        assert_eq!(config.browser.slow_mo_ms, 2000);
        assert!(!config.validation.highlight);
        assert_eq!(config.browser.element_timeout_ms, 4000);
        assert_eq!(config.site.query, "Марс");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unreadable_config_is_reported() {
        let err = load_config(&parse(&["--config", "/nonexistent/infobox-probe.json"]))
            .unwrap_err();
        assert!(err.to_string().contains("failed to load config"));
    }
}
