//! CLI integration tests.
//!
//! Tests cover:
//! - Config loading and validation with real INI files on disk
//! - Provider selection from `[data] source`
//! - Principal resolution
//! - The simulate pipeline against CSV and SQLite stores
//! - Dashboard window CSV output

mod common;

use common::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use tradesim::adapters::file_config_adapter::FileConfigAdapter;
use tradesim::cli::{self, SimulationOutput};
use tradesim::domain::error::{TradesimError, ValidationError};
use tradesim::domain::period::{self, Period};
use tradesim::domain::simulation::SimulationRequest;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Temp dir holding the reference CSV plus an INI pointing at it.
fn csv_setup(extra: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("quotes.csv");
    std::fs::write(&csv_path, REFERENCE_CSV).unwrap();
    let ini = format!(
        "[data]\nsource = csv\n\n[csv]\npath = {}\n{}",
        csv_path.display(),
        extra
    );
    let ini_path = dir.path().join("tradesim.ini");
    std::fs::write(&ini_path, ini).unwrap();
    (dir, ini_path)
}

mod config_loading {
    use super::*;

    #[test]
    fn load_valid_config() {
        let (_dir, ini) = csv_setup("");
        assert!(cli::load_config(&ini).is_ok());
    }

    #[test]
    fn load_missing_file() {
        let err = cli::load_config(&PathBuf::from("/nonexistent/tradesim.ini"))
            .err()
            .unwrap();
        assert!(matches!(err, TradesimError::ConfigParse { .. }));
    }

    #[test]
    fn load_rejects_invalid_config() {
        let file = write_temp_ini("[data]\nsource = csv\n");
        let err = cli::load_config(file.path()).err().unwrap();
        assert!(matches!(err, TradesimError::ConfigMissing { section, .. } if section == "csv"));
    }

    #[test]
    fn exit_codes_by_kind() {
        let cases: Vec<(TradesimError, &str)> = vec![
            (TradesimError::Io(std::io::Error::other("x")), "1"),
            (
                TradesimError::ConfigMissing {
                    section: "data".into(),
                    key: "source".into(),
                },
                "2",
            ),
            (TradesimError::Database { reason: "x".into() }, "3"),
            (ValidationError::MissingField("principal").into(), "4"),
            (
                TradesimError::NoData {
                    start: date(2024, 1, 1),
                    end: date(2024, 1, 2),
                },
                "5",
            ),
            (
                TradesimError::DataIntegrity {
                    date: date(2024, 1, 1),
                    price: 0.0,
                },
                "6",
            ),
        ];
        for (err, expected) in cases {
            let code: std::process::ExitCode = (&err).into();
            let report = format!("{code:?}");
            assert!(report.contains(expected), "{err}: got {report}");
        }
    }
}

mod principal {
    use super::*;

    #[test]
    fn explicit_principal_wins() {
        let config = FileConfigAdapter::from_string("[simulation]\nprincipal = 5\n").unwrap();
        assert_eq!(cli::resolve_principal(Some(10.0), &config).unwrap(), 10.0);
    }

    #[test]
    fn falls_back_to_config() {
        let config = FileConfigAdapter::from_string("[simulation]\nprincipal = 2500000\n").unwrap();
        assert_eq!(cli::resolve_principal(None, &config).unwrap(), 2_500_000.0);
    }

    #[test]
    fn missing_everywhere() {
        let config = FileConfigAdapter::from_string("[data]\nsource = csv\n").unwrap();
        assert_eq!(
            cli::resolve_principal(None, &config),
            Err(ValidationError::MissingField("principal"))
        );
    }
}

mod pipeline_csv {
    use super::*;

    #[test]
    fn simulate_from_csv_config() {
        let (_dir, ini) = csv_setup("");
        let config = cli::load_config(&ini).unwrap();
        let provider = cli::open_provider(&config).unwrap();
        let request = SimulationRequest::new(date(2024, 1, 2), date(2024, 1, 4), 1_000_000.0);

        let result =
            cli::run_simulation(provider.as_ref(), &request, &SimulationOutput::default()).unwrap();

        assert_eq!(result.entry_price, 70_000.0);
        assert_eq!(result.exit_price, 69_500.0);
        assert_eq!(result.valuation_trajectory.len(), 3);
    }

    #[test]
    fn writes_trajectory_file() {
        let (dir, ini) = csv_setup("");
        let config = cli::load_config(&ini).unwrap();
        let provider = cli::open_provider(&config).unwrap();
        let out = dir.path().join("trajectory.csv");
        let request = SimulationRequest::new(date(2024, 1, 2), date(2024, 1, 3), 70_000.0);

        cli::run_simulation(
            provider.as_ref(),
            &request,
            &SimulationOutput {
                json: false,
                trajectory: Some(out.clone()),
            },
        )
        .unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, "date,value\n2024-01-02,70000.0\n2024-01-03,71000.0\n");
    }

    #[test]
    fn holiday_buy_date_fails_without_trajectory_file() {
        let (dir, ini) = csv_setup("");
        let config = cli::load_config(&ini).unwrap();
        let provider = cli::open_provider(&config).unwrap();
        let out = dir.path().join("trajectory.csv");
        let request = SimulationRequest::new(date(2024, 1, 1), date(2024, 1, 4), 1_000.0);

        let err = cli::run_simulation(
            provider.as_ref(),
            &request,
            &SimulationOutput {
                json: false,
                trajectory: Some(out.clone()),
            },
        )
        .unwrap_err();

        assert!(matches!(err, TradesimError::MissingQuote { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn summary_shows_loss() {
        let provider = MockQuoteProvider::new().with_quotes(reference_quotes());
        let request = SimulationRequest::new(date(2024, 1, 2), date(2024, 1, 4), 1_000_000.0);
        let result =
            cli::run_simulation(&provider, &request, &SimulationOutput::default()).unwrap();

        let summary = cli::render_summary(&request, &result);

        assert!(summary.contains("2024-01-02 to 2024-01-04"));
        assert!(summary.contains("Entry Price:      70000.00"));
        assert!(summary.contains("Final Value:      992857.14"));
        assert!(summary.contains("Profit/Loss:      -7142.86"));
        assert!(summary.contains("Yield:            -0.71%"));
        assert!(summary.contains("Trading Days:     3"));
    }

    #[test]
    fn summary_shows_gain_sign() {
        let provider = MockQuoteProvider::new().with_quotes(reference_quotes());
        let request = SimulationRequest::new(date(2024, 1, 2), date(2024, 1, 3), 70_000.0);
        let result =
            cli::run_simulation(&provider, &request, &SimulationOutput::default()).unwrap();

        let summary = cli::render_summary(&request, &result);

        assert!(summary.contains("Profit/Loss:      +1000.00"));
    }
}

#[cfg(feature = "sqlite")]
mod pipeline_sqlite {
    use super::*;
    use tradesim::adapters::csv_adapter::CsvAdapter;
    use tradesim::adapters::sqlite_adapter::SqliteAdapter;

    #[test]
    fn simulate_from_sqlite_config() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("quotes.db");
        let csv_path = dir.path().join("quotes.csv");
        std::fs::write(&csv_path, REFERENCE_CSV).unwrap();
        let file = write_temp_ini(&format!(
            "[data]\nsource = sqlite\n\n[sqlite]\npath = {}\npool_size = 2\n",
            db_path.display()
        ));

        let config = cli::load_config(file.path()).unwrap();
        let store = SqliteAdapter::from_config(&config).unwrap();
        let quotes = CsvAdapter::new(csv_path).read_all().unwrap();
        assert_eq!(store.insert_quotes(&quotes).unwrap(), 3);

        let provider = cli::open_provider(&config).unwrap();
        assert_eq!(
            provider.data_range().unwrap(),
            Some((date(2024, 1, 2), date(2024, 1, 4), 3))
        );

        let request = SimulationRequest::new(date(2024, 1, 2), date(2024, 1, 4), 1_000_000.0);
        let result =
            cli::run_simulation(provider.as_ref(), &request, &SimulationOutput::default()).unwrap();
        assert_eq!(result.exit_price, 69_500.0);
    }

    #[test]
    fn import_into_sqlite_store() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("quotes.db");
        let csv_path = dir.path().join("quotes.csv");
        std::fs::write(&csv_path, REFERENCE_CSV).unwrap();
        let file = write_temp_ini(&format!(
            "[data]\nsource = sqlite\n\n[sqlite]\npath = {}\n",
            db_path.display()
        ));
        let config = cli::load_config(file.path()).unwrap();

        assert_eq!(cli::import_csv(&config, &csv_path).unwrap(), 3);

        let provider = cli::open_provider(&config).unwrap();
        assert_eq!(
            provider.data_range().unwrap(),
            Some((date(2024, 1, 2), date(2024, 1, 4), 3))
        );
    }

    #[test]
    fn import_refused_for_csv_source() {
        let (dir, ini) = csv_setup("");
        let config = cli::load_config(&ini).unwrap();
        let err = cli::import_csv(&config, &dir.path().join("quotes.csv"))
            .err()
            .unwrap();
        assert!(matches!(err, TradesimError::ConfigInvalid { key, .. } if key == "source"));
    }
}

mod quotes_output {
    use super::*;

    #[test]
    fn window_rows_as_csv() {
        let (_dir, ini) = csv_setup("");
        let config = cli::load_config(&ini).unwrap();
        let provider = cli::open_provider(&config).unwrap();

        let rows =
            period::fetch_window(provider.as_ref(), date(2024, 1, 4), Period::OneWeek, None).unwrap();
        let mut buf = Vec::new();
        cli::write_quote_rows(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,fx_rate,vix,etf_volume,gold_close,pred_close")
        );
        assert_eq!(
            lines.next(),
            Some("2024-01-02,1300.1,12.5,100000.0,70000.0,")
        );
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn explicit_from_narrows_window() {
        let provider = MockQuoteProvider::new().with_quotes(reference_quotes());
        let rows = period::fetch_window(
            &provider,
            date(2024, 1, 4),
            Period::TenYears,
            Some(date(2024, 1, 3)),
        )
        .unwrap();
        let dates: Vec<_> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-04"]);
    }
}
