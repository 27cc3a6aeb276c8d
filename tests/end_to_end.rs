//! End-to-end scenario: a year of daily data through the whole pipeline.

use chrono::{Duration, NaiveDate};
use forecast_compare::core::Frequency;
use forecast_compare::data::{PreprocessConfig, RawTable};
use forecast_compare::diagnostics::{acf, decompose, pacf};
use forecast_compare::models::{Component, SarimaxSpec};
use forecast_compare::pipeline::{
    run, HoltWintersConfig, PipelineConfig, Session, HOLT_WINTERS_MODEL, SARIMAX_MODEL,
};

/// A year of daily observations: level, mild trend, weekly-ish cycle at
/// period 12, all strictly positive.
fn yearly_csv() -> String {
    let base = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    let mut csv = String::from("date,sales\n");
    for i in 0..365 {
        let t = i as f64;
        let value = 200.0 + 0.3 * t + 25.0 * (std::f64::consts::TAU * t / 12.0).sin();
        let date = base + Duration::days(i as i64);
        csv.push_str(&format!("{},{value:.4}\n", date.format("%Y-%m-%d")));
    }
    csv
}

fn yearly_config() -> PipelineConfig {
    PipelineConfig {
        data: PreprocessConfig {
            date_column: "date".to_string(),
            target_column: "sales".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            frequency: Frequency::Daily,
        },
        test_fraction: 0.2,
        sarimax: SarimaxSpec::new((1, 1, 1), (1, 1, 1, 12)),
        holt_winters: HoltWintersConfig {
            trend: Component::Additive,
            seasonal: Component::Additive,
            seasonal_periods: 12,
        },
    }
}

#[test]
fn yearly_daily_scenario() {
    let table = RawTable::from_reader(yearly_csv().as_bytes()).unwrap();
    let outcome = run(&table, &yearly_config()).unwrap();

    assert_eq!(outcome.series.len(), 365);
    assert_eq!(outcome.train.len(), 292);
    assert_eq!(outcome.test.len(), 73);

    // Both strategies produce a full-horizon forecast.
    assert_eq!(outcome.runs.len(), 2);
    for model_run in &outcome.runs {
        let forecast = model_run.outcome.as_ref().unwrap();
        assert_eq!(forecast.horizon(), 73);
        assert!(forecast.point().iter().all(|v| v.is_finite()));
    }

    // Exactly two KPI rows, both finite (the test series has no zeros).
    assert_eq!(outcome.report.len(), 2);
    for model in [SARIMAX_MODEL, HOLT_WINTERS_MODEL] {
        let kpi = outcome.report.get(model).unwrap();
        assert!(kpi.mae.is_finite() && kpi.mae >= 0.0, "{model} MAE: {}", kpi.mae);
        assert!(kpi.mape.is_finite() && kpi.mape >= 0.0, "{model} MAPE: {}", kpi.mape);
        assert!(kpi.r_squared <= 1.0, "{model} R²: {}", kpi.r_squared);
    }
}

#[test]
fn diagnostics_describe_the_series() {
    let table = RawTable::from_reader(yearly_csv().as_bytes()).unwrap();
    let config = yearly_config();
    let mut session = Session::new(config);
    let series = session.load(&table).unwrap();

    // The injected cycle shows up in the autocorrelation at its period.
    let autocorr = acf(series.values(), 24);
    assert!(autocorr[12] > autocorr[6]);

    let partial = pacf(series.values(), 12);
    assert!(partial[0] == 1.0);
    assert!(partial[1].is_finite());

    // Decomposition at the injected period explains nearly everything:
    // residuals are tiny against the seasonal swing.
    let parts = decompose(series, 12).unwrap();
    let max_residual = parts
        .residual
        .iter()
        .filter(|r| r.is_finite())
        .fold(0.0_f64, |acc, r| acc.max(r.abs()));
    assert!(max_residual < 5.0, "max residual {max_residual}");
}

#[test]
fn session_supports_reconfiguration_between_runs() {
    let table = RawTable::from_reader(yearly_csv().as_bytes()).unwrap();
    let mut session = Session::new(yearly_config());
    session.load(&table).unwrap();

    let first = session.run().unwrap();
    assert_eq!(first.test.len(), 73);

    session.set_test_fraction(0.1);
    session.set_sarimax(SarimaxSpec::new((1, 1, 0), (0, 1, 1, 12)));
    session.set_holt_winters(HoltWintersConfig {
        trend: Component::Additive,
        seasonal: Component::Multiplicative,
        seasonal_periods: 12,
    });

    let second = session.run().unwrap();
    assert_eq!(second.train.len(), 328);
    assert_eq!(second.test.len(), 37);
    assert_eq!(second.report.len(), 2);
}
