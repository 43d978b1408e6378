//! Plain-text renderings for terminal output.

use std::fmt::Write as _;

use flu_risk_scoring_models::ForecastSeries;
use flu_risk_server_models::round_risk;

/// Renders a forecast as a two-column `DATE RISK` table, one line per day.
pub fn forecast_table(series: &ForecastSeries) -> String {
    let mut out = format!("{:<12}{:>6}\n", "DATE", "RISK");
    for point in &series.points {
        let _ = writeln!(
            out,
            "{:<12}{:>6.1}",
            point.date().format("%Y-%m-%d").to_string(),
            round_risk(point.value())
        );
    }
    out
}

/// Renders one city per line.
pub fn location_list(cities: &[String]) -> String {
    cities.iter().fold(String::new(), |mut out, city| {
        out.push_str(city);
        out.push('\n');
        out
    })
}
