//! CSV export for per-tick reports.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::sim::TickReport;
use crate::sim::state::FlowDirection;

/// Column header for CSV telemetry export.
const HEADER: &str = "tick,time,solar_kw,wind_kw,home_kw,ev_kw,battery_pct,\
                       grid_price,net_flow_kw,direction,efficiency_bonus,\
                       total_savings,energy_optimized,co2_reduced,social_cost_saved,\
                       grid_contributions,negotiation,decision";

/// Exports tick reports to a CSV file at the given path.
///
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_csv(reports: &[TickReport], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_csv(reports, BufWriter::new(file))
}

/// Writes tick reports as CSV to any writer.
///
/// Event columns hold the emitted event's summary line, or are empty when
/// no event fired on that tick.
///
/// # Errors
///
/// Returns [`Error::Csv`] if writing fails.
pub fn write_csv(reports: &[TickReport], writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in reports {
        let s = &r.state;
        let direction = match r.flows.direction {
            FlowDirection::Export => "export",
            FlowDirection::Import => "import",
            FlowDirection::Balanced => "balanced",
        };
        wtr.write_record(&[
            r.tick.to_string(),
            r.time.to_string(),
            format!("{:.4}", s.solar_generation),
            format!("{:.4}", s.wind_generation),
            format!("{:.4}", s.home_consumption),
            format!("{:.4}", s.ev_charging),
            format!("{:.4}", s.battery_level),
            format!("{:.4}", s.grid_price),
            format!("{:.4}", r.flows.net_flow),
            direction.to_string(),
            format!("{:.4}", r.delta.efficiency_bonus),
            format!("{:.4}", r.stats.total_savings),
            format!("{:.4}", r.stats.energy_optimized),
            format!("{:.4}", r.stats.co2_reduced),
            format!("{:.4}", r.stats.social_cost_saved),
            format!("{:.4}", r.stats.grid_stability_contributions),
            r.negotiation
                .as_ref()
                .map(|e| e.template.message.clone())
                .unwrap_or_default(),
            r.decision
                .as_ref()
                .map(|e| format!("{} ({})", e.template.summary, e.impact))
                .unwrap_or_default(),
        ])?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}
