use std::fmt::Write;

use crate::runner::RunOutput;

/// Renders one row per strategy with the headline KPIs.
pub fn comparison_table(outputs: &[RunOutput]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- Controller Comparison ---");
    let _ = writeln!(
        out,
        "{:<8} {:>10} {:>10} {:>10} {:>11} {:>12} {:>9}",
        "strategy", "RMSE °C", "MAE °C", "RMSE %RH", "comfort %", "energy kWh", "switches"
    );
    for o in outputs {
        let k = &o.kpi;
        let _ = writeln!(
            out,
            "{:<8} {:>10.3} {:>10.3} {:>10.2} {:>11.1} {:>12.2} {:>9}",
            o.kind.as_str(),
            k.rmse_temp_c,
            k.mae_temp_c,
            k.rmse_rh,
            100.0 - k.comfort_violation_pct,
            k.total_energy_kwh,
            k.mode_switches
        );
    }
    out
}

pub fn print_comparison(outputs: &[RunOutput]) {
    println!("\n{}", comparison_table(outputs));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::controller::ControllerKind;
    use crate::sim::kpi::KpiReport;

    #[test]
    fn one_row_per_strategy() {
        let outputs: Vec<RunOutput> = [ControllerKind::Pid, ControllerKind::OnOff]
            .into_iter()
            .map(|kind| RunOutput {
                kind,
                results: Vec::new(),
                kpi: KpiReport {
                    rmse_temp_c: 0.5,
                    total_energy_kwh: 12.0,
                    ..KpiReport::default()
                },
            })
            .collect();
        let table = comparison_table(&outputs);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("pid"));
        assert!(lines[3].starts_with("onoff"));
        assert!(lines[2].contains("0.500"));
        assert!(lines[2].contains("12.00"));
    }
}
