use super::ui;
use crate::core::{MarketModel, MarketRegime};
use comfy_table::Cell;

/// Renders the multiplier series for a regime with min/max/mean underneath.
pub fn display_series(model: &MarketModel, regime: MarketRegime, days: u32) -> String {
    let series = model.series(regime, days);

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Day"), ui::header_cell("Multiplier")]);
    for (day, multiplier) in &series {
        table.add_row(vec![Cell::new(day), ui::multiplier_cell(*multiplier)]);
    }

    let mut output = format!(
        "Market: {}\n\n{table}",
        ui::style_text(&regime.to_string(), ui::StyleType::Title)
    );

    if !series.is_empty() {
        let values = series.iter().map(|(_, m)| *m);
        let min = values.clone().fold(f64::INFINITY, f64::min);
        let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.sum::<f64>() / series.len() as f64;
        output.push_str(&format!(
            "\n\n{} min {min:.4}  max {max:.4}  mean {mean:.4}",
            ui::style_text("Range:", ui::StyleType::TotalLabel)
        ));
    }
    output
}

pub fn run(model: &MarketModel, regime: MarketRegime, days: u32) {
    println!("{}", display_series(model, regime, days));
}
