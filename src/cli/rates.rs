use super::ui;
use crate::core::RateTable;
use comfy_table::Cell;

pub fn display_rates(rates: &RateTable) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Points / Unit"),
        ui::header_cell("Fee (%)"),
        ui::header_cell("Bonus Threshold"),
        ui::header_cell("Bonus (%)"),
        ui::header_cell("Min Points"),
        ui::header_cell("Max Points"),
    ]);

    for entry in rates.entries() {
        let max_points = entry
            .max_points
            .map_or(Cell::new("no limit"), |max| ui::amount_cell(max, 0));
        table.add_row(vec![
            Cell::new(format!("{} ({})", entry.currency, entry.currency.unit())),
            ui::amount_cell(entry.base_rate, 2),
            ui::amount_cell(entry.fee_percent, 2),
            ui::amount_cell(entry.bonus_threshold, 2),
            ui::amount_cell(entry.bonus_percent, 2),
            ui::amount_cell(entry.min_points, 0),
            max_points,
        ]);
    }

    format!(
        "{}\n\n{table}",
        ui::style_text("Conversion Rates", ui::StyleType::Title)
    )
}

pub fn run(rates: &RateTable) {
    println!("{}", display_rates(rates));
}
