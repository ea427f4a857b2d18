use super::ui;
use crate::core::{ConversionQuote, RateTable, TargetCurrency, convert_once};
use anyhow::{Context, Result};
use comfy_table::Cell;
use tracing::info;

impl ConversionQuote {
    pub fn display_as_table(&self) -> String {
        let unit = self.currency.unit();
        let result = &self.result;

        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Item"), ui::header_cell("Amount")]);

        table.add_row(vec![Cell::new("Points"), ui::amount_cell(self.points, 0)]);
        table.add_row(vec![
            Cell::new("Rate (points per unit)"),
            ui::amount_cell(result.effective_rate, 2),
        ]);
        table.add_row(vec![
            Cell::new(format!("Gross ({unit})")),
            ui::amount_cell(result.gross, 2),
        ]);
        table.add_row(vec![
            Cell::new(format!("Fee ({unit})")),
            ui::amount_cell(-result.fee, 2),
        ]);
        table.add_row(vec![
            Cell::new(format!("Bonus ({unit})")),
            ui::amount_cell(result.bonus, 2),
        ]);
        table.add_row(vec![
            Cell::new(format!("Net ({unit})")),
            ui::total_cell(result.net, 2),
        ]);

        let mut output = format!(
            "Conversion to {}\n\n",
            ui::style_text(&self.currency.to_string(), ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{} {}",
            ui::style_text("Remaining balance:", ui::StyleType::TotalLabel),
            ui::style_text(
                &format!("{:.0} points", self.remaining_balance),
                ui::StyleType::Subtle
            )
        ));
        output
    }
}

pub fn run(
    rates: &RateTable,
    points: f64,
    currency: TargetCurrency,
    available_balance: f64,
    bonus_enabled: bool,
) -> Result<()> {
    info!(%currency, points, available_balance, "Quoting single conversion");

    let quote = convert_once(points, currency, available_balance, bonus_enabled, rates)
        .context("Conversion rejected")?;

    println!("{}", quote.display_as_table());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::tests::sample_table;

    #[test]
    fn test_quote_table_lists_breakdown() {
        let quote =
            convert_once(6000.0, TargetCurrency::Fiat, 25_000.0, true, &sample_table()).unwrap();
        let output = quote.display_as_table();
        assert!(output.contains("Gross (USD)"));
        assert!(output.contains("60.00"));
        assert!(output.contains("-1.50"));
        assert!(output.contains("19000 points"));
    }

    #[test]
    fn test_rejected_conversion_keeps_reason() {
        let err = run(&sample_table(), 500.0, TargetCurrency::Fiat, 25_000.0, true).unwrap_err();
        assert!(format!("{err:#}").contains("below the minimum"));
    }
}
