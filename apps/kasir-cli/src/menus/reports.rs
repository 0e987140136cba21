use std::io::{BufRead, Write};

use kasir_core::{DailyReport, ReportDate};
use kasir_service::Session;

use crate::app::App;
use crate::menus::local_time;

const REPORT_MENU: &[(&str, &str)] = &[
    ("1", "Today"),
    ("2", "Choose a date"),
    ("0", "Back"),
];

impl<R: BufRead, W: Write> App<R, W> {
    pub(crate) async fn report_menu(&mut self, session: &Session) -> anyhow::Result<()> {
        loop {
            let date = match self.menu("DAILY REPORT", REPORT_MENU)?.as_str() {
                "1" => None,
                "2" => {
                    let input = self.console.prompt("Date (DD-MM-YYYY): ")?;
                    match ReportDate::parse(&input) {
                        Ok(date) => Some(date),
                        Err(e) => {
                            self.console.say(format!("Error: {}", e))?;
                            continue;
                        }
                    }
                }
                "0" => return Ok(()),
                _ => {
                    self.console.say("Unknown choice.")?;
                    continue;
                }
            };

            match self.kasir.reports().daily(session, date).await {
                Ok(report) => self.print_report(&report)?,
                Err(e) => self.show_error(e)?,
            }
        }
    }

    fn print_report(&mut self, report: &DailyReport) -> anyhow::Result<()> {
        self.console.say(format!("\n--- SALES REPORT {} ---", report.date))?;

        let offset = self.kasir.offset();
        for t in &report.transactions {
            self.console.say(format!(
                "{}  {}  total {:>14}  profit {:>14}",
                t.number(),
                local_time(t.created_at, offset),
                t.total.to_string(),
                t.profit.to_string()
            ))?;
        }

        let s = &report.summary;
        self.console.say(format!("Transactions : {}", s.transaction_count))?;
        self.console.say(format!("Total sales  : {}", s.total_sales))?;
        self.console.say(format!("Total profit : {}", s.total_profit))
    }
}

#[cfg(test)]
mod tests {
    use kasir_core::{Money, SaleRequest, SaleRequestItem};

    use crate::app::testing::*;

    #[tokio::test]
    async fn test_today_and_chosen_date() {
        let (kasir, admin) = kasir().await;
        let w = warehouse(&kasir, &admin, "Toko").await;
        let p = product(&kasir, &admin, "Beras", w.id, 5).await;
        kasir
            .transactions()
            .post(
                &admin,
                SaleRequest {
                    items: vec![SaleRequestItem {
                        product_id: p.id,
                        quantity: 3,
                    }],
                    payment: Money::from_rupiah(50_000),
                },
            )
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut ui = app(
            &kasir,
            dir.path(),
            &["1", "2", "2025-08-17", "2", "17-08-2025", "0"],
        );
        ui.report_menu(&admin).await.unwrap();

        let out = output(&ui);
        assert!(out.contains("Total sales  : Rp 30.000"));
        assert!(out.contains("Total profit : Rp 12.000"));
        assert!(out.contains("Error: date has invalid format"));
        assert!(out.contains("--- SALES REPORT 17-08-2025 ---"));
        assert!(out.contains("Transactions : 0"));
    }
}
