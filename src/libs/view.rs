use super::day::DATE_FORMAT;
use super::history::{HistoryWindow, Totals};
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn history_table(window: &HistoryWindow) -> Table {
        let mut table = Table::new();

        table.add_row(row!["DATE", "KEYBOARD", "LEFT CLICKS", "RIGHT CLICKS"]);
        for record in window.records() {
            table.add_row(row![
                record.date.format(DATE_FORMAT),
                r->record.keyboard_presses,
                r->record.left_clicks,
                r->record.right_clicks
            ]);
        }

        table
    }

    pub fn history(window: &HistoryWindow) {
        Self::history_table(window).printstd();
    }

    pub fn totals_table(totals: &Totals) -> Table {
        let mut table = Table::new();

        table.add_row(row!["DAYS", "KEYBOARD", "LEFT CLICKS", "RIGHT CLICKS"]);
        table.add_row(row![r->totals.days, r->totals.keyboard_presses, r->totals.left_clicks, r->totals.right_clicks]);

        table
    }

    pub fn totals(totals: &Totals) {
        Self::totals_table(totals).printstd();
    }
}
