use crate::{
    db::days::read_records,
    libs::{
        config::Config,
        counter::DailyCounter,
        data_storage::DataStorage,
        day::DayRecord,
        history::{GapFill, HistoryWindow},
        messages::Message,
        view::View,
    },
    msg_bail_anyhow, msg_print,
};
use anyhow::Result;
use chrono::Local;
use clap::Args;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(short, long, help = "Number of most recent days to show")]
    days: Option<usize>,
    #[arg(long, help = "Show days without activity as zero")]
    dense: bool,
    #[arg(long, help = "Print the series as JSON")]
    json: bool,
}

pub fn cmd(args: HistoryArgs) -> Result<()> {
    let tracker = Config::read()?.tracker();
    let days = args.days.unwrap_or(tracker.history_days);
    if days == 0 {
        msg_bail_anyhow!(Message::HistoryDaysMustBePositive);
    }
    let fill = if args.dense { GapFill::Dense } else { tracker.gap_fill() };

    let snapshot = load_snapshot(&tracker.data_path(&DataStorage::new())?)?;
    let window = HistoryWindow::from_snapshot(&snapshot, days, fill);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&window)?);
        return Ok(());
    }

    msg_print!(Message::HistoryHeader(days), true);
    if window.is_empty() {
        msg_print!(Message::HistoryEmpty);
        return Ok(());
    }
    View::history(&window);

    Ok(())
}

// Reads the store without locking it, so history works while the tracker
// is running, and lays it out as the tracker would see it today.
fn load_snapshot(path: &std::path::Path) -> Result<Vec<DayRecord>> {
    let records = read_records(path)?;
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let mut counter = DailyCounter::new(Local::now().date_naive());
    counter.reconcile(records);
    Ok(counter.snapshot())
}
