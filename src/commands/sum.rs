use crate::{
    db::days::read_records,
    libs::{config::Config, data_storage::DataStorage, history::Totals, messages::Message, view::View},
    msg_print,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct SumArgs {
    #[arg(long, help = "Print the totals as JSON")]
    json: bool,
}

// Totals cover the days recorded in the store, read without taking the lock.
pub fn cmd(args: SumArgs) -> Result<()> {
    let tracker = Config::read()?.tracker();
    let records = read_records(&tracker.data_path(&DataStorage::new())?)?;
    let totals = Totals::from_store_records(&records);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&totals)?);
        return Ok(());
    }

    msg_print!(Message::TotalsHeader, true);
    View::totals(&totals);

    Ok(())
}
