use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Arg, ArgMatches, Command};
use num_traits::Zero;
use std::convert::TryInto;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use vouchers::Book;
use vouchers::export::{self, PrintForm};
use vouchers::money::Money;
use vouchers::rollup;
use vouchers::store::Store;
use vouchers::voucher::Voucher;
use vouchers::voucher::draft::Draft;

fn item_args(cmd: Command<'_>) -> Command<'_> {
    cmd.arg(
        Arg::new("recipient")
            .short('r')
            .long("recipient")
            .help("Recipient unit")
            .value_name("UNIT")
            .takes_value(true),
    )
    .arg(
        Arg::new("date")
            .short('d')
            .long("date")
            .help("Voucher date, defaults to today")
            .value_name("YYYY-MM-DD")
            .takes_value(true),
    )
    .arg(
        Arg::new("driver")
            .long("driver")
            .help("Driver name")
            .value_name("NAME")
            .takes_value(true),
    )
    .arg(
        Arg::new("trip-cost")
            .long("trip-cost")
            .help("Driver trip cost")
            .value_name("AMOUNT")
            .takes_value(true),
    )
    .arg(
        Arg::new("notes")
            .long("notes")
            .help("Free-text notes")
            .value_name("TEXT")
            .takes_value(true),
    )
    .arg(
        Arg::new("item")
            .short('i')
            .long("item")
            .help("Line item, repeatable")
            .value_name("NAME:QTY:PRICE")
            .multiple_occurrences(true)
            .takes_value(true),
    )
}

#[async_std::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let matches = Command::new("Vouchers")
        .version("0.1.0")
        .about("Inventory voucher management tools")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .help("Voucher storage file")
                .value_name("FILE")
                .default_value("vouchers.json")
                .takes_value(true),
        )
        .subcommand(Command::new("dashboard").about("Shows aggregate stats and recent vouchers"))
        .subcommand(item_args(Command::new("new").about("Creates a voucher")))
        .subcommand(
            item_args(
                Command::new("edit")
                    .about("Edits a voucher, id preserved")
                    .arg(Arg::new("id").required(true).takes_value(true)),
            )
            .arg(
                Arg::new("remove-item")
                    .long("remove-item")
                    .help("Remove the item row at this STT")
                    .value_name("STT")
                    .multiple_occurrences(true)
                    .takes_value(true),
            )
            .arg(
                Arg::new("set-item")
                    .long("set-item")
                    .help("Set quantity and price of the item row at this STT")
                    .value_name("STT:QTY:PRICE")
                    .multiple_occurrences(true)
                    .takes_value(true),
            )
            .arg(
                Arg::new("rename-item")
                    .long("rename-item")
                    .help("Rename the item row at this STT")
                    .value_name("STT:NAME")
                    .multiple_occurrences(true)
                    .takes_value(true),
            ),
        )
        .subcommand(Command::new("list").about("Shows the full voucher history"))
        .subcommand(
            Command::new("show")
                .about("Prints one voucher")
                .arg(Arg::new("id").required(true).takes_value(true)),
        )
        .subcommand(
            Command::new("delete")
                .about("Deletes a voucher after confirmation")
                .arg(Arg::new("id").required(true).takes_value(true))
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Skip the confirmation prompt"),
                ),
        )
        .subcommand(Command::new("debts").about("Shows debt totals by recipient unit"))
        .subcommand(
            Command::new("export")
                .about("Writes spreadsheet exports")
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("out")
                        .help("Output directory")
                        .value_name("DIR")
                        .default_value(".")
                        .takes_value(true),
                )
                .subcommand(
                    Command::new("detail")
                        .about("One voucher as a detail sheet")
                        .arg(Arg::new("id").required(true).takes_value(true)),
                )
                .subcommand(Command::new("history").about("Whole history, one row per line item")),
        )
        .get_matches();

    let store = Store::new(matches.value_of("file").unwrap_or("vouchers.json"));
    let mut book = Book::open(store).await;

    match matches.subcommand() {
        Some(("new", sub)) => {
            let today = Local::now().date_naive();
            let mut draft = Draft::new(today);
            apply_fields(&mut draft, sub)?;
            let seed = draft.items()[0].id.clone();
            for spec in sub.values_of("item").into_iter().flatten() {
                let (name, quantity, price) = parse_item_spec(spec)?;
                draft.push_item(&name, quantity, price)?;
            }
            if draft.items().len() > 1 {
                draft.remove_item(&seed);
            }
            let id = book.create(&draft, today).await?;
            println!("Created voucher {id}");
        }
        Some(("edit", sub)) => {
            let id = sub.value_of("id").unwrap(); // required
            let mut draft = {
                let existing = book.get(id).context(format!("No voucher {}", id))?;
                Draft::from_voucher(existing)
            };
            apply_fields(&mut draft, sub)?;
            for spec in sub.values_of("item").into_iter().flatten() {
                let (name, quantity, price) = parse_item_spec(spec)?;
                draft.push_item(&name, quantity, price)?;
            }
            for spec in sub.values_of("set-item").into_iter().flatten() {
                let (stt, quantity, price) = parse_set_spec(spec)?;
                let item_id = draft
                    .item_id_at(stt)
                    .context(format!("No item row at STT {}", stt))?;
                draft.set_quantity(&item_id, quantity)?;
                draft.set_price(&item_id, price)?;
            }
            for spec in sub.values_of("rename-item").into_iter().flatten() {
                let (stt, name) = parse_rename_spec(spec)?;
                let item_id = draft
                    .item_id_at(stt)
                    .context(format!("No item row at STT {}", stt))?;
                draft.set_name(&item_id, &name)?;
            }
            for stt in sub.values_of("remove-item").into_iter().flatten() {
                let stt: u32 = stt
                    .parse()
                    .context(format!("--remove-item takes an STT, got {:?}", stt))?;
                let item_id = draft
                    .item_id_at(stt)
                    .context(format!("No item row at STT {}", stt))?;
                draft.remove_item(&item_id);
            }
            book.update(id, &draft).await?;
            println!("Updated voucher {id}");
        }
        Some(("list", _)) => print_list(book.records()),
        Some(("show", sub)) => {
            let id = sub.value_of("id").unwrap(); // required
            let voucher = book.get(id).context(format!("No voucher {}", id))?;
            print!("{}", PrintForm(voucher));
        }
        Some(("delete", sub)) => {
            let id = sub.value_of("id").unwrap(); // required
            if book.get(id).is_none() {
                bail!("No voucher {}", id);
            }
            if !sub.is_present("yes") && !confirm(&format!("Delete voucher {}? [y/N] ", id))? {
                println!("Aborted, nothing deleted");
                return Ok(());
            }
            book.delete(id).await;
            println!("Deleted voucher {id}");
        }
        Some(("debts", _)) => print_debts(book.records()),
        Some(("export", sub)) => {
            let out = Path::new(sub.value_of("out").unwrap_or("."));
            match sub.subcommand() {
                Some(("detail", detail)) => {
                    let id = detail.value_of("id").unwrap(); // required
                    let voucher = book.get(id).context(format!("No voucher {}", id))?;
                    let path = out.join(export::detail_filename(voucher));
                    export::write_rows(&path, &export::detail_rows(voucher))?;
                    println!("Wrote {}", path.display());
                }
                Some(("history", _)) => {
                    let path = out.join(export::history_filename());
                    export::write_rows(&path, &export::history_rows(book.records()))?;
                    println!("Wrote {}", path.display());
                }
                _ => bail!("Use `export detail <id>` or `export history`"),
            }
        }
        _ => print_dashboard(book.records()),
    }
    Ok(())
}

/// Applies the shared field flags to a draft; absent flags leave the
/// draft's current values alone.
fn apply_fields(draft: &mut Draft, sub: &ArgMatches) -> Result<()> {
    if let Some(recipient) = sub.value_of("recipient") {
        draft.recipient_unit = recipient.to_owned();
    }
    if let Some(date) = sub.value_of("date") {
        draft.date = date.parse().context("Date must be YYYY-MM-DD")?;
    }
    if let Some(driver) = sub.value_of("driver") {
        draft.driver_name = driver.to_owned();
    }
    if let Some(cost) = sub.value_of("trip-cost") {
        let cost: f64 = cost
            .parse()
            .context(format!("Trip cost must be a number, got {:?}", cost))?;
        draft.driver_trip_cost = cost.try_into()?;
    }
    if let Some(notes) = sub.value_of("notes") {
        draft.notes = notes.to_owned();
    }
    Ok(())
}

/// NAME:QTY:PRICE, parsed from the right so names may contain colons.
fn parse_item_spec(spec: &str) -> Result<(String, f64, Money)> {
    let mut parts = spec.rsplitn(3, ':');
    let price = parts.next();
    let quantity = parts.next();
    let name = parts.next();
    match (name, quantity, price) {
        (Some(name), Some(quantity), Some(price)) if !name.is_empty() => {
            let quantity: f64 = quantity
                .parse()
                .context(format!("Bad quantity in {:?}", spec))?;
            let price: f64 = price
                .parse()
                .context(format!("Bad unit price in {:?}", spec))?;
            Ok((name.to_owned(), quantity, price.try_into()?))
        }
        _ => bail!("Items are given as NAME:QTY:PRICE, got {:?}", spec),
    }
}

/// STT:QTY:PRICE.
fn parse_set_spec(spec: &str) -> Result<(u32, f64, Money)> {
    let parts: Vec<&str> = spec.splitn(3, ':').collect();
    match parts.as_slice() {
        [stt, quantity, price] => {
            let stt: u32 = stt.parse().context(format!("Bad STT in {:?}", spec))?;
            let quantity: f64 = quantity
                .parse()
                .context(format!("Bad quantity in {:?}", spec))?;
            let price: f64 = price
                .parse()
                .context(format!("Bad unit price in {:?}", spec))?;
            Ok((stt, quantity, price.try_into()?))
        }
        _ => bail!("Item updates are given as STT:QTY:PRICE, got {:?}", spec),
    }
}

/// STT:NAME.
fn parse_rename_spec(spec: &str) -> Result<(u32, String)> {
    match spec.split_once(':') {
        Some((stt, name)) if !name.is_empty() => {
            let stt: u32 = stt.parse().context(format!("Bad STT in {:?}", spec))?;
            Ok((stt, name.to_owned()))
        }
        _ => bail!("Renames are given as STT:NAME, got {:?}", spec),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn print_dashboard(records: &[Voucher]) {
    let stats = rollup::stats(records);
    println!("Total value   | {} VNĐ", stats.total_value);
    println!("Line items    | {}", stats.item_count);
    println!("Partners      | {}", stats.partner_count);
    println!("Vouchers      | {}", stats.voucher_count);
    println!();
    if records.is_empty() {
        println!("No vouchers recorded yet");
        return;
    }
    println!("Recent vouchers:");
    for record in records.iter().take(5) {
        println!(
            "{:<10} | {} | {:<24} | {:>2} items | {:>14}",
            record.id,
            record.date,
            record.recipient_unit,
            record.items.len(),
            record.grand_total.to_string()
        );
    }
}

fn print_list(records: &[Voucher]) {
    if records.is_empty() {
        println!("No vouchers recorded yet");
        return;
    }
    println!(
        "{:<10} | {:<10} | {:<24} | {:<16} | {:>5} | {:>14}",
        "Id", "Date", "Recipient", "Driver", "Items", "Total"
    );
    for record in records {
        let driver = if record.driver_name.is_empty() {
            "N/A"
        } else {
            record.driver_name.as_str()
        };
        println!(
            "{:<10} | {} | {:<24} | {:<16} | {:>5} | {:>14}",
            record.id,
            record.date,
            record.recipient_unit,
            driver,
            record.items.len(),
            record.grand_total.to_string()
        );
    }
}

fn print_debts(records: &[Voucher]) {
    let partners = rollup::aggregate_by_partner(records);
    if partners.is_empty() {
        println!("No partner debt to show");
        return;
    }
    let mut partners: Vec<_> = partners.into_values().collect();
    partners.sort_by(|a, b| a.name.cmp(&b.name));
    let total: Money = partners
        .iter()
        .fold(Money::zero(), |acc, partner| acc + partner.total_debt);
    println!(
        "{:<24} | {:>8} | {:<10} | {:>14}",
        "Recipient", "Vouchers", "Last", "Debt"
    );
    for partner in &partners {
        println!(
            "{:<24} | {:>8} | {} | {:>14}",
            partner.name,
            partner.transaction_count,
            partner.last_transaction,
            partner.total_debt.to_string()
        );
    }
    println!("{:<24} | {:>8} | {:<10} | {:>14}", "TOTAL", "", "", total.to_string());
}
