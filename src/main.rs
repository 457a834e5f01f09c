//! `pack-status` - pack orders against the order service from a terminal.

use clap::{Parser, Subcommand};
use pack_status::clients::{ActorClient, PackClient};
use pack_status::config::load_config;
use pack_status::lifecycle::{setup_tracing, PackSystem};
use pack_status::model::{ItemRef, OrderId, PackOrder};
use pack_status::qr::{self, OrderRef};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Track packing progress of orders and complete them.
#[derive(Parser, Debug)]
#[command(name = "pack-status")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file; PACK_* environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show an order's items and packing status
    Show {
        /// Order id or scanned QR payload
        order: String,
    },
    /// Toggle items, then save progress
    Pack {
        /// Order id or scanned QR payload
        order: String,
        /// Items as `<id>`, `a:<id>` (additional) or `p:<package>/<item>`
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Start the completion countdown; Ctrl-C cancels it
    Complete {
        /// Order id or scanned QR payload
        order: String,
    },
    /// Print what a QR payload refers to
    Scan { payload: String },
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    setup_tracing();

    if let Command::Scan { payload } = &args.command {
        let found = qr::parse(payload).map_err(|e| e.to_string())?;
        println!("{}", found);
        return Ok(());
    }

    let config = load_config(args.config.as_deref()).map_err(|e| e.to_string())?;
    let system = PackSystem::from_config(&config).map_err(|e| e.to_string())?;

    let outcome = run(&system.pack_client, args.command).await;
    system.shutdown().await?;
    outcome
}

async fn run(client: &PackClient, command: Command) -> Result<(), String> {
    match command {
        Command::Show { order } => {
            let id = order_id(&order)?;
            let order = client.open(id).await.map_err(|e| e.to_string())?;
            print_order(&order);
            client.close(id).await.map_err(|e| e.to_string())?;
        }
        Command::Pack { order, items } => {
            let id = order_id(&order)?;
            let order = client.open(id).await.map_err(|e| e.to_string())?;
            for arg in &items {
                let item = item_ref(&order, arg)?;
                let toggled = client.toggle_item(id, item).await.map_err(|e| e.to_string())?;
                if !toggled.changed {
                    warn!(%item, "Order is frozen, item not toggled");
                }
            }
            let status = client.save_progress(id).await.map_err(|e| e.to_string())?;
            let derived = client.derive_status(id).await.map_err(|e| e.to_string())?;
            println!("Saved order {} as {} (all items: {})", id, status, derived);
            client.close(id).await.map_err(|e| e.to_string())?;
        }
        Command::Complete { order } => {
            let id = order_id(&order)?;
            client.open(id).await.map_err(|e| e.to_string())?;
            complete(client, id).await?;
            client.close(id).await.map_err(|e| e.to_string())?;
        }
        Command::Scan { .. } => {}
    }
    Ok(())
}

async fn complete(client: &PackClient, id: OrderId) -> Result<(), String> {
    let mut countdown = client
        .begin_completion_countdown(id)
        .await
        .map_err(|e| e.to_string())?;
    println!(
        "Completing order {} in {}s, press Ctrl-C to cancel",
        id,
        countdown.remaining().as_secs()
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(5));
    ticker.tick().await;
    loop {
        tokio::select! {
            outcome = countdown.wait() => {
                let status = outcome.map_err(|e| e.to_string())?;
                println!("Order {} is {}", id, status);
                return Ok(());
            }
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => println!("{}s left", countdown.remaining().as_secs()),
        }
    }

    let status = countdown.cancel().await.map_err(|e| e.to_string())?;
    info!(order_id = %id, %status, "Completion cancelled");
    println!("Cancelled, order {} is {}", id, status);
    Ok(())
}

/// Accepts a plain id or anything [`qr::parse`] understands.
fn order_id(arg: &str) -> Result<OrderId, String> {
    match qr::parse(arg).map_err(|e| e.to_string())? {
        OrderRef::OrderId(id) => Ok(id),
        OrderRef::Invoice(invoice) => Err(format!(
            "{} is an invoice number, scan the order label instead",
            invoice
        )),
    }
}

fn item_ref(order: &PackOrder, arg: &str) -> Result<ItemRef, String> {
    let invalid = || format!("Invalid item '{}'", arg);
    if let Some(id) = arg.strip_prefix("a:") {
        return id.parse().map(ItemRef::Additional).map_err(|_| invalid());
    }
    if let Some(rest) = arg.strip_prefix("p:") {
        let (package_id, item_id) = rest.split_once('/').ok_or_else(invalid)?;
        return Ok(ItemRef::Package {
            package_id: package_id.parse().map_err(|_| invalid())?,
            item_id: item_id.parse().map_err(|_| invalid())?,
        });
    }
    let id: u64 = arg.parse().map_err(|_| invalid())?;
    order
        .find_item(id)
        .ok_or_else(|| format!("Order {} has no item {}", order.id, id))
}

fn print_order(order: &PackOrder) {
    let mark = |packed: bool| if packed { "[x]" } else { "[ ]" };

    println!("Order {}: {}", order.id, order.status);
    for package in &order.packages {
        println!("  {} x{} (package {})", package.package_name, package.package_qty, package.id);
        for item in &package.items {
            println!("    {} {} {} x{}", mark(item.packed), item.id, item.product_name, item.qty);
        }
    }
    if !order.additional_items.is_empty() {
        println!("  Additional items");
        for item in &order.additional_items {
            println!("    {} a:{} {} x{}", mark(item.packed), item.id, item.product_name, item.qty);
        }
    }

    let summary = order.summary();
    println!(
        "Packed {}/{} package items, {}/{} additional, value {:.2}",
        summary.package_items_packed,
        summary.package_items_total,
        summary.additional_packed,
        summary.additional_total,
        summary.total_value
    );
}
