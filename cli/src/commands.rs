// Command Dispatch
//
// Turns parsed commands into store calls and renders the outcome as text
// lines. Business failures are rendered, not propagated.

use anyhow::Result;
use clap::Subcommand;
use rust_decimal::Decimal;

use vendor_kernel::{
    Currency, FailureSource, Money, Product, ProductId, ServiceError, TableStore, VendorService,
};

/// Restock count used when none is given.
pub const DEFAULT_RESTOCK: i64 = 10;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List products with price and stock
    List {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show money spent per buyer
    Accounting {
        /// Print the ledger as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a product: <price> <description ...>
    ProductCreate {
        price: Decimal,

        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// Delete a product
    ProductDelete { id: u64 },

    /// Set the stock of a product
    ProductRestock {
        id: u64,

        #[arg(long, default_value_t = DEFAULT_RESTOCK, allow_negative_numbers = true)]
        count: i64,
    },

    /// Buy one unit of a product
    Purchase {
        id: u64,

        /// Name charged for the purchase
        #[arg(long)]
        buyer: String,
    },
}

/// Run one command and return the lines to print.
pub fn execute<F, S>(
    service: &mut VendorService<F, S>,
    command: &Command,
    currency: &Currency,
) -> Result<Vec<String>>
where
    F: FailureSource,
    S: TableStore,
{
    let lines = match command {
        Command::List { json } => match service.products() {
            Ok(catalog) if *json => vec![serde_json::to_string_pretty(catalog)?],
            Ok(catalog) => {
                let mut lines = Vec::with_capacity(catalog.len() + 1);
                lines.push(list_row("ID", "Price", "Stock", "Name"));
                for (id, status) in catalog.iter() {
                    let product = &status.product;
                    lines.push(list_row(
                        &id.to_string(),
                        &product.price.to_string(),
                        &status.stock.to_string(),
                        &product.name,
                    ));
                }
                lines
            }
            Err(err) => vec![err.to_string()],
        },

        Command::Accounting { json } => match service.accounting() {
            Ok(ledger) if *json => vec![serde_json::to_string_pretty(ledger)?],
            Ok(ledger) => {
                let mut lines = vec![format!("{:<16} | {}", "Buyer", "Spent")];
                lines.extend(
                    ledger
                        .iter()
                        .map(|(buyer, spent)| format!("{buyer:<16} | {spent}")),
                );
                lines
            }
            Err(err) => vec![err.to_string()],
        },

        Command::ProductCreate { price, description } => {
            let product = Product::new(
                description.join(" "),
                Money::new(*price, currency.clone()),
            );
            render(
                service.product_create(product),
                |id| format!("Created product {id}"),
            )
        }

        Command::ProductDelete { id } => render(
            service.product_delete(ProductId(*id)),
            |()| format!("Deleted product {id}"),
        ),

        Command::ProductRestock { id, count } => render(
            service.product_add_stock(ProductId(*id), *count),
            |_| format!("Restocked product {id}"),
        ),

        Command::Purchase { id, buyer } => {
            render(service.product_purchase(buyer, ProductId(*id)), |message| message)
        }
    };

    Ok(lines)
}

fn list_row(id: &str, price: &str, stock: &str, name: &str) -> String {
    format!("{id:<3} | {price:<8} | {stock:<5} | {name}")
}

fn render<T>(result: Result<T, ServiceError>, ok: impl FnOnce(T) -> String) -> Vec<String> {
    match result {
        Ok(value) => vec![ok(value)],
        Err(err) => vec![err.to_string()],
    }
}
