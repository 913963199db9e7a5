//! Menu loop and flows. All rendering lives here; the business layer never
//! prints.

use std::io::{self, Write};

use chrono::{Local, NaiveDate};

use smartstock_catalog::{Perishability, Product, ProductPatch};
use smartstock_core::ProductId;
use smartstock_manager::{LOW_STOCK_THRESHOLD, ManagerError, StoreManager};
use smartstock_sales::Sale;
use smartstock_store::{ProductStore, SalesStore};

pub async fn run<P, S>(mut manager: StoreManager<P, S>) -> anyhow::Result<()>
where
    P: ProductStore,
    S: SalesStore,
{
    loop {
        println!("\n=== SmartStock Retail Management ===\n");
        println!("1.  Add product");
        println!("2.  Update product");
        println!("3.  Delete product");
        println!("4.  Increase stock");
        println!("5.  Process sale");
        println!("6.  View low-stock products");
        println!("7.  View all products (sorted)");
        println!("8.  Check product expiry");
        println!("9.  View all sales");
        println!("10. View sales by product");
        println!("0.  Exit");

        let Some(choice) = read_i64("Enter your choice: ", None) else {
            println!("\nGoodbye!");
            return Ok(());
        };
        let outcome = match choice {
            1 => add_product_flow(&mut manager).await,
            2 => update_product_flow(&mut manager).await,
            3 => delete_product_flow(&mut manager).await,
            4 => increase_stock_flow(&mut manager).await,
            5 => process_sale_flow(&mut manager).await,
            6 => low_stock_flow(&manager),
            7 => sorted_products_flow(&manager),
            8 => check_expiry_flow(&manager),
            9 => all_sales_flow(&manager).await,
            10 => sales_by_product_flow(&manager).await,
            0 => {
                println!("\nGoodbye!");
                return Ok(());
            }
            _ => {
                println!("Invalid option.");
                Ok(())
            }
        };

        if let Err(err) = outcome {
            println!("Error: {err}");
        }
    }
}

async fn add_product_flow<P: ProductStore, S: SalesStore>(
    manager: &mut StoreManager<P, S>,
) -> Result<(), ManagerError> {
    let (Some(name), Some(price), Some(quantity)) = (
        read_non_empty("Enter product name: "),
        read_price("Enter price: "),
        read_i64("Enter stock quantity: ", Some(0)),
    ) else {
        return Ok(());
    };

    let product = manager.add_product(&name, price, quantity).await?;
    println!("Product added successfully!");
    display_product(product);
    Ok(())
}

async fn update_product_flow<P: ProductStore, S: SalesStore>(
    manager: &mut StoreManager<P, S>,
) -> Result<(), ManagerError> {
    let Some(id) = read_product_id() else {
        return Ok(());
    };
    if manager.product(id).is_none() {
        println!("Product {id} not found.");
        return Ok(());
    }

    println!("Leave input blank to keep a field unchanged.");
    let (Some(name), Some(price_input), Some(stock_input)) = (
        prompt("New name: "),
        prompt("New price: "),
        prompt("New stock quantity: "),
    ) else {
        return Ok(());
    };

    let mut patch = ProductPatch::default();
    if !name.is_empty() {
        patch.name = Some(name);
    }
    if !price_input.is_empty() {
        match price_input.parse::<f64>() {
            Ok(price) => patch.price = Some(price),
            Err(_) => {
                println!("Invalid price. Update aborted.");
                return Ok(());
            }
        }
    }
    if !stock_input.is_empty() {
        match stock_input.parse::<i64>() {
            Ok(stock) => patch.stock_quantity = Some(stock),
            Err(_) => {
                println!("Invalid stock quantity. Update aborted.");
                return Ok(());
            }
        }
    }
    if patch.is_empty() {
        println!("No fields provided for update.");
        return Ok(());
    }

    let product = manager.update_product(id, patch).await?;
    println!("Product updated successfully!");
    display_product(product);
    Ok(())
}

async fn delete_product_flow<P: ProductStore, S: SalesStore>(
    manager: &mut StoreManager<P, S>,
) -> Result<(), ManagerError> {
    let Some(id) = read_product_id() else {
        return Ok(());
    };
    if manager.product(id).is_none() {
        println!("Product {id} not found.");
        return Ok(());
    }

    manager.delete_product(id).await?;
    println!("Product deleted successfully.");
    Ok(())
}

async fn increase_stock_flow<P: ProductStore, S: SalesStore>(
    manager: &mut StoreManager<P, S>,
) -> Result<(), ManagerError> {
    let Some(id) = read_product_id() else {
        return Ok(());
    };
    if manager.product(id).is_none() {
        println!("Product {id} not found.");
        return Ok(());
    }
    let Some(quantity) = read_i64("Enter quantity: ", Some(1)) else {
        return Ok(());
    };

    let product = manager.increase_product_stock(id, quantity).await?;
    println!("\nStock updated successfully!");
    display_product(product);
    Ok(())
}

async fn process_sale_flow<P: ProductStore, S: SalesStore>(
    manager: &mut StoreManager<P, S>,
) -> Result<(), ManagerError> {
    let Some(id) = read_product_id() else {
        return Ok(());
    };
    if manager.product(id).is_none() {
        println!("Product {id} not found.");
        return Ok(());
    }
    let Some(quantity) = read_i64("Enter quantity sold: ", Some(1)) else {
        return Ok(());
    };

    let total = match manager.preview_sale(id, quantity) {
        Ok(total) => total,
        Err(err) if err.is_insufficient_stock() => {
            println!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    println!("\nTotal amount to pay: {total:.2}");
    let confirm = prompt("Do you want to proceed? (y/n): ").unwrap_or_default();
    if !confirm.eq_ignore_ascii_case("y") {
        println!("Transaction cancelled.");
        return Ok(());
    }

    manager.process_sale(id, quantity).await?;
    println!("Sale processed successfully.");

    if let Some(product) = manager.product(id) {
        if product.stock_quantity() < LOW_STOCK_THRESHOLD {
            println!(
                "ALERT: '{}' is low on stock (Remaining: {})",
                product.name(),
                product.stock_quantity()
            );
        }
    }
    Ok(())
}

fn low_stock_flow<P: ProductStore, S: SalesStore>(
    manager: &StoreManager<P, S>,
) -> Result<(), ManagerError> {
    let products = manager.low_stock_products();
    if products.is_empty() {
        println!("No low-stock products.");
        return Ok(());
    }

    println!("\nLow-stock products:");
    for product in products {
        display_product(product);
    }
    Ok(())
}

fn sorted_products_flow<P: ProductStore, S: SalesStore>(
    manager: &StoreManager<P, S>,
) -> Result<(), ManagerError> {
    println!("\n1. Sort by price");
    println!("2. Sort by stock quantity");

    let products = match read_i64("Choose sorting option: ", Some(1)) {
        Some(1) => manager.products_by_price(),
        Some(2) => manager.products_by_stock(),
        Some(_) => {
            println!("Invalid choice.");
            return Ok(());
        }
        None => return Ok(()),
    };

    println!("\n--- Sorted Products ---");
    for product in products {
        display_product(product);
    }
    Ok(())
}

fn check_expiry_flow<P: ProductStore, S: SalesStore>(
    manager: &StoreManager<P, S>,
) -> Result<(), ManagerError> {
    let Some(id) = read_product_id() else {
        return Ok(());
    };
    let Some(product) = manager.product(id) else {
        println!("Product {id} not found.");
        return Ok(());
    };

    let Some(input) = prompt("Enter expiry date (YYYY-MM-DD): ") else {
        return Ok(());
    };
    let expiry_date = match NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            println!("Invalid date format. Use YYYY-MM-DD.");
            return Ok(());
        }
    };

    let facet = Perishability::Perishable { expiry_date };
    if facet.is_expired(Local::now().date_naive()) {
        println!("Product '{}' is EXPIRED.", product.name());
    } else {
        println!("Product '{}' is NOT expired.", product.name());
    }
    Ok(())
}

async fn all_sales_flow<P: ProductStore, S: SalesStore>(
    manager: &StoreManager<P, S>,
) -> Result<(), ManagerError> {
    let sales = manager.all_sales().await?;
    if sales.is_empty() {
        println!("No sales records found.");
        return Ok(());
    }

    println!("\n--- Sales Records ---");
    for sale in &sales {
        display_sale(sale);
    }
    Ok(())
}

async fn sales_by_product_flow<P: ProductStore, S: SalesStore>(
    manager: &StoreManager<P, S>,
) -> Result<(), ManagerError> {
    let Some(id) = read_product_id() else {
        return Ok(());
    };
    if manager.product(id).is_none() {
        println!("Product {id} not found.");
        return Ok(());
    }

    let sales = manager.sales_for_product(id).await?;
    if sales.is_empty() {
        println!("No sales records found for product {id}.");
        return Ok(());
    }

    println!("\n--- Sales for Product {id} ---");
    for sale in &sales {
        display_sale(sale);
    }
    Ok(())
}

fn display_product(product: &Product) {
    println!("----------------------------------------");
    println!("Product ID      : {}", product.id());
    println!("Name            : {}", product.name());
    println!("Price           : {:.2}", product.price());
    println!("Stock Quantity  : {}", product.stock_quantity());
    println!("----------------------------------------");
}

fn display_sale(sale: &Sale) {
    let local_time = sale.sold_at().with_timezone(&Local);
    println!("----------------------------------------");
    println!("Sale ID     : {}", sale.id());
    println!("Product ID  : {}", sale.product_id());
    println!("Quantity    : {}", sale.quantity_sold());
    println!("Time        : {}", local_time.format("%Y-%m-%d %I:%M:%S %p"));
    println!("----------------------------------------");
}

/// Read a product id, re-prompting on parse failures. `None` means the user
/// backed out with a blank line (or stdin closed).
fn read_product_id() -> Option<ProductId> {
    loop {
        let input = prompt("Enter product ID: ")?;
        if input.is_empty() {
            return None;
        }
        match input.parse::<ProductId>() {
            Ok(id) => return Some(id),
            Err(_) => println!("Please enter a valid product ID."),
        }
    }
}

/// One trimmed line from stdin; `None` once stdin is closed.
fn prompt(message: &str) -> Option<String> {
    print!("{message}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn read_i64(message: &str, min_value: Option<i64>) -> Option<i64> {
    loop {
        match prompt(message)?.parse::<i64>() {
            Ok(value) => {
                if let Some(min) = min_value {
                    if value < min {
                        println!("Value must be >= {min}");
                        continue;
                    }
                }
                return Some(value);
            }
            Err(_) => println!("Please enter a valid integer."),
        }
    }
}

fn read_price(message: &str) -> Option<f64> {
    loop {
        match prompt(message)?.parse::<f64>() {
            Ok(value) if value > 0.0 => return Some(value),
            Ok(_) => println!("Value must be > 0"),
            Err(_) => println!("Please enter a valid number."),
        }
    }
}

fn read_non_empty(message: &str) -> Option<String> {
    loop {
        let input = prompt(message)?;
        if !input.is_empty() {
            return Some(input);
        }
        println!("Input cannot be empty.");
    }
}
