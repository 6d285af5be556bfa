//! # Seed Data Generator
//!
//! Populates a development database with a branch's stock, staff, an open
//! shift ledger and one sale ready for scanning.
//!
//! ## Usage
//! ```bash
//! # Seed ./market_dev.db for a freshly generated branch
//! cargo run -p market-db --bin seed
//!
//! # Specify database path and branch
//! cargo run -p market-db --bin seed -- --db ./data/market.db --branch 6a1d5e2c-0f3b-4e61-9a7c-3d2b1f0e9c11
//! ```
//!
//! ## Generated Data
//! - 3 employees (admin, manager, cashier), password `1234`
//! - Stock for every product in [`PRODUCTS`] in the chosen branch
//! - One shift transaction with zero tenders
//! - One in-process sale for that shift

use std::env;

use market_core::requests::{CreateEmployee, CreateRemainder, CreateSale, CreateTransaction};
use market_core::validation::validate_uuid;
use market_core::{Money, SaleStatus, Tenders, UserType};
use market_db::migrations::migration_status;
use market_db::{Database, DbConfig};
use uuid::Uuid;

/// (barcode, name, price in tiyin, quantity)
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("4780000000011", "Coca-Cola 1L", 1_200_000, 48),
    ("4780000000028", "Pepsi 1.5L", 1_400_000, 36),
    ("4780000000035", "Nestle Water 0.5L", 350_000, 120),
    ("4780000000042", "Non (bread)", 400_000, 60),
    ("4780000000059", "Milk 2.5% 1L", 1_100_000, 24),
    ("4780000000066", "Kefir 1L", 1_000_000, 18),
    ("4780000000073", "Rice Devzira 1kg", 2_800_000, 40),
    ("4780000000080", "Sugar 1kg", 1_300_000, 55),
    ("4780000000097", "Sunflower Oil 1L", 2_100_000, 30),
    ("4780000000103", "Green Tea 100g", 900_000, 25),
    ("4780000000110", "Chocolate Bar", 800_000, 70),
    ("4780000000127", "Eggs (10)", 1_600_000, 20),
];

const STAFF: &[(&str, &str, &str, &str, UserType)] = &[
    ("Aziz", "Karimov", "+998901000001", "admin", UserType::Admin),
    ("Dilnoza", "Rahimova", "+998901000002", "manager", UserType::Manager),
    ("Sardor", "Aliyev", "+998901000003", "cashier", UserType::Cashier),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./market_dev.db");
    let mut branch_id = Uuid::new_v4().to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--branch" | "-b" => {
                if i + 1 < args.len() {
                    branch_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Market POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: ./market_dev.db)");
                println!("  -b, --branch <UUID>   Branch to stock (default: random)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    validate_uuid("branch", &branch_id)?;

    println!("🌱 Market POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Branch:   {}", branch_id);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let (total, applied) = migration_status(db.pool()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied ({}/{})", applied, total);

    let existing = db.employees().get_list(&Default::default()).await?;
    if existing.count > 0 {
        println!("⚠ Database already has {} employees", existing.count);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let sale_point_id = Uuid::new_v4().to_string();
    let shift_id = Uuid::new_v4().to_string();

    println!();
    println!("Creating employees...");
    let mut cashier_id = String::new();
    for (first_name, last_name, phone, login, user_type) in STAFF {
        let employee = db
            .employees()
            .create(&CreateEmployee {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                phone: phone.to_string(),
                login: login.to_string(),
                password: "1234".to_string(),
                branch_id: Some(branch_id.clone()),
                salepoint_id: Some(sale_point_id.clone()),
                user_type: *user_type,
            })
            .await?;
        println!("  {} ({}) {}", employee.full_name(), login, employee.id);
        if *user_type == UserType::Cashier {
            cashier_id = employee.id;
        }
    }

    println!();
    println!("Stocking branch...");
    for (barcode, name, price, quantity) in PRODUCTS {
        let remainder = CreateRemainder {
            branch_id: branch_id.clone(),
            category_id: None,
            product_name: name.to_string(),
            barcode: barcode.to_string(),
            price_income: Money::from_minor(*price),
            quantity: *quantity,
        };
        if let Err(e) = db.remainders().create(&remainder).await {
            eprintln!("Failed to insert {}: {}", barcode, e);
            continue;
        }
    }
    println!("  {} products", PRODUCTS.len());

    let ledger = db
        .transactions()
        .create(&CreateTransaction {
            shift_id: shift_id.clone(),
            tenders: Tenders::default(),
        })
        .await?;

    let sale = db
        .sales()
        .create(&CreateSale {
            branch_id: branch_id.clone(),
            sale_point_id,
            shift_id: shift_id.clone(),
            employee_id: cashier_id,
            barcode: "R-000001".to_string(),
            status: SaleStatus::InProcess,
        })
        .await?;

    println!();
    println!("✓ Shift {} ledger {}", shift_id, ledger.id);
    println!("✓ Open sale {}", sale.id);
    println!();
    println!("Try:");
    println!(
        "  curl -X POST 'http://localhost:8080/v1/scan-barcode?sale_id={}&branch_id={}&barcode={}'",
        sale.id, branch_id, PRODUCTS[0].0
    );
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
