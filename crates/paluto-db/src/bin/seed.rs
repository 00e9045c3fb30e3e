//! # Seed Data Generator
//!
//! Populates the database with the default Paluto menu for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p paluto-db --bin seed
//!
//! # Specify database path
//! cargo run -p paluto-db --bin seed -- --db ./data/paluto.db
//! ```
//!
//! ## Generated Menu
//! Creates the house menu across categories:
//! - SEAFOOD by weight: fish, shellfish, crab (dead/alive, per luto)
//! - COOKED dishes per serving
//! - RICE and DRINKS per serving
//!
//! Each product has:
//! - Unique UUID v4 id
//! - Taxonomy: category / type / variety / state / luto
//! - Unit of measure: SERVE or KG

use std::env;

use paluto_core::{Product, Uom};
use paluto_db::{Database, DbConfig};
use uuid::Uuid;

/// The house menu: (category, type, variety_1, variety_2, state_1, luto, uom, price)
const MENU: &[(&str, &str, &str, &str, &str, Option<&str>, Uom, f64)] = &[
    // Seafood sold by weight, priced per kilogram
    ("SEAFOOD", "FISH", "MAYA-MAYA", "", "DEAD", Some("SINIGANG"), Uom::Kg, 450.0),
    ("SEAFOOD", "FISH", "MAYA-MAYA", "", "DEAD", Some("INIHAW"), Uom::Kg, 450.0),
    ("SEAFOOD", "FISH", "LAPU-LAPU", "", "ALIVE", Some("STEAMED"), Uom::Kg, 950.0),
    ("SEAFOOD", "FISH", "BANGUS", "", "DEAD", Some("SISIG"), Uom::Kg, 320.0),
    ("SEAFOOD", "FISH", "TILAPIA", "", "ALIVE", Some("INIHAW"), Uom::Kg, 280.0),
    ("SEAFOOD", "SHELL", "TAHONG", "", "", Some("BAKED"), Uom::Kg, 240.0),
    ("SEAFOOD", "SHELL", "HALAAN", "", "", Some("TINOLA"), Uom::Kg, 260.0),
    ("SEAFOOD", "CRAB", "ALIMANGO", "", "ALIVE", Some("CHILI"), Uom::Kg, 850.0),
    ("SEAFOOD", "SHRIMP", "SUAHE", "", "ALIVE", Some("HALABOS"), Uom::Kg, 680.0),
    ("SEAFOOD", "SQUID", "PUSIT", "", "DEAD", Some("ADOBO"), Uom::Kg, 420.0),
    // Cooked dishes per serving
    ("COOKED", "PORK", "SISIG", "", "", None, Uom::Serve, 220.0),
    ("COOKED", "CHICKEN", "INASAL", "PAA", "", None, Uom::Serve, 180.0),
    ("COOKED", "VEGETABLE", "CHOPSUEY", "", "", None, Uom::Serve, 160.0),
    ("COOKED", "SOUP", "SINIGANG NA BABOY", "", "", None, Uom::Serve, 280.0),
    // Sides and drinks
    ("RICE", "RICE", "PLAIN", "", "", None, Uom::Serve, 25.0),
    ("RICE", "RICE", "GARLIC", "", "", None, Uom::Serve, 35.0),
    ("DRINKS", "SODA", "COKE", "1.5L", "", None, Uom::Serve, 110.0),
    ("DRINKS", "SODA", "ROYAL", "1.5L", "", None, Uom::Serve, 110.0),
    ("DRINKS", "JUICE", "BUKO", "", "", None, Uom::Serve, 60.0),
    ("DRINKS", "BEER", "SAN MIGUEL", "PALE PILSEN", "", None, Uom::Serve, 75.0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./paluto_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Paluto POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./paluto_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Paluto POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding menu...");

    let mut seeded = 0;
    for (category, product_type, variety_1, variety_2, state_1, luto, uom, price) in MENU {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            category: category.to_string(),
            product_type: product_type.to_string(),
            variety_1: variety_1.to_string(),
            variety_2: variety_2.to_string(),
            state_1: state_1.to_string(),
            state_2: String::new(),
            luto: luto.map(str::to_string),
            uom: *uom,
            price: *price,
        };

        db.products().insert(&product).await?;
        seeded += 1;
    }

    println!("✓ Seeded {} products", seeded);
    db.close().await;

    Ok(())
}
