//! # Seed Binary
//!
//! Fills an empty database with demo warehouses, products and accounts.
//!
//! ```text
//! cargo run -p kasir-service --bin seed -- --db data/demo.db
//! ```
//!
//! Accounts created: `admin` / `admin123` (unless a bootstrap admin is
//! configured) and `kasir1` / `kasir123` scoped to "Toko Depan".

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use kasir_core::{Money, NewProduct, NewUser, Role, WarehouseInput};
use kasir_db::Database;
use kasir_service::{init_tracing, Kasir, KasirConfig, Passwords};

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Seed a Kasir database with demo data")]
struct Args {
    /// Config file path
    #[arg(long, env = "KASIR_CONFIG")]
    config: Option<PathBuf>,

    /// Database file (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,
}

const DEMO_PRODUCTS: &[(&str, i64, i64, i64)] = &[
    ("Beras Pandan Wangi 5kg", 62_000, 71_500, 40),
    ("Minyak Goreng 2L", 31_000, 36_000, 60),
    ("Gula Pasir 1kg", 14_500, 17_000, 80),
    ("Telur Ayam 1kg", 25_000, 29_000, 30),
    ("Indomie Goreng", 2_700, 3_500, 200),
    ("Kopi Kapal Api 165g", 13_000, 15_500, 45),
    ("Teh Celup Sariwangi", 5_200, 6_500, 70),
    ("Sabun Lifebuoy", 3_400, 4_500, 90),
    ("Air Mineral 600ml", 2_100, 3_000, 150),
    ("Susu Kental Manis", 10_500, 12_500, 55),
    ("Kecap Manis 520ml", 19_000, 23_000, 35),
    ("Garam Dapur 500g", 3_000, 4_000, 65),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = KasirConfig::load(args.config).context("loading configuration")?;
    if let Some(db) = args.db {
        config.database.path = db;
    }
    init_tracing(&config.logging.level);

    let db = Database::new(config.db_config())
        .await
        .context("opening database")?;
    let kasir = Kasir::new(db, config.offset()?, Arc::new(Passwords::new()?));

    if kasir.db().products().count(None, None).await? > 0 {
        info!("Database already has products, nothing to seed");
        return Ok(());
    }

    let username = config
        .bootstrap
        .admin_username
        .clone()
        .unwrap_or_else(|| "admin".to_string());
    let password = config
        .bootstrap
        .admin_password
        .clone()
        .unwrap_or_else(|| "admin123".to_string());
    kasir.auth().ensure_bootstrap_admin(&username, &password).await?;
    let admin = kasir
        .auth()
        .authenticate(&username, &password)
        .await
        .context("the existing admin does not match the bootstrap credentials")?;

    let front = kasir
        .warehouses()
        .create(
            &admin,
            WarehouseInput {
                name: "Toko Depan".to_string(),
                address: "Jl. Pasar Baru No. 12".to_string(),
            },
        )
        .await?;
    let back = kasir
        .warehouses()
        .create(
            &admin,
            WarehouseInput {
                name: "Gudang Belakang".to_string(),
                address: "Jl. Pasar Baru No. 12A".to_string(),
            },
        )
        .await?;

    for (index, &(name, purchase, selling, stock)) in DEMO_PRODUCTS.iter().enumerate() {
        let warehouse_id = if index % 3 == 2 { back.id } else { front.id };
        kasir
            .products()
            .create(
                &admin,
                NewProduct {
                    name: name.to_string(),
                    purchase_price: Money::from_rupiah(purchase),
                    selling_price: Money::from_rupiah(selling),
                    stock,
                    warehouse_id,
                },
            )
            .await?;
    }

    kasir
        .users()
        .register(
            &admin,
            NewUser {
                username: "kasir1".to_string(),
                password: "kasir123".to_string(),
                role: Role::Staff,
                warehouse_id: Some(front.id),
            },
        )
        .await?;

    info!(
        warehouses = 2,
        products = DEMO_PRODUCTS.len(),
        "Demo data seeded"
    );
    println!("Seeded {} products into {}", DEMO_PRODUCTS.len(), config.database.path.display());
    Ok(())
}
