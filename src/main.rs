use anyhow::{Context, Result, anyhow};
use chrono::{Days, NaiveDate};
use clap::{Parser, Subcommand};
use log::info;
use restmax::facade::config::DEFAULT_SNAPSHOT_FILE;
use restmax::{
    Address, ContractType, MenuCategory, MenuItem, Person, Restaurant,
    RestaurantClass, Store, StoreConfig,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "restmax")]
#[command(about = "Inspect and maintain the RestMax extent snapshot")]
struct Cli {
    /// Snapshot file to load from and save to
    #[arg(long, global = true, default_value = DEFAULT_SNAPSHOT_FILE)]
    snapshot: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the snapshot with the demo data set
    Seed,
    /// Print the number of live entities per kind
    Summary,
    /// Print the whole registry as JSON
    Dump,
    /// Turn a seasonal menu item into a fixed one
    Reclassify {
        item: String,
        #[arg(long)]
        signature: bool,
    },
    /// Delete a menu category; its items stay on as uncategorized
    DeleteCategory { name: String },
    /// Print a restaurant's menu by category
    Menu { restaurant: String },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = StoreConfig::new(&cli.snapshot);

    match cli.command {
        Command::Seed => {
            let mut store = Store::new(config);
            seed(&mut store)?;
            store
                .save()
                .with_context(|| format!("Failed to save '{}'", cli.snapshot.display()))?;
            println!("Seeded {} entities", store.extents().total());
            Ok(())
        }
        Command::Summary => {
            let store = open(config)?;
            for (kind, count) in store.counts() {
                println!("{:<18} {}", kind, count);
            }
            Ok(())
        }
        Command::Dump => {
            let store = open(config)?;
            let json = serde_json::to_string_pretty(store.extents())
                .context("Failed to encode registry as JSON")?;
            println!("{}", json);
            Ok(())
        }
        Command::Reclassify { item, signature } => {
            let mut store = open(config)?;
            let seasonal = store
                .find_by_key::<MenuItem>(&item)
                .ok_or_else(|| anyhow!("No menu item named '{}'", item))?;
            let fixed = store.reclassify(seasonal, signature)?;
            store.save()?;
            println!("'{}' is now a fixed item ({})", item, fixed);
            Ok(())
        }
        Command::DeleteCategory { name } => {
            let mut store = open(config)?;
            let category = store
                .find_by_key::<MenuCategory>(&name)
                .ok_or_else(|| anyhow!("No menu category named '{}'", name))?;
            store.delete(category)?;
            store.save()?;
            println!("Deleted category '{}'", name);
            Ok(())
        }
        Command::Menu { restaurant } => {
            let store = open(config)?;
            print_menu(&store, &restaurant)
        }
    }
}

fn open(config: StoreConfig) -> Result<Store> {
    let path = config.snapshot_path.clone();
    let store = Store::open(config)
        .with_context(|| format!("Failed to open snapshot '{}'", path.display()))?;
    if store.is_empty() {
        info!("Registry is empty; run `restmax seed` to create demo data");
    }
    Ok(store)
}

fn print_menu(store: &Store, name: &str) -> Result<()> {
    let id = store
        .find_by_key::<Restaurant>(name)
        .ok_or_else(|| anyhow!("No restaurant named '{}'", name))?;
    let restaurant = store
        .get(id)
        .ok_or_else(|| anyhow!("Restaurant '{}' vanished", name))?;

    println!("{} [{}]", restaurant.name(), restaurant.classes_pretty());
    println!("{}", restaurant.address());
    for (category_name, category) in restaurant.categories() {
        println!("\n{}", category_name);
        for item in store.category_items(*category)? {
            let kind = if item.is_seasonal() { "seasonal" } else { "" };
            println!("  {:<16} {:>7.2} {}", item.name(), item.price(), kind);
        }
    }

    let unassigned = store.unassigned_categories(id)?;
    if !unassigned.is_empty() {
        let names: Vec<_> = unassigned
            .iter()
            .filter_map(|category| store.get(*category))
            .map(|category| category.name())
            .collect();
        println!("\nnot offered: {}", names.join(", "));
    }
    Ok(())
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow!("Invalid date {}-{}-{}", year, month, day))
}

fn seed(store: &mut Store) -> Result<()> {
    use RestaurantClass::{Delivery, DriveThru, OwnBuilding};

    let addresses = [
        Address::new("Koszykowa", "23", "Warsaw", "12-345")?.with_flat_number("113"),
        Address::new("Polna", "12", "Warsaw", "67-890")?,
        Address::new("Spokojna", "666", "Warsaw", "11-222")?,
        Address::new("Księcia Janusza", "56A", "Wroclaw", "32-143")?,
        Address::new("Bonifacego", "11", "Cracow", "05-735")?,
        Address::new("Al. Solidarnosci", "4B", "Gdansk", "51-528")?,
    ];
    let [koszykowa, polna, spokojna, janusza, bonifacego, solidarnosci] = addresses;

    let bistro = store.create_restaurant("Koszykowa Bistro", koszykowa, [Delivery])?;
    let polna = store.create_restaurant("Polna Bistro", polna, [Delivery, OwnBuilding, DriveThru])?;
    store.create_restaurant("Al. Jerozolimskie Bistro", spokojna, [Delivery, OwnBuilding])?;
    store.create_restaurant("Księcia Janusza Bistro", janusza, [OwnBuilding, DriveThru])?;
    store.create_restaurant("Bonifacego Bistro", bonifacego, [OwnBuilding])?;
    store.create_restaurant(
        "Al. Solidarnosci Bistro",
        solidarnosci,
        [Delivery, OwnBuilding, DriveThru],
    )?;
    store.set_max_delivery_distance(bistro, 8)?;
    store.set_max_delivery_distance(polna, 12)?;
    store.set_parking_capacity(polna, 40)?;
    store.set_max_car_height(polna, 2.2)?;

    let mains = store.create_menu_category("mains")?;
    let drinks = store.create_menu_category("Drinks")?;
    let desserts = store.create_menu_category("deSsErts")?;
    store.create_menu_category("Soup")?;
    store.create_menu_category("Coffee")?;

    store.restaurant_add_category(bistro, mains)?;
    store.restaurant_add_category(bistro, drinks)?;
    store.restaurant_add_category(bistro, desserts)?;
    store.category_add_restaurant(drinks, polna)?;
    store.category_add_restaurant(desserts, polna)?;

    let today = restmax::core::validation::today();
    let season_end = today
        .checked_add_days(Days::new(120))
        .ok_or_else(|| anyhow!("Season end out of range"))?;
    let drwal = store.create_seasonal_item("Drwal", 26.0, date(2020, 12, 1)?, season_end, 3)?;
    let princess =
        store.create_seasonal_item("McPrincess", 31.0, date(2010, 6, 1)?, season_end, 1)?;
    store.category_add_item(mains, drwal)?;
    store.category_add_item(mains, princess)?;

    let fixed = [
        (mains, "McChicken", 15.0, date(1970, 4, 20)?, false),
        (mains, "2FU", 10.5, date(2010, 2, 19)?, true),
        (mains, "BicMac", 20.0, date(1970, 11, 20)?, true),
        (mains, "frIes", 9.0, date(1955, 6, 9)?, false),
        (mains, "Salad", 15.0, date(1955, 1, 7)?, false),
        (mains, "CheeseBurger", 7.0, date(1955, 5, 2)?, false),
        (mains, "Burger", 5.0, date(1955, 4, 1)?, false),
        (mains, "Wrap", 12.0, date(1985, 3, 1)?, false),
        (drinks, "Coca Cola", 10.0, date(1970, 5, 17)?, false),
        (drinks, "Sprite", 10.0, date(1955, 3, 1)?, false),
        (drinks, "Fanta", 10.0, date(1955, 4, 1)?, false),
        (drinks, "Coffee", 8.0, date(1955, 1, 1)?, false),
        (drinks, "Water", 5.0, date(1955, 2, 1)?, false),
        (desserts, "Ice Cream", 11.0, date(1970, 1, 1)?, false),
        (desserts, "Apple Pie", 8.0, date(1965, 1, 1)?, false),
        (desserts, "Muffin", 6.0, date(1980, 1, 1)?, false),
    ];
    let mut bicmac = None;
    for (category, name, price, debut, signature) in fixed {
        let item = store.create_fixed_item(name, price, debut, signature)?;
        store.category_add_item(category, item)?;
        if name == "BicMac" {
            bicmac = Some(item);
        }
    }
    let bicmac = bicmac.ok_or_else(|| anyhow!("BicMac was not seeded"))?;
    store.set_popularity_score(bicmac, 9)?;

    let chef = store.create_employee("79100383434", "Anna", "Nowak", "anna@restmax.pl")?;
    let waiter = store.create_employee("55020244514", "Piotr", "Lis", "piotr@restmax.pl")?;
    store.create_contract(chef, bistro, ContractType::Employment, "Head chef", 365)?;
    store.create_contract(chef, polna, ContractType::Contractor, "Menu consulting", 90)?;
    store.create_contract(waiter, polna, ContractType::PartTime, "Weekend shifts", 180)?;

    let marta = store.create_client("marta", "Marta", "Kowalska", "marta@example.com")?;
    store.create_review(marta, "Great Drwal", "Worth the wait every winter")?;
    let giftcard = store.create_giftcard(50.0)?;
    let voucher = store.create_voucher(0.2, drwal)?;
    let combo = store.create_voucher_giftcard(0.1, bicmac, giftcard)?;
    for discount in [giftcard, voucher, combo] {
        store.client_add_discount(marta, discount)?;
    }
    store.client_add_active_discount(marta, voucher)?;

    let client = store
        .get(marta)
        .ok_or_else(|| anyhow!("Seeded client vanished"))?;
    info!(
        "Seeded demo data for {} ({} discounts)",
        client.person().full_name(),
        client.discounts().len()
    );
    Ok(())
}
