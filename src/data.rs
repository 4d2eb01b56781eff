//! Fixed reference dataset used by every seeding run.

use rust_decimal::Decimal;

/// A catalog entry before the store assigns it a product id.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub price: Decimal,
    pub stock: i32,
}

/// An account the seeder wants to exist in the identity provider.
#[derive(Debug, Clone)]
pub struct DesiredAccount {
    pub username: &'static str,
    pub email: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub password: &'static str,
}

fn price(units: i64, cents: i64) -> Decimal {
    Decimal::new(units * 100 + cents, 2)
}

/// The full reference catalog. `CatalogSeeder` replaces the store
/// contents with exactly this set on every run.
pub fn reference_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            name: "iPhone 15 Pro",
            description: "Apple iPhone 15 Pro with A17 Pro chip, 256GB storage, and titanium design.",
            price: price(999, 99),
            stock: 50,
        },
        CatalogEntry {
            name: "Samsung Galaxy S24 Ultra",
            description: "Samsung flagship phone with S Pen, 200MP camera, and Snapdragon 8 Gen 3.",
            price: price(1199, 99),
            stock: 35,
        },
        CatalogEntry {
            name: "MacBook Pro 14\"",
            description: "Apple MacBook Pro with M3 Pro chip, 18GB RAM, and 512GB SSD.",
            price: price(1999, 99),
            stock: 25,
        },
        CatalogEntry {
            name: "Dell XPS 15",
            description: "Premium Windows laptop with Intel Core i7, 16GB RAM, and OLED display.",
            price: price(1499, 99),
            stock: 40,
        },
        CatalogEntry {
            name: "Sony WH-1000XM5",
            description: "Premium wireless noise-cancelling headphones with 30-hour battery life.",
            price: price(349, 99),
            stock: 100,
        },
        CatalogEntry {
            name: "AirPods Pro 2",
            description: "Apple wireless earbuds with active noise cancellation and spatial audio.",
            price: price(249, 99),
            stock: 150,
        },
        CatalogEntry {
            name: "iPad Pro 12.9\"",
            description: "Apple iPad Pro with M2 chip, Liquid Retina XDR display, and 256GB storage.",
            price: price(1099, 99),
            stock: 30,
        },
        CatalogEntry {
            name: "PlayStation 5",
            description: "Sony PlayStation 5 console with DualSense controller and 825GB SSD.",
            price: price(499, 99),
            stock: 20,
        },
        CatalogEntry {
            name: "Nintendo Switch OLED",
            description: "Nintendo Switch with 7\" OLED screen and enhanced audio.",
            price: price(349, 99),
            stock: 60,
        },
        CatalogEntry {
            name: "Logitech MX Master 3S",
            description: "Premium wireless mouse with MagSpeed scrolling and ergonomic design.",
            price: price(99, 99),
            stock: 200,
        },
        CatalogEntry {
            name: "Mechanical Keyboard Pro",
            description: "RGB mechanical keyboard with Cherry MX switches and aluminum frame.",
            price: price(149, 99),
            stock: 80,
        },
        CatalogEntry {
            name: "Apple Watch Series 9",
            description: "Apple Watch with S9 chip, always-on display, and advanced health features.",
            price: price(399, 99),
            stock: 70,
        },
    ]
}

/// Demo accounts provisioned on every full run. Provisioning is
/// idempotent on username, so re-running never duplicates them.
pub fn desired_accounts() -> Vec<DesiredAccount> {
    vec![
        DesiredAccount {
            username: "john_doe",
            email: "john.doe@example.com",
            first_name: "John",
            last_name: "Doe",
            password: "password123",
        },
        DesiredAccount {
            username: "jane_smith",
            email: "jane.smith@example.com",
            first_name: "Jane",
            last_name: "Smith",
            password: "password123",
        },
        DesiredAccount {
            username: "bob_wilson",
            email: "bob.wilson@example.com",
            first_name: "Bob",
            last_name: "Wilson",
            password: "password123",
        },
        DesiredAccount {
            username: "alice_jones",
            email: "alice.jones@example.com",
            first_name: "Alice",
            last_name: "Jones",
            password: "password123",
        },
        DesiredAccount {
            username: "charlie_brown",
            email: "charlie.brown@example.com",
            first_name: "Charlie",
            last_name: "Brown",
            password: "password123",
        },
    ]
}
