//! Password hashing utility for Storeflow
//!
//! Generates bcrypt hashes for seeding accounts manually without exposing
//! plaintext passwords in SQL history.
//!
//! Usage:
//!   cargo run --bin hash-password
//!   cargo run --bin hash-password "MySecurePassword"
//!
//! The work factor follows BCRYPT_COST when set, otherwise the default.

use std::env;
use std::io::{self, Write};

use storeflow_api::auth::PasswordHasher;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let password = if let Some(pwd) = env::args().nth(1) {
        pwd
    } else {
        // Read from stdin so the password doesn't show in the process list
        print!("Enter password to hash: ");
        io::stdout().flush()?;

        let mut password = String::new();
        io::stdin().read_line(&mut password)?;
        password.trim().to_string()
    };

    if password.is_empty() {
        eprintln!("Error: Password cannot be empty");
        std::process::exit(1);
    }

    let cost = env::var("BCRYPT_COST")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(12);

    let hash = PasswordHasher::new(cost).hash(&password)?;

    println!("{hash}");
    println!();
    println!("Example SQL:");
    println!("UPDATE users SET password_hash = '{hash}' WHERE email = 'admin@example.com';");

    Ok(())
}
