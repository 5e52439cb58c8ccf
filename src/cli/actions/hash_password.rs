//! Generate a `salt:digest` hash for seeding or rotating admin passwords.

use crate::api::handlers::auth::password::{generate_salt, hash_password};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub password: String,
}

/// Print a freshly salted hash plus a ready-to-run SQL statement.
///
/// # Errors
/// Returns an error if the system RNG fails to produce a salt.
pub fn handle(args: &Args) -> Result<()> {
    let salt = generate_salt()?;
    let digest = hash_password(&args.password, &salt);
    let stored = format!("{salt}:{digest}");

    println!("\n=== Password Hash Generated ===\n");
    println!("Hash: {stored}");
    println!("\n=== SQL Update Statement ===\n");
    println!("UPDATE admin_accounts SET password_hash = '{stored}' WHERE email = '<admin email>';");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_succeeds() {
        let args = Args {
            password: "secret1".to_string(),
        };
        assert!(handle(&args).is_ok());
    }
}
