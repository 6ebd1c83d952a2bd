use anyhow::{bail, Context, Result};
use device_registry::auth::make_jwt;
use std::env;

/// Print a bearer token for a user id, for calling the API locally.
fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let user_id = env::args().nth(1).unwrap_or_default();
    if user_id.trim().is_empty() {
        bail!("usage: mint_token <user-id>");
    }

    let secret = dotenvy::var("JWT_SECRET").context("JWT_SECRET must be set")?;
    println!("{}", make_jwt(user_id.trim(), &secret)?);
    Ok(())
}
