//! Example: binding a flat config and reporting validation failures
//!
//! Run with missing vars to see every failure at once:
//!   cargo run --package envar --example basic
//!
//! Run with required vars set:
//!   `DATABASE_URL=postgres://localhost SECRET=xyz cargo run --package envar --example basic`

use envar::miette;
use envar::{Bind, url::Url};

#[derive(Bind, Default)]
struct Config {
    #[tag(env = "DATABASE_URL,validate=required")]
    db_url: Option<Url>,

    #[tag(env = "PORT,default=8080")]
    port: u16,

    #[tag(env = "DEBUG,default=false")]
    debug: bool,

    #[tag(env = "API_KEY")]
    api_key: Option<String>,

    #[tag(env = "ALLOWED_ORIGINS,default=localhost|127.0.0.1")]
    allowed_origins: Vec<String>,

    #[tag(env = "SECRET,validate=required|not_empty,unset")]
    secret: String,
}

fn main() -> miette::Result<()> {
    let mut config = Config::default();

    // Hard errors (bad annotations, unparseable values) surface here.
    let ctx = envar::bind(&mut config)?;

    // Validation failures are soft; promote them to render every one.
    ctx.errors().clone().into_result()?;

    let Some(db_url) = config.db_url else {
        return Err(miette::miette!("DATABASE_URL is required"));
    };

    println!("Successfully loaded config!");
    println!("  DATABASE_URL    = {db_url}");
    println!("  PORT            = {} (default: 8080)", config.port);
    println!("  DEBUG           = {} (default: false)", config.debug);
    println!("  API_KEY         = {:?}", config.api_key);
    println!("  ALLOWED_ORIGINS = {:?}", config.allowed_origins);
    println!("  SECRET          = <{} bytes>", config.secret.len());
    println!(
        "  SECRET in env?  = {}",
        std::env::var_os("SECRET").is_some()
    );

    Ok(())
}
