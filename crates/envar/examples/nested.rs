//! Example: nested structs, sequences of structs and prefixes
//!
//!   `APP_DB_HOST=db.internal APP_WORKER_THREADS=8 cargo run --package envar --example nested`

use std::time::Duration;

use envar::{Bind, BindContext};

#[derive(Bind, Default, Debug)]
struct Database {
    #[tag(env = "DB_HOST,default=localhost")]
    host: String,

    #[tag(env = "DB_PORT,default=5432")]
    port: u16,

    #[tag(env = "DB_TIMEOUT,default=5s")]
    timeout: Duration,
}

#[derive(Bind, Default, Debug)]
struct Worker {
    #[tag(env = "WORKER_THREADS,default=2")]
    threads: usize,
}

#[derive(Bind, Default, Debug)]
struct Logging {
    #[tag(env = "LOG_LEVEL,default=info")]
    level: String,
}

#[derive(Bind, Default, Debug)]
struct Config {
    #[tag(env = "NAME,default=nested-example")]
    name: String,

    #[tag(env = ",nested")]
    database: Database,

    #[tag(env = ",nested")]
    replica: Option<Box<Database>>,

    #[tag(env = ",nested")]
    workers: Vec<Worker>,

    #[tag(embed)]
    logging: Logging,
}

fn main() -> envar::Result<()> {
    let mut config = Config {
        workers: vec![Worker::default(), Worker::default()],
        ..Config::default()
    };

    let ctx = BindContext::new()
        .with_prefix("APP")
        .with_unset_hook(|_| {})
        .bind(&mut config)?;

    ctx.errors().clone().into_result()?;

    println!("{config:#?}");
    Ok(())
}
