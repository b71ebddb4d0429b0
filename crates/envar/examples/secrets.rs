//! Example: binding secrets with `secrecy`
//!
//! `SecretString` is a built-in element when the `secrecy` feature is on.
//! Combined with `unset`, the value is removed from the process environment
//! as soon as it has been read.
//!
//!   `API_TOKEN=hunter2 cargo run --package envar --example secrets --features secrecy`

use envar::{Bind, ExposeSecret, SecretString};

#[derive(Bind, Default)]
struct Credentials {
    #[tag(env = "API_USER,default=service")]
    user: String,

    #[tag(env = "API_TOKEN,validate=required,unset")]
    token: Option<SecretString>,
}

fn main() -> envar::Result<()> {
    let mut creds = Credentials::default();
    let ctx = envar::bind(&mut creds)?;
    ctx.errors().clone().into_result()?;

    let token_len = creds
        .token
        .as_ref()
        .map_or(0, |token| token.expose_secret().len());

    println!("user        = {}", creds.user);
    println!("token       = {:?}", creds.token);
    println!("token bytes = {token_len}");
    println!("still set   = {}", std::env::var_os("API_TOKEN").is_some());

    Ok(())
}
