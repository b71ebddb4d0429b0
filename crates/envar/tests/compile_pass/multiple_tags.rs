use envar::Bind;

#[derive(Bind, Default)]
struct Config {
    #[tag(env = "PORT", file = "port")]
    #[tag(r#type = "int")]
    port: u16,

    #[tag(env = "NAME")]
    r#type: String,
}

fn main() {
    let mut config = Config::default();
    let _ = envar::BindContext::new()
        .with_tag_name("file")
        .bind(&mut config);
}
