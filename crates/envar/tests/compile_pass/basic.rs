use envar::Bind;

#[derive(Bind, Default)]
struct Config {
    #[tag(env = "PORT,default=8080")]
    port: u16,

    #[tag(env = "HOST,validate=required")]
    host: String,
}

fn main() {
    let mut config = Config::default();
    let _ = envar::bind(&mut config);
}
