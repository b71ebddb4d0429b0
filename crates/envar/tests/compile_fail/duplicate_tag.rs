use envar::Bind;

#[derive(Bind, Default)]
struct Config {
    #[tag(env = "A", env = "B")]
    value: String,
}

fn main() {}
