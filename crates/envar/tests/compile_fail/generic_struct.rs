use envar::Bind;

#[derive(Bind, Default)]
struct Wrapper<T> {
    #[tag(env = "VALUE")]
    value: T,
}

fn main() {}
