use envar::Bind;

#[derive(Bind, Default)]
struct Port(u16);

fn main() {}
