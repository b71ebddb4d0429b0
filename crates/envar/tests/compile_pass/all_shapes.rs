use std::time::Duration;

use envar::Bind;

#[derive(Bind, Default)]
struct Inner {
    #[tag(env = "INNER")]
    value: Option<u8>,
}

#[derive(Bind, Default)]
struct Shapes {
    #[tag(env = "A")]
    plain: u32,
    #[tag(env = "B")]
    boxed: Box<u32>,
    #[tag(env = "C")]
    optional: Option<String>,
    #[tag(env = "D")]
    optional_boxed: Option<Box<Duration>>,
    #[tag(env = "E")]
    sequence: Vec<envar::url::Url>,
    #[tag(env = "F")]
    boxed_sequence: Vec<Box<f64>>,

    #[tag(env = ",nested")]
    nested: Inner,
    #[tag(env = ",nested")]
    nested_boxed: Box<Inner>,
    #[tag(env = ",nested")]
    nested_optional: std::option::Option<Inner>,
    #[tag(env = ",nested")]
    nested_sequence: Vec<Box<Inner>>,

    #[tag(embed)]
    embedded: Inner,

    #[tag(skip)]
    skipped: std::sync::Mutex<()>,

    untagged: std::collections::HashMap<String, String>,
}

fn main() {
    let mut shapes = Shapes::default();
    let _ = envar::BindContext::new()
        .with_source(envar::EnvMap::new())
        .bind(&mut shapes);
}
