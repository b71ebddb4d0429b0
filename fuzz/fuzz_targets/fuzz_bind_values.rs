#![no_main]

use std::time::Duration;

use envar::{Bind, BindContext, EnvMap, url::Url};
use libfuzzer_sys::fuzz_target;

#[derive(Bind, Default)]
struct Target {
    #[tag(env = "FLAG,validate=not_empty")]
    flag: bool,

    #[tag(env = "COUNT")]
    count: Option<i32>,

    #[tag(env = "RATIO")]
    ratio: f64,

    #[tag(env = "TIMEOUT")]
    timeout: Duration,

    #[tag(env = "ENDPOINTS")]
    endpoints: Vec<Url>,

    #[tag(env = "NAMES,default=a|b")]
    names: Vec<Box<String>>,
}

fuzz_target!(|data: &str| {
    // === Feed the same input to every field; binding should never panic ===
    let vars: EnvMap = ["FLAG", "COUNT", "RATIO", "TIMEOUT", "ENDPOINTS", "NAMES"]
        .into_iter()
        .map(|key| (key, data))
        .collect();

    let mut target = Target::default();
    let result = BindContext::new()
        .with_source(vars)
        .with_unset_hook(|_| {})
        .bind(&mut target);

    if let Err(err) = result {
        let _ = err.to_string();
    }
});
