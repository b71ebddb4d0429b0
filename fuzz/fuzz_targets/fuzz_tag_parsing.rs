#![no_main]

use envar::TagOptions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // === Parsing should never panic ===
    let Ok(options) = TagOptions::parse(data) else {
        return;
    };

    // === The name is everything before the first comma ===
    let expected = data.split(',').next().unwrap_or_default();
    assert_eq!(options.name, expected);

    // === Validator names are never empty ===
    assert!(options.validate.iter().all(|name| !name.is_empty()));

    let _ = format!("{options:?}");
});
