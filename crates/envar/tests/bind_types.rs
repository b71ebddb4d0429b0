//! Conversion of every built-in element type through every field shape.

#![allow(clippy::pedantic)]

use std::fs::File;
use std::io::{Read, Write};
use std::time::Duration;

use envar::{Bind, BindContext, BoxError, EnvMap, TextDecode};
use url::Url;

fn bind_with<T: Bind>(vars: &[(&str, &str)], target: &mut T) -> BindContext {
    BindContext::new()
        .with_source(vars.iter().copied().collect::<EnvMap>())
        .with_unset_hook(|_| {})
        .bind(target)
        .expect("bind should succeed")
}

// ============================================================================
// Scalars
// ============================================================================

#[derive(Bind, Default, Debug)]
struct Scalars {
    #[tag(env = "STRING")]
    string: String,
    #[tag(env = "STRING")]
    string_opt: Option<String>,

    #[tag(env = "BOOL")]
    boolean: bool,
    #[tag(env = "BOOL")]
    boolean_opt: Option<Box<bool>>,

    #[tag(env = "INT")]
    int: i64,
    #[tag(env = "INT8")]
    int8: i8,
    #[tag(env = "INT16")]
    int16: Option<i16>,
    #[tag(env = "INT32")]
    int32: Box<i32>,
    #[tag(env = "INT64")]
    int64: i64,
    #[tag(env = "ISIZE")]
    isize: isize,

    #[tag(env = "UINT8")]
    uint8: u8,
    #[tag(env = "UINT16")]
    uint16: u16,
    #[tag(env = "UINT32")]
    uint32: Option<u32>,
    #[tag(env = "UINT64")]
    uint64: u64,
    #[tag(env = "USIZE")]
    usize: usize,

    #[tag(env = "FLOAT32")]
    float32: f32,
    #[tag(env = "FLOAT64")]
    float64: Option<f64>,
}

#[test]
fn test_scalars() {
    let mut config = Scalars::default();
    bind_with(
        &[
            ("STRING", "test"),
            ("BOOL", "true"),
            ("INT", "-1"),
            ("INT8", "-128"),
            ("INT16", "16"),
            ("INT32", "32"),
            ("INT64", "9223372036854775807"),
            ("ISIZE", "-7"),
            ("UINT8", "255"),
            ("UINT16", "16"),
            ("UINT32", "32"),
            ("UINT64", "18446744073709551615"),
            ("USIZE", "7"),
            ("FLOAT32", "1.5"),
            ("FLOAT64", "-0.25"),
        ],
        &mut config,
    );

    assert_eq!(config.string, "test");
    assert_eq!(config.string_opt.as_deref(), Some("test"));
    assert!(config.boolean);
    assert_eq!(config.boolean_opt, Some(Box::new(true)));
    assert_eq!(config.int, -1);
    assert_eq!(config.int8, i8::MIN);
    assert_eq!(config.int16, Some(16));
    assert_eq!(*config.int32, 32);
    assert_eq!(config.int64, i64::MAX);
    assert_eq!(config.isize, -7);
    assert_eq!(config.uint8, u8::MAX);
    assert_eq!(config.uint16, 16);
    assert_eq!(config.uint32, Some(32));
    assert_eq!(config.uint64, u64::MAX);
    assert_eq!(config.usize, 7);
    assert_eq!(config.float32, 1.5);
    assert_eq!(config.float64, Some(-0.25));
}

#[test]
fn test_absent_values_leave_fields_untouched() {
    let mut config = Scalars {
        string: "kept".to_string(),
        uint16: 9,
        ..Scalars::default()
    };
    bind_with(&[], &mut config);

    assert_eq!(config.string, "kept");
    assert_eq!(config.string_opt, None);
    assert_eq!(config.uint16, 9);
    assert_eq!(config.boolean_opt, None);
}

#[test]
fn test_empty_value_counts_as_absent() {
    let mut config = Scalars::default();
    bind_with(&[("UINT16", ""), ("STRING", "")], &mut config);

    assert_eq!(config.uint16, 0);
    assert_eq!(config.string_opt, None);
}

// ============================================================================
// Sequences
// ============================================================================

#[derive(Bind, Default, Debug)]
struct Sequences {
    #[tag(env = "STRINGS")]
    strings: Vec<String>,
    #[tag(env = "STRINGS")]
    string_boxes: Vec<Box<String>>,

    #[tag(env = "BOOLS")]
    bools: Vec<bool>,

    #[tag(env = "INTS")]
    ints: Vec<i32>,
    #[tag(env = "INTS")]
    int_boxes: Vec<Box<i32>>,

    #[tag(env = "UINTS")]
    uints: Vec<u8>,

    #[tag(env = "FLOATS")]
    floats: Vec<f64>,
}

#[test]
fn test_sequences() {
    let mut config = Sequences::default();
    bind_with(
        &[
            ("STRINGS", "test1,test2,test3"),
            ("BOOLS", "true,false,true,true,false"),
            ("INTS", "1,2,3,4,5,6"),
            ("UINTS", "0,255"),
            ("FLOATS", "0.5,1"),
        ],
        &mut config,
    );

    assert_eq!(config.strings, vec!["test1", "test2", "test3"]);
    assert_eq!(
        config
            .string_boxes
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>(),
        vec!["test1", "test2", "test3"]
    );
    assert_eq!(config.bools, vec![true, false, true, true, false]);
    assert_eq!(config.ints, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(
        config.int_boxes.iter().map(|b| **b).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5, 6]
    );
    assert_eq!(config.uints, vec![0, 255]);
    assert_eq!(config.floats, vec![0.5, 1.0]);
}

#[test]
fn test_sequence_replaces_previous_contents() {
    let mut config = Sequences {
        ints: vec![9, 9, 9, 9],
        ..Sequences::default()
    };
    bind_with(&[("INTS", "1")], &mut config);
    assert_eq!(config.ints, vec![1]);
}

#[test]
fn test_sequence_keeps_empty_parts() {
    let mut config = Sequences::default();
    bind_with(&[("STRINGS", "a,,b")], &mut config);
    assert_eq!(config.strings, vec!["a", "", "b"]);
}

// ============================================================================
// Durations, URLs, files
// ============================================================================

#[derive(Bind, Default, Debug)]
struct Special {
    #[tag(env = "DURATION")]
    duration: Duration,
    #[tag(env = "DURATION")]
    duration_opt: Option<Box<Duration>>,
    #[tag(env = "DURATIONS")]
    durations: Vec<Duration>,

    #[tag(env = "URL")]
    url: Option<Url>,
    #[tag(env = "URLS")]
    urls: Vec<Box<Url>>,

    #[tag(env = "FILE")]
    file: Option<File>,
}

#[test]
fn test_durations() {
    let mut config = Special::default();
    bind_with(
        &[("DURATION", "1m30s"), ("DURATIONS", "1s,250ms,1.5h")],
        &mut config,
    );

    assert_eq!(config.duration, Duration::from_secs(90));
    assert_eq!(config.duration_opt, Some(Box::new(Duration::from_secs(90))));
    assert_eq!(
        config.durations,
        vec![
            Duration::from_secs(1),
            Duration::from_millis(250),
            Duration::from_secs(5_400)
        ]
    );
}

#[test]
fn test_urls() {
    let mut config = Special::default();
    bind_with(
        &[
            ("URL", "https://envartest.com/path?q=1"),
            ("URLS", "https://a.example,postgres://db.example:5432/app"),
        ],
        &mut config,
    );

    let url = config.url.expect("url should be bound");
    assert_eq!(url.host_str(), Some("envartest.com"));
    assert_eq!(url.path(), "/path");

    let hosts: Vec<_> = config
        .urls
        .iter()
        .map(|u| u.host_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(hosts, vec!["a.example", "db.example"]);
    assert_eq!(config.urls[1].port(), Some(5432));
}

#[test]
fn test_relative_url() {
    let mut config = Special::default();
    bind_with(&[("URL", "/api/v1?x=1")], &mut config);

    let url = config.url.expect("relative url should be bound");
    assert!(envar::is_relative_url(&url));
    assert_eq!(url.path(), "/api/v1");
    assert_eq!(url.query(), Some("x=1"));
}

#[test]
fn test_file_is_opened() {
    let mut temp = tempfile::NamedTempFile::new().unwrap();
    write!(temp, "secret contents").unwrap();
    let path = temp.path().to_str().unwrap().to_string();

    let mut config = Special::default();
    bind_with(&[("FILE", path.as_str())], &mut config);

    let mut contents = String::new();
    config
        .file
        .as_mut()
        .expect("file should be opened")
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, "secret contents");
}

#[test]
fn test_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let dir_path = dir.path().to_str().unwrap().to_string();

    let err = BindContext::new()
        .with_source(EnvMap::new().with("FILE", dir_path))
        .bind(&mut Special::default())
        .unwrap_err();
    assert!(err.to_string().contains("is a directory"), "{err}");

    let err = BindContext::new()
        .with_source(EnvMap::new().with("FILE", "/no/such/envar/file"))
        .bind(&mut Special::default())
        .unwrap_err();
    assert!(err.to_string().contains("does not exist"), "{err}");
}

// ============================================================================
// Text decoding
// ============================================================================

#[derive(Default, Debug, PartialEq)]
struct Celsius(i32);

impl TextDecode for Celsius {
    fn decode_text(&mut self, text: &[u8]) -> Result<(), BoxError> {
        let text = std::str::from_utf8(text)?;
        self.0 = text.trim_end_matches('C').parse()?;
        Ok(())
    }
}

envar::text_decodable!(Celsius);

#[derive(Bind, Default, Debug)]
struct Climate {
    #[tag(env = "TEMP")]
    temp: Celsius,
    #[tag(env = "TEMP")]
    temp_opt: Option<Celsius>,
    #[tag(env = "TEMPS")]
    temps: Vec<Box<Celsius>>,
}

#[test]
fn test_text_decoders() {
    let mut config = Climate::default();
    bind_with(&[("TEMP", "21C"), ("TEMPS", "1C,-2C,3")], &mut config);

    assert_eq!(config.temp, Celsius(21));
    assert_eq!(config.temp_opt, Some(Celsius(21)));
    assert_eq!(
        config.temps.into_iter().map(|b| *b).collect::<Vec<_>>(),
        vec![Celsius(1), Celsius(-2), Celsius(3)]
    );
}

#[test]
fn test_text_decoder_error_is_parse_error() {
    let err = BindContext::new()
        .with_source(EnvMap::new().with("TEMP", "warm"))
        .bind(&mut Climate::default())
        .unwrap_err();

    assert!(
        err.to_string()
            .starts_with("parse error on field \"temp\" of type \"Celsius\": "),
        "{err}"
    );
}
