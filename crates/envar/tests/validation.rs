//! Validator behavior: ordering, soft errors, custom validators.

#![allow(clippy::pedantic)]

use std::sync::{Arc, Mutex};

use envar::{Bind, BindContext, EnvMap, Error, ValidatorMap};

fn context(vars: &[(&str, &str)]) -> BindContext {
    BindContext::new()
        .with_source(vars.iter().copied().collect::<EnvMap>())
        .with_unset_hook(|_| {})
}

#[derive(Bind, Default, Debug)]
struct Required {
    #[tag(env = "HOST,validate=required")]
    host: String,

    #[tag(env = "PORT,default=8080,validate=required")]
    port: u16,

    #[tag(env = "TOKEN,validate=not_empty")]
    token: Option<String>,

    #[tag(env = "MODE,default=fast,validate=not_empty")]
    mode: String,
}

#[test]
fn test_missing_keys_are_collected() {
    let mut config = Required::default();
    let ctx = context(&[]).bind(&mut config).unwrap();

    let errors = ctx.errors();
    assert_eq!(errors.get("host").unwrap(), ["env key: HOST not found"]);
    assert_eq!(errors.get("port").unwrap(), ["env key: PORT not found"]);
    assert_eq!(errors.get("token").unwrap(), ["env key: TOKEN value is empty"]);
    assert_eq!(errors.get("mode").unwrap(), ["env key: MODE value is empty"]);

    // Defaults still apply after a failed validator.
    assert_eq!(config.port, 8080);
    assert_eq!(config.mode, "fast");
}

#[test]
fn test_present_but_empty() {
    let mut config = Required::default();
    let ctx = context(&[("HOST", ""), ("PORT", ""), ("TOKEN", ""), ("MODE", "")])
        .bind(&mut config)
        .unwrap();

    let errors = ctx.errors();
    assert!(!errors.has_errors("host"));
    assert!(!errors.has_errors("port"));
    assert!(errors.has_errors("token"));
    assert!(errors.has_errors("mode"));
    assert_eq!(config.port, 8080);
}

#[test]
fn test_all_satisfied() {
    let mut config = Required::default();
    let ctx = context(&[
        ("HOST", "localhost"),
        ("PORT", "1"),
        ("TOKEN", "t"),
        ("MODE", "slow"),
    ])
    .bind(&mut config)
    .unwrap();

    assert!(ctx.errors().is_empty());
    assert!(ctx.errors().clone().into_result().is_ok());
    assert_eq!(config.token.as_deref(), Some("t"));
}

#[test]
fn test_into_result_promotes_to_error() {
    let mut config = Required::default();
    let ctx = context(&[("HOST", "h"), ("TOKEN", "t")])
        .bind(&mut config)
        .unwrap();

    let err = ctx.errors().clone().into_result().unwrap_err();
    let Error::Validation { errors } = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].field, "mode");
    assert_eq!(errors[1].field, "port");
    assert_eq!(err.to_string(), "2 validation error(s) occurred");
}

#[test]
fn test_unknown_validator_is_hard_error() {
    #[derive(Bind, Default)]
    struct Bad {
        #[tag(env = "X,validate=required|nonexistent")]
        x: String,
    }

    let err = context(&[("X", "1")]).bind(&mut Bad::default()).unwrap_err();
    assert!(matches!(err, Error::UnknownValidator { .. }));
    assert_eq!(err.to_string(), "validator func: nonexistent not found");
}

#[test]
fn test_validators_run_before_conversion() {
    #[derive(Bind, Default)]
    struct Port {
        #[tag(env = "PORT,validate=record")]
        port: u16,
    }

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);

    let err = context(&[("PORT", "not-a-number")])
        .with_validator("record", move |r| {
            recorder.lock().unwrap().push(r.value.to_string());
            Ok(())
        })
        .bind(&mut Port::default())
        .unwrap_err();

    assert!(matches!(err, Error::Parse { .. }));
    assert_eq!(*seen.lock().unwrap(), vec!["not-a-number".to_string()]);
}

#[test]
fn test_validators_see_empty_values() {
    #[derive(Bind, Default)]
    struct Empty {
        #[tag(env = "E,validate=record")]
        e: String,
    }

    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);

    context(&[])
        .with_validator("record", move |r| {
            assert!(!r.found);
            assert_eq!(r.value, "");
            *counter.lock().unwrap() += 1;
            Ok(())
        })
        .bind(&mut Empty::default())
        .unwrap();

    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn test_custom_validator_messages_accumulate_in_order() {
    #[derive(Bind, Default)]
    struct Even {
        #[tag(env = "N,validate=even|small")]
        n: u32,
    }

    let ctx = context(&[("N", "1001")])
        .with_validator("even", |r| match r.value.parse::<u32>() {
            Ok(n) if n % 2 == 0 => Ok(()),
            _ => Err(format!("{} must be even", r.key)),
        })
        .with_validator("small", |r| {
            if r.value.len() < 4 {
                Ok(())
            } else {
                Err(format!("{} must be small", r.key))
            }
        })
        .bind(&mut Even::default())
        .unwrap();

    assert_eq!(
        ctx.errors().get("n").unwrap(),
        ["N must be even", "N must be small"]
    );
}

#[test]
fn test_replacing_validator_registry() {
    #[derive(Bind, Default)]
    struct Host {
        #[tag(env = "HOST,validate=required")]
        host: String,
    }

    let err = context(&[])
        .with_validators(ValidatorMap::new())
        .bind(&mut Host::default())
        .unwrap_err();
    assert!(matches!(err, Error::UnknownValidator { .. }));
}

#[test]
fn test_errors_reset_between_binds() {
    let ctx = context(&[]).bind(&mut Required::default()).unwrap();
    assert!(!ctx.errors().is_empty());

    let ctx = ctx
        .with_source(
            EnvMap::new()
                .with("HOST", "h")
                .with("PORT", "1")
                .with("TOKEN", "t")
                .with("MODE", "m"),
        )
        .bind(&mut Required::default())
        .unwrap();
    assert!(ctx.errors().is_empty());
}
