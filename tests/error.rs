//! Tests for error module

use std::path::Path;

use falsetrips::error::{FalseTripError, OptionExt};

#[test]
fn test_error_display() {
    let err = FalseTripError::io(
        "reading trip",
        Path::new("/data/1/2.csv"),
        std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    );
    let text = err.to_string();
    assert!(text.contains("reading trip"));
    assert!(text.contains("/data/1/2.csv"));
    assert!(text.contains("gone"));

    let err = FalseTripError::malformed("1\tx", "weight is not an integer");
    assert!(err.to_string().contains("weight is not an integer"));
}

#[test]
fn test_error_source() {
    use std::error::Error;

    let err = FalseTripError::io(
        "listing input root",
        Path::new("/data"),
        std::io::Error::other("denied"),
    );
    assert!(err.source().is_some());
    assert!(FalseTripError::invalid_config("nope").source().is_none());
}

#[test]
fn test_option_ext() {
    let none: Option<i32> = None;
    let result = none.ok_or_malformed("line", "missing field");
    assert!(matches!(
        result,
        Err(FalseTripError::MalformedRecord { .. })
    ));

    assert_eq!(Some(4).ok_or_malformed("line", "missing field").unwrap(), 4);
}
