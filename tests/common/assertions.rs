//! Custom assertion macros
//!
//! Provides assertion macros with more descriptive failure output.

/// Assert that a result is ok and return the value
#[allow(unused_macros)]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a result is an error, optionally of a given shape
#[allow(unused_macros)]
macro_rules! assert_err {
    ($result:expr) => {
        assert!($result.is_err(), "Expected Err, got Ok");
    };
    ($result:expr, $pattern:pat) => {
        match $result {
            Err($pattern) => {}
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => panic!("Expected different error variant, got: {:?}", e),
        }
    };
}

/// Assert that a list of events contains exactly `$count` events of a kind
#[allow(unused_macros)]
macro_rules! assert_event_count {
    ($events:expr, $pattern:pat, $count:expr) => {
        let found = $events.iter().filter(|e| matches!(e, $pattern)).count();
        assert_eq!(
            found, $count,
            "Expected {} matching events, found {} in {:?}",
            $count, found, $events
        );
    };
}
