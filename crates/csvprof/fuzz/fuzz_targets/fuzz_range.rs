//! Fuzz target for range literals and range tests.
//!
//! Parsing any literal and testing any value against a parsed range must
//! never panic.

#![no_main]

use arbitrary::Arbitrary;
use csvprof::predicate::RangeTest;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    bounds: &'a str,
    value: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    if input.bounds.len() > 200 || input.value.len() > 200 {
        return;
    }

    let _ = RangeTest::parse(input.bounds);
    if let Ok(range) = RangeTest::parse(&format!("range({})", input.bounds)) {
        let _ = range.test(input.value);
    }
});
