//! Fuzz target for user regex tests.
//!
//! Compiling an arbitrary pattern may fail but must not panic, and a
//! compiled pattern must match any value without panicking.

#![no_main]

use arbitrary::Arbitrary;
use csvprof::predicate::RegexTest;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    pattern: &'a str,
    value: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    if input.pattern.len() > 500 || input.value.len() > 1_000 {
        return;
    }

    if let Ok(test) = RegexTest::compile("regex_fuzz", input.pattern) {
        let _ = test.is_match(input.value);
    }
});
