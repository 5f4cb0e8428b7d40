//! Fuzz target for whole-file runs.
//!
//! Arbitrary bytes are written as the input file of a small fixed
//! configuration; the run may report bad records but must not panic.

#![no_main]

use std::fs;

use csvprof::{Profiler, RunConfig};
use libfuzzer_sys::fuzz_target;

const PARAMS: &str = "\
csvp_options,id,amount,when,code
Column Test,int,float,range(d19000101:d20991231),Alpha
Column Length,,,,3
Max Length,,10,,
Profile (y/n/p/u/s),u,s,p,n
Blank is Error (y/n),y,n,n,y
Strip Surrounding Spaces (y/n),y,y,n,n
Error Output Limit,,,,
Error Output Limit - Length Errors,,,,
Error Output Limit - Blank Errors,,,,
User Data,,,,
";

const CONFIG: &str = r#"
[files]
csv_file = "data.csv"
param_file = "params.csv"
error_csv_file = "errors.csv"
error_log_file = "errors.log"

[output]
output_error_csv = true
output_error_log = true
error_limit = 50
"#;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    let Ok(dir) = tempfile::TempDir::new() else {
        return;
    };
    if fs::write(dir.path().join("params.csv"), PARAMS).is_err()
        || fs::write(dir.path().join("data.csv"), data).is_err()
    {
        return;
    }

    if let Ok(config) = RunConfig::from_toml(CONFIG, dir.path()) {
        let _ = Profiler::new(config).run();
    }
});
