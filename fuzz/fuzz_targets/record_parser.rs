#![no_main]

use dtruss_stream::parse_syscall;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Helper lines are read lossily, so every byte string is a possible line
    let line = String::from_utf8_lossy(data);
    // Must never panic; malformed input is simply no record
    let _ = parse_syscall(line.trim());
});
