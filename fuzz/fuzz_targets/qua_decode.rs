#![no_main]
use libfuzzer_sys::fuzz_target;
use unquarantine::formats::avira;

fuzz_target!(|data: &[u8]| {
    let mut input = avira::QUA_MAGIC.to_vec();
    input.extend_from_slice(data);
    let _ = avira::extract(&input);
});
