#![no_main]
use libfuzzer_sys::fuzz_target;
use unquarantine::formats::avast;

fuzz_target!(|data: &[u8]| {
    let mut input = avast::AVAST_MAGIC.to_vec();
    input.extend_from_slice(data);
    let _ = avast::decode(&input);
});
