#![no_main]
use libfuzzer_sys::fuzz_target;
use unquarantine::{ExtractConfig, Extractor, Keystream};

fuzz_target!(|data: &[u8]| {
    let Ok(keystream) = Keystream::new(vec![0x5a; 64]) else {
        return;
    };
    let extractor = Extractor::with_keystream(ExtractConfig::default(), keystream);
    let _ = extractor.extract_bytes(data);
});
