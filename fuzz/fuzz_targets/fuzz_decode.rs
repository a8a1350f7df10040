#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Header parsing and full decode must never panic
    let _ = zentga::probe(data);
    let limits = zentga::Limits {
        max_pixels: Some(1 << 22),
        ..Default::default()
    };
    let _ = zentga::decode_with_limits(data, &limits, enough::Unstoppable);

    // First byte picks a mode, including invalid codes
    if let Some((&mode, rest)) = data.split_first() {
        let _ = zentga::transcode(rest, mode % 12, enough::Unstoppable);
    }
});
