#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Probe and whole-buffer decode must never panic
    let _ = zenpsd::ImageInfo::from_bytes(data);

    let limits = zenpsd::Limits {
        max_memory_bytes: Some(64 * 1024 * 1024),
        ..zenpsd::Limits::default()
    };
    let _ = zenpsd::decode_with_limits(data, &limits, enough::Unstoppable);
});
