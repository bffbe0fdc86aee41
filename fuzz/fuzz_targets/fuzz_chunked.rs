#![no_main]
use libfuzzer_sys::fuzz_target;
use zenpsd::*;

fuzz_target!(|input: &[u8]| {
    // First byte picks the chunk size; chunked and whole decodes must agree
    let Some((&chunk, data)) = input.split_first() else {
        return;
    };
    let chunk = usize::from(chunk).max(1);
    let limits = Limits {
        max_memory_bytes: Some(64 * 1024 * 1024),
        ..Limits::default()
    };

    let whole = decode_with_limits(data, &limits, enough::Unstoppable);

    let mut decoder = PsdDecoder::new().with_limits(limits);
    let mut failed = false;
    for piece in data.chunks(chunk) {
        if decoder.feed(piece).is_err() {
            failed = true;
            break;
        }
    }
    let chunked = if failed { None } else { decoder.finish().ok() };

    match (whole, chunked) {
        (Ok(a), Some(b)) => assert_eq!(a.pixels(), b.pixels(), "chunked decode differs"),
        (Ok(_), None) => panic!("chunked decode failed where whole decode succeeded"),
        (Err(_), Some(_)) => panic!("chunked decode succeeded where whole decode failed"),
        (Err(_), None) => {}
    }
});
