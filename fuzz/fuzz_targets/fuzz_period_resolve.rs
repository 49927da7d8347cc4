#![no_main]
use libfuzzer_sys::fuzz_target;

use chrono::{DateTime, Utc};
use hotel_analytics::domain::period::{PeriodKind, parse_timezone, resolve};

fuzz_target!(|input: (&str, &str, i64)| {
    let (kind, zone, secs) = input;
    let (Ok(kind), Ok(basis)) = (kind.parse::<PeriodKind>(), parse_timezone(zone)) else {
        return;
    };
    let Some(reference) = DateTime::<Utc>::from_timestamp(secs % 4_000_000_000, 0) else {
        return;
    };
    if let Ok(pair) = resolve(kind, Some(reference), basis) {
        assert!(pair.prior.end <= pair.current.start);
        assert!(pair.current.contains(reference));
    }
});
