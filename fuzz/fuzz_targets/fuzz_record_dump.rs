#![no_main]
use libfuzzer_sys::fuzz_target;

use hotel_analytics::adapters::memory_source::RecordDump;
use hotel_analytics::dashboard::report::{KpiReport, WindowRecords};
use hotel_analytics::domain::period::{PeriodKind, resolve};
use hotel_analytics::ports::record_source::Scope;

fuzz_target!(|data: &[u8]| {
    let Ok(dump) = serde_json::from_slice::<RecordDump>(data) else {
        return;
    };
    let Some(reference) = dump.invoices.first().map(|i| i.issued_at) else {
        return;
    };
    let Ok(periods) = resolve(PeriodKind::Month, Some(reference), chrono_tz::UTC) else {
        return;
    };
    let records = WindowRecords {
        reservations: dump.reservations,
        invoices: dump.invoices,
    };
    let _ = KpiReport::build(Scope::Hotel, periods, 1, 5, &records, &records);
});
