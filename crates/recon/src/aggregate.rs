use std::collections::BTreeMap;

use crate::model::BookingRecord;

/// Sum active booking quantities per asset.
///
/// Assets with no active booking are absent from the map; callers treat a
/// missing key as zero rented units.
pub fn rented_by_asset<'a, I>(active: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = &'a BookingRecord>,
{
    let mut rented: BTreeMap<String, f64> = BTreeMap::new();
    for booking in active {
        *rented.entry(booking.asset.clone()).or_insert(0.0) += booking.quantity;
    }
    rented
}
