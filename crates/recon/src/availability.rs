use chrono::NaiveDate;

use crate::model::BookingRecord;

/// True if the booking holds units on `date`. The interval is half-open:
/// a booking starting on `date` is active, one ending on `date` is not.
pub fn is_active(booking: &BookingRecord, date: NaiveDate) -> bool {
    booking.start <= date && date < booking.end
}

/// Bookings active on the reference date, in input order.
pub fn filter_active(bookings: &[BookingRecord], date: NaiveDate) -> Vec<&BookingRecord> {
    bookings.iter().filter(|b| is_active(b, date)).collect()
}
