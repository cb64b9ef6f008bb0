//! Rendering of the daily notification message.
//!
//! The wording is part of the product surface and is matched verbatim by
//! downstream checks, so both templates live here and nowhere else.

use crate::calendar::CalendarEntry;
use crate::clock::{LocalMoment, MonthDay};

/// Subject line, numeric month/day with no zero padding.
pub fn render_subject(date: MonthDay) -> String {
    format!("Lead4Tomorrow Calendar {}/{}", date.month, date.day)
}

/// Body shared by every channel. Empty theme or entry strings render
/// as-is; an unknown month still produces a complete message.
pub fn render_body(moment: &LocalMoment, entry: &CalendarEntry) -> String {
    format!(
        "We hope this message finds you well!\n\n\
         {month} is {theme}.\n\
         Today is {day_name}, {month} {day}. {entry}\n\n\
         Have a wonderful day,\n\
         Lead4Tomorrow",
        month = moment.month_name,
        theme = entry.theme,
        day_name = moment.day_name,
        day = moment.date.day,
        entry = entry.entry,
    )
}
