//! Message composition
//!
//! Pure mapping from (event, contact) to outbound message text. Variant
//! selection runs in priority order: new-year marker in the summary beats
//! the source category, a birthday category beats the generic reminder.

use wishbot_domain::constants::NEW_YEAR_MARKER;
use wishbot_domain::{Contact, Event, EventCategory};

/// Whether a summary names the new-year event (case-insensitive substring).
pub fn is_new_year_event(summary: &str) -> bool {
    summary.to_lowercase().contains(NEW_YEAR_MARKER)
}

/// Compose the outbound message for an event and its resolved contact.
pub fn compose(event: &Event, contact: &Contact) -> String {
    if is_new_year_event(&event.summary) {
        new_year_wish(&contact.name)
    } else if event.category == EventCategory::Birthday {
        birthday_wish(&contact.name)
    } else {
        event_reminder(&contact.name, &event.summary)
    }
}

/// New-year greeting template.
pub fn new_year_wish(contact_name: &str) -> String {
    format!(
        "🎉 Happy New Year, {contact_name}! 🎆 Wishing you a year full of joy, health, and \
         success. May all your dreams come true in 2024 and beyond! 🥂 Here's to new beginnings, \
         fresh opportunities, and unforgettable memories. Cheers to another year of amazing \
         adventures! 🌟\n\nAutomatic Wishing Bot"
    )
}

/// Birthday greeting template.
pub fn birthday_wish(contact_name: &str) -> String {
    format!(
        "Happy Birthday, {contact_name}! 🎉 Wishing you a wonderful year ahead filled with joy, \
         success, and happiness! 🥳"
    )
}

/// Generic event reminder template.
pub fn event_reminder(contact_name: &str, event_summary: &str) -> String {
    format!(
        "Hello {contact_name},\n\nThis is a reminder for your event: {event_summary}. Don't \
         forget to check your calendar.\n\nBest regards,\nAutomatic Wishing Bot"
    )
}
