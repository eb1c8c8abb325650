//! Core types: categories, races, Argentina time, calendar export, event feed

pub mod calendar;
pub mod category;
pub mod feed;
pub mod race;
pub mod time;
pub mod tracing;

pub use calendar::{
    CalendarDocument, CalendarEvent, CalendarOptions, EventSpan, race_document, races_document,
};
pub use category::{AdapterKind, CategoryDescriptor, builtin_categories};
pub use feed::{EventFeedItem, event_feed};
pub use race::{
    CountdownTarget, FallbackTier, NormalizedRace, RaceSet, ScheduleEntry, SessionStatus,
};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
