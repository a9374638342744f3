//! Scheduling constants
//!
//! Marker fragments are part of live calendar data and must keep their exact
//! shape.

/// Separator embedded in every marker string.
pub const EVENT_MARKER: &str = "__EVENT__";

/// Appended to the base marker for availability windows.
pub const CONTAINER_SUFFIX: &str = "CONTAINER__";

/// Appended to the base marker for bookings inside a window.
pub const MEMBER_SUFFIX: &str = "MEMBER__";

/// Events carrying this marker are never treated as next-available anchors.
pub const EXCLUDE_MARKER: &str = "next-exclude__EVENT__";

// Slot generation defaults
pub const DEFAULT_DURATION_MINUTES: u32 = 60;
pub const DEFAULT_SLOT_INTERVAL_MINUTES: u32 = 15;
pub const DEFAULT_BUFFER_MINUTES: u32 = 30;
pub const ADJACENCY_SPAN_HOURS: u32 = 24;
pub const NEXT_AVAILABLE_GRACE_MINUTES: u32 = 30;
pub const NEXT_EVENT_LOOKAHEAD_HOURS: u32 = 18;

/// Advisory validity of an anchor availability cache.
pub const CACHE_VALIDITY_MINUTES: i64 = 5;

/// Upper bound on how long a cached access credential is trusted.
pub const CREDENTIAL_LIFETIME_MINUTES: i64 = 50;

/// Refresh credentials this many seconds before they expire.
pub const CREDENTIAL_EXPIRY_SKEW_SECONDS: i64 = 60;

/// Free-busy horizon used by the today/tomorrow fallback.
pub const FALLBACK_FREE_BUSY_DAYS: i64 = 2;
