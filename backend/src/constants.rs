// =============================================================================
// PrepConnect Backend Constants
// =============================================================================
// Tunables shared by the server and the CLI tools.

// =============================================================================
// SERVER
// =============================================================================

/// Port used when `PORT` is not set
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Header carrying the caller's user id
pub const USER_ID_HEADER: &str = "x-user-id";

// =============================================================================
// DATABASE
// =============================================================================

/// SQLite file used when `DATABASE_URL` is not set
pub const DEFAULT_DATABASE_URL: &str = "sqlite://prepconnect.db?mode=rwc";

/// Pool size used when `DB_MAX_CONNECTIONS` is not set
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// REAL-TIME DELIVERY
// =============================================================================

/// Buffered events per user channel before slow listeners start lagging
pub const DEFAULT_NOTIFY_CHANNEL_CAPACITY: usize = 64;

/// SSE event name for a newly delivered chat message
pub const RECEIVE_MESSAGE_EVENT: &str = "receiveMessage";

// =============================================================================
// DEMO DATA
// =============================================================================

/// Directory entries created by `manage_users seed` (name, email, role)
pub const DEMO_USERS: &[(&str, &str, &str)] = &[
    ("John Doe", "john@example.com", "senior"),
    ("Jane Smith", "jane@example.com", "senior"),
    ("Bob Johnson", "bob@example.com", "junior"),
    ("Alice Brown", "alice@example.com", "senior"),
    ("Charlie Wilson", "charlie@example.com", "junior"),
];
