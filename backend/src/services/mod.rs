pub mod connections;
pub mod messaging;
pub mod notifier;
pub mod users;

pub use connections::ConnectionLedger;
pub use messaging::MessagingGate;
pub use notifier::{BroadcastNotifier, Notifier};
pub use users::UserDirectory;
