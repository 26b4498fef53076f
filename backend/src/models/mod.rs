pub mod connections;
pub mod messages;
pub mod users;

pub use connections::{Connection, ConnectionStatus, ConnectionStatusReport, ConnectionView, RespondAction, canonical_pair};
pub use messages::{Conversation, LatestMessage, Message, MessageView};
pub use users::{NewUser, User, UserName, UserRole, UserSummary};
