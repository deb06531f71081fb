pub mod activity;
pub mod client;
pub mod comment;
pub mod router;
pub mod setting;
pub mod site;
pub mod ticket;
pub mod user;

pub use activity::ActivityLog;
pub use client::Client;
pub use comment::TicketComment;
pub use router::{Router, RouterStatus};
pub use setting::SystemSetting;
pub use site::Site;
pub use ticket::{Ticket, TicketPriority, TicketStatus};
pub use user::{Role, User, UserStatus};
