//! Connection-scoped state tracking.
//!
//! The [`StateStore`] is an arena owning every known client and channel,
//! addressed by case-folded string keys. Memberships reference clients by
//! their folded key rather than by pointer; nothing here requires reference
//! identity beyond what the key provides. One store exists per connection
//! and is mutated only by command handlers on the dispatch thread.

mod channel;
mod client;
mod store;

pub use self::channel::{ChannelClientInfo, ChannelInfo};
pub use self::client::ClientInfo;
pub use self::store::{RenameOutcome, StateStore};
