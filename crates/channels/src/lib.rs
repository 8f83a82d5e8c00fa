//! Cardloom Channels - audience computation for mutated resources
//!
//! Given a mutated resource and its relational neighborhood, this crate
//! computes the set of delivery channels that must receive the update:
//! - Project-content resources go to the project channel, plus team member
//!   channels when published, plus operator channels when not
//! - Global resources fan out to the broadcast channel when published
//! - Audiences propagate along the card-type reference graph
//! - User-account changes reach the user, their teammates, and operators
//! - Presence indicators stay on the project channel only
//!
//! Computation is deterministic and side-effect-free for a fixed snapshot,
//! and always reflects *current* relational state.

#![warn(missing_docs)]

pub mod channel;
pub mod computer;
pub mod error;

pub use channel::Channel;
pub use computer::ChannelComputer;
pub use error::ChannelError;
