//! The channel value type.
//!
//! A channel is a delivery topic, never owned by a single resource: many
//! resources map to the same channel. Equality is structural.

use cardloom_core::{BlockId, ProjectId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named delivery topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Private channel of one user.
    User(UserId),
    /// Content channel of one project.
    ProjectContent(ProjectId),
    /// Channel of one document block (collaborative text sessions).
    Block(BlockId),
    /// Every connected client.
    Broadcast,
}

impl Channel {
    /// Wire key of this channel, used on the cluster bus and in client
    /// subscribe frames.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Parse a wire key back into a channel. Unknown keys yield `None`.
    pub fn parse_key(key: &str) -> Option<Channel> {
        if key == "broadcast" {
            return Some(Channel::Broadcast);
        }
        let (prefix, id) = key.split_once('/')?;
        let id: u64 = id.parse().ok()?;
        match prefix {
            "user" => Some(Channel::User(UserId::new(id))),
            "project" => Some(Channel::ProjectContent(ProjectId::new(id))),
            "block" => Some(Channel::Block(BlockId::new(id))),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::User(id) => write!(f, "user/{id}"),
            Channel::ProjectContent(id) => write!(f, "project/{id}"),
            Channel::Block(id) => write!(f, "block/{id}"),
            Channel::Broadcast => write!(f, "broadcast"),
        }
    }
}
