use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::session::{ChannelId, Member, UserId};

/// A member's voice presence before and after a platform voice-state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceStateUpdate {
    pub member: Member,
    pub before: Option<ChannelId>,
    pub after: Option<ChannelId>,
}

impl VoiceStateUpdate {
    /// The member was in a voice channel and is now in none.
    /// Moving between channels is not leaving.
    pub fn is_leave(&self) -> bool {
        self.before.is_some() && self.after.is_none()
    }
}

/// Which users are currently connected to any voice channel
#[derive(Debug, Default)]
pub struct VoicePresence {
    connected: HashSet<UserId>,
}

impl VoicePresence {
    pub fn apply(&mut self, update: &VoiceStateUpdate) {
        if update.after.is_some() {
            self.connected.insert(update.member.id);
        } else {
            self.connected.remove(&update.member.id);
        }
    }

    /// Record presence reported directly by the command layer
    pub fn mark_connected(&mut self, user_id: UserId) {
        self.connected.insert(user_id);
    }

    pub fn is_connected(&self, user_id: UserId) -> bool {
        self.connected.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(before: Option<ChannelId>, after: Option<ChannelId>) -> VoiceStateUpdate {
        VoiceStateUpdate {
            member: Member::new(1, "ada"),
            before,
            after,
        }
    }

    #[test]
    fn test_only_full_departure_is_a_leave() {
        assert!(update(Some(10), None).is_leave());
        assert!(!update(Some(10), Some(11)).is_leave());
        assert!(!update(None, Some(10)).is_leave());
        assert!(!update(None, None).is_leave());
    }

    #[test]
    fn test_presence_follows_after_channel() {
        let mut presence = VoicePresence::default();
        assert!(!presence.is_connected(1));

        presence.apply(&update(None, Some(10)));
        assert!(presence.is_connected(1));

        presence.apply(&update(Some(10), Some(11)));
        assert!(presence.is_connected(1));

        presence.apply(&update(Some(11), None));
        assert!(!presence.is_connected(1));
    }
}
