macro_rules! event_kinds {
    ($( $(#[$doc:meta])* $variant:ident => $name:literal, )*) => {
        /// Known server event names
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        #[non_exhaustive]
        pub enum EventKind {
            $( $(#[$doc])* $variant, )*
            /// event name not in the list above
            Unknown(String),
        }

        impl EventKind {
            /// event name on the wire
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $name, )*
                    Self::Unknown(name) => name.as_str(),
                }
            }
        }

        impl From<&str> for EventKind {
            fn from(name: &str) -> Self {
                match name {
                    $( $name => Self::$variant, )*
                    other => Self::Unknown(other.to_string()),
                }
            }
        }
    };
}

event_kinds! {
    /// first event of every connection
    Hello => "hello",
    /// new post
    Posted => "posted",
    /// post edited
    PostEdited => "post_edited",
    /// post deleted
    PostDeleted => "post_deleted",
    /// post updated
    PostUpdated => "post_updated",
    /// post marked unread
    PostUnread => "post_unread",
    /// channel converted
    ChannelConverted => "channel_converted",
    /// channel created
    ChannelCreated => "channel_created",
    /// channel deleted
    ChannelDeleted => "channel_deleted",
    /// channel restored
    ChannelRestored => "channel_restored",
    /// channel updated
    ChannelUpdated => "channel_updated",
    /// channel viewed
    ChannelViewed => "channel_viewed",
    /// channel member updated
    ChannelMemberUpdated => "channel_member_updated",
    /// direct channel added
    DirectAdded => "direct_added",
    /// group channel added
    GroupAdded => "group_added",
    /// new user
    NewUser => "new_user",
    /// added to team
    AddedToTeam => "added_to_team",
    /// leave team
    LeaveTeam => "leave_team",
    /// team updated
    UpdateTeam => "update_team",
    /// team deleted
    DeleteTeam => "delete_team",
    /// user added to channel
    UserAdded => "user_added",
    /// user removed from channel
    UserRemoved => "user_removed",
    /// user updated
    UserUpdated => "user_updated",
    /// user role updated
    UserRoleUpdated => "user_role_updated",
    /// someone is typing
    Typing => "typing",
    /// preference changed
    PreferenceChanged => "preference_changed",
    /// preferences changed
    PreferencesChanged => "preferences_changed",
    /// preferences deleted
    PreferencesDeleted => "preferences_deleted",
    /// ephemeral message
    EphemeralMessage => "ephemeral_message",
    /// user status changed
    StatusChange => "status_change",
    /// reaction added
    ReactionAdded => "reaction_added",
    /// reaction removed
    ReactionRemoved => "reaction_removed",
    /// custom emoji added
    EmojiAdded => "emoji_added",
    /// plugin enabled
    PluginEnabled => "plugin_enabled",
    /// plugin disabled
    PluginDisabled => "plugin_disabled",
    /// license changed
    LicenseChanged => "license_changed",
    /// config changed
    ConfigChanged => "config_changed",
    /// interactive dialog opened
    OpenDialog => "open_dialog",
    /// thread updated
    ThreadUpdated => "thread_updated",
    /// thread follow changed
    ThreadFollowChanged => "thread_follow_changed",
    /// thread read changed
    ThreadReadChanged => "thread_read_changed",
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_known_name() {
        assert_eq!(EventKind::from("status_change"), EventKind::StatusChange);
        assert_eq!(EventKind::StatusChange.as_str(), "status_change");
    }

    #[test]
    fn test_unknown_name_passthrough() {
        let kind = EventKind::from("custom_com.example.plugin_event");
        assert_eq!(
            kind,
            EventKind::Unknown("custom_com.example.plugin_event".to_string())
        );
        assert_eq!(kind.as_str(), "custom_com.example.plugin_event");
    }
}
