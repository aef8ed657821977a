//! Three-tier preference resolution.
//!
//! For a given (notification, user, channel) the effective delivery decision
//! layers three sources, highest precedence first:
//!
//! 1. The user's own preference for that channel.
//! 2. Preferences of any group the user belongs to.
//! 3. The notification's `default_notify` flag.
//!
//! When the user belongs to multiple groups with conflicting values for the
//! same channel, the permissive rule applies: any group enabling the channel
//! enables it. This keeps resolution deterministic and errs toward delivery.

use serde::Serialize;

/// Which tier produced the effective value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceSource {
    User,
    Group,
    Default,
}

/// The resolved delivery decision for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub notify: bool,
    pub source: PreferenceSource,
}

/// Resolve the effective `notify` value for a single channel.
///
/// `user_pref` is the user's explicit preference, if any. `group_prefs`
/// holds the explicit preferences of every group the user belongs to that
/// has one for this channel (order is irrelevant). `default_notify` is the
/// notification's fallback.
pub fn effective_notify(
    user_pref: Option<bool>,
    group_prefs: &[bool],
    default_notify: bool,
) -> Resolution {
    if let Some(notify) = user_pref {
        return Resolution {
            notify,
            source: PreferenceSource::User,
        };
    }

    if !group_prefs.is_empty() {
        // Permissive-OR across groups: any `true` wins.
        return Resolution {
            notify: group_prefs.iter().any(|&n| n),
            source: PreferenceSource::Group,
        };
    }

    Resolution {
        notify: default_notify,
        source: PreferenceSource::Default,
    }
}
