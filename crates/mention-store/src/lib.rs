#![forbid(unsafe_code)]

//! Session/config state for the surface that hosts the mention HUD.
//!
//! The HUD's candidate rows come from session data (who the user follows,
//! who follows them, login state), tracked here as an immutable snapshot plus
//! a tagged-event apply step. Each event replaces exactly the fields it
//! names and returns a brand-new [`SessionState`]; nothing is merged in
//! place, so a snapshot handed to the HUD layer can never change underneath
//! it.
//!
//! # Serialization
//!
//! With the `state-persistence` feature enabled, the snapshot and its payload
//! types derive `Serialize` and `Deserialize`. Without the feature they are
//! plain in-memory values.

use std::collections::BTreeSet;

/// Bootstrap attempts granted before the session is declared failed.
pub const MAX_BOOTSTRAP_TRIES: u32 = 5;

/// Mount path used for the filesystem layer until the daemon reports one.
pub const DEFAULT_KBFS_PATH: &str = "/keybase";

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Client configuration reported by the service on startup.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ClientConfig {
    /// Service version string.
    pub version: String,
    /// API server the service is pointed at.
    pub server_uri: String,
}

/// Extended configuration, available once the service has a device context.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ExtendedConfig {
    /// This device's identifier, when provisioned.
    pub device_id: Option<String>,
    /// Whether the device has completed provisioning.
    pub provisioned: bool,
}

/// The signed-in user as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct UserInfo {
    /// Username.
    pub username: String,
    /// Stable user id.
    pub uid: String,
}

/// Login status snapshot from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct CurrentStatus {
    /// The signed-in user, if any.
    pub user: Option<UserInfo>,
    /// Whether a session is active.
    pub logged_in: bool,
}

/// Where the session is in its bootstrap lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum BootStatus {
    /// Still attempting to bootstrap.
    #[default]
    Loading,
    /// Bootstrap completed.
    Bootstrapped,
    /// Out of retries.
    Failure,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A tagged session event.
///
/// Each variant names the field(s) of [`SessionState`] it replaces; applying
/// one never touches anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Service configuration arrived.
    ConfigLoaded(ClientConfig),
    /// Extended (device-level) configuration arrived.
    ExtendedConfigLoaded(ExtendedConfig),
    /// Login status arrived; also refreshes the derived user fields.
    StatusLoaded(CurrentStatus),
    /// The filesystem mount moved.
    KbfsPathChanged(String),
    /// The installer finished; bootstrap may proceed.
    ReadyForBootstrap,
    /// One bootstrap attempt failed; consumes a retry.
    BootstrapAttemptFailed,
    /// Bootstrap gave up.
    BootstrapFailed,
    /// Bootstrap succeeded.
    Bootstrapped,
    /// Operator asked for a fresh round of bootstrap attempts.
    BootstrapRetry,
    /// One tracked relationship changed.
    FollowingUpdated {
        /// Whose row changed.
        username: String,
        /// Present in the following set afterwards or not.
        is_tracking: bool,
    },
    /// Wholesale replacement of the following set.
    FollowingSet(BTreeSet<String>),
    /// Wholesale replacement of the followers set.
    FollowersSet(BTreeSet<String>),
    /// An application-level error surfaced (or cleared, with `None`).
    GlobalError(Option<String>),
    /// The banner for the current global error was dismissed.
    GlobalErrorDismissed,
    /// The service connection errored (or recovered, with `None`).
    DaemonError(Option<String>),
    /// Drop all accumulated state back to the initial defaults.
    ResetStore,
}

// ---------------------------------------------------------------------------
// Session snapshot
// ---------------------------------------------------------------------------

/// The accumulated session snapshot.
///
/// `Default` is the pre-bootstrap state: nothing loaded, logged out, a full
/// allowance of bootstrap tries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SessionState {
    /// Service configuration, once loaded.
    pub client_config: Option<ClientConfig>,
    /// Extended configuration, once loaded.
    pub extended_config: Option<ExtendedConfig>,
    /// Last login status report.
    pub status: Option<CurrentStatus>,
    /// Signed-in username, derived from `status`.
    pub username: Option<String>,
    /// Signed-in uid, derived from `status`.
    pub uid: Option<String>,
    /// Whether a session is active.
    pub logged_in: bool,
    /// Filesystem mount path.
    pub kbfs_path: String,
    /// Bootstrap attempts left before giving up.
    pub bootstrap_tries_remaining: u32,
    /// Bootstrap lifecycle position.
    pub boot_status: BootStatus,
    /// Whether bootstrap is allowed to start.
    pub ready_for_bootstrap: bool,
    /// Users following this user.
    pub followers: BTreeSet<String>,
    /// Users this user follows.
    pub following: BTreeSet<String>,
    /// Current application-level error, if any.
    pub global_error: Option<String>,
    /// Current service-connection error, if any.
    pub daemon_error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            client_config: None,
            extended_config: None,
            status: None,
            username: None,
            uid: None,
            logged_in: false,
            kbfs_path: DEFAULT_KBFS_PATH.to_owned(),
            bootstrap_tries_remaining: MAX_BOOTSTRAP_TRIES,
            boot_status: BootStatus::Loading,
            ready_for_bootstrap: false,
            followers: BTreeSet::new(),
            following: BTreeSet::new(),
            global_error: None,
            daemon_error: None,
        }
    }
}

impl SessionState {
    /// Apply one event, returning the next snapshot.
    ///
    /// Whole-value replacement: the result is a new snapshot in which exactly
    /// the fields named by the event differ; `ResetStore` returns the
    /// defaults.
    #[must_use]
    pub fn apply(&self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::ResetStore => Self::default(),

            SessionEvent::ConfigLoaded(config) => Self {
                client_config: Some(config),
                ..self.clone()
            },

            SessionEvent::ExtendedConfigLoaded(config) => Self {
                extended_config: Some(config),
                ..self.clone()
            },

            SessionEvent::StatusLoaded(status) => Self {
                username: status.user.as_ref().map(|u| u.username.clone()),
                uid: status.user.as_ref().map(|u| u.uid.clone()),
                logged_in: status.logged_in,
                status: Some(status),
                ..self.clone()
            },

            SessionEvent::KbfsPathChanged(path) => Self {
                kbfs_path: path,
                ..self.clone()
            },

            SessionEvent::ReadyForBootstrap => Self {
                ready_for_bootstrap: true,
                ..self.clone()
            },

            SessionEvent::BootstrapAttemptFailed => Self {
                bootstrap_tries_remaining: self.bootstrap_tries_remaining.saturating_sub(1),
                ..self.clone()
            },

            SessionEvent::BootstrapFailed => Self {
                boot_status: BootStatus::Failure,
                ..self.clone()
            },

            SessionEvent::Bootstrapped => Self {
                boot_status: BootStatus::Bootstrapped,
                ..self.clone()
            },

            SessionEvent::BootstrapRetry => Self {
                bootstrap_tries_remaining: MAX_BOOTSTRAP_TRIES,
                boot_status: BootStatus::Loading,
                ..self.clone()
            },

            SessionEvent::FollowingUpdated {
                username,
                is_tracking,
            } => {
                let mut following = self.following.clone();
                if is_tracking {
                    following.insert(username);
                } else {
                    following.remove(&username);
                }
                Self {
                    following,
                    ..self.clone()
                }
            }

            SessionEvent::FollowingSet(following) => Self {
                following,
                ..self.clone()
            },

            SessionEvent::FollowersSet(followers) => Self {
                followers,
                ..self.clone()
            },

            SessionEvent::GlobalError(error) => {
                #[cfg(feature = "tracing")]
                if let Some(message) = &error {
                    tracing::warn!(error = %message, "global error");
                }
                Self {
                    global_error: error,
                    ..self.clone()
                }
            }

            SessionEvent::GlobalErrorDismissed => Self {
                global_error: None,
                ..self.clone()
            },

            SessionEvent::DaemonError(error) => {
                #[cfg(feature = "tracing")]
                if let Some(message) = &error {
                    tracing::warn!(error = %message, "daemon error");
                }
                Self {
                    daemon_error: error,
                    ..self.clone()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    // ─── Defaults and reset ───────────────────────────────────────

    #[test]
    fn default_snapshot_is_pre_bootstrap() {
        let state = SessionState::default();
        assert_eq!(state.kbfs_path, DEFAULT_KBFS_PATH);
        assert_eq!(state.bootstrap_tries_remaining, MAX_BOOTSTRAP_TRIES);
        assert_eq!(state.boot_status, BootStatus::Loading);
        assert!(!state.logged_in);
        assert!(state.following.is_empty());
    }

    #[test]
    fn reset_discards_everything() {
        let state = SessionState::default()
            .apply(SessionEvent::KbfsPathChanged("/mnt/kb".into()))
            .apply(SessionEvent::Bootstrapped)
            .apply(SessionEvent::FollowersSet(set(&["max"])))
            .apply(SessionEvent::ResetStore);
        assert_eq!(state, SessionState::default());
    }

    // ─── Field-wise replacement ───────────────────────────────────

    #[test]
    fn config_loaded_touches_only_config() {
        let before = SessionState::default();
        let config = ClientConfig {
            version: "6.0.1".into(),
            server_uri: "https://api.example.com".into(),
        };
        let after = before.apply(SessionEvent::ConfigLoaded(config.clone()));

        assert_eq!(after.client_config, Some(config));
        assert_eq!(
            SessionState {
                client_config: None,
                ..after
            },
            before,
        );
    }

    #[test]
    fn status_loaded_derives_user_fields() {
        let status = CurrentStatus {
            user: Some(UserInfo {
                username: "frank".into(),
                uid: "u-1234".into(),
            }),
            logged_in: true,
        };
        let state = SessionState::default().apply(SessionEvent::StatusLoaded(status.clone()));
        assert_eq!(state.username.as_deref(), Some("frank"));
        assert_eq!(state.uid.as_deref(), Some("u-1234"));
        assert!(state.logged_in);
        assert_eq!(state.status, Some(status));
    }

    #[test]
    fn status_without_user_clears_derived_fields() {
        let logged_in = SessionState::default().apply(SessionEvent::StatusLoaded(CurrentStatus {
            user: Some(UserInfo {
                username: "frank".into(),
                uid: "u-1234".into(),
            }),
            logged_in: true,
        }));
        let logged_out = logged_in.apply(SessionEvent::StatusLoaded(CurrentStatus {
            user: None,
            logged_in: false,
        }));
        assert_eq!(logged_out.username, None);
        assert_eq!(logged_out.uid, None);
        assert!(!logged_out.logged_in);
    }

    #[test]
    fn kbfs_path_replaces() {
        let state = SessionState::default().apply(SessionEvent::KbfsPathChanged("/mnt/kb".into()));
        assert_eq!(state.kbfs_path, "/mnt/kb");
    }

    // ─── Bootstrap lifecycle ──────────────────────────────────────

    #[test]
    fn attempt_failures_count_down_and_saturate() {
        let mut state = SessionState::default();
        for _ in 0..MAX_BOOTSTRAP_TRIES + 2 {
            state = state.apply(SessionEvent::BootstrapAttemptFailed);
        }
        assert_eq!(state.bootstrap_tries_remaining, 0);
    }

    #[test]
    fn retry_restores_the_allowance() {
        let state = SessionState::default()
            .apply(SessionEvent::BootstrapAttemptFailed)
            .apply(SessionEvent::BootstrapFailed)
            .apply(SessionEvent::BootstrapRetry);
        assert_eq!(state.bootstrap_tries_remaining, MAX_BOOTSTRAP_TRIES);
        assert_eq!(state.boot_status, BootStatus::Loading);
    }

    #[test]
    fn bootstrap_outcomes_set_status() {
        let failed = SessionState::default().apply(SessionEvent::BootstrapFailed);
        assert_eq!(failed.boot_status, BootStatus::Failure);
        let done = SessionState::default().apply(SessionEvent::Bootstrapped);
        assert_eq!(done.boot_status, BootStatus::Bootstrapped);
    }

    #[test]
    fn ready_for_bootstrap_latches() {
        let state = SessionState::default().apply(SessionEvent::ReadyForBootstrap);
        assert!(state.ready_for_bootstrap);
    }

    // ─── Follow graph ─────────────────────────────────────────────

    #[test]
    fn following_updates_add_and_remove() {
        let state = SessionState::default()
            .apply(SessionEvent::FollowingUpdated {
                username: "ada".into(),
                is_tracking: true,
            })
            .apply(SessionEvent::FollowingUpdated {
                username: "bob".into(),
                is_tracking: true,
            })
            .apply(SessionEvent::FollowingUpdated {
                username: "ada".into(),
                is_tracking: false,
            });
        assert_eq!(state.following, set(&["bob"]));
    }

    #[test]
    fn follow_sets_replace_wholesale() {
        let state = SessionState::default()
            .apply(SessionEvent::FollowingSet(set(&["ada", "bob"])))
            .apply(SessionEvent::FollowersSet(set(&["carol"])))
            .apply(SessionEvent::FollowingSet(set(&["dan"])));
        assert_eq!(state.following, set(&["dan"]));
        assert_eq!(state.followers, set(&["carol"]));
    }

    // ─── Errors ───────────────────────────────────────────────────

    #[test]
    fn errors_set_and_clear_independently() {
        let state = SessionState::default()
            .apply(SessionEvent::GlobalError(Some("boom".into())))
            .apply(SessionEvent::DaemonError(Some("socket closed".into())));
        assert_eq!(state.global_error.as_deref(), Some("boom"));
        assert_eq!(state.daemon_error.as_deref(), Some("socket closed"));

        let dismissed = state.apply(SessionEvent::GlobalErrorDismissed);
        assert_eq!(dismissed.global_error, None);
        assert_eq!(dismissed.daemon_error.as_deref(), Some("socket closed"));

        let recovered = dismissed.apply(SessionEvent::DaemonError(None));
        assert_eq!(recovered.daemon_error, None);
    }

    // ─── Immutability ─────────────────────────────────────────────

    #[test]
    fn apply_leaves_the_input_snapshot_alone() {
        let before = SessionState::default();
        let _after = before.apply(SessionEvent::Bootstrapped);
        assert_eq!(before, SessionState::default());
    }
}
