//! Credential checking against the configured user table.
//!
//! [`AuthGate`] compares a presented key against every slot of the
//! fixed-size user table with a constant scan structure: all slots are
//! visited, every key byte is compared, and there is no early exit, so
//! response timing does not reveal how many slots are occupied or where
//! a near-miss sits in the table.
//!
//! There is no lockout or rate limiting on repeated failures - a known
//! hardening gap, left open deliberately.
//!
//! # Example
//!
//! ```rust
//! use rs_doorman::auth::AuthGate;
//! use rs_doorman::config::DeviceConfig;
//!
//! let config = DeviceConfig::default()
//!     .with_user("ABCDEFGHIJKLMNOPQRST", "alice")
//!     .unwrap();
//!
//! let gate = AuthGate::new(&config.users);
//! assert_eq!(gate.authenticate("ABCDEFGHIJKLMNOPQRST"), Some("alice"));
//! assert_eq!(gate.authenticate("wrongkey000000000000"), None);
//! ```

use crate::config::{FixedStr, UserCredential, KEY_SIZE};

/// Authenticates presented keys against the user table.
///
/// Borrows the table from the current [`crate::config::DeviceConfig`],
/// so a `configure` change is picked up on the next check.
pub struct AuthGate<'a> {
    users: &'a [UserCredential],
}

impl<'a> AuthGate<'a> {
    /// Creates a gate over the given user table.
    pub fn new(users: &'a [UserCredential]) -> Self {
        Self { users }
    }

    /// Returns the username matching `presented`, or `None` (unauthorized).
    ///
    /// The full fixed-width key is compared for every slot; vacant slots
    /// never match, and a presented key longer than [`KEY_SIZE`] cannot
    /// match anything.
    pub fn authenticate(&self, presented: &str) -> Option<&'a str> {
        let presented = FixedStr::<KEY_SIZE>::from_str(presented).ok()?;
        if presented.is_empty() {
            return None;
        }

        let mut matched: Option<&'a str> = None;
        for user in self.users {
            let mut diff = 0u8;
            for (a, b) in user.key.raw().iter().zip(presented.raw().iter()) {
                diff |= a ^ b;
            }
            // Vacant slots carry an all-zero key and were excluded above
            if diff == 0 && !user.is_vacant() {
                matched = Some(user.username.as_str());
            }
        }
        matched
    }
}
