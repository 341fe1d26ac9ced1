// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Opt-in gate: per-recipient, per-channel consent checks.
//!
//! The legacy system treated a recipient with no recorded preference as
//! opted in, while the newer path requires an explicit flag. Rather than
//! silently picking one, the absent-flag interpretation is a constructor
//! parameter.

use herald_core::types::{Channel, Recipient, RejectionReason};

/// How an absent opt-in preference is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptInPolicy {
    /// Dispatch requires an explicit `true` flag.
    #[default]
    RequireExplicit,
    /// A recipient with no recorded preference is treated as opted in
    /// (legacy compatibility).
    AssumeOptedIn,
}

impl OptInPolicy {
    /// Build from the `optin.assume_opted_in_when_absent` config flag.
    pub fn from_assume_flag(assume_opted_in_when_absent: bool) -> Self {
        if assume_opted_in_when_absent {
            OptInPolicy::AssumeOptedIn
        } else {
            OptInPolicy::RequireExplicit
        }
    }
}

/// Decides, per recipient and channel, whether dispatch is permitted and
/// what contact address to use.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptInGate {
    policy: OptInPolicy,
}

impl OptInGate {
    pub fn new(policy: OptInPolicy) -> Self {
        Self { policy }
    }

    fn opted_in(&self, recipient: &Recipient, channel: Channel) -> bool {
        match recipient.opt_ins.flag(channel) {
            Some(flag) => flag,
            None => self.policy == OptInPolicy::AssumeOptedIn,
        }
    }

    /// True iff the opt-in flag resolves true AND a non-empty contact exists.
    pub fn can_send(&self, recipient: &Recipient, channel: Channel) -> bool {
        self.opted_in(recipient, channel) && recipient.contact(channel).is_some()
    }

    /// The channel contact, only when [`can_send`](Self::can_send) holds.
    pub fn resolve_contact<'a>(
        &self,
        recipient: &'a Recipient,
        channel: Channel,
    ) -> Option<&'a str> {
        if self.opted_in(recipient, channel) {
            recipient.contact(channel)
        } else {
            None
        }
    }

    /// Why dispatch is denied, or `None` when it is permitted.
    pub fn rejection(&self, recipient: &Recipient, channel: Channel) -> Option<RejectionReason> {
        if !self.opted_in(recipient, channel) {
            Some(RejectionReason::OptInDenied)
        } else if recipient.contact(channel).is_none() {
            Some(RejectionReason::MissingContact)
        } else {
            None
        }
    }
}
