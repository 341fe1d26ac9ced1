// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter registry.
//!
//! Adapters are keyed by their [`Channel`] tag; the orchestrator looks up
//! the capability it needs instead of branching on channel identity.

use std::collections::HashMap;
use std::sync::Arc;

use herald_core::traits::ChannelAdapter;
use herald_core::types::Channel;

/// Registry of channel adapters keyed by channel tag.
#[derive(Default)]
pub struct ChannelRegistry {
    adapters: HashMap<Channel, Arc<dyn ChannelAdapter>>,
}

impl ChannelRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own channel tag, replacing any
    /// previous adapter for that channel.
    pub fn register(&mut self, adapter: Arc<dyn ChannelAdapter>) {
        self.adapters.insert(adapter.channel(), adapter);
    }

    pub fn get(&self, channel: Channel) -> Option<Arc<dyn ChannelAdapter>> {
        self.adapters.get(&channel).cloned()
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.adapters.contains_key(&channel)
    }

    /// Registered channels in stable declaration order.
    pub fn channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.adapters.contains_key(c))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use herald_core::error::SendError;
    use herald_core::types::ProviderResponse;

    struct StubAdapter(Channel);

    #[async_trait]
    impl ChannelAdapter for StubAdapter {
        fn name(&self) -> &str {
            "stub"
        }

        fn channel(&self) -> Channel {
            self.0
        }

        fn validate_contact(&self, _contact: &str) -> bool {
            true
        }

        async fn send(
            &self,
            _contact: &str,
            _body: &str,
            _subject: Option<&str>,
        ) -> Result<ProviderResponse, SendError> {
            Ok(ProviderResponse::default())
        }
    }

    #[test]
    fn register_keys_by_adapter_channel() {
        let mut registry = ChannelRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(StubAdapter(Channel::Email)));
        registry.register(Arc::new(StubAdapter(Channel::Sms)));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(Channel::Email));
        assert!(!registry.contains(Channel::Whatsapp));
        assert!(registry.get(Channel::Sms).is_some());
        assert!(registry.get(Channel::Whatsapp).is_none());
        assert_eq!(registry.channels(), vec![Channel::Email, Channel::Sms]);
    }

    #[test]
    fn register_replaces_existing_adapter() {
        let mut registry = ChannelRegistry::new();
        registry.register(Arc::new(StubAdapter(Channel::Email)));
        registry.register(Arc::new(StubAdapter(Channel::Email)));
        assert_eq!(registry.len(), 1);
    }
}
