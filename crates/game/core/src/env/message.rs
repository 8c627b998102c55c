use std::collections::VecDeque;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::state::{ActionId, EntityId, MessageId};

/// Maximum number of filter parameters carried by a message.
pub const MAX_MESSAGE_PARAMS: usize = 4;

/// A message published on the bus.
///
/// `params` are positional filter values (typically entity ids); listeners
/// match on a prefix of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub params: ArrayVec<u64, MAX_MESSAGE_PARAMS>,
    pub sender: EntityId,
}

impl Message {
    pub fn new(id: MessageId) -> Self {
        Self {
            id,
            params: ArrayVec::new(),
            sender: EntityId::NONE,
        }
    }

    /// Appends a filter parameter (builder pattern).
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_MESSAGE_PARAMS`] parameters are attached.
    #[must_use]
    pub fn with_param(mut self, value: u64) -> Self {
        self.params.push(value);
        self
    }

    #[must_use]
    pub fn with_sender(mut self, sender: EntityId) -> Self {
        self.sender = sender;
        self
    }

    /// Parameter at `index`, if present.
    pub fn param(&self, index: usize) -> Option<u64> {
        self.params.get(index).copied()
    }
}

/// Subscription key: a message id plus optional leading filter parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageConfig {
    pub id: MessageId,
    pub filters: ArrayVec<u64, MAX_MESSAGE_PARAMS>,
}

impl MessageConfig {
    pub fn new(id: MessageId) -> Self {
        Self {
            id,
            filters: ArrayVec::new(),
        }
    }

    /// Adds a filter that must equal the message parameter at the same position.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_MESSAGE_PARAMS`] filters are attached.
    #[must_use]
    pub fn with_filter(mut self, value: u64) -> Self {
        self.filters.push(value);
        self
    }

    /// Returns true if `message` has this id and starts with these filters.
    pub fn matches(&self, message: &Message) -> bool {
        self.id == message.id
            && self.filters.len() <= message.params.len()
            && self
                .filters
                .iter()
                .zip(message.params.iter())
                .all(|(filter, param)| filter == param)
    }
}

/// The receiving end of a subscription: one action in one entity's plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId {
    pub entity: EntityId,
    pub action: ActionId,
}

/// Publish/subscribe bus used by actions.
///
/// Actions register proxies in `on_startup` and unregister them in
/// `on_shutdown`. Publishing never delivers synchronously; messages are
/// queued and handed out by the owner of the bus between ticks.
pub trait MessageBus {
    /// Subscribes `listener` to messages matching `config`.
    fn register(&mut self, config: MessageConfig, listener: ListenerId);

    /// Removes every subscription of `listener`. Returns the number removed.
    fn unregister(&mut self, listener: ListenerId) -> usize;

    /// Queues `message` for delivery.
    fn publish(&mut self, message: Message);
}

/// A queued message together with the listeners it matched at drain time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub message: Message,
    pub listeners: Vec<ListenerId>,
}

/// In-memory message bus with queued delivery.
#[derive(Debug, Default)]
pub struct MessageHub {
    subscriptions: Vec<(MessageConfig, ListenerId)>,
    queue: VecDeque<Message>,
}

impl MessageHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every subscription held by actions of `entity`.
    pub fn unregister_entity(&mut self, entity: EntityId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|(_, listener)| listener.entity != entity);
        before - self.subscriptions.len()
    }

    /// Drains the queue, pairing each message with its matching listeners in
    /// registration order. Messages published while the deliveries are being
    /// processed stay queued for the next drain.
    pub fn drain_deliveries(&mut self) -> Vec<Delivery> {
        let messages: Vec<Message> = self.queue.drain(..).collect();
        messages
            .into_iter()
            .map(|message| {
                let listeners = self
                    .subscriptions
                    .iter()
                    .filter(|(config, _)| config.matches(&message))
                    .map(|(_, listener)| *listener)
                    .collect();
                Delivery { message, listeners }
            })
            .collect()
    }

    /// Number of queued messages.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of active subscriptions.
    pub fn subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns true if `listener` has at least one subscription.
    pub fn is_registered(&self, listener: ListenerId) -> bool {
        self.subscriptions.iter().any(|(_, l)| *l == listener)
    }
}

impl MessageBus for MessageHub {
    fn register(&mut self, config: MessageConfig, listener: ListenerId) {
        let exists = self
            .subscriptions
            .iter()
            .any(|(c, l)| *l == listener && *c == config);
        if !exists {
            self.subscriptions.push((config, listener));
        }
    }

    fn unregister(&mut self, listener: ListenerId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|(_, l)| *l != listener);
        before - self.subscriptions.len()
    }

    fn publish(&mut self, message: Message) {
        tracing::trace!(
            target: "game_core::message",
            id = message.id.0,
            params = ?message.params,
            "message queued"
        );
        self.queue.push_back(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESTROYED: MessageId = MessageId::from_name("entity_destroyed");
    const FINISHED: MessageId = MessageId::from_name("work_finished");

    fn listener(entity: u64, action: u32) -> ListenerId {
        ListenerId {
            entity: EntityId(entity),
            action: ActionId(action),
        }
    }

    #[test]
    fn filters_match_message_prefix() {
        let config = MessageConfig::new(DESTROYED).with_filter(7);

        assert!(config.matches(&Message::new(DESTROYED).with_param(7)));
        assert!(config.matches(&Message::new(DESTROYED).with_param(7).with_param(1)));
        assert!(!config.matches(&Message::new(DESTROYED).with_param(8)));
        assert!(!config.matches(&Message::new(DESTROYED)));
        assert!(!config.matches(&Message::new(FINISHED).with_param(7)));
    }

    #[test]
    fn unfiltered_config_matches_every_message_with_id() {
        let config = MessageConfig::new(FINISHED);
        assert!(config.matches(&Message::new(FINISHED)));
        assert!(config.matches(&Message::new(FINISHED).with_param(3)));
    }

    #[test]
    fn deliveries_follow_registration_order() {
        let mut hub = MessageHub::new();
        hub.register(MessageConfig::new(DESTROYED).with_filter(7), listener(2, 0));
        hub.register(MessageConfig::new(DESTROYED), listener(1, 4));
        hub.register(MessageConfig::new(FINISHED), listener(3, 1));

        hub.publish(Message::new(DESTROYED).with_param(7));
        let deliveries = hub.drain_deliveries();

        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].listeners, vec![listener(2, 0), listener(1, 4)]);
        assert_eq!(hub.pending(), 0);
    }

    #[test]
    fn duplicate_registration_is_ignored_and_unregister_removes_all() {
        let mut hub = MessageHub::new();
        let l = listener(1, 0);
        hub.register(MessageConfig::new(DESTROYED), l);
        hub.register(MessageConfig::new(DESTROYED), l);
        hub.register(MessageConfig::new(FINISHED), l);

        assert_eq!(hub.subscriptions(), 2);
        assert_eq!(hub.unregister(l), 2);
        assert!(!hub.is_registered(l));
    }

    #[test]
    fn unregister_entity_drops_all_its_actions() {
        let mut hub = MessageHub::new();
        hub.register(MessageConfig::new(DESTROYED), listener(1, 0));
        hub.register(MessageConfig::new(FINISHED), listener(1, 1));
        hub.register(MessageConfig::new(FINISHED), listener(2, 0));

        assert_eq!(hub.unregister_entity(EntityId(1)), 2);
        assert_eq!(hub.subscriptions(), 1);
    }
}
