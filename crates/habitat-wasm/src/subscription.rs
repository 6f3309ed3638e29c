//! イベント購読管理モジュール
//!
//! Viewerイベントの購読を管理し、種別フィルタに合うコールバックを返す

use std::collections::{BTreeMap, BTreeSet};

/// 購読情報
pub struct EventSubscription<C> {
    pub callback: C,
    /// `None`なら全イベント
    pub kinds: Option<BTreeSet<String>>,
}

impl<C> EventSubscription<C> {
    pub fn wants(&self, kind: &str) -> bool {
        self.kinds.as_ref().is_none_or(|kinds| kinds.contains(kind))
    }
}

/// 購読マネージャー
pub struct SubscriptionManager<C> {
    subscriptions: BTreeMap<u32, EventSubscription<C>>,
    next_id: u32,
}

impl<C: Clone> SubscriptionManager<C> {
    pub fn new() -> Self {
        Self {
            subscriptions: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn subscribe(&mut self, callback: C, kinds: Option<BTreeSet<String>>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.subscriptions
            .insert(id, EventSubscription { callback, kinds });
        id
    }

    pub fn unsubscribe(&mut self, id: u32) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    /// `kind`を受け取る購読のコールバック（購読順）
    /// 呼び出し中の再入に備えて複製して返す
    pub fn callbacks_for(&self, kind: &str) -> Vec<C> {
        self.subscriptions
            .values()
            .filter(|s| s.wants(kind))
            .map(|s| s.callback.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl<C: Clone> Default for SubscriptionManager<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(names: &[&str]) -> Option<BTreeSet<String>> {
        Some(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut subs = SubscriptionManager::new();
        let a = subs.subscribe("a", None);
        let b = subs.subscribe("b", None);
        assert!(a < b);
        assert_eq!(subs.callbacks_for("selectionChanged"), vec!["a", "b"]);
    }

    #[test]
    fn test_kind_filter() {
        let mut subs = SubscriptionManager::new();
        subs.subscribe("panel", kinds(&["selectionChanged", "transformChanged"]));
        subs.subscribe("status", kinds(&["moduleFailed"]));

        assert_eq!(subs.callbacks_for("transformChanged"), vec!["panel"]);
        assert_eq!(subs.callbacks_for("moduleFailed"), vec!["status"]);
        assert!(subs.callbacks_for("sceneMounted").is_empty());
    }

    #[test]
    fn test_unsubscribe() {
        let mut subs = SubscriptionManager::new();
        let id = subs.subscribe("a", None);
        assert!(subs.unsubscribe(id));
        assert!(!subs.unsubscribe(id));
        assert!(subs.is_empty());
    }
}
