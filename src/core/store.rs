//! # Navigation Store
//!
//! Explicit shared state for one navigation tree instance: the active item,
//! the focused node, and a registry of focus handles. Every node receives a
//! [`NavStore`] handle instead of reaching for implicit ambient state.
//!
//! ```text
//! NavStore (Rc handle, cheap to clone)
//! ├── instance: Uuid                         // log correlation
//! ├── active: Option<ItemKey>                // last write wins
//! ├── focused: Option<FocusKey>
//! ├── focus_handles: HashMap<FocusKey, FocusHandle>
//! └── listeners: Vec<(id, Listener)>         // detached by Subscription drop
//! ```
//!
//! The store is single-threaded (`Rc<RefCell<_>>`). Listeners are called
//! after the internal borrow is released, so a listener may read the store
//! or even write to it again.

use log::{debug, trace};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use uuid::Uuid;

use crate::core::nav::{FocusKey, ItemKey};

/// Change notifications delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ActiveChanged(Option<ItemKey>),
    FocusChanged(FocusKey),
}

type Listener = Rc<dyn Fn(&StoreEvent)>;

/// Opaque callback able to move input focus to one rendered node.
#[derive(Clone)]
pub struct FocusHandle(Rc<dyn Fn(&FocusKey)>);

impl FocusHandle {
    pub fn new(callback: impl Fn(&FocusKey) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// A handle that only records focus in the store.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }
}

impl fmt::Debug for FocusHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FocusHandle(..)")
    }
}

struct StoreInner {
    instance: Uuid,
    active: Option<ItemKey>,
    focused: Option<FocusKey>,
    focus_handles: HashMap<FocusKey, FocusHandle>,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

#[derive(Clone)]
pub struct NavStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl Default for NavStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NavStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("NavStore")
            .field("instance", &inner.instance)
            .field("active", &inner.active)
            .field("focused", &inner.focused)
            .field("focus_handles", &inner.focus_handles.len())
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl NavStore {
    pub fn new() -> Self {
        let instance = Uuid::new_v4();
        debug!("NavStore {} created", instance);
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                instance,
                active: None,
                focused: None,
                focus_handles: HashMap::new(),
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.inner.borrow().instance
    }

    /// True when both handles point at the same store instance.
    pub fn same_instance(&self, other: &NavStore) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ------------------------------------------------------------------
    // Active item
    // ------------------------------------------------------------------

    pub fn active(&self) -> Option<ItemKey> {
        self.inner.borrow().active.clone()
    }

    pub fn is_active(&self, key: &ItemKey) -> bool {
        self.inner.borrow().active.as_ref() == Some(key)
    }

    /// Set the active item. Returns `false` (and stays silent) when unchanged.
    pub fn set_active(&self, key: Option<ItemKey>) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.active == key {
                return false;
            }
            debug!(
                "NavStore {}: active {:?} -> {:?}",
                inner.instance,
                inner.active.as_ref().map(|k| k.to_string()),
                key.as_ref().map(|k| k.to_string())
            );
            inner.active = key.clone();
        }
        self.notify(&StoreEvent::ActiveChanged(key));
        true
    }

    // ------------------------------------------------------------------
    // Focus registry
    // ------------------------------------------------------------------

    pub fn register_focus(&self, key: FocusKey, handle: FocusHandle) {
        self.inner.borrow_mut().focus_handles.insert(key, handle);
    }

    pub fn unregister_focus(&self, key: &FocusKey) {
        let mut inner = self.inner.borrow_mut();
        inner.focus_handles.remove(key);
        if inner.focused.as_ref() == Some(key) {
            inner.focused = None;
        }
    }

    /// Drop every handle for which `keep` returns false.
    pub fn retain_focus(&self, keep: impl Fn(&FocusKey) -> bool) {
        let mut inner = self.inner.borrow_mut();
        inner.focus_handles.retain(|key, _| keep(key));
        if let Some(focused) = inner.focused.clone()
            && !inner.focus_handles.contains_key(&focused)
        {
            inner.focused = None;
        }
    }

    pub fn is_registered(&self, key: &FocusKey) -> bool {
        self.inner.borrow().focus_handles.contains_key(key)
    }

    pub fn focused(&self) -> Option<FocusKey> {
        self.inner.borrow().focused.clone()
    }

    /// Move focus through the registered handle. Unregistered keys are
    /// ignored and `false` is returned.
    pub fn focus(&self, key: &FocusKey) -> bool {
        let handle = {
            let mut inner = self.inner.borrow_mut();
            let Some(handle) = inner.focus_handles.get(key).cloned() else {
                trace!("NavStore {}: no focus handle for {}", inner.instance, key);
                return false;
            };
            if inner.focused.as_ref() == Some(key) {
                return true;
            }
            inner.focused = Some(key.clone());
            handle
        };
        (handle.0)(key);
        self.notify(&StoreEvent::FocusChanged(key.clone()));
        true
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Attach a listener. It stays attached until the returned guard drops.
    #[must_use = "dropping the Subscription detaches the listener"]
    pub fn subscribe(&self, listener: impl Fn(&StoreEvent) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        trace!("NavStore {}: listener {} attached", inner.instance, id);
        Subscription {
            store: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn notify(&self, event: &StoreEvent) {
        let listeners: Vec<Listener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

/// Guard returned by [`NavStore::subscribe`].
pub struct Subscription {
    store: Weak<RefCell<StoreInner>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            let mut inner = store.borrow_mut();
            inner.listeners.retain(|(id, _)| *id != self.id);
            trace!("NavStore {}: listener {} detached", inner.instance, self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::nav::NodePath;
    use std::cell::Cell;

    #[test]
    fn test_set_active_notifies_once_per_change() {
        let store = NavStore::new();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let _sub = store.subscribe(move |event| {
            if matches!(event, StoreEvent::ActiveChanged(_)) {
                seen.set(seen.get() + 1);
            }
        });

        let key = NodePath::from_indices([0, 1]);
        assert!(store.set_active(Some(key.clone())));
        assert!(!store.set_active(Some(key.clone())));
        assert!(store.is_active(&key));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let store = NavStore::new();
        store.set_active(Some(NodePath::from_indices([0, 0])));
        store.set_active(Some(NodePath::from_indices([1, 0])));
        assert_eq!(store.active(), Some(NodePath::from_indices([1, 0])));
    }

    #[test]
    fn test_dropping_subscription_detaches() {
        let store = NavStore::new();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let sub = store.subscribe(move |_| seen.set(seen.get() + 1));
        assert_eq!(store.listener_count(), 1);
        drop(sub);
        assert_eq!(store.listener_count(), 0);
        store.set_active(Some(NodePath::from_indices([0, 0])));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_listener_may_read_store() {
        let store = NavStore::new();
        let observed = Rc::new(RefCell::new(None));
        let sink = observed.clone();
        let reader = store.clone();
        let _sub = store.subscribe(move |_| *sink.borrow_mut() = reader.active());
        store.set_active(Some(NodePath::from_indices([2, 0])));
        assert_eq!(*observed.borrow(), Some(NodePath::from_indices([2, 0])));
    }

    #[test]
    fn test_instances_do_not_cross_talk() {
        let a = NavStore::new();
        let b = NavStore::new();
        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        let _sub = a.subscribe(move |_| seen.set(seen.get() + 1));
        b.set_active(Some(NodePath::from_indices([0, 0])));
        assert_eq!(hits.get(), 0);
        assert!(a.active().is_none());
        assert_ne!(a.instance_id(), b.instance_id());
        assert!(a.same_instance(&a.clone()));
        assert!(!a.same_instance(&b));
    }

    #[test]
    fn test_focus_requires_registration() {
        let store = NavStore::new();
        let key = FocusKey::Section(1);
        assert!(!store.focus(&key));

        let moved = Rc::new(Cell::new(false));
        let flag = moved.clone();
        store.register_focus(key.clone(), FocusHandle::new(move |_| flag.set(true)));
        assert!(store.focus(&key));
        assert!(moved.get());
        assert_eq!(store.focused(), Some(key.clone()));

        store.unregister_focus(&key);
        assert!(store.focused().is_none());
    }

    #[test]
    fn test_retain_focus_clears_hidden_focus() {
        let store = NavStore::new();
        let hidden = FocusKey::Item(NodePath::from_indices([0, 0, 1]));
        store.register_focus(hidden.clone(), FocusHandle::noop());
        store.register_focus(FocusKey::Section(0), FocusHandle::noop());
        store.focus(&hidden);
        store.retain_focus(|k| matches!(k, FocusKey::Section(_)));
        assert!(!store.is_registered(&hidden));
        assert!(store.focused().is_none());
        assert!(store.is_registered(&FocusKey::Section(0)));
    }
}
