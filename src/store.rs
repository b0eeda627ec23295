use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use log::debug;

use crate::color::{ColorInput, Rgb, hex_to_vec3, vec3_to_hex};
use crate::math::Point2D;
use crate::tween::{Interpolate, Transition, TransitionId, Tween};
use crate::url_state::UrlStateAdapter;

/// Canonical query-string encoding of a store value.
pub trait QueryValue {
    fn to_query(&self) -> String;
}

impl QueryValue for f64 {
    fn to_query(&self) -> String {
        self.to_string()
    }
}

impl QueryValue for Point2D {
    fn to_query(&self) -> String {
        format!("{},{}", self.x, self.y)
    }
}

impl QueryValue for Rgb {
    fn to_query(&self) -> String {
        vec3_to_hex(*self)
    }
}

/// How long `set` and `reset` take to reach their target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StorePolicy {
    pub set: Transition,
    pub reset: Transition,
}

impl StorePolicy {
    pub fn new(set: Transition, reset: Transition) -> Self {
        StorePolicy { set, reset }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct UrlBinding {
    key: String,
    adapter: Rc<dyn UrlStateAdapter>,
}

type Observer<T> = Box<dyn FnMut(&T)>;

/// Reactive, animatable cell for one view parameter.
///
/// Observers see every interpolated value while a transition runs and the
/// target once it settles. With a URL binding, `set` mirrors the target into
/// the query string at commit time; `reset` writes the default only when its
/// own transition settles, and a later `set`/`reset` cancels that write.
pub struct ParameterStore<T> {
    tween: Tween<T>,
    default: T,
    policy: StorePolicy,
    observers: Vec<(SubscriptionId, Observer<T>)>,
    next_subscription: u64,
    url: Option<UrlBinding>,
    pending_reset: Option<TransitionId>,
}

impl<T: Interpolate + QueryValue + 'static> ParameterStore<T> {
    pub fn new(default: T, policy: StorePolicy) -> Self {
        ParameterStore {
            tween: Tween::new(default.clone()),
            default,
            policy,
            observers: Vec::new(),
            next_subscription: 0,
            url: None,
            pending_reset: None,
        }
    }

    pub fn with_url(mut self, key: impl Into<String>, adapter: Rc<dyn UrlStateAdapter>) -> Self {
        self.url = Some(UrlBinding { key: key.into(), adapter });
        self
    }

    /// Currently emitted value (interpolated while animating).
    pub fn value(&self) -> &T {
        self.tween.value()
    }

    pub fn target(&self) -> &T {
        self.tween.target()
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn policy(&self) -> StorePolicy {
        self.policy
    }

    pub fn url_key(&self) -> Option<&str> {
        self.url.as_ref().map(|b| b.key.as_str())
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_animating()
    }

    pub fn has_pending_reset(&self) -> bool {
        self.pending_reset.is_some()
    }

    /// Registers an observer and immediately delivers the current value.
    pub fn subscribe(&mut self, mut observer: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        observer(self.tween.value());
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    pub fn set(&mut self, value: T) -> TransitionId {
        let transition = self.policy.set;
        self.commit_and_write(value, transition)
    }

    /// Like `set`, but always instant.
    pub fn jump(&mut self, value: T) -> TransitionId {
        self.commit_and_write(value, Transition::INSTANT)
    }

    pub fn reset(&mut self) -> TransitionId {
        let transition = self.policy.reset;
        let id = self.commit(self.default.clone(), transition);
        if transition.duration.is_zero() {
            self.write_url(&self.default);
        } else {
            self.pending_reset = Some(id);
        }
        id
    }

    /// Advances the running transition, notifying observers. Returns the id
    /// of a transition that settled during this tick.
    pub fn tick(&mut self, dt: Duration) -> Option<TransitionId> {
        let step = self.tween.advance(dt)?;
        self.notify(&step.value);
        let settled = step.settled?;
        if self.pending_reset == Some(settled) {
            self.pending_reset = None;
            self.write_url(&step.value);
        }
        Some(settled)
    }

    fn commit_and_write(&mut self, value: T, transition: Transition) -> TransitionId {
        let id = self.commit(value.clone(), transition);
        self.write_url(&value);
        id
    }

    fn commit(&mut self, value: T, transition: Transition) -> TransitionId {
        if let Some(stale) = self.pending_reset.take() {
            debug!("{}: reset {:?} superseded before settling", self.label(), stale);
        }
        let id = self.tween.retarget(value, transition);
        if !self.tween.is_animating() {
            let value = self.tween.value().clone();
            self.notify(&value);
        }
        id
    }

    fn notify(&mut self, value: &T) {
        for (_, observer) in self.observers.iter_mut() {
            observer(value);
        }
    }

    fn write_url(&self, value: &T) {
        if let Some(binding) = &self.url {
            let encoded = value.to_query();
            debug!("url {}={}", binding.key, encoded);
            binding.adapter.write(&binding.key, &encoded);
        }
    }

    fn label(&self) -> &str {
        self.url_key().unwrap_or("store")
    }
}

impl ParameterStore<Rgb> {
    pub fn from_color(default: impl Into<ColorInput>, policy: StorePolicy) -> Self {
        ParameterStore::new(default.into().to_rgb(), policy)
    }

    /// Sets from `#RRGGBB`. Malformed input is not rejected here and yields
    /// NaN channels; validate with `parse_hex_color` first when that matters.
    pub fn set_hex(&mut self, hex: &str) -> TransitionId {
        self.set(hex_to_vec3(hex))
    }

    pub fn hex(&self) -> String {
        vec3_to_hex(*self.value())
    }
}

impl<T: fmt::Debug> fmt::Debug for ParameterStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterStore")
            .field("tween", &self.tween)
            .field("default", &self.default)
            .field("policy", &self.policy)
            .field("observers", &self.observers.len())
            .field("url_key", &self.url.as_ref().map(|b| &b.key))
            .field("pending_reset", &self.pending_reset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::url_state::MemoryUrl;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn policy() -> StorePolicy {
        StorePolicy::new(Transition::INSTANT, Transition::millis(100))
    }

    fn bound(default: f64) -> (ParameterStore<f64>, Rc<MemoryUrl>) {
        let url = Rc::new(MemoryUrl::new());
        let store = ParameterStore::new(default, policy()).with_url("scale", url.clone());
        (store, url)
    }

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(&T) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |v: &T| sink.borrow_mut().push(v.clone()))
    }

    #[test]
    fn subscribe_delivers_current_value_then_updates() {
        let (mut store, _) = bound(1.0);
        let (seen, observer) = recorder::<f64>();
        store.subscribe(observer);
        store.set(3.0);
        assert_eq!(*seen.borrow(), vec![1.0, 3.0]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let (mut store, _) = bound(1.0);
        let (seen, observer) = recorder::<f64>();
        let id = store.subscribe(observer);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set(2.0);
        assert_eq!(*seen.borrow(), vec![1.0]);
    }

    #[test]
    fn set_writes_url_synchronously() {
        let (mut store, url) = bound(1.0);
        store.set(2.5);
        assert_eq!(url.get("scale").as_deref(), Some("2.5"));
    }

    #[test]
    fn animated_set_writes_target_before_settling() {
        let url = Rc::new(MemoryUrl::new());
        let mut store = ParameterStore::new(Point2D::ORIGIN, StorePolicy::new(Transition::millis(500), Transition::millis(500)))
            .with_url("center", url.clone());
        store.set(Point2D::new(1.0, -1.0));
        assert!(store.is_animating());
        assert_eq!(url.get("center").as_deref(), Some("1,-1"));
        assert_eq!(*store.value(), Point2D::ORIGIN);
    }

    #[test]
    fn reset_writes_default_once_after_settling() {
        let (mut store, url) = bound(1.0);
        store.set(4.0);
        url.clear_writes();

        let (seen, observer) = recorder::<f64>();
        store.subscribe(observer);
        store.reset();
        assert!(url.writes().is_empty());

        for _ in 0..10 {
            store.tick(ms(16));
        }
        let seen = seen.borrow();
        assert_eq!(seen.first(), Some(&4.0));
        assert_eq!(seen.last(), Some(&1.0));
        assert!(seen.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(url.writes_for("scale"), vec!["1".to_string()]);
        assert!(!store.has_pending_reset());
    }

    #[test]
    fn set_during_reset_cancels_pending_write() {
        let (mut store, url) = bound(1.0);
        store.set(4.0);
        store.reset();
        store.tick(ms(30));
        store.set(7.0);
        for _ in 0..20 {
            store.tick(ms(16));
        }
        assert_eq!(url.writes_for("scale"), vec!["4".to_string(), "7".to_string()]);
        assert_eq!(*store.value(), 7.0);
    }

    #[test]
    fn second_reset_replaces_first() {
        let (mut store, url) = bound(1.0);
        store.set(4.0);
        let first = store.reset();
        store.tick(ms(50));
        let second = store.reset();
        assert_ne!(first, second);
        let mut settled = Vec::new();
        for _ in 0..10 {
            settled.extend(store.tick(ms(20)));
        }
        assert_eq!(settled, vec![second]);
        assert_eq!(url.writes_for("scale"), vec!["4".to_string(), "1".to_string()]);
    }

    #[test]
    fn instant_reset_writes_immediately() {
        let url = Rc::new(MemoryUrl::new());
        let mut store = ParameterStore::new(50.0, StorePolicy::new(Transition::INSTANT, Transition::INSTANT))
            .with_url("iterations", url.clone());
        store.set(80.0);
        store.reset();
        assert_eq!(*store.value(), 50.0);
        assert_eq!(url.writes_for("iterations"), vec!["80".to_string(), "50".to_string()]);
    }

    #[test]
    fn color_store_accepts_hex_and_restores_vector_default() {
        let mut store = ParameterStore::<Rgb>::from_color([0.1, 0.2, 0.3], policy());
        store.set_hex("#ffffff");
        assert_eq!(*store.value(), Rgb::new(1.0, 1.0, 1.0));
        store.reset();
        store.tick(ms(200));
        assert_eq!(*store.value(), Rgb::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn unbound_store_still_animates() {
        let mut store = ParameterStore::new(0.0, StorePolicy::new(Transition::millis(100), Transition::millis(100)));
        store.set(1.0);
        assert_eq!(store.tick(ms(50)), None);
        assert!(store.tick(ms(50)).is_some());
        assert_eq!(*store.value(), 1.0);
    }
}
