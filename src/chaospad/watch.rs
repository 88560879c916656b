//! Observable values.
//!
//! A [`Watched`] value notifies its subscribers when it is set to something
//! different from what it holds. The panel uses one for the search field and
//! reacts to the returned change flag by refetching.

use std::fmt;

type Subscriber<T> = Box<dyn FnMut(&T)>;

pub struct Watched<T> {
    value: T,
    subscribers: Vec<Subscriber<T>>,
}

impl<T: PartialEq> Watched<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Register a callback run after every change.
    pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// Store `value`. Returns `true` and notifies subscribers only if it differs.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        for subscriber in &mut self.subscribers {
            subscriber(&self.value);
        }
        true
    }
}

impl<T: PartialEq + Default> Default for Watched<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Watched<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watched")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn set_reports_changes_only() {
        let mut watched = Watched::new(String::new());
        assert!(watched.set("a".to_string()));
        assert!(!watched.set("a".to_string()));
        assert_eq!(watched.get(), "a");
    }

    #[test]
    fn subscribers_see_each_new_value() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut watched = Watched::new(0);
        watched.subscribe(move |v| sink.borrow_mut().push(*v));
        watched.set(1);
        watched.set(1);
        watched.set(2);

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }
}
