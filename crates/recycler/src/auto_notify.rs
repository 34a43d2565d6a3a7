//! Observed list assignment
//!
//! [`AutoNotify`] owns the list currently on display. Assigning a new list
//! diffs it against the held one and replays the edit script against the
//! display, so callers only ever hand over complete snapshots.

use crate::diff::{diff, DiffItem, ListUpdateCallback};

/// Held list that notifies its observer of edits on assignment
#[derive(Debug, Clone, PartialEq)]
pub struct AutoNotify<T> {
    items: Vec<T>,
}

impl<T> Default for AutoNotify<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: DiffItem> AutoNotify<T> {
    /// Start from `initial` without notifying anyone
    pub fn new(initial: Vec<T>) -> Self {
        Self { items: initial }
    }

    /// Currently held list
    pub fn get(&self) -> &[T] {
        &self.items
    }

    /// Replace the held list and notify `observer` of the differences
    ///
    /// The new list is stored before the script is replayed, so the
    /// observer can read it from its notifications.
    pub fn set<O: ListUpdateCallback + ?Sized>(&mut self, items: Vec<T>, observer: &mut O) {
        let result = diff(&self.items, &items);
        self.items = items;

        tracing::debug!(
            len = self.items.len(),
            ops = result.len(),
            "Dispatching list updates"
        );
        result.dispatch_updates_to(observer);
    }

    /// Number of held items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the held list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Give back the held list
    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::{mock, predicate::eq, Sequence};

    mock! {
        Observer {}

        impl ListUpdateCallback for Observer {
            fn on_inserted(&mut self, position: usize, count: usize);
            fn on_removed(&mut self, position: usize, count: usize);
            fn on_moved(&mut self, from: usize, to: usize);
            fn on_changed(&mut self, position: usize, count: usize);
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Contact {
        id: u64,
        name: &'static str,
    }

    impl DiffItem for Contact {
        fn is_same_item(&self, other: &Self) -> bool {
            self.id == other.id
        }

        fn has_same_content(&self, other: &Self) -> bool {
            self.name == other.name
        }
    }

    fn contact(id: u64, name: &'static str) -> Contact {
        Contact { id, name }
    }

    #[test]
    fn test_set_notifies_in_order() {
        let mut items = AutoNotify::new(vec![contact(1, "Ada"), contact(2, "Brian")]);
        let mut observer = MockObserver::new();
        let mut seq = Sequence::new();

        observer
            .expect_on_removed()
            .with(eq(1), eq(1))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        observer
            .expect_on_inserted()
            .with(eq(1), eq(1))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        observer
            .expect_on_changed()
            .with(eq(0), eq(1))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        observer.expect_on_moved().never();

        items.set(vec![contact(1, "Ada L."), contact(3, "Chloé")], &mut observer);

        assert_eq!(items.get(), &[contact(1, "Ada L."), contact(3, "Chloé")]);
    }

    #[test]
    fn test_reassigning_same_list_is_silent() {
        let initial = vec![contact(1, "Ada"), contact(2, "Brian")];
        let mut items = AutoNotify::new(initial.clone());
        let mut observer = MockObserver::new();

        observer.expect_on_inserted().never();
        observer.expect_on_removed().never();
        observer.expect_on_moved().never();
        observer.expect_on_changed().never();

        items.set(initial.clone(), &mut observer);
        assert_eq!(items.get(), initial.as_slice());
    }

    #[test]
    fn test_get_does_not_recompute() {
        let items = AutoNotify::new(vec![contact(5, "Eve")]);

        assert_eq!(items.len(), 1);
        assert!(!items.is_empty());
        assert_eq!(items.get()[0].name, "Eve");
        assert_eq!(items.into_inner(), vec![contact(5, "Eve")]);
    }

    #[test]
    fn test_default_then_fill() {
        let mut items: AutoNotify<Contact> = AutoNotify::default();
        let mut recorded = Vec::new();

        items.set(vec![contact(1, "Ada"), contact(2, "Brian")], &mut recorded);

        assert_eq!(
            recorded,
            vec![crate::diff::EditOp::Insert { position: 0, count: 2 }]
        );
        assert_eq!(items.len(), 2);
    }
}
