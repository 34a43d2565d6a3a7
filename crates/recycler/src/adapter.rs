//! Holder and adapter scaffolding for list views
//!
//! A [`RecyclerHolder`] is one reusable row slot: it remembers the value it
//! was last bound to and forwards binding to its view. A
//! [`RecyclerAdapter`] owns the displayed items through [`AutoNotify`] and
//! forwards edit notifications to the list view it drives.

use crate::auto_notify::AutoNotify;
use crate::diff::{DiffItem, ListUpdateCallback};

/// A row view that can render a value
pub trait Bind<T> {
    /// Render `value`, or clear the row when `None`
    fn on_bind(&mut self, value: Option<&T>);
}

/// Reusable row slot
#[derive(Debug)]
pub struct RecyclerHolder<T, V> {
    view: V,
    value: Option<T>,
}

impl<T, V: Bind<T>> RecyclerHolder<T, V> {
    /// Wrap a row view
    pub fn new(view: V) -> Self {
        Self { view, value: None }
    }

    /// Row view
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Value this holder is currently bound to
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Remember `value` and render it
    pub fn bind(&mut self, value: Option<T>) {
        self.value = value;
        self.view.on_bind(self.value.as_ref());
    }
}

/// Owner of the displayed items of a list view
pub struct RecyclerAdapter<T, O> {
    items: AutoNotify<T>,
    observer: O,
}

impl<T, O> RecyclerAdapter<T, O>
where
    T: DiffItem + Clone,
    O: ListUpdateCallback,
{
    /// Empty adapter notifying `observer`
    pub fn new(observer: O) -> Self {
        Self::with_items(Vec::new(), observer)
    }

    /// Adapter starting from `items`; the initial list is not notified
    pub fn with_items(items: Vec<T>, observer: O) -> Self {
        Self { items: AutoNotify::new(items), observer }
    }

    /// Displayed items
    pub fn items(&self) -> &[T] {
        self.items.get()
    }

    /// Replace the displayed items, notifying the list view of the edits
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items.set(items, &mut self.observer);
    }

    /// Number of displayed items
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Bind `holder` to the item at `position`, or clear it when out of range
    pub fn on_bind_view_holder<V: Bind<T>>(
        &self,
        holder: &mut RecyclerHolder<T, V>,
        position: usize,
    ) {
        holder.bind(self.items().get(position).cloned());
    }

    /// List view receiving notifications
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the list view
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}
