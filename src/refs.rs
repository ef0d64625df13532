#![deny(missing_docs)]

//! # Reference Slots
//!
//! `Ref<T>` is the slot type used everywhere the document model may carry a
//! `$ref` indirection instead of (or in addition to) an inline value.
//!
//! A `Ref<T>` is a cheap-clone handle onto a shared node: cloning it shares
//! the underlying slot, so two occurrences of the same component observe each
//! other's resolution. Resolved values are stored behind `Rc<T>`, which lets
//! flattening share the target value instead of deep-copying it and makes
//! cyclic resolved graphs representable.

use serde::{Deserialize, Deserializer};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stable per-node identity assigned at construction.
///
/// The cycle guard keys on this instead of raw pointer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        NodeId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

struct RefNode<T> {
    id: NodeId,
    reference: Option<String>,
    value: Option<Rc<T>>,
}

/// A slot holding an unresolved reference string, a resolved concrete value,
/// or both during the transient resolution process.
pub struct Ref<T> {
    node: Rc<RefCell<RefNode<T>>>,
}

impl<T> Ref<T> {
    fn from_node(node: RefNode<T>) -> Self {
        Ref {
            node: Rc::new(RefCell::new(node)),
        }
    }

    /// Creates a resolved slot holding `value`.
    pub fn from_value(value: T) -> Self {
        Self::from_node(RefNode {
            id: NodeId::next(),
            reference: None,
            value: Some(Rc::new(value)),
        })
    }

    /// Creates an unresolved slot carrying `reference`.
    pub fn from_reference(reference: impl Into<String>) -> Self {
        Self::from_node(RefNode {
            id: NodeId::next(),
            reference: Some(reference.into()),
            value: None,
        })
    }

    /// Returns the reference string, if a non-empty one is present.
    pub fn reference(&self) -> Option<String> {
        self.node
            .borrow()
            .reference
            .clone()
            .filter(|r| !r.is_empty())
    }

    /// Returns a handle to the resolved value, if present.
    pub fn value(&self) -> Option<Rc<T>> {
        self.node.borrow().value.clone()
    }

    /// Whether this slot already carries a concrete value.
    pub fn is_resolved(&self) -> bool {
        self.node.borrow().value.is_some()
    }

    /// The stable identity of the underlying node.
    pub fn node_id(&self) -> NodeId {
        self.node.borrow().id
    }

    /// Stores `value` in this slot, leaving the reference string intact.
    pub(crate) fn set_value(&self, value: Option<Rc<T>>) {
        self.node.borrow_mut().value = value;
    }
}

/// Cloning shares the node; both handles observe the same slot.
impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Ref {
            node: Rc::clone(&self.node),
        }
    }
}

/// Shallow by construction: never descends into the value, because the
/// resolved graph may be cyclic.
impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node.borrow();
        f.debug_struct("Ref")
            .field("reference", &node.reference)
            .field(
                "value",
                &if node.value.is_some() {
                    "<resolved>"
                } else {
                    "<unresolved>"
                },
            )
            .finish()
    }
}

impl<T> Default for Ref<T>
where
    T: Default,
{
    fn default() -> Self {
        Self::from_value(T::default())
    }
}

/// Accepts either `{"$ref": "..."}` or an inline value of type `T`.
impl<'de, T> Deserialize<'de> for Ref<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            Reference {
                #[serde(rename = "$ref")]
                reference: String,
            },
            Value(T),
        }

        match Repr::<T>::deserialize(deserializer)? {
            Repr::Reference { reference } => Ok(Ref::from_reference(reference)),
            Repr::Value(value) => Ok(Ref::from_value(value)),
        }
    }
}
