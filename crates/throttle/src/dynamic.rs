//! Type-erased throttle for callbacks bound at runtime
//!
//! [`AnyThrottle`] carries items as `Box<dyn Any + Send>` and checks each one
//! against the element type fixed at construction, so a mismatched item is
//! rejected at the `add` call site instead of surfacing at delivery time.

use crate::config::ThrottleConfig;
use crate::dispatch::ThreadDispatcher;
use crate::error::ThrottleError;
use crate::handle::GroupThrottle;
use crate::Result;
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;
use std::time::Duration;

/// An item with its concrete type erased
pub type ErasedItem = Box<dyn Any + Send>;

/// A callback receiving erased items of a single element type
pub type ErasedCallback = Arc<dyn Fn(Vec<ErasedItem>) + Send + Sync>;

/// Concrete type every item of a dynamic throttle must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementType {
    id: TypeId,
    name: &'static str,
}

impl ElementType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn matches(&self, value: &dyn Any) -> bool {
        value.type_id() == self.id
    }
}

/// Kind of a single callback parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A homogeneous sequence of `ElementType` values
    Sequence(ElementType),
    /// A lone value
    Single(ElementType),
}

/// Runtime description of the value a dynamic binding wants to call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackShape {
    /// Not invocable at all
    Value,
    /// Invocable with these parameters
    Function(Vec<ParamKind>),
}

impl CallbackShape {
    /// Element type of the batch the callback accepts
    ///
    /// The callback must take exactly one parameter, and that parameter must
    /// be a sequence.
    pub fn element_type(&self) -> Result<ElementType> {
        match self {
            CallbackShape::Value => Err(ThrottleError::NotCallable),
            CallbackShape::Function(params) if params.len() != 1 => {
                Err(ThrottleError::ParamCount(params.len()))
            }
            CallbackShape::Function(params) => match params[0] {
                ParamKind::Sequence(element) => Ok(element),
                ParamKind::Single(_) => Err(ThrottleError::ParamType),
            },
        }
    }
}

/// [`GroupThrottle`] over erased items with per-add type validation
#[derive(Debug)]
pub struct AnyThrottle {
    inner: GroupThrottle<ErasedItem>,
    element: ElementType,
}

impl AnyThrottle {
    /// Bind a typed callback; items added later must be `T`
    pub fn new<T, F>(callback: F, delay: Duration) -> Result<Self>
    where
        T: Any + Send,
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        let erased: ErasedCallback = Arc::new(move |items: Vec<ErasedItem>| {
            // Every item was checked against T on add
            let typed = items
                .into_iter()
                .filter_map(|item| item.downcast::<T>().ok())
                .map(|item| *item)
                .collect();
            callback(typed);
        });

        Ok(Self {
            inner: GroupThrottle::with_dispatcher(ThreadDispatcher::from_callback(erased), delay)?,
            element: ElementType::of::<T>(),
        })
    }

    /// Bind an erased callback described by `shape`
    ///
    /// Fails with [`ThrottleError::NotCallable`], [`ThrottleError::ParamCount`]
    /// or [`ThrottleError::ParamType`] when the shape cannot accept a batch.
    pub fn from_shape(
        shape: &CallbackShape,
        callback: ErasedCallback,
        config: &ThrottleConfig,
    ) -> Result<Self> {
        let element = shape.element_type()?;
        Ok(Self {
            inner: GroupThrottle::from_shared(callback, config)?,
            element,
        })
    }

    /// Queue `item` under `key` if it has the bound element type
    ///
    /// A mismatched item fails with [`ThrottleError::InvalidType`] and leaves
    /// the pending set untouched.
    pub fn add<V: Any + Send>(&self, key: impl Into<String>, item: V) -> Result<()> {
        if TypeId::of::<V>() != self.element.id {
            return Err(ThrottleError::InvalidType {
                expected: self.element.name,
                found: type_name::<V>(),
            });
        }
        self.inner.add(key, Box::new(item))
    }

    /// Queue an already erased item if its concrete type matches
    pub fn add_erased(&self, key: impl Into<String>, item: ErasedItem) -> Result<()> {
        if !self.element.matches(item.as_ref()) {
            return Err(ThrottleError::InvalidType {
                expected: self.element.name,
                found: "dyn Any",
            });
        }
        self.inner.add(key, item)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }

    pub fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    pub fn close(&self) {
        self.inner.close()
    }

    pub fn element_type(&self) -> ElementType {
        self.element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_shape_validation() {
        let strings = ElementType::of::<String>();

        assert!(matches!(
            CallbackShape::Value.element_type(),
            Err(ThrottleError::NotCallable)
        ));
        assert!(matches!(
            CallbackShape::Function(vec![]).element_type(),
            Err(ThrottleError::ParamCount(0))
        ));
        assert!(matches!(
            CallbackShape::Function(vec![ParamKind::Sequence(strings), ParamKind::Sequence(strings)])
                .element_type(),
            Err(ThrottleError::ParamCount(2))
        ));
        assert!(matches!(
            CallbackShape::Function(vec![ParamKind::Single(strings)]).element_type(),
            Err(ThrottleError::ParamType)
        ));
        assert_eq!(
            CallbackShape::Function(vec![ParamKind::Sequence(strings)])
                .element_type()
                .unwrap(),
            strings
        );
    }

    #[test]
    fn test_add_rejects_wrong_type() {
        let throttle = AnyThrottle::new(|_: Vec<String>| {}, Duration::from_secs(60)).unwrap();
        let err = throttle.add("key1", 42i32).unwrap_err();
        match err {
            ThrottleError::InvalidType { expected, found } => {
                assert_eq!(expected, type_name::<String>());
                assert_eq!(found, "i32");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejected_item_does_not_reach_batch() {
        let (tx, rx) = unbounded();
        let throttle = AnyThrottle::new(
            move |items: Vec<String>| {
                tx.send(items).unwrap();
            },
            Duration::from_secs(60),
        )
        .unwrap();

        throttle.add("key1", "value1".to_string()).unwrap();
        assert!(throttle.add("key2", 7u64).is_err());
        assert!(throttle.add_erased("key3", Box::new(1.5f64)).is_err());
        throttle.flush().unwrap();

        let items = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(items, vec!["value1".to_string()]);
    }

    #[test]
    fn test_add_erased_accepts_matching_type() {
        let (tx, rx) = unbounded();
        let throttle = AnyThrottle::new(
            move |items: Vec<u32>| {
                tx.send(items).unwrap();
            },
            Duration::from_secs(60),
        )
        .unwrap();

        throttle.add_erased("k", Box::new(5u32)).unwrap();
        throttle.flush().unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), vec![5]);
    }

    #[test]
    fn test_from_shape_delivers_erased_items() {
        let (tx, rx) = unbounded();
        let callback: ErasedCallback = Arc::new(move |items: Vec<ErasedItem>| {
            tx.send(items.len()).unwrap();
        });
        let shape = CallbackShape::Function(vec![ParamKind::Sequence(ElementType::of::<u8>())]);
        let throttle = AnyThrottle::from_shape(&shape, callback, &ThrottleConfig::default()).unwrap();

        assert_eq!(throttle.element_type().name(), "u8");
        throttle.add("a", 1u8).unwrap();
        throttle.add("b", 2u8).unwrap();
        throttle.flush().unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), 2);
    }

    #[test]
    fn test_from_shape_rejects_bad_shape() {
        let callback: ErasedCallback = Arc::new(|_: Vec<ErasedItem>| {});
        let result = AnyThrottle::from_shape(&CallbackShape::Value, callback, &ThrottleConfig::default());
        assert!(matches!(result, Err(ThrottleError::NotCallable)));
    }
}
