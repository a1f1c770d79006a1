use std::sync::Arc;

use ordersvc_shared::Order;
use uuid::Uuid;

use crate::selector::OrderSelector;

/// Fixed set of candidate orders, built once at startup and never mutated.
///
/// Cloning is cheap; all clones share the same entries.
#[derive(Debug, Clone)]
pub struct Catalog {
    orders: Arc<[Order]>,
}

impl Catalog {
    pub fn new(orders: Vec<Order>) -> Result<Self, CatalogError> {
        if orders.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some(index) = orders.iter().position(|order| !order.is_valid()) {
            return Err(CatalogError::InvalidOrder { index });
        }

        Ok(Self {
            orders: orders.into(),
        })
    }

    /// The nine demo items, `Item 1` to `Item 9`, each with its own id.
    pub fn with_default_orders() -> Self {
        let orders: Vec<Order> = (1..=9u32)
            .map(|n| Order::new(Uuid::new_v4().simple().to_string(), n, format!("Item {}", n)))
            .collect();
        Self {
            orders: orders.into(),
        }
    }

    /// Copy of the entry chosen by `selector`.
    pub fn select(&self, selector: &dyn OrderSelector) -> Order {
        let index = selector.pick(self.orders.len()) % self.orders.len();
        self.orders[index].clone()
    }

    pub fn get(&self, index: usize) -> Option<&Order> {
        self.orders.get(index)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn contains(&self, order: &Order) -> bool {
        self.orders.iter().any(|entry| entry == order)
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog must contain at least one order")]
    Empty,

    #[error("Catalog entry {index} is not a valid order")]
    InvalidOrder { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::RandomSelector;

    struct FixedSelector(usize);

    impl OrderSelector for FixedSelector {
        fn pick(&self, _len: usize) -> usize {
            self.0
        }
    }

    #[test]
    fn test_default_catalog() {
        let catalog = Catalog::with_default_orders();
        assert_eq!(catalog.len(), 9);
        for (i, order) in catalog.iter().enumerate() {
            assert!(order.is_valid());
            assert_eq!(order.quantity, i as u32 + 1);
            assert_eq!(order.name, format!("Item {}", i + 1));
        }
    }

    #[test]
    fn test_rejects_empty_and_invalid() {
        assert_eq!(Catalog::new(vec![]).unwrap_err(), CatalogError::Empty);

        let err = Catalog::new(vec![
            Order::new("a", 1, "Item 1"),
            Order::new("b", 0, "Item 2"),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::InvalidOrder { index: 1 });
    }

    #[test]
    fn test_select_uses_selector() {
        let catalog = Catalog::with_default_orders();
        let order = catalog.select(&FixedSelector(4));
        assert_eq!(&order, catalog.get(4).unwrap());
    }

    #[test]
    fn test_select_never_out_of_bounds() {
        let catalog = Catalog::new(vec![
            Order::new("a", 1, "Item 1"),
            Order::new("b", 2, "Item 2"),
            Order::new("c", 3, "Item 3"),
        ])
        .unwrap();

        // A selector ignoring `len` is folded back into range.
        assert_eq!(catalog.select(&FixedSelector(5)).id, "c");

        for n in 1..=16 {
            let orders = (0..n).map(|i| Order::new(format!("id-{i}"), 1, "Item")).collect();
            let catalog = Catalog::new(orders).unwrap();
            let selector = RandomSelector::seeded(n as u64);
            for _ in 0..100 {
                assert!(catalog.contains(&catalog.select(&selector)));
            }
        }
    }
}
