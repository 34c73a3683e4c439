//! The order aggregate: an order and the line items it owns.

use serde::{Deserialize, Serialize};

use crate::OrderId;

/// A line item. Items have no identity of their own outside their order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub item_code: String,
    pub description: String,
    pub quantity: u32,
}

impl Item {
    pub fn new(item_code: impl Into<String>, description: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_code: item_code.into(),
            description: description.into(),
            quantity,
        }
    }
}

/// An order that has not been persisted yet and therefore has no identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_name: String,
    pub ordered_at: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl NewOrder {
    pub fn new(customer_name: impl Into<String>, ordered_at: impl Into<String>) -> Self {
        Self {
            customer_name: customer_name.into(),
            ordered_at: ordered_at.into(),
            items: Vec::new(),
        }
    }

    /// Appends an item.
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Attaches an identifier, producing the persisted form of this order.
    pub fn with_id(self, id: OrderId) -> Order {
        Order {
            id,
            customer_name: self.customer_name,
            ordered_at: self.ordered_at,
            items: self.items,
        }
    }
}

/// A persisted order together with all of its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub ordered_at: String,
    pub items: Vec<Item>,
}

impl Order {
    /// Drops the identifier.
    pub fn into_new(self) -> NewOrder {
        NewOrder {
            customer_name: self.customer_name,
            ordered_at: self.ordered_at,
            items: self.items,
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_id_keeps_fields() {
        let order = NewOrder::new("Alice", "2024-01-01")
            .with_item(Item::new("A1", "Widget", 2))
            .with_id(OrderId::new(1));

        assert_eq!(order.id, OrderId::new(1));
        assert_eq!(order.customer_name, "Alice");
        assert_eq!(order.items, vec![Item::new("A1", "Widget", 2)]);
    }

    #[test]
    fn order_uses_camel_case_fields() {
        let order = NewOrder::new("Alice", "2024-01-01")
            .with_item(Item::new("A1", "Widget", 2))
            .with_id(OrderId::new(3));

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["customerName"], "Alice");
        assert_eq!(json["orderedAt"], "2024-01-01");
        assert_eq!(json["items"][0]["itemCode"], "A1");
        assert_eq!(json["items"][0]["quantity"], 2);
    }

    #[test]
    fn new_order_items_default_to_empty() {
        let order: NewOrder =
            serde_json::from_str(r#"{"customerName":"Bob","orderedAt":"2024-02-02"}"#).unwrap();
        assert!(order.items.is_empty());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let result: Result<Item, _> =
            serde_json::from_str(r#"{"itemCode":"A1","description":"Widget","quantity":-1}"#);
        assert!(result.is_err());
    }
}
