//! In-memory entity store.
//!
//! Ids are allocated sequentially per table and never reused; listings are
//! ordered by id. Deleting an order deletes its items.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::models::{Customer, Item, ItemFields, Order, Product, User};

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<u64, T>,
    last_id: u64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(u64) -> T) -> T {
        self.last_id += 1;
        let row = build(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }

    fn get(&self, id: u64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn filtered(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|r| keep(r)).cloned().collect()
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    customers: Table<Customer>,
    products: Table<Product>,
    orders: Table<Order>,
    items: Table<Item>,
}

/// Process-wide store for users and the order domain.
#[derive(Debug, Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// Add a user; the password is hashed before it is stored.
    pub fn add_user(&self, username: &str, password: &str) -> Result<User> {
        let mut tables = self.tables.write();
        if tables.users.rows.values().any(|u| u.username == username) {
            anyhow::bail!("user {username:?} already exists");
        }
        let id = tables.users.last_id + 1;
        let user = User::new(id, username, password)?;
        Ok(tables.users.insert_with(|_| user))
    }

    pub fn user_by_username(&self, username: &str) -> Option<User> {
        self.tables
            .read()
            .users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    pub fn customers(&self) -> Vec<Customer> {
        self.tables.read().customers.all()
    }

    pub fn customer(&self, id: u64) -> Option<Customer> {
        self.tables.read().customers.get(id)
    }

    pub fn insert_customer(&self, name: String) -> Customer {
        self.tables
            .write()
            .customers
            .insert_with(|id| Customer { id, name })
    }

    /// Replace a customer's name. Returns `false` for unknown ids.
    pub fn update_customer(&self, id: u64, name: String) -> bool {
        match self.tables.write().customers.rows.get_mut(&id) {
            Some(customer) => {
                customer.name = name;
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    pub fn products(&self) -> Vec<Product> {
        self.tables.read().products.all()
    }

    pub fn product(&self, id: u64) -> Option<Product> {
        self.tables.read().products.get(id)
    }

    pub fn insert_product(&self, name: String) -> Product {
        self.tables
            .write()
            .products
            .insert_with(|id| Product { id, name })
    }

    pub fn update_product(&self, id: u64, name: String) -> bool {
        match self.tables.write().products.rows.get_mut(&id) {
            Some(product) => {
                product.name = name;
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    pub fn orders(&self) -> Vec<Order> {
        self.tables.read().orders.all()
    }

    pub fn customer_orders(&self, customer_id: u64) -> Vec<Order> {
        self.tables
            .read()
            .orders
            .filtered(|o| o.customer_id == customer_id)
    }

    pub fn order(&self, id: u64) -> Option<Order> {
        self.tables.read().orders.get(id)
    }

    /// Create an order for a customer. `None` if the customer does not exist.
    pub fn insert_order(&self, customer_id: u64, date: DateTime<Utc>) -> Option<Order> {
        let mut tables = self.tables.write();
        if !tables.customers.rows.contains_key(&customer_id) {
            return None;
        }
        Some(tables.orders.insert_with(|id| Order {
            id,
            customer_id,
            date,
        }))
    }

    pub fn update_order(&self, id: u64, date: DateTime<Utc>) -> bool {
        match self.tables.write().orders.rows.get_mut(&id) {
            Some(order) => {
                order.date = date;
                true
            }
            None => false,
        }
    }

    /// Delete an order and all of its items.
    pub fn delete_order(&self, id: u64) -> bool {
        let mut tables = self.tables.write();
        if tables.orders.rows.remove(&id).is_none() {
            return false;
        }
        tables.items.rows.retain(|_, item| item.order_id != id);
        true
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    pub fn order_items(&self, order_id: u64) -> Vec<Item> {
        self.tables.read().items.filtered(|i| i.order_id == order_id)
    }

    pub fn item(&self, id: u64) -> Option<Item> {
        self.tables.read().items.get(id)
    }

    /// Add an item to an order. `None` if the order does not exist.
    pub fn insert_item(&self, order_id: u64, fields: ItemFields) -> Option<Item> {
        let mut tables = self.tables.write();
        if !tables.orders.rows.contains_key(&order_id) {
            return None;
        }
        Some(tables.items.insert_with(|id| Item {
            id,
            order_id,
            product_id: fields.product_id,
            quantity: fields.quantity,
        }))
    }

    pub fn update_item(&self, id: u64, fields: ItemFields) -> bool {
        match self.tables.write().items.rows.get_mut(&id) {
            Some(item) => {
                item.product_id = fields.product_id;
                item.quantity = fields.quantity;
                true
            }
            None => false,
        }
    }

    pub fn delete_item(&self, id: u64) -> bool {
        self.tables.write().items.rows.remove(&id).is_some()
    }
}
