//! Grocery assistant tools: cart mutation, inspection, checkout

use super::{Tool, ToolOutput};
use crate::domain::cart::{Cart, Catalog, PlacedOrder, RecipeBook, RemoveOutcome};
use crate::persist::JsonStore;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const CART_KEY: &str = "cart";
pub const ORDER_KEY: &str = "placed_order";

/// State shared by the four grocery tools: the catalog and recipe table
/// are fixed for the session, the cart mutates and is flushed after
/// every change.
pub struct GroceryShelf {
    catalog: Catalog,
    recipes: RecipeBook,
    cart: Mutex<Cart>,
    store: JsonStore,
}

impl GroceryShelf {
    pub fn new(catalog: Catalog, recipes: RecipeBook, cart: Cart, store: JsonStore) -> Self {
        Self {
            catalog,
            recipes,
            cart: Mutex::new(cart),
            store,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    #[cfg(test)]
    pub fn cart_snapshot(&self) -> Cart {
        self.cart.lock().unwrap().clone()
    }

    fn flush(&self, cart: &Cart) -> Result<(), String> {
        self.store
            .save(CART_KEY, cart)
            .map_err(|e| format!("Could not save the cart: {e}"))
    }
}

pub struct AddToCartTool(pub Arc<GroceryShelf>);

#[derive(Debug, Deserialize)]
struct AddInput {
    item_name: String,
    quantity: Option<u32>,
}

#[async_trait]
impl Tool for AddToCartTool {
    fn name(&self) -> &str {
        "add_to_cart"
    }

    fn description(&self) -> String {
        "Add an item or a known recipe's ingredients to the cart.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item_name": {"type": "string"},
                "quantity": {"type": "integer", "description": "Defaults to 1"}
            },
            "required": ["item_name"]
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: AddInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };
        let qty = input.quantity.unwrap_or(1);
        if qty == 0 {
            return ToolOutput::error("Quantity must be at least 1.");
        }

        let shelf = &self.0;
        let mut cart = shelf.cart.lock().unwrap();

        // Recipes expand into their ingredients
        if let Some(recipe) = shelf.recipes.lookup(&input.item_name) {
            let mut added = Vec::new();
            for ingredient in recipe.ingredients {
                if let Some(item) = shelf.catalog.find(ingredient) {
                    cart.add(&item.name, qty, item.price);
                    added.push(item.name.clone());
                }
            }
            if let Err(e) = shelf.flush(&cart) {
                return ToolOutput::error(e);
            }
            return ToolOutput::success(format!(
                "I've added the ingredients for {} ({}) to your cart.",
                recipe.name,
                added.join(", ")
            ));
        }

        let Some(item) = shelf.catalog.find(&input.item_name) else {
            return ToolOutput::error(format!(
                "Sorry, I don't have '{}' in the catalog.",
                input.item_name
            ));
        };

        cart.add(&item.name, qty, item.price);
        let name = item.name.clone();
        if let Err(e) = shelf.flush(&cart) {
            return ToolOutput::error(e);
        }
        ToolOutput::success(format!("Added {qty} {name}(s) to your cart."))
    }
}

pub struct RemoveFromCartTool(pub Arc<GroceryShelf>);

#[derive(Debug, Deserialize)]
struct RemoveInput {
    item_name: String,
    quantity: Option<u32>,
}

#[async_trait]
impl Tool for RemoveFromCartTool {
    fn name(&self) -> &str {
        "remove_from_cart"
    }

    fn description(&self) -> String {
        "Remove an item from the cart. Specify quantity to remove a partial amount; \
         omit it to remove the item entirely."
            .to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item_name": {"type": "string"},
                "quantity": {"type": "integer", "description": "Optional: amount to remove"}
            },
            "required": ["item_name"]
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: RemoveInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        let shelf = &self.0;
        let mut cart = shelf.cart.lock().unwrap();
        let outcome = cart.remove(&input.item_name, input.quantity);
        let reply = match outcome {
            RemoveOutcome::NotInCart => {
                return ToolOutput::success("That item isn't in your cart.");
            }
            RemoveOutcome::RemovedLine { name } => match input.quantity {
                None => format!("Removed all {name} from cart."),
                Some(_) => format!("Removed {name} from cart."),
            },
            RemoveOutcome::RemovedSome { name, remaining } => {
                let removed = input.quantity.unwrap_or_default();
                format!("Removed {removed} {name}. You have {remaining} left.")
            }
        };
        if let Err(e) = shelf.flush(&cart) {
            return ToolOutput::error(e);
        }
        ToolOutput::success(reply)
    }
}

pub struct ViewCartTool(pub Arc<GroceryShelf>);

#[async_trait]
impl Tool for ViewCartTool {
    fn name(&self) -> &str {
        "view_cart"
    }

    fn description(&self) -> String {
        "Read cart contents and the running total.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn run(&self, _input: Value) -> ToolOutput {
        ToolOutput::success(self.0.cart.lock().unwrap().summary())
    }
}

pub struct PlaceOrderTool(pub Arc<GroceryShelf>);

#[async_trait]
impl Tool for PlaceOrderTool {
    fn name(&self) -> &str {
        "place_order"
    }

    fn description(&self) -> String {
        "Finalize the order, save the receipt, and end the call.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn run(&self, _input: Value) -> ToolOutput {
        let shelf = &self.0;
        let mut cart = shelf.cart.lock().unwrap();
        if cart.is_empty() {
            return ToolOutput::error("Your cart is empty!");
        }

        let order = PlacedOrder {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            cart_contents: cart.clone(),
            total_bill: cart.total(),
        };
        if let Err(e) = shelf.store.save(ORDER_KEY, &order) {
            return ToolOutput::error(format!("Could not save the order: {e}"));
        }

        cart.clear();
        if let Err(e) = shelf.flush(&cart) {
            return ToolOutput::error(e);
        }
        ToolOutput::terminal("Order placed! I've saved the receipt to your file.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn shelf() -> (TempDir, Arc<GroceryShelf>) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        let shelf = Arc::new(GroceryShelf::new(
            Catalog::stock(),
            RecipeBook::builtin(),
            Cart::default(),
            store,
        ));
        (dir, shelf)
    }

    #[tokio::test]
    async fn sandwich_expands_then_bread_removal_leaves_two_lines() {
        let (_dir, shelf) = shelf();
        let add = AddToCartTool(shelf.clone());
        let remove = RemoveFromCartTool(shelf.clone());
        let view = ViewCartTool(shelf.clone());

        let out = add
            .run(json!({"item_name": "sandwich", "quantity": 1}))
            .await;
        assert!(out.success);
        assert!(out.output.contains("Bread"));

        let out = remove.run(json!({"item_name": "Bread", "quantity": 1})).await;
        assert!(out.success);

        let cart = shelf.cart_snapshot();
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()["Peanut Butter"].qty, 1);
        assert_eq!(cart.lines()["Jelly"].qty, 1);

        // total is PB + Jelly
        let out = view.run(json!({})).await;
        assert!(out.output.contains("Total: $7.50"));
    }

    #[tokio::test]
    async fn unknown_item_is_reported_not_added() {
        let (_dir, shelf) = shelf();
        let add = AddToCartTool(shelf.clone());
        let out = add.run(json!({"item_name": "Durian"})).await;
        assert!(!out.success);
        assert!(shelf.cart_snapshot().is_empty());
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let (_dir, shelf) = shelf();
        let add = AddToCartTool(shelf.clone());
        let out = add.run(json!({"item_name": "Milk", "quantity": 0})).await;
        assert!(!out.success);
        assert!(shelf.cart_snapshot().is_empty());
    }

    #[tokio::test]
    async fn cart_is_flushed_after_each_mutation() {
        let (dir, shelf) = shelf();
        let add = AddToCartTool(shelf.clone());
        add.run(json!({"item_name": "Milk", "quantity": 2})).await;

        let reloaded: Cart = JsonStore::open(dir.path())
            .unwrap()
            .load_or_default(CART_KEY);
        assert_eq!(reloaded.lines()["Milk"].qty, 2);
    }

    #[tokio::test]
    async fn place_order_writes_receipt_clears_cart_and_terminates() {
        let (dir, shelf) = shelf();
        let add = AddToCartTool(shelf.clone());
        let place = PlaceOrderTool(shelf.clone());

        add.run(json!({"item_name": "Apple", "quantity": 3})).await;
        let out = place.run(json!({})).await;
        assert!(out.terminal);
        assert!(shelf.cart_snapshot().is_empty());

        let order: Option<PlacedOrder> =
            JsonStore::open(dir.path()).unwrap().load_or(ORDER_KEY, || None);
        let order = order.expect("order written");
        assert_eq!(order.cart_contents.lines()["Apple"].qty, 3);
        assert!((order.total_bill - 2.4).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_cart_cannot_be_ordered() {
        let (_dir, shelf) = shelf();
        let place = PlaceOrderTool(shelf);
        let out = place.run(json!({})).await;
        assert!(!out.success);
        assert!(!out.terminal);
    }
}
