//! Grocery assistant: catalog-driven cart with recipe expansion

use super::{App, AppError};
use crate::domain::cart::{Cart, Catalog, RecipeBook};
use crate::persist::JsonStore;
use crate::session::Session;
use crate::tools::grocery::{
    AddToCartTool, GroceryShelf, PlaceOrderTool, RemoveFromCartTool, ViewCartTool, CART_KEY,
};
use crate::tools::ToolRegistry;
use std::sync::Arc;

pub const CATALOG_KEY: &str = "grocery_catalog";

pub fn build(store: &JsonStore) -> Result<App, AppError> {
    // Seed the catalog file on first run so it can be edited in place
    let catalog: Catalog = if store.exists(CATALOG_KEY) {
        store.load_or(CATALOG_KEY, Catalog::stock)
    } else {
        let catalog = Catalog::stock();
        store.save(CATALOG_KEY, &catalog)?;
        catalog
    };
    let recipes = RecipeBook::builtin();
    let cart: Cart = store.load_or_default(CART_KEY);

    let prompt = format!(
        "You are a Grocery Assistant.\n\
         CATALOG: {}\n\
         KNOWN RECIPES: {}.\n\
         INSTRUCTIONS:\n\
         1. If the user wants \"ingredients for a sandwich\", call add_to_cart with item_name=\"sandwich\".\n\
         2. If the user says \"remove 3 apples\", pass quantity=3 to remove_from_cart.\n\
         3. If the user says \"place order\", call place_order.",
        catalog.summary(),
        recipes.names().join(", "),
    );

    let shelf = Arc::new(GroceryShelf::new(catalog, recipes, cart, store.clone()));
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(AddToCartTool(shelf.clone())));
    registry.register(Arc::new(RemoveFromCartTool(shelf.clone())));
    registry.register(Arc::new(ViewCartTool(shelf.clone())));
    registry.register(Arc::new(PlaceOrderTool(shelf)));

    Ok(App {
        session: Session::new(prompt),
        registry,
        greeting: "Welcome to the grocery store. What do you need today?".to_string(),
        voice_id: "en-US-natalie".to_string(),
        exit_phrases: vec!["bye".to_string()],
        farewell: "Goodbye!".to_string(),
        router: None,
    })
}
