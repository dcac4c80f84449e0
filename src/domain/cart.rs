//! Grocery catalog, recipe expansion, and cart arithmetic

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One sellable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    pub category: String,
    pub price: f64,
}

/// The store catalog. Lookups are case-insensitive on the item name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Stock catalog seeded on first run.
    pub fn stock() -> Self {
        let items = [
            ("Milk", "Dairy", 2.50),
            ("Eggs", "Dairy", 3.00),
            ("Bread", "Bakery", 2.00),
            ("Peanut Butter", "Pantry", 4.50),
            ("Jelly", "Pantry", 3.00),
            ("Pasta", "Pantry", 1.50),
            ("Tomato Sauce", "Pantry", 2.50),
            ("Cheese", "Dairy", 5.00),
            ("Apple", "Produce", 0.80),
        ]
        .into_iter()
        .map(|(name, category, price)| CatalogItem {
            name: name.to_string(),
            category: category.to_string(),
            price,
        })
        .collect();
        Self { items }
    }

    pub fn find(&self, name: &str) -> Option<&CatalogItem> {
        self.items
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(name))
    }

    /// One-line summary for the system prompt, e.g. `Milk ($2.5), ...`
    pub fn summary(&self) -> String {
        self.items
            .iter()
            .map(|i| format!("{} (${})", i.name, i.price))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A named recipe and its ingredient list
#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: &'static str,
    pub ingredients: &'static [&'static str],
}

/// Finite table of known recipes.
///
/// Lookup precedence: an exact (case-insensitive) name match wins over
/// a substring hit, so "pasta sauce" never shadows the "pasta" recipe
/// by accident while "ingredients for a sandwich" still resolves.
#[derive(Debug, Clone)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

impl RecipeBook {
    pub fn builtin() -> Self {
        Self {
            recipes: vec![
                Recipe {
                    name: "sandwich",
                    ingredients: &["Bread", "Peanut Butter", "Jelly"],
                },
                Recipe {
                    name: "pasta",
                    ingredients: &["Pasta", "Tomato Sauce", "Cheese"],
                },
                Recipe {
                    name: "omelet",
                    ingredients: &["Eggs", "Cheese", "Milk"],
                },
            ],
        }
    }

    pub fn lookup(&self, requested: &str) -> Option<&Recipe> {
        let requested = requested.to_lowercase();
        self.recipes
            .iter()
            .find(|r| r.name == requested)
            .or_else(|| {
                self.recipes
                    .iter()
                    .find(|r| requested.contains(r.name))
            })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.recipes.iter().map(|r| r.name).collect()
    }
}

/// One cart line; a line with `qty` 0 must never be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub qty: u32,
    pub price: f64,
}

/// Outcome of a removal request
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    NotInCart,
    /// The whole line was removed (no quantity given, or quantity
    /// reached zero or below)
    RemovedLine { name: String },
    /// A partial amount was removed and the line survives
    RemovedSome { name: String, remaining: u32 },
}

/// Shopping cart: item name -> line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: BTreeMap<String, CartLine>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &BTreeMap<String, CartLine> {
        &self.lines
    }

    /// Add `qty` of an item at the given unit price. Quantities
    /// accumulate on an existing line.
    pub fn add(&mut self, name: &str, qty: u32, price: f64) {
        debug_assert!(qty > 0);
        self.lines
            .entry(name.to_string())
            .and_modify(|line| line.qty += qty)
            .or_insert(CartLine { qty, price });
    }

    /// Remove an item. Without a quantity the entire line goes; with
    /// one, the line survives only while its quantity stays positive.
    pub fn remove(&mut self, name: &str, qty: Option<u32>) -> RemoveOutcome {
        let Some(key) = self
            .lines
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
        else {
            return RemoveOutcome::NotInCart;
        };

        match qty {
            None => {
                self.lines.remove(&key);
                RemoveOutcome::RemovedLine { name: key }
            }
            Some(qty) => {
                let line = self.lines.get_mut(&key).expect("key just found");
                if line.qty <= qty {
                    self.lines.remove(&key);
                    RemoveOutcome::RemovedLine { name: key }
                } else {
                    line.qty -= qty;
                    let remaining = line.qty;
                    RemoveOutcome::RemovedSome {
                        name: key,
                        remaining,
                    }
                }
            }
        }
    }

    /// Total billed amount: sum over surviving lines of qty x price.
    pub fn total(&self) -> f64 {
        self.lines
            .values()
            .map(|line| f64::from(line.qty) * line.price)
            .sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Spoken cart summary, one line per item plus the total.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "Your cart is empty.".to_string();
        }
        let mut summary = String::from("Here is your cart:\n");
        for (name, line) in &self.lines {
            let cost = f64::from(line.qty) * line.price;
            summary.push_str(&format!("- {} x {}: ${:.2}\n", line.qty, name, cost));
        }
        summary.push_str(&format!("Total: ${:.2}", self.total()));
        summary
    }
}

/// A finalized order as written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub timestamp: String,
    pub cart_contents: Cart,
    pub total_bill: f64,
}
