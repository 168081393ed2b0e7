//! Auction catalog: lots, rarity tags and the cycling catalog.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::GatewayError;

/// Rarity tag shown alongside a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Everyday item.
    Common,
    /// Hard to find.
    Rare,
    /// One of a kind.
    Legendary,
}

/// Immutable catalog entry eligible to be auctioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Lot {
    /// Stable slug identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Flavor text.
    pub description: String,
    /// Franchise the item comes from.
    pub origin: String,
    /// Opening price in the smallest currency unit.
    pub starting_price: u64,
    /// Rarity tag.
    pub rarity: Rarity,
}

impl Lot {
    /// Creates a new lot.
    #[must_use]
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        origin: &str,
        starting_price: u64,
        rarity: Rarity,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            origin: origin.to_string(),
            starting_price,
            rarity,
        }
    }
}

/// Fixed, ordered, non-empty list of lots that rounds cycle through.
#[derive(Debug, Clone)]
pub struct Catalog {
    lots: Vec<Lot>,
}

impl Catalog {
    /// Builds a catalog from the given lots.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if `lots` is empty or any lot
    /// has a zero starting price.
    pub fn new(lots: Vec<Lot>) -> Result<Self, GatewayError> {
        if lots.is_empty() {
            return Err(GatewayError::Configuration(
                "auction catalog must contain at least one lot".to_string(),
            ));
        }
        if let Some(lot) = lots.iter().find(|lot| lot.starting_price == 0) {
            return Err(GatewayError::Configuration(format!(
                "lot {} has a zero starting price",
                lot.id
            )));
        }
        Ok(Self { lots })
    }

    /// Returns the lot for a monotonic round index, wrapping around.
    ///
    /// Only `None` if the catalog were empty, which construction rules out.
    #[must_use]
    pub fn lot_for(&self, index: u64) -> Option<&Lot> {
        let len = u64::try_from(self.lots.len()).ok().filter(|len| *len > 0)?;
        let slot = usize::try_from(index % len).ok()?;
        self.lots.get(slot)
    }

    /// Returns every lot in catalog order.
    #[must_use]
    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    /// Number of lots in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lots.len()
    }

    /// Always `false`; a catalog cannot be empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }
}

impl Default for Catalog {
    /// The six sci-fi props the house auctions out of the box.
    fn default() -> Self {
        Self {
            lots: vec![
                Lot::new(
                    "luke-lightsaber",
                    "Luke Skywalker's Lightsaber",
                    "The iconic blue lightsaber from The Empire Strikes Back, with authentic battle damage.",
                    "Star Wars: The Empire Strikes Back",
                    50_000,
                    Rarity::Legendary,
                ),
                Lot::new(
                    "tricorder-tos",
                    "Original Series Tricorder",
                    "Spock's personal tricorder, fully functional for 23rd century scanning.",
                    "Star Trek: The Original Series",
                    25_000,
                    Rarity::Rare,
                ),
                Lot::new(
                    "replicant-badge",
                    "Blade Runner Police Badge",
                    "Rick Deckard's LAPD badge, circa 2019.",
                    "Blade Runner",
                    15_000,
                    Rarity::Rare,
                ),
                Lot::new(
                    "neo-pills",
                    "The Red and Blue Pills",
                    "Morpheus's choice pills, sealed in their original containers. Choose wisely.",
                    "The Matrix",
                    100_000,
                    Rarity::Legendary,
                ),
                Lot::new(
                    "phaser-kirk",
                    "Captain Kirk's Phaser",
                    "Type-2 phaser carried by Captain James T. Kirk. Set to stun.",
                    "Star Trek: The Original Series",
                    30_000,
                    Rarity::Rare,
                ),
                Lot::new(
                    "flux-capacitor",
                    "Flux Capacitor",
                    "Doc Brown's time-travel core. 1.21 gigawatts not included.",
                    "Back to the Future",
                    75_000,
                    Rarity::Legendary,
                ),
            ],
        }
    }
}

/// Formats an amount with thousands separators, e.g. `2000` → `"2,000"`.
#[must_use]
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
