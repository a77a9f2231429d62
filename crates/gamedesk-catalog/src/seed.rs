//! Starter catalog data.
//!
//! A curated subset of the store's launch inventory covering every genre and
//! platform the assistant talks about, with the featured shelf up front.
//! Seeding is idempotent: a non-empty store is left untouched.

use crate::CatalogStore;
use gamedesk_protocol::{ProductDraft, ToolError};
use tracing::info;

const STARTER_TITLES: &[(&str, &str, &str, f64, bool)] = &[
    // Featured shelf
    ("The Witcher 3: Wild Hunt", "RPG", "PC", 40.0, true),
    ("Elden Ring", "RPG", "PlayStation", 60.0, true),
    ("Hollow Knight", "Indie", "PC", 15.0, true),
    ("Cyberpunk 2077", "Action", "PC", 60.0, true),
    ("God of War", "Action", "PlayStation", 50.0, true),
    ("Breath of the Wild", "Adventure", "Switch", 60.0, true),
    ("Stardew Valley", "Simulation", "Switch", 15.0, true),
    ("Dark Souls III", "RPG", "PC", 60.0, true),
    ("Red Dead Redemption 2", "Adventure", "PlayStation", 60.0, true),
    // RPG
    ("Persona 4 Golden", "RPG", "PC", 20.0, false),
    ("Divinity: Original Sin 2", "RPG", "PC", 45.0, false),
    ("Pokémon Scarlet", "RPG", "Switch", 60.0, false),
    ("Final Fantasy XVI", "RPG", "PlayStation", 70.0, false),
    // Action
    ("Devil May Cry 5", "Action", "PC", 30.0, false),
    ("Sekiro: Shadows Die Twice", "Action", "PC", 60.0, false),
    ("Bayonetta 3", "Action", "Switch", 60.0, false),
    // Strategy
    ("Civilization VI", "Strategy", "PC", 60.0, false),
    ("Into the Breach", "Strategy", "PC", 15.0, false),
    ("Crusader Kings III", "Strategy", "PC", 50.0, false),
    ("Fire Emblem: Engage", "Strategy", "Switch", 60.0, false),
    // Indie
    ("Hades", "Indie", "Switch", 25.0, false),
    ("Cuphead", "Indie", "PC", 20.0, false),
    ("Undertale", "Indie", "PC", 10.0, false),
    ("Dead Cells", "Indie", "Switch", 25.0, false),
    ("Celeste", "Indie", "PC", 20.0, false),
    ("Among Us", "Indie", "Mobile", 5.0, false),
    // Adventure
    ("Outer Wilds", "Adventure", "PC", 25.0, false),
    ("Firewatch", "Adventure", "PC", 20.0, false),
    ("Detroit: Become Human", "Adventure", "PlayStation", 40.0, false),
    // Shooter
    ("DOOM (2016)", "Shooter", "PC", 20.0, false),
    ("Titanfall 2", "Shooter", "PC", 30.0, false),
    ("Metro Exodus", "Shooter", "PC", 40.0, false),
    ("Counter-Strike 2", "Shooter", "PC", 0.0, false),
    // Simulation
    ("Factorio", "Simulation", "PC", 30.0, false),
    ("RimWorld", "Simulation", "PC", 35.0, false),
    ("Cities: Skylines", "Simulation", "PC", 30.0, false),
    ("Animal Crossing: New Horizons", "Simulation", "Switch", 60.0, false),
];

/// Load the starter titles into an empty catalog. Returns the number of
/// records created (zero when the catalog already has data).
pub async fn seed_catalog(catalog: &CatalogStore) -> Result<usize, ToolError> {
    if !catalog.get_all().await?.is_empty() {
        return Ok(0);
    }

    for (name, genre, platform, price, featured) in STARTER_TITLES {
        catalog
            .create(ProductDraft::new(*name, *genre, *platform, *price).featured(*featured))
            .await?;
    }

    info!(titles = STARTER_TITLES.len(), "catalog seeded");
    Ok(STARTER_TITLES.len())
}
