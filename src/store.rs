/// Coin store: buy ships and power-ups with coins earned in runs.

use tracing::info;

use crate::config::{ItemCategory, StoreConfig, StoreItem};
use crate::error::StoreError;
use crate::persistence::Profile;

pub fn find_item<'a>(store: &'a StoreConfig, name: &str) -> Option<&'a StoreItem> {
    store.items.iter().find(|item| item.name == name)
}

pub fn items_in(store: &StoreConfig, category: ItemCategory) -> Vec<&StoreItem> {
    store
        .items
        .iter()
        .filter(|item| item.category == category)
        .collect()
}

/// Every item grouped by tab.  Slot numbers on the store screen index this.
pub fn listing(store: &StoreConfig) -> Vec<&StoreItem> {
    ItemCategory::ALL
        .into_iter()
        .flat_map(|category| items_in(store, category))
        .collect()
}

/// Buy `name`: checks the balance, takes the coins, marks the item owned.
pub fn purchase(profile: &mut Profile, store: &StoreConfig, name: &str) -> Result<(), StoreError> {
    let item = find_item(store, name).ok_or_else(|| StoreError::UnknownItem(name.to_string()))?;
    if profile.is_unlocked(&item.name) {
        return Err(StoreError::AlreadyOwned(item.name.clone()));
    }
    let balance = profile.total_coins();
    if balance < item.price {
        return Err(StoreError::InsufficientCoins {
            price: item.price,
            balance,
        });
    }

    // Both changes land in memory even if writing the first one fails.
    let spent = profile.spend_coins(item.price);
    let unlocked = profile.unlock(&item.name);
    spent.and(unlocked)?;
    info!(item = %item.name, price = item.price, "Purchased");
    Ok(())
}
