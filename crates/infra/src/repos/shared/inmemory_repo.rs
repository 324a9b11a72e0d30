use reelminder_domain::Entity;
use std::sync::Mutex;

/// Useful functions for creating inmemory repositories

pub fn insert<T: Clone>(val: &T, collection: &Mutex<Vec<T>>) {
    let mut collection = collection.lock().unwrap();
    collection.push(val.clone());
}

/// Inserts `val` unless an entity with the same id is already stored.
/// Returns whether it was inserted.
pub fn insert_if_absent<K: PartialEq, T: Clone + Entity<K>>(
    val: &T,
    collection: &Mutex<Vec<T>>,
) -> bool {
    let mut collection = collection.lock().unwrap();
    if collection.iter().any(|e| e.id() == val.id()) {
        return false;
    }
    collection.push(val.clone());
    true
}

pub fn save<K: PartialEq, T: Clone + Entity<K>>(val: &T, collection: &Mutex<Vec<T>>) {
    let mut collection = collection.lock().unwrap();
    for item in collection.iter_mut() {
        if item.id() == val.id() {
            *item = val.clone();
        }
    }
}

/// Replaces the entity with the same id or appends `val`
pub fn upsert<K: PartialEq, T: Clone + Entity<K>>(val: &T, collection: &Mutex<Vec<T>>) {
    let mut collection = collection.lock().unwrap();
    match collection.iter_mut().find(|e| e.id() == val.id()) {
        Some(existing) => *existing = val.clone(),
        None => collection.push(val.clone()),
    }
}

pub fn find<K: PartialEq, T: Clone + Entity<K>>(val_id: &K, collection: &Mutex<Vec<T>>) -> Option<T> {
    let collection = collection.lock().unwrap();
    collection.iter().find(|e| e.id() == *val_id).cloned()
}

pub fn find_by<T: Clone, F: FnMut(&T) -> bool>(collection: &Mutex<Vec<T>>, mut compare: F) -> Vec<T> {
    let collection = collection.lock().unwrap();
    let mut items = Vec::new();
    for item in collection.iter() {
        if compare(item) {
            items.push(item.clone());
        }
    }
    items
}

/// Returns the number of updated entities
pub fn update_many<T: Clone, F: Fn(&T) -> bool, U: Fn(&mut T)>(
    collection: &Mutex<Vec<T>>,
    compare: F,
    update: U,
) -> usize {
    let mut collection = collection.lock().unwrap();
    let mut updated = 0;
    for item in collection.iter_mut() {
        if compare(item) {
            update(item);
            updated += 1;
        }
    }
    updated
}
