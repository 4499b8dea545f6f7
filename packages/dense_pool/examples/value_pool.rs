//! Example for `ValuePool`, whose items embed buffers that stay with their slot.
//!
//! Each slot allocates its history buffer once, when the slot is created. Returning an item
//! copies the last live item's state into the hole instead of swapping the buffers around.

use dense_pool::ValuePool;

const HISTORY_LEN: usize = 4;

#[derive(Debug, Default)]
struct Tracker {
    name: &'static str,
    history: Vec<f32>,
}

fn main() {
    let mut pool = ValuePool::builder()
        .capacity(2)
        .max_capacity(16)
        .on_init(|tracker: &mut Tracker| tracker.history = vec![0.0; HISTORY_LEN])
        .on_clear(|tracker: &mut Tracker| {
            tracker.name = "";
            tracker.history.fill(0.0);
        })
        .on_move(|from: &Tracker, to: &mut Tracker| {
            to.name = from.name;
            to.history.copy_from_slice(&from.history);
        })
        .build()
        .unwrap();

    let samples = [("alpha", 1.5), ("beta", 2.5), ("gamma", 3.5)];
    let ids: Vec<_> = samples
        .into_iter()
        .map(|(name, sample)| {
            let id = pool.request_id().unwrap();
            let tracker = pool.at_id_mut(id);
            tracker.name = name;
            tracker.history[0] = sample;
            id
        })
        .collect();

    println!(
        "Tracking {} items in a pool of capacity {}",
        pool.len(),
        pool.capacity()
    );

    pool.return_id(ids[0]);

    for index in 0..pool.len() {
        let tracker = &pool[index];
        println!("  index {index}: {} {:?}", tracker.name, tracker.history);
    }

    let mut archive = ValuePool::builder()
        .max_capacity(1)
        .on_clear(|tracker: &mut Tracker| tracker.name = "")
        .on_move(|from: &Tracker, to: &mut Tracker| {
            to.name = from.name;
            to.history.clone_from(&from.history);
        })
        .build()
        .unwrap();

    let absorbed = archive.append(&pool);
    println!("Archive absorbed {absorbed} of {} items", pool.len());
}
