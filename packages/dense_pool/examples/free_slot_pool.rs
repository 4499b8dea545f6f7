//! Example for `FreeSlotPool` and `GrowableFreeSlotPool`, which never move their items.

use dense_pool::{FreeSlotPool, GrowableFreeSlotPool, Poolable};

#[derive(Debug, Default)]
struct Connection {
    slot: usize,
    peer: u16,
}

impl Poolable for Connection {
    fn pool_index(&self) -> usize {
        self.slot
    }

    fn set_pool_index(&mut self, index: usize) {
        self.slot = index;
    }
}

fn main() {
    let mut pool = FreeSlotPool::builder()
        .capacity(3)
        .factory(Connection::default)
        .on_return(|connection: &mut Connection| connection.peer = 0)
        .build()
        .unwrap();

    for peer in [8080, 8081, 8082] {
        let connection = pool.request().unwrap();
        connection.peer = peer;
        println!("Opened connection to {peer} in slot {}", connection.slot);
    }

    println!("Pool is full: {}", pool.is_full());
    println!("Another request yields: {:?}", pool.request());

    pool.return_slot(1);
    let reopened = pool.request().unwrap();
    println!(
        "Reused slot {} (previous peer cleared to {}) after closing one connection",
        reopened.slot, reopened.peer
    );

    let mut growable = GrowableFreeSlotPool::builder()
        .factory(Connection::default)
        .build()
        .unwrap();

    for _ in 0..5 {
        _ = growable.request();
    }

    println!(
        "Growable pool holds {} connections in {} slots",
        growable.len(),
        growable.capacity()
    );
}
