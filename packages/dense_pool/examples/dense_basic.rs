//! Basic usage example for `DensePool` and `ResizableDensePool`.
//!
//! This example spawns and retires projectiles, showing how identifiers stay valid while the
//! pool rearranges its storage to keep live items contiguous.

use dense_pool::{DensePool, Poolable, RemovalOrder, ResizableDensePool};

#[derive(Debug, Default)]
struct Projectile {
    id: usize,
    x: f32,
    speed: f32,
}

impl Poolable for Projectile {
    fn pool_index(&self) -> usize {
        self.id
    }

    fn set_pool_index(&mut self, index: usize) {
        self.id = index;
    }
}

fn main() {
    let mut pool = DensePool::builder()
        .capacity(4)
        .factory(Projectile::default)
        .on_return(|projectile: &mut Projectile| {
            projectile.x = 0.0;
            projectile.speed = 0.0;
        })
        .build()
        .unwrap();

    println!("Created DensePool with capacity: {}", pool.capacity());

    let mut ids = Vec::new();
    for speed in [1.0, 2.0, 3.0] {
        let projectile = pool.request().unwrap();
        projectile.speed = speed;
        ids.push(projectile.pool_index());
    }

    println!("Spawned {} projectiles with ids {ids:?}", pool.len());

    // Advance every live projectile with a plain slice walk.
    for projectile in pool.live_mut() {
        projectile.x += projectile.speed;
    }

    // Retire the first projectile. The last live projectile moves into its slot.
    pool.return_id(ids[0]);

    println!("After retiring id {}:", ids[0]);
    for (id, projectile) in pool.iter() {
        println!(
            "  id {id} at index {} has x = {}",
            pool.index_of(id),
            projectile.x
        );
    }

    // A resizable pool grows on demand and can keep the order of its live items.
    let mut ordered = ResizableDensePool::builder()
        .capacity(2)
        .max_capacity(8)
        .factory(|| 0_u32)
        .removal_order(RemovalOrder::Ordered)
        .build()
        .unwrap();

    for value in 1..=5 {
        let id = ordered.request_id().unwrap();
        *ordered.get_mut(id).unwrap() = value;
    }

    println!(
        "Resizable pool grew to capacity {} (max {})",
        ordered.capacity(),
        ordered.max_capacity()
    );

    let second = ordered.id_at(1);
    ordered.return_id(second);

    println!("Ordered live values after removing the second: {:?}", ordered.live());
}
