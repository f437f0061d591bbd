//! Resolve a handful of linked components and walk a component-id cache from the most to the
//! least specific key.

use std::{collections::HashMap, mem::MaybeUninit};

use bytemuck::{Pod, Zeroable};
use log::{Level, LevelFilter, Metadata, Record};
use rusty_ecsact::{
    Component,
    ecs::{IdSet, IntoIdSet, MarshalBridge, TypeRegistry},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Component)]
#[repr(C)]
#[component(id = 1)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Component)]
#[repr(C)]
#[component(id = 2)]
struct Velocity {
    dx: f32,
    dy: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Component)]
#[repr(C)]
#[component(id = 3)]
struct Health {
    value: u32,
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{} - {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() {
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Debug));

    let registry = TypeRegistry::new();

    // Systems registered against progressively smaller component combinations.
    let mut systems: HashMap<IdSet, &str> = HashMap::new();
    systems.insert(<(Position, Velocity)>::id_set(), "movement");
    systems.insert(<Health>::id_set(), "regeneration");

    for query in [
        <(Position, Velocity, Health)>::id_set(),
        <(Position, Health)>::id_set(),
        <Position>::id_set(),
    ] {
        let hit = query.find_fallback(|subset| systems.get(subset).map(|name| (subset.clone(), *name)));
        match hit {
            Some((key, name)) => println!("{:?} -> {name} via {:?}", query.ids(), key.ids()),
            None => println!("{:?} -> no match", query.ids()),
        }
    }

    // Round-trip a component through a raw block, as a native runtime would hand it over.
    let bridge = MarshalBridge::new(&registry);
    let mut block = [MaybeUninit::new(0u8); 8];
    let id = registry.component_id::<Velocity>();
    if let Err(err) = bridge.write_component(id, &Velocity { dx: 0.5, dy: 2.0 }, &mut block) {
        eprintln!("write failed: {err}");
        return;
    }
    // SAFETY: the block was just filled by `write_component` with the same id.
    match unsafe { bridge.read_component_uninit(id, Some(&block[..])) } {
        Ok(value) => println!("read back {:?}", value.downcast_ref::<Velocity>()),
        Err(err) => eprintln!("read failed: {err}"),
    }
}
