#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, unreachable_pub)]
/*!

`signal-net`

An event-driven simulator for single-bit digital logic drawn on a grid.

A circuit arrives as a [description::Document]: components anchored at grid
coordinates and wires between coordinates. Loading it groups wire endpoints
into nets ([netlist]), resolves every component into a closed [component::Kind]
with absolute ports, and packages named circuits in a
[composite::CircuitRegistry] so they can be placed inside one another.
A [simulation::Simulation] then keeps one value per net and reacts to pin
presses by re-evaluating only what a change reaches.

Features:

- `graph`: petgraph views of circuit connectivity
- `serde`: JSON (de)serialization of documents and engine configuration
- `circ`: reader for Logisim `.circ` files

*/
#![doc = "## Simple Example\n```"]
#![doc = include_str!("../demos/simple.rs")]
#![doc = "\n```"]

pub mod attribute;
#[cfg(feature = "circ")]
pub mod circ;
pub mod circuit;
pub mod component;
pub mod composite;
pub mod description;
pub mod error;
pub mod graph;
pub mod netlist;
pub mod render;
pub mod simulation;
pub mod util;

pub use circuit::{Circuit, Coord, Signal};
pub use error::{Error, Result};
pub use simulation::{EngineConfig, Propagation, Simulation};
