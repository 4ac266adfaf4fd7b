use signal_net::composite::CircuitRegistry;
use signal_net::description::{CircuitDescription, ComponentDescription, Document};
use signal_net::{EngineConfig, Simulation};

fn main() {
    env_logger::init();

    // An inverter whose output is wired back to its input never settles
    let ring = CircuitDescription::new("ring")
        .with_component(ComponentDescription::at("NOT Gate", (100, 100)))
        .with_wire((100, 100), (100, 130))
        .with_wire((100, 130), (70, 130))
        .with_wire((70, 130), (70, 100));

    let registry = CircuitRegistry::from_document(&Document::new().with_circuit(ring)).unwrap();
    let circuit = registry.circuit("ring").unwrap();

    for budget in [1, 2, 3, 10] {
        let sim = Simulation::load(circuit, EngineConfig::default().with_tick_budget(budget));
        let report = sim.priming();
        println!(
            "budget {budget:>2}: {} rounds, {} dropped, settled at {}",
            report.rounds,
            report.dropped,
            sim.signal(0)
        );
    }
}
