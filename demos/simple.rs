use signal_net::composite::CircuitRegistry;
use signal_net::description::{CircuitDescription, ComponentDescription, Document};
use signal_net::{EngineConfig, Signal};

fn main() {
    // A pin feeding both inputs of an AND gate, which lights an LED
    let circuit = CircuitDescription::new("main")
        .with_component(ComponentDescription::at("Pin", (100, 100)).with("label", "in"))
        .with_component(ComponentDescription::at("AND Gate", (200, 100)))
        .with_component(ComponentDescription::at("LED", (300, 100)).with("label", "out"))
        .with_wire((100, 100), (150, 100))
        .with_wire((150, 100), (150, 90))
        .with_wire((150, 90), (170, 90))
        .with_wire((150, 100), (150, 110))
        .with_wire((150, 110), (170, 110))
        .with_wire((200, 100), (300, 100));

    let registry = CircuitRegistry::from_document(&Document::new().with_circuit(circuit)).unwrap();
    let mut sim = registry.simulate("main", EngineConfig::default()).unwrap();

    let pin = sim.find_labeled("in").unwrap();
    let led = sim.component(sim.find_labeled("out").unwrap()).unwrap().anchor();
    assert_eq!(sim.read_at(led), Some(Signal::Low));

    // Press the pin
    sim.activate(pin).unwrap();
    assert_eq!(sim.read_at(led), Some(Signal::High));

    print!("{}", sim.grid());
}
