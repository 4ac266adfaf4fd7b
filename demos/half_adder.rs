use signal_net::composite::CircuitRegistry;
use signal_net::description::{CircuitDescription, ComponentDescription, Document};
use signal_net::{EngineConfig, Signal};

fn pin(at: (i32, i32), label: &str, output: bool) -> ComponentDescription {
    let facing = if output { "west" } else { "east" };
    ComponentDescription::at("Pin", at)
        .with("label", label)
        .with("facing", facing)
        .with("output", output.to_string())
}

/// S = A xor B, C = A and B
fn half_adder() -> CircuitDescription {
    CircuitDescription::new("half")
        .with_component(pin((50, 50), "A", false))
        .with_component(pin((50, 150), "B", false))
        .with_component(ComponentDescription::at("XOR Gate", (200, 80)))
        .with_component(ComponentDescription::at("AND Gate", (200, 140)))
        .with_component(pin((300, 80), "S", true))
        .with_component(pin((300, 140), "C", true))
        .with_wire((50, 50), (120, 50))
        .with_wire((120, 50), (120, 70))
        .with_wire((120, 70), (170, 70))
        .with_wire((120, 70), (120, 130))
        .with_wire((120, 130), (170, 130))
        .with_wire((50, 150), (140, 150))
        .with_wire((140, 150), (170, 150))
        .with_wire((140, 150), (140, 90))
        .with_wire((140, 90), (170, 90))
        .with_wire((200, 80), (300, 80))
        .with_wire((200, 140), (300, 140))
}

/// One instance of `half` with pins on its inputs and LEDs on its outputs
fn top() -> CircuitDescription {
    CircuitDescription::new("main")
        .with_component(ComponentDescription::at("half", (400, 400)))
        .with_component(ComponentDescription::at("Pin", (300, 410)).with("label", "a"))
        .with_component(ComponentDescription::at("Pin", (300, 420)).with("label", "b"))
        .with_component(ComponentDescription::at("LED", (500, 410)).with("label", "sum"))
        .with_component(ComponentDescription::at("LED", (500, 420)).with("label", "carry"))
        .with_wire((300, 410), (400, 410))
        .with_wire((300, 420), (400, 420))
        .with_wire((430, 410), (500, 410))
        .with_wire((430, 420), (500, 420))
}

fn main() {
    env_logger::init();

    let doc = Document::new().with_circuit(top()).with_circuit(half_adder());
    let registry = CircuitRegistry::from_document(&doc).unwrap();
    let mut sim = registry.simulate("main", EngineConfig::default()).unwrap();

    let a = sim.find_labeled("a").unwrap();
    let b = sim.find_labeled("b").unwrap();
    let sum = sim.component(sim.find_labeled("sum").unwrap()).unwrap().anchor();
    let carry = sim.component(sim.find_labeled("carry").unwrap()).unwrap().anchor();

    println!("a b | s c");
    for (press_a, press_b) in [(false, false), (true, false), (true, true), (false, true)] {
        // Walk the inputs through a gray code, one press per step
        if press_a != sim.port_signals(a).unwrap()[0] {
            sim.activate(a).unwrap();
        }
        if press_b != sim.port_signals(b).unwrap()[0] {
            sim.activate(b).unwrap();
        }
        let s = sim.read_at(sum).unwrap_or(Signal::Low);
        let c = sim.read_at(carry).unwrap_or(Signal::Low);
        println!("{} {} | {s} {c}", press_a as u8, press_b as u8);
    }
}
