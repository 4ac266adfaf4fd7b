use signal_net::composite::CircuitRegistry;
use signal_net::description::{CircuitDescription, ComponentDescription, Document};
use signal_net::{EngineConfig, Result, Signal, Simulation};
use std::process::ExitCode;
#[cfg(feature = "circ")]
use signal_net::Error;
#[cfg(feature = "circ")]
use std::path::{Path, PathBuf};

#[derive(clap::Parser, Debug)]
#[command(name = "signal-net")]
#[command(about = "Settle a Logisim circuit and print it as a grid, or run a half adder demo")]
struct Args {
    /// Logisim `.circ` file to simulate
    #[cfg(feature = "circ")]
    path: Option<PathBuf>,

    /// Circuit of the file to simulate. Defaults to the first one.
    #[cfg(feature = "circ")]
    #[clap(long, requires = "path")]
    circuit: Option<String>,
}

fn pin(at: (i32, i32), label: &str, output: bool) -> ComponentDescription {
    let facing = if output { "west" } else { "east" };
    ComponentDescription::at("Pin", at)
        .with("label", label)
        .with("facing", facing)
        .with("output", output.to_string())
}

fn half_adder_demo() -> Document {
    let half = CircuitDescription::new("half")
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
        .with_wire((200, 140), (300, 140));

    let main = CircuitDescription::new("main")
        .with_component(ComponentDescription::at("half", (100, 0)))
        .with_component(pin((50, 10), "a", false))
        .with_component(pin((50, 20), "b", false))
        .with_component(ComponentDescription::at("LED", (180, 10)).with("label", "s"))
        .with_component(ComponentDescription::at("LED", (180, 20)).with("label", "c"))
        .with_wire((50, 10), (100, 10))
        .with_wire((50, 20), (100, 20))
        .with_wire((130, 10), (180, 10))
        .with_wire((130, 20), (180, 20));

    Document::new().with_circuit(main).with_circuit(half)
}

fn level(sim: &Simulation, label: &str) -> Signal {
    sim.find_labeled(label)
        .and_then(|i| sim.component(i))
        .and_then(|c| sim.read_at(c.anchor()))
        .unwrap_or_default()
}

fn run_demo() -> Result<()> {
    let registry = CircuitRegistry::from_document(&half_adder_demo())?;
    let mut sim = registry.simulate("main", EngineConfig::default())?;
    let (a, b) = (sim.find_labeled("a"), sim.find_labeled("b"));

    println!("a b | s c");
    // Gray code, one press per step
    for pin in [None, a, b, a] {
        if let Some(pin) = pin {
            sim.activate(pin)?;
        }
        println!(
            "{} {} | {} {}",
            level(&sim, "a"),
            level(&sim, "b"),
            level(&sim, "s"),
            level(&sim, "c")
        );
    }
    print!("{}", sim.grid());
    Ok(())
}

#[cfg(feature = "circ")]
fn run_file(path: &Path, name: Option<&str>) -> Result<()> {
    let doc = signal_net::circ::read_document(path)?;
    let registry = CircuitRegistry::from_document(&doc)?;
    let name = match name {
        Some(name) => name.to_string(),
        None => doc
            .circuits
            .first()
            .map(|c| c.name.clone())
            .ok_or(Error::EmptyDocument)?,
    };
    let sim = registry.simulate(&name, EngineConfig::default())?;
    let report = sim.priming();
    println!(
        "{name}: {} components, {} nets, settled in {} rounds{}",
        sim.component_count(),
        sim.net_count(),
        report.rounds,
        if report.truncated() { " (oscillating)" } else { "" }
    );
    print!("{}", sim.grid());
    Ok(())
}

#[cfg(feature = "circ")]
fn run(args: Args) -> Result<()> {
    match args.path {
        Some(path) => run_file(&path, args.circuit.as_deref()),
        None => run_demo(),
    }
}

#[cfg(not(feature = "circ"))]
fn run(_args: Args) -> Result<()> {
    run_demo()
}

fn main() -> ExitCode {
    env_logger::init();

    let args = <Args as clap::Parser>::parse();
    log::debug!("{args:?}");
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
