use glam::Vec2;
use std::fs;

use voidmaw::cli::DemoOptions;
use voidmaw::combat::CombatPhase;
use voidmaw::config::SimConfig;
use voidmaw::constants::FIXED_DT;
use voidmaw::Simulation;

const DEFAULT_CONFIG_PATH: &str = "voidmaw.json";
const DEFAULT_SCRIPT_PATH: &str = "assets/scripts/volley.rhai";

fn main() {
    let options = match DemoOptions::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };

    let config_path = options.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let config = SimConfig::load_or_default(config_path);
    let field_width = config.field.width;
    let field_height = config.field.height;

    let mut sim = Simulation::new(config);
    sim.populate_scenery();
    sim.start_encounter();

    let script_path = options.script.as_deref().unwrap_or(DEFAULT_SCRIPT_PATH);
    let source = match fs::read_to_string(script_path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("[demo] cannot read script {script_path}: {err}");
            std::process::exit(1);
        }
    };
    let spawn = Vec2::new(field_width * 0.2, field_height * 0.5);
    if let Err(err) = sim.execute_script(&source, spawn, None) {
        eprintln!("[sandbox] {err}");
    }

    let ticks = options.ticks.unwrap_or(3600);
    for _ in 0..ticks {
        for event in sim.tick(FIXED_DT) {
            println!("[sim] {event}");
        }
        if sim.combat().phase().is_terminal() {
            break;
        }
    }

    let stats = *sim.combat().stats();
    println!("[demo] phase: {:?}", sim.combat().phase());
    println!("[demo] elapsed: {:.2}s", sim.combat().elapsed());
    println!("[demo] health remaining: {:.1}", sim.health_value());
    println!("[demo] objects created: {}", stats.objects_created);
    println!("[demo] objects consumed: {}", stats.objects_consumed);
    println!("[demo] total damage dealt: {:.2}", stats.total_damage_dealt);
    if let Some(victory_time) = stats.victory_time {
        println!("[demo] victory at {victory_time:.2}s");
    }
    if sim.combat().phase() == CombatPhase::Defeat {
        println!("[demo] the void won");
    }
}
