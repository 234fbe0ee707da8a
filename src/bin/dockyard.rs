use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dockyard::common::config::{Config, config_file};
use dockyard::common::log;
use dockyard::dock_engine::factory::{LeafFactory, TabFactory};
use dockyard::dock_engine::kinds::{Border, Float, Line, Split};
use dockyard::dock_engine::{DockEngine, DockId, Orientation, Position, PropertyStore, Side};
use dockyard::model::dockable::{Dockable, DockingModes};
use dockyard::sys::geometry::{Point, Rect, Size};
use tracing::info;

#[derive(Parser)]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a sample layout, print it and save it.
    Demo {
        /// Where to write the layout (defaults to the configured layout file).
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Load a saved layout and print its dock tree.
    Inspect {
        /// Layout file to read (defaults to the configured layout file).
        path: Option<PathBuf>,
        /// Print the structural snapshot as JSON instead of a tree.
        #[arg(long)]
        json: bool,
    },
    /// Check the configuration file for problems.
    Validate,
}

fn main() -> anyhow::Result<()> {
    let opt = Cli::parse();
    log::init_logging();

    let config_path = opt.config.clone().unwrap_or_else(config_file);
    let config = if config_path.exists() {
        Config::read(&config_path).with_context(|| format!("reading {}", config_path.display()))?
    } else {
        Config::default()
    };

    match opt.command {
        Commands::Demo { out } => {
            let path = out.unwrap_or_else(|| config.settings.persistence.layout_file());
            let mut engine = DockEngine::new(config.settings.docking.clone());
            let roots = build_demo(&mut engine)?;
            for root in &roots {
                print!("{}", engine.draw_tree(*root));
            }
            engine.save_layout(&roots)?.save_to(&path)?;
            info!(path = %path.display(), "saved demo layout");
            println!("Saved layout to {}", path.display());
        }
        Commands::Inspect { path, json } => {
            let path = path.unwrap_or_else(|| config.settings.persistence.layout_file());
            let store = PropertyStore::load_from(&path)?;
            let mut engine = DockEngine::new(config.settings.docking.clone());
            let roots = engine.load_layout(&store, placeholders(&store), None)?;
            for root in roots {
                if json {
                    println!("{}", serde_json::to_string_pretty(&engine.snapshot(root)?)?);
                } else {
                    print!("{}", engine.draw_tree(root));
                }
            }
        }
        Commands::Validate => {
            let config = Config::read(&config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            let issues = config.validate();
            if issues.is_empty() {
                println!("Config validation passed");
            } else {
                eprintln!("Config validation found {} issue(s):", issues.len());
                for issue in &issues {
                    eprintln!("  - {issue}");
                }
                process::exit(1);
            }
        }
    }
    Ok(())
}

fn panel(id: &str, width: i32, height: i32) -> Dockable {
    Dockable::new(id, DockingModes::ALL, Size::new(width, height)).with_title(id)
}

/// An editor area split in two, tool tabs on the left, a console line at the
/// bottom and one floating inspector.
fn build_demo(engine: &mut DockEngine) -> anyhow::Result<Vec<DockId>> {
    let main = engine.add_root(Border::new(Box::new(TabFactory)), Rect::new(0, 0, 1280, 800));
    let editors = engine.create_dock(Split::new(Box::new(LeafFactory)));
    engine.add_child_dock(main, editors, &Position::side(Side::Center))?;
    let area = engine.bounds(editors).unwrap_or_default();
    engine.add_dockable(editors, panel("main.rs", 600, 500), area.center())?;
    engine.add_dockable(editors, panel("lib.rs", 400, 500), Point::new(area.right() - 1, area.center().y))?;

    engine.add_dockable_at(main, panel("files", 240, 600), &Position::side(Side::Left))?;
    let tools = engine.home_of(&"files".into()).context("files panel is not docked")?;
    engine.add_dockable_at(tools, panel("outline", 240, 600), &Position::index(1))?;

    let console = engine.create_dock(Line::new(Orientation::Horizontal));
    engine.add_child_dock(main, console, &Position::side(Side::Bottom))?;
    engine.add_dockable_at(console, panel("terminal", 640, 160), &Position::index(0))?;
    engine.add_dockable_at(console, panel("problems", 640, 160), &Position::index(1))?;

    let floating = engine.add_root(Float::default(), Rect::default());
    engine.add_dockable(floating, panel("inspector", 320, 400), Point::new(900, 120))?;
    Ok(vec![main, floating])
}

/// Stand-in dockables for every id a saved layout names, so it can be
/// rebuilt without the application that owns the real content.
fn placeholders(store: &PropertyStore) -> Vec<Dockable> {
    store
        .iter()
        .filter(|(key, _)| {
            key.rsplit_once('.')
                .is_some_and(|(head, index)| head.ends_with(".dockable") && index.parse::<usize>().is_ok())
        })
        .map(|(_, id)| Dockable::new(id, DockingModes::ALL, Size::default()))
        .collect()
}
