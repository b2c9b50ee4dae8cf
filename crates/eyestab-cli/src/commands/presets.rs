//! Presets command - list population presets and suppression modes.

use anyhow::Result;
use clap::Args;
use eyestab_core::{Population, Preset, SuppressionMode};
use serde::Serialize;

/// Arguments for the presets command
#[derive(Args)]
pub struct PresetsArgs {
    /// Print the registry as JSON
    #[arg(long)]
    pub json: bool,

    /// Show a single preset
    #[arg(value_name = "ID")]
    pub id: Option<String>,
}

#[derive(Serialize)]
struct SuppressionEntry {
    id: &'static str,
    enabled: bool,
    min_run: u32,
}

#[derive(Serialize)]
struct Registry<'a> {
    presets: Vec<&'a Preset>,
    suppression: Vec<SuppressionEntry>,
}

/// Run the presets command.
pub fn run(args: &PresetsArgs) -> Result<()> {
    let presets: Vec<&Preset> = match args.id {
        Some(ref id) => vec![eyestab_core::domain::resolve_preset(id)?],
        None => Population::ALL.iter().map(|p| p.preset()).collect(),
    };

    if args.json {
        let registry = Registry {
            presets,
            suppression: SuppressionMode::ALL
                .iter()
                .map(|m| {
                    let policy = m.policy();
                    SuppressionEntry {
                        id: m.id(),
                        enabled: policy.enabled,
                        min_run: policy.min_run,
                    }
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&registry)?);
        return Ok(());
    }

    for preset in presets {
        print_preset(preset);
    }
    if args.id.is_none() {
        let modes: Vec<&str> = SuppressionMode::ALL.iter().map(|m| m.id()).collect();
        println!("Suppression modes: {}", modes.join(", "));
    }

    Ok(())
}

fn print_preset(preset: &Preset) {
    let opt = |v: Option<f32>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));

    println!("{} - {}", preset.population.id(), preset.name);
    println!("  {}", preset.description);
    println!(
        "  blink threshold {:.2}, smoothing {:.2}, enhancement {:.2}",
        preset.blink_threshold, preset.smoothing_strength, preset.enhancement_strength
    );
    println!(
        "  baseline EAR {}, eyelid weight {}, iris factor {}, contrast {}",
        preset
            .baseline_ear
            .map_or_else(|| "calibrated".to_string(), |v| format!("{v:.2}")),
        opt(preset.eyelid_weight),
        opt(preset.iris_visibility_factor),
        opt(preset.contrast_boost),
    );
}
