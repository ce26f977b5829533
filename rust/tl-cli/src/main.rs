//! tlc: compile a TL schema into TypeScript bindings.
//!
//! Reads a `.tl` schema, compiles it, writes the generated module, and
//! propagates the schema's `// LAYER <n>` marker into a persisted constant.
//! Nothing is written unless the whole compilation succeeds.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;

/// Compile a TL schema into TypeScript bindings.
#[derive(Parser)]
#[command(name = "tlc", version)]
struct Cli {
    /// Schema source (.tl)
    #[arg(long)]
    schema: PathBuf,

    /// Generated module destination (.ts)
    #[arg(long)]
    out: PathBuf,

    /// File holding the persisted `LAYER = <n>` constant to patch
    #[arg(long)]
    constants: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let text = std::fs::read_to_string(&cli.schema)?;
    let schema = tl_parse::parse_schema(&text)?;
    let compilation = tl_codegen::compile(&schema)?;
    let module = tl_codegen::targets::typescript::generate(&compilation);

    // Generation is done; only now touch the filesystem.
    std::fs::write(&cli.out, module)?;
    println!("Wrote {}", cli.out.display());

    if let Some(constants) = &cli.constants {
        match compilation.layer {
            Some(layer) => {
                let contents = std::fs::read_to_string(constants)?;
                match tl_codegen::patch_layer(&contents, layer) {
                    Some(patched) => {
                        std::fs::write(constants, patched)?;
                        println!("Patched LAYER = {layer} in {}", constants.display());
                    }
                    None => {
                        warn!(
                            path = %constants.display(),
                            "no `LAYER = <n>` constant found; left untouched"
                        );
                    }
                }
            }
            None => {
                warn!("schema has no `// LAYER <n>` marker; skipping constant patch");
            }
        }
    }

    Ok(())
}
