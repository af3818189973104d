use clap::{Parser, Subcommand};
use fshtool::container::{Container, ImportPolicy};
use fshtool::name::UNKNOWN_NAME;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fshtool", about = "Block-level editor for SHPI .str containers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the blocks in a .str container
    List {
        input: PathBuf,
        /// Emit machine-readable block summaries
        #[arg(long)]
        json: bool,
    },
    /// Show container metadata and per-block detail
    Info {
        input: PathBuf,
    },
    /// Export one block to a .fsh file
    Export {
        input: PathBuf,
        /// Block index as shown by `list`
        index: usize,
        /// Output file, or a directory to use the block's own name
        #[arg(short, long)]
        output: PathBuf,
        /// Export the raw block range instead of trimming at the last null
        #[arg(long)]
        raw: bool,
    },
    /// Replace one block with the contents of a .fsh file
    Import {
        input: PathBuf,
        /// Block index as shown by `list`
        index: usize,
        /// Replacement .fsh file
        fsh: PathBuf,
        /// Where to write the edited container (defaults to overwriting input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Proceed even if the replacement does not start with 'SHPI'
        #[arg(long)]
        force: bool,
    },
    /// Verify the block index tiles the container exactly
    Check {
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input, json } => {
            let c = Container::open(&input)?;
            let summaries = c.summaries();
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else if summaries.is_empty() {
                println!("No SHPI blocks found in {}", input.display());
            } else {
                for s in &summaries {
                    println!(
                        "{:03}: {:<28}  offset=0x{:08X}  len={:6}  pad={:4}  sig=0x{:02X}",
                        s.index, s.name, s.offset, s.length, s.padding_len, s.sig_byte
                    );
                }
            }
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input } => {
            let c = Container::open(&input)?;
            println!("── .str container ──────────────────────────────────────");
            println!("  Path          {}", input.display());
            println!("  Size          {} B", c.len());
            println!("  Blocks        {}", c.blocks().len());
            println!("  Leading bytes {} B", c.leading_len());
            for s in c.summaries() {
                let pad = c.blocks()[s.index].padding(c.bytes());
                let pad_preview = if pad.is_empty() {
                    "—".to_string()
                } else if pad.len() > 8 {
                    format!("{}…", hex::encode(&pad[..8]))
                } else {
                    hex::encode(pad)
                };
                println!(
                    "  [{:03}] {:<28} offset=0x{:08X} len={:6} sig=0x{:02X} pad[{:4}]={}",
                    s.index, s.name, s.offset, s.length, s.sig_byte, s.padding_len, pad_preview
                );
            }
        }

        // ── Export ───────────────────────────────────────────────────────────
        Commands::Export { input, index, output, raw } => {
            let c = Container::open(&input)?;
            let data = if raw { c.export_raw(index)? } else { c.export_trimmed(index)? };
            let path = resolve_export_path(output, &c.blocks()[index].name);
            std::fs::write(&path, data)?;
            println!("Exported block {} → {} ({} bytes)", index, path.display(), data.len());
        }

        // ── Import ───────────────────────────────────────────────────────────
        Commands::Import { input, index, fsh, output, force } => {
            let mut c = Container::open(&input)?;
            let new_bytes = std::fs::read(&fsh)?;
            let policy = if force { ImportPolicy::Lenient } else { ImportPolicy::Strict };
            let outcome = c.import_replace(index, &new_bytes, policy)?;
            if !outcome.signature_ok {
                eprintln!("warning: {} does not start with 'SHPI'", fsh.display());
            }
            let out = output.unwrap_or(input);
            c.save(&out)?;
            println!(
                "Replaced block {} ({} → {} bytes), saved {}",
                index, outcome.old_len, outcome.new_len, out.display()
            );
        }

        // ── Check ────────────────────────────────────────────────────────────
        Commands::Check { input } => {
            let c = Container::open(&input)?;
            if !c.blocks().is_empty() && c.leading_len() > 0 {
                println!("note: {} byte(s) before the first signature", c.leading_len());
            }
            if c.is_consistent() {
                println!("OK: {} block(s) tile {} bytes", c.blocks().len(), c.len());
            } else {
                eprintln!("MISMATCH: block concatenation differs from the buffer");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

/// A directory target gets a file name from the block's own name, the way
/// the original export dialog pre-filled it.
fn resolve_export_path(output: PathBuf, block_name: &str) -> PathBuf {
    if output.is_dir() {
        let stem = if block_name == UNKNOWN_NAME { "unknown" } else { block_name };
        output.join(format!("{stem}.fsh"))
    } else {
        output
    }
}
