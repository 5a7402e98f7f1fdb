//! List command

use anyhow::Result;
use tracing::trace;

use crate::ListArgs;

pub fn run(args: ListArgs, verbose: bool) -> Result<()> {
    trace!(json = args.json, "list::run");
    let effects = livefx_effects::list();

    if args.json {
        return super::print_json(&effects);
    }

    for e in &effects {
        println!("{:<28} {:<28} v{}", e.id, e.title, e.version);
    }
    if verbose {
        println!("{} effects", effects.len());
    }
    Ok(())
}
