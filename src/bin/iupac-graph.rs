use std::io::{self, BufRead};

use anyhow::{bail, Context, Result};
use iupac_graph::*;

fn atom_line(atom: &Atom) -> String {
    let mut line = format!("  {:>3} {}", atom.id, atom.element);
    if atom.aromatic {
        line.push_str(" aromatic");
    }
    if atom.charge != 0 {
        line.push_str(&format!(" charge {:+}", atom.charge));
    }
    if let Some(chirality) = atom.chirality {
        line.push_str(&format!(" {:?}", chirality));
    }
    line
}

fn bond_line(bond: &Bond) -> String {
    let mut line = format!("  {:>3} - {:<3} {:?}", bond.atom1, bond.atom2, bond.order);
    if bond.stereo != BondStereo::None {
        line.push_str(&format!(" {:?}", bond.stereo));
    }
    line
}

fn print_outcome(name: &str, outcome: &BuildOutcome) {
    let molecule = &outcome.molecule;
    println!("{}: {} atoms, {} bonds", name, molecule.atoms.len(), molecule.bonds.len());
    for atom in &molecule.atoms {
        println!("{}", atom_line(atom));
    }
    for bond in &molecule.bonds {
        println!("{}", bond_line(bond));
    }
    for warning in &outcome.warnings {
        println!("  warning: {}", warning);
    }
}

fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let level = match args.iter().position(|a| a == "--log") {
        Some(i) => {
            let level = args.get(i + 1).cloned().context("--log needs a level")?;
            args.drain(i..=i + 1);
            level
        }
        None => "warn".to_string(),
    };
    init_logging(&level);

    let names = if args.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("reading names from stdin")?
    } else {
        args
    };

    let mut failed = 0;
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        match parse_name(name) {
            Ok(outcome) => print_outcome(name, &outcome),
            Err(e) => {
                eprintln!("{}", e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{} name(s) could not be built", failed);
    }
    Ok(())
}
