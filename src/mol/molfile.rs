//! V2000 molfile blocks, the connection table at the head of every SDF
//! record.

use std::fmt::Write;

use thiserror::Error;

use super::{Atom, BondOrder, Element, Molecule};

#[derive(Debug, Error, PartialEq)]
pub enum MolfileError {
    #[error("molblock ends before the {0}")]
    Truncated(&'static str),

    #[error("invalid counts line {0:?}")]
    Counts(String),

    #[error("V3000 molfiles are not supported")]
    V3000,

    #[error("invalid atom line {0:?}")]
    Atom(String),

    #[error("unknown element {0:?}")]
    Element(String),

    #[error("invalid bond line {0:?}")]
    Bond(String),

    #[error("value out of range in property line {0:?}")]
    Property(String),

    #[error("{0} atoms or bonds do not fit in a V2000 block")]
    TooLarge(usize),
}

/// the most atoms or bonds the three-character V2000 columns can count
const MAX_ENTRIES: usize = 999;

/// the valence field value meaning "no bonds and no hydrogens"
const ZERO_VALENCE: u8 = 15;

type Result<T> = std::result::Result<T, MolfileError>;

/// the trimmed text of `line[start..end]`, clamped to the line length
fn column(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start.min(end)..end).unwrap_or("").trim()
}

/// parse a count or index from a fixed-width column, falling back to the
/// `n`th whitespace-separated field for files that don't respect the widths
fn fixed_or_field(line: &str, start: usize, end: usize, n: usize) -> Option<usize> {
    column(line, start, end)
        .parse()
        .ok()
        .or_else(|| line.split_whitespace().nth(n)?.parse().ok())
}

fn counts(line: &str) -> Result<(usize, usize)> {
    if line.contains("V3000") {
        return Err(MolfileError::V3000);
    }
    let atoms = fixed_or_field(line, 0, 3, 0);
    let bonds = fixed_or_field(line, 3, 6, 1);
    match (atoms, bonds) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(MolfileError::Counts(line.to_owned())),
    }
}

/// parse an atom line into the atom and its valence field, if set
fn atom(line: &str) -> Result<(Atom, Option<u8>)> {
    let symbol = match column(line, 31, 34) {
        "" => line
            .split_whitespace()
            .nth(3)
            .ok_or_else(|| MolfileError::Atom(line.to_owned()))?,
        s => s,
    };
    let element = match symbol {
        "A" | "Q" | "*" | "R#" | "L" => Element(0),
        s => Element::from_symbol(s)
            .ok_or_else(|| MolfileError::Element(s.to_owned()))?,
    };
    let mut atom = Atom::new(element);
    atom.charge = match column(line, 36, 39) {
        "1" => 3,
        "2" => 2,
        "3" => 1,
        "5" => -1,
        "6" => -2,
        "7" => -3,
        _ => 0,
    };
    let valence = match column(line, 48, 51).parse::<u8>() {
        Ok(0) | Err(_) => None,
        Ok(ZERO_VALENCE) => Some(0),
        Ok(v) => Some(v),
    };
    Ok((atom, valence))
}

fn bond(line: &str, natoms: usize) -> Result<(usize, usize, BondOrder)> {
    let err = || MolfileError::Bond(line.to_owned());
    let a = fixed_or_field(line, 0, 3, 0).ok_or_else(err)?;
    let b = fixed_or_field(line, 3, 6, 1).ok_or_else(err)?;
    let order = match fixed_or_field(line, 6, 9, 2).ok_or_else(err)? {
        1 => BondOrder::Single,
        2 => BondOrder::Double,
        3 => BondOrder::Triple,
        4 => BondOrder::Aromatic,
        _ => return Err(err()),
    };
    if a == 0 || b == 0 || a > natoms || b > natoms {
        return Err(err());
    }
    Ok((a - 1, b - 1, order))
}

/// the (atom index, value) pairs of an `M  CHG` or `M  ISO` line
fn property_pairs(line: &str) -> Vec<(usize, i32)> {
    let fields: Vec<i32> = line
        .split_whitespace()
        .skip(3)
        .filter_map(|s| s.parse().ok())
        .collect();
    fields
        .chunks_exact(2)
        .filter(|p| p[0] > 0)
        .map(|p| (p[0] as usize - 1, p[1]))
        .collect()
}

pub fn parse(block: &str) -> Result<Molecule> {
    let mut lines = block.lines();
    for _ in 0..3 {
        lines.next().ok_or(MolfileError::Truncated("header"))?;
    }
    let (natoms, nbonds) =
        counts(lines.next().ok_or(MolfileError::Truncated("counts line"))?)?;

    let mut mol = Molecule::new();
    let mut valences = Vec::with_capacity(natoms);
    for _ in 0..natoms {
        let line = lines.next().ok_or(MolfileError::Truncated("atom block"))?;
        let (atom, valence) = atom(line)?;
        mol.add_atom(atom);
        valences.push(valence);
    }
    for _ in 0..nbonds {
        let line = lines.next().ok_or(MolfileError::Truncated("bond block"))?;
        let (a, b, order) = bond(line, natoms)?;
        if !mol.add_bond(a, b, order) {
            return Err(MolfileError::Bond(line.to_owned()));
        }
        if order == BondOrder::Aromatic {
            mol.atoms_mut()[a].aromatic = true;
            mol.atoms_mut()[b].aromatic = true;
        }
    }

    let mut charges_reset = false;
    loop {
        let line = lines.next().ok_or(MolfileError::Truncated("M  END line"))?;
        if line.starts_with("M  END") {
            break;
        }
        if line.starts_with("M  CHG") {
            // any CHG line supersedes the charges of the atom block
            if !charges_reset {
                mol.atoms_mut().iter_mut().for_each(|a| a.charge = 0);
                charges_reset = true;
            }
            for (i, v) in property_pairs(line) {
                let charge = i8::try_from(v)
                    .ok()
                    .filter(|c| c.abs() <= MAX_CHARGE)
                    .ok_or_else(|| MolfileError::Property(line.to_owned()))?;
                if let Some(a) = mol.atoms_mut().get_mut(i) {
                    a.charge = charge;
                }
            }
        } else if line.starts_with("M  ISO") {
            for (i, v) in property_pairs(line) {
                let iso = u16::try_from(v)
                    .ok()
                    .filter(|&m| m > 0)
                    .ok_or_else(|| MolfileError::Property(line.to_owned()))?;
                if let Some(a) = mol.atoms_mut().get_mut(i) {
                    a.isotope = Some(iso);
                }
            }
        }
    }

    mol.assign_implicit_hydrogens(0..natoms);
    // an explicit valence fixes the hydrogen count instead
    for (i, valence) in valences.into_iter().enumerate() {
        if let Some(v) = valence {
            let used = mol.explicit_valence(i);
            mol.atoms_mut()[i].hydrogens = v.saturating_sub(used);
        }
    }
    Ok(mol)
}

/// the largest charge magnitude accepted from an `M  CHG` line
const MAX_CHARGE: i8 = 15;

/// write `mol` as a V2000 block with zeroed coordinates, ending in `M  END`.
/// hydrogen counts the default valence model would not reproduce are kept in
/// the atom valence field
pub fn write(mol: &Molecule, title: &str) -> Result<String> {
    let size = mol.num_atoms().max(mol.bonds().len());
    if size > MAX_ENTRIES {
        return Err(MolfileError::TooLarge(size));
    }
    let mut out = String::new();
    // writing to a String cannot fail
    let _ = write_block(&mut out, mol, title);
    Ok(out)
}

fn write_block(
    out: &mut String,
    mol: &Molecule,
    title: &str,
) -> std::fmt::Result {
    writeln!(out, "{title}")?;
    writeln!(out, "  molpredict")?;
    writeln!(out)?;
    writeln!(
        out,
        "{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000",
        mol.num_atoms(),
        mol.bonds().len()
    )?;
    for (i, atom) in mol.atoms().iter().enumerate() {
        let valence = if atom.hydrogens == mol.implicit_hydrogens(i) {
            0
        } else {
            match mol.explicit_valence(i).saturating_add(atom.hydrogens) {
                0 => ZERO_VALENCE,
                v if v < ZERO_VALENCE => v,
                // not representable, fall back to the default valence
                _ => 0,
            }
        };
        writeln!(
            out,
            "{:>10.4}{:>10.4}{:>10.4} {:<3} 0  0  0  0  0{:>3}  0  0  0  0  0  0",
            0.0,
            0.0,
            0.0,
            atom.element.symbol(),
            valence
        )?;
    }
    for bond in mol.bonds() {
        let order = match bond.order {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 4,
        };
        writeln!(
            out,
            "{:>3}{:>3}{:>3}  0  0  0  0",
            bond.begin + 1,
            bond.end + 1,
            order
        )?;
    }

    let charges: Vec<_> = mol
        .atoms()
        .iter()
        .enumerate()
        .filter(|(_, a)| a.charge != 0)
        .map(|(i, a)| (i, a.charge as i32))
        .collect();
    write_property(out, "CHG", &charges)?;
    let isotopes: Vec<_> = mol
        .atoms()
        .iter()
        .enumerate()
        .filter_map(|(i, a)| a.isotope.map(|iso| (i, iso as i32)))
        .collect();
    write_property(out, "ISO", &isotopes)?;

    writeln!(out, "M  END")
}

/// write `M  <tag>` lines, at most eight entries per line
fn write_property(
    out: &mut String,
    tag: &str,
    entries: &[(usize, i32)],
) -> std::fmt::Result {
    for chunk in entries.chunks(8) {
        write!(out, "M  {tag}{:>3}", chunk.len())?;
        for (i, v) in chunk {
            write!(out, " {:>3} {:>3}", i + 1, v)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
