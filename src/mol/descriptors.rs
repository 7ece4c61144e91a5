use serde::Deserialize;

use super::{BondOrder, Element, Molecule};

/// A molecular descriptor a model can be built on. In a model file these are
/// written as `"heavy_atoms"`, `"mol_weight"`, ..., or
/// `{"element_count": "Cl"}`
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Descriptor {
    HeavyAtoms,
    Hydrogens,
    MolWeight,
    Rings,
    AromaticAtoms,
    Heteroatoms,
    HbondDonors,
    HbondAcceptors,
    RotatableBonds,
    FormalCharge,
    ElementCount(String),
}

impl Descriptor {
    /// reports whether `self` can be computed. only [Self::ElementCount] can
    /// name something invalid
    pub fn is_valid(&self) -> bool {
        match self {
            Descriptor::ElementCount(s) => Element::from_symbol(s).is_some(),
            _ => true,
        }
    }

    pub fn compute(&self, mol: &Molecule) -> f64 {
        let atoms = mol.atoms();
        let heavy = || atoms.iter().filter(|a| a.element != Element::H);
        let n_o = || {
            atoms
                .iter()
                .filter(|a| a.element == Element::N || a.element == Element::O)
        };
        match self {
            Descriptor::HeavyAtoms => heavy().count() as f64,
            Descriptor::Hydrogens => atoms
                .iter()
                .map(|a| {
                    a.hydrogens as usize + (a.element == Element::H) as usize
                })
                .sum::<usize>() as f64,
            Descriptor::MolWeight => atoms
                .iter()
                .map(|a| a.mass() + a.hydrogens as f64 * Element::H.mass())
                .sum(),
            Descriptor::Rings => {
                let cyclomatic = mol.bonds().len() + mol.num_components();
                cyclomatic.saturating_sub(mol.num_atoms()) as f64
            }
            Descriptor::AromaticAtoms => {
                atoms.iter().filter(|a| a.aromatic).count() as f64
            }
            Descriptor::Heteroatoms => heavy()
                .filter(|a| a.element != Element::C && a.element != Element(0))
                .count() as f64,
            Descriptor::HbondDonors => {
                n_o().filter(|a| a.hydrogens > 0).count() as f64
            }
            Descriptor::HbondAcceptors => n_o().count() as f64,
            Descriptor::RotatableBonds => rotatable_bonds(mol) as f64,
            Descriptor::FormalCharge => {
                atoms.iter().map(|a| a.charge as i32).sum::<i32>() as f64
            }
            Descriptor::ElementCount(symbol) => match Element::from_symbol(symbol)
            {
                Some(e) => atoms.iter().filter(|a| a.element == e).count() as f64,
                None => 0.0,
            },
        }
    }
}

/// single, non-ring bonds between two heavy atoms that each have another
/// heavy neighbor
fn rotatable_bonds(mol: &Molecule) -> usize {
    let in_ring = mol.ring_bonds();
    let heavy_degree = |atom: usize| {
        mol.atom_bonds(atom)
            .iter()
            .filter(|&&b| mol.atoms()[mol.bonds()[b].other(atom)].element != Element::H)
            .count()
    };
    mol.bonds()
        .iter()
        .enumerate()
        .filter(|(i, b)| {
            b.order == BondOrder::Single
                && !in_ring[*i]
                && mol.atoms()[b.begin].element != Element::H
                && mol.atoms()[b.end].element != Element::H
                && heavy_degree(b.begin) > 1
                && heavy_degree(b.end) > 1
        })
        .count()
}
