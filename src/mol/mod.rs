//! A small molecular graph: just enough chemistry to read SMILES and V2000
//! molfiles, write them back out, and compute the descriptors the models are
//! built on.

use std::fmt::Display;

pub mod descriptors;
pub mod molfile;
pub mod smiles;

/// (symbol, standard atomic weight), indexed by atomic number. index 0 is the
/// SMILES wildcard `*`
const ELEMENTS: [(&str, f64); 87] = [
    ("*", 0.0),
    ("H", 1.008),
    ("He", 4.0026),
    ("Li", 6.94),
    ("Be", 9.0122),
    ("B", 10.81),
    ("C", 12.011),
    ("N", 14.007),
    ("O", 15.999),
    ("F", 18.998),
    ("Ne", 20.180),
    ("Na", 22.990),
    ("Mg", 24.305),
    ("Al", 26.982),
    ("Si", 28.085),
    ("P", 30.974),
    ("S", 32.06),
    ("Cl", 35.45),
    ("Ar", 39.948),
    ("K", 39.098),
    ("Ca", 40.078),
    ("Sc", 44.956),
    ("Ti", 47.867),
    ("V", 50.942),
    ("Cr", 51.996),
    ("Mn", 54.938),
    ("Fe", 55.845),
    ("Co", 58.933),
    ("Ni", 58.693),
    ("Cu", 63.546),
    ("Zn", 65.38),
    ("Ga", 69.723),
    ("Ge", 72.630),
    ("As", 74.922),
    ("Se", 78.971),
    ("Br", 79.904),
    ("Kr", 83.798),
    ("Rb", 85.468),
    ("Sr", 87.62),
    ("Y", 88.906),
    ("Zr", 91.224),
    ("Nb", 92.906),
    ("Mo", 95.95),
    ("Tc", 98.0),
    ("Ru", 101.07),
    ("Rh", 102.91),
    ("Pd", 106.42),
    ("Ag", 107.87),
    ("Cd", 112.41),
    ("In", 114.82),
    ("Sn", 118.71),
    ("Sb", 121.76),
    ("Te", 127.60),
    ("I", 126.90),
    ("Xe", 131.29),
    ("Cs", 132.91),
    ("Ba", 137.33),
    ("La", 138.91),
    ("Ce", 140.12),
    ("Pr", 140.91),
    ("Nd", 144.24),
    ("Pm", 145.0),
    ("Sm", 150.36),
    ("Eu", 151.96),
    ("Gd", 157.25),
    ("Tb", 158.93),
    ("Dy", 162.50),
    ("Ho", 164.93),
    ("Er", 167.26),
    ("Tm", 168.93),
    ("Yb", 173.05),
    ("Lu", 174.97),
    ("Hf", 178.49),
    ("Ta", 180.95),
    ("W", 183.84),
    ("Re", 186.21),
    ("Os", 190.23),
    ("Ir", 192.22),
    ("Pt", 195.08),
    ("Au", 196.97),
    ("Hg", 200.59),
    ("Tl", 204.38),
    ("Pb", 207.2),
    ("Bi", 208.98),
    ("Po", 209.0),
    ("At", 210.0),
    ("Rn", 222.0),
];

/// An element, stored as its atomic number. 0 is the wildcard atom
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(u8);

impl Element {
    pub const H: Self = Self(1);
    pub const C: Self = Self(6);
    pub const N: Self = Self(7);
    pub const O: Self = Self(8);

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        ELEMENTS
            .iter()
            .position(|(s, _)| *s == symbol)
            .map(|n| Self(n as u8))
    }

    pub fn from_atomic_number(n: u8) -> Option<Self> {
        ((n as usize) < ELEMENTS.len()).then_some(Self(n))
    }

    pub fn atomic_number(&self) -> u8 {
        self.0
    }

    pub fn symbol(&self) -> &'static str {
        ELEMENTS[self.0 as usize].0
    }

    pub fn mass(&self) -> f64 {
        ELEMENTS[self.0 as usize].1
    }

    /// the allowed valences for an atom with `self`'s atomic number shifted
    /// by `charge`. a charged atom takes the valences of its isoelectronic
    /// neighbor, so N+ behaves like C and O- like F. elements without a
    /// default valence never receive implicit hydrogens
    fn default_valences(&self, charge: i8) -> &'static [u8] {
        let n = self.0 as i16 - charge as i16;
        match n {
            1 => &[1],
            5 => &[3],
            6 => &[4],
            7 => &[3, 5],
            8 => &[2],
            9 => &[1],
            14 => &[4],
            15 => &[3, 5],
            16 => &[2, 4, 6],
            17 | 35 | 53 => &[1],
            _ => &[],
        }
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// contribution to an atom's valence. aromatic bonds count as single
    /// here; the extra electron is added once per aromatic atom
    fn valence(&self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub aromatic: bool,
    pub charge: i8,
    pub isotope: Option<u16>,
    /// attached hydrogens that are not atoms of the graph
    pub hydrogens: u8,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            aromatic: false,
            charge: 0,
            isotope: None,
            hydrogens: 0,
        }
    }

    pub fn mass(&self) -> f64 {
        match self.isotope {
            Some(iso) => iso as f64,
            None => self.element.mass(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

impl Bond {
    /// the atom on the other side of `self` from `atom`
    pub fn other(&self, atom: usize) -> usize {
        if self.begin == atom {
            self.end
        } else {
            self.begin
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    /// bond indices for each atom, in insertion order
    adjacency: Vec<Vec<usize>>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    /// parse `smiles` into a [Molecule]
    pub fn from_smiles(smiles: &str) -> Result<Self, smiles::SmilesError> {
        smiles::parse(smiles)
    }

    pub fn to_smiles(&self) -> String {
        smiles::write(self)
    }

    pub fn from_molblock(block: &str) -> Result<Self, molfile::MolfileError> {
        molfile::parse(block)
    }

    /// fails only for molecules too large for a V2000 block
    pub fn to_molblock(
        &self,
        title: &str,
    ) -> Result<String, molfile::MolfileError> {
        molfile::write(self, title)
    }

    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        self.atoms.len() - 1
    }

    /// add a bond between `begin` and `end`, returning false if either index
    /// is out of range, the atoms are the same, or the bond already exists
    pub fn add_bond(&mut self, begin: usize, end: usize, order: BondOrder) -> bool {
        if begin == end
            || begin >= self.atoms.len()
            || end >= self.atoms.len()
            || self.bond_between(begin, end).is_some()
        {
            return false;
        }
        self.bonds.push(Bond { begin, end, order });
        let idx = self.bonds.len() - 1;
        self.adjacency[begin].push(idx);
        self.adjacency[end].push(idx);
        true
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// the indices into [Self::bonds] of the bonds touching `atom`
    pub fn atom_bonds(&self, atom: usize) -> &[usize] {
        &self.adjacency[atom]
    }

    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency[atom].len()
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<&Bond> {
        self.adjacency
            .get(a)?
            .iter()
            .map(|&i| &self.bonds[i])
            .find(|bond| bond.other(a) == b)
    }

    /// the sum of bond orders at `atom`, counting aromatic atoms as having
    /// one extra bond
    pub(crate) fn explicit_valence(&self, atom: usize) -> u8 {
        let bonds: u8 = self.adjacency[atom]
            .iter()
            .map(|&i| self.bonds[i].order.valence())
            .sum();
        bonds + self.atoms[atom].aromatic as u8
    }

    /// the number of hydrogens needed to bring `atom` up to its lowest
    /// default valence that fits the bonds already present
    pub(crate) fn implicit_hydrogens(&self, atom: usize) -> u8 {
        let a = &self.atoms[atom];
        let used = self.explicit_valence(atom);
        a.element
            .default_valences(a.charge)
            .iter()
            .find(|&&v| v >= used)
            .map(|v| v - used)
            .unwrap_or(0)
    }

    /// fill in [Atom::hydrogens] for every atom in `atoms` from the default
    /// valence model
    pub(crate) fn assign_implicit_hydrogens(
        &mut self,
        atoms: impl IntoIterator<Item = usize>,
    ) {
        for i in atoms {
            self.atoms[i].hydrogens = self.implicit_hydrogens(i);
        }
    }

    /// the number of connected components
    pub fn num_components(&self) -> usize {
        let mut seen = vec![false; self.atoms.len()];
        let mut count = 0;
        for start in 0..self.atoms.len() {
            if seen[start] {
                continue;
            }
            count += 1;
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(a) = stack.pop() {
                for &b in &self.adjacency[a] {
                    let n = self.bonds[b].other(a);
                    if !seen[n] {
                        seen[n] = true;
                        stack.push(n);
                    }
                }
            }
        }
        count
    }

    /// one flag per bond, true if the bond lies on a ring. a bond is in a
    /// ring exactly when it is not a bridge of the graph
    pub fn ring_bonds(&self) -> Vec<bool> {
        let n = self.atoms.len();
        let mut disc = vec![usize::MAX; n];
        let mut low = vec![0; n];
        let mut in_ring = vec![true; self.bonds.len()];
        let mut timer = 0;
        // (atom, the bond it was reached by, index of its next bond)
        let mut stack: Vec<(usize, Option<usize>, usize)> = Vec::new();
        for start in 0..n {
            if disc[start] != usize::MAX {
                continue;
            }
            disc[start] = timer;
            low[start] = timer;
            timer += 1;
            stack.push((start, None, 0));
            while let Some(top) = stack.last_mut() {
                let (atom, parent) = (top.0, top.1);
                let Some(&b) = self.adjacency[atom].get(top.2) else {
                    stack.pop();
                    if let (Some(b), Some(&(up, ..))) = (parent, stack.last()) {
                        low[up] = low[up].min(low[atom]);
                        if low[atom] > disc[up] {
                            in_ring[b] = false;
                        }
                    }
                    continue;
                };
                top.2 += 1;
                if Some(b) == parent {
                    continue;
                }
                let next = self.bonds[b].other(atom);
                if disc[next] == usize::MAX {
                    disc[next] = timer;
                    low[next] = timer;
                    timer += 1;
                    stack.push((next, Some(b), 0));
                } else {
                    low[atom] = low[atom].min(disc[next]);
                }
            }
        }
        in_ring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_lookup() {
        assert_eq!(Element::from_symbol("Cl").map(|e| e.atomic_number()), Some(17));
        assert_eq!(Element::from_symbol("Xx"), None);
        assert_eq!(Element::C.symbol(), "C");
        assert_eq!(Element::from_atomic_number(200), None);
    }

    #[test]
    fn charged_valences() {
        // ammonium: N+ takes carbon's valence of 4
        let mol = Molecule::from_smiles("[NH4+]").unwrap();
        assert_eq!(mol.atoms()[0].hydrogens, 4);

        let mut mol = Molecule::new();
        let mut n = Atom::new(Element::N);
        n.charge = 1;
        mol.add_atom(n);
        mol.assign_implicit_hydrogens([0]);
        assert_eq!(mol.atoms()[0].hydrogens, 4);
    }

    #[test]
    fn duplicate_bonds_rejected() {
        let mut mol = Molecule::new();
        let a = mol.add_atom(Atom::new(Element::C));
        let b = mol.add_atom(Atom::new(Element::C));
        assert!(mol.add_bond(a, b, BondOrder::Single));
        assert!(!mol.add_bond(b, a, BondOrder::Single));
        assert!(!mol.add_bond(a, a, BondOrder::Single));
        assert!(!mol.add_bond(a, 7, BondOrder::Single));
    }

    #[test]
    fn ring_membership() {
        // methylcyclohexane: six ring bonds and one chain bond
        let mol = Molecule::from_smiles("CC1CCCCC1").unwrap();
        let rings = mol.ring_bonds();
        assert_eq!(rings.iter().filter(|&&r| r).count(), 6);
        assert!(!rings[0]);
        assert_eq!(mol.num_components(), 1);

        let salt = Molecule::from_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(salt.num_components(), 2);

        // only the bond joining the two rings is a bridge
        let biphenyl = Molecule::from_smiles("c1ccccc1-c1ccccc1").unwrap();
        let rings = biphenyl.ring_bonds();
        assert_eq!(rings.len(), 13);
        assert_eq!(rings.iter().filter(|&&r| !r).count(), 1);
        let bridge = biphenyl.bonds()[rings.iter().position(|&r| !r).unwrap()];
        assert_eq!((bridge.begin, bridge.end), (5, 6));
    }
}
