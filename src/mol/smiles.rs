//! Reading and writing SMILES strings.
//!
//! The parser covers the OpenSMILES grammar the chemical databases actually
//! use: organic-subset and bracket atoms, explicit bonds, branches, ring
//! closures and disconnected components. Stereo markers are accepted and
//! dropped, since nothing downstream depends on them.

use std::collections::BTreeMap;

use thiserror::Error;

use super::{Atom, BondOrder, Element, Molecule};

#[derive(Debug, Error, PartialEq)]
pub enum SmilesError {
    #[error("empty SMILES")]
    Empty,

    #[error("unexpected character {ch:?} at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unknown element {symbol:?} at position {pos}")]
    UnknownElement { symbol: String, pos: usize },

    #[error("unterminated bracket atom starting at position {0}")]
    UnterminatedBracket(usize),

    #[error("unbalanced parentheses at position {0}")]
    Parentheses(usize),

    #[error("bond at position {0} does not connect two atoms")]
    DanglingBond(usize),

    #[error("ring bond {0} was opened but never closed")]
    UnclosedRing(u16),

    #[error("invalid ring closure {ring} at position {pos}")]
    InvalidRing { ring: u16, pos: usize },

    #[error("{what} out of range in bracket atom at position {pos}")]
    OutOfRange { what: &'static str, pos: usize },
}

type Result<T> = std::result::Result<T, SmilesError>;

/// the largest formal charge magnitude a bracket atom may carry
const MAX_CHARGE: i32 = 15;

const MAX_ISOTOPE: u32 = 999;

/// a bracket atom's hydrogen count is a single digit
const MAX_HYDROGENS: u32 = 9;

pub fn parse(smiles: &str) -> Result<Molecule> {
    Parser::new(smiles).parse()
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    mol: Molecule,
    /// atoms written without brackets, whose hydrogens are implicit
    organic: Vec<usize>,
    prev: Option<usize>,
    branches: Vec<Option<usize>>,
    /// an explicit bond symbol waiting for its second atom, and its position
    bond: Option<(BondOrder, usize)>,
    /// open ring bonds: ring number -> (atom, explicit bond, position)
    rings: BTreeMap<u16, (usize, Option<BondOrder>, usize)>,
}

impl<'a> Parser<'a> {
    fn new(smiles: &'a str) -> Self {
        Self {
            input: smiles.as_bytes(),
            pos: 0,
            mol: Molecule::new(),
            organic: Vec::new(),
            prev: None,
            branches: Vec::new(),
            bond: None,
            rings: BTreeMap::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn unexpected(&self) -> SmilesError {
        let ch = std::str::from_utf8(&self.input[self.pos..])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        SmilesError::UnexpectedChar { ch, pos: self.pos }
    }

    fn parse(mut self) -> Result<Molecule> {
        if self.input.is_empty() {
            return Err(SmilesError::Empty);
        }
        while let Some(c) = self.peek() {
            match c {
                b'[' | b'*' | b'A'..=b'Z' | b'a'..=b'z' => {
                    let atom = self.atom()?;
                    self.connect(atom)?;
                }
                b'(' => {
                    if self.prev.is_none() || self.bond.is_some() {
                        return Err(SmilesError::Parentheses(self.pos));
                    }
                    self.branches.push(self.prev);
                    self.pos += 1;
                }
                b')' => {
                    if let Some((_, pos)) = self.bond {
                        return Err(SmilesError::DanglingBond(pos));
                    }
                    match self.branches.pop() {
                        // an empty branch leaves prev pointing at its root
                        Some(root) if root != self.prev => self.prev = root,
                        _ => return Err(SmilesError::Parentheses(self.pos)),
                    }
                    self.pos += 1;
                }
                b'0'..=b'9' | b'%' => self.ring()?,
                b'.' => {
                    if let Some((_, pos)) = self.bond {
                        return Err(SmilesError::DanglingBond(pos));
                    }
                    self.prev = None;
                    self.pos += 1;
                }
                b'-' | b'=' | b'#' | b':' | b'/' | b'\\' => {
                    if self.bond.is_some() {
                        return Err(self.unexpected());
                    }
                    let order = match c {
                        b'=' => BondOrder::Double,
                        b'#' => BondOrder::Triple,
                        b':' => BondOrder::Aromatic,
                        _ => BondOrder::Single,
                    };
                    self.bond = Some((order, self.pos));
                    self.pos += 1;
                }
                _ => return Err(self.unexpected()),
            }
        }

        if let Some((_, pos)) = self.bond {
            return Err(SmilesError::DanglingBond(pos));
        }
        if !self.branches.is_empty() {
            return Err(SmilesError::Parentheses(self.pos));
        }
        if let Some((&ring, _)) = self.rings.iter().next() {
            return Err(SmilesError::UnclosedRing(ring));
        }
        if self.mol.num_atoms() == 0 {
            return Err(SmilesError::Empty);
        }

        let organic = std::mem::take(&mut self.organic);
        self.mol.assign_implicit_hydrogens(organic);
        Ok(self.mol)
    }

    fn default_order(&self, a: usize, b: usize) -> BondOrder {
        let atoms = self.mol.atoms();
        if atoms[a].aromatic && atoms[b].aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    /// bond the freshly parsed `atom` to the previous one, if any
    fn connect(&mut self, atom: usize) -> Result<()> {
        match (self.prev, self.bond.take()) {
            (Some(prev), bond) => {
                let order = bond
                    .map(|(o, _)| o)
                    .unwrap_or_else(|| self.default_order(prev, atom));
                // a fresh atom can never already be bonded to prev
                self.mol.add_bond(prev, atom, order);
            }
            (None, Some((_, pos))) => {
                return Err(SmilesError::DanglingBond(pos))
            }
            (None, None) => {}
        }
        self.prev = Some(atom);
        Ok(())
    }

    fn ring(&mut self) -> Result<()> {
        let start = self.pos;
        let ring = if self.peek() == Some(b'%') {
            let digits = (self.peek_at(1), self.peek_at(2));
            match digits {
                (Some(a), Some(b))
                    if a.is_ascii_digit() && b.is_ascii_digit() =>
                {
                    self.pos += 3;
                    ((a - b'0') * 10 + (b - b'0')) as u16
                }
                _ => return Err(self.unexpected()),
            }
        } else {
            let d = self.input[self.pos] - b'0';
            self.pos += 1;
            d as u16
        };

        let Some(prev) = self.prev else {
            return Err(SmilesError::InvalidRing { ring, pos: start });
        };
        let bond = self.bond.take().map(|(o, _)| o);

        match self.rings.remove(&ring) {
            Some((other, open_bond, _)) => {
                let order = match (open_bond, bond) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(SmilesError::InvalidRing {
                            ring,
                            pos: start,
                        })
                    }
                    (Some(o), _) | (None, Some(o)) => o,
                    (None, None) => self.default_order(other, prev),
                };
                if !self.mol.add_bond(other, prev, order) {
                    return Err(SmilesError::InvalidRing { ring, pos: start });
                }
            }
            None => {
                self.rings.insert(ring, (prev, bond, start));
            }
        }
        Ok(())
    }

    fn atom(&mut self) -> Result<usize> {
        let start = self.pos;
        let c = self.input[self.pos];
        if c == b'[' {
            return self.bracket_atom();
        }

        let (symbol, aromatic, len) = match (c, self.peek_at(1)) {
            (b'*', _) => ("*", false, 1),
            (b'B', Some(b'r')) => ("Br", false, 2),
            (b'C', Some(b'l')) => ("Cl", false, 2),
            (b'B', _) => ("B", false, 1),
            (b'C', _) => ("C", false, 1),
            (b'N', _) => ("N", false, 1),
            (b'O', _) => ("O", false, 1),
            (b'P', _) => ("P", false, 1),
            (b'S', _) => ("S", false, 1),
            (b'F', _) => ("F", false, 1),
            (b'I', _) => ("I", false, 1),
            (b'b', _) => ("B", true, 1),
            (b'c', _) => ("C", true, 1),
            (b'n', _) => ("N", true, 1),
            (b'o', _) => ("O", true, 1),
            (b'p', _) => ("P", true, 1),
            (b's', _) => ("S", true, 1),
            _ => {
                return Err(SmilesError::UnknownElement {
                    symbol: (c as char).to_string(),
                    pos: start,
                })
            }
        };
        self.pos += len;

        // every symbol above is in the element table
        let element = Element::from_symbol(symbol).unwrap_or(Element(0));
        let mut atom = Atom::new(element);
        atom.aromatic = aromatic;
        let idx = self.mol.add_atom(atom);
        self.organic.push(idx);
        Ok(idx)
    }

    /// consume a run of digits. a run too long for a u32 saturates, so
    /// range checks on the result still reject it
    fn digits(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        Some(
            std::str::from_utf8(&self.input[start..self.pos])
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(u32::MAX),
        )
    }

    fn bracket_atom(&mut self) -> Result<usize> {
        let start = self.pos;
        self.pos += 1;
        let isotope = match self.digits() {
            Some(n) if n == 0 || n > MAX_ISOTOPE => {
                return Err(SmilesError::OutOfRange {
                    what: "isotope",
                    pos: start,
                })
            }
            n => n.map(|n| n as u16),
        };

        let (element, aromatic) = self.bracket_symbol(start)?;

        // chirality: @, @@, or @TH1 style classes
        while self.peek() == Some(b'@') {
            self.pos += 1;
        }
        if let (Some(a), Some(b)) = (self.peek(), self.peek_at(1)) {
            if matches!(&[a, b], b"TH" | b"AL" | b"SP" | b"TB" | b"OH") {
                self.pos += 2;
                self.digits();
            }
        }

        let mut hydrogens = 0;
        if self.peek() == Some(b'H') {
            self.pos += 1;
            hydrogens = match self.digits() {
                None => 1,
                Some(n) if n <= MAX_HYDROGENS => n as u8,
                Some(_) => {
                    return Err(SmilesError::OutOfRange {
                        what: "hydrogen count",
                        pos: start,
                    })
                }
            };
        }

        let mut charge: i32 = 0;
        if let Some(sign @ (b'+' | b'-')) = self.peek() {
            let unit = if sign == b'+' { 1 } else { -1 };
            self.pos += 1;
            charge = match self.digits() {
                Some(n) => unit * n.min(MAX_CHARGE as u32 + 1) as i32,
                None => {
                    let mut c = unit;
                    while self.peek() == Some(sign) {
                        c = c.saturating_add(unit);
                        self.pos += 1;
                    }
                    c
                }
            };
            if charge.abs() > MAX_CHARGE {
                return Err(SmilesError::OutOfRange {
                    what: "charge",
                    pos: start,
                });
            }
        }

        // atom class
        if self.peek() == Some(b':') {
            self.pos += 1;
            if self.digits().is_none() {
                return Err(self.unexpected());
            }
        }

        if self.peek() != Some(b']') {
            return match self.peek() {
                None => Err(SmilesError::UnterminatedBracket(start)),
                Some(_) => Err(self.unexpected()),
            };
        }
        self.pos += 1;

        Ok(self.mol.add_atom(Atom {
            element,
            aromatic,
            // bounded by MAX_CHARGE above
            charge: charge as i8,
            isotope,
            hydrogens,
        }))
    }

    fn bracket_symbol(&mut self, start: usize) -> Result<(Element, bool)> {
        let Some(c) = self.peek() else {
            return Err(SmilesError::UnterminatedBracket(start));
        };
        if c == b'*' {
            self.pos += 1;
            return Ok((Element(0), false));
        }

        let next = self.peek_at(1);
        if c.is_ascii_lowercase() {
            // aromatic: se, as, te, then the single letter forms
            for two in [b"se", b"as", b"te"] {
                if c == two[0] && next == Some(two[1]) {
                    self.pos += 2;
                    let sym = [two[0].to_ascii_uppercase(), two[1]];
                    return self.element(&sym, self.pos - 2, true);
                }
            }
            if matches!(c, b'b' | b'c' | b'n' | b'o' | b'p' | b's') {
                self.pos += 1;
                return self.element(&[c.to_ascii_uppercase()], self.pos - 1, true);
            }
            return Err(self.unexpected());
        }

        if !c.is_ascii_uppercase() {
            return Err(self.unexpected());
        }
        if let Some(n) = next.filter(|n| n.is_ascii_lowercase()) {
            let sym = [c, n];
            if let Ok(s) = std::str::from_utf8(&sym) {
                if Element::from_symbol(s).is_some() {
                    self.pos += 2;
                    return self.element(&sym, self.pos - 2, false);
                }
            }
        }
        self.pos += 1;
        self.element(&[c], self.pos - 1, false)
    }

    fn element(
        &self,
        sym: &[u8],
        pos: usize,
        aromatic: bool,
    ) -> Result<(Element, bool)> {
        let symbol = String::from_utf8_lossy(sym).into_owned();
        match Element::from_symbol(&symbol) {
            Some(e) => Ok((e, aromatic)),
            None => Err(SmilesError::UnknownElement { symbol, pos }),
        }
    }
}

const ORGANIC: [&str; 11] =
    ["*", "B", "C", "N", "O", "P", "S", "F", "Cl", "Br", "I"];

const AROMATIC_ORGANIC: [&str; 6] = ["B", "C", "N", "O", "P", "S"];

/// write `mol` as a SMILES string. components are written in order of their
/// lowest atom index, each by depth-first traversal from that atom
pub fn write(mol: &Molecule) -> String {
    let mut w = Writer::new(mol);
    let mut out = String::new();
    for start in 0..mol.num_atoms() {
        if w.order[start] != usize::MAX {
            continue;
        }
        w.walk(start);
        if !out.is_empty() {
            out.push('.');
        }
        w.emit(start, &mut out);
    }
    out
}

enum Step {
    Atom {
        atom: usize,
        /// the tree bond leading to `atom`
        bond: Option<usize>,
        branch: bool,
    },
    Close,
}

struct Writer<'a> {
    mol: &'a Molecule,
    /// discovery order of each atom
    order: Vec<usize>,
    visited: usize,
    /// tree bonds leading to each atom's children, in traversal order
    children: Vec<Vec<usize>>,
    /// ring closure bonds touching each atom
    closures: Vec<Vec<usize>>,
    used: Vec<bool>,
    /// ring number assigned to each open closure bond
    digits: BTreeMap<usize, usize>,
    /// ring numbers currently in use
    open: Vec<bool>,
}

impl<'a> Writer<'a> {
    fn new(mol: &'a Molecule) -> Self {
        let n = mol.num_atoms();
        Self {
            mol,
            order: vec![usize::MAX; n],
            visited: 0,
            children: vec![Vec::new(); n],
            closures: vec![Vec::new(); n],
            used: vec![false; mol.bonds().len()],
            digits: BTreeMap::new(),
            open: Vec::new(),
        }
    }

    /// depth-first traversal from `start`, splitting bonds into tree bonds
    /// and ring closures
    fn walk(&mut self, start: usize) {
        let mol = self.mol;
        self.order[start] = self.visited;
        self.visited += 1;
        // (atom, index of its next bond to look at)
        let mut stack = vec![(start, 0usize)];
        while let Some(top) = stack.last_mut() {
            let atom = top.0;
            let Some(&b) = mol.atom_bonds(atom).get(top.1) else {
                stack.pop();
                continue;
            };
            top.1 += 1;
            // the bond to the parent is already used
            if self.used[b] {
                continue;
            }
            self.used[b] = true;
            let next = mol.bonds()[b].other(atom);
            if self.order[next] != usize::MAX {
                self.closures[atom].push(b);
                self.closures[next].push(b);
            } else {
                self.children[atom].push(b);
                self.order[next] = self.visited;
                self.visited += 1;
                stack.push((next, 0));
            }
        }
    }

    fn emit(&mut self, start: usize, out: &mut String) {
        let mut stack = vec![Step::Atom {
            atom: start,
            bond: None,
            branch: false,
        }];
        while let Some(step) = stack.pop() {
            let Step::Atom { atom, bond, branch } = step else {
                out.push(')');
                continue;
            };
            if branch {
                out.push('(');
            }
            if let Some(b) = bond {
                out.push_str(self.bond_symbol(b));
            }
            self.emit_atom(atom, out);

            // every child but the last is a parenthesized branch
            let children = &self.children[atom];
            let last = children.len().saturating_sub(1);
            for (i, &b) in children.iter().enumerate().rev() {
                let branch = i < last;
                if branch {
                    stack.push(Step::Close);
                }
                stack.push(Step::Atom {
                    atom: self.mol.bonds()[b].other(atom),
                    bond: Some(b),
                    branch,
                });
            }
        }
    }

    /// write the symbol of `atom` and its ring closure digits
    fn emit_atom(&mut self, atom: usize, out: &mut String) {
        out.push_str(&self.atom_symbol(atom));

        // close first so the freed numbers can be reused right away
        let closures = self.closures[atom].clone();
        for &b in &closures {
            let other = self.mol.bonds()[b].other(atom);
            if self.order[other] < self.order[atom] {
                if let Some(d) = self.digits.remove(&b) {
                    self.open[d] = false;
                    push_ring(out, d);
                }
            }
        }
        for &b in &closures {
            let other = self.mol.bonds()[b].other(atom);
            if self.order[other] > self.order[atom] {
                let d = match self.open.iter().position(|o| !o) {
                    Some(d) => d,
                    None => {
                        self.open.push(false);
                        self.open.len() - 1
                    }
                };
                self.open[d] = true;
                self.digits.insert(b, d);
                out.push_str(self.bond_symbol(b));
                push_ring(out, d);
            }
        }
    }

    fn bond_symbol(&self, bond: usize) -> &'static str {
        let b = &self.mol.bonds()[bond];
        let atoms = self.mol.atoms();
        let aromatic = atoms[b.begin].aromatic && atoms[b.end].aromatic;
        match (b.order, aromatic) {
            (BondOrder::Single, true) => "-",
            (BondOrder::Single, false) => "",
            (BondOrder::Double, _) => "=",
            (BondOrder::Triple, _) => "#",
            (BondOrder::Aromatic, true) => "",
            (BondOrder::Aromatic, false) => ":",
        }
    }

    fn atom_symbol(&self, idx: usize) -> String {
        let atom = &self.mol.atoms()[idx];
        let symbol = atom.element.symbol();
        let organic = if atom.aromatic {
            AROMATIC_ORGANIC.contains(&symbol)
        } else {
            ORGANIC.contains(&symbol)
        };
        let text = if atom.aromatic {
            symbol.to_ascii_lowercase()
        } else {
            symbol.to_owned()
        };
        if organic
            && atom.charge == 0
            && atom.isotope.is_none()
            && self.mol.implicit_hydrogens(idx) == atom.hydrogens
        {
            return text;
        }

        let mut s = String::from("[");
        if let Some(iso) = atom.isotope {
            s.push_str(&iso.to_string());
        }
        s.push_str(&text);
        match atom.hydrogens {
            0 => {}
            1 => s.push('H'),
            n => s.push_str(&format!("H{n}")),
        }
        match atom.charge {
            0 => {}
            1 => s.push('+'),
            -1 => s.push('-'),
            c if c > 0 => s.push_str(&format!("+{c}")),
            c => s.push_str(&format!("-{}", -c)),
        }
        s.push(']');
        s
    }
}

fn push_ring(out: &mut String, digit: usize) {
    // ring numbers are written from 1
    let n = digit + 1;
    if n < 10 {
        out.push_str(&n.to_string());
    } else {
        out.push_str(&format!("%{n:02}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(mol: &Molecule) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for a in mol.atoms() {
            *counts.entry(a.element.symbol().to_owned()).or_default() += 1;
            *counts.entry("H".to_owned()).or_default() += a.hydrogens as usize;
        }
        counts.into_iter().collect()
    }

    #[test]
    fn benzoic_acid() {
        let mol = parse("OC(=O)c1ccccc1").unwrap();
        assert_eq!(mol.num_atoms(), 9);
        assert_eq!(mol.bonds().len(), 9);
        let hs: Vec<_> = mol.atoms().iter().map(|a| a.hydrogens).collect();
        assert_eq!(hs, vec![1, 0, 0, 0, 1, 1, 1, 1, 1]);
        let aromatic = mol
            .bonds()
            .iter()
            .filter(|b| b.order == BondOrder::Aromatic)
            .count();
        assert_eq!(aromatic, 6);
    }

    #[test]
    fn bracket_atoms() {
        let mol = parse("[13CH3][C@@H](N)C(=O)[O-]").unwrap();
        let atoms = mol.atoms();
        assert_eq!(atoms[0].isotope, Some(13));
        assert_eq!(atoms[0].hydrogens, 3);
        assert_eq!(atoms[1].hydrogens, 1);
        assert_eq!(atoms[2].hydrogens, 2);
        assert_eq!(atoms[5].charge, -1);
        assert_eq!(atoms[5].hydrogens, 0);

        let mol = parse("[Fe+++]").unwrap();
        assert_eq!(mol.atoms()[0].charge, 3);
        let mol = parse("[nH]1cccc1").unwrap();
        assert!(mol.atoms()[0].aromatic);
        assert_eq!(mol.atoms()[0].hydrogens, 1);
        let mol = parse("[se]1cccc1").unwrap();
        assert_eq!(mol.atoms()[0].element.symbol(), "Se");
    }

    #[test]
    fn ring_numbers() {
        let mol = parse("C%10CC%10").unwrap();
        assert_eq!(mol.bonds().len(), 3);
        // ring bond with an explicit order on both ends
        let mol = parse("C=1CCCCC=1").unwrap();
        assert_eq!(mol.bonds().len(), 6);
    }

    #[test]
    fn errors() {
        assert_eq!(parse(""), Err(SmilesError::Empty));
        assert_eq!(parse("C1CC"), Err(SmilesError::UnclosedRing(1)));
        assert_eq!(parse("CC("), Err(SmilesError::Parentheses(3)));
        assert_eq!(parse("CC)"), Err(SmilesError::Parentheses(2)));
        assert_eq!(parse("C()C"), Err(SmilesError::Parentheses(2)));
        assert_eq!(parse("CC="), Err(SmilesError::DanglingBond(2)));
        assert_eq!(parse("=CC"), Err(SmilesError::DanglingBond(0)));
        assert_eq!(
            parse("CXC"),
            Err(SmilesError::UnknownElement {
                symbol: "X".to_owned(),
                pos: 1
            })
        );
        assert_eq!(
            parse("C C"),
            Err(SmilesError::UnexpectedChar { ch: ' ', pos: 1 })
        );
        assert_eq!(parse("[CH4"), Err(SmilesError::UnterminatedBracket(0)));
        assert_eq!(
            parse("C11"),
            Err(SmilesError::InvalidRing { ring: 1, pos: 2 })
        );
        assert_eq!(parse("C1CC=1"), parse("C=1CC1"));
        assert!(parse("C=1CC#1").is_err());
        assert!(parse("not a smiles").is_err());
    }

    #[test]
    fn bracket_ranges() {
        let charge = |s: &str| {
            assert_eq!(
                parse(s),
                Err(SmilesError::OutOfRange {
                    what: "charge",
                    pos: 1
                }),
                "{s}"
            );
        };
        charge("C[C-128]");
        charge("C[C+200]");
        charge(&format!("C[C{}]", "+".repeat(130)));
        charge("C[C-99999999999999999999]");
        assert_eq!(parse("[C-15]").unwrap().atoms()[0].charge, -15);

        assert_eq!(
            parse("[CH300]"),
            Err(SmilesError::OutOfRange {
                what: "hydrogen count",
                pos: 0
            })
        );
        assert_eq!(
            parse("[70000C]"),
            Err(SmilesError::OutOfRange {
                what: "isotope",
                pos: 0
            })
        );
        assert_eq!(parse("[13C]").unwrap().atoms()[0].isotope, Some(13));
    }

    #[test]
    fn long_chain() {
        let smiles = "C".repeat(100_000);
        let mol = parse(&smiles).unwrap();
        assert_eq!(mol.ring_bonds().iter().filter(|&&r| r).count(), 0);
        assert_eq!(write(&mol), smiles);

        let ring = format!("C1{}1", "C".repeat(50_000));
        let mol = parse(&ring).unwrap();
        assert!(mol.ring_bonds().iter().all(|&r| r));
        assert_eq!(write(&mol), ring);
    }

    #[test]
    fn write_simple() {
        for smiles in ["CCO", "CC(=O)O", "C1CC1", "c1ccccc1", "C#N"] {
            assert_eq!(write(&parse(smiles).unwrap()), smiles);
        }
        assert_eq!(write(&parse("[NH4+].[Cl-]").unwrap()), "[NH4+].[Cl-]");
        let biphenyl = write(&parse("c1ccccc1-c1ccccc1").unwrap());
        assert_eq!(biphenyl.matches('-').count(), 1);
    }

    #[test]
    fn write_reparses() {
        for smiles in [
            "CC(C)(C)c1ccc2[nH]ccc2c1",
            "O=C(O)C1=CC=CC=C1",
            "C1CC2CCC1C2",
            "[2H]C([2H])([2H])O",
            "C12C3C4C1C5C2C3C45",
        ] {
            let mol = parse(smiles).unwrap();
            let again = parse(&write(&mol)).unwrap();
            assert_eq!(formula(&mol), formula(&again), "{smiles}");
            assert_eq!(mol.bonds().len(), again.bonds().len(), "{smiles}");
        }
    }
}
