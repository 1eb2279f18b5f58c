use std::collections::BTreeMap;

use csv::{ReaderBuilder, StringRecord};
use lazy_static::lazy_static;
use tracing::*;

use crate::{Element, SuffixKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingRule {
    pub canonical: String,
    pub atom_count: usize,
    pub smiles: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpliedAcylRule {
    pub stem: String,
    pub kind: SuffixKind,
    pub atom_count: usize,
    pub smiles: Option<String>,
    pub diacid: bool,
}

/// What an alias means once matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Alkane(usize),
    AlkaneUnit(usize),
    AlkaneTens(usize),
    Multiplier(usize),
    GroupMultiplier(usize),
    Heteroatom { element: Element, seniority: u8 },
    Substituent { canonical: String, smiles: Option<String> },
    Suffix { kind: SuffixKind, adds_carbon: bool },
    Ring(RingRule),
    ImpliedAcyl(ImpliedAcylRule),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEntry {
    pub alias: String,
    pub rule: Rule,
}

/// Alias tables for every name fragment the tokenizer and builders understand.
#[derive(Debug, Clone, Default)]
pub struct RulesTable {
    entries: Vec<RuleEntry>,
    alkanes: BTreeMap<String, usize>,
    alkane_units: BTreeMap<String, usize>,
    alkane_tens: BTreeMap<String, usize>,
    multipliers: BTreeMap<String, usize>,
    heteroatoms: BTreeMap<String, (Element, u8)>,
    substituents: BTreeMap<String, String>,
    fragments: BTreeMap<String, String>,
    suffixes: BTreeMap<String, (SuffixKind, bool)>,
    rings: BTreeMap<String, RingRule>,
    implied: BTreeMap<String, ImpliedAcylRule>,
}

lazy_static! {
    static ref RULES: RulesTable = {
        let csv_data = include_str!("rules.csv");
        match RulesTable::from_csv(csv_data) {
            Ok(table) => table,
            Err(e) => {
                error!("Could not read the embedded rules table: {}", e);
                RulesTable::default()
            }
        }
    };
}

/// The shared, read-only rules table.
pub fn rules() -> &'static RulesTable {
    &RULES
}

pub fn suffix_kind_from_canonical(canonical: &str) -> Option<SuffixKind> {
    Some(match canonical {
        "ene" => SuffixKind::Ene,
        "yne" => SuffixKind::Yne,
        "ol" => SuffixKind::Ol,
        "one" => SuffixKind::One,
        "al" => SuffixKind::Al,
        "oic acid" => SuffixKind::OicAcid,
        "oate" => SuffixKind::Oate,
        "amide" => SuffixKind::Amide,
        "amine" => SuffixKind::Amine,
        "imine" => SuffixKind::Imine,
        "nitrile" => SuffixKind::Nitrile,
        "thiol" => SuffixKind::Thiol,
        "sulfonic acid" => SuffixKind::SulfonicAcid,
        "sulfonamide" => SuffixKind::Sulfonamide,
        "yl" => SuffixKind::Yl,
        "ylidene" => SuffixKind::Ylidene,
        "oyl" => SuffixKind::Oyl,
        "oxy" => SuffixKind::Oxy,
        _ => return None,
    })
}

/// The characteristic group spelled by an implied-acyl word (`acetate`, `benzamide`, ...).
fn implied_kind(alias: &str) -> Option<SuffixKind> {
    if alias.ends_with("ic acid") {
        Some(SuffixKind::OicAcid)
    } else if alias.ends_with("ate") {
        Some(SuffixKind::Oate)
    } else if alias.ends_with("amide") {
        Some(SuffixKind::Amide)
    } else if alias.ends_with("aldehyde") {
        Some(SuffixKind::Al)
    } else if alias.ends_with("nitrile") {
        Some(SuffixKind::Nitrile)
    } else {
        None
    }
}

fn parse_count(value: &str) -> Option<usize> {
    value.trim().parse().ok()
}

fn optional(field: &str) -> Option<String> {
    let field = field.trim();
    (!field.is_empty()).then(|| field.to_string())
}

fn parse_record(record: &StringRecord) -> Option<RuleEntry> {
    let category = record.get(0)?.trim();
    let alias = record.get(1)?.trim().to_ascii_lowercase();
    let canonical = record.get(2)?.trim();
    let value = record.get(3).unwrap_or("");
    let smiles = optional(record.get(4).unwrap_or(""));
    if alias.is_empty() {
        return None;
    }

    let rule = match category {
        "alkane" => Rule::Alkane(parse_count(value)?),
        "alkane_unit" => Rule::AlkaneUnit(parse_count(value)?),
        "alkane_tens" => Rule::AlkaneTens(parse_count(value)?),
        "multiplier" => Rule::Multiplier(parse_count(value)?),
        "group_multiplier" => Rule::GroupMultiplier(parse_count(value)?),
        "heteroatom" => Rule::Heteroatom {
            element: Element::from_symbol(canonical)?,
            seniority: value.trim().parse().ok()?,
        },
        "substituent" => Rule::Substituent {
            canonical: canonical.to_string(),
            smiles,
        },
        "suffix" => Rule::Suffix {
            kind: suffix_kind_from_canonical(canonical)?,
            adds_carbon: value.trim() == "1",
        },
        "ring" => Rule::Ring(RingRule {
            canonical: canonical.to_string(),
            atom_count: parse_count(value)?,
            smiles,
        }),
        "implied_acyl" | "implied_diacid" => Rule::ImpliedAcyl(ImpliedAcylRule {
            stem: canonical.to_string(),
            kind: implied_kind(&alias)?,
            atom_count: parse_count(value)?,
            smiles,
            diacid: category == "implied_diacid",
        }),
        _ => return None,
    };
    Some(RuleEntry { alias, rule })
}

impl RulesTable {
    /// Reads a rules table from CSV text with a `category,alias,canonical,value,smiles` header.
    ///
    /// Malformed rows are skipped with a warning.
    pub fn from_csv(csv_data: &str) -> Result<Self, csv::Error> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());
        let mut table = RulesTable::default();
        for result in rdr.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable rules row: {}", e);
                    continue;
                }
            };
            match parse_record(&record) {
                Some(entry) => table.insert(entry),
                None => warn!("Skipping malformed rules row: {:?}", record),
            }
        }
        debug!("Loaded {} rules", table.entries.len());
        Ok(table)
    }

    fn insert(&mut self, entry: RuleEntry) {
        let alias = entry.alias.clone();
        match &entry.rule {
            Rule::Alkane(n) => {
                self.alkanes.insert(alias, *n);
            }
            Rule::AlkaneUnit(n) => {
                self.alkane_units.insert(alias, *n);
            }
            Rule::AlkaneTens(n) => {
                self.alkane_tens.insert(alias, *n);
            }
            Rule::Multiplier(n) | Rule::GroupMultiplier(n) => {
                self.multipliers.insert(alias, *n);
            }
            Rule::Heteroatom { element, seniority } => {
                self.heteroatoms.insert(alias, (*element, *seniority));
            }
            Rule::Substituent { canonical, smiles } => {
                if let Some(smiles) = smiles {
                    self.fragments
                        .entry(canonical.clone())
                        .or_insert_with(|| smiles.clone());
                }
                self.substituents.insert(alias, canonical.clone());
            }
            Rule::Suffix { kind, adds_carbon } => {
                self.suffixes.insert(alias, (*kind, *adds_carbon));
            }
            Rule::Ring(ring) => {
                // `pyridine` also answers to its elided form `pyridin`.
                if let Some(elided) = alias.strip_suffix('e') {
                    if !self.rings.contains_key(elided) {
                        self.rings.insert(elided.to_string(), ring.clone());
                        self.entries.push(RuleEntry {
                            alias: elided.to_string(),
                            rule: entry.rule.clone(),
                        });
                    }
                }
                self.rings.insert(alias, ring.clone());
            }
            Rule::ImpliedAcyl(acyl) => {
                self.implied.insert(alias, acyl.clone());
            }
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// Every entry whose alias starts `text`.
    pub fn prefix_matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a RuleEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| text.starts_with(entry.alias.as_str()))
    }

    pub fn alkane_length(&self, stem: &str) -> Option<usize> {
        self.alkanes.get(stem).copied()
    }

    /// Length of a simple or composite stem (`hex`, `pentadec`, `tricos`).
    pub fn stem_length(&self, stem: &str) -> Option<usize> {
        if let Some(n) = self.alkane_length(stem) {
            return Some(n);
        }
        self.alkane_units.iter().find_map(|(unit, u)| {
            let tens = stem.strip_prefix(unit.as_str())?;
            self.alkane_tens.get(tens).map(|t| u + t)
        })
    }

    /// Carbon count of an alkyl name such as `ethyl` or `pentadecyl`.
    pub fn alkyl_length(&self, name: &str) -> Option<usize> {
        self.stem_length(name.strip_suffix("yl")?)
    }

    /// Carbon count of an alkoxy name such as `methoxy`.
    pub fn alkoxy_length(&self, name: &str) -> Option<usize> {
        self.stem_length(name.strip_suffix("oxy")?)
    }

    /// Carbon count of an acyl name such as `butanoyl`.
    pub fn acyl_length(&self, name: &str) -> Option<usize> {
        self.stem_length(name.strip_suffix("anoyl")?)
    }

    pub fn multiplier(&self, alias: &str) -> Option<usize> {
        self.multipliers.get(alias).copied()
    }

    pub fn heteroatom(&self, alias: &str) -> Option<Element> {
        self.heteroatoms.get(alias).map(|(e, _)| *e)
    }

    pub fn heteroatom_seniority(&self, element: Element) -> Option<u8> {
        self.heteroatoms
            .values()
            .find(|(e, _)| *e == element)
            .map(|(_, s)| *s)
    }

    pub fn substituent(&self, alias: &str) -> Option<&str> {
        self.substituents.get(alias).map(|s| s.as_str())
    }

    /// Fragment SMILES of a canonical substituent; its first atom is the attachment point.
    pub fn substituent_smiles(&self, canonical: &str) -> Option<&str> {
        self.fragments.get(canonical).map(|s| s.as_str())
    }

    /// Canonical substituent names that carry a fragment.
    pub fn fragment_names(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(|s| s.as_str())
    }

    pub fn suffix(&self, alias: &str) -> Option<(SuffixKind, bool)> {
        self.suffixes.get(alias).copied()
    }

    pub fn ring(&self, alias: &str) -> Option<&RingRule> {
        self.rings.get(alias)
    }

    pub fn implied_acyl(&self, alias: &str) -> Option<&ImpliedAcylRule> {
        self.implied.get(alias)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
