use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{FamilyTreeError, Result};
use crate::ir::{MarriageRecord, PersonRecord, deserialize_person_id};

/// One person of a flat relationship list; parents are referenced by id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRecord {
    #[serde(default, deserialize_with = "deserialize_person_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "MomID", alias = "motherId", deserialize_with = "deserialize_person_id")]
    pub mom_id: Option<String>,
    #[serde(default, alias = "DadID", alias = "fatherId", deserialize_with = "deserialize_person_id")]
    pub dad_id: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, alias = "class")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub extra: Option<Value>,
}

impl FlatRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parents(mut self, dad: Option<&str>, mom: Option<&str>) -> Self {
        self.dad_id = dad.map(str::to_string);
        self.mom_id = mom.map(str::to_string);
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }
}

/// Parses a JSON (or JSON5) array of flat records.
pub fn parse_flat(input: &str) -> Result<Vec<FlatRecord>> {
    match serde_json::from_str(input) {
        Ok(records) => Ok(records),
        Err(json_err) => json5::from_str(input).map_err(|_| FamilyTreeError::Import(json_err.to_string())),
    }
}

/// Turns a flat parent-by-id list into the nested forest the layout expects.
///
/// Every (father, mother) pair becomes one marriage, declared on the partner
/// who has parents of their own (the father when both or neither do), with
/// the pair's children under it. Children with a single known parent become
/// direct children. A parentless person is a root unless they only ever
/// appear as the in-marrying partner of someone else's marriage.
pub fn convert_flat(records: &[FlatRecord]) -> Result<Vec<PersonRecord>> {
    let graph = FlatGraph::build(records)?;
    let mut visiting = HashSet::new();
    let mut emitted = HashSet::new();
    let mut forest = Vec::new();
    for (idx, id) in graph.ids.iter().enumerate() {
        if graph.is_root(idx) {
            forest.push(graph.person(id, &mut visiting, &mut emitted)?);
        }
    }

    if let Some(stray) = graph.ids.iter().find(|id| !emitted.contains(id.as_str())) {
        return Err(FamilyTreeError::Import(format!(
            "record `{stray}` is not connected to any root person (circular parentage?)"
        )));
    }
    debug!(records = records.len(), roots = forest.len(), couples = graph.couples.len(), "converted flat records");
    Ok(forest)
}

struct Couple {
    carrier: String,
    partner: String,
    children: Vec<String>,
}

struct FlatGraph<'a> {
    ids: Vec<String>,
    records: HashMap<String, &'a FlatRecord>,
    couples: Vec<Couple>,
    /// Child ids of persons who are the only known parent.
    single: HashMap<String, Vec<String>>,
}

impl<'a> FlatGraph<'a> {
    fn build(list: &'a [FlatRecord]) -> Result<Self> {
        let mut ids = Vec::with_capacity(list.len());
        let mut records = HashMap::new();
        for (idx, record) in list.iter().enumerate() {
            let id = known(&record.id)
                .ok_or_else(|| FamilyTreeError::Import(format!("record #{idx} ({}) has no id", record.name)))?;
            if records.insert(id.to_string(), record).is_some() {
                return Err(FamilyTreeError::Import(format!("duplicate record id `{id}`")));
            }
            ids.push(id.to_string());
        }

        let has_parents = |record: &FlatRecord| known(&record.dad_id).is_some() || known(&record.mom_id).is_some();
        let mut couples: Vec<Couple> = Vec::new();
        let mut couple_index: HashMap<(String, String), usize> = HashMap::new();
        let mut single: HashMap<String, Vec<String>> = HashMap::new();

        for id in &ids {
            let record = records[id];
            let dad = parent(&records, id, "dadId", &record.dad_id)?;
            let mom = parent(&records, id, "momId", &record.mom_id)?;
            match (dad, mom) {
                (Some(dad), Some(mom)) => {
                    let key = (dad.to_string(), mom.to_string());
                    let slot = match couple_index.get(&key) {
                        Some(slot) => *slot,
                        None => {
                            let mom_leads = has_parents(records[mom]) && !has_parents(records[dad]);
                            let (carrier, partner) = if mom_leads { (mom, dad) } else { (dad, mom) };
                            couples.push(Couple {
                                carrier: carrier.to_string(),
                                partner: partner.to_string(),
                                children: Vec::new(),
                            });
                            couple_index.insert(key, couples.len() - 1);
                            couples.len() - 1
                        }
                    };
                    couples[slot].children.push(id.clone());
                }
                (Some(only), None) | (None, Some(only)) => {
                    single.entry(only.to_string()).or_default().push(id.clone());
                }
                (None, None) => {}
            }
        }

        Ok(Self {
            ids,
            records,
            couples,
            single,
        })
    }

    fn is_root(&self, idx: usize) -> bool {
        let id = &self.ids[idx];
        let record = self.records[id];
        if known(&record.dad_id).is_some() || known(&record.mom_id).is_some() {
            return false;
        }
        let carries = self.couples.iter().any(|c| &c.carrier == id);
        let marries_in = self.couples.iter().any(|c| &c.partner == id);
        carries || self.single.contains_key(id) || !marries_in
    }

    fn person(&self, id: &str, visiting: &mut HashSet<String>, emitted: &mut HashSet<String>) -> Result<PersonRecord> {
        if !visiting.insert(id.to_string()) {
            return Err(FamilyTreeError::Import(format!("record `{id}` is its own ancestor")));
        }
        emitted.insert(id.to_string());
        let mut person = self.shallow(id);

        if let Some(children) = self.single.get(id) {
            for child in children {
                person.children.push(self.person(child, visiting, emitted)?);
            }
        }
        for couple in self.couples.iter().filter(|c| c.carrier == id) {
            emitted.insert(couple.partner.clone());
            let mut marriage = MarriageRecord::to(self.shallow(&couple.partner));
            for child in &couple.children {
                marriage.children.push(self.person(child, visiting, emitted)?);
            }
            person.marriages.push(marriage);
        }

        visiting.remove(id);
        Ok(person)
    }

    fn shallow(&self, id: &str) -> PersonRecord {
        let record = self.records[id];
        PersonRecord {
            id: Some(id.to_string()),
            name: record.name.clone(),
            extra: record.extra.clone(),
            class_name: record
                .class_name
                .clone()
                .or_else(|| gender_class(record.gender.as_deref()).map(str::to_string)),
            ..Default::default()
        }
    }
}

/// `None`, empty and `0` all mean "no such person".
fn known(id: &Option<String>) -> Option<&str> {
    id.as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty() && *id != "0")
}

fn parent<'r>(
    records: &HashMap<String, &FlatRecord>,
    child: &str,
    field: &str,
    id: &'r Option<String>,
) -> Result<Option<&'r str>> {
    match known(id) {
        Some(parent) if records.contains_key(parent) => Ok(Some(parent)),
        Some(parent) => Err(FamilyTreeError::Import(format!(
            "record `{child}` references unknown {field} `{parent}`"
        ))),
        None => Ok(None),
    }
}

fn gender_class(gender: Option<&str>) -> Option<&'static str> {
    match gender?.trim().to_ascii_lowercase().as_str() {
        "m" | "male" | "man" => Some("man"),
        "f" | "female" | "woman" => Some("woman"),
        _ => None,
    }
}
