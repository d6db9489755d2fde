use serde::{
    de::{Error as _, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use std::collections::{btree_map::Entry, BTreeMap};
use std::fmt::Formatter;

use super::{FireflyAccountId, PowensAccountId};

/// Maps Powens (origin) accounts to Firefly (destination) accounts.
///
/// Each origin account maps to at most one destination. A file that lists
/// the same origin account twice is rejected when loading.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(transparent)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct AccountMapping {
    mapping: BTreeMap<PowensAccountId, FireflyAccountId>,
}

impl AccountMapping {
    pub fn new_empty() -> Self {
        Self {
            mapping: BTreeMap::new(),
        }
    }

    pub fn lookup(&self, origin: PowensAccountId) -> Option<FireflyAccountId> {
        self.mapping.get(&origin).copied()
    }

    pub fn remove(&mut self, origin: PowensAccountId) -> Option<FireflyAccountId> {
        self.mapping.remove(&origin)
    }

    /// Iterates in ascending order of origin account id
    pub fn iter(&self) -> impl Iterator<Item = (PowensAccountId, FireflyAccountId)> + '_ {
        self.mapping
            .iter()
            .map(|(origin, destination)| (*origin, *destination))
    }

    pub fn origins(&self) -> impl Iterator<Item = PowensAccountId> + '_ {
        self.mapping.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl FromIterator<(PowensAccountId, FireflyAccountId)> for AccountMapping {
    fn from_iter<T: IntoIterator<Item = (PowensAccountId, FireflyAccountId)>>(iter: T) -> Self {
        Self {
            mapping: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for AccountMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MappingVisitor)
    }
}

struct MappingVisitor;

impl<'de> Visitor<'de> for MappingVisitor {
    type Value = AccountMapping;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str("a map from Powens account ids to Firefly account ids")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<AccountMapping, A::Error> {
        let mut mapping = BTreeMap::new();
        while let Some((origin, destination)) =
            access.next_entry::<PowensAccountId, FireflyAccountId>()?
        {
            match mapping.entry(origin) {
                Entry::Occupied(_) => {
                    return Err(A::Error::custom(format!(
                        "Powens account {origin} is mapped more than once"
                    )));
                }
                Entry::Vacant(entry) => {
                    entry.insert(destination);
                }
            }
        }
        Ok(AccountMapping { mapping })
    }

    // `mapping:` with nothing after it
    fn visit_unit<E: serde::de::Error>(self) -> Result<AccountMapping, E> {
        Ok(AccountMapping::new_empty())
    }
}

#[cfg(test)]
mod tests {
    use common_macros::b_tree_map;

    use super::*;

    fn some_mapping() -> AccountMapping {
        AccountMapping {
            mapping: b_tree_map![
                PowensAccountId(30) => FireflyAccountId(3),
                PowensAccountId(10) => FireflyAccountId(1),
            ],
        }
    }

    #[test]
    fn lookup_mapped_and_unmapped() {
        let mapping = some_mapping();
        assert_eq!(Some(FireflyAccountId(1)), mapping.lookup(PowensAccountId(10)));
        assert_eq!(Some(FireflyAccountId(3)), mapping.lookup(PowensAccountId(30)));
        assert_eq!(None, mapping.lookup(PowensAccountId(20)));
    }

    #[test]
    fn iterates_in_origin_order() {
        let origins: Vec<_> = some_mapping().origins().collect();
        assert_eq!(vec![PowensAccountId(10), PowensAccountId(30)], origins);
    }

    #[test]
    fn remove_entry() {
        let mut mapping = some_mapping();
        assert_eq!(Some(FireflyAccountId(1)), mapping.remove(PowensAccountId(10)));
        assert_eq!(None, mapping.remove(PowensAccountId(10)));
        assert_eq!(1, mapping.len());
    }

    #[test]
    fn deserialize_yaml() {
        let mapping: AccountMapping = serde_yaml::from_str("10: 1\n30: 3\n").unwrap();
        assert_eq!(some_mapping(), mapping);
    }

    #[test]
    fn deserialize_empty_yaml() {
        let mapping: AccountMapping = serde_yaml::from_str("{}").unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn deserialize_null_yaml() {
        #[derive(Deserialize)]
        struct Section {
            mapping: AccountMapping,
        }

        let section: Section = serde_yaml::from_str("mapping:\n").unwrap();
        assert!(section.mapping.is_empty());
        let section: Section = serde_yaml::from_str("mapping: ~\n").unwrap();
        assert!(section.mapping.is_empty());
    }

    #[test]
    fn deserialize_rejects_duplicate_origin() {
        let error = serde_yaml::from_str::<AccountMapping>("10: 1\n10: 2\n")
            .unwrap_err()
            .to_string();
        assert!(
            error.contains("Powens account 10 is mapped more than once"),
            "{error}"
        );
    }

    #[test]
    fn serialize_then_deserialize_yaml() {
        let serialized = serde_yaml::to_string(&some_mapping()).unwrap();
        assert_eq!("10: 1\n30: 3\n", serialized);
    }
}
