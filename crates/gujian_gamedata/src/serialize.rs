use std::fmt;
use std::hash::Hash;

/// Map entries as a list of `[key, value]` pairs, since keys are not limited to strings
pub(crate) mod pairs {
    use super::*;

    use indexmap::IndexMap;
    use serde::de::{SeqAccess, Visitor};
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::marker::PhantomData;

    pub fn serialize<K, V, S>(map: &IndexMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(map.len()))?;
        for entry in map {
            seq.serialize_element(&entry)?;
        }
        seq.end()
    }

    struct PairsVisitor<K, V>(PhantomData<(K, V)>);

    impl<'de, K, V> Visitor<'de> for PairsVisitor<K, V>
    where
        K: Deserialize<'de> + Hash + Eq,
        V: Deserialize<'de>,
    {
        type Value = IndexMap<K, V>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a list of [key, value] pairs")
        }

        fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut map = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, value)) = access.next_element::<(K, V)>()? {
                map.insert(key, value);
            }
            Ok(map)
        }
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<IndexMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Hash + Eq,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(PairsVisitor(PhantomData))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::types::{GameData, GameDataValue, ObjectMap};

    #[test]
    fn map_entries_are_pairs() -> serde_json::Result<()> {
        let mut map = ObjectMap::default();
        map.entries
            .insert(GameDataValue::Int(3), GameDataValue::Str("three".into()));
        map.entries
            .insert(GameDataValue::Str("b".into()), GameDataValue::Bool(false));

        let json = serde_json::to_string(&map)?;
        assert_eq!(
            json,
            r#"{"children":[],"entries":[[{"Int":3},{"Str":"three"}],[{"Str":"b"},{"Bool":false}]]}"#
        );

        let back: ObjectMap = serde_json::from_str(&json)?;
        assert_eq!(back, map);

        Ok(())
    }

    #[test]
    fn document_json_keeps_order() -> serde_json::Result<()> {
        let mut map = ObjectMap::default();
        for i in (0..8).rev() {
            map.entries.insert(GameDataValue::Short(i), GameDataValue::Nil);
        }
        let document = GameData {
            magic: 0xF206_0881,
            root: GameDataValue::Map(map),
        };

        let back: GameData = serde_json::from_str(&serde_json::to_string_pretty(&document)?)?;
        let keys: Vec<_> = back.root.as_map().into_iter().flat_map(|m| m.entries.keys()).collect();
        assert_eq!(keys[0], &GameDataValue::Short(7));
        assert_eq!(back, document);

        Ok(())
    }
}
