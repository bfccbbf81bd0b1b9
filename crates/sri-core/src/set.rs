//! A set of integrity metadata and its strongest subset.
//! See https://www.w3.org/TR/SRI/#get-the-strongest-metadata-from-set

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::algorithm::HashAlgorithm;
use crate::grammar;
use crate::metadata::{IntegrityMetadata, MetadataFields};
use crate::priority::get_prioritized_hash_algorithm;
use crate::utils::log_verbose;

/// Anything a metadata set can be built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrityInput {
    /// Raw metadata text; may hold several separated tokens
    Text(String),
    Structured(MetadataFields),
    Absent,
    List(Vec<IntegrityInput>),
}

/// Flattened unit of input, ready for the grammar.
#[derive(Clone, Copy)]
enum Atom<'a> {
    Token(&'a str),
    Fields(&'a MetadataFields),
}

impl IntegrityInput {
    fn flatten_into<'a>(&'a self, out: &mut Vec<Atom<'a>>) {
        match self {
            IntegrityInput::Text(text) => out.extend(grammar::split_metadata(text).map(Atom::Token)),
            IntegrityInput::Structured(fields) => out.push(Atom::Fields(fields)),
            IntegrityInput::Absent => {}
            IntegrityInput::List(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
        }
    }
}

impl From<&str> for IntegrityInput {
    fn from(text: &str) -> Self {
        IntegrityInput::Text(text.to_string())
    }
}

impl From<String> for IntegrityInput {
    fn from(text: String) -> Self {
        IntegrityInput::Text(text)
    }
}

impl From<&String> for IntegrityInput {
    fn from(text: &String) -> Self {
        IntegrityInput::Text(text.clone())
    }
}

impl From<MetadataFields> for IntegrityInput {
    fn from(fields: MetadataFields) -> Self {
        IntegrityInput::Structured(fields)
    }
}

impl From<IntegrityMetadata> for IntegrityInput {
    fn from(entry: IntegrityMetadata) -> Self {
        IntegrityInput::Structured(entry.to_fields())
    }
}

impl From<&IntegrityMetadata> for IntegrityInput {
    fn from(entry: &IntegrityMetadata) -> Self {
        IntegrityInput::Structured(entry.to_fields())
    }
}

impl<T: Into<IntegrityInput>> From<Option<T>> for IntegrityInput {
    fn from(input: Option<T>) -> Self {
        input.map(Into::into).unwrap_or(IntegrityInput::Absent)
    }
}

impl<T: Into<IntegrityInput>> From<Vec<T>> for IntegrityInput {
    fn from(items: Vec<T>) -> Self {
        IntegrityInput::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<IntegrityInput> + Clone> From<&[T]> for IntegrityInput {
    fn from(items: &[T]) -> Self {
        IntegrityInput::List(items.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<IntegrityInput>, const N: usize> From<[T; N]> for IntegrityInput {
    fn from(items: [T; N]) -> Self {
        IntegrityInput::List(items.into_iter().map(Into::into).collect())
    }
}

/// Ordered collection of valid integrity metadata.
///
/// Invalid and unsupported tokens are dropped. Duplicates are kept in encounter order,
/// so `len()` counts raw entries rather than distinct digests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntegrityMetadataSet {
    entries: Vec<IntegrityMetadata>,
    strongest: Vec<IntegrityMetadata>,
}

impl IntegrityMetadataSet {
    /// Build with the standard prioritization rule.
    pub fn new<T: Into<IntegrityInput>>(input: T) -> Self {
        Self::with_prioritizer(input, get_prioritized_hash_algorithm)
    }

    /// Build with a caller-supplied prioritization rule.
    ///
    /// For each entry in order the rule is asked to choose between the current strongest
    /// algorithm and the entry's. No preference adds the entry to the strongest subset;
    /// choosing the entry's algorithm makes it the sole strongest; any other answer
    /// discards it.
    pub fn with_prioritizer<T, F>(input: T, prioritize: F) -> Self
    where
        T: Into<IntegrityInput>,
        F: Fn(&str, &str) -> Option<HashAlgorithm>,
    {
        let input = input.into();
        let mut atoms = Vec::new();
        input.flatten_into(&mut atoms);

        let mut entries = Vec::with_capacity(atoms.len());
        for atom in atoms {
            let entry = match atom {
                Atom::Token(token) => IntegrityMetadata::parse(token),
                Atom::Fields(fields) => IntegrityMetadata::from_fields(fields),
            };
            if entry.to_string().is_empty() {
                if let Atom::Token(token) = atom {
                    if !token.is_empty() {
                        log_verbose(&format!("Discarding integrity metadata: {:?}", token));
                    }
                }
                continue;
            }
            entries.push(entry);
        }

        let mut strongest: Vec<IntegrityMetadata> = Vec::new();
        for entry in &entries {
            let current = strongest.first().map(|s| s.algorithm_name()).unwrap_or("");
            match prioritize(current, entry.algorithm_name()) {
                None => strongest.push(entry.clone()),
                Some(alg) if Some(alg) == entry.algorithm() => {
                    strongest.clear();
                    strongest.push(entry.clone());
                }
                Some(_) => {}
            }
        }

        Self { entries, strongest }
    }

    /// Entries using the most preferred algorithm, ties included.
    pub fn strongest(&self) -> &[IntegrityMetadata] {
        &self.strongest
    }

    /// Distinct algorithms of the strongest entries, in order.
    pub fn strongest_hash_algorithms(&self) -> Vec<HashAlgorithm> {
        let mut out: Vec<HashAlgorithm> = Vec::new();
        for alg in self.strongest.iter().filter_map(|m| m.algorithm()) {
            if !out.contains(&alg) {
                out.push(alg);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IntegrityMetadata> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[IntegrityMetadata] {
        &self.entries
    }

    /// True when any entry, not only the strongest, matches `candidate`.
    pub fn matches<T: Into<IntegrityMetadata>>(&self, candidate: T) -> bool {
        let candidate = candidate.into();
        self.entries.iter().any(|m| m.matches_entry(&candidate))
    }

    /// Canonical strings of all entries joined by `separator`.
    pub fn join(&self, separator: &str) -> String {
        self.entries
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for IntegrityMetadataSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join(" "))
    }
}

impl<'a> IntoIterator for &'a IntegrityMetadataSet {
    type Item = &'a IntegrityMetadata;
    type IntoIter = std::slice::Iter<'a, IntegrityMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for IntegrityMetadataSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IntegrityMetadataSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::new(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA256: &str = "sha256-MV9b23bQeMQ7isAGTkoBZGErH853yGk0W/yUx1iU7dM=";
    const SHA256_OTHER: &str = "sha256-uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek=";
    const SHA384: &str = "sha384-VbxVaw0v4Pzlgrpf4Huq//A1ZTY4x6wNVJTCpkwL6hzFczHHwSpFzbyn9MNKCJ7r";
    const SHA512: &str = "sha512-wVJ82JPBJHc9gRkRlwyP5uhX1t9dySJr2KFgYUwM2WOk3eorlLt9NgIe+dhl1c6ilKgt1JoLsmn1H256V/eUIQ==";

    fn all_three() -> String {
        format!("\n{}\n{}\n{}\n", SHA256, SHA384, SHA512)
    }

    #[test]
    fn test_single_token() {
        let set = IntegrityMetadataSet::new(SHA256);
        assert_eq!(set.len(), 1);
        let first = set.iter().next().unwrap();
        assert_eq!(first.algorithm(), Some(HashAlgorithm::Sha256));
        assert!(first.options().is_empty());
    }

    #[test]
    fn test_options_are_kept() {
        let set = IntegrityMetadataSet::new(format!("{}?foo?bar", SHA256));
        assert_eq!(set.as_slice()[0].options(), ["foo", "bar"]);
    }

    #[test]
    fn test_structured_equals_text() {
        let fields = MetadataFields::new("sha256", "MV9b23bQeMQ7isAGTkoBZGErH853yGk0W/yUx1iU7dM=");
        assert_eq!(IntegrityMetadataSet::new(fields), IntegrityMetadataSet::new(SHA256));
    }

    #[test]
    fn test_mixed_list_input() {
        let fields = MetadataFields::new("sha256", "MV9b23bQeMQ7isAGTkoBZGErH853yGk0W/yUx1iU7dM=");
        let mixed = IntegrityInput::List(vec![
            fields.into(),
            IntegrityInput::Absent,
            format!("\n{}\n{}\n", SHA384, SHA512).into(),
            IntegrityInput::List(vec![IntegrityInput::Absent]),
        ]);
        assert_eq!(
            IntegrityMetadataSet::new(mixed),
            IntegrityMetadataSet::new([SHA256, SHA384, SHA512])
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let set = IntegrityMetadataSet::new([SHA256, SHA256]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.strongest().len(), 2);
    }

    #[test]
    fn test_unicode_separators_and_trim() {
        let padded = format!("\t  {}\u{0020}\u{00a0}\u{1680}\u{2000}\u{3000}", SHA256);
        assert_eq!(IntegrityMetadataSet::new(padded), IntegrityMetadataSet::new(SHA256));

        let joined = format!(
            "{}\t\u{0020}\u{00a0}\u{1680}{}\u{2000}\u{2001}\u{2002}\u{3000}{}",
            SHA256, SHA384, SHA512
        );
        assert_eq!(
            IntegrityMetadataSet::new(joined),
            IntegrityMetadataSet::new(vec![SHA256, SHA384, SHA512])
        );
    }

    #[test]
    fn test_discards_invalid_input() {
        let empty = IntegrityMetadataSet::new(Vec::<&str>::new());
        assert_eq!(IntegrityMetadataSet::new("sha1-lDpwLQbzRZmu4fjajvn3KWAx1pk="), empty);
        assert_eq!(IntegrityMetadataSet::new(None::<&str>), empty);
        assert_eq!(IntegrityMetadataSet::new(""), empty);
        assert_eq!(IntegrityMetadataSet::new("md5\0/..invalid-value"), empty);
        assert_eq!(
            IntegrityMetadataSet::new("sha1-lDpwLQbzRZmu4fjajvn3KWAx1pk= md5\0/..invalid-value"),
            empty
        );
        assert!(empty.is_empty());
        assert!(empty.strongest().is_empty());
    }

    #[test]
    fn test_discards_fields_with_surrounding_whitespace() {
        let val = "MV9b23bQeMQ7isAGTkoBZGErH853yGk0W/yUx1iU7dM=";
        let padded = MetadataFields::new("sha256", &format!("{} ", val));
        let newline_opt = MetadataFields::new("sha256", val).with_options(["x\n"]);

        assert!(IntegrityMetadataSet::new(padded.clone()).is_empty());
        assert!(IntegrityMetadataSet::new(newline_opt.clone()).is_empty());
        assert!(!IntegrityMetadataSet::new(vec![padded, newline_opt]).matches(SHA256));

        // The same tokens as text are trimmed and kept
        assert_eq!(IntegrityMetadataSet::new(format!(" {}\n", SHA256)).len(), 1);
    }

    #[test]
    fn test_strongest_picks_sha512() {
        let set = IntegrityMetadataSet::new(all_three());
        assert_eq!(set.len(), 3);
        assert_eq!(set.strongest(), IntegrityMetadataSet::new(SHA512).as_slice());
        assert_eq!(set.strongest_hash_algorithms(), vec![HashAlgorithm::Sha512]);
    }

    #[test]
    fn test_strongest_independent_of_order() {
        let set = IntegrityMetadataSet::new([SHA512, SHA256, SHA384]);
        assert_eq!(set.strongest(), IntegrityMetadataSet::new(SHA512).as_slice());
    }

    #[test]
    fn test_strongest_empty_without_supported_algorithms() {
        let set = IntegrityMetadataSet::new(
            "\nsha1-lDpwLQbzRZmu4fjajvn3KWAx1pk=\nmd5-bNNVbesNpUvKBgtMOUeYOQ==\n",
        );
        assert!(set.strongest().is_empty());
        assert!(set.strongest_hash_algorithms().is_empty());
    }

    #[test]
    fn test_strongest_keeps_ties() {
        let set = IntegrityMetadataSet::new([SHA256, SHA256_OTHER]);
        assert_eq!(set.strongest().len(), 2);
        assert_eq!(set.strongest_hash_algorithms(), vec![HashAlgorithm::Sha256]);

        // A stronger entry resets accumulated ties
        let set = IntegrityMetadataSet::new([SHA256, SHA256_OTHER, SHA384]);
        assert_eq!(set.strongest(), IntegrityMetadataSet::new(SHA384).as_slice());
    }

    #[test]
    fn test_custom_prioritizer() {
        let set = IntegrityMetadataSet::with_prioritizer(all_three(), |_: &str, _: &str| {
            Some(HashAlgorithm::Sha384)
        });
        assert_eq!(set.strongest(), IntegrityMetadataSet::new(SHA384).as_slice());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_prioritizer_without_preference_keeps_everything() {
        let set = IntegrityMetadataSet::with_prioritizer(all_three(), |_: &str, _: &str| None);
        assert_eq!(set.strongest(), set.as_slice());
    }

    #[test]
    fn test_match_any_entry() {
        let set = IntegrityMetadataSet::new([SHA256, SHA256_OTHER]);
        assert!(set.matches(SHA256));
        assert!(set.matches(SHA256_OTHER));
        assert!(set.matches(MetadataFields::new(
            "sha256",
            "MV9b23bQeMQ7isAGTkoBZGErH853yGk0W/yUx1iU7dM="
        )));
        assert!(!set.matches("sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="));
        assert!(!set.matches(SHA384));
    }

    #[test]
    fn test_match_non_strongest_entry() {
        let set = IntegrityMetadataSet::new(all_three());
        assert!(set.matches(SHA256));
    }

    #[test]
    fn test_match_invalid_is_false() {
        let set = IntegrityMetadataSet::new("sha1-lDpwLQbzRZmu4fjajvn3KWAx1pk=");
        assert!(!set.matches("sha1-lDpwLQbzRZmu4fjajvn3KWAx1pk="));
        assert!(!IntegrityMetadataSet::new(None::<&str>).matches(None::<&str>));
        assert!(!IntegrityMetadataSet::new(SHA256).matches(""));
    }

    #[test]
    fn test_iteration_order() {
        let set = IntegrityMetadataSet::new(all_three());
        let listed: Vec<IntegrityMetadata> = set.iter().cloned().collect();
        assert_eq!(
            listed,
            vec![
                IntegrityMetadata::parse(SHA256),
                IntegrityMetadata::parse(SHA384),
                IntegrityMetadata::parse(SHA512),
            ]
        );
        // Iteration is restartable
        assert_eq!((&set).into_iter().count(), 3);
        assert_eq!(set.iter().count(), 3);
    }

    #[test]
    fn test_join_and_display() {
        let set = IntegrityMetadataSet::new(all_three());
        assert_eq!(set.to_string(), format!("{} {} {}", SHA256, SHA384, SHA512));
        assert_eq!(set.join(","), format!("{},{},{}", SHA256, SHA384, SHA512));
        assert_eq!(IntegrityMetadataSet::default().to_string(), "");
    }

    #[test]
    fn test_serde_round_trip() {
        let set = IntegrityMetadataSet::new([SHA384, SHA512]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, format!("\"{} {}\"", SHA384, SHA512));
        let back: IntegrityMetadataSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
