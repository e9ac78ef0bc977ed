use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize, Serializer};

/// 32 BOOLs are packed into each hidden DINT.
pub const BITS_PER_WORD: usize = 32;

/// One of the four alarm conditions an alarm AOI exposes.
/// The same member name is used in ladder contacts and in the COMOS `I/O name` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlarmCondition {
    TopHigh,
    High,
    Low,
    TopLow,
}

impl AlarmCondition {
    pub const ALL: [AlarmCondition; 4] = [
        AlarmCondition::TopHigh,
        AlarmCondition::High,
        AlarmCondition::Low,
        AlarmCondition::TopLow,
    ];

    /// Exact match on the member name (`HHInAlarm` ...), no trimming.
    pub fn from_member(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.member_name() == name)
    }

    pub fn member_name(self) -> &'static str {
        match self {
            AlarmCondition::TopHigh => "HHInAlarm",
            AlarmCondition::High => "HInAlarm",
            AlarmCondition::Low => "LInAlarm",
            AlarmCondition::TopLow => "LLInAlarm",
        }
    }

    pub fn limit_parameter(self) -> &'static str {
        match self {
            AlarmCondition::TopHigh => "HHLimit",
            AlarmCondition::High => "HLimit",
            AlarmCondition::Low => "LLimit",
            AlarmCondition::TopLow => "LLLimit",
        }
    }

    pub fn enable_parameter(self) -> &'static str {
        match self {
            AlarmCondition::TopHigh => "HHEnabled",
            AlarmCondition::High => "HEnabled",
            AlarmCondition::Low => "LEnabled",
            AlarmCondition::TopLow => "LLEnabled",
        }
    }

    /// Position of the limit inside the instance vector.
    /// Index 0 is the packed BOOL word; the limits follow in HH, H, L, LL order.
    pub fn limit_index(self) -> usize {
        match self {
            AlarmCondition::TopHigh => 1,
            AlarmCondition::High => 2,
            AlarmCondition::Low => 3,
            AlarmCondition::TopLow => 4,
        }
    }
}

/// AOI parameter as declared in `PARAMETERS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub data_type: String,
}

impl Parameter {
    pub fn is_bool(&self) -> bool {
        self.data_type == "BOOL"
    }
}

/// Location of a packed BOOL: which DINT of the instance vector, which bit inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitSlot {
    pub slot: usize,
    pub bit: u32,
}

impl BitSlot {
    pub fn from_position(position: usize) -> Self {
        Self {
            slot: position / BITS_PER_WORD,
            bit: (position % BITS_PER_WORD) as u32,
        }
    }
}

/// AOI definition (`ADD_ON_INSTRUCTION_DEFINITION`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTypeDefinition {
    pub name: String,
    /// Declaration order is preserved.
    pub parameters: Vec<Parameter>,
    /// BOOL local tags in declaration order.
    pub local_bools: Vec<String>,
    pub bool_bit_map: HashMap<String, BitSlot>,
}

impl BlockTypeDefinition {
    /// Builds the packing map: BOOL parameters first, then BOOL local tags.
    pub fn new(name: String, parameters: Vec<Parameter>, local_bools: Vec<String>) -> Self {
        let packed: Vec<&str> = parameters
            .iter()
            .filter(|p| p.is_bool())
            .map(|p| p.name.as_str())
            .chain(local_bools.iter().map(String::as_str))
            .collect();

        let mut bool_bit_map = HashMap::with_capacity(packed.len());
        for (position, bool_name) in packed.into_iter().enumerate() {
            bool_bit_map.insert(bool_name.to_string(), BitSlot::from_position(position));
        }

        Self {
            name,
            parameters,
            local_bools,
            bool_bit_map,
        }
    }

    pub fn bool_count(&self) -> usize {
        self.parameters.iter().filter(|p| p.is_bool()).count() + self.local_bools.len()
    }

    /// Number of hidden DINTs at the head of every instance vector (at least one).
    pub fn packed_word_count(&self) -> usize {
        self.bool_count().div_ceil(BITS_PER_WORD).max(1)
    }

    pub fn bit_slot(&self, name: &str) -> Option<BitSlot> {
        self.bool_bit_map.get(name).copied()
    }
}

/// Byte offsets of a matched declaration in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

/// AOI instance with its raw initial-value vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub name: String,
    pub block_type: String,
    /// Top-level elements; nested arrays stay as one opaque token.
    pub values: Vec<String>,
    pub span: SourceSpan,
}

impl InstanceRecord {
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Numeric value at `index`; NaN when missing or unparseable.
    pub fn number_at(&self, index: usize) -> f64 {
        self.value(index).map(parse_number).unwrap_or(f64::NAN)
    }

    /// Decodes a packed BOOL: `(word >> bit) & 1`, or 0 when the word is missing or not numeric.
    pub fn packed_bit(&self, slot: BitSlot) -> u8 {
        let Some(raw) = self.value(slot.slot) else {
            return 0;
        };
        let word = parse_number(raw);
        if !word.is_finite() {
            return 0;
        }
        (((word.trunc() as i64) >> slot.bit) & 1) as u8
    }
}

/// Tolerant float parsing for L5K literals (`120.5`, `1.0e+002`, ` 5 `).
pub fn parse_number(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Top-level tag names declared in `TAG ... END_TAG` sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSymbolSet {
    names: HashSet<String>,
}

impl GlobalSymbolSet {
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<String> for GlobalSymbolSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InterlockKey {
    pub instance: String,
    pub condition: AlarmCondition,
}

impl InterlockKey {
    pub fn new(instance: impl Into<String>, condition: AlarmCondition) -> Self {
        Self {
            instance: instance.into(),
            condition,
        }
    }
}

/// (instance, condition) -> output tags gated by that alarm.
/// Values are sorted sets, so accumulation order never shows in the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterlockMap {
    entries: HashMap<InterlockKey, BTreeSet<String>>,
}

impl InterlockMap {
    pub fn add(&mut self, key: InterlockKey, output: impl Into<String>) {
        self.entries.entry(key).or_default().insert(output.into());
    }

    pub fn outputs(&self, instance: &str, condition: AlarmCondition) -> Option<&BTreeSet<String>> {
        self.entries.get(&InterlockKey::new(instance, condition))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by instance, then condition.
    pub fn iter(&self) -> impl Iterator<Item = (&InterlockKey, &BTreeSet<String>)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}

#[derive(Serialize)]
struct InterlockEntry<'a> {
    instance: &'a str,
    condition: AlarmCondition,
    outputs: &'a BTreeSet<String>,
}

/// JSON maps need string keys, so the map is written as a sorted entry list.
impl Serialize for InterlockMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|(key, outputs)| InterlockEntry {
            instance: &key.instance,
            condition: key.condition,
            outputs,
        }))
    }
}

/// Advisory finding of the limit-layout check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutWarning {
    pub block_type: String,
    pub message: String,
}

/// Result of the full-text pass. Read-only input of the per-row pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProgramAnalysis {
    pub definitions: HashMap<String, BlockTypeDefinition>,
    pub instances: HashMap<String, InstanceRecord>,
    pub symbols: GlobalSymbolSet,
    pub interlocks: InterlockMap,
    pub warnings: Vec<LayoutWarning>,
}

impl ProgramAnalysis {
    pub fn instance(&self, name: &str) -> Option<&InstanceRecord> {
        self.instances.get(name)
    }

    pub fn definition_of(&self, instance: &InstanceRecord) -> Option<&BlockTypeDefinition> {
        self.definitions.get(&instance.block_type)
    }
}
