/*
L5K text markers and ladder mnemonics
*/

pub const AOI_DEFINITION: &str = "ADD_ON_INSTRUCTION_DEFINITION";
pub const AOI_DEFINITION_END: &str = "END_ADD_ON_INSTRUCTION_DEFINITION";
pub const PARAMETERS: &str = "PARAMETERS";
pub const PARAMETERS_END: &str = "END_PARAMETERS";
pub const LOCAL_TAGS: &str = "LOCAL_TAGS";
pub const LOCAL_TAGS_END: &str = "END_LOCAL_TAGS";
pub const TAG: &str = "TAG";
pub const TAG_END: &str = "END_TAG";

/// Neutral rung prefix (`N: ...;`).
pub const RUNG_PREFIX: &str = "N:";
/// Data type of packed parameters / local tags.
pub const BOOL_TYPE: &str = "BOOL";
/// Member access separator in tag references.
pub const MEMBER_SEPARATOR: char = '.';

/// Output instructions that make a rung an interlock candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoilVerb {
    /// Output energize
    Ote,
    /// Output unlatch
    Otu,
    /// Output latch
    Otl,
}

impl CoilVerb {
    pub fn parse(mnemonic: &str) -> Option<Self> {
        match mnemonic {
            "OTE" => Some(CoilVerb::Ote),
            "OTU" => Some(CoilVerb::Otu),
            "OTL" => Some(CoilVerb::Otl),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            CoilVerb::Ote => "OTE",
            CoilVerb::Otu => "OTU",
            CoilVerb::Otl => "OTL",
        }
    }
}

/// Input contacts examined inside a rung's condition group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactVerb {
    /// Examine if closed
    Xic,
    /// Examine if open
    Xio,
}

impl ContactVerb {
    pub const ALL: [ContactVerb; 2] = [ContactVerb::Xic, ContactVerb::Xio];

    pub fn mnemonic(self) -> &'static str {
        match self {
            ContactVerb::Xic => "XIC",
            ContactVerb::Xio => "XIO",
        }
    }
}
