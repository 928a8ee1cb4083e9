//! Data model and pure algorithms backing documentation link resolution:
//! interning, the indexed node arena, the path hierarchy and its
//! disambiguation containers, the hierarchy builder, the link parser, type
//! signature extraction, and the versioned file representation.

pub mod builder;
pub mod config;
pub mod container;
pub mod file_repr;
pub mod hash;
pub mod hierarchy;
pub mod identifier;
pub mod interner;
pub mod node;
pub mod parser;
pub mod type_sig;

pub use builder::{
    HierarchyBuilder, RelationshipInput, RelationshipKind, SymbolGraphInput, SymbolInput,
};
pub use config::SymbolKindTable;
pub use container::{DisambiguationContainer, Element, Insertion};
pub use file_repr::{decode, encode, EntitySummary, FormatVersion, SerializedHierarchy, CURRENT_VERSION};
pub use hash::precise_id_hash;
pub use hierarchy::{Hierarchy, HierarchyError};
pub use identifier::Identifier;
pub use interner::{InternPool, InternedStr};
pub use node::{ChildTable, Node, NodeId, NodeKind, SpecialBehaviors, SymbolData};
pub use parser::{parse_component, parse_path, Disambiguation, ParsedPath, ParsedPathComponent, PathParseError};
pub use type_sig::{
    apply_swift_sugar, extract_parameter_types, extract_return_types, FragmentSpelling,
    FunctionSignature, TypeSignature,
};
