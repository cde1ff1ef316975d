//! DSTV 7th-edition NC1 format plugin: lexer, block parser factory, and
//! semantic stage producing a pivot scene (components D, E, F, I).

pub mod ast;
pub mod blocks;
pub mod error;
pub mod lexer;
pub mod plugin;

pub use ast::{build_scene, lex_and_parse_blocks, parse_source, ParsedBlock, SemanticOutcome};
pub use blocks::{
    BlockKind, BlockParser, BlockParserFactory, BlockPayload, BlockValidation, BoEntry, BoPayload,
    ContourParser, ContourPayload, ContourPoint, FactoryConfig, GenericParser, GenericPayload, PuPayload,
    SiPayload, StPayload, ThreadHandedness, ToPayload,
};
pub use error::DstvError;
pub use lexer::{tokenize, tokenize_field_compound, LexOutcome, Token, TokenKind};
pub use plugin::DstvPlugin;
