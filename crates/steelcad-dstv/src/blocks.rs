//! Block parser factory and the ~20 per-block-kind parsers (component E).
//! Dynamic dispatch over block kinds is a closed enum plus a trait object
//! returned by the factory, per the normalised design — not a map of
//! class constructors looked up by string.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use steelcad_core::{ErrorKind, Face, StructuredError};

use crate::error::DstvError;
use crate::lexer::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    St,
    En,
    Bo,
    Ak,
    Ik,
    Ka,
    Si,
    Sc,
    Br,
    Lp,
    Rt,
    Pu,
    To,
    Ko,
    Generic(String),
}

const KNOWN_GENERIC_CODES: [&str; 14] = [
    "UE", "NU", "FP", "VO", "WA", "GR", "RO", "KL", "KN", "FB", "BF", "VB", "EB", "PR",
];

impl BlockKind {
    /// Every two-uppercase-letter code the lexer can hand us resolves to a
    /// `BlockKind` — known codes get a typed parser, anything else falls
    /// back to `Generic` so an unrecognised block never fails the import.
    pub fn from_code(code: &str) -> Self {
        match code {
            "ST" => Self::St,
            "EN" => Self::En,
            "BO" => Self::Bo,
            "AK" => Self::Ak,
            "IK" => Self::Ik,
            "KA" => Self::Ka,
            "SI" => Self::Si,
            "SC" => Self::Sc,
            "BR" => Self::Br,
            "LP" => Self::Lp,
            "RT" => Self::Rt,
            "PU" => Self::Pu,
            "TO" => Self::To,
            "KO" => Self::Ko,
            other => Self::Generic(other.to_string()),
        }
    }

    pub fn code(&self) -> String {
        match self {
            Self::St => "ST".into(),
            Self::En => "EN".into(),
            Self::Bo => "BO".into(),
            Self::Ak => "AK".into(),
            Self::Ik => "IK".into(),
            Self::Ka => "KA".into(),
            Self::Si => "SI".into(),
            Self::Sc => "SC".into(),
            Self::Br => "BR".into(),
            Self::Lp => "LP".into(),
            Self::Rt => "RT".into(),
            Self::Pu => "PU".into(),
            Self::To => "TO".into(),
            Self::Ko => "KO".into(),
            Self::Generic(code) => code.clone(),
        }
    }

    pub fn is_recognised_lenient(&self) -> bool {
        matches!(self, Self::Generic(code) if KNOWN_GENERIC_CODES.contains(&code.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub bulge: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StPayload {
    pub order_number: Option<String>,
    pub drawing_number: Option<String>,
    pub phase_number: Option<String>,
    pub piece_number: Option<String>,
    pub steel_grade: String,
    pub quantity: u32,
    pub designation: String,
    pub category_code: char,
    pub length: f64,
    pub height: f64,
    pub width: f64,
    pub web_thickness: f64,
    pub flange_thickness: f64,
    pub weight_per_metre: Option<f64>,
    pub surface_area: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoEntry {
    pub face: Face,
    pub x: f64,
    pub y: f64,
    pub diameter: f64,
    pub depth: Option<f64>,
    pub slot_length: Option<f64>,
    pub slot_angle: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoPayload {
    pub entries: Vec<BoEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourPayload {
    pub face: Face,
    pub points: Vec<ContourPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiPayload {
    pub face: Face,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub height: Option<f64>,
    pub angle: Option<f64>,
    pub depth: Option<f64>,
    pub method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuPayload {
    pub face: Face,
    pub x: f64,
    pub y: f64,
    pub force: Option<f64>,
    pub depth: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadHandedness {
    Right,
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToPayload {
    pub x: f64,
    pub y: f64,
    pub nominal_diameter: f64,
    pub pitch: Option<f64>,
    pub depth: Option<f64>,
    pub handedness: ThreadHandedness,
    pub class: Option<String>,
    pub standard: Option<String>,
    pub tool_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericPayload {
    pub numbers: Vec<f64>,
    pub strings: Vec<String>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockPayload {
    St(StPayload),
    En,
    Bo(BoPayload),
    Ak(ContourPayload),
    Ik(ContourPayload),
    Ka(ContourPayload),
    Si(SiPayload),
    Sc(GenericPayload),
    Br(GenericPayload),
    Lp(GenericPayload),
    Rt(GenericPayload),
    Pu(PuPayload),
    To(ToPayload),
    Ko(ContourPayload),
    Generic(GenericPayload),
}

#[derive(Debug, Clone, Default)]
pub struct BlockValidation {
    pub is_valid: bool,
    pub errors: Vec<StructuredError>,
    pub warnings: Vec<StructuredError>,
}

impl BlockValidation {
    pub fn ok() -> Self {
        Self { is_valid: true, ..Default::default() }
    }

    pub fn invalid(errors: Vec<StructuredError>) -> Self {
        Self { is_valid: false, errors, warnings: Vec::new() }
    }
}

/// Walks a block's token slice, skipping separator noise, and converts
/// fields on demand. All per-parse state lives here on the call stack, not
/// on the parser struct.
struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    line: usize,
}

impl<'a> TokenCursor<'a> {
    fn new(tokens: &'a [Token], header_line: usize) -> Self {
        Self { tokens, pos: 0, line: header_line }
    }

    fn advance(&mut self) -> Option<&'a Token> {
        while self.pos < self.tokens.len() {
            let tok = &self.tokens[self.pos];
            self.pos += 1;
            if matches!(tok.kind, TokenKind::Newline | TokenKind::Comment) {
                continue;
            }
            self.line = tok.line;
            return Some(tok);
        }
        None
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens[self.pos..]
            .iter()
            .find(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Comment))
    }

    fn number(&mut self, field: &str, kind: &str) -> Result<f64, DstvError> {
        let tok = self
            .advance()
            .ok_or_else(|| DstvError::BlockParse { kind: kind.to_string(), line: self.line, message: format!("missing field: {field}") })?;
        match tok.kind {
            TokenKind::Integer | TokenKind::Float | TokenKind::Coordinate => Ok(tok.as_f64().unwrap_or(0.0)),
            _ => Err(DstvError::BlockParse {
                kind: kind.to_string(),
                line: tok.line,
                message: format!("expected numeric field '{field}', found '{}'", tok.value),
            }),
        }
    }

    fn optional_number(&mut self) -> Option<f64> {
        let tok = self.peek()?;
        if matches!(tok.kind, TokenKind::Integer | TokenKind::Float | TokenKind::Coordinate) {
            self.advance();
            tok.as_f64()
        } else {
            None
        }
    }

    fn coordinate(&mut self, field: &str, kind: &str) -> Result<(f64, Option<char>), DstvError> {
        let tok = self
            .advance()
            .ok_or_else(|| DstvError::BlockParse { kind: kind.to_string(), line: self.line, message: format!("missing field: {field}") })?;
        match tok.kind {
            TokenKind::Coordinate => Ok((tok.as_f64().unwrap_or(0.0), tok.suffix)),
            TokenKind::Integer | TokenKind::Float => Ok((tok.as_f64().unwrap_or(0.0), None)),
            _ => Err(DstvError::BlockParse {
                kind: kind.to_string(),
                line: tok.line,
                message: format!("expected coordinate field '{field}', found '{}'", tok.value),
            }),
        }
    }

    fn string(&mut self, field: &str, kind: &str) -> Result<String, DstvError> {
        let tok = self
            .advance()
            .ok_or_else(|| DstvError::BlockParse { kind: kind.to_string(), line: self.line, message: format!("missing field: {field}") })?;
        Ok(tok.value.clone())
    }

    fn optional_string(&mut self) -> Option<String> {
        let tok = self.peek()?;
        if matches!(tok.kind, TokenKind::Empty) {
            self.advance();
            return None;
        }
        self.advance();
        Some(tok.value.clone())
    }

    fn has_more(&self) -> bool {
        self.peek().is_some()
    }

    /// Reads a field that the lexer may have split into a compound
    /// (`NUMBER` + `DELIMITER("r")` + `STRING`, e.g. `10rF1001`), rejoining
    /// it into the single raw field text. Falls back to a plain
    /// `optional_string` when the next field wasn't a compound.
    fn optional_compound_string(&mut self) -> Option<String> {
        let start = self.pos;
        let number_tok = self.peek()?;
        if !matches!(number_tok.kind, TokenKind::Integer | TokenKind::Float) {
            return self.optional_string();
        }
        self.advance();
        let Some(delim) = self.peek() else {
            self.pos = start;
            return self.optional_string();
        };
        if delim.kind != TokenKind::Delimiter || delim.value != "r" {
            self.pos = start;
            return self.optional_string();
        }
        self.advance();
        let Some(remainder) = self.advance() else {
            self.pos = start;
            return self.optional_string();
        };
        Some(format!("{}r{}", number_tok.value, remainder.value))
    }
}

fn face_from_suffix(suffix: Option<char>) -> Face {
    match suffix {
        Some('v') => Face::Web,
        Some('o') => Face::TopFlange,
        Some('u') => Face::BottomFlange,
        Some('h') => Face::Front,
        _ => Face::Web,
    }
}

fn face_from_letter(letter: &str) -> Face {
    match letter {
        "v" => Face::Web,
        "o" => Face::TopFlange,
        "u" => Face::BottomFlange,
        "h" => Face::Front,
        _ => Face::Web,
    }
}

pub trait BlockParser: Send + Sync {
    fn block_type(&self) -> BlockKind;
    fn name(&self) -> &str;
    fn description(&self) -> &str {
        ""
    }
    fn parse(&self, tokens: &[Token], header_line: usize) -> Result<BlockPayload, DstvError>;

    fn validate(&self, tokens: &[Token], header_line: usize) -> BlockValidation {
        match self.parse(tokens, header_line) {
            Ok(_) => BlockValidation::ok(),
            Err(err) => BlockValidation::invalid(vec![StructuredError::new(ErrorKind::Validation, err.to_string())]),
        }
    }
}

pub struct StParser;

impl BlockParser for StParser {
    fn block_type(&self) -> BlockKind {
        BlockKind::St
    }
    fn name(&self) -> &str {
        "ST"
    }
    fn description(&self) -> &str {
        "start/header block: order metadata, designation, category, dimensions"
    }
    fn parse(&self, tokens: &[Token], header_line: usize) -> Result<BlockPayload, DstvError> {
        let mut cur = TokenCursor::new(tokens, header_line);
        let order_number = cur.optional_string();
        let drawing_number = cur.optional_string();
        let phase_number = cur.optional_string();
        let piece_number = cur.optional_string();
        let steel_grade = cur.string("steel_grade", "ST")?;
        let quantity = cur.number("quantity", "ST")? as u32;
        let designation = cur.string("designation", "ST")?;
        let category_code = cur
            .string("category_code", "ST")?
            .chars()
            .next()
            .ok_or_else(|| DstvError::BlockParse { kind: "ST".into(), line: header_line, message: "empty category code".into() })?;
        let length = cur.number("length", "ST")?;
        let height = cur.number("height", "ST")?;
        let width = cur.number("width", "ST")?;
        let web_thickness = cur.number("web_thickness", "ST")?;
        let flange_thickness = cur.number("flange_thickness", "ST")?;
        let weight_per_metre = cur.optional_number();
        let surface_area = cur.optional_number();

        Ok(BlockPayload::St(StPayload {
            order_number,
            drawing_number,
            phase_number,
            piece_number,
            steel_grade,
            quantity,
            designation,
            category_code,
            length,
            height,
            width,
            web_thickness,
            flange_thickness,
            weight_per_metre,
            surface_area,
        }))
    }
}

pub struct EnParser;

impl BlockParser for EnParser {
    fn block_type(&self) -> BlockKind {
        BlockKind::En
    }
    fn name(&self) -> &str {
        "EN"
    }
    fn description(&self) -> &str {
        "end-of-file marker, no payload"
    }
    fn parse(&self, tokens: &[Token], header_line: usize) -> Result<BlockPayload, DstvError> {
        let cur = TokenCursor::new(tokens, header_line);
        if cur.peek().is_some() {
            return Err(DstvError::BlockParse { kind: "EN".into(), line: header_line, message: "unexpected content after EN".into() });
        }
        Ok(BlockPayload::En)
    }
}

pub struct BoParser;

impl BlockParser for BoParser {
    fn block_type(&self) -> BlockKind {
        BlockKind::Bo
    }
    fn name(&self) -> &str {
        "BO"
    }
    fn description(&self) -> &str {
        "hole records: face, position, diameter, optional depth/slot"
    }
    fn parse(&self, tokens: &[Token], header_line: usize) -> Result<BlockPayload, DstvError> {
        let mut cur = TokenCursor::new(tokens, header_line);
        let mut entries = Vec::new();
        while cur.has_more() {
            let (x, suffix) = cur.coordinate("x", "BO")?;
            let face = face_from_suffix(suffix);
            let y = cur.number("y", "BO")?;
            let diameter = cur.number("diameter", "BO")?;
            let depth = cur.optional_number();
            let slot_length = cur.optional_number();
            let slot_angle = cur.optional_number();
            entries.push(BoEntry { face, x, y, diameter, depth, slot_length, slot_angle });
        }
        if entries.is_empty() {
            return Err(DstvError::BlockParse { kind: "BO".into(), line: header_line, message: "BO block has no hole entries".into() });
        }
        Ok(BlockPayload::Bo(BoPayload { entries }))
    }
}

/// Shared parser for AK/IK/KO (contours) and, leniently, KA (arc contour —
/// whether arcs carry centre or radius encoding is unresolved against a
/// reference file, so KA is parsed as a plain bulge-polyline like AK/IK,
/// with any extra numeric fields folded into the point's bulge; see
/// DESIGN.md for the tradeoff).
pub struct ContourParser {
    kind: BlockKind,
}

impl ContourParser {
    pub fn new(kind: BlockKind) -> Self {
        Self { kind }
    }
}

impl BlockParser for ContourParser {
    fn block_type(&self) -> BlockKind {
        self.kind.clone()
    }
    fn name(&self) -> &str {
        match self.kind {
            BlockKind::Ak => "AK",
            BlockKind::Ik => "IK",
            BlockKind::Ko => "KO",
            BlockKind::Ka => "KA",
            _ => "contour",
        }
    }
    fn description(&self) -> &str {
        "closed polyline in face-local coordinates with optional per-edge bulge"
    }
    fn parse(&self, tokens: &[Token], header_line: usize) -> Result<BlockPayload, DstvError> {
        let mut cur = TokenCursor::new(tokens, header_line);
        let mut points = Vec::new();
        let mut face = Face::Web;
        let mut first = true;
        while cur.has_more() {
            let (x, suffix) = cur.coordinate("x", self.name())?;
            if first {
                face = face_from_suffix(suffix);
                first = false;
            }
            let y = cur.number("y", self.name())?;
            let bulge = cur.optional_number();
            points.push(ContourPoint { x, y, bulge });
        }
        if points.len() < 3 {
            return Err(DstvError::BlockParse {
                kind: self.name().to_string(),
                line: header_line,
                message: "contour needs at least 3 points".into(),
            });
        }
        let payload = ContourPayload { face, points };
        Ok(match self.kind {
            BlockKind::Ak => BlockPayload::Ak(payload),
            BlockKind::Ik => BlockPayload::Ik(payload),
            BlockKind::Ko => BlockPayload::Ko(payload),
            BlockKind::Ka => BlockPayload::Ka(payload),
            _ => unreachable!(),
        })
    }
}

pub struct SiParser;

impl BlockParser for SiParser {
    fn block_type(&self) -> BlockKind {
        BlockKind::Si
    }
    fn name(&self) -> &str {
        "SI"
    }
    fn description(&self) -> &str {
        "marking: face, position, text, optional height/angle/depth/method"
    }
    fn parse(&self, tokens: &[Token], header_line: usize) -> Result<BlockPayload, DstvError> {
        let mut cur = TokenCursor::new(tokens, header_line);

        let first_tok = cur.peek().ok_or_else(|| DstvError::BlockParse {
            kind: "SI".into(),
            line: header_line,
            message: "empty SI block".into(),
        })?;
        let leading_face_letter = matches!(first_tok.kind, TokenKind::Identifier) && first_tok.value.len() == 1;
        let face = if leading_face_letter {
            let letter = cur.string("face", "SI")?;
            face_from_letter(&letter)
        } else {
            Face::Web
        };

        let (x, suffix) = cur.coordinate("x", "SI")?;
        let face = if leading_face_letter { face } else { face_from_suffix(suffix) };
        let y = cur.number("y", "SI")?;
        // Numeric height/angle precede the text field, per the worked example
        // in spec.md §8 ("v 200 150 10 0 PART-001" = face, x, y, height,
        // angle, text) rather than the prose listing order in §4 — see
        // DESIGN.md's Open Question entry for this discrepancy.
        let height = cur.optional_number();
        let angle = cur.optional_number();
        let text = cur.string("text", "SI")?;
        let depth = cur.optional_number();
        let method = cur.optional_string();

        Ok(BlockPayload::Si(SiPayload { face, x, y, text, height, angle, depth, method }))
    }
}

pub struct PuParser;

impl BlockParser for PuParser {
    fn block_type(&self) -> BlockKind {
        BlockKind::Pu
    }
    fn name(&self) -> &str {
        "PU"
    }
    fn description(&self) -> &str {
        "punch mark: face, position, optional force/depth"
    }
    fn parse(&self, tokens: &[Token], header_line: usize) -> Result<BlockPayload, DstvError> {
        let mut cur = TokenCursor::new(tokens, header_line);
        let (x, suffix) = cur.coordinate("x", "PU")?;
        let face = face_from_suffix(suffix);
        let y = cur.number("y", "PU")?;
        let force = cur.optional_number();
        let depth = cur.optional_number();
        Ok(BlockPayload::Pu(PuPayload { face, x, y, force, depth }))
    }
}

pub struct ToParser;

impl BlockParser for ToParser {
    fn block_type(&self) -> BlockKind {
        BlockKind::To
    }
    fn name(&self) -> &str {
        "TO"
    }
    fn description(&self) -> &str {
        "threading: position, nominal diameter, optional pitch/depth/handedness/class"
    }
    fn parse(&self, tokens: &[Token], header_line: usize) -> Result<BlockPayload, DstvError> {
        let mut cur = TokenCursor::new(tokens, header_line);
        let x = cur.number("x", "TO")?;
        let y = cur.number("y", "TO")?;
        let nominal_diameter = cur.number("nominal_diameter", "TO")?;
        let pitch = cur.optional_number();
        let depth = cur.optional_number();
        let handedness = match cur.optional_string().as_deref() {
            Some("left") | Some("L") => ThreadHandedness::Left,
            _ => ThreadHandedness::Right,
        };
        let class = cur.optional_string();
        let standard = cur.optional_string();
        let tool_number = cur.optional_compound_string();
        Ok(BlockPayload::To(ToPayload { x, y, nominal_diameter, pitch, depth, handedness, class, standard, tool_number }))
    }
}

/// Generic lenient parser used for SC, BR, LP, RT (whose field contracts
/// are not fully pinned down against a reference file) and the remaining
/// recognised-but-unspecified block kinds: numbers and strings are
/// collected positionally without semantic interpretation.
pub struct GenericParser {
    kind: BlockKind,
}

impl GenericParser {
    pub fn new(kind: BlockKind) -> Self {
        Self { kind }
    }
}

impl BlockParser for GenericParser {
    fn block_type(&self) -> BlockKind {
        self.kind.clone()
    }
    fn name(&self) -> &str {
        "generic"
    }
    fn description(&self) -> &str {
        "lenient fallback: numbers[]/strings[] collected positionally"
    }
    fn parse(&self, tokens: &[Token], header_line: usize) -> Result<BlockPayload, DstvError> {
        let mut cur = TokenCursor::new(tokens, header_line);
        let mut numbers = Vec::new();
        let mut strings = Vec::new();
        while let Some(tok) = cur.advance() {
            match tok.kind {
                TokenKind::Integer | TokenKind::Float | TokenKind::Coordinate => numbers.push(tok.as_f64().unwrap_or(0.0)),
                TokenKind::Empty => {}
                _ => strings.push(tok.value.clone()),
            }
        }
        Ok(BlockPayload::Generic(GenericPayload { numbers, strings, metadata: HashMap::new() }))
    }
}

fn build_parser(kind: &BlockKind) -> Box<dyn BlockParser> {
    match kind {
        BlockKind::St => Box::new(StParser),
        BlockKind::En => Box::new(EnParser),
        BlockKind::Bo => Box::new(BoParser),
        BlockKind::Ak => Box::new(ContourParser::new(BlockKind::Ak)),
        BlockKind::Ik => Box::new(ContourParser::new(BlockKind::Ik)),
        BlockKind::Ko => Box::new(ContourParser::new(BlockKind::Ko)),
        BlockKind::Ka => Box::new(ContourParser::new(BlockKind::Ka)),
        BlockKind::Si => Box::new(SiParser),
        BlockKind::Pu => Box::new(PuParser),
        BlockKind::To => Box::new(ToParser),
        BlockKind::Sc => Box::new(GenericParser::new(BlockKind::Sc)),
        BlockKind::Br => Box::new(GenericParser::new(BlockKind::Br)),
        BlockKind::Lp => Box::new(GenericParser::new(BlockKind::Lp)),
        BlockKind::Rt => Box::new(GenericParser::new(BlockKind::Rt)),
        BlockKind::Generic(code) => Box::new(GenericParser::new(BlockKind::Generic(code.clone()))),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FactoryConfig {
    pub strict: bool,
    pub validate: bool,
    pub debug_logs: bool,
}

/// Owns a lazily-populated cache of parser instances keyed by block kind.
/// Instances are stateless (§5): parsing writes no fields on the parser,
/// only locals on `TokenCursor`, so the same instance is safe to reuse
/// across concurrent jobs.
pub struct BlockParserFactory {
    parsers: Mutex<HashMap<BlockKind, Box<dyn BlockParser>>>,
    stats: Mutex<HashMap<String, u64>>,
    config: FactoryConfig,
}

impl BlockParserFactory {
    pub fn new(config: FactoryConfig) -> Self {
        Self { parsers: Mutex::new(HashMap::new()), stats: Mutex::new(HashMap::new()), config }
    }

    pub fn config(&self) -> FactoryConfig {
        self.config
    }

    pub fn register_parser(&self, kind: BlockKind, parser: Box<dyn BlockParser>) {
        self.parsers.lock().unwrap().insert(kind, parser);
    }

    fn with_parser<R>(&self, kind: &BlockKind, f: impl FnOnce(&dyn BlockParser) -> R) -> R {
        let mut parsers = self.parsers.lock().unwrap();
        let parser = parsers.entry(kind.clone()).or_insert_with(|| build_parser(kind));
        f(parser.as_ref())
    }

    pub fn parse(&self, kind: &BlockKind, tokens: &[Token], header_line: usize) -> Result<BlockPayload, DstvError> {
        *self.stats.lock().unwrap().entry(kind.code()).or_insert(0) += 1;
        self.with_parser(kind, |parser| parser.parse(tokens, header_line))
    }

    pub fn validate(&self, kind: &BlockKind, tokens: &[Token], header_line: usize) -> BlockValidation {
        self.with_parser(kind, |parser| parser.validate(tokens, header_line))
    }

    pub fn supported_block_types(&self) -> Vec<BlockKind> {
        vec![
            BlockKind::St,
            BlockKind::En,
            BlockKind::Bo,
            BlockKind::Ak,
            BlockKind::Ik,
            BlockKind::Ka,
            BlockKind::Si,
            BlockKind::Sc,
            BlockKind::Br,
            BlockKind::Lp,
            BlockKind::Rt,
            BlockKind::Pu,
            BlockKind::To,
            BlockKind::Ko,
        ]
    }

    pub fn statistics(&self) -> HashMap<String, u64> {
        self.stats.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn body_tokens(source: &str) -> Vec<Token> {
        tokenize(source)
            .tokens
            .into_iter()
            .filter(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Comment | TokenKind::Eof | TokenKind::BlockHeader))
            .collect()
    }

    #[test]
    fn test_block_kind_from_code_known() {
        assert_eq!(BlockKind::from_code("BO"), BlockKind::Bo);
        assert_eq!(BlockKind::from_code("ZZ"), BlockKind::Generic("ZZ".into()));
    }

    #[test]
    fn test_st_parser_minimal_tube() {
        let tokens = body_tokens("- - - - S355 1 HSS51X51X4.8 M 2259.98 50.8 50.8 4.78 4.78 8.53 0.2\n");
        let payload = StParser.parse(&tokens, 1).unwrap();
        match payload {
            BlockPayload::St(st) => {
                assert_eq!(st.designation, "HSS51X51X4.8");
                assert_eq!(st.category_code, 'M');
                assert_eq!(st.length, 2259.98);
                assert_eq!(st.height, 50.8);
            }
            _ => panic!("expected ST payload"),
        }
    }

    #[test]
    fn test_en_parser_rejects_trailing_content() {
        let tokens = body_tokens("1.0\n");
        assert!(EnParser.parse(&tokens, 1).is_err());
    }

    #[test]
    fn test_bo_parser_two_holes() {
        let tokens = body_tokens("89.01s 25.40 17.50\n174.93s 25.40 17.50\n");
        let payload = BoParser.parse(&tokens, 1).unwrap();
        match payload {
            BlockPayload::Bo(bo) => {
                assert_eq!(bo.entries.len(), 2);
                assert_eq!(bo.entries[0].diameter, 17.50);
                assert_eq!(bo.entries[0].x, 89.01);
            }
            _ => panic!("expected BO payload"),
        }
    }

    #[test]
    fn test_to_parser_rejoins_compound_tool_number() {
        let tokens = body_tokens("10 10 16 2.0 30 R 6H DIN13 10rF1001\n");
        let payload = ToParser.parse(&tokens, 1).unwrap();
        match payload {
            BlockPayload::To(to) => {
                assert_eq!(to.nominal_diameter, 16.0);
                assert_eq!(to.tool_number.as_deref(), Some("10rF1001"));
            }
            _ => panic!("expected TO payload"),
        }
    }

    #[test]
    fn test_ak_parser_closed_rectangle() {
        let tokens = body_tokens("0 0\n2260 0\n2260 50.8\n0 50.8\n0 0\n");
        let payload = ContourParser::new(BlockKind::Ak).parse(&tokens, 1).unwrap();
        match payload {
            BlockPayload::Ak(c) => assert_eq!(c.points.len(), 5),
            _ => panic!("expected AK payload"),
        }
    }

    #[test]
    fn test_si_parser_marking() {
        let tokens = body_tokens("v 200 150 10 0 PART-001\n");
        let payload = SiParser.parse(&tokens, 1).unwrap();
        match payload {
            BlockPayload::Si(si) => {
                assert_eq!(si.face, Face::Web);
                assert_eq!(si.text, "PART-001");
                assert_eq!(si.height, Some(10.0));
                assert_eq!(si.angle, Some(0.0));
            }
            _ => panic!("expected SI payload"),
        }
    }

    #[test]
    fn test_generic_parser_never_fails() {
        let tokens = body_tokens("1 2 foo 3.5 bar\n");
        let payload = GenericParser::new(BlockKind::Generic("ZZ".into())).parse(&tokens, 1).unwrap();
        match payload {
            BlockPayload::Generic(g) => {
                assert_eq!(g.numbers.len(), 2);
                assert_eq!(g.strings.len(), 2);
            }
            _ => panic!("expected generic payload"),
        }
    }

    #[test]
    fn test_factory_caches_and_counts() {
        let factory = BlockParserFactory::new(FactoryConfig::default());
        let tokens = body_tokens("1.0\n");
        factory.parse(&BlockKind::En, &tokens[..0], 1).unwrap();
        factory.parse(&BlockKind::En, &tokens[..0], 2).unwrap();
        assert_eq!(*factory.statistics().get("EN").unwrap(), 2);
    }

    #[test]
    fn test_factory_register_parser_override() {
        struct AlwaysFails;
        impl BlockParser for AlwaysFails {
            fn block_type(&self) -> BlockKind {
                BlockKind::En
            }
            fn name(&self) -> &str {
                "EN"
            }
            fn parse(&self, _tokens: &[Token], header_line: usize) -> Result<BlockPayload, DstvError> {
                Err(DstvError::BlockParse { kind: "EN".into(), line: header_line, message: "forced failure".into() })
            }
        }
        let factory = BlockParserFactory::new(FactoryConfig::default());
        factory.register_parser(BlockKind::En, Box::new(AlwaysFails));
        assert!(factory.parse(&BlockKind::En, &[], 1).is_err());
    }
}
