//! AST / semantic stage (component F): the ordered sequence of parsed
//! blocks becomes a validated `Part` plus an ordered feature list. No
//! geometric projection happens here — feature coordinates stay in
//! face-local DSTV space.

use std::collections::HashMap;

use steelcad_core::{
    Contour, ContourParams, Face, Feature, FeatureKind, Handedness, HoleParams, MarkingMethod,
    MarkingParams, OriginMetadata, Part, Point2D, PolySegment, ProfileCategory, ProfileDimensions,
    PunchParams, Scene, SceneMetadata, SlottedHoleParams, ThreadParams, ThroughBlind,
};

use crate::blocks::{
    BlockKind, BlockPayload, BlockParserFactory, BoEntry, ContourPayload, FactoryConfig, PuPayload,
    SiPayload, StPayload, ThreadHandedness, ToPayload,
};
use crate::error::DstvError;
use crate::lexer::{tokenize, Token, TokenKind};
use steelcad_features::thickness_at_face;

struct RawBlock {
    kind: BlockKind,
    header_line: usize,
    tokens: Vec<Token>,
}

/// Splits the full token stream into per-block chunks, with `BLOCK_HEADER`
/// and `COMMENT`/`NEWLINE`/`EOF` noise stripped from each chunk's body.
fn split_into_blocks(tokens: &[Token]) -> Vec<RawBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(BlockKind, usize, Vec<Token>)> = None;

    for tok in tokens {
        match tok.kind {
            TokenKind::BlockHeader => {
                if let Some((kind, line, body)) = current.take() {
                    blocks.push(RawBlock { kind, header_line: line, tokens: body });
                }
                current = Some((BlockKind::from_code(&tok.value), tok.line, Vec::new()));
            }
            TokenKind::Newline | TokenKind::Comment | TokenKind::Eof => {}
            _ => {
                if let Some((_, _, body)) = current.as_mut() {
                    body.push(tok.clone());
                }
            }
        }
    }
    if let Some((kind, line, body)) = current.take() {
        blocks.push(RawBlock { kind, header_line: line, tokens: body });
    }
    blocks
}

fn category_from_code(code: char) -> ProfileCategory {
    match code.to_ascii_uppercase() {
        'I' => ProfileCategory::IBeam,
        'U' => ProfileCategory::ChannelU,
        'L' => ProfileCategory::Angle,
        'T' => ProfileCategory::Tee,
        'M' => ProfileCategory::HollowSquare,
        'R' => ProfileCategory::HollowRect,
        'C' => ProfileCategory::HollowCircular,
        'F' => ProfileCategory::Flat,
        'D' => ProfileCategory::RoundBar,
        _ => ProfileCategory::Flat,
    }
}

fn dimensions_from_st(st: &StPayload) -> ProfileDimensions {
    match category_from_code(st.category_code) {
        ProfileCategory::IBeam => ProfileDimensions::IBeam {
            height: st.height,
            width: st.width,
            web_thickness: st.web_thickness,
            flange_thickness: st.flange_thickness,
            root_radius: 0.0,
            toe_radius: 0.0,
        },
        ProfileCategory::ChannelU => ProfileDimensions::ChannelU {
            height: st.height,
            width: st.width,
            web_thickness: st.web_thickness,
            flange_thickness: st.flange_thickness,
            root_radius: 0.0,
            toe_radius: 0.0,
        },
        ProfileCategory::HollowSquare => {
            ProfileDimensions::HollowSquare { height: st.height, width: st.width, wall_thickness: st.web_thickness, outer_radius: 0.0 }
        }
        ProfileCategory::HollowRect => {
            ProfileDimensions::HollowRect { height: st.height, width: st.width, wall_thickness: st.web_thickness, outer_radius: 0.0 }
        }
        ProfileCategory::HollowCircular => {
            ProfileDimensions::HollowCircular { outer_diameter: st.height, wall_thickness: st.web_thickness }
        }
        ProfileCategory::Angle => {
            ProfileDimensions::Angle { leg1: st.height, leg2: st.width, thickness: st.web_thickness, root_radius: 0.0, toe_radius: 0.0 }
        }
        ProfileCategory::Tee => ProfileDimensions::Tee {
            height: st.height,
            width: st.width,
            web_thickness: st.web_thickness,
            flange_thickness: st.flange_thickness,
            root_radius: 0.0,
        },
        ProfileCategory::RoundBar => ProfileDimensions::RoundBar { diameter: st.height },
        _ => ProfileDimensions::FlatBar { width: st.width, thickness: st.web_thickness },
    }
}

fn contour_from_payload(payload: &ContourPayload) -> Contour {
    let mut segments = Vec::new();
    for window in payload.points.windows(2) {
        segments.push(PolySegment { start: Point2D::new(window[0].x, window[0].y), end: Point2D::new(window[1].x, window[1].y), bulge: window[0].bulge.unwrap_or(0.0) });
    }
    Contour { segments }
}

struct FeatureIdGen {
    counts: HashMap<String, u64>,
}

impl FeatureIdGen {
    fn new() -> Self {
        Self { counts: HashMap::new() }
    }

    fn next(&mut self, block_code: &str, line: usize) -> String {
        let seq = self.counts.entry(block_code.to_string()).or_insert(0);
        let id = format!("{block_code}_{line}_{seq}");
        *seq += 1;
        id
    }
}

/// Depth within this of the face's thickness counts as through, not blind —
/// DSTV depth fields are rounded to the file's working units and a hole
/// drilled to exactly the material thickness is a through hole.
const THROUGH_DEPTH_TOLERANCE_MM: f64 = 1e-3;

fn bo_to_features(entries: &[BoEntry], header_line: usize, ids: &mut FeatureIdGen, dimensions: &ProfileDimensions) -> Vec<Feature> {
    entries
        .iter()
        .map(|e| {
            let through_blind = match e.depth {
                None => ThroughBlind::Through,
                Some(depth) if depth >= thickness_at_face(dimensions, e.face) - THROUGH_DEPTH_TOLERANCE_MM => ThroughBlind::Through,
                Some(_) => ThroughBlind::Blind,
            };
            let kind = FeatureKind::Hole(HoleParams { diameter: e.diameter, through_blind, depth: e.depth });
            let kind = if let (Some(len), Some(angle)) = (e.slot_length, e.slot_angle) {
                FeatureKind::SlottedHole(SlottedHoleParams { diameter: e.diameter, slot_length: len, slot_angle: angle })
            } else {
                kind
            };
            Feature {
                id: ids.next("BO", header_line),
                face: e.face,
                position: Point2D::new(e.x, e.y),
                source_line: header_line,
                source_column: 1,
                kind,
            }
        })
        .collect()
}

fn contour_to_feature(payload: &ContourPayload, header_line: usize, ids: &mut FeatureIdGen, code: &str, inner: bool) -> Feature {
    let kind = if inner {
        FeatureKind::InnerContour(ContourParams { contour: contour_from_payload(payload) })
    } else {
        FeatureKind::OuterContour(ContourParams { contour: contour_from_payload(payload) })
    };
    Feature {
        id: ids.next(code, header_line),
        face: payload.face,
        position: payload.points.first().map(|p| Point2D::new(p.x, p.y)).unwrap_or(Point2D::origin()),
        source_line: header_line,
        source_column: 1,
        kind,
    }
}

fn si_to_feature(si: &SiPayload, header_line: usize, ids: &mut FeatureIdGen) -> Feature {
    Feature {
        id: ids.next("SI", header_line),
        face: si.face,
        position: Point2D::new(si.x, si.y),
        source_line: header_line,
        source_column: 1,
        kind: FeatureKind::Marking(MarkingParams {
            text: si.text.clone(),
            height: si.height,
            rotation: si.angle,
            depth: si.depth,
            method: si.method.as_deref().map(method_from_str),
        }),
    }
}

fn method_from_str(s: &str) -> MarkingMethod {
    match s.to_ascii_lowercase().as_str() {
        "stamp" => MarkingMethod::Stamp,
        "laser" => MarkingMethod::Laser,
        "paint" => MarkingMethod::Paint,
        _ => MarkingMethod::Engrave,
    }
}

fn pu_to_feature(pu: &PuPayload, header_line: usize, ids: &mut FeatureIdGen) -> Feature {
    Feature {
        id: ids.next("PU", header_line),
        face: pu.face,
        position: Point2D::new(pu.x, pu.y),
        source_line: header_line,
        source_column: 1,
        kind: FeatureKind::Punch(PunchParams { force: pu.force, depth: pu.depth }),
    }
}

fn to_to_feature(to: &ToPayload, header_line: usize, ids: &mut FeatureIdGen) -> Feature {
    Feature {
        id: ids.next("TO", header_line),
        face: Face::Web,
        position: Point2D::new(to.x, to.y),
        source_line: header_line,
        source_column: 1,
        kind: FeatureKind::Thread(ThreadParams {
            nominal_diameter: to.nominal_diameter,
            pitch: to.pitch.unwrap_or_else(|| default_pitch_for(to.nominal_diameter)),
            depth: to.depth.unwrap_or_else(|| 3.0 * to.pitch.unwrap_or_else(|| default_pitch_for(to.nominal_diameter))),
            handedness: match to.handedness {
                ThreadHandedness::Right => Handedness::Right,
                ThreadHandedness::Left => Handedness::Left,
            },
            class: to.class.clone().unwrap_or_else(|| "6H".to_string()),
            standard: to.standard.clone(),
        }),
    }
}

/// Coarse metric-thread pitch table keyed by nominal diameter, used when a
/// TO block omits the pitch field.
fn default_pitch_for(diameter: f64) -> f64 {
    const TABLE: &[(f64, f64)] = &[(6.0, 1.0), (8.0, 1.25), (10.0, 1.5), (12.0, 1.75), (16.0, 2.0), (20.0, 2.5), (24.0, 3.0)];
    TABLE
        .iter()
        .min_by(|a, b| (a.0 - diameter).abs().partial_cmp(&(b.0 - diameter).abs()).unwrap())
        .map(|(_, p)| *p)
        .unwrap_or(diameter * 0.15)
}

/// Result of the full D->E->F pipeline: the produced scene plus any
/// non-fatal issues collected along the way.
pub struct SemanticOutcome {
    pub scene: Scene,
    pub warnings: Vec<String>,
}

/// A block after the factory has turned its tokens into a typed payload —
/// the boundary value passed from the parse-blocks stage to the semantic
/// stage. Serializable so it can travel through a pipeline's shared data.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ParsedBlock {
    pub kind: BlockKind,
    pub header_line: usize,
    pub payload: BlockPayload,
}

/// Tokenizes and block-parses `source` in one pass, producing the ordered
/// `ParsedBlock` list the semantic stage consumes. Block-level parse
/// failures are fatal in strict mode and downgraded to warnings otherwise.
pub fn lex_and_parse_blocks(source: &str, strict: bool) -> Result<(Vec<ParsedBlock>, Vec<String>), DstvError> {
    let lex = tokenize(source);
    let mut warnings: Vec<String> = lex.errors.iter().map(|e| e.to_string()).collect();

    let raw_blocks = split_into_blocks(&lex.tokens);
    let factory = BlockParserFactory::new(FactoryConfig { strict, validate: true, debug_logs: false });

    let mut parsed = Vec::with_capacity(raw_blocks.len());
    for block in raw_blocks {
        match factory.parse(&block.kind, &block.tokens, block.header_line) {
            Ok(payload) => parsed.push(ParsedBlock { kind: block.kind, header_line: block.header_line, payload }),
            Err(err) => {
                if strict {
                    return Err(err);
                }
                warnings.push(err.to_string());
            }
        }
    }
    Ok((parsed, warnings))
}

/// Converts an ordered `ParsedBlock` list into the pivot scene: exactly one
/// ST must precede any feature block (fatal if violated), exactly one EN
/// must terminate the stream (warning when lenient, fatal when strict).
pub fn build_scene(blocks: &[ParsedBlock], strict: bool, source_file: Option<String>) -> Result<SemanticOutcome, DstvError> {
    let mut warnings = Vec::new();

    let Some(first) = blocks.first() else {
        return Err(DstvError::MissingStart);
    };
    if first.kind != BlockKind::St {
        return Err(DstvError::MissingStart);
    }
    let last_is_en = blocks.last().map(|b| b.kind == BlockKind::En).unwrap_or(false);
    if !last_is_en {
        if strict {
            return Err(DstvError::MissingEnd);
        }
        warnings.push("missing EN block".to_string());
    }

    let mut ids = FeatureIdGen::new();
    let mut element_counts: HashMap<String, u64> = HashMap::new();
    let mut part: Option<Part> = None;
    let mut features = Vec::new();
    let mut seen_start = false;

    for block in blocks {
        *element_counts.entry(block.kind.code()).or_insert(0) += 1;

        match &block.payload {
            BlockPayload::St(st) => {
                seen_start = true;
                part = Some(Part {
                    id: "part_1".to_string(),
                    designation: st.designation.clone(),
                    material_grade: st.steel_grade.clone(),
                    dimensions: dimensions_from_st(st),
                    length_mm: st.length,
                    origin: OriginMetadata { source_file: source_file.clone(), order_number: st.order_number.clone(), ..Default::default() },
                    features: Vec::new(),
                    solid: None,
                });
            }
            BlockPayload::En => {}
            BlockPayload::Bo(bo) => {
                if !seen_start {
                    return Err(DstvError::FeatureBeforeStart(block.header_line));
                }
                let dimensions = &part.as_ref().expect("seen_start guarantees a part").dimensions;
                features.extend(bo_to_features(&bo.entries, block.header_line, &mut ids, dimensions));
            }
            BlockPayload::Ak(c) => features.push(contour_to_feature(c, block.header_line, &mut ids, "AK", false)),
            BlockPayload::Ik(c) => features.push(contour_to_feature(c, block.header_line, &mut ids, "IK", true)),
            BlockPayload::Ko(c) => features.push(contour_to_feature(c, block.header_line, &mut ids, "KO", false)),
            BlockPayload::Ka(c) => features.push(contour_to_feature(c, block.header_line, &mut ids, "KA", false)),
            BlockPayload::Si(si) => features.push(si_to_feature(si, block.header_line, &mut ids)),
            BlockPayload::Pu(pu) => features.push(pu_to_feature(pu, block.header_line, &mut ids)),
            BlockPayload::To(to) => features.push(to_to_feature(to, block.header_line, &mut ids)),
            BlockPayload::Sc(_) | BlockPayload::Br(_) | BlockPayload::Lp(_) | BlockPayload::Rt(_) | BlockPayload::Generic(_) => {
                if !block.kind.is_recognised_lenient() && !matches!(block.kind, BlockKind::Sc | BlockKind::Br | BlockKind::Lp | BlockKind::Rt) {
                    warnings.push(format!("unrecognised block kind '{}' at line {} parsed leniently", block.kind.code(), block.header_line));
                }
            }
        }
    }

    let Some(mut part) = part else {
        return Err(DstvError::MissingStart);
    };
    part.features = features;

    let scene = Scene::new().with_part(part);
    let scene = Scene { metadata: SceneMetadata { element_counts, source_format: Some("dstv".to_string()) }, ..scene };

    Ok(SemanticOutcome { scene, warnings })
}

/// Convenience entry point for callers (tests, the CLI) that don't need
/// per-stage visibility: runs lexing, block parsing, and the semantic
/// stage back to back.
pub fn parse_source(source: &str, strict: bool, source_file: Option<String>) -> Result<SemanticOutcome, DstvError> {
    let (blocks, mut warnings) = lex_and_parse_blocks(source, strict)?;
    let mut outcome = build_scene(&blocks, strict, source_file)?;
    warnings.append(&mut outcome.warnings);
    outcome.warnings = warnings;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_tube() -> String {
        "ST\n- - - - S355 1 HSS51X51X4.8 M 2259.98 50.8 50.8 4.78 4.78\nBO\n89.01s 25.40 17.50\n174.93s 25.40 17.50\nEN\n".to_string()
    }

    #[test]
    fn test_minimal_tube_scenario() {
        let outcome = parse_source(&minimal_tube(), false, None).unwrap();
        assert_eq!(outcome.scene.parts.len(), 1);
        let part = &outcome.scene.parts[0];
        assert_eq!(part.category(), ProfileCategory::HollowSquare);
        assert_eq!(part.features.len(), 2);
        assert_eq!(part.length_mm, 2259.98);
    }

    #[test]
    fn test_missing_st_is_fatal() {
        let source = "BO\n1 1 10\nEN\n";
        let err = parse_source(source, false, None).unwrap_err();
        assert!(matches!(err, DstvError::MissingStart));
    }

    #[test]
    fn test_ibeam_with_marking() {
        let source = "ST\n- - - - S355 1 IPE300 I 2700 300 150 7.1 10.7\nSI\nv 200 150 10 0 PART-001\nEN\n";
        let outcome = parse_source(source, false, None).unwrap();
        let part = &outcome.scene.parts[0];
        assert_eq!(part.category(), ProfileCategory::IBeam);
        assert_eq!(part.features.len(), 1);
        match &part.features[0].kind {
            FeatureKind::Marking(m) => {
                assert_eq!(m.text, "PART-001");
                assert_eq!(m.height, Some(10.0));
                assert_eq!(m.rotation, Some(0.0));
            }
            _ => panic!("expected marking feature"),
        }
    }

    #[test]
    fn test_outer_contour_scenario() {
        let source = "ST\n- - - - S355 1 HSS51X51X4.8 M 2259.98 50.8 50.8 4.78 4.78\nAK\n0 0\n2260 0\n2260 50.8\n0 50.8\n0 0\nEN\n";
        let outcome = parse_source(source, false, None).unwrap();
        let part = &outcome.scene.parts[0];
        assert_eq!(part.features.len(), 1);
        match &part.features[0].kind {
            FeatureKind::OuterContour(c) => assert_eq!(c.contour.segments.len(), 4),
            _ => panic!("expected outer contour feature"),
        }
    }

    #[test]
    fn test_bo_depth_reaching_wall_thickness_is_through_not_blind() {
        let source = "ST\n- - - - S355 1 HSS51X51X4.8 M 2259.98 50.8 50.8 4.78 4.78\nBO\n89.01s 25.40 17.50 4.78\n174.93s 25.40 17.50 2.00\nEN\n";
        let outcome = parse_source(source, false, None).unwrap();
        let part = &outcome.scene.parts[0];
        match &part.features[0].kind {
            FeatureKind::Hole(h) => assert_eq!(h.through_blind, ThroughBlind::Through),
            other => panic!("expected a hole feature, got {other:?}"),
        }
        match &part.features[1].kind {
            FeatureKind::Hole(h) => assert_eq!(h.through_blind, ThroughBlind::Blind),
            other => panic!("expected a hole feature, got {other:?}"),
        }
    }

    #[test]
    fn test_feature_order_matches_file_order() {
        let source = "ST\n- - - - S355 1 IPE300 I 2700 300 150 7.1 10.7\nBO\n10 10 5\nBO\n20 20 5\nEN\n";
        let outcome = parse_source(source, false, None).unwrap();
        let part = &outcome.scene.parts[0];
        assert_eq!(part.features[0].id, "BO_3_0");
        assert_eq!(part.features[1].id, "BO_5_0");
    }

    #[test]
    fn test_lenient_missing_en_produces_warning_not_error() {
        let source = "ST\n- - - - S355 1 IPE300 I 2700 300 150 7.1 10.7\n";
        let outcome = parse_source(source, false, None).unwrap();
        assert!(outcome.warnings.iter().any(|w| w.contains("EN")));
    }

    #[test]
    fn test_strict_missing_en_is_fatal() {
        let source = "ST\n- - - - S355 1 IPE300 I 2700 300 150 7.1 10.7\n";
        assert!(parse_source(source, true, None).is_err());
    }
}
