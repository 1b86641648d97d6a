//! Tolerant parser for free-text camera-motion answers.
//!
//! Backends are asked for labeled lines (`MOTION_TYPE: pan`), but replies
//! drift: markdown bold, JSON objects, comma-separated one-liners, mixed
//! case. The reply is tokenized once and field labels are recognized at
//! field boundaries only (start of text, after a line break, a punctuation
//! mark, a number or a vocabulary value), so a label word inside free text
//! such as a reasoning sentence does not start a new field.
//!
//! Parsing never fails. A field whose label is absent, or whose value
//! matches nothing in the vocabulary, degrades to UNKNOWN and is recorded
//! as a [`ParseFailure`] on the prediction.

use std::ops::Range;

use motionprobe_model::{Direction, MotionClass, ParseFailure, Prediction, PredictionField};

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    /// Lowercased run of alphanumerics.
    Word(String),
    Number(f64),
    Punct(char),
    Newline,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    /// Byte span in the original text.
    start: usize,
    end: usize,
}

impl Token {
    fn word(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Word(word) => Some(word),
            _ => None,
        }
    }

    fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let mut end = start + c.len_utf8();
        let kind = if c == '\n' {
            TokenKind::Newline
        } else if c.is_whitespace() || c == '_' {
            // `_` joins words in labels like MOTION_TYPE and marks italics.
            continue;
        } else if c.is_alphabetic() {
            while let Some(&(i, next)) = chars.peek() {
                if !next.is_alphanumeric() {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            TokenKind::Word(text[start..end].to_lowercase())
        } else if c.is_ascii_digit() || (c == '.' && starts_with_digit(&text[end..])) {
            let mut seen_dot = c == '.';
            while let Some(&(i, next)) = chars.peek() {
                if next.is_ascii_digit() {
                    end = i + 1;
                } else if next == '.' && !seen_dot && starts_with_digit(&text[i + 1..]) {
                    seen_dot = true;
                    end = i + 1;
                } else {
                    break;
                }
                chars.next();
            }
            match text[start..end].parse::<f64>() {
                Ok(value) => TokenKind::Number(value),
                Err(_) => continue,
            }
        } else {
            TokenKind::Punct(c)
        };
        tokens.push(Token { kind, start, end });
    }
    tokens
}

fn starts_with_digit(rest: &str) -> bool {
    rest.starts_with(|ch: char| ch.is_ascii_digit())
}

/// Accepted labels per field, matched on whole words.
const LABELS: &[(&[&str], PredictionField)] = &[
    (&["camera", "motion", "type"], PredictionField::Motion),
    (&["motion", "type"], PredictionField::Motion),
    (&["motion", "class"], PredictionField::Motion),
    (&["camera", "motion"], PredictionField::Motion),
    (&["camera", "movement"], PredictionField::Motion),
    (&["motion"], PredictionField::Motion),
    (&["movement"], PredictionField::Motion),
    (&["type"], PredictionField::Motion),
    (&["motion", "direction"], PredictionField::Direction),
    (&["direction"], PredictionField::Direction),
    (&["confidence", "level"], PredictionField::Confidence),
    (&["confidence", "score"], PredictionField::Confidence),
    (&["confidence"], PredictionField::Confidence),
    (&["certainty"], PredictionField::Confidence),
    (&["reasoning"], PredictionField::Reasoning),
    (&["reason"], PredictionField::Reasoning),
    (&["explanation"], PredictionField::Reasoning),
    (&["rationale"], PredictionField::Reasoning),
];

/// `None` entries are recognized words that name no supported class.
const MOTION_VOCAB: &[(&str, Option<MotionClass>)] = &[
    ("pan", Some(MotionClass::Pan)),
    ("pans", Some(MotionClass::Pan)),
    ("panning", Some(MotionClass::Pan)),
    ("panned", Some(MotionClass::Pan)),
    ("tilt", Some(MotionClass::Tilt)),
    ("tilts", Some(MotionClass::Tilt)),
    ("tilting", Some(MotionClass::Tilt)),
    ("tilted", Some(MotionClass::Tilt)),
    ("zoom", Some(MotionClass::Zoom)),
    ("zooms", Some(MotionClass::Zoom)),
    ("zooming", Some(MotionClass::Zoom)),
    ("zoomed", Some(MotionClass::Zoom)),
    ("dolly", Some(MotionClass::Dolly)),
    ("dollies", Some(MotionClass::Dolly)),
    ("dollying", Some(MotionClass::Dolly)),
    ("dollied", Some(MotionClass::Dolly)),
    ("static", Some(MotionClass::Static)),
    ("stationary", Some(MotionClass::Static)),
    ("still", Some(MotionClass::Static)),
    ("fixed", Some(MotionClass::Static)),
    ("none", Some(MotionClass::Static)),
    ("no", Some(MotionClass::Static)),
    ("tracking", None),
    ("truck", None),
    ("trucking", None),
    ("crane", None),
    ("roll", None),
    ("handheld", None),
    ("unknown", None),
];

const DIRECTION_VOCAB: &[(&str, Option<Direction>)] = &[
    ("left", Some(Direction::Left)),
    ("leftward", Some(Direction::Left)),
    ("leftwards", Some(Direction::Left)),
    ("right", Some(Direction::Right)),
    ("rightward", Some(Direction::Right)),
    ("rightwards", Some(Direction::Right)),
    ("up", Some(Direction::Up)),
    ("upward", Some(Direction::Up)),
    ("upwards", Some(Direction::Up)),
    ("down", Some(Direction::Down)),
    ("downward", Some(Direction::Down)),
    ("downwards", Some(Direction::Down)),
    ("in", Some(Direction::In)),
    ("inward", Some(Direction::In)),
    ("inwards", Some(Direction::In)),
    ("forward", Some(Direction::In)),
    ("forwards", Some(Direction::In)),
    ("closer", Some(Direction::In)),
    ("out", Some(Direction::Out)),
    ("outward", Some(Direction::Out)),
    ("outwards", Some(Direction::Out)),
    ("backward", Some(Direction::Out)),
    ("backwards", Some(Direction::Out)),
    ("away", Some(Direction::Out)),
    ("none", Some(Direction::None)),
    ("no", Some(Direction::None)),
    ("n", Some(Direction::None)),
    ("na", Some(Direction::None)),
    ("static", Some(Direction::None)),
    ("stationary", Some(Direction::None)),
    ("unknown", None),
    ("unclear", None),
];

const CONFIDENCE_LEVELS: &[(&str, f64)] = &[
    ("low", 0.3),
    ("medium", 0.6),
    ("moderate", 0.6),
    ("med", 0.6),
    ("high", 0.9),
];

/// Characters stripped from the ends of a raw field value.
fn is_value_padding(c: char) -> bool {
    c.is_whitespace() || matches!(c, '*' | '"' | '\'' | '`' | ',' | ';' | '{' | '}')
}

/// Markup allowed between a label and its separator, e.g. `**Motion**:`.
fn is_label_decoration(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Punct('*' | '"' | '\'' | '`'))
}

/// Whether `word` is a complete value of some field.
fn is_vocab_word(word: &str) -> bool {
    MOTION_VOCAB.iter().any(|(entry, _)| *entry == word)
        || DIRECTION_VOCAB.iter().any(|(entry, _)| *entry == word)
        || CONFIDENCE_LEVELS.iter().any(|(entry, _)| *entry == word)
}

/// A label may follow a boundary, a number or a finished vocabulary value,
/// as in space-joined replies like `Motion: pan Direction: right`.
fn at_field_start(tokens: &[Token], index: usize) -> bool {
    let Some(previous) = index.checked_sub(1).map(|k| &tokens[k]) else {
        return true;
    };
    match &previous.kind {
        TokenKind::Word(word) => is_vocab_word(word),
        TokenKind::Number(_) | TokenKind::Punct(_) | TokenKind::Newline => true,
    }
}

/// Index just past `words` starting at `index`, allowing `-` between words.
fn match_words(tokens: &[Token], index: usize, words: &[&str]) -> Option<usize> {
    let mut cursor = index;
    for (k, expected) in words.iter().enumerate() {
        if k > 0 && tokens.get(cursor).is_some_and(|t| t.is_punct('-')) {
            cursor += 1;
        }
        if tokens.get(cursor)?.word()? != *expected {
            return None;
        }
        cursor += 1;
    }
    Some(cursor)
}

/// A label at `index`: the field and where its value starts.
fn match_label(tokens: &[Token], index: usize) -> Option<(PredictionField, usize)> {
    if !at_field_start(tokens, index) {
        return None;
    }

    LABELS
        .iter()
        .filter_map(|(words, field)| {
            let mut cursor = match_words(tokens, index, words)?;
            while tokens.get(cursor).is_some_and(is_label_decoration) {
                cursor += 1;
            }
            let separator = tokens.get(cursor)?;
            (separator.is_punct(':') || separator.is_punct('='))
                .then_some((*field, words.len(), cursor + 1))
        })
        .max_by_key(|&(_, len, _)| len)
        .map(|(field, _, value_start)| (field, value_start))
}

#[derive(Debug, Clone, PartialEq)]
struct FieldSpan {
    field: PredictionField,
    value: Range<usize>,
}

/// Every labeled field in order of appearance. Each value runs up to the
/// next label.
fn locate_fields(tokens: &[Token]) -> Vec<FieldSpan> {
    let mut labels = Vec::new();
    let mut index = 0;
    while index < tokens.len() {
        match match_label(tokens, index) {
            Some((field, value_start)) => {
                labels.push((field, index, value_start));
                index = value_start;
            }
            None => index += 1,
        }
    }

    labels
        .iter()
        .enumerate()
        .map(|(k, &(field, _, value_start))| {
            let end = labels.get(k + 1).map_or(tokens.len(), |next| next.1);
            FieldSpan {
                field,
                value: value_start..end.max(value_start),
            }
        })
        .collect()
}

fn raw_value(text: &str, value: &[Token]) -> String {
    match (value.first(), value.last()) {
        (Some(first), Some(last)) => text[first.start..last.end]
            .trim_matches(is_value_padding)
            .to_string(),
        _ => String::new(),
    }
}

fn first_in_vocab<T: Copy>(value: &[Token], vocab: &[(&str, Option<T>)]) -> Option<T> {
    value
        .iter()
        .filter_map(Token::word)
        .find_map(|word| vocab.iter().find(|(entry, _)| *entry == word))
        .and_then(|(_, meaning)| *meaning)
}

fn interpret_confidence(value: &[Token]) -> Option<f64> {
    let numeric = value.iter().enumerate().find_map(|(k, token)| {
        let TokenKind::Number(number) = token.kind else {
            return None;
        };
        let negative = k > 0 && value[k - 1].is_punct('-') && value[k - 1].end == token.start;
        let percent = value.get(k + 1).is_some_and(|next| next.is_punct('%'));
        let mut confidence = if percent { number / 100.0 } else { number };
        if negative {
            confidence = -confidence;
        }
        Some(confidence)
    });

    numeric
        .or_else(|| {
            value.iter().filter_map(Token::word).find_map(|word| {
                CONFIDENCE_LEVELS
                    .iter()
                    .find(|(level, _)| *level == word)
                    .map(|(_, score)| *score)
            })
        })
        .map(|confidence| confidence.clamp(0.0, 1.0))
}

/// Parse a backend reply into a [`Prediction`]. Never fails.
///
/// The first occurrence of each field wins.
pub fn parse_response(text: &str) -> Prediction {
    let tokens = tokenize(text);
    let fields = locate_fields(&tokens);
    let mut prediction = Prediction::default();

    for field in [
        PredictionField::Motion,
        PredictionField::Direction,
        PredictionField::Confidence,
        PredictionField::Reasoning,
    ] {
        let Some(span) = fields.iter().find(|span| span.field == field) else {
            prediction.failures.push(ParseFailure::Missing { field });
            continue;
        };
        let value = &tokens[span.value.clone()];
        let raw = raw_value(text, value);

        let recognized = match field {
            PredictionField::Motion => {
                prediction.motion = first_in_vocab(value, MOTION_VOCAB);
                prediction.motion.is_some()
            }
            PredictionField::Direction => {
                prediction.direction = first_in_vocab(value, DIRECTION_VOCAB);
                prediction.direction.is_some()
            }
            PredictionField::Confidence => {
                prediction.confidence = interpret_confidence(value);
                prediction.confidence.is_some()
            }
            PredictionField::Reasoning => {
                prediction.reasoning = (!raw.is_empty()).then(|| raw.clone());
                prediction.reasoning.is_some()
            }
        };

        if !recognized {
            prediction
                .failures
                .push(ParseFailure::Unrecognized { field, value: raw });
        }
    }

    prediction
}
