//! Character-level lexer for one line of G-code
//!
//! Recognises just enough of the language to rewrite coordinates:
//!
//! - `(` ... `)` comments, copied untouched
//! - `G<digits>` codes, copied and recorded
//! - `X<number>` and `Y<number>` words, recorded and removed from the text
//!   (the engine writes them back in canonical form)
//! - `F<number>` words, copied and recorded
//!
//! Anything else is copied as is. Numbers are made of `0-9`, `+`, `-` and
//! `.`; the first other character ends the number and is then handled as if
//! it had just been read.

use super::{GcodeError, Result};
use crate::config::InputUnits;

/// Lexer states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    Neutral,
    InComment,
    ParsingG,
    ParsingX,
    ParsingY,
    ParsingF,
}

/// Outcome of feeding one character to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Consumed,
    /// The character ended a token and must be read again in `Neutral`
    Reprocess,
}

/// The pieces of one input line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLine {
    /// Every G code on the line, in order
    pub g_codes: Vec<u32>,
    /// X in meters
    pub x: Option<f64>,
    /// Y in meters
    pub y: Option<f64>,
    /// Feed rate in meters per second
    pub feed: Option<f64>,
    /// The F word's number as written
    pub feed_text: Option<String>,
    /// Line text with the X and Y words taken out
    pub text: String,
}

impl ParsedLine {
    /// The code this line leaves in effect: its last G code
    ///
    /// Any G word replaces the running motion code, so after `G90` a move
    /// is neither rapid (G0) nor cutting (G1).
    pub fn motion_code(&self) -> Option<u32> {
        self.g_codes.last().copied()
    }

    pub fn has_coordinates(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }
}

fn is_number_char(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.')
}

struct LineLexer {
    units: InputUnits,
    line_number: usize,
    state: LexState,
    accumulator: String,
    line: ParsedLine,
}

impl LineLexer {
    fn new(units: InputUnits, line_number: usize) -> Self {
        Self {
            units,
            line_number,
            state: LexState::Neutral,
            accumulator: String::new(),
            line: ParsedLine::default(),
        }
    }

    fn feed(&mut self, ch: char) -> Result<()> {
        while self.step(ch)? == Step::Reprocess {}
        Ok(())
    }

    fn step(&mut self, ch: char) -> Result<Step> {
        match self.state {
            LexState::Neutral => {
                match ch {
                    '(' => self.state = LexState::InComment,
                    'G' | 'g' => self.state = LexState::ParsingG,
                    'X' | 'x' => self.state = LexState::ParsingX,
                    'Y' | 'y' => self.state = LexState::ParsingY,
                    'F' | 'f' => self.state = LexState::ParsingF,
                    _ => {}
                }
                if !matches!(self.state, LexState::ParsingX | LexState::ParsingY) {
                    self.line.text.push(ch);
                }
                Ok(Step::Consumed)
            }
            LexState::InComment => {
                if ch == ')' {
                    self.state = LexState::Neutral;
                }
                self.line.text.push(ch);
                Ok(Step::Consumed)
            }
            LexState::ParsingG => {
                if ch.is_ascii_digit() {
                    self.accumulator.push(ch);
                    self.line.text.push(ch);
                    Ok(Step::Consumed)
                } else {
                    self.finish_token()?;
                    Ok(Step::Reprocess)
                }
            }
            LexState::ParsingX | LexState::ParsingY | LexState::ParsingF => {
                if is_number_char(ch) {
                    self.accumulator.push(ch);
                    if self.state == LexState::ParsingF {
                        self.line.text.push(ch);
                    }
                    Ok(Step::Consumed)
                } else {
                    self.finish_token()?;
                    Ok(Step::Reprocess)
                }
            }
        }
    }

    fn parse_number(&self) -> Result<f64> {
        self.accumulator
            .parse::<f64>()
            .map_err(|_| GcodeError::MalformedNumber {
                line: self.line_number,
                token: self.accumulator.clone(),
            })
    }

    /// Records the token being accumulated and returns to `Neutral`
    fn finish_token(&mut self) -> Result<()> {
        match self.state {
            LexState::ParsingG => {
                // A bare `G` carries no code
                if !self.accumulator.is_empty() {
                    let code =
                        self.accumulator
                            .parse::<u32>()
                            .map_err(|_| GcodeError::MalformedNumber {
                                line: self.line_number,
                                token: self.accumulator.clone(),
                            })?;
                    self.line.g_codes.push(code);
                }
            }
            LexState::ParsingX => self.line.x = Some(self.units.to_meters(self.parse_number()?)),
            LexState::ParsingY => self.line.y = Some(self.units.to_meters(self.parse_number()?)),
            LexState::ParsingF => {
                self.line.feed = Some(self.units.feed_to_mps(self.parse_number()?));
                self.line.feed_text = Some(self.accumulator.clone());
            }
            LexState::Neutral | LexState::InComment => {}
        }

        self.accumulator.clear();
        self.state = LexState::Neutral;
        Ok(())
    }

    fn finish(mut self) -> Result<ParsedLine> {
        // End of line terminates a pending token; an open comment just ends
        self.finish_token()?;
        Ok(self.line)
    }
}

/// Splits one line (without its terminator) into a [`ParsedLine`]
///
/// Coordinates and feed rates are converted from `units` to meters and
/// meters per second. `line_number` is only used for error reporting.
pub fn parse_line(text: &str, units: InputUnits, line_number: usize) -> Result<ParsedLine> {
    let mut lexer = LineLexer::new(units, line_number);
    for ch in text.chars() {
        lexer.feed(ch)?;
    }
    lexer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(text: &str) -> ParsedLine {
        parse_line(text, InputUnits::Inches, 1).unwrap()
    }

    #[test]
    fn test_rapid_move() {
        let line = parse("G0 X1.0 Y0.0");
        assert_eq!(line.g_codes, vec![0]);
        assert_relative_eq!(line.x.unwrap(), 0.0254, epsilon = 1e-15);
        assert_eq!(line.y, Some(0.0));
        assert_eq!(line.feed, None);
        assert_eq!(line.text, "G0  ");
        assert_eq!(line.motion_code(), Some(0));
    }

    #[test]
    fn test_feed_word_is_kept_in_text() {
        let line = parse("G1 X2 Y3 F30");
        assert_eq!(line.text, "G1   F30");
        assert_eq!(line.feed_text.as_deref(), Some("30"));
        assert_relative_eq!(line.feed.unwrap(), 30.0 * 0.0254 / 60.0, epsilon = 1e-15);
    }

    #[test]
    fn test_feed_only_line() {
        let line = parse("F10.0");
        assert!(!line.has_coordinates());
        assert_eq!(line.text, "F10.0");
        assert_eq!(line.feed_text.as_deref(), Some("10.0"));
    }

    #[test]
    fn test_terminator_starts_next_token() {
        // No separators: each letter ends the previous number
        let line = parse("G1X1.5Y-2F20");
        assert_eq!(line.g_codes, vec![1]);
        assert_relative_eq!(line.x.unwrap(), 1.5 * 0.0254, epsilon = 1e-15);
        assert_relative_eq!(line.y.unwrap(), -2.0 * 0.0254, epsilon = 1e-15);
        assert_eq!(line.feed_text.as_deref(), Some("20"));
        assert_eq!(line.text, "G1F20");
    }

    #[test]
    fn test_lowercase_words() {
        let line = parse("g1 x1 y2");
        assert_eq!(line.g_codes, vec![1]);
        assert!(line.x.is_some() && line.y.is_some());
        assert_eq!(line.text, "g1  ");
    }

    #[test]
    fn test_comments_are_opaque() {
        let line = parse("(move X1 Y2 G0 F9) M3");
        assert!(line.g_codes.is_empty());
        assert!(!line.has_coordinates());
        assert_eq!(line.feed, None);
        assert_eq!(line.text, "(move X1 Y2 G0 F9) M3");
    }

    #[test]
    fn test_comment_after_coordinates() {
        let line = parse("G1 Y4(down)");
        assert_eq!(line.y, Some(4.0 * 0.0254));
        assert_eq!(line.x, None);
        assert_eq!(line.text, "G1 (down)");
    }

    #[test]
    fn test_unclosed_comment_ends_with_line() {
        let line = parse("(unclosed X1");
        assert_eq!(line.text, "(unclosed X1");
        assert!(!line.has_coordinates());
    }

    #[test]
    fn test_multiple_g_codes() {
        let line = parse("G90 G1 G17 X0");
        assert_eq!(line.g_codes, vec![90, 1, 17]);
        assert_eq!(line.motion_code(), Some(17));

        let line = parse("G20");
        assert_eq!(line.motion_code(), Some(20));

        let line = parse("X1 Y2");
        assert_eq!(line.motion_code(), None);
    }

    #[test]
    fn test_bare_g_has_no_code() {
        let line = parse("G X1");
        assert!(line.g_codes.is_empty());
        assert_eq!(line.text, "G ");
    }

    #[test]
    fn test_number_at_end_of_line() {
        let line = parse("G1 X3");
        assert_relative_eq!(line.x.unwrap(), 3.0 * 0.0254, epsilon = 1e-15);
    }

    #[test]
    fn test_signed_and_bare_decimal_numbers() {
        let line = parse("X+.5 Y-0.25");
        assert_relative_eq!(line.x.unwrap(), 0.5 * 0.0254, epsilon = 1e-15);
        assert_relative_eq!(line.y.unwrap(), -0.25 * 0.0254, epsilon = 1e-15);
    }

    #[test]
    fn test_millimeter_units() {
        let line = parse_line("G1 X25.4 F600", InputUnits::Millimeters, 1).unwrap();
        assert_relative_eq!(line.x.unwrap(), 0.0254, epsilon = 1e-15);
        assert_relative_eq!(line.feed.unwrap(), 0.01, epsilon = 1e-15);
    }

    #[test]
    fn test_malformed_numbers() {
        let err = parse_line("G1 X1.2.3 Y0", InputUnits::Inches, 12).unwrap_err();
        match err {
            GcodeError::MalformedNumber { line, token } => {
                assert_eq!(line, 12);
                assert_eq!(token, "1.2.3");
            }
            other => panic!("unexpected error {:?}", other),
        }

        assert!(matches!(
            parse_line("G1 X Y1", InputUnits::Inches, 1),
            Err(GcodeError::MalformedNumber { token, .. }) if token.is_empty()
        ));
        assert!(parse_line("F-", InputUnits::Inches, 1).is_err());
    }

    #[test]
    fn test_plain_text_passes_through() {
        let line = parse("M3 S1000 ; spindle on %");
        assert!(line.g_codes.is_empty());
        assert!(!line.has_coordinates());
        assert_eq!(line.text, "M3 S1000 ; spindle on %");
    }
}
