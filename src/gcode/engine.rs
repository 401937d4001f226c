//! The rewrite engine
//!
//! Walks the program once, keeping a running estimate of machine time. For
//! every line that moves in X or Y the sun's drift at that moment is looked
//! up and subtracted from the programmed point, so the burn spot lands where
//! the program meant it to.

use super::lexer::{parse_line, ParsedLine};
use super::{format_coordinate, format_general, GcodeError, Result};
use crate::config::{Config, InputUnits};
use crate::solar::OffsetSource;
use crate::time::{format_duration, TimeOfDay};
use log::{debug, info, warn};
use nalgebra::Vector2;
use std::fmt;
use std::io::{BufRead, Write};

/// Axis-aligned box around the cutting moves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn around(x: f64, y: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    pub fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            min_x: self.min_x * factor,
            min_y: self.min_y * factor,
            max_x: self.max_x * factor,
            max_y: self.max_y * factor,
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.4}, {:.4}, {:.4}, {:.4})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Per-run state of the engine, in meters and seconds
#[derive(Debug, Clone, PartialEq)]
pub struct MotionState {
    /// Corrected position of the machine
    pub x: f64,
    pub y: f64,
    /// Sticky feed rate in meters per second
    pub feed_rate: f64,
    /// Machine time since the start of the run
    pub elapsed: f64,
    /// Box around the cutting (G1) moves so far
    pub bounds: Option<Bounds>,
    /// Last G code seen; 0 means rapid, 1 a cutting move
    pub motion_code: Option<u32>,
    /// Last offset obtained from the offset source
    pub last_offset: Option<Vector2<f64>>,
}

/// What a run did, for the diagnostics channel
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub start: TimeOfDay,
    /// Total machine time in seconds
    pub elapsed: f64,
    /// Cutting bounds in input units
    pub bounds: Option<Bounds>,
    /// Last offset in input units
    pub last_offset: Option<Vector2<f64>>,
    pub lines: usize,
    pub moves: usize,
    /// Moves that reused an earlier offset
    pub fallbacks: usize,
    /// Moves written out as programmed because no offset was known
    pub uncorrected: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Start time: {}", self.start)?;
        writeln!(f, "Total running time: {}", format_duration(self.elapsed))?;
        match &self.bounds {
            Some(bounds) => writeln!(f, "Bounds: {}", bounds)?,
            None => writeln!(f, "Bounds: none")?,
        }
        match &self.last_offset {
            Some(offset) => writeln!(f, "Last offset: ({:.4}, {:.4})", offset.x, offset.y)?,
            None => writeln!(f, "Last offset: none")?,
        }
        write!(
            f,
            "Lines: {}, moves: {}, offset fallbacks: {}, uncorrected: {}",
            self.lines, self.moves, self.fallbacks, self.uncorrected
        )
    }
}

/// Streaming G-code rewriter
pub struct Rewriter<S: OffsetSource> {
    source: S,
    units: InputUnits,
    rapid_speed: f64,
    start: TimeOfDay,
    state: MotionState,
    lines: usize,
    moves: usize,
    fallbacks: usize,
    uncorrected: usize,
}

impl<S: OffsetSource> Rewriter<S> {
    /// Creates a rewriter for a program in `units`
    ///
    /// `rapid_speed` is the G0 speed in meters per second; it is also the
    /// feed rate until the program sets one. `start` is the time of day at
    /// which the job begins.
    pub fn new(source: S, units: InputUnits, rapid_speed: f64, start: TimeOfDay) -> Self {
        Self {
            source,
            units,
            rapid_speed,
            start,
            state: MotionState {
                x: 0.0,
                y: 0.0,
                feed_rate: rapid_speed,
                elapsed: 0.0,
                bounds: None,
                motion_code: None,
                last_offset: None,
            },
            lines: 0,
            moves: 0,
            fallbacks: 0,
            uncorrected: 0,
        }
    }

    pub fn from_config(source: S, config: &Config, start: TimeOfDay) -> Self {
        Self::new(source, config.units, config.rapid_speed_mps(), start)
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    /// Rewrites one line, terminator included, into its output block
    ///
    /// The block is the bookkeeping comments followed by the line itself.
    /// Every line of the block ends with the input line's terminator, or
    /// `\n` when the input line had none.
    pub fn rewrite_line(&mut self, raw: &str) -> Result<String> {
        self.lines += 1;
        let line_number = self.lines;

        let (body, terminator) = split_terminator(raw);
        let eol = if terminator.is_empty() { "\n" } else { terminator };
        let parsed = parse_line(body, self.units, line_number)?;

        let mut out = String::new();

        if let Some(feed) = parsed.feed {
            self.state.feed_rate = feed;
            out.push_str(&format!(
                "(f is now {}, text was {}){}",
                format_general(feed),
                parsed.feed_text.as_deref().unwrap_or_default(),
                eol
            ));
        }
        if let Some(code) = parsed.motion_code() {
            self.state.motion_code = Some(code);
        }

        // Machine time at which this line starts
        out.push_str(&format!(
            "(Time is {}){}",
            format_duration(self.state.elapsed),
            eol
        ));

        if parsed.has_coordinates() {
            self.apply_move(&parsed, line_number, body, eol, &mut out)?;
        } else {
            out.push_str(body);
            out.push_str(terminator);
        }

        Ok(out)
    }

    fn current_offset(&mut self, line_number: usize, machine_time: f64) -> Result<Vector2<f64>> {
        match self.source.offset_at(machine_time) {
            Some(offset) => {
                self.state.last_offset = Some(offset);
                Ok(offset)
            }
            None => match self.state.last_offset {
                Some(previous) => {
                    warn!(
                        "line {}: sun offset unavailable at {}, reusing the previous offset",
                        line_number,
                        format_duration(machine_time)
                    );
                    self.fallbacks += 1;
                    Ok(previous)
                }
                None => Err(GcodeError::OffsetUnavailable { line: line_number }),
            },
        }
    }

    fn apply_move(
        &mut self,
        parsed: &ParsedLine,
        line_number: usize,
        body: &str,
        eol: &str,
        out: &mut String,
    ) -> Result<()> {
        // Unspecified axes keep the previous tracked position
        let target_x = parsed.x.unwrap_or(self.state.x);
        let target_y = parsed.y.unwrap_or(self.state.y);

        let machine_time = self.start.as_f64() + self.state.elapsed;
        let offset = match self.current_offset(line_number, machine_time) {
            Ok(offset) => Some(offset),
            Err(err @ GcodeError::OffsetUnavailable { .. }) => {
                // The line goes out as written and the run carries on
                warn!("{}, leaving the line uncorrected", err);
                out.push_str(&format!("(Uncorrected, {}){}", err, eol));
                self.uncorrected += 1;
                None
            }
            Err(err) => return Err(err),
        };
        let (new_x, new_y) = match offset {
            Some(offset) => (target_x - offset.x, target_y - offset.y),
            None => (target_x, target_y),
        };

        let distance = Vector2::new(new_x - self.state.x, new_y - self.state.y).norm();
        let effective_feed = if self.state.motion_code == Some(0) {
            self.rapid_speed
        } else {
            self.state.feed_rate
        };

        if distance > 0.0 && !(effective_feed > 0.0) {
            return Err(GcodeError::ZeroFeedRate {
                line: line_number,
                distance,
            });
        }
        let move_time = if distance > 0.0 {
            distance / effective_feed
        } else {
            0.0
        };

        out.push_str(&format!(
            "(dist = {}, effective_f = {}, op_time = {}){}",
            format_general(distance),
            format_general(effective_feed),
            format_general(move_time),
            eol
        ));
        debug!(
            "line {}: offset {:?} m, {:.6} m at {:.6} m/s",
            line_number,
            offset.map(|offset| (offset.x, offset.y)),
            distance,
            effective_feed
        );

        self.state.elapsed += move_time;

        if self.state.motion_code == Some(1) {
            let (x, y) = (self.state.x, self.state.y);
            let bounds = self.state.bounds.get_or_insert_with(|| Bounds::around(x, y));
            bounds.include(new_x, new_y);
        }

        if offset.is_some() {
            let mut words: Vec<String> = Vec::with_capacity(3);
            let text = parsed.text.trim_end();
            if !text.is_empty() {
                words.push(text.to_string());
            }
            words.push(format!("X{}", format_coordinate(self.units.from_meters(new_x))));
            words.push(format!("Y{}", format_coordinate(self.units.from_meters(new_y))));
            out.push_str(&words.join(" "));
        } else {
            out.push_str(body);
        }
        out.push_str(eol);

        self.state.x = new_x;
        self.state.y = new_y;
        self.moves += 1;
        Ok(())
    }

    /// Summary of the run so far, converted to input units
    pub fn summary(&self) -> RunSummary {
        let per_meter = 1.0 / self.units.meters_per_unit();
        RunSummary {
            start: self.start,
            elapsed: self.state.elapsed,
            bounds: self.state.bounds.map(|bounds| bounds.scaled(per_meter)),
            last_offset: self.state.last_offset.map(|offset| offset * per_meter),
            lines: self.lines,
            moves: self.moves,
            fallbacks: self.fallbacks,
            uncorrected: self.uncorrected,
        }
    }

    /// Rewrites a whole program from `input` to `output`
    pub fn run<R: BufRead, W: Write>(mut self, mut input: R, mut output: W) -> Result<RunSummary> {
        let mut raw = String::new();
        loop {
            raw.clear();
            if input.read_line(&mut raw)? == 0 {
                break;
            }
            let block = self.rewrite_line(&raw)?;
            output.write_all(block.as_bytes())?;
        }
        output.flush()?;

        let summary = self.summary();
        info!(
            "rewrote {} lines ({} moves), total running time {}",
            summary.lines,
            summary.moves,
            format_duration(summary.elapsed)
        );
        Ok(summary)
    }
}

/// Splits `\n` or `\r\n` off the end of a line
fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, "\n")
    } else {
        (raw, "")
    }
}
